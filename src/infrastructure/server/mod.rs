//! REST boundary: router assembly and the serve loop.

mod dto;
mod error;
mod routes;
mod state;

pub use state::ServerState;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::DEFAULT_CORS_ORIGIN;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind HTTP listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[from] std::io::Error),
}

pub async fn serve(
    state: Arc<ServerState>,
    addr: SocketAddr,
    cors_origin: &str,
) -> Result<(), ServerError> {
    info!(%addr, "Binding REST server");

    let app = router(state).layer(cors_layer(cors_origin));

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(%addr, "REST server ready to accept connections");

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(ServerError::Serve)
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/llm/providers", get(routes::llm::providers_handler))
        .route("/llm/chat", post(routes::llm::chat_handler))
        .route("/llm/agent", post(routes::llm::agent_handler))
        .route("/rag/index", post(routes::rag::index_handler))
        .route("/rag/search", post(routes::rag::search_handler))
        .route("/graph/health", get(routes::graph::health_handler))
        .route("/graph/query", post(routes::graph::query_handler))
        .route("/infra/health", get(routes::infra::health_handler))
        .with_state(state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let origin = origin.parse::<HeaderValue>().unwrap_or_else(|_| {
        warn!(origin, "Ignoring unparsable CORS_ORIGIN");
        HeaderValue::from_static(DEFAULT_CORS_ORIGIN)
    });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
