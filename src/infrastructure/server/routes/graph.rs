use super::super::error::{ApiError, graph_error};
use super::super::state::ServerState;
use crate::application::graph::{GraphHealth, GraphQueryResponse};
use axum::Json;
use axum::extract::State;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

pub async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<GraphHealth> {
    info!("Received /graph/health request");
    Json(state.graph().health().await)
}

pub async fn query_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<Value>,
) -> Result<Json<GraphQueryResponse>, ApiError> {
    info!("Received /graph/query request");
    match state.graph().query(&payload).await {
        Ok(response) => {
            info!(count = response.count, "Cypher request completed");
            Ok(Json(response))
        }
        Err(err) => {
            error!(%err, "Cypher request failed");
            Err(graph_error(err))
        }
    }
}
