use super::super::error::{ApiError, rag_error};
use super::super::state::ServerState;
use crate::application::rag::{RagIndexResponse, RagSearchResponse};
use axum::Json;
use axum::extract::State;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

pub async fn index_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<Value>,
) -> Result<Json<RagIndexResponse>, ApiError> {
    info!("Received /rag/index request");
    match state.rag().index(&payload).await {
        Ok(response) => {
            info!(
                collection = response.collection_name.as_str(),
                count = response.indexed_count,
                "Index request completed"
            );
            Ok(Json(response))
        }
        Err(err) => {
            error!(%err, "Index request failed");
            Err(rag_error(err))
        }
    }
}

pub async fn search_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<Value>,
) -> Result<Json<RagSearchResponse>, ApiError> {
    info!("Received /rag/search request");
    match state.rag().search(&payload).await {
        Ok(response) => {
            info!(
                collection = response.collection_name.as_str(),
                hits = response.results.len(),
                "Search request completed"
            );
            Ok(Json(response))
        }
        Err(err) => {
            error!(%err, "Search request failed");
            Err(rag_error(err))
        }
    }
}
