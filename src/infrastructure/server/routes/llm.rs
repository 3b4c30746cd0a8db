use super::super::dto::ProviderListResponse;
use super::super::error::{ApiError, llm_error};
use super::super::state::ServerState;
use crate::domain::types::{AgentResponse, ChatResponse};
use axum::Json;
use axum::extract::State;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

pub async fn providers_handler(State(state): State<Arc<ServerState>>) -> Json<ProviderListResponse> {
    let providers = state.llm().available_providers();
    info!(count = providers.len(), "Serving /llm/providers request");
    Json(ProviderListResponse { providers })
}

pub async fn chat_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<Value>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!("Received /llm/chat request");
    match state.llm().chat(&payload).await {
        Ok(response) => {
            info!(
                provider = response.provider.as_str(),
                model = response.model.as_str(),
                "Chat request completed"
            );
            Ok(Json(response))
        }
        Err(err) => {
            error!(%err, "Chat request failed");
            Err(llm_error(err))
        }
    }
}

pub async fn agent_handler(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<Value>,
) -> Result<Json<AgentResponse>, ApiError> {
    info!("Received /llm/agent request");
    match state.agent().run(&payload).await {
        Ok(response) => {
            info!(
                provider = response.provider.as_str(),
                thread_id = response.thread_id.as_str(),
                "Agent request completed"
            );
            Ok(Json(response))
        }
        Err(err) => {
            error!(%err, "Agent request failed");
            Err(llm_error(err))
        }
    }
}
