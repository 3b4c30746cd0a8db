use super::super::state::ServerState;
use crate::application::infra::InfraHealth;
use axum::Json;
use axum::extract::State;
use std::sync::Arc;
use tracing::info;

pub async fn health_handler(State(state): State<Arc<ServerState>>) -> Json<InfraHealth> {
    info!("Received /infra/health request");
    Json(state.infra().check().await)
}
