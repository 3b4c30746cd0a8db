//! Single-step agent execution.
//!
//! A thread identifier is attached to every response, generated when the
//! caller does not supply one. No history is loaded or persisted; the thread
//! id is a label, not a session store.

use crate::domain::types::{AgentRequest, AgentResponse};
use crate::infrastructure::model::{LlmError, StepModel};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

pub struct AgentRunner<M: StepModel> {
    model: Arc<M>,
}

impl<M: StepModel> AgentRunner<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self { model }
    }

    /// Validate a raw request and run exactly one generation step.
    pub async fn run(&self, raw: &Value) -> Result<AgentResponse, LlmError> {
        let request = AgentRequest::from_value(raw)?;
        let provider = request
            .chat
            .provider
            .unwrap_or_else(|| self.model.default_provider());
        let thread_id = ensure_thread_id(request.thread_id);
        info!(
            provider = provider.as_str(),
            thread_id = thread_id.as_str(),
            "Running agent step"
        );

        let outcome = self.model.step(provider, &request.chat).await?;
        info!(
            provider = outcome.provider.as_str(),
            thread_id = thread_id.as_str(),
            "Agent step finished"
        );

        Ok(AgentResponse {
            provider: outcome.provider,
            model: outcome.model,
            output: outcome.output,
            thread_id,
            created_at: Utc::now(),
        })
    }
}

fn ensure_thread_id(supplied: Option<String>) -> String {
    supplied.unwrap_or_else(|| Uuid::new_v4().to_string())
}
