//! Trait seam between the agent runner and the provider client.

use crate::domain::types::{ChatRequest, Provider};
use crate::infrastructure::model::types::LlmError;
use async_trait::async_trait;

/// Outcome of one generation step: the label the response carries, the model
/// name that was requested, and the extracted output.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub provider: Provider,
    pub model: String,
    pub output: String,
}

/// One-shot generation backend for the agent step runner.
#[async_trait]
pub trait StepModel: Send + Sync {
    /// Provider used when the request does not name one.
    fn default_provider(&self) -> Provider;

    /// Run exactly one generation step for the given provider.
    async fn step(
        &self,
        provider: Provider,
        request: &ChatRequest,
    ) -> Result<StepOutcome, LlmError>;
}
