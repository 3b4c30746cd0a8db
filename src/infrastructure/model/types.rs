//! Shared types for the provider client.

use crate::domain::types::RequestError;
use thiserror::Error;

/// Errors surfaced by the provider client and the agent step runner.
///
/// Upstream failures carry the delegated call's message and are never retried;
/// there is no fallback across providers.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error("{detail}")]
    Configuration { detail: &'static str },
    #[error("provider '{provider}' request failed: {source}")]
    Upstream {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl LlmError {
    pub fn configuration(detail: &'static str) -> Self {
        Self::Configuration { detail }
    }

    pub fn upstream(provider: &'static str, source: reqwest::Error) -> Self {
        Self::Upstream { provider, source }
    }
}

pub(crate) const OPENAI_KEY_MISSING: &str = "OPENAI_API_KEY is not configured";
pub(crate) const ANTHROPIC_KEY_MISSING: &str = "ANTHROPIC_API_KEY is not configured";
pub(crate) const LITELLM_MISSING: &str =
    "LiteLLM is not configured (USE_LITELLM/LITELLM_BASE_URL/LITELLM_API_KEY)";

/// The parts of a validated request a transport needs for one completion.
#[derive(Debug, Clone, Copy)]
pub struct ChatExchange<'a> {
    pub system: Option<&'a str>,
    pub message: &'a str,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

/// What a transport hands back: the model name the upstream reported and the
/// extracted plain-text output.
#[derive(Debug, Clone)]
pub struct TransportReply {
    pub model: String,
    pub output: String,
}
