//! Request and response contracts shared by the chat and agent operations.
//!
//! The HTTP layer hands raw JSON values to the core; validation happens here,
//! before any provider is selected or any network call is made.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Logical LLM providers this service can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Openai,
    Anthropic,
    Litellm,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Openai => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Litellm => "litellm",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "openai" => Some(Provider::Openai),
            "anthropic" => Some(Provider::Anthropic),
            "litellm" => Some(Provider::Litellm),
            _ => None,
        }
    }
}

/// A single schema violation, reported by field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Failures produced while validating a raw request body.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("unsupported provider '{provider}'")]
    UnsupportedProvider { provider: String },
    #[error("{}", format_field_errors(.errors))]
    Invalid { errors: Vec<FieldError> },
}

impl RequestError {
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self::Invalid { errors }
    }

    /// Single catch-all for bodies that are not even the right shape.
    pub fn malformed_body() -> Self {
        Self::Invalid {
            errors: vec![FieldError::new("body", "request body has the wrong shape")],
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    let details: Vec<String> = errors
        .iter()
        .map(|error| format!("{}: {}", error.field, error.message))
        .collect();
    format!("invalid request ({})", details.join("; "))
}

const MAX_TOKENS_LIMIT: i64 = 4096;

/// A validated single-turn chat request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChatRequest {
    message: Option<String>,
    provider: Option<String>,
    model: Option<String>,
    system_prompt: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<i64>,
}

impl ChatRequest {
    pub fn from_value(value: &Value) -> Result<Self, RequestError> {
        let raw: RawChatRequest =
            serde_json::from_value(value.clone()).map_err(|_| RequestError::malformed_body())?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawChatRequest) -> Result<Self, RequestError> {
        // An out-of-enum provider is its own failure kind, checked before the
        // remaining fields so it can never reach dispatch.
        let provider = match raw.provider.as_deref() {
            None => None,
            Some(value) => Some(
                Provider::parse(value).ok_or_else(|| RequestError::unsupported_provider(value))?,
            ),
        };

        let mut errors = Vec::new();
        let message = raw.message.unwrap_or_default();
        if message.is_empty() {
            errors.push(FieldError::new("message", "message is required"));
        }
        if raw.model.as_deref() == Some("") {
            errors.push(FieldError::new("model", "model must not be empty"));
        }
        if let Some(temperature) = raw.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                errors.push(FieldError::new(
                    "temperature",
                    "temperature must be between 0 and 2",
                ));
            }
        }
        if let Some(max_tokens) = raw.max_tokens {
            if max_tokens < 1 || max_tokens > MAX_TOKENS_LIMIT {
                errors.push(FieldError::new(
                    "maxTokens",
                    "maxTokens must be a positive integer up to 4096",
                ));
            }
        }
        if !errors.is_empty() {
            return Err(RequestError::invalid(errors));
        }

        Ok(Self {
            message,
            provider,
            model: raw.model,
            system_prompt: raw.system_prompt,
            temperature: raw.temperature,
            max_tokens: raw.max_tokens.map(|value| value as u32),
        })
    }
}

/// A chat request extended with an optional conversation thread label.
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub chat: ChatRequest,
    pub thread_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAgentRequest {
    #[serde(flatten)]
    chat: RawChatRequest,
    thread_id: Option<String>,
}

impl AgentRequest {
    pub fn from_value(value: &Value) -> Result<Self, RequestError> {
        let raw: RawAgentRequest =
            serde_json::from_value(value.clone()).map_err(|_| RequestError::malformed_body())?;
        if raw.thread_id.as_deref() == Some("") {
            return Err(RequestError::invalid(vec![FieldError::new(
                "threadId",
                "threadId must not be empty",
            )]));
        }
        Ok(Self {
            chat: ChatRequest::from_raw(raw.chat)?,
            thread_id: raw.thread_id,
        })
    }
}

/// Normalized reply for a single chat completion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub provider: Provider,
    pub model: String,
    pub output: String,
    pub created_at: DateTime<Utc>,
}

/// Chat reply carrying the (possibly generated) thread label.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub provider: Provider,
    pub model: String,
    pub output: String,
    pub thread_id: String,
    pub created_at: DateTime<Utc>,
}
