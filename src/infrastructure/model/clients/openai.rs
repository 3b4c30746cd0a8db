//! OpenAI-compatible chat-completions transport.
//!
//! Serves both the direct OpenAI path and the LiteLLM gateway, which speaks
//! the same wire format behind a different base URL.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::base::{HttpTransport, normalize_v1_base_url};
use crate::infrastructure::model::types::{ChatExchange, LlmError, TransportReply};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone)]
pub struct OpenAiCompatClient {
    base: HttpTransport,
    api_key: String,
}

impl OpenAiCompatClient {
    /// Transport for api.openai.com.
    pub fn direct(api_key: String) -> Self {
        Self {
            base: HttpTransport::new("openai", OPENAI_BASE_URL.to_string()),
            api_key,
        }
    }

    /// Transport for an OpenAI-compatible gateway at a configurable base URL.
    pub fn gateway(base_url: &str, api_key: String) -> Self {
        Self {
            base: HttpTransport::new("litellm", normalize_v1_base_url(base_url)),
            api_key,
        }
    }

    pub async fn chat(
        &self,
        model: &str,
        exchange: &ChatExchange<'_>,
    ) -> Result<TransportReply, LlmError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = exchange.system {
            messages.push(WireMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(WireMessage {
            role: "user",
            content: exchange.message,
        });

        let payload = CompletionRequest {
            model,
            temperature: exchange.temperature,
            max_tokens: exchange.max_tokens,
            messages,
        };

        info!(
            transport = self.base.id,
            model, "Sending chat completion request"
        );
        let response: CompletionResponse = self
            .base
            .post_with_bearer("/chat/completions", &self.api_key, &payload)
            .await?;
        debug!(transport = self.base.id, "Received chat completion response");

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        Ok(TransportReply {
            model: response.model,
            output: extract_text(content.as_ref()),
        })
    }
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: Vec<WireMessage<'a>>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    model: String,
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<Value>,
}

/// Extract plain text from OpenAI-shaped message content, which may be a bare
/// string or a sequence of typed parts. Only parts typed `text` are kept,
/// joined by newline, then trimmed.
pub(crate) fn extract_text(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(text)) => text.trim().to_string(),
        Some(Value::Array(parts)) => parts
            .iter()
            .map(part_text)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string(),
        _ => String::new(),
    }
}

fn part_text(part: &Value) -> &str {
    if part.get("type").and_then(Value::as_str) == Some("text") {
        part.get("text").and_then(Value::as_str).unwrap_or("")
    } else {
        ""
    }
}
