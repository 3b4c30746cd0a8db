//! Anthropic messages-API transport.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::HttpTransport;
use crate::infrastructure::model::types::{ChatExchange, LlmError, TransportReply};

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// The messages API requires max_tokens.
const DEFAULT_MAX_TOKENS: u32 = 1024;

#[derive(Clone)]
pub struct AnthropicClient {
    base: HttpTransport,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        Self {
            base: HttpTransport::new("anthropic", ANTHROPIC_BASE_URL.to_string()),
            api_key,
        }
    }

    pub async fn chat(
        &self,
        model: &str,
        exchange: &ChatExchange<'_>,
    ) -> Result<TransportReply, LlmError> {
        let payload = MessagesRequest {
            model,
            max_tokens: exchange.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: exchange.temperature,
            system: exchange.system,
            messages: vec![UserMessage {
                role: "user",
                content: exchange.message,
            }],
        };

        info!(model, "Sending Anthropic messages request");
        let response: MessagesResponse = self
            .base
            .post_with_headers(
                "/messages",
                &[
                    ("x-api-key", self.api_key.as_str()),
                    ("anthropic-version", ANTHROPIC_VERSION),
                ],
                &payload,
            )
            .await?;
        debug!("Received Anthropic messages response");

        Ok(TransportReply {
            model: response.model,
            output: extract_text(&response.content),
        })
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<UserMessage<'a>>,
}

#[derive(Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    model: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Keep only `text` blocks, joined by newline, trimmed.
pub(crate) fn extract_text(content: &[ContentBlock]) -> String {
    content
        .iter()
        .map(|block| {
            if block.kind == "text" {
                block.text.as_deref().unwrap_or("")
            } else {
                ""
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
