//! Multi-provider LLM client.
//!
//! Wraps up to three transports (direct OpenAI, direct Anthropic, and an
//! OpenAI-compatible LiteLLM gateway) behind a uniform chat operation. The
//! dispatch policy:
//!
//! - `openai`/`anthropic` with gateway mode on and configured: route through
//!   the gateway with that provider's gateway-flavored default model, labeled
//!   with the requested provider.
//! - `openai`/`anthropic` with gateway mode off: direct transport; fails with
//!   a configuration error when the API key is absent.
//! - `litellm`: always the gateway, labeled `litellm`.

pub mod clients;
mod route;
mod traits;
mod types;

pub use route::RoutePlan;
pub use traits::{StepModel, StepOutcome};
pub use types::{ChatExchange, LlmError, TransportReply};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{
    DEFAULT_ANTHROPIC_MODEL, DEFAULT_LITELLM_ANTHROPIC_MODEL, DEFAULT_LITELLM_OPENAI_MODEL,
    DEFAULT_OPENAI_MODEL, LlmConfig,
};
use crate::domain::types::{ChatRequest, ChatResponse, Provider};
use clients::{AnthropicClient, OpenAiCompatClient};
use types::{ANTHROPIC_KEY_MISSING, LITELLM_MISSING, OPENAI_KEY_MISSING};

pub struct LlmClient {
    openai: Option<OpenAiCompatClient>,
    anthropic: Option<AnthropicClient>,
    gateway: Option<OpenAiCompatClient>,
    use_litellm: bool,
    default_provider: Provider,
    openai_model: String,
    anthropic_model: String,
    litellm_openai_model: String,
    litellm_anthropic_model: String,
}

impl LlmClient {
    pub fn from_config(config: &LlmConfig) -> Self {
        let openai = config
            .openai_api_key
            .clone()
            .map(OpenAiCompatClient::direct);
        let anthropic = config.anthropic_api_key.clone().map(AnthropicClient::new);
        // Built whenever credentials exist; whether chat may use it also
        // depends on the gateway enable flag.
        let gateway = match (&config.litellm_base_url, &config.litellm_api_key) {
            (Some(url), Some(key)) => Some(OpenAiCompatClient::gateway(url, key.clone())),
            _ => None,
        };

        let default_provider = config.default_provider.unwrap_or(if config.use_litellm {
            Provider::Litellm
        } else {
            Provider::Openai
        });

        Self {
            openai,
            anthropic,
            gateway,
            use_litellm: config.use_litellm,
            default_provider,
            openai_model: config
                .openai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            anthropic_model: config
                .anthropic_model
                .clone()
                .unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string()),
            litellm_openai_model: config
                .litellm_openai_model
                .clone()
                .unwrap_or_else(|| DEFAULT_LITELLM_OPENAI_MODEL.to_string()),
            litellm_anthropic_model: config
                .litellm_anthropic_model
                .clone()
                .unwrap_or_else(|| DEFAULT_LITELLM_ANTHROPIC_MODEL.to_string()),
        }
    }

    /// Providers with usable credentials, gateway-backed entries first.
    pub fn available_providers(&self) -> Vec<Provider> {
        let mut providers = Vec::new();
        if self.chat_gateway().is_some() {
            providers.extend([Provider::Litellm, Provider::Openai, Provider::Anthropic]);
        }
        if self.openai.is_some() && !providers.contains(&Provider::Openai) {
            providers.push(Provider::Openai);
        }
        if self.anthropic.is_some() && !providers.contains(&Provider::Anthropic) {
            providers.push(Provider::Anthropic);
        }
        providers
    }

    /// Validate a raw request, route it, and run one completion.
    pub async fn chat(&self, raw: &Value) -> Result<ChatResponse, LlmError> {
        let request = ChatRequest::from_value(raw)?;
        let provider = request.provider.unwrap_or(self.default_provider);
        let plan = self.plan_chat(provider, request.model.as_deref())?;
        debug!(
            provider = provider.as_str(),
            model = plan.model(),
            "Resolved chat route"
        );

        let reply = self.dispatch(&plan, &exchange_of(&request)).await?;
        info!(
            provider = plan.label().as_str(),
            model = reply.model.as_str(),
            "Chat completion finished"
        );

        Ok(ChatResponse {
            provider: plan.label(),
            model: reply.model,
            output: reply.output,
            created_at: Utc::now(),
        })
    }

    /// The gateway transport, when gateway mode allows chat to use it.
    fn chat_gateway(&self) -> Option<&OpenAiCompatClient> {
        if self.use_litellm {
            self.gateway.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn plan_chat(
        &self,
        provider: Provider,
        model_override: Option<&str>,
    ) -> Result<RoutePlan, LlmError> {
        self.plan(provider, model_override, true)
    }

    /// Agent-step routing. Identical to chat routing except that a bare
    /// `litellm` request only needs gateway credentials, not the enable flag.
    pub(crate) fn plan_step(
        &self,
        provider: Provider,
        model_override: Option<&str>,
    ) -> Result<RoutePlan, LlmError> {
        self.plan(provider, model_override, false)
    }

    fn plan(
        &self,
        provider: Provider,
        model_override: Option<&str>,
        litellm_needs_flag: bool,
    ) -> Result<RoutePlan, LlmError> {
        match provider {
            Provider::Openai => {
                if self.chat_gateway().is_some() {
                    Ok(RoutePlan::Gateway {
                        model: model_override
                            .unwrap_or(&self.litellm_openai_model)
                            .to_string(),
                        label: Provider::Openai,
                    })
                } else if self.openai.is_some() {
                    Ok(RoutePlan::DirectOpenai {
                        model: model_override.unwrap_or(&self.openai_model).to_string(),
                    })
                } else {
                    Err(LlmError::configuration(OPENAI_KEY_MISSING))
                }
            }
            Provider::Anthropic => {
                if self.chat_gateway().is_some() {
                    Ok(RoutePlan::Gateway {
                        model: model_override
                            .unwrap_or(&self.litellm_anthropic_model)
                            .to_string(),
                        label: Provider::Anthropic,
                    })
                } else if self.anthropic.is_some() {
                    Ok(RoutePlan::DirectAnthropic {
                        model: model_override.unwrap_or(&self.anthropic_model).to_string(),
                    })
                } else {
                    Err(LlmError::configuration(ANTHROPIC_KEY_MISSING))
                }
            }
            Provider::Litellm => {
                let usable = if litellm_needs_flag {
                    self.chat_gateway().is_some()
                } else {
                    self.gateway.is_some()
                };
                if usable {
                    Ok(RoutePlan::Gateway {
                        model: model_override
                            .unwrap_or(&self.litellm_openai_model)
                            .to_string(),
                        label: Provider::Litellm,
                    })
                } else {
                    Err(LlmError::configuration(LITELLM_MISSING))
                }
            }
        }
    }

    pub(crate) async fn dispatch(
        &self,
        plan: &RoutePlan,
        exchange: &ChatExchange<'_>,
    ) -> Result<TransportReply, LlmError> {
        match plan {
            RoutePlan::Gateway { model, .. } => {
                let gateway = self
                    .gateway
                    .as_ref()
                    .ok_or(LlmError::configuration(LITELLM_MISSING))?;
                gateway.chat(model, exchange).await
            }
            RoutePlan::DirectOpenai { model } => {
                let openai = self
                    .openai
                    .as_ref()
                    .ok_or(LlmError::configuration(OPENAI_KEY_MISSING))?;
                openai.chat(model, exchange).await
            }
            RoutePlan::DirectAnthropic { model } => {
                let anthropic = self
                    .anthropic
                    .as_ref()
                    .ok_or(LlmError::configuration(ANTHROPIC_KEY_MISSING))?;
                anthropic.chat(model, exchange).await
            }
        }
    }
}

fn exchange_of<'a>(request: &'a ChatRequest) -> ChatExchange<'a> {
    ChatExchange {
        system: request.system_prompt.as_deref(),
        message: &request.message,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

#[async_trait]
impl StepModel for LlmClient {
    fn default_provider(&self) -> Provider {
        self.default_provider
    }

    async fn step(
        &self,
        provider: Provider,
        request: &ChatRequest,
    ) -> Result<StepOutcome, LlmError> {
        let plan = self.plan_step(provider, request.model.as_deref())?;
        let reply = self.dispatch(&plan, &exchange_of(request)).await?;
        // The step reports the model that was requested, not the upstream echo.
        Ok(StepOutcome {
            provider: plan.label(),
            model: plan.model().to_string(),
            output: reply.output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai_only() -> LlmClient {
        LlmClient::from_config(&LlmConfig {
            openai_api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        })
    }

    fn gateway_enabled() -> LlmClient {
        LlmClient::from_config(&LlmConfig {
            use_litellm: true,
            litellm_base_url: Some("http://gateway:8000".into()),
            litellm_api_key: Some("gw-key".into()),
            ..LlmConfig::default()
        })
    }

    #[test]
    fn default_provider_is_openai_without_gateway_mode() {
        assert_eq!(openai_only().default_provider, Provider::Openai);
    }

    #[test]
    fn default_provider_is_litellm_in_gateway_mode() {
        assert_eq!(gateway_enabled().default_provider, Provider::Litellm);
    }

    #[test]
    fn explicit_default_provider_wins() {
        let client = LlmClient::from_config(&LlmConfig {
            default_provider: Some(Provider::Anthropic),
            use_litellm: true,
            litellm_base_url: Some("http://gateway:8000".into()),
            litellm_api_key: Some("gw-key".into()),
            ..LlmConfig::default()
        });
        assert_eq!(client.default_provider, Provider::Anthropic);
    }

    #[test]
    fn lists_only_direct_providers_without_gateway() {
        assert_eq!(openai_only().available_providers(), vec![Provider::Openai]);

        let client = LlmClient::from_config(&LlmConfig {
            openai_api_key: Some("sk".into()),
            anthropic_api_key: Some("ak".into()),
            ..LlmConfig::default()
        });
        assert_eq!(
            client.available_providers(),
            vec![Provider::Openai, Provider::Anthropic]
        );
    }

    #[test]
    fn gateway_mode_lists_all_providers_once() {
        let client = LlmClient::from_config(&LlmConfig {
            openai_api_key: Some("sk".into()),
            use_litellm: true,
            litellm_base_url: Some("http://gateway:8000".into()),
            litellm_api_key: Some("gw-key".into()),
            ..LlmConfig::default()
        });
        assert_eq!(
            client.available_providers(),
            vec![Provider::Litellm, Provider::Openai, Provider::Anthropic]
        );
    }

    #[test]
    fn gateway_credentials_without_flag_list_nothing() {
        let client = LlmClient::from_config(&LlmConfig {
            litellm_base_url: Some("http://gateway:8000".into()),
            litellm_api_key: Some("gw-key".into()),
            ..LlmConfig::default()
        });
        assert!(client.available_providers().is_empty());
    }

    #[test]
    fn direct_openai_uses_configured_model_default() {
        let plan = openai_only().plan_chat(Provider::Openai, None).expect("routed");
        assert_eq!(
            plan,
            RoutePlan::DirectOpenai {
                model: DEFAULT_OPENAI_MODEL.to_string()
            }
        );
    }

    #[test]
    fn model_override_beats_the_default() {
        let plan = openai_only()
            .plan_chat(Provider::Openai, Some("gpt-4.1"))
            .expect("routed");
        assert_eq!(plan.model(), "gpt-4.1");
    }

    #[test]
    fn gateway_route_keeps_requested_provider_label() {
        let plan = gateway_enabled()
            .plan_chat(Provider::Openai, None)
            .expect("routed");
        assert_eq!(plan.label(), Provider::Openai);
        assert_eq!(plan.model(), DEFAULT_LITELLM_OPENAI_MODEL);

        let plan = gateway_enabled()
            .plan_chat(Provider::Anthropic, None)
            .expect("routed");
        assert_eq!(plan.label(), Provider::Anthropic);
        assert_eq!(plan.model(), DEFAULT_LITELLM_ANTHROPIC_MODEL);
    }

    #[test]
    fn litellm_requests_are_always_labeled_litellm() {
        let plan = gateway_enabled()
            .plan_chat(Provider::Litellm, Some("anthropic-claude-3-5-haiku"))
            .expect("routed");
        assert_eq!(plan.label(), Provider::Litellm);
        assert_eq!(plan.model(), "anthropic-claude-3-5-haiku");
    }

    #[test]
    fn missing_anthropic_key_is_a_configuration_error() {
        let error = openai_only()
            .plan_chat(Provider::Anthropic, None)
            .unwrap_err();
        match error {
            LlmError::Configuration { detail } => {
                assert_eq!(detail, "ANTHROPIC_API_KEY is not configured");
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn litellm_chat_requires_the_enable_flag() {
        let client = LlmClient::from_config(&LlmConfig {
            litellm_base_url: Some("http://gateway:8000".into()),
            litellm_api_key: Some("gw-key".into()),
            ..LlmConfig::default()
        });
        assert!(matches!(
            client.plan_chat(Provider::Litellm, None),
            Err(LlmError::Configuration { .. })
        ));
        // The agent step only needs the credentials.
        let plan = client.plan_step(Provider::Litellm, None).expect("routed");
        assert_eq!(plan.label(), Provider::Litellm);
    }

    #[test]
    fn gateway_mode_without_credentials_falls_back_to_direct() {
        let client = LlmClient::from_config(&LlmConfig {
            openai_api_key: Some("sk".into()),
            use_litellm: true,
            ..LlmConfig::default()
        });
        let plan = client.plan_chat(Provider::Openai, None).expect("routed");
        assert!(matches!(plan, RoutePlan::DirectOpenai { .. }));
    }

    #[tokio::test]
    async fn chat_rejects_unknown_provider_before_any_dispatch() {
        let error = openai_only()
            .chat(&serde_json::json!({"message": "hi", "provider": "carrierpigeon"}))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            LlmError::Request(crate::domain::types::RequestError::UnsupportedProvider { .. })
        ));
    }

    #[tokio::test]
    async fn chat_surfaces_field_errors() {
        let error = openai_only()
            .chat(&serde_json::json!({"message": ""}))
            .await
            .unwrap_err();
        assert!(matches!(error, LlmError::Request(_)));
    }

    #[tokio::test]
    async fn chat_reports_missing_credentials_without_calling_out() {
        let client = LlmClient::from_config(&LlmConfig::default());
        let error = client
            .chat(&serde_json::json!({"message": "hi", "provider": "anthropic"}))
            .await
            .unwrap_err();
        assert!(matches!(error, LlmError::Configuration { .. }));
    }
}
