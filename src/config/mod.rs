//! Process-wide configuration.
//!
//! Everything is read from the environment exactly once at startup and handed
//! to components by reference; business logic never performs ambient lookups.
//! A missing key disables the corresponding provider or integration instead of
//! failing startup.

use crate::domain::types::Provider;
use std::env;
use std::net::SocketAddr;
use tracing::warn;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_LITELLM_OPENAI_MODEL: &str = "openai-gpt-4.1-mini";
pub const DEFAULT_LITELLM_ANTHROPIC_MODEL: &str = "anthropic-claude-3-5-haiku";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_LITELLM_EMBEDDING_MODEL: &str = "openai-text-embedding-3-small";
pub const DEFAULT_QDRANT_COLLECTION: &str = "documents";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

const DEFAULT_PORT: u16 = 4000;

/// Credentials, defaults, and gateway settings for the provider client.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub default_provider: Option<Provider>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_model: Option<String>,
    pub use_litellm: bool,
    pub litellm_base_url: Option<String>,
    pub litellm_api_key: Option<String>,
    pub litellm_openai_model: Option<String>,
    pub litellm_anthropic_model: Option<String>,
}

/// Vector-store and embedding settings.
#[derive(Debug, Clone, Default)]
pub struct RagConfig {
    pub qdrant_url: Option<String>,
    pub qdrant_api_key: Option<String>,
    pub collection: String,
    pub embedding_model: Option<String>,
}

/// Neo4j settings; present only when all three variables are set.
#[derive(Debug, Clone)]
pub struct Neo4jSettings {
    pub uri: String,
    pub username: String,
    pub password: String,
}

/// Connection strings for the health-probe targets that have no other use.
#[derive(Debug, Clone, Default)]
pub struct InfraConfig {
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub cors_origin: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub rag: RagConfig,
    pub neo4j: Option<Neo4jSettings>,
    pub infra: InfraConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary lookup source. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let use_litellm = get("USE_LITELLM").is_some_and(|value| parse_bool(&value));
        let default_provider = get("DEFAULT_PROVIDER").and_then(|value| {
            let parsed = Provider::parse(&value);
            if parsed.is_none() {
                warn!(value, "Ignoring unrecognized DEFAULT_PROVIDER");
            }
            parsed
        });

        let llm = LlmConfig {
            default_provider,
            openai_api_key: get("OPENAI_API_KEY"),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            openai_model: get("OPENAI_MODEL"),
            anthropic_model: get("ANTHROPIC_MODEL"),
            use_litellm,
            litellm_base_url: get("LITELLM_BASE_URL"),
            litellm_api_key: get("LITELLM_API_KEY").or_else(|| get("LITELLM_MASTER_KEY")),
            litellm_openai_model: get("LITELLM_OPENAI_MODEL"),
            litellm_anthropic_model: get("LITELLM_ANTHROPIC_MODEL"),
        };

        let rag = RagConfig {
            qdrant_url: get("QDRANT_URL"),
            qdrant_api_key: get("QDRANT_API_KEY"),
            collection: get("QDRANT_COLLECTION")
                .unwrap_or_else(|| DEFAULT_QDRANT_COLLECTION.to_string()),
            embedding_model: get("EMBEDDING_MODEL"),
        };

        let neo4j = match (get("NEO4J_URI"), get("NEO4J_USERNAME"), get("NEO4J_PASSWORD")) {
            (Some(uri), Some(username), Some(password)) => Some(Neo4jSettings {
                uri,
                username,
                password,
            }),
            _ => None,
        };

        let infra = InfraConfig {
            database_url: get("DATABASE_URL"),
            redis_url: get("REDIS_URL"),
        };

        let port = get("PORT")
            .and_then(|value| match value.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    warn!(value, "Ignoring unparsable PORT");
                    None
                }
            })
            .unwrap_or(DEFAULT_PORT);
        let server = ServerConfig {
            bind: SocketAddr::from(([0, 0, 0, 0], port)),
            cors_origin: get("CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        };

        Self {
            llm,
            rag,
            neo4j,
            infra,
            server,
        }
    }
}

/// "1" and any casing of "true" enable a flag; everything else disables it.
pub fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn parse_bool_accepts_one_and_true() {
        assert!(parse_bool("1"));
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("yes"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn empty_values_count_as_absent() {
        let config = config_from(&[("OPENAI_API_KEY", ""), ("QDRANT_URL", "")]);
        assert_eq!(config.llm.openai_api_key, None);
        assert_eq!(config.rag.qdrant_url, None);
    }

    #[test]
    fn master_key_is_a_fallback_for_the_gateway_key() {
        let config = config_from(&[("LITELLM_MASTER_KEY", "mk")]);
        assert_eq!(config.llm.litellm_api_key.as_deref(), Some("mk"));

        let config = config_from(&[("LITELLM_API_KEY", "ak"), ("LITELLM_MASTER_KEY", "mk")]);
        assert_eq!(config.llm.litellm_api_key.as_deref(), Some("ak"));
    }

    #[test]
    fn unrecognized_default_provider_is_ignored() {
        let config = config_from(&[("DEFAULT_PROVIDER", "carrierpigeon")]);
        assert_eq!(config.llm.default_provider, None);

        let config = config_from(&[("DEFAULT_PROVIDER", "anthropic")]);
        assert_eq!(config.llm.default_provider, Some(Provider::Anthropic));
    }

    #[test]
    fn neo4j_requires_all_three_settings() {
        let config = config_from(&[("NEO4J_URI", "http://localhost:7474")]);
        assert!(config.neo4j.is_none());

        let config = config_from(&[
            ("NEO4J_URI", "http://localhost:7474"),
            ("NEO4J_USERNAME", "neo4j"),
            ("NEO4J_PASSWORD", "secret"),
        ]);
        assert!(config.neo4j.is_some());
    }

    #[test]
    fn port_and_collection_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "not-a-port")]);
        assert_eq!(config.server.bind.port(), 4000);
        assert_eq!(config.rag.collection, DEFAULT_QDRANT_COLLECTION);

        let config = config_from(&[("PORT", "8123"), ("QDRANT_COLLECTION", "kb")]);
        assert_eq!(config.server.bind.port(), 8123);
        assert_eq!(config.rag.collection, "kb");
    }
}
