// Wire-contract tests - response shapes match the public API
//
// Responses serialize to camelCase JSON with lowercase provider labels and
// RFC 3339 timestamps.

use chrono::Utc;
use llm_relay::config::AppConfig;
use llm_relay::infra::InfraService;
use llm_relay::types::{AgentResponse, ChatResponse, Provider};
use serde_json::json;

#[test]
fn chat_response_serializes_to_camel_case() {
    let response = ChatResponse {
        provider: Provider::Openai,
        model: "gpt-4.1-mini".to_string(),
        output: "Paris".to_string(),
        created_at: Utc::now(),
    };

    let value = serde_json::to_value(&response).expect("serialize");
    assert_eq!(value["provider"], "openai");
    assert_eq!(value["model"], "gpt-4.1-mini");
    assert_eq!(value["output"], "Paris");
    let created_at = value["createdAt"].as_str().expect("createdAt is a string");
    assert!(created_at.contains('T'), "timestamp is RFC 3339: {created_at}");
}

#[test]
fn agent_response_carries_the_thread_id() {
    let response = AgentResponse {
        provider: Provider::Litellm,
        model: "openai-gpt-4.1-mini".to_string(),
        output: "ok".to_string(),
        thread_id: "thread-1".to_string(),
        created_at: Utc::now(),
    };

    let value = serde_json::to_value(&response).expect("serialize");
    assert_eq!(value["provider"], "litellm");
    assert_eq!(value["threadId"], "thread-1");
}

#[test]
fn provider_serializes_lowercase_in_lists() {
    let value = serde_json::to_value(vec![
        Provider::Litellm,
        Provider::Openai,
        Provider::Anthropic,
    ])
    .expect("serialize");
    assert_eq!(value, json!(["litellm", "openai", "anthropic"]));
}

#[tokio::test]
async fn infra_health_reports_per_dependency_status() {
    let config = AppConfig::from_lookup(|_| None);
    let health = InfraService::from_config(&config).check().await;

    let value = serde_json::to_value(&health).expect("serialize");
    assert_eq!(value["status"], "ok");
    assert!(value["checkedAt"].is_string());
    for dependency in ["postgres", "redis", "qdrant", "neo4j"] {
        let status = &value["dependencies"][dependency];
        assert_eq!(status["state"], "skipped", "{dependency}");
        assert!(status["latencyMs"].is_u64(), "{dependency}");
        assert!(status["detail"].is_string(), "{dependency}");
    }
}
