// Request validation tests - exercising the core's schema checks
//
// The core, not the HTTP layer, owns validation: raw JSON values go in and
// typed requests or field-level errors come out.

use llm_relay::types::{AgentRequest, ChatRequest, Provider, RequestError};
use serde_json::json;

#[test]
fn chat_request_round_trips_all_fields() {
    let request = ChatRequest::from_value(&json!({
        "message": "What is the capital of France?",
        "provider": "openai",
        "model": "gpt-4.1",
        "systemPrompt": "Answer in one word.",
        "temperature": 0.2,
        "maxTokens": 16
    }))
    .expect("valid request");

    assert_eq!(request.message, "What is the capital of France?");
    assert_eq!(request.provider, Some(Provider::Openai));
    assert_eq!(request.model.as_deref(), Some("gpt-4.1"));
    assert_eq!(request.system_prompt.as_deref(), Some("Answer in one word."));
    assert_eq!(request.temperature, Some(0.2));
    assert_eq!(request.max_tokens, Some(16));
}

#[test]
fn every_known_provider_value_parses() {
    for (value, expected) in [
        ("openai", Provider::Openai),
        ("anthropic", Provider::Anthropic),
        ("litellm", Provider::Litellm),
    ] {
        let request =
            ChatRequest::from_value(&json!({"message": "hi", "provider": value})).expect(value);
        assert_eq!(request.provider, Some(expected));
    }
}

#[test]
fn provider_values_are_case_sensitive() {
    let error = ChatRequest::from_value(&json!({"message": "hi", "provider": "OpenAI"}))
        .expect_err("mixed case is not in the enum");
    assert!(matches!(error, RequestError::UnsupportedProvider { .. }));
}

#[test]
fn validation_reports_every_offending_field() {
    let error = ChatRequest::from_value(&json!({
        "message": "",
        "temperature": -0.5,
        "maxTokens": 5000
    }))
    .expect_err("three violations");

    match error {
        RequestError::Invalid { errors } => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec!["message", "temperature", "maxTokens"]);
        }
        other => panic!("expected field errors, got {other:?}"),
    }
}

#[test]
fn non_object_bodies_are_rejected() {
    let error = ChatRequest::from_value(&json!("just a string")).expect_err("not an object");
    assert!(matches!(error, RequestError::Invalid { .. }));
}

#[test]
fn agent_request_accepts_a_missing_thread_id() {
    let request = AgentRequest::from_value(&json!({"message": "hi"})).expect("valid");
    assert!(request.thread_id.is_none());
}

#[test]
fn agent_request_keeps_chat_validation() {
    let error = AgentRequest::from_value(&json!({"threadId": "t-1"})).expect_err("no message");
    assert!(matches!(error, RequestError::Invalid { .. }));
}
