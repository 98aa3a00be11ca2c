use async_trait::async_trait;
use ideaval_core::{
    CoreConcept, GenerationRequest, IdeaError, Result, StageRecord, TextGenerator, WebLookup,
};
use ideaval_model::RetryPolicy;
use ideaval_model::openrouter::{OpenRouterClient, OpenRouterConfig};
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct RecordingLookup {
    queries: Mutex<Vec<String>>,
}

#[async_trait]
impl WebLookup for RecordingLookup {
    fn name(&self) -> &str {
        "recording"
    }

    async fn search(&self, query: &str) -> Result<String> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok("1. Focus apps market report - https://example.com - worth $1B".to_string())
    }
}

fn client_for(server: &MockServer) -> OpenRouterClient {
    OpenRouterClient::new(
        OpenRouterConfig::new("test-key", "openai/gpt-4o-mini").with_base_url(server.uri()),
    )
    .unwrap()
    .with_retry_policy(RetryPolicy::none())
}

fn completion(content: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "gen-1",
        "choices": [{ "index": 0, "message": content, "finish_reason": "stop" }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
    }))
}

#[tokio::test]
async fn structured_request_sends_schema_and_returns_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "openai/gpt-4o-mini",
            "response_format": { "type": "json_schema", "json_schema": { "name": "CoreConcept", "strict": true } }
        })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "{\"problem\":\"P\",\"innovation\":\"I\",\"feasibility\":\"F\"}"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = GenerationRequest::new("study app")
        .with_instructions(["Extract the core concept."])
        .with_response_schema(CoreConcept::response_schema());
    let response = client_for(&server).generate(request).await.unwrap();

    let concept = CoreConcept::parse(response.text().unwrap()).unwrap();
    assert_eq!(concept.problem, "P");
    assert_eq!(response.usage_metadata.unwrap().total_token_count, 20);
}

#[tokio::test]
async fn granted_lookup_answers_tool_calls_before_final_message() {
    let server = MockServer::start().await;

    // Second round: the request now carries the tool result.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"role\":\"tool\""))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "The market is worth $1B."
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "tools": [{ "type": "function", "function": { "name": "google_search" } }] })))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": { "name": "google_search", "arguments": "{\"query\":\"focus app market size\"}" }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = Arc::new(RecordingLookup { queries: Mutex::new(Vec::new()) });
    let request = GenerationRequest::new("focus app").with_lookup(lookup.clone());
    let response = client_for(&server).generate(request).await.unwrap();

    assert_eq!(response.text(), Some("The market is worth $1B."));
    assert_eq!(*lookup.queries.lock().unwrap(), vec!["focus app market size".to_string()]);
    assert_eq!(response.usage_metadata.unwrap().total_token_count, 40);
}

#[tokio::test]
async fn provider_error_is_reported_as_model_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).generate(GenerationRequest::new("x")).await.unwrap_err();
    match err {
        IdeaError::Model(message) => {
            assert!(message.contains("400"));
            assert!(message.contains("bad request"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(
        OpenRouterConfig::new("test-key", "m").with_base_url(server.uri()),
    )
    .unwrap()
    .with_retry_policy(RetryPolicy::immediate(3));

    assert!(client.generate(GenerationRequest::new("x")).await.is_err());
}

#[tokio::test]
async fn retryable_status_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion(json!({ "role": "assistant", "content": "recovered" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenRouterClient::new(
        OpenRouterConfig::new("test-key", "m").with_base_url(server.uri()),
    )
    .unwrap()
    .with_retry_policy(RetryPolicy::immediate(3));

    let response = client.generate(GenerationRequest::new("x")).await.unwrap();
    assert_eq!(response.text(), Some("recovered"));
}

#[test]
fn empty_api_key_is_rejected() {
    let result = OpenRouterClient::new(OpenRouterConfig::new(" ", "m"));
    assert!(matches!(result, Err(IdeaError::Config(_))));
}
