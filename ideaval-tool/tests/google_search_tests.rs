use ideaval_core::{IdeaError, WebLookup};
use ideaval_tool::{GoogleSearchClient, GoogleSearchConfig};
use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GoogleSearchClient {
    GoogleSearchClient::new(
        GoogleSearchConfig::new("search-key", "engine-1")
            .with_num_results(3)
            .with_base_url(server.uri()),
    )
    .unwrap()
}

#[tokio::test]
async fn search_sends_credentials_and_formats_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("key", "search-key"))
        .and(query_param("cx", "engine-1"))
        .and(query_param("q", "study app competitors"))
        .and(query_param("num", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "title": "Quizlet", "link": "https://quizlet.com", "snippet": "Flashcards" },
                { "title": "Anki", "link": "https://apps.ankiweb.net", "snippet": "Spaced repetition" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server).search("study app competitors").await.unwrap();
    assert!(text.contains("1. Quizlet"));
    assert!(text.contains("2. Anki"));
    assert!(text.contains("https://apps.ankiweb.net"));
}

#[tokio::test]
async fn empty_result_page_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "customsearch#search" })))
        .mount(&server)
        .await;

    let text = client_for(&server).search("nothing").await.unwrap();
    assert_eq!(text, "No results found for \"nothing\".");
}

#[tokio::test]
async fn http_error_maps_to_lookup_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota"))
        .mount(&server)
        .await;

    let err = client_for(&server).search("x").await.unwrap_err();
    assert!(matches!(err, IdeaError::Lookup(message) if message.contains("quota")));
}

#[tokio::test]
async fn transport_error_does_not_expose_api_key() {
    let client = GoogleSearchClient::new(
        GoogleSearchConfig::new("SECRET-KEY-123", "cx").with_base_url("http://127.0.0.1:1/customsearch"),
    )
    .unwrap();

    let err = client.search("focus apps").await.unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, IdeaError::Lookup(_)));
    assert!(!message.contains("SECRET-KEY-123"), "key leaked: {message}");
    assert!(!message.contains("key="));
}

#[tokio::test]
async fn malformed_body_does_not_expose_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = GoogleSearchClient::new(
        GoogleSearchConfig::new("SECRET-KEY-123", "cx").with_base_url(server.uri()),
    )
    .unwrap();

    let message = client.search("focus apps").await.unwrap_err().to_string();
    assert!(message.contains("Failed to parse search response"));
    assert!(!message.contains("SECRET-KEY-123"));
}
