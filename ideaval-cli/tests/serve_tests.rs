use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use ideaval_core::{GenerationRequest, GenerationResponse};
use ideaval_cli::{AppState, router};
use ideaval_model::MockGenerator;
use ideaval_pipeline::ValidationPipeline;
use ideaval_session::{InMemoryRunStore, RunStore};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn reply(request: &GenerationRequest) -> ideaval_core::Result<GenerationResponse> {
    let text = match request.response_schema.as_ref().map(|s| s.name.as_str()) {
        Some("CoreConcept") => r#"{"problem": "P", "innovation": "I", "feasibility": "F"}"#.to_string(),
        Some("MarketAnalysis") => {
            r#"{"addressable_market": "$1B", "user_segment": "students", "market_trends": "growing"}"#
                .to_string()
        }
        _ if request.system_prompt().contains("Identify direct competitors") => {
            "none found".to_string()
        }
        _ => format!("# Report\n\n{}", request.context),
    };
    Ok(GenerationResponse::new(text))
}

fn app(store: Arc<InMemoryRunStore>) -> axum::Router {
    let generator = Arc::new(MockGenerator::from_fn("scripted", reply));
    let state = AppState { pipeline: Arc::new(ValidationPipeline::new(generator)), store };
    router(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_validate(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/validate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app(Arc::new(InMemoryRunStore::new()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_validate_returns_report_and_records_run() {
    let store = Arc::new(InMemoryRunStore::new());
    let response = app(store.clone())
        .oneshot(post_validate(json!({ "idea": "Study App" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["session_id"], "study-app");
    assert_eq!(json["outcome"]["status"], "report");
    let report = json["report"].as_str().unwrap();
    assert!(report.contains("$1B"));
    assert!(report.contains("none found"));

    let stored = store.load("study-app").await.unwrap().unwrap();
    assert_eq!(stored.idea, "Study App");
}

#[tokio::test]
async fn test_blank_idea_is_rejected() {
    let store = Arc::new(InMemoryRunStore::new());
    let response = app(store.clone()).oneshot(post_validate(json!({ "idea": "  " }))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_runs_endpoints() {
    let store = Arc::new(InMemoryRunStore::new());
    let app = app(store);

    let response = app.clone().oneshot(post_validate(json!({ "idea": "Dog walking" }))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/runs?limit=5").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let runs = body_json(response).await;
    assert_eq!(runs.as_array().unwrap().len(), 1);
    assert_eq!(runs[0]["session_id"], "dog-walking");

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/runs/dog-walking").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["core_concept"]["problem"], "P");

    let response = app
        .oneshot(Request::builder().uri("/api/runs/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
