//! HTTP front end.
//!
//! - `GET /health`
//! - `POST /api/validate` with `{"idea": "..."}`
//! - `GET /api/runs?limit=N` and `GET /api/runs/{session_id}` for stored runs

use crate::validate::validate_idea;
use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ideaval_pipeline::{ValidationOutcome, ValidationPipeline};
use ideaval_session::{RunStore, StoredRun};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ValidationPipeline>,
    pub store: Arc<dyn RunStore>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub idea: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub session_id: String,
    pub outcome: ValidationOutcome,
    /// The report, or the message to show when there is none.
    pub report: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    20
}

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl From<ideaval_core::IdeaError> for ApiError {
    fn from(e: ideaval_core::IdeaError) -> Self {
        tracing::error!(error = %e, "request failed");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/validate", post(validate))
        .route("/api/runs", get(list_runs))
        .route("/api/runs/{session_id}", get(get_run))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let idea = request.idea.trim();
    if idea.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "please enter an app idea"));
    }

    let (session_id, run) = validate_idea(&state.pipeline, Some(state.store.as_ref()), idea).await;
    Ok(Json(ValidateResponse { session_id, report: run.outcome.to_string(), outcome: run.outcome }))
}

async fn list_runs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StoredRun>>, ApiError> {
    Ok(Json(state.store.list(query.limit).await?))
}

async fn get_run(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    match state.store.load(&session_id).await? {
        Some(run) => Ok(Json(run).into_response()),
        None => Err(ApiError::new(StatusCode::NOT_FOUND, format!("no run for session {session_id}"))),
    }
}

pub async fn run_serve(state: AppState, port: u16) -> Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "ideaval server listening");
    println!("ideaval server starting on http://{}", addr);
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app).await?;

    Ok(())
}
