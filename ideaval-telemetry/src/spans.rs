//! Span helpers for pipeline operations
//!
//! Pre-configured spans for instrumenting runs, stages, model calls and lookups.

use tracing::Span;

/// Create a span for one pipeline run
///
/// # Example
/// ```
/// use ideaval_telemetry::pipeline_run_span;
/// let span = pipeline_run_span("run-123");
/// let _enter = span.enter();
/// ```
pub fn pipeline_run_span(run_id: &str) -> Span {
    tracing::info_span!("pipeline.run", run.id = run_id, otel.kind = "internal")
}

/// Create a span for a single stage of a run
pub fn stage_span(stage_name: &str) -> Span {
    tracing::info_span!("pipeline.stage", stage.name = stage_name, otel.kind = "internal")
}

/// Create a span for model API calls
///
/// # Example
/// ```
/// use ideaval_telemetry::model_call_span;
/// let span = model_call_span("openai/gpt-4o-mini");
/// let _enter = span.enter();
/// ```
pub fn model_call_span(model_name: &str) -> Span {
    tracing::info_span!("model.call", model.name = model_name, otel.kind = "client")
}

pub fn lookup_span(provider: &str) -> Span {
    tracing::debug_span!("lookup.search", lookup.provider = provider, otel.kind = "client")
}

pub fn calendar_span(operation: &str) -> Span {
    tracing::info_span!("calendar.request", calendar.operation = operation, otel.kind = "client")
}
