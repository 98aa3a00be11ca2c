use async_trait::async_trait;
use ideaval_core::Result;
use ideaval_pipeline::PipelineRun;
use serde::{Deserialize, Serialize};

/// A persisted run and the session it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRun {
    pub session_id: String,
    pub run: PipelineRun,
}

#[async_trait]
pub trait RunStore: Send + Sync {
    /// Store a run under `session_id`, replacing any earlier run of that session.
    async fn persist(&self, session_id: &str, run: &PipelineRun) -> Result<()>;
    async fn load(&self, session_id: &str) -> Result<Option<PipelineRun>>;
    /// Most recently finished runs first.
    async fn list(&self, limit: usize) -> Result<Vec<StoredRun>>;
}
