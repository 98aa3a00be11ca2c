use crate::{RunStore, StoredRun};
use async_trait::async_trait;
use ideaval_core::{IdeaError, Result};
use ideaval_pipeline::PipelineRun;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Clone, Default)]
pub struct InMemoryRunStore {
    runs: Arc<RwLock<HashMap<String, PipelineRun>>>,
}

impl InMemoryRunStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.runs.read().map(|runs| runs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> IdeaError {
    IdeaError::Store("run store lock poisoned".to_string())
}

#[async_trait]
impl RunStore for InMemoryRunStore {
    async fn persist(&self, session_id: &str, run: &PipelineRun) -> Result<()> {
        let mut runs = self.runs.write().map_err(poisoned)?;
        runs.insert(session_id.to_string(), run.clone());
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<PipelineRun>> {
        let runs = self.runs.read().map_err(poisoned)?;
        Ok(runs.get(session_id).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<StoredRun>> {
        let runs = self.runs.read().map_err(poisoned)?;
        let mut stored: Vec<StoredRun> = runs
            .iter()
            .map(|(session_id, run)| StoredRun { session_id: session_id.clone(), run: run.clone() })
            .collect();
        stored.sort_by(|a, b| {
            b.run.finished_at.cmp(&a.run.finished_at).then_with(|| a.session_id.cmp(&b.session_id))
        });
        stored.truncate(limit);
        Ok(stored)
    }
}
