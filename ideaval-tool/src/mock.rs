use async_trait::async_trait;
use ideaval_core::{IdeaError, Result, WebLookup};
use std::sync::Mutex;

/// Lookup returning a fixed answer (or a fixed failure), recording every query.
pub struct MockLookup {
    answer: std::result::Result<String, String>,
    queries: Mutex<Vec<String>>,
}

impl MockLookup {
    pub fn new(answer: impl Into<String>) -> Self {
        Self { answer: Ok(answer.into()), queries: Mutex::new(Vec::new()) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self { answer: Err(message.into()), queries: Mutex::new(Vec::new()) }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebLookup for MockLookup {
    fn name(&self) -> &str {
        "mock_lookup"
    }

    async fn search(&self, query: &str) -> Result<String> {
        self.queries.lock().unwrap().push(query.to_string());
        self.answer.clone().map_err(IdeaError::Lookup)
    }
}
