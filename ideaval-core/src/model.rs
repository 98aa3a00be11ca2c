use crate::{Result, WebLookup};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Text generation port.
///
/// One call is one complete generation: adapters that talk to streaming or
/// tool-calling APIs resolve all of that internally and hand back the final
/// content only.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
}

/// Named JSON schema the generated content is expected to conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSchema {
    pub name: String,
    pub schema: serde_json::Value,
}

impl ResponseSchema {
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self { name: name.into(), schema }
    }
}

#[derive(Clone, Default)]
pub struct GenerationRequest {
    pub instructions: Vec<String>,
    pub context: String,
    pub response_schema: Option<ResponseSchema>,
    /// Lookup the generator may call before answering. `None` means the
    /// generation must be answered from the context alone.
    pub lookup: Option<Arc<dyn WebLookup>>,
}

impl GenerationRequest {
    pub fn new(context: impl Into<String>) -> Self {
        Self { context: context.into(), ..Default::default() }
    }

    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the response schema for structured output.
    pub fn with_response_schema(mut self, schema: ResponseSchema) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn WebLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// All instruction lines joined into a single system prompt.
    pub fn system_prompt(&self) -> String {
        self.instructions.join("\n")
    }
}

impl fmt::Debug for GenerationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationRequest")
            .field("instructions", &self.instructions)
            .field("context", &self.context)
            .field("response_schema", &self.response_schema.as_ref().map(|s| &s.name))
            .field("lookup", &self.lookup.as_ref().map(|l| l.name().to_string()))
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub content: Option<String>,
    pub usage_metadata: Option<UsageMetadata>,
    pub finish_reason: Option<FinishReason>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other,
}

impl GenerationResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage_metadata: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// A response that carries no content at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the content if it contains anything besides whitespace.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|text| !text.trim().is_empty())
    }
}
