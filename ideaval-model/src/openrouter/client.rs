//! OpenRouter client implementation.

use super::config::OpenRouterConfig;
use super::convert::{self, ChatCompletionRequest, ChatCompletionResponse, Message, ToolCall};
use crate::retry::{AttemptError, RetryPolicy, parse_retry_after, with_retries};
use async_trait::async_trait;
use ideaval_core::{
    GenerationRequest, GenerationResponse, IdeaError, Result, SEARCH_TOOL_NAME, TextGenerator,
    WebLookup,
};
use reqwest::Client;
use tracing::Instrument;

/// Text generator backed by OpenRouter's OpenAI-compatible chat completions.
///
/// When a request grants lookup access, the `google_search` function is offered
/// to the model and tool calls are answered from the lookup until the model
/// produces its final message or `max_tool_rounds` is reached.
///
/// # Example
///
/// ```rust,ignore
/// use ideaval_model::openrouter::{OpenRouterClient, OpenRouterConfig};
///
/// let client = OpenRouterClient::new(OpenRouterConfig::new(
///     std::env::var("OPENROUTER_API_KEY")?,
///     "openai/gpt-4o-mini",
/// ))?;
/// ```
pub struct OpenRouterClient {
    client: Client,
    config: OpenRouterConfig,
    retry_policy: RetryPolicy,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(IdeaError::Config("OpenRouter API key is empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| IdeaError::Model(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config, retry_policy: RetryPolicy::default() })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.config.effective_base_url().trim_end_matches('/'))
    }

    fn build_request(
        &self,
        request: &GenerationRequest,
        messages: Vec<Message>,
        offer_tools: bool,
    ) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            tools: offer_tools.then(|| vec![convert::search_tool()]),
            response_format: request.response_schema.as_ref().map(convert::response_format),
        }
    }

    async fn send(&self, chat_request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        let api_url = self.api_url();
        let api_url = api_url.as_str();
        with_retries(&self.retry_policy, |attempt| self.send_once(api_url, chat_request, attempt))
            .await
    }

    async fn send_once(
        &self,
        api_url: &str,
        chat_request: &ChatCompletionRequest,
        attempt: u32,
    ) -> std::result::Result<ChatCompletionResponse, AttemptError> {
        let mut builder =
            self.client.post(api_url).bearer_auth(&self.config.api_key).json(chat_request);
        if let Some(title) = &self.config.app_title {
            builder = builder.header("X-Title", title);
        }

        let response = builder.send().await.map_err(|e| {
            let transient = e.is_timeout() || e.is_connect();
            let error = IdeaError::Model(format!("OpenRouter request failed: {}", e.without_url()));
            if transient {
                AttemptError::Transient { error, retry_after: None }
            } else {
                AttemptError::Fatal(error)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let error_text = response.text().await.unwrap_or_default();
            tracing::debug!(attempt, status = status.as_u16(), "OpenRouter returned an error");
            return Err(AttemptError::from_status(
                status.as_u16(),
                retry_after,
                IdeaError::Model(format!("OpenRouter API error ({}): {}", status, error_text)),
            ));
        }

        response.json::<ChatCompletionResponse>().await.map_err(|e| {
            AttemptError::Fatal(IdeaError::Model(format!(
                "Failed to parse OpenRouter response: {}",
                e.without_url()
            )))
        })
    }

    async fn answer_tool_call(&self, lookup: &dyn WebLookup, call: &ToolCall) -> String {
        if call.function.name != SEARCH_TOOL_NAME {
            return format!("Unknown function `{}`.", call.function.name);
        }
        let Some(query) = convert::search_query(call) else {
            return "Invalid arguments: expected a JSON object with a `query` string.".to_string();
        };

        match lookup.search(&query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "lookup failed during generation");
                format!("Search failed: {e}")
            }
        }
    }

    async fn generate_inner(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let mut messages = convert::initial_messages(&request);
        let mut usage = None;
        let mut round = 0;

        loop {
            let offer_tools = request.lookup.is_some() && round < self.config.max_tool_rounds;
            let chat_request = self.build_request(&request, messages.clone(), offer_tools);
            let response = self.send(&chat_request).await?;
            usage = convert::accumulate_usage(usage, response.usage.as_ref());

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| IdeaError::Model("OpenRouter returned no choices".to_string()))?;
            let finish_reason = choice.finish_reason.as_deref().map(convert::convert_finish_reason);
            let message = choice.message.unwrap_or_default();

            let tool_calls = message.tool_calls.clone().unwrap_or_default();
            match (&request.lookup, offer_tools && !tool_calls.is_empty()) {
                (Some(lookup), true) => {
                    tracing::debug!(round, calls = tool_calls.len(), "answering lookup tool calls");
                    messages.push(Message {
                        role: "assistant".to_string(),
                        content: message.content,
                        tool_calls: Some(tool_calls.clone()),
                        tool_call_id: None,
                    });
                    for call in &tool_calls {
                        let result = self.answer_tool_call(lookup.as_ref(), call).await;
                        messages.push(Message::tool(call.id.clone(), result));
                    }
                    round += 1;
                }
                _ => {
                    return Ok(GenerationResponse {
                        content: message.content,
                        usage_metadata: usage,
                        finish_reason,
                    });
                }
            }
        }
    }
}

#[async_trait]
impl TextGenerator for OpenRouterClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let span = ideaval_telemetry::model_call_span(&self.config.model);
        self.generate_inner(request).instrument(span).await
    }
}
