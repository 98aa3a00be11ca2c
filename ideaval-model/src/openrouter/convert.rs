//! Wire types and conversions for the OpenAI-compatible chat completions API.

use ideaval_core::{
    FinishReason, GenerationRequest, ResponseSchema, UsageMetadata, search_tool_declaration,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: Some(text.into()), ..Default::default() }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: Some(text.into()), ..Default::default() }
    }

    pub fn tool(tool_call_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(text.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// System message carrying the instructions, then the context as the user turn.
pub fn initial_messages(request: &GenerationRequest) -> Vec<Message> {
    let mut messages = Vec::with_capacity(2);
    if !request.instructions.is_empty() {
        messages.push(Message::system(request.system_prompt()));
    }
    messages.push(Message::user(request.context.clone()));
    messages
}

pub fn search_tool() -> Tool {
    Tool { tool_type: "function".to_string(), function: search_tool_declaration() }
}

/// Strict JSON schema response format. Strict mode requires
/// `additionalProperties: false` on the root object.
pub fn response_format(schema: &ResponseSchema) -> ResponseFormat {
    let mut strict_schema = schema.schema.clone();
    if let Some(obj) = strict_schema.as_object_mut() {
        obj.insert("additionalProperties".to_string(), Value::Bool(false));
    }
    ResponseFormat {
        format_type: "json_schema".to_string(),
        json_schema: JsonSchemaFormat {
            name: schema.name.replace(['-', '.', '/', ' '], "_"),
            strict: true,
            schema: strict_schema,
        },
    }
}

pub fn convert_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "stop" | "tool_calls" => FinishReason::Stop,
        "length" => FinishReason::MaxTokens,
        "content_filter" => FinishReason::Safety,
        _ => FinishReason::Other,
    }
}

/// Adds `usage` to a running total across tool-call rounds.
pub fn accumulate_usage(total: Option<UsageMetadata>, usage: Option<&Usage>) -> Option<UsageMetadata> {
    let Some(usage) = usage else {
        return total;
    };
    let mut total = total.unwrap_or(UsageMetadata {
        prompt_token_count: 0,
        candidates_token_count: 0,
        total_token_count: 0,
    });
    total.prompt_token_count = total.prompt_token_count.saturating_add(usage.prompt_tokens);
    total.candidates_token_count =
        total.candidates_token_count.saturating_add(usage.completion_tokens);
    total.total_token_count = total.total_token_count.saturating_add(usage.total_tokens);
    Some(total)
}

/// Extracts the search query from a tool call's JSON arguments.
pub fn search_query(call: &ToolCall) -> Option<String> {
    let args: Value = serde_json::from_str(&call.function.arguments).ok()?;
    args.get("query").and_then(Value::as_str).map(str::to_string)
}
