//! Typed results of the shaped pipeline stages.
//!
//! Each record knows its JSON schema (sent to the generator as the expected
//! response shape) and how to parse generated content back into itself. Parsing
//! is the shape-conformance check: every field must be present, be a string and
//! hold something other than whitespace.

use crate::{ResponseSchema, StageError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

pub trait StageRecord: Serialize + DeserializeOwned + Sized {
    /// Shape name used in schemas and error messages.
    const NAME: &'static str;

    /// Required fields as `(name, description)` pairs.
    const FIELDS: &'static [(&'static str, &'static str)];

    fn description() -> &'static str;

    fn schema() -> Value {
        let properties: Map<String, Value> = Self::FIELDS
            .iter()
            .map(|(name, description)| {
                ((*name).to_string(), json!({ "type": "string", "description": description }))
            })
            .collect();
        let required: Vec<&str> = Self::FIELDS.iter().map(|(name, _)| *name).collect();

        json!({
            "type": "object",
            "description": Self::description(),
            "properties": properties,
            "required": required,
        })
    }

    fn response_schema() -> ResponseSchema {
        ResponseSchema::new(Self::NAME, Self::schema())
    }

    fn parse(content: &str) -> Result<Self, StageError> {
        let mismatch =
            |reason: String| StageError::ShapeMismatch { expected: Self::NAME, reason };

        let value: Value = serde_json::from_str(strip_code_fence(content))
            .map_err(|e| mismatch(format!("not valid JSON: {e}")))?;
        let object = value.as_object().ok_or_else(|| mismatch("not a JSON object".to_string()))?;

        for (field, _) in Self::FIELDS {
            match object.get(*field) {
                None | Some(Value::Null) => return Err(mismatch(format!("missing field `{field}`"))),
                Some(Value::String(text)) if text.trim().is_empty() => {
                    return Err(mismatch(format!("field `{field}` is empty")));
                }
                Some(Value::String(_)) => {}
                Some(_) => return Err(mismatch(format!("field `{field}` is not a string"))),
            }
        }

        serde_json::from_value(value).map_err(|e| mismatch(e.to_string()))
    }
}

/// Models like to wrap JSON answers in a markdown fence even when asked not to.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        Some((tag, body)) if !tag.contains('{') => body.trim(),
        _ => rest.trim(),
    }
}

/// The core concept of an app idea, extracted by the first stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConcept {
    pub problem: String,
    pub innovation: String,
    pub feasibility: String,
}

impl StageRecord for CoreConcept {
    const NAME: &'static str = "CoreConcept";
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("problem", "The problem the app solves."),
        ("innovation", "The innovative aspect of the app."),
        ("feasibility", "Technical and operational feasibility of the app."),
    ];

    fn description() -> &'static str {
        "The core concept of the app idea"
    }
}

/// Market research for an app idea, produced by the second stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub addressable_market: String,
    pub user_segment: String,
    pub market_trends: String,
}

impl StageRecord for MarketAnalysis {
    const NAME: &'static str = "MarketAnalysis";
    const FIELDS: &'static [(&'static str, &'static str)] = &[
        ("addressable_market", "Total addressable market size in monetary units."),
        ("user_segment", "Target user segment of the app."),
        ("market_trends", "Market trends relevant to the app."),
    ];

    fn description() -> &'static str {
        "Market analysis for the app idea"
    }
}
