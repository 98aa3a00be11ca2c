//! OpenRouter provider (OpenAI-compatible chat completions).

mod client;
mod config;
pub(crate) mod convert;

pub use client::OpenRouterClient;
pub use config::{DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MODEL, OPENROUTER_API_BASE, OpenRouterConfig};
