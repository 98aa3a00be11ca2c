//! # ideaval-model
//!
//! Text generator adapters for the app idea validator.
//!
//! ## Overview
//!
//! - [`OpenRouterClient`] - OpenRouter (or any OpenAI-compatible endpoint), with
//!   structured output and lookup tool calling
//! - [`MockGenerator`] - Scripted generator for tests
//!
//! Retry and backoff belong to the adapters, never to the pipeline; see
//! [`RetryPolicy`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ideaval_model::openrouter::{OpenRouterClient, OpenRouterConfig};
//!
//! let api_key = std::env::var("OPENROUTER_API_KEY").unwrap();
//! let model = OpenRouterClient::new(OpenRouterConfig::new(api_key, "openai/gpt-4o-mini")).unwrap();
//! ```

pub mod mock;
#[cfg(feature = "openrouter")]
pub mod openrouter;
pub mod retry;

pub use mock::MockGenerator;
#[cfg(feature = "openrouter")]
pub use openrouter::{OpenRouterClient, OpenRouterConfig};
pub use retry::RetryPolicy;
