//! # ideaval-core
//!
//! Core traits and records for the app idea validator.
//!
//! ## Overview
//!
//! This crate provides the abstractions the validation pipeline is written against:
//!
//! - [`TextGenerator`] - The text generation port every stage calls
//! - [`WebLookup`] - The web lookup port granted to research stages
//! - [`CoreConcept`] / [`MarketAnalysis`] - Typed results of the shaped stages
//! - [`IdeaError`] / [`Result`] - Unified error handling for ports and adapters
//! - [`StageError`] - Failure kinds caught at a stage boundary
//!
//! ## Ports
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait TextGenerator: Send + Sync {
//!     fn name(&self) -> &str;
//!     async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;
//! }
//!
//! #[async_trait]
//! pub trait WebLookup: Send + Sync {
//!     fn name(&self) -> &str;
//!     async fn search(&self, query: &str) -> Result<String>;
//! }
//! ```
//!
//! Implementations live in `ideaval-model` and `ideaval-tool`; the pipeline only
//! ever sees these traits.

pub mod error;
pub mod lookup;
pub mod model;
pub mod records;

pub use error::{IdeaError, Result, StageError};
pub use lookup::{SEARCH_TOOL_NAME, WebLookup, search_tool_declaration};
pub use model::{
    FinishReason, GenerationRequest, GenerationResponse, ResponseSchema, TextGenerator,
    UsageMetadata,
};
pub use records::{CoreConcept, MarketAnalysis, StageRecord};
