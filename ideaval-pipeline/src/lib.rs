//! # ideaval-pipeline
//!
//! The four-stage app idea validation pipeline.
//!
//! ## Overview
//!
//! An idea flows through four dependent generations:
//!
//! - core concept: problem, innovation and feasibility of the idea
//! - market analysis: addressable market, user segment and trends
//! - competitor review: free-text competitor and SWOT notes
//! - report: the final markdown handed back to the caller
//!
//! The first two stages are required; without them a short failure message is
//! returned. The competitor review is optional and the report stage sees `null`
//! in its place when it produced nothing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ideaval_pipeline::ValidationPipeline;
//! use std::sync::Arc;
//!
//! let pipeline = ValidationPipeline::builder()
//!     .generator(Arc::new(model))
//!     .lookup(Arc::new(search))
//!     .build()?;
//!
//! let outcome = pipeline.validate("A study planner for students").await;
//! println!("{outcome}");
//! ```

pub mod context;
mod pipeline;
mod run;
mod stage;

pub use context::{CompetitorInput, IdeaInput, MarketInput, ReportInput, StageContext};
pub use pipeline::{ValidationPipeline, ValidationPipelineBuilder};
pub use run::{NO_REPORT_MESSAGE, PipelineRun, ValidationOutcome};
pub use stage::{Stage, StageKind};
