//! # ideaval-telemetry
//!
//! Structured logging and distributed tracing for the app idea validator.
//!
//! ## Features
//! - Structured logging with `tracing`, pretty or JSON
//! - OpenTelemetry OTLP export for tracing backends
//! - Span helpers for runs, stages, model calls and lookups
//!
//! ## Usage
//!
//! ```rust
//! use ideaval_telemetry::{LogFormat, info, init_telemetry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry("ideaval", LogFormat::Pretty)?;
//!     info!("ready");
//!     Ok(())
//! }
//! ```

pub mod init;
pub mod spans;

// Re-export tracing macros for convenience
pub use tracing::{Instrument, Span, debug, error, info, instrument, trace, warn};

pub use spans::*;

pub use init::{LogFormat, init_telemetry, init_with_otlp, shutdown_telemetry};
