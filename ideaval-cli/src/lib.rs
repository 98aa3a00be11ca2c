//! # ideaval-cli
//!
//! Command-line and HTTP front end for the app idea validator.
//!
//! ## Commands
//!
//! - `ideaval validate [IDEA]` - run the pipeline and print the report
//! - `ideaval history` - list stored runs
//! - `ideaval serve --port 8080` - JSON API over the same pipeline
//! - `ideaval calendar today|create` - Google Calendar helpers
//!
//! Configuration is read from an optional TOML file, then `.env` and the
//! process environment, then command-line flags. See [`AppConfig`].

pub mod calendar;
pub mod cli;
pub mod config;
pub mod history;
pub mod serve;
pub mod validate;

pub use cli::{CalendarCommand, Cli, Commands};
pub use config::{AppConfig, otlp_endpoint};
pub use serve::{AppState, router};
