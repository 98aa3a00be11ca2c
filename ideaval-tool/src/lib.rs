//! # ideaval-tool
//!
//! Web lookup adapters for the research stages of the pipeline.
//!
//! - [`GoogleSearchClient`] - Google Custom Search JSON API
//! - [`MockLookup`] - Fixed answers for tests
//!
//! ```rust,no_run
//! use ideaval_tool::{GoogleSearchClient, GoogleSearchConfig};
//!
//! let search = GoogleSearchClient::new(GoogleSearchConfig::new(
//!     std::env::var("GOOGLE_SEARCH_API_KEY").unwrap(),
//!     std::env::var("GOOGLE_SEARCH_ENGINE_ID").unwrap(),
//! ))
//! .unwrap();
//! ```

pub mod google_search;
pub mod mock;

pub use google_search::{GOOGLE_SEARCH_API_BASE, GoogleSearchClient, GoogleSearchConfig};
pub use ideaval_core::WebLookup;
pub use mock::MockLookup;
