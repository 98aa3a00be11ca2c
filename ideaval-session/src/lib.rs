//! # ideaval-session
//!
//! Persistence for finished validation runs.
//!
//! Runs are keyed by a session id derived from the idea text (see
//! [`generate_session_id`]), so validating the same idea again replaces the
//! previous run.
//!
//! - [`InMemoryRunStore`] - process-local, for tests and the HTTP server default
//! - `SqliteRunStore` - file-backed, behind the `sqlite` feature

pub mod id;
pub mod inmemory;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use id::{MAX_SESSION_ID_LEN, generate_session_id};
pub use inmemory::InMemoryRunStore;
pub use store::{RunStore, StoredRun};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRunStore;
