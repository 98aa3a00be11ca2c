#[derive(Debug, thiserror::Error)]
pub enum IdeaError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Lookup error: {0}")]
    Lookup(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IdeaError>;

/// Why a stage produced no result.
///
/// Stages never hand these to the pipeline; they are logged and collapsed into
/// an absent result at the stage boundary.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("generation failed: {0}")]
    Generation(#[source] IdeaError),

    #[error("generation returned no content")]
    EmptyContent,

    #[error("response does not match the {expected} shape: {reason}")]
    ShapeMismatch { expected: &'static str, reason: String },
}
