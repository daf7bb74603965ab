//! Error types for skypad-search.

/// Alias for Results returning [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;

/// Top-level error type for skypad-search.
///
/// Read paths in [`crate::search`] never surface these to their callers;
/// they are logged and degrade to a fallback or an empty result. Write
/// paths (schema setup, ingestion) propagate them.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Embedder error: {0}")]
    Embedder(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl From<neo4rs::Error> for SearchError {
    fn from(err: neo4rs::Error) -> Self {
        SearchError::Driver(err.to_string())
    }
}

impl From<neo4rs::DeError> for SearchError {
    fn from(err: neo4rs::DeError) -> Self {
        SearchError::Driver(format!("row decode: {err}"))
    }
}
