//! Error types for QueryIQ

use thiserror::Error;

/// Core error type for QueryIQ operations
#[derive(Error, Debug)]
pub enum QueryIqError {
    /// The query text was empty or otherwise unanalyzable. This is the only
    /// condition `analyze` surfaces as a hard failure; malformed plans and
    /// model faults degrade instead.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for QueryIQ operations
pub type Result<T> = std::result::Result<T, QueryIqError>;
