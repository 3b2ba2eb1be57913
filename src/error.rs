//! Error types for quote lookups
//!
//! The cache and the extractor never fail; errors only come from query
//! validation, configuration and the network fetch.

use thiserror::Error;

/// Main error type for lookup operations
#[derive(Error, Debug)]
pub enum SearchError {
    /// The query carries no subject after the command keywords
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Transport-level HTTP failure (connection refused, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Operation timeout
    #[error("Operation timed out after {timeout_seconds}s: {context}")]
    TimeoutError {
        timeout_seconds: u64,
        context: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for lookup operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl From<String> for SearchError {
    fn from(s: String) -> Self {
        SearchError::Other(s)
    }
}

impl From<&str> for SearchError {
    fn from(s: &str) -> Self {
        SearchError::Other(s.to_string())
    }
}
