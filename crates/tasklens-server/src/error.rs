//! Error types for the Tasklens Server
//!
//! These cover startup and serving. Per-request failures are `CoreError`s
//! turned into responses by `api::errors`.

use thiserror::Error;

use tasklens_kb::{ConfigError, EmbeddingError, StateStoreError};

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The record store could not be reached at startup
    #[error("Record store unavailable: {0}")]
    Store(#[from] StateStoreError),

    /// The embedding backend failed its startup check
    #[error("Embedding backend unavailable: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Binding or serving failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ServerError::from(ConfigError::Missing("OPENAI_API_KEY".to_string()));
        assert!(err.to_string().starts_with("Configuration error:"));
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
