//! Error types for the tasklens knowledge base

use thiserror::Error;

/// Failure raised while turning text into a vector.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding backend error: {0}")]
    Backend(String),

    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("Embedding backend returned an empty vector")]
    EmptyEmbedding,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Embedding has zero magnitude")]
    ZeroMagnitude,

    #[error("Invalid embedding input: {0}")]
    InvalidInput(String),
}

/// Specific error type for the record store.
#[derive(Error, Debug)]
pub enum StateStoreError {
    #[error("Record store connection error: {0}")]
    ConnectionError(String),
    #[error("Record store query error: {0}")]
    QueryError(String),
    #[error("Data mapping error from store result: {0}")]
    MappingError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unknown store error: {0}")]
    Unknown(String),
}

/// Convert a String into a StateStoreError::Unknown
impl From<String> for StateStoreError {
    fn from(error: String) -> Self {
        StateStoreError::Unknown(error)
    }
}

/// Invalid or incomplete configuration, detected before serving.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid chunking configuration: overlap ({overlap_words}) must be smaller than max_words ({max_words}) and max_words must be positive")]
    InvalidChunking { max_words: usize, overlap_words: usize },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    Missing(String),

    #[error("Unsupported {kind}: {value}")]
    Unsupported { kind: String, value: String },
}

/// Pipeline boundary error.
///
/// `Validation` is the caller's fault and maps to a 4xx-style response; the
/// other two are backend faults.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{context}: {source}")]
    Embedding {
        context: String,
        #[source]
        source: EmbeddingError,
    },

    #[error("{context}: {source}")]
    Persistence {
        context: String,
        #[source]
        source: StateStoreError,
    },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    /// Helper to wrap an embedding failure with what was being embedded
    pub fn embedding(context: impl Into<String>, source: EmbeddingError) -> Self {
        CoreError::Embedding {
            context: context.into(),
            source,
        }
    }

    /// Helper to wrap a store failure with the operation that failed
    pub fn persistence(context: impl Into<String>, source: StateStoreError) -> Self {
        CoreError::Persistence {
            context: context.into(),
            source,
        }
    }

    /// True when the failure was caused by the request rather than a backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    /// Short machine-friendly name of the error kind, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::Embedding { .. } => "embedding",
            CoreError::Persistence { .. } => "persistence",
        }
    }
}
