//! Core data structures

pub mod types;
pub mod identifiers;
pub mod request_context;
pub mod errors;

pub use types::{EmbeddingVector, TextRecord, StoredEmbedding, ScoredResult, compose_text};
pub use identifiers::{RecordId, RequestId};
pub use request_context::RequestContext;
pub use errors::{CoreError, EmbeddingError, StateStoreError, ConfigError};
