//! Tasklens knowledge base core
//!
//! Turns task records into fixed-length embeddings (chunking long text and
//! averaging the chunk vectors), stores them on the records and ranks stored
//! records by cosine similarity to a query.

// Core modules
pub mod data;
pub mod traits;
pub mod services;
pub mod embedding;
pub mod storage;

// Store adapters, compiled in per feature
pub mod adapters;

// Testing utilities, also exported to dependent crates via the `test-utils` feature
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export key types for convenient usage
pub use data::{
    compose_text, ConfigError, CoreError, EmbeddingError, EmbeddingVector, RecordId, RequestContext, RequestId,
    ScoredResult, StateStoreError, StoredEmbedding, TextRecord,
};

// Re-export core traits
pub use traits::{EmbeddingGenerator, StateStore};

// Re-export embedding services
#[cfg(feature = "openai")]
pub use embedding::OpenAIEmbeddingService;
pub use embedding::{
    create_embedding_service, probe_embedding_service, ChunkerConfig, EmbeddingAggregator, EmbeddingServiceConfig,
    MockEmbeddingService, TeiEmbeddingService,
};

// Re-export storage
pub use storage::{create_state_store, MemoryStateStore, StoreConfig};

// Re-export core services
pub use services::{
    EmbedTaskRequest, IngestionOutcome, IngestionService, QueryService, ReembedReport, SearchOptions, SearchRequest,
    SearchResponse,
};
