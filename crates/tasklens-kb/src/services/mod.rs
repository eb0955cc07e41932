//! Core services

pub mod ingestion;
pub mod messages;
pub mod query;

// Re-exports
pub use ingestion::IngestionService;
pub use query::QueryService;
pub use messages::{
    EmbedTaskRequest, IngestionOutcome, ReembedReport, SearchOptions, SearchRequest, SearchResponse,
    DEFAULT_MIN_SCORE, DEFAULT_TOP_N,
};
