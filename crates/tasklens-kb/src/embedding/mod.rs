//! Embedding backends, chunking and aggregation

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::data::{ConfigError, EmbeddingError};
use crate::traits::EmbeddingGenerator;

pub mod aggregator;
pub mod chunker;
mod mock;
mod tei;
#[cfg(feature = "openai")]
mod openai;

pub use aggregator::{mean_vector, AggregatedEmbedding, EmbeddingAggregator, DEFAULT_CHUNK_CONCURRENCY};
pub use chunker::{chunk_text, ChunkerConfig, DEFAULT_MAX_WORDS, DEFAULT_OVERLAP_WORDS};
pub use mock::MockEmbeddingService;
pub use tei::TeiEmbeddingService;
#[cfg(feature = "openai")]
pub use openai::OpenAIEmbeddingService;

pub const DEFAULT_TEI_URL: &str = "http://localhost:8080";
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";

/// Configuration for embedding services
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingServiceConfig {
    /// HuggingFace text-embeddings-inference server
    Tei {
        url: String,
        model: String,
        timeout: Duration,
    },
    /// Use OpenAI API for embeddings
    OpenAI {
        api_key: String,
        model: String,
    },
    /// Use mock embeddings for development and testing
    Mock {
        dimensions: usize,
    },
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self::Tei {
            url: DEFAULT_TEI_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl EmbeddingServiceConfig {
    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Tei { .. } => "tei",
            Self::OpenAI { .. } => "openai",
            Self::Mock { .. } => "mock",
        }
    }
}

/// Create an embedding service from the provided configuration
pub fn create_embedding_service(
    config: EmbeddingServiceConfig,
) -> Result<Arc<dyn EmbeddingGenerator>, ConfigError> {
    match config {
        EmbeddingServiceConfig::Tei { url, model, timeout } => {
            let service = TeiEmbeddingService::new(&url, model, timeout).map_err(|e| {
                ConfigError::InvalidValue {
                    key: "EMBEDDING_URL".to_string(),
                    value: format!("{} ({})", url, e),
                }
            })?;
            Ok(Arc::new(service))
        }
        #[cfg(feature = "openai")]
        EmbeddingServiceConfig::OpenAI { api_key, model } => {
            if api_key.trim().is_empty() {
                return Err(ConfigError::Missing("OPENAI_API_KEY".to_string()));
            }
            Ok(Arc::new(OpenAIEmbeddingService::new(api_key, model)))
        }
        #[cfg(not(feature = "openai"))]
        EmbeddingServiceConfig::OpenAI { .. } => Err(ConfigError::Unsupported {
            kind: "embedding provider (build without the 'openai' feature)".to_string(),
            value: "openai".to_string(),
        }),
        EmbeddingServiceConfig::Mock { dimensions } => Ok(Arc::new(MockEmbeddingService::new(dimensions))),
    }
}

/// Embeds a fixed text to verify the backend before serving.
///
/// Returns the backend's dimensionality.
pub async fn probe_embedding_service(generator: &dyn EmbeddingGenerator) -> Result<usize, EmbeddingError> {
    let vector = generator.generate_embedding("healthcheck").await?;
    if vector.is_empty() {
        return Err(EmbeddingError::EmptyEmbedding);
    }
    info!(model = generator.model_name(), dimensions = vector.len(), "Embedding backend ready");
    Ok(vector.len())
}
