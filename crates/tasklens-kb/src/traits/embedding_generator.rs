//! EmbeddingGenerator trait definition for vector embeddings

use async_trait::async_trait;

use crate::data::{EmbeddingError, EmbeddingVector};

/// Represents the interface for generating vector embeddings from text.
///
/// Implementations wrap an embedding model. Every call on the same instance
/// must return vectors of the same length.
#[async_trait]
pub trait EmbeddingGenerator: Send + Sync {
    /// Generates an embedding vector for the given text.
    async fn generate_embedding(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;

    /// Name of the model behind this generator, for logs and health output.
    fn model_name(&self) -> &str;
}
