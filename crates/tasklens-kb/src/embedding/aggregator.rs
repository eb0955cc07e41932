//! Text-to-vector aggregation
//!
//! Chunks a text, embeds every chunk with the configured generator and
//! reduces the chunk vectors to their element-wise mean.

use futures::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use super::chunker::{chunk_text, ChunkerConfig};
use crate::data::{EmbeddingError, EmbeddingVector, RequestContext};
use crate::traits::EmbeddingGenerator;

pub const DEFAULT_CHUNK_CONCURRENCY: usize = 4;

/// Vector for a text plus how many chunks it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedEmbedding {
    pub vector: EmbeddingVector,
    pub chunks: usize,
}

/// Produces one fixed-length vector per text, whatever its length.
#[derive(Clone)]
pub struct EmbeddingAggregator {
    generator: Arc<dyn EmbeddingGenerator>,
    chunker: ChunkerConfig,
    concurrency: usize,
}

impl EmbeddingAggregator {
    pub fn new(generator: Arc<dyn EmbeddingGenerator>, chunker: ChunkerConfig) -> Self {
        Self {
            generator,
            chunker,
            concurrency: DEFAULT_CHUNK_CONCURRENCY,
        }
    }

    /// Caps how many chunk embeddings are in flight at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Embeds `text`, averaging over its chunks.
    pub async fn embed(&self, text: &str, ctx: &RequestContext) -> Result<EmbeddingVector, EmbeddingError> {
        self.embed_with_stats(text, ctx).await.map(|aggregated| aggregated.vector)
    }

    /// Same as [`embed`](Self::embed) but also reports the chunk count.
    pub async fn embed_with_stats(
        &self,
        text: &str,
        ctx: &RequestContext,
    ) -> Result<AggregatedEmbedding, EmbeddingError> {
        let started = Instant::now();
        let chunks = chunk_text(text, &self.chunker);
        let chunk_count = chunks.len();

        // `buffered` keeps results in chunk order regardless of completion order
        let vectors: Vec<EmbeddingVector> = stream::iter(chunks)
            .map(|chunk| {
                let generator = Arc::clone(&self.generator);
                async move { generator.generate_embedding(&chunk).await }
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        let vector = mean_vector(&vectors)?;

        debug!(
            request_id = %ctx.request_id,
            chunks = chunk_count,
            dimensions = vector.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Aggregated text embedding"
        );

        Ok(AggregatedEmbedding {
            vector,
            chunks: chunk_count,
        })
    }
}

/// Element-wise arithmetic mean of equally sized vectors.
///
/// Sums in f64 and narrows once at the end, so a single vector comes back
/// bit-for-bit unchanged.
pub fn mean_vector(vectors: &[EmbeddingVector]) -> Result<EmbeddingVector, EmbeddingError> {
    let first = vectors.first().ok_or(EmbeddingError::EmptyEmbedding)?;
    let dimensions = first.len();
    if dimensions == 0 {
        return Err(EmbeddingError::EmptyEmbedding);
    }

    let mut sums = vec![0.0f64; dimensions];
    for vector in vectors {
        if vector.len() != dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimensions,
                actual: vector.len(),
            });
        }
        for (sum, value) in sums.iter_mut().zip(vector) {
            *sum += f64::from(*value);
        }
    }

    let count = vectors.len() as f64;
    Ok(sums.into_iter().map(|sum| (sum / count) as f32).collect())
}
