//! Deterministic embedding backend for development and tests
//!
//! Words from a small topic lexicon land on a shared "concept" dimension so
//! related task wording scores as similar; every other word is hashed into
//! the remaining dimensions. The result is L2-normalized.

use async_trait::async_trait;

use crate::data::{EmbeddingError, EmbeddingVector};
use crate::traits::EmbeddingGenerator;

const MIN_DIMENSIONS: usize = 32;

const CONCEPTS: &[&[&str]] = &[
    &["buy", "milk", "grocery", "groceries", "shopping", "shop", "bread", "eggs", "food", "supermarket"],
    &["dentist", "doctor", "appointment", "clinic", "checkup", "teeth", "medicine", "health"],
    &["meeting", "report", "email", "deadline", "project", "presentation", "client"],
    &["clean", "laundry", "dishes", "kitchen", "repair", "garden", "vacuum"],
    &["pay", "bill", "bills", "rent", "invoice", "tax", "bank", "budget"],
    &["run", "gym", "workout", "exercise", "yoga", "walk"],
];

/// Mock embedding service that provides deterministic embeddings.
#[derive(Debug, Clone)]
pub struct MockEmbeddingService {
    embedding_dimension: usize,
}

impl MockEmbeddingService {
    /// Creates the mock; dimensions below 32 are raised to 32.
    pub fn new(embedding_dimension: usize) -> Self {
        Self {
            embedding_dimension: embedding_dimension.max(MIN_DIMENSIONS),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.embedding_dimension
    }

    fn generate_deterministic_embedding(&self, text: &str) -> EmbeddingVector {
        let mut embedding = vec![0.0f32; self.embedding_dimension];
        let hashed_dims = self.embedding_dimension - CONCEPTS.len();

        let mut saw_token = false;
        for token in tokens(text) {
            saw_token = true;
            match concept_of(&token) {
                Some(concept) => embedding[concept] += 1.0,
                None => {
                    let slot = CONCEPTS.len() + (fnv1a(&token) % hashed_dims as u64) as usize;
                    embedding[slot] += 1.0;
                }
            }
        }

        if !saw_token {
            // Punctuation-only input still gets a usable direction
            embedding[self.embedding_dimension - 1] = 1.0;
        }

        let magnitude: f32 = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        for value in &mut embedding {
            *value /= magnitude;
        }

        embedding
    }
}

impl Default for MockEmbeddingService {
    fn default() -> Self {
        Self::new(384)
    }
}

#[async_trait]
impl EmbeddingGenerator for MockEmbeddingService {
    async fn generate_embedding(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        Ok(self.generate_deterministic_embedding(text))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|token| !token.is_empty())
}

fn concept_of(token: &str) -> Option<usize> {
    CONCEPTS.iter().position(|words| words.contains(&token))
}

fn fnv1a(token: &str) -> u64 {
    token.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x100000001b3)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_dimensions_and_determinism() {
        let service = MockEmbeddingService::new(64);
        let a = service.generate_embedding("Buy milk").await.unwrap();
        let b = service.generate_embedding("Buy milk").await.unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_small_dimension_is_raised() {
        let service = MockEmbeddingService::new(4);
        assert_eq!(service.dimensions(), 32);
        assert_eq!(service.generate_embedding("x").await.unwrap().len(), 32);
    }

    #[tokio::test]
    async fn test_vectors_are_unit_length() {
        let service = MockEmbeddingService::default();
        for text in ["Buy milk", "...", "", "Schedule dentist appointment tomorrow"] {
            let v = service.generate_embedding(text).await.unwrap();
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "text {:?} norm {}", text, norm);
        }
    }

    #[tokio::test]
    async fn test_related_wording_is_similar() {
        let service = MockEmbeddingService::default();
        let milk = service.generate_embedding("buy milk").await.unwrap();
        let groceries = service.generate_embedding("grocery shopping").await.unwrap();
        let dentist = service.generate_embedding("schedule dentist appointment").await.unwrap();

        assert!(cosine(&milk, &groceries) > 0.9);
        assert!(cosine(&dentist, &groceries) < 0.4);
    }
}
