use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use crate::data::{
    EmbeddingError, EmbeddingVector, RecordId, RequestContext, StateStoreError, StoredEmbedding, TextRecord,
};
use crate::traits::{EmbeddingGenerator, StateStore};

/// Fake implementation of EmbeddingGenerator for testing
pub struct FakeEmbeddingService {
    dimensions: usize,
    data: Mutex<HashMap<String, Vec<f32>>>,
    failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeEmbeddingService {
    /// Creates a fake producing `dimensions`-long vectors for unknown texts
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            data: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashSet::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Adds a precomputed embedding for a specific text
    pub fn add_embedding(&self, text: &str, embedding: Vec<f32>) {
        self.data.lock().unwrap().insert(text.to_string(), embedding);
    }

    /// Makes embedding `text` fail with a backend error
    pub fn fail_on(&self, text: &str) {
        self.failures.lock().unwrap().insert(text.to_string());
    }

    /// Every text requested so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn derived_embedding(&self, text: &str) -> Vec<f32> {
        // Deterministic and never all-zero
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in text.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        (0..self.dimensions)
            .map(|i| {
                let mixed = hash.rotate_left((i % 64) as u32) ^ (i as u64).wrapping_mul(0x9e3779b97f4a7c15);
                ((mixed % 1000) as f32 + 1.0) / 1000.0
            })
            .collect()
    }
}

impl fmt::Debug for FakeEmbeddingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeEmbeddingService")
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

#[async_trait]
impl EmbeddingGenerator for FakeEmbeddingService {
    async fn generate_embedding(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        self.calls.lock().unwrap().push(text.to_string());

        if self.failures.lock().unwrap().contains(text) {
            return Err(EmbeddingError::Backend(format!("fake failure for {:?}", text)));
        }

        if let Some(embedding) = self.data.lock().unwrap().get(text) {
            return Ok(embedding.clone());
        }

        Ok(self.derived_embedding(text))
    }

    fn model_name(&self) -> &str {
        "fake"
    }
}

/// Store whose every operation fails, for exercising error paths
#[derive(Debug, Default, Clone)]
pub struct FailingStateStore;

impl FailingStateStore {
    pub fn new() -> Self {
        Self
    }

    fn error(operation: &str) -> StateStoreError {
        StateStoreError::ConnectionError(format!("{} failed: store unavailable", operation))
    }
}

#[async_trait]
impl StateStore for FailingStateStore {
    async fn set_embedding(
        &self,
        _ctx: &RequestContext,
        _record_id: &RecordId,
        _embedding: &[f32],
    ) -> Result<bool, StateStoreError> {
        Err(Self::error("set_embedding"))
    }

    async fn fetch_embeddings(&self, _ctx: &RequestContext) -> Result<Vec<StoredEmbedding>, StateStoreError> {
        Err(Self::error("fetch_embeddings"))
    }

    async fn list_records(&self, _ctx: &RequestContext) -> Result<Vec<TextRecord>, StateStoreError> {
        Err(Self::error("list_records"))
    }

    async fn health_check(&self) -> Result<bool, StateStoreError> {
        Err(Self::error("health_check"))
    }
}
