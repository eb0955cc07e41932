use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::data::{EmbeddingVector, RecordId, RequestContext, StateStoreError, StoredEmbedding, TextRecord};
use crate::traits::StateStore;

#[derive(Debug, Clone)]
struct StoredRecord {
    record: TextRecord,
    embedding: Option<EmbeddingVector>,
}

/// In-memory record store.
///
/// Records keep their insertion order, which is the order candidates are
/// returned in.
#[derive(Debug, Default, Clone)]
pub struct MemoryStateStore {
    records: Arc<RwLock<Vec<StoredRecord>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a record. The pipelines never create records, so
    /// development setups and tests seed them through here.
    pub async fn insert_record(&self, record: TextRecord) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.record.record_id == record.record_id) {
            Some(existing) => existing.record = record,
            None => records.push(StoredRecord { record, embedding: None }),
        }
    }

    /// Current embedding of a record, if any.
    pub async fn embedding_of(&self, record_id: &RecordId) -> Option<EmbeddingVector> {
        let records = self.records.read().await;
        records
            .iter()
            .find(|r| &r.record.record_id == record_id)
            .and_then(|r| r.embedding.clone())
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn set_embedding(
        &self,
        _ctx: &RequestContext,
        record_id: &RecordId,
        embedding: &[f32],
    ) -> Result<bool, StateStoreError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| &r.record.record_id == record_id) {
            Some(stored) => {
                stored.embedding = Some(embedding.to_vec());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn fetch_embeddings(&self, _ctx: &RequestContext) -> Result<Vec<StoredEmbedding>, StateStoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter_map(|r| {
                r.embedding
                    .as_ref()
                    .map(|embedding| StoredEmbedding::new(r.record.record_id.clone(), embedding.clone()))
            })
            .collect())
    }

    async fn list_records(&self, _ctx: &RequestContext) -> Result<Vec<TextRecord>, StateStoreError> {
        let records = self.records.read().await;
        Ok(records.iter().map(|r| r.record.clone()).collect())
    }

    async fn health_check(&self) -> Result<bool, StateStoreError> {
        Ok(true)
    }
}
