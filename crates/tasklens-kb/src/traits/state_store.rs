//! StateStore trait definition for the external record store

use async_trait::async_trait;

use crate::data::{RecordId, RequestContext, StateStoreError, StoredEmbedding, TextRecord};

/// Represents the interface for the store that owns the task records.
///
/// The core never creates or deletes records. It only writes one field,
/// `embedding`, and reads records back for search and re-embedding.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Sets the `embedding` field of a record, replacing any previous value.
    ///
    /// Contract: a single atomic field-set on a single record. Returns `true`
    /// when a record with that id exists and was updated, `false` when no
    /// record matched (nothing is written in that case).
    async fn set_embedding(
        &self,
        ctx: &RequestContext,
        record_id: &RecordId,
        embedding: &[f32],
    ) -> Result<bool, StateStoreError>;

    /// Fetches the id and embedding of every record that has an embedding.
    ///
    /// Contract: projects only the identifier and the vector. Records without
    /// the field are not returned. Order is the store's natural order and is
    /// stable between calls when nothing is written.
    async fn fetch_embeddings(
        &self,
        ctx: &RequestContext,
    ) -> Result<Vec<StoredEmbedding>, StateStoreError>;

    /// Lists every record with its text fields, used for bulk re-embedding.
    async fn list_records(&self, ctx: &RequestContext) -> Result<Vec<TextRecord>, StateStoreError>;

    /// Cheap liveness check.
    async fn health_check(&self) -> Result<bool, StateStoreError>;
}
