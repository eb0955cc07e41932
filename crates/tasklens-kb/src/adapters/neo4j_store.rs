use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::{
    data::{RecordId, RequestContext, StateStoreError, StoredEmbedding, TextRecord},
    storage::StoreConfig,
    traits::StateStore,
};

// Define a macro for Neo4j tracing with the RequestContext
macro_rules! trace_neo4j {
    ($ctx:expr, $op:expr, $($arg:tt)*) => {
        debug!("[Neo4j:{}][request:{}] {}", $op, $ctx.request_id, format!($($arg)*));
    };
}

/// Neo4j implementation of the `StateStore` trait.
///
/// Task records are nodes labelled with the configured collection name and
/// identified by their `id` property. The embedding lives in the node's
/// `embedding` property.
pub struct Neo4jStateStore {
    graph: Arc<Graph>,
    label: String,
}

impl Neo4jStateStore {
    /// Create a new Neo4jStateStore instance with retries
    pub async fn new(config: StoreConfig) -> Result<Self, StateStoreError> {
        let label = escape_label(&config.collection)?;

        let neo4j_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.username.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .build()
            .map_err(|e| StateStoreError::ConnectionError(format!("Failed to build Neo4j config: {}", e)))?;

        let attempts = config.connection_retry_count.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match Graph::connect(neo4j_config.clone()).await {
                Ok(graph) => {
                    // Test the connection with a simple query
                    match graph.run(Query::new("RETURN 1".to_string())).await {
                        Ok(()) => {
                            info!(
                                uri = %config.uri,
                                database = %config.database,
                                collection = %config.collection,
                                "Connected to Neo4j (attempt {})", attempt
                            );
                            return Ok(Self {
                                graph: Arc::new(graph),
                                label,
                            });
                        }
                        Err(e) => {
                            error!("Connection test failed: {}", e);
                            last_error = Some(e.to_string());
                        }
                    }
                }
                Err(e) => {
                    error!("Failed to connect to Neo4j (attempt {}): {}", attempt, e);
                    last_error = Some(e.to_string());
                }
            }
            if attempt < attempts {
                tokio::time::sleep(config.connection_retry_delay).await;
            }
        }

        Err(StateStoreError::ConnectionError(format!(
            "Failed to connect to Neo4j after {} attempts. Last error: {}",
            attempts,
            last_error.unwrap_or_default()
        )))
    }

    async fn fetch_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, StateStoreError> {
        let mut stream = self
            .graph
            .execute(query)
            .await
            .map_err(|e| StateStoreError::QueryError(format!("Failed to execute query: {}", e)))?;

        let mut rows = Vec::new();
        loop {
            match stream.next().await {
                Ok(Some(row)) => rows.push(row),
                Ok(None) => break,
                Err(e) => return Err(StateStoreError::QueryError(format!("Failed to read result row: {}", e))),
            }
        }
        Ok(rows)
    }
}

/// Labels cannot be query parameters, so only plain identifiers are accepted
/// and they are always backtick-quoted.
fn escape_label(collection: &str) -> Result<String, StateStoreError> {
    let valid = !collection.is_empty()
        && collection.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(StateStoreError::InvalidInput(format!(
            "Collection name must be alphanumeric or '_': {:?}",
            collection
        )));
    }
    Ok(format!("`{}`", collection))
}

#[async_trait]
impl StateStore for Neo4jStateStore {
    #[instrument(skip(self, ctx, embedding), fields(request_id = %ctx.request_id, record_id = %record_id))]
    async fn set_embedding(
        &self,
        ctx: &RequestContext,
        record_id: &RecordId,
        embedding: &[f32],
    ) -> Result<bool, StateStoreError> {
        let cypher = format!(
            "MATCH (n:{} {{id: $id}}) SET n.embedding = $embedding RETURN count(n) AS matched",
            self.label
        );
        let values: Vec<f64> = embedding.iter().map(|v| f64::from(*v)).collect();
        trace_neo4j!(ctx, "set_embedding", "Writing {} dimensions", values.len());

        let query = Query::new(cypher)
            .param("id", record_id.as_str())
            .param("embedding", values);

        let rows = self.fetch_rows(query).await?;
        let matched = rows
            .first()
            .map(|row| row.get::<i64>("matched"))
            .transpose()
            .map_err(|e| StateStoreError::MappingError(e.to_string()))?
            .unwrap_or(0);

        Ok(matched > 0)
    }

    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    async fn fetch_embeddings(&self, ctx: &RequestContext) -> Result<Vec<StoredEmbedding>, StateStoreError> {
        let cypher = format!(
            "MATCH (n:{}) WHERE n.embedding IS NOT NULL RETURN n.id AS id, n.embedding AS embedding",
            self.label
        );
        let rows = self.fetch_rows(Query::new(cypher)).await?;
        trace_neo4j!(ctx, "fetch_embeddings", "Received {} rows", rows.len());

        rows.into_iter()
            .map(|row| {
                let id = row
                    .get::<String>("id")
                    .map_err(|e| StateStoreError::MappingError(format!("Record id: {}", e)))?;
                let record_id = RecordId::parse(id)
                    .ok_or_else(|| StateStoreError::MappingError("Record with blank id".to_string()))?;
                let embedding = row
                    .get::<Vec<f64>>("embedding")
                    .map_err(|e| StateStoreError::MappingError(format!("Embedding of {}: {}", record_id, e)))?;
                Ok(StoredEmbedding::new(
                    record_id,
                    embedding.into_iter().map(|v| v as f32).collect(),
                ))
            })
            .collect()
    }

    #[instrument(skip(self, ctx), fields(request_id = %ctx.request_id))]
    async fn list_records(&self, ctx: &RequestContext) -> Result<Vec<TextRecord>, StateStoreError> {
        let cypher = format!(
            "MATCH (n:{}) WHERE n.id IS NOT NULL RETURN n.id AS id, n.title AS title, n.description AS description",
            self.label
        );
        let rows = self.fetch_rows(Query::new(cypher)).await?;
        trace_neo4j!(ctx, "list_records", "Received {} rows", rows.len());

        rows.into_iter()
            .map(|row| {
                let id = row
                    .get::<String>("id")
                    .map_err(|e| StateStoreError::MappingError(format!("Record id: {}", e)))?;
                let record_id = RecordId::parse(id)
                    .ok_or_else(|| StateStoreError::MappingError("Record with blank id".to_string()))?;
                // Null properties fail to decode as String and read as absent
                Ok(TextRecord::new(
                    record_id,
                    row.get::<String>("title").ok(),
                    row.get::<String>("description").ok(),
                ))
            })
            .collect()
    }

    async fn health_check(&self) -> Result<bool, StateStoreError> {
        self.graph
            .run(Query::new("RETURN 1".to_string()))
            .await
            .map(|_| true)
            .map_err(|e| StateStoreError::ConnectionError(e.to_string()))
    }
}
