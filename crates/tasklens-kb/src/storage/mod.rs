//! Record store configuration and construction

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::data::StateStoreError;
use crate::traits::StateStore;

pub mod memory;

pub use memory::MemoryStateStore;

pub const DEFAULT_STORE_URI: &str = "memory://";
pub const DEFAULT_DATABASE: &str = "todo-app-db";
pub const DEFAULT_COLLECTION: &str = "tasks";

/// Storage configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// `memory://` or a Neo4j `neo4j://` / `bolt://` URI
    pub uri: String,
    pub database: String,
    /// Collection holding the task records (a node label for Neo4j)
    pub collection: String,
    pub username: String,
    pub password: String,
    pub connection_retry_count: u32,
    pub connection_retry_delay: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_STORE_URI.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            connection_retry_count: 3,
            connection_retry_delay: Duration::from_secs(1),
        }
    }
}

impl StoreConfig {
    pub fn is_memory(&self) -> bool {
        self.uri.starts_with("memory://")
    }

    pub fn is_neo4j(&self) -> bool {
        ["neo4j://", "neo4j+s://", "bolt://", "bolt+s://"]
            .iter()
            .any(|scheme| self.uri.starts_with(scheme))
    }
}

/// Connects the configured record store.
///
/// Remote stores are verified before this returns, so a failure here means
/// the service must not start.
pub async fn create_state_store(config: &StoreConfig) -> Result<Arc<dyn StateStore>, StateStoreError> {
    if config.is_memory() {
        info!("Using in-memory record store");
        return Ok(Arc::new(MemoryStateStore::new()));
    }

    if config.is_neo4j() {
        return connect_neo4j(config).await;
    }

    Err(StateStoreError::InvalidInput(format!(
        "Unsupported store URI scheme: {}",
        config.uri
    )))
}

#[cfg(feature = "neo4j")]
async fn connect_neo4j(config: &StoreConfig) -> Result<Arc<dyn StateStore>, StateStoreError> {
    let store = crate::adapters::neo4j_store::Neo4jStateStore::new(config.clone()).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "neo4j"))]
async fn connect_neo4j(config: &StoreConfig) -> Result<Arc<dyn StateStore>, StateStoreError> {
    Err(StateStoreError::InvalidInput(format!(
        "Store URI {} requires the 'neo4j' feature",
        config.uri
    )))
}
