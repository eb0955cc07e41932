//! Adapters for external record stores

#[cfg(feature = "neo4j")]
pub mod neo4j_store;
