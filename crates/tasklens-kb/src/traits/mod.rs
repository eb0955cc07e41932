//! Interfaces of the external collaborators: the embedding model and the record store

pub mod state_store;
mod embedding_generator;

pub use state_store::StateStore;
pub use embedding_generator::EmbeddingGenerator;
