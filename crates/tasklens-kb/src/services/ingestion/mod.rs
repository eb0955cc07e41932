//! Ingestion pipeline: validate, embed, store

pub mod service;


pub use service::IngestionService;
