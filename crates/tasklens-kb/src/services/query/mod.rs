//! Retrieval pipeline: embed the query, score stored vectors, rank, filter

pub mod scoring;
pub mod service;


pub use scoring::{cosine_similarity, rank_candidates};
pub use service::QueryService;
