//! Request and response types of the ingestion and query services
//!
//! Field names follow the JSON wire format (`recordId`, `topN`, ...) so the
//! HTTP layer can deserialize straight into these types.

use serde::{Deserialize, Serialize};

use crate::data::{RecordId, ScoredResult};

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_MIN_SCORE: f32 = 0.4;

/// Body of an embed request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedTaskRequest {
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EmbedTaskRequest {
    pub fn new(record_id: impl Into<String>, title: Option<&str>, description: Option<&str>) -> Self {
        Self {
            record_id: Some(record_id.into()),
            title: title.map(str::to_string),
            description: description.map(str::to_string),
        }
    }
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionOutcome {
    pub record_id: RecordId,
    pub dimensions: usize,
    pub chunks: usize,
    /// Whether the store had a record with this id.
    pub matched: bool,
}

/// Totals of a bulk re-embedding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReembedReport {
    pub total: usize,
    pub embedded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Ranking knobs of a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub top_n: usize,
    /// Results must score strictly above this.
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

/// Body of a search request. Omitted knobs fall back to the service defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub top_n: Option<usize>,
    #[serde(default)]
    pub min_score: Option<f32>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }
}

/// Response body of a search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ScoredResult>,
}
