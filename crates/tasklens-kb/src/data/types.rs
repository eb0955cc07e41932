//! Record and result types shared by the pipelines and the stores

use serde::{Deserialize, Serialize};

use super::identifiers::RecordId;

/// Fixed-length vector produced by the embedding backend.
///
/// Kept as a plain list of numbers so it round-trips through the store and
/// the wire format without a custom codec.
pub type EmbeddingVector = Vec<f32>;

/// A record as the external store holds it, minus the embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRecord {
    pub record_id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TextRecord {
    pub fn new(record_id: RecordId, title: Option<String>, description: Option<String>) -> Self {
        Self {
            record_id,
            title,
            description,
        }
    }

    /// True when at least one of title/description has non-blank content.
    pub fn has_text(&self) -> bool {
        non_blank(self.title.as_deref()) || non_blank(self.description.as_deref())
    }

    /// Text that gets embedded for this record: `"{title}. {description}"`, trimmed.
    pub fn embedding_text(&self) -> String {
        compose_text(self.title.as_deref(), self.description.as_deref())
    }
}

/// Joins title and description the way records are embedded.
pub fn compose_text(title: Option<&str>, description: Option<&str>) -> String {
    format!("{}. {}", title.unwrap_or(""), description.unwrap_or(""))
        .trim()
        .to_string()
}

fn non_blank(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// Search candidate: the id and stored vector of an embedded record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEmbedding {
    pub record_id: RecordId,
    pub embedding: EmbeddingVector,
}

impl StoredEmbedding {
    pub fn new(record_id: RecordId, embedding: EmbeddingVector) -> Self {
        Self { record_id, embedding }
    }
}

/// One ranked hit of a semantic search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredResult {
    pub record_id: RecordId,
    /// Cosine similarity in [-1, 1].
    pub score: f32,
}
