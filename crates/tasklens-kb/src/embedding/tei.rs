//! Client for a HuggingFace text-embeddings-inference server
//!
//! TEI serves sentence-transformers models such as all-MiniLM-L6-v2 over
//! HTTP: `POST /embed {"inputs": "..."}` returns `[[f32; D]]`.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use crate::data::{EmbeddingError, EmbeddingVector};
use crate::traits::EmbeddingGenerator;

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a str,
    truncate: bool,
}

pub struct TeiEmbeddingService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

impl TeiEmbeddingService {
    pub fn new(base_url: &str, model: String, timeout: Duration) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embed", base_url.trim_end_matches('/')),
            model,
        })
    }
}

#[async_trait]
impl EmbeddingGenerator for TeiEmbeddingService {
    async fn generate_embedding(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        debug!(endpoint = %self.endpoint, chars = text.len(), "Requesting embedding from TEI");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&EmbedRequest { inputs: text, truncate: true })
            .send()
            .await
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Backend(format!("TEI returned {}: {}", status, body)));
        }

        let mut batch: Vec<EmbeddingVector> = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Backend(format!("Malformed TEI response: {}", e)))?;

        match batch.pop() {
            Some(vector) if batch.is_empty() && !vector.is_empty() => Ok(vector),
            Some(_) if !batch.is_empty() => Err(EmbeddingError::Backend(format!(
                "TEI returned {} vectors for one input",
                batch.len() + 1
            ))),
            _ => Err(EmbeddingError::EmptyEmbedding),
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
