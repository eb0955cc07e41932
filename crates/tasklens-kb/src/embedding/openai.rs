use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client,
};
use async_trait::async_trait;

use crate::data::{EmbeddingError, EmbeddingVector};
use crate::traits::EmbeddingGenerator;

pub struct OpenAIEmbeddingService {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIEmbeddingService {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(config);
        Self { client, model }
    }
}

#[async_trait]
impl EmbeddingGenerator for OpenAIEmbeddingService {
    async fn generate_embedding(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()
            .map_err(|e| EmbeddingError::InvalidInput(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| EmbeddingError::Backend(e.to_string()))?;

        response
            .data
            .into_iter()
            .next()
            .map(|data| data.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or(EmbeddingError::EmptyEmbedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
