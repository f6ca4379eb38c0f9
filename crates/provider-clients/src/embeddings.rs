//! OpenAI embeddings endpoint as an [`Embedder`].

use provider_core::{async_trait, Embedder, Provider, ProviderCredential, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::http::{build_client, post_json};

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Output dimensionality of the default model.
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;

#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeds text through OpenAI's `/v1/embeddings`.
pub struct OpenAiEmbedder {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    /// Create an embedder using the default model and dimensionality.
    ///
    /// The credential's model override is ignored: it names a chat model.
    pub fn new(credential: &ProviderCredential) -> Result<Self, ProviderError> {
        let config = ClientConfig::from_credential(Provider::OpenAi, credential);
        let client = build_client(&config)?;
        Ok(Self {
            client,
            api_url: config.api_url,
            api_key: config.api_key,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    /// Use a different embedding model and output size.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        let url = format!("{}/v1/embeddings", self.api_url);
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
            dimensions: self.dimensions,
        };
        let headers = [("Authorization", format!("Bearer {}", self.api_key))];

        let response: EmbeddingResponse =
            post_json(&self.client, Provider::OpenAi, &url, &headers, &request).await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ProviderError::ProviderApi {
                status: 200,
                message: "embedding response contained no data".to_string(),
            })?;

        if embedding.len() != self.dimensions {
            return Err(ProviderError::EmbeddingDimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        Ok(embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
