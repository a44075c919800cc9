//! OpenAI-compatible embeddings client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use manualqa_core::{EmbeddingService, EmbeddingVector, Error, Result};

use crate::config::{endpoint, EmbeddingConfig};

/// Client for `POST {api_url}/embeddings`
pub struct EmbeddingClient {
    config: EmbeddingConfig,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(EmbeddingConfig::from_env()?)
    }
}

#[async_trait]
impl EmbeddingService for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        let url = endpoint(&self.config.api_url, "embeddings");
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: [text],
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Embedding(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "embedding request failed with status {}: {}",
                status, error_text
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("malformed embedding response: {}", e)))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| EmbeddingVector::new(d.embedding))
            .ok_or_else(|| Error::Embedding("embedding response contained no vectors".to_string()))
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
