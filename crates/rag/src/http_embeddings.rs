//! HTTP embedding backend
//!
//! Talks to an Ollama-style `/api/embed` endpoint. The asymmetric
//! query/passage prefixes are applied here so callers never have to
//! remember them.

use crate::embeddings::{l2_normalize, EmbeddingBackend, PASSAGE_PREFIX, QUERY_PREFIX};
use crate::RagError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    pub endpoint: String,
    pub model: String,
    pub embedding_dim: usize,
    pub timeout_secs: u64,
}

impl Default for HttpEmbedderConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            embedding_dim: 768,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct HttpEmbedder {
    client: Client,
    config: HttpEmbedderConfig,
}

impl HttpEmbedder {
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, RagError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RagError::Embedding(format!("client build failed: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn embed_raw(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let request = EmbedRequest {
            model: self.config.model.clone(),
            input: text.to_string(),
        };
        let url = format!("{}/api/embed", self.config.endpoint);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("embed request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "embed endpoint returned {}: {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("bad embed response: {}", e)))?;

        let mut vector = embed_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("no embedding returned".to_string()))?;

        l2_normalize(&mut vector);
        Ok(vector)
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_raw(&format!("{}{}", QUERY_PREFIX, text)).await
    }

    async fn embed_passage(&self, text: &str) -> Result<Vec<f32>, RagError> {
        self.embed_raw(&format!("{}{}", PASSAGE_PREFIX, text)).await
    }

    fn dim(&self) -> usize {
        self.config.embedding_dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpEmbedderConfig::default();
        assert_eq!(config.model, "nomic-embed-text");
        assert_eq!(config.embedding_dim, 768);
    }
}
