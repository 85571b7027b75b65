//! LLM backend trait and Ollama HTTP implementation

use crate::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub endpoint: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama3.1:8b".to_string(),
            endpoint: "http://localhost:11434".to_string(),
            temperature: 0.3,
            max_tokens: 512,
            timeout_secs: 20,
            max_retries: 2,
        }
    }
}

/// Request/response LLM backend
///
/// Implementations must be safe to call concurrently; a single turn
/// issues classification and extraction in parallel.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Free-text generation
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// JSON-constrained generation; the caller shapes the schema in the
    /// prompt and gets a parsed value back.
    async fn generate_structured(&self, prompt: &str) -> Result<serde_json::Value, LlmError>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama-style `/api/generate` backend
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

impl OllamaBackend {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Configuration(e.to_string()))?;
        Ok(Self { client, config })
    }

    async fn call(&self, prompt: &str, json_format: bool) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format: json_format.then_some("json"),
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };
        let url = format!("{}/api/generate", self.config.endpoint);

        let mut last_err = LlmError::Generation("no attempt made".to_string());
        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(200 * (1 << attempt))).await;
            }

            match self.client.post(&url).json(&request).send().await {
                Ok(response) if response.status().is_success() => {
                    let parsed: GenerateResponse = response
                        .json()
                        .await
                        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
                    return Ok(parsed.response);
                },
                Ok(response) => {
                    let status = response.status().as_u16();
                    let message = response.text().await.unwrap_or_default();
                    // Client errors won't heal on retry
                    if (400..500).contains(&status) {
                        return Err(LlmError::Api { status, message });
                    }
                    last_err = LlmError::Api { status, message };
                },
                Err(e) => {
                    last_err = e.into();
                },
            }
            tracing::warn!(attempt, error = %last_err, "llm call failed, retrying");
        }
        Err(last_err)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.call(prompt, false).await
    }

    async fn generate_structured(&self, prompt: &str) -> Result<serde_json::Value, LlmError> {
        let raw = self.call(prompt, true).await?;
        serde_json::from_str(&raw)
            .map_err(|e| LlmError::InvalidResponse(format!("{}: {}", e, raw)))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = LlmConfig::default();
        assert_eq!(config.max_retries, 2);
        assert!(config.timeout_secs > 0);
    }

    #[test]
    fn test_backend_construction() {
        let backend = OllamaBackend::new(LlmConfig::default()).unwrap();
        assert_eq!(backend.model_name(), "llama3.1:8b");
    }
}
