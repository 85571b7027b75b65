//! Runtime settings
//!
//! Layered loading: built-in defaults, then config/default.toml, then
//! config/{env}.toml, then BREWFLOW_-prefixed environment variables.

use crate::qualification::QualificationConfig;
use crate::ConfigError;
use serde::{Deserialize, Serialize};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Top-level settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub environment: RuntimeEnvironment,
    pub server: ServerConfig,
    pub llm: LlmSettings,
    pub rag: RagSettings,
    pub qualification: QualificationConfig,
    pub observability: ObservabilityConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: default_port(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

fn default_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080)
}

/// LLM backend settings (Ollama-style HTTP API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: std::env::var("OLLAMA_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            model: "llama3.1:8b".to_string(),
            temperature: 0.3,
            max_tokens: 512,
            timeout_secs: 20,
            max_retries: 2,
        }
    }
}

/// Knowledge retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    pub enabled: bool,
    /// Embedding API endpoint (Ollama-style /api/embed)
    pub embed_endpoint: String,
    pub embed_model: String,
    pub embedding_dim: usize,
    /// JSON corpus indexed at startup
    pub corpus_path: String,
    pub top_k: usize,
    /// Relevance floor; results below this are dropped
    pub min_score: f32,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            embed_endpoint: std::env::var("OLLAMA_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            embed_model: "nomic-embed-text".to_string(),
            embedding_dim: 768,
            corpus_path: "data/knowledge.json".to_string(),
            top_k: 4,
            min_score: 0.35,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: String,
    pub log_json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Load settings with the standard layering.
///
/// Priority: env vars > config/{env}.toml > config/default.toml > defaults.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false));

    if let Some(env) = env {
        builder = builder
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
    }

    let cfg = builder
        .add_source(
            config::Environment::with_prefix("BREWFLOW")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = cfg.try_deserialize()?;
    Ok(settings)
}
