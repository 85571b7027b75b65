//! Configuration management for brewflow
//!
//! Supports loading configuration from:
//! - TOML files (config/default.toml, then config/{env}.toml)
//! - Environment variables (BREWFLOW_ prefix, `__` separator)
//! - Built-in defaults
//!
//! Qualification thresholds are product decisions, not structural
//! constants, so they live here rather than being hardcoded at call
//! sites.

pub mod qualification;
pub mod settings;

pub use qualification::QualificationConfig;
pub use settings::{
    load_settings, LlmSettings, ObservabilityConfig, RagSettings, RuntimeEnvironment,
    ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
