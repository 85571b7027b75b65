//! LLM backend abstraction for brewflow
//!
//! One trait covers the three uses in a turn: classification,
//! extraction (both via structured output), and final text generation.

pub mod backend;
pub mod prompt;

pub use backend::{LlmBackend, LlmConfig, OllamaBackend};
pub use prompt::PromptBuilder;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for brewflow_core::Error {
    fn from(err: LlmError) -> Self {
        brewflow_core::Error::ExtractionFailed(err.to_string())
    }
}
