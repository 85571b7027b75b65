//! Field extraction
//!
//! Pulls typed qualification fields out of free text. The primary path
//! is a structured LLM call; a regex fallback covers the high-signal
//! fields when the model is unavailable. Both are idempotent: the same
//! message and target set always yield the same output.

use crate::fields::FieldName;
use crate::AgentError;
use async_trait::async_trait;
use brewflow_llm::{LlmBackend, PromptBuilder};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

#[async_trait]
pub trait FieldExtractor: Send + Sync {
    /// Extract values for `targets` from `message`. Partial results are
    /// expected; ambiguous or low-confidence values are omitted.
    async fn extract(
        &self,
        message: &str,
        context: &str,
        targets: &[FieldName],
    ) -> Result<HashMap<FieldName, String>, AgentError>;
}

/// Structured-output extraction via the LLM backend
pub struct LlmFieldExtractor {
    backend: Arc<dyn LlmBackend>,
}

impl LlmFieldExtractor {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    fn build_prompt(message: &str, context: &str, targets: &[FieldName]) -> String {
        let schema = targets
            .iter()
            .map(|f| format!("- \"{}\": {}", f.as_str(), f.description()))
            .collect::<Vec<_>>()
            .join("\n");

        let mut builder = PromptBuilder::new()
            .system(
                "You extract structured data from a customer message for a \
                 specialty coffee supplier. Return a JSON object containing \
                 only the listed keys whose values are clearly stated in the \
                 message. Omit anything uncertain. Values are short strings.",
            )
            .context("Fields to extract", schema);
        if !context.is_empty() {
            builder = builder.context("Conversation so far", context);
        }
        builder.user(message).build()
    }

    fn is_usable(value: &str) -> bool {
        let v = value.trim();
        !v.is_empty() && !matches!(v.to_lowercase().as_str(), "unknown" | "null" | "none" | "n/a")
    }
}

#[async_trait]
impl FieldExtractor for LlmFieldExtractor {
    async fn extract(
        &self,
        message: &str,
        context: &str,
        targets: &[FieldName],
    ) -> Result<HashMap<FieldName, String>, AgentError> {
        if targets.is_empty() {
            return Ok(HashMap::new());
        }

        let prompt = Self::build_prompt(message, context, targets);
        let value = self
            .backend
            .generate_structured(&prompt)
            .await
            .map_err(|e| AgentError::Backend(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| AgentError::Backend("extraction output not an object".to_string()))?;

        let mut extracted = HashMap::new();
        for field in targets {
            if let Some(v) = object.get(field.as_str()).and_then(|v| v.as_str()) {
                if Self::is_usable(v) {
                    extracted.insert(*field, v.trim().to_string());
                }
            }
        }
        Ok(extracted)
    }
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap());

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s().\-]{7,}\d").unwrap());

static NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:my name(?:'s| is)|i(?:'m| am)|this is|call me)\s+([A-Z][a-zA-Z'\-]+(?:\s+[A-Z][a-zA-Z'\-]+)?)").unwrap()
});

static TIMELINE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(next\s+(?:week|month|year|spring|summer|autumn|fall|winter)|in\s+\d+\s+(?:days?|weeks?|months?)|(?:this|early|late)\s+(?:january|february|march|april|may|june|july|august|september|october|november|december)|(?:january|february|march|april|may|june|july|august|september|october|november|december))\b",
    )
    .unwrap()
});

static CAFE_COUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+)\s+(?:caf(?:e|é)s?|locations?|stores?|shops?|venues?|sites?)\b")
        .unwrap()
});

static VOLUME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?\s*(?:kg|kilos?|kilograms?|lbs?|pounds?)(?:\s*(?:a|per)\s*(?:day|week|month))?)\b")
        .unwrap()
});

/// Words that follow "I'm ..." without being a name
const NAME_STOPWORDS: &[&str] = &[
    "opening", "looking", "interested", "thinking", "planning", "going", "starting", "just",
    "not", "curious", "trying", "hoping", "about", "wondering", "ready", "happy", "good",
];

/// Regex fallback extractor. Infallible; only matches high-precision
/// patterns and leaves the rest to the ask-again loop.
#[derive(Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    fn extract_name(message: &str) -> Option<String> {
        let captures = NAME_RE.captures(message)?;
        let candidate = captures.get(1)?.as_str();
        let first_word = candidate.split_whitespace().next()?.to_lowercase();
        if NAME_STOPWORDS.contains(&first_word.as_str()) {
            return None;
        }
        Some(candidate.to_string())
    }

    fn extract_one(message: &str, field: FieldName) -> Option<String> {
        match field {
            FieldName::Email => EMAIL_RE.find(message).map(|m| m.as_str().to_string()),
            FieldName::Phone => PHONE_RE.find(message).map(|m| m.as_str().to_string()),
            FieldName::Name => Self::extract_name(message),
            FieldName::Timeline => TIMELINE_RE
                .find(message)
                .map(|m| m.as_str().to_lowercase()),
            FieldName::CafeCount => CAFE_COUNT_RE
                .captures(message)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            FieldName::Volume => VOLUME_RE
                .captures(message)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_lowercase()),
            _ => None,
        }
    }
}

#[async_trait]
impl FieldExtractor for PatternExtractor {
    async fn extract(
        &self,
        message: &str,
        _context: &str,
        targets: &[FieldName],
    ) -> Result<HashMap<FieldName, String>, AgentError> {
        let mut extracted = HashMap::new();
        for field in targets {
            if let Some(value) = Self::extract_one(message, *field) {
                extracted.insert(*field, value);
            }
        }
        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(message: &str, targets: &[FieldName]) -> HashMap<FieldName, String> {
        PatternExtractor::new()
            .extract(message, "", targets)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_email_and_phone_patterns() {
        let out = run(
            "reach me at jane@example.com or +1 555 123 4567",
            &[FieldName::Email, FieldName::Phone],
        )
        .await;
        assert_eq!(out[&FieldName::Email], "jane@example.com");
        assert!(out[&FieldName::Phone].contains("555"));
    }

    #[tokio::test]
    async fn test_name_pattern() {
        let out = run("Hi, my name is Jane Doe", &[FieldName::Name]).await;
        assert_eq!(out[&FieldName::Name], "Jane Doe");
    }

    #[tokio::test]
    async fn test_im_opening_is_not_a_name() {
        let out = run("I'm opening a cafe downtown", &[FieldName::Name]).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_timeline_pattern() {
        let out = run(
            "we're opening next spring hopefully",
            &[FieldName::Timeline],
        )
        .await;
        assert_eq!(out[&FieldName::Timeline], "next spring");
    }

    #[tokio::test]
    async fn test_cafe_count_and_volume() {
        let out = run(
            "we run 3 cafes and go through 40kg per week",
            &[FieldName::CafeCount, FieldName::Volume],
        )
        .await;
        assert_eq!(out[&FieldName::CafeCount], "3");
        assert!(out[&FieldName::Volume].starts_with("40"));
    }

    #[tokio::test]
    async fn test_only_requested_targets_returned() {
        let out = run("jane@example.com, opening next spring", &[FieldName::Email]).await;
        assert_eq!(out.len(), 1);
        assert!(out.contains_key(&FieldName::Email));
    }

    #[tokio::test]
    async fn test_idempotent() {
        let targets = [FieldName::Email, FieldName::Name, FieldName::Timeline];
        let msg = "My name is Jane, email jane@example.com, opening next month";
        let first = run(msg, &targets).await;
        let second = run(msg, &targets).await;
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_usable_value_filter() {
        assert!(LlmFieldExtractor::is_usable("next spring"));
        assert!(!LlmFieldExtractor::is_usable(""));
        assert!(!LlmFieldExtractor::is_usable("  "));
        assert!(!LlmFieldExtractor::is_usable("unknown"));
        assert!(!LlmFieldExtractor::is_usable("Null"));
    }
}
