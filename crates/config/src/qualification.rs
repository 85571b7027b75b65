//! Qualification policy thresholds
//!
//! These values come from product documentation rather than a formal
//! policy, so they are configurable instead of hardcoded.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualificationConfig {
    /// A field is dropped from next-question selection once it has been
    /// asked more than this many times without an answer.
    pub max_field_asks: u32,
    /// After this many knowledge-base questions without qualification
    /// progress, a gentle redirect is appended to the answer.
    pub knowledge_redirect_after: u32,
    /// Preferred (non-required) fields are abandoned after this many
    /// dodged asks across the session.
    pub max_preferred_skips: u32,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            max_field_asks: 3,
            knowledge_redirect_after: 3,
            max_preferred_skips: 2,
        }
    }
}
