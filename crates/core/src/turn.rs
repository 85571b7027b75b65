//! Turn request/response contract
//!
//! The only interface a transport layer needs: one message in, one
//! composed reply out, plus enough state for the caller to render
//! progress.

use crate::stage::QualificationStage;
use serde::{Deserialize, Serialize};

/// One inbound user message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    /// Opaque session key, stable for the conversation's lifetime
    pub session_id: String,
    /// Raw user text
    pub message_text: String,
    /// BCP-47-ish locale hint, used to disambiguate phone numbers
    #[serde(default)]
    pub locale_hint: Option<String>,
}

/// The composed reply for one turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub response_text: String,
    pub stage_after_turn: QualificationStage,
    pub closed: bool,
}
