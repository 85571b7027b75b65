//! Lead-qualification agent
//!
//! The conversation state machine: per-turn detection, extraction,
//! validation, stage transitions, knowledge routing, and response
//! composition. The flow controller is a pure transform over state; all
//! persistence happens in the [`Agent`] wrapper so the machine is
//! testable without a database.

pub mod agent;
pub mod composer;
pub mod detection;
pub mod extraction;
pub mod fields;
pub mod flow;
pub mod lead;
pub mod questions;
pub mod selection;
pub mod state;
pub mod traits;
pub mod validation;

pub use agent::Agent;
pub use detection::TypeDetector;
pub use extraction::{FieldExtractor, LlmFieldExtractor, PatternExtractor};
pub use fields::{is_qualified, preferred_fields, required_fields, FieldName, USER_DECLINED};
pub use flow::{FlowController, TurnAction, TurnInput};
pub use lead::{LeadSink, MemoryLeadSink, QualifiedLead};
pub use selection::next_field;
pub use state::{ConversationState, PendingConfirmation, StateFlags};
pub use traits::{MemorySessionStore, SessionStore};
pub use validation::{validate_email, validate_phone, EmailValidation, PhoneValidation};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Fatal to the turn: progress must never be shown unpersisted.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<AgentError> for brewflow_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Persistence(msg) => brewflow_core::Error::StatePersistenceFailed(msg),
            AgentError::Backend(msg) => brewflow_core::Error::Internal(msg),
        }
    }
}
