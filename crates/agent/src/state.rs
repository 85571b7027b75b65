//! Per-session conversation state
//!
//! One record per session, loaded at the start of a turn and saved at
//! the end. The flow controller treats it as immutable-in/mutable-out;
//! nothing here touches storage.

use crate::fields::FieldName;
use brewflow_core::{ClosedReason, CustomerType, QualificationStage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Orthogonal conversation flags, applicable at any stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateFlags {
    pub wants_human_handoff: bool,
    /// A handoff offer has gone out; an affirmation now accepts it
    pub handoff_offered: bool,
    pub refused_contact: bool,
    pub closed: bool,
    pub closed_reason: Option<ClosedReason>,
}

/// A system-suggested correction awaiting explicit user confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub field: FieldName,
    pub original: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: String,
    pub stage: QualificationStage,
    pub customer_type: CustomerType,
    pub fields: HashMap<FieldName, String>,
    pub field_ask_counts: HashMap<FieldName, u32>,
    pub topics_discussed: HashSet<String>,
    pub flags: StateFlags,
    pub knowledge_question_count: u32,
    pub pending_confirmation: Option<PendingConfirmation>,
    /// Preferred-field dodges across the session; preferred questions
    /// stop once this crosses the configured limit
    pub preferred_skip_count: u32,
    pub turn_count: u32,
    /// The field asked in the previous turn, used to detect dodges
    pub last_field_asked: Option<FieldName>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            stage: QualificationStage::default(),
            customer_type: CustomerType::default(),
            fields: HashMap::new(),
            field_ask_counts: HashMap::new(),
            topics_discussed: HashSet::new(),
            flags: StateFlags::default(),
            knowledge_question_count: 0,
            pending_confirmation: None,
            preferred_skip_count: 0,
            turn_count: 0,
            last_field_asked: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_field(&self, field: FieldName) -> bool {
        self.fields
            .get(&field)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// Set a field and mark its topic as discussed
    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) {
        self.fields.insert(field, value.into());
        self.topics_discussed.insert(field.topic().to_string());
        self.updated_at = Utc::now();
    }

    pub fn ask_count(&self, field: FieldName) -> u32 {
        self.field_ask_counts.get(&field).copied().unwrap_or(0)
    }

    /// Record that a field was asked for this turn
    pub fn record_ask(&mut self, field: FieldName) {
        *self.field_ask_counts.entry(field).or_insert(0) += 1;
        self.last_field_asked = Some(field);
        self.updated_at = Utc::now();
    }

    /// Advance exactly one stage forward; ignored if the transition is
    /// not a legal single step.
    pub fn advance_stage(&mut self) -> bool {
        match self.stage.next() {
            Some(next) if self.stage.can_transition_to(next) => {
                tracing::info!(
                    session_id = %self.session_id,
                    from = self.stage.display_name(),
                    to = next.display_name(),
                    "stage transition"
                );
                self.stage = next;
                self.updated_at = Utc::now();
                true
            },
            _ => false,
        }
    }

    /// Completeness-driven jump to Qualified. Only ever moves forward.
    pub fn mark_qualified(&mut self) {
        if self.stage < QualificationStage::Qualified {
            tracing::info!(
                session_id = %self.session_id,
                from = self.stage.display_name(),
                "qualification complete"
            );
            self.stage = QualificationStage::Qualified;
            self.updated_at = Utc::now();
        }
    }

    /// The only permitted stage regression: an explicit user reset.
    pub fn reset_to_exploring(&mut self) {
        self.stage = QualificationStage::Exploring;
        self.flags.closed = false;
        self.flags.closed_reason = None;
        self.flags.handoff_offered = false;
        self.pending_confirmation = None;
        self.updated_at = Utc::now();
    }

    pub fn close(&mut self, reason: ClosedReason) {
        self.flags.closed = true;
        self.flags.closed_reason = Some(reason);
        self.updated_at = Utc::now();
    }

    pub fn is_closed(&self) -> bool {
        self.flags.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = ConversationState::new("s1");
        assert_eq!(state.stage, QualificationStage::Exploring);
        assert_eq!(state.customer_type, CustomerType::Unknown);
        assert!(state.fields.is_empty());
        assert!(!state.is_closed());
    }

    #[test]
    fn test_set_field_marks_topic() {
        let mut state = ConversationState::new("s1");
        state.set_field(FieldName::Timeline, "next spring");
        assert!(state.has_field(FieldName::Timeline));
        assert!(state.topics_discussed.contains("timeline"));
    }

    #[test]
    fn test_advance_is_single_step() {
        let mut state = ConversationState::new("s1");
        assert!(state.advance_stage());
        assert_eq!(state.stage, QualificationStage::InterestDetected);
        assert!(state.advance_stage());
        assert_eq!(state.stage, QualificationStage::IntentConfirmed);
    }

    #[test]
    fn test_mark_qualified_jumps_forward_only() {
        let mut state = ConversationState::new("s1");
        state.mark_qualified();
        assert_eq!(state.stage, QualificationStage::Qualified);
        // idempotent at the terminal stage
        state.mark_qualified();
        assert_eq!(state.stage, QualificationStage::Qualified);
        assert!(!state.advance_stage());
    }

    #[test]
    fn test_reset_is_the_only_regression() {
        let mut state = ConversationState::new("s1");
        state.mark_qualified();
        state.reset_to_exploring();
        assert_eq!(state.stage, QualificationStage::Exploring);
    }

    #[test]
    fn test_ask_counts_accumulate() {
        let mut state = ConversationState::new("s1");
        assert_eq!(state.ask_count(FieldName::Phone), 0);
        state.record_ask(FieldName::Phone);
        state.record_ask(FieldName::Phone);
        assert_eq!(state.ask_count(FieldName::Phone), 2);
        assert_eq!(state.last_field_asked, Some(FieldName::Phone));
    }

    #[test]
    fn test_serde_round_trip_identical() {
        let mut state = ConversationState::new("s1");
        state.customer_type = CustomerType::NewBusiness;
        state.set_field(FieldName::Name, "Jane");
        state.record_ask(FieldName::Email);
        state.knowledge_question_count = 2;
        state.pending_confirmation = Some(PendingConfirmation {
            field: FieldName::Email,
            original: "jane@gmial.com".to_string(),
            suggestion: "jane@gmail.com".to_string(),
        });
        state.advance_stage();

        let json = serde_json::to_string(&state).unwrap();
        let reloaded: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, reloaded);
    }
}
