//! Qualification stage machine
//!
//! Stages only move forward during normal operation. The single allowed
//! regression is an explicit reset back to `Exploring`, which callers
//! must request deliberately (e.g. the user asks to start over).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Qualification progress for a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualificationStage {
    /// Open-ended discovery, customer type may still be unknown
    #[default]
    Exploring,
    /// A concrete buying signal was detected (timeline, equipment, volume)
    InterestDetected,
    /// The user explicitly confirmed they want to move forward
    IntentConfirmed,
    /// All required fields are present and valid; ready for handoff
    Qualified,
}

/// Forward transitions, one step at a time. Completeness-driven jumps to
/// `Qualified` bypass this table and are handled by the flow controller.
static STAGE_TRANSITIONS: Lazy<HashMap<QualificationStage, &'static [QualificationStage]>> =
    Lazy::new(|| {
        use QualificationStage::*;
        let mut m: HashMap<QualificationStage, &'static [QualificationStage]> = HashMap::new();
        m.insert(Exploring, &[InterestDetected]);
        m.insert(InterestDetected, &[IntentConfirmed]);
        m.insert(IntentConfirmed, &[Qualified]);
        m.insert(Qualified, &[]);
        m
    });

impl QualificationStage {
    /// Human-readable name for logs and API payloads
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Exploring => "exploring",
            Self::InterestDetected => "interest_detected",
            Self::IntentConfirmed => "intent_confirmed",
            Self::Qualified => "qualified",
        }
    }

    /// Stages reachable in a single forward step
    pub fn allowed_transitions(&self) -> &'static [QualificationStage] {
        STAGE_TRANSITIONS.get(self).copied().unwrap_or(&[])
    }

    /// Whether a single-step forward transition to `target` is allowed
    pub fn can_transition_to(&self, target: QualificationStage) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// The next stage forward, if any
    pub fn next(&self) -> Option<QualificationStage> {
        self.allowed_transitions().first().copied()
    }

    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Qualified)
    }
}

/// Why a conversation was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosedReason {
    /// The user said goodbye
    UserClosed,
    /// Conversation handed to a human representative
    HandedOff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage() {
        assert_eq!(QualificationStage::default(), QualificationStage::Exploring);
    }

    #[test]
    fn test_single_step_forward_only() {
        use QualificationStage::*;
        assert!(Exploring.can_transition_to(InterestDetected));
        assert!(!Exploring.can_transition_to(IntentConfirmed));
        assert!(!Exploring.can_transition_to(Qualified));
        assert!(InterestDetected.can_transition_to(IntentConfirmed));
        assert!(!InterestDetected.can_transition_to(Exploring));
        assert!(IntentConfirmed.can_transition_to(Qualified));
        assert!(Qualified.allowed_transitions().is_empty());
    }

    #[test]
    fn test_next_walks_the_chain() {
        use QualificationStage::*;
        assert_eq!(Exploring.next(), Some(InterestDetected));
        assert_eq!(InterestDetected.next(), Some(IntentConfirmed));
        assert_eq!(IntentConfirmed.next(), Some(Qualified));
        assert_eq!(Qualified.next(), None);
    }

    #[test]
    fn test_ordering_matches_progression() {
        use QualificationStage::*;
        assert!(Exploring < InterestDetected);
        assert!(InterestDetected < IntentConfirmed);
        assert!(IntentConfirmed < Qualified);
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&QualificationStage::InterestDetected).unwrap();
        assert_eq!(json, "\"interest_detected\"");
        let back: QualificationStage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, QualificationStage::InterestDetected);
    }
}
