//! Response composition
//!
//! Turns a [`TurnAction`] plus state into the final reply. New
//! information is always acknowledged before the next question, and a
//! confirmation turn carries nothing but the confirmation question.

use crate::fields::FieldName;
use crate::flow::TurnAction;
use crate::questions;
use crate::state::ConversationState;

fn acknowledgements(state: &ConversationState, acknowledged: &[FieldName]) -> Option<String> {
    if acknowledged.is_empty() {
        return None;
    }
    let lines: Vec<String> = acknowledged
        .iter()
        .filter_map(|f| {
            state
                .fields
                .get(f)
                .map(|v| questions::acknowledgement(*f, v))
        })
        .collect();
    if lines.is_empty() {
        None
    } else {
        // One acknowledgement is enough even when several fields landed
        Some(lines[0].clone())
    }
}

pub fn compose(state: &ConversationState, action: &TurnAction) -> String {
    match action {
        TurnAction::Close { .. } => questions::closing_line().to_string(),

        TurnAction::Reset => questions::reset_line().to_string(),

        TurnAction::ConfirmField {
            original,
            suggestion,
        } => questions::confirmation_question(original, suggestion),

        TurnAction::Answer { grounded, redirect } => {
            let mut reply = grounded
                .clone()
                .unwrap_or_else(|| questions::ungrounded_fallback().to_string());
            if state.stage.is_qualified() {
                reply.push(' ');
                reply.push_str(questions::handoff_offer());
            } else if *redirect {
                reply.push(' ');
                reply.push_str(questions::redirect_line());
            }
            reply
        },

        TurnAction::OfferHandoff { accepted } => {
            if *accepted {
                questions::handoff_confirm().to_string()
            } else {
                questions::handoff_offer().to_string()
            }
        },

        TurnAction::Ask {
            field,
            acknowledged,
        } => {
            // record_ask already ran, so back up one for the variant index
            let question =
                questions::question_for(*field, state.ask_count(*field).saturating_sub(1));
            match acknowledgements(state, acknowledged) {
                Some(ack) => format!("{} {}", ack, question),
                None => question.to_string(),
            }
        },

        TurnAction::OpenPrompt { acknowledged } => match acknowledgements(state, acknowledged) {
            Some(ack) => format!("{} {}", ack, questions::open_prompt()),
            None => {
                if state.turn_count <= 1 {
                    questions::greeting_prompt().to_string()
                } else {
                    questions::open_prompt().to_string()
                }
            }
        },

        TurnAction::CasualReply => questions::casual_reply().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewflow_core::QualificationStage;

    #[test]
    fn test_confirmation_is_the_whole_reply() {
        let state = ConversationState::new("s1");
        let action = TurnAction::ConfirmField {
            original: "jane@gmial.com".to_string(),
            suggestion: "jane@gmail.com".to_string(),
        };
        let reply = compose(&state, &action);
        assert!(reply.contains("jane@gmail.com"));
        // no question mark beyond the confirmation itself
        assert_eq!(reply.matches('?').count(), 1);
    }

    #[test]
    fn test_ack_precedes_question() {
        let mut state = ConversationState::new("s1");
        state.set_field(FieldName::Name, "Jane");
        state.record_ask(FieldName::Email);
        let action = TurnAction::Ask {
            field: FieldName::Email,
            acknowledged: vec![FieldName::Name],
        };
        let reply = compose(&state, &action);
        let ack_pos = reply.find("Jane").unwrap();
        let q_pos = reply.find("email").unwrap();
        assert!(ack_pos < q_pos);
    }

    #[test]
    fn test_qualified_answer_offers_handoff() {
        let mut state = ConversationState::new("s1");
        state.mark_qualified();
        let action = TurnAction::Answer {
            grounded: Some("We roast twice a week.".to_string()),
            redirect: false,
        };
        let reply = compose(&state, &action);
        assert!(reply.contains("We roast twice a week."));
        assert!(reply.contains("connect you"));
    }

    #[test]
    fn test_redirect_appended() {
        let state = ConversationState::new("s1");
        let action = TurnAction::Answer {
            grounded: Some("Yes, we deliver.".to_string()),
            redirect: true,
        };
        let reply = compose(&state, &action);
        assert!(reply.starts_with("Yes, we deliver."));
        assert!(reply.len() > "Yes, we deliver.".len());
    }

    #[test]
    fn test_ungrounded_fallback_used() {
        let state = ConversationState::new("s1");
        let action = TurnAction::Answer {
            grounded: None,
            redirect: false,
        };
        let reply = compose(&state, &action);
        assert_eq!(reply, crate::questions::ungrounded_fallback());
        assert_eq!(state.stage, QualificationStage::Exploring);
    }
}
