//! Next-question selection
//!
//! A pure function over the accumulated state: no field that is already
//! set, over-asked, or whose topic was covered is ever selected. Order
//! is required-first (name, then one contact channel), then the
//! preferred fields for the customer type.

use crate::fields::{self, FieldName};
use crate::state::ConversationState;
use brewflow_config::QualificationConfig;

fn askable(state: &ConversationState, field: FieldName, cfg: &QualificationConfig) -> bool {
    !state.has_field(field)
        && state.ask_count(field) <= cfg.max_field_asks
        && !state.topics_discussed.contains(field.topic())
}

/// Pick the next field to ask for, or `None` when an open-ended prompt
/// is the best remaining move.
pub fn next_field(state: &ConversationState, cfg: &QualificationConfig) -> Option<FieldName> {
    if !state.customer_type.is_qualifiable() {
        return None;
    }

    for field in fields::required_fields(state.customer_type) {
        if askable(state, *field, cfg) {
            return Some(*field);
        }
    }

    // One contact channel is enough; stop once either is in.
    if !fields::has_contact(&state.fields) && !state.flags.refused_contact {
        for field in [FieldName::Email, FieldName::Phone] {
            if askable(state, field, cfg) {
                return Some(field);
            }
        }
    }

    if state.preferred_skip_count >= cfg.max_preferred_skips {
        return None;
    }
    fields::preferred_fields(state.customer_type)
        .iter()
        .copied()
        .find(|f| askable(state, *f, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewflow_core::CustomerType;

    fn new_business_state() -> ConversationState {
        let mut state = ConversationState::new("s1");
        state.customer_type = CustomerType::NewBusiness;
        state
    }

    fn cfg() -> QualificationConfig {
        QualificationConfig::default()
    }

    #[test]
    fn test_name_comes_first() {
        let state = new_business_state();
        assert_eq!(next_field(&state, &cfg()), Some(FieldName::Name));
    }

    #[test]
    fn test_contact_after_name() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        assert_eq!(next_field(&state, &cfg()), Some(FieldName::Email));
    }

    #[test]
    fn test_one_contact_channel_is_enough() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        state.set_field(FieldName::Phone, "+15551234567");
        // contact satisfied; moves on to preferred fields
        assert_eq!(next_field(&state, &cfg()), Some(FieldName::Timeline));
    }

    #[test]
    fn test_set_field_never_reselected() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        state.set_field(FieldName::Email, "jane@example.com");
        state.set_field(FieldName::Timeline, "next spring");
        let next = next_field(&state, &cfg());
        assert_ne!(next, Some(FieldName::Name));
        assert_ne!(next, Some(FieldName::Timeline));
        assert_eq!(next, Some(FieldName::CoffeeStyle));
    }

    #[test]
    fn test_over_asked_field_excluded() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        state.set_field(FieldName::Email, "jane@example.com");
        for _ in 0..4 {
            state.record_ask(FieldName::Timeline);
        }
        // ask_count 4 > 3: permanently skipped
        assert_eq!(next_field(&state, &cfg()), Some(FieldName::CoffeeStyle));
    }

    #[test]
    fn test_at_threshold_still_askable() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        state.set_field(FieldName::Email, "jane@example.com");
        for _ in 0..3 {
            state.record_ask(FieldName::Timeline);
        }
        assert_eq!(next_field(&state, &cfg()), Some(FieldName::Timeline));
    }

    #[test]
    fn test_discussed_topic_suppressed() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        state.set_field(FieldName::Email, "jane@example.com");
        state.topics_discussed.insert("timeline".to_string());
        assert_eq!(next_field(&state, &cfg()), Some(FieldName::CoffeeStyle));
    }

    #[test]
    fn test_refused_contact_skips_contact_fields() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        state.flags.refused_contact = true;
        assert_eq!(next_field(&state, &cfg()), Some(FieldName::Timeline));
    }

    #[test]
    fn test_preferred_abandoned_after_skips() {
        let mut state = new_business_state();
        state.set_field(FieldName::Name, "Jane");
        state.set_field(FieldName::Email, "jane@example.com");
        state.preferred_skip_count = 2;
        assert_eq!(next_field(&state, &cfg()), None);
    }

    #[test]
    fn test_casual_gets_no_questions() {
        let mut state = ConversationState::new("s1");
        state.customer_type = CustomerType::Casual;
        assert_eq!(next_field(&state, &cfg()), None);
    }

    #[test]
    fn test_unknown_type_gets_no_questions() {
        let state = ConversationState::new("s1");
        assert_eq!(next_field(&state, &cfg()), None);
    }
}
