//! Response text fragments
//!
//! Question variants per field (rotated by ask-count so repeats don't
//! sound canned), plus the fixed lines the composer stitches together.

use crate::fields::FieldName;

fn variants(field: FieldName) -> &'static [&'static str] {
    match field {
        FieldName::Name => &[
            "Before we go further, what's your name?",
            "I didn't catch your name, what should I call you?",
            "And your name is?",
        ],
        FieldName::Email => &[
            "What's the best email to reach you on?",
            "Could you share an email so we can send details over?",
            "If you drop me an email address I'll send through our wholesale pack.",
        ],
        FieldName::Phone => &[
            "What's a good phone number for you?",
            "Is there a number our team could call you on?",
        ],
        FieldName::Timeline => &[
            "When are you hoping to open?",
            "What's your opening timeline looking like?",
        ],
        FieldName::CoffeeStyle => &[
            "What style of coffee do you want to serve, classic espresso, filter, something lighter?",
            "Any idea what kind of coffee program you're after?",
        ],
        FieldName::Equipment => &[
            "Do you have espresso equipment sorted, or is that still open?",
            "What machine are you planning to run?",
        ],
        FieldName::Volume => &[
            "Roughly how much coffee do you expect to go through each week?",
            "Any sense of your weekly volume yet?",
        ],
        FieldName::CurrentPainPoints => &[
            "What's not working with your current supplier?",
            "What would you change about your current coffee setup?",
        ],
        FieldName::CafeCount => &[
            "How many locations are you running?",
            "Is it just the one venue, or a few?",
        ],
        FieldName::SupportNeeds => &[
            "What kind of support matters most to you, training, servicing, something else?",
            "Where could a supplier help you most day to day?",
        ],
        FieldName::CurrentCoffeeStyle => &[
            "What are you serving at the moment?",
            "What's your current house coffee like?",
        ],
        FieldName::CoffeePreference => &[
            "Any roast or origin preferences?",
            "Do you lean darker or lighter on roast?",
        ],
    }
}

/// The question for a field, rotated by how often it has been asked
pub fn question_for(field: FieldName, ask_count: u32) -> &'static str {
    let options = variants(field);
    options[(ask_count as usize) % options.len()]
}

/// Per-field acknowledgement when a value just landed
pub fn acknowledgement(field: FieldName, value: &str) -> String {
    match field {
        FieldName::Name => format!("Great to meet you, {}!", value),
        FieldName::Email => "Got it, I've noted your email.".to_string(),
        FieldName::Phone => "Perfect, I've noted your number.".to_string(),
        FieldName::Timeline => format!("{} sounds like a great time to open.", capitalize(value)),
        _ => "Thanks, that's really helpful.".to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

pub fn confirmation_question(original: &str, suggestion: &str) -> String {
    format!(
        "Just to double-check, you wrote {}. Did you mean {}?",
        original, suggestion
    )
}

pub fn open_prompt() -> &'static str {
    "Is there anything else about your coffee plans I can help with?"
}

pub fn redirect_line() -> &'static str {
    "Happy to keep answering questions, and so I can point you to the right things, a couple of quick details would help."
}

pub fn handoff_offer() -> &'static str {
    "You're all set. Would you like me to connect you with one of our team to talk specifics?"
}

pub fn handoff_confirm() -> &'static str {
    "Of course, I'll get one of our team to reach out shortly."
}

pub fn closing_line() -> &'static str {
    "Thanks for stopping by! Come back any time."
}

pub fn reset_line() -> &'static str {
    "No problem, let's start fresh. What can I help you with?"
}

pub fn ungrounded_fallback() -> &'static str {
    "I don't have that detail to hand right now, but our team can fill you in."
}

pub fn casual_reply() -> &'static str {
    "Lovely! Feel free to ask anything about our coffees, and if you're ever opening a venue we'd love to help."
}

pub fn greeting_prompt() -> &'static str {
    "Tell me a bit about what you're working on and I'll point you in the right direction."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_wraps() {
        let first = question_for(FieldName::Email, 0);
        let fourth = question_for(FieldName::Email, 3);
        assert_eq!(first, fourth);
        assert_ne!(question_for(FieldName::Email, 0), question_for(FieldName::Email, 1));
    }

    #[test]
    fn test_every_field_has_variants() {
        use FieldName::*;
        for field in [
            Name, Email, Phone, Timeline, CoffeeStyle, Equipment, Volume, CurrentPainPoints,
            CafeCount, SupportNeeds, CurrentCoffeeStyle, CoffeePreference,
        ] {
            assert!(!question_for(field, 0).is_empty());
        }
    }

    #[test]
    fn test_confirmation_question_mentions_both() {
        let q = confirmation_question("jane@gmial.com", "jane@gmail.com");
        assert!(q.contains("jane@gmial.com"));
        assert!(q.contains("jane@gmail.com"));
    }
}
