//! Message detection
//!
//! Rule tables for the cheap, high-precision signals (goodbyes, resets,
//! handoff requests, knowledge questions) plus an LLM classifier for
//! customer typing. The classifier runs concurrently with early field
//! extraction; when it fails, the rule fallback keeps the turn moving.

use brewflow_core::CustomerType;
use brewflow_llm::{LlmBackend, PromptBuilder};
use std::sync::Arc;

const GOODBYE_PHRASES: &[&str] = &["bye", "goodbye", "see you", "talk later"];

const RESET_PHRASES: &[&str] = &["start over", "start again", "restart", "reset this"];

const CASUAL_PHRASES: &[&str] = &[
    "just looking",
    "just browsing",
    "just curious",
    "not a business",
    "for home",
    "for my home",
    "as a hobby",
    "home barista",
];

const HANDOFF_PHRASES: &[&str] = &[
    "talk to a human",
    "talk to a person",
    "speak to someone",
    "speak to a human",
    "speak with a human",
    "real person",
    "talk to sales",
    "call me",
];

const DECLINE_CONTACT_PHRASES: &[&str] = &[
    "rather not",
    "won't give",
    "wont give",
    "don't want to share",
    "dont want to share",
    "not sharing",
    "no phone",
    "no email",
    "prefer not to",
];

const NEW_BUSINESS_PHRASES: &[&str] = &[
    "opening a",
    "opening my",
    "about to open",
    "planning to open",
    "starting a",
    "launching a",
    "new cafe",
    "new café",
    "first cafe",
];

const EXISTING_BUSINESS_PHRASES: &[&str] = &[
    "my cafe",
    "my café",
    "our cafe",
    "our café",
    "my shop",
    "our shops",
    "we run",
    "we operate",
    "i own",
    "we own",
    "our locations",
    "current supplier",
    "current roaster",
];

const QUESTION_STARTERS: &[&str] = &[
    "what", "how", "where", "when", "why", "who", "which", "do you", "does", "can you",
    "could you", "is there", "are there", "tell me about",
];

const INFO_REQUEST_PHRASES: &[&str] = &["i'd like to know", "curious about", "wondering about"];

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

/// Goodbye matched as whole words/phrases so "buy" and "bye-products"
/// don't close the conversation.
pub fn is_goodbye(message: &str) -> bool {
    let text = message.to_lowercase();
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| ",.!?;:\"'".contains(c)))
        .filter(|w| !w.is_empty())
        .collect();

    GOODBYE_PHRASES.iter().any(|phrase| {
        let phrase_words: Vec<&str> = phrase.split(' ').collect();
        words
            .windows(phrase_words.len())
            .any(|w| w == phrase_words.as_slice())
    })
}

pub fn is_reset(message: &str) -> bool {
    contains_any(&message.to_lowercase(), RESET_PHRASES)
}

pub fn is_casual(message: &str) -> bool {
    contains_any(&message.to_lowercase(), CASUAL_PHRASES)
}

pub fn wants_human(message: &str) -> bool {
    contains_any(&message.to_lowercase(), HANDOFF_PHRASES)
}

pub fn declines_contact(message: &str) -> bool {
    contains_any(&message.to_lowercase(), DECLINE_CONTACT_PHRASES)
}

pub fn is_affirmation(message: &str) -> bool {
    let text = message.trim().to_lowercase();
    matches!(
        text.as_str(),
        "yes" | "yeah" | "yep" | "yup" | "correct" | "right" | "that's right" | "sure"
    ) || text.starts_with("yes")
}

pub fn is_denial(message: &str) -> bool {
    let text = message.trim().to_lowercase();
    matches!(text.as_str(), "no" | "nope" | "nah" | "incorrect" | "that's wrong")
        || text.starts_with("no ")
        || text.starts_with("no,")
}

/// Whether the message reads as a knowledge-base question rather than a
/// qualification answer.
pub fn is_knowledge_question(message: &str) -> bool {
    let text = message.trim().to_lowercase();
    if text.contains('?') {
        return true;
    }
    QUESTION_STARTERS
        .iter()
        .any(|s| text.starts_with(s) && (text.len() == s.len() || text.as_bytes()[s.len()] == b' '))
        || contains_any(&text, INFO_REQUEST_PHRASES)
}

/// Rule-based customer typing, used when the classifier is unavailable
/// or undecided.
pub fn rule_customer_type(message: &str) -> CustomerType {
    let text = message.to_lowercase();
    if contains_any(&text, CASUAL_PHRASES) {
        CustomerType::Casual
    } else if contains_any(&text, EXISTING_BUSINESS_PHRASES) {
        CustomerType::ExistingBusiness
    } else if contains_any(&text, NEW_BUSINESS_PHRASES) {
        CustomerType::NewBusiness
    } else {
        CustomerType::Unknown
    }
}

/// Classifier output
#[derive(Debug, Clone, Default)]
pub struct TypeDetection {
    pub customer_type: CustomerType,
    pub wants_human: bool,
}

/// LLM customer-type classifier
pub struct TypeDetector {
    backend: Arc<dyn LlmBackend>,
}

impl TypeDetector {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    pub async fn detect(
        &self,
        message: &str,
        context: &str,
    ) -> Result<TypeDetection, brewflow_llm::LlmError> {
        let mut builder = PromptBuilder::new().system(
            "Classify a message sent to a specialty coffee supplier. \
             Return JSON: {\"customer_type\": one of \
             \"new_business\" (opening a venue), \
             \"existing_business\" (already operates venues), \
             \"casual\" (browsing or home use), \
             \"unknown\" (cannot tell), \
             \"wants_human\": boolean}.",
        );
        if !context.is_empty() {
            builder = builder.context("Conversation so far", context);
        }
        let prompt = builder.user(message).build();

        let value = self.backend.generate_structured(&prompt).await?;
        let customer_type = value
            .get("customer_type")
            .and_then(|v| v.as_str())
            .and_then(|s| serde_json::from_value(serde_json::Value::String(s.to_string())).ok())
            .unwrap_or(CustomerType::Unknown);
        let wants_human = value
            .get("wants_human")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        Ok(TypeDetection {
            customer_type,
            wants_human,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goodbye_whole_words() {
        assert!(is_goodbye("ok bye"));
        assert!(is_goodbye("Goodbye!"));
        assert!(is_goodbye("see you later"));
        assert!(is_goodbye("talk later"));
        assert!(!is_goodbye("I want to buy beans"));
        assert!(!is_goodbye("what about bye-products"));
    }

    #[test]
    fn test_question_detection() {
        assert!(is_knowledge_question("What blends do you offer?"));
        assert!(is_knowledge_question("do you deliver on weekends"));
        assert!(is_knowledge_question("tell me about your roasts"));
        assert!(is_knowledge_question("I'm curious about pricing"));
        assert!(!is_knowledge_question("my email is jane@example.com"));
        assert!(!is_knowledge_question("we open next spring"));
    }

    #[test]
    fn test_rule_customer_type() {
        assert_eq!(
            rule_customer_type("I'm opening a café downtown next spring"),
            CustomerType::NewBusiness
        );
        assert_eq!(
            rule_customer_type("we run 3 cafes and our current supplier is slow"),
            CustomerType::ExistingBusiness
        );
        assert_eq!(
            rule_customer_type("just looking around, I brew at home"),
            CustomerType::Casual
        );
        assert_eq!(rule_customer_type("hello"), CustomerType::Unknown);
    }

    #[test]
    fn test_affirmation_and_denial() {
        assert!(is_affirmation("yes"));
        assert!(is_affirmation("Yes, that's right"));
        assert!(is_denial("no"));
        assert!(is_denial("No, it's jane@gmx.com"));
        assert!(!is_affirmation("no"));
        assert!(!is_denial("yes"));
    }

    #[test]
    fn test_handoff_and_decline() {
        assert!(wants_human("can I talk to a human please"));
        assert!(declines_contact("I'd rather not share my number"));
        assert!(!declines_contact("here's my number"));
    }

    #[test]
    fn test_reset() {
        assert!(is_reset("let's start over"));
        assert!(!is_reset("start the machine"));
    }
}
