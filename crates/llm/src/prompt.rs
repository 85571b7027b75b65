//! Prompt assembly
//!
//! A small builder that keeps system, context, and user sections in a
//! fixed order so prompts stay consistent across call sites.

#[derive(Debug, Default, Clone)]
pub struct PromptBuilder {
    system: Option<String>,
    context: Vec<String>,
    user: Option<String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.system = Some(text.into());
        self
    }

    /// Append a labeled context block (conversation summary, retrieved
    /// passages, field schema, ...)
    pub fn context(mut self, label: &str, text: impl Into<String>) -> Self {
        self.context.push(format!("## {}\n{}", label, text.into()));
        self
    }

    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.user = Some(text.into());
        self
    }

    pub fn build(self) -> String {
        let mut parts = Vec::new();
        if let Some(system) = self.system {
            parts.push(system);
        }
        parts.extend(self.context);
        if let Some(user) = self.user {
            parts.push(format!("## User message\n{}", user));
        }
        parts.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_order() {
        let prompt = PromptBuilder::new()
            .user("hello")
            .context("Knowledge", "passage one")
            .system("You are a helpful assistant.")
            .build();

        let sys_pos = prompt.find("helpful assistant").unwrap();
        let ctx_pos = prompt.find("passage one").unwrap();
        let user_pos = prompt.find("hello").unwrap();
        assert!(sys_pos < ctx_pos && ctx_pos < user_pos);
    }

    #[test]
    fn test_empty_builder() {
        assert_eq!(PromptBuilder::new().build(), "");
    }
}
