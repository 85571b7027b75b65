//! Session storage seam
//!
//! The store must serialize saves per session; callers guarantee
//! at-most-one-in-flight turn per session (the server enforces this
//! with a per-session lock).

use crate::state::ConversationState;
use crate::AgentError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` for unknown sessions; callers initialize fresh state.
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, AgentError>;

    async fn save(&self, state: &ConversationState) -> Result<(), AgentError>;
}

/// In-memory store for tests and single-node deployments
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, ConversationState>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, session_id: &str) -> Result<Option<ConversationState>, AgentError> {
        Ok(self.sessions.read().get(session_id).cloned())
    }

    async fn save(&self, state: &ConversationState) -> Result<(), AgentError> {
        self.sessions
            .write()
            .insert(state.session_id.clone(), state.clone());
        Ok(())
    }
}
