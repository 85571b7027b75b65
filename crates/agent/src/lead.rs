//! Qualified lead records
//!
//! Built once a conversation reaches the Qualified stage and handed to
//! a [`LeadSink`]. The CRM workflow behind the sink is not this crate's
//! concern.

use crate::fields::{self, FieldName, USER_DECLINED};
use crate::state::ConversationState;
use crate::AgentError;
use async_trait::async_trait;
use brewflow_core::CustomerType;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualifiedLead {
    pub session_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub customer_type: CustomerType,
    pub fields: HashMap<FieldName, String>,
    pub summary: String,
    /// 0-100: contact completeness plus preferred-field coverage
    pub score: u32,
    pub qualified_at: DateTime<Utc>,
}

fn contact(state: &ConversationState, field: FieldName) -> Option<String> {
    state
        .fields
        .get(&field)
        .filter(|v| !v.is_empty() && v.as_str() != USER_DECLINED)
        .cloned()
}

fn score(state: &ConversationState) -> u32 {
    let mut score = 40u32; // name plus one contact channel got us here
    if contact(state, FieldName::Email).is_some() && contact(state, FieldName::Phone).is_some() {
        score += 10;
    }
    let preferred = fields::preferred_fields(state.customer_type);
    if !preferred.is_empty() {
        let filled = preferred.iter().filter(|f| state.has_field(**f)).count();
        score += (50 * filled as u32) / preferred.len() as u32;
    }
    score.min(100)
}

fn summarize(state: &ConversationState) -> String {
    let mut parts: Vec<String> = state
        .fields
        .iter()
        .filter(|(f, v)| !f.is_contact() && v.as_str() != USER_DECLINED)
        .map(|(f, v)| format!("{}: {}", f, v))
        .collect();
    parts.sort();
    format!(
        "{} lead. {}",
        state.customer_type.display_name(),
        parts.join("; ")
    )
}

/// Build the lead record for a qualified conversation. Returns `None`
/// when the state does not actually satisfy completeness.
pub fn build_lead(state: &ConversationState) -> Option<QualifiedLead> {
    if !fields::is_qualified(&state.fields, state.customer_type) {
        return None;
    }
    Some(QualifiedLead {
        session_id: state.session_id.clone(),
        name: state.fields.get(&FieldName::Name)?.clone(),
        email: contact(state, FieldName::Email),
        phone: contact(state, FieldName::Phone),
        customer_type: state.customer_type,
        fields: state.fields.clone(),
        summary: summarize(state),
        score: score(state),
        qualified_at: Utc::now(),
    })
}

/// Destination for finalized leads (the CRM seam)
#[async_trait]
pub trait LeadSink: Send + Sync {
    async fn deliver(&self, lead: QualifiedLead) -> Result<(), AgentError>;
}

/// In-process sink, useful for tests and single-node deployments
#[derive(Default)]
pub struct MemoryLeadSink {
    leads: Mutex<Vec<QualifiedLead>>,
}

impl MemoryLeadSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leads(&self) -> Vec<QualifiedLead> {
        self.leads.lock().clone()
    }
}

#[async_trait]
impl LeadSink for MemoryLeadSink {
    async fn deliver(&self, lead: QualifiedLead) -> Result<(), AgentError> {
        tracing::info!(
            session_id = %lead.session_id,
            score = lead.score,
            "lead delivered"
        );
        self.leads.lock().push(lead);
        Ok(())
    }
}
