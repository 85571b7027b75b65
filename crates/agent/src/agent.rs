//! Turn entry point
//!
//! Wraps the pure flow controller with session load/save and lead
//! delivery. Persistence failure is the one fatal error: no response is
//! ever returned without the matching state saved.

use crate::composer;
use crate::flow::{FlowController, TurnInput};
use crate::lead::{self, LeadSink};
use crate::state::ConversationState;
use crate::traits::SessionStore;
use crate::validation;
use crate::AgentError;
use brewflow_core::{TurnRequest, TurnResponse};
use std::sync::Arc;

pub struct Agent {
    flow: FlowController,
    store: Arc<dyn SessionStore>,
    lead_sink: Arc<dyn LeadSink>,
}

impl Agent {
    pub fn new(
        flow: FlowController,
        store: Arc<dyn SessionStore>,
        lead_sink: Arc<dyn LeadSink>,
    ) -> Self {
        Self {
            flow,
            store,
            lead_sink,
        }
    }

    /// Process one user message.
    ///
    /// Callers must not overlap turns for the same session; the state
    /// read-modify-write is only safe when turns are serialized.
    #[tracing::instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn handle_turn(&self, request: TurnRequest) -> Result<TurnResponse, AgentError> {
        let state = self
            .store
            .load(&request.session_id)
            .await?
            .unwrap_or_else(|| ConversationState::new(&request.session_id));
        let stage_before = state.stage;

        let input = TurnInput {
            message_text: request.message_text.clone(),
            country_hint: validation::country_from_locale(request.locale_hint.as_deref()),
        };
        let (new_state, action) = self.flow.turn(state, &input).await;

        // Deliver the lead record the moment qualification completes.
        // Delivery failure is logged, not fatal; the lead can be rebuilt
        // from persisted state.
        if new_state.stage.is_qualified() && !stage_before.is_qualified() {
            if let Some(lead) = lead::build_lead(&new_state) {
                if let Err(e) = self.lead_sink.deliver(lead).await {
                    tracing::error!(error = %e, "lead delivery failed");
                }
            }
        }

        // Fatal on failure: progress must never be shown unpersisted.
        self.store.save(&new_state).await?;

        let response_text = composer::compose(&new_state, &action);
        tracing::debug!(
            stage = new_state.stage.display_name(),
            closed = new_state.is_closed(),
            "turn complete"
        );

        Ok(TurnResponse {
            response_text,
            stage_after_turn: new_state.stage,
            closed: new_state.is_closed(),
        })
    }
}
