//! Per-turn flow controller
//!
//! A pure transform over conversation state: `turn(state, input)` takes
//! the loaded state by value and returns the new state plus a semantic
//! action for the composer. Nothing here persists anything; the
//! [`crate::Agent`] wrapper owns load and save.
//!
//! Every LLM-backed sub-call failure is caught locally and degraded to
//! "no new information this turn"; the turn always produces an action.

use crate::detection::{self, TypeDetector};
use crate::extraction::{FieldExtractor, PatternExtractor};
use crate::fields::{self, FieldName, USER_DECLINED};
use crate::selection;
use crate::state::{ConversationState, PendingConfirmation};
use crate::validation;
use brewflow_config::QualificationConfig;
use brewflow_core::{ClosedReason, CustomerType, QualificationStage};
use brewflow_llm::{LlmBackend, PromptBuilder};
use brewflow_rag::KnowledgeRetriever;
use std::collections::HashMap;
use std::sync::Arc;

/// Explicit commitment phrases that push the stage forward
const INTENT_PHRASES: &[&str] = &[
    "i want to order",
    "ready to order",
    "sign me up",
    "let's do it",
    "lets do it",
    "send me samples",
    "ready to move forward",
    "want to get started",
    "i'm ready",
];

#[derive(Debug, Clone)]
pub struct TurnInput {
    pub message_text: String,
    /// ISO country code derived from the request locale
    pub country_hint: Option<String>,
}

/// What the turn decided; the composer turns this into text
#[derive(Debug, Clone, PartialEq)]
pub enum TurnAction {
    Close { reason: ClosedReason },
    Reset,
    /// Only the confirmation question goes out this turn
    ConfirmField { original: String, suggestion: String },
    /// Knowledge-base answer; `grounded` is None when retrieval failed
    /// or found nothing relevant
    Answer { grounded: Option<String>, redirect: bool },
    /// Offer (or confirm) human handoff
    OfferHandoff { accepted: bool },
    Ask { field: FieldName, acknowledged: Vec<FieldName> },
    OpenPrompt { acknowledged: Vec<FieldName> },
    CasualReply,
}

pub struct FlowController {
    detector: TypeDetector,
    extractor: Arc<dyn FieldExtractor>,
    fallback: PatternExtractor,
    retriever: Option<Arc<KnowledgeRetriever>>,
    llm: Arc<dyn LlmBackend>,
    cfg: QualificationConfig,
}

impl FlowController {
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        extractor: Arc<dyn FieldExtractor>,
        retriever: Option<Arc<KnowledgeRetriever>>,
        cfg: QualificationConfig,
    ) -> Self {
        Self {
            detector: TypeDetector::new(llm.clone()),
            extractor,
            fallback: PatternExtractor::new(),
            retriever,
            llm,
            cfg,
        }
    }

    /// Run one turn of the state machine
    pub async fn turn(
        &self,
        mut state: ConversationState,
        input: &TurnInput,
    ) -> (ConversationState, TurnAction) {
        state.turn_count += 1;
        let message = input.message_text.as_str();

        // Closed is terminal; only an explicit reset reopens the session.
        if state.is_closed() {
            if detection::is_reset(message) {
                state.reset_to_exploring();
                return (state, TurnAction::Reset);
            }
            let reason = state.flags.closed_reason.unwrap_or(ClosedReason::UserClosed);
            return (state, TurnAction::Close { reason });
        }

        if detection::is_goodbye(message) {
            state.close(ClosedReason::UserClosed);
            return (
                state,
                TurnAction::Close {
                    reason: ClosedReason::UserClosed,
                },
            );
        }

        if detection::is_reset(message) {
            state.reset_to_exploring();
            return (state, TurnAction::Reset);
        }

        if detection::wants_human(message) {
            state.flags.wants_human_handoff = true;
            state.close(ClosedReason::HandedOff);
            return (state, TurnAction::OfferHandoff { accepted: true });
        }

        // Resolve an outstanding confirmation before anything else.
        if let Some(pending) = state.pending_confirmation.clone() {
            state.pending_confirmation = None;
            if detection::is_affirmation(message) {
                state.set_field(pending.field, pending.suggestion);
                return self.wrap_up(state, vec![pending.field], message);
            }
            // A denial (or anything else) drops the suggestion and falls
            // through; the message may carry the corrected value, and the
            // re-ask below is what counts against the field.
            if detection::is_denial(message) {
                tracing::debug!(field = %pending.field, "suggested correction rejected");
            }
        }

        let context = Self::summarize(&state);
        let type_was_unknown = state.customer_type == CustomerType::Unknown;

        // Parallel detection: classification and early extraction are
        // independent reads of the same message. Each arm fails on its
        // own without taking the other down.
        let mut extracted = if type_was_unknown {
            let (detected, early) = tokio::join!(
                self.detector.detect(message, &context),
                self.extractor
                    .extract(message, &context, fields::common_fields()),
            );

            let mut detected_type = match detected {
                Ok(d) => {
                    if d.wants_human {
                        state.flags.wants_human_handoff = true;
                    }
                    d.customer_type
                },
                Err(e) => {
                    tracing::warn!(error = %e, "type classification failed, using rules");
                    CustomerType::Unknown
                },
            };
            if detected_type == CustomerType::Unknown {
                detected_type = detection::rule_customer_type(message);
            }
            if detected_type != CustomerType::Unknown {
                tracing::info!(
                    session_id = %state.session_id,
                    customer_type = detected_type.display_name(),
                    "customer type detected"
                );
                state.customer_type = detected_type;
            }

            self.degrade(early, message, fields::common_fields()).await
        } else {
            let targets = Self::targets_for(&state);
            let result = self.extractor.extract(message, &context, &targets).await;
            self.degrade(result, message, &targets).await
        };

        // Second pass for fields that only became relevant once the
        // customer type was known.
        if type_was_unknown && state.customer_type.is_qualifiable() {
            let extra: Vec<FieldName> = Self::targets_for(&state)
                .into_iter()
                .filter(|f| !extracted.contains_key(f) && !fields::common_fields().contains(f))
                .collect();
            if !extra.is_empty() {
                let result = self.extractor.extract(message, &context, &extra).await;
                extracted.extend(self.degrade(result, message, &extra).await);
            }
        }

        if detection::declines_contact(message) {
            state.flags.refused_contact = true;
            // "rather not share my number, but my email is ..." still
            // carries a contact; only blank channels get the sentinel
            for field in [FieldName::Email, FieldName::Phone] {
                if !extracted.contains_key(&field) {
                    state.fields.entry(field).or_insert_with(|| USER_DECLINED.to_string());
                }
            }
            state.topics_discussed.insert("contact".to_string());
        }

        // Commit extracted values, validating contact fields.
        let mut acknowledged: Vec<FieldName> = Vec::new();
        let mut confirm: Option<PendingConfirmation> = None;
        let mut entries: Vec<(FieldName, String)> = extracted.into_iter().collect();
        entries.sort_by_key(|(f, _)| *f);

        for (field, value) in entries {
            if state.has_field(field) {
                continue;
            }
            match field {
                FieldName::Email => {
                    let v = validation::validate_email(&value);
                    if !v.valid {
                        tracing::debug!(value = %v.normalized, "email rejected");
                    } else if let Some(suggestion) = v.suspected_typo {
                        confirm = Some(PendingConfirmation {
                            field,
                            original: v.normalized,
                            suggestion,
                        });
                    } else {
                        state.set_field(field, v.normalized);
                        acknowledged.push(field);
                    }
                },
                FieldName::Phone => {
                    let v = validation::validate_phone(&value, input.country_hint.as_deref());
                    if v.valid {
                        state.set_field(field, v.normalized);
                        acknowledged.push(field);
                    } else {
                        tracing::debug!(value = %v.normalized, "phone rejected");
                    }
                },
                _ => {
                    state.set_field(field, value);
                    acknowledged.push(field);
                },
            }
        }

        if let Some(pc) = confirm {
            state.pending_confirmation = Some(pc.clone());
            return (
                state,
                TurnAction::ConfirmField {
                    original: pc.original,
                    suggestion: pc.suggestion,
                },
            );
        }

        // Knowledge-base questions answer without advancing the stage.
        if detection::is_knowledge_question(message) && acknowledged.is_empty() {
            state.knowledge_question_count += 1;
            let grounded = self.answer_grounded(message, &state).await;
            let redirect = state.customer_type.is_qualifiable()
                && !state.stage.is_qualified()
                && state.knowledge_question_count >= self.cfg.knowledge_redirect_after;
            if state.stage.is_qualified() {
                // the composer appends the handoff offer to the answer
                state.flags.handoff_offered = true;
            }
            return (state, TurnAction::Answer { grounded, redirect });
        }

        if state.customer_type == CustomerType::Casual {
            return (state, TurnAction::CasualReply);
        }

        // Upgrade signals advance at most one stage per turn, and never
        // into Qualified; completeness alone decides that below.
        let text = message.to_lowercase();
        let commitment = acknowledged.iter().any(|f| {
            matches!(
                f,
                FieldName::Timeline
                    | FieldName::Equipment
                    | FieldName::Volume
                    | FieldName::CurrentPainPoints
                    | FieldName::CafeCount
            )
        }) || INTENT_PHRASES.iter().any(|p| text.contains(p));

        if commitment
            && state.customer_type.is_qualifiable()
            && state.stage.next() != Some(QualificationStage::Qualified)
        {
            state.advance_stage();
        }

        self.wrap_up(state, acknowledged, message)
    }

    /// Completeness check, dodge tracking, and next-question selection.
    fn wrap_up(
        &self,
        mut state: ConversationState,
        acknowledged: Vec<FieldName>,
        message: &str,
    ) -> (ConversationState, TurnAction) {
        if state.pending_confirmation.is_none()
            && fields::is_qualified(&state.fields, state.customer_type)
        {
            state.mark_qualified();
        }

        if state.stage.is_qualified() {
            // An affirmation only accepts when an offer is outstanding;
            // "yes" about something else must not trigger a handoff.
            let accepted = state.flags.handoff_offered && detection::is_affirmation(message);
            if accepted {
                state.flags.wants_human_handoff = true;
                state.close(ClosedReason::HandedOff);
            } else {
                state.flags.handoff_offered = true;
            }
            return (state, TurnAction::OfferHandoff { accepted });
        }

        // A preferred question that went unanswered counts as a dodge.
        if let Some(last) = state.last_field_asked {
            if fields::preferred_fields(state.customer_type).contains(&last)
                && !state.has_field(last)
                && !acknowledged.contains(&last)
            {
                state.preferred_skip_count += 1;
            }
        }

        match selection::next_field(&state, &self.cfg) {
            Some(field) => {
                state.record_ask(field);
                (state, TurnAction::Ask { field, acknowledged })
            },
            None => (state, TurnAction::OpenPrompt { acknowledged }),
        }
    }

    /// Degrade a failed LLM extraction to the regex fallback
    async fn degrade(
        &self,
        result: Result<HashMap<FieldName, String>, crate::AgentError>,
        message: &str,
        targets: &[FieldName],
    ) -> HashMap<FieldName, String> {
        match result {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(error = %e, "extraction failed, using pattern fallback");
                self.fallback
                    .extract(message, "", targets)
                    .await
                    .unwrap_or_default()
            },
        }
    }

    /// Answer a knowledge question from retrieved passages. `None` means
    /// no grounded answer is available; the composer falls back to a
    /// canned line rather than fabricating content.
    async fn answer_grounded(&self, message: &str, state: &ConversationState) -> Option<String> {
        let retriever = self.retriever.as_ref()?;
        let passages = match retriever.retrieve(message, None).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(
                    session_id = %state.session_id,
                    error = %e,
                    "retrieval unavailable, answering ungrounded"
                );
                return None;
            },
        };
        if passages.is_empty() {
            return None;
        }

        let prompt = PromptBuilder::new()
            .system(
                "You are a friendly assistant for a specialty coffee supplier. \
                 Answer the question in two or three sentences using only the \
                 knowledge provided. If the knowledge does not cover it, say so.",
            )
            .context("Knowledge", KnowledgeRetriever::format_context(&passages))
            .user(message)
            .build();

        match self.llm.generate(&prompt).await {
            Ok(text) => {
                let text = text.trim().to_string();
                (!text.is_empty()).then_some(text)
            },
            Err(e) => {
                tracing::warn!(error = %e, "grounded generation failed");
                None
            },
        }
    }

    /// Missing fields relevant to the current customer type
    fn targets_for(state: &ConversationState) -> Vec<FieldName> {
        if !state.customer_type.is_qualifiable() {
            return fields::common_fields().to_vec();
        }
        let mut targets: Vec<FieldName> = Vec::new();
        for f in fields::required_fields(state.customer_type) {
            if !state.has_field(*f) {
                targets.push(*f);
            }
        }
        for f in [FieldName::Email, FieldName::Phone] {
            if !state.has_field(f) {
                targets.push(f);
            }
        }
        for f in fields::preferred_fields(state.customer_type) {
            if !state.has_field(*f) {
                targets.push(*f);
            }
        }
        targets
    }

    /// Compact context string for classification/extraction prompts
    fn summarize(state: &ConversationState) -> String {
        let mut known: Vec<String> = state
            .fields
            .iter()
            .filter(|(_, v)| v.as_str() != USER_DECLINED)
            .map(|(f, v)| format!("{}={}", f, v))
            .collect();
        known.sort();
        format!(
            "customer_type={}; stage={}; known: {}",
            state.customer_type.display_name(),
            state.stage.display_name(),
            if known.is_empty() {
                "nothing yet".to_string()
            } else {
                known.join(", ")
            }
        )
    }
}
