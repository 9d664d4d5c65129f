//! The per-turn pipeline.
//!
//! Each invocation is stateless: everything a turn needs arrives in the
//! request and everything the next turn needs goes back in the response.
//! Control flow: guard → deterministic extraction → semantic fallback →
//! chip parse → merge → controller → (if ready) generate/validate/repair.

use crate::generation::{GenerationAdapter, ScheduleService};
use crate::semantic_extractor::SemanticExtractorService;
use crate::topic_classifier::TopicClassifierService;
use somni_core::capability::CompletionAgent;
use somni_core::dialogue::{plan_turn, TurnPlan};
use somni_core::error::{Result, SomniError};
use somni_core::extractor::{extract, parse_chip_answer};
use somni_core::fields::merge;
use somni_core::guard;
use somni_core::knowledge::KnowledgeSource;
use somni_core::session::SessionState;
use somni_core::turn::{TurnRequest, TurnResponse};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Below this, the semantic extraction fallback runs (when the age is
/// also still unknown).
pub const SEMANTIC_FALLBACK_THRESHOLD: f32 = 0.3;

/// Below this, a first-turn message that passed keyword screening still
/// gets the one-shot semantic topic check.
pub const TOPIC_CHECK_THRESHOLD: f32 = 0.15;

/// Orchestrates one conversation turn end to end.
pub struct TurnUseCase {
    schedule_service: ScheduleService,
    semantic_extractor: SemanticExtractorService,
    topic_classifier: TopicClassifierService,
    knowledge: Arc<dyn KnowledgeSource>,
}

impl TurnUseCase {
    pub fn new(
        fast: Arc<dyn CompletionAgent>,
        quality: Arc<dyn CompletionAgent>,
        knowledge: Arc<dyn KnowledgeSource>,
    ) -> Self {
        Self {
            schedule_service: ScheduleService::new(GenerationAdapter::new(
                fast.clone(),
                quality,
            )),
            semantic_extractor: SemanticExtractorService::new(fast.clone()),
            topic_classifier: TopicClassifierService::new(fast),
            knowledge,
        }
    }

    /// Handles one turn. Never returns an `Err`: every internal failure is
    /// mapped to a short user-facing message.
    pub async fn handle_turn(&self, request: TurnRequest) -> TurnResponse {
        match self.run_turn(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Turn ended in a terminal error");
                TurnResponse::Error {
                    error: err.user_message(),
                }
            }
        }
    }

    async fn run_turn(&self, request: TurnRequest) -> Result<TurnResponse> {
        let mode = request.output_mode.unwrap_or_default();
        let first_turn = request.session_id.is_none();
        let state = match request.session_id {
            Some(id) => SessionState::resume(
                id,
                request.messages,
                request.extracted_fields.unwrap_or_default(),
                request.questions_asked.unwrap_or(0),
            ),
            None => SessionState::new(request.messages),
        };
        let Some(first_message) = state.first_user_message().map(str::to_string) else {
            return Err(SomniError::invalid_input("transcript has no user message"));
        };

        // Guard verdict is always recomputed from the original first
        // message, so accepted quick replies can never launder an
        // off-topic opening.
        let mut guard_rejected = !guard::is_on_topic(&first_message);
        if guard_rejected {
            debug!(
                session_id = %state.session_id,
                disqualified = guard::has_disqualifier(&first_message),
                "Keyword screening rejected the opening message"
            );
        }

        let user_text = state.user_text();
        let extracted = extract(&user_text);
        debug!(
            session_id = %state.session_id,
            confidence = extracted.confidence_score,
            age_months = ?extracted.age_months,
            "Deterministic extraction finished"
        );
        let mut fields = merge(&state.extracted_fields, &extracted);

        if !guard_rejected
            && fields.age_months.is_none()
            && fields.confidence_score < SEMANTIC_FALLBACK_THRESHOLD
        {
            if let Some(semantic) = self.semantic_extractor.extract(&user_text).await {
                fields = merge(&fields, &semantic);
            }
        }

        if let Some(latest) = state.latest_user_message() {
            fields = merge(&fields, &parse_chip_answer(latest));
        }

        // One-shot, first-turn-only semantic topic check for messages that
        // passed keyword screening but extracted almost nothing.
        if first_turn && !guard_rejected && fields.confidence_score < TOPIC_CHECK_THRESHOLD {
            if !self.topic_classifier.is_genuine(&first_message).await {
                info!(session_id = %state.session_id, "Semantic topic check rejected the message");
                guard_rejected = true;
            }
        }

        match plan_turn(&fields, state.questions_asked, guard_rejected, mode) {
            TurnPlan::Refuse { message } => Ok(TurnResponse::NeedsInfo {
                session_id: state.session_id,
                extracted_fields: fields,
                follow_up_question: message.to_string(),
                quick_replies: Vec::new(),
                questions_asked: 0,
            }),
            TurnPlan::Ask {
                question,
                questions_asked,
                state: dialogue_state,
            } => {
                debug!(
                    session_id = %state.session_id,
                    ?dialogue_state,
                    questions_asked,
                    "Asking a follow-up question"
                );
                Ok(TurnResponse::NeedsInfo {
                    session_id: state.session_id,
                    extracted_fields: fields,
                    follow_up_question: question.text.to_string(),
                    quick_replies: question.quick_replies_owned(),
                    questions_asked,
                })
            }
            TurnPlan::AgeUnresolved => Err(SomniError::AgeUnresolved),
            TurnPlan::Proceed { fields: resolved } => {
                let Some(age_months) = resolved.age_months else {
                    return Err(SomniError::internal("controller proceeded without an age"));
                };
                let excerpt = self.knowledge.load_excerpt(age_months, resolved.main_issue);
                let generated = self
                    .schedule_service
                    .generate_validated(&resolved, &excerpt, &user_text, mode)
                    .await?;
                info!(
                    session_id = %state.session_id,
                    unresolved_issues = generated.unresolved_issues.len(),
                    "Schedule generated"
                );
                Ok(TurnResponse::Complete {
                    session_id: state.session_id,
                    extracted_fields: resolved,
                    schedule_markdown: generated.markdown,
                    intro_message: generated.intro_message,
                })
            }
        }
    }
}
