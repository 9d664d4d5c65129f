//! The slot-filling transition function.

use super::questions::{age_question, issue_question, wake_time_question, FollowUpQuestion, REDIRECT_MESSAGE};
use crate::fields::ExtractedFields;
use crate::time::ClockTime;
use crate::turn::OutputMode;
use serde::{Deserialize, Serialize};

/// Budget for the required slots (age, wake time). Every branch either
/// advances the counter or reaches a terminal state, so the machine cannot
/// loop.
pub const MAX_REQUIRED_QUESTIONS: u32 = 3;

/// The issue slot is optional flavor, not required for generation, so it is
/// asked at most once and a non-answer is accepted thereafter.
pub const MAX_ISSUE_QUESTIONS: u32 = 1;

/// Applied when the user never states a wake time.
pub const DEFAULT_WAKE_TIME: ClockTime = ClockTime::hm(7, 0);

/// Applied in social mode when the age is unknown.
pub const DEFAULT_SOCIAL_AGE_MONTHS: u32 = 12;

/// Dialogue controller states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    AwaitingAge,
    AwaitingWakeTime,
    AwaitingIssue,
    Ready,
    Refused,
}

/// What the controller decided to do this turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPlan {
    /// Off-topic or disqualified: emit the fixed redirect, counter reset.
    Refuse { message: &'static str },
    /// Ask one more clarifying question; carries the advanced counter.
    Ask {
        question: FollowUpQuestion,
        questions_asked: u32,
        state: DialogueState,
    },
    /// Question budget exhausted and the age is still unknown.
    AgeUnresolved,
    /// All required slots resolved (or defaulted); generation may start.
    Proceed { fields: ExtractedFields },
}

impl TurnPlan {
    pub fn state(&self) -> DialogueState {
        match self {
            Self::Refuse { .. } => DialogueState::Refused,
            Self::Ask { state, .. } => *state,
            Self::AgeUnresolved => DialogueState::Refused,
            Self::Proceed { .. } => DialogueState::Ready,
        }
    }
}

/// Evaluates the transition rule for one turn.
///
/// `guard_rejected` is the topic guard's verdict on the original first user
/// message, recomputed by the caller every turn.
pub fn plan_turn(
    fields: &ExtractedFields,
    questions_asked: u32,
    guard_rejected: bool,
    mode: OutputMode,
) -> TurnPlan {
    if guard_rejected {
        return TurnPlan::Refuse {
            message: REDIRECT_MESSAGE,
        };
    }

    if mode == OutputMode::Social {
        return TurnPlan::Proceed {
            fields: apply_social_defaults(fields),
        };
    }

    if fields.age_months.is_none() && questions_asked < MAX_REQUIRED_QUESTIONS {
        return TurnPlan::Ask {
            question: age_question(),
            questions_asked: questions_asked + 1,
            state: DialogueState::AwaitingAge,
        };
    }

    if fields.wake_time.is_none() && questions_asked < MAX_REQUIRED_QUESTIONS {
        return TurnPlan::Ask {
            question: wake_time_question(),
            questions_asked: questions_asked + 1,
            state: DialogueState::AwaitingWakeTime,
        };
    }

    if fields.main_issue.is_none() && questions_asked < MAX_ISSUE_QUESTIONS {
        return TurnPlan::Ask {
            question: issue_question(),
            questions_asked: questions_asked + 1,
            state: DialogueState::AwaitingIssue,
        };
    }

    if fields.age_months.is_none() {
        return TurnPlan::AgeUnresolved;
    }

    TurnPlan::Proceed {
        fields: apply_ready_defaults(fields),
    }
}

fn apply_ready_defaults(fields: &ExtractedFields) -> ExtractedFields {
    let mut resolved = fields.clone();
    if resolved.wake_time.is_none() {
        resolved.wake_time = Some(DEFAULT_WAKE_TIME);
        resolved.note_assumption("Wake time not provided; assumed 7:00 AM.");
    }
    resolved
}

fn apply_social_defaults(fields: &ExtractedFields) -> ExtractedFields {
    let mut resolved = fields.clone();
    if resolved.age_months.is_none() {
        resolved.age_months = Some(DEFAULT_SOCIAL_AGE_MONTHS);
        resolved.note_assumption("Age not provided; assumed 12 months.");
    }
    if resolved.wake_time.is_none() {
        resolved.wake_time = Some(DEFAULT_WAKE_TIME);
        resolved.note_assumption("Wake time not provided; assumed 7:00 AM.");
    }
    resolved
}
