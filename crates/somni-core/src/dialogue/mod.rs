//! Bounded slot-filling dialogue controller.
//!
//! The slot order is fixed: age, wake time, then the optional issue. The
//! controller is a pure transition function over an explicit state enum;
//! the per-session question counter is the sole termination guarantee.

pub mod controller;
pub mod questions;

pub use controller::{plan_turn, DialogueState, TurnPlan, DEFAULT_WAKE_TIME};
pub use questions::{age_question, issue_question, wake_time_question, FollowUpQuestion, REDIRECT_MESSAGE};
