//! Schedule section domain types.

use crate::time::ClockTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One labeled row of the schedule section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Label as written in the document
    pub label: String,
    /// Case/whitespace-insensitive label identity
    pub normalized_label: String,
    /// Raw value text after the colon
    pub value: String,
    /// Parsed clock time, where the value was parseable as one
    pub time: Option<ClockTime>,
}

/// One violated structural rule. An empty issue sequence means the
/// candidate document is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub message: String,
}

impl ValidationIssue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
