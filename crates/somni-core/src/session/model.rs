//! Session state model.
//!
//! `SessionState` is the complete state a turn needs: the transcript, the
//! fields resolved so far, and the clarifying-question counter. It is
//! created on the first turn, mutated every turn, and discarded by the
//! caller after a terminal response.

use super::message::{ChatMessage, MessageRole};
use crate::fields::ExtractedFields;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client-held per-session state, passed back on every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Unique session identifier (UUID format)
    pub session_id: String,
    /// Timestamp when the session was created (ISO 8601 format)
    pub created_at: String,
    /// Timestamp when the session was last updated (ISO 8601 format)
    pub updated_at: String,
    /// Full conversation transcript, append-only
    pub messages: Vec<ChatMessage>,
    /// Fields resolved so far across all turns
    #[serde(default)]
    pub extracted_fields: ExtractedFields,
    /// Clarifying questions asked so far; the termination guarantee
    #[serde(default)]
    pub questions_asked: u32,
}

impl SessionState {
    /// Creates a fresh session around an initial transcript.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            session_id: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
            messages,
            extracted_fields: ExtractedFields::default(),
            questions_asked: 0,
        }
    }

    /// Rebuilds session state from the pieces a turn request carries.
    pub fn resume(
        session_id: String,
        messages: Vec<ChatMessage>,
        extracted_fields: ExtractedFields,
        questions_asked: u32,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            session_id,
            created_at: now.clone(),
            updated_at: now,
            messages,
            extracted_fields,
            questions_asked,
        }
    }

    /// The concatenation of all user-authored turns, oldest first.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The first user-authored message, if any. The topic guard is
    /// re-applied to this message on every turn.
    pub fn first_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }

    /// The most recent user-authored message, if any. Chip answers are
    /// only ever parsed out of this one.
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
    }
}
