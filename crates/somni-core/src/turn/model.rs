//! Logical request/response shapes for one conversation turn.
//!
//! These are transport-agnostic: whatever carries them (HTTP handler, CLI,
//! test harness) serializes them as-is. The response is an
//! internally-tagged enum on `status`.

use crate::fields::ExtractedFields;
use crate::session::ChatMessage;
use serde::{Deserialize, Serialize};

/// Which rendering of the final document the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Full document with clarifying questions allowed.
    #[default]
    Standard,
    /// Compact single-turn rendering; unknown slots are silently defaulted.
    Social,
}

/// One turn's input: the transcript plus whatever session state the client
/// is carrying.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub extracted_fields: Option<ExtractedFields>,
    #[serde(default)]
    pub questions_asked: Option<u32>,
    #[serde(default)]
    pub output_mode: Option<OutputMode>,
}

/// One turn's outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum TurnResponse {
    /// The controller needs another answer before it can generate.
    NeedsInfo {
        session_id: String,
        extracted_fields: ExtractedFields,
        follow_up_question: String,
        quick_replies: Vec<String>,
        questions_asked: u32,
    },
    /// Terminal success: the validated (or best-effort) document.
    Complete {
        session_id: String,
        extracted_fields: ExtractedFields,
        schedule_markdown: String,
        intro_message: String,
    },
    /// Terminal failure with a short user-facing message.
    Error { error: String },
    /// Passed through unchanged from the rate-limiting collaborator.
    RateLimited {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        retry_after_ms: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_with_status_tag() {
        let resp = TurnResponse::Error {
            error: "something short".to_string(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "error");

        let resp = TurnResponse::NeedsInfo {
            session_id: "s1".to_string(),
            extracted_fields: ExtractedFields::default(),
            follow_up_question: "How old is your little one?".to_string(),
            quick_replies: vec!["4–6 months".to_string()],
            questions_asked: 1,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "needs_info");
        assert_eq!(json["questionsAsked"], 1);
    }

    #[test]
    fn request_tolerates_missing_optional_fields() {
        let req: TurnRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":"my baby won't sleep"}]}"#,
        )
        .unwrap();
        assert!(req.session_id.is_none());
        assert!(req.output_mode.is_none());
        assert_eq!(req.messages.len(), 1);
    }

    #[test]
    fn rate_limited_passes_through() {
        let resp = TurnResponse::RateLimited {
            message: "Too many requests today.".to_string(),
            retry_after_ms: Some(60_000),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "rate_limited");
        assert_eq!(json["retryAfterMs"], 60_000);
    }
}
