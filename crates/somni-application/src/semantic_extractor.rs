//! Capability-backed extraction fallback.
//!
//! Invoked only when the deterministic pass plus prior session fields
//! still leave the age unknown at low confidence. Strictly best-effort:
//! every failure path returns `None` and the session continues with
//! whatever the deterministic pass produced.

use crate::generation::complete_with_timeout;
use serde::Deserialize;
use somni_core::capability::CompletionAgent;
use somni_core::fields::{ExtractedFields, MainIssue};
use somni_core::time::ClockTime;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const EXTRACT_TIMEOUT: Duration = Duration::from_secs(8);

/// Confidence reported when the fallback resolves the age.
const CONFIDENCE_AGE_FOUND: f32 = 0.5;
/// Confidence reported when even the fallback could not find it.
const CONFIDENCE_AGE_MISSING: f32 = 0.2;

/// What the capability is asked to return.
#[derive(Debug, Deserialize)]
struct SemanticReply {
    age_months: Option<u32>,
    wake_time: Option<String>,
    bedtime: Option<String>,
    naps_count: Option<u32>,
    nap_lengths: Option<String>,
    main_issue: Option<String>,
}

pub struct SemanticExtractorService {
    agent: Arc<dyn CompletionAgent>,
}

impl SemanticExtractorService {
    pub fn new(agent: Arc<dyn CompletionAgent>) -> Self {
        Self { agent }
    }

    /// Best-effort semantic extraction; `None` means "no fallback info
    /// available", never an error.
    pub async fn extract(&self, text: &str) -> Option<ExtractedFields> {
        let prompt = extraction_prompt(text);
        let reply = match complete_with_timeout(self.agent.as_ref(), &prompt, EXTRACT_TIMEOUT).await
        {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "Semantic extraction failed, continuing without it");
                return None;
            }
        };
        match parse_reply(&reply) {
            Some(fields) => {
                debug!(age_months = ?fields.age_months, "Semantic extraction succeeded");
                Some(fields)
            }
            None => {
                warn!("Semantic extraction returned an unusable reply");
                None
            }
        }
    }
}

fn extraction_prompt(text: &str) -> String {
    format!(
        "Extract sleep-related details about a child from the parent's message below.\n\
         Return only a JSON object with these keys (use null for anything not stated):\n\
         {{\"age_months\": number, \"wake_time\": \"HH:MM\", \"bedtime\": \"HH:MM\", \
         \"naps_count\": number, \"nap_lengths\": string, \
         \"main_issue\": one of \"night_wakings\", \"short_naps\", \"early_rising\", \
         \"bedtime_resistance\", \"self_settling\"}}\n\
         No markdown formatting, no code blocks, no commentary.\n\n\
         Message:\n{text}"
    )
}

/// Tolerates code fences and surrounding prose by slicing the outermost
/// JSON object out of the reply.
fn parse_reply(reply: &str) -> Option<ExtractedFields> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    let parsed: SemanticReply = serde_json::from_str(&reply[start..=end]).ok()?;

    let age_months = parsed.age_months.filter(|m| *m <= 72);
    let mut fields = ExtractedFields {
        age_months,
        wake_time: parsed.wake_time.as_deref().and_then(ClockTime::parse),
        bedtime: parsed.bedtime.as_deref().and_then(ClockTime::parse),
        naps_count: parsed.naps_count,
        nap_lengths: parsed.nap_lengths,
        main_issue: parsed
            .main_issue
            .as_deref()
            .and_then(|s| s.parse::<MainIssue>().ok()),
        confidence_score: 0.0,
        assumptions: Vec::new(),
    };
    fields.confidence_score = if fields.age_months.is_some() {
        CONFIDENCE_AGE_FOUND
    } else {
        CONFIDENCE_AGE_MISSING
    };
    Some(fields)
}
