//! Extracted-field domain model.

use crate::time::ClockTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The closed set of canonical sleep-issue labels.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MainIssue {
    NightWakings,
    ShortNaps,
    EarlyRising,
    BedtimeResistance,
    SelfSettling,
}

impl MainIssue {
    /// Human-readable label for prompts and UI copy.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NightWakings => "frequent night wakings",
            Self::ShortNaps => "short naps",
            Self::EarlyRising => "waking too early in the morning",
            Self::BedtimeResistance => "resisting bedtime",
            Self::SelfSettling => "trouble falling asleep without help",
        }
    }
}

/// The slot set: every value the dialogue tries to resolve, each optional
/// until observed or defaulted.
///
/// `assumptions` documents provenance: whenever a field is defaulted rather
/// than observed, a human-readable note is appended. Entries are never
/// removed once added. `confidence_score` is the extractor's self-reported
/// certainty in `age_months` and the surrounding fields; it is recomputed
/// on every extraction pass, not merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    /// Child age in completed months, domain [0, ~60]
    pub age_months: Option<u32>,
    /// Usual morning wake time
    pub wake_time: Option<ClockTime>,
    /// Usual bedtime
    pub bedtime: Option<ClockTime>,
    /// Naps per day
    pub naps_count: Option<u32>,
    /// Free-text nap length description, e.g. "30-45 min"
    pub nap_lengths: Option<String>,
    /// Canonical issue label, if one was recognized
    pub main_issue: Option<MainIssue>,
    /// Extractor certainty in [0, 1]
    #[serde(default)]
    pub confidence_score: f32,
    /// Append-only provenance notes for defaulted fields
    #[serde(default)]
    pub assumptions: Vec<String>,
}

impl ExtractedFields {
    /// True when this value carries no observation at all: no field was
    /// resolved and no assumption was recorded. An empty update contributes
    /// nothing to a merge, including its confidence.
    pub fn is_empty(&self) -> bool {
        self.age_months.is_none()
            && self.wake_time.is_none()
            && self.bedtime.is_none()
            && self.naps_count.is_none()
            && self.nap_lengths.is_none()
            && self.main_issue.is_none()
            && self.assumptions.is_empty()
    }

    /// Number of resolved slots, used by the deterministic extractor's
    /// confidence computation.
    pub fn observed_count(&self) -> usize {
        [
            self.age_months.is_some(),
            self.wake_time.is_some(),
            self.bedtime.is_some(),
            self.naps_count.is_some(),
            self.nap_lengths.is_some(),
            self.main_issue.is_some(),
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    /// Records that a field was defaulted rather than observed.
    pub fn note_assumption(&mut self, note: impl Into<String>) {
        self.assumptions.push(note.into());
    }
}
