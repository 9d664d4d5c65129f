//! Quick-reply chip vocabulary and its exact parser.
//!
//! Chips are the closed set of pre-offered reply strings shown alongside a
//! follow-up question. Because the vocabulary is known, chip answers are
//! resolved exactly rather than probabilistically, and a match carries full
//! confidence. Applied to the latest user message only.

use crate::fields::{ExtractedFields, MainIssue};
use crate::time::ClockTime;

/// Age buckets offered with the age question.
pub const AGE_CHIPS: &[&str] = &[
    "0–3 months",
    "4–6 months",
    "7–9 months",
    "10–12 months",
    "1–2 years",
    "2+ years",
];

/// Wake-time buckets offered with the wake-time question.
pub const WAKE_CHIPS: &[&str] = &[
    "Before 6am",
    "6:00–6:30am",
    "6:30–7:00am",
    "7:00–7:30am",
    "After 7:30am",
];

/// Issue buckets offered with the issue question.
pub const ISSUE_CHIPS: &[&str] = &[
    "Night wakings",
    "Short naps",
    "Early rising",
    "Bedtime battles",
    "Needs help settling",
];

/// Representative month value for each age bucket.
const AGE_VALUES: &[(&str, u32)] = &[
    ("0-3 months", 2),
    ("4-6 months", 5),
    ("7-9 months", 8),
    ("10-12 months", 11),
    ("1-2 years", 18),
    ("2+ years", 30),
];

/// Representative time for each wake bucket.
const WAKE_VALUES: &[(&str, ClockTime)] = &[
    ("before 6am", ClockTime::hm(5, 30)),
    ("6:00-6:30am", ClockTime::hm(6, 15)),
    ("6:30-7:00am", ClockTime::hm(6, 45)),
    ("7:00-7:30am", ClockTime::hm(7, 15)),
    ("after 7:30am", ClockTime::hm(8, 0)),
];

const ISSUE_VALUES: &[(&str, MainIssue)] = &[
    ("night wakings", MainIssue::NightWakings),
    ("short naps", MainIssue::ShortNaps),
    ("early rising", MainIssue::EarlyRising),
    ("bedtime battles", MainIssue::BedtimeResistance),
    ("needs help settling", MainIssue::SelfSettling),
];

/// Case-, dash- and whitespace-insensitive chip key.
fn normalize(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .replace('–', "-")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps a quick-reply string to the fields it resolves.
///
/// Exact matches only, except the nap catch-all: any nap-mentioning text
/// that matched no chip resolves the issue to short naps. That catch-all is
/// intentionally broad and is kept as-is.
pub fn parse_chip_answer(text: &str) -> ExtractedFields {
    let key = normalize(text);
    let mut fields = ExtractedFields::default();

    if let Some((_, months)) = AGE_VALUES.iter().find(|(chip, _)| *chip == key) {
        fields.age_months = Some(*months);
    } else if let Some((_, time)) = WAKE_VALUES.iter().find(|(chip, _)| *chip == key) {
        fields.wake_time = Some(*time);
    } else if let Some((_, issue)) = ISSUE_VALUES.iter().find(|(chip, _)| *chip == key) {
        fields.main_issue = Some(*issue);
    } else if key.contains("nap") {
        fields.main_issue = Some(MainIssue::ShortNaps);
    }

    if !fields.is_empty() {
        fields.confidence_score = 1.0;
    }
    fields
}
