//! Deterministic keyword/pattern extraction.
//!
//! Runs over the concatenation of all user-authored turns. Each field is
//! matched independently; the confidence score is a deterministic function
//! of how many fields were filled and how unambiguous the matches were.

use crate::fields::{ExtractedFields, MainIssue};
use crate::time::ClockTime;
use once_cell::sync::Lazy;
use regex::Regex;

static AGE_MONTHS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})\s*[-–]?\s*month").expect("age pattern is valid"));
static AGE_YEARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})\s*[-–]?\s*year").expect("age pattern is valid"));
static AGE_WEEKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})\s*[-–]?\s*week").expect("age pattern is valid"));

static WAKE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:wakes?|up\s+for\s+the\s+day|morning\s+starts)\s*(?:up\s*)?(?:at|around|about|by)\s+(\d{1,2})(?::([0-5]\d))?\s*(a\.?m\.?|p\.?m\.?)?",
    )
    .expect("wake pattern is valid")
});

static BED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:bed\s*time|goes?\s+(?:down|to\s+bed)|in\s+bed|asleep|lights\s+out)\s*(?:is|at|around|about|by)?\s*(\d{1,2})(?::([0-5]\d))?\s*(a\.?m\.?|p\.?m\.?)?",
    )
    .expect("bedtime pattern is valid")
});

static NAPS_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d|one|two|three|four)\s+naps?\b").expect("naps pattern is valid"));

static NAP_LEN_AFTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)naps?[^.\n]{0,30}?((?:\d{1,3}\s*(?:-|–|to)\s*)?\d{1,3}\s*min(?:ute)?s?)")
        .expect("nap length pattern is valid")
});
static NAP_LEN_BEFORE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)((?:\d{1,3}\s*(?:-|–|to)\s*)?\d{1,3}\s*min(?:ute)?s?)[^.\n]{0,20}?naps?")
        .expect("nap length pattern is valid")
});

/// Issue phrase table, checked in order; the first hit wins.
const ISSUE_PHRASES: &[(&str, MainIssue)] = &[
    ("night waking", MainIssue::NightWakings),
    ("wakes at night", MainIssue::NightWakings),
    ("waking at night", MainIssue::NightWakings),
    ("wakes up at night", MainIssue::NightWakings),
    ("up all night", MainIssue::NightWakings),
    ("wakes through the night", MainIssue::NightWakings),
    ("short nap", MainIssue::ShortNaps),
    ("cat nap", MainIssue::ShortNaps),
    ("catnap", MainIssue::ShortNaps),
    ("naps are short", MainIssue::ShortNaps),
    ("too early", MainIssue::EarlyRising),
    ("early riser", MainIssue::EarlyRising),
    ("early rising", MainIssue::EarlyRising),
    ("early morning waking", MainIssue::EarlyRising),
    ("fights bedtime", MainIssue::BedtimeResistance),
    ("fighting bedtime", MainIssue::BedtimeResistance),
    ("bedtime battle", MainIssue::BedtimeResistance),
    ("refuses to go to bed", MainIssue::BedtimeResistance),
    ("won't go to bed", MainIssue::BedtimeResistance),
    ("wont go to bed", MainIssue::BedtimeResistance),
    ("resists bedtime", MainIssue::BedtimeResistance),
    ("rocked to sleep", MainIssue::SelfSettling),
    ("rocking to sleep", MainIssue::SelfSettling),
    ("nursed to sleep", MainIssue::SelfSettling),
    ("nursing to sleep", MainIssue::SelfSettling),
    ("fed to sleep", MainIssue::SelfSettling),
    ("feeding to sleep", MainIssue::SelfSettling),
    ("held to sleep", MainIssue::SelfSettling),
    ("won't settle", MainIssue::SelfSettling),
    ("wont settle", MainIssue::SelfSettling),
    ("can't settle", MainIssue::SelfSettling),
    ("cant settle", MainIssue::SelfSettling),
];

/// Runs the deterministic pass over the given text.
pub fn extract(text: &str) -> ExtractedFields {
    let lower = text.to_lowercase();

    let (age_months, age_unambiguous) = extract_age(text, &lower);
    let wake_time = extract_wake_time(text);
    let bedtime = extract_bedtime(text);
    let naps_count = extract_naps_count(text);
    let nap_lengths = extract_nap_lengths(text);
    let main_issue = extract_issue(&lower);

    let mut fields = ExtractedFields {
        age_months,
        wake_time,
        bedtime,
        naps_count,
        nap_lengths,
        main_issue,
        confidence_score: 0.0,
        assumptions: Vec::new(),
    };
    fields.confidence_score = confidence(&fields, age_unambiguous);
    fields
}

fn confidence(fields: &ExtractedFields, age_unambiguous: bool) -> f32 {
    let mut score = 0.0_f32;
    if fields.age_months.is_some() {
        score += if age_unambiguous { 0.45 } else { 0.25 };
    }
    if fields.wake_time.is_some() {
        score += 0.15;
    }
    if fields.bedtime.is_some() {
        score += 0.10;
    }
    if fields.main_issue.is_some() {
        score += 0.15;
    }
    if fields.naps_count.is_some() {
        score += 0.05;
    }
    if fields.nap_lengths.is_some() {
        score += 0.05;
    }
    score.min(1.0)
}

/// Returns the age plus whether every mention agreed on one value.
fn extract_age(text: &str, lower: &str) -> (Option<u32>, bool) {
    let mut candidates: Vec<u32> = Vec::new();

    for caps in AGE_MONTHS_RE.captures_iter(text) {
        if let Ok(months) = caps[1].parse::<u32>() {
            candidates.push(months);
        }
    }
    for caps in AGE_YEARS_RE.captures_iter(text) {
        if let Ok(years) = caps[1].parse::<u32>() {
            candidates.push(years * 12);
        }
    }
    for caps in AGE_WEEKS_RE.captures_iter(text) {
        if let Ok(weeks) = caps[1].parse::<u32>() {
            candidates.push(weeks / 4);
        }
    }
    if candidates.is_empty() && lower.contains("newborn") {
        candidates.push(1);
    }

    candidates.retain(|m| *m <= 72);
    match candidates.as_slice() {
        [] => (None, false),
        [first, rest @ ..] => {
            let unambiguous = rest.iter().all(|m| m == first);
            (Some(*first), unambiguous)
        }
    }
}

fn extract_wake_time(text: &str) -> Option<ClockTime> {
    let caps = WAKE_RE.captures(text)?;
    let hour: u16 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u16 = caps
        .get(2)
        .map(|m| m.as_str().parse().ok())
        .unwrap_or(Some(0))?;
    match normalized_meridiem(caps.get(3).map(|m| m.as_str())) {
        Some("am") => match hour {
            12 => ClockTime::new(0, minute),
            1..=11 => ClockTime::new(hour, minute),
            _ => None,
        },
        Some(_) => match hour {
            12 => ClockTime::new(12, minute),
            1..=11 => ClockTime::new(hour + 12, minute),
            _ => None,
        },
        // Bare hour: only the plausible morning range reads as a wake time.
        None => match hour {
            4..=11 => ClockTime::new(hour, minute),
            _ => None,
        },
    }
}

fn extract_bedtime(text: &str) -> Option<ClockTime> {
    let caps = BED_RE.captures(text)?;
    let hour: u16 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u16 = caps
        .get(2)
        .map(|m| m.as_str().parse().ok())
        .unwrap_or(Some(0))?;
    match normalized_meridiem(caps.get(3).map(|m| m.as_str())) {
        Some("am") => match hour {
            12 => ClockTime::new(0, minute),
            1..=11 => ClockTime::new(hour, minute),
            _ => None,
        },
        Some(_) => match hour {
            12 => ClockTime::new(12, minute),
            1..=11 => ClockTime::new(hour + 12, minute),
            _ => None,
        },
        // Bare hour: evening reading for small hours, 24h otherwise.
        None => match hour {
            5..=11 => ClockTime::new(hour + 12, minute),
            17..=23 => ClockTime::new(hour, minute),
            _ => None,
        },
    }
}

fn normalized_meridiem(raw: Option<&str>) -> Option<&'static str> {
    let raw = raw?.to_ascii_lowercase().replace('.', "");
    match raw.as_str() {
        "am" => Some("am"),
        "pm" => Some("pm"),
        _ => None,
    }
}

fn extract_naps_count(text: &str) -> Option<u32> {
    let caps = NAPS_COUNT_RE.captures(text)?;
    let raw = caps.get(1)?.as_str().to_ascii_lowercase();
    match raw.as_str() {
        "one" => Some(1),
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        digits => digits.parse().ok(),
    }
}

fn extract_nap_lengths(text: &str) -> Option<String> {
    NAP_LEN_AFTER_RE
        .captures(text)
        .or_else(|| NAP_LEN_BEFORE_RE.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn extract_issue(lower: &str) -> Option<MainIssue> {
    ISSUE_PHRASES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, issue)| *issue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_and_no_issue_from_opening_message() {
        let fields = extract("8 month old wakes every 2 hours, no idea what to do");
        assert_eq!(fields.age_months, Some(8));
        assert_eq!(fields.main_issue, None);
        assert_eq!(fields.wake_time, None);
        assert!(fields.confidence_score >= 0.3);
    }

    #[test]
    fn age_forms() {
        assert_eq!(extract("she is 10 months old").age_months, Some(10));
        assert_eq!(extract("my 8-month-old").age_months, Some(8));
        assert_eq!(extract("he just turned 1 year").age_months, Some(12));
        assert_eq!(extract("our 10 week old").age_months, Some(2));
        assert_eq!(extract("we have a newborn").age_months, Some(1));
    }

    #[test]
    fn conflicting_ages_lower_confidence() {
        let one = extract("my 8 month old");
        let conflicting = extract("my 8 month old, or maybe 10 months now");
        assert_eq!(conflicting.age_months, Some(8));
        assert!(conflicting.confidence_score < one.confidence_score);
    }

    #[test]
    fn wake_and_bed_times() {
        let fields = extract("wakes up around 6:30am and bedtime is 7:30pm");
        assert_eq!(fields.wake_time, Some(ClockTime::hm(6, 30)));
        assert_eq!(fields.bedtime, Some(ClockTime::hm(19, 30)));

        // Bare hours read with morning/evening defaults
        let fields = extract("wakes at 6, goes to bed at 7");
        assert_eq!(fields.wake_time, Some(ClockTime::hm(6, 0)));
        assert_eq!(fields.bedtime, Some(ClockTime::hm(19, 0)));
    }

    #[test]
    fn naps_fields() {
        let fields = extract("she takes two naps, usually 30-45 min naps");
        assert_eq!(fields.naps_count, Some(2));
        assert_eq!(fields.nap_lengths.as_deref(), Some("30-45 min"));
    }

    #[test]
    fn issue_phrases_map_to_canonical_labels() {
        assert_eq!(
            extract("constant night waking is killing us").main_issue,
            Some(MainIssue::NightWakings)
        );
        assert_eq!(
            extract("only ever cat naps").main_issue,
            Some(MainIssue::ShortNaps)
        );
        assert_eq!(
            extract("wakes way too early").main_issue,
            Some(MainIssue::EarlyRising)
        );
        assert_eq!(
            extract("fights bedtime every night").main_issue,
            Some(MainIssue::BedtimeResistance)
        );
        assert_eq!(
            extract("has to be rocked to sleep").main_issue,
            Some(MainIssue::SelfSettling)
        );
    }

    #[test]
    fn empty_text_scores_zero() {
        let fields = extract("");
        assert!(fields.is_empty());
        assert_eq!(fields.confidence_score, 0.0);
    }
}
