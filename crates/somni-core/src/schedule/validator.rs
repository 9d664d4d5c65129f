//! Structural validation of a generated schedule document.
//!
//! The validator never short-circuits: every failed check appends its own
//! issue so a repair attempt can address all of them at once.

use super::model::{ScheduleEntry, ValidationIssue};
use crate::time::ClockTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Minimum number of distinct labeled rows for a usable schedule.
const MIN_DISTINCT_ROWS: usize = 3;

static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9 '/()&-]*$").expect("label pattern is valid"));

/// Locates the schedule section: the first `##` heading mentioning
/// "schedule", up to the next heading.
pub fn extract_schedule_section(markdown: &str) -> Option<String> {
    let mut lines = markdown.lines();
    loop {
        let line = lines.next()?;
        let trimmed = line.trim();
        if trimmed.starts_with("##") && trimmed.to_lowercase().contains("schedule") {
            break;
        }
    }
    let mut section = Vec::new();
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            break;
        }
        section.push(line);
    }
    Some(section.join("\n"))
}

/// Parses `label: value` rows out of the schedule section via a fixed line
/// pattern, tolerating list markers and bold markup.
pub fn parse_entries(section: &str) -> Vec<ScheduleEntry> {
    let mut entries = Vec::new();
    for line in section.lines() {
        let cleaned = line
            .trim()
            .trim_start_matches(['-', '*', ' '])
            .replace('*', "");
        let Some((raw_label, raw_value)) = cleaned.split_once(':') else {
            continue;
        };
        let label = raw_label.trim();
        let value = raw_value.trim();
        if label.is_empty() || value.is_empty() || !LABEL_RE.is_match(label) {
            continue;
        }
        entries.push(ScheduleEntry {
            label: label.to_string(),
            normalized_label: normalize_label(label),
            value: value.to_string(),
            time: ClockTime::parse(value),
        });
    }
    entries
}

fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checks the generated markdown against the structural rules, returning
/// every violated rule in order.
pub fn validate(markdown: &str) -> Vec<ValidationIssue> {
    let Some(section) = extract_schedule_section(markdown) else {
        return vec![ValidationIssue::new(
            "The document has no schedule section heading.",
        )];
    };
    let entries = parse_entries(&section);
    let mut issues = Vec::new();

    check_duplicate_labels(&entries, &mut issues);
    check_duplicate_times(&entries, &mut issues);
    check_single_wake(&entries, &mut issues);
    check_monotonic_times(&entries, &mut issues);
    check_lights_out(&entries, &mut issues);
    check_min_rows(&entries, &mut issues);

    issues
}

fn check_duplicate_labels(entries: &[ScheduleEntry], issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.normalized_label.clone())
            && reported.insert(entry.normalized_label.clone())
        {
            issues.push(ValidationIssue::new(format!(
                "Duplicate schedule label: '{}'.",
                entry.label
            )));
        }
    }
}

fn check_duplicate_times(entries: &[ScheduleEntry], issues: &mut Vec<ValidationIssue>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    for entry in entries {
        let Some(time) = entry.time else { continue };
        if !seen.insert(time) && reported.insert(time) {
            issues.push(ValidationIssue::new(format!(
                "Duplicate schedule time: {} appears more than once.",
                time.format_12h()
            )));
        }
    }
}

fn check_single_wake(entries: &[ScheduleEntry], issues: &mut Vec<ValidationIssue>) {
    let wake_count = entries
        .iter()
        .filter(|e| e.normalized_label.contains("wake"))
        .count();
    match wake_count {
        0 => issues.push(ValidationIssue::new("Missing a 'Wake' entry in the schedule.")),
        1 => {}
        n => issues.push(ValidationIssue::new(format!(
            "'Wake' appears {n} times; expected exactly one."
        ))),
    }
}

fn check_monotonic_times(entries: &[ScheduleEntry], issues: &mut Vec<ValidationIssue>) {
    let timed: Vec<&ScheduleEntry> = entries.iter().filter(|e| e.time.is_some()).collect();
    for pair in timed.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        // Both are Some by construction of `timed`
        let (prev_time, next_time) = (prev.time.unwrap(), next.time.unwrap());
        if next_time <= prev_time {
            issues.push(ValidationIssue::new(format!(
                "Times are not strictly increasing: '{}' at {} does not follow '{}' at {}.",
                next.label,
                next_time.format_12h(),
                prev.label,
                prev_time.format_12h()
            )));
        }
    }
}

fn is_lights_out(entry: &ScheduleEntry) -> bool {
    let label = &entry.normalized_label;
    label.contains("lights out") || label.contains("bedtime") || label == "bed"
}

fn check_lights_out(entries: &[ScheduleEntry], issues: &mut Vec<ValidationIssue>) {
    let Some(lights_out) = entries.iter().find(|e| is_lights_out(e)) else {
        issues.push(ValidationIssue::new(
            "Missing a 'Lights Out' or bedtime entry.",
        ));
        return;
    };
    let Some(lights_out_time) = lights_out.time else {
        return;
    };
    let latest_other = entries
        .iter()
        .filter(|e| !is_lights_out(e))
        .filter_map(|e| e.time)
        .max();
    if let Some(latest) = latest_other {
        if lights_out_time < latest {
            issues.push(ValidationIssue::new(format!(
                "'{}' at {} is earlier than daytime entries that follow it.",
                lights_out.label,
                lights_out_time.format_12h()
            )));
        }
    }
}

fn check_min_rows(entries: &[ScheduleEntry], issues: &mut Vec<ValidationIssue>) {
    let distinct: HashSet<&str> = entries
        .iter()
        .map(|e| e.normalized_label.as_str())
        .collect();
    if distinct.len() < MIN_DISTINCT_ROWS {
        issues.push(ValidationIssue::new(format!(
            "Schedule has only {} distinct entries; at least {} are required.",
            distinct.len(),
            MIN_DISTINCT_ROWS
        )));
    }
}
