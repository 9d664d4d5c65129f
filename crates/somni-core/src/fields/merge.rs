//! Cross-turn field merge with defined precedence.

use super::model::ExtractedFields;

/// Merges a fresh update over a base field set.
///
/// Per-field rule: a non-null value in `update` overwrites the base; a null
/// value never erases one. Assumption notes are concatenated, base first,
/// skipping entries the base already carries. `confidence_score` takes the
/// update's value when the update carries any observation (freshest
/// measurement wins) and keeps the base's when the update is empty, so
/// `merge(f, empty) == f` holds exactly.
///
/// Applied twice per turn: freshly extracted fields over the prior session
/// fields, then chip-parsed fields over that result.
pub fn merge(base: &ExtractedFields, update: &ExtractedFields) -> ExtractedFields {
    let mut assumptions = base.assumptions.clone();
    for note in &update.assumptions {
        if !assumptions.contains(note) {
            assumptions.push(note.clone());
        }
    }

    ExtractedFields {
        age_months: update.age_months.or(base.age_months),
        wake_time: update.wake_time.or(base.wake_time),
        bedtime: update.bedtime.or(base.bedtime),
        naps_count: update.naps_count.or(base.naps_count),
        nap_lengths: update.nap_lengths.clone().or_else(|| base.nap_lengths.clone()),
        main_issue: update.main_issue.or(base.main_issue),
        confidence_score: if update.is_empty() {
            base.confidence_score
        } else {
            update.confidence_score
        },
        assumptions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::MainIssue;
    use crate::time::ClockTime;

    fn sample() -> ExtractedFields {
        ExtractedFields {
            age_months: Some(8),
            wake_time: Some(ClockTime::hm(6, 45)),
            bedtime: None,
            naps_count: Some(2),
            nap_lengths: Some("30-45 min".to_string()),
            main_issue: Some(MainIssue::NightWakings),
            confidence_score: 0.7,
            assumptions: vec!["Assumed two naps.".to_string()],
        }
    }

    #[test]
    fn merge_with_empty_is_identity() {
        let f = sample();
        assert_eq!(merge(&f, &ExtractedFields::default()), f);
    }

    #[test]
    fn merge_with_self_is_identity() {
        let f = sample();
        assert_eq!(merge(&f, &f), f);
    }

    #[test]
    fn non_null_update_dominates() {
        let base = sample();
        let update = ExtractedFields {
            age_months: Some(9),
            wake_time: Some(ClockTime::hm(7, 15)),
            confidence_score: 0.4,
            ..Default::default()
        };
        let merged = merge(&base, &update);
        assert_eq!(merged.age_months, Some(9));
        assert_eq!(merged.wake_time, Some(ClockTime::hm(7, 15)));
        // Untouched fields survive
        assert_eq!(merged.naps_count, Some(2));
        assert_eq!(merged.main_issue, Some(MainIssue::NightWakings));
    }

    #[test]
    fn null_update_never_erases_known_age() {
        let base = sample();
        let update = ExtractedFields {
            main_issue: Some(MainIssue::ShortNaps),
            confidence_score: 0.1,
            ..Default::default()
        };
        let merged = merge(&base, &update);
        assert_eq!(merged.age_months, Some(8));
        // The fresh low-confidence measurement still wins
        assert!((merged.confidence_score - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn assumptions_accumulate_in_order() {
        let mut base = ExtractedFields::default();
        base.note_assumption("first");
        let mut update = ExtractedFields::default();
        update.note_assumption("first");
        update.note_assumption("second");

        let merged = merge(&base, &update);
        assert_eq!(merged.assumptions, vec!["first", "second"]);

        // A further merge keeps every earlier entry, in order
        let mut later = ExtractedFields::default();
        later.note_assumption("third");
        let merged = merge(&merged, &later);
        assert_eq!(merged.assumptions, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_update_keeps_base_confidence() {
        let f = sample();
        let merged = merge(&f, &ExtractedFields::default());
        assert!((merged.confidence_score - 0.7).abs() < f32::EPSILON);
    }
}
