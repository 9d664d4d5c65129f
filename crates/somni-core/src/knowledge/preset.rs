//! Built-in age-band and issue guidance excerpts.

use super::KnowledgeSource;
use crate::fields::MainIssue;

/// Default, self-contained knowledge table.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinKnowledge;

fn age_band_excerpt(age_months: u32) -> &'static str {
    match age_months {
        0..=3 => {
            "Newborns (0-3 months) sleep 14-17 hours across day and night with \
             wake windows of 45-90 minutes and 4-5 naps. Day/night rhythm is \
             still forming; short naps are normal."
        }
        4..=6 => {
            "At 4-6 months most babies manage 3 naps with wake windows of \
             1.5-2.5 hours and need 12-15 hours of total sleep. The 4-month \
             sleep regression commonly disrupts nights."
        }
        7..=9 => {
            "At 7-9 months expect 2 naps, wake windows of 2.5-3.5 hours, and \
             11-12 hours of night sleep. Separation awareness can cause new \
             night wakings."
        }
        10..=12 => {
            "At 10-12 months most babies keep 2 naps with wake windows of \
             3-4 hours; some briefly flirt with dropping to 1 nap too early."
        }
        13..=18 => {
            "At 13-18 months the 2-to-1 nap transition happens, usually \
             landing on one early-afternoon nap of 2-3 hours with wake \
             windows around 5 hours."
        }
        _ => {
            "Toddlers past 18 months typically keep one midday nap of 1-2.5 \
             hours and need 10-12 hours of night sleep; bedtime resistance \
             peaks with growing independence."
        }
    }
}

fn issue_excerpt(issue: MainIssue) -> &'static str {
    match issue {
        MainIssue::NightWakings => {
            "For frequent night wakings, check that daytime sleep is not \
             crowding night sleep and keep responses at night brief and \
             consistent."
        }
        MainIssue::ShortNaps => {
            "For short naps, watch wake windows closely; an undertired or \
             overtired baby both cat-nap. Protect the first nap of the day."
        }
        MainIssue::EarlyRising => {
            "For early rising, keep the room dark until the desired wake \
             time and avoid reinforcing the early hour with feeds or play."
        }
        MainIssue::BedtimeResistance => {
            "For bedtime resistance, a short predictable wind-down routine \
             and a bedtime matched to sleep pressure work better than \
             pushing bedtime earlier."
        }
        MainIssue::SelfSettling => {
            "For babies who need help falling asleep, practice putting them \
             down drowsy but awake at bedtime first, where sleep pressure \
             is highest."
        }
    }
}

impl KnowledgeSource for BuiltinKnowledge {
    fn load_excerpt(&self, age_months: u32, main_issue: Option<MainIssue>) -> String {
        match main_issue {
            Some(issue) => format!("{}\n\n{}", age_band_excerpt(age_months), issue_excerpt(issue)),
            None => age_band_excerpt(age_months).to_string(),
        }
    }
}
