//! The fixed follow-up questions and their chip vocabularies.

use crate::extractor::chips::{AGE_CHIPS, ISSUE_CHIPS, WAKE_CHIPS};

/// A follow-up question plus the quick replies offered with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUpQuestion {
    pub text: &'static str,
    pub quick_replies: &'static [&'static str],
}

impl FollowUpQuestion {
    pub fn quick_replies_owned(&self) -> Vec<String> {
        self.quick_replies.iter().map(|s| s.to_string()).collect()
    }
}

/// Fixed redirect for off-topic or disqualified openings.
pub const REDIRECT_MESSAGE: &str = "I can only help with children's sleep schedules. \
     Tell me about your child's sleep - their age and what's been hard lately - and we can start.";

pub fn age_question() -> FollowUpQuestion {
    FollowUpQuestion {
        text: "How old is your little one?",
        quick_replies: AGE_CHIPS,
    }
}

pub fn wake_time_question() -> FollowUpQuestion {
    FollowUpQuestion {
        text: "What time does your child usually wake up for the day?",
        quick_replies: WAKE_CHIPS,
    }
}

pub fn issue_question() -> FollowUpQuestion {
    FollowUpQuestion {
        text: "What's the biggest sleep challenge right now?",
        quick_replies: ISSUE_CHIPS,
    }
}
