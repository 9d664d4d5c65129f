//! Topic guard: keyword screening and disqualifier phrases.
//!
//! The guard decides whether input text is a genuine, in-scope request. It
//! is pure and cheap; the costlier one-shot semantic classification for
//! borderline cases lives in the application layer. On every turn the guard
//! is re-applied to the *original first user message*, so a run of accepted
//! quick replies can never launder an off-topic opening.

/// Phrases that force rejection regardless of any other signal.
const DISQUALIFIERS: &[&str] = &[
    "don't have a baby",
    "dont have a baby",
    "don't have kids",
    "dont have kids",
    "no kids",
    "never mind",
    "nevermind",
    "just testing",
    "just a test",
    "just kidding",
    "just joking",
    "forget it",
];

/// Sleep-domain vocabulary; one hit is enough to pass.
const SLEEP_KEYWORDS: &[&str] = &[
    "sleep", "nap", "bedtime", "bed time", "wake", "night", "tired", "feed",
    "nursing", "pacifier", "dummy", "binky", "crib", "cot", "bassinet",
    "swaddle", "settle", "drowsy", "overtired", "rocking",
];

/// Child vocabulary; only counts when the message is long enough to carry
/// real context.
const CHILD_KEYWORDS: &[&str] = &[
    "baby", "toddler", "infant", "child", "kid", "newborn", "month old",
    "months old", "daughter", "son",
];

/// A bare child-word mention is too weak a signal on its own; past this
/// length the message is assumed to carry real context.
const MIN_CONTEXT_LEN: usize = 60;

/// True when the text contains a disqualifier phrase. Disqualifiers take
/// absolute precedence over every other signal.
pub fn has_disqualifier(text: &str) -> bool {
    let lower = text.to_lowercase();
    DISQUALIFIERS.iter().any(|phrase| lower.contains(phrase))
}

/// True when the text looks like a genuine sleep-domain request.
pub fn is_on_topic(text: &str) -> bool {
    if has_disqualifier(text) {
        return false;
    }
    let lower = text.to_lowercase();
    if SLEEP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        return true;
    }
    CHILD_KEYWORDS.iter().any(|kw| lower.contains(kw)) && text.trim().len() > MIN_CONTEXT_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sleep_keyword_passes() {
        assert!(is_on_topic("my baby won't sleep"));
        assert!(is_on_topic("short naps all day"));
        assert!(is_on_topic("She wakes at 5am every day"));
    }

    #[test]
    fn disqualifier_takes_precedence_over_sleep_keyword() {
        let text = "my baby won't sleep, just kidding";
        assert!(has_disqualifier(text));
        assert!(!is_on_topic(text));
    }

    #[test]
    fn bare_child_word_is_too_weak_alone() {
        assert!(!is_on_topic("my toddler"));
        // Long enough to carry real context
        assert!(is_on_topic(
            "my toddler has been really difficult in the evenings lately and \
             I am not sure what routine to try next"
        ));
    }

    #[test]
    fn off_topic_text_is_rejected() {
        assert!(!is_on_topic("what's the weather tomorrow"));
        assert!(!is_on_topic("write me a poem about the sea"));
    }

    #[test]
    fn cancellation_and_test_phrases_disqualify() {
        assert!(has_disqualifier("never mind"));
        assert!(has_disqualifier("I'm just testing this thing"));
        assert!(has_disqualifier("we don't have a baby yet"));
    }
}
