//! One-shot semantic topic classification.
//!
//! Used only for first-turn messages that passed keyword screening but
//! extracted almost nothing. Fails open: a capability outage must never
//! block a legitimate user, so every error reads as "genuine".

use crate::generation::complete_with_timeout;
use somni_core::capability::CompletionAgent;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(6);

pub struct TopicClassifierService {
    agent: Arc<dyn CompletionAgent>,
}

impl TopicClassifierService {
    pub fn new(agent: Arc<dyn CompletionAgent>) -> Self {
        Self { agent }
    }

    /// True when the message looks like a genuine request for help with a
    /// child's sleep. Anything other than an unambiguous NO reads as yes.
    pub async fn is_genuine(&self, text: &str) -> bool {
        let prompt = format!(
            "Is the following message a genuine request for help with a child's sleep?\n\
             Answer with exactly one word: YES or NO.\n\nMessage:\n{text}"
        );
        match complete_with_timeout(self.agent.as_ref(), &prompt, CLASSIFY_TIMEOUT).await {
            Ok(reply) => {
                let verdict = first_word(&reply);
                debug!(verdict = %verdict, "Topic classification verdict");
                verdict != "NO"
            }
            Err(err) => {
                warn!(error = %err, "Topic classification failed, treating message as genuine");
                true
            }
        }
    }
}

fn first_word(reply: &str) -> String {
    reply
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_ascii_alphabetic())
        .to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use somni_core::capability::CapabilityError;

    struct FixedAgent(&'static str);

    #[async_trait]
    impl CompletionAgent for FixedAgent {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, CapabilityError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingAgent;

    #[async_trait]
    impl CompletionAgent for FailingAgent {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(&self, _prompt: &str) -> Result<String, CapabilityError> {
            Err(CapabilityError::ExecutionFailed("down".into()))
        }
    }

    #[tokio::test]
    async fn yes_and_no_are_respected() {
        assert!(TopicClassifierService::new(Arc::new(FixedAgent("YES")))
            .is_genuine("m")
            .await);
        assert!(!TopicClassifierService::new(Arc::new(FixedAgent("no.")))
            .is_genuine("m")
            .await);
    }

    #[tokio::test]
    async fn anything_ambiguous_fails_open() {
        assert!(TopicClassifierService::new(Arc::new(FixedAgent("Maybe?")))
            .is_genuine("m")
            .await);
        assert!(TopicClassifierService::new(Arc::new(FixedAgent("")))
            .is_genuine("m")
            .await);
    }

    #[tokio::test]
    async fn capability_failure_fails_open() {
        assert!(TopicClassifierService::new(Arc::new(FailingAgent))
            .is_genuine("m")
            .await);
    }
}
