//! Generation adapter and the validate/repair pipeline.
//!
//! Two capability instances are held: a fast one and a higher-quality one.
//! Standard mode tries the high-quality instance first and falls back to
//! the fast one so the user still gets a timely answer; social mode goes
//! straight to the fast instance and never falls back. Repair is a single
//! bounded attempt and only runs when the primary did not already fall
//! back.

use somni_core::capability::{CapabilityError, CompletionAgent};
use somni_core::error::{Result, SomniError};
use somni_core::fields::ExtractedFields;
use somni_core::prompt::{build_prompt, build_repair_prompt};
use somni_core::schedule::{validate, ValidationIssue};
use somni_core::turn::OutputMode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Deadline for the high-quality instance in standard mode.
pub const STANDARD_TIMEOUT: Duration = Duration::from_secs(30);
/// Deadline for the fast instance (social mode and standard-mode fallback).
pub const FAST_TIMEOUT: Duration = Duration::from_secs(15);
/// Shorter deadline for the single repair attempt.
pub const REPAIR_TIMEOUT: Duration = Duration::from_secs(12);

/// Races a capability call against a deadline. The call itself is not
/// cancelled midway beyond being dropped; the timeout is the only
/// early-exit mechanism.
pub async fn complete_with_timeout(
    agent: &dyn CompletionAgent,
    prompt: &str,
    timeout: Duration,
) -> std::result::Result<String, CapabilityError> {
    match tokio::time::timeout(timeout, agent.complete(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(CapabilityError::Timeout {
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}

/// Result of one adapter call.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub text: String,
    /// True when the fast instance answered because the primary failed.
    pub used_fallback: bool,
}

/// Primary/fallback pair of capability instances.
pub struct GenerationAdapter {
    fast: Arc<dyn CompletionAgent>,
    quality: Arc<dyn CompletionAgent>,
}

impl GenerationAdapter {
    pub fn new(fast: Arc<dyn CompletionAgent>, quality: Arc<dyn CompletionAgent>) -> Self {
        Self { fast, quality }
    }

    /// Runs the mode-appropriate primary, falling back to the fast
    /// instance only in standard mode.
    pub async fn generate(
        &self,
        prompt: &str,
        mode: OutputMode,
    ) -> std::result::Result<GenerationOutcome, CapabilityError> {
        match mode {
            OutputMode::Social => {
                let text = complete_with_timeout(self.fast.as_ref(), prompt, FAST_TIMEOUT).await?;
                Ok(GenerationOutcome {
                    text,
                    used_fallback: false,
                })
            }
            OutputMode::Standard => {
                match complete_with_timeout(self.quality.as_ref(), prompt, STANDARD_TIMEOUT).await
                {
                    Ok(text) => Ok(GenerationOutcome {
                        text,
                        used_fallback: false,
                    }),
                    Err(err) => {
                        warn!(
                            agent = self.quality.name(),
                            error = %err,
                            "Primary generation failed, trying fast instance"
                        );
                        let text =
                            complete_with_timeout(self.fast.as_ref(), prompt, FAST_TIMEOUT)
                                .await?;
                        Ok(GenerationOutcome {
                            text,
                            used_fallback: true,
                        })
                    }
                }
            }
        }
    }

    /// The single repair attempt, always on the fast instance.
    pub async fn repair(&self, prompt: &str) -> std::result::Result<String, CapabilityError> {
        complete_with_timeout(self.fast.as_ref(), prompt, REPAIR_TIMEOUT).await
    }
}

/// The final document handed back to the caller.
#[derive(Debug, Clone)]
pub struct GeneratedSchedule {
    pub markdown: String,
    pub intro_message: String,
    /// Issues still present after the repair attempt. Surfacing an
    /// imperfect document beats blocking the response.
    pub unresolved_issues: Vec<ValidationIssue>,
}

/// Generate → validate → repair, as one operation.
pub struct ScheduleService {
    adapter: GenerationAdapter,
}

impl ScheduleService {
    pub fn new(adapter: GenerationAdapter) -> Self {
        Self { adapter }
    }

    pub async fn generate_validated(
        &self,
        fields: &ExtractedFields,
        knowledge: &str,
        original_text: &str,
        mode: OutputMode,
    ) -> Result<GeneratedSchedule> {
        let prompt = build_prompt(fields, knowledge, original_text, mode)?;
        let outcome = self
            .adapter
            .generate(&prompt, mode)
            .await
            .map_err(to_somni_error)?;

        let mut markdown = outcome.text;
        let mut issues = validate(&markdown);

        if !issues.is_empty() && !outcome.used_fallback {
            info!(
                issue_count = issues.len(),
                "Draft failed validation, attempting one repair"
            );
            let repair_prompt = build_repair_prompt(&markdown, &issues)?;
            match self.adapter.repair(&repair_prompt).await {
                Ok(repaired) => {
                    let repaired_issues = validate(&repaired);
                    if repaired_issues.is_empty() {
                        debug!("Repair produced a clean document");
                        markdown = repaired;
                        issues = Vec::new();
                    } else {
                        warn!(
                            issue_count = repaired_issues.len(),
                            "Repair did not converge, keeping the original draft"
                        );
                    }
                }
                Err(err) => {
                    warn!(error = %err, "Repair call failed, keeping the original draft");
                }
            }
        } else if !issues.is_empty() {
            debug!("Skipping repair: the draft already came from the fallback instance");
        }

        let intro_message = intro_of(&markdown);
        Ok(GeneratedSchedule {
            markdown,
            intro_message,
            unresolved_issues: issues,
        })
    }
}

fn to_somni_error(err: CapabilityError) -> SomniError {
    if err.is_timeout() {
        SomniError::generation_timeout(err.to_string())
    } else {
        SomniError::generation(err.to_string())
    }
}

/// The text before the first heading, used as the conversational intro.
fn intro_of(markdown: &str) -> String {
    let intro: String = markdown
        .lines()
        .take_while(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    if intro.is_empty() {
        "Here's the schedule I put together for you.".to_string()
    } else {
        intro
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const VALID_DOC: &str = "\
Here's a plan for your little one.

## Suggested Schedule

- Wake: 7:00 AM
- Morning Nap: 9:00 AM
- Lunch: 12:00 PM
- Afternoon Nap: 2:30 PM
- Lights Out: 7:30 PM
";

    const INVALID_DOC: &str = "\
## Suggested Schedule

- Wake: 7:00 AM
- Wake: 9:00 AM
";

    /// Replays a fixed queue of responses and records its prompts.
    struct ScriptedAgent {
        name: &'static str,
        responses: Mutex<Vec<std::result::Result<String, CapabilityError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedAgent {
        fn new(
            name: &'static str,
            responses: Vec<std::result::Result<String, CapabilityError>>,
        ) -> Self {
            Self {
                name,
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionAgent for ScriptedAgent {
        fn name(&self) -> &str {
            self.name
        }

        async fn complete(&self, _prompt: &str) -> std::result::Result<String, CapabilityError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok(VALID_DOC.to_string())
            } else {
                responses.remove(0)
            }
        }
    }

    /// Never answers; exercises the timeout path.
    struct StalledAgent;

    #[async_trait]
    impl CompletionAgent for StalledAgent {
        fn name(&self) -> &str {
            "stalled"
        }

        async fn complete(&self, _prompt: &str) -> std::result::Result<String, CapabilityError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    fn fields() -> ExtractedFields {
        ExtractedFields {
            age_months: Some(8),
            wake_time: Some(somni_core::time::ClockTime::hm(7, 0)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn standard_mode_falls_back_to_fast_on_primary_failure() {
        let fast = Arc::new(ScriptedAgent::new("fast", vec![Ok(VALID_DOC.to_string())]));
        let quality = Arc::new(ScriptedAgent::new(
            "quality",
            vec![Err(CapabilityError::ExecutionFailed("boom".into()))],
        ));
        let adapter = GenerationAdapter::new(fast.clone(), quality.clone());

        let outcome = adapter.generate("p", OutputMode::Standard).await.unwrap();
        assert!(outcome.used_fallback);
        assert_eq!(quality.call_count(), 1);
        assert_eq!(fast.call_count(), 1);
    }

    #[tokio::test]
    async fn social_mode_never_touches_the_quality_instance() {
        let fast = Arc::new(ScriptedAgent::new("fast", vec![Ok(VALID_DOC.to_string())]));
        let quality = Arc::new(ScriptedAgent::new("quality", vec![]));
        let adapter = GenerationAdapter::new(fast.clone(), quality.clone());

        let outcome = adapter.generate("p", OutputMode::Social).await.unwrap();
        assert!(!outcome.used_fallback);
        assert_eq!(quality.call_count(), 0);
        assert_eq!(fast.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_agent_surfaces_a_timeout() {
        let adapter = GenerationAdapter::new(Arc::new(StalledAgent), Arc::new(StalledAgent));
        let err = adapter.generate("p", OutputMode::Social).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn repair_replaces_draft_only_when_clean() {
        // Primary produces an invalid draft; repair (fast) produces a valid one.
        let fast = Arc::new(ScriptedAgent::new("fast", vec![Ok(VALID_DOC.to_string())]));
        let quality = Arc::new(ScriptedAgent::new(
            "quality",
            vec![Ok(INVALID_DOC.to_string())],
        ));
        let service = ScheduleService::new(GenerationAdapter::new(fast.clone(), quality));

        let generated = service
            .generate_validated(&fields(), "k", "t", OutputMode::Standard)
            .await
            .unwrap();
        assert!(generated.unresolved_issues.is_empty());
        assert!(generated.markdown.contains("Lights Out"));
        assert_eq!(fast.call_count(), 1);
    }

    #[tokio::test]
    async fn failed_repair_keeps_the_original_draft() {
        let fast = Arc::new(ScriptedAgent::new(
            "fast",
            vec![Ok(INVALID_DOC.to_string())],
        ));
        let quality = Arc::new(ScriptedAgent::new(
            "quality",
            vec![Ok(INVALID_DOC.to_string())],
        ));
        let service = ScheduleService::new(GenerationAdapter::new(fast, quality));

        let generated = service
            .generate_validated(&fields(), "k", "t", OutputMode::Standard)
            .await
            .unwrap();
        // Best-effort: the imperfect draft is surfaced, not swallowed.
        assert!(!generated.unresolved_issues.is_empty());
        assert_eq!(generated.markdown, INVALID_DOC);
    }

    #[tokio::test]
    async fn no_repair_after_fallback_generation() {
        // Quality fails, fast produces an invalid draft. Repair must not run,
        // so the fast agent is called exactly once.
        let fast = Arc::new(ScriptedAgent::new(
            "fast",
            vec![Ok(INVALID_DOC.to_string())],
        ));
        let quality = Arc::new(ScriptedAgent::new(
            "quality",
            vec![Err(CapabilityError::ExecutionFailed("boom".into()))],
        ));
        let service = ScheduleService::new(GenerationAdapter::new(fast.clone(), quality));

        let generated = service
            .generate_validated(&fields(), "k", "t", OutputMode::Standard)
            .await
            .unwrap();
        assert!(!generated.unresolved_issues.is_empty());
        assert_eq!(fast.call_count(), 1);
    }

    #[test]
    fn intro_is_text_before_first_heading() {
        assert_eq!(intro_of(VALID_DOC), "Here's a plan for your little one.");
        assert_eq!(
            intro_of("## Suggested Schedule\n- Wake: 7:00 AM"),
            "Here's the schedule I put together for you."
        );
    }
}
