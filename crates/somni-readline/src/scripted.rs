//! Offline capability for demos without API keys.

use async_trait::async_trait;
use somni_core::capability::{CapabilityError, CompletionAgent};

const DEMO_DOC: &str = "\
Here's a steady daily rhythm to try - small, consistent steps work best.

## Suggested Schedule

- Wake: 7:00 AM
- Morning Nap: 9:30 AM
- Lunch: 12:00 PM
- Afternoon Nap: 2:30 PM
- Wind-down: 6:45 PM
- Lights Out: 7:30 PM

## Notes

Hold each change for three or four days before adjusting again.
";

/// Answers every kind of request the pipeline issues with canned text.
pub struct ScriptedCapability;

#[async_trait]
impl CompletionAgent for ScriptedCapability {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
        if prompt.contains("YES or NO") {
            Ok("YES".to_string())
        } else if prompt.contains("Return only a JSON object") {
            Ok("{}".to_string())
        } else {
            Ok(DEMO_DOC.to_string())
        }
    }
}
