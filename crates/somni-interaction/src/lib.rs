//! HTTP implementations of the completion capability.
//!
//! Two named instances back the pipeline: Gemini as the fast instance and
//! Claude as the higher-quality one.

pub mod claude_api_agent;
pub mod config;
pub mod gemini_api_agent;

pub use claude_api_agent::ClaudeApiAgent;
pub use config::{load_secret_config, SecretConfig};
pub use gemini_api_agent::GeminiApiAgent;

use somni_core::capability::{CapabilityError, CompletionAgent};
use std::sync::Arc;

/// Builds the (fast, quality) pair from secret.json / environment
/// configuration.
pub fn agent_pair_from_env()
-> Result<(Arc<dyn CompletionAgent>, Arc<dyn CompletionAgent>), CapabilityError> {
    let fast = GeminiApiAgent::try_from_env()?;
    let quality = ClaudeApiAgent::try_from_env()?;
    Ok((Arc::new(fast), Arc::new(quality)))
}
