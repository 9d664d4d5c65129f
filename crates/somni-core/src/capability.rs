//! The external content-generation capability boundary.
//!
//! Everything the pipeline needs from a language model goes through
//! [`CompletionAgent`]: one prompt in, one text completion out. At least two
//! named instances exist in a deployment (a fast one and a higher-quality
//! one); callers pick per use and wrap every call in their own timeout.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a [`CompletionAgent`] call.
#[derive(Error, Debug, Clone)]
pub enum CapabilityError {
    /// The call did not complete within the caller-supplied deadline.
    #[error("Capability call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The remote capability answered with an error status.
    #[error("Capability process error (status: {status_code:?}): {message}")]
    Process {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The call could not be issued or its response could not be used.
    #[error("Capability execution failed: {0}")]
    ExecutionFailed(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl CapabilityError {
    /// Creates a Process error carrying a server-suggested retry delay.
    pub fn process_with_retry_after(
        status_code: u16,
        message: impl Into<String>,
        is_retryable: bool,
        retry_after: Duration,
    ) -> Self {
        Self::Process {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: Some(retry_after),
        }
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if retrying the same call could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Process { is_retryable, .. } => *is_retryable,
            _ => false,
        }
    }
}

/// A named text-completion capability instance.
///
/// Implementations must be cheap to share (`Arc<dyn CompletionAgent>`); the
/// pipeline holds one handle per instance and never constructs agents
/// per-turn.
#[async_trait]
pub trait CompletionAgent: Send + Sync {
    /// Stable instance name, used in logs ("claude", "gemini", ...).
    fn name(&self) -> &str;

    /// Sends one prompt and returns the completion text.
    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoAgent;

    #[async_trait]
    impl CompletionAgent for EchoAgent {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
            Ok(prompt.to_string())
        }
    }

    #[tokio::test]
    async fn trait_object_is_callable() {
        let agent: Box<dyn CompletionAgent> = Box::new(EchoAgent);
        let out = agent.complete("hello").await.unwrap();
        assert_eq!(out, "hello");
        assert_eq!(agent.name(), "echo");
    }

    #[test]
    fn timeout_is_retryable() {
        assert!(CapabilityError::Timeout { timeout_ms: 100 }.is_retryable());
        assert!(!CapabilityError::ExecutionFailed("bad".into()).is_retryable());
    }
}
