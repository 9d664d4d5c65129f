//! Error types for the Somni pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Somni pipeline.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait. Every variant that can
/// reach a user is mapped to a short human-readable message by
/// [`SomniError::user_message`]; raw internal messages are never surfaced.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum SomniError {
    /// The child's age could never be resolved within the question budget.
    #[error("Age unresolved after question budget exhausted")]
    AgeUnresolved,

    /// The external generation capability failed or timed out.
    #[error("Generation failed: {message}")]
    Generation { message: String, timed_out: bool },

    /// Prompt template rendering error
    #[error("Template error: {0}")]
    Template(String),

    /// Malformed turn input (empty transcript, non-user last message, etc.)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SomniError {
    /// Creates a Generation error for a non-timeout failure
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Creates a Generation error for a timed-out capability call
    pub fn generation_timeout(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Generation error
    pub fn is_generation(&self) -> bool {
        matches!(self, Self::Generation { .. })
    }

    /// Check if this error came from a capability timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Generation { timed_out: true, .. })
    }

    /// The short, user-facing message for this error.
    ///
    /// Internal detail (capability error bodies, serde messages) stays in
    /// the `Display` form for logs; this is what the turn response carries.
    pub fn user_message(&self) -> String {
        match self {
            Self::AgeUnresolved => {
                "I couldn't work out your child's age. Could you tell me how old they are, \
                 for example \"she's 8 months\"?"
                    .to_string()
            }
            Self::Generation { timed_out: true, .. } => {
                "Putting the schedule together took too long. Please try again in a moment."
                    .to_string()
            }
            Self::Generation { .. } => {
                "Something went wrong while creating the schedule. Please try again.".to_string()
            }
            Self::InvalidInput(_) => {
                "I couldn't read that message. Please try rephrasing it.".to_string()
            }
            Self::Template(_) | Self::Serialization { .. } | Self::Internal(_) => {
                "Something unexpected went wrong on our side. Please try again.".to_string()
            }
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SomniError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for SomniError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<minijinja::Error> for SomniError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for SomniError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, SomniError>`.
pub type Result<T> = std::result::Result<T, SomniError>;
