//! Structured error types for meetbot
//!
//! Every failure a handler can hit is a variant here. The action executor
//! turns them into a single user-facing message, so nothing a handler does
//! can fault the hosting process.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::resolver::TemporalField;

/// Primary error type for meetbot operations
#[derive(Error, Debug)]
pub enum MeetbotError {
    // =========================================================================
    // Slot / Input Errors
    // =========================================================================
    /// A required slot has not been collected yet
    #[error("missing input: {guidance}")]
    MissingInput { guidance: String },

    /// The meeting identifier is not nine ASCII digits
    #[error("malformed meeting identifier: {raw:?}")]
    MalformedIdentifier { raw: String },

    // =========================================================================
    // Temporal Resolution Errors
    // =========================================================================
    /// The resolver returned no candidates for a phrase
    #[error("unresolvable {field} expression: {text:?}")]
    UnresolvableExpression { field: TemporalField, text: String },

    /// The selected candidate's normalized value cannot be decomposed
    #[error("malformed normalized {field} value: {value:?}")]
    MalformedNormalizedValue { field: TemporalField, value: String },

    /// The resolver did not answer in time
    #[error("{field} resolution timed out after {duration:?}")]
    ResolverTimeout {
        field: TemporalField,
        duration: Duration,
    },

    /// The resolver backend failed (network, bad response)
    #[error("resolver unavailable: {message}")]
    ResolverUnavailable { message: String },

    // =========================================================================
    // Dispatch Errors
    // =========================================================================
    /// No action is registered under the requested name
    #[error("action not found: {name}")]
    ActionNotFound { name: String },

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Config file requested explicitly but absent
    #[error("config file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    // =========================================================================
    // External Error Wrappers
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MeetbotError {
    /// Whether the failure came from the temporal resolver rather than the user.
    pub fn is_resolver_fault(&self) -> bool {
        matches!(
            self,
            Self::ResolverTimeout { .. } | Self::ResolverUnavailable { .. }
        )
    }

    /// Get the message that is uttered back to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput { guidance } => guidance.clone(),
            Self::MalformedIdentifier { .. } => {
                "invalid meeting id format, expected 9 digits".to_string()
            }
            Self::UnresolvableExpression { field, .. }
            | Self::MalformedNormalizedValue { field, .. }
            | Self::ResolverTimeout { field, .. } => {
                format!("I couldn't understand the {} you provided", field)
            }
            Self::ResolverUnavailable { .. } => {
                "I couldn't understand the date/time you provided".to_string()
            }
            _ => "sorry, something went wrong while handling that request".to_string(),
        }
    }
}

/// Result type alias using MeetbotError
pub type Result<T> = std::result::Result<T, MeetbotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = MeetbotError::MissingInput {
            guidance: "please provide date of meeting".to_string(),
        };
        assert_eq!(err.user_message(), "please provide date of meeting");

        let err = MeetbotError::UnresolvableExpression {
            field: TemporalField::Time,
            text: "whenever".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "I couldn't understand the time you provided"
        );

        let err = MeetbotError::MalformedIdentifier {
            raw: "12".to_string(),
        };
        assert!(err.user_message().contains("invalid meeting id format"));
    }

    #[test]
    fn test_malformed_value_reads_like_unresolvable() {
        let malformed = MeetbotError::MalformedNormalizedValue {
            field: TemporalField::Date,
            value: "2024".to_string(),
        };
        let unresolvable = MeetbotError::UnresolvableExpression {
            field: TemporalField::Date,
            text: "someday".to_string(),
        };
        assert_eq!(malformed.user_message(), unresolvable.user_message());
    }

    #[test]
    fn test_resolver_faults() {
        assert!(MeetbotError::ResolverTimeout {
            field: TemporalField::Date,
            duration: Duration::from_millis(10),
        }
        .is_resolver_fault());
        assert!(!MeetbotError::ActionNotFound {
            name: "nope".to_string()
        }
        .is_resolver_fault());
    }
}
