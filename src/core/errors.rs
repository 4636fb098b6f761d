/*!
 * Error Types
 * Dispatch error taxonomy with thiserror, miette and serde support
 */

use super::mode::GreenMode;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the dispatch layer itself
///
/// Failures of the dispatched operation are never wrapped in this type:
/// values returned by the operation flow back untouched and panics are
/// resumed on the caller.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum GreenError {
    #[error("Invalid usage: {0}")]
    #[diagnostic(
        code(green::invalid_usage),
        help("Deferred execution, `wait = false` and timeouts are not supported in synchronous mode.")
    )]
    InvalidUsage(String),

    #[error("Operation not supported by the {0} executor")]
    #[diagnostic(
        code(green::unsupported_mode),
        help("This executor has no deferred execution capability. Pick an asynchronous mode.")
    )]
    UnsupportedMode(GreenMode),

    #[error("Operation did not complete within {timeout_ms}ms ({mode} executor)")]
    #[diagnostic(
        code(green::timeout),
        help("The operation keeps running in the background; it was neither cancelled nor rolled back.")
    )]
    Timeout { mode: GreenMode, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(green::configuration_error),
        help("Check that the requested green mode is compiled in and spelled correctly.")
    )]
    Configuration(String),

    #[error("Failed to start {mode} backend: {reason}")]
    #[diagnostic(
        code(green::backend_unavailable),
        help("The backend could not allocate its threads or runtime. Check system resources.")
    )]
    Backend { mode: GreenMode, reason: String },

    #[error("Internal error: {0}")]
    #[diagnostic(
        code(green::internal_error),
        help("An executor broke its contract. Please report this issue.")
    )]
    Internal(String),
}

impl GreenError {
    /// The canonical rejection for deferred behavior on the synchronous executor
    pub fn synchronous_only() -> Self {
        GreenError::InvalidUsage("not supported in synchronous mode".to_string())
    }

    pub(crate) fn timeout(mode: GreenMode, timeout: Duration) -> Self {
        GreenError::Timeout {
            mode,
            timeout_ms: timeout.as_millis() as u64,
        }
    }

    pub(crate) fn backend(mode: GreenMode, reason: impl ToString) -> Self {
        GreenError::Backend {
            mode,
            reason: reason.to_string(),
        }
    }

    /// Check if this is a timeout error
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is an invalid usage error
    #[inline]
    pub fn is_invalid_usage(&self) -> bool {
        matches!(self, Self::InvalidUsage(_))
    }

    /// Check if the requested mode could not be resolved or started
    #[inline]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Backend { .. })
    }
}

/// Result type for dispatch operations
pub type GreenResult<T> = std::result::Result<T, GreenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = GreenError::Timeout {
            mode: GreenMode::Futures,
            timeout_ms: 250,
        };
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"error_type\":\"timeout\""));
        let deserialized: GreenError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, deserialized);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            GreenError::synchronous_only().to_string(),
            "Invalid usage: not supported in synchronous mode"
        );
        assert_eq!(
            GreenError::timeout(GreenMode::EventLoop, Duration::from_millis(1500)).to_string(),
            "Operation did not complete within 1500ms (event_loop executor)"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(GreenError::timeout(GreenMode::Futures, Duration::ZERO).is_timeout());
        assert!(GreenError::synchronous_only().is_invalid_usage());
        assert!(GreenError::backend(GreenMode::Greenlets, "no threads").is_configuration());
        assert!(!GreenError::Internal("x".into()).is_configuration());
    }
}
