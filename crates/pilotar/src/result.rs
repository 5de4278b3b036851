//! Result and error types for Pilotar.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for Pilotar operations
pub type PilotResult<T> = Result<T, PilotError>;

/// Errors that can occur while driving a scenario
#[derive(Debug, Error)]
pub enum PilotError {
    /// Selector matched nothing at the instant of a non-waiting action
    #[error("{operation} failed: no element matches selector {selector:?}")]
    ElementNotFound {
        /// Operation that was dispatched
        operation: String,
        /// Selector that matched nothing
        selector: String,
    },

    /// A poll's predicate never became true within its timeout
    #[error("condition not met within {ms}ms (last observed: {last_observed})")]
    DeadlineExceeded {
        /// Timeout in milliseconds
        ms: u64,
        /// Last state the predicate observed before the deadline
        last_observed: String,
    },

    /// The command channel itself failed (disconnected surface, crashed process)
    #[error("command channel unavailable: {message}")]
    ChannelUnavailable {
        /// Error message
        message: String,
    },

    /// An external shutdown signal interrupted the run
    #[error("cancelled by external shutdown signal")]
    Cancelled,

    /// Poll specification violated its invariants (interval > 0, timeout >= interval)
    #[error("invalid poll specification: {message}")]
    InvalidPollSpec {
        /// Error message
        message: String,
    },

    /// I/O error (artifact persistence)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error (report export)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PilotError {
    /// Classify this error for report serialization.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ElementNotFound { .. } => FailureKind::ElementNotFound,
            Self::DeadlineExceeded { .. } => FailureKind::DeadlineExceeded,
            Self::ChannelUnavailable { .. } => FailureKind::ChannelUnavailable,
            Self::Cancelled => FailureKind::Cancelled,
            Self::InvalidPollSpec { .. } => FailureKind::InvalidPollSpec,
            Self::Io(_) => FailureKind::Io,
            Self::Json(_) => FailureKind::Json,
        }
    }

    /// Selector involved in the failure, when the error carries one.
    #[must_use]
    pub fn selector(&self) -> Option<&str> {
        match self {
            Self::ElementNotFound { selector, .. } => Some(selector),
            _ => None,
        }
    }
}

/// Serializable classification of the error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Selector matched nothing at dispatch time
    ElementNotFound,
    /// Poll deadline elapsed before the condition became true
    DeadlineExceeded,
    /// Command channel connectivity failure
    ChannelUnavailable,
    /// Run interrupted by external shutdown
    Cancelled,
    /// Poll specification rejected at validation time
    InvalidPollSpec,
    /// Artifact I/O failure
    Io,
    /// Report serialization failure
    Json,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_element_not_found_display() {
            let err = PilotError::ElementNotFound {
                operation: "click".to_string(),
                selector: "#missing".to_string(),
            };
            let rendered = err.to_string();
            assert!(rendered.contains("click"));
            assert!(rendered.contains("#missing"));
        }

        #[test]
        fn test_deadline_exceeded_carries_last_observed() {
            let err = PilotError::DeadlineExceeded {
                ms: 5000,
                last_observed: "text was \"Install\"".to_string(),
            };
            assert!(err.to_string().contains("5000ms"));
            assert!(err.to_string().contains("Install"));
        }

        #[test]
        fn test_kind_classification() {
            let err = PilotError::ChannelUnavailable {
                message: "gone".to_string(),
            };
            assert_eq!(err.kind(), FailureKind::ChannelUnavailable);
            assert_eq!(PilotError::Cancelled.kind(), FailureKind::Cancelled);
        }

        #[test]
        fn test_selector_extraction() {
            let err = PilotError::ElementNotFound {
                operation: "set_value".to_string(),
                selector: "#search".to_string(),
            };
            assert_eq!(err.selector(), Some("#search"));
            assert_eq!(PilotError::Cancelled.selector(), None);
        }

        #[test]
        fn test_io_error_conversion() {
            let io = std::io::Error::new(std::io::ErrorKind::NotFound, "nope");
            let err: PilotError = io.into();
            assert_eq!(err.kind(), FailureKind::Io);
        }
    }

    mod failure_kind_tests {
        use super::*;

        #[test]
        fn test_kind_serializes_as_identifier() {
            let json = serde_json::to_string(&FailureKind::DeadlineExceeded).unwrap();
            assert_eq!(json, "\"DeadlineExceeded\"");
        }

        #[test]
        fn test_kind_round_trip() {
            let kind: FailureKind = serde_json::from_str("\"Cancelled\"").unwrap();
            assert_eq!(kind, FailureKind::Cancelled);
        }
    }
}
