//! Error types for the sift-index crate.

use sift_query::BestBetsError;
use thiserror::Error;

/// Errors that can occur when routing to or talking with the index engine.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A named index or backend is not configured.
    #[error("no such index: {name}")]
    NoSuchIndex {
        /// The unknown name.
        name: String,
    },

    /// A multi-index target was requested with no names.
    #[error("no index names given")]
    EmptyTarget,

    /// The engine did not answer in time.
    #[error("engine timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The engine could not be reached.
    #[error("engine request failed: {0}")]
    Transport(String),

    /// The engine answered with a non-success status.
    #[error("engine returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The engine's answer could not be decoded.
    #[error("failed to decode engine response: {0}")]
    Decode(String),
}

impl IndexError {
    /// Creates a `Transport` or `Timeout` error from a client error.
    pub(crate) fn transport(source: &reqwest::Error, timeout_ms: u64) -> Self {
        if source.is_timeout() {
            Self::Timeout { timeout_ms }
        } else {
            Self::Transport(source.to_string())
        }
    }

    /// Returns true if the engine reported that the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. } | Self::NoSuchIndex { .. })
    }
}

impl From<IndexError> for BestBetsError {
    /// Sorts engine failures into expected degradation and rejected requests.
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            IndexError::NoSuchIndex { name } => Self::NotFound(name),
            IndexError::Status { status: 404, body } => Self::NotFound(body),
            // Request timeout and throttling are the engine's load, not a bad payload.
            IndexError::Status {
                status: status @ (408 | 429),
                body,
            } => Self::Unavailable(format!("status {status}: {body}")),
            IndexError::Status { status, body } if (400..500).contains(&status) => {
                Self::Rejected {
                    status,
                    message: body,
                }
            }
            IndexError::Status { status, body } => {
                Self::Unavailable(format!("status {status}: {body}"))
            }
            IndexError::Transport(message) => Self::Unavailable(message),
            err @ IndexError::EmptyTarget => Self::Unavailable(err.to_string()),
            IndexError::Decode(message) => Self::MalformedResponse(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16) -> IndexError {
        IndexError::Status {
            status,
            body: "body".into(),
        }
    }

    #[test]
    fn test_best_bets_degradation_mapping() {
        assert_eq!(
            BestBetsError::from(IndexError::Timeout { timeout_ms: 500 }),
            BestBetsError::Timeout { timeout_ms: 500 }
        );
        assert!(matches!(
            BestBetsError::from(status(404)),
            BestBetsError::NotFound(_)
        ));
        assert!(matches!(
            BestBetsError::from(status(503)),
            BestBetsError::Unavailable(_)
        ));
        assert!(matches!(
            BestBetsError::from(IndexError::Decode("eof".into())),
            BestBetsError::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_client_errors_are_rejections() {
        for code in [400, 422] {
            let err = BestBetsError::from(status(code));
            assert!(!err.is_degradable(), "status {code}");
        }
    }

    #[test]
    fn test_throttling_and_request_timeout_degrade() {
        for code in [408, 429] {
            let err = BestBetsError::from(status(code));
            assert!(matches!(err, BestBetsError::Unavailable(_)), "status {code}");
            assert!(err.is_degradable());
        }
    }

    #[test]
    fn test_not_found() {
        assert!(status(404).is_not_found());
        assert!(IndexError::NoSuchIndex { name: "z".into() }.is_not_found());
        assert!(!status(500).is_not_found());
    }
}
