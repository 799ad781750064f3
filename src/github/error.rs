//! Error types for the GitHub gateway.

use thiserror::Error;

/// Errors raised by the GitHub gateway.
///
/// Ordinary host-side rejections (4xx/5xx) are reported as typed results by
/// the gateway operations; only transport failures and malformed responses
/// surface here.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum GitHubHostError {
    /// Raised when the HTTP request could not be completed.
    #[error("github transport error: {message}")]
    Transport {
        /// Message reported by the HTTP client.
        message: String,
    },
    /// Raised when a response body could not be decoded.
    #[error("malformed github response during {operation}: {message}")]
    Decode {
        /// Operation whose response failed to decode.
        operation: &'static str,
        /// Message reported by the decoder.
        message: String,
    },
    /// Raised when an operation with no absent-value channel receives a
    /// status it cannot interpret.
    #[error("unexpected status {status} from github during {operation}")]
    UnexpectedStatus {
        /// Operation that received the status.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
    },
}

impl From<reqwest::Error> for GitHubHostError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}
