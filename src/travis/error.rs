//! Error types for the Travis CI gateway.

use thiserror::Error;

/// Errors raised by the Travis CI gateway.
///
/// Ordinary host-side rejections (4xx/5xx) are reported as typed results by
/// the gateway operations; only transport failures and malformed responses
/// surface here.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum TravisCiError {
    /// Raised when the HTTP request could not be completed.
    #[error("travis transport error: {message}")]
    Transport {
        /// Message reported by the HTTP client.
        message: String,
    },
    /// Raised when a response body could not be decoded.
    #[error("malformed travis response during {operation}: {message}")]
    Decode {
        /// Operation whose response failed to decode.
        operation: &'static str,
        /// Message reported by the decoder.
        message: String,
    },
}

impl From<reqwest::Error> for TravisCiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            message: value.to_string(),
        }
    }
}
