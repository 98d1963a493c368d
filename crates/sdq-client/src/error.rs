//! Error types for backend calls.

use thiserror::Error;

/// Errors from a backend call. Every variant except
/// [`ClientError::InvalidBaseUrl`] leaves the caller free to fall back to
/// local generation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Connection, timeout or request-building failure.
    #[error("network error: {0}")]
    Network(String),

    /// Non-success HTTP status.
    #[error("backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// `success: false` body.
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// Body did not match the expected shape.
    #[error("failed to decode backend response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Returns a user-friendly message suitable for a notification.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::InvalidBaseUrl { .. } => "The backend URL is not valid. Check the configuration.",
            Self::Network(_) => "Could not reach the backend. Using local generation instead.",
            Self::Status { .. } | Self::Decode(_) => {
                "The backend returned an unexpected response. Using local generation instead."
            }
            Self::Rejected(reason) => reason,
        }
    }

    /// Whether a local fallback should replace the failed call.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidBaseUrl { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for backend calls.
pub type Result<T> = std::result::Result<T, ClientError>;
