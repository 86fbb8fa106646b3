//! Error types for the client crate.

use thiserror::Error;

/// Transport-level failures talking to the backend.
///
/// Every variant is treated the same by the session: the backend is
/// considered unreachable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(u16),

    /// The response body was not valid JSON.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BackendError::Timeout
        } else if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            BackendError::Status(status.as_u16())
        } else {
            BackendError::Request(err.to_string())
        }
    }
}

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend failure surfaced to the caller.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A submission is already outstanding for this session.
    #[error("a submission is already in progress")]
    SubmitInProgress,

    /// A completion arrived that does not belong to the outstanding
    /// submission.
    #[error("no matching submission in progress")]
    NoSubmissionInProgress,

    /// History selection outside the stored range.
    #[error("history index {index} out of range ({len} entries)")]
    HistoryIndexOutOfRange { index: usize, len: usize },
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
