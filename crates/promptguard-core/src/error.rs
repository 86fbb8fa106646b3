//! Error types for the core crate.

use thiserror::Error;

/// Errors raised while building a client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The backend base URL could not be used.
    #[error("invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Errors raised by strict response normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// A known field is present but has the wrong JSON type.
    #[error("malformed response: '{field}' is not {expected}")]
    MalformedResponse { field: String, expected: &'static str },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
