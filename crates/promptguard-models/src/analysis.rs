//! Canonical analysis result.
//!
//! Every backend response, whatever its layout, is reduced to an
//! [`AnalysisResult`] before anything downstream looks at it. Failures are
//! represented by sentinel results of the same type.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::builders::AnalysisResultBuilder;

/// Message carried by the sentinel result when the backend cannot be reached.
pub const UNREACHABLE_MESSAGE: &str = "Backend unreachable";

/// Normalized verdict for a single prompt.
///
/// Immutable once built: fields are private and only exposed through
/// accessors. Construct through [`AnalysisResultBuilder`]; deserialized
/// values go through the builder too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StoredResult")]
pub struct AnalysisResult {
    pub(crate) safe: bool,
    #[serde(default)]
    pub(crate) reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sanitized: Option<String>,
    #[serde(default)]
    pub(crate) semantic_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    pub(crate) raw: serde_json::Value,
}

/// Serialized form of [`AnalysisResult`], before the builder's checks.
#[derive(Deserialize)]
struct StoredResult {
    safe: bool,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    sanitized: Option<String>,
    #[serde(default)]
    semantic_score: f64,
    #[serde(default)]
    error: Option<String>,
    raw: serde_json::Value,
}

impl From<StoredResult> for AnalysisResult {
    fn from(stored: StoredResult) -> Self {
        let builder = AnalysisResultBuilder::new(stored.raw)
            .safe(stored.safe)
            .reasons(stored.reasons)
            .sanitized(stored.sanitized)
            .semantic_score(stored.semantic_score);

        match stored.error {
            Some(message) => builder.error(message).build(),
            None => builder.build(),
        }
    }
}

impl AnalysisResult {
    /// Creates a builder wrapping the given raw payload.
    pub fn builder(raw: serde_json::Value) -> AnalysisResultBuilder {
        AnalysisResultBuilder::new(raw)
    }

    /// Sentinel result used when the analyze call fails at the transport level.
    pub fn unreachable() -> Self {
        Self::failure(UNREACHABLE_MESSAGE)
    }

    /// Sentinel result carrying an arbitrary failure message.
    ///
    /// The verdict is fail-closed and the raw payload is `{"error": message}`.
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        AnalysisResultBuilder::new(json!({ "error": message }))
            .error(message)
            .build()
    }

    /// Final verdict.
    pub fn safe(&self) -> bool {
        self.safe
    }

    /// Human-readable rationale, possibly empty.
    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Backend-suggested rewrite of the prompt. Never an empty string.
    pub fn sanitized(&self) -> Option<&str> {
        self.sanitized.as_deref()
    }

    /// Similarity/risk score, always finite and non-negative.
    pub fn semantic_score(&self) -> f64 {
        self.semantic_score
    }

    /// Failure message, set only on sentinel results.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true if this is a sentinel failure result.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The untouched backend payload.
    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }
}
