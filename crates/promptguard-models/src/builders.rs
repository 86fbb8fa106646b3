//! Builder patterns for complex types.

use crate::analysis::AnalysisResult;

/// Builder for creating [`AnalysisResult`] instances with a fluent API.
///
/// Defaults are fail-closed: `safe = false`, no reasons, no sanitized text,
/// score 0.
#[derive(Debug, Clone)]
pub struct AnalysisResultBuilder {
    raw: serde_json::Value,
    safe: bool,
    reasons: Vec<String>,
    sanitized: Option<String>,
    semantic_score: f64,
    error: Option<String>,
}

impl AnalysisResultBuilder {
    /// Creates a new builder around the raw backend payload.
    pub fn new(raw: serde_json::Value) -> Self {
        Self {
            raw,
            safe: false,
            reasons: Vec::new(),
            sanitized: None,
            semantic_score: 0.0,
            error: None,
        }
    }

    /// Sets the verdict.
    pub fn safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    /// Sets the reasons.
    pub fn reasons(mut self, reasons: Vec<String>) -> Self {
        self.reasons = reasons;
        self
    }

    /// Adds a single reason.
    pub fn add_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    /// Sets the sanitized text. Empty strings are stored as absent.
    pub fn sanitized(mut self, sanitized: Option<String>) -> Self {
        self.sanitized = sanitized.filter(|s| !s.is_empty());
        self
    }

    /// Sets the semantic score. Negative or non-finite values become 0.
    pub fn semantic_score(mut self, score: f64) -> Self {
        self.semantic_score = if score.is_finite() && score > 0.0 {
            score
        } else {
            0.0
        };
        self
    }

    /// Marks the result as a sentinel failure.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    /// Builds the result.
    pub fn build(self) -> AnalysisResult {
        AnalysisResult {
            safe: self.safe,
            reasons: self.reasons,
            sanitized: self.sanitized,
            semantic_score: self.semantic_score,
            error: self.error,
            raw: self.raw,
        }
    }
}
