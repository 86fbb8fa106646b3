//! Response normalization.
//!
//! The backend has shipped two response layouts: a flat one with `safe`,
//! `reason`, `sanitized` and `semantic_score` at the top level, and a nested
//! one that carries the detector output under `analysis`. This module is the
//! single place that knows about both; everything downstream only sees
//! [`AnalysisResult`].
//!
//! Each field is resolved independently, first present candidate wins:
//!
//! | field            | candidates                                   | default |
//! |------------------|----------------------------------------------|---------|
//! | `safe`           | `safe`, `analysis.final_safe`                | `false` |
//! | `reasons`        | `analysis.reason`, `reason`                  | `[]`    |
//! | `sanitized`      | `analysis.sanitized`, `sanitized` (non-empty)| none    |
//! | `semantic_score` | `analysis.semantic_score`, `semantic_score`  | `0`     |
//!
//! JSON `null` counts as absent.

use serde_json::Value;
use tracing::warn;

use promptguard_models::AnalysisResult;

use crate::error::NormalizeError;

const SAFE_PATHS: &[&[&str]] = &[&["safe"], &["analysis", "final_safe"]];
const REASON_PATHS: &[&[&str]] = &[&["analysis", "reason"], &["reason"]];
const SANITIZED_PATHS: &[&[&str]] = &[&["analysis", "sanitized"], &["sanitized"]];
const SCORE_PATHS: &[&[&str]] = &[&["analysis", "semantic_score"], &["semantic_score"]];

/// How wrongly-typed fields are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizeMode {
    /// Treat a wrongly-typed field as absent and keep resolving.
    #[default]
    Lenient,
    /// Fail with [`NormalizeError::MalformedResponse`].
    Strict,
}

/// Outcome of inspecting one candidate value.
enum Field<T> {
    Found(T),
    Skip,
    Mismatch,
}

/// Maps backend payloads to [`AnalysisResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer {
    mode: NormalizeMode,
}

impl ResponseNormalizer {
    /// Creates a normalizer with the given mode.
    pub fn new(mode: NormalizeMode) -> Self {
        Self { mode }
    }

    /// Normalizes a payload. Only strict mode can fail.
    ///
    /// The payload is cloned into the result; it is never modified.
    pub fn normalize(&self, raw: &Value) -> Result<AnalysisResult, NormalizeError> {
        let safe = self
            .resolve(raw, SAFE_PATHS, "a boolean", |v| match v.as_bool() {
                Some(b) => Field::Found(b),
                None => Field::Mismatch,
            })?
            .unwrap_or(false);

        let reasons = self
            .resolve(raw, REASON_PATHS, "an array of strings", |v| {
                reasons_from(v, self.mode)
            })?
            .unwrap_or_default();

        let sanitized = self.resolve(raw, SANITIZED_PATHS, "a string", |v| match v.as_str() {
            Some("") => Field::Skip,
            Some(s) => Field::Found(s.to_string()),
            None => Field::Mismatch,
        })?;

        let semantic_score = self
            .resolve(raw, SCORE_PATHS, "a number", |v| match v.as_f64() {
                Some(n) => Field::Found(n),
                None => Field::Mismatch,
            })?
            .unwrap_or(0.0);

        Ok(AnalysisResult::builder(raw.clone())
            .safe(safe)
            .reasons(reasons)
            .sanitized(sanitized)
            .semantic_score(semantic_score)
            .build())
    }

    fn resolve<T>(
        &self,
        raw: &Value,
        candidates: &[&[&str]],
        expected: &'static str,
        extract: impl Fn(&Value) -> Field<T>,
    ) -> Result<Option<T>, NormalizeError> {
        for path in candidates {
            let Some(value) = lookup(raw, path) else {
                continue;
            };

            match extract(value) {
                Field::Found(found) => return Ok(Some(found)),
                Field::Skip => continue,
                Field::Mismatch => {
                    let field = path.join(".");
                    match self.mode {
                        NormalizeMode::Strict => {
                            return Err(NormalizeError::MalformedResponse { field, expected });
                        }
                        NormalizeMode::Lenient => {
                            warn!(field = %field, expected, "ignoring wrongly-typed response field");
                        }
                    }
                }
            }
        }

        Ok(None)
    }
}

/// Normalizes a payload leniently. Never fails.
pub fn normalize(raw: &Value) -> AnalysisResult {
    match ResponseNormalizer::new(NormalizeMode::Lenient).normalize(raw) {
        Ok(result) => result,
        // Lenient resolution never produces a mismatch error.
        Err(_) => AnalysisResult::builder(raw.clone()).build(),
    }
}

/// Walks `path` through nested objects. Missing keys, non-object parents and
/// `null` all yield `None`.
fn lookup<'a>(raw: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = raw;
    for key in path {
        current = current.get(*key)?;
    }
    (!current.is_null()).then_some(current)
}

fn reasons_from(value: &Value, mode: NormalizeMode) -> Field<Vec<String>> {
    let Some(items) = value.as_array() else {
        return Field::Mismatch;
    };

    let mut reasons = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => reasons.push(s.clone()),
            other => match mode {
                NormalizeMode::Strict => return Field::Mismatch,
                NormalizeMode::Lenient => reasons.push(other.to_string()),
            },
        }
    }
    Field::Found(reasons)
}
