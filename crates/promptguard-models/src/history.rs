//! History entry types.
//!
//! A history entry records one completed analyze cycle so it can be replayed
//! later without another network call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::analysis::AnalysisResult;

/// Unique identifier for a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Creates a new random ID.
    pub fn new() -> Self {
        Self(format!("hist-{}", Uuid::new_v4()))
    }

    /// Returns the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One past submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier. Duplicate prompts still get distinct IDs.
    pub id: EntryId,

    /// The prompt that was submitted.
    pub prompt: String,

    /// Verdict at the time of submission, mirrors `full.safe()`.
    pub safe: bool,

    /// The normalized result, raw payload included.
    pub full: AnalysisResult,

    /// When the cycle completed.
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry for a completed cycle.
    pub fn new(prompt: impl Into<String>, full: AnalysisResult) -> Self {
        Self {
            id: EntryId::new(),
            prompt: prompt.into(),
            safe: full.safe(),
            full,
            recorded_at: Utc::now(),
        }
    }

    /// Short label for list views: the first `max_chars` characters
    /// followed by `...`.
    pub fn preview(&self, max_chars: usize) -> String {
        let head: String = self.prompt.chars().take(max_chars).collect();
        format!("{}...", head)
    }

    /// Uppercase verdict tag.
    pub fn tag(&self) -> &'static str {
        if self.safe {
            "SAFE"
        } else {
            "UNSAFE"
        }
    }
}
