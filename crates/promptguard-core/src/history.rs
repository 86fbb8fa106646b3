//! Session-scoped submission history.
//!
//! Entries are kept most-recent-first for the life of the session. There is
//! no capacity bound and no de-duplication.

use std::collections::VecDeque;

use promptguard_models::{AnalysisResult, HistoryEntry};

/// Number of prompt characters shown in history list previews.
pub const PREVIEW_CHARS: usize = 40;

/// Ordered, in-memory collection of past submissions.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry at the front.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
    }

    /// Returns the entry at `index` (0 is the most recent).
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Returns the prompt and stored result of an entry for replay.
    ///
    /// The stored result is returned as-is, no re-normalization.
    pub fn select(&self, index: usize) -> Option<(&str, &AnalysisResult)> {
        self.entries
            .get(index)
            .map(|entry| (entry.prompt.as_str(), &entry.full))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries, most recent first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Discards every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
