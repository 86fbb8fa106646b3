//! Core data models for PromptGuard.
//!
//! This crate provides the fundamental data types shared by the client
//! crates: the canonical analysis result, history entries, and the backend
//! liveness state.

pub mod analysis;
pub mod builders;
pub mod health;
pub mod history;

// Re-export main types
pub use analysis::{AnalysisResult, UNREACHABLE_MESSAGE};
pub use builders::AnalysisResultBuilder;
pub use health::HealthState;
pub use history::{EntryId, HistoryEntry};
