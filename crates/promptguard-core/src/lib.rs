//! PromptGuard Core - client-side logic shared by every PromptGuard interface.
//!
//! This crate holds the parts of the analysis workflow that do not touch the
//! network:
//!
//! - **config**: Backend URL, poll interval and timeouts
//! - **normalizer**: Map any backend payload to an `AnalysisResult`
//! - **history**: Session-scoped, most-recent-first submission history
//! - **presentation**: Display values derived from a result

pub mod config;
pub mod error;
pub mod history;
pub mod normalizer;
pub mod presentation;

pub use config::{
    ClientConfig, API_URL_ENV, DEFAULT_API_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REQUEST_TIMEOUT,
};
pub use error::{ConfigError, NormalizeError, Result};
pub use history::{HistoryStore, PREVIEW_CHARS};
pub use normalizer::{normalize, NormalizeMode, ResponseNormalizer};
pub use presentation::{
    score_percent, Badge, HealthIndicator, IndicatorLevel, ResultView, ScoreLevel,
    HIGH_ALERT_THRESHOLD,
};

// Re-export the model types so downstream crates need a single import.
pub use promptguard_models::{AnalysisResult, EntryId, HealthState, HistoryEntry};
