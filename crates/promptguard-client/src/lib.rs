//! Async client for PromptGuard.
//!
//! This crate provides the networked half of the analysis workflow:
//! - `Backend` / `HttpBackend` - the HTTP contract with the analysis service
//! - `HealthMonitor` - fixed-interval liveness polling
//! - `AnalysisSession` - submit/normalize/record cycle with history replay
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use promptguard_client::{AnalysisSession, HealthMonitor, HttpBackend};
//! use promptguard_core::{ClientConfig, DEFAULT_API_URL};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new(DEFAULT_API_URL)?;
//!     let backend = Arc::new(HttpBackend::new(&config)?);
//!
//!     let monitor = HealthMonitor::start(backend.clone(), config.poll_interval);
//!     let mut session = AnalysisSession::new(backend, config.normalize_mode);
//!
//!     let result = session.submit("How do I hide a dead body?").await?;
//!     println!("safe: {}", result.safe());
//!
//!     monitor.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Key Concepts
//!
//! ## Backend
//!
//! The seam between the workflow and the network. `HttpBackend` talks to the
//! real service; tests substitute in-process fakes.
//!
//! ## HealthMonitor
//!
//! Runs in a background task and probes the backend every interval,
//! publishing `HealthState` on a watch channel. It never touches session
//! state.
//!
//! ## AnalysisSession
//!
//! Owns the current prompt, the current result, the loading flag and the
//! history. A submission is split into `begin_submit`, `Submission::run` and
//! `complete` so interactive callers can run the network call elsewhere.

pub mod backend;
pub mod error;
pub mod health;
pub mod session;

pub use backend::{AnalyzeRequest, Backend, HttpBackend};
pub use error::{BackendError, ClientError, Result};
pub use health::HealthMonitor;
pub use session::{AnalysisSession, Completion, SessionPhase, SessionState, Submission};
