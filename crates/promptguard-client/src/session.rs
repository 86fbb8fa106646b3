//! Analysis session: prompt submission, result normalization and history.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use promptguard_core::{
    AnalysisResult, ClientConfig, HistoryEntry, HistoryStore, NormalizeError, NormalizeMode,
    ResponseNormalizer,
};

use crate::backend::{Backend, HttpBackend};
use crate::error::{BackendError, ClientError, Result};

/// Source of submission ids, unique across every session in the process.
static NEXT_SUBMISSION_ID: AtomicU64 = AtomicU64::new(1);

/// Where the session is in its submit cycle.
///
/// `Succeeded` and `Failed` describe the last finished cycle; both accept a
/// new submission just like `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// A submission is outstanding.
    Submitting,
    /// The last cycle produced a normalized result.
    Succeeded,
    /// The last cycle ended with a sentinel result.
    Failed,
}

/// State owned by the session. Nothing else mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Text in the prompt input.
    pub current_prompt: String,
    /// Result currently displayed.
    pub current_result: Option<AnalysisResult>,
    /// Whether an analyze call is outstanding.
    pub is_loading: bool,
}

/// An outstanding analyze call, detached from the session so it can run
/// on another task.
pub struct Submission {
    id: u64,
    prompt: String,
    backend: Arc<dyn Backend>,
}

impl fmt::Debug for Submission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Submission")
            .field("id", &self.id)
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl Submission {
    /// The prompt being analyzed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Issues the single analyze call for this submission.
    pub async fn run(self) -> Completion {
        let outcome = self.backend.analyze(&self.prompt).await;
        self.finish(outcome)
    }

    /// Closes this submission with an outcome obtained elsewhere.
    pub fn finish(
        self,
        outcome: std::result::Result<serde_json::Value, BackendError>,
    ) -> Completion {
        Completion {
            id: self.id,
            prompt: self.prompt,
            outcome,
        }
    }
}

/// Result of a finished analyze call, to be fed back into the session
/// that issued it.
#[derive(Debug, Clone)]
pub struct Completion {
    id: u64,
    prompt: String,
    outcome: std::result::Result<serde_json::Value, BackendError>,
}

impl Completion {
    /// The prompt that was analyzed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Orchestrates submissions for one user session.
pub struct AnalysisSession {
    backend: Arc<dyn Backend>,
    normalizer: ResponseNormalizer,
    state: SessionState,
    phase: SessionPhase,
    history: HistoryStore,
    /// Id of the outstanding submission
    pending: Option<u64>,
}

impl fmt::Debug for AnalysisSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalysisSession")
            .field("normalizer", &self.normalizer)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("pending", &self.pending)
            .field("history", &self.history.len())
            .finish()
    }
}

impl AnalysisSession {
    /// Creates a session over the given backend.
    pub fn new(backend: Arc<dyn Backend>, mode: NormalizeMode) -> Self {
        Self {
            backend,
            normalizer: ResponseNormalizer::new(mode),
            state: SessionState::default(),
            phase: SessionPhase::Idle,
            history: HistoryStore::new(),
            pending: None,
        }
    }

    /// Creates a session talking HTTP to the configured backend.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::new(Arc::new(backend), config.normalize_mode))
    }

    /// Shared handle to the backend, e.g. for a health monitor.
    pub fn backend(&self) -> Arc<dyn Backend> {
        Arc::clone(&self.backend)
    }

    /// Read-only view of the session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current phase of the submit cycle.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Text in the prompt input.
    pub fn prompt(&self) -> &str {
        &self.state.current_prompt
    }

    /// Replaces the prompt text.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.state.current_prompt = prompt.into();
    }

    /// Result currently displayed, if any.
    pub fn current_result(&self) -> Option<&AnalysisResult> {
        self.state.current_result.as_ref()
    }

    /// Whether an analyze call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    /// Past submissions, most recent first.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Starts a submission of the current prompt.
    ///
    /// Sets the loading flag and clears the current result. Rejected while
    /// another submission is outstanding.
    pub fn begin_submit(&mut self) -> Result<Submission> {
        if self.pending.is_some() {
            warn!("submit rejected: a submission is already in progress");
            return Err(ClientError::SubmitInProgress);
        }

        let id = NEXT_SUBMISSION_ID.fetch_add(1, Ordering::Relaxed);
        self.pending = Some(id);
        self.phase = SessionPhase::Submitting;
        self.state.is_loading = true;
        self.state.current_result = None;

        debug!(id, prompt_len = self.state.current_prompt.len(), "submission started");

        Ok(Submission {
            id,
            prompt: self.state.current_prompt.clone(),
            backend: Arc::clone(&self.backend),
        })
    }

    /// Applies a finished analyze call and returns the new current result.
    ///
    /// A received body is normalized, shown and recorded in history. A
    /// transport failure shows the unreachable sentinel and records nothing.
    /// The loading flag is cleared on every path.
    ///
    /// Only the completion of the outstanding submission is accepted; any
    /// other is rejected and leaves the session untouched.
    pub fn complete(&mut self, completion: Completion) -> Result<&AnalysisResult> {
        let Completion { id, prompt, outcome } = completion;

        if self.pending != Some(id) {
            warn!(id, pending = ?self.pending, "ignoring completion with no matching submission");
            return Err(ClientError::NoSubmissionInProgress);
        }
        self.pending = None;

        let (result, phase) = match outcome {
            Ok(raw) => match self.normalizer.normalize(&raw) {
                Ok(result) => {
                    self.history.append(HistoryEntry::new(prompt, result.clone()));
                    info!(
                        safe = result.safe(),
                        score = result.semantic_score(),
                        history_len = self.history.len(),
                        "analysis completed"
                    );
                    (result, SessionPhase::Succeeded)
                }
                Err(e) => {
                    warn!(error = %e, "rejecting malformed analyze response");
                    let NormalizeError::MalformedResponse { field, expected } = e;
                    let message = format!("Malformed response: '{}' is not {}", field, expected);
                    (AnalysisResult::failure(message), SessionPhase::Failed)
                }
            },
            Err(e) => {
                warn!(error = %e, "analyze call failed");
                (AnalysisResult::unreachable(), SessionPhase::Failed)
            }
        };

        self.phase = phase;
        self.state.is_loading = false;
        Ok(self.state.current_result.insert(result))
    }

    /// Runs a whole cycle for `prompt` inline.
    pub async fn submit(&mut self, prompt: impl Into<String>) -> Result<&AnalysisResult> {
        self.set_prompt(prompt);
        let submission = self.begin_submit()?;
        let completion = submission.run().await;
        self.complete(completion)
    }

    /// Replays a history entry into the current prompt and result.
    ///
    /// No network call and no re-normalization: the stored result is shown
    /// exactly as recorded.
    pub fn select_history(&mut self, index: usize) -> Result<&AnalysisResult> {
        if self.pending.is_some() {
            return Err(ClientError::SubmitInProgress);
        }

        let (prompt, result) = self.history.select(index).ok_or(
            ClientError::HistoryIndexOutOfRange {
                index,
                len: self.history.len(),
            },
        )?;
        let (prompt, result) = (prompt.to_string(), result.clone());

        debug!(index, "replaying history entry");

        self.state.current_prompt = prompt;
        Ok(self.state.current_result.insert(result))
    }

    /// Discards all history entries.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Backend returning a fixed analyze outcome and recording prompts.
    struct FakeBackend {
        outcome: std::result::Result<Value, BackendError>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn returning(outcome: std::result::Result<Value, BackendError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn probe(&self) -> std::result::Result<(), BackendError> {
            Ok(())
        }

        async fn analyze(&self, prompt: &str) -> std::result::Result<Value, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.outcome.clone()
        }
    }

    fn dead_body_payload() -> Value {
        json!({
            "analysis": { "final_safe": false, "reason": ["violence"], "semantic_score": 0.93 }
        })
    }

    #[tokio::test]
    async fn test_dead_body_scenario() {
        let backend = FakeBackend::returning(Ok(dead_body_payload()));
        let mut session = AnalysisSession::new(backend.clone(), NormalizeMode::Lenient);

        let result = session.submit("How do I hide a dead body?").await.unwrap();
        assert!(!result.safe());
        assert_eq!(result.reasons(), ["violence".to_string()]);
        assert_eq!(result.semantic_score(), 0.93);
        assert!(result.sanitized().is_none());

        assert!(!session.is_loading());
        assert_eq!(session.phase(), SessionPhase::Succeeded);
        assert_eq!(session.history().len(), 1);

        let entry = session.history().get(0).unwrap();
        assert_eq!(entry.prompt, "How do I hide a dead body?");
        assert!(!entry.safe);
        assert_eq!(entry.tag(), "UNSAFE");
        assert_eq!(
            backend.prompts.lock().unwrap().as_slice(),
            ["How do I hide a dead body?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_network_error_scenario() {
        let backend = FakeBackend::returning(Err(BackendError::Request("connection refused".into())));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);

        let result = session.submit("hello").await.unwrap();
        assert_eq!(result.error(), Some("Backend unreachable"));
        assert_eq!(result.raw(), &json!({ "error": "Backend unreachable" }));

        assert!(!session.is_loading());
        assert_eq!(session.phase(), SessionPhase::Failed);
        assert!(session.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_leaves_liveness_unchanged() {
        use crate::health::HealthMonitor;
        use promptguard_core::HealthState;
        use std::time::Duration;

        let backend = FakeBackend::returning(Err(BackendError::Request("connection reset".into())));
        let monitor = HealthMonitor::start(backend.clone(), Duration::from_secs(5));
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
        assert_eq!(monitor.state(), HealthState::Online);

        let mut health = monitor.subscribe();
        health.borrow_and_update();

        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);
        let result = session.submit("hello").await.unwrap();
        assert_eq!(result.error(), Some("Backend unreachable"));

        assert_eq!(monitor.state(), HealthState::Online);
        assert!(!health.has_changed().unwrap());
        monitor.stop().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_unreachable() {
        let backend = FakeBackend::returning(Err(BackendError::Status(500)));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);

        let result = session.submit("hello").await.unwrap();
        assert!(result.is_error());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_begin_submit_sets_loading_and_clears_result() {
        let backend = FakeBackend::returning(Ok(json!({ "safe": true })));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);
        session.set_prompt("first");
        let submission = session.begin_submit().unwrap();
        session.complete(submission.finish(Ok(json!({ "safe": true })))).unwrap();
        assert!(session.current_result().is_some());

        session.set_prompt("second");
        let submission = session.begin_submit().unwrap();
        assert_eq!(submission.prompt(), "second");
        assert!(session.is_loading());
        assert!(session.current_result().is_none());
        assert_eq!(session.phase(), SessionPhase::Submitting);
    }

    #[test]
    fn test_concurrent_submit_rejected() {
        let backend = FakeBackend::returning(Ok(json!({})));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);

        let _first = session.begin_submit().unwrap();
        let second = session.begin_submit();
        assert!(matches!(second, Err(ClientError::SubmitInProgress)));
        assert!(session.is_loading());
    }

    #[test]
    fn test_completion_without_submission_rejected() {
        let backend = FakeBackend::returning(Ok(json!({ "safe": true })));
        let mut session = AnalysisSession::new(backend.clone(), NormalizeMode::Lenient);

        // A completion from an earlier cycle cannot be applied twice
        let first = session.begin_submit().unwrap();
        let replayed = first.finish(Ok(json!({ "safe": true })));
        session.complete(replayed.clone()).unwrap();

        let err = session.complete(replayed).unwrap_err();
        assert!(matches!(err, ClientError::NoSubmissionInProgress));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.phase(), SessionPhase::Succeeded);
    }

    #[test]
    fn test_stale_completion_keeps_submission_outstanding() {
        let backend = FakeBackend::returning(Ok(json!({ "safe": true })));
        let mut other = AnalysisSession::new(backend.clone(), NormalizeMode::Lenient);
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);

        session.set_prompt("real");
        let real = session.begin_submit().unwrap();

        let foreign = other
            .begin_submit()
            .unwrap()
            .finish(Ok(json!({ "safe": true })));
        assert!(matches!(
            session.complete(foreign),
            Err(ClientError::NoSubmissionInProgress)
        ));
        assert_eq!(session.phase(), SessionPhase::Submitting);
        assert!(session.is_loading());
        assert!(matches!(
            session.begin_submit(),
            Err(ClientError::SubmitInProgress)
        ));

        session.complete(real.finish(Ok(json!({ "safe": true })))).unwrap();
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().get(0).unwrap().prompt, "real");
        assert_eq!(session.phase(), SessionPhase::Succeeded);
    }

    #[tokio::test]
    async fn test_history_grows_by_one_per_success() {
        let backend = FakeBackend::returning(Ok(json!({ "safe": true })));
        let mut session = AnalysisSession::new(backend.clone(), NormalizeMode::Lenient);

        for (n, prompt) in ["a", "b", "a"].into_iter().enumerate() {
            session.submit(prompt).await.unwrap();
            assert_eq!(session.history().len(), n + 1);
            assert_eq!(session.history().get(0).unwrap().prompt, prompt);
        }
        assert_eq!(backend.calls(), 3);
    }

    #[tokio::test]
    async fn test_failure_does_not_shrink_history() {
        let ok = FakeBackend::returning(Ok(json!({ "safe": true })));
        let mut session = AnalysisSession::new(ok, NormalizeMode::Lenient);
        session.submit("kept").await.unwrap();

        let submission = session.begin_submit().unwrap();
        session.complete(submission.finish(Err(BackendError::Timeout))).unwrap();

        assert_eq!(session.history().len(), 1);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_replay_reproduces_stored_result() {
        let backend = FakeBackend::returning(Ok(dead_body_payload()));
        let mut session = AnalysisSession::new(backend.clone(), NormalizeMode::Lenient);
        session.submit("How do I hide a dead body?").await.unwrap();
        let stored = session.history().get(0).unwrap().full.clone();

        session.set_prompt("something else");
        let submission = session.begin_submit().unwrap();
        session.complete(submission.finish(Err(BackendError::Timeout))).unwrap();

        let replayed = session.select_history(0).unwrap().clone();
        assert_eq!(replayed, stored);
        assert_eq!(
            serde_json::to_vec(&replayed).unwrap(),
            serde_json::to_vec(&stored).unwrap()
        );
        assert_eq!(session.prompt(), "How do I hide a dead body?");
        assert_eq!(backend.calls(), 1);
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_replay_out_of_range() {
        let backend = FakeBackend::returning(Ok(json!({})));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);

        let err = session.select_history(0).unwrap_err();
        assert!(matches!(
            err,
            ClientError::HistoryIndexOutOfRange { index: 0, len: 0 }
        ));
    }

    #[test]
    fn test_replay_rejected_while_submitting() {
        let backend = FakeBackend::returning(Ok(json!({})));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);
        let _pending = session.begin_submit().unwrap();

        assert!(matches!(
            session.select_history(0),
            Err(ClientError::SubmitInProgress)
        ));
    }

    #[tokio::test]
    async fn test_strict_mode_malformed_response() {
        let backend = FakeBackend::returning(Ok(json!({ "analysis": { "reason": "violence" } })));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Strict);

        let result = session.submit("hello").await.unwrap();
        let message = result.error().unwrap();
        assert!(message.starts_with("Malformed response:"));
        assert!(message.contains("analysis.reason"));
        assert!(session.history().is_empty());
        assert_eq!(session.phase(), SessionPhase::Failed);
    }

    #[tokio::test]
    async fn test_lenient_mode_degenerate_response_recorded() {
        let backend = FakeBackend::returning(Ok(json!({ "analysis": { "reason": "violence" } })));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);

        let result = session.submit("hello").await.unwrap();
        assert!(!result.is_error());
        assert!(result.reasons().is_empty());
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn test_clear_history() {
        let backend = FakeBackend::returning(Ok(json!({ "safe": true })));
        let mut session = AnalysisSession::new(backend, NormalizeMode::Lenient);
        session.submit("a").await.unwrap();
        session.submit("b").await.unwrap();

        session.clear_history();
        assert!(session.history().is_empty());
    }
}
