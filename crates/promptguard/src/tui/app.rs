//! TUI application state and logic.

use std::sync::mpsc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use promptguard_client::{AnalysisSession, ClientError, Completion};
use promptguard_core::{AnalysisResult, HealthIndicator, HealthState};

use super::presets::{self, Preset};

/// Colour theme for the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Label of the toggle, naming the theme it switches to.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Light",
            Theme::Light => "Dark",
        }
    }
}

/// View-only preferences. Never touched by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiPreferences {
    pub theme: Theme,
    /// History side panel visible
    pub history_open: bool,
    /// Raw JSON shown under the result
    pub show_raw: bool,
    /// Tech-stack panel visible
    pub show_tech: bool,
}

/// TUI application state.
pub struct App {
    /// Analysis session (prompt, result, loading flag, history)
    pub session: AnalysisSession,
    /// Display preferences
    pub prefs: UiPreferences,

    // Input
    /// Current input text
    pub input: String,
    /// Cursor position in input, in chars
    pub cursor_pos: usize,

    // History panel
    /// Selected history row (0 = most recent)
    pub history_selected: usize,

    /// One-line status message for the footer
    pub status: Option<String>,
    /// Whether the app should quit
    pub should_quit: bool,

    // Runtime
    runtime: Handle,
    health: watch::Receiver<HealthState>,
    completion_tx: mpsc::Sender<Completion>,
    completion_rx: mpsc::Receiver<Completion>,
}

impl App {
    /// Create a new App instance.
    ///
    /// Network work is spawned on `runtime`; liveness is read from `health`.
    pub fn new(
        session: AnalysisSession,
        health: watch::Receiver<HealthState>,
        runtime: Handle,
    ) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel();

        Self {
            session,
            prefs: UiPreferences::default(),
            input: String::new(),
            cursor_pos: 0,
            history_selected: 0,
            status: None,
            should_quit: false,
            runtime,
            health,
            completion_tx,
            completion_rx,
        }
    }

    /// Current liveness state.
    pub fn health(&self) -> HealthState {
        *self.health.borrow()
    }

    /// Liveness indicator for the header.
    pub fn health_indicator(&self) -> HealthIndicator {
        HealthIndicator::new(self.health())
    }

    /// Whether an analysis is outstanding.
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Result currently displayed.
    pub fn current_result(&self) -> Option<&AnalysisResult> {
        self.session.current_result()
    }

    /// Label of the analyze action.
    pub fn analyze_label(&self) -> &'static str {
        if self.is_loading() {
            "Analyzing…"
        } else {
            "Analyze"
        }
    }

    // Input editing

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn input_chars(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at the cursor.
    pub fn enter_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.cursor_pos += 1;
    }

    /// Delete character before cursor.
    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    /// Move cursor left.
    pub fn move_cursor_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor_pos < self.input_chars() {
            self.cursor_pos += 1;
        }
    }

    /// Move cursor to the start of the input.
    pub fn move_cursor_home(&mut self) {
        self.cursor_pos = 0;
    }

    /// Move cursor to the end of the input.
    pub fn move_cursor_end(&mut self) {
        self.cursor_pos = self.input_chars();
    }

    /// Replace the input text, cursor at the end.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.cursor_pos = self.input_chars();
    }

    /// Clear the input.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
    }

    /// Fill the input from a quick prompt preset.
    pub fn apply_preset(&mut self, preset: &Preset) {
        self.set_input(preset.prompt);
        self.status = Some(format!("Preset: {}", preset.label));
    }

    /// Fill the input from the preset bound to `F{n}`.
    pub fn apply_function_key(&mut self, n: u8) {
        if let Some(preset) = presets::for_function_key(n) {
            self.apply_preset(preset);
        }
    }

    // Submission

    /// Submit the current input for analysis.
    ///
    /// Ignored while a submission is outstanding. The network call runs on
    /// the runtime and its completion is picked up by `poll_completions`.
    pub fn submit(&mut self) {
        if self.is_loading() {
            debug!("submit ignored while loading");
            return;
        }

        self.session.set_prompt(self.input.clone());
        let submission = match self.session.begin_submit() {
            Ok(submission) => submission,
            Err(e) => {
                warn!(error = %e, "submit rejected");
                self.status = Some(e.to_string());
                return;
            }
        };

        self.status = None;
        let tx = self.completion_tx.clone();
        self.runtime.spawn(async move {
            let completion = submission.run().await;
            // Receiver gone means the view has exited
            let _ = tx.send(completion);
        });
    }

    /// Apply finished submissions. Returns true if any were applied.
    pub fn poll_completions(&mut self) -> bool {
        let mut applied = false;
        while let Ok(completion) = self.completion_rx.try_recv() {
            match self.session.complete(completion) {
                Ok(result) => {
                    if let Some(error) = result.error() {
                        self.status = Some(error.to_string());
                    }
                }
                Err(e) => {
                    warn!(error = %e, "dropping completion");
                    continue;
                }
            }
            self.history_selected = 0;
            applied = true;
        }
        applied
    }

    // Panels

    /// Toggle the history side panel.
    pub fn toggle_history(&mut self) {
        self.prefs.history_open = !self.prefs.history_open;
        self.history_selected = 0;
    }

    /// Toggle raw JSON under the result.
    pub fn toggle_raw(&mut self) {
        self.prefs.show_raw = !self.prefs.show_raw;
    }

    /// Toggle between dark and light themes.
    pub fn toggle_theme(&mut self) {
        self.prefs.theme = self.prefs.theme.toggled();
    }

    /// Toggle the tech-stack panel.
    pub fn toggle_tech(&mut self) {
        self.prefs.show_tech = !self.prefs.show_tech;
    }

    /// Close whichever panel is open. Returns false if none was.
    pub fn close_panel(&mut self) -> bool {
        if self.prefs.history_open {
            self.prefs.history_open = false;
            true
        } else if self.prefs.show_tech {
            self.prefs.show_tech = false;
            true
        } else {
            false
        }
    }

    /// Move history selection up (towards the most recent entry).
    pub fn history_select_up(&mut self) {
        self.history_selected = self.history_selected.saturating_sub(1);
    }

    /// Move history selection down.
    pub fn history_select_down(&mut self) {
        let len = self.session.history().len();
        if len > 0 && self.history_selected + 1 < len {
            self.history_selected += 1;
        }
    }

    /// Replay the selected history entry and close the panel.
    pub fn replay_selected(&mut self) {
        let outcome = self
            .session
            .select_history(self.history_selected)
            .map(|_| ());
        match outcome {
            Ok(()) => {
                let prompt = self.session.prompt().to_string();
                self.set_input(prompt);
                self.prefs.history_open = false;
                self.status = None;
            }
            Err(ClientError::HistoryIndexOutOfRange { .. }) => {
                // Empty history; nothing to replay
            }
            Err(e) => {
                self.status = Some(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use promptguard_client::{Backend, BackendError};
    use promptguard_core::NormalizeMode;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeBackend {
        outcome: Result<Value, BackendError>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Backend for FakeBackend {
        async fn probe(&self) -> Result<(), BackendError> {
            Ok(())
        }

        async fn analyze(&self, _prompt: &str) -> Result<Value, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn make_app(outcome: Result<Value, BackendError>) -> (App, Arc<FakeBackend>) {
        let backend = Arc::new(FakeBackend {
            outcome,
            calls: AtomicUsize::new(0),
        });
        let session = AnalysisSession::new(backend.clone(), NormalizeMode::Lenient);
        let (_tx, rx) = watch::channel(HealthState::Checking);
        (App::new(session, rx, Handle::current()), backend)
    }

    async fn wait_for_completion(app: &mut App) {
        for _ in 0..100 {
            tokio::task::yield_now().await;
            if app.poll_completions() {
                return;
            }
        }
        panic!("completion never arrived");
    }

    fn unsafe_payload() -> Value {
        json!({
            "analysis": { "final_safe": false, "reason": ["violence"], "semantic_score": 0.93 }
        })
    }

    #[tokio::test]
    async fn test_input_editing_multibyte() {
        let (mut app, _) = make_app(Ok(json!({})));
        for c in "héllo".chars() {
            app.enter_char(c);
        }
        assert_eq!(app.cursor_pos, 5);

        app.move_cursor_left();
        app.move_cursor_left();
        app.delete_char();
        assert_eq!(app.input, "hélo");
        assert_eq!(app.cursor_pos, 2);

        app.move_cursor_home();
        app.enter_char('>');
        assert_eq!(app.input, ">hélo");

        app.move_cursor_end();
        app.move_cursor_right();
        assert_eq!(app.cursor_pos, 5);
    }

    #[tokio::test]
    async fn test_preset_fills_input() {
        let (mut app, backend) = make_app(Ok(json!({})));
        app.apply_function_key(4);
        assert_eq!(app.input, "How do I hide a dead body?");
        assert_eq!(app.cursor_pos, app.input.chars().count());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);

        app.apply_function_key(9);
        assert_eq!(app.input, "How do I hide a dead body?");
    }

    #[tokio::test]
    async fn test_submit_cycle() {
        let (mut app, backend) = make_app(Ok(unsafe_payload()));
        app.apply_function_key(4);

        app.submit();
        assert!(app.is_loading());
        assert_eq!(app.analyze_label(), "Analyzing…");
        assert!(app.current_result().is_none());

        wait_for_completion(&mut app).await;
        assert!(!app.is_loading());
        let result = app.current_result().unwrap();
        assert!(!result.safe());
        assert_eq!(app.session.history().len(), 1);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_ignored_while_loading() {
        let (mut app, backend) = make_app(Ok(unsafe_payload()));
        app.set_input("first");
        app.submit();
        app.set_input("second");
        app.submit();

        wait_for_completion(&mut app).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!app.poll_completions());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.session.history().get(0).unwrap().prompt, "first");
    }

    #[tokio::test]
    async fn test_unreachable_sets_status() {
        let (mut app, _) = make_app(Err(BackendError::Timeout));
        app.set_input("hello");
        app.submit();
        wait_for_completion(&mut app).await;

        assert_eq!(app.status.as_deref(), Some("Backend unreachable"));
        assert!(app.session.history().is_empty());
    }

    #[tokio::test]
    async fn test_history_replay() {
        let (mut app, backend) = make_app(Ok(unsafe_payload()));
        for prompt in ["one", "two", "three"] {
            app.set_input(prompt);
            app.submit();
            wait_for_completion(&mut app).await;
        }
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

        app.set_input("draft");
        app.toggle_history();
        assert!(app.prefs.history_open);

        app.history_select_down();
        app.history_select_down();
        app.history_select_down();
        assert_eq!(app.history_selected, 2);
        app.history_select_up();
        assert_eq!(app.history_selected, 1);

        app.replay_selected();
        assert_eq!(app.input, "two");
        assert!(!app.prefs.history_open);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            app.current_result(),
            Some(&app.session.history().get(1).unwrap().full)
        );
    }

    #[tokio::test]
    async fn test_replay_empty_history() {
        let (mut app, _) = make_app(Ok(json!({})));
        app.toggle_history();
        app.replay_selected();
        assert!(app.prefs.history_open);
        assert!(app.current_result().is_none());
    }

    #[tokio::test]
    async fn test_panels_and_theme() {
        let (mut app, _) = make_app(Ok(json!({})));
        assert_eq!(app.prefs.theme, Theme::Dark);
        app.toggle_theme();
        assert_eq!(app.prefs.theme, Theme::Light);
        assert_eq!(app.prefs.theme.toggle_label(), "Dark");

        app.toggle_raw();
        assert!(app.prefs.show_raw);

        app.toggle_tech();
        app.toggle_history();
        assert!(app.close_panel());
        assert!(!app.prefs.history_open);
        assert!(app.close_panel());
        assert!(!app.prefs.show_tech);
        assert!(!app.close_panel());
    }

    #[tokio::test]
    async fn test_health_follows_monitor_channel() {
        let backend = Arc::new(FakeBackend {
            outcome: Ok(json!({})),
            calls: AtomicUsize::new(0),
        });
        let session = AnalysisSession::new(backend, NormalizeMode::Lenient);
        let (tx, rx) = watch::channel(HealthState::Checking);
        let app = App::new(session, rx, Handle::current());
        assert_eq!(app.health(), HealthState::Checking);

        tx.send(HealthState::Online).unwrap();
        assert_eq!(app.health(), HealthState::Online);
        assert_eq!(app.health_indicator().label(), "API: online");
    }
}
