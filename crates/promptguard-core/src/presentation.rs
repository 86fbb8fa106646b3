//! Display values derived from analysis results.
//!
//! Everything here is a pure function of its input. Rendering code decides
//! colours and layout; this module decides what is shown.

use promptguard_models::{AnalysisResult, HealthState};

/// Scores strictly above this are rendered in the high-alert colour.
pub const HIGH_ALERT_THRESHOLD: f64 = 0.85;

/// Verdict badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Safe,
    Unsafe,
}

impl Badge {
    /// Badge for a verdict.
    pub fn from_safe(safe: bool) -> Self {
        if safe {
            Badge::Safe
        } else {
            Badge::Unsafe
        }
    }

    /// Badge text.
    pub fn label(self) -> &'static str {
        match self {
            Badge::Safe => "SAFE ✔",
            Badge::Unsafe => "UNSAFE ✖",
        }
    }
}

/// Colour class of the score bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreLevel {
    Normal,
    HighAlert,
}

impl ScoreLevel {
    /// Level for a raw score.
    pub fn from_score(score: f64) -> Self {
        if score > HIGH_ALERT_THRESHOLD {
            ScoreLevel::HighAlert
        } else {
            ScoreLevel::Normal
        }
    }
}

/// Score-bar fill in percent, clamped to `[0, 100]`.
pub fn score_percent(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    (score * 100.0).clamp(0.0, 100.0)
}

/// Display model for one result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView<'a> {
    pub badge: Badge,
    pub reasons: &'a [String],
    pub score: f64,
    pub score_percent: f64,
    pub score_level: ScoreLevel,
    pub sanitized: Option<&'a str>,
    pub error: Option<&'a str>,
    result: &'a AnalysisResult,
}

impl<'a> ResultView<'a> {
    /// Derives the display model.
    pub fn new(result: &'a AnalysisResult) -> Self {
        let score = result.semantic_score();
        Self {
            badge: Badge::from_safe(result.safe()),
            reasons: result.reasons(),
            score,
            score_percent: score_percent(score),
            score_level: ScoreLevel::from_score(score),
            sanitized: result.sanitized().filter(|s| !s.is_empty()),
            error: result.error(),
            result,
        }
    }

    /// Whether the sanitized-text panel is shown.
    pub fn show_sanitized(&self) -> bool {
        self.sanitized.is_some()
    }

    /// Score with three decimals.
    pub fn score_label(&self) -> String {
        format!("{:.3}", self.score)
    }

    /// Score-bar fill as a ratio in `[0, 1]`, for gauge widgets.
    pub fn score_ratio(&self) -> f64 {
        self.score_percent / 100.0
    }

    /// Pretty-printed raw payload for the diagnostic view.
    pub fn raw_json(&self) -> String {
        serde_json::to_string_pretty(self.result.raw())
            .unwrap_or_else(|_| self.result.raw().to_string())
    }
}

impl<'a> From<&'a AnalysisResult> for ResultView<'a> {
    fn from(result: &'a AnalysisResult) -> Self {
        Self::new(result)
    }
}

/// Level of the liveness indicator dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorLevel {
    Pending,
    Good,
    Bad,
}

/// Liveness indicator derived from the health state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthIndicator {
    pub state: HealthState,
}

impl HealthIndicator {
    /// Creates an indicator for a state.
    pub fn new(state: HealthState) -> Self {
        Self { state }
    }

    /// Tooltip-style label, e.g. `API: online`.
    pub fn label(&self) -> String {
        format!("API: {}", self.state)
    }

    /// Colour class of the dot.
    pub fn level(&self) -> IndicatorLevel {
        match self.state {
            HealthState::Checking => IndicatorLevel::Pending,
            HealthState::Online => IndicatorLevel::Good,
            HealthState::Offline => IndicatorLevel::Bad,
        }
    }
}
