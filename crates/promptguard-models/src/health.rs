//! Backend liveness state.

use serde::{Deserialize, Serialize};

/// Liveness of the analysis backend as seen by the health monitor.
///
/// `Checking` is only the initial value; once a probe resolves the state is
/// always `Online` or `Offline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// No probe has resolved yet.
    #[default]
    Checking,
    /// The last resolved probe returned a success status.
    Online,
    /// The last resolved probe failed or returned a non-success status.
    Offline,
}

impl HealthState {
    /// Maps a probe outcome to a state.
    pub fn from_probe(success: bool) -> Self {
        if success {
            HealthState::Online
        } else {
            HealthState::Offline
        }
    }

    /// Returns true if moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: HealthState) -> bool {
        next != HealthState::Checking
    }

    /// Lowercase label used in indicators and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Checking => "checking",
            HealthState::Online => "online",
            HealthState::Offline => "offline",
        }
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
