//! Terminal User Interface for PromptGuard.
//!
//! Provides a single-screen TUI with:
//! - Header showing backend liveness and the theme toggle
//! - Quick prompt presets on F1-F6
//! - Prompt input with an analyze action
//! - Result panel with verdict badge, reasons, score bar and raw JSON
//! - History side panel for replaying earlier results
//! - Footer with keybindings

mod app;
mod events;
mod presets;
mod ui;

pub use app::{App, Theme, UiPreferences};
pub use events::{handle_key, run};
pub use presets::{Preset, PRESETS};
