//! Command handlers for one-shot CLI subcommands.

use std::fmt::Write as _;

use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::info;

use promptguard_client::{AnalysisSession, Backend, BackendError, ClientError, HttpBackend};
use promptguard_core::{AnalysisResult, ClientConfig, ConfigError, ResultView, ScoreLevel};

use crate::cli::{Commands, OutputFormat};

/// Errors surfaced by command handlers.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TUI error: {0}")]
    Tui(String),

    /// The analysis did not produce a normalized result.
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    /// The liveness probe failed.
    #[error("backend at {0} is offline")]
    Offline(String),
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Execute a one-shot command.
pub fn execute(command: Commands, config: &ClientConfig) -> Result<()> {
    let runtime = Runtime::new()?;

    match command {
        Commands::Analyze { prompt, format } => {
            runtime.block_on(cmd_analyze(config, &prompt, format))
        }
        Commands::Health => runtime.block_on(cmd_health(config)),
        Commands::Tui => {
            // Interactive view is handled separately in main
            Ok(())
        }
    }
}

async fn cmd_analyze(config: &ClientConfig, prompt: &str, format: OutputFormat) -> Result<()> {
    let mut session = AnalysisSession::from_config(config)?;
    let result = session.submit(prompt).await?;

    match format {
        OutputFormat::Pretty => print!("{}", render_pretty(result)),
        OutputFormat::Json => println!("{}", ResultView::new(result).raw_json()),
    }

    match result.error() {
        Some(message) => Err(CommandError::AnalysisFailed(message.to_string())),
        None => {
            info!(safe = result.safe(), "analysis printed");
            Ok(())
        }
    }
}

async fn cmd_health(config: &ClientConfig) -> Result<()> {
    let backend = HttpBackend::new(config)?;

    match backend.probe().await {
        Ok(()) => {
            println!("online");
            Ok(())
        }
        Err(e) => {
            info!(error = %e, "liveness probe failed");
            println!("offline");
            Err(CommandError::Offline(backend.health_url().to_string()))
        }
    }
}

/// Render a result for terminal output.
pub fn render_pretty(result: &AnalysisResult) -> String {
    let view = ResultView::new(result);
    let mut out = String::new();

    if let Some(error) = view.error {
        let _ = writeln!(out, "Error: {}", error);
        return out;
    }

    let _ = writeln!(out, "{}", view.badge.label());

    if view.reasons.is_empty() {
        let _ = writeln!(out, "Reasons: none");
    } else {
        let _ = writeln!(out, "Reasons:");
        for reason in view.reasons {
            let _ = writeln!(out, "  - {}", reason);
        }
    }

    let alert = match view.score_level {
        ScoreLevel::HighAlert => " [high alert]",
        ScoreLevel::Normal => "",
    };
    let _ = writeln!(
        out,
        "Semantic score: {} ({:.0}%){}",
        view.score_label(),
        view.score_percent,
        alert
    );

    if let Some(sanitized) = view.sanitized {
        let _ = writeln!(out, "Sanitized: {}", sanitized);
    }

    out
}
