//! PromptGuard CLI entry point.

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use promptguard::cli::{Cli, Commands};
use promptguard::commands::{self, CommandError};
use promptguard::tui;

fn main() {
    // Load .env.local if it exists (for PROMPTGUARD_API_URL etc.)
    let _ = dotenvy::from_filename(".env.local");

    let cli = Cli::parse();

    // Initialize tracing
    if let Err(e) = init_tracing(&cli) {
        eprintln!("Warning: failed to open log file: {}", e);
    }

    // Handle command or enter the interactive view
    let result = cli
        .client_config()
        .map_err(CommandError::from)
        .and_then(|config| match cli.command {
            Some(Commands::Tui) | None => run_tui(&config),
            Some(cmd) => commands::execute(cmd, &config),
        });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr for one-shot commands and to a file for the interactive
/// view, so the screen is not corrupted.
fn init_tracing(cli: &Cli) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().to_string()));

    if !cli.is_interactive() {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(cli.log_file())?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn run_tui(config: &promptguard_core::ClientConfig) -> commands::Result<()> {
    tui::run(config).map_err(|e| CommandError::Tui(e.to_string()))
}
