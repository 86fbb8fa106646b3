//! Command-line interface definition using clap.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use promptguard_core::{ClientConfig, NormalizeMode, API_URL_ENV, DEFAULT_API_URL};

/// Environment variable for the request timeout in seconds.
pub const TIMEOUT_ENV: &str = "PROMPTGUARD_TIMEOUT_SECS";

/// Environment variable enabling strict normalization.
pub const STRICT_ENV: &str = "PROMPTGUARD_STRICT";

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.3.0 (abc1234, 2026-01-29)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// PromptGuard - check prompts against a content-safety backend
#[derive(Parser, Debug)]
#[command(name = "promptguard")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Base URL of the analysis backend
    #[arg(long, env = API_URL_ENV, default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = TIMEOUT_ENV, default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// Reject wrongly-typed response fields instead of ignoring them
    #[arg(
        long,
        env = STRICT_ENV,
        global = true,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub strict: bool,

    /// Log file used by the interactive view
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive terminal view
    Tui,

    /// Analyze a single prompt and print the result
    Analyze {
        /// Prompt text to analyze
        #[arg(required = true)]
        prompt: String,

        /// Output format (pretty, json)
        #[arg(short, long, default_value = "pretty")]
        format: OutputFormat,
    },

    /// Probe the backend once
    Health,
}

/// Output format for the analyze command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

impl Cli {
    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    /// Returns true if the interactive view will run.
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Tui))
    }

    /// Returns the log file path, using the temp dir if not specified.
    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("promptguard.log"))
    }

    /// Builds the client configuration from the parsed flags.
    pub fn client_config(&self) -> promptguard_core::Result<ClientConfig> {
        let mode = if self.strict {
            NormalizeMode::Strict
        } else {
            NormalizeMode::Lenient
        };

        Ok(ClientConfig::new(&self.api_url)?
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_normalize_mode(mode))
    }
}
