//! Client configuration.
//!
//! The core reads no environment itself. The backend base URL is the only
//! environment-level input, and front ends resolve it (conventionally from
//! `PROMPTGUARD_API_URL`) before calling [`ClientConfig::new`].

use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, Result};
use crate::normalizer::NormalizeMode;

/// Environment variable conventionally holding the backend base URL.
pub const API_URL_ENV: &str = "PROMPTGUARD_API_URL";

/// Backend used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:9000";

/// Fixed liveness poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Per-request timeout for probes and analyze calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ANALYZE_PATH: &str = "analyze";

/// Configuration for talking to the analysis backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, always stored with a trailing slash.
    pub api_url: Url,
    /// How often the health monitor probes the backend.
    pub poll_interval: Duration,
    /// Timeout applied to every HTTP request.
    pub request_timeout: Duration,
    /// How type mismatches in responses are handled.
    pub normalize_mode: NormalizeMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse("http://127.0.0.1:9000/").expect("default URL is valid"),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            normalize_mode: NormalizeMode::default(),
        }
    }
}

impl ClientConfig {
    /// Creates a config for the given base URL with default settings.
    pub fn new(api_url: &str) -> Result<Self> {
        Ok(Self {
            api_url: parse_base_url(api_url)?,
            ..Self::default()
        })
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the normalization mode.
    pub fn with_normalize_mode(mut self, mode: NormalizeMode) -> Self {
        self.normalize_mode = mode;
        self
    }

    /// URL of the liveness probe, `{base}/`.
    pub fn health_url(&self) -> Url {
        self.api_url.clone()
    }

    /// URL of the analyze endpoint, `{base}/analyze`.
    pub fn analyze_url(&self) -> Url {
        // The base always ends in '/', and the segment is a constant.
        self.api_url
            .join(ANALYZE_PATH)
            .unwrap_or_else(|_| self.api_url.clone())
    }
}

/// Parses and validates a base URL, appending a trailing slash so relative
/// joins keep the full path.
fn parse_base_url(raw: &str) -> Result<Url> {
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("missing host"));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
