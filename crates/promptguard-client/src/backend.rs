//! HTTP contract with the analysis backend.
//!
//! - `GET {base}/` - liveness probe, any 2xx means online
//! - `POST {base}/analyze` - `{"prompt": "..."}` in, loosely-shaped JSON out

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use promptguard_core::ClientConfig;

use crate::error::BackendError;

/// Body of an analyze request.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub prompt: &'a str,
}

/// The analysis service as seen by the client.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Issues a liveness probe. `Ok` only for a success status.
    async fn probe(&self) -> Result<(), BackendError>;

    /// Submits a prompt and returns the decoded response body.
    async fn analyze(&self, prompt: &str) -> Result<serde_json::Value, BackendError>;
}

/// `reqwest`-based backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    health_url: Url,
    analyze_url: Url,
}

impl HttpBackend {
    /// Creates a backend for the configured base URL and timeout.
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BackendError::Request(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            health_url: config.health_url(),
            analyze_url: config.analyze_url(),
        })
    }

    /// URL of the liveness probe.
    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    /// URL of the analyze endpoint.
    pub fn analyze_url(&self) -> &Url {
        &self.analyze_url
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn probe(&self) -> Result<(), BackendError> {
        let response = self.client.get(self.health_url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        Ok(())
    }

    async fn analyze(&self, prompt: &str) -> Result<serde_json::Value, BackendError> {
        debug!(url = %self.analyze_url, prompt_len = prompt.len(), "sending analyze request");

        let response = self
            .client
            .post(self.analyze_url.clone())
            .json(&AnalyzeRequest { prompt })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        trace!(body = %body, "analyze response received");

        Ok(body)
    }
}
