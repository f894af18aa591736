//! Control-plane HTTP transport.
//!
//! Unique responsibility: issue one signed JSON request against the
//! control plane and hand back `(status, body)` uninterpreted.
//!
//! Headers on every request:
//! - `Content-Type: application/json`
//! - `Authorization: Bearer <token>` when a token is supplied
//!
//! Connection-level failures (failure to connect or complete the round
//! trip) are retried with a fixed pause; HTTP error statuses are not -
//! they are returned as-is for [`crate::errors::classify_http_error`]
//! to interpret. Overall deadlines are enforced by the reconciler, not
//! here; the transport only applies a per-attempt socket timeout.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::CloudError;

/// Raw control-plane response: status code plus body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: reqwest::StatusCode,
    /// Response body, read in full.
    pub body: String,
}

impl ApiResponse {
    /// Whether the call succeeded synchronously (HTTP 200).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == reqwest::StatusCode::OK
    }
}

/// Capability interface for talking to the control plane.
///
/// Injected into [`crate::client::CloudClient`] so tests can substitute
/// a scripted implementation without touching the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET request.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Transport`] once the retry budget for
    /// connection-level failures is exhausted.
    async fn get(&self, url: &str, token: Option<&str>) -> Result<ApiResponse, CloudError>;

    /// Issue a POST request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Transport`] once the retry budget for
    /// connection-level failures is exhausted.
    async fn post(
        &self,
        url: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Result<ApiResponse, CloudError>;

    /// Issue a PUT request with an optional JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Transport`] once the retry budget for
    /// connection-level failures is exhausted.
    async fn put(
        &self,
        url: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Result<ApiResponse, CloudError>;

    /// Issue a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::Transport`] once the retry budget for
    /// connection-level failures is exhausted.
    async fn delete(&self, url: &str, token: Option<&str>) -> Result<ApiResponse, CloudError>;
}

/// Transport tuning knobs. The defaults are the production contract.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    /// Total attempts per request, including the first.
    pub attempts: u32,
    /// Fixed pause between attempts.
    pub retry_pause: Duration,
    /// Per-attempt socket timeout.
    pub request_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            retry_pause: Duration::from_secs(5),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// Production transport over a shared `reqwest` client.
pub struct HttpTransport {
    cfg: TransportConfig,
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cfg: TransportConfig) -> Result<Self, CloudError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| CloudError::Transport(e.to_string()))?;

        Ok(Self { cfg, http })
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.cfg
    }

    async fn send_with_retry(
        &self,
        method: reqwest::Method,
        url: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Result<ApiResponse, CloudError> {
        let mut attempt: u32 = 0;

        loop {
            attempt = attempt.saturating_add(1);

            let mut req = self
                .http
                .request(method.clone(), url)
                .header(reqwest::header::CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                req = req.bearer_auth(token);
            }
            if let Some(body) = body {
                req = req.body(body.to_string());
            }

            debug!(method = %method, url, attempt, "control plane request");

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    debug!(method = %method, url, status = status.as_u16(), "control plane response");
                    return Ok(ApiResponse { status, body });
                }
                Err(e) => {
                    if attempt < self.cfg.attempts && is_connection_failure(&e) {
                        warn!(method = %method, url, attempt, error = %e, "connection failure, retrying");
                        tokio::time::sleep(self.cfg.retry_pause).await;
                        continue;
                    }

                    return Err(CloudError::Transport(format!(
                        "error connecting to api service: {e}"
                    )));
                }
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, token: Option<&str>) -> Result<ApiResponse, CloudError> {
        self.send_with_retry(reqwest::Method::GET, url, token, None)
            .await
    }

    async fn post(
        &self,
        url: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Result<ApiResponse, CloudError> {
        self.send_with_retry(reqwest::Method::POST, url, token, body)
            .await
    }

    async fn put(
        &self,
        url: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> Result<ApiResponse, CloudError> {
        self.send_with_retry(reqwest::Method::PUT, url, token, body)
            .await
    }

    async fn delete(&self, url: &str, token: Option<&str>) -> Result<ApiResponse, CloudError> {
        self.send_with_retry(reqwest::Method::DELETE, url, token, None)
            .await
    }
}

#[inline]
fn is_connection_failure(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_config_matches_the_contract() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.attempts, 3);
        assert_eq!(cfg.retry_pause, Duration::from_secs(5));
        assert_eq!(cfg.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn only_200_counts_as_ok() {
        let ok = ApiResponse {
            status: reqwest::StatusCode::OK,
            body: String::new(),
        };
        let accepted = ApiResponse {
            status: reqwest::StatusCode::ACCEPTED,
            body: String::new(),
        };
        assert!(ok.is_ok());
        assert!(!accepted.is_ok());
    }
}
