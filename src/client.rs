//! Control-plane client configuration and shared request plumbing.
//!
//! Unique responsibility: hold the per-account connection context
//! (host, cloud account, bearer token, region) and provide the typed
//! request/decode helpers every resource service builds on.
//!
//! All configuration is loaded from environment variables. Token
//! acquisition is out of scope: the bearer token is obtained
//! out-of-band and passed unchanged on every call.

use std::{env, sync::Arc};

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::errors::{CloudError, classify_http_error};
use crate::transport::{ApiResponse, HttpTransport, Transport, TransportConfig};

/// Configuration for the control-plane client.
#[derive(Clone, Debug)]
pub struct CloudClientConfig {
    /// Control-plane base URL.
    /// Env: `TIDECLOUD_HOST` (default: "<https://compute.api.tidecloud.io>")
    pub host: String,

    /// Cloud account id owning the resources.
    /// Env: `TIDECLOUD_CLOUDACCOUNT` (required)
    pub cloudaccount: String,

    /// Bearer token for authentication, acquired out-of-band.
    /// Env: `TIDECLOUD_API_TOKEN` (required)
    pub api_token: String,

    /// Region the account operates in.
    /// Env: `TIDECLOUD_REGION` (default: "us-region-1")
    pub region: String,
}

impl CloudClientConfig {
    /// Load configuration from environment variables.
    ///
    /// In local dev this also attempts to load `.env` from the current
    /// directory; a missing `.env` is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing.
    pub fn from_env() -> Result<Self, CloudError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: env::var("TIDECLOUD_HOST")
                .unwrap_or_else(|_| "https://compute.api.tidecloud.io".to_string()),
            cloudaccount: must_env("TIDECLOUD_CLOUDACCOUNT")?,
            api_token: must_env("TIDECLOUD_API_TOKEN")?,
            region: env::var("TIDECLOUD_REGION").unwrap_or_else(|_| "us-region-1".to_string()),
        })
    }

    /// The account's availability zone, derived from the region.
    #[must_use]
    pub fn availability_zone(&self) -> String {
        format!("{}a", self.region)
    }

    /// The account's default virtual network name.
    #[must_use]
    pub fn default_vnet(&self) -> String {
        format!("{}-default", self.availability_zone())
    }
}

/// Client for the control-plane REST API.
///
/// Holds no cross-call state: the remote service is the only durable
/// store of resource state, and every read re-fetches.
pub struct CloudClient {
    cfg: CloudClientConfig,
    transport: Arc<dyn Transport>,
}

impl CloudClient {
    /// Create a client with the production HTTP transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(cfg: CloudClientConfig) -> Result<Self, CloudError> {
        let transport = Arc::new(HttpTransport::new(TransportConfig::default())?);
        Ok(Self::with_transport(cfg, transport))
    }

    /// Create a client with an injected transport (tests, alternate
    /// retry policies).
    #[must_use]
    pub fn with_transport(cfg: CloudClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { cfg, transport }
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub const fn config(&self) -> &CloudClientConfig {
        &self.cfg
    }

    /// Base path for account-scoped endpoints:
    /// `{host}/v1/cloudaccounts/{account}`.
    pub(crate) fn api_base(&self) -> String {
        format!(
            "{}/v1/cloudaccounts/{}",
            self.cfg.host.trim_end_matches('/'),
            self.cfg.cloudaccount
        )
    }

    /// GET `url` and decode the 200 body as `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CloudError> {
        let resp = self.transport.get(url, Some(&self.cfg.api_token)).await?;
        decode_response(url, &resp)
    }

    /// POST `body` to `url` and decode the 200 body as `T`.
    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, CloudError> {
        let payload = encode_body(body)?;
        let resp = self
            .transport
            .post(url, Some(&self.cfg.api_token), Some(&payload))
            .await?;
        decode_response(url, &resp)
    }

    /// PUT `body` to `url`, expecting a 200 with any body.
    pub(crate) async fn put_json<B: Serialize>(&self, url: &str, body: &B) -> Result<(), CloudError> {
        let payload = encode_body(body)?;
        let resp = self
            .transport
            .put(url, Some(&self.cfg.api_token), Some(&payload))
            .await?;
        expect_ok(url, &resp)
    }

    /// DELETE `url`, expecting a 200 with any body.
    pub(crate) async fn delete_resource(&self, url: &str) -> Result<(), CloudError> {
        let resp = self.transport.delete(url, Some(&self.cfg.api_token)).await?;
        expect_ok(url, &resp)
    }
}

fn encode_body<B: Serialize>(body: &B) -> Result<String, CloudError> {
    serde_json::to_string(body).map_err(|e| CloudError::Json(format!("error encoding request: {e}")))
}

fn decode_response<T: DeserializeOwned>(url: &str, resp: &ApiResponse) -> Result<T, CloudError> {
    if !resp.is_ok() {
        return Err(classify_http_error(resp.status, &resp.body));
    }
    debug!(url, status = resp.status.as_u16(), "decoding response");
    serde_json::from_str(&resp.body)
        .map_err(|e| CloudError::Json(format!("error parsing response: {e}")))
}

fn expect_ok(url: &str, resp: &ApiResponse) -> Result<(), CloudError> {
    if !resp.is_ok() {
        return Err(classify_http_error(resp.status, &resp.body));
    }
    debug!(url, status = resp.status.as_u16(), "call succeeded");
    Ok(())
}

#[inline]
fn must_env(key: &'static str) -> Result<String, CloudError> {
    env::var(key).map_err(|_| CloudError::MissingEnv(key))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn test_config() -> CloudClientConfig {
        CloudClientConfig {
            host: "https://compute.api.test/".to_string(),
            cloudaccount: "acct-0001".to_string(),
            api_token: "token".to_string(),
            region: "us-region-2".to_string(),
        }
    }

    #[test]
    fn api_base_trims_trailing_slash() {
        let client = CloudClient::new(test_config()).unwrap();
        assert_eq!(
            client.api_base(),
            "https://compute.api.test/v1/cloudaccounts/acct-0001"
        );
    }

    #[test]
    fn zone_and_vnet_derive_from_region() {
        let cfg = test_config();
        assert_eq!(cfg.availability_zone(), "us-region-2a");
        assert_eq!(cfg.default_vnet(), "us-region-2a-default");
    }
}
