//! HTTP transport layer for the Polarion SDK.

use crate::config::ClientConfig;
use crate::error::{from_reqwest, from_response, truncate_body, PolarionError, PolarionResult};
use polarion_core::Token;
use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// HTTP transport for making API requests.
///
/// Every call is a single attempt bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> PolarionResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("polarion-mcp/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| PolarionError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a URL under the base URL from raw path segments.
    ///
    /// Segments are percent-encoded, so ids with spaces or slashes stay a
    /// single segment.
    pub(crate) fn build_url(&self, segments: &[&str]) -> PolarionResult<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PolarionError::Config("Base URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute an authenticated GET and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        token: &Token,
    ) -> PolarionResult<T> {
        let url = self.build_url(segments)?;
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token.secret())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Request failed");
                from_reqwest(e)
            })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Polarion returned an error status");
            return Err(from_response(status.as_u16(), &body));
        }

        let body = response.text().await.map_err(from_reqwest)?;
        serde_json::from_str(&body).map_err(|e| {
            warn!(
                url = %url,
                error = %e,
                body = %truncate_body(&body),
                "Unexpected response shape"
            );
            PolarionError::Protocol(format!("{} (from {})", e, url.path()))
        })
    }

    /// Unauthenticated GET on the base URL; returns the status code of
    /// whatever answered.
    pub async fn probe(&self) -> PolarionResult<StatusCode> {
        let url = self.config.base_url.clone();
        debug!(url = %url, "Reachability probe");

        let response = self.client.get(url).send().await.map_err(from_reqwest)?;
        Ok(response.status())
    }
}
