//! Configuration types for the Polarion SDK.

use crate::error::{PolarionError, PolarionResult};
use std::time::Duration;
use url::Url;

/// Polarion instance used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://dev.polarion.atoms.tech/polarion";

/// Result count used when the caller gives no limit.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on any requested limit.
pub const MAX_PAGE_SIZE: usize = 100;

/// Light field set requested when listing work items.
pub const WORK_ITEM_MIN_FIELDS: &str = "id,title,type,description";

/// Field set requested for single resources.
pub const BASIC_FIELDS: &str = "@basic";

/// Default timeout for every outbound request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the Polarion client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Polarion instance, always ending in `/`.
    pub base_url: Url,
    /// Per-request timeout. No request is ever retried.
    pub timeout: Duration,
    /// Limit used when the caller gives none.
    pub default_page_size: usize,
    /// Fields requested when listing work items.
    pub work_item_fields: String,
    /// User whose token page the login flow points to.
    pub login_user: String,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeout: DEFAULT_TIMEOUT,
            default_page_size: DEFAULT_PAGE_SIZE,
            work_item_fields: WORK_ITEM_MIN_FIELDS.to_string(),
            login_user: "admin".to_string(),
        }
    }

    /// Parse and validate a base URL string.
    pub fn parse_base_url(raw: &str) -> PolarionResult<Url> {
        let url = Url::parse(raw.trim())
            .map_err(|e| PolarionError::Config(format!("Invalid base URL '{}': {}", raw, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(PolarionError::Config(format!(
                "Base URL must be http or https, got: {}",
                url.scheme()
            )));
        }
        if url.cannot_be_a_base() {
            return Err(PolarionError::Config(format!(
                "Base URL cannot be used as a base: {}",
                raw
            )));
        }
        Ok(normalize_base_url(url))
    }

    /// Page where the user logs in.
    pub fn login_url(&self) -> String {
        self.base_url.as_str().trim_end_matches('/').to_string()
    }

    /// Page where the user generates a personal access token.
    pub fn token_page_url(&self) -> String {
        format!("{}/#/user_tokens?id={}", self.login_url(), self.login_user)
    }

    /// Resolve a caller-supplied limit: default when absent, clamped to
    /// `1..=MAX_PAGE_SIZE`.
    pub fn effective_limit(&self, limit: Option<usize>) -> usize {
        limit
            .unwrap_or(self.default_page_size)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Ensure the path ends with `/` so joins keep prefixes like `/polarion`.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new(Url::parse("https://example.com/polarion").unwrap());

        assert_eq!(config.base_url.as_str(), "https://example.com/polarion/");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.work_item_fields, "id,title,type,description");
    }

    #[test]
    fn test_login_urls() {
        let config = ClientConfig::new(Url::parse(DEFAULT_BASE_URL).unwrap());

        assert_eq!(config.login_url(), "http://dev.polarion.atoms.tech/polarion");
        assert_eq!(
            config.token_page_url(),
            "http://dev.polarion.atoms.tech/polarion/#/user_tokens?id=admin"
        );
    }

    #[test]
    fn test_effective_limit() {
        let config = ClientConfig::new(Url::parse("https://example.com").unwrap());

        assert_eq!(config.effective_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(config.effective_limit(Some(0)), 1);
        assert_eq!(config.effective_limit(Some(25)), 25);
        assert_eq!(config.effective_limit(Some(10_000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_parse_base_url() {
        let url = ClientConfig::parse_base_url("https://host/polarion?x=1").unwrap();
        assert_eq!(url.as_str(), "https://host/polarion/");

        assert!(matches!(
            ClientConfig::parse_base_url("ftp://host"),
            Err(PolarionError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::parse_base_url("not a url"),
            Err(PolarionError::Config(_))
        ));
    }
}
