//! Main client for the Polarion SDK.

use crate::api::*;
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{PolarionError, PolarionResult};
use crate::transport::HttpTransport;
use polarion_core::storage::MemoryTokenStore;
use polarion_core::{Token, TokenVault};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Client for the Polarion REST API.
///
/// Holds no per-call mutable state; the only shared state is the token
/// vault, so clones can be used concurrently.
#[derive(Clone)]
pub struct PolarionClient {
    config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
    pub(crate) vault: Arc<TokenVault>,
}

impl PolarionClient {
    /// Create a new client builder.
    pub fn builder() -> PolarionClientBuilder {
        PolarionClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig, vault: Arc<TokenVault>) -> PolarionResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self {
            config,
            http,
            vault,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn vault(&self) -> &Arc<TokenVault> {
        &self.vault
    }

    /// Get the login/auth API.
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }

    /// Get the projects API.
    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    /// Get the work items API.
    pub fn work_items(&self) -> WorkItemsApi<'_> {
        WorkItemsApi::new(self)
    }

    /// Get the documents API.
    pub fn documents(&self) -> DocumentsApi<'_> {
        DocumentsApi::new(self)
    }

    /// Get the users API.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    /// Get the status and health API.
    pub fn health(&self) -> HealthApi<'_> {
        HealthApi::new(self)
    }

    /// GET with the active token.
    ///
    /// Fails with `Unauthenticated` before touching the network when no
    /// token is held.
    pub(crate) async fn get_authenticated<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> PolarionResult<T> {
        let token = self.vault.require().await?;
        self.get_with_token(&token, segments, query).await
    }

    /// GET with a specific token; a 401/403 discards that token.
    pub(crate) async fn get_with_token<T: DeserializeOwned>(
        &self,
        token: &Token,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> PolarionResult<T> {
        let result = self.http.get_json(segments, query, token).await;
        if let Err(ref e) = result {
            if e.is_auth_rejection() {
                self.vault.reject(token).await;
            }
        }
        result
    }
}

/// Builder for creating a PolarionClient.
pub struct PolarionClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    default_page_size: Option<usize>,
    work_item_fields: Option<String>,
    login_user: Option<String>,
    vault: Option<Arc<TokenVault>>,
}

impl PolarionClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: None,
            default_page_size: None,
            work_item_fields: None,
            login_user: None,
            vault: None,
        }
    }

    /// Set the base URL of the Polarion instance, e.g. `https://host/polarion`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the limit used when callers give none.
    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = Some(size);
        self
    }

    /// Set the fields requested when listing work items.
    pub fn work_item_fields(mut self, fields: impl Into<String>) -> Self {
        self.work_item_fields = Some(fields.into());
        self
    }

    /// Set the user whose token page the login flow points to.
    pub fn login_user(mut self, user: impl Into<String>) -> Self {
        self.login_user = Some(user.into());
        self
    }

    /// Share an existing token vault. Without one, the client gets an
    /// empty in-memory vault.
    pub fn vault(mut self, vault: Arc<TokenVault>) -> Self {
        self.vault = Some(vault);
        self
    }

    /// Build the client.
    pub fn build(self) -> PolarionResult<PolarionClient> {
        let base_url = ClientConfig::parse_base_url(
            self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
        )?;

        let mut config = ClientConfig::new(base_url);
        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(PolarionError::Config("timeout must be non-zero".to_string()));
            }
            config.timeout = timeout;
        }
        if let Some(size) = self.default_page_size {
            config.default_page_size = config.effective_limit(Some(size));
        }
        if let Some(fields) = self.work_item_fields {
            config.work_item_fields = fields;
        }
        if let Some(user) = self.login_user {
            config.login_user = user;
        }

        let vault = self
            .vault
            .unwrap_or_else(|| Arc::new(TokenVault::new(Arc::new(MemoryTokenStore::new()))));

        PolarionClient::from_config(config, vault)
    }
}

impl Default for PolarionClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
