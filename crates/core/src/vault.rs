//! Process-wide token holder and auth state machine.
//!
//! One [`TokenVault`] exists per process and is injected into every
//! component that needs the token. All mutations go through a single async
//! mutex, so concurrent `set_token` calls are serialized end to end,
//! including the write to the token store.

use crate::error::{PolarionError, PolarionResult};
use crate::storage::TokenStore;
use crate::types::{AuthState, ConnectionState, StatusReport, Token, TokenSource};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug)]
struct VaultState {
    active: Option<Token>,
    state: AuthState,
    last_verified_at: Option<DateTime<Utc>>,
}

/// Holds the single active token and the auth state machine
pub struct TokenVault {
    store: Arc<dyn TokenStore>,
    inner: Mutex<VaultState>,
}

impl TokenVault {
    /// Empty vault backed by `store`
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            inner: Mutex::new(VaultState {
                active: None,
                state: AuthState::NoToken,
                last_verified_at: None,
            }),
        }
    }

    /// Build the vault at startup.
    ///
    /// Precedence: inline token (`POLARION_TOKEN`) > persisted file > none.
    /// A persisted file that cannot be read is logged and ignored.
    pub async fn initialize(
        store: Arc<dyn TokenStore>,
        env_token: Option<String>,
    ) -> Self {
        let vault = Self::new(store.clone());

        let initial = match env_token.as_deref().map(|raw| Token::new(raw, TokenSource::Environment)) {
            Some(Ok(token)) => Some(token),
            Some(Err(_)) => {
                tracing::warn!("POLARION_TOKEN is set but blank, ignoring it");
                None
            }
            None => None,
        };

        let initial = match initial {
            Some(token) => Some(token),
            None => match store.load().await {
                Ok(token) => token,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not load persisted token");
                    None
                }
            },
        };

        if let Some(token) = initial {
            tracing::info!(source = %token.source, "Loaded Polarion token");
            let mut inner = vault.inner.lock().await;
            inner.active = Some(token);
            inner.state = AuthState::TokenSet;
        } else {
            tracing::info!("No Polarion token available at startup");
        }

        vault
    }

    /// Copy of the active token, if any
    pub async fn current(&self) -> Option<Token> {
        self.inner.lock().await.active.clone()
    }

    /// Active token, or `Unauthenticated`
    pub async fn require(&self) -> PolarionResult<Token> {
        self.current().await.ok_or(PolarionError::Unauthenticated)
    }

    pub async fn state(&self) -> AuthState {
        self.inner.lock().await.state
    }

    pub async fn last_verified_at(&self) -> Option<DateTime<Utc>> {
        self.inner.lock().await.last_verified_at
    }

    /// `NoToken -> LoginOpened`. Has no effect once a token is held.
    pub async fn mark_login_opened(&self) {
        let mut inner = self.inner.lock().await;
        if inner.active.is_none() {
            inner.state = AuthState::LoginOpened;
        }
    }

    /// Replace the active token with caller input and persist it.
    ///
    /// Blank input fails with `Validation` before the lock is taken, so the
    /// previous token is left untouched. A storage failure also leaves the
    /// previous token active.
    pub async fn set_token(&self, raw: &str) -> PolarionResult<Token> {
        let token = Token::new(raw, TokenSource::Manual)?;

        let mut inner = self.inner.lock().await;
        self.store.save(&token).await?;

        let token = token.with_saved_at(Utc::now());
        inner.active = Some(token.clone());
        inner.state = AuthState::TokenSet;
        inner.last_verified_at = None;

        tracing::info!(preview = %token.masked(), "Polarion token set");
        Ok(token)
    }

    /// `TokenSet -> Verified`, only if `token` is still the active one
    pub async fn mark_verified(&self, token: &Token) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.active {
            Some(ref active) if active.same_secret(token) => {
                inner.state = AuthState::Verified;
                inner.last_verified_at = Some(Utc::now());
                true
            }
            _ => false,
        }
    }

    /// Drop `token` after Polarion rejected it; back to `NoToken`.
    ///
    /// The persisted file is kept, only an explicit logout deletes it. If
    /// the token was replaced in the meantime, nothing changes.
    pub async fn reject(&self, token: &Token) -> bool {
        let mut inner = self.inner.lock().await;
        match inner.active {
            Some(ref active) if active.same_secret(token) => {
                inner.active = None;
                inner.state = AuthState::NoToken;
                inner.last_verified_at = None;
                tracing::warn!("Polarion rejected the active token, it has been discarded");
                true
            }
            _ => false,
        }
    }

    /// Forget the token and delete the persisted copy
    pub async fn logout(&self) -> PolarionResult<()> {
        let mut inner = self.inner.lock().await;
        self.store.clear().await?;
        inner.active = None;
        inner.state = AuthState::NoToken;
        inner.last_verified_at = None;
        tracing::info!("Polarion token cleared");
        Ok(())
    }

    /// Snapshot for `check_polarion_status`. Never mutates state.
    pub async fn status(&self) -> StatusReport {
        let (active, state, last_verified_at) = {
            let inner = self.inner.lock().await;
            (inner.active.clone(), inner.state, inner.last_verified_at)
        };
        StatusReport {
            has_token: active.is_some(),
            token_source: active.as_ref().map(|t| t.source),
            token_saved: self.store.exists().await,
            token_preview: active.as_ref().map(|t| t.masked()),
            state,
            connection: if active.is_some() {
                ConnectionState::Authenticated
            } else {
                ConnectionState::Unauthenticated
            },
            last_verified_at,
        }
    }

    /// Token as currently persisted, bypassing the in-memory copy
    pub async fn load_persisted(&self) -> PolarionResult<Option<Token>> {
        self.store.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileTokenStore, MemoryTokenStore};
    use tempfile::TempDir;

    fn memory_vault() -> TokenVault {
        TokenVault::new(Arc::new(MemoryTokenStore::new()))
    }

    #[tokio::test]
    async fn test_set_token_then_load() {
        let vault = memory_vault();
        vault.set_token("my-token").await.unwrap();

        assert_eq!(vault.current().await.unwrap().secret(), "my-token");
        let persisted = vault.load_persisted().await.unwrap().unwrap();
        assert_eq!(persisted.secret(), "my-token");
        assert_eq!(vault.state().await, AuthState::TokenSet);
    }

    #[tokio::test]
    async fn test_set_token_round_trips_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let vault = TokenVault::new(Arc::new(FileTokenStore::in_dir(temp_dir.path())));

        for value in [" abc123 ", "\tpadded\n", "plain"] {
            vault.set_token(value).await.unwrap();
            let persisted = vault.load_persisted().await.unwrap().unwrap();
            assert_eq!(persisted.secret(), value);
        }
    }

    #[tokio::test]
    async fn test_blank_token_keeps_previous() {
        let vault = memory_vault();
        vault.set_token("first").await.unwrap();

        for blank in ["", "   "] {
            assert!(matches!(
                vault.set_token(blank).await,
                Err(PolarionError::Validation(_))
            ));
        }

        assert_eq!(vault.current().await.unwrap().secret(), "first");
        let persisted = vault.load_persisted().await.unwrap().unwrap();
        assert_eq!(persisted.secret(), "first");
    }

    #[tokio::test]
    async fn test_require_without_token() {
        let vault = memory_vault();
        assert_eq!(vault.require().await, Err(PolarionError::Unauthenticated));
        assert_eq!(vault.state().await, AuthState::NoToken);
    }

    #[tokio::test]
    async fn test_state_machine() {
        let vault = memory_vault();
        vault.mark_login_opened().await;
        assert_eq!(vault.state().await, AuthState::LoginOpened);

        let token = vault.set_token("tok-123").await.unwrap();
        assert_eq!(vault.state().await, AuthState::TokenSet);

        assert!(vault.mark_verified(&token).await);
        assert_eq!(vault.state().await, AuthState::Verified);
        assert!(vault.last_verified_at().await.is_some());

        // Opening login again does not downgrade a held token
        vault.mark_login_opened().await;
        assert_eq!(vault.state().await, AuthState::Verified);

        assert!(vault.reject(&token).await);
        assert_eq!(vault.state().await, AuthState::NoToken);
        assert!(vault.current().await.is_none());
        assert!(vault.last_verified_at().await.is_none());
    }

    #[tokio::test]
    async fn test_reject_ignores_replaced_token() {
        let vault = memory_vault();
        let old = vault.set_token("old-token").await.unwrap();
        vault.set_token("new-token").await.unwrap();

        assert!(!vault.reject(&old).await);
        assert_eq!(vault.current().await.unwrap().secret(), "new-token");
    }

    #[tokio::test]
    async fn test_reject_keeps_persisted_file() {
        let temp_dir = TempDir::new().unwrap();
        let vault = TokenVault::new(Arc::new(FileTokenStore::in_dir(temp_dir.path())));
        let token = vault.set_token("rejected").await.unwrap();

        vault.reject(&token).await;
        let status = vault.status().await;
        assert!(!status.has_token);
        assert!(status.token_saved);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let temp_dir = TempDir::new().unwrap();
        let vault = TokenVault::new(Arc::new(FileTokenStore::in_dir(temp_dir.path())));
        vault.set_token("bye").await.unwrap();

        vault.logout().await.unwrap();
        let status = vault.status().await;
        assert!(!status.has_token);
        assert!(!status.token_saved);
        assert_eq!(status.state, AuthState::NoToken);
    }

    #[tokio::test]
    async fn test_initialize_prefers_environment() {
        let store = Arc::new(MemoryTokenStore::new());
        store
            .save(&Token::new("from-file", TokenSource::Manual).unwrap())
            .await
            .unwrap();

        let vault = TokenVault::initialize(store, Some("from-env".to_string())).await;
        let token = vault.current().await.unwrap();
        assert_eq!(token.secret(), "from-env");
        assert_eq!(token.source, TokenSource::Environment);
        assert_eq!(vault.state().await, AuthState::TokenSet);
    }

    #[tokio::test]
    async fn test_initialize_falls_back_to_file() {
        let temp_dir = TempDir::new().unwrap();
        FileTokenStore::in_dir(temp_dir.path())
            .save(&Token::new("from-file", TokenSource::Manual).unwrap())
            .await
            .unwrap();

        let store = Arc::new(FileTokenStore::in_dir(temp_dir.path()));
        let vault = TokenVault::initialize(store, Some("  ".to_string())).await;
        let token = vault.current().await.unwrap();
        assert_eq!(token.secret(), "from-file");
        assert_eq!(token.source, TokenSource::File);
    }

    #[tokio::test]
    async fn test_initialize_ignores_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::in_dir(temp_dir.path());
        std::fs::write(store.path(), "garbage").unwrap();

        let vault = TokenVault::initialize(Arc::new(store), None).await;
        assert!(vault.current().await.is_none());
        assert_eq!(vault.state().await, AuthState::NoToken);
    }

    #[tokio::test]
    async fn test_concurrent_set_token_never_corrupts_file() {
        let temp_dir = TempDir::new().unwrap();
        let vault = Arc::new(TokenVault::new(Arc::new(FileTokenStore::in_dir(
            temp_dir.path(),
        ))));

        let a = "a".repeat(4096);
        let b = "b".repeat(4096);

        let mut handles = Vec::new();
        for i in 0..20 {
            let vault = vault.clone();
            let value = if i % 2 == 0 { a.clone() } else { b.clone() };
            handles.push(tokio::spawn(async move { vault.set_token(&value).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let reopened = FileTokenStore::in_dir(temp_dir.path());
        let persisted = reopened.load().await.unwrap().unwrap();
        assert!(persisted.secret() == a || persisted.secret() == b);

        // In-memory and on-disk values agree
        let active = vault.current().await.unwrap();
        assert!(active.same_secret(&persisted));
    }
}
