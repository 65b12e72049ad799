//! Login flow: open the login page, accept a generated token, verify it.
//!
//! No browser is ever launched here; the caller gets URLs to visit.

use super::ResourceList;
use crate::client::PolarionClient;
use crate::config::BASIC_FIELDS;
use crate::error::PolarionResult;
use chrono::{DateTime, Utc};
use polarion_core::{AuthState, Token, TokenSource};
use serde::{Deserialize, Serialize};

/// Where to log in and generate a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginInfo {
    pub login_url: String,
    pub token_page_url: String,
    pub instructions: Vec<String>,
}

/// Result of a successful `verify`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub state: AuthState,
    pub token_source: TokenSource,
    pub verified_at: Option<DateTime<Utc>>,
}

/// Login/auth API.
pub struct AuthApi<'a> {
    client: &'a PolarionClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a PolarionClient) -> Self {
        Self { client }
    }

    /// Build the login and token-page URLs. Makes no network call.
    pub async fn open_login(&self) -> LoginInfo {
        let config = self.client.config();
        let login_url = config.login_url();
        let token_page_url = config.token_page_url();

        self.client.vault.mark_login_opened().await;
        tracing::info!(url = %login_url, "Login page requested");

        LoginInfo {
            instructions: vec![
                format!("1. Open {} and complete the login form", login_url),
                format!("2. After logging in, navigate to: {}", token_page_url),
                "3. Generate a new personal access token".to_string(),
                "4. Copy the token and pass it to set_polarion_token".to_string(),
            ],
            login_url,
            token_page_url,
        }
    }

    /// Store a caller-provided token. Blank input fails with `Validation`
    /// and leaves any previous token in place.
    pub async fn set_token(&self, raw: &str) -> PolarionResult<Token> {
        self.client.vault.set_token(raw).await
    }

    /// Prove the active token works with a one-project listing.
    ///
    /// 401/403 discards the token (`NoToken`) and reports `Auth`; network
    /// failures report `Connectivity` and leave the token untouched.
    pub async fn verify(&self) -> PolarionResult<VerifyOutcome> {
        let token = self.client.vault.require().await?;
        let query = [
            ("fields[projects]", BASIC_FIELDS.to_string()),
            ("page[size]", "1".to_string()),
        ];

        let _: ResourceList = self
            .client
            .get_with_token(&token, &["rest", "v1", "projects"], &query)
            .await?;

        self.client.vault.mark_verified(&token).await;
        tracing::info!(source = %token.source, "Polarion token verified");

        Ok(VerifyOutcome {
            state: self.client.vault.state().await,
            token_source: token.source,
            verified_at: self.client.vault.last_verified_at().await,
        })
    }

    /// Forget the token and delete its persisted copy.
    pub async fn logout(&self) -> PolarionResult<()> {
        self.client.vault.logout().await
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{client_for, resource};
    use crate::error::PolarionError;
    use polarion_core::AuthState;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_open_login_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), None).await;
        let info = client.auth().open_login().await;

        assert_eq!(info.login_url, format!("{}/polarion", server.uri()));
        assert!(info.token_page_url.ends_with("/polarion/#/user_tokens?id=admin"));
        assert_eq!(info.instructions.len(), 4);
        assert_eq!(client.vault().state().await, AuthState::LoginOpened);
    }

    #[tokio::test]
    async fn test_set_token_validation() {
        let server = MockServer::start().await;
        let client = client_for(&server.uri(), Some("original")).await;

        assert!(matches!(
            client.auth().set_token("   ").await,
            Err(PolarionError::Validation(_))
        ));
        assert_eq!(client.vault().current().await.unwrap().secret(), "original");
    }

    #[tokio::test]
    async fn test_verify_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/polarion/rest/v1/projects"))
            .and(header("Authorization", "Bearer good"))
            .and(query_param("page[size]", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [resource("projects", "alpha")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), None).await;
        client.auth().set_token("good").await.unwrap();
        let outcome = client.auth().verify().await.unwrap();

        assert_eq!(outcome.state, AuthState::Verified);
        assert!(outcome.verified_at.is_some());
    }

    #[tokio::test]
    async fn test_verify_unauthorized_resets_to_no_token() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid token"))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Some("bad")).await;
        assert_eq!(client.vault().state().await, AuthState::TokenSet);

        let result = client.auth().verify().await;
        assert!(matches!(result, Err(PolarionError::Auth { status: 401, .. })));
        assert_eq!(client.vault().state().await, AuthState::NoToken);

        // From Verified as well
        client.auth().set_token("bad-again").await.unwrap();
        let token = client.vault().current().await.unwrap();
        client.vault().mark_verified(&token).await;
        assert_eq!(client.vault().state().await, AuthState::Verified);

        assert!(client.auth().verify().await.is_err());
        assert_eq!(client.vault().state().await, AuthState::NoToken);

        // Later calls are unauthenticated and stay off the network
        assert_eq!(
            client.auth().verify().await,
            Err(PolarionError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_verify_forbidden_is_auth_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), Some("tok")).await;
        assert!(matches!(
            client.auth().verify().await,
            Err(PolarionError::Auth { status: 403, .. })
        ));
        assert_eq!(client.vault().state().await, AuthState::NoToken);
    }

    #[tokio::test]
    async fn test_verify_timeout_keeps_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let vault = client_for(&server.uri(), Some("tok")).await.vault().clone();
        let client = crate::client::PolarionClient::builder()
            .base_url(format!("{}/polarion", server.uri()))
            .timeout(Duration::from_millis(200))
            .vault(vault)
            .build()
            .unwrap();

        assert!(matches!(
            client.auth().verify().await,
            Err(PolarionError::Connectivity(_))
        ));
        assert_eq!(client.vault().state().await, AuthState::TokenSet);
        assert_eq!(client.vault().current().await.unwrap().secret(), "tok");
    }

    #[tokio::test]
    async fn test_logout() {
        let server = MockServer::start().await;
        let client = client_for(&server.uri(), Some("tok")).await;

        client.auth().logout().await.unwrap();
        assert!(client.vault().current().await.is_none());
        assert_eq!(client.vault().state().await, AuthState::NoToken);
    }
}
