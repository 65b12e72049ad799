use crate::error::{PolarionError, PolarionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the active token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// `POLARION_TOKEN` environment variable
    Environment,
    /// Persisted token file
    File,
    /// Set through `set_polarion_token`
    Manual,
}

impl std::fmt::Display for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Environment => write!(f, "environment"),
            Self::File => write!(f, "file"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Opaque Polarion bearer token.
///
/// `Debug` never prints the secret; use [`Token::masked`] for previews.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    secret: String,
    pub source: TokenSource,
    pub saved_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Token {
    /// Create a token from raw caller input, rejecting empty or blank strings.
    ///
    /// Non-blank input is kept exactly as given.
    pub fn new(raw: impl AsRef<str>, source: TokenSource) -> PolarionResult<Self> {
        let raw = raw.as_ref();
        if raw.trim().is_empty() {
            return Err(PolarionError::Validation(
                "token must not be empty".to_string(),
            ));
        }
        Ok(Self {
            secret: raw.to_string(),
            source,
            saved_at: None,
            expires_at: None,
        })
    }

    pub fn with_saved_at(mut self, saved_at: DateTime<Utc>) -> Self {
        self.saved_at = Some(saved_at);
        self
    }

    pub fn with_expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// The raw secret, for building the `Authorization` header only.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Short preview safe to show to a user: first and last four characters.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.secret.chars().collect();
        if chars.len() <= 12 {
            return "****".to_string();
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }

    /// Same secret, regardless of source or timestamps.
    pub fn same_secret(&self, other: &Token) -> bool {
        self.secret == other.secret
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .field("saved_at", &self.saved_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// On-disk token file: `{"token": "...", "savedAt": "<ISO8601>"}`.
///
/// Older files carry `generated_at` instead of `savedAt`; they still load,
/// with no saved timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedToken {
    pub token: String,
    #[serde(rename = "savedAt", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Login/auth state machine: `NoToken -> LoginOpened -> TokenSet -> Verified`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    NoToken,
    LoginOpened,
    TokenSet,
    Verified,
}

/// Derived connectivity state, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Unauthenticated,
    Authenticated,
    Unreachable,
}

/// Output of `check_polarion_status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub has_token: bool,
    pub token_source: Option<TokenSource>,
    pub token_saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_preview: Option<String>,
    pub state: AuthState,
    /// Derived from the token alone; only a connectivity probe can tell
    /// `Unreachable`
    pub connection: ConnectionState,
    pub last_verified_at: Option<DateTime<Utc>>,
}

/// Output of `check_polarion_connectivity`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityReport {
    pub reachable: bool,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub connection: ConnectionState,
}
