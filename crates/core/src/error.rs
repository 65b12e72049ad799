//! Error taxonomy shared by every layer of the server.

/// Result type for Polarion operations.
pub type PolarionResult<T> = Result<T, PolarionError>;

/// Errors surfaced to the caller of a tool.
///
/// Every variant is reported back verbatim; nothing is retried
/// automatically and no variant is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolarionError {
    /// Bad caller input.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No token is available.
    #[error("No Polarion token available")]
    Unauthenticated,

    /// The server rejected the token (401/403).
    #[error("Polarion rejected the token (status {status})")]
    Auth { status: u16, body: String },

    /// Transport-level failure: timeout, DNS, connection refused.
    #[error("Cannot reach Polarion: {0}")]
    Connectivity(String),

    /// Non-2xx response from Polarion.
    #[error("Polarion API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// Unexpected response shape.
    #[error("Unexpected response from Polarion: {0}")]
    Protocol(String),

    /// Token persistence failure.
    #[error("Token storage error: {0}")]
    Storage(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PolarionError {
    /// Stable machine-readable code for the error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Unauthenticated => "unauthenticated",
            Self::Auth { .. } => "auth_error",
            Self::Connectivity(_) => "connectivity_error",
            Self::Api { .. } => "polarion_api_error",
            Self::Protocol(_) => "protocol_error",
            Self::Storage(_) => "storage_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Hint telling the caller what to do next.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::Unauthenticated => Some(
                "Run open_polarion_login, generate a token in Polarion, then call set_polarion_token",
            ),
            Self::Auth { .. } => Some(
                "The token may be expired or revoked. Generate a new token and call set_polarion_token",
            ),
            Self::Connectivity(_) => {
                Some("Check that the Polarion instance is reachable and retry")
            }
            Self::Api { status, .. } if *status >= 500 => {
                Some("Polarion reported a server error, try again later")
            }
            _ => None,
        }
    }

    /// Whether a caller could reasonably retry the same call.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connectivity(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether the error means the current token must be discarded.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

impl From<serde_json::Error> for PolarionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}
