pub mod memory;
pub mod token_file;

pub use memory::MemoryTokenStore;
pub use token_file::{FileTokenStore, TOKEN_FILE_NAME};

use crate::error::PolarionResult;
use crate::types::Token;

/// Durable token storage abstraction
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the persisted token, if any
    async fn load(&self) -> PolarionResult<Option<Token>>;

    /// Persist a token, replacing any previous one
    async fn save(&self, token: &Token) -> PolarionResult<()>;

    /// Remove the persisted token
    async fn clear(&self) -> PolarionResult<()>;

    /// Whether a persisted token exists
    async fn exists(&self) -> bool;
}
