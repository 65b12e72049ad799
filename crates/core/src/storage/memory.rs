use super::TokenStore;
use crate::error::PolarionResult;
use crate::types::{Token, TokenSource};
use chrono::Utc;
use std::sync::Mutex;

/// In-process token store, for ephemeral deployments and tests.
///
/// Tokens saved here are lost when the process exits.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> PolarionResult<Option<Token>> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    async fn save(&self, token: &Token) -> PolarionResult<()> {
        let stored = Token::new(token.secret(), TokenSource::File)?
            .with_saved_at(Utc::now())
            .with_expires_at(token.expires_at);
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = Some(stored);
        Ok(())
    }

    async fn clear(&self) -> PolarionResult<()> {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }

    async fn exists(&self) -> bool {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().await.unwrap().is_none());

        let token = Token::new("mem-token", TokenSource::Manual).unwrap();
        store.save(&token).await.unwrap();
        assert!(store.exists().await);

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.secret(), "mem-token");
        assert_eq!(loaded.source, TokenSource::File);

        store.clear().await.unwrap();
        assert!(!store.exists().await);
    }
}
