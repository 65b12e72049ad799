use super::TokenStore;
use crate::error::{PolarionError, PolarionResult};
use crate::types::{PersistedToken, Token, TokenSource};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

/// File name of the persisted token inside `TOKEN_DIR`
pub const TOKEN_FILE_NAME: &str = "polarion_token.json";

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON file token store.
///
/// Survives restarts only when the path sits on durable storage (a mounted
/// volume); on ephemeral container storage the token is lost on recycle.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/polarion_token.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(TOKEN_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let n = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let name = format!(".{}.{}.{}.tmp", TOKEN_FILE_NAME, std::process::id(), n);
        match self.path.parent() {
            Some(parent) => parent.join(name),
            None => PathBuf::from(name),
        }
    }
}

/// Create `path` readable by the owner only; it holds a bearer token
async fn open_private(path: &Path) -> std::io::Result<tokio::fs::File> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    options.open(path).await
}

fn storage_err(action: &str, path: &Path, err: impl std::fmt::Display) -> PolarionError {
    PolarionError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

#[async_trait::async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> PolarionResult<Option<Token>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_err("read token file", &self.path, e)),
        };

        let persisted: PersistedToken = serde_json::from_str(&content)
            .map_err(|e| storage_err("parse token file", &self.path, e))?;

        // A file holding an empty token counts as no token
        let token = match Token::new(&persisted.token, TokenSource::File) {
            Ok(token) => token,
            Err(_) => return Ok(None),
        };

        let token = token.with_expires_at(persisted.expires_at);
        Ok(Some(match persisted.saved_at {
            Some(saved_at) => token.with_saved_at(saved_at),
            None => token,
        }))
    }

    async fn save(&self, token: &Token) -> PolarionResult<()> {
        // Create parent directory
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| storage_err("create token directory", parent, e))?;
            }
        }

        let persisted = PersistedToken {
            token: token.secret().to_string(),
            saved_at: Some(Utc::now()),
            expires_at: token.expires_at,
        };
        let data = serde_json::to_vec_pretty(&persisted)
            .map_err(|e| storage_err("serialize token for", &self.path, e))?;

        // Write a sibling temp file, then rename over the target so readers
        // never observe a partial file
        let tmp = self.temp_path();
        let write = async {
            let mut file = open_private(&tmp).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &self.path).await
        };
        if let Err(e) = write.await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(storage_err("write token file", &self.path, e));
        }

        tracing::debug!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    async fn clear(&self) -> PolarionResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_err("delete token file", &self.path, e)),
        }
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}
