use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::error::{PortalError, PortalResult};

/// Single-slot persistence for the bearer token.
///
/// Only [`AuthSession`](crate::auth::AuthSession) writes through this trait;
/// the API client reads it to attach the `Authorization` header.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read the stored token, if any
    async fn get(&self) -> PortalResult<Option<String>>;

    /// Replace the stored token
    async fn set(&self, token: &str) -> PortalResult<()>;

    /// Remove the stored token; succeeds when nothing is stored
    async fn clear(&self) -> PortalResult<()>;
}

/// On-disk representation of the stored token
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenStoragePayload {
    access_token: String,
    stored_at: DateTime<Utc>,
}

/// Token store backed by a JSON file, surviving process restarts
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_error(&self, action: &str, err: impl std::fmt::Display) -> PortalError {
        error!(path = %self.path.display(), error = %err, "Failed to {} token store", action);
        PortalError::Storage {
            reason: format!("failed to {} {}: {}", action, self.path.display(), err),
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self) -> PortalResult<Option<String>> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No stored token");
                return Ok(None);
            }
            Err(e) => return Err(self.storage_error("read", e)),
        };

        let payload: TokenStoragePayload =
            serde_json::from_str(&raw).map_err(|e| self.storage_error("parse", e))?;

        if payload.access_token.is_empty() {
            return Ok(None);
        }

        debug!(stored_at = %payload.stored_at, "Token retrieved from storage");
        Ok(Some(payload.access_token))
    }

    async fn set(&self, token: &str) -> PortalResult<()> {
        let payload = TokenStoragePayload {
            access_token: token.to_string(),
            stored_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&payload)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.storage_error("create directory for", e))?;
            }
        }

        // Write then rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)
            .await
            .map_err(|e| self.storage_error("write", e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.storage_error("replace", e))?;

        info!(path = %self.path.display(), "Token stored");
        Ok(())
    }

    async fn clear(&self) -> PortalResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "Token removed from storage");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No token to remove");
                Ok(())
            }
            Err(e) => Err(self.storage_error("remove", e)),
        }
    }
}

/// Token store that lives only as long as the process
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already stored, as after a previous login
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self) -> PortalResult<Option<String>> {
        Ok(self.token.read().await.clone())
    }

    async fn set(&self, token: &str) -> PortalResult<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> PortalResult<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("token.json"));

        assert_eq!(store.get().await.unwrap(), None);

        store.set("abc.def").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("abc.def"));

        // A second store on the same path sees the token, like a page reload
        let reloaded = FileTokenStore::new(store.path());
        assert_eq!(reloaded.get().await.unwrap().as_deref(), Some("abc.def"));

        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);

        // Clearing twice is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(&path);
        let err = store.get().await.unwrap_err();
        assert!(matches!(err, PortalError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryTokenStore::with_token("t1");
        assert_eq!(store.get().await.unwrap().as_deref(), Some("t1"));
        store.set("t2").await.unwrap();
        assert_eq!(store.get().await.unwrap().as_deref(), Some("t2"));
        store.clear().await.unwrap();
        assert_eq!(store.get().await.unwrap(), None);
    }
}
