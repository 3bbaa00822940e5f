use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};

use crate::errors::ServiceError;

/// Storage key for the serialized cart collection.
pub const CART_KEY: &str = "cart";
/// Storage key for the serialized wishlist collection.
pub const WISHLIST_KEY: &str = "wishlist";

/// Durable key-value store backing shop sessions. A `scope` isolates one
/// shopper session; keys within a scope are [`CART_KEY`] and
/// [`WISHLIST_KEY`]. No cross-scope or cross-process synchronization is
/// attempted: last write wins.
#[async_trait]
pub trait ShopStore: Send + Sync {
    async fn load(&self, scope: &str, key: &str) -> Result<Option<String>, ServiceError>;
    async fn save(&self, scope: &str, key: &str, value: &str) -> Result<(), ServiceError>;
}

/// Filesystem-backed store: one directory per scope, one JSON file per key.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, scope: &str, key: &str) -> Result<PathBuf, ServiceError> {
        // Scopes come from the URL; refuse anything that could escape the root.
        if scope.is_empty()
            || !scope
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ServiceError::InvalidInput(format!(
                "invalid session scope: {scope}"
            )));
        }
        Ok(self.root.join(scope).join(format!("{key}.json")))
    }
}

#[async_trait]
impl ShopStore for FileStore {
    async fn load(&self, scope: &str, key: &str) -> Result<Option<String>, ServiceError> {
        let path = self.path_for(scope, key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::StorageError(format!(
                "read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn save(&self, scope: &str, key: &str, value: &str) -> Result<(), ServiceError> {
        let path = self.path_for(scope, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::StorageError(format!("mkdir {}: {e}", parent.display())))?;
        }
        tokio::fs::write(&path, value)
            .await
            .map_err(|e| ServiceError::StorageError(format!("write {}: {e}", path.display())))
    }
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<(String, String), String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn load(&self, scope: &str, key: &str) -> Result<Option<String>, ServiceError> {
        Ok(self
            .entries
            .get(&(scope.to_string(), key.to_string()))
            .map(|v| v.clone()))
    }

    async fn save(&self, scope: &str, key: &str, value: &str) -> Result<(), ServiceError> {
        self.entries
            .insert((scope.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_within_a_scope() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert_eq!(store.load("sess-1", CART_KEY).await.unwrap(), None);
        store.save("sess-1", CART_KEY, "[]").await.unwrap();
        assert_eq!(
            store.load("sess-1", CART_KEY).await.unwrap().as_deref(),
            Some("[]")
        );
        // Other scopes stay isolated.
        assert_eq!(store.load("sess-2", CART_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_rejects_traversal_scopes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.load("../etc", CART_KEY).await.is_err());
        assert!(store.save("a/b", CART_KEY, "[]").await.is_err());
    }
}
