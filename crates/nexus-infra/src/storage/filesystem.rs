//! Local filesystem object store implementation.
//!
//! Implements the `ObjectStore` trait from `nexus-core` with objects stored
//! under a single root directory. Locators are relative paths; anything
//! absolute or containing parent components is rejected before touching the
//! filesystem.

use std::path::{Component, Path, PathBuf};

use nexus_core::storage::ObjectStore;
use nexus_types::error::StorageError;

/// Filesystem-backed object store rooted at a base directory.
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    /// Create a store rooted at `root`. Objects live at `{root}/{locator}`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a locator to a path under the root, rejecting traversal.
    fn resolve(&self, locator: &str) -> Result<PathBuf, StorageError> {
        let trimmed = locator.trim_start_matches('/');
        if trimmed.is_empty() {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }

        let relative = Path::new(trimmed);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(StorageError::InvalidLocator(locator.to_string()));
        }

        Ok(self.root.join(relative))
    }
}

impl ObjectStore for LocalObjectStore {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(locator)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(locator.to_string()))
            }
            Err(err) => Err(StorageError::Io(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_object(name: &str, bytes: &[u8]) -> (tempfile::TempDir, LocalObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.unwrap();
        }
        tokio::fs::write(&path, bytes).await.unwrap();
        let store = LocalObjectStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[tokio::test]
    async fn test_fetch_returns_bytes() {
        let (_dir, store) = store_with_object("uploads/cat.png", b"png-bytes").await;
        let bytes = store.fetch("uploads/cat.png").await.unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_fetch_tolerates_leading_slash() {
        let (_dir, store) = store_with_object("uploads/cat.png", b"png-bytes").await;
        let bytes = store.fetch("/uploads/cat.png").await.unwrap();
        assert_eq!(bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let (_dir, store) = store_with_object("uploads/cat.png", b"x").await;
        let err = store.fetch("uploads/dog.png").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_traversal_locator_is_rejected() {
        let (_dir, store) = store_with_object("uploads/cat.png", b"x").await;
        let err = store.fetch("../secrets.txt").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidLocator(_)));

        let err = store.fetch("uploads/../../etc/passwd").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidLocator(_)));
    }

    #[tokio::test]
    async fn test_empty_locator_is_rejected() {
        let (_dir, store) = store_with_object("uploads/cat.png", b"x").await;
        let err = store.fetch("").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidLocator(_)));
    }
}
