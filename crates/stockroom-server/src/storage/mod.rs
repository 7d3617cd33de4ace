//! Blob storage for uploaded files
//!
//! Attachment rows live in Postgres; the file bytes live behind [`BlobStore`].
//! Keys are `/`-separated relative paths such as
//! `product_attachments/<product>/<attachment>.pdf`.

use anyhow::{anyhow, Context, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Shared handle to the configured blob store
pub type SharedBlobStore = Arc<dyn BlobStore>;

#[axum::async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` under `key`, replacing any existing blob
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Read a blob, `None` when nothing is stored under `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Remove a blob; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Blob store backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        info!("Local blob store rooted at {}", root.display());
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(anyhow!("Invalid blob key: {}", key));
        }
        Ok(self.root.join(relative))
    }
}

#[axum::async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, data))]
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        debug!("Writing {} bytes ({}) to {}", data.len(), content_type, path.display());
        tokio::fs::write(&path, data)
            .await
            .with_context(|| format!("Failed to write blob {}", key))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read blob {}", key)),
        }
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Deleted {}", path.display());
                Ok(())
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to delete blob {}", key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());

        store
            .put("product_attachments/a/b.pdf", b"%PDF-1.7".to_vec(), "application/pdf")
            .await
            .unwrap();
        assert!(dir.path().join("product_attachments/a/b.pdf").exists());

        let data = store.get("product_attachments/a/b.pdf").await.unwrap();
        assert_eq!(data.as_deref(), Some(&b"%PDF-1.7"[..]));

        store.delete("product_attachments/a/b.pdf").await.unwrap();
        assert_eq!(store.get("product_attachments/a/b.pdf").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path());
        assert!(store.delete("product_attachments/nothing.pdf").await.is_ok());
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_root() {
        let dir = TempDir::new().unwrap();
        let store = LocalBlobStore::new(dir.path().join("blobs"));

        for key in ["../outside.pdf", "/etc/passwd", "a/../../b", ""] {
            assert!(store.put(key, vec![1], "application/pdf").await.is_err(), "{key}");
        }
        assert!(!dir.path().join("outside.pdf").exists());
    }
}
