use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use super::{StorageBackend, StorageError};

/// Sled-backed store on the host filesystem. Keys are `{namespace}/{key}`.
#[derive(Clone)]
pub struct SledBackend {
    db: sled::Db,
}

impl SledBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    fn entry_key(namespace: &str, key: &str) -> String {
        format!("{}/{}", namespace, key)
    }
}

#[async_trait]
impl StorageBackend for SledBackend {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let value = self.db.get(Self::entry_key(namespace, key).as_bytes())?;
        Ok(value.map(|v| v.to_vec()))
    }

    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.db.insert(Self::entry_key(namespace, key).as_bytes(), value)?;
        self.db.flush_async().await?;
        Ok(())
    }

    async fn delete_all(&self, namespace: &str) -> Result<(), StorageError> {
        let prefix = format!("{}/", namespace);
        let mut batch = sled::Batch::default();
        let mut removed = 0usize;

        for key in self.db.scan_prefix(prefix.as_bytes()).keys() {
            batch.remove(key?);
            removed += 1;
        }

        self.db.apply_batch(batch)?;
        self.db.flush_async().await?;
        debug!("Removed {} keys under namespace {}", removed, namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sled_roundtrip_and_delete_all() {
        let dir = TempDir::new().unwrap();
        let backend = SledBackend::open(dir.path().join("db")).unwrap();

        backend.put("abc", "messages", b"[1]".to_vec()).await.unwrap();
        backend.put("abc", "telemetry", b"{}".to_vec()).await.unwrap();
        backend.put("abd", "messages", b"[2]".to_vec()).await.unwrap();

        assert_eq!(backend.get("abc", "messages").await.unwrap(), Some(b"[1]".to_vec()));

        backend.delete_all("abc").await.unwrap();
        assert!(backend.get("abc", "messages").await.unwrap().is_none());
        assert!(backend.get("abc", "telemetry").await.unwrap().is_none());
        // shared prefix "ab" must not leak across namespaces
        assert_eq!(backend.get("abd", "messages").await.unwrap(), Some(b"[2]".to_vec()));
    }

    #[tokio::test]
    async fn test_sled_writes_are_durable_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db");

        {
            let backend = SledBackend::open(&path).unwrap();
            backend.put("abc", "messages", b"[1]".to_vec()).await.unwrap();
            backend.put("xyz", "messages", b"[9]".to_vec()).await.unwrap();
            backend.delete_all("xyz").await.unwrap();
        }

        let backend = SledBackend::open(&path).unwrap();
        assert_eq!(backend.get("abc", "messages").await.unwrap(), Some(b"[1]".to_vec()));
        assert!(backend.get("xyz", "messages").await.unwrap().is_none());
    }
}
