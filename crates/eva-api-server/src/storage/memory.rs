use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use super::{StorageBackend, StorageError};

/// Process-local backend. State lives as long as the server process.
#[derive(Default)]
pub struct MemoryBackend {
    namespaces: DashMap<String, HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of namespaces currently holding data
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self
            .namespaces
            .get(namespace)
            .and_then(|entries| entries.get(key).cloned()))
    }

    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    async fn delete_all(&self, namespace: &str) -> Result<(), StorageError> {
        if let Some((_, entries)) = self.namespaces.remove(namespace) {
            debug!("Dropped {} keys from namespace {}", entries.len(), namespace);
        }
        Ok(())
    }
}
