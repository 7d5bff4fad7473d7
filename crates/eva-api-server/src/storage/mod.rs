//! Key-value storage backends for per-conversation state.
//!
//! Every conversation owns one namespace. A namespace is an opaque id derived
//! from the conversation id, so arbitrary client strings never reach the
//! backend's key space directly.

mod memory;
mod sled_backend;

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::config::{BackendKind, StoreConfig};

pub use memory::MemoryBackend;
pub use sled_backend::SledBackend;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Durable key-value primitive with get / put / delete-all per namespace.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove every key in the namespace. Succeeds when nothing is stored.
    async fn delete_all(&self, namespace: &str) -> Result<(), StorageError>;
}

/// Hex SHA-256 of the conversation id.
pub fn namespace_for(conversation_id: &str) -> String {
    hex::encode(Sha256::digest(conversation_id.as_bytes()))
}

pub fn open_backend(config: &StoreConfig) -> Result<Arc<dyn StorageBackend>, StorageError> {
    match config.backend {
        BackendKind::Memory => {
            info!("Using in-memory conversation storage");
            Ok(Arc::new(MemoryBackend::new()))
        }
        BackendKind::Sled => {
            info!("Using sled conversation storage at {}", config.path);
            Ok(Arc::new(SledBackend::open(&config.path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_is_stable_and_opaque() {
        let a = namespace_for("astronaut-1");
        let b = namespace_for("astronaut-1");
        let c = namespace_for("astronaut-2");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn test_namespace_hides_separators() {
        let ns = namespace_for("crew/../other");
        assert!(!ns.contains('/'));
    }
}
