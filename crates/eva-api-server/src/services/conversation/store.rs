use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use validator::Validate;

use crate::models::{Message, Role, TelemetrySnapshot};
use crate::storage::{namespace_for, StorageBackend, StorageError};
use crate::utils::error::ApiError;

const MESSAGES_KEY: &str = "messages";
const TELEMETRY_KEY: &str = "telemetry";

/// Per-conversation message log and telemetry, persisted in a storage backend.
///
/// Every operation runs inside the conversation's exclusive execution context
/// (one async mutex per conversation id), so read-modify-write cycles on the
/// same id never interleave while different ids proceed in parallel.
#[derive(Clone)]
pub struct ConversationStore {
    backend: Arc<dyn StorageBackend>,
    /// Conversation id -> execution context
    contexts: Arc<DashMap<String, Arc<Mutex<()>>>>,
    max_messages: usize,
}

impl ConversationStore {
    pub fn new(backend: Arc<dyn StorageBackend>, max_messages: usize) -> Self {
        info!("Initializing conversation store (max {} messages per conversation)", max_messages);
        Self {
            backend,
            contexts: Arc::new(DashMap::new()),
            max_messages: max_messages.max(1),
        }
    }

    /// Conversations with an operation running or queued right now
    pub fn active_conversations(&self) -> usize {
        self.contexts.len()
    }

    async fn acquire(&self, conversation_id: &str) -> ContextGuard {
        // Cloned under the shard lock, so removal in `ContextGuard::drop` can
        // never race a waiter.
        let context = self
            .contexts
            .entry(conversation_id.to_string())
            .or_default()
            .clone();
        let guard = context.lock_owned().await;

        ContextGuard {
            guard: Some(guard),
            contexts: self.contexts.clone(),
            conversation_id: conversation_id.to_string(),
        }
    }

    async fn read<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> Result<Option<T>, StorageError> {
        match self.backend.get(namespace, key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize>(&self, namespace: &str, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.put(namespace, key, bytes).await
    }

    pub async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, ApiError> {
        let _guard = self.acquire(conversation_id).await;
        let namespace = namespace_for(conversation_id);

        Ok(self.read(&namespace, MESSAGES_KEY).await?.unwrap_or_default())
    }

    /// Append with a server-assigned timestamp, keeping only the newest
    /// `max_messages` entries. Returns the stored log.
    pub async fn append_message(
        &self,
        conversation_id: &str,
        role: Role,
        content: String,
    ) -> Result<Vec<Message>, ApiError> {
        let _guard = self.acquire(conversation_id).await;
        let namespace = namespace_for(conversation_id);

        let mut messages: Vec<Message> = self.read(&namespace, MESSAGES_KEY).await?.unwrap_or_default();
        messages.push(Message {
            role,
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
        });

        if messages.len() > self.max_messages {
            let overflow = messages.len() - self.max_messages;
            messages.drain(..overflow);
            debug!("Evicted {} oldest messages from conversation {}", overflow, conversation_id);
        }

        self.write(&namespace, MESSAGES_KEY, &messages).await?;
        Ok(messages)
    }

    pub async fn get_telemetry(&self, conversation_id: &str) -> Result<TelemetrySnapshot, ApiError> {
        let _guard = self.acquire(conversation_id).await;
        let namespace = namespace_for(conversation_id);

        Ok(self.read(&namespace, TELEMETRY_KEY).await?.unwrap_or_default())
    }

    /// Replace the snapshot. Out-of-range readings are rejected before anything is written.
    pub async fn set_telemetry(
        &self,
        conversation_id: &str,
        snapshot: TelemetrySnapshot,
    ) -> Result<TelemetrySnapshot, ApiError> {
        snapshot.validate()?;

        let _guard = self.acquire(conversation_id).await;
        let namespace = namespace_for(conversation_id);

        self.write(&namespace, TELEMETRY_KEY, &snapshot).await?;
        Ok(snapshot)
    }

    pub async fn reset(&self, conversation_id: &str) -> Result<(), ApiError> {
        let _guard = self.acquire(conversation_id).await;
        let namespace = namespace_for(conversation_id);

        self.backend.delete_all(&namespace).await?;
        info!("Conversation {} reset", conversation_id);
        Ok(())
    }
}

/// Holds a conversation's execution context. Releasing the last holder
/// drops the context from the map.
struct ContextGuard {
    guard: Option<OwnedMutexGuard<()>>,
    contexts: Arc<DashMap<String, Arc<Mutex<()>>>>,
    conversation_id: String,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        // Release the guard's own reference first; only the map's remains if idle.
        drop(self.guard.take());
        self.contexts
            .remove_if(&self.conversation_id, |_, context| Arc::strong_count(context) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    fn store() -> ConversationStore {
        ConversationStore::new(Arc::new(MemoryBackend::new()), 50)
    }

    #[tokio::test]
    async fn test_list_empty_conversation() {
        let store = store();
        assert!(store.list_messages("crew-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_append_keeps_last_fifty_in_order() {
        let store = store();
        for i in 0..60 {
            store
                .append_message("crew-1", Role::User, format!("msg {}", i))
                .await
                .unwrap();
        }

        let messages = store.list_messages("crew-1").await.unwrap();
        assert_eq!(messages.len(), 50);
        assert_eq!(messages.first().unwrap().content, "msg 10");
        assert_eq!(messages.last().unwrap().content, "msg 59");
        for (i, message) in messages.iter().enumerate() {
            assert_eq!(message.content, format!("msg {}", i + 10));
        }
    }

    #[tokio::test]
    async fn test_append_stamps_timestamp_and_keeps_prior_entries() {
        let store = store();
        let first = store
            .append_message("crew-1", Role::User, "hello".into())
            .await
            .unwrap();
        let second = store
            .append_message("crew-1", Role::Assistant, "hi there".into())
            .await
            .unwrap();

        assert!(first[0].timestamp > 0);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0], first[0]);
        assert_eq!(second[1].role, Role::Assistant);
        assert!(second[1].timestamp >= second[0].timestamp);
    }

    #[tokio::test]
    async fn test_default_telemetry_then_roundtrip() {
        let store = store();
        assert_eq!(
            store.get_telemetry("crew-1").await.unwrap(),
            TelemetrySnapshot::default()
        );

        let snapshot = TelemetrySnapshot {
            primary_o2: 3100.5,
            heart_rate: 88.0,
            ..TelemetrySnapshot::default()
        };
        let stored = store.set_telemetry("crew-1", snapshot.clone()).await.unwrap();
        assert_eq!(stored, snapshot);
        assert_eq!(store.get_telemetry("crew-1").await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_invalid_telemetry_is_not_persisted() {
        let store = store();
        let snapshot = TelemetrySnapshot {
            suit_pressure: -1.0,
            ..TelemetrySnapshot::default()
        };

        let err = store.set_telemetry("crew-1", snapshot).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert_eq!(
            store.get_telemetry("crew-1").await.unwrap(),
            TelemetrySnapshot::default()
        );
    }

    #[tokio::test]
    async fn test_reset_clears_everything_and_is_idempotent() {
        let store = store();
        store.append_message("crew-1", Role::User, "x".into()).await.unwrap();
        store
            .set_telemetry("crew-1", TelemetrySnapshot { heart_rate: 99.0, ..Default::default() })
            .await
            .unwrap();

        store.reset("crew-1").await.unwrap();
        store.reset("crew-1").await.unwrap();

        assert!(store.list_messages("crew-1").await.unwrap().is_empty());
        assert_eq!(
            store.get_telemetry("crew-1").await.unwrap(),
            TelemetrySnapshot::default()
        );
    }

    #[tokio::test]
    async fn test_conversations_are_isolated() {
        let store = store();
        store.append_message("crew-1", Role::User, "a".into()).await.unwrap();
        store.reset("crew-2").await.unwrap();

        assert_eq!(store.list_messages("crew-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_idle_contexts_are_released() {
        let store = store();
        for i in 0..1000 {
            store.list_messages(&format!("nobody-{}", i)).await.unwrap();
            store.reset(&format!("gone-{}", i)).await.unwrap();
            store.get_telemetry(&format!("idle-{}", i)).await.unwrap();
        }
        store.append_message("crew-1", Role::User, "kept".into()).await.unwrap();

        assert_eq!(store.active_conversations(), 0);
        assert_eq!(store.list_messages("crew-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_waiting_context_survives_release() {
        let store = store();
        let held = store.acquire("crew-1").await;

        let waiter = {
            let store = store.clone();
            tokio::spawn(async move {
                store.append_message("crew-1", Role::User, "queued".into()).await.unwrap();
            })
        };
        // let the waiter clone the context and park on it
        while store
            .contexts
            .get("crew-1")
            .map(|ctx| Arc::strong_count(ctx.value()) < 3)
            .unwrap_or(true)
        {
            tokio::task::yield_now().await;
        }
        assert_eq!(store.active_conversations(), 1);

        drop(held);
        assert_eq!(store.active_conversations(), 1);

        waiter.await.unwrap();
        assert_eq!(store.active_conversations(), 0);
        assert_eq!(store.list_messages("crew-1").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_appends_are_serialized() {
        let store = store();
        let mut handles = Vec::new();

        for i in 0..40 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .append_message("crew-1", Role::User, format!("{}", i))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let messages = store.list_messages("crew-1").await.unwrap();
        assert_eq!(messages.len(), 40);

        let mut seen: Vec<usize> = messages.iter().map(|m| m.content.parse().unwrap()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overflow_never_exceeds_cap() {
        let store = store();
        let mut handles = Vec::new();

        for i in 0..120 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let log = store
                    .append_message("crew-1", Role::User, format!("{}", i))
                    .await
                    .unwrap();
                assert!(log.len() <= 50);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.list_messages("crew-1").await.unwrap().len(), 50);
        assert_eq!(store.active_conversations(), 0);
    }
}
