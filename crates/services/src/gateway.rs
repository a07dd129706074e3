//! Loads and saves the whole `QuestionStore` as one snapshot document.

use std::sync::Arc;

use quiz_core::QuestionStore;
use storage::{KeyValueStore, STATE_KEY, StateRecord};
use tracing::{debug, warn};

use crate::error::GatewayError;

#[derive(Clone)]
pub struct PersistenceGateway {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl PersistenceGateway {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: STATE_KEY.to_owned(),
        }
    }

    /// Use a different storage key (tests, side-by-side profiles).
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Load the last snapshot.
    ///
    /// Never fails: a missing, unreadable or invalid snapshot yields an empty store.
    pub async fn load(&self) -> QuestionStore {
        let raw = match self.kv.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no saved state, starting empty");
                return QuestionStore::new();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read saved state, starting empty");
                return QuestionStore::new();
            }
        };

        match StateRecord::from_json(&raw).and_then(StateRecord::into_store) {
            Ok(store) => {
                debug!(
                    questions = store.len(),
                    mistakes = store.mistake_ids().len(),
                    "loaded saved state"
                );
                store
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "saved state is corrupt, starting empty");
                QuestionStore::new()
            }
        }
    }

    /// Overwrite the snapshot with the current store.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Storage` if encoding or writing fails.
    pub async fn save(&self, store: &QuestionStore) -> Result<(), GatewayError> {
        let json = StateRecord::from_store(store).to_json()?;
        self.kv.put(&self.key, &json).await?;
        Ok(())
    }

    /// Delete the snapshot entirely.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Storage` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), GatewayError> {
        self.kv.remove(&self.key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use quiz_core::{QuestionDraft, QuestionId, QuestionKind};
    use storage::{InMemoryRepository, StorageError};

    /// Backend that is always offline.
    struct Offline;

    #[async_trait]
    impl KeyValueStore for Offline {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn put(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }

        async fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("offline".into()))
        }
    }

    fn store() -> QuestionStore {
        let mut store = QuestionStore::new();
        store
            .replace_all(vec![QuestionDraft {
                id: QuestionId::new("q1"),
                kind: QuestionKind::Blank,
                prompt: "2 + 2".into(),
                options: Vec::new(),
                answer: "4".into(),
                explanation: None,
            }])
            .unwrap();
        store.record_answer(&QuestionId::new("q1"), false).unwrap();
        store
    }

    #[tokio::test]
    async fn load_after_save_returns_same_state() {
        let gateway = PersistenceGateway::new(Arc::new(InMemoryRepository::new()));
        let original = store();

        gateway.save(&original).await.unwrap();

        assert_eq!(gateway.load().await, original);
    }

    #[tokio::test]
    async fn load_without_snapshot_is_empty() {
        let gateway = PersistenceGateway::new(Arc::new(InMemoryRepository::new()));
        assert!(gateway.load().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_soft() {
        let repo = InMemoryRepository::new();
        repo.put(STATE_KEY, "{not json").await.unwrap();
        let gateway = PersistenceGateway::new(Arc::new(repo));

        let loaded = gateway.load().await;

        assert!(loaded.is_empty());
        assert_eq!(loaded.stats().total_answered, 0);
    }

    #[tokio::test]
    async fn unreadable_backend_loads_empty() {
        let gateway = PersistenceGateway::new(Arc::new(Offline));
        assert!(gateway.load().await.is_empty());
    }

    #[tokio::test]
    async fn unwritable_backend_reports_save_error() {
        let gateway = PersistenceGateway::new(Arc::new(Offline));
        assert!(matches!(
            gateway.save(&store()).await,
            Err(GatewayError::Storage(StorageError::Connection(_)))
        ));
        assert!(gateway.clear().await.is_err());
    }

    #[tokio::test]
    async fn clear_removes_snapshot() {
        let repo = InMemoryRepository::new();
        let gateway = PersistenceGateway::new(Arc::new(repo.clone())).with_key("profile_b");
        gateway.save(&store()).await.unwrap();
        assert!(repo.get("profile_b").await.unwrap().is_some());

        gateway.clear().await.unwrap();

        assert!(repo.get("profile_b").await.unwrap().is_none());
        assert!(gateway.load().await.is_empty());
    }
}
