//! In-memory configuration storage

use crate::error::PersistenceError;
use crate::services::{PersistenceService, StoredConfig};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

/// [`PersistenceService`] backed by a concurrent map
///
/// Keys are random UUIDs. Used by tests and the CLI.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    configs: DashMap<String, StoredConfig>,
}

impl InMemoryPersistence {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `data` under a chosen key, bypassing key generation
    pub fn insert(&self, key: impl Into<String>, data: Value, author: impl Into<String>) {
        let key = key.into();
        let now = Utc::now();
        self.configs.insert(
            key.clone(),
            StoredConfig {
                key,
                data,
                author_id: author.into(),
                created_at: now,
                updated_at: now,
            },
        );
    }

    /// Number of stored configurations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether nothing is stored
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    fn check_author(stored: &StoredConfig, author: &str) -> Result<(), PersistenceError> {
        if stored.author_id == author {
            Ok(())
        } else {
            Err(PersistenceError::Forbidden {
                key: stored.key.clone(),
                author: author.to_string(),
            })
        }
    }
}

#[async_trait]
impl PersistenceService for InMemoryPersistence {
    async fn create_config(
        &self,
        data: Value,
        author: &str,
    ) -> Result<StoredConfig, PersistenceError> {
        let key = Uuid::new_v4().to_string();
        let now = Utc::now();
        let stored = StoredConfig {
            key: key.clone(),
            data,
            author_id: author.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.configs.insert(key.clone(), stored.clone());
        info!(%key, author, "created configuration");
        Ok(stored)
    }

    async fn get_config(&self, key: &str) -> Result<StoredConfig, PersistenceError> {
        self.configs
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| PersistenceError::NotFound(key.to_string()))
    }

    async fn update_config(
        &self,
        key: &str,
        data: Value,
        author: &str,
    ) -> Result<StoredConfig, PersistenceError> {
        let mut entry = self
            .configs
            .get_mut(key)
            .ok_or_else(|| PersistenceError::NotFound(key.to_string()))?;
        Self::check_author(&entry, author)?;
        entry.data = data;
        entry.updated_at = Utc::now();
        debug!(key, "updated configuration");
        Ok(entry.value().clone())
    }

    async fn remove_config(&self, key: &str, author: &str) -> Result<(), PersistenceError> {
        {
            let entry = self
                .configs
                .get(key)
                .ok_or_else(|| PersistenceError::NotFound(key.to_string()))?;
            Self::check_author(&entry, author)?;
        }
        self.configs.remove(key);
        info!(key, "removed configuration");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn only_the_author_may_mutate() {
        let store = InMemoryPersistence::new();
        let created = store.create_config(json!({"a": 1}), "alice").await.unwrap();

        let err = store
            .update_config(&created.key, json!({"a": 2}), "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Forbidden { .. }));
        assert!(matches!(
            store.remove_config(&created.key, "bob").await,
            Err(PersistenceError::Forbidden { .. })
        ));

        let updated = store
            .update_config(&created.key, json!({"a": 2}), "alice")
            .await
            .unwrap();
        assert_eq!(updated.data, json!({"a": 2}));
        assert!(updated.updated_at >= created.created_at);

        store.remove_config(&created.key, "alice").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_keys_are_not_found() {
        let store = InMemoryPersistence::new();
        assert!(matches!(
            store.get_config("nope").await,
            Err(PersistenceError::NotFound(_))
        ));
    }
}
