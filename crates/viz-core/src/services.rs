//! Collaborators the session depends on
//!
//! Component metadata and configuration storage live behind traits so the
//! session can run against remote services, in-memory fakes or mocks.

use crate::error::{MetadataError, PersistenceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use viz_model::Components;

/// Source of cube component catalogues
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Dimensions and measures of every cube in `cube_iris`
    async fn fetch_components(&self, cube_iris: &[String]) -> Result<Components, MetadataError>;
}

/// A configuration as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    /// Storage key
    pub key: String,
    /// Persisted configurator state, at whatever version it was written
    pub data: Value,
    /// User that created the configuration
    pub author_id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last update time
    pub updated_at: DateTime<Utc>,
}

/// Storage of persisted configurations
///
/// Only the author of a configuration may update or remove it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Store a new configuration and return it with its generated key
    async fn create_config(&self, data: Value, author: &str)
        -> Result<StoredConfig, PersistenceError>;

    /// Configuration stored under `key`
    async fn get_config(&self, key: &str) -> Result<StoredConfig, PersistenceError>;

    /// Replace the document stored under `key`
    async fn update_config(
        &self,
        key: &str,
        data: Value,
        author: &str,
    ) -> Result<StoredConfig, PersistenceError>;

    /// Delete the configuration stored under `key`
    async fn remove_config(&self, key: &str, author: &str) -> Result<(), PersistenceError>;
}
