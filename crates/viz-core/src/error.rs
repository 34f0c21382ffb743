//! Error types for the studio session
//!
//! Provides error handling for:
//! - Documents that cannot be migrated or loaded
//! - Persistence failures and unauthorized mutation
//! - Metadata lookups
//! - Actions dispatched out of step
//! - Configuration files

use std::path::PathBuf;
use viz_configurator::ConfiguratorError;
use viz_migrate::MigrationError;
use viz_model::ChartKey;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Persisted document could not be migrated
    #[error("migration failed: {0}")]
    Migration(#[from] MigrationError),

    /// Persistence collaborator failed
    #[error("persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Metadata collaborator failed
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// Action rejected by the configurator
    #[error("configurator error: {0}")]
    Configurator(#[from] ConfiguratorError),

    /// Studio configuration is unusable
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Operation needs a loaded or started configuration
    #[error("no configuration loaded")]
    NoConfiguration,

    /// Chart key not present in the configuration
    #[error("unknown chart: {0}")]
    UnknownChart(ChartKey),
}

impl StudioError {
    /// Whether the error surfaces as "cannot load this configuration"
    #[must_use]
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            Self::Migration(MigrationError::Gap { .. } | MigrationError::Deserialize(_))
        ) || matches!(self, Self::Persistence(PersistenceError::Serialization(_)))
    }
}

/// Errors raised by a [`crate::PersistenceService`]
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// No configuration stored under the key
    #[error("configuration not found: {0}")]
    NotFound(String),

    /// Caller is not the author of the configuration
    #[error("user {author} may not modify configuration {key}")]
    Forbidden {
        /// Configuration key
        key: String,
        /// Caller
        author: String,
    },

    /// Document could not be encoded or decoded
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by a [`crate::MetadataService`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetadataError {
    /// Service unreachable
    #[error("metadata service unavailable: {0}")]
    Unavailable(String),

    /// Cube unknown to the service
    #[error("unknown cube: {0}")]
    UnknownCube(String),
}

/// Errors raised while loading a [`crate::StudioConfig`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for the config shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;
    use viz_model::SchemaVersion;

    #[test]
    fn gaps_are_load_failures() {
        let gap = StudioError::from(MigrationError::Gap {
            table: "chart",
            from: SchemaVersion::new(0, 9, 0),
        });
        assert!(gap.is_load_failure());
        assert!(!StudioError::NoConfiguration.is_load_failure());
        assert!(!StudioError::from(PersistenceError::NotFound("k".into())).is_load_failure());
    }
}
