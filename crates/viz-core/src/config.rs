//! Studio configuration
//!
//! Loaded from TOML. Every section is optional:
//!
//! ```toml
//! [data_source]
//! type = "sparql"
//! url = "https://lindas.admin.ch/query"
//!
//! [migration]
//! resolver_cache_capacity = 1024
//! resolver_cache_ttl_secs = 600
//!
//! [logging]
//! filter = "info,viz_migrate=debug"
//! json = false
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use viz_migrate::DEFAULT_DATA_SOURCE_URL;
use viz_model::{DataSource, DataSourceType};

fn default_url() -> String {
    DEFAULT_DATA_SOURCE_URL.to_string()
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_filter() -> String {
    "info".to_string()
}

/// Data source assumed for states persisted before it was recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSourceConfig {
    /// Endpoint kind
    #[serde(rename = "type")]
    pub kind: DataSourceType,
    /// Endpoint url
    pub url: String,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            kind: DataSourceType::Sparql,
            url: default_url(),
        }
    }
}

/// Identity resolver caching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Maximum cached identities
    pub resolver_cache_capacity: u64,
    /// Entry lifetime, unbounded when absent
    pub resolver_cache_ttl_secs: Option<u64>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            resolver_cache_capacity: default_cache_capacity(),
            resolver_cache_ttl_secs: None,
        }
    }
}

impl MigrationConfig {
    /// Entry lifetime as a duration
    #[must_use]
    pub fn resolver_cache_ttl(&self) -> Option<Duration> {
        self.resolver_cache_ttl_secs.map(Duration::from_secs)
    }
}

/// Tracing output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when no environment override is set
    pub filter: String,
    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

/// Top-level studio configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Default data source
    pub data_source: DataSourceConfig,
    /// Migration settings
    pub migration: MigrationConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl StudioConfig {
    /// Read and parse the TOML file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), "loaded studio config");
        Ok(config)
    }

    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Set the default data source
    #[must_use]
    pub fn with_data_source(mut self, kind: DataSourceType, url: impl Into<String>) -> Self {
        self.data_source = DataSourceConfig {
            kind,
            url: url.into(),
        };
        self
    }

    /// Set identity cache bounds
    #[must_use]
    pub fn with_resolver_cache(mut self, capacity: u64, ttl: Option<Duration>) -> Self {
        self.migration.resolver_cache_capacity = capacity;
        self.migration.resolver_cache_ttl_secs = ttl.map(|d| d.as_secs());
        self
    }

    /// Set logging output
    #[must_use]
    pub fn with_logging(mut self, filter: impl Into<String>, json: bool) -> Self {
        self.logging = LoggingConfig {
            filter: filter.into(),
            json,
        };
        self
    }

    /// Data source handed to migrations
    #[must_use]
    pub fn default_data_source(&self) -> DataSource {
        DataSource {
            kind: self.data_source.kind,
            url: self.data_source.url.clone(),
        }
    }
}
