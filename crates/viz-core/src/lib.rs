//! Viz Core
//!
//! Session layer of the chart builder: loads persisted configurations
//! through migration and sanitizing, drives the configurator and keeps
//! interactive filter stores in line.
//!
//! # Core Concepts
//!
//! - [`Studio`]: one editing or viewing session
//! - [`PersistenceService`] / [`MetadataService`]: collaborators behind traits
//! - [`InMemoryPersistence`]: author-checked in-memory storage
//! - [`StudioConfig`]: TOML configuration
//! - [`telemetry::init_tracing`]: opt-in subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use viz_core::{Studio, StudioConfig, InMemoryPersistence};
//!
//! let config = StudioConfig::load("viz.toml")?;
//! let studio = Studio::new(&config, persistence, metadata, resolver);
//! studio.load("config-key").await?;
//! studio.dispatch(Action::StepNext).await?;
//! let key = studio.save("author-id").await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod persistence;
pub mod services;
pub mod studio;
pub mod telemetry;

// Re-exports
pub use config::{DataSourceConfig, LoggingConfig, MigrationConfig, StudioConfig};
pub use error::{ConfigError, MetadataError, PersistenceError, Result, StudioError};
pub use persistence::InMemoryPersistence;
pub use services::{MetadataService, PersistenceService, StoredConfig};
pub use studio::Studio;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
