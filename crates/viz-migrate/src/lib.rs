//! Viz Migrate
//!
//! Keeps arbitrarily old persisted configurations loadable under the current
//! schema.
//!
//! # Core Concepts
//!
//! - [`MigrationTable`]: ordered chain of point migrations, checked for
//!   completeness on first use
//! - [`Migration`]: one `from -> to` step, possibly asynchronous
//! - [`IdentityResolver`]: canonical cube identity lookup used by one step
//! - [`Migrator`]: entry point serializing migrations per configuration key
//!
//! # Example
//!
//! ```rust,ignore
//! use viz_migrate::{MigrationContext, Migrator};
//!
//! let migrator = Migrator::new(MigrationContext::default());
//! let state = migrator.migrate_keyed("config-1", persisted).await?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod chart;
pub mod configurator;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod migrator;
pub mod resolver;
pub mod table;

// Re-exports
pub use context::{MigrationContext, DEFAULT_DATA_SOURCE_URL};
pub use coordinator::MigrationCoordinator;
pub use error::{MigrationError, ResolverError};
pub use migrator::{
    chart_table, configurator_table, migrate_chart_config, migrate_chart_config_value,
    migrate_configurator_state, migrate_configurator_state_value, Migrator,
};
pub use resolver::{
    CachedIdentityResolver, IdentityResolver, PassthroughResolver, StaticIdentityResolver,
};
pub use table::{read_version, Migration, MigrationTable, StepFn, SyncStep};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
