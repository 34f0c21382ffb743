//! Viz Interactive
//!
//! Runtime-only interactive filter state, one store per chart.
//!
//! # Core Concepts
//!
//! - [`InteractiveFiltersState`]: time window, data filters, legend categories, calculation
//! - [`InteractiveFilterStoreRegistry`]: chart key -> lockable store, plus dashboard broadcast
//!
//! Stores follow the persisted chart one way: editor presets override
//! viewer state on every sync. Shared dashboard filters snapshot each
//! participant before broadcasting and restore per dimension.
//!
//! # Example
//!
//! ```rust,ignore
//! use viz_interactive::InteractiveFilterStoreRegistry;
//!
//! let registry = InteractiveFilterStoreRegistry::new();
//! registry.broadcast_data_filter(&dimension, &value, &chart_keys);
//! registry.restore(&dimension);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod registry;
pub mod store;

// Re-exports
pub use registry::{InteractiveFilterStoreRegistry, StoreHandle};
pub use store::{InteractiveFiltersState, TimeRange};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
