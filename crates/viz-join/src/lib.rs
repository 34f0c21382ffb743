//! Viz Join
//!
//! Unifies dimensions across the joined cubes of one chart.
//!
//! # Core Concepts
//!
//! - [`join_by_component_id`]: synthetic identity `joinBy__<i>` of the i-th join axis
//! - [`get_chart_config_filters`]: chart filters, native or re-keyed to join axes
//! - [`group_prepared_filters_by_dimension`]: per-dimension grouping of cube filter specs
//! - [`prepare_cube_queries`]: per-cube input for the observation fetcher
//!
//! Everything here is pure and never fails: inconsistent input (unequal join
//! lists, unknown ids) degrades by omission.
//!
//! # Example
//!
//! ```rust,ignore
//! use viz_join::{get_chart_config_filters, FilterOptions};
//!
//! let filters = get_chart_config_filters(&chart.cubes, FilterOptions::joined());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod filters;
mod grouping;
mod join;
mod query;

// Re-exports
pub use filters::{get_chart_config_filters, FilterOptions};
pub use grouping::{
    group_prepared_filters_by_dimension, prepare_filters, DimensionGroup, GroupEntry,
    PreparedFilter,
};
pub use join::{
    check_join_arity, cube_component_id, is_join_by_component_id, join_arity,
    join_by_component_id, join_by_index, joined_components, logical_component_id, original_ids,
    JoinArityMismatch, JOIN_BY_PREFIX,
};
pub use query::{prepare_cube_queries, CubeQuery};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
