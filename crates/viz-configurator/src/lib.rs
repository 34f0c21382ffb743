//! Viz Configurator
//!
//! The configurator state machine of the chart builder.
//!
//! # Core Concepts
//!
//! - [`allowed_transitions`]: the step graph, `Initial` through `Publishing`
//! - [`Action`]: every user intent, with the steps it is permitted in
//! - [`reduce`]: pure `(state, action) -> state`, no-op when an action does not apply
//! - [`ChartSchema`]: per chart type encoding slots, accepted kinds and options
//! - [`FieldUpdate`]: typed field change validated against the schema
//! - [`sanitize_chart_config`]: drops references to unknown components
//!
//! # Example
//!
//! ```rust,ignore
//! use viz_configurator::{Action, Configurator};
//!
//! let mut configurator = Configurator::new();
//! configurator.dispatch(Action::SelectDataSource { data_source })?;
//! configurator.dispatch(Action::InitializeChart { iri, components })?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod action;
pub mod chart;
pub mod configurator;
pub mod error;
pub mod field_update;
pub mod reducer;
pub mod sanitize;
pub mod schema;
pub mod transition;

// Re-exports
pub use action::{Action, InteractiveFilterKind, MetaField, MetaTarget};
pub use chart::{
    add_dataset, change_chart_type, chart_components, derive_interactive_config,
    init_chart_config, init_chart_config_with_type, remove_dataset,
};
pub use configurator::Configurator;
pub use error::{ConfiguratorError, ReferenceLocation, UnresolvedReference};
pub use field_update::{apply_field_update, FieldUpdate};
pub use reducer::reduce;
pub use sanitize::sanitize_chart_config;
pub use schema::{chart_schema, possible_chart_types, ChartSchema, EncodingSpec, FieldOption};
pub use transition::{allowed_transitions, validate_transition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
