//! Viz Model
//!
//! Persisted configuration model of the chart builder.
//!
//! # Core Concepts
//!
//! - [`ConfiguratorState`]: discriminated union over workflow steps
//! - [`ChartConfig`]: one chart's encoding, filters, interactive behavior, annotations
//! - [`CubeConfig`]: a dataset with its filters and optional join list
//! - [`FilterValue`]: single, multi or range filter
//! - [`Layout`]: ordered blocks for dashboard composition
//! - [`Components`]: dimension/measure catalogue from the metadata service
//!
//! Every type serializes to the persisted camelCase JSON shape, tagged with
//! a [`SchemaVersion`].

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod chart;
pub mod components;
pub mod cube;
pub mod error;
pub mod filter;
pub mod ids;
pub mod layout;
pub mod state;
pub mod version;

// Re-exports
pub use chart::{
    Annotation, AnnotationTarget, CalculationConfig, CalculationKind, ChartConfig, ChartType,
    DataFiltersConfig, EncodingSlot, FieldConfig, Fields, ImputationType,
    InteractiveFiltersConfig, LegendFilterConfig, Locale, Localized, Meta, SegmentKind, Sorting,
    SortingOrder, SortingType, TimeRangeFilterConfig, TimeRangePresets,
};
pub use components::{ComponentKind, Components, Dimension, DimensionKind, DimensionValue, Measure};
pub use cube::CubeConfig;
pub use error::ModelError;
pub use filter::{FilterValue, Filters};
pub use ids::{BlockKey, ChartKey, ComponentId};
pub use layout::{
    BlockContent, DashboardArrangement, DashboardDataFilters, DashboardFiltersConfig,
    DashboardTimeRange, Layout, LayoutBlock, LayoutKind,
};
pub use state::{
    ConfiguratorBody, ConfiguratorState, ConfiguratorStep, DataSource, DataSourceType,
    InitialBody, SelectingDatasetBody,
};
pub use version::{SchemaVersion, CHART_CONFIG_VERSION, CONFIGURATOR_STATE_VERSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
