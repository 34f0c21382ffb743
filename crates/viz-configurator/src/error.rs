//! Error types for the configurator

use serde::Serialize;
use std::fmt;
use viz_model::{ChartKey, ComponentId, ConfiguratorStep, EncodingSlot};

/// Errors raised by the checked dispatch path
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfiguratorError {
    /// Action dispatched in a step that does not accept it
    #[error("action {action} is not valid in step {step}")]
    InvalidStep {
        /// Action name
        action: &'static str,
        /// Current step
        step: ConfiguratorStep,
    },

    /// Step change not in the transition table
    #[error("illegal step transition {from} -> {to}")]
    IllegalTransition {
        /// Current step
        from: ConfiguratorStep,
        /// Requested step
        to: ConfiguratorStep,
    },
}

/// Where a stale component reference was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ReferenceLocation {
    /// Editor filter of a cube
    CubeFilter {
        /// Cube identity
        cube_iri: String,
    },
    /// Encoding field
    Field {
        /// Slot
        slot: EncodingSlot,
    },
    /// Legend interactive filter
    Legend,
    /// Time range interactive filter
    TimeRange,
    /// Interactive data filter list
    DataFilter,
    /// Annotation target
    AnnotationTarget {
        /// Annotation key
        key: String,
    },
}

impl fmt::Display for ReferenceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CubeFilter { cube_iri } => write!(f, "filter of {cube_iri}"),
            Self::Field { slot } => write!(f, "field {slot}"),
            Self::Legend => f.write_str("legend"),
            Self::TimeRange => f.write_str("time range"),
            Self::DataFilter => f.write_str("data filters"),
            Self::AnnotationTarget { key } => write!(f, "annotation {key}"),
        }
    }
}

/// A reference to a component absent from the current catalogue
///
/// Reported, never raised: the reference is dropped and loading continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("chart {chart_key}: {location} references unknown component {component_id}")]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    /// Chart holding the reference
    pub chart_key: ChartKey,
    /// Missing component
    pub component_id: ComponentId,
    /// Where it was referenced
    pub location: ReferenceLocation,
}
