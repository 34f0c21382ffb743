//! Action taxonomy
//!
//! Every user intent the configurator understands. Actions carry the
//! metadata they need (component catalogues) so that [`crate::reduce`]
//! stays pure.

use crate::field_update::FieldUpdate;
use serde::{Deserialize, Serialize};
use viz_model::{
    Annotation, AnnotationTarget, BlockKey, ChartKey, ChartType, ComponentId, Components,
    ConfiguratorStep, DashboardArrangement, DataSource, FilterValue, ImputationType,
    LayoutBlock, LayoutKind, Locale, TimeRangePresets,
};

/// Interactive filter capability of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InteractiveFilterKind {
    /// Legend highlighting
    Legend,
    /// Time range brushing
    TimeRange,
    /// Data filter dropdowns
    DataFilters,
    /// Identity/percent switch
    Calculation,
}

/// Owner of a title/description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaTarget {
    /// Active chart
    Chart,
    /// Layout
    Layout,
}

/// Localized meta field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetaField {
    /// Title
    Title,
    /// Description
    Description,
}

/// User intent dispatched against the configurator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum Action {
    /// Choose where observations come from
    SelectDataSource { data_source: DataSource },
    /// Create the first chart from a cube
    InitializeChart { iri: String, components: Components },
    /// Leave chart editing for layouting
    StepNext,
    /// Return from layouting to chart editing
    StepBack,
    /// Freeze the configuration for publication
    Publish,

    /// Re-encode the active chart
    ChangeChartType {
        chart_type: ChartType,
        components: Components,
    },
    /// Typed change to one field
    UpdateField {
        update: FieldUpdate,
        components: Components,
    },
    /// Focus an options panel
    SetActiveField { field: Option<String> },
    /// Set an editor filter
    ///
    /// Without `cube_iri` a native id addresses the cube that owns it (the
    /// one already filtering or joining on it, or the only cube); a join
    /// placeholder addresses every joined cube's own dimension.
    SetFilter {
        cube_iri: Option<String>,
        component_id: ComponentId,
        value: FilterValue,
    },
    /// Remove an editor filter
    RemoveFilter {
        cube_iri: Option<String>,
        component_id: ComponentId,
    },
    /// Join another cube into the active chart
    AddDataset {
        iri: String,
        join_by: Vec<ComponentId>,
        existing_join_by: Option<Vec<ComponentId>>,
        components: Components,
    },
    /// Remove a joined cube
    RemoveDataset { iri: String, components: Components },
    /// Set the missing-value strategy of the y field
    SetImputation { imputation: ImputationType },

    /// Add an annotation to the active chart
    AddAnnotation { annotation: Annotation },
    /// Replace an annotation by key
    UpdateAnnotation { annotation: Annotation },
    /// Retarget an annotation
    ChangeAnnotationTarget {
        key: String,
        targets: Vec<AnnotationTarget>,
    },
    /// Remove an annotation
    RemoveAnnotation { key: String },

    /// Enable or disable an interactive filter
    ToggleInteractiveFilter {
        filter: InteractiveFilterKind,
        active: bool,
    },
    /// Add or remove a dimension from the viewer's data filters
    ToggleInteractiveDataFilterDimension { component_id: ComponentId },

    /// New chart from a cube, appended and made active
    AddChart { iri: String, components: Components },
    /// Copy of a chart under a fresh key
    DuplicateChart { chart_key: ChartKey },
    /// Remove a chart, never the last one
    RemoveChart { chart_key: ChartKey },
    /// Make another chart active
    SwitchActiveChart { chart_key: ChartKey },
    /// Localized title or description
    SetMeta {
        target: MetaTarget,
        field: MetaField,
        locale: Locale,
        value: String,
    },

    /// Append a block
    AddLayoutBlock { block: LayoutBlock },
    /// Remove a block; a chart block takes its chart with it
    RemoveLayoutBlock { key: BlockKey },
    /// Copy a block, duplicating the chart behind a chart block
    DuplicateLayoutBlock { key: BlockKey },
    /// Move a block
    ReorderLayoutBlocks { from: usize, to: usize },
    /// Publication mode and arrangement
    SetLayoutKind {
        kind: LayoutKind,
        arrangement: Option<DashboardArrangement>,
    },
    /// Shared dashboard time range
    SetDashboardTimeRange {
        active: bool,
        time_unit: String,
        presets: TimeRangePresets,
    },
    /// Shared dashboard data filter value
    SetDashboardDataFilter {
        component_id: ComponentId,
        value: FilterValue,
    },
    /// Stop sharing a dashboard data filter
    RemoveDashboardDataFilter { component_id: ComponentId },
}

const DATA_SOURCE_STEPS: &[ConfiguratorStep] =
    &[ConfiguratorStep::Initial, ConfiguratorStep::SelectingDataset];
const SELECTING: &[ConfiguratorStep] = &[ConfiguratorStep::SelectingDataset];
const EDITING: &[ConfiguratorStep] = &[ConfiguratorStep::ConfiguringChart];
const EDITING_OR_LAYOUTING: &[ConfiguratorStep] =
    &[ConfiguratorStep::ConfiguringChart, ConfiguratorStep::Layouting];
const LAYOUTING: &[ConfiguratorStep] = &[ConfiguratorStep::Layouting];

impl Action {
    /// Stable name for logs and errors
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectDataSource { .. } => "SelectDataSource",
            Self::InitializeChart { .. } => "InitializeChart",
            Self::StepNext => "StepNext",
            Self::StepBack => "StepBack",
            Self::Publish => "Publish",
            Self::ChangeChartType { .. } => "ChangeChartType",
            Self::UpdateField { .. } => "UpdateField",
            Self::SetActiveField { .. } => "SetActiveField",
            Self::SetFilter { .. } => "SetFilter",
            Self::RemoveFilter { .. } => "RemoveFilter",
            Self::AddDataset { .. } => "AddDataset",
            Self::RemoveDataset { .. } => "RemoveDataset",
            Self::SetImputation { .. } => "SetImputation",
            Self::AddAnnotation { .. } => "AddAnnotation",
            Self::UpdateAnnotation { .. } => "UpdateAnnotation",
            Self::ChangeAnnotationTarget { .. } => "ChangeAnnotationTarget",
            Self::RemoveAnnotation { .. } => "RemoveAnnotation",
            Self::ToggleInteractiveFilter { .. } => "ToggleInteractiveFilter",
            Self::ToggleInteractiveDataFilterDimension { .. } => {
                "ToggleInteractiveDataFilterDimension"
            }
            Self::AddChart { .. } => "AddChart",
            Self::DuplicateChart { .. } => "DuplicateChart",
            Self::RemoveChart { .. } => "RemoveChart",
            Self::SwitchActiveChart { .. } => "SwitchActiveChart",
            Self::SetMeta { .. } => "SetMeta",
            Self::AddLayoutBlock { .. } => "AddLayoutBlock",
            Self::RemoveLayoutBlock { .. } => "RemoveLayoutBlock",
            Self::DuplicateLayoutBlock { .. } => "DuplicateLayoutBlock",
            Self::ReorderLayoutBlocks { .. } => "ReorderLayoutBlocks",
            Self::SetLayoutKind { .. } => "SetLayoutKind",
            Self::SetDashboardTimeRange { .. } => "SetDashboardTimeRange",
            Self::SetDashboardDataFilter { .. } => "SetDashboardDataFilter",
            Self::RemoveDashboardDataFilter { .. } => "RemoveDashboardDataFilter",
        }
    }

    /// Steps in which the action may be dispatched
    #[must_use]
    pub fn permitted_steps(&self) -> &'static [ConfiguratorStep] {
        match self {
            Self::SelectDataSource { .. } => DATA_SOURCE_STEPS,
            Self::InitializeChart { .. } => SELECTING,
            Self::StepNext => EDITING,
            Self::StepBack | Self::Publish => LAYOUTING,

            Self::ChangeChartType { .. }
            | Self::UpdateField { .. }
            | Self::SetActiveField { .. }
            | Self::SetFilter { .. }
            | Self::RemoveFilter { .. }
            | Self::AddDataset { .. }
            | Self::RemoveDataset { .. }
            | Self::SetImputation { .. }
            | Self::AddAnnotation { .. }
            | Self::UpdateAnnotation { .. }
            | Self::ChangeAnnotationTarget { .. }
            | Self::RemoveAnnotation { .. }
            | Self::ToggleInteractiveFilter { .. }
            | Self::ToggleInteractiveDataFilterDimension { .. } => EDITING,

            Self::AddChart { .. }
            | Self::DuplicateChart { .. }
            | Self::RemoveChart { .. }
            | Self::SwitchActiveChart { .. }
            | Self::SetMeta { .. } => EDITING_OR_LAYOUTING,

            Self::AddLayoutBlock { .. }
            | Self::RemoveLayoutBlock { .. }
            | Self::DuplicateLayoutBlock { .. }
            | Self::ReorderLayoutBlocks { .. }
            | Self::SetLayoutKind { .. }
            | Self::SetDashboardTimeRange { .. }
            | Self::SetDashboardDataFilter { .. }
            | Self::RemoveDashboardDataFilter { .. } => LAYOUTING,
        }
    }

    /// Whether the action may be dispatched in `step`
    #[inline]
    #[must_use]
    pub fn permitted_in(&self, step: ConfiguratorStep) -> bool {
        self.permitted_steps().contains(&step)
    }
}
