//! Typed field updates
//!
//! A field update names its slot and the option it changes. Updates that
//! address a slot or option the chart type does not have are rejected by
//! [`apply_field_update`] instead of silently creating the option.

use crate::chart::{chart_components, derive_interactive_config, normalize_field, refresh_filters};
use crate::schema::{chart_schema, FieldOption};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use viz_model::{
    ChartConfig, ComponentId, Components, EncodingSlot, FieldConfig, ImputationType, SegmentKind,
    Sorting,
};

/// One change to a chart's fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldUpdate {
    /// Bind a component to a slot
    SetComponent {
        /// Slot
        slot: EncodingSlot,
        /// Component to bind
        component_id: ComponentId,
    },
    /// Unbind an optional slot
    RemoveField {
        /// Slot
        slot: EncodingSlot,
    },
    /// Change or clear sorting
    SetSorting {
        /// Slot
        slot: EncodingSlot,
        /// New sorting
        sorting: Option<Sorting>,
    },
    /// Stack or group segments
    SetSegmentKind {
        /// Slot
        slot: EncodingSlot,
        /// Segment kind
        kind: SegmentKind,
    },
    /// Missing value strategy
    SetImputation {
        /// Slot
        slot: EncodingSlot,
        /// Strategy
        imputation: ImputationType,
    },
    /// Print values on marks
    SetShowValues {
        /// Slot
        slot: EncodingSlot,
        /// Enabled
        show: bool,
    },
    /// Color of one category value
    SetColor {
        /// Slot
        slot: EncodingSlot,
        /// Category value
        value: String,
        /// Color
        color: String,
    },
    /// Replace the whole color mapping
    SetColorMapping {
        /// Slot
        slot: EncodingSlot,
        /// Value -> color
        mapping: IndexMap<String, String>,
    },
    /// Abbreviate large numbers
    SetAbbreviations {
        /// Slot
        slot: EncodingSlot,
        /// Enabled
        enabled: bool,
    },
}

impl FieldUpdate {
    /// Slot the update addresses
    #[must_use]
    pub fn slot(&self) -> EncodingSlot {
        match self {
            Self::SetComponent { slot, .. }
            | Self::RemoveField { slot }
            | Self::SetSorting { slot, .. }
            | Self::SetSegmentKind { slot, .. }
            | Self::SetImputation { slot, .. }
            | Self::SetShowValues { slot, .. }
            | Self::SetColor { slot, .. }
            | Self::SetColorMapping { slot, .. }
            | Self::SetAbbreviations { slot, .. } => *slot,
        }
    }

    /// Option the update changes, `None` for binding changes
    #[must_use]
    pub fn option(&self) -> Option<FieldOption> {
        match self {
            Self::SetComponent { .. } | Self::RemoveField { .. } => None,
            Self::SetSorting { .. } => Some(FieldOption::Sorting),
            Self::SetSegmentKind { .. } => Some(FieldOption::SegmentKind),
            Self::SetImputation { .. } => Some(FieldOption::Imputation),
            Self::SetShowValues { .. } => Some(FieldOption::ShowValues),
            Self::SetColor { .. } | Self::SetColorMapping { .. } => Some(FieldOption::ColorMapping),
            Self::SetAbbreviations { .. } => Some(FieldOption::Abbreviations),
        }
    }
}

/// Apply `update` to `chart`
///
/// Returns `None` when the update is not valid for the chart type or the
/// current bindings. Binding a component removes its editor filter and a
/// key dimension that loses its binding gets a default filter back.
#[must_use]
pub fn apply_field_update(
    chart: &ChartConfig,
    update: &FieldUpdate,
    components: &Components,
) -> Option<ChartConfig> {
    let schema = chart_schema(chart.chart_type);
    let slot = update.slot();
    let Some(spec) = schema.encoding(slot) else {
        debug!(chart_type = %chart.chart_type, %slot, "slot not in schema");
        return None;
    };
    if let Some(option) = update.option() {
        if !spec.supports(option) {
            debug!(chart_type = %chart.chart_type, %slot, ?option, "option not supported");
            return None;
        }
    }

    let mut next = chart.clone();
    match update {
        FieldUpdate::SetComponent { component_id, .. } => {
            let view = chart_components(chart, components);
            let kind = view.kind_of(component_id.as_str())?;
            if !spec.accepts(kind) {
                debug!(%slot, %component_id, "component kind not accepted");
                return None;
            }
            let bound_elsewhere = chart
                .fields
                .iter()
                .any(|(s, f)| *s != slot && &f.component_id == component_id);
            if bound_elsewhere {
                return None;
            }

            let mut field = match chart.field(slot) {
                Some(old) if &old.component_id == component_id => return Some(next),
                Some(old) => {
                    let mut field = old.clone();
                    field.component_id = component_id.clone();
                    field.color_mapping = None;
                    field
                }
                None => FieldConfig::new(component_id.clone()),
            };
            normalize_field(&mut field, spec, chart.chart_type);
            next.fields.insert(slot, field);
            refresh_filters(&mut next, components);
            let previous = next.interactive_filters_config.clone();
            next.interactive_filters_config = derive_interactive_config(&next, &view, &previous);
        }
        FieldUpdate::RemoveField { .. } => {
            if spec.required {
                return None;
            }
            next.fields.shift_remove(&slot)?;
            if next.active_field.as_deref() == Some(slot.to_string().as_str()) {
                next.active_field = None;
            }
            refresh_filters(&mut next, components);
            let view = chart_components(&next, components);
            let previous = next.interactive_filters_config.clone();
            next.interactive_filters_config = derive_interactive_config(&next, &view, &previous);
        }
        FieldUpdate::SetSorting { sorting, .. } => {
            next.fields.get_mut(&slot)?.sorting = *sorting;
        }
        FieldUpdate::SetSegmentKind { kind, .. } => {
            next.fields.get_mut(&slot)?.segment_kind = Some(*kind);
        }
        FieldUpdate::SetImputation { imputation, .. } => {
            next.fields.get_mut(&slot)?.imputation_type = Some(*imputation);
        }
        FieldUpdate::SetShowValues { show, .. } => {
            next.fields.get_mut(&slot)?.show_values = Some(*show);
        }
        FieldUpdate::SetColor { value, color, .. } => {
            next.fields
                .get_mut(&slot)?
                .color_mapping
                .get_or_insert_with(IndexMap::new)
                .insert(value.clone(), color.clone());
        }
        FieldUpdate::SetColorMapping { mapping, .. } => {
            next.fields.get_mut(&slot)?.color_mapping = Some(mapping.clone());
        }
        FieldUpdate::SetAbbreviations { enabled, .. } => {
            next.fields.get_mut(&slot)?.use_abbreviations = Some(*enabled);
        }
    }
    Some(next)
}
