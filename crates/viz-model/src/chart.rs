//! Chart configuration
//!
//! A [`ChartConfig`] is the persisted description of one chart: which cubes
//! it reads, how components map onto encoding slots, the editor-authored
//! filters, interactive-filter capabilities and annotations.

use crate::cube::CubeConfig;
use crate::ids::{ChartKey, ComponentId};
use crate::version::{SchemaVersion, CHART_CONFIG_VERSION};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported chart types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    /// Vertical bars
    Column,
    /// Horizontal bars
    Bar,
    /// Lines over time
    Line,
    /// Stacked areas over time
    Area,
    /// Pie
    Pie,
    /// Measure against measure
    Scatterplot,
    /// Choropleth and symbol map
    Map,
}

impl ChartType {
    /// Every chart type, in menu order
    pub const ALL: [ChartType; 7] = [
        ChartType::Column,
        ChartType::Bar,
        ChartType::Line,
        ChartType::Area,
        ChartType::Pie,
        ChartType::Scatterplot,
        ChartType::Map,
    ];
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Column => "column",
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Area => "area",
            Self::Pie => "pie",
            Self::Scatterplot => "scatterplot",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// Encoding slot of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingSlot {
    /// Horizontal axis
    X,
    /// Vertical axis
    Y,
    /// Color grouping
    Segment,
    /// Animation over a temporal dimension
    Animation,
    /// Map areas
    Area,
    /// Map symbols
    Symbol,
}

impl fmt::Display for EncodingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Segment => "segment",
            Self::Animation => "animation",
            Self::Area => "area",
            Self::Symbol => "symbol",
        };
        f.write_str(name)
    }
}

/// Sorting criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortingType {
    /// Alphabetical by label
    ByDimensionLabel,
    /// By measure value
    ByMeasure,
    /// By stacked total
    ByTotalSize,
}

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortingOrder {
    /// Ascending
    Asc,
    /// Descending
    Desc,
}

/// Sorting of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    /// Criterion
    pub sorting_type: SortingType,
    /// Direction
    pub sorting_order: SortingOrder,
}

/// How segments are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// Stacked on top of each other
    Stacked,
    /// Side by side
    Grouped,
}

/// Strategy for missing values in stacked areas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputationType {
    /// Leave gaps
    #[default]
    None,
    /// Fill with zero
    Zeros,
    /// Interpolate linearly
    Linear,
}

/// Binding of one encoding slot to a component, plus slot options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    /// Bound component
    pub component_id: ComponentId,

    /// Sorting of the slot's values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<Sorting>,

    /// Stacked or grouped segments
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub segment_kind: Option<SegmentKind>,

    /// Missing value strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imputation_type: Option<ImputationType>,

    /// Print values on marks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_values: Option<bool>,

    /// Category value -> color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mapping: Option<IndexMap<String, String>>,

    /// Abbreviate large numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_abbreviations: Option<bool>,
}

impl FieldConfig {
    /// Field bound to a component, no options set
    #[must_use]
    pub fn new(component_id: impl Into<ComponentId>) -> Self {
        Self {
            component_id: component_id.into(),
            sorting: None,
            segment_kind: None,
            imputation_type: None,
            show_values: None,
            color_mapping: None,
            use_abbreviations: None,
        }
    }
}

/// Slot -> field mapping
pub type Fields = IndexMap<EncodingSlot, FieldConfig>;

/// Locales supported for user-visible texts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// German
    De,
    /// French
    Fr,
    /// Italian
    It,
    /// English
    En,
}

/// A text in every supported locale
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localized {
    /// German
    pub de: String,
    /// French
    pub fr: String,
    /// Italian
    pub it: String,
    /// English
    pub en: String,
}

impl Localized {
    /// Text for a locale
    #[must_use]
    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::De => &self.de,
            Locale::Fr => &self.fr,
            Locale::It => &self.it,
            Locale::En => &self.en,
        }
    }

    /// Replace the text for a locale
    pub fn set(&mut self, locale: Locale, value: impl Into<String>) {
        let slot = match locale {
            Locale::De => &mut self.de,
            Locale::Fr => &mut self.fr,
            Locale::It => &mut self.it,
            Locale::En => &mut self.en,
        };
        *slot = value.into();
    }

    /// Whether every locale is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.de.is_empty() && self.fr.is_empty() && self.it.is_empty() && self.en.is_empty()
    }
}

/// Title and description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    /// Title
    pub title: Localized,
    /// Description
    pub description: Localized,
}

/// Legend-driven category highlighting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendFilterConfig {
    /// Enabled
    pub active: bool,
    /// Segment component the legend lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<ComponentId>,
}

/// Bounds of a time window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangePresets {
    /// Start
    pub from: String,
    /// End
    pub to: String,
}

/// Brushable time range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRangeFilterConfig {
    /// Enabled
    pub active: bool,
    /// Temporal component the range applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<ComponentId>,
    /// Editor-chosen initial window
    #[serde(default)]
    pub presets: TimeRangePresets,
}

/// Viewer-adjustable data filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFiltersConfig {
    /// Enabled
    pub active: bool,
    /// Dimensions the viewer may change
    #[serde(default)]
    pub component_ids: Vec<ComponentId>,
}

/// Value transformation applied to segments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalculationKind {
    /// Absolute values
    #[default]
    Identity,
    /// Share of total
    Percent,
}

/// Calculation toggle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationConfig {
    /// Viewer may switch the calculation
    pub active: bool,
    /// Default calculation
    #[serde(rename = "type")]
    pub kind: CalculationKind,
}

/// Which interactive filters a chart exposes to viewers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InteractiveFiltersConfig {
    /// Legend highlighting
    pub legend: LegendFilterConfig,
    /// Time range brushing
    pub time_range: TimeRangeFilterConfig,
    /// Data filter dropdowns
    pub data_filters: DataFiltersConfig,
    /// Identity/percent switch
    pub calculation: CalculationConfig,
}

/// Observation an annotation points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationTarget {
    /// Dimension of the target
    pub component_id: ComponentId,
    /// Dimension value of the target
    pub value: String,
}

/// Editor note attached to observations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Stable key
    pub key: String,
    /// Targeted observations
    #[serde(default)]
    pub targets: Vec<AnnotationTarget>,
    /// Note text
    #[serde(default)]
    pub text: Localized,
    /// Highlight color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Expanded when the chart loads
    #[serde(default)]
    pub default_open: bool,
}

/// Persisted description of one chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    /// Unique key within the configuration
    pub key: ChartKey,
    /// Schema version
    pub version: SchemaVersion,
    /// Title/description
    #[serde(default)]
    pub meta: Meta,
    /// Chart type
    pub chart_type: ChartType,
    /// Datasets, first one is the primary cube
    pub cubes: Vec<CubeConfig>,
    /// Encoding fields
    #[serde(default)]
    pub fields: Fields,
    /// Interactive filter capabilities
    #[serde(default)]
    pub interactive_filters_config: InteractiveFiltersConfig,
    /// Annotations
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Field whose options panel is focused
    #[serde(default)]
    pub active_field: Option<String>,
}

impl ChartConfig {
    /// Empty chart of the given type over the given cubes
    #[must_use]
    pub fn new(chart_type: ChartType, cubes: Vec<CubeConfig>) -> Self {
        Self {
            key: ChartKey::generate(),
            version: CHART_CONFIG_VERSION,
            meta: Meta::default(),
            chart_type,
            cubes,
            fields: Fields::new(),
            interactive_filters_config: InteractiveFiltersConfig::default(),
            annotations: Vec::new(),
            active_field: None,
        }
    }

    /// Field bound to a slot
    #[inline]
    #[must_use]
    pub fn field(&self, slot: EncodingSlot) -> Option<&FieldConfig> {
        self.fields.get(&slot)
    }

    /// Component bound to the segment slot
    #[must_use]
    pub fn segment_component(&self) -> Option<&ComponentId> {
        self.field(EncodingSlot::Segment).map(|f| &f.component_id)
    }

    /// Whether `id` is bound to any slot
    #[must_use]
    pub fn is_encoded(&self, id: &str) -> bool {
        self.fields.values().any(|f| f.component_id.as_str() == id)
    }

    /// Cube by iri
    #[must_use]
    pub fn cube(&self, iri: &str) -> Option<&CubeConfig> {
        self.cubes.iter().find(|c| c.iri == iri)
    }

    /// Mutable cube by iri
    pub fn cube_mut(&mut self, iri: &str) -> Option<&mut CubeConfig> {
        self.cubes.iter_mut().find(|c| c.iri == iri)
    }

    /// Whether the chart combines more than one cube
    #[inline]
    #[must_use]
    pub fn is_joined(&self) -> bool {
        self.cubes.len() > 1
    }

    /// Iris of every cube
    #[must_use]
    pub fn cube_iris(&self) -> Vec<String> {
        self.cubes.iter().map(|c| c.iri.clone()).collect()
    }

    /// Annotation by key
    pub fn annotation_mut(&mut self, key: &str) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|a| a.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn chart_config_serializes_camel_case() {
        let mut config = ChartConfig::new(
            ChartType::Column,
            vec![CubeConfig::new("cube").with_filters(
                [(ComponentId::new("d"), FilterValue::single("v"))]
                    .into_iter()
                    .collect(),
            )],
        );
        config.key = ChartKey::new("k");
        config
            .fields
            .insert(EncodingSlot::X, FieldConfig::new("year"));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["chartType"], json!("column"));
        assert_eq!(value["version"], json!("4.0.0"));
        assert_eq!(value["fields"]["x"], json!({"componentId": "year"}));
        assert_eq!(
            value["cubes"][0]["filters"]["d"],
            json!({"type": "single", "value": "v"})
        );
        assert_eq!(
            value["interactiveFiltersConfig"]["calculation"],
            json!({"active": false, "type": "identity"})
        );

        let back: ChartConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn localized_set_and_get() {
        let mut text = Localized::default();
        assert!(text.is_empty());
        text.set(Locale::Fr, "Titre");
        assert_eq!(text.get(Locale::Fr), "Titre");
        assert!(!text.is_empty());
    }

    #[test]
    fn segment_kind_uses_type_key() {
        let mut field = FieldConfig::new("sex");
        field.segment_kind = Some(SegmentKind::Grouped);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value, json!({"componentId": "sex", "type": "grouped"}));
    }
}
