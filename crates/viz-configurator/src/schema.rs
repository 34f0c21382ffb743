//! Encoding schemas per chart type
//!
//! Each chart type enumerates its encoding slots, whether the slot must be
//! bound, which component kinds it accepts and which options it supports.
//! This finite table is what field updates are validated against.

use serde::{Deserialize, Serialize};
use viz_model::{ChartType, ComponentId, ComponentKind, Components, DimensionKind, EncodingSlot};

/// Option of a field that can be changed by a field update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldOption {
    /// Sorting of values
    Sorting,
    /// Stacked or grouped segments
    SegmentKind,
    /// Missing value strategy
    Imputation,
    /// Values printed on marks
    ShowValues,
    /// Category colors
    ColorMapping,
    /// Number abbreviations
    Abbreviations,
}

/// One encoding slot of a chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingSpec {
    /// Slot
    pub slot: EncodingSlot,
    /// Must be bound for the chart to render
    pub required: bool,
    /// Accepted component kinds, preferred first
    pub accepts: &'static [ComponentKind],
    /// Supported options
    pub options: &'static [FieldOption],
}

impl EncodingSpec {
    /// Whether a component of `kind` can be bound
    #[inline]
    #[must_use]
    pub fn accepts(&self, kind: ComponentKind) -> bool {
        self.accepts.contains(&kind)
    }

    /// Whether the slot supports `option`
    #[inline]
    #[must_use]
    pub fn supports(&self, option: FieldOption) -> bool {
        self.options.contains(&option)
    }
}

/// Encoding schema of a chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartSchema {
    /// Chart type
    pub chart_type: ChartType,
    /// Slots, in default-assignment order
    pub encodings: &'static [EncodingSpec],
}

impl ChartSchema {
    /// Spec of a slot
    #[must_use]
    pub fn encoding(&self, slot: EncodingSlot) -> Option<&EncodingSpec> {
        self.encodings.iter().find(|e| e.slot == slot)
    }

    /// Whether `(slot, option)` is a valid field location
    #[must_use]
    pub fn supports(&self, slot: EncodingSlot, option: FieldOption) -> bool {
        self.encoding(slot).is_some_and(|e| e.supports(option))
    }

    /// Whether the chart type has a segment slot
    #[inline]
    #[must_use]
    pub fn has_segment(&self) -> bool {
        self.encoding(EncodingSlot::Segment).is_some()
    }
}

const NOMINAL: ComponentKind = ComponentKind::Dimension(DimensionKind::Nominal);
const ORDINAL: ComponentKind = ComponentKind::Dimension(DimensionKind::Ordinal);
const TEMPORAL: ComponentKind = ComponentKind::Dimension(DimensionKind::Temporal);
const GEO_SHAPES: ComponentKind = ComponentKind::Dimension(DimensionKind::GeoShapes);
const GEO_COORDINATES: ComponentKind = ComponentKind::Dimension(DimensionKind::GeoCoordinates);
const MEASURE: ComponentKind = ComponentKind::Measure;

const CATEGORIES: &[ComponentKind] = &[NOMINAL, ORDINAL];
const MEASURES: &[ComponentKind] = &[MEASURE];

const SEGMENT_OPTIONS: &[FieldOption] = &[
    FieldOption::Sorting,
    FieldOption::SegmentKind,
    FieldOption::ColorMapping,
];
const COLOR_SEGMENT_OPTIONS: &[FieldOption] = &[FieldOption::Sorting, FieldOption::ColorMapping];
const MEASURE_OPTIONS: &[FieldOption] = &[FieldOption::ShowValues, FieldOption::Abbreviations];

const fn spec(
    slot: EncodingSlot,
    required: bool,
    accepts: &'static [ComponentKind],
    options: &'static [FieldOption],
) -> EncodingSpec {
    EncodingSpec {
        slot,
        required,
        accepts,
        options,
    }
}

static COLUMN: ChartSchema = ChartSchema {
    chart_type: ChartType::Column,
    encodings: &[
        spec(
            EncodingSlot::X,
            true,
            &[TEMPORAL, NOMINAL, ORDINAL],
            &[FieldOption::Sorting],
        ),
        spec(EncodingSlot::Y, true, MEASURES, MEASURE_OPTIONS),
        spec(EncodingSlot::Segment, false, CATEGORIES, SEGMENT_OPTIONS),
        spec(EncodingSlot::Animation, false, &[TEMPORAL], &[]),
    ],
};

static BAR: ChartSchema = ChartSchema {
    chart_type: ChartType::Bar,
    encodings: &[
        spec(EncodingSlot::X, true, MEASURES, MEASURE_OPTIONS),
        spec(
            EncodingSlot::Y,
            true,
            &[NOMINAL, ORDINAL, TEMPORAL],
            &[FieldOption::Sorting],
        ),
        spec(EncodingSlot::Segment, false, CATEGORIES, SEGMENT_OPTIONS),
        spec(EncodingSlot::Animation, false, &[TEMPORAL], &[]),
    ],
};

static LINE: ChartSchema = ChartSchema {
    chart_type: ChartType::Line,
    encodings: &[
        spec(EncodingSlot::X, true, &[TEMPORAL], &[]),
        spec(EncodingSlot::Y, true, MEASURES, MEASURE_OPTIONS),
        spec(EncodingSlot::Segment, false, CATEGORIES, COLOR_SEGMENT_OPTIONS),
    ],
};

static AREA: ChartSchema = ChartSchema {
    chart_type: ChartType::Area,
    encodings: &[
        spec(EncodingSlot::X, true, &[TEMPORAL], &[]),
        spec(
            EncodingSlot::Y,
            true,
            MEASURES,
            &[FieldOption::Imputation, FieldOption::Abbreviations],
        ),
        spec(EncodingSlot::Segment, false, CATEGORIES, COLOR_SEGMENT_OPTIONS),
    ],
};

static PIE: ChartSchema = ChartSchema {
    chart_type: ChartType::Pie,
    encodings: &[
        spec(EncodingSlot::Y, true, MEASURES, MEASURE_OPTIONS),
        spec(EncodingSlot::Segment, true, CATEGORIES, COLOR_SEGMENT_OPTIONS),
        spec(EncodingSlot::Animation, false, &[TEMPORAL], &[]),
    ],
};

static SCATTERPLOT: ChartSchema = ChartSchema {
    chart_type: ChartType::Scatterplot,
    encodings: &[
        spec(EncodingSlot::X, true, MEASURES, &[FieldOption::Abbreviations]),
        spec(EncodingSlot::Y, true, MEASURES, &[FieldOption::Abbreviations]),
        spec(
            EncodingSlot::Segment,
            false,
            CATEGORIES,
            &[FieldOption::ColorMapping],
        ),
        spec(EncodingSlot::Animation, false, &[TEMPORAL], &[]),
    ],
};

static MAP: ChartSchema = ChartSchema {
    chart_type: ChartType::Map,
    encodings: &[
        spec(
            EncodingSlot::Area,
            true,
            &[GEO_SHAPES],
            &[FieldOption::ColorMapping],
        ),
        spec(EncodingSlot::Y, true, MEASURES, &[FieldOption::Abbreviations]),
        spec(
            EncodingSlot::Symbol,
            false,
            &[GEO_COORDINATES, GEO_SHAPES],
            &[],
        ),
        spec(EncodingSlot::Animation, false, &[TEMPORAL], &[]),
    ],
};

/// Schema of a chart type
#[must_use]
pub fn chart_schema(chart_type: ChartType) -> &'static ChartSchema {
    match chart_type {
        ChartType::Column => &COLUMN,
        ChartType::Bar => &BAR,
        ChartType::Line => &LINE,
        ChartType::Area => &AREA,
        ChartType::Pie => &PIE,
        ChartType::Scatterplot => &SCATTERPLOT,
        ChartType::Map => &MAP,
    }
}

/// Default binding of the required slots of `schema`
///
/// Each slot takes the first unused component of its most preferred kind.
/// Returns `None` when a required slot cannot be filled.
#[must_use]
pub fn default_bindings(
    schema: &ChartSchema,
    components: &Components,
) -> Option<Vec<(EncodingSlot, ComponentId)>> {
    let mut used: Vec<ComponentId> = Vec::new();
    let mut bindings = Vec::new();

    for encoding in schema.encodings.iter().filter(|e| e.required) {
        let id = pick_component(encoding, components, &used)?;
        used.push(id.clone());
        bindings.push((encoding.slot, id));
    }
    Some(bindings)
}

/// First component accepted by `encoding` and not in `used`
#[must_use]
pub fn pick_component(
    encoding: &EncodingSpec,
    components: &Components,
    used: &[ComponentId],
) -> Option<ComponentId> {
    encoding.accepts.iter().find_map(|kind| match kind {
        ComponentKind::Measure => components
            .measures
            .iter()
            .map(|m| &m.id)
            .find(|id| !used.contains(id))
            .cloned(),
        ComponentKind::Dimension(dk) => components
            .dimensions
            .iter()
            .filter(|d| d.kind == *dk)
            .map(|d| &d.id)
            .find(|id| !used.contains(id))
            .cloned(),
    })
}

/// Chart types whose required slots can all be bound
#[must_use]
pub fn possible_chart_types(components: &Components) -> Vec<ChartType> {
    ChartType::ALL
        .iter()
        .copied()
        .filter(|t| default_bindings(chart_schema(*t), components).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use viz_model::{Dimension, Measure};

    fn catalogue() -> Components {
        Components::new()
            .with_dimension(Dimension::new("year", "c", DimensionKind::Temporal, ["2020"]))
            .with_dimension(Dimension::new("canton", "c", DimensionKind::Nominal, ["ZH"]))
            .with_measure(Measure::new("amount", "c"))
    }

    #[test]
    fn every_type_has_a_schema_for_itself() {
        for t in ChartType::ALL {
            assert_eq!(chart_schema(t).chart_type, t);
        }
    }

    #[test]
    fn possible_types_follow_catalogue() {
        let types = possible_chart_types(&catalogue());
        assert!(types.contains(&ChartType::Column));
        assert!(types.contains(&ChartType::Line));
        assert!(types.contains(&ChartType::Pie));
        assert!(!types.contains(&ChartType::Scatterplot));
        assert!(!types.contains(&ChartType::Map));
    }

    #[test]
    fn column_prefers_temporal_x() {
        let bindings = default_bindings(chart_schema(ChartType::Column), &catalogue()).unwrap();
        assert_eq!(bindings[0], (EncodingSlot::X, "year".into()));
        assert_eq!(bindings[1], (EncodingSlot::Y, "amount".into()));
    }

    #[test]
    fn options_are_per_slot() {
        let area = chart_schema(ChartType::Area);
        assert!(area.supports(EncodingSlot::Y, FieldOption::Imputation));
        assert!(!chart_schema(ChartType::Column).supports(EncodingSlot::Y, FieldOption::Imputation));
        assert!(!area.supports(EncodingSlot::Animation, FieldOption::Sorting));
    }
}
