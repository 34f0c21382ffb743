//! Chart-level transformations shared by the reducer
//!
//! Everything here is pure: functions take the current chart and the
//! metadata catalogue and return a new chart, or `None` when the change does
//! not apply.

use crate::schema::{
    chart_schema, default_bindings, pick_component, possible_chart_types, EncodingSpec,
    FieldOption,
};
use viz_join::{
    check_join_arity, cube_component_id, is_join_by_component_id, join_arity,
    join_by_component_id, join_by_index, joined_components,
};
use viz_model::{
    ChartConfig, ChartType, ComponentId, ComponentKind, Components, CubeConfig, DimensionKind,
    EncodingSlot, FieldConfig, FilterValue, Fields, ImputationType, InteractiveFiltersConfig,
    SegmentKind,
};

/// Catalogue as the chart addresses it, join placeholders included
#[must_use]
pub fn chart_components(chart: &ChartConfig, components: &Components) -> Components {
    joined_components(&chart.cubes, components)
}

/// Cube-local ids of `cube` bound to a field, directly or through a join
/// placeholder
#[must_use]
pub fn encoded_in_cube(chart: &ChartConfig, cube: &CubeConfig) -> Vec<ComponentId> {
    let arity = join_arity(&chart.cubes);
    chart
        .fields
        .values()
        .filter_map(|f| cube_component_id(cube, f.component_id.as_str(), arity))
        .collect()
}

/// Drop filters on encoded dimensions and give every other key dimension
/// of each cube a single-value filter on its first value
pub fn refresh_filters(chart: &mut ChartConfig, components: &Components) {
    let encoded: Vec<Vec<ComponentId>> = chart
        .cubes
        .iter()
        .map(|cube| encoded_in_cube(chart, cube))
        .collect();

    for (cube, encoded) in chart.cubes.iter_mut().zip(encoded) {
        cube.filters.retain(|id, _| !encoded.contains(id));

        for dimension in components
            .dimensions
            .iter()
            .filter(|d| d.cube_iri == cube.iri && d.is_key_dimension)
        {
            if cube.filters.contains_key(dimension.id.as_str()) || encoded.contains(&dimension.id) {
                continue;
            }
            if let Some(first) = dimension.values.first() {
                cube.filters
                    .insert(dimension.id.clone(), FilterValue::single(first.value.clone()));
            }
        }
    }
}

/// Interactive filter capabilities derived from the chart's encoding
///
/// Settings of `previous` survive when their component is still the one
/// the capability binds to.
#[must_use]
pub fn derive_interactive_config(
    chart: &ChartConfig,
    view: &Components,
    previous: &InteractiveFiltersConfig,
) -> InteractiveFiltersConfig {
    let schema = chart_schema(chart.chart_type);
    let mut config = InteractiveFiltersConfig::default();

    let segment = schema
        .has_segment()
        .then(|| chart.segment_component().cloned())
        .flatten();
    if let Some(segment) = segment {
        config.legend.active = previous.legend.active;
        config.legend.component_id = Some(segment);
        config.calculation = previous.calculation;
    }

    let temporal_x = chart
        .field(EncodingSlot::X)
        .map(|f| &f.component_id)
        .filter(|id| view.kind_of(id.as_str()) == Some(ComponentKind::Dimension(DimensionKind::Temporal)));
    if let Some(x) = temporal_x {
        config.time_range.component_id = Some(x.clone());
        if previous.time_range.component_id.as_ref() == Some(x) {
            config.time_range.active = previous.time_range.active;
            config.time_range.presets = previous.time_range.presets.clone();
        }
    }

    config.data_filters.component_ids = previous
        .data_filters
        .component_ids
        .iter()
        .filter(|id| view.dimension(id.as_str()).is_some() && !chart.is_encoded(id.as_str()))
        .cloned()
        .collect();
    config.data_filters.active =
        previous.data_filters.active && !config.data_filters.component_ids.is_empty();

    config
}

/// Clear options the slot does not support and fill slot defaults
pub fn normalize_field(field: &mut FieldConfig, spec: &EncodingSpec, chart_type: ChartType) {
    if !spec.supports(FieldOption::Sorting) {
        field.sorting = None;
    }
    if spec.supports(FieldOption::SegmentKind) {
        field.segment_kind.get_or_insert(SegmentKind::Stacked);
    } else {
        field.segment_kind = None;
    }
    if spec.supports(FieldOption::Imputation) {
        if chart_type == ChartType::Area {
            field.imputation_type.get_or_insert(ImputationType::None);
        }
    } else {
        field.imputation_type = None;
    }
    if !spec.supports(FieldOption::ShowValues) {
        field.show_values = None;
    }
    if !spec.supports(FieldOption::ColorMapping) {
        field.color_mapping = None;
    }
    if !spec.supports(FieldOption::Abbreviations) {
        field.use_abbreviations = None;
    }
}

/// Bind every unbound required slot to a default component
pub fn fill_required_fields(chart: &mut ChartConfig, view: &Components) {
    let schema = chart_schema(chart.chart_type);
    for spec in schema.encodings.iter().filter(|e| e.required) {
        if chart.fields.contains_key(&spec.slot) {
            continue;
        }
        let used: Vec<ComponentId> = chart.fields.values().map(|f| f.component_id.clone()).collect();
        if let Some(id) = pick_component(spec, view, &used) {
            let mut field = FieldConfig::new(id);
            normalize_field(&mut field, spec, chart.chart_type);
            chart.fields.insert(spec.slot, field);
        }
    }
}

/// Fresh chart of `chart_type` over one cube
#[must_use]
pub fn init_chart_config_with_type(
    cube_iri: &str,
    chart_type: ChartType,
    components: &Components,
) -> Option<ChartConfig> {
    let cube_components = components.for_cube(cube_iri);
    let schema = chart_schema(chart_type);
    let bindings = default_bindings(schema, &cube_components)?;

    let mut chart = ChartConfig::new(chart_type, vec![CubeConfig::new(cube_iri)]);
    for (slot, id) in bindings {
        let mut field = FieldConfig::new(id);
        if let Some(spec) = schema.encoding(slot) {
            normalize_field(&mut field, spec, chart_type);
        }
        chart.fields.insert(slot, field);
    }
    refresh_filters(&mut chart, &cube_components);
    chart.interactive_filters_config =
        derive_interactive_config(&chart, &cube_components, &InteractiveFiltersConfig::default());
    Some(chart)
}

/// Fresh chart over one cube, using the first chart type its components allow
#[must_use]
pub fn init_chart_config(cube_iri: &str, components: &Components) -> Option<ChartConfig> {
    let cube_components = components.for_cube(cube_iri);
    let chart_type = *possible_chart_types(&cube_components).first()?;
    init_chart_config_with_type(cube_iri, chart_type, components)
}

/// The chart re-encoded as `chart_type`
///
/// Fields whose slot exists in the new type and whose component it accepts
/// are kept; required slots are otherwise filled from the remaining fields
/// or the catalogue. Filters on dimensions that stay unencoded are kept,
/// interactive capabilities without an analogue are dropped.
#[must_use]
pub fn change_chart_type(
    chart: &ChartConfig,
    chart_type: ChartType,
    components: &Components,
) -> Option<ChartConfig> {
    if chart.chart_type == chart_type {
        return Some(chart.clone());
    }
    let view = chart_components(chart, components);
    if !possible_chart_types(&view).contains(&chart_type) {
        return None;
    }

    let schema = chart_schema(chart_type);
    let accepted = |spec: &EncodingSpec, id: &ComponentId| {
        view.kind_of(id.as_str()).is_some_and(|k| spec.accepts(k))
    };

    let mut fields = Fields::new();
    let mut used: Vec<ComponentId> = Vec::new();
    for spec in schema.encodings {
        let same_slot = chart
            .field(spec.slot)
            .filter(|f| accepted(spec, &f.component_id) && !used.contains(&f.component_id))
            .cloned();
        let carried = same_slot.or_else(|| {
            if !spec.required {
                return None;
            }
            chart
                .fields
                .values()
                .find(|f| accepted(spec, &f.component_id) && !used.contains(&f.component_id))
                .map(|f| FieldConfig::new(f.component_id.clone()))
        });
        let field = carried.or_else(|| {
            spec.required
                .then(|| pick_component(spec, &view, &used).map(FieldConfig::new))
                .flatten()
        });

        if let Some(mut field) = field {
            normalize_field(&mut field, spec, chart_type);
            used.push(field.component_id.clone());
            fields.insert(spec.slot, field);
        }
    }

    let mut next = chart.clone();
    next.chart_type = chart_type;
    next.fields = fields;
    next.active_field = None;
    refresh_filters(&mut next, components);
    next.interactive_filters_config =
        derive_interactive_config(&next, &view, &chart.interactive_filters_config);
    Some(next)
}

fn rekey(id: &mut ComponentId, map: impl Fn(&ComponentId) -> Option<ComponentId>) {
    if let Some(new) = map(id) {
        *id = new;
    }
}

/// Apply `map` to every component id a field or interactive filter holds
fn rekey_chart(chart: &mut ChartConfig, map: impl Fn(&ComponentId) -> Option<ComponentId>) {
    for field in chart.fields.values_mut() {
        rekey(&mut field.component_id, &map);
    }
    let config = &mut chart.interactive_filters_config;
    if let Some(id) = config.legend.component_id.as_mut() {
        rekey(id, &map);
    }
    if let Some(id) = config.time_range.component_id.as_mut() {
        rekey(id, &map);
    }
    for id in &mut config.data_filters.component_ids {
        rekey(id, &map);
    }
}

/// Join another cube into the chart
///
/// `join_by` lists the new cube's dimensions, positionally matched with the
/// existing join list. A chart with a single cube takes its list from
/// `existing_join_by`. Fields bound to a joined dimension move to its
/// placeholder.
#[must_use]
pub fn add_dataset(
    chart: &ChartConfig,
    iri: &str,
    join_by: &[ComponentId],
    existing_join_by: Option<&[ComponentId]>,
    components: &Components,
) -> Option<ChartConfig> {
    if join_by.is_empty() || chart.cube(iri).is_some() || chart.cubes.is_empty() {
        return None;
    }

    let mut next = chart.clone();
    if next.cubes.len() == 1 {
        let existing = existing_join_by?;
        if existing.len() != join_by.len() {
            return None;
        }
        next.cubes[0].join_by = Some(existing.to_vec());
    } else if check_join_arity(&next.cubes).ok()? != join_by.len() {
        return None;
    }
    next.cubes
        .push(CubeConfig::new(iri).with_join_by(join_by.iter().cloned()));

    let cubes = next.cubes.clone();
    rekey_chart(&mut next, |id| {
        if is_join_by_component_id(id.as_str()) {
            return None;
        }
        cubes
            .iter()
            .find_map(|c| c.join_position(id.as_str()))
            .map(join_by_component_id)
    });

    let view = chart_components(&next, components);
    refresh_filters(&mut next, components);
    let previous = next.interactive_filters_config.clone();
    next.interactive_filters_config = derive_interactive_config(&next, &view, &previous);
    Some(next)
}

/// Remove a cube from a joined chart
///
/// When a single cube remains its join list is dropped and placeholders
/// resolve back to its own dimensions. Fields bound to components of the
/// removed cube are dropped and required slots refilled.
#[must_use]
pub fn remove_dataset(
    chart: &ChartConfig,
    iri: &str,
    components: &Components,
) -> Option<ChartConfig> {
    if chart.cubes.len() < 2 || chart.cube(iri).is_none() {
        return None;
    }

    let mut next = chart.clone();
    next.cubes.retain(|c| c.iri != iri);

    if next.cubes.len() == 1 {
        let remaining = next.cubes[0].clone();
        rekey_chart(&mut next, |id| {
            let i = join_by_index(id.as_str())?;
            remaining.join_by().get(i).cloned()
        });
        next.cubes[0].join_by = None;
    }

    let removed = components.for_cube(iri);
    let kept: Components = next
        .cubes
        .iter()
        .fold(Components::new(), |mut acc, c| {
            acc.extend(components.for_cube(&c.iri));
            acc
        });
    next.fields.retain(|_, f| {
        let id = f.component_id.as_str();
        is_join_by_component_id(id) || !removed.contains(id) || kept.contains(id)
    });

    let view = chart_components(&next, &kept);
    fill_required_fields(&mut next, &view);
    refresh_filters(&mut next, components);
    let previous = next.interactive_filters_config.clone();
    next.interactive_filters_config = derive_interactive_config(&next, &view, &previous);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use viz_model::{Dimension, Measure};

    fn catalogue() -> Components {
        Components::new()
            .with_dimension(Dimension::new("year", "c", DimensionKind::Temporal, ["2020", "2021"]))
            .with_dimension(Dimension::new("canton", "c", DimensionKind::Nominal, ["ZH", "BE"]))
            .with_dimension(Dimension::new("sex", "c", DimensionKind::Nominal, ["f", "m"]))
            .with_measure(Measure::new("amount", "c"))
    }

    #[test]
    fn init_filters_every_unencoded_key_dimension() {
        let chart = init_chart_config("c", &catalogue()).unwrap();
        assert_eq!(chart.chart_type, ChartType::Column);
        assert_eq!(chart.field(EncodingSlot::X).unwrap().component_id.as_str(), "year");
        let filters = &chart.cubes[0].filters;
        assert_eq!(filters.get("canton"), Some(&FilterValue::single("ZH")));
        assert_eq!(filters.get("sex"), Some(&FilterValue::single("f")));
        assert!(filters.get("year").is_none());
        assert_eq!(
            chart.interactive_filters_config.time_range.component_id,
            Some(ComponentId::new("year"))
        );
    }

    #[test]
    fn unknown_cube_cannot_be_initialized() {
        assert!(init_chart_config("other", &catalogue()).is_none());
    }

    #[test]
    fn changing_type_refilters_unencoded_dimensions() {
        let components = catalogue();
        let mut chart = init_chart_config("c", &components).unwrap();
        chart.fields.insert(EncodingSlot::Segment, FieldConfig::new("sex"));
        refresh_filters(&mut chart, &components);
        chart.interactive_filters_config.legend.active = true;
        chart.interactive_filters_config =
            derive_interactive_config(&chart, &components, &chart.interactive_filters_config);
        assert!(chart.interactive_filters_config.legend.active);

        let pie = change_chart_type(&chart, ChartType::Pie, &components).unwrap();
        assert!(pie.field(EncodingSlot::X).is_none());
        assert_eq!(pie.segment_component().map(ComponentId::as_str), Some("sex"));
        // x was year, which now needs a filter
        assert_eq!(pie.cubes[0].filters.get("year"), Some(&FilterValue::single("2020")));
        assert_eq!(pie.cubes[0].filters.get("canton"), Some(&FilterValue::single("ZH")));
        assert!(pie.interactive_filters_config.time_range.component_id.is_none());

        let area = change_chart_type(&chart, ChartType::Area, &components).unwrap();
        assert_eq!(
            area.field(EncodingSlot::Y).unwrap().imputation_type,
            Some(ImputationType::None)
        );
    }

    #[test]
    fn impossible_type_is_rejected() {
        let chart = init_chart_config("c", &catalogue()).unwrap();
        assert!(change_chart_type(&chart, ChartType::Map, &catalogue()).is_none());
    }

    #[test]
    fn add_and_remove_dataset_rekeys_fields() {
        let components = catalogue()
            .with_dimension(Dimension::new("jahr", "d", DimensionKind::Temporal, ["2021"]))
            .with_measure(Measure::new("co2", "d"));
        let chart = init_chart_config("c", &components).unwrap();

        let joined = add_dataset(
            &chart,
            "d",
            &[ComponentId::new("jahr")],
            Some(&[ComponentId::new("year")]),
            &components,
        )
        .unwrap();
        assert_eq!(
            joined.field(EncodingSlot::X).unwrap().component_id.as_str(),
            "joinBy__0"
        );
        assert_eq!(
            joined.interactive_filters_config.time_range.component_id,
            Some(ComponentId::new("joinBy__0"))
        );
        assert!(joined.cubes[1].filters.get("jahr").is_none());

        let single = remove_dataset(&joined, "d", &components).unwrap();
        assert_eq!(single.cubes.len(), 1);
        assert!(single.cubes[0].join_by.is_none());
        assert_eq!(
            single.field(EncodingSlot::X).unwrap().component_id.as_str(),
            "year"
        );
    }

    #[test]
    fn join_list_must_match_arity() {
        let chart = init_chart_config("c", &catalogue()).unwrap();
        assert!(add_dataset(
            &chart,
            "d",
            &[ComponentId::new("a"), ComponentId::new("b")],
            Some(&[ComponentId::new("year")]),
            &catalogue(),
        )
        .is_none());
    }
}
