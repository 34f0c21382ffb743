//! Per-cube query inputs for the observation-fetching layer

use crate::grouping::prepare_filters;
use indexmap::IndexSet;
use serde::Serialize;
use viz_model::{ChartConfig, ComponentId, Components, Filters};

/// What the observation layer needs to query one cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeQuery {
    /// Cube identity
    pub iri: String,
    /// Components to fetch, cube-local ids
    pub component_ids: Vec<ComponentId>,
    /// Effective filters, cube-local ids
    pub filters: Filters,
    /// Join list, when the chart is joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_by: Option<Vec<ComponentId>>,
}

/// Build one query per cube of the chart
///
/// Editor filters come first; interactive values (keyed by logical ids)
/// override them on the cube's own dimension. Interactive values no cube
/// can address are dropped.
#[must_use]
pub fn prepare_cube_queries(
    chart: &ChartConfig,
    interactive: &Filters,
    components: &Components,
) -> Vec<CubeQuery> {
    let prepared = prepare_filters(chart, interactive, components);

    chart
        .cubes
        .iter()
        .zip(prepared)
        .map(|(cube, prepared)| {
            let mut filters = cube.filters.clone();
            for (id, value) in prepared.interactive_filters {
                filters.insert(id, value);
            }

            let mut component_ids: IndexSet<ComponentId> = IndexSet::new();
            for field in chart.fields.values() {
                if let Some(local) = prepared.component_id_resolution.get(&field.component_id) {
                    component_ids.insert(local.clone());
                }
            }
            component_ids.extend(cube.join_by().iter().cloned());
            component_ids.extend(filters.keys().cloned());

            CubeQuery {
                iri: cube.iri.clone(),
                component_ids: component_ids.into_iter().collect(),
                filters,
                join_by: cube.join_by.clone().filter(|_| chart.is_joined()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use viz_model::{
        ChartType, CubeConfig, Dimension, DimensionKind, EncodingSlot, FieldConfig, FilterValue,
        Measure,
    };

    fn chart() -> (ChartConfig, Components) {
        let mut chart = ChartConfig::new(
            ChartType::Line,
            vec![
                CubeConfig::new("a").with_join_by(["year_a"]),
                CubeConfig::new("b")
                    .with_join_by(["year_b"])
                    .with_filters(
                        [(ComponentId::new("sex"), FilterValue::single("f"))]
                            .into_iter()
                            .collect(),
                    ),
            ],
        );
        chart.fields.insert(EncodingSlot::X, FieldConfig::new("joinBy__0"));
        chart.fields.insert(EncodingSlot::Y, FieldConfig::new("amount_a"));

        let components = Components::new()
            .with_dimension(Dimension::new("year_a", "a", DimensionKind::Temporal, ["2020"]))
            .with_dimension(Dimension::new("year_b", "b", DimensionKind::Temporal, ["2020"]))
            .with_dimension(Dimension::new("sex", "b", DimensionKind::Nominal, ["f", "m"]))
            .with_measure(Measure::new("amount_a", "a"));
        (chart, components)
    }

    #[test]
    fn translates_placeholders_per_cube() {
        let (chart, components) = chart();
        let interactive: Filters = [(ComponentId::new("joinBy__0"), FilterValue::single("2020"))]
            .into_iter()
            .collect();

        let queries = prepare_cube_queries(&chart, &interactive, &components);
        assert_eq!(queries.len(), 2);

        assert_eq!(queries[0].iri, "a");
        assert_eq!(
            queries[0].component_ids,
            vec![ComponentId::new("year_a"), ComponentId::new("amount_a")]
        );
        assert_eq!(queries[0].filters.get("year_a"), Some(&FilterValue::single("2020")));

        assert_eq!(queries[1].filters.get("year_b"), Some(&FilterValue::single("2020")));
        assert_eq!(queries[1].filters.get("sex"), Some(&FilterValue::single("f")));
        assert!(!queries[1].component_ids.contains(&ComponentId::new("amount_a")));
    }

    #[test]
    fn interactive_value_overrides_editor_filter() {
        let (chart, components) = chart();
        let interactive: Filters = [(ComponentId::new("sex"), FilterValue::single("m"))]
            .into_iter()
            .collect();
        let queries = prepare_cube_queries(&chart, &interactive, &components);
        assert_eq!(queries[1].filters.get("sex"), Some(&FilterValue::single("m")));
        assert!(queries[0].filters.get("sex").is_none());
    }
}
