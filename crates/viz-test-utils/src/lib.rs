//! Testing utilities for the viz workspace
//!
//! Shared catalogues, charts and persisted documents at every schema version.

#![allow(missing_docs)]

use serde_json::{json, Value};
use viz_model::{
    ChartConfig, ChartKey, ChartType, ComponentId, Components, CubeConfig, Dimension,
    DimensionKind, EncodingSlot, FieldConfig, FilterValue, Filters, Measure,
};

pub const POPULATION_CUBE: &str = "https://example.org/cube/population/1";
pub const POPULATION_CUBE_V2: &str = "https://example.org/cube/population/2";
pub const EMISSIONS_CUBE: &str = "https://example.org/cube/emissions/3";

pub const CHART_KEY: &str = "pop-chart";

/// Every chart config version reachable in the chain, oldest first
pub const CHART_CONFIG_VERSIONS: &[&str] = &[
    "1.0.0", "1.1.0", "2.0.0", "2.1.0", "2.2.0", "3.0.0", "3.1.0", "4.0.0",
];

/// Every configurator state version reachable in the chain, oldest first
pub const CONFIGURATOR_STATE_VERSIONS: &[&str] = &["1.0.0", "2.0.0", "3.0.0", "3.1.0", "3.2.0"];

pub fn single_filters(pairs: &[(&str, &str)]) -> Filters {
    pairs
        .iter()
        .map(|(id, value)| (ComponentId::new(*id), FilterValue::single(*value)))
        .collect()
}

pub fn population_components() -> Components {
    Components::new()
        .with_dimension(Dimension::new(
            "year",
            POPULATION_CUBE,
            DimensionKind::Temporal,
            ["2019", "2020", "2021"],
        ))
        .with_dimension(Dimension::new(
            "canton",
            POPULATION_CUBE,
            DimensionKind::Nominal,
            ["ZH", "BE", "GE"],
        ))
        .with_dimension(Dimension::new(
            "sex",
            POPULATION_CUBE,
            DimensionKind::Nominal,
            ["f", "m"],
        ))
        .with_measure(Measure::new("population", POPULATION_CUBE))
}

pub fn emissions_components() -> Components {
    Components::new()
        .with_dimension(Dimension::new(
            "jahr",
            EMISSIONS_CUBE,
            DimensionKind::Temporal,
            ["2020", "2021", "2022"],
        ))
        .with_dimension(Dimension::new(
            "region",
            EMISSIONS_CUBE,
            DimensionKind::GeoShapes,
            ["CH01", "CH02"],
        ))
        .with_measure(Measure::new("co2", EMISSIONS_CUBE))
}

pub fn joined_components() -> Components {
    let mut components = population_components();
    components.extend(emissions_components());
    components
}

/// Column chart of population by canton, stacked by sex, filtered to 2020
pub fn population_chart() -> ChartConfig {
    let mut chart = ChartConfig::new(
        ChartType::Column,
        vec![CubeConfig::new(POPULATION_CUBE).with_filters(single_filters(&[("year", "2020")]))],
    );
    chart.key = ChartKey::new(CHART_KEY);
    chart.fields.insert(EncodingSlot::X, FieldConfig::new("canton"));
    chart.fields.insert(EncodingSlot::Y, FieldConfig::new("population"));
    chart.fields.insert(EncodingSlot::Segment, FieldConfig::new("sex"));
    chart.interactive_filters_config.legend.component_id = Some(ComponentId::new("sex"));
    chart
}

/// Line chart over both cubes, joined on their temporal dimension
pub fn joined_chart() -> ChartConfig {
    let mut chart = ChartConfig::new(
        ChartType::Line,
        vec![
            CubeConfig::new(POPULATION_CUBE)
                .with_filters(single_filters(&[("year", "2020"), ("canton", "ZH")]))
                .with_join_by(["year"]),
            CubeConfig::new(EMISSIONS_CUBE)
                .with_filters(single_filters(&[("jahr", "2020"), ("region", "CH01")]))
                .with_join_by(["jahr"]),
        ],
    );
    chart.key = ChartKey::new("joined-chart");
    chart.fields.insert(EncodingSlot::X, FieldConfig::new("joinBy__0"));
    chart.fields.insert(EncodingSlot::Y, FieldConfig::new("population"));
    chart
}

fn filters_v1() -> Value {
    json!({ "year": { "type": "single", "value": "2020" } })
}

fn fields_with_iris() -> Value {
    json!({
        "x": {
            "componentIri": "canton",
            "sorting": { "sortingType": "byDimensionLabel", "sortingOrder": "asc" }
        },
        "y": { "componentIri": "population" },
        "segment": { "componentIri": "sex", "type": "stacked" }
    })
}

fn fields_with_ids() -> Value {
    json!({
        "x": {
            "componentId": "canton",
            "sorting": { "sortingType": "byDimensionLabel", "sortingOrder": "asc" }
        },
        "y": { "componentId": "population" },
        "segment": { "componentId": "sex", "type": "stacked" }
    })
}

fn interactive_with_iris() -> Value {
    json!({
        "legend": { "active": false, "componentIri": "sex" },
        "timeRange": { "active": false, "componentIri": "", "presets": { "from": "", "to": "" } },
        "dataFilters": { "active": true, "componentIris": ["year"] }
    })
}

fn interactive_with_ids(calculation: bool) -> Value {
    let mut config = json!({
        "legend": { "active": false, "componentId": "sex" },
        "timeRange": { "active": false, "presets": { "from": "", "to": "" } },
        "dataFilters": { "active": true, "componentIds": ["year"] }
    });
    if calculation {
        config["calculation"] = json!({ "active": false, "type": "identity" });
    }
    config
}

/// The population chart persisted at `version`
pub fn chart_config_at(version: &str) -> Option<Value> {
    let doc = match version {
        "1.0.0" => json!({
            "chartType": "column",
            "dataSet": POPULATION_CUBE,
            "filters": filters_v1(),
            "fields": fields_with_iris()
        }),
        "1.1.0" => json!({
            "version": "1.1.0",
            "chartType": "column",
            "dataSet": POPULATION_CUBE,
            "filters": filters_v1(),
            "fields": fields_with_iris(),
            "interactiveFiltersConfig": interactive_with_iris()
        }),
        "2.0.0" => json!({
            "version": "2.0.0",
            "chartType": "column",
            "cubes": [{ "iri": POPULATION_CUBE, "filters": filters_v1() }],
            "fields": fields_with_iris(),
            "interactiveFiltersConfig": interactive_with_iris()
        }),
        "2.1.0" => json!({
            "version": "2.1.0",
            "chartType": "column",
            "cubes": [{
                "iri": POPULATION_CUBE,
                "publishIri": POPULATION_CUBE,
                "filters": filters_v1()
            }],
            "fields": fields_with_iris(),
            "interactiveFiltersConfig": interactive_with_iris()
        }),
        "2.2.0" => json!({
            "version": "2.2.0",
            "key": CHART_KEY,
            "chartType": "column",
            "cubes": [{
                "iri": POPULATION_CUBE,
                "publishIri": POPULATION_CUBE,
                "filters": filters_v1()
            }],
            "fields": fields_with_iris(),
            "interactiveFiltersConfig": interactive_with_iris(),
            "annotations": [],
            "activeField": null
        }),
        "3.0.0" | "3.1.0" => json!({
            "version": version,
            "key": CHART_KEY,
            "chartType": "column",
            "cubes": [{
                "iri": POPULATION_CUBE,
                "publishIri": POPULATION_CUBE,
                "filters": filters_v1(),
                "joinBy": null
            }],
            "fields": fields_with_ids(),
            "interactiveFiltersConfig": interactive_with_ids(version == "3.1.0"),
            "annotations": [],
            "activeField": null
        }),
        "4.0.0" => json!({
            "version": "4.0.0",
            "key": CHART_KEY,
            "chartType": "column",
            "cubes": [{
                "iri": POPULATION_CUBE,
                "publishIri": POPULATION_CUBE,
                "filters": filters_v1()
            }],
            "fields": fields_with_ids(),
            "interactiveFiltersConfig": interactive_with_ids(true),
            "annotations": [],
            "activeField": null
        }),
        _ => return None,
    };
    Some(doc)
}

fn chart_version_for_state(version: &str) -> &'static str {
    match version {
        "1.0.0" => "1.0.0",
        "2.0.0" => "2.1.0",
        "3.0.0" => "3.0.0",
        "3.1.0" => "3.1.0",
        _ => "4.0.0",
    }
}

/// A configuring-chart state persisted at `version`, embedding the
/// population chart at the chart version current at that time
pub fn configurator_state_at(version: &str) -> Option<Value> {
    let chart = chart_config_at(chart_version_for_state(version))?;
    let mut keyed_chart = chart.clone();
    keyed_chart["key"] = json!(CHART_KEY);

    let layout = json!({ "type": "tab", "blocks": [{ "type": "chart", "key": CHART_KEY }] });
    let dashboard_filters = json!({
        "timeRange": { "active": false, "timeUnit": "", "presets": { "from": "", "to": "" } },
        "dataFilters": { "componentIds": [], "filters": {} }
    });

    let doc = match version {
        "1.0.0" => json!({
            "state": "CONFIGURING_CHART",
            "dataSet": POPULATION_CUBE,
            "meta": { "title": { "en": "Population" } },
            "chartConfig": chart
        }),
        "2.0.0" => json!({
            "version": "2.0.0",
            "state": "CONFIGURING_CHART",
            "chartConfigs": [keyed_chart],
            "activeChartKey": CHART_KEY
        }),
        "3.0.0" => json!({
            "version": "3.0.0",
            "state": "LAYOUTING",
            "chartConfigs": [keyed_chart],
            "activeChartKey": CHART_KEY,
            "layout": layout
        }),
        "3.1.0" => json!({
            "version": "3.1.0",
            "state": "LAYOUTING",
            "chartConfigs": [keyed_chart],
            "activeChartKey": CHART_KEY,
            "layout": layout,
            "dashboardFilters": dashboard_filters
        }),
        "3.2.0" => json!({
            "version": "3.2.0",
            "state": "PUBLISHING",
            "dataSource": { "type": "sparql", "url": "https://example.org/query" },
            "chartConfigs": [keyed_chart],
            "activeChartKey": CHART_KEY,
            "layout": {
                "type": "tab",
                "blocks": [{ "type": "chart", "key": CHART_KEY, "initialized": true }]
            },
            "dashboardFilters": dashboard_filters
        }),
        _ => return None,
    };
    Some(doc)
}
