//! Chart config migrations, `1.0.0` to the latest chart schema

use crate::context::MigrationContext;
use crate::error::MigrationError;
use crate::table::{as_object, Migration, MigrationTable, SyncStep};
use async_trait::async_trait;
use futures::future::try_join_all;
use serde_json::{json, Map, Value};
use viz_model::{ChartKey, SchemaVersion, CHART_CONFIG_VERSION};

/// Name of the chart config table
pub const CHART_TABLE: &str = "chart config";

const V1_0_0: SchemaVersion = SchemaVersion::new(1, 0, 0);
const V1_1_0: SchemaVersion = SchemaVersion::new(1, 1, 0);
const V2_0_0: SchemaVersion = SchemaVersion::new(2, 0, 0);
const V2_1_0: SchemaVersion = SchemaVersion::new(2, 1, 0);
const V2_2_0: SchemaVersion = SchemaVersion::new(2, 2, 0);
const V3_0_0: SchemaVersion = SchemaVersion::new(3, 0, 0);
const V3_1_0: SchemaVersion = SchemaVersion::new(3, 1, 0);
const V4_0_0: SchemaVersion = SchemaVersion::new(4, 0, 0);

/// Build the chart config table
pub fn build_chart_table() -> Result<MigrationTable, MigrationError> {
    MigrationTable::new(
        CHART_TABLE,
        CHART_CONFIG_VERSION,
        vec![
            Box::new(SyncStep::new(V1_0_0, V1_1_0, add_interactive_filters_config)),
            Box::new(SyncStep::new(V1_1_0, V2_0_0, dataset_to_cubes)),
            Box::new(ResolveCubeIdentities),
            Box::new(SyncStep::new(V2_1_0, V2_2_0, add_annotations)),
            Box::new(SyncStep::new(V2_2_0, V3_0_0, iris_to_ids)),
            Box::new(SyncStep::new(V3_0_0, V3_1_0, add_calculation)),
            Box::new(SyncStep::new(V3_1_0, V4_0_0, normalize_join_by)),
        ],
    )
}

fn field_iri(doc: &Map<String, Value>, slot: &str) -> Value {
    doc.get("fields")
        .and_then(|f| f.get(slot))
        .and_then(|f| f.get("componentIri"))
        .cloned()
        .unwrap_or_else(|| Value::String(String::new()))
}

fn add_interactive_filters_config(
    mut doc: Value,
    _: &MigrationContext,
) -> Result<Value, MigrationError> {
    let obj = as_object(&mut doc, CHART_TABLE, V1_0_0)?;
    if !obj.contains_key("interactiveFiltersConfig") {
        let legend = field_iri(obj, "segment");
        let time = field_iri(obj, "x");
        obj.insert(
            "interactiveFiltersConfig".to_string(),
            json!({
                "legend": { "active": false, "componentIri": legend },
                "timeRange": {
                    "active": false,
                    "componentIri": time,
                    "presets": { "from": "", "to": "" }
                },
                "dataFilters": { "active": false, "componentIris": [] }
            }),
        );
    }
    Ok(doc)
}

fn dataset_to_cubes(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    let obj = as_object(&mut doc, CHART_TABLE, V1_1_0)?;
    let iri = match obj.remove("dataSet") {
        Some(Value::String(iri)) => iri,
        _ => {
            return Err(MigrationError::malformed(
                CHART_TABLE,
                V1_1_0,
                "missing dataSet",
            ))
        }
    };
    let filters = match obj.remove("filters") {
        Some(filters @ Value::Object(_)) => filters,
        _ => json!({}),
    };
    obj.insert("cubes".to_string(), json!([{ "iri": iri, "filters": filters }]));
    Ok(doc)
}

/// Replaces every cube identity by its latest canonical identity
#[derive(Debug, Clone, Copy)]
struct ResolveCubeIdentities;

#[async_trait]
impl Migration for ResolveCubeIdentities {
    fn from_version(&self) -> SchemaVersion {
        V2_0_0
    }

    fn to_version(&self) -> SchemaVersion {
        V2_1_0
    }

    async fn up(&self, mut doc: Value, ctx: &MigrationContext) -> Result<Value, MigrationError> {
        let obj = as_object(&mut doc, CHART_TABLE, V2_0_0)?;
        let Some(Value::Array(cubes)) = obj.get_mut("cubes") else {
            return Err(MigrationError::malformed(CHART_TABLE, V2_0_0, "missing cubes"));
        };

        let mut iris = Vec::with_capacity(cubes.len());
        for cube in cubes.iter() {
            match cube.get("iri") {
                Some(Value::String(iri)) => iris.push(iri.clone()),
                _ => {
                    return Err(MigrationError::malformed(
                        CHART_TABLE,
                        V2_0_0,
                        "cube without iri",
                    ))
                }
            }
        }

        let latest = try_join_all(iris.iter().map(|iri| ctx.resolver.latest_iri(iri))).await?;

        for ((cube, original), latest) in cubes.iter_mut().zip(iris).zip(latest) {
            if let Some(cube) = cube.as_object_mut() {
                cube.insert("publishIri".to_string(), Value::String(original));
                cube.insert("iri".to_string(), Value::String(latest));
            }
        }
        Ok(doc)
    }
}

fn add_annotations(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    let obj = as_object(&mut doc, CHART_TABLE, V2_1_0)?;
    obj.entry("annotations").or_insert_with(|| json!([]));
    obj.entry("activeField").or_insert(Value::Null);
    obj.entry("key")
        .or_insert_with(|| Value::String(ChartKey::generate().as_str().to_string()));
    Ok(doc)
}

/// Rename `componentIri(s)` keys to `componentId(s)`, recursively
pub(crate) fn rename_iri_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let renamed: Map<String, Value> = std::mem::take(map)
                .into_iter()
                .map(|(k, mut v)| {
                    rename_iri_keys(&mut v);
                    let k = match k.as_str() {
                        "componentIri" => "componentId".to_string(),
                        "componentIris" => "componentIds".to_string(),
                        _ => k,
                    };
                    (k, v)
                })
                .collect();
            *map = renamed;
        }
        Value::Array(items) => items.iter_mut().for_each(rename_iri_keys),
        _ => {}
    }
}

fn iris_to_ids(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    let obj = as_object(&mut doc, CHART_TABLE, V2_2_0)?;
    for key in ["fields", "interactiveFiltersConfig", "annotations"] {
        if let Some(value) = obj.get_mut(key) {
            rename_iri_keys(value);
        }
    }

    // Unbound legend/time range used to carry an empty iri
    if let Some(Value::Object(config)) = obj.get_mut("interactiveFiltersConfig") {
        for name in ["legend", "timeRange"] {
            if let Some(Value::Object(section)) = config.get_mut(name) {
                if section.get("componentId").and_then(Value::as_str) == Some("") {
                    section.remove("componentId");
                }
            }
        }
    }
    Ok(doc)
}

fn add_calculation(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    let obj = as_object(&mut doc, CHART_TABLE, V3_0_0)?;
    let config = obj
        .entry("interactiveFiltersConfig")
        .or_insert_with(|| json!({}));
    if let Value::Object(config) = config {
        config
            .entry("calculation")
            .or_insert_with(|| json!({ "active": false, "type": "identity" }));
    }
    Ok(doc)
}

fn normalize_join_by(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    let obj = as_object(&mut doc, CHART_TABLE, V3_1_0)?;

    if let Some(Value::Array(cubes)) = obj.get_mut("cubes") {
        for cube in cubes.iter_mut().filter_map(Value::as_object_mut) {
            match cube.remove("joinBy") {
                Some(Value::String(id)) => {
                    cube.insert("joinBy".to_string(), json!([id]));
                }
                Some(list @ Value::Array(_)) => {
                    cube.insert("joinBy".to_string(), list);
                }
                _ => {}
            }
        }
    }

    if obj.get("chartType").and_then(Value::as_str) == Some("area") {
        if let Some(Value::Object(y)) = obj.get_mut("fields").and_then(|f| f.get_mut("y")) {
            y.entry("imputationType")
                .or_insert_with(|| Value::String("none".to_string()));
        }
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renames_nested_iri_keys() {
        let mut value = json!({
            "x": { "componentIri": "year" },
            "dataFilters": { "componentIris": ["a"], "nested": [{ "componentIri": "b" }] }
        });
        rename_iri_keys(&mut value);
        assert_eq!(
            value,
            json!({
                "x": { "componentId": "year" },
                "dataFilters": { "componentIds": ["a"], "nested": [{ "componentId": "b" }] }
            })
        );
    }

    #[test]
    fn dataset_without_iri_is_malformed() {
        let err = dataset_to_cubes(json!({"filters": {}}), &MigrationContext::default())
            .unwrap_err();
        assert!(matches!(err, MigrationError::Malformed { .. }));
    }

    #[test]
    fn join_by_string_becomes_list() {
        let doc = json!({
            "chartType": "area",
            "fields": { "y": { "componentId": "m" } },
            "cubes": [
                { "iri": "a", "joinBy": "year" },
                { "iri": "b", "joinBy": null },
                { "iri": "c", "joinBy": ["y1", "y2"] }
            ]
        });
        let out = normalize_join_by(doc, &MigrationContext::default()).unwrap();
        assert_eq!(out["cubes"][0]["joinBy"], json!(["year"]));
        assert!(out["cubes"][1].get("joinBy").is_none());
        assert_eq!(out["cubes"][2]["joinBy"], json!(["y1", "y2"]));
        assert_eq!(out["fields"]["y"]["imputationType"], "none");
    }

    #[test]
    fn chart_table_is_complete() {
        let table = build_chart_table().unwrap();
        assert_eq!(table.versions().len(), 8);
        assert_eq!(table.latest(), CHART_CONFIG_VERSION);
    }
}
