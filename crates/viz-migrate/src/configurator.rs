//! Configurator state migrations, `1.0.0` to the latest state schema

use crate::context::MigrationContext;
use crate::error::MigrationError;
use crate::table::{as_object, MigrationTable, SyncStep};
use serde_json::{json, Value};
use viz_model::{ChartKey, SchemaVersion, CONFIGURATOR_STATE_VERSION};

/// Name of the configurator state table
pub const CONFIGURATOR_TABLE: &str = "configurator state";

const V1_0_0: SchemaVersion = SchemaVersion::new(1, 0, 0);
const V2_0_0: SchemaVersion = SchemaVersion::new(2, 0, 0);
const V3_0_0: SchemaVersion = SchemaVersion::new(3, 0, 0);
const V3_1_0: SchemaVersion = SchemaVersion::new(3, 1, 0);
const V3_2_0: SchemaVersion = SchemaVersion::new(3, 2, 0);

/// Build the configurator state table
pub fn build_configurator_table() -> Result<MigrationTable, MigrationError> {
    MigrationTable::new(
        CONFIGURATOR_TABLE,
        CONFIGURATOR_STATE_VERSION,
        vec![
            Box::new(SyncStep::new(V1_0_0, V2_0_0, single_chart_to_list)),
            Box::new(SyncStep::new(V2_0_0, V3_0_0, add_layout)),
            Box::new(SyncStep::new(V3_0_0, V3_1_0, add_dashboard_filters)),
            Box::new(SyncStep::new(V3_1_0, V3_2_0, add_data_source)),
        ],
    )
}

fn is_chart_bearing(doc: &Value) -> bool {
    matches!(
        doc.get("state").and_then(Value::as_str),
        Some("CONFIGURING_CHART" | "LAYOUTING" | "PUBLISHING")
    )
}

fn single_chart_to_list(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    let obj = as_object(&mut doc, CONFIGURATOR_TABLE, V1_0_0)?;
    obj.remove("dataSet");
    // Step name used before chart configuration was its own step
    if obj.get("state").and_then(Value::as_str) == Some("DESCRIBING_CHART") {
        obj.insert("state".to_string(), json!("CONFIGURING_CHART"));
    }

    let meta = obj.remove("meta");
    let Some(mut chart) = obj.remove("chartConfig") else {
        if is_chart_bearing(&doc) && doc.get("chartConfigs").is_none() {
            return Err(MigrationError::malformed(
                CONFIGURATOR_TABLE,
                V1_0_0,
                "chart-bearing state without chartConfig",
            ));
        }
        return Ok(doc);
    };

    let chart_obj = chart.as_object_mut().ok_or_else(|| {
        MigrationError::malformed(CONFIGURATOR_TABLE, V1_0_0, "chartConfig is not an object")
    })?;
    let key = match chart_obj.get("key") {
        Some(Value::String(key)) => key.clone(),
        _ => ChartKey::generate().as_str().to_string(),
    };
    chart_obj.insert("key".to_string(), json!(key));
    if let Some(meta) = meta {
        chart_obj.entry("meta").or_insert(meta);
    }

    obj.insert("chartConfigs".to_string(), json!([chart]));
    obj.insert("activeChartKey".to_string(), json!(key));
    Ok(doc)
}

fn chart_keys(doc: &Value) -> Vec<Value> {
    doc.get("chartConfigs")
        .and_then(Value::as_array)
        .map(|charts| {
            charts
                .iter()
                .filter_map(|c| c.get("key").cloned())
                .collect()
        })
        .unwrap_or_default()
}

fn add_layout(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    if !is_chart_bearing(&doc) {
        return Ok(doc);
    }
    let blocks: Vec<Value> = chart_keys(&doc)
        .into_iter()
        .map(|key| json!({ "type": "chart", "key": key }))
        .collect();
    let obj = as_object(&mut doc, CONFIGURATOR_TABLE, V2_0_0)?;
    obj.entry("layout")
        .or_insert_with(|| json!({ "type": "tab", "blocks": blocks }));
    Ok(doc)
}

fn add_dashboard_filters(mut doc: Value, _: &MigrationContext) -> Result<Value, MigrationError> {
    if !is_chart_bearing(&doc) {
        return Ok(doc);
    }
    let obj = as_object(&mut doc, CONFIGURATOR_TABLE, V3_0_0)?;
    obj.entry("dashboardFilters").or_insert_with(|| {
        json!({
            "timeRange": {
                "active": false,
                "timeUnit": "",
                "presets": { "from": "", "to": "" }
            },
            "dataFilters": { "componentIds": [], "filters": {} }
        })
    });
    Ok(doc)
}

fn add_data_source(mut doc: Value, ctx: &MigrationContext) -> Result<Value, MigrationError> {
    let needs_source = doc.get("state").and_then(Value::as_str) != Some("INITIAL");
    let obj = as_object(&mut doc, CONFIGURATOR_TABLE, V3_1_0)?;

    if needs_source && !obj.contains_key("dataSource") {
        let source = serde_json::to_value(&ctx.default_data_source)?;
        obj.insert("dataSource".to_string(), source);
    }

    if let Some(Value::Array(blocks)) = obj.get_mut("layout").and_then(|l| l.get_mut("blocks")) {
        for block in blocks.iter_mut().filter_map(Value::as_object_mut) {
            block.entry("initialized").or_insert(Value::Bool(true));
        }
    }
    Ok(doc)
}
