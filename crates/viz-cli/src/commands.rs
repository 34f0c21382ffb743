//! Subcommand implementations
//!
//! Each command returns the text to print so the binary stays a thin shell.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use viz_core::StudioConfig;
use viz_join::{get_chart_config_filters, FilterOptions};
use viz_migrate::{
    chart_table, configurator_table, IdentityResolver, MigrationContext, Migrator,
    PassthroughResolver, StaticIdentityResolver,
};
use viz_model::{ChartConfig, ChartKey, CHART_CONFIG_VERSION, CONFIGURATOR_STATE_VERSION};

/// Persisted document kinds the CLI understands
enum Document {
    State(Value),
    Chart(Value),
}

impl Document {
    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let doc: Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not JSON", path.display()))?;
        if !doc.is_object() {
            bail!("{} does not hold a JSON object", path.display());
        }
        // configurator states carry their step, chart configs never do
        if doc.get("state").is_some() {
            Ok(Self::State(doc))
        } else {
            Ok(Self::Chart(doc))
        }
    }
}

fn resolver(iri_map: Option<&Path>) -> Result<Arc<dyn IdentityResolver>> {
    let Some(path) = iri_map else {
        return Ok(Arc::new(PassthroughResolver));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let mapping: HashMap<String, String> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not an object of cube identities", path.display()))?;
    info!(entries = mapping.len(), "loaded identity map");
    Ok(Arc::new(StaticIdentityResolver::new(mapping)))
}

fn migrator(config: &StudioConfig, iri_map: Option<&Path>) -> Result<Migrator> {
    let ctx = MigrationContext::new(resolver(iri_map)?)
        .with_default_data_source(config.default_data_source());
    Ok(Migrator::new(ctx))
}

/// Migrate a persisted chart config or configurator state to the latest version
pub(crate) async fn migrate(
    config: &StudioConfig,
    file: &Path,
    iri_map: Option<&Path>,
    pretty: bool,
) -> Result<String> {
    let migrator = migrator(config, iri_map)?;
    let migrated = match Document::read(file)? {
        Document::State(doc) => serde_json::to_value(migrator.migrate_configurator_state(doc).await?)?,
        Document::Chart(doc) => serde_json::to_value(migrator.migrate_chart_config(doc).await?)?,
    };
    let text = if pretty {
        serde_json::to_string_pretty(&migrated)?
    } else {
        serde_json::to_string(&migrated)?
    };
    Ok(text)
}

/// Print the editor filters of one chart
///
/// Without `--joined` filters are keyed by each cube's own ids; with it,
/// join dimensions appear once under their placeholder.
pub(crate) async fn filters(
    config: &StudioConfig,
    file: &Path,
    chart_key: Option<&str>,
    joined: bool,
) -> Result<String> {
    let migrator = migrator(config, None)?;
    let chart = match Document::read(file)? {
        Document::Chart(doc) => migrator.migrate_chart_config(doc).await?,
        Document::State(doc) => {
            let state = migrator.migrate_configurator_state(doc).await?;
            let body = state
                .body()
                .context("configuration has no charts in its current step")?;
            let key = chart_key.map_or_else(|| body.active_chart_key.clone(), ChartKey::new);
            body.chart(&key)
                .cloned()
                .with_context(|| format!("no chart with key {key}"))?
        }
    };
    render_filters(&chart, joined)
}

fn render_filters(chart: &ChartConfig, joined: bool) -> Result<String> {
    let options = if joined {
        FilterOptions::joined()
    } else {
        FilterOptions::native()
    };
    let filters = get_chart_config_filters(&chart.cubes, options);
    Ok(serde_json::to_string_pretty(&filters)?)
}

/// Supported schema versions, oldest first
pub(crate) fn versions() -> Result<String> {
    let chart: Vec<String> = chart_table()?
        .versions()
        .iter()
        .map(ToString::to_string)
        .collect();
    let state: Vec<String> = configurator_table()?
        .versions()
        .iter()
        .map(ToString::to_string)
        .collect();
    Ok(format!(
        "chart config    {CHART_CONFIG_VERSION} (reads {})\nconfigurator    {CONFIGURATOR_STATE_VERSION} (reads {})",
        chart.join(", "),
        state.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use viz_test_utils::{chart_config_at, configurator_state_at, POPULATION_CUBE, POPULATION_CUBE_V2};

    fn file_with(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{value}").unwrap();
        file
    }

    #[tokio::test]
    async fn charts_are_migrated_with_an_identity_map() {
        let chart = file_with(&chart_config_at("1.0.0").unwrap());
        let map = file_with(&serde_json::json!({ POPULATION_CUBE: POPULATION_CUBE_V2 }));

        let out = migrate(&StudioConfig::default(), chart.path(), Some(map.path()), false)
            .await
            .unwrap();
        let migrated: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(migrated["version"], CHART_CONFIG_VERSION.to_string());
        assert_eq!(migrated["cubes"][0]["iri"], POPULATION_CUBE_V2);
    }

    #[tokio::test]
    async fn states_report_their_active_chart_filters() {
        let state = file_with(&configurator_state_at("3.2.0").unwrap());
        let out = filters(&StudioConfig::default(), state.path(), None, false)
            .await
            .unwrap();
        let filters: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(filters["year"]["value"], "2020");

        let missing = filters_for_missing_chart(state.path()).await;
        assert!(missing.is_err());
    }

    async fn filters_for_missing_chart(path: &Path) -> Result<String> {
        filters(&StudioConfig::default(), path, Some("nope"), true).await
    }

    #[test]
    fn versions_list_every_table_entry() {
        let out = versions().unwrap();
        assert!(out.contains("1.0.0"));
        assert!(out.contains(&CONFIGURATOR_STATE_VERSION.to_string()));
    }
}
