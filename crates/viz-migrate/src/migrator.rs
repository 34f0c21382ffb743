//! Entry points bringing persisted documents to the current schema

use crate::chart::{build_chart_table, CHART_TABLE};
use crate::configurator::{build_configurator_table, CONFIGURATOR_TABLE};
use crate::context::MigrationContext;
use crate::coordinator::MigrationCoordinator;
use crate::error::MigrationError;
use crate::table::{as_object, read_version, MigrationTable};
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::info;
use viz_model::{ChartConfig, ConfiguratorState};

static CHART_MIGRATIONS: Lazy<Result<MigrationTable, MigrationError>> =
    Lazy::new(build_chart_table);

static CONFIGURATOR_MIGRATIONS: Lazy<Result<MigrationTable, MigrationError>> =
    Lazy::new(build_configurator_table);

fn table(
    cell: &'static Lazy<Result<MigrationTable, MigrationError>>,
    name: &'static str,
) -> Result<&'static MigrationTable, MigrationError> {
    cell.as_ref().map_err(|e| MigrationError::IncompleteTable {
        table: name,
        detail: e.to_string(),
    })
}

/// The chart config table, checked on first use
pub fn chart_table() -> Result<&'static MigrationTable, MigrationError> {
    table(&CHART_MIGRATIONS, CHART_TABLE)
}

/// The configurator state table, checked on first use
pub fn configurator_table() -> Result<&'static MigrationTable, MigrationError> {
    table(&CONFIGURATOR_MIGRATIONS, CONFIGURATOR_TABLE)
}

/// Bring a persisted chart config to the latest chart schema
pub async fn migrate_chart_config_value(
    doc: Value,
    ctx: &MigrationContext,
) -> Result<Value, MigrationError> {
    chart_table()?.migrate(doc, ctx).await
}

/// Bring a persisted configurator state to the latest schema,
/// including every chart config it embeds
pub async fn migrate_configurator_state_value(
    doc: Value,
    ctx: &MigrationContext,
) -> Result<Value, MigrationError> {
    let from = read_version(&doc)?;
    let mut doc = configurator_table()?.migrate(doc, ctx).await?;

    let version = read_version(&doc)?;
    let obj = as_object(&mut doc, CONFIGURATOR_TABLE, version)?;
    if let Some(Value::Array(charts)) = obj.get_mut("chartConfigs") {
        for chart in charts.iter_mut() {
            let current = std::mem::take(chart);
            *chart = migrate_chart_config_value(current, ctx).await?;
        }
    }

    if from != version {
        info!(from = %from, to = %version, "Migrated configurator state");
    }
    Ok(doc)
}

/// Typed chart config at the latest schema
pub async fn migrate_chart_config(
    doc: Value,
    ctx: &MigrationContext,
) -> Result<ChartConfig, MigrationError> {
    let value = migrate_chart_config_value(doc, ctx).await?;
    Ok(serde_json::from_value(value)?)
}

/// Typed configurator state at the latest schema
pub async fn migrate_configurator_state(
    doc: Value,
    ctx: &MigrationContext,
) -> Result<ConfiguratorState, MigrationError> {
    let value = migrate_configurator_state_value(doc, ctx).await?;
    Ok(serde_json::from_value(value)?)
}

/// Migration entry point owning its collaborators
///
/// Migrations of the same configuration key are serialized.
#[derive(Debug, Default)]
pub struct Migrator {
    ctx: MigrationContext,
    coordinator: MigrationCoordinator,
}

impl Migrator {
    /// Migrator using `ctx`
    #[must_use]
    pub fn new(ctx: MigrationContext) -> Self {
        Self {
            ctx,
            coordinator: MigrationCoordinator::new(),
        }
    }

    /// Context passed to every step
    #[inline]
    #[must_use]
    pub fn context(&self) -> &MigrationContext {
        &self.ctx
    }

    /// See [`migrate_chart_config`]
    pub async fn migrate_chart_config(&self, doc: Value) -> Result<ChartConfig, MigrationError> {
        migrate_chart_config(doc, &self.ctx).await
    }

    /// See [`migrate_configurator_state`]
    pub async fn migrate_configurator_state(
        &self,
        doc: Value,
    ) -> Result<ConfiguratorState, MigrationError> {
        migrate_configurator_state(doc, &self.ctx).await
    }

    /// Migrate the state stored under `key`, one migration per key at a time
    pub async fn migrate_keyed(
        &self,
        key: &str,
        doc: Value,
    ) -> Result<ConfiguratorState, MigrationError> {
        self.coordinator
            .run(key, || migrate_configurator_state(doc, &self.ctx))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_pass_completeness_check() {
        assert!(chart_table().is_ok());
        assert!(configurator_table().is_ok());
    }
}
