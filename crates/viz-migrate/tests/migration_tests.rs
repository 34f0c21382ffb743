use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;
use viz_migrate::{
    chart_table, configurator_table, migrate_chart_config, migrate_chart_config_value,
    migrate_configurator_state, migrate_configurator_state_value, MigrationContext,
    MigrationError, Migrator, StaticIdentityResolver,
};
use viz_model::{
    ChartType, ComponentId, ConfiguratorStep, EncodingSlot, ImputationType, SchemaVersion,
    CHART_CONFIG_VERSION, CONFIGURATOR_STATE_VERSION,
};
use viz_test_utils::{
    chart_config_at, configurator_state_at, CHART_CONFIG_VERSIONS,
    CONFIGURATOR_STATE_VERSIONS, POPULATION_CUBE, POPULATION_CUBE_V2,
};

fn renaming_context() -> MigrationContext {
    MigrationContext::new(Arc::new(
        StaticIdentityResolver::default().with(POPULATION_CUBE, POPULATION_CUBE_V2),
    ))
}

#[test]
fn fixtures_cover_every_table_version() {
    let chart_versions: Vec<String> = chart_table()
        .unwrap()
        .versions()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(chart_versions, CHART_CONFIG_VERSIONS);

    let state_versions: Vec<String> = configurator_table()
        .unwrap()
        .versions()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(state_versions, CONFIGURATOR_STATE_VERSIONS);
}

#[tokio::test]
async fn every_chart_version_reaches_latest() {
    let ctx = MigrationContext::default();
    for version in CHART_CONFIG_VERSIONS {
        let doc = chart_config_at(version).unwrap();
        let chart = migrate_chart_config(doc, &ctx)
            .await
            .unwrap_or_else(|e| panic!("{version}: {e}"));

        assert_eq!(chart.version, CHART_CONFIG_VERSION, "{version}");
        assert_eq!(chart.chart_type, ChartType::Column);
        assert_eq!(chart.cubes.len(), 1);
        assert_eq!(chart.cubes[0].iri, POPULATION_CUBE);
        assert_eq!(
            chart.field(EncodingSlot::Segment).map(|f| f.component_id.as_str()),
            Some("sex"),
            "{version}"
        );
        assert_eq!(
            chart.interactive_filters_config.legend.component_id,
            Some(ComponentId::new("sex"))
        );
        assert!(chart.cubes[0].filters.contains_key("year"));
    }
}

#[tokio::test]
async fn every_state_version_reaches_latest() {
    let ctx = MigrationContext::default();
    for version in CONFIGURATOR_STATE_VERSIONS {
        let doc = configurator_state_at(version).unwrap();
        let state = migrate_configurator_state(doc, &ctx)
            .await
            .unwrap_or_else(|e| panic!("{version}: {e}"));

        assert_eq!(state.version(), CONFIGURATOR_STATE_VERSION, "{version}");
        let body = state.body().unwrap();
        body.check_invariants().unwrap();
        assert_eq!(body.chart_configs.len(), 1);
        assert_eq!(body.chart_configs[0].version, CHART_CONFIG_VERSION);
        assert_eq!(body.layout.blocks.len(), 1);
        assert!(body.layout.blocks[0].initialized);
    }
}

fn context(rename: bool) -> MigrationContext {
    if rename {
        renaming_context()
    } else {
        MigrationContext::default()
    }
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn chart_migration_terminates_and_is_idempotent(
        index in 0..CHART_CONFIG_VERSIONS.len(),
        rename in any::<bool>(),
    ) {
        let version = CHART_CONFIG_VERSIONS[index];
        let ctx = context(rename);
        let (once, twice) = block_on(async {
            let once = migrate_chart_config_value(chart_config_at(version).unwrap(), &ctx)
                .await
                .unwrap();
            let twice = migrate_chart_config_value(once.clone(), &ctx).await.unwrap();
            (once, twice)
        });

        prop_assert_eq!(&once["version"], &json!(CHART_CONFIG_VERSION.to_string()));
        prop_assert_eq!(&once, &twice);
        // only documents older than the identity step see the resolver
        let identity_step = SchemaVersion::new(2, 1, 0);
        let renamed = rename && version.parse::<SchemaVersion>().unwrap() < identity_step;
        let expected = if renamed { POPULATION_CUBE_V2 } else { POPULATION_CUBE };
        prop_assert_eq!(&once["cubes"][0]["iri"], &json!(expected));
    }

    #[test]
    fn state_migration_terminates_and_is_idempotent(
        index in 0..CONFIGURATOR_STATE_VERSIONS.len(),
        rename in any::<bool>(),
    ) {
        let version = CONFIGURATOR_STATE_VERSIONS[index];
        let ctx = context(rename);
        let (once, twice) = block_on(async {
            let once =
                migrate_configurator_state_value(configurator_state_at(version).unwrap(), &ctx)
                    .await
                    .unwrap();
            let twice = migrate_configurator_state_value(once.clone(), &ctx)
                .await
                .unwrap();
            (once, twice)
        });

        prop_assert_eq!(&once["version"], &json!(CONFIGURATOR_STATE_VERSION.to_string()));
        prop_assert_eq!(&once, &twice);
    }
}

#[tokio::test]
async fn version_one_state_keeps_meta_on_the_chart() {
    let state = migrate_configurator_state(
        configurator_state_at("1.0.0").unwrap(),
        &MigrationContext::default(),
    )
    .await
    .unwrap();
    assert_eq!(state.step(), ConfiguratorStep::ConfiguringChart);
    let chart = state.body().unwrap().active_chart().unwrap();
    assert_eq!(chart.meta.title.en, "Population");
}

#[tokio::test]
async fn identity_step_records_publish_iri() {
    let chart = migrate_chart_config(chart_config_at("2.0.0").unwrap(), &renaming_context())
        .await
        .unwrap();
    assert_eq!(chart.cubes[0].iri, POPULATION_CUBE_V2);
    assert_eq!(chart.cubes[0].publish_iri.as_deref(), Some(POPULATION_CUBE));

    // Past the identity step the resolver is not consulted
    let chart = migrate_chart_config(chart_config_at("2.1.0").unwrap(), &renaming_context())
        .await
        .unwrap();
    assert_eq!(chart.cubes[0].iri, POPULATION_CUBE);
}

#[tokio::test]
async fn future_version_is_a_gap() {
    let mut doc = configurator_state_at("3.2.0").unwrap();
    doc["version"] = json!("9.0.0");
    let err = migrate_configurator_state(doc, &MigrationContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MigrationError::Gap { .. }));
    assert!(err.to_string().contains("cannot load this configuration"));
}

#[tokio::test]
async fn area_chart_gets_default_imputation() {
    let mut doc = chart_config_at("3.1.0").unwrap();
    doc["chartType"] = json!("area");
    let chart = migrate_chart_config(doc, &MigrationContext::default())
        .await
        .unwrap();
    assert_eq!(
        chart.field(EncodingSlot::Y).and_then(|f| f.imputation_type),
        Some(ImputationType::None)
    );
}

#[tokio::test]
async fn keyed_migrations_return_their_own_result() {
    let migrator = Arc::new(Migrator::new(MigrationContext::default()));

    let inputs: Vec<Value> = CONFIGURATOR_STATE_VERSIONS
        .iter()
        .map(|v| configurator_state_at(v).unwrap())
        .collect();
    let tasks: Vec<_> = inputs
        .into_iter()
        .map(|doc| {
            let migrator = Arc::clone(&migrator);
            tokio::spawn(async move { migrator.migrate_keyed("shared-key", doc).await })
        })
        .collect();

    for task in tasks {
        let state = task.await.unwrap().unwrap();
        assert_eq!(state.version(), CONFIGURATOR_STATE_VERSION);
    }
}

#[tokio::test]
async fn state_without_chart_passes_through() {
    let doc = json!({ "state": "SELECTING_DATASET" });
    let state = migrate_configurator_state(doc, &MigrationContext::default())
        .await
        .unwrap();
    assert_eq!(state.step(), ConfiguratorStep::SelectingDataset);
    assert!(state.data_source().is_some());
    assert!(state.chart_configs().is_empty());
}
