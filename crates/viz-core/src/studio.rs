//! Session orchestration
//!
//! A [`Studio`] ties the pieces together for one editing or viewing
//! session:
//! - Loading: fetch → migrate → fetch metadata → sanitize → admit
//! - Dispatch: checked configurator dispatch, then interactive store sync
//! - Dashboard filters: broadcast to every chart, restore on removal
//! - Saving and removal through the persistence collaborator

use crate::config::StudioConfig;
use crate::error::{PersistenceError, Result, StudioError};
use crate::services::{MetadataService, PersistenceService};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};
use viz_configurator::{sanitize_chart_config, Action, Configurator, UnresolvedReference};
use viz_interactive::{InteractiveFilterStoreRegistry, TimeRange};
use viz_join::{
    group_prepared_filters_by_dimension, prepare_cube_queries, prepare_filters, CubeQuery,
    DimensionGroup,
};
use viz_migrate::{CachedIdentityResolver, IdentityResolver, MigrationContext, Migrator};
use viz_model::{
    ChartConfig, ChartKey, ComponentId, Components, ConfiguratorBody, ConfiguratorState,
    ConfiguratorStep, DataSource, Filters,
};

/// Mutable part of a session
#[derive(Debug, Default)]
struct Session {
    configurator: Configurator,
    key: Option<String>,
    components: Components,
    unresolved: Vec<UnresolvedReference>,
}

/// Dashboard-level side effect of an action on the interactive stores
enum SharedFilterEffect {
    Broadcast,
    Restore(ComponentId),
    Resync,
}

impl SharedFilterEffect {
    fn of(action: &Action) -> Option<Self> {
        match action {
            Action::SetDashboardDataFilter { .. } => Some(Self::Broadcast),
            Action::RemoveDashboardDataFilter { component_id } => {
                Some(Self::Restore(component_id.clone()))
            }
            Action::SetDashboardTimeRange { .. } => Some(Self::Resync),
            _ => None,
        }
    }
}

/// One chart builder session
pub struct Studio {
    persistence: Arc<dyn PersistenceService>,
    metadata: Arc<dyn MetadataService>,
    migrator: Migrator,
    default_data_source: DataSource,
    registry: InteractiveFilterStoreRegistry,
    session: RwLock<Session>,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("migrator", &self.migrator)
            .field("default_data_source", &self.default_data_source)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Session over the given collaborators
    ///
    /// `resolver` is wrapped in a cache bounded by the migration settings.
    #[must_use]
    pub fn new(
        config: &StudioConfig,
        persistence: Arc<dyn PersistenceService>,
        metadata: Arc<dyn MetadataService>,
        resolver: Arc<dyn IdentityResolver>,
    ) -> Self {
        let capacity = config.migration.resolver_cache_capacity;
        let cached = match config.migration.resolver_cache_ttl() {
            Some(ttl) => CachedIdentityResolver::with_ttl(resolver, capacity, ttl),
            None => CachedIdentityResolver::new(resolver, capacity),
        };
        let default_data_source = config.default_data_source();
        let ctx = MigrationContext::new(Arc::new(cached))
            .with_default_data_source(default_data_source.clone());

        Self {
            persistence,
            metadata,
            migrator: Migrator::new(ctx),
            default_data_source,
            registry: InteractiveFilterStoreRegistry::new(),
            session: RwLock::new(Session::default()),
        }
    }

    /// Interactive filter stores of the session's charts
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &InteractiveFilterStoreRegistry {
        &self.registry
    }

    /// Migrator used for loading
    #[inline]
    #[must_use]
    pub fn migrator(&self) -> &Migrator {
        &self.migrator
    }

    /// Begin a new configuration on the default data source
    pub async fn start(&self) -> Result<ConfiguratorStep> {
        let mut session = self.session.write().await;
        *session = Session::default();
        session.configurator.dispatch(Action::SelectDataSource {
            data_source: self.default_data_source.clone(),
        })?;
        self.registry.sync_all(std::iter::empty::<&ChartConfig>());
        info!("started new configuration");
        Ok(session.configurator.step())
    }

    /// Fetch the catalogue of `cube_iris` and remember it for queries
    ///
    /// The returned catalogue is what chart actions must carry.
    pub async fn fetch_components(&self, cube_iris: &[String]) -> Result<Components> {
        let components = self.metadata.fetch_components(cube_iris).await?;
        self.session
            .write()
            .await
            .components
            .extend(components.clone());
        Ok(components)
    }

    /// Load the configuration stored under `key`
    ///
    /// References to components missing from the current metadata are
    /// dropped and available through [`Self::unresolved`].
    #[instrument(skip(self))]
    pub async fn load(&self, key: &str) -> Result<ConfiguratorStep> {
        let stored = self.persistence.get_config(key).await?;
        let mut state = self.migrator.migrate_keyed(key, stored.data).await?;

        let mut iris: Vec<String> = Vec::new();
        for chart in state.chart_configs() {
            for iri in chart.cube_iris() {
                if !iris.contains(&iri) {
                    iris.push(iri);
                }
            }
        }
        let components = if iris.is_empty() {
            Components::new()
        } else {
            self.metadata.fetch_components(&iris).await?
        };

        let mut unresolved = Vec::new();
        if let Some(body) = state.body_mut() {
            let charts = std::mem::take(&mut body.chart_configs);
            body.chart_configs = charts
                .into_iter()
                .map(|chart| {
                    let (chart, found) = sanitize_chart_config(chart, &components);
                    unresolved.extend(found);
                    chart
                })
                .collect();
        }

        let mut session = self.session.write().await;
        *session = Session {
            configurator: Configurator::from_state(state),
            key: Some(key.to_string()),
            components,
            unresolved,
        };
        let state = session.configurator.state();
        self.registry.sync_all(state.chart_configs());
        if let Some(body) = state.body() {
            self.apply_dashboard_filters(body, &chart_keys(body));
        }

        info!(
            key,
            step = %state.step(),
            charts = state.chart_configs().len(),
            unresolved = session.unresolved.len(),
            "loaded configuration"
        );
        Ok(state.step())
    }

    /// Dispatch `action` and bring the interactive stores in line
    ///
    /// Returns whether the configuration changed. Actions not valid in the
    /// current step are rejected with [`StudioError::Configurator`].
    pub async fn dispatch(&self, action: Action) -> Result<bool> {
        let mut session = self.session.write().await;
        let before: HashMap<ChartKey, ChartConfig> = session
            .configurator
            .state()
            .chart_configs()
            .iter()
            .map(|chart| (chart.key.clone(), chart.clone()))
            .collect();
        let effect = SharedFilterEffect::of(&action);
        let name = action.name();

        if !session.configurator.dispatch(action)? {
            debug!(action = name, "action left configuration unchanged");
            return Ok(false);
        }

        let state = session.configurator.state();
        let charts = state.chart_configs();
        let mut segment_changed = false;
        let mut changed = Vec::new();
        for chart in charts {
            match before.get(&chart.key) {
                Some(old) if old == chart => {}
                old => {
                    if let Some(old) = old {
                        segment_changed |= old.segment_component() != chart.segment_component();
                    }
                    self.registry.sync_from_config(chart);
                    changed.push(chart.key.clone());
                }
            }
        }
        for key in self.registry.keys() {
            if !charts.iter().any(|chart| chart.key == key) {
                self.registry.remove(&key);
            }
        }
        if segment_changed {
            self.registry.clear_all_categories();
        }

        if let Some(body) = state.body() {
            let all = chart_keys(body);
            match effect {
                Some(SharedFilterEffect::Broadcast) => self.apply_dashboard_filters(body, &all),
                Some(SharedFilterEffect::Restore(dimension)) => {
                    self.registry.restore(&dimension);
                }
                Some(SharedFilterEffect::Resync) => {
                    self.registry.sync_all(charts);
                    self.apply_dashboard_filters(body, &all);
                }
                None if !changed.is_empty() => self.apply_dashboard_filters(body, &changed),
                None => {}
            }
        }
        Ok(true)
    }

    /// Persist the current configuration as `author`
    ///
    /// Creates a new entry the first time, updates it afterwards. Returns
    /// the storage key.
    pub async fn save(&self, author: &str) -> Result<String> {
        let mut session = self.session.write().await;
        let data = serde_json::to_value(session.configurator.state())
            .map_err(PersistenceError::Serialization)?;
        let stored = match session.key.as_deref() {
            Some(key) => self.persistence.update_config(key, data, author).await?,
            None => self.persistence.create_config(data, author).await?,
        };
        info!(key = %stored.key, author, "saved configuration");
        session.key = Some(stored.key.clone());
        Ok(stored.key)
    }

    /// Remove the configuration stored under `key` as `author`
    ///
    /// The session is reset when it was editing that configuration.
    pub async fn remove(&self, key: &str, author: &str) -> Result<()> {
        self.persistence.remove_config(key, author).await?;
        let mut session = self.session.write().await;
        if session.key.as_deref() == Some(key) {
            *session = Session::default();
            self.registry.sync_all(std::iter::empty::<&ChartConfig>());
        }
        info!(key, "removed configuration");
        Ok(())
    }

    /// Per-cube queries for one chart, honoring its interactive filters
    pub async fn chart_queries(&self, chart_key: &ChartKey) -> Result<Vec<CubeQuery>> {
        let session = self.session.read().await;
        let body = session
            .configurator
            .state()
            .body()
            .ok_or(StudioError::NoConfiguration)?;
        let chart = body
            .chart(chart_key)
            .ok_or_else(|| StudioError::UnknownChart(chart_key.clone()))?;
        let interactive = self.interactive_filters(chart_key);
        Ok(prepare_cube_queries(chart, &interactive, &session.components))
    }

    /// Group every chart's cube filters by logical dimension
    ///
    /// Used to drive shared filter widgets across the whole configuration.
    pub async fn group_filters(&self, dimension_ids: &[ComponentId]) -> Result<Vec<DimensionGroup>> {
        let session = self.session.read().await;
        let body = session
            .configurator
            .state()
            .body()
            .ok_or(StudioError::NoConfiguration)?;
        let prepared: Vec<_> = body
            .chart_configs
            .iter()
            .flat_map(|chart| {
                let interactive = self.interactive_filters(&chart.key);
                prepare_filters(chart, &interactive, &session.components)
            })
            .collect();
        Ok(group_prepared_filters_by_dimension(&prepared, dimension_ids))
    }

    /// Snapshot of the current configuration
    pub async fn state(&self) -> ConfiguratorState {
        self.session.read().await.configurator.state().clone()
    }

    /// Current step
    pub async fn step(&self) -> ConfiguratorStep {
        self.session.read().await.configurator.step()
    }

    /// Storage key of the current configuration, if saved or loaded
    pub async fn key(&self) -> Option<String> {
        self.session.read().await.key.clone()
    }

    /// References dropped while loading
    pub async fn unresolved(&self) -> Vec<UnresolvedReference> {
        self.session.read().await.unresolved.clone()
    }

    fn interactive_filters(&self, chart_key: &ChartKey) -> Filters {
        self.registry
            .state(chart_key)
            .map(|state| state.data_filters)
            .unwrap_or_default()
    }

    /// Push the configured dashboard filters into `participants`
    fn apply_dashboard_filters(&self, body: &ConfiguratorBody, participants: &[ChartKey]) {
        let shared = &body.dashboard_filters;
        for id in &shared.data_filters.component_ids {
            if let Some(value) = shared.data_filters.filters.get(id) {
                self.registry.broadcast_data_filter(id, value, participants);
            }
        }
        let time_range = &shared.time_range;
        if time_range.active {
            let range = TimeRange::new(time_range.presets.from.clone(), time_range.presets.to.clone());
            self.registry.broadcast_time_range(Some(&range), participants);
        }
    }
}

fn chart_keys(body: &ConfiguratorBody) -> Vec<ChartKey> {
    body.chart_configs.iter().map(|c| c.key.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryPersistence;
    use crate::services::MockMetadataService;
    use pretty_assertions::assert_eq;
    use viz_migrate::PassthroughResolver;
    use viz_model::FilterValue;
    use viz_test_utils::{configurator_state_at, population_components, CHART_KEY};

    fn studio(persistence: Arc<InMemoryPersistence>) -> Studio {
        let mut metadata = MockMetadataService::new();
        metadata
            .expect_fetch_components()
            .returning(|_| Ok(population_components()));
        Studio::new(
            &StudioConfig::default(),
            persistence,
            Arc::new(metadata),
            Arc::new(PassthroughResolver),
        )
    }

    #[tokio::test]
    async fn start_selects_the_default_source() {
        let studio = studio(Arc::new(InMemoryPersistence::new()));
        assert_eq!(studio.start().await.unwrap(), ConfiguratorStep::SelectingDataset);
        assert_eq!(
            studio.state().await.data_source(),
            Some(&StudioConfig::default().default_data_source())
        );
    }

    #[tokio::test]
    async fn old_states_load_at_the_current_version() {
        let persistence = Arc::new(InMemoryPersistence::new());
        persistence.insert("k", configurator_state_at("2.0.0").unwrap(), "alice");
        let studio = studio(persistence);

        assert_eq!(studio.load("k").await.unwrap(), ConfiguratorStep::ConfiguringChart);
        let state = studio.state().await;
        assert_eq!(state.version(), viz_model::CONFIGURATOR_STATE_VERSION);
        assert!(studio.registry().get(&ChartKey::new(CHART_KEY)).is_some());
        assert_eq!(studio.key().await.as_deref(), Some("k"));
    }

    #[tokio::test]
    async fn dashboard_filters_are_broadcast_and_restored() {
        let persistence = Arc::new(InMemoryPersistence::new());
        persistence.insert("k", configurator_state_at("3.1.0").unwrap(), "alice");
        let studio = studio(persistence);
        studio.load("k").await.unwrap();
        assert_eq!(studio.step().await, ConfiguratorStep::Layouting);

        let year = ComponentId::new("year");
        let key = ChartKey::new(CHART_KEY);
        let before = studio.registry().state(&key).unwrap();
        assert_eq!(before.data_filter("year"), Some(&FilterValue::single("2020")));
        studio
            .dispatch(Action::SetDashboardDataFilter {
                component_id: year.clone(),
                value: FilterValue::single("2019"),
            })
            .await
            .unwrap();
        let state = studio.registry().state(&key).unwrap();
        assert_eq!(state.data_filter("year"), Some(&FilterValue::single("2019")));

        studio
            .dispatch(Action::RemoveDashboardDataFilter { component_id: year })
            .await
            .unwrap();
        let state = studio.registry().state(&key).unwrap();
        assert_eq!(state.data_filter("year"), Some(&FilterValue::single("2020")));
        assert!(studio
            .state()
            .await
            .body()
            .unwrap()
            .dashboard_filters
            .data_filters
            .component_ids
            .is_empty());
    }

    #[tokio::test]
    async fn queries_need_a_known_chart() {
        let studio = studio(Arc::new(InMemoryPersistence::new()));
        assert!(matches!(
            studio.chart_queries(&ChartKey::new("x")).await,
            Err(StudioError::NoConfiguration)
        ));
    }
}
