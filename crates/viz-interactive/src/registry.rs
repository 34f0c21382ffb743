//! Registry of per-chart interactive filter stores
//!
//! Each chart key owns an independently lockable state cell. Dashboard-wide
//! data filters are routed through [`InteractiveFilterStoreRegistry::broadcast_data_filter`],
//! which records every participant's prior value for that one dimension so
//! that [`InteractiveFilterStoreRegistry::restore`] can roll it back.

use crate::store::{InteractiveFiltersState, TimeRange};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use viz_model::{ChartConfig, ChartKey, ComponentId, FilterValue};

/// Shared handle to one chart's store
pub type StoreHandle = Arc<Mutex<InteractiveFiltersState>>;

/// Values recorded before a broadcast, one per participant
#[derive(Debug, Clone, Default)]
struct Snapshot {
    values: Vec<(ChartKey, Option<FilterValue>)>,
}

/// Interactive filter stores keyed by chart
#[derive(Debug, Default)]
pub struct InteractiveFilterStoreRegistry {
    stores: DashMap<ChartKey, StoreHandle>,
    snapshots: Mutex<HashMap<ComponentId, Snapshot>>,
}

impl InteractiveFilterStoreRegistry {
    /// Empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store of a chart, created empty on first use
    #[must_use]
    pub fn store(&self, key: &ChartKey) -> StoreHandle {
        Arc::clone(
            self.stores
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(InteractiveFiltersState::default())))
                .value(),
        )
    }

    /// Store of a chart, if it exists
    #[must_use]
    pub fn get(&self, key: &ChartKey) -> Option<StoreHandle> {
        self.stores.get(key).map(|s| Arc::clone(s.value()))
    }

    /// Copy of a chart's state
    #[must_use]
    pub fn state(&self, key: &ChartKey) -> Option<InteractiveFiltersState> {
        self.get(key).map(|s| s.lock().clone())
    }

    /// Run `f` against a chart's store
    pub fn with_store<R>(&self, key: &ChartKey, f: impl FnOnce(&mut InteractiveFiltersState) -> R) -> R {
        let store = self.store(key);
        let mut state = store.lock();
        f(&mut state)
    }

    /// Drop a chart's store
    pub fn remove(&self, key: &ChartKey) -> bool {
        self.stores.remove(key).is_some()
    }

    /// Number of stores
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Whether no store exists
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Keys of every store
    #[must_use]
    pub fn keys(&self) -> Vec<ChartKey> {
        self.stores.iter().map(|e| e.key().clone()).collect()
    }

    /// Apply the chart's persisted configuration to its store
    pub fn sync_from_config(&self, chart: &ChartConfig) {
        self.with_store(&chart.key, |state| state.sync_from_config(chart));
    }

    /// Sync every chart and drop stores of charts that no longer exist
    pub fn sync_all<'a>(&self, charts: impl IntoIterator<Item = &'a ChartConfig>) {
        let mut live = Vec::new();
        for chart in charts {
            self.sync_from_config(chart);
            live.push(chart.key.clone());
        }
        self.stores.retain(|key, _| live.contains(key));
    }

    /// Clear legend category selections on every chart
    pub fn clear_all_categories(&self) {
        for entry in &self.stores {
            entry.value().lock().reset_categories();
        }
        debug!(charts = self.stores.len(), "cleared interactive categories");
    }

    /// Record every participant's current value for `dimension`
    ///
    /// An outstanding snapshot for the same dimension keeps the values it
    /// already holds, so a restore always returns to the state before the
    /// first broadcast. Participants it has not seen yet are added.
    pub fn snapshot(&self, dimension: &ComponentId, participants: &[ChartKey]) {
        let mut snapshots = self.snapshots.lock();
        let snapshot = snapshots.entry(dimension.clone()).or_default();
        for key in participants {
            if snapshot.values.iter().any(|(recorded, _)| recorded == key) {
                continue;
            }
            let value = self.store(key).lock().data_filter(dimension.as_str()).cloned();
            snapshot.values.push((key.clone(), value));
        }
    }

    /// Whether a snapshot for `dimension` is outstanding
    #[must_use]
    pub fn has_snapshot(&self, dimension: &ComponentId) -> bool {
        self.snapshots.lock().contains_key(dimension)
    }

    /// Set `dimension` to `value` on every participant, snapshotting first
    pub fn broadcast_data_filter(
        &self,
        dimension: &ComponentId,
        value: &FilterValue,
        participants: &[ChartKey],
    ) {
        self.snapshot(dimension, participants);
        for key in participants {
            self.with_store(key, |state| {
                state.set_data_filter(dimension.clone(), Some(value.clone()));
            });
        }
        debug!(%dimension, participants = participants.len(), "broadcast data filter");
    }

    /// Roll every participant back to its recorded value for `dimension`
    ///
    /// Other dimensions are untouched; a value that was absent at snapshot
    /// time is removed. Returns `false` when no snapshot was outstanding.
    pub fn restore(&self, dimension: &ComponentId) -> bool {
        let Some(snapshot) = self.snapshots.lock().remove(dimension) else {
            return false;
        };
        for (key, value) in snapshot.values {
            if let Some(store) = self.get(&key) {
                store.lock().set_data_filter(dimension.clone(), value);
            }
        }
        debug!(%dimension, "restored data filter");
        true
    }

    /// Set the time window of every participant
    pub fn broadcast_time_range(&self, range: Option<&TimeRange>, participants: &[ChartKey]) {
        for key in participants {
            self.with_store(key, |state| state.time_range = range.cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys() -> Vec<ChartKey> {
        vec![ChartKey::new("a"), ChartKey::new("b")]
    }

    #[test]
    fn stores_are_created_lazily() {
        let registry = InteractiveFilterStoreRegistry::new();
        assert!(registry.get(&ChartKey::new("a")).is_none());
        registry.with_store(&ChartKey::new("a"), |s| s.toggle_category("x"));
        assert_eq!(registry.len(), 1);
        assert!(registry.remove(&ChartKey::new("a")));
        assert!(registry.is_empty());
    }

    #[test]
    fn second_snapshot_keeps_the_first() {
        let registry = InteractiveFilterStoreRegistry::new();
        let dim = ComponentId::new("year");
        registry.broadcast_data_filter(&dim, &FilterValue::single("2020"), &keys());
        registry.broadcast_data_filter(&dim, &FilterValue::single("2021"), &keys());
        assert!(registry.restore(&dim));
        for key in keys() {
            assert!(registry.state(&key).unwrap().data_filter("year").is_none());
        }
        assert!(!registry.restore(&dim));
    }

    #[test]
    fn late_participants_join_the_outstanding_snapshot() {
        let registry = InteractiveFilterStoreRegistry::new();
        let dim = ComponentId::new("year");
        let (a, b) = (ChartKey::new("a"), ChartKey::new("b"));
        registry.with_store(&a, |s| {
            s.set_data_filter(dim.clone(), Some(FilterValue::single("2018")));
        });
        registry.broadcast_data_filter(&dim, &FilterValue::single("2019"), &[a.clone()]);

        registry.with_store(&b, |s| {
            s.set_data_filter(dim.clone(), Some(FilterValue::single("2020")));
        });
        registry.broadcast_data_filter(&dim, &FilterValue::single("2019"), &keys());
        assert_eq!(
            registry.state(&b).unwrap().data_filter("year"),
            Some(&FilterValue::single("2019"))
        );

        assert!(registry.restore(&dim));
        assert_eq!(
            registry.state(&a).unwrap().data_filter("year"),
            Some(&FilterValue::single("2018"))
        );
        assert_eq!(
            registry.state(&b).unwrap().data_filter("year"),
            Some(&FilterValue::single("2020"))
        );
    }

    #[test]
    fn categories_clear_everywhere() {
        let registry = InteractiveFilterStoreRegistry::new();
        for key in keys() {
            registry.with_store(&key, |s| s.toggle_category("f"));
        }
        registry.clear_all_categories();
        for key in keys() {
            assert!(registry.state(&key).unwrap().categories.is_empty());
        }
    }
}
