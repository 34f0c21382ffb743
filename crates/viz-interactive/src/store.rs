//! State of one chart's interactive filters

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use viz_join::{get_chart_config_filters, FilterOptions};
use viz_model::{CalculationKind, ChartConfig, ComponentId, FilterValue};

/// Active time window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start
    pub from: String,
    /// End
    pub to: String,
}

impl TimeRange {
    /// Window between two bounds
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Viewer-side filter state of one chart, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveFiltersState {
    /// Legend categories toggled by the viewer, value -> highlighted
    pub categories: IndexMap<String, bool>,
    /// Brushed time window
    pub time_range: Option<TimeRange>,
    /// Viewer-chosen data filter values by dimension
    pub data_filters: IndexMap<ComponentId, FilterValue>,
    /// Identity or percent
    pub calculation: CalculationKind,
}

impl InteractiveFiltersState {
    /// Flip a legend category, returning its new state
    pub fn toggle_category(&mut self, value: &str) -> bool {
        let entry = self.categories.entry(value.to_string()).or_insert(false);
        *entry = !*entry;
        *entry
    }

    /// Forget every category selection
    #[inline]
    pub fn reset_categories(&mut self) {
        self.categories.clear();
    }

    /// Value of a data filter
    #[inline]
    #[must_use]
    pub fn data_filter(&self, id: &str) -> Option<&FilterValue> {
        self.data_filters.get(id)
    }

    /// Set or clear (`None`) a data filter
    pub fn set_data_filter(&mut self, id: ComponentId, value: Option<FilterValue>) {
        match value {
            Some(value) => {
                self.data_filters.insert(id, value);
            }
            None => {
                self.data_filters.shift_remove(&id);
            }
        }
    }

    /// Bring the state in line with the chart's persisted configuration
    ///
    /// Editor presets replace whatever the viewer selected: the time range
    /// takes the configured presets, data filters take the chart's filter
    /// values and the calculation its configured default. Disabled
    /// capabilities are cleared.
    pub fn sync_from_config(&mut self, chart: &ChartConfig) {
        let config = &chart.interactive_filters_config;

        if !config.legend.active {
            self.categories.clear();
        }

        let presets = &config.time_range.presets;
        self.time_range = if !config.time_range.active {
            None
        } else if presets.from.is_empty() && presets.to.is_empty() {
            self.time_range.take()
        } else {
            Some(TimeRange::new(presets.from.clone(), presets.to.clone()))
        };

        if config.data_filters.active {
            let filters = get_chart_config_filters(&chart.cubes, FilterOptions::joined());
            self.data_filters = config
                .data_filters
                .component_ids
                .iter()
                .filter_map(|id| {
                    let value = filters.get(id)?.as_single()?;
                    Some((id.clone(), FilterValue::single(value)))
                })
                .collect();
        } else {
            self.data_filters.clear();
        }

        self.calculation = config.calculation.kind;
    }
}
