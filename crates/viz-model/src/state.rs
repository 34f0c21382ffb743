//! Configurator state: the discriminated union over workflow steps
//!
//! The serialized form is the persisted/exported shape:
//! `{ version, state, dataSource, chartConfigs, activeChartKey, layout, dashboardFilters }`.

use crate::chart::ChartConfig;
use crate::ids::ChartKey;
use crate::layout::{DashboardFiltersConfig, Layout};
use crate::version::{SchemaVersion, CONFIGURATOR_STATE_VERSION};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow step tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfiguratorStep {
    /// Nothing chosen yet
    Initial,
    /// Choosing the dataset
    SelectingDataset,
    /// Editing one or more charts
    ConfiguringChart,
    /// Composing the dashboard
    Layouting,
    /// Terminal snapshot handed to publication
    Publishing,
}

impl fmt::Display for ConfiguratorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Initial => "INITIAL",
            Self::SelectingDataset => "SELECTING_DATASET",
            Self::ConfiguringChart => "CONFIGURING_CHART",
            Self::Layouting => "LAYOUTING",
            Self::Publishing => "PUBLISHING",
        };
        f.write_str(name)
    }
}

/// Kind of backing data source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceType {
    /// SPARQL endpoint
    #[default]
    Sparql,
    /// SQL endpoint
    Sql,
}

/// Where observations are fetched from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    /// Endpoint kind
    #[serde(rename = "type")]
    pub kind: DataSourceType,
    /// Endpoint url
    pub url: String,
}

impl DataSource {
    /// SPARQL source at `url`
    #[must_use]
    pub fn sparql(url: impl Into<String>) -> Self {
        Self {
            kind: DataSourceType::Sparql,
            url: url.into(),
        }
    }
}

/// Body shared by every chart-bearing step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguratorBody {
    /// Schema version
    pub version: SchemaVersion,
    /// Data source
    pub data_source: DataSource,
    /// Charts, keys unique
    pub chart_configs: Vec<ChartConfig>,
    /// Currently edited chart, always one of `chart_configs`
    pub active_chart_key: ChartKey,
    /// Composition of the charts
    #[serde(default)]
    pub layout: Layout,
    /// Shared dashboard filters
    #[serde(default)]
    pub dashboard_filters: DashboardFiltersConfig,
}

impl ConfiguratorBody {
    /// Body with a single chart shown as a tab
    #[must_use]
    pub fn with_chart(data_source: DataSource, chart: ChartConfig) -> Self {
        let key = chart.key.clone();
        Self {
            version: CONFIGURATOR_STATE_VERSION,
            data_source,
            layout: Layout::tabs([&key]),
            chart_configs: vec![chart],
            active_chart_key: key,
            dashboard_filters: DashboardFiltersConfig::default(),
        }
    }

    /// Chart by key
    #[must_use]
    pub fn chart(&self, key: &ChartKey) -> Option<&ChartConfig> {
        self.chart_configs.iter().find(|c| &c.key == key)
    }

    /// Mutable chart by key
    pub fn chart_mut(&mut self, key: &ChartKey) -> Option<&mut ChartConfig> {
        self.chart_configs.iter_mut().find(|c| &c.key == key)
    }

    /// The active chart
    #[must_use]
    pub fn active_chart(&self) -> Option<&ChartConfig> {
        self.chart(&self.active_chart_key)
    }

    /// Mutable active chart
    pub fn active_chart_mut(&mut self) -> Option<&mut ChartConfig> {
        let key = self.active_chart_key.clone();
        self.chart_mut(&key)
    }

    /// Check the body's structural invariants
    ///
    /// Returns a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.chart_configs.is_empty() {
            return Err("no chart configs".to_string());
        }
        let mut seen = std::collections::HashSet::new();
        for chart in &self.chart_configs {
            if !seen.insert(&chart.key) {
                return Err(format!("duplicate chart key {}", chart.key));
            }
        }
        if self.chart(&self.active_chart_key).is_none() {
            return Err(format!(
                "active chart key {} does not reference a chart",
                self.active_chart_key
            ));
        }
        Ok(())
    }
}

/// Body of the dataset selection step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectingDatasetBody {
    /// Schema version
    pub version: SchemaVersion,
    /// Data source
    pub data_source: DataSource,
}

/// Body of the initial step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialBody {
    /// Schema version
    pub version: SchemaVersion,
}

/// Configurator state, discriminated by workflow step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfiguratorState {
    /// Nothing chosen yet
    Initial(InitialBody),
    /// Choosing the dataset
    SelectingDataset(SelectingDatasetBody),
    /// Editing charts
    ConfiguringChart(ConfiguratorBody),
    /// Composing the dashboard
    Layouting(ConfiguratorBody),
    /// Terminal snapshot
    Publishing(ConfiguratorBody),
}

impl Default for ConfiguratorState {
    fn default() -> Self {
        Self::Initial(InitialBody {
            version: CONFIGURATOR_STATE_VERSION,
        })
    }
}

impl ConfiguratorState {
    /// Current step
    #[must_use]
    pub fn step(&self) -> ConfiguratorStep {
        match self {
            Self::Initial(_) => ConfiguratorStep::Initial,
            Self::SelectingDataset(_) => ConfiguratorStep::SelectingDataset,
            Self::ConfiguringChart(_) => ConfiguratorStep::ConfiguringChart,
            Self::Layouting(_) => ConfiguratorStep::Layouting,
            Self::Publishing(_) => ConfiguratorStep::Publishing,
        }
    }

    /// Schema version
    #[must_use]
    pub fn version(&self) -> SchemaVersion {
        match self {
            Self::Initial(b) => b.version,
            Self::SelectingDataset(b) => b.version,
            Self::ConfiguringChart(b) | Self::Layouting(b) | Self::Publishing(b) => b.version,
        }
    }

    /// Chart-bearing body, if the step has one
    #[must_use]
    pub fn body(&self) -> Option<&ConfiguratorBody> {
        match self {
            Self::ConfiguringChart(b) | Self::Layouting(b) | Self::Publishing(b) => Some(b),
            _ => None,
        }
    }

    /// Mutable chart-bearing body
    pub fn body_mut(&mut self) -> Option<&mut ConfiguratorBody> {
        match self {
            Self::ConfiguringChart(b) | Self::Layouting(b) | Self::Publishing(b) => Some(b),
            _ => None,
        }
    }

    /// Data source, if chosen
    #[must_use]
    pub fn data_source(&self) -> Option<&DataSource> {
        match self {
            Self::Initial(_) => None,
            Self::SelectingDataset(b) => Some(&b.data_source),
            Self::ConfiguringChart(b) | Self::Layouting(b) | Self::Publishing(b) => {
                Some(&b.data_source)
            }
        }
    }

    /// Charts of the configuration, empty before a chart exists
    #[must_use]
    pub fn chart_configs(&self) -> &[ChartConfig] {
        self.body().map_or(&[], |b| b.chart_configs.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartType;
    use crate::cube::CubeConfig;
    use pretty_assertions::assert_eq;

    fn body() -> ConfiguratorBody {
        let mut chart = ChartConfig::new(ChartType::Column, vec![CubeConfig::new("c")]);
        chart.key = ChartKey::new("k1");
        ConfiguratorBody::with_chart(DataSource::sparql("https://example.org/query"), chart)
    }

    #[test]
    fn persisted_shape_is_tagged_and_flat() {
        let state = ConfiguratorState::Layouting(body());
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["state"], "LAYOUTING");
        assert_eq!(value["version"], "3.2.0");
        assert_eq!(value["activeChartKey"], "k1");
        assert_eq!(value["dataSource"]["type"], "sparql");
        assert_eq!(value["layout"]["blocks"][0]["key"], "k1");

        let back: ConfiguratorState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn initial_state_has_no_charts() {
        let state = ConfiguratorState::default();
        assert_eq!(state.step(), ConfiguratorStep::Initial);
        assert!(state.chart_configs().is_empty());
        assert!(state.data_source().is_none());
    }

    #[test]
    fn invariants_catch_dangling_active_key() {
        let mut b = body();
        assert!(b.check_invariants().is_ok());
        b.active_chart_key = ChartKey::new("missing");
        assert!(b.check_invariants().is_err());
    }
}
