//! Dashboard composition and shared dashboard filters

use crate::chart::{Localized, Meta};
use crate::filter::Filters;
use crate::ids::{BlockKey, ChartKey, ComponentId};
use serde::{Deserialize, Serialize};

/// Arrangement of dashboard blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardArrangement {
    /// One block per row
    #[default]
    Vertical,
    /// First block spans the full height
    Tall,
    /// Free grid
    Canvas,
}

/// How the charts of a configuration are published
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutKind {
    /// One chart visible at a time, switched by tabs
    #[default]
    #[serde(rename = "tab")]
    Tab,
    /// All blocks on one page
    #[serde(rename = "dashboard")]
    Dashboard,
    /// Each chart published under its own URL
    #[serde(rename = "singleURLs")]
    SingleUrls,
}

/// Content of a layout block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockContent {
    /// Shows the chart with the same key
    Chart,
    /// Free text
    Text {
        /// Text body
        #[serde(default)]
        text: Localized,
    },
}

/// One block of the layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutBlock {
    /// Stable key
    pub key: BlockKey,
    /// Block content
    #[serde(flatten)]
    pub content: BlockContent,
    /// Placed at least once by the editor
    #[serde(default)]
    pub initialized: bool,
}

impl LayoutBlock {
    /// Block showing a chart
    #[must_use]
    pub fn chart(key: &ChartKey) -> Self {
        Self {
            key: BlockKey::from(key),
            content: BlockContent::Chart,
            initialized: true,
        }
    }

    /// Text block with a fresh key
    #[must_use]
    pub fn text(text: Localized) -> Self {
        Self {
            key: BlockKey::generate(),
            content: BlockContent::Text { text },
            initialized: false,
        }
    }

    /// Whether the block shows a chart
    #[inline]
    #[must_use]
    pub fn is_chart(&self) -> bool {
        matches!(self.content, BlockContent::Chart)
    }
}

/// Ordered composition of blocks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Publication mode
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    /// Dashboard arrangement, only meaningful for dashboards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<DashboardArrangement>,
    /// Layout title/description
    #[serde(default)]
    pub meta: Meta,
    /// Blocks in display order
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,
}

impl Layout {
    /// Tab layout with one chart block per key
    #[must_use]
    pub fn tabs<'a>(keys: impl IntoIterator<Item = &'a ChartKey>) -> Self {
        Self {
            kind: LayoutKind::Tab,
            layout: None,
            meta: Meta::default(),
            blocks: keys.into_iter().map(LayoutBlock::chart).collect(),
        }
    }

    /// Position of a block
    #[must_use]
    pub fn position(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|b| &b.key == key)
    }
}

/// Time range shared by all charts of a dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTimeRange {
    /// Enabled
    pub active: bool,
    /// Temporal unit the range is expressed in
    #[serde(default)]
    pub time_unit: String,
    /// Window bounds
    #[serde(default)]
    pub presets: crate::chart::TimeRangePresets,
}

/// Data filters shared by all charts of a dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDataFilters {
    /// Shared dimensions
    #[serde(default)]
    pub component_ids: Vec<ComponentId>,
    /// Current shared values
    #[serde(default)]
    pub filters: Filters,
}

/// Filters applied uniformly across every chart of a dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardFiltersConfig {
    /// Shared time range
    pub time_range: DashboardTimeRange,
    /// Shared data filters
    pub data_filters: DashboardDataFilters,
}
