//! Per-dataset configuration of a chart

use crate::filter::Filters;
use crate::ids::ComponentId;
use serde::{Deserialize, Serialize};

/// One dataset used by a chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeConfig {
    /// Dataset identity
    pub iri: String,

    /// Identity the chart was originally published against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_iri: Option<String>,

    /// Editor-authored filters keyed by the cube's own component ids
    #[serde(default)]
    pub filters: Filters,

    /// Ordered dimensions shared with the other cubes of the chart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_by: Option<Vec<ComponentId>>,
}

impl CubeConfig {
    /// Unjoined cube without filters
    #[must_use]
    pub fn new(iri: impl Into<String>) -> Self {
        Self {
            iri: iri.into(),
            publish_iri: None,
            filters: Filters::new(),
            join_by: None,
        }
    }

    /// With filters
    #[must_use]
    pub fn with_filters(mut self, filters: Filters) -> Self {
        self.filters = filters;
        self
    }

    /// With a join list
    #[must_use]
    pub fn with_join_by<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ComponentId>,
    {
        self.join_by = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Join list, empty when the cube is not joined
    #[inline]
    #[must_use]
    pub fn join_by(&self) -> &[ComponentId] {
        self.join_by.as_deref().unwrap_or(&[])
    }

    /// Position of `id` within the join list
    #[must_use]
    pub fn join_position(&self, id: &str) -> Option<usize> {
        self.join_by().iter().position(|j| j.as_str() == id)
    }
}
