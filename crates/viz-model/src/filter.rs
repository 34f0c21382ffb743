//! Editor-authored filter values

use crate::ids::ComponentId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Filters keyed by component id, in insertion order
pub type Filters = IndexMap<ComponentId, FilterValue>;

/// A filter applied to one dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FilterValue {
    /// Exactly one value
    Single {
        /// Selected value
        value: String,
    },

    /// A set of values
    Multi {
        /// Selected values (persisted as `{value: true}`)
        values: IndexMap<String, bool>,
    },

    /// A closed range, typically temporal
    Range {
        /// Lower bound (inclusive)
        from: String,
        /// Upper bound (inclusive)
        to: String,
    },
}

impl FilterValue {
    /// Single-value filter
    #[inline]
    #[must_use]
    pub fn single(value: impl Into<String>) -> Self {
        Self::Single {
            value: value.into(),
        }
    }

    /// Multi-value filter from an iterator of selected values
    #[must_use]
    pub fn multi<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Multi {
            values: values.into_iter().map(|v| (v.into(), true)).collect(),
        }
    }

    /// Range filter
    #[inline]
    #[must_use]
    pub fn range(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Range {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The value of a single filter
    #[inline]
    #[must_use]
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single { value } => Some(value),
            _ => None,
        }
    }

    /// Whether the filter accepts `value`
    #[must_use]
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Single { value: v } => v == value,
            Self::Multi { values } => values.get(value).copied().unwrap_or(false),
            Self::Range { from, to } => from.as_str() <= value && value <= to.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_with_type_tag() {
        assert_eq!(
            serde_json::to_value(FilterValue::single("v1")).unwrap(),
            json!({"type": "single", "value": "v1"})
        );
        assert_eq!(
            serde_json::to_value(FilterValue::multi(["a", "b"])).unwrap(),
            json!({"type": "multi", "values": {"a": true, "b": true}})
        );
        assert_eq!(
            serde_json::to_value(FilterValue::range("2010", "2020")).unwrap(),
            json!({"type": "range", "from": "2010", "to": "2020"})
        );
    }

    #[test]
    fn matches_values() {
        assert!(FilterValue::single("a").matches("a"));
        assert!(!FilterValue::single("a").matches("b"));
        assert!(FilterValue::multi(["a", "b"]).matches("b"));
        assert!(FilterValue::range("2010", "2020").matches("2015"));
        assert!(!FilterValue::range("2010", "2020").matches("2021"));
    }

    #[test]
    fn unselected_multi_value_does_not_match() {
        let filter: FilterValue =
            serde_json::from_value(json!({"type": "multi", "values": {"a": false}})).unwrap();
        assert!(!filter.matches("a"));
    }
}
