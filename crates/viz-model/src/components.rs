//! Dimension/measure catalogue returned by the metadata service

use crate::ids::ComponentId;
use serde::{Deserialize, Serialize};

/// Classification of a dimension's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionKind {
    /// Unordered categories
    Nominal,
    /// Ordered categories
    Ordinal,
    /// Points in time
    Temporal,
    /// Geographic areas
    GeoShapes,
    /// Geographic points
    GeoCoordinates,
}

/// What an encoding slot may bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A dimension of the given kind
    Dimension(DimensionKind),
    /// A numeric measure
    Measure,
}

/// A value a dimension can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionValue {
    /// Value as used in filters
    pub value: String,
    /// Display label
    #[serde(default)]
    pub label: String,
}

impl DimensionValue {
    /// Value labelled by itself
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// A dimension of a cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    /// Component id
    pub id: ComponentId,
    /// Owning cube
    pub cube_iri: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Value classification
    pub kind: DimensionKind,
    /// Known values, in display order
    #[serde(default)]
    pub values: Vec<DimensionValue>,
    /// Key dimensions must be filtered unless encoded
    #[serde(default)]
    pub is_key_dimension: bool,
}

impl Dimension {
    /// Create a key dimension with the given values
    #[must_use]
    pub fn new<I, S>(id: &str, cube_iri: &str, kind: DimensionKind, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: ComponentId::new(id),
            cube_iri: cube_iri.to_string(),
            label: id.to_string(),
            kind,
            values: values.into_iter().map(DimensionValue::new).collect(),
            is_key_dimension: true,
        }
    }
}

/// A measure of a cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    /// Component id
    pub id: ComponentId,
    /// Owning cube
    pub cube_iri: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Unit of measurement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Measure {
    /// Create a unitless measure
    #[must_use]
    pub fn new(id: &str, cube_iri: &str) -> Self {
        Self {
            id: ComponentId::new(id),
            cube_iri: cube_iri.to_string(),
            label: id.to_string(),
            unit: None,
        }
    }
}

/// Dimensions and measures of one or more cubes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    /// All dimensions
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    /// All measures
    #[serde(default)]
    pub measures: Vec<Measure>,
}

impl Components {
    /// Empty catalogue
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an additional dimension
    #[must_use]
    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimensions.push(dimension);
        self
    }

    /// With an additional measure
    #[must_use]
    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measures.push(measure);
        self
    }

    /// Dimension by id
    #[must_use]
    pub fn dimension(&self, id: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id.as_str() == id)
    }

    /// Measure by id
    #[must_use]
    pub fn measure(&self, id: &str) -> Option<&Measure> {
        self.measures.iter().find(|m| m.id.as_str() == id)
    }

    /// Kind of the component with the given id
    #[must_use]
    pub fn kind_of(&self, id: &str) -> Option<ComponentKind> {
        if let Some(d) = self.dimension(id) {
            return Some(ComponentKind::Dimension(d.kind));
        }
        self.measure(id).map(|_| ComponentKind::Measure)
    }

    /// Whether any component has the given id
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.kind_of(id).is_some()
    }

    /// Merge another catalogue, skipping ids already present
    pub fn extend(&mut self, other: Components) {
        for d in other.dimensions {
            if self.dimension(d.id.as_str()).is_none() {
                self.dimensions.push(d);
            }
        }
        for m in other.measures {
            if self.measure(m.id.as_str()).is_none() {
                self.measures.push(m);
            }
        }
    }

    /// Components belonging to one cube
    #[must_use]
    pub fn for_cube(&self, cube_iri: &str) -> Components {
        Components {
            dimensions: self
                .dimensions
                .iter()
                .filter(|d| d.cube_iri == cube_iri)
                .cloned()
                .collect(),
            measures: self
                .measures
                .iter()
                .filter(|m| m.cube_iri == cube_iri)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Components {
        Components::new()
            .with_dimension(Dimension::new("year", "c1", DimensionKind::Temporal, ["2020"]))
            .with_measure(Measure::new("amount", "c1"))
            .with_measure(Measure::new("other", "c2"))
    }

    #[test]
    fn kind_lookup() {
        let c = catalogue();
        assert_eq!(
            c.kind_of("year"),
            Some(ComponentKind::Dimension(DimensionKind::Temporal))
        );
        assert_eq!(c.kind_of("amount"), Some(ComponentKind::Measure));
        assert_eq!(c.kind_of("missing"), None);
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut c = catalogue();
        c.extend(catalogue());
        assert_eq!(c.dimensions.len(), 1);
        assert_eq!(c.measures.len(), 2);
    }

    #[test]
    fn for_cube_filters_by_owner() {
        let c = catalogue().for_cube("c2");
        assert!(c.dimensions.is_empty());
        assert_eq!(c.measures.len(), 1);
    }
}
