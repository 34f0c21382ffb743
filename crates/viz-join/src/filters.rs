//! Chart-level view of per-cube filters

use crate::join::{join_arity, logical_component_id};
use viz_model::{CubeConfig, Filters};

/// Options for [`get_chart_config_filters`]
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions<'a> {
    /// Restrict to a single cube
    pub cube_iri: Option<&'a str>,
    /// Re-key join dimensions to their placeholder
    pub joined: bool,
}

impl<'a> FilterOptions<'a> {
    /// Union of native ids
    #[inline]
    #[must_use]
    pub fn native() -> Self {
        Self::default()
    }

    /// Joined view
    #[inline]
    #[must_use]
    pub fn joined() -> Self {
        Self {
            cube_iri: None,
            joined: true,
        }
    }

    /// Only the given cube
    #[inline]
    #[must_use]
    pub fn for_cube(mut self, iri: &'a str) -> Self {
        self.cube_iri = Some(iri);
        self
    }
}

/// Filters of a chart's cubes merged into one map
///
/// Unjoined, every filter keeps its native component id. Joined, filters on
/// join dimensions are re-keyed to `joinBy__<i>`, collapsing the cubes that
/// share that axis; other filters pass through.
///
/// Cubes are visited in order and a later value for an existing key replaces
/// the earlier one while keeping its position.
#[must_use]
pub fn get_chart_config_filters(cubes: &[CubeConfig], options: FilterOptions<'_>) -> Filters {
    let arity = if options.joined { join_arity(cubes) } else { 0 };
    let mut out = Filters::new();

    for cube in cubes
        .iter()
        .filter(|c| options.cube_iri.map_or(true, |iri| c.iri == iri))
    {
        for (id, value) in &cube.filters {
            let key = if options.joined {
                logical_component_id(cube, id, arity)
            } else {
                id.clone()
            };
            out.insert(key, value.clone());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use viz_model::{ComponentId, FilterValue};

    fn filters(pairs: &[(&str, &str)]) -> Filters {
        pairs
            .iter()
            .map(|(k, v)| (ComponentId::new(*k), FilterValue::single(*v)))
            .collect()
    }

    fn cubes() -> Vec<CubeConfig> {
        vec![
            CubeConfig::new("cube1")
                .with_filters(filters(&[("d1", "v1"), ("d2", "v2")]))
                .with_join_by(["d1"]),
            CubeConfig::new("cube2")
                .with_filters(filters(&[("d3", "v1"), ("d4", "v4")]))
                .with_join_by(["d3"]),
        ]
    }

    #[test]
    fn joined_filters_collapse_join_axes() {
        let out = get_chart_config_filters(&cubes(), FilterOptions::joined());
        assert_eq!(
            out,
            filters(&[("joinBy__0", "v1"), ("d2", "v2"), ("d4", "v4")])
        );
        let keys: Vec<&str> = out.keys().map(ComponentId::as_str).collect();
        assert_eq!(keys, vec!["joinBy__0", "d2", "d4"]);
    }

    #[test]
    fn native_filters_are_a_union() {
        let out = get_chart_config_filters(&cubes(), FilterOptions::native());
        assert_eq!(
            out,
            filters(&[("d1", "v1"), ("d2", "v2"), ("d3", "v1"), ("d4", "v4")])
        );
    }

    #[test]
    fn single_cube_recovers_its_filters() {
        let cubes = cubes();
        let out = get_chart_config_filters(&cubes, FilterOptions::native().for_cube("cube2"));
        assert_eq!(out, cubes[1].filters);
    }

    #[test]
    fn disagreeing_join_values_follow_cube_order() {
        let mut cubes = cubes();
        cubes[1]
            .filters
            .insert(ComponentId::new("d3"), FilterValue::single("other"));
        let out = get_chart_config_filters(&cubes, FilterOptions::joined());
        assert_eq!(out.get("joinBy__0"), Some(&FilterValue::single("other")));
    }
}
