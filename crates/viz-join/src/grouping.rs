//! Grouping of prepared per-cube filters by logical dimension
//!
//! The observation layer queries each cube separately; interactive widgets
//! (e.g. a dashboard data filter) work on logical dimensions. Grouping maps
//! one logical dimension onto every cube query that must honor it.

use crate::join::{cube_component_id, is_join_by_component_id, join_arity};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use viz_model::{ChartConfig, ComponentId, Components, Filters};

/// Resolved filter spec of one cube
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedFilter {
    /// Cube identity
    pub cube_iri: String,
    /// Interactive filters of this cube, keyed by cube-local ids
    pub interactive_filters: Filters,
    /// Logical id -> cube-local id
    pub component_id_resolution: IndexMap<ComponentId, ComponentId>,
}

/// One cube participating in a dimension group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupEntry {
    /// Cube identity
    pub cube_iri: String,
    /// The cube's own id for the grouped dimension
    pub resolved_dimension_id: ComponentId,
    /// Interactive filters of the cube
    pub interactive_filters: Filters,
}

/// All cubes that must honor one logical dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionGroup {
    /// Requested logical id
    pub dimension_id: ComponentId,
    /// Participating cubes, in prepared order
    pub entries: Vec<GroupEntry>,
}

/// Group prepared filters by the requested logical dimension ids
///
/// For a native id, only cubes resolving it to exactly that id take part.
/// For a join placeholder, every cube with a non-empty resolution takes part,
/// carrying its own cube-local id. Requested ids are de-duplicated in
/// first-seen order; ids no cube resolves are omitted.
#[must_use]
pub fn group_prepared_filters_by_dimension(
    prepared: &[PreparedFilter],
    dimension_ids: &[ComponentId],
) -> Vec<DimensionGroup> {
    let requested: IndexSet<&ComponentId> = dimension_ids.iter().collect();
    let mut groups = Vec::with_capacity(requested.len());

    for id in requested {
        let joined = is_join_by_component_id(id.as_str());
        let entries: Vec<GroupEntry> = prepared
            .iter()
            .filter_map(|p| {
                let resolved = p.component_id_resolution.get(id)?;
                let admit = if joined {
                    !resolved.as_str().is_empty()
                } else {
                    resolved == id
                };
                admit.then(|| GroupEntry {
                    cube_iri: p.cube_iri.clone(),
                    resolved_dimension_id: resolved.clone(),
                    interactive_filters: p.interactive_filters.clone(),
                })
            })
            .collect();

        if entries.is_empty() {
            tracing::debug!(dimension = %id, "no cube resolves dimension");
            continue;
        }

        groups.push(DimensionGroup {
            dimension_id: id.clone(),
            entries,
        });
    }

    groups
}

/// Build the prepared filter spec of every cube of a chart
///
/// `interactive` is keyed by logical ids (placeholders or native ids).
/// Resolution covers every logical id the chart refers to: fields,
/// filters, interactive filters and join axes.
#[must_use]
pub fn prepare_filters(
    chart: &ChartConfig,
    interactive: &Filters,
    components: &Components,
) -> Vec<PreparedFilter> {
    let arity = join_arity(&chart.cubes);

    let mut logical: IndexSet<ComponentId> = IndexSet::new();
    logical.extend((0..arity).map(crate::join::join_by_component_id));
    logical.extend(chart.fields.values().map(|f| f.component_id.clone()));
    logical.extend(interactive.keys().cloned());
    for cube in &chart.cubes {
        logical.extend(cube.filters.keys().cloned());
    }

    chart
        .cubes
        .iter()
        .map(|cube| {
            let own = components.for_cube(&cube.iri);
            let resolution: IndexMap<ComponentId, ComponentId> = logical
                .iter()
                .filter_map(|id| {
                    let local = cube_component_id(cube, id.as_str(), arity)?;
                    let known = is_join_by_component_id(id.as_str())
                        || own.contains(local.as_str())
                        || cube.filters.contains_key(local.as_str());
                    known.then(|| (id.clone(), local))
                })
                .collect();

            let interactive_filters: Filters = interactive
                .iter()
                .filter_map(|(id, value)| {
                    resolution
                        .get(id)
                        .map(|local| (local.clone(), value.clone()))
                })
                .collect();

            PreparedFilter {
                cube_iri: cube.iri.clone(),
                interactive_filters,
                component_id_resolution: resolution,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use viz_model::FilterValue;

    fn prepared(iri: &str, pairs: &[(&str, &str)]) -> PreparedFilter {
        PreparedFilter {
            cube_iri: iri.to_string(),
            interactive_filters: Filters::new(),
            component_id_resolution: pairs
                .iter()
                .map(|(l, c)| (ComponentId::new(*l), ComponentId::new(*c)))
                .collect(),
        }
    }

    #[test]
    fn placeholder_groups_every_resolving_cube() {
        let prepared = vec![
            prepared("a", &[("joinBy__0", "year_a"), ("canton", "canton")]),
            prepared("b", &[("joinBy__0", "year_b")]),
            prepared("c", &[("canton", "canton")]),
        ];
        let groups = group_prepared_filters_by_dimension(&prepared, &[ComponentId::new("joinBy__0")]);
        assert_eq!(groups.len(), 1);
        let resolved: Vec<(&str, &str)> = groups[0]
            .entries
            .iter()
            .map(|e| (e.cube_iri.as_str(), e.resolved_dimension_id.as_str()))
            .collect();
        assert_eq!(resolved, vec![("a", "year_a"), ("b", "year_b")]);
    }

    #[test]
    fn native_id_requires_exact_resolution() {
        let prepared = vec![
            prepared("a", &[("canton", "canton")]),
            prepared("b", &[("canton", "kanton")]),
        ];
        let groups = group_prepared_filters_by_dimension(&prepared, &[ComponentId::new("canton")]);
        assert_eq!(groups[0].entries.len(), 1);
        assert_eq!(groups[0].entries[0].cube_iri, "a");
    }

    #[test]
    fn requested_ids_are_deduplicated_in_order() {
        let prepared = vec![prepared("a", &[("x", "x"), ("y", "y")])];
        let ids = [
            ComponentId::new("y"),
            ComponentId::new("missing"),
            ComponentId::new("x"),
            ComponentId::new("y"),
        ];
        let groups = group_prepared_filters_by_dimension(&prepared, &ids);
        let order: Vec<&str> = groups.iter().map(|g| g.dimension_id.as_str()).collect();
        assert_eq!(order, vec!["y", "x"]);
    }

    #[test]
    fn entries_carry_interactive_filters() {
        let mut p = prepared("a", &[("x", "x")]);
        p.interactive_filters
            .insert(ComponentId::new("x"), FilterValue::single("1"));
        let groups = group_prepared_filters_by_dimension(&[p], &[ComponentId::new("x")]);
        assert_eq!(
            groups[0].entries[0].interactive_filters.get("x"),
            Some(&FilterValue::single("1"))
        );
    }
}
