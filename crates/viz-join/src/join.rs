//! Positional join identities
//!
//! The i-th `joinBy` id of every joined cube denotes the same logical axis,
//! exposed under the synthetic id `joinBy__<i>`.

use indexmap::IndexSet;
use viz_model::{ComponentId, Components, CubeConfig, Dimension, DimensionValue};

/// Prefix of synthetic join identities
pub const JOIN_BY_PREFIX: &str = "joinBy__";

/// Synthetic id of the join axis at `index`
#[inline]
#[must_use]
pub fn join_by_component_id(index: usize) -> ComponentId {
    ComponentId::new(format!("{JOIN_BY_PREFIX}{index}"))
}

/// Whether `id` is a join placeholder
#[inline]
#[must_use]
pub fn is_join_by_component_id(id: &str) -> bool {
    join_by_index(id).is_some()
}

/// Axis index of a join placeholder
#[must_use]
pub fn join_by_index(id: &str) -> Option<usize> {
    id.strip_prefix(JOIN_BY_PREFIX)?.parse().ok()
}

/// Join lists of unequal length across the cubes of one chart
///
/// Never propagated as a failure: resolution uses the shortest list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("joinBy lists differ in length: {lengths:?}")]
pub struct JoinArityMismatch {
    /// Length of each participating cube's list, in cube order
    pub lengths: Vec<usize>,
}

impl JoinArityMismatch {
    /// Length every participant can honor
    #[must_use]
    pub fn usable(&self) -> usize {
        self.lengths.iter().copied().min().unwrap_or(0)
    }
}

/// Number of join axes shared by the cubes
///
/// Only cubes with a non-empty `joinBy` list participate.
///
/// # Errors
/// Returns [`JoinArityMismatch`] when participants disagree on the length.
pub fn check_join_arity(cubes: &[CubeConfig]) -> Result<usize, JoinArityMismatch> {
    let lengths: Vec<usize> = cubes
        .iter()
        .map(|c| c.join_by().len())
        .filter(|len| *len > 0)
        .collect();

    match lengths.split_first() {
        None => Ok(0),
        Some((first, rest)) if rest.iter().all(|l| l == first) => Ok(*first),
        Some(_) => Err(JoinArityMismatch { lengths }),
    }
}

/// Number of join axes, truncating to the shortest list on mismatch
#[must_use]
pub fn join_arity(cubes: &[CubeConfig]) -> usize {
    match check_join_arity(cubes) {
        Ok(arity) => arity,
        Err(mismatch) => {
            tracing::warn!(%mismatch, usable = mismatch.usable(), "truncating join axes");
            mismatch.usable()
        }
    }
}

/// Logical id under which a cube's component is exposed in a joined chart
#[must_use]
pub fn logical_component_id(cube: &CubeConfig, id: &ComponentId, arity: usize) -> ComponentId {
    match cube.join_position(id.as_str()) {
        Some(i) if i < arity => join_by_component_id(i),
        _ => id.clone(),
    }
}

/// Cube-local id addressed by a logical id
///
/// Placeholders resolve to the cube's own dimension at that position; a
/// cube without that position yields `None`. Native ids resolve to themselves.
#[must_use]
pub fn cube_component_id(cube: &CubeConfig, logical: &str, arity: usize) -> Option<ComponentId> {
    match join_by_index(logical) {
        Some(i) if i < arity => cube.join_by().get(i).cloned(),
        Some(_) => None,
        None => Some(ComponentId::new(logical)),
    }
}

/// Every cube-local id a placeholder stands for, in cube order
#[must_use]
pub fn original_ids(placeholder: &str, cubes: &[CubeConfig]) -> Vec<(String, ComponentId)> {
    let arity = join_arity(cubes);
    cubes
        .iter()
        .filter_map(|c| {
            join_by_index(placeholder)?;
            cube_component_id(c, placeholder, arity).map(|id| (c.iri.clone(), id))
        })
        .collect()
}

/// Catalogue as seen by a joined chart
///
/// Joined dimensions are replaced by one synthetic dimension per axis whose
/// values are the first-seen union of the originals. Unjoined charts get the
/// catalogue back unchanged.
#[must_use]
pub fn joined_components(cubes: &[CubeConfig], components: &Components) -> Components {
    let arity = join_arity(cubes);
    if arity == 0 || cubes.len() < 2 {
        return components.clone();
    }

    let mut joined: Vec<Dimension> = Vec::with_capacity(arity);
    let mut consumed: IndexSet<(String, ComponentId)> = IndexSet::new();

    for i in 0..arity {
        let originals: Vec<&Dimension> = cubes
            .iter()
            .filter_map(|c| {
                let id = c.join_by().get(i)?;
                components
                    .dimensions
                    .iter()
                    .find(|d| &d.id == id && d.cube_iri == c.iri)
            })
            .collect();

        let Some(first) = originals.first() else {
            continue;
        };

        let mut values: IndexSet<String> = IndexSet::new();
        let mut labelled: Vec<DimensionValue> = Vec::new();
        for d in &originals {
            consumed.insert((d.cube_iri.clone(), d.id.clone()));
            for v in &d.values {
                if values.insert(v.value.clone()) {
                    labelled.push(v.clone());
                }
            }
        }

        joined.push(Dimension {
            id: join_by_component_id(i),
            cube_iri: first.cube_iri.clone(),
            label: first.label.clone(),
            kind: first.kind,
            values: labelled,
            is_key_dimension: originals.iter().any(|d| d.is_key_dimension),
        });
    }

    let mut dimensions = joined;
    dimensions.extend(
        components
            .dimensions
            .iter()
            .filter(|d| !consumed.contains(&(d.cube_iri.clone(), d.id.clone())))
            .cloned(),
    );

    Components {
        dimensions,
        measures: components.measures.clone(),
    }
}
