//! Dropping references to components missing from the catalogue
//!
//! Upstream schema drift can leave a persisted chart pointing at components
//! that no longer exist. Loading keeps going: each stale reference is
//! removed and reported.

use crate::error::{ReferenceLocation, UnresolvedReference};
use tracing::debug;
use viz_join::joined_components;
use viz_model::{ChartConfig, ComponentId, Components};

/// Collects reports for one chart
struct Reporter<'a> {
    chart: &'a ChartConfig,
    found: Vec<UnresolvedReference>,
}

impl Reporter<'_> {
    fn report(&mut self, component_id: &ComponentId, location: ReferenceLocation) {
        let reference = UnresolvedReference {
            chart_key: self.chart.key.clone(),
            component_id: component_id.clone(),
            location,
        };
        debug!(%reference, "dropping stale reference");
        self.found.push(reference);
    }
}

/// Remove every reference of `config` to a component absent from
/// `components`
///
/// Cube filters are checked against the cube's own dimensions, everything
/// else against the chart's joined view of the catalogue.
#[must_use]
pub fn sanitize_chart_config(
    config: ChartConfig,
    components: &Components,
) -> (ChartConfig, Vec<UnresolvedReference>) {
    let original = config.clone();
    let mut reporter = Reporter {
        chart: &original,
        found: Vec::new(),
    };
    let mut config = config;
    let view = joined_components(&config.cubes, components);

    for cube in &mut config.cubes {
        let known = components.for_cube(&cube.iri);
        let stale: Vec<ComponentId> = cube
            .filters
            .keys()
            .filter(|id| known.dimension(id.as_str()).is_none())
            .cloned()
            .collect();
        for id in stale {
            cube.filters.shift_remove(&id);
            reporter.report(
                &id,
                ReferenceLocation::CubeFilter {
                    cube_iri: cube.iri.clone(),
                },
            );
        }
    }

    let stale_fields: Vec<_> = config
        .fields
        .iter()
        .filter(|(_, f)| !view.contains(f.component_id.as_str()))
        .map(|(slot, f)| (*slot, f.component_id.clone()))
        .collect();
    for (slot, id) in stale_fields {
        config.fields.shift_remove(&slot);
        reporter.report(&id, ReferenceLocation::Field { slot });
    }

    let interactive = &mut config.interactive_filters_config;
    if let Some(id) = interactive.legend.component_id.take() {
        if view.dimension(id.as_str()).is_some() {
            interactive.legend.component_id = Some(id);
        } else {
            interactive.legend.active = false;
            reporter.report(&id, ReferenceLocation::Legend);
        }
    }
    if let Some(id) = interactive.time_range.component_id.take() {
        if view.dimension(id.as_str()).is_some() {
            interactive.time_range.component_id = Some(id);
        } else {
            interactive.time_range.active = false;
            reporter.report(&id, ReferenceLocation::TimeRange);
        }
    }
    let ids = std::mem::take(&mut interactive.data_filters.component_ids);
    for id in ids {
        if view.dimension(id.as_str()).is_some() {
            interactive.data_filters.component_ids.push(id);
        } else {
            reporter.report(&id, ReferenceLocation::DataFilter);
        }
    }

    for annotation in &mut config.annotations {
        let targets = std::mem::take(&mut annotation.targets);
        for target in targets {
            if view.contains(target.component_id.as_str()) {
                annotation.targets.push(target);
            } else {
                reporter.report(
                    &target.component_id,
                    ReferenceLocation::AnnotationTarget {
                        key: annotation.key.clone(),
                    },
                );
            }
        }
    }

    (config, reporter.found)
}
