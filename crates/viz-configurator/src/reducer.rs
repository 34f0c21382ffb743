//! The configurator reducer
//!
//! [`reduce`] maps a state and an action to the next state. It never fails:
//! an action that does not apply leaves the state unchanged. Callers that
//! want dispatch errors go through [`crate::Configurator`].

use crate::action::{Action, InteractiveFilterKind, MetaField, MetaTarget};
use crate::chart::{add_dataset, change_chart_type, init_chart_config, remove_dataset};
use crate::field_update::{apply_field_update, FieldUpdate};
use crate::schema::chart_schema;
use crate::transition::validate_transition;
use tracing::{debug, info};
use viz_join::{cube_component_id, is_join_by_component_id, join_arity};
use viz_model::{
    Annotation, BlockContent, BlockKey, ChartConfig, ChartKey, ComponentId, ConfiguratorBody,
    ConfiguratorState, ConfiguratorStep, CubeConfig, DashboardArrangement, EncodingSlot,
    FilterValue, LayoutBlock, LayoutKind, Localized, SelectingDatasetBody,
};

/// Apply `action` to `state`
///
/// Pure: the input is consumed and the next state returned. Actions not
/// permitted in the current step, or whose preconditions do not hold, are
/// no-ops.
#[must_use]
pub fn reduce(state: ConfiguratorState, action: Action) -> ConfiguratorState {
    let step = state.step();
    let name = action.name();
    if !action.permitted_in(step) {
        debug!(action = name, %step, "action not permitted in step");
        return state;
    }

    match apply(&state, action) {
        Some(next) => {
            if next.step() != step {
                info!(from = %step, to = %next.step(), "configurator step changed");
            }
            next
        }
        None => {
            debug!(action = name, %step, "action did not apply");
            state
        }
    }
}

fn apply(state: &ConfiguratorState, action: Action) -> Option<ConfiguratorState> {
    match action {
        Action::SelectDataSource { data_source } => {
            if state.step() == ConfiguratorStep::Initial {
                validate_transition(state.step(), ConfiguratorStep::SelectingDataset).ok()?;
            }
            Some(ConfiguratorState::SelectingDataset(SelectingDatasetBody {
                version: state.version(),
                data_source,
            }))
        }
        Action::InitializeChart { iri, components } => {
            validate_transition(state.step(), ConfiguratorStep::ConfiguringChart).ok()?;
            let data_source = state.data_source()?.clone();
            let chart = init_chart_config(&iri, &components)?;
            Some(ConfiguratorState::ConfiguringChart(
                ConfiguratorBody::with_chart(data_source, chart),
            ))
        }
        Action::StepNext => {
            validate_transition(state.step(), ConfiguratorStep::Layouting).ok()?;
            let mut body = state.body()?.clone();
            sync_layout_blocks(&mut body);
            Some(ConfiguratorState::Layouting(body))
        }
        Action::StepBack => {
            validate_transition(state.step(), ConfiguratorStep::ConfiguringChart).ok()?;
            Some(ConfiguratorState::ConfiguringChart(state.body()?.clone()))
        }
        Action::Publish => {
            validate_transition(state.step(), ConfiguratorStep::Publishing).ok()?;
            let body = state.body()?.clone();
            if let Err(reason) = body.check_invariants() {
                debug!(%reason, "refusing to publish");
                return None;
            }
            Some(ConfiguratorState::Publishing(body))
        }

        Action::ChangeChartType {
            chart_type,
            components,
        } => edit_active_chart(state, |chart| {
            change_chart_type(chart, chart_type, &components)
        }),
        Action::UpdateField { update, components } => edit_active_chart(state, |chart| {
            apply_field_update(chart, &update, &components)
        }),
        Action::SetImputation { imputation } => edit_active_chart(state, |chart| {
            let update = FieldUpdate::SetImputation {
                slot: EncodingSlot::Y,
                imputation,
            };
            // option updates never consult the catalogue
            apply_field_update(chart, &update, &Default::default())
        }),
        Action::SetActiveField { field } => edit_active_chart(state, |chart| {
            let mut next = chart.clone();
            next.active_field = field;
            Some(next)
        }),
        Action::SetFilter {
            cube_iri,
            component_id,
            value,
        } => edit_active_chart(state, |chart| {
            set_filter(chart, cube_iri.as_deref(), &component_id, Some(value))
        }),
        Action::RemoveFilter {
            cube_iri,
            component_id,
        } => edit_active_chart(state, |chart| {
            set_filter(chart, cube_iri.as_deref(), &component_id, None)
        }),
        Action::AddDataset {
            iri,
            join_by,
            existing_join_by,
            components,
        } => edit_active_chart(state, |chart| {
            add_dataset(
                chart,
                &iri,
                &join_by,
                existing_join_by.as_deref(),
                &components,
            )
        }),
        Action::RemoveDataset { iri, components } => {
            edit_active_chart(state, |chart| remove_dataset(chart, &iri, &components))
        }

        Action::AddAnnotation { annotation } => edit_active_chart(state, |chart| {
            if chart.annotations.iter().any(|a| a.key == annotation.key) {
                return None;
            }
            let mut next = chart.clone();
            next.annotations.push(annotation);
            Some(next)
        }),
        Action::UpdateAnnotation { annotation } => edit_active_chart(state, |chart| {
            let mut next = chart.clone();
            let key = annotation.key.clone();
            *next.annotation_mut(&key)? = annotation;
            Some(next)
        }),
        Action::ChangeAnnotationTarget { key, targets } => edit_active_chart(state, |chart| {
            let mut next = chart.clone();
            next.annotation_mut(&key)?.targets = targets;
            Some(next)
        }),
        Action::RemoveAnnotation { key } => edit_active_chart(state, |chart| {
            let mut next = chart.clone();
            let position = next.annotations.iter().position(|a: &Annotation| a.key == key)?;
            next.annotations.remove(position);
            Some(next)
        }),

        Action::ToggleInteractiveFilter { filter, active } => {
            edit_active_chart(state, |chart| toggle_interactive_filter(chart, filter, active))
        }
        Action::ToggleInteractiveDataFilterDimension { component_id } => {
            edit_active_chart(state, |chart| {
                if chart.is_encoded(component_id.as_str()) {
                    return None;
                }
                let mut next = chart.clone();
                let data_filters = &mut next.interactive_filters_config.data_filters;
                match data_filters.component_ids.iter().position(|id| id == &component_id) {
                    Some(i) => {
                        data_filters.component_ids.remove(i);
                    }
                    None => data_filters.component_ids.push(component_id),
                }
                Some(next)
            })
        }

        Action::AddChart { iri, components } => edit_body(state, |body| {
            let chart = init_chart_config(&iri, &components)?;
            let key = chart.key.clone();
            body.layout.blocks.push(LayoutBlock::chart(&key));
            body.chart_configs.push(chart);
            body.active_chart_key = key;
            Some(())
        }),
        Action::DuplicateChart { chart_key } => edit_body(state, |body| {
            duplicate_chart(body, &chart_key).map(|_| ())
        }),
        Action::RemoveChart { chart_key } => edit_body(state, |body| remove_chart(body, &chart_key)),
        Action::SwitchActiveChart { chart_key } => edit_body(state, |body| {
            body.chart(&chart_key)?;
            body.active_chart_key = chart_key;
            Some(())
        }),
        Action::SetMeta {
            target,
            field,
            locale,
            value,
        } => edit_body(state, |body| {
            let meta = match target {
                MetaTarget::Chart => &mut body.active_chart_mut()?.meta,
                MetaTarget::Layout => &mut body.layout.meta,
            };
            let text: &mut Localized = match field {
                MetaField::Title => &mut meta.title,
                MetaField::Description => &mut meta.description,
            };
            text.set(locale, value);
            Some(())
        }),

        Action::AddLayoutBlock { block } => edit_body(state, |body| {
            if body.layout.position(&block.key).is_some() {
                return None;
            }
            if block.is_chart() && body.chart(&chart_key_of(&block.key)).is_none() {
                return None;
            }
            body.layout.blocks.push(block);
            Some(())
        }),
        Action::RemoveLayoutBlock { key } => edit_body(state, |body| {
            let position = body.layout.position(&key)?;
            if body.layout.blocks[position].is_chart() {
                remove_chart(body, &chart_key_of(&key))
            } else {
                body.layout.blocks.remove(position);
                Some(())
            }
        }),
        Action::DuplicateLayoutBlock { key } => edit_body(state, |body| {
            let position = body.layout.position(&key)?;
            let block = body.layout.blocks[position].clone();
            match block.content {
                BlockContent::Chart => duplicate_chart(body, &chart_key_of(&key)).map(|_| ()),
                BlockContent::Text { .. } => {
                    let copy = LayoutBlock {
                        key: BlockKey::generate(),
                        ..block
                    };
                    body.layout.blocks.insert(position + 1, copy);
                    Some(())
                }
            }
        }),
        Action::ReorderLayoutBlocks { from, to } => edit_body(state, |body| {
            let blocks = &mut body.layout.blocks;
            if from >= blocks.len() || to >= blocks.len() {
                return None;
            }
            let block = blocks.remove(from);
            blocks.insert(to, block);
            Some(())
        }),
        Action::SetLayoutKind { kind, arrangement } => edit_body(state, |body| {
            body.layout.kind = kind;
            body.layout.layout = match kind {
                LayoutKind::Dashboard => Some(arrangement.unwrap_or(DashboardArrangement::Vertical)),
                LayoutKind::Tab | LayoutKind::SingleUrls => None,
            };
            Some(())
        }),
        Action::SetDashboardTimeRange {
            active,
            time_unit,
            presets,
        } => edit_body(state, |body| {
            let time_range = &mut body.dashboard_filters.time_range;
            time_range.active = active;
            time_range.time_unit = time_unit;
            time_range.presets = presets;
            Some(())
        }),
        Action::SetDashboardDataFilter {
            component_id,
            value,
        } => edit_body(state, |body| {
            let data_filters = &mut body.dashboard_filters.data_filters;
            if !data_filters.component_ids.contains(&component_id) {
                data_filters.component_ids.push(component_id.clone());
            }
            data_filters.filters.insert(component_id, value);
            Some(())
        }),
        Action::RemoveDashboardDataFilter { component_id } => edit_body(state, |body| {
            let data_filters = &mut body.dashboard_filters.data_filters;
            let position = data_filters
                .component_ids
                .iter()
                .position(|id| id == &component_id)?;
            data_filters.component_ids.remove(position);
            data_filters.filters.shift_remove(&component_id);
            Some(())
        }),
    }
}

/// Replace the active chart with `f`'s result
fn edit_active_chart(
    state: &ConfiguratorState,
    f: impl FnOnce(&ChartConfig) -> Option<ChartConfig>,
) -> Option<ConfiguratorState> {
    let mut next = state.clone();
    let body = next.body_mut()?;
    let updated = f(body.active_chart()?)?;
    *body.active_chart_mut()? = updated;
    Some(next)
}

/// Mutate a copy of the body; `None` from `f` discards the copy
fn edit_body(
    state: &ConfiguratorState,
    f: impl FnOnce(&mut ConfiguratorBody) -> Option<()>,
) -> Option<ConfiguratorState> {
    let mut next = state.clone();
    f(next.body_mut()?)?;
    Some(next)
}

#[inline]
fn chart_key_of(block: &BlockKey) -> ChartKey {
    ChartKey::new(block.as_str())
}

/// Set (`Some`) or remove (`None`) an editor filter
fn set_filter(
    chart: &ChartConfig,
    cube_iri: Option<&str>,
    component_id: &ComponentId,
    value: Option<FilterValue>,
) -> Option<ChartConfig> {
    let mut next = chart.clone();
    let arity = join_arity(&chart.cubes);
    let owner = match cube_iri {
        None if !is_join_by_component_id(component_id.as_str()) => {
            Some(native_owner(&chart.cubes, component_id)?)
        }
        _ => None,
    };
    let mut touched = false;

    for (i, cube) in next.cubes.iter_mut().enumerate() {
        let addressed = match (cube_iri, owner) {
            (Some(iri), _) => cube.iri == iri,
            (None, Some(owner)) => i == owner,
            (None, None) => true,
        };
        if !addressed {
            continue;
        }
        let Some(local) = cube_component_id(cube, component_id.as_str(), arity) else {
            continue;
        };
        touched |= match &value {
            Some(value) => {
                cube.filters.insert(local, value.clone());
                true
            }
            None => cube.filters.shift_remove(&local).is_some(),
        };
    }
    touched.then_some(next)
}

/// Cube a native id belongs to when the caller names none
///
/// A single cube owns everything. In a joined chart the owner is the cube
/// already filtering on the id, else the one joining on it; otherwise the
/// id is ambiguous.
fn native_owner(cubes: &[CubeConfig], component_id: &ComponentId) -> Option<usize> {
    if cubes.len() < 2 {
        return Some(0);
    }
    cubes
        .iter()
        .position(|c| c.filters.contains_key(component_id))
        .or_else(|| {
            cubes
                .iter()
                .position(|c| c.join_position(component_id.as_str()).is_some())
        })
}

fn toggle_interactive_filter(
    chart: &ChartConfig,
    filter: InteractiveFilterKind,
    active: bool,
) -> Option<ChartConfig> {
    let mut next = chart.clone();
    let config = &mut next.interactive_filters_config;
    match filter {
        InteractiveFilterKind::Legend => {
            if active && config.legend.component_id.is_none() {
                return None;
            }
            config.legend.active = active;
        }
        InteractiveFilterKind::TimeRange => {
            if active && config.time_range.component_id.is_none() {
                return None;
            }
            config.time_range.active = active;
        }
        InteractiveFilterKind::DataFilters => config.data_filters.active = active,
        InteractiveFilterKind::Calculation => {
            let segmented = chart_schema(chart.chart_type).has_segment()
                && chart.segment_component().is_some();
            if active && !segmented {
                return None;
            }
            config.calculation.active = active;
        }
    }
    Some(next)
}

/// Copy `chart_key` under a fresh key right after the original, with its
/// block, and make it active
fn duplicate_chart(body: &mut ConfiguratorBody, chart_key: &ChartKey) -> Option<ChartKey> {
    let position = body.chart_configs.iter().position(|c| &c.key == chart_key)?;
    let mut copy = body.chart_configs[position].clone();
    copy.key = ChartKey::generate();
    let key = copy.key.clone();
    body.chart_configs.insert(position + 1, copy);

    let block = LayoutBlock::chart(&key);
    match body.layout.position(&BlockKey::from(chart_key)) {
        Some(i) => body.layout.blocks.insert(i + 1, block),
        None => body.layout.blocks.push(block),
    }
    body.active_chart_key = key.clone();
    Some(key)
}

/// Remove a chart and its block, repairing the active key
fn remove_chart(body: &mut ConfiguratorBody, chart_key: &ChartKey) -> Option<()> {
    if body.chart_configs.len() < 2 {
        return None;
    }
    let position = body.chart_configs.iter().position(|c| &c.key == chart_key)?;
    body.chart_configs.remove(position);
    let block_key = BlockKey::from(chart_key);
    body.layout.blocks.retain(|b| b.key != block_key);

    if &body.active_chart_key == chart_key {
        let fallback = position.min(body.chart_configs.len() - 1);
        body.active_chart_key = body.chart_configs[fallback].key.clone();
    }
    Some(())
}

/// Give every chart a block when entering layouting
fn sync_layout_blocks(body: &mut ConfiguratorBody) {
    for chart in &body.chart_configs {
        let key = BlockKey::from(&chart.key);
        if body.layout.position(&key).is_none() {
            body.layout.blocks.push(LayoutBlock::chart(&chart.key));
        }
    }
}
