use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;
use viz_interactive::{InteractiveFilterStoreRegistry, TimeRange};
use viz_model::{ChartKey, ComponentId, FilterValue};
use viz_test_utils::population_chart;

fn charts() -> Vec<ChartKey> {
    ["chart1", "chart2", "chart3"].into_iter().map(ChartKey::new).collect()
}

fn id(s: &str) -> ComponentId {
    ComponentId::new(s)
}

#[test]
fn restore_reverts_only_its_own_dimension() {
    let registry = InteractiveFilterStoreRegistry::new();
    let charts = charts();
    let chart1 = &charts[0];
    for key in &charts {
        registry.with_store(key, |s| {
            s.set_data_filter(id("component1"), Some(FilterValue::single("initial1")));
            s.set_data_filter(id("component2"), Some(FilterValue::single("initial2")));
        });
    }

    registry.snapshot(&id("component1"), &charts);
    registry.with_store(chart1, |s| {
        s.set_data_filter(id("component1"), Some(FilterValue::single("changed1")));
        s.set_data_filter(id("component2"), Some(FilterValue::single("changed2")));
    });
    registry.snapshot(&id("component3"), &charts);
    registry.with_store(chart1, |s| {
        s.set_data_filter(id("component3"), Some(FilterValue::single("changed3")));
    });

    assert!(registry.restore(&id("component1")));
    let state = registry.state(chart1).unwrap();
    assert_eq!(state.data_filter("component1"), Some(&FilterValue::single("initial1")));
    assert_eq!(state.data_filter("component2"), Some(&FilterValue::single("changed2")));
    assert_eq!(state.data_filter("component3"), Some(&FilterValue::single("changed3")));

    assert!(registry.restore(&id("component3")));
    let state = registry.state(chart1).unwrap();
    assert!(state.data_filter("component3").is_none());
    assert_eq!(state.data_filter("component2"), Some(&FilterValue::single("changed2")));

    for key in &charts[1..] {
        let state = registry.state(key).unwrap();
        assert_eq!(state.data_filter("component1"), Some(&FilterValue::single("initial1")));
        assert_eq!(state.data_filter("component2"), Some(&FilterValue::single("initial2")));
    }
}

#[test]
fn sync_drops_stores_of_removed_charts() {
    let registry = InteractiveFilterStoreRegistry::new();
    registry.with_store(&ChartKey::new("stale"), |s| s.toggle_category("x"));

    let chart = population_chart();
    registry.sync_all([&chart]);
    assert_eq!(registry.keys(), vec![chart.key.clone()]);
}

#[test]
fn time_range_broadcast_reaches_every_participant() {
    let registry = InteractiveFilterStoreRegistry::new();
    let range = TimeRange::new("2019", "2021");
    registry.broadcast_time_range(Some(&range), &charts());
    for key in charts() {
        assert_eq!(registry.state(&key).unwrap().time_range, Some(range.clone()));
    }
}

#[test]
fn stores_are_independent_across_threads() {
    let registry = Arc::new(InteractiveFilterStoreRegistry::new());
    let handles: Vec<_> = charts()
        .into_iter()
        .map(|key| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for i in 0..100 {
                    registry.with_store(&key, |s| {
                        s.set_data_filter(id("n"), Some(FilterValue::single(i.to_string())));
                    });
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    for key in charts() {
        assert_eq!(
            registry.state(&key).unwrap().data_filter("n"),
            Some(&FilterValue::single("99"))
        );
    }
}

proptest! {
    #[test]
    fn prop_snapshots_compose_in_any_restore_order(
        initial in proptest::collection::vec(proptest::option::of("[a-z]{1,4}"), 6),
        broadcast in proptest::collection::vec("[a-z]{1,4}", 2),
        restore_a_first in any::<bool>(),
    ) {
        let registry = InteractiveFilterStoreRegistry::new();
        let charts = charts();
        let dims = [id("a"), id("b")];

        for (i, key) in charts.iter().enumerate() {
            registry.with_store(key, |s| {
                for (j, dim) in dims.iter().enumerate() {
                    let value = initial[i * 2 + j].clone().map(|v: String| FilterValue::single(v));
                    s.set_data_filter(dim.clone(), value);
                }
            });
        }
        let before: Vec<_> = charts.iter().map(|k| registry.state(k).unwrap()).collect();

        registry.broadcast_data_filter(&dims[0], &FilterValue::single(broadcast[0].clone()), &charts);
        registry.broadcast_data_filter(&dims[1], &FilterValue::single(broadcast[1].clone()), &charts);

        let order = if restore_a_first { [&dims[0], &dims[1]] } else { [&dims[1], &dims[0]] };
        for dim in order {
            prop_assert!(registry.restore(dim));
        }

        for (key, expected) in charts.iter().zip(&before) {
            let state = registry.state(key).unwrap();
            for dim in &dims {
                prop_assert_eq!(state.data_filter(dim.as_str()), expected.data_filter(dim.as_str()));
            }
        }
    }
}
