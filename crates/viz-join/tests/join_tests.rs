use pretty_assertions::assert_eq;
use proptest::prelude::*;
use viz_join::{
    get_chart_config_filters, group_prepared_filters_by_dimension, join_by_component_id,
    prepare_filters, FilterOptions,
};
use viz_model::{
    ChartConfig, ChartType, ComponentId, CubeConfig, EncodingSlot, FieldConfig, FilterValue,
    Filters,
};
use viz_test_utils::{joined_chart, joined_components, single_filters};

#[test]
fn literal_join_example() {
    let cubes = vec![
        CubeConfig::new("cube1")
            .with_filters(single_filters(&[("d1", "v1"), ("d2", "v2")]))
            .with_join_by(["d1"]),
        CubeConfig::new("cube2")
            .with_filters(single_filters(&[("d3", "v1"), ("d4", "v4")]))
            .with_join_by(["d3"]),
    ];

    let joined = get_chart_config_filters(&cubes, FilterOptions::joined());
    assert_eq!(
        joined,
        single_filters(&[("joinBy__0", "v1"), ("d2", "v2"), ("d4", "v4")])
    );
}

#[test]
fn unequal_join_lists_stop_at_the_shorter() {
    let cubes = vec![
        CubeConfig::new("a")
            .with_filters(single_filters(&[("y", "2020"), ("g", "ZH")]))
            .with_join_by(["y", "g"]),
        CubeConfig::new("b")
            .with_filters(single_filters(&[("year", "2020"), ("geo", "ZH")]))
            .with_join_by(["year"]),
    ];

    let joined = get_chart_config_filters(&cubes, FilterOptions::joined());
    assert_eq!(
        joined,
        single_filters(&[("joinBy__0", "2020"), ("g", "ZH"), ("geo", "ZH")])
    );
}

#[test]
fn placeholder_group_lists_each_cube_once_with_its_own_id() {
    let chart = joined_chart();
    let components = joined_components();
    let interactive: Filters = [(join_by_component_id(0), FilterValue::single("2020"))]
        .into_iter()
        .collect();

    let prepared = prepare_filters(&chart, &interactive, &components);
    let groups = group_prepared_filters_by_dimension(&prepared, &[join_by_component_id(0)]);

    assert_eq!(groups.len(), 1);
    let entries = &groups[0].entries;
    assert_eq!(entries.len(), chart.cubes.len());
    for (entry, cube) in entries.iter().zip(&chart.cubes) {
        assert_eq!(entry.cube_iri, cube.iri);
        assert_eq!(&entry.resolved_dimension_id, &cube.join_by()[0]);
        assert_eq!(
            entry.interactive_filters.get(cube.join_by()[0].as_str()),
            Some(&FilterValue::single("2020"))
        );
    }
}

#[test]
fn unjoined_chart_groups_by_native_id() {
    let mut chart = ChartConfig::new(ChartType::Column, vec![CubeConfig::new("solo")]);
    chart.fields.insert(EncodingSlot::X, FieldConfig::new("canton"));
    let components = viz_model::Components::new().with_dimension(viz_model::Dimension::new(
        "canton",
        "solo",
        viz_model::DimensionKind::Nominal,
        ["ZH"],
    ));

    let prepared = prepare_filters(&chart, &Filters::new(), &components);
    let groups = group_prepared_filters_by_dimension(&prepared, &[ComponentId::new("canton")]);
    assert_eq!(groups[0].entries[0].resolved_dimension_id.as_str(), "canton");
}

fn filter_value() -> impl Strategy<Value = FilterValue> {
    prop_oneof![
        "[a-z0-9]{1,4}".prop_map(|v: String| FilterValue::single(v)),
        proptest::collection::vec("[a-z]{1,3}", 1..4).prop_map(|v: Vec<String>| FilterValue::multi(v)),
        ("[0-9]{4}", "[0-9]{4}").prop_map(|(a, b)| FilterValue::range(a, b)),
    ]
}

fn cube(prefix: &'static str) -> impl Strategy<Value = CubeConfig> {
    proptest::collection::vec(filter_value(), 0..6).prop_map(move |values| {
        let filters: Filters = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (ComponentId::new(format!("{prefix}_{i}")), v))
            .collect();
        CubeConfig::new(prefix).with_filters(filters)
    })
}

proptest! {
    #[test]
    fn prop_native_filters_round_trip_per_cube(a in cube("a"), b in cube("b"), c in cube("c")) {
        let cubes = vec![a, b, c];
        for cube in &cubes {
            let out = get_chart_config_filters(&cubes, FilterOptions::native().for_cube(&cube.iri));
            prop_assert_eq!(&out, &cube.filters);
        }

        let union = get_chart_config_filters(&cubes, FilterOptions::native());
        let total: usize = cubes.iter().map(|c| c.filters.len()).sum();
        prop_assert_eq!(union.len(), total);
    }

    #[test]
    fn prop_joined_view_has_one_key_per_axis(n in 1usize..4, cubes_count in 2usize..4) {
        let cubes: Vec<CubeConfig> = (0..cubes_count)
            .map(|c| {
                let ids: Vec<String> = (0..n).map(|i| format!("c{c}_d{i}")).collect();
                let filters: Filters = ids
                    .iter()
                    .map(|id| (ComponentId::new(id.as_str()), FilterValue::single("v")))
                    .collect();
                CubeConfig::new(format!("cube{c}")).with_filters(filters).with_join_by(ids)
            })
            .collect();

        let joined = get_chart_config_filters(&cubes, FilterOptions::joined());
        prop_assert_eq!(joined.len(), n);
        for i in 0..n {
            prop_assert!(joined.contains_key(join_by_component_id(i).as_str()));
        }
    }
}
