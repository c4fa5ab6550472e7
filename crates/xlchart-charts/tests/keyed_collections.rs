use pretty_assertions::assert_eq;
use proptest::prelude::*;
use xlchart_charts::{ChartDocument, ChartError, ChartType, DataSource};
use xlchart_dom::{Ns, XmlElement};

fn chart_with_series(chart_type: ChartType) -> ChartDocument {
    let mut chart = ChartDocument::new(chart_type).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    group
        .series_mut()
        .add(DataSource::from("Sheet1!$B$2:$B$7"), Some(DataSource::from("Sheet1!$A$2:$A$7")))
        .expect("series");
    chart
}

fn point_indices(ser: &XmlElement) -> Vec<String> {
    ser.child_elements()
        .filter(|el| el.name.is(Ns::Chart, "dPt"))
        .filter_map(|pt| pt.child(Ns::Chart, "idx")?.attr("val").map(str::to_string))
        .collect()
}

#[test]
fn data_point_lands_between_its_neighbours() {
    let mut chart = chart_with_series(ChartType::ColumnClustered);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");
    let mut points = ser.points_mut();
    for idx in [1, 2, 5] {
        points.add(idx).expect("add");
    }
    points.add(3).expect("add 3");
    assert_eq!(points.indices(), vec![1, 2, 3, 5]);
    assert_eq!(point_indices(ser.element().expect("ser")), vec!["1", "2", "3", "5"]);
}

#[test]
fn data_points_sit_before_the_values_slot() {
    let mut chart = chart_with_series(ChartType::ColumnClustered);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");
    ser.points_mut().add(4).expect("add");
    let names: Vec<&str> = ser
        .element()
        .expect("ser")
        .child_elements()
        .map(|el| el.name.local.as_str())
        .collect();
    assert_eq!(names, vec!["idx", "order", "invertIfNegative", "dPt", "cat", "val"]);
}

#[test]
fn duplicate_indices_are_rejected() {
    let mut chart = chart_with_series(ChartType::Pie);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");

    ser.points_mut().add(2).expect("first");
    let err = ser.points_mut().add(2).unwrap_err();
    assert!(matches!(err, ChartError::DuplicateIndex { index: 2, .. }));
    assert_eq!(ser.points().len(), 1);

    ser.data_labels_mut().overrides_mut().add(0).expect("label");
    let err = ser.data_labels_mut().overrides_mut().add(0).unwrap_err();
    assert!(matches!(err, ChartError::DuplicateIndex { index: 0, .. }));
}

#[test]
fn legend_entries_keep_ascending_order() {
    let mut chart = ChartDocument::new(ChartType::Line).expect("new");
    let mut legend = chart.legend_mut();
    let mut entries = legend.entries_mut();
    for idx in [4, 0, 2] {
        entries.add(idx).expect("add").set_deleted(true).expect("delete");
    }
    assert_eq!(entries.indices(), vec![0, 2, 4]);
    assert!(entries.get(2).expect("entry").deleted());
    assert!(entries.remove(2));
    assert_eq!(entries.indices(), vec![0, 4]);
    assert!(matches!(
        entries.add(4),
        Err(ChartError::DuplicateIndex { collection: "legend entries", index: 4 })
    ));
}

proptest! {
    #[test]
    fn point_order_is_independent_of_insertion_order(
        indices in proptest::collection::btree_set(0u32..40, 1..10)
            .prop_map(|set| set.into_iter().collect::<Vec<_>>())
            .prop_shuffle(),
    ) {
        let mut chart = chart_with_series(ChartType::LineMarkers);
        let mut groups = chart.groups_mut();
        let mut group = groups.get_mut(0).expect("group");
        let mut series = group.series_mut();
        let mut ser = series.get_mut(0).expect("series");
        let mut points = ser.points_mut();
        for idx in &indices {
            points.add(*idx).expect("add");
        }
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        prop_assert_eq!(points.indices(), sorted);
    }
}
