use pretty_assertions::assert_eq;
use xlchart_charts::{CellValue, ChartDocument, ChartType, DataSource, InMemoryCells};
use xlchart_dom::Ns;

fn chart_with_series(chart_type: ChartType, values: DataSource, categories: Option<DataSource>) -> ChartDocument {
    let mut chart = ChartDocument::new(chart_type).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    group.series_mut().add(values, categories).expect("series");
    chart
}

#[test]
fn switching_to_a_literal_drops_the_reference() {
    let mut chart = chart_with_series(
        ChartType::ColumnClustered,
        DataSource::from("Sheet1!$B$2:$B$4"),
        None,
    );
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");

    ser.set_values(DataSource::Numbers(vec![4.0, 5.5])).expect("literal");
    assert_eq!(ser.values(), Some(DataSource::Numbers(vec![4.0, 5.5])));
    let val = ser.element().and_then(|el| el.child(Ns::Chart, "val")).expect("val");
    let inner: Vec<&str> = val.child_elements().map(|el| el.name.local.as_str()).collect();
    assert_eq!(inner, vec!["numLit"]);

    ser.set_values(DataSource::from("Sheet1!$C$2:$C$4")).expect("reference");
    let val = ser.element().and_then(|el| el.child(Ns::Chart, "val")).expect("val");
    let inner: Vec<&str> = val.child_elements().map(|el| el.name.local.as_str()).collect();
    assert_eq!(inner, vec!["numRef"]);
    assert!(ser.cached_values().is_empty());
}

#[test]
fn idx_and_order_continue_across_groups() {
    let mut chart = chart_with_series(ChartType::ColumnClustered, DataSource::from("Sheet1!$B$2:$B$4"), None);
    chart.groups_mut().add(ChartType::Line).expect("line group");
    let mut groups = chart.groups_mut();
    let mut line = groups.get_mut(1).expect("line");
    let mut series = line.series_mut();
    let ser = series.add(DataSource::from("Sheet1!$C$2:$C$4"), None).expect("series");
    assert_eq!(ser.idx(), Some(1));
    assert_eq!(ser.order(), Some(1));
}

#[test]
fn removing_a_series_keeps_the_others() {
    let mut chart = chart_with_series(ChartType::Pie, DataSource::Numbers(vec![1.0]), None);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    series.add(DataSource::Numbers(vec![2.0]), None).expect("second");
    assert_eq!(series.indices(), vec![0, 1]);
    assert!(series.remove(0));
    assert!(!series.remove(0));
    assert_eq!(series.indices(), vec![1]);
}

#[test]
fn scatter_series_use_x_and_y_slots() {
    let chart = chart_with_series(
        ChartType::XYScatterLines,
        DataSource::from("Sheet1!$B$2:$B$9"),
        Some(DataSource::from("Sheet1!$A$2:$A$9")),
    );
    let groups = chart.groups();
    let group = groups.get(0).expect("group");
    let series = group.series();
    let ser = series.get(0).expect("series");
    assert_eq!(ser.y_values(), Some(DataSource::from("Sheet1!$B$2:$B$9")));
    assert_eq!(ser.x_values(), Some(DataSource::from("Sheet1!$A$2:$A$9")));
    assert_eq!(ser.values(), ser.y_values());
    assert!(!ser.smooth());
}

#[test]
fn refresh_rebuilds_value_category_and_name_caches() {
    let mut cells = InMemoryCells::new("Sheet1");
    cells
        .set_column("Sheet1", "B2", [1.0, 2.5, 4.0].map(CellValue::Number))
        .expect("values");
    cells
        .set_column(
            "Sheet1",
            "A2",
            ["North", "South", "East"].map(|s| CellValue::Text(s.to_string())),
        )
        .expect("categories");
    cells.set("Sheet1", "B1", CellValue::Text("Sales".into())).expect("name");

    let mut chart = chart_with_series(
        ChartType::LineMarkers,
        DataSource::from("Sheet1!$B$2:$B$4"),
        Some(DataSource::from("Sheet1!$A$2:$A$4")),
    );
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");
    ser.set_name_reference("Sheet1!$B$1").expect("name ref");

    assert_eq!(ser.refresh_cache(&cells).expect("refresh"), 3);
    assert_eq!(
        ser.cached_values(),
        vec![Some("1".to_string()), Some("2.5".to_string()), Some("4".to_string())]
    );
    assert_eq!(
        ser.cached_categories(),
        vec![Some("North".to_string()), Some("South".to_string()), Some("East".to_string())]
    );
    assert_eq!(ser.name().as_deref(), Some("Sales"));
    assert_eq!(ser.name_reference().as_deref(), Some("Sheet1!$B$1"));
}
