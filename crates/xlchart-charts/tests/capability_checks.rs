use pretty_assertions::assert_eq;
use xlchart_charts::{
    ChartDocument, ChartError, ChartType, DataLabelPosition, DataSource, ErrorBarDirection, TrendlineType,
};

fn chart_with_series(chart_type: ChartType) -> ChartDocument {
    let mut chart = ChartDocument::new(chart_type).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    group
        .series_mut()
        .add(DataSource::Numbers(vec![1.0, 2.0, 3.0]), None)
        .expect("series");
    chart
}

#[test]
fn trendline_on_3d_series_is_refused_without_creating_a_node() {
    let mut chart = chart_with_series(ChartType::ColumnClustered3D);
    let before = chart.to_xml_string();
    {
        let mut groups = chart.groups_mut();
        let mut group = groups.get_mut(0).expect("group");
        let mut series = group.series_mut();
        let mut ser = series.get_mut(0).expect("series");
        let err = ser.trendlines_mut().add(TrendlineType::Linear).unwrap_err();
        assert!(matches!(
            err,
            ChartError::Unsupported {
                feature: "trendlines",
                chart_type: ChartType::ColumnClustered3D
            }
        ));
        assert!(ser.trendlines().is_empty());
    }
    assert_eq!(chart.to_xml_string(), before);
}

#[test]
fn trendlines_are_refused_on_stacked_groups() {
    let mut chart = chart_with_series(ChartType::LineStacked);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");
    assert!(matches!(
        ser.trendlines_mut().add(TrendlineType::Exponential),
        Err(ChartError::Unsupported { .. })
    ));
}

#[test]
fn trendline_order_requires_polynomial() {
    let mut chart = chart_with_series(ChartType::LineMarkers);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");
    let mut trendlines = ser.trendlines_mut();
    let mut trendline = trendlines.add(TrendlineType::Linear).expect("add");
    assert!(matches!(trendline.set_order(3), Err(ChartError::InvalidOperation(_))));

    trendline.set_kind(TrendlineType::Polynomial).expect("kind");
    trendline.set_order(3).expect("order");
    assert_eq!(trendline.order(), 3);
    assert!(matches!(trendline.set_order(7), Err(ChartError::OutOfRange { .. })));
    assert_eq!(trendlines.len(), 1);
}

#[test]
fn x_error_bars_need_an_xy_group() {
    let mut chart = chart_with_series(ChartType::ColumnClustered);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");
    let mut bars = ser.error_bars_mut();
    assert!(matches!(bars.add(ErrorBarDirection::X), Err(ChartError::InvalidOperation(_))));
    bars.add(ErrorBarDirection::Y).expect("y bars");
    assert!(matches!(bars.add(ErrorBarDirection::Y), Err(ChartError::InvalidOperation(_))));
    assert_eq!(bars.len(), 1);
}

#[test]
fn scatter_series_take_both_error_bar_directions() {
    let mut chart = chart_with_series(ChartType::XYScatter);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.get_mut(0).expect("series");
    let mut bars = ser.error_bars_mut();
    bars.add(ErrorBarDirection::X).expect("x");
    bars.add(ErrorBarDirection::Y).expect("y");
    assert_eq!(bars.directions(), vec![ErrorBarDirection::X, ErrorBarDirection::Y]);
}

#[test]
fn doughnut_labels_have_no_position() {
    let mut chart = chart_with_series(ChartType::Doughnut);
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let err = group
        .data_labels_mut()
        .set_position(Some(DataLabelPosition::OutEnd))
        .unwrap_err();
    assert!(matches!(err, ChartError::Unsupported { feature: "data label position", .. }));
    assert!(!group.data_labels().exists());
}

#[test]
fn group_properties_are_checked_against_the_family() {
    let mut chart = ChartDocument::new(ChartType::Pie).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    assert!(matches!(group.set_gap_width(100), Err(ChartError::Unsupported { .. })));
    group.set_first_slice_angle(90).expect("angle");
    assert_eq!(group.first_slice_angle(), 90);
}

#[test]
fn three_d_groups_do_not_combine() {
    let mut chart = ChartDocument::new(ChartType::Pie3D).expect("new");
    assert!(chart.groups_mut().add(ChartType::Line).is_err());

    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
    assert!(chart.groups_mut().add(ChartType::Line3D).is_err());
    chart.groups_mut().add(ChartType::Line).expect("combo");
    assert_eq!(
        chart.groups().chart_types(),
        vec![ChartType::ColumnClustered, ChartType::Line]
    );
}
