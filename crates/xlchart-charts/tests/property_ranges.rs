use pretty_assertions::assert_eq;
use proptest::prelude::*;
use xlchart_charts::{ChartDocument, ChartError, ChartType, DataSource, FIRST_AXIS_ID};

proptest! {
    #[test]
    fn gap_width_round_trips_inside_its_range(width in 0u32..=500) {
        let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
        let mut groups = chart.groups_mut();
        let mut group = groups.get_mut(0).expect("group");
        group.set_gap_width(width).expect("in range");
        prop_assert_eq!(group.gap_width(), width);
    }

    #[test]
    fn gap_width_outside_its_range_leaves_the_document_alone(width in 501u32..100_000) {
        let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
        let before = chart.to_xml_string();
        {
            let mut groups = chart.groups_mut();
            let mut group = groups.get_mut(0).expect("group");
            let rejected = matches!(group.set_gap_width(width), Err(ChartError::OutOfRange { .. }));
            prop_assert!(rejected);
        }
        prop_assert_eq!(chart.to_xml_string(), before);
    }

    #[test]
    fn overlap_accepts_exactly_minus_100_to_100(overlap in -300i32..300) {
        let mut chart = ChartDocument::new(ChartType::BarClustered).expect("new");
        let mut groups = chart.groups_mut();
        let mut group = groups.get_mut(0).expect("group");
        let result = group.set_overlap(overlap);
        prop_assert_eq!(result.is_ok(), (-100..=100).contains(&overlap));
    }

    #[test]
    fn view_rotation_bounds(rot_x in -200i32..200, rot_y in 0u32..720) {
        let mut chart = ChartDocument::new(ChartType::Column3D).expect("new");
        let mut view = chart.view_3d_mut();
        prop_assert_eq!(view.set_rot_x(rot_x).is_ok(), (-90..=90).contains(&rot_x));
        prop_assert_eq!(view.set_rot_y(rot_y).is_ok(), rot_y <= 360);
    }
}

#[test]
fn hole_size_bounds_are_inclusive() {
    let mut chart = ChartDocument::new(ChartType::Doughnut).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    assert_eq!(group.hole_size(), 50);
    for ok in [10, 90] {
        group.set_hole_size(ok).expect("bound");
        assert_eq!(group.hole_size(), ok);
    }
    for bad in [9, 91] {
        assert!(matches!(group.set_hole_size(bad), Err(ChartError::OutOfRange { .. })));
    }
    assert_eq!(group.hole_size(), 90);
}

#[test]
fn bubble_scale_is_limited_to_300_percent() {
    let mut chart = ChartDocument::new(ChartType::Bubble).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    group.set_bubble_scale(300).expect("max");
    group.set_bubble_scale(0).expect("min");
    assert!(group.set_bubble_scale(301).is_err());
    assert_eq!(group.bubble_scale(), 0);
}

#[test]
fn explosion_accepts_0_to_400_on_series_and_points() {
    let mut chart = ChartDocument::new(ChartType::Pie).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series
        .add(DataSource::Numbers(vec![1.0, 2.0, 3.0]), None)
        .expect("series");

    assert_eq!(ser.explosion(), 0);
    for ok in [0, 400] {
        ser.set_explosion(ok).expect("series bound");
        assert_eq!(ser.explosion(), ok);
    }
    assert!(matches!(ser.set_explosion(401), Err(ChartError::OutOfRange { .. })));
    assert_eq!(ser.explosion(), 400);

    let mut points = ser.points_mut();
    let mut point = points.add(1).expect("point");
    for ok in [0, 400] {
        point.set_explosion(ok).expect("point bound");
        assert_eq!(point.explosion(), ok);
    }
    assert!(matches!(point.set_explosion(401), Err(ChartError::OutOfRange { .. })));
    assert_eq!(point.explosion(), 400);
}

#[test]
fn explosion_needs_a_pie_family_series() {
    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    let mut series = group.series_mut();
    let mut ser = series.add(DataSource::Numbers(vec![1.0]), None).expect("series");
    assert!(matches!(ser.set_explosion(10), Err(ChartError::Unsupported { .. })));
}

#[test]
fn log_base_bounds_are_inclusive() {
    let mut chart = ChartDocument::new(ChartType::LineMarkers).expect("new");
    let mut axes = chart.axes_mut();
    let mut axis = axes.get_mut(FIRST_AXIS_ID + 1).expect("value axis");
    for ok in [2.0, 1000.0] {
        axis.set_log_base(Some(ok)).expect("bound");
        assert_eq!(axis.log_base(), Some(ok));
    }
    for bad in [1.999, 1000.5] {
        assert!(matches!(axis.set_log_base(Some(bad)), Err(ChartError::OutOfRange { .. })));
    }
    assert_eq!(axis.log_base(), Some(1000.0));
}

#[test]
fn axis_log_base_and_units() {
    let mut chart = ChartDocument::new(ChartType::LineMarkers).expect("new");
    let mut axes = chart.axes_mut();
    let mut axis = axes.get_mut(FIRST_AXIS_ID + 1).expect("value axis");
    assert!(matches!(axis.set_log_base(Some(1.5)), Err(ChartError::OutOfRange { .. })));
    axis.set_log_base(Some(10.0)).expect("log");
    assert_eq!(axis.log_base(), Some(10.0));
    axis.set_log_base(None).expect("linear");
    assert_eq!(axis.log_base(), None);

    assert!(axis.set_major_unit(Some(0.0)).is_err());
    axis.set_major_unit(Some(0.25)).expect("unit");
    assert_eq!(axis.major_unit(), Some(0.25));

    let mut category = axes.get_mut(FIRST_AXIS_ID).expect("category axis");
    assert!(matches!(category.set_major_unit(Some(1.0)), Err(ChartError::InvalidOperation(_))));
    assert!(category.set_label_offset(1001).is_err());
    category.set_label_offset(1000).expect("offset");
    assert_eq!(category.label_offset(), 1000);
    assert!(category.set_tick_label_skip(Some(0)).is_err());
}

#[test]
fn crosses_and_crosses_at_exclude_each_other() {
    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
    let mut axes = chart.axes_mut();
    let mut axis = axes.get_mut(FIRST_AXIS_ID + 1).expect("value axis");
    axis.set_crosses_at(2.5).expect("at");
    assert_eq!(axis.crosses_at(), Some(2.5));
    assert_eq!(axis.crosses(), None);
    axis.set_crosses(xlchart_charts::Crosses::Max).expect("max");
    assert_eq!(axis.crosses_at(), None);
    assert_eq!(axis.crosses(), Some(xlchart_charts::Crosses::Max));
}

#[test]
fn non_finite_crossing_value_keeps_crosses() {
    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
    let mut axes = chart.axes_mut();
    let mut axis = axes.get_mut(FIRST_AXIS_ID + 1).expect("value axis");
    axis.set_crosses(xlchart_charts::Crosses::AutoZero).expect("auto zero");
    for bad in [f64::NAN, f64::INFINITY] {
        assert!(matches!(axis.set_crosses_at(bad), Err(ChartError::OutOfRange { .. })));
    }
    assert_eq!(axis.crosses(), Some(xlchart_charts::Crosses::AutoZero));
    assert_eq!(axis.crosses_at(), None);
}
