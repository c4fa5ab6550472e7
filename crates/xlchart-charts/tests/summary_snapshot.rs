use pretty_assertions::assert_eq;
use serde_json::json;
use xlchart_charts::{ChartDocument, ChartSummary, ChartType, DataSource, FIRST_AXIS_ID};

#[test]
fn summary_serializes_structure_in_camel_case() {
    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
    chart.set_title("Quarterly sales").expect("title");
    {
        let mut groups = chart.groups_mut();
        let mut group = groups.get_mut(0).expect("group");
        let mut series = group.series_mut();
        let mut ser = series
            .add(DataSource::from("Sheet1!$B$2:$B$5"), Some(DataSource::from("Sheet1!$A$2:$A$5")))
            .expect("series");
        ser.set_name("2024").expect("name");
    }

    let value = serde_json::to_value(chart.summary()).expect("json");
    assert_eq!(
        value,
        json!({
            "chartType": "columnClustered",
            "title": "Quarterly sales",
            "legend": "right",
            "groups": [{
                "family": "bar",
                "chartType": "columnClustered",
                "axisIds": [FIRST_AXIS_ID, FIRST_AXIS_ID + 1],
                "series": [{
                    "idx": 0,
                    "order": 0,
                    "name": "2024",
                    "values": { "kind": "reference", "data": "Sheet1!$B$2:$B$5" },
                    "categories": { "kind": "reference", "data": "Sheet1!$A$2:$A$5" },
                }],
            }],
            "axes": [
                {
                    "id": FIRST_AXIS_ID,
                    "kind": "category",
                    "position": "bottom",
                    "deleted": false,
                    "crossAxis": FIRST_AXIS_ID + 1,
                },
                {
                    "id": FIRST_AXIS_ID + 1,
                    "kind": "value",
                    "position": "left",
                    "deleted": false,
                    "crossAxis": FIRST_AXIS_ID,
                },
            ],
        })
    );

    let back: ChartSummary = serde_json::from_value(value).expect("deserialize");
    assert_eq!(back, chart.summary());
}

#[test]
fn pie_summary_has_no_axes() {
    let mut chart = ChartDocument::new(ChartType::PieExploded).expect("new");
    chart.remove_legend();
    let summary = chart.summary();
    assert_eq!(summary.chart_type, Some(ChartType::Pie));
    assert_eq!(summary.legend, None);
    assert!(summary.axes.is_empty());
    assert!(summary.groups[0].axis_ids.is_empty());
}
