use pretty_assertions::assert_eq;
use xlchart_charts::{BarDirection, BarGrouping, BarShape, ChartDocument, ChartType};
use xlchart_dom::{ElementPath, Leaf, Step};

fn bar_dir_path() -> ElementPath {
    ElementPath::from([Step::c("chart"), Step::c("plotArea"), Step::c("barChart"), Step::c("barDir")])
}

#[test]
fn column_becomes_bar_when_direction_changes() {
    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
    {
        let groups = chart.groups();
        let group = groups.get(0).expect("group");
        assert_eq!(group.direction(), BarDirection::Column);
        assert_eq!(group.shape(), BarShape::Box);
    }

    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    group.set_direction(BarDirection::Bar).expect("direction");

    assert_eq!(chart.xml().get(&bar_dir_path(), Leaf::VAL), Some("bar"));
    assert_eq!(chart.chart_type_of("barChart"), Some(ChartType::BarClustered));
    assert_eq!(chart.chart_type_of("c:barChart"), Some(ChartType::BarClustered));
    assert_eq!(chart.chart_type(), Some(ChartType::BarClustered));
}

#[test]
fn stacking_a_column_sets_full_overlap() {
    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    group.set_bar_grouping(BarGrouping::Stacked).expect("grouping");
    assert_eq!(group.overlap(), 100);
    group.set_bar_grouping(BarGrouping::Clustered).expect("grouping");
    assert_eq!(group.overlap(), 0);
    assert_eq!(chart.chart_type(), Some(ChartType::ColumnClustered));
}

#[test]
fn parsed_chart_classifies_every_group() {
    let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">
  <c:chart>
    <c:plotArea>
      <c:layout/>
      <c:barChart>
        <c:barDir val="col"/>
        <c:grouping val="percentStacked"/>
        <c:axId val="10"/>
        <c:axId val="20"/>
      </c:barChart>
      <c:lineChart>
        <c:grouping val="standard"/>
        <c:marker val="1"/>
        <c:axId val="10"/>
        <c:axId val="20"/>
      </c:lineChart>
      <c:catAx><c:axId val="10"/><c:crossAx val="20"/></c:catAx>
      <c:valAx><c:axId val="20"/><c:crossAx val="10"/></c:valAx>
    </c:plotArea>
  </c:chart>
</c:chartSpace>"#;
    let chart = ChartDocument::parse(xml).expect("parse");
    assert_eq!(
        chart.groups().chart_types(),
        vec![ChartType::ColumnStacked100, ChartType::LineMarkers]
    );
    assert_eq!(chart.chart_type(), Some(ChartType::ColumnStacked100));
    assert_eq!(chart.axes().ids(), vec![10, 20]);
}
