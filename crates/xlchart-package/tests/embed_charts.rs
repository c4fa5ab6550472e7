use pretty_assertions::assert_eq;
use xlchart_charts::{ChartDocument, ChartType, DataSource};
use xlchart_package::content_types::{CT_CHART, CT_DRAWING};
use xlchart_package::relationships::{REL_TYPE_CHART, REL_TYPE_DRAWING};
use xlchart_package::{
    AnchorPoint, ChartAnchor, ChartPackage, ChartPart, ChartPartKind, PackageError,
};

fn column_chart(title: &str) -> ChartDocument {
    let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("chart");
    chart.set_title(title).expect("title");
    let mut groups = chart.groups_mut();
    let mut group = groups.get_mut(0).expect("group");
    group
        .series_mut()
        .add(DataSource::from("Sheet1!$B$2:$B$5"), Some(DataSource::from("Sheet1!$A$2:$A$5")))
        .expect("series");
    chart
}

#[test]
fn first_chart_creates_drawing_and_relationships() {
    let mut pkg = ChartPackage::new_workbook(&["Sheet1"]).expect("workbook");
    let anchor = ChartAnchor::cells(4, 1, 12, 18).expect("anchor");
    let part = pkg.add_chart("Sheet1", &column_chart("Sales"), anchor).expect("add");
    assert_eq!(part, "xl/charts/chart1.xml");

    let sheet_rels = pkg.relationships("xl/worksheets/sheet1.xml").expect("sheet rels");
    assert_eq!(sheet_rels.len(), 1);
    assert_eq!(sheet_rels[0].type_uri, REL_TYPE_DRAWING);
    assert_eq!(sheet_rels[0].target, "../drawings/drawing1.xml");

    let drawing_rels = pkg.relationships("xl/drawings/drawing1.xml").expect("drawing rels");
    assert_eq!(drawing_rels.len(), 1);
    assert_eq!(drawing_rels[0].type_uri, REL_TYPE_CHART);
    assert_eq!(drawing_rels[0].target, "../charts/chart1.xml");

    assert_eq!(
        pkg.sheet_drawing("xl/worksheets/sheet1.xml").expect("drawing").as_deref(),
        Some("xl/drawings/drawing1.xml")
    );
    assert_eq!(pkg.content_type(&part).expect("ct").as_deref(), Some(CT_CHART));
    assert_eq!(
        pkg.content_type("xl/drawings/drawing1.xml").expect("ct").as_deref(),
        Some(CT_DRAWING)
    );

    let refs = pkg.chart_refs("xl/drawings/drawing1.xml").expect("refs");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].part.as_deref(), Some("xl/charts/chart1.xml"));
    assert_eq!(refs[0].name.as_deref(), Some("Chart 1"));
    assert_eq!(refs[0].anchor, Some(anchor));
}

#[test]
fn second_chart_reuses_the_sheet_drawing() {
    let mut pkg = ChartPackage::new_workbook(&["Sheet1"]).expect("workbook");
    pkg.add_chart("Sheet1", &column_chart("A"), ChartAnchor::default())
        .expect("first");
    let anchor = ChartAnchor::new(
        AnchorPoint {
            col: 10,
            col_offset: 95_250,
            row: 2,
            row_offset: 0,
        },
        AnchorPoint::cell(18, 20),
    )
    .expect("anchor");
    let line = ChartDocument::new(ChartType::LineMarkers).expect("line");
    let part = pkg.add_chart("sheet1", &line, anchor).expect("second");
    assert_eq!(part, "xl/charts/chart2.xml");

    assert!(!pkg.has_part("xl/drawings/drawing2.xml"));
    assert_eq!(pkg.relationships("xl/worksheets/sheet1.xml").expect("rels").len(), 1);

    let refs = pkg.chart_refs("xl/drawings/drawing1.xml").expect("refs");
    let summary: Vec<(&str, Option<&str>, Option<&str>)> = refs
        .iter()
        .map(|r| (r.rel_id.as_str(), r.part.as_deref(), r.name.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("rId1", Some("xl/charts/chart1.xml"), Some("Chart 1")),
            ("rId2", Some("xl/charts/chart2.xml"), Some("Chart 2")),
        ]
    );
    assert_eq!(refs[1].anchor, Some(anchor));
}

#[test]
fn charts_survive_a_zip_round_trip() {
    let mut pkg = ChartPackage::new_workbook(&["Data", "Dashboard"]).expect("workbook");
    let part = pkg
        .add_chart("Dashboard", &column_chart("Revenue"), ChartAnchor::default())
        .expect("add");

    let reread = ChartPackage::from_bytes(&pkg.write_to_bytes().expect("write")).expect("read");
    assert_eq!(
        reread.chart_parts().expect("charts"),
        vec![ChartPart {
            part: part.clone(),
            kind: ChartPartKind::Classic(Some(ChartType::ColumnClustered)),
        }]
    );

    let chart = reread.load_chart(&part).expect("load");
    assert_eq!(chart.title().text().as_deref(), Some("Revenue"));
    assert_eq!(
        reread.sheet_drawing("xl/worksheets/sheet2.xml").expect("drawing").as_deref(),
        Some("xl/drawings/drawing1.xml")
    );
    assert_eq!(reread.sheet_drawing("xl/worksheets/sheet1.xml").expect("drawing"), None);
}

#[test]
fn saved_chart_edits_are_persisted() {
    let mut pkg = ChartPackage::new_workbook(&["Sheet1"]).expect("workbook");
    let part = pkg
        .add_chart("Sheet1", &column_chart("Before"), ChartAnchor::default())
        .expect("add");

    let mut chart = pkg.load_chart(&part).expect("load");
    chart.set_title("After").expect("title");
    pkg.save_chart(&part, &chart).expect("save");
    assert_eq!(
        pkg.load_chart(&part).expect("reload").title().text().as_deref(),
        Some("After")
    );

    assert!(matches!(
        pkg.save_chart("xl/charts/chart9.xml", &chart),
        Err(PackageError::MissingPart(_))
    ));
}

#[test]
fn failed_add_leaves_package_untouched() {
    let mut pkg = ChartPackage::new_workbook(&["Sheet1"]).expect("workbook");
    let before = pkg.clone();
    let err = pkg
        .add_chart("Nope", &column_chart("x"), ChartAnchor::default())
        .unwrap_err();
    assert!(matches!(err, PackageError::MissingSheet(name) if name == "Nope"));
    assert_eq!(pkg, before);

    pkg.set_part("xl/worksheets/sheet1.xml", b"<worksheet".to_vec());
    let before = pkg.clone();
    assert!(pkg
        .add_chart("Sheet1", &column_chart("x"), ChartAnchor::default())
        .is_err());
    assert_eq!(pkg, before);
}

#[test]
fn extended_charts_are_reported_by_kind() {
    let mut pkg = ChartPackage::new_workbook(&["Sheet1"]).expect("workbook");
    let waterfall = br#"<cx:chartSpace xmlns:cx="http://schemas.microsoft.com/office/drawing/2014/chartex"><cx:chart><cx:plotArea><cx:plotAreaRegion><cx:series layoutId="waterfall" uniqueId="{0}"/></cx:plotAreaRegion></cx:plotArea></cx:chart></cx:chartSpace>"#;
    pkg.create_part(
        "xl/charts/chartEx1.xml",
        xlchart_package::content_types::CT_CHART_EX,
        waterfall.to_vec(),
    )
    .expect("create");
    pkg.add_chart("Sheet1", &ChartDocument::new(ChartType::Pie).expect("pie"), ChartAnchor::default())
        .expect("add");

    assert_eq!(
        pkg.chart_parts().expect("charts"),
        vec![
            ChartPart {
                part: "xl/charts/chart1.xml".into(),
                kind: ChartPartKind::Classic(Some(ChartType::Pie)),
            },
            ChartPart {
                part: "xl/charts/chartEx1.xml".into(),
                kind: ChartPartKind::Extended("waterfall".into()),
            },
        ]
    );
    assert!(matches!(
        pkg.load_chart("xl/charts/chartEx1.xml"),
        Err(PackageError::Chart(_))
    ));
}
