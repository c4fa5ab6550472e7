use std::collections::HashSet;

use proptest::prelude::*;
use xlchart_package::ChartPackage;

const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";

fn part_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..4)
        .prop_map(|dirs| format!("{}.xml", dirs.join("/")))
}

proptest! {
    #[test]
    fn created_relationships_get_fresh_ids_and_resolve_back(
        source in part_name(),
        targets in prop::collection::vec(part_name(), 1..12),
    ) {
        let mut package = ChartPackage::new_workbook(&["Sheet1"]).unwrap();
        let existing = package.relationships(&source).unwrap().len();

        let mut ids = HashSet::new();
        for target in &targets {
            let id = package.create_relationship(&source, REL_TYPE, target).unwrap();
            prop_assert!(id.starts_with("rId"));
            prop_assert!(ids.insert(id.clone()), "{id} handed out twice");
            prop_assert_eq!(package.relationship_target(&source, &id).unwrap(), Some(target.clone()));
        }

        let rels = package.relationships(&source).unwrap();
        prop_assert_eq!(rels.len(), existing + targets.len());
        let all: HashSet<_> = rels.iter().map(|rel| rel.id.as_str()).collect();
        prop_assert_eq!(all.len(), rels.len());
    }
}

#[test]
fn ids_continue_past_the_highest_existing_number() {
    let mut package = ChartPackage::new_workbook(&["Sheet1"]).unwrap();
    let source = "xl/drawings/drawing1.xml";
    package.set_part(
        "xl/drawings/_rels/drawing1.xml.rels",
        br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId7" Type="t" Target="../charts/chart1.xml"/><Relationship Id="custom" Type="t" Target="../charts/chart2.xml"/></Relationships>"#.to_vec(),
    );
    let id = package
        .create_relationship(source, REL_TYPE, "xl/charts/chart3.xml")
        .unwrap();
    assert_eq!(id, "rId8");
    assert_eq!(
        package.relationship_target(source, "rId8").unwrap().as_deref(),
        Some("xl/charts/chart3.xml")
    );
}
