use std::sync::OnceLock;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use xlchart_dom::{ChildOrder, ElementPath, Leaf, SchemaRegistry, Step, XmlDocument};

const LEGEND_CHILDREN: [&str; 4] = ["legendPos", "layout", "overlay", "txPr"];

fn schema() -> &'static SchemaRegistry {
    static SCHEMA: OnceLock<SchemaRegistry> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        let mut registry = SchemaRegistry::new();
        registry.register(
            "legend",
            ChildOrder::new(&[
                &["legendPos"],
                &["legendEntry"],
                &["layout"],
                &["overlay"],
                &["spPr"],
                &["txPr"],
                &["extLst"],
            ]),
        );
        registry
    })
}

fn empty_legend() -> XmlDocument {
    XmlDocument::parse(
        br#"<c:legend xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"/>"#,
    )
    .expect("parse")
    .with_schema(schema())
}

fn child_names(doc: &XmlDocument) -> Vec<String> {
    doc.root
        .child_elements()
        .map(|c| c.name.local.clone())
        .collect()
}

proptest! {
    #[test]
    fn creation_order_never_leaks_into_sibling_order(
        order in Just((0..LEGEND_CHILDREN.len()).collect::<Vec<_>>()).prop_shuffle(),
        entries in proptest::collection::btree_set(0u32..20, 0..6),
        interleave_entries_first in any::<bool>(),
    ) {
        let mut doc = empty_legend();
        let add_entries = |doc: &mut XmlDocument| {
            for idx in entries.iter().rev() {
                let path = ElementPath::from([Step::c("legendEntry").keyed("idx", *idx)]);
                doc.set(&path.child(Step::c("delete")), Leaf::VAL, "1").expect("entry");
            }
        };
        if interleave_entries_first {
            add_entries(&mut doc);
        }
        for i in order {
            let path = ElementPath::from([Step::c(LEGEND_CHILDREN[i])]);
            doc.ensure(&path).expect("ensure");
        }
        if !interleave_entries_first {
            add_entries(&mut doc);
        }

        let mut expected = vec!["legendPos".to_string()];
        expected.extend(entries.iter().map(|_| "legendEntry".to_string()));
        expected.extend(["layout", "overlay", "txPr"].map(String::from));
        prop_assert_eq!(child_names(&doc), expected);

        let keys = doc.keyed_values(&ElementPath::root(), Step::c("legendEntry"), "idx");
        prop_assert_eq!(keys, entries.iter().copied().collect::<Vec<_>>());
    }
}

#[test]
fn written_document_reparses_with_same_values() {
    let mut doc = empty_legend();
    doc.set(&ElementPath::from([Step::c("overlay")]), Leaf::VAL, "0")
        .expect("overlay");
    doc.set(&ElementPath::from([Step::c("legendPos")]), Leaf::VAL, "t")
        .expect("pos");

    let reparsed = XmlDocument::parse(doc.to_xml_string().as_bytes()).expect("reparse");
    assert_eq!(
        reparsed.get(&ElementPath::from([Step::c("legendPos")]), Leaf::VAL),
        Some("t")
    );
    assert_eq!(child_names(&reparsed), vec!["legendPos", "overlay"]);
}
