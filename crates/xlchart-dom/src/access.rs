//! Path-indexed reads and writes on an [`XmlDocument`].
//!
//! All tree mutation done by the chart model goes through these methods: reads never create
//! nodes, writes create each missing segment at its schema-ordered position.

use crate::error::DomError;
use crate::path::{ElementPath, Filter, Leaf, Step};
use crate::xml::{XmlDocument, XmlElement, XmlNode};

fn select_index(parent: &XmlElement, step: &Step) -> Option<usize> {
    let mut seen = 0usize;
    for (i, node) in parent.children.iter().enumerate() {
        let XmlNode::Element(child) = node else {
            continue;
        };
        if !step.matches(child) {
            continue;
        }
        match step.filter {
            Filter::Any => return Some(i),
            Filter::Nth(n) => {
                if seen == n {
                    return Some(i);
                }
                seen += 1;
            }
            Filter::Keyed { key, value } => {
                if step.key_of(child, key) == Some(value) {
                    return Some(i);
                }
            }
        }
    }
    None
}

fn select<'a>(parent: &'a XmlElement, step: &Step) -> Option<&'a XmlElement> {
    match parent.children.get(select_index(parent, step)?) {
        Some(XmlNode::Element(el)) => Some(el),
        _ => None,
    }
}

fn element_at(parent: &mut XmlElement, index: usize) -> Option<&mut XmlElement> {
    match parent.children.get_mut(index) {
        Some(XmlNode::Element(el)) => Some(el),
        _ => None,
    }
}

/// Builds the element a step describes. Keyed steps carry their key child.
fn create(parent: &XmlElement, step: &Step) -> Result<XmlElement, DomError> {
    let mut el = XmlElement::new(crate::xml::QName::in_ns(step.ns, step.local));
    match step.filter {
        Filter::Any => {}
        Filter::Nth(n) => {
            let existing = parent.child_elements().filter(|c| step.matches(c)).count();
            if existing != n {
                return Err(DomError::MissingSibling {
                    parent: parent.name.local.clone(),
                    step: step.to_string(),
                    existing,
                });
            }
        }
        Filter::Keyed { key, value } => {
            el.children.push(XmlNode::Element(
                XmlElement::new(crate::xml::QName::in_ns(step.ns, key))
                    .with_attr("val", value.to_string()),
            ));
        }
    }
    Ok(el)
}

impl XmlDocument {
    pub fn find(&self, path: &ElementPath) -> Option<&XmlElement> {
        path.steps()
            .iter()
            .try_fold(&self.root, |current, step| select(current, step))
    }

    pub fn find_mut(&mut self, path: &ElementPath) -> Option<&mut XmlElement> {
        let mut current = &mut self.root;
        for step in path.steps() {
            let index = select_index(current, step)?;
            current = element_at(current, index)?;
        }
        Some(current)
    }

    pub fn exists(&self, path: &ElementPath) -> bool {
        self.find(path).is_some()
    }

    pub fn get(&self, path: &ElementPath, leaf: Leaf) -> Option<&str> {
        let el = self.find(path)?;
        match leaf {
            Leaf::Attr(name) => el.attr(name),
            Leaf::Text => el.text(),
        }
    }

    /// Returns the element at `path`, creating every missing segment.
    pub fn ensure(&mut self, path: &ElementPath) -> Result<&mut XmlElement, DomError> {
        let schema = self.schema();
        let steps = path.steps();
        let mut current = &mut self.root;
        for (k, step) in steps.iter().enumerate() {
            let index = match select_index(current, step) {
                Some(index) => index,
                None => {
                    let el = create(current, step)?;
                    let context = ElementPath::context_of_parent(steps, k);
                    let at = schema.insertion_index(current, context, step);
                    log::debug!("creating {step} in <{}> at child {at}", current.name.local);
                    current.children.insert(at, XmlNode::Element(el));
                    at
                }
            };
            current = element_at(current, index)
                .ok_or_else(|| DomError::NotFound(path.to_string()))?;
        }
        Ok(current)
    }

    pub fn set(&mut self, path: &ElementPath, leaf: Leaf, value: impl Into<String>) -> Result<(), DomError> {
        let el = self.ensure(path)?;
        match leaf {
            Leaf::Attr(name) => el.set_attr(name, value),
            Leaf::Text => el.set_text(value),
        }
        Ok(())
    }

    /// Inserts `element` under `parent` at its schema position, after any same-named siblings.
    /// Returns the child index it landed at.
    pub fn insert_element(&mut self, parent: &ElementPath, element: XmlElement) -> Result<usize, DomError> {
        let schema = self.schema();
        let context = ElementPath::context_of_parent(parent.steps(), parent.len());
        let target = self.ensure(parent)?;
        let at = schema.insertion_index_by_name(target, context, &element.name.local);
        target.children.insert(at, XmlNode::Element(element));
        Ok(at)
    }

    /// Like [`XmlDocument::insert_element`], replacing any existing children with the same name.
    pub fn put_element(&mut self, parent: &ElementPath, element: XmlElement) -> Result<(), DomError> {
        if let Some(target) = self.find_mut(parent) {
            target.children.retain(|node| match node {
                XmlNode::Element(child) => child.name != element.name,
                XmlNode::Text(_) => true,
            });
        }
        self.insert_element(parent, element)?;
        Ok(())
    }

    pub fn delete(&mut self, path: &ElementPath) -> Option<XmlElement> {
        let (parent, last) = path.split_last()?;
        let parent = self.find_mut(&parent)?;
        let index = select_index(parent, &last)?;
        match parent.children.remove(index) {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        }
    }

    /// Removes an attribute or the text at `path`. Returns whether anything was removed.
    pub fn delete_value(&mut self, path: &ElementPath, leaf: Leaf) -> bool {
        let Some(el) = self.find_mut(path) else {
            return false;
        };
        match leaf {
            Leaf::Attr(name) => el.remove_attr(name).is_some(),
            Leaf::Text => el.clear_text(),
        }
    }

    /// Elements under `parent` with the step's name, in document order. The step's filter is ignored.
    pub fn find_all(&self, parent: &ElementPath, step: Step) -> Vec<&XmlElement> {
        match self.find(parent) {
            Some(el) => el.child_elements().filter(|c| step.matches(c)).collect(),
            None => Vec::new(),
        }
    }

    pub fn count(&self, parent: &ElementPath, step: Step) -> usize {
        self.find_all(parent, step).len()
    }

    /// Integer keys of the named children under `parent`, in document order.
    pub fn keyed_values(&self, parent: &ElementPath, step: Step, key: &str) -> Vec<u32> {
        self.find_all(parent, step)
            .into_iter()
            .filter_map(|el| step.key_of(el, key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{ChildOrder, SchemaRegistry};
    use crate::ns::Ns;
    use std::sync::OnceLock;

    fn schema() -> &'static SchemaRegistry {
        static SCHEMA: OnceLock<SchemaRegistry> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let mut registry = SchemaRegistry::new();
            registry.register(
                "chart",
                ChildOrder::new(&[&["title"], &["autoTitleDeleted"], &["plotArea"], &["legend"]]),
            );
            registry.register("legend", ChildOrder::new(&[&["legendPos"], &["legendEntry"], &["overlay"]]));
            registry
        })
    }

    fn doc() -> XmlDocument {
        XmlDocument::parse(
            br#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart><c:plotArea/></c:chart></c:chartSpace>"#,
        )
        .expect("parse")
        .with_schema(schema())
    }

    fn names(el: &XmlElement) -> Vec<&str> {
        el.child_elements().map(|c| c.name.local.as_str()).collect()
    }

    #[test]
    fn get_does_not_create() {
        let doc = doc();
        let path = ElementPath::from([Step::c("chart"), Step::c("legend"), Step::c("legendPos")]);
        assert_eq!(doc.get(&path, Leaf::VAL), None);
        assert!(!doc.exists(&path));
    }

    #[test]
    fn set_creates_chain_in_schema_order() {
        let mut doc = doc();
        let legend_pos = ElementPath::from([Step::c("chart"), Step::c("legend"), Step::c("legendPos")]);
        let title_deleted = ElementPath::from([Step::c("chart"), Step::c("autoTitleDeleted")]);
        doc.set(&legend_pos, Leaf::VAL, "b").expect("set");
        doc.set(&title_deleted, Leaf::VAL, "1").expect("set");

        let chart = doc.root.child(Ns::Chart, "chart").expect("chart");
        assert_eq!(names(chart), vec!["autoTitleDeleted", "plotArea", "legend"]);
        assert_eq!(doc.get(&legend_pos, Leaf::VAL), Some("b"));
    }

    #[test]
    fn nth_creation_requires_previous_siblings() {
        let mut doc = doc();
        let second = ElementPath::from([Step::c("chart"), Step::c("plotArea").nth(2)]);
        let err = doc.ensure(&second).unwrap_err();
        assert!(matches!(err, DomError::MissingSibling { existing: 1, .. }));

        let next = ElementPath::from([Step::c("chart"), Step::c("plotArea").nth(1)]);
        doc.ensure(&next).expect("create second");
        assert_eq!(doc.count(&ElementPath::from([Step::c("chart")]), Step::c("plotArea")), 2);
    }

    #[test]
    fn keyed_creation_adds_key_child_in_key_order() {
        let mut doc = doc();
        let legend = ElementPath::from([Step::c("chart"), Step::c("legend")]);
        for idx in [4, 1, 2] {
            doc.ensure(&legend.child(Step::c("legendEntry").keyed("idx", idx)))
                .expect("entry");
        }
        doc.set(&legend.child(Step::c("legendPos")), Leaf::VAL, "r").expect("pos");
        assert_eq!(doc.keyed_values(&legend, Step::c("legendEntry"), "idx"), vec![1, 2, 4]);
        let legend_el = doc.find(&legend).expect("legend");
        assert_eq!(names(legend_el)[0], "legendPos");
    }

    #[test]
    fn delete_removes_node_and_value() {
        let mut doc = doc();
        let path = ElementPath::from([Step::c("chart"), Step::c("autoTitleDeleted")]);
        doc.set(&path, Leaf::VAL, "0").expect("set");
        assert!(doc.delete_value(&path, Leaf::VAL));
        assert!(doc.exists(&path));
        assert!(doc.delete(&path).is_some());
        assert!(!doc.exists(&path));
        assert!(doc.delete(&path).is_none());
        assert!(doc.delete(&ElementPath::root()).is_none());
    }

    #[test]
    fn put_element_replaces_same_named_child() {
        let mut doc = doc();
        let chart = ElementPath::from([Step::c("chart")]);
        let title = XmlElement::new(crate::xml::QName::in_ns(Ns::Chart, "title"));
        doc.put_element(&chart, title.clone()).expect("put");
        doc.put_element(&chart, title.with_attr("x", "1")).expect("put");
        let chart_el = doc.find(&chart).expect("chart");
        assert_eq!(names(chart_el), vec!["title", "plotArea"]);
        assert_eq!(chart_el.child(Ns::Chart, "title").and_then(|t| t.attr("x")), Some("1"));
    }
}
