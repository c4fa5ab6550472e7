use std::ops::{Deref, DerefMut};

use xlchart_dom::{Ns, Step, XmlDocument, XmlElement};

use crate::error::ChartError;
use crate::property::{element, node_wrapper, BoolProp, TextProp, ValProp};

node_wrapper! {
    /// `c:title` of the chart or of an axis.
    Title
}

const OVERLAY: BoolProp = ValProp::new("title overlay", &[Step::c("overlay")]);
const REFERENCE: TextProp = ValProp::text("title reference", &[Step::c("tx"), Step::c("strRef"), Step::c("f")]);
const RICH: &[Step] = &[Step::c("tx"), Step::c("rich")];

/// `c:rich` body with one paragraph per line of `text`.
pub(crate) fn rich_text(text: &str) -> XmlElement {
    let mut rich = element(Ns::Chart, "rich")
        .with_child(element(Ns::Drawing, "bodyPr"))
        .with_child(element(Ns::Drawing, "lstStyle"));
    for line in text.split('\n') {
        let run = element(Ns::Drawing, "r").with_child(element(Ns::Drawing, "t").with_text(line));
        rich = rich.with_child(element(Ns::Drawing, "p").with_child(run));
    }
    rich
}

/// Concatenated `a:t` runs, paragraphs joined with `\n`.
pub(crate) fn read_rich_text(rich: &XmlElement) -> String {
    rich.child_elements()
        .filter(|p| p.name.is(Ns::Drawing, "p"))
        .map(|p| {
            p.child_elements()
                .filter(|r| r.name.is(Ns::Drawing, "r") || r.name.is(Ns::Drawing, "fld"))
                .filter_map(|r| r.child(Ns::Drawing, "t")?.text())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl<D: Deref<Target = XmlDocument>> Title<D> {
    /// Rich text of the title; `None` for automatic or referenced titles.
    pub fn text(&self) -> Option<String> {
        let rich = self.node.doc().find(&self.node.at(RICH))?;
        Some(read_rich_text(rich))
    }

    /// Cell reference the title is linked to.
    pub fn reference(&self) -> Option<String> {
        self.node.get(&REFERENCE)
    }

    pub fn overlay(&self) -> bool {
        self.node.get(&OVERLAY).unwrap_or(false)
    }
}

impl<D: DerefMut<Target = XmlDocument>> Title<D> {
    /// Replaces the title text, dropping any cell reference.
    pub fn set_text(&mut self, text: &str) -> Result<(), ChartError> {
        let tx = element(Ns::Chart, "tx").with_child(rich_text(text));
        self.node.put(tx)?;
        self.ensure_overlay()
    }

    /// Links the title to a cell, dropping any rich text.
    pub fn set_reference(&mut self, formula: &str) -> Result<(), ChartError> {
        let f = element(Ns::Chart, "f").with_text(formula);
        let tx = element(Ns::Chart, "tx").with_child(element(Ns::Chart, "strRef").with_child(f));
        self.node.put(tx)?;
        self.ensure_overlay()
    }

    pub fn set_overlay(&mut self, overlay: bool) -> Result<(), ChartError> {
        self.node.set(&OVERLAY, overlay)
    }

    fn ensure_overlay(&mut self) -> Result<(), ChartError> {
        if !self.node.has(OVERLAY.steps) {
            self.node.set(&OVERLAY, false)?;
        }
        Ok(())
    }
}
