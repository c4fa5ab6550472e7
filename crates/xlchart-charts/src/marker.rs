use std::ops::{Deref, DerefMut};

use xlchart_dom::{Step, XmlDocument};

use crate::enums::MarkerStyle;
use crate::error::ChartError;
use crate::property::{node_wrapper, EnumProp, UIntProp, ValProp};

node_wrapper! {
    /// `c:marker` of a series or a single data point.
    Marker
}

const SYMBOL: EnumProp<MarkerStyle> = ValProp::new("marker symbol", &[Step::c("symbol")]);
const SIZE: UIntProp = ValProp::new("marker size", &[Step::c("size")]).range(2.0, 72.0);

impl<D: Deref<Target = XmlDocument>> Marker<D> {
    pub fn style(&self) -> MarkerStyle {
        self.node.get(&SYMBOL).unwrap_or_default()
    }

    /// Absent sizes render as 5 points.
    pub fn size(&self) -> u32 {
        self.node.get(&SIZE).unwrap_or(5)
    }
}

impl<D: DerefMut<Target = XmlDocument>> Marker<D> {
    pub fn set_style(&mut self, style: MarkerStyle) -> Result<(), ChartError> {
        self.node.set(&SYMBOL, style)
    }

    pub fn set_size(&mut self, size: u32) -> Result<(), ChartError> {
        self.node.set(&SIZE, size)
    }

    /// Removes the whole marker override.
    pub fn reset(&mut self) -> bool {
        self.node.remove().is_some()
    }
}

#[cfg(test)]
mod tests {
    use xlchart_dom::ElementPath;

    use super::*;
    use crate::property::Node;

    #[test]
    fn size_bounds_are_inclusive() {
        let mut doc = XmlDocument::parse(
            br#"<c:ser xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"/>"#,
        )
        .expect("parse")
        .with_schema(crate::schema::registry());
        let mut marker = Marker::from_node(Node::new(&mut doc, ElementPath::from_steps(&[Step::c("marker")])));
        assert!(!marker.exists());
        for size in [1, 73] {
            assert!(matches!(marker.set_size(size), Err(ChartError::OutOfRange { .. })));
        }
        assert!(!marker.exists(), "rejected writes create nothing");
        marker.set_size(2).expect("min");
        marker.set_size(72).expect("max");
        marker.set_style(MarkerStyle::Diamond).expect("style");
        assert_eq!(marker.size(), 72);
        assert_eq!(marker.style(), MarkerStyle::Diamond);
        let names: Vec<_> = marker
            .element()
            .expect("marker")
            .child_elements()
            .map(|el| el.name.local.as_str())
            .collect();
        assert_eq!(names, ["symbol", "size"]);
    }
}
