use std::ops::{Deref, DerefMut};

use xlchart_dom::{Step, XmlDocument};

use crate::chart_type::ChartFamily;
use crate::error::ChartError;
use crate::groups::owning_group_type;
use crate::marker::Marker;
use crate::property::{node_wrapper, path_key, BoolProp, Node, UIntProp, ValProp};

node_wrapper! {
    /// `c:dPt` overrides of a series, keyed by `c:idx`.
    DataPoints
}

node_wrapper! {
    /// Formatting override for one data point.
    DataPoint
}

const POINT: Step = Step::c("dPt");
const INVERT_IF_NEGATIVE: BoolProp = ValProp::new("invert if negative", &[Step::c("invertIfNegative")]);
const BUBBLE_3D: BoolProp = ValProp::new("bubble 3D", &[Step::c("bubble3D")]);
const EXPLOSION: UIntProp = ValProp::new("explosion", &[Step::c("explosion")]).range(0.0, 400.0);
const MARKER: &[Step] = &[Step::c("marker")];

impl<D: Deref<Target = XmlDocument>> DataPoints<D> {
    /// Point indices in document order, which is ascending.
    pub fn indices(&self) -> Vec<u32> {
        self.node.keys(POINT, "idx")
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: u32) -> Option<DataPoint<&XmlDocument>> {
        let point = DataPoint::from_node(self.node.child(&[POINT.keyed("idx", idx)]));
        point.exists().then_some(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = DataPoint<&XmlDocument>> + '_ {
        self.indices()
            .into_iter()
            .map(|idx| DataPoint::from_node(self.node.child(&[POINT.keyed("idx", idx)])))
    }
}

impl<D: DerefMut<Target = XmlDocument>> DataPoints<D> {
    pub fn get_mut(&mut self, idx: u32) -> Option<DataPoint<&mut XmlDocument>> {
        let node = self.node.child_mut(&[POINT.keyed("idx", idx)]);
        node.exists().then(|| DataPoint::from_node(node))
    }

    /// Adds an override for point `idx`, placed between its neighbours by index.
    pub fn add(&mut self, idx: u32) -> Result<DataPoint<&mut XmlDocument>, ChartError> {
        let family = owning_group_type(self.node.doc(), self.node.path()).map(|t| t.family());
        let path = self.node.add_keyed("data points", POINT, "idx", idx)?;
        let mut point = DataPoint::from_node(Node::new(self.node.doc_mut(), path));
        match family {
            Some(ChartFamily::Bar | ChartFamily::Bar3D) => point.set_invert_if_negative(false)?,
            Some(ChartFamily::Bubble | ChartFamily::Pie | ChartFamily::Pie3D | ChartFamily::Doughnut | ChartFamily::OfPie) => {
                point.set_bubble_3d(false)?
            }
            _ => {}
        }
        Ok(point)
    }

    pub fn remove(&mut self, idx: u32) -> bool {
        self.node.remove_at(&[POINT.keyed("idx", idx)]).is_some()
    }
}

impl<D: Deref<Target = XmlDocument>> DataPoint<D> {
    pub fn idx(&self) -> Option<u32> {
        path_key(self.path())
    }

    pub fn invert_if_negative(&self) -> bool {
        self.node.get(&INVERT_IF_NEGATIVE).unwrap_or(false)
    }

    pub fn bubble_3d(&self) -> bool {
        self.node.get(&BUBBLE_3D).unwrap_or(false)
    }

    pub fn explosion(&self) -> u32 {
        self.node.get(&EXPLOSION).unwrap_or(0)
    }

    pub fn marker(&self) -> Marker<&XmlDocument> {
        Marker::from_node(self.node.child(MARKER))
    }
}

impl<D: DerefMut<Target = XmlDocument>> DataPoint<D> {
    pub fn set_invert_if_negative(&mut self, invert: bool) -> Result<(), ChartError> {
        self.node.set(&INVERT_IF_NEGATIVE, invert)
    }

    pub fn set_bubble_3d(&mut self, bubble_3d: bool) -> Result<(), ChartError> {
        self.node.set(&BUBBLE_3D, bubble_3d)
    }

    /// Distance the slice is pulled out of the pie, as a percentage of the radius.
    pub fn set_explosion(&mut self, explosion: u32) -> Result<(), ChartError> {
        self.node.set(&EXPLOSION, explosion)
    }

    pub fn marker_mut(&mut self) -> Marker<&mut XmlDocument> {
        Marker::from_node(self.node.child_mut(MARKER))
    }
}
