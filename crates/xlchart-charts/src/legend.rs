use std::ops::{Deref, DerefMut};

use xlchart_dom::{Step, XmlDocument};

use crate::enums::LegendPosition;
use crate::error::ChartError;
use crate::property::{node_wrapper, path_key, BoolProp, EnumProp, Node, ValProp};

node_wrapper! {
    /// `c:chart/c:legend`.
    Legend
}

node_wrapper! {
    /// `c:legendEntry` children of a legend, keyed by `c:idx`.
    LegendEntries
}

node_wrapper! {
    /// Formatting override for one legend entry.
    LegendEntry
}

const POSITION: EnumProp<LegendPosition> = ValProp::new("legend position", &[Step::c("legendPos")]);
const OVERLAY: BoolProp = ValProp::new("legend overlay", &[Step::c("overlay")]);
const ENTRY: Step = Step::c("legendEntry");
const DELETE: BoolProp = ValProp::new("legend entry delete", &[Step::c("delete")]);

impl<D: Deref<Target = XmlDocument>> Legend<D> {
    pub fn position(&self) -> LegendPosition {
        self.node.get(&POSITION).unwrap_or_default()
    }

    pub fn overlay(&self) -> bool {
        self.node.get(&OVERLAY).unwrap_or(false)
    }

    pub fn entries(&self) -> LegendEntries<&XmlDocument> {
        LegendEntries::from_node(self.node.view())
    }
}

impl<D: DerefMut<Target = XmlDocument>> Legend<D> {
    pub fn set_position(&mut self, position: LegendPosition) -> Result<(), ChartError> {
        self.node.set(&POSITION, position)
    }

    pub fn set_overlay(&mut self, overlay: bool) -> Result<(), ChartError> {
        self.node.set(&OVERLAY, overlay)
    }

    pub fn entries_mut(&mut self) -> LegendEntries<&mut XmlDocument> {
        LegendEntries::from_node(self.node.view_mut())
    }
}

impl<D: Deref<Target = XmlDocument>> LegendEntries<D> {
    pub fn indices(&self) -> Vec<u32> {
        self.node.keys(ENTRY, "idx")
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: u32) -> Option<LegendEntry<&XmlDocument>> {
        let entry = LegendEntry::from_node(self.node.child(&[ENTRY.keyed("idx", idx)]));
        entry.exists().then_some(entry)
    }
}

impl<D: DerefMut<Target = XmlDocument>> LegendEntries<D> {
    pub fn get_mut(&mut self, idx: u32) -> Option<LegendEntry<&mut XmlDocument>> {
        let node = self.node.child_mut(&[ENTRY.keyed("idx", idx)]);
        node.exists().then(|| LegendEntry::from_node(node))
    }

    /// Adds an entry for series (or point) `idx`; it starts visible.
    pub fn add(&mut self, idx: u32) -> Result<LegendEntry<&mut XmlDocument>, ChartError> {
        let path = self.node.add_keyed("legend entries", ENTRY, "idx", idx)?;
        let mut entry = LegendEntry::from_node(Node::new(self.node.doc_mut(), path));
        entry.set_deleted(false)?;
        Ok(entry)
    }

    pub fn remove(&mut self, idx: u32) -> bool {
        self.node.remove_at(&[ENTRY.keyed("idx", idx)]).is_some()
    }
}

impl<D: Deref<Target = XmlDocument>> LegendEntry<D> {
    pub fn idx(&self) -> Option<u32> {
        path_key(self.path())
    }

    pub fn deleted(&self) -> bool {
        self.node.get(&DELETE).unwrap_or(false)
    }
}

impl<D: DerefMut<Target = XmlDocument>> LegendEntry<D> {
    /// Hides the entry from the legend.
    pub fn set_deleted(&mut self, deleted: bool) -> Result<(), ChartError> {
        self.node.set(&DELETE, deleted)
    }
}
