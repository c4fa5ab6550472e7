//! Canonical child ordering.
//!
//! OOXML content models are sequences: a consumer rejects (or silently reinterprets) a part whose
//! children appear out of order. Every element that the chart model creates is therefore inserted
//! relative to a [`ChildOrder`] rather than appended.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::OrderError;
use crate::path::{Filter, Step};
use crate::xml::{XmlElement, XmlNode};

/// Names that share one position in a sequence (an `xsd:choice`).
pub type Slot = &'static [&'static str];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildOrder {
    slots: Vec<Vec<&'static str>>,
}

impl ChildOrder {
    pub fn new(slots: &[Slot]) -> Self {
        Self {
            slots: slots.iter().map(|slot| slot.to_vec()).collect(),
        }
    }

    /// Merges partial orders (a base content model plus per-subtype additions) into one order that
    /// respects every input. Slots that are unordered relative to each other keep the order in which
    /// they were first seen.
    pub fn merge(parts: &[&[Slot]]) -> Result<Self, OrderError> {
        let mut slots: Vec<Vec<&'static str>> = Vec::new();
        let mut slot_of: HashMap<&'static str, usize> = HashMap::new();
        let mut edges: Vec<BTreeSet<usize>> = Vec::new();

        for part in parts {
            let mut previous: Option<usize> = None;
            for slot in part.iter() {
                let id = Self::intern(slot, &mut slots, &mut slot_of)?;
                if edges.len() < slots.len() {
                    edges.resize_with(slots.len(), BTreeSet::new);
                }
                if let Some(prev) = previous {
                    if prev != id {
                        edges[prev].insert(id);
                    }
                }
                previous = Some(id);
            }
        }

        let mut in_degree = vec![0usize; slots.len()];
        for targets in &edges {
            for &t in targets {
                in_degree[t] += 1;
            }
        }

        let mut ready: BTreeSet<usize> = (0..slots.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut ordered = Vec::with_capacity(slots.len());
        while let Some(next) = ready.pop_first() {
            ordered.push(next);
            for &t in &edges[next] {
                in_degree[t] -= 1;
                if in_degree[t] == 0 {
                    ready.insert(t);
                }
            }
        }

        if ordered.len() != slots.len() {
            let names = (0..slots.len())
                .filter(|i| !ordered.contains(i))
                .flat_map(|i| slots[i].iter().copied())
                .collect();
            return Err(OrderError::Conflict { names });
        }

        Ok(Self {
            slots: ordered.into_iter().map(|i| slots[i].clone()).collect(),
        })
    }

    fn intern(
        slot: Slot,
        slots: &mut Vec<Vec<&'static str>>,
        slot_of: &mut HashMap<&'static str, usize>,
    ) -> Result<usize, OrderError> {
        let mut found: Option<usize> = None;
        for &name in slot {
            if let Some(&id) = slot_of.get(name) {
                let same = slots[id].len() == slot.len() && slot.iter().all(|n| slots[id].contains(n));
                if !same || found.is_some_and(|f| f != id) {
                    return Err(OrderError::InconsistentSlot { name });
                }
                found = Some(id);
            } else if found.is_some() {
                return Err(OrderError::InconsistentSlot { name });
            }
        }
        if let Some(id) = found {
            return Ok(id);
        }
        let id = slots.len();
        slots.push(slot.to_vec());
        for &name in slot {
            slot_of.insert(name, id);
        }
        Ok(id)
    }

    pub fn rank(&self, local: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.contains(&local))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Child orders keyed by parent local name, optionally refined by the grandparent's local name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: BTreeMap<&'static str, Vec<(Option<&'static str>, ChildOrder)>>,
}

static EMPTY: SchemaRegistry = SchemaRegistry::new();

impl SchemaRegistry {
    pub const fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    pub fn empty() -> &'static SchemaRegistry {
        &EMPTY
    }

    pub fn register(&mut self, parent: &'static str, order: ChildOrder) {
        self.register_in(parent, None, order);
    }

    pub fn register_in(
        &mut self,
        parent: &'static str,
        context: Option<&'static str>,
        order: ChildOrder,
    ) {
        let entries = self.tables.entry(parent).or_default();
        match entries.iter_mut().find(|(ctx, _)| *ctx == context) {
            Some((_, existing)) => *existing = order,
            None => entries.push((context, order)),
        }
    }

    /// Looks up the order for `parent`, preferring a context-specific table.
    pub fn order_for(&self, parent: &str, context: Option<&str>) -> Option<&ChildOrder> {
        let entries = self.tables.get(parent)?;
        context
            .and_then(|ctx| entries.iter().find(|(c, _)| *c == Some(ctx)))
            .or_else(|| entries.iter().find(|(c, _)| c.is_none()))
            .or_else(|| entries.first())
            .map(|(_, order)| order)
    }

    /// Index in `parent.children` at which a new `step` element belongs.
    pub fn insertion_index(&self, parent: &XmlElement, context: Option<&str>, step: &Step) -> usize {
        let keyed = match step.filter {
            Filter::Keyed { key, value } => Some((step, key, value)),
            _ => None,
        };
        self.scan(parent, context, step.local, keyed)
    }

    /// Same as [`SchemaRegistry::insertion_index`] for an element built outside a path.
    pub fn insertion_index_by_name(&self, parent: &XmlElement, context: Option<&str>, local: &str) -> usize {
        self.scan(parent, context, local, None)
    }

    fn scan(
        &self,
        parent: &XmlElement,
        context: Option<&str>,
        local: &str,
        keyed: Option<(&Step, &str, u32)>,
    ) -> usize {
        let order = self.order_for(&parent.name.local, context);
        let ranked = order.and_then(|o| o.rank(local).map(|rank| (o, rank)));
        if order.is_some() && ranked.is_none() {
            log::debug!(
                "<{}> has no declared position for `{local}`; appending",
                parent.name.local
            );
        }

        for (i, node) in parent.children.iter().enumerate() {
            let XmlNode::Element(child) = node else {
                continue;
            };
            if let Some((step, key, value)) = keyed {
                if step.matches(child) && step.key_of(child, key).is_some_and(|k| k > value) {
                    return i;
                }
            }
            if let Some((order, rank)) = ranked {
                if order.rank(&child.name.local).is_some_and(|r| r > rank) {
                    return i;
                }
            }
        }
        parent.children.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns::Ns;
    use crate::xml::QName;
    use pretty_assertions::assert_eq;

    const SER_BASE: &[Slot] = &[&["idx"], &["order"], &["tx"], &["spPr"]];
    const SER_BAR: &[Slot] = &[
        &["spPr"],
        &["invertIfNegative"],
        &["dPt"],
        &["dLbls"],
        &["cat"],
        &["val"],
        &["extLst"],
    ];

    #[test]
    fn merges_base_with_subtype_tail() {
        let order = ChildOrder::merge(&[SER_BASE, SER_BAR]).expect("merge");
        assert_eq!(
            order.names().collect::<Vec<_>>(),
            vec!["idx", "order", "tx", "spPr", "invertIfNegative", "dPt", "dLbls", "cat", "val", "extLst"]
        );
    }

    #[test]
    fn merge_rejects_contradicting_orders() {
        let a: &[Slot] = &[&["x"], &["y"]];
        let b: &[Slot] = &[&["y"], &["x"]];
        let err = ChildOrder::merge(&[a, b]).unwrap_err();
        assert!(matches!(err, OrderError::Conflict { .. }));
    }

    #[test]
    fn merge_rejects_inconsistent_choice_groups() {
        let a: &[Slot] = &[&["strRef", "v"]];
        let b: &[Slot] = &[&["strRef"]];
        assert_eq!(
            ChildOrder::merge(&[a, b]).unwrap_err(),
            OrderError::InconsistentSlot { name: "strRef" }
        );
    }

    #[test]
    fn choice_members_share_a_rank() {
        let order = ChildOrder::new(&[&["tx"], &["strRef", "v"], &["extLst"]]);
        assert_eq!(order.rank("strRef"), order.rank("v"));
        assert_eq!(order.rank("missing"), None);
    }

    fn element(children: &[&str]) -> XmlElement {
        let mut el = XmlElement::new(QName::in_ns(Ns::Chart, "ser"));
        for name in children {
            el.children
                .push(XmlNode::Element(XmlElement::new(QName::in_ns(Ns::Chart, name))));
        }
        el
    }

    #[test]
    fn inserts_before_first_higher_ranked_child() {
        let mut registry = SchemaRegistry::new();
        registry.register("ser", ChildOrder::merge(&[SER_BASE, SER_BAR]).expect("merge"));
        let parent = element(&["idx", "order", "cat", "val"]);
        assert_eq!(registry.insertion_index(&parent, None, &Step::c("tx")), 2);
        assert_eq!(registry.insertion_index(&parent, None, &Step::c("extLst")), 4);
        // Unknown names are appended.
        assert_eq!(registry.insertion_index(&parent, None, &Step::c("bogus")), 4);
    }

    #[test]
    fn context_specific_table_wins() {
        let mut registry = SchemaRegistry::new();
        registry.register("ser", ChildOrder::new(&[&["idx"], &["val"], &["cat"]]));
        registry.register_in("ser", Some("barChart"), ChildOrder::new(&[&["idx"], &["cat"], &["val"]]));
        let parent = element(&["idx", "val"]);
        assert_eq!(registry.insertion_index(&parent, None, &Step::c("cat")), 2);
        assert_eq!(registry.insertion_index(&parent, Some("barChart"), &Step::c("cat")), 1);
        assert_eq!(registry.insertion_index(&parent, Some("lineChart"), &Step::c("cat")), 2);
    }

    #[test]
    fn keyed_siblings_are_ordered_by_key() {
        let registry = SchemaRegistry::new();
        let mut parent = XmlElement::new(QName::in_ns(Ns::Chart, "ser"));
        for idx in [1, 2, 5] {
            parent.children.push(XmlNode::Element(
                XmlElement::new(QName::in_ns(Ns::Chart, "dPt")).with_child(
                    XmlElement::new(QName::in_ns(Ns::Chart, "idx")).with_attr("val", idx.to_string()),
                ),
            ));
        }
        assert_eq!(registry.insertion_index(&parent, None, &Step::c("dPt").keyed("idx", 3)), 2);
        assert_eq!(registry.insertion_index(&parent, None, &Step::c("dPt").keyed("idx", 0)), 0);
        assert_eq!(registry.insertion_index(&parent, None, &Step::c("dPt").keyed("idx", 9)), 3);
    }
}
