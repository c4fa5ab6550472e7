//! Compile-time path descriptors.
//!
//! A path is a sequence of [`Step`]s rooted at the document element. Steps are `Copy` and have
//! `const` constructors so typed properties can declare their location as constants instead of
//! formatting strings at runtime.

use std::fmt;

use crate::ns::Ns;
use crate::xml::XmlElement;

/// Which of the same-named siblings a step selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// The first matching sibling.
    Any,
    /// The n-th matching sibling (zero-based).
    Nth(usize),
    /// The sibling whose `<key val="..."/>` child equals `value` (e.g. `c:dPt[c:idx=3]`).
    Keyed { key: &'static str, value: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Step {
    pub ns: Ns,
    pub local: &'static str,
    pub filter: Filter,
}

impl Step {
    pub const fn new(ns: Ns, local: &'static str) -> Self {
        Self {
            ns,
            local,
            filter: Filter::Any,
        }
    }

    pub const fn c(local: &'static str) -> Self {
        Self::new(Ns::Chart, local)
    }

    pub const fn a(local: &'static str) -> Self {
        Self::new(Ns::Drawing, local)
    }

    pub const fn cx(local: &'static str) -> Self {
        Self::new(Ns::ChartEx, local)
    }

    pub const fn nth(self, n: usize) -> Self {
        Self {
            filter: Filter::Nth(n),
            ..self
        }
    }

    pub const fn keyed(self, key: &'static str, value: u32) -> Self {
        Self {
            filter: Filter::Keyed { key, value },
            ..self
        }
    }

    /// Same step without its filter.
    pub const fn unfiltered(self) -> Self {
        Self {
            filter: Filter::Any,
            ..self
        }
    }

    /// Name match only; the filter is applied by the accessor.
    pub fn matches(&self, el: &XmlElement) -> bool {
        el.name.is(self.ns, self.local)
    }

    /// Reads the integer key of a keyed sibling, e.g. `<c:idx val="3"/>`.
    pub fn key_of(&self, el: &XmlElement, key: &str) -> Option<u32> {
        el.child(self.ns, key)?.attr("val")?.trim().parse().ok()
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ns.prefix(), self.local)?;
        match self.filter {
            Filter::Any => Ok(()),
            Filter::Nth(n) => write!(f, "[{n}]"),
            Filter::Keyed { key, value } => {
                write!(f, "[{}:{key}={value}]", self.ns.prefix())
            }
        }
    }
}

/// Owned path from the document element. The empty path addresses the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ElementPath(Vec<Step>);

impl ElementPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_steps(steps: &[Step]) -> Self {
        Self(steps.to_vec())
    }

    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Step> {
        self.0.last()
    }

    pub fn child(&self, step: Step) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }

    pub fn join(&self, tail: &[Step]) -> Self {
        let mut steps = self.0.clone();
        steps.extend_from_slice(tail);
        Self(steps)
    }

    /// Splits off the last step.
    pub fn split_last(&self) -> Option<(ElementPath, Step)> {
        let (last, rest) = self.0.split_last()?;
        Some((Self(rest.to_vec()), *last))
    }

    pub fn parent(&self) -> Option<ElementPath> {
        self.split_last().map(|(parent, _)| parent)
    }

    /// Local name of the element that contains the last step's parent. The schema uses it to
    /// pick context-specific child orders (e.g. `c:ser` under `c:barChart`).
    pub(crate) fn context_of_parent(steps: &[Step], index: usize) -> Option<&'static str> {
        index.checked_sub(2).map(|i| steps[i].local)
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(".");
        }
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl From<&[Step]> for ElementPath {
    fn from(steps: &[Step]) -> Self {
        Self::from_steps(steps)
    }
}

impl<const N: usize> From<[Step; N]> for ElementPath {
    fn from(steps: [Step; N]) -> Self {
        Self(steps.to_vec())
    }
}

/// The value addressed at the end of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Leaf {
    Attr(&'static str),
    Text,
}

impl Leaf {
    pub const VAL: Leaf = Leaf::Attr("val");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_filters() {
        let path = ElementPath::from([
            Step::c("plotArea"),
            Step::c("barChart").nth(1),
            Step::c("ser").keyed("idx", 3),
        ]);
        assert_eq!(path.to_string(), "c:plotArea/c:barChart[1]/c:ser[c:idx=3]");
        assert_eq!(ElementPath::root().to_string(), ".");
    }

    #[test]
    fn split_last_returns_parent() {
        let path = ElementPath::from([Step::c("chart"), Step::c("legend")]);
        let (parent, last) = path.split_last().expect("non-empty");
        assert_eq!(parent, ElementPath::from([Step::c("chart")]));
        assert_eq!(last, Step::c("legend"));
        assert!(ElementPath::root().split_last().is_none());
    }

    #[test]
    fn context_skips_direct_parent() {
        let steps = [Step::c("chart"), Step::c("plotArea"), Step::c("barChart"), Step::c("ser")];
        assert_eq!(ElementPath::context_of_parent(&steps, 0), None);
        assert_eq!(ElementPath::context_of_parent(&steps, 1), None);
        assert_eq!(ElementPath::context_of_parent(&steps, 3), Some("plotArea"));
    }
}
