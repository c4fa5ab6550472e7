//! Typed properties over document paths.
//!
//! Every wrapper in this crate is a [`Node`]: a borrow of the chart's [`XmlDocument`] plus the
//! path of the element it represents. Borrowing `&XmlDocument` gives a read-only view,
//! `&mut XmlDocument` a writable one. Properties are declared once as [`ValProp`] constants and
//! all reads and writes funnel through `Node::get` / `Node::set`.

use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use xlchart_dom::{ElementPath, Filter, Leaf, Ns, QName, Step, XmlDocument, XmlElement};

use crate::error::ChartError;

/// Conversion between a typed value and its attribute or text representation.
pub trait ValCodec: Sized {
    fn decode(raw: &str) -> Option<Self>;
    fn encode(&self) -> String;

    /// Numeric magnitude for range validation.
    fn magnitude(&self) -> Option<f64> {
        None
    }

    /// Value of an element that is present without its attribute.
    fn when_attr_absent() -> Option<Self> {
        None
    }
}

impl ValCodec for bool {
    fn decode(raw: &str) -> Option<Self> {
        match raw.trim() {
            "1" | "true" | "True" | "TRUE" => Some(true),
            "0" | "false" | "False" | "FALSE" => Some(false),
            _ => None,
        }
    }

    fn encode(&self) -> String {
        if *self { "1" } else { "0" }.to_string()
    }

    /// `CT_Boolean` defaults its `val` to true.
    fn when_attr_absent() -> Option<Self> {
        Some(true)
    }
}

macro_rules! int_codec {
    ($($ty:ty),+) => {
        $(
            impl ValCodec for $ty {
                fn decode(raw: &str) -> Option<Self> {
                    // Percent-typed values (`gapWidth`, `overlap`) may carry a trailing `%`.
                    raw.trim().trim_end_matches('%').parse().ok()
                }

                fn encode(&self) -> String {
                    self.to_string()
                }

                fn magnitude(&self) -> Option<f64> {
                    Some(f64::from(*self))
                }
            }
        )+
    };
}

int_codec!(i32, u32);

impl ValCodec for f64 {
    fn decode(raw: &str) -> Option<Self> {
        raw.trim().parse().ok().filter(|v: &f64| v.is_finite())
    }

    fn encode(&self) -> String {
        self.to_string()
    }

    fn magnitude(&self) -> Option<f64> {
        Some(*self)
    }
}

impl ValCodec for String {
    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn encode(&self) -> String {
        self.clone()
    }
}

/// A value stored at a fixed location below a node.
#[derive(Debug)]
pub struct ValProp<T> {
    pub name: &'static str,
    pub steps: &'static [Step],
    pub leaf: Leaf,
    pub range: Option<(f64, f64)>,
    _value: PhantomData<fn() -> T>,
}

pub type BoolProp = ValProp<bool>;
pub type IntProp = ValProp<i32>;
pub type UIntProp = ValProp<u32>;
pub type FloatProp = ValProp<f64>;
pub type EnumProp<E> = ValProp<E>;
pub type TextProp = ValProp<String>;

impl<T> Clone for ValProp<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ValProp<T> {}

impl<T> ValProp<T> {
    /// `<steps val="..."/>`.
    pub const fn new(name: &'static str, steps: &'static [Step]) -> Self {
        Self {
            name,
            steps,
            leaf: Leaf::VAL,
            range: None,
            _value: PhantomData,
        }
    }

    pub const fn attr(name: &'static str, steps: &'static [Step], attr: &'static str) -> Self {
        Self {
            leaf: Leaf::Attr(attr),
            ..Self::new(name, steps)
        }
    }

    pub const fn text(name: &'static str, steps: &'static [Step]) -> Self {
        Self {
            leaf: Leaf::Text,
            ..Self::new(name, steps)
        }
    }

    /// Inclusive bounds checked before anything is written.
    pub const fn range(self, min: f64, max: f64) -> Self {
        Self {
            range: Some((min, max)),
            ..self
        }
    }
}

impl<T: ValCodec> ValProp<T> {
    pub fn validate(&self, value: &T) -> Result<(), ChartError> {
        let Some(v) = value.magnitude() else {
            return Ok(());
        };
        let (min, max) = self.range.unwrap_or((f64::MIN, f64::MAX));
        // NaN fails the containment check too, so nothing non-finite reaches the document.
        if !(min..=max).contains(&v) {
            return Err(ChartError::out_of_range(self.name, v, min, max));
        }
        Ok(())
    }

    fn read(&self, el: &XmlElement) -> Option<T> {
        let raw = match self.leaf {
            Leaf::Attr(name) => el.attr(name),
            Leaf::Text => el.text(),
        };
        match raw {
            Some(raw) => {
                let value = T::decode(raw);
                if value.is_none() {
                    log::warn!("ignoring unparsable {} value `{raw}`", self.name);
                }
                value
            }
            None if self.leaf == Leaf::VAL => T::when_attr_absent(),
            None => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node<D> {
    doc: D,
    path: ElementPath,
}

impl<D> Node<D> {
    pub fn new(doc: D, path: ElementPath) -> Self {
        Self { doc, path }
    }

    pub fn path(&self) -> &ElementPath {
        &self.path
    }

    pub fn at(&self, steps: &[Step]) -> ElementPath {
        self.path.join(steps)
    }
}

impl<D: Deref<Target = XmlDocument>> Node<D> {
    pub fn doc(&self) -> &XmlDocument {
        &self.doc
    }

    pub fn element(&self) -> Option<&XmlElement> {
        self.doc.find(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.doc.exists(&self.path)
    }

    pub fn has(&self, steps: &[Step]) -> bool {
        self.doc.exists(&self.at(steps))
    }

    pub fn get<T: ValCodec>(&self, prop: &ValProp<T>) -> Option<T> {
        let el = self.doc.find(&self.at(prop.steps))?;
        prop.read(el)
    }

    pub fn view(&self) -> Node<&XmlDocument> {
        Node::new(&*self.doc, self.path.clone())
    }

    pub fn child(&self, steps: &[Step]) -> Node<&XmlDocument> {
        Node::new(&*self.doc, self.at(steps))
    }

    /// Keys of the `step` children, in document order.
    pub fn keys(&self, step: Step, key: &str) -> Vec<u32> {
        self.doc.keyed_values(&self.path, step, key)
    }
}

impl<D: DerefMut<Target = XmlDocument>> Node<D> {
    pub fn doc_mut(&mut self) -> &mut XmlDocument {
        &mut self.doc
    }

    pub fn view_mut(&mut self) -> Node<&mut XmlDocument> {
        let path = self.path.clone();
        Node::new(&mut *self.doc, path)
    }

    pub fn child_mut(&mut self, steps: &[Step]) -> Node<&mut XmlDocument> {
        let path = self.at(steps);
        Node::new(&mut *self.doc, path)
    }

    /// Creates this node (and its ancestors) if needed.
    pub fn ensure(&mut self) -> Result<&mut XmlElement, ChartError> {
        Ok(self.doc.ensure(&self.path)?)
    }

    pub fn ensure_at(&mut self, steps: &[Step]) -> Result<&mut XmlElement, ChartError> {
        let path = self.at(steps);
        Ok(self.doc.ensure(&path)?)
    }

    pub fn set<T: ValCodec>(&mut self, prop: &ValProp<T>, value: T) -> Result<(), ChartError> {
        prop.validate(&value)?;
        let path = self.at(prop.steps);
        self.doc.set(&path, prop.leaf, value.encode())?;
        Ok(())
    }

    /// `None` removes the value.
    pub fn set_opt<T: ValCodec>(&mut self, prop: &ValProp<T>, value: Option<T>) -> Result<(), ChartError> {
        match value {
            Some(value) => self.set(prop, value),
            None => {
                self.clear(prop);
                Ok(())
            }
        }
    }

    /// Removes a value: `val`/text properties drop their element, other attributes only the attribute.
    pub fn clear<T>(&mut self, prop: &ValProp<T>) -> bool {
        let path = self.at(prop.steps);
        match prop.leaf {
            Leaf::Attr(name) if name != "val" => self.doc.delete_value(&path, prop.leaf),
            _ => {
                if prop.steps.is_empty() {
                    self.doc.delete_value(&path, prop.leaf)
                } else {
                    self.doc.delete(&path).is_some()
                }
            }
        }
    }

    pub fn remove_at(&mut self, steps: &[Step]) -> Option<XmlElement> {
        let path = self.at(steps);
        self.doc.delete(&path)
    }

    pub fn remove(&mut self) -> Option<XmlElement> {
        self.doc.delete(&self.path)
    }

    /// Inserts a prebuilt child at its schema position, replacing same-named children.
    pub fn put(&mut self, element: XmlElement) -> Result<(), ChartError> {
        Ok(self.doc.put_element(&self.path, element)?)
    }

    pub fn insert(&mut self, element: XmlElement) -> Result<usize, ChartError> {
        Ok(self.doc.insert_element(&self.path, element)?)
    }

    /// Creates the child keyed by `<key val="index"/>` among its siblings in ascending key order.
    pub fn add_keyed(
        &mut self,
        collection: &'static str,
        step: Step,
        key: &'static str,
        index: u32,
    ) -> Result<ElementPath, ChartError> {
        if self.doc.keyed_values(&self.path, step, key).contains(&index) {
            return Err(ChartError::DuplicateIndex { collection, index });
        }
        let path = self.path.child(step.keyed(key, index));
        self.doc.ensure(&path)?;
        Ok(path)
    }
}

pub(crate) fn element(ns: Ns, local: &str) -> XmlElement {
    XmlElement::new(QName::in_ns(ns, local))
}

/// `<c:local val="..."/>`.
pub(crate) fn val_element(local: &str, val: impl Into<String>) -> XmlElement {
    element(Ns::Chart, local).with_attr("val", val)
}

/// Key of the last step when it is keyed (`c:ser[c:idx=3]` -> 3).
pub(crate) fn path_key(path: &ElementPath) -> Option<u32> {
    match path.last()?.filter {
        Filter::Keyed { value, .. } => Some(value),
        _ => None,
    }
}

/// Declares a typed wrapper around a [`Node`].
macro_rules! node_wrapper {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name<D> {
            node: $crate::property::Node<D>,
        }

        impl<D> $name<D> {
            pub(crate) fn from_node(node: $crate::property::Node<D>) -> Self {
                Self { node }
            }

            pub fn path(&self) -> &::xlchart_dom::ElementPath {
                self.node.path()
            }
        }

        impl<D: ::std::ops::Deref<Target = ::xlchart_dom::XmlDocument>> $name<D> {
            /// Whether the element is present in the document.
            pub fn exists(&self) -> bool {
                self.node.exists()
            }

            pub fn element(&self) -> Option<&::xlchart_dom::XmlElement> {
                self.node.element()
            }
        }
    };
}

pub(crate) use node_wrapper;
