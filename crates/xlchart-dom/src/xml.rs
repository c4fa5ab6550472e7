//! Minimal owned XML tree.
//!
//! Chart parts are small (a few hundred elements at most), so the whole part is parsed with
//! `roxmltree` into an owned tree that can be edited in place and written back with the
//! namespace prefixes the source document used.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use quick_xml::escape::{escape, partial_escape};

use crate::error::DomError;
use crate::ns::Ns;
use crate::order::SchemaRegistry;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    pub ns: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(ns: Option<&str>, local: &str) -> Self {
        Self {
            ns: ns.map(str::to_string),
            local: local.to_string(),
        }
    }

    pub fn in_ns(ns: Ns, local: &str) -> Self {
        Self::new(Some(ns.uri()), local)
    }

    pub fn local(local: &str) -> Self {
        Self::new(None, local)
    }

    pub fn is(&self, ns: Ns, local: &str) -> bool {
        self.local == local && self.ns.as_deref() == Some(ns.uri())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: QName,
    pub attrs: Vec<(QName, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, local: &str, value: impl Into<String>) -> Self {
        self.set_attr(local, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    /// Unqualified attribute lookup (`val`, `uri`, ...).
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.ns.is_none() && name.local == local)
            .map(|(_, value)| value.as_str())
    }

    pub fn attr_ns(&self, ns: Ns, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.is(ns, local))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, local: &str, value: impl Into<String>) {
        self.set_attr_qualified(QName::local(local), value);
    }

    pub fn set_attr_qualified(&mut self, name: QName, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, local: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|(name, _)| name.ns.is_none() && name.local == local)?;
        Some(self.attrs.remove(pos).1)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    pub fn child(&self, ns: Ns, local: &str) -> Option<&XmlElement> {
        self.child_elements().find(|el| el.name.is(ns, local))
    }

    pub fn child_mut(&mut self, ns: Ns, local: &str) -> Option<&mut XmlElement> {
        self.child_elements_mut().find(|el| el.name.is(ns, local))
    }

    /// First text node directly under this element.
    pub fn text(&self) -> Option<&str> {
        self.children.iter().find_map(|node| match node {
            XmlNode::Text(text) => Some(text.as_str()),
            XmlNode::Element(_) => None,
        })
    }

    /// Replaces all direct text content, keeping element children.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|node| matches!(node, XmlNode::Element(_)));
        self.children.insert(0, XmlNode::Text(text.into()));
    }

    pub fn clear_text(&mut self) -> bool {
        let before = self.children.len();
        self.children.retain(|node| matches!(node, XmlNode::Element(_)));
        before != self.children.len()
    }

    /// Parses a snippet of sibling elements written with the conventional prefixes from [`Ns`].
    pub fn parse_fragment(xml: &str) -> Result<Vec<XmlElement>, DomError> {
        let mut wrapped = String::with_capacity(xml.len() + 512);
        wrapped.push_str("<fragment");
        for ns in Ns::ALL {
            let _ = write!(wrapped, r#" xmlns:{}="{}""#, ns.prefix(), ns.uri());
        }
        wrapped.push('>');
        wrapped.push_str(xml);
        wrapped.push_str("</fragment>");

        let doc = roxmltree::Document::parse(&wrapped)?;
        Ok(doc
            .root_element()
            .children()
            .filter(|child| child.is_element())
            .map(convert)
            .collect())
    }

    fn collect_namespaces<'a>(&'a self, elements: &mut Vec<&'a str>, attrs: &mut Vec<&'a str>) {
        if let Some(ns) = self.name.ns.as_deref() {
            if !elements.contains(&ns) {
                elements.push(ns);
            }
        }
        for (name, _) in &self.attrs {
            if let Some(ns) = name.ns.as_deref() {
                if !attrs.contains(&ns) {
                    attrs.push(ns);
                }
            }
        }
        for child in self.child_elements() {
            child.collect_namespaces(elements, attrs);
        }
    }
}

/// An owned chart (or drawing) part with its namespace declarations and the schema order table
/// used when new children are created.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    pub root: XmlElement,
    /// `(prefix, uri)` pairs declared on the root element; an empty prefix is the default namespace.
    namespaces: Vec<(String, String)>,
    schema: &'static SchemaRegistry,
}

impl XmlDocument {
    pub fn new(root: XmlElement) -> Self {
        Self {
            root,
            namespaces: Vec::new(),
            schema: SchemaRegistry::empty(),
        }
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, DomError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let text = std::str::from_utf8(bytes)?;
        let doc = roxmltree::Document::parse(text)?;
        let root = doc.root_element();

        let namespaces = root
            .namespaces()
            .filter(|ns| ns.name() != Some("xml"))
            .map(|ns| (ns.name().unwrap_or_default().to_string(), ns.uri().to_string()))
            .collect();

        Ok(Self {
            root: convert(root),
            namespaces,
            schema: SchemaRegistry::empty(),
        })
    }

    pub fn with_schema(mut self, schema: &'static SchemaRegistry) -> Self {
        self.schema = schema;
        self
    }

    pub fn schema(&self) -> &'static SchemaRegistry {
        self.schema
    }

    pub fn namespaces(&self) -> &[(String, String)] {
        &self.namespaces
    }

    pub fn declare_namespace(&mut self, prefix: &str, uri: &str) {
        match self.namespaces.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, existing)) => *existing = uri.to_string(),
            None => self.namespaces.push((prefix.to_string(), uri.to_string())),
        }
    }

    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(_, u)| u == uri)
            .map(|(p, _)| p.as_str())
    }

    pub fn to_xml_string(&self) -> String {
        let prefixes = self.resolve_prefixes();
        let mut out = String::with_capacity(4096);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        write_element(&mut out, &self.root, &prefixes, true);
        out
    }

    pub fn to_xml_bytes(&self) -> Vec<u8> {
        self.to_xml_string().into_bytes()
    }

    /// Maps every namespace used in the tree to a prefix, keeping declared prefixes and picking
    /// the conventional prefix (or a generated one) for the rest. Namespaced attributes never use
    /// the default namespace.
    fn resolve_prefixes(&self) -> Prefixes {
        let mut on_elements = Vec::new();
        let mut on_attrs = Vec::new();
        self.root.collect_namespaces(&mut on_elements, &mut on_attrs);

        let mut prefixes = Prefixes::default();
        for (prefix, uri) in &self.namespaces {
            prefixes.declare(prefix, uri);
        }
        let mut generated = 0usize;
        let pending = on_elements
            .into_iter()
            .map(|uri| (uri, false))
            .chain(on_attrs.into_iter().map(|uri| (uri, true)));
        for (uri, is_attr) in pending {
            let bound = if is_attr {
                prefixes.for_attr(uri).is_some()
            } else {
                prefixes.for_element(uri).is_some()
            };
            if bound {
                continue;
            }
            let conventional = Ns::from_uri(uri).map(Ns::prefix);
            let prefix = match conventional {
                Some(p) if !prefixes.is_bound(p) => p.to_string(),
                _ => loop {
                    generated += 1;
                    let candidate = format!("ns{generated}");
                    if !prefixes.is_bound(&candidate) {
                        break candidate;
                    }
                },
            };
            log::debug!("assigning prefix `{prefix}` to undeclared namespace {uri}");
            prefixes.declare(&prefix, uri);
        }
        prefixes
    }
}

#[derive(Debug, Default)]
struct Prefixes {
    /// Declaration order is preserved so output is stable.
    decls: Vec<(String, String)>,
    by_uri: BTreeMap<String, String>,
}

impl Prefixes {
    fn declare(&mut self, prefix: &str, uri: &str) {
        if self.is_bound(prefix) {
            return;
        }
        self.decls.push((prefix.to_string(), uri.to_string()));
        let entry = self.by_uri.entry(uri.to_string()).or_default();
        // Prefer a named prefix over the default namespace so attributes can be qualified.
        if entry.is_empty() {
            *entry = prefix.to_string();
        }
    }

    fn is_bound(&self, prefix: &str) -> bool {
        self.decls.iter().any(|(p, _)| p == prefix)
    }

    fn for_element(&self, uri: &str) -> Option<&str> {
        if self.decls.iter().any(|(p, u)| p.is_empty() && u == uri) {
            return Some("");
        }
        self.by_uri.get(uri).map(String::as_str)
    }

    fn for_attr(&self, uri: &str) -> Option<&str> {
        self.by_uri
            .get(uri)
            .map(String::as_str)
            .filter(|p| !p.is_empty())
    }
}

fn convert(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let tag = node.tag_name();
    let mut el = XmlElement::new(QName::new(tag.namespace(), tag.name()));
    for attr in node.attributes() {
        el.attrs.push((
            QName::new(attr.namespace(), attr.name()),
            attr.value().to_string(),
        ));
    }

    let has_elements = node.children().any(|child| child.is_element());
    for child in node.children() {
        if child.is_element() {
            el.children.push(XmlNode::Element(convert(child)));
        } else if child.is_text() {
            let text = child.text().unwrap_or_default();
            if has_elements && text.trim().is_empty() {
                continue;
            }
            el.children.push(XmlNode::Text(text.to_string()));
        }
    }
    el
}

fn qualified(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}:{local}"),
        _ => local.to_string(),
    }
}

fn write_element(out: &mut String, el: &XmlElement, prefixes: &Prefixes, is_root: bool) {
    let name = match el.name.ns.as_deref() {
        Some(uri) => qualified(prefixes.for_element(uri), &el.name.local),
        None => el.name.local.clone(),
    };
    out.push('<');
    out.push_str(&name);

    if is_root {
        for (prefix, uri) in &prefixes.decls {
            if prefix.is_empty() {
                let _ = write!(out, r#" xmlns="{}""#, escape(uri.as_str()));
            } else {
                let _ = write!(out, r#" xmlns:{prefix}="{}""#, escape(uri.as_str()));
            }
        }
    }

    for (attr, value) in &el.attrs {
        let attr_name = match attr.ns.as_deref() {
            Some(uri) => qualified(prefixes.for_attr(uri), &attr.local),
            None => attr.local.clone(),
        };
        let _ = write!(out, r#" {attr_name}="{}""#, escape(value.as_str()));
    }

    if el.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        match child {
            XmlNode::Element(child) => write_element(out, child, prefixes, false),
            XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
        }
    }
    out.push_str("</");
    out.push_str(&name);
    out.push('>');
}
