//! OPC relationship parts (`_rels/*.rels`).

use std::fmt::Write as _;
use std::io::Cursor;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Result;

pub const NS_PACKAGE_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships";

pub const REL_TYPE_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_TYPE_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub const REL_TYPE_DRAWING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";
pub const REL_TYPE_CHART: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/chart";
pub const REL_TYPE_CHART_EX: &str = "http://schemas.microsoft.com/office/2014/relationships/chartEx";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub type_uri: String,
    pub target: String,
    pub target_mode: Option<String>,
}

impl Relationship {
    pub fn is_external(&self) -> bool {
        self.target_mode
            .as_deref()
            .is_some_and(|mode| mode.trim().eq_ignore_ascii_case("External"))
    }
}

/// Streams `<Relationship>` elements out of a `.rels` part. Entries missing `Id`, `Type` or
/// `Target` are skipped.
pub fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>> {
    let mut reader = Reader::from_reader(Cursor::new(xml));
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut relationships = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) | Event::Empty(start)
                if local_name(start.name().as_ref()).eq_ignore_ascii_case(b"Relationship") =>
            {
                let mut id = None;
                let mut target = None;
                let mut type_uri = None;
                let mut target_mode = None;
                for attr in start.attributes() {
                    let attr = attr?;
                    let key = local_name(attr.key.as_ref());
                    let value = attr.unescape_value()?.into_owned();
                    if key.eq_ignore_ascii_case(b"Id") {
                        id = Some(value);
                    } else if key.eq_ignore_ascii_case(b"Target") {
                        target = Some(value);
                    } else if key.eq_ignore_ascii_case(b"Type") {
                        type_uri = Some(value);
                    } else if key.eq_ignore_ascii_case(b"TargetMode") {
                        target_mode = Some(value);
                    }
                }
                match (id, target, type_uri) {
                    (Some(id), Some(target), Some(type_uri)) => relationships.push(Relationship {
                        id,
                        type_uri,
                        target,
                        target_mode,
                    }),
                    _ => log::warn!("skipping relationship without Id/Type/Target"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(relationships)
}

pub fn write_relationships(relationships: &[Relationship]) -> Vec<u8> {
    let mut xml = String::new();
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    let _ = write!(xml, r#"<Relationships xmlns="{NS_PACKAGE_RELATIONSHIPS}">"#);
    for rel in relationships {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}" Target="{}""#,
            escape(rel.id.as_str()),
            escape(rel.type_uri.as_str()),
            escape(rel.target.as_str()),
        );
        if let Some(mode) = &rel.target_mode {
            let _ = write!(xml, r#" TargetMode="{}""#, escape(mode.as_str()));
        }
        xml.push_str("/>");
    }
    xml.push_str("</Relationships>");
    xml.into_bytes()
}

/// First `rIdN` not already taken, counting up from one past the highest numeric id.
pub fn next_relationship_id(relationships: &[Relationship]) -> String {
    let highest = relationships
        .iter()
        .filter_map(|rel| rel.id.strip_prefix("rId")?.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    let mut n = highest.saturating_add(1);
    while relationships.iter().any(|rel| rel.id == format!("rId{n}")) {
        n = n.saturating_add(1);
    }
    format!("rId{n}")
}

pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().rposition(|b| *b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`. The empty source names
/// the package itself (`_rels/.rels`).
pub fn rels_part_name(part_name: &str) -> String {
    let part_name = part_name.strip_prefix('/').unwrap_or(part_name);
    match part_name.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part_name}.rels"),
    }
}

/// Resolves a relationship target against the part that owns the relationship.
pub fn resolve_target(base_part: &str, target: &str) -> String {
    let target = target.split_once('#').map(|(base, _)| base).unwrap_or(target);
    if target.is_empty() {
        return base_part.strip_prefix('/').unwrap_or(base_part).to_string();
    }

    let (target, is_absolute) = match target.strip_prefix('/') {
        Some(target) => (target, true),
        None => (target, false),
    };
    let base_dir = if is_absolute {
        ""
    } else {
        base_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    };

    let mut components: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                components.pop();
            }
            _ => components.push(segment),
        }
    }

    components.join("/")
}

/// The target to store in `source_part`'s rels so that it resolves to `target_part`.
pub fn relative_target(source_part: &str, target_part: &str) -> String {
    let source_part = source_part.strip_prefix('/').unwrap_or(source_part);
    let target_part = target_part.strip_prefix('/').unwrap_or(target_part);
    let source_dir: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    let target: Vec<&str> = target_part.split('/').collect();

    let (target_dir, file) = target.split_at(target.len().saturating_sub(1));
    let common = source_dir
        .iter()
        .zip(target_dir)
        .take_while(|(a, b)| a == b)
        .count();

    let mut out: Vec<&str> = std::iter::repeat("..")
        .take(source_dir.len() - common)
        .collect();
    out.extend_from_slice(&target_dir[common..]);
    out.extend_from_slice(file);
    out.join("/")
}
