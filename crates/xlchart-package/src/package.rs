use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::{Cursor, Seek, Write};

use quick_xml::escape::escape;
use xlchart_dom::ns::NS_RELATIONSHIPS;

use crate::content_types::{
    self, CONTENT_TYPES_PART, CT_WORKBOOK, CT_WORKSHEET,
};
use crate::error::{PackageError, Result};
use crate::relationships::{
    self, next_relationship_id, parse_relationships, rels_part_name, write_relationships,
    Relationship, REL_TYPE_OFFICE_DOCUMENT, REL_TYPE_WORKSHEET,
};
use crate::zip_util::{self, InflateBudget};

pub(crate) const NS_SPREADSHEETML: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Size limits enforced by [`ChartPackage::from_bytes_limited`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageLimits {
    /// Maximum uncompressed bytes for any single part.
    pub max_part_bytes: u64,
    /// Maximum uncompressed bytes across the whole package.
    pub max_total_bytes: u64,
}

impl Default for PackageLimits {
    fn default() -> Self {
        Self {
            max_part_bytes: zip_util::DEFAULT_MAX_PART_BYTES,
            max_total_bytes: zip_util::DEFAULT_MAX_TOTAL_BYTES,
        }
    }
}

/// An OPC package held fully in memory, keyed by part name without a leading `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartPackage {
    parts: BTreeMap<String, Vec<u8>>,
}

fn canonical(name: &str) -> &str {
    name.strip_prefix('/').unwrap_or(name)
}

impl ChartPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_limited(bytes, PackageLimits::default())
    }

    pub fn from_bytes_limited(bytes: &[u8], limits: PackageLimits) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = BTreeMap::new();
        let mut budget = InflateBudget::new(limits.max_total_bytes);

        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = canonical(file.name()).to_string();
            let declared = file.size();
            let buf =
                zip_util::read_entry(&mut file, &name, declared, limits.max_part_bytes, &mut budget)?;
            parts.insert(name, buf);
        }

        log::debug!("loaded package with {} parts", parts.len());
        Ok(Self { parts })
    }

    /// A minimal workbook with one empty worksheet per name, in order.
    pub fn new_workbook(sheet_names: &[&str]) -> Result<Self> {
        if sheet_names.is_empty() {
            return Err(PackageError::Invalid("a workbook needs at least one sheet".into()));
        }
        for (i, name) in sheet_names.iter().enumerate() {
            if name.trim().is_empty() || name.chars().count() > 31 {
                return Err(PackageError::Invalid(format!("invalid sheet name `{name}`")));
            }
            if sheet_names[..i].iter().any(|other| other.eq_ignore_ascii_case(name)) {
                return Err(PackageError::Invalid(format!("duplicate sheet name `{name}`")));
            }
        }

        let mut pkg = Self::default();
        pkg.parts.insert(CONTENT_TYPES_PART.to_string(), content_types::minimal_content_types());
        pkg.parts.insert(
            rels_part_name(""),
            write_relationships(&[Relationship {
                id: "rId1".into(),
                type_uri: REL_TYPE_OFFICE_DOCUMENT.into(),
                target: "xl/workbook.xml".into(),
                target_mode: None,
            }]),
        );

        let mut sheets = String::new();
        let mut rels = Vec::with_capacity(sheet_names.len());
        for (i, name) in sheet_names.iter().enumerate() {
            let n = i + 1;
            let _ = write!(
                sheets,
                r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
                escape(*name)
            );
            rels.push(Relationship {
                id: format!("rId{n}"),
                type_uri: REL_TYPE_WORKSHEET.into(),
                target: format!("worksheets/sheet{n}.xml"),
                target_mode: None,
            });
            pkg.create_part(
                &format!("xl/worksheets/sheet{n}.xml"),
                CT_WORKSHEET,
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{NS_SPREADSHEETML}" xmlns:r="{NS_RELATIONSHIPS}"><sheetData/></worksheet>"#
                )
                .into_bytes(),
            )?;
        }

        pkg.create_part(
            "xl/workbook.xml",
            CT_WORKBOOK,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{NS_SPREADSHEETML}" xmlns:r="{NS_RELATIONSHIPS}"><sheets>{sheets}</sheets></workbook>"#
            )
            .into_bytes(),
        )?;
        pkg.parts.insert(rels_part_name("xl/workbook.xml"), write_relationships(&rels));
        Ok(pkg)
    }

    pub fn write_to<W: Write + Seek>(&self, w: W) -> Result<W> {
        let mut zip = zip::ZipWriter::new(w);
        let options = zip::write::FileOptions::<()>::default()
            .compression_method(zip::CompressionMethod::Deflated);

        // Content types first; some consumers sniff the leading entry.
        let ordered = self
            .parts
            .iter()
            .filter(|(name, _)| name.as_str() == CONTENT_TYPES_PART)
            .chain(self.parts.iter().filter(|(name, _)| name.as_str() != CONTENT_TYPES_PART));
        for (name, bytes) in ordered {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        Ok(zip.finish()?)
    }

    pub fn write_to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.write_to(Cursor::new(Vec::new()))?.into_inner())
    }

    /// Part bytes by name; a leading `/` is optional.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts.get(canonical(name)).map(Vec::as_slice)
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.contains_key(canonical(name))
    }

    /// Replaces or inserts raw part bytes without touching content types or relationships.
    pub fn set_part(&mut self, name: &str, bytes: Vec<u8>) {
        self.parts.insert(canonical(name).to_string(), bytes);
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Removes a part along with its content-type override and its own relationships part.
    pub fn remove_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let name = canonical(name);
        if !self.parts.contains_key(name) {
            return Ok(None);
        }
        let content_types = match self.parts.get(CONTENT_TYPES_PART) {
            Some(existing) => Some(content_types::without_override(existing, name)?),
            None => None,
        };
        if let Some(content_types) = content_types {
            self.parts.insert(CONTENT_TYPES_PART.to_string(), content_types);
        }
        self.parts.remove(&rels_part_name(name));
        Ok(self.parts.remove(name))
    }

    /// Adds a new part and registers its content type override.
    pub fn create_part(&mut self, name: &str, content_type: &str, bytes: Vec<u8>) -> Result<()> {
        let name = canonical(name);
        if self.parts.contains_key(name) {
            return Err(PackageError::DuplicatePart(name.to_string()));
        }
        let content_types = self.content_types_with_override(name, content_type)?;
        self.parts.insert(CONTENT_TYPES_PART.to_string(), content_types);
        self.parts.insert(name.to_string(), bytes);
        Ok(())
    }

    fn content_types_with_override(
        &self,
        name: &str,
        content_type: &str,
    ) -> Result<Vec<u8>> {
        match self.parts.get(CONTENT_TYPES_PART) {
            Some(existing) => content_types::with_override(existing, name, content_type),
            None => content_types::with_override(
                &content_types::minimal_content_types(),
                name,
                content_type,
            ),
        }
    }

    pub fn content_type(&self, name: &str) -> Result<Option<String>> {
        match self.parts.get(CONTENT_TYPES_PART) {
            Some(existing) => content_types::content_type_of(existing, canonical(name)),
            None => Ok(None),
        }
    }

    /// Name of the relationships part owned by `part_name` (`""` for the package root).
    pub fn rels_for_part(&self, part_name: &str) -> String {
        rels_part_name(part_name)
    }

    /// Relationships owned by `source_part`; empty when it has no rels part.
    pub fn relationships(&self, source_part: &str) -> Result<Vec<Relationship>> {
        match self.part(&rels_part_name(source_part)) {
            Some(xml) => parse_relationships(xml),
            None => Ok(Vec::new()),
        }
    }

    pub fn resolve_target(&self, source_part: &str, target: &str) -> String {
        relationships::resolve_target(source_part, target)
    }

    /// Part that `source_part`'s relationship `rel_id` points at; `None` for external targets.
    pub fn relationship_target(&self, source_part: &str, rel_id: &str) -> Result<Option<String>> {
        let rels = self.relationships(source_part)?;
        let rel = rels
            .iter()
            .find(|rel| rel.id == rel_id)
            .ok_or_else(|| {
                PackageError::Invalid(format!("{source_part} has no relationship {rel_id}"))
            })?;
        if rel.is_external() {
            return Ok(None);
        }
        Ok(Some(relationships::resolve_target(source_part, &rel.target)))
    }

    /// Adds a relationship from `source_part` to the package part `target_part` and returns its
    /// id. The stored target is relative to the source.
    pub fn create_relationship(
        &mut self,
        source_part: &str,
        type_uri: &str,
        target_part: &str,
    ) -> Result<String> {
        let (id, name, bytes) = self.staged_relationship(source_part, type_uri, target_part)?;
        self.parts.insert(name, bytes);
        Ok(id)
    }

    pub(crate) fn staged_relationship(
        &self,
        source_part: &str,
        type_uri: &str,
        target_part: &str,
    ) -> Result<(String, String, Vec<u8>)> {
        let mut rels = self.relationships(source_part)?;
        let id = next_relationship_id(&rels);
        rels.push(Relationship {
            id: id.clone(),
            type_uri: type_uri.to_string(),
            target: relationships::relative_target(source_part, target_part),
            target_mode: None,
        });
        Ok((id, rels_part_name(source_part), write_relationships(&rels)))
    }

    /// First `prefix{N}{suffix}` part name not in use, counting from 1.
    pub(crate) fn next_part_name(&self, prefix: &str, suffix: &str) -> String {
        (1u32..)
            .map(|n| format!("{prefix}{n}{suffix}"))
            .find(|name| !self.parts.contains_key(name))
            .unwrap_or_else(|| format!("{prefix}0{suffix}"))
    }

    pub(crate) fn insert_raw(&mut self, name: String, bytes: Vec<u8>) {
        self.parts.insert(name, bytes);
    }
}
