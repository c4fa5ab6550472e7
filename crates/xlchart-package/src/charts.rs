//! Chart parts inside a package: discovery, loading, saving and embedding on a sheet.

use roxmltree::Document;
use xlchart_charts::{ChartDocument, ChartType};
use xlchart_dom::ns::{NS_CHART, NS_CHART_EX};

use crate::content_types::{self, CONTENT_TYPES_PART, CT_CHART, CT_CHART_EX, CT_DRAWING};
use crate::drawing::{self, ChartAnchor, ChartRef};
use crate::error::{utf8, PackageError, Result};
use crate::package::ChartPackage;
use crate::relationships::{self, Relationship, REL_TYPE_CHART, REL_TYPE_DRAWING};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartPartKind {
    /// A `c:chartSpace` part; the type is `None` when the plot area holds no chart group.
    Classic(Option<ChartType>),
    /// A `cx:chartSpace` part with its lower-camel-case kind (`waterfall`, `histogram`, ...), or
    /// `unknown`.
    Extended(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPart {
    pub part: String,
    pub kind: ChartPartKind,
}

const EXTENDED_KINDS: &[&str] = &[
    "waterfall",
    "histogram",
    "pareto",
    "boxWhisker",
    "funnel",
    "regionMap",
    "treemap",
    "sunburst",
];

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn normalize_kind(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let raw = raw.rsplit(':').next().unwrap_or(raw);
    let base = match raw.len().checked_sub(5) {
        Some(cut) if raw.is_char_boundary(cut) && raw[cut..].eq_ignore_ascii_case("chart") => &raw[..cut],
        _ => raw,
    };
    (!base.is_empty()).then(|| lowercase_first(base))
}

/// Kind of an extended chart: an explicit `*Chart` element first, then the first series
/// `layoutId`.
fn extended_kind(doc: &Document<'_>) -> String {
    let elements = || doc.descendants().filter(|n| n.is_element());

    let explicit = elements()
        .filter(|n| n.tag_name().name().ends_with("Chart"))
        .filter_map(|n| normalize_kind(n.tag_name().name()))
        .find(|kind| EXTENDED_KINDS.iter().any(|known| known.eq_ignore_ascii_case(kind)));
    if let Some(kind) = explicit {
        return kind;
    }

    if let Some(kind) = elements()
        .filter(|n| n.tag_name().name() == "series")
        .find_map(|n| n.attribute("layoutId"))
        .and_then(normalize_kind)
    {
        return kind;
    }

    log::warn!("extended chart kind could not be inferred");
    "unknown".to_string()
}

/// Classifies a chart part by its root element; `None` for anything that is not a chart space.
pub fn classify_chart_part(part_name: &str, bytes: &[u8]) -> Result<Option<ChartPartKind>> {
    let doc = Document::parse(utf8(part_name, bytes)?)?;
    let root = doc.root_element();
    if root.tag_name().name() != "chartSpace" {
        return Ok(None);
    }
    match root.tag_name().namespace() {
        Some(NS_CHART) => {
            let chart = ChartDocument::parse(bytes)?;
            Ok(Some(ChartPartKind::Classic(chart.chart_type())))
        }
        Some(NS_CHART_EX) => Ok(Some(ChartPartKind::Extended(extended_kind(&doc)))),
        _ => Ok(None),
    }
}

impl ChartPackage {
    fn is_chart_candidate(&self, name: &str) -> Result<bool> {
        if !name.ends_with(".xml") || name.contains("/_rels/") || name == CONTENT_TYPES_PART {
            return Ok(false);
        }
        Ok(match self.content_type(name)?.as_deref() {
            Some(CT_CHART) | Some(CT_CHART_EX) => true,
            _ => name.starts_with("xl/charts/"),
        })
    }

    /// Every classic and extended chart part, in part-name order.
    pub fn chart_parts(&self) -> Result<Vec<ChartPart>> {
        let mut out = Vec::new();
        for name in self.part_names() {
            if !self.is_chart_candidate(name)? {
                continue;
            }
            let Some(bytes) = self.part(name) else {
                continue;
            };
            match classify_chart_part(name, bytes)? {
                Some(kind) => out.push(ChartPart {
                    part: name.to_string(),
                    kind,
                }),
                None => log::debug!("{name} is not a chart space; skipping"),
            }
        }
        Ok(out)
    }

    pub fn load_chart(&self, part_name: &str) -> Result<ChartDocument> {
        let bytes = self
            .part(part_name)
            .ok_or_else(|| PackageError::MissingPart(part_name.to_string()))?;
        Ok(ChartDocument::parse(bytes)?)
    }

    /// Overwrites an existing chart part with the document's XML.
    pub fn save_chart(&mut self, part_name: &str, chart: &ChartDocument) -> Result<()> {
        if !self.has_part(part_name) {
            return Err(PackageError::MissingPart(part_name.to_string()));
        }
        self.set_part(part_name, chart.to_xml_bytes());
        Ok(())
    }

    /// Charts referenced by a drawing part, with their parts resolved through its relationships.
    pub fn chart_refs(&self, drawing_part: &str) -> Result<Vec<ChartRef>> {
        let bytes = self
            .part(drawing_part)
            .ok_or_else(|| PackageError::MissingPart(drawing_part.to_string()))?;
        let rels = self.relationships(drawing_part)?;
        let mut refs = drawing::parse_chart_refs(bytes, drawing_part)?;
        for chart in &mut refs {
            chart.part = rels
                .iter()
                .find(|rel| rel.id == chart.rel_id && !rel.is_external())
                .map(|rel| self.resolve_target(drawing_part, &rel.target));
            if chart.part.is_none() {
                log::warn!("{drawing_part}: {} has no matching relationship", chart.rel_id);
            }
        }
        Ok(refs)
    }

    /// The drawing part attached to a worksheet part, if any.
    pub fn sheet_drawing(&self, sheet_part: &str) -> Result<Option<String>> {
        let bytes = self
            .part(sheet_part)
            .ok_or_else(|| PackageError::MissingPart(sheet_part.to_string()))?;
        match drawing::sheet_drawing_rel_id(bytes, sheet_part)? {
            Some(rel_id) => self.relationship_target(sheet_part, &rel_id),
            None => Ok(None),
        }
    }

    /// Embeds `chart` on `sheet_name` and returns the new chart part name.
    ///
    /// The sheet's drawing is reused when it has one; otherwise a drawing part is created and
    /// linked from the sheet. Every fallible step runs before the package is touched, so an error
    /// leaves it unchanged.
    pub fn add_chart(
        &mut self,
        sheet_name: &str,
        chart: &ChartDocument,
        anchor: ChartAnchor,
    ) -> Result<String> {
        let sheet_part = self.worksheet_part(sheet_name)?;
        let chart_part = self.next_part_name("xl/charts/chart", ".xml");
        let mut writes: Vec<(String, Vec<u8>)> = Vec::new();
        let mut types_xml = match self.part(CONTENT_TYPES_PART) {
            Some(bytes) => bytes.to_vec(),
            None => content_types::minimal_content_types(),
        };

        let (drawing_part, drawing_bytes, drawing_rels) = match self.sheet_drawing(&sheet_part)? {
            Some(existing) => {
                let bytes = self
                    .part(&existing)
                    .ok_or_else(|| PackageError::MissingPart(existing.clone()))?
                    .to_vec();
                let rels = self.relationships(&existing)?;
                (existing, bytes, rels)
            }
            None => {
                let name = self.next_part_name("xl/drawings/drawing", ".xml");
                let (rel_id, rels_name, rels_bytes) =
                    self.staged_relationship(&sheet_part, REL_TYPE_DRAWING, &name)?;
                let sheet = self
                    .part(&sheet_part)
                    .ok_or_else(|| PackageError::MissingPart(sheet_part.clone()))?;
                writes.push((sheet_part.clone(), drawing::insert_sheet_drawing(sheet, &sheet_part, &rel_id)?));
                writes.push((rels_name, rels_bytes));
                types_xml = content_types::with_override(&types_xml, &name, CT_DRAWING)?;
                log::debug!("created {name} for {sheet_part}");
                (name, drawing::empty_drawing(), Vec::new())
            }
        };

        let chart_count = drawing::parse_chart_refs(&drawing_bytes, &drawing_part)?.len();
        let frame_id = drawing::next_shape_id(&drawing_bytes, &drawing_part)?;
        let rel_id = relationships::next_relationship_id(&drawing_rels);
        let mut rels = drawing_rels;
        rels.push(Relationship {
            id: rel_id.clone(),
            type_uri: REL_TYPE_CHART.to_string(),
            target: relationships::relative_target(&drawing_part, &chart_part),
            target_mode: None,
        });
        let drawing_bytes = drawing::append_chart_frame(
            &drawing_bytes,
            &drawing_part,
            frame_id,
            &format!("Chart {}", chart_count + 1),
            &rel_id,
            &anchor,
        )?;
        types_xml = content_types::with_override(&types_xml, &chart_part, CT_CHART)?;

        writes.push((
            self.rels_for_part(&drawing_part),
            relationships::write_relationships(&rels),
        ));
        writes.push((drawing_part, drawing_bytes));
        writes.push((chart_part.clone(), chart.to_xml_bytes()));
        writes.push((CONTENT_TYPES_PART.to_string(), types_xml));
        for (name, bytes) in writes {
            self.insert_raw(name, bytes);
        }

        log::debug!("embedded {chart_part} on sheet `{sheet_name}`");
        Ok(chart_part)
    }
}
