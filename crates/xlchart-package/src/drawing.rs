//! SpreadsheetML drawing parts: the `xdr:wsDr` anchors that place charts on a sheet.

use std::fmt::Write as _;

use quick_xml::escape::escape;
use roxmltree::{Document, Node};
use xlchart_dom::ns::{NS_CHART, NS_CHART_EX, NS_DRAWING, NS_RELATIONSHIPS, NS_SPREADSHEET_DRAWING};

use crate::error::{utf8, PackageError, Result};

/// A cell corner plus an EMU offset into that cell (0-indexed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnchorPoint {
    pub col: u32,
    pub col_offset: i64,
    pub row: u32,
    pub row_offset: i64,
}

impl AnchorPoint {
    pub const fn cell(col: u32, row: u32) -> Self {
        Self {
            col,
            col_offset: 0,
            row,
            row_offset: 0,
        }
    }
}

/// Two-cell placement of a chart frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartAnchor {
    pub from: AnchorPoint,
    pub to: AnchorPoint,
}

impl ChartAnchor {
    pub fn new(from: AnchorPoint, to: AnchorPoint) -> Result<Self> {
        if (to.row, to.row_offset) < (from.row, from.row_offset)
            || (to.col, to.col_offset) < (from.col, from.col_offset)
        {
            return Err(PackageError::Invalid(format!(
                "anchor end {to:?} precedes its start {from:?}"
            )));
        }
        Ok(Self { from, to })
    }

    /// Anchors a chart over whole cells, `from` inclusive and `to` exclusive.
    pub fn cells(from_col: u32, from_row: u32, to_col: u32, to_row: u32) -> Result<Self> {
        Self::new(AnchorPoint::cell(from_col, from_row), AnchorPoint::cell(to_col, to_row))
    }
}

impl Default for ChartAnchor {
    /// Excel's default insertion footprint, roughly 8 columns by 15 rows.
    fn default() -> Self {
        Self {
            from: AnchorPoint::cell(1, 1),
            to: AnchorPoint::cell(9, 16),
        }
    }
}

/// A chart referenced from a drawing part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRef {
    pub rel_id: String,
    /// Resolved chart part, when the relationship exists.
    pub part: Option<String>,
    pub name: Option<String>,
    pub anchor: Option<ChartAnchor>,
    pub extended: bool,
}

pub(crate) fn empty_drawing() -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="{NS_SPREADSHEET_DRAWING}" xmlns:a="{NS_DRAWING}"></xdr:wsDr>"#
    )
    .into_bytes()
}

fn write_point(out: &mut String, tag: &str, point: &AnchorPoint) {
    let _ = write!(
        out,
        "<xdr:{tag}><xdr:col>{}</xdr:col><xdr:colOff>{}</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>{}</xdr:rowOff></xdr:{tag}>",
        point.col, point.col_offset, point.row, point.row_offset
    );
}

fn graphic_frame_xml(
    frame_id: u32,
    name: &str,
    rel_id: &str,
    anchor: &ChartAnchor,
    declare_xdr: bool,
    declare_a: bool,
) -> String {
    let mut out = String::from("<xdr:twoCellAnchor");
    if declare_xdr {
        let _ = write!(out, r#" xmlns:xdr="{NS_SPREADSHEET_DRAWING}""#);
    }
    // `a:` is first used by `xdr:xfrm`, so it has to be in scope from the anchor down.
    if declare_a {
        let _ = write!(out, r#" xmlns:a="{NS_DRAWING}""#);
    }
    out.push('>');
    write_point(&mut out, "from", &anchor.from);
    write_point(&mut out, "to", &anchor.to);
    let _ = write!(
        out,
        r#"<xdr:graphicFrame macro=""><xdr:nvGraphicFramePr><xdr:cNvPr id="{frame_id}" name="{}"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr>"#,
        escape(name)
    );
    out.push_str(r#"<xdr:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></xdr:xfrm>"#);
    let _ = write!(
        out,
        r#"<a:graphic><a:graphicData uri="{NS_CHART}"><c:chart xmlns:c="{NS_CHART}" xmlns:r="{NS_RELATIONSHIPS}" r:id="{}"/></a:graphicData></a:graphic>"#,
        escape(rel_id)
    );
    out.push_str("</xdr:graphicFrame><xdr:clientData/></xdr:twoCellAnchor>");
    out
}

/// Qualified element name of the root start tag, as written in the source.
fn root_qname<'a>(xml: &'a str, root: Node<'_, '_>) -> &'a str {
    let start = &xml[root.range().start + 1..];
    let end = start
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(start.len());
    &start[..end]
}

/// Appends a two-cell chart frame to the drawing and returns the new drawing bytes.
pub(crate) fn append_chart_frame(
    drawing: &[u8],
    part_name: &str,
    frame_id: u32,
    name: &str,
    rel_id: &str,
    anchor: &ChartAnchor,
) -> Result<Vec<u8>> {
    let xml = utf8(part_name, drawing)?;
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "wsDr" {
        return Err(PackageError::Invalid(format!(
            "{part_name}: expected <xdr:wsDr>, found <{}>",
            root.tag_name().name()
        )));
    }

    let declare_xdr = root.lookup_namespace_uri(Some("xdr")) != Some(NS_SPREADSHEET_DRAWING);
    let declare_a = root.lookup_namespace_uri(Some("a")) != Some(NS_DRAWING);
    let frame = graphic_frame_xml(frame_id, name, rel_id, anchor, declare_xdr, declare_a);

    let qname = root_qname(xml, root);
    let range = root.range();
    let element = &xml[range.clone()];
    let mut out = String::with_capacity(xml.len() + frame.len() + qname.len() + 3);
    out.push_str(&xml[..range.start]);
    if element.ends_with("/>") {
        out.push_str(&element[..element.len() - 2]);
        out.push('>');
        out.push_str(&frame);
        let _ = write!(out, "</{qname}>");
    } else {
        let close = element
            .rfind("</")
            .ok_or_else(|| PackageError::Invalid(format!("{part_name}: missing </{qname}>")))?;
        out.push_str(&element[..close]);
        out.push_str(&frame);
        out.push_str(&element[close..]);
    }
    out.push_str(&xml[range.end..]);
    Ok(out.into_bytes())
}

/// One past the largest `cNvPr/@id` in the drawing; ids 1 and below are reserved.
pub(crate) fn next_shape_id(drawing: &[u8], part_name: &str) -> Result<u32> {
    let doc = Document::parse(utf8(part_name, drawing)?)?;
    let max = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "cNvPr")
        .filter_map(|n| n.attribute("id")?.trim().parse::<u32>().ok())
        .max()
        .unwrap_or(1);
    Ok(max.saturating_add(1))
}

fn child<'a, 'input>(node: Node<'a, 'input>, local: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == local)
}

fn child_number<T: std::str::FromStr>(node: Node<'_, '_>, local: &str) -> Option<T> {
    child(node, local)?.text()?.trim().parse().ok()
}

fn parse_point(node: Node<'_, '_>) -> Option<AnchorPoint> {
    Some(AnchorPoint {
        col: child_number(node, "col")?,
        col_offset: child_number(node, "colOff").unwrap_or(0),
        row: child_number(node, "row")?,
        row_offset: child_number(node, "rowOff").unwrap_or(0),
    })
}

/// Chart references (`c:chart` and `cx:chart`) in document order, with relationship ids still
/// unresolved.
pub(crate) fn parse_chart_refs(drawing: &[u8], part_name: &str) -> Result<Vec<ChartRef>> {
    let doc = Document::parse(utf8(part_name, drawing)?)?;
    let mut refs = Vec::new();

    for node in doc.descendants().filter(|n| n.is_element()) {
        let tag = node.tag_name();
        if tag.name() != "chart" {
            continue;
        }
        let extended = match tag.namespace() {
            Some(NS_CHART) => false,
            Some(NS_CHART_EX) => true,
            _ => continue,
        };
        let Some(rel_id) = node.attribute((NS_RELATIONSHIPS, "id")) else {
            log::warn!("{part_name}: chart reference without r:id");
            continue;
        };

        let frame = node
            .ancestors()
            .find(|n| n.is_element() && n.tag_name().name() == "graphicFrame");
        let name = frame
            .and_then(|f| child(f, "nvGraphicFramePr"))
            .and_then(|nv| child(nv, "cNvPr"))
            .and_then(|pr| pr.attribute("name"))
            .map(str::to_string);
        let anchor = node
            .ancestors()
            .find(|n| n.is_element() && n.tag_name().name() == "twoCellAnchor")
            .and_then(|a| {
                Some(ChartAnchor {
                    from: parse_point(child(a, "from")?)?,
                    to: parse_point(child(a, "to")?)?,
                })
            });

        refs.push(ChartRef {
            rel_id: rel_id.to_string(),
            part: None,
            name,
            anchor,
            extended,
        });
    }

    Ok(refs)
}

/// Elements that follow `<drawing>` in CT_Worksheet.
const AFTER_DRAWING: &[&str] = &[
    "legacyDrawing",
    "legacyDrawingHF",
    "drawingHF",
    "picture",
    "oleObjects",
    "controls",
    "webPublishItems",
    "tableParts",
    "extLst",
];

/// `r:id` of the sheet's `<drawing>` element, if any.
pub(crate) fn sheet_drawing_rel_id(sheet: &[u8], part_name: &str) -> Result<Option<String>> {
    let doc = Document::parse(utf8(part_name, sheet)?)?;
    Ok(doc
        .root_element()
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "drawing")
        .and_then(|n| n.attribute((NS_RELATIONSHIPS, "id")))
        .map(str::to_string))
}

/// Inserts `<drawing r:id>` at its schema position in a worksheet.
pub(crate) fn insert_sheet_drawing(sheet: &[u8], part_name: &str, rel_id: &str) -> Result<Vec<u8>> {
    let xml = utf8(part_name, sheet)?;
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let root_name = root.tag_name().name();
    if root_name != "worksheet" && root_name != "chartsheet" {
        return Err(PackageError::Invalid(format!(
            "{part_name}: expected <worksheet> or <chartsheet>, found <{root_name}>"
        )));
    }

    let qname = root_qname(xml, root);
    let prefix = qname.split_once(':').map(|(p, _)| format!("{p}:")).unwrap_or_default();
    let r_prefix = match root.lookup_prefix(NS_RELATIONSHIPS) {
        Some(p) => p.to_string(),
        None => "r".to_string(),
    };
    let mut element = format!(r#"<{prefix}drawing {r_prefix}:id="{}""#, escape(rel_id));
    if root.lookup_prefix(NS_RELATIONSHIPS).is_none() {
        let _ = write!(element, r#" xmlns:r="{NS_RELATIONSHIPS}""#);
    }
    element.push_str("/>");

    let range = root.range();
    let root_xml = &xml[range.clone()];
    let mut out = String::with_capacity(xml.len() + element.len() + qname.len() + 3);
    if root_xml.ends_with("/>") {
        out.push_str(&xml[..range.end - 2]);
        out.push('>');
        out.push_str(&element);
        let _ = write!(out, "</{qname}>");
        out.push_str(&xml[range.end..]);
        return Ok(out.into_bytes());
    }

    let insert_at = match root
        .children()
        .find(|n| n.is_element() && AFTER_DRAWING.contains(&n.tag_name().name()))
    {
        Some(next) => next.range().start,
        None => {
            range.start
                + root_xml.rfind("</").ok_or_else(|| {
                    PackageError::Invalid(format!("{part_name}: missing </{qname}>"))
                })?
        }
    };
    out.push_str(&xml[..insert_at]);
    out.push_str(&element);
    out.push_str(&xml[insert_at..]);
    Ok(out.into_bytes())
}
