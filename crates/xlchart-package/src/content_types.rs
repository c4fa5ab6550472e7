//! `[Content_Types].xml` maintenance.
//!
//! Edits stream the existing part through quick-xml so unrelated entries keep their bytes.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{utf8, Result};
use crate::relationships::local_name;

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

pub const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
pub const CT_XML: &str = "application/xml";
pub const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
pub const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
pub const CT_DRAWING: &str = "application/vnd.openxmlformats-officedocument.drawing+xml";
pub const CT_CHART: &str = "application/vnd.openxmlformats-officedocument.drawingml.chart+xml";
pub const CT_CHART_EX: &str = "application/vnd.ms-office.chartex+xml";

pub(crate) fn minimal_content_types() -> Vec<u8> {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<Types xmlns="{ns}">"#,
            r#"<Default Extension="rels" ContentType="{rels}"/>"#,
            r#"<Default Extension="xml" ContentType="{xml}"/>"#,
            "</Types>"
        ),
        ns = NS_CONTENT_TYPES,
        rels = CT_RELATIONSHIPS,
        xml = CT_XML,
    )
    .into_bytes()
}

fn part_name_attr(part_name: &str) -> String {
    format!("/{}", part_name.strip_prefix('/').unwrap_or(part_name))
}

fn prefixed_tag(container: &[u8], local: &str) -> String {
    let container = String::from_utf8_lossy(container);
    match container.split_once(':') {
        Some((prefix, _)) => format!("{prefix}:{local}"),
        None => local.to_string(),
    }
}

fn names_part(e: &BytesStart<'_>, wanted: &str) -> Result<bool> {
    for attr in e.attributes().with_checks(false) {
        let attr = attr?;
        if local_name(attr.key.as_ref()).eq_ignore_ascii_case(b"PartName") {
            let value = attr.unescape_value()?;
            return Ok(value.trim().eq_ignore_ascii_case(wanted));
        }
    }
    Ok(false)
}

fn override_element<'a>(tag: &'a str, part_name: &'a str, content_type: &'a str) -> BytesStart<'a> {
    let mut el = BytesStart::new(tag);
    el.push_attribute(("PartName", part_name));
    el.push_attribute(("ContentType", content_type));
    el
}

/// Rewrites the content types, dropping the `<Override>` for `part_name` and, when `content_type`
/// is given, appending a fresh one before `</Types>`.
fn rewrite_override(
    existing: &[u8],
    part_name: &str,
    content_type: Option<&str>,
) -> Result<Vec<u8>> {
    let wanted = part_name_attr(part_name);
    let mut reader = Reader::from_reader(existing);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(existing.len() + 160));
    let mut buf = Vec::new();

    let mut override_tag: Option<String> = None;
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(_) if skip_depth > 0 => skip_depth += 1,
            Event::End(_) if skip_depth > 0 => skip_depth -= 1,
            _ if skip_depth > 0 => {}
            Event::Start(e) if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Override") => {
                override_tag.get_or_insert_with(|| String::from_utf8_lossy(e.name().as_ref()).into_owned());
                if names_part(&e, &wanted)? {
                    skip_depth = 1;
                } else {
                    writer.write_event(Event::Start(e))?;
                }
            }
            Event::Empty(e) if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Override") => {
                override_tag.get_or_insert_with(|| String::from_utf8_lossy(e.name().as_ref()).into_owned());
                if !names_part(&e, &wanted)? {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            Event::End(e) if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Types") => {
                if let Some(content_type) = content_type {
                    let tag = override_tag
                        .clone()
                        .unwrap_or_else(|| prefixed_tag(e.name().as_ref(), "Override"));
                    writer.write_event(Event::Empty(override_element(&tag, &wanted, content_type)))?;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) if local_name(e.name().as_ref()).eq_ignore_ascii_case(b"Types") => {
                if let Some(content_type) = content_type {
                    let types_tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let tag = prefixed_tag(types_tag.as_bytes(), "Override");
                    writer.write_event(Event::Start(e))?;
                    writer.write_event(Event::Empty(override_element(&tag, &wanted, content_type)))?;
                    writer.write_event(Event::End(BytesEnd::new(types_tag.as_str())))?;
                } else {
                    writer.write_event(Event::Empty(e))?;
                }
            }
            other => writer.write_event(other)?,
        }
        buf.clear();
    }

    Ok(writer.into_inner())
}

/// Returns the content types with an `<Override>` for `part_name`, replacing any existing one.
pub(crate) fn with_override(existing: &[u8], part_name: &str, content_type: &str) -> Result<Vec<u8>> {
    rewrite_override(existing, part_name, Some(content_type))
}

pub(crate) fn without_override(existing: &[u8], part_name: &str) -> Result<Vec<u8>> {
    rewrite_override(existing, part_name, None)
}

/// Content type of `part_name`: its `<Override>`, else the `<Default>` for its extension.
pub(crate) fn content_type_of(content_types: &[u8], part_name: &str) -> Result<Option<String>> {
    let xml = utf8(CONTENT_TYPES_PART, content_types)?;
    let doc = roxmltree::Document::parse(xml)?;
    let wanted = part_name_attr(part_name);
    let extension = part_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();

    let mut default = None;
    for node in doc.root_element().children().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "Override" if node.attribute("PartName").is_some_and(|p| p.eq_ignore_ascii_case(&wanted)) => {
                return Ok(node.attribute("ContentType").map(str::to_string));
            }
            "Default"
                if default.is_none()
                    && node
                        .attribute("Extension")
                        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension)) =>
            {
                default = node.attribute("ContentType").map(str::to_string);
            }
            _ => {}
        }
    }
    Ok(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;

    #[test]
    fn override_is_appended_once() {
        let once = with_override(CT.as_bytes(), "xl/charts/chart1.xml", CT_CHART).expect("add");
        let twice = with_override(&once, "/xl/charts/chart1.xml", CT_CHART).expect("re-add");
        assert_eq!(once, twice);
        assert_eq!(
            content_type_of(&twice, "xl/charts/chart1.xml").expect("lookup").as_deref(),
            Some(CT_CHART)
        );
        assert_eq!(
            content_type_of(&twice, "xl/workbook.xml").expect("lookup").as_deref(),
            Some(CT_WORKBOOK)
        );
    }

    #[test]
    fn unknown_parts_fall_back_to_extension_default() {
        assert_eq!(
            content_type_of(CT.as_bytes(), "docProps/app.xml").expect("lookup").as_deref(),
            Some(CT_XML)
        );
        assert_eq!(content_type_of(CT.as_bytes(), "xl/media/a.png").expect("lookup"), None);
    }

    #[test]
    fn override_can_be_removed() {
        let added = with_override(CT.as_bytes(), "xl/drawings/drawing1.xml", CT_DRAWING).expect("add");
        let removed = without_override(&added, "xl/drawings/drawing1.xml").expect("remove");
        assert_eq!(String::from_utf8(removed).expect("utf8"), CT);
    }

    #[test]
    fn self_closing_types_root_is_expanded() {
        let xml = br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;
        let updated = with_override(xml, "xl/charts/chart1.xml", CT_CHART).expect("add");
        assert_eq!(
            String::from_utf8(updated).expect("utf8"),
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Override PartName="/xl/charts/chart1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawingml.chart+xml"/></Types>"#
        );
    }
}
