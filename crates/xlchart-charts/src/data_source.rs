//! Series data: cell references with their caches, or inline literals.
//!
//! A slot (`c:val`, `c:cat`, `c:xVal`, ...) holds exactly one source element. Writing a source
//! rebuilds the whole slot, so switching between a reference and a literal never leaves the
//! stale sibling or an outdated cache behind.

use serde::{Deserialize, Serialize};
use xlchart_dom::{Ns, XmlElement, XmlNode};

use crate::cells::{CellRange, CellSource, CellValue};
use crate::error::ChartError;
use crate::property::{element, val_element};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "data")]
pub enum DataSource {
    /// Worksheet reference such as `Sheet1!$B$2:$B$6`.
    Reference(String),
    Numbers(Vec<f64>),
    Strings(Vec<String>),
}

impl DataSource {
    pub fn reference(formula: impl Into<String>) -> Self {
        DataSource::Reference(formula.into())
    }

    pub fn as_reference(&self) -> Option<&str> {
        match self {
            DataSource::Reference(f) => Some(f),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        !matches!(self, DataSource::Reference(_))
    }
}

impl From<Vec<f64>> for DataSource {
    fn from(values: Vec<f64>) -> Self {
        DataSource::Numbers(values)
    }
}

impl From<Vec<String>> for DataSource {
    fn from(values: Vec<String>) -> Self {
        DataSource::Strings(values)
    }
}

impl From<&str> for DataSource {
    fn from(formula: &str) -> Self {
        DataSource::Reference(formula.to_string())
    }
}

/// Which reference element a slot uses for cell references.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotKind {
    /// `c:val`, `c:yVal`, `c:bubbleSize`: always numeric.
    Numeric,
    /// `c:cat`, `c:xVal`: text references.
    Category,
}

const SOURCE_ELEMENTS: [&str; 5] = ["numRef", "strRef", "multiLvlStrRef", "numLit", "strLit"];

fn format_number(value: f64) -> String {
    value.to_string()
}

fn points(values: impl Iterator<Item = (usize, String)>) -> Vec<XmlElement> {
    values
        .map(|(idx, v)| {
            element(Ns::Chart, "pt")
                .with_attr("idx", idx.to_string())
                .with_child(element(Ns::Chart, "v").with_text(v))
        })
        .collect()
}

/// NaN and infinities have no `xsd:double` spelling Excel accepts; they are left out as gaps.
fn number_data(local: &str, count: usize, values: impl Iterator<Item = (usize, f64)>) -> XmlElement {
    let mut data = element(Ns::Chart, local)
        .with_child(element(Ns::Chart, "formatCode").with_text("General"))
        .with_child(val_element("ptCount", count.to_string()));
    let finite = values.filter(|&(idx, v)| {
        if !v.is_finite() {
            log::warn!("point {idx} is {v}; writing a gap");
        }
        v.is_finite()
    });
    for pt in points(finite.map(|(i, v)| (i, format_number(v)))) {
        data = data.with_child(pt);
    }
    data
}

fn string_data(local: &str, count: usize, values: impl Iterator<Item = (usize, String)>) -> XmlElement {
    let mut data = element(Ns::Chart, local).with_child(val_element("ptCount", count.to_string()));
    for pt in points(values) {
        data = data.with_child(pt);
    }
    data
}

/// Builds `<c:{slot}>` holding `source`.
pub(crate) fn slot_element(slot: &str, kind: SlotKind, source: &DataSource) -> XmlElement {
    let inner = match source {
        DataSource::Reference(formula) => {
            let local = match kind {
                SlotKind::Numeric => "numRef",
                SlotKind::Category => "strRef",
            };
            element(Ns::Chart, local).with_child(element(Ns::Chart, "f").with_text(formula.as_str()))
        }
        DataSource::Numbers(values) => number_data("numLit", values.len(), values.iter().copied().enumerate()),
        DataSource::Strings(values) => string_data("strLit", values.len(), values.iter().cloned().enumerate()),
    };
    element(Ns::Chart, slot).with_child(inner)
}

fn pt_values(data: &XmlElement) -> Vec<(usize, &str)> {
    data.child_elements()
        .filter(|pt| pt.name.is(Ns::Chart, "pt"))
        .filter_map(|pt| {
            let idx = pt.attr("idx")?.trim().parse().ok()?;
            Some((idx, pt.child(Ns::Chart, "v")?.text().unwrap_or("")))
        })
        .collect()
}

/// Excel's worksheet row count. No series can reference more points than this.
const MAX_POINT_COUNT: usize = 1 << 20;

fn point_count(data: &XmlElement) -> usize {
    let declared = data
        .child(Ns::Chart, "ptCount")
        .and_then(|c| c.attr("val"))
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0);
    match usize::try_from(declared) {
        Ok(count) if count <= MAX_POINT_COUNT => count,
        _ => {
            log::warn!("ptCount {declared} exceeds {MAX_POINT_COUNT}; truncating");
            MAX_POINT_COUNT
        }
    }
}

/// Reads the source held by a slot element.
pub(crate) fn read_slot(slot: &XmlElement) -> Option<DataSource> {
    let inner = slot
        .child_elements()
        .find(|el| el.name.ns.as_deref() == Some(Ns::Chart.uri()) && SOURCE_ELEMENTS.contains(&el.name.local.as_str()))?;
    match inner.name.local.as_str() {
        "numLit" => {
            let mut values = vec![0.0; point_count(inner)];
            for (idx, v) in pt_values(inner) {
                let parsed = v.trim().parse().unwrap_or_else(|_| {
                    log::warn!("non-numeric literal point `{v}`");
                    0.0
                });
                if let Some(slot) = values.get_mut(idx) {
                    *slot = parsed;
                }
            }
            Some(DataSource::Numbers(values))
        }
        "strLit" => {
            let mut values = vec![String::new(); point_count(inner)];
            for (idx, v) in pt_values(inner) {
                if let Some(slot) = values.get_mut(idx) {
                    *slot = v.to_string();
                }
            }
            Some(DataSource::Strings(values))
        }
        _ => Some(DataSource::Reference(
            inner.child(Ns::Chart, "f")?.text().unwrap_or_default().to_string(),
        )),
    }
}

/// Cached point values of a referenced slot, indexed by point; gaps are `None`.
pub(crate) fn read_cache(slot: &XmlElement) -> Vec<Option<String>> {
    slot.child_elements()
        .flat_map(|reference| reference.child_elements())
        .find(|el| matches!(el.name.local.as_str(), "numCache" | "strCache"))
        .map(read_cache_points)
        .unwrap_or_default()
}

/// Points of a `c:numCache` / `c:strCache` element.
pub(crate) fn read_cache_points(cache: &XmlElement) -> Vec<Option<String>> {
    let mut values = vec![None; point_count(cache)];
    for (idx, v) in pt_values(cache) {
        if let Some(slot) = values.get_mut(idx) {
            *slot = Some(v.to_string());
        }
    }
    values
}

pub(crate) fn string_cache(values: impl Iterator<Item = (usize, String)>, count: usize) -> XmlElement {
    string_data("strCache", count, values)
}

/// Rebuilds the cache of a referenced slot from `cells`. Literal slots are left alone.
/// Returns whether a cache was written.
pub(crate) fn refresh_slot(slot: &mut XmlElement, cells: &dyn CellSource) -> Result<bool, ChartError> {
    let Some(reference) = slot
        .child_elements_mut()
        .find(|el| matches!(el.name.local.as_str(), "numRef" | "strRef"))
    else {
        return Ok(false);
    };
    let Some(formula) = reference.child(Ns::Chart, "f").and_then(|f| f.text()).map(str::to_string) else {
        return Ok(false);
    };
    let range = CellRange::parse(&formula)?;
    let values = cells.range_values(&range);
    let numeric = reference.name.local == "numRef";

    let cache = if numeric {
        number_data(
            "numCache",
            values.len(),
            values.iter().enumerate().filter_map(|(i, v)| Some((i, v.as_number()?))),
        )
    } else {
        string_data(
            "strCache",
            values.len(),
            values.iter().enumerate().filter_map(|(i, v)| Some((i, v.to_cache_text()?))),
        )
    };
    let cache_name = cache.name.local.clone();
    reference.children.retain(|node| match node {
        XmlNode::Element(el) => el.name.local != cache_name,
        XmlNode::Text(_) => false,
    });
    // `f` is always first; the cache follows it.
    let at = reference
        .children
        .iter()
        .position(|node| matches!(node, XmlNode::Element(el) if el.name.local == "f"))
        .map_or(0, |i| i + 1);
    reference.children.insert(at, XmlNode::Element(cache));
    log::debug!("refreshed {} cached points for {formula}", values.len());
    Ok(true)
}

/// Text of a series name cell.
pub(crate) fn first_text(values: &[CellValue]) -> Option<String> {
    values.first().and_then(CellValue::to_cache_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::InMemoryCells;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_round_trip_keeps_gaps_as_defaults() {
        let slot = slot_element("val", SlotKind::Numeric, &DataSource::Numbers(vec![1.5, -2.0, 0.0]));
        assert_eq!(read_slot(&slot), Some(DataSource::Numbers(vec![1.5, -2.0, 0.0])));
    }

    #[test]
    fn category_references_use_string_refs() {
        let slot = slot_element("cat", SlotKind::Category, &DataSource::reference("Sheet1!$A$2:$A$4"));
        let inner = slot.child_elements().next().expect("inner");
        assert_eq!(inner.name.local, "strRef");
        assert_eq!(read_slot(&slot), Some(DataSource::reference("Sheet1!$A$2:$A$4")));
    }

    #[test]
    fn refresh_writes_cache_after_formula() {
        let mut cells = InMemoryCells::new("Sheet1");
        cells
            .set_column("Sheet1", "B2", [CellValue::Number(3.0), CellValue::Empty, CellValue::Number(5.0)])
            .expect("cells");
        let mut slot = slot_element("val", SlotKind::Numeric, &DataSource::reference("Sheet1!$B$2:$B$4"));
        assert!(refresh_slot(&mut slot, &cells).expect("refresh"));
        assert_eq!(
            read_cache(&slot),
            vec![Some("3".to_string()), None, Some("5".to_string())]
        );
        let reference = slot.child_elements().next().expect("numRef");
        let names: Vec<_> = reference.child_elements().map(|el| el.name.local.as_str()).collect();
        assert_eq!(names, ["f", "numCache"]);
    }

    #[test]
    fn non_finite_literals_become_gaps() {
        let slot = slot_element(
            "val",
            SlotKind::Numeric,
            &DataSource::Numbers(vec![1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY]),
        );
        let lit = slot.child_elements().next().expect("numLit");
        let written: Vec<_> = pt_values(lit).into_iter().map(|(i, v)| (i, v.to_string())).collect();
        assert_eq!(written, vec![(0, "1".to_string())]);
        assert_eq!(point_count(lit), 4);
        assert_eq!(read_slot(&slot), Some(DataSource::Numbers(vec![1.0, 0.0, 0.0, 0.0])));
    }

    #[test]
    fn refreshed_cache_skips_non_finite_cells() {
        let mut cells = InMemoryCells::new("Sheet1");
        cells
            .set_column("Sheet1", "A1", [CellValue::Number(f64::NAN), CellValue::Number(2.0)])
            .expect("cells");
        let mut slot = slot_element("val", SlotKind::Numeric, &DataSource::reference("Sheet1!$A$1:$A$2"));
        assert!(refresh_slot(&mut slot, &cells).expect("refresh"));
        assert_eq!(read_cache(&slot), vec![None, Some("2".to_string())]);
    }

    #[test]
    fn oversized_point_counts_are_capped() {
        let xml = r#"<c:val><c:numLit><c:ptCount val="18446744073709551615"/><c:pt idx="1"><c:v>4</c:v></c:pt></c:numLit></c:val>"#;
        let slot = XmlElement::parse_fragment(xml).expect("fragment").remove(0);
        let Some(DataSource::Numbers(values)) = read_slot(&slot) else {
            panic!("expected a numeric literal");
        };
        assert_eq!(values.len(), MAX_POINT_COUNT);
        assert_eq!(values[1], 4.0);

        let cache = XmlElement::parse_fragment(
            r#"<c:numCache><c:ptCount val="99999999999"/></c:numCache>"#,
        )
        .expect("fragment")
        .remove(0);
        assert_eq!(read_cache_points(&cache).len(), MAX_POINT_COUNT);
    }
}
