//! Sheet lookup through `xl/workbook.xml` and its relationships.

use xlchart_dom::ns::NS_RELATIONSHIPS;

use crate::error::{utf8, PackageError, Result};
use crate::package::ChartPackage;
use crate::relationships::REL_TYPE_OFFICE_DOCUMENT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub rel_id: String,
}

impl ChartPackage {
    /// The workbook part named by the package's `officeDocument` relationship.
    pub fn workbook_part(&self) -> Result<String> {
        let rels = self.relationships("")?;
        if let Some(rel) = rels
            .iter()
            .find(|rel| rel.type_uri == REL_TYPE_OFFICE_DOCUMENT && !rel.is_external())
        {
            return Ok(self.resolve_target("", &rel.target));
        }
        if self.has_part("xl/workbook.xml") {
            log::warn!("package has no officeDocument relationship; assuming xl/workbook.xml");
            return Ok("xl/workbook.xml".to_string());
        }
        Err(PackageError::MissingPart("xl/workbook.xml".into()))
    }

    pub fn sheets(&self) -> Result<Vec<SheetEntry>> {
        let workbook = self.workbook_part()?;
        let bytes = self
            .part(&workbook)
            .ok_or_else(|| PackageError::MissingPart(workbook.clone()))?;
        let doc = roxmltree::Document::parse(utf8(&workbook, bytes)?)?;

        Ok(doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "sheet")
            .filter_map(|n| {
                let name = n.attribute("name")?;
                let rel_id = n
                    .attribute((NS_RELATIONSHIPS, "id"))
                    .or_else(|| n.attribute("id"))?;
                Some(SheetEntry {
                    name: name.to_string(),
                    rel_id: rel_id.to_string(),
                })
            })
            .collect())
    }

    /// Worksheet part for a sheet name. Excel compares sheet names case-insensitively.
    pub fn worksheet_part(&self, sheet_name: &str) -> Result<String> {
        let sheet = self
            .sheets()?
            .into_iter()
            .find(|sheet| sheet.name.eq_ignore_ascii_case(sheet_name))
            .ok_or_else(|| PackageError::MissingSheet(sheet_name.to_string()))?;
        let workbook = self.workbook_part()?;
        let part = self
            .relationship_target(&workbook, &sheet.rel_id)?
            .ok_or_else(|| PackageError::Invalid(format!("sheet `{sheet_name}` is external")))?;
        if !self.has_part(&part) {
            return Err(PackageError::MissingPart(part));
        }
        Ok(part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sheet_names_resolve_to_worksheet_parts() {
        let pkg = ChartPackage::new_workbook(&["Summary", "Raw Data"]).expect("workbook");
        assert_eq!(pkg.workbook_part().expect("workbook"), "xl/workbook.xml");
        assert_eq!(
            pkg.worksheet_part("raw data").expect("sheet"),
            "xl/worksheets/sheet2.xml"
        );
        assert!(matches!(
            pkg.worksheet_part("Missing"),
            Err(PackageError::MissingSheet(name)) if name == "Missing"
        ));
    }
}
