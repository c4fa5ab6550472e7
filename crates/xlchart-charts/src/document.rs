//! The chart part as a whole: `c:chartSpace` and its chart-level settings.

use xlchart_dom::{ElementPath, Ns, Step, XmlDocument};

use crate::axes::Axes;
use crate::chart_type::{ChartFamily, ChartType};
use crate::enums::{AxisPosition, DisplayBlanksAs};
use crate::error::ChartError;
use crate::groups::{ChartGroups, PLOT_AREA};
use crate::legend::Legend;
use crate::property::{BoolProp, EnumProp, Node, TextProp, UIntProp, ValProp};
use crate::schema;
use crate::snapshot::ChartSummary;
use crate::template::{self, AxisIdAllocator, AxisKind, NewChartOptions, FIRST_AXIS_ID};
use crate::title::Title;
use crate::view3d::View3D;

const STYLE: UIntProp = ValProp::new("chart style", &[Step::c("style")]).range(1.0, 48.0);
const ROUNDED_CORNERS: BoolProp = ValProp::new("rounded corners", &[Step::c("roundedCorners")]);
const DATE_1904: BoolProp = ValProp::new("1904 date system", &[Step::c("date1904")]);
const LANGUAGE: TextProp = ValProp::new("language", &[Step::c("lang")]);
const AUTO_TITLE_DELETED: BoolProp =
    ValProp::new("auto title deleted", &[Step::c("chart"), Step::c("autoTitleDeleted")]);
const PLOT_VISIBLE_ONLY: BoolProp = ValProp::new("plot visible only", &[Step::c("chart"), Step::c("plotVisOnly")]);
const DISPLAY_BLANKS_AS: EnumProp<DisplayBlanksAs> =
    ValProp::new("display blanks as", &[Step::c("chart"), Step::c("dispBlanksAs")]);
const DATA_LABELS_OVER_MAX: BoolProp =
    ValProp::new("show data labels over max", &[Step::c("chart"), Step::c("showDLblsOverMax")]);

const TITLE: &[Step] = &[Step::c("chart"), Step::c("title")];
const LEGEND: &[Step] = &[Step::c("chart"), Step::c("legend")];
const VIEW_3D: &[Step] = &[Step::c("chart"), Step::c("view3D")];

/// An owned chart part.
///
/// All accessors hand out borrowed views; nothing is cached outside the XML tree, so the
/// document can be serialized at any point and reflects every edit made so far.
#[derive(Debug, Clone)]
pub struct ChartDocument {
    doc: XmlDocument,
}

impl ChartDocument {
    /// A new chart of the given subtype with default options.
    pub fn new(chart_type: ChartType) -> Result<Self, ChartError> {
        Self::new_with(chart_type, &NewChartOptions::default())
    }

    pub fn new_with(chart_type: ChartType, options: &NewChartOptions) -> Result<Self, ChartError> {
        let ids = AxisIdAllocator::new(FIRST_AXIS_ID).take(template::placeholder_count(chart_type));
        let xml = template::chart_xml(chart_type, options, &ids);
        let doc = XmlDocument::parse(xml.as_bytes())?.with_schema(schema::registry());
        log::debug!("created {chart_type:?} chart with axes {ids:?}");
        Ok(Self { doc })
    }

    /// Parses an existing chart part.
    pub fn parse(bytes: &[u8]) -> Result<Self, ChartError> {
        let doc = XmlDocument::parse(bytes)?.with_schema(schema::registry());
        Self::from_document(doc)
    }

    pub fn from_document(doc: XmlDocument) -> Result<Self, ChartError> {
        if !doc.root.name.is(Ns::Chart, "chartSpace") {
            return Err(ChartError::NotAChart(doc.root.name.local.clone()));
        }
        Ok(Self {
            doc: doc.with_schema(schema::registry()),
        })
    }

    pub fn xml(&self) -> &XmlDocument {
        &self.doc
    }

    pub fn xml_mut(&mut self) -> &mut XmlDocument {
        &mut self.doc
    }

    pub fn into_xml(self) -> XmlDocument {
        self.doc
    }

    pub fn to_xml_string(&self) -> String {
        self.doc.to_xml_string()
    }

    pub fn to_xml_bytes(&self) -> Vec<u8> {
        self.doc.to_xml_bytes()
    }

    fn root(&self) -> Node<&XmlDocument> {
        Node::new(&self.doc, ElementPath::root())
    }

    fn root_mut(&mut self) -> Node<&mut XmlDocument> {
        Node::new(&mut self.doc, ElementPath::root())
    }

    fn node_at(&self, steps: &[Step]) -> Node<&XmlDocument> {
        Node::new(&self.doc, ElementPath::from_steps(steps))
    }

    fn node_at_mut(&mut self, steps: &[Step]) -> Node<&mut XmlDocument> {
        Node::new(&mut self.doc, ElementPath::from_steps(steps))
    }

    pub fn style(&self) -> Option<u32> {
        self.root().get(&STYLE)
    }

    pub fn rounded_corners(&self) -> bool {
        self.root().get(&ROUNDED_CORNERS).unwrap_or(false)
    }

    pub fn date_1904(&self) -> bool {
        self.root().get(&DATE_1904).unwrap_or(false)
    }

    pub fn language(&self) -> Option<String> {
        self.root().get(&LANGUAGE)
    }

    pub fn auto_title_deleted(&self) -> bool {
        self.root().get(&AUTO_TITLE_DELETED).unwrap_or(false)
    }

    pub fn plot_visible_only(&self) -> bool {
        self.root().get(&PLOT_VISIBLE_ONLY).unwrap_or(true)
    }

    /// `zero` when the element is missing.
    pub fn display_blanks_as(&self) -> DisplayBlanksAs {
        self.root().get(&DISPLAY_BLANKS_AS).unwrap_or_default()
    }

    pub fn show_data_labels_over_max(&self) -> bool {
        self.root().get(&DATA_LABELS_OVER_MAX).unwrap_or(false)
    }

    pub fn set_style(&mut self, style: Option<u32>) -> Result<(), ChartError> {
        self.root_mut().set_opt(&STYLE, style)
    }

    pub fn set_rounded_corners(&mut self, rounded: bool) -> Result<(), ChartError> {
        self.root_mut().set(&ROUNDED_CORNERS, rounded)
    }

    pub fn set_date_1904(&mut self, date_1904: bool) -> Result<(), ChartError> {
        self.root_mut().set(&DATE_1904, date_1904)
    }

    pub fn set_language(&mut self, lang: &str) -> Result<(), ChartError> {
        self.root_mut().set(&LANGUAGE, lang.to_string())
    }

    pub fn set_auto_title_deleted(&mut self, deleted: bool) -> Result<(), ChartError> {
        self.root_mut().set(&AUTO_TITLE_DELETED, deleted)
    }

    pub fn set_plot_visible_only(&mut self, visible_only: bool) -> Result<(), ChartError> {
        self.root_mut().set(&PLOT_VISIBLE_ONLY, visible_only)
    }

    pub fn set_display_blanks_as(&mut self, blanks: DisplayBlanksAs) -> Result<(), ChartError> {
        self.root_mut().set(&DISPLAY_BLANKS_AS, blanks)
    }

    pub fn set_show_data_labels_over_max(&mut self, show: bool) -> Result<(), ChartError> {
        self.root_mut().set(&DATA_LABELS_OVER_MAX, show)
    }

    pub fn title(&self) -> Title<&XmlDocument> {
        Title::from_node(self.node_at(TITLE))
    }

    /// Writable title. [`ChartDocument::set_title`] also clears `autoTitleDeleted`.
    pub fn title_mut(&mut self) -> Title<&mut XmlDocument> {
        Title::from_node(self.node_at_mut(TITLE))
    }

    pub fn set_title(&mut self, text: &str) -> Result<(), ChartError> {
        self.title_mut().set_text(text)?;
        self.set_auto_title_deleted(false)
    }

    /// Drops the title and stops Excel from generating one from a single series name.
    pub fn remove_title(&mut self) -> Result<bool, ChartError> {
        let removed = self.root_mut().remove_at(TITLE).is_some();
        self.set_auto_title_deleted(true)?;
        Ok(removed)
    }

    pub fn legend(&self) -> Legend<&XmlDocument> {
        Legend::from_node(self.node_at(LEGEND))
    }

    pub fn legend_mut(&mut self) -> Legend<&mut XmlDocument> {
        Legend::from_node(self.node_at_mut(LEGEND))
    }

    pub fn remove_legend(&mut self) -> bool {
        self.root_mut().remove_at(LEGEND).is_some()
    }

    pub fn view_3d(&self) -> View3D<&XmlDocument> {
        View3D::from_node(self.node_at(VIEW_3D))
    }

    pub fn view_3d_mut(&mut self) -> View3D<&mut XmlDocument> {
        View3D::from_node(self.node_at_mut(VIEW_3D))
    }

    pub fn groups(&self) -> ChartGroups<&XmlDocument> {
        ChartGroups::from_node(self.node_at(PLOT_AREA))
    }

    pub fn groups_mut(&mut self) -> ChartGroups<&mut XmlDocument> {
        ChartGroups::from_node(self.node_at_mut(PLOT_AREA))
    }

    pub fn axes(&self) -> Axes<&XmlDocument> {
        Axes::from_node(self.node_at(PLOT_AREA))
    }

    pub fn axes_mut(&mut self) -> Axes<&mut XmlDocument> {
        Axes::from_node(self.node_at_mut(PLOT_AREA))
    }

    /// Subtype of the chart as Excel would report it: the first group's subtype, except that a
    /// stock group combined with a volume bar group reports the volume stock variant.
    pub fn chart_type(&self) -> Option<ChartType> {
        let groups = self.groups();
        let types = groups.chart_types();
        let stock = types.iter().copied().find(|t| t.family() == ChartFamily::Stock);
        let has_volume = types.iter().any(|t| t.family() == ChartFamily::Bar);
        match (stock, has_volume) {
            (Some(ChartType::StockHLC), true) => Some(ChartType::StockVHLC),
            (Some(ChartType::StockOHLC), true) => Some(ChartType::StockVOHLC),
            (Some(stock), _) => Some(stock),
            (None, _) => types.first().copied(),
        }
    }

    /// Subtype of the first group whose element is `element_name` (`barChart`, `c:pieChart`).
    pub fn chart_type_of(&self, element_name: &str) -> Option<ChartType> {
        let local = element_name.rsplit(':').next().unwrap_or(element_name);
        let family = ChartFamily::from_element_name(local)?;
        self.groups().find(family)?.chart_type()
    }

    /// Creates every axis a group references but the plot area lacks. Returns the new ids.
    pub fn reconcile_axes(&mut self) -> Result<Vec<u32>, ChartError> {
        let existing = self.axes().ids();
        let mut missing = Vec::new();
        for group in self.groups().iter() {
            let xy = group.family().is_some_and(ChartFamily::uses_xy_values);
            let ids = group.axis_ids();
            for (slot, id) in ids.iter().copied().enumerate() {
                if existing.contains(&id) || missing.iter().any(|(_, m, _, _)| *m == id) {
                    continue;
                }
                let (kind, position, cross) = match slot {
                    0 if xy => (AxisKind::Value, AxisPosition::Bottom, ids.get(1)),
                    0 => (AxisKind::Category, AxisPosition::Bottom, ids.get(1)),
                    1 => (AxisKind::Value, AxisPosition::Left, ids.first()),
                    _ => (AxisKind::Series, AxisPosition::Bottom, ids.get(1)),
                };
                missing.push((kind, id, cross.copied().unwrap_or(id), position));
            }
        }

        let mut axes = self.axes_mut();
        for (kind, id, cross, position) in &missing {
            log::debug!("reconciling missing {} {id}", kind.element_name());
            axes.insert_axis(*kind, *id, *cross, *position)?;
        }
        Ok(missing.into_iter().map(|(_, id, _, _)| id).collect())
    }

    /// Deletes axes no group plots on. Returns the removed ids.
    pub fn remove_unused_axes(&mut self) -> Result<Vec<u32>, ChartError> {
        let unused: Vec<u32> = {
            let axes = self.axes();
            axes.ids().into_iter().filter(|id| !axes.is_referenced(*id)).collect()
        };
        let mut axes = self.axes_mut();
        for id in &unused {
            axes.remove(*id)?;
        }
        Ok(unused)
    }

    /// Read-only snapshot of the chart structure.
    pub fn summary(&self) -> ChartSummary {
        ChartSummary::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_chart_carries_template_defaults() {
        let chart = ChartDocument::new(ChartType::LineMarkers).expect("new");
        assert_eq!(chart.style(), Some(2));
        assert!(!chart.rounded_corners());
        assert_eq!(chart.language().as_deref(), Some("en-US"));
        assert_eq!(chart.display_blanks_as(), DisplayBlanksAs::Gap);
        assert!(chart.plot_visible_only());
        assert_eq!(chart.chart_type(), Some(ChartType::LineMarkers));
        assert_eq!(chart.axes().ids(), vec![FIRST_AXIS_ID, FIRST_AXIS_ID + 1]);
    }

    #[test]
    fn parse_rejects_other_roots() {
        let err = ChartDocument::parse(
            br#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing"/>"#,
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::NotAChart(name) if name == "wsDr"));
    }

    #[test]
    fn style_is_range_checked() {
        let mut chart = ChartDocument::new(ChartType::Pie).expect("new");
        assert!(matches!(chart.set_style(Some(49)), Err(ChartError::OutOfRange { .. })));
        chart.set_style(None).expect("clear");
        assert_eq!(chart.style(), None);
    }

    #[test]
    fn title_removal_sets_auto_title_deleted() {
        let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
        chart.set_title("Revenue").expect("title");
        assert_eq!(chart.title().text().as_deref(), Some("Revenue"));
        assert!(!chart.auto_title_deleted());
        assert!(chart.remove_title().expect("remove"));
        assert!(!chart.title().exists());
        assert!(chart.auto_title_deleted());
    }

    #[test]
    fn volume_stock_is_reported_as_one_type() {
        let chart = ChartDocument::new(ChartType::StockVHLC).expect("new");
        assert_eq!(chart.groups().len(), 2);
        assert_eq!(chart.chart_type(), Some(ChartType::StockVHLC));
        assert_eq!(chart.axes().len(), 4);
    }

    #[test]
    fn missing_axes_are_reconciled() {
        let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
        let removed = chart.xml_mut().delete(&ElementPath::from_steps(&[
            Step::c("chart"),
            Step::c("plotArea"),
            Step::c("valAx"),
        ]));
        assert!(removed.is_some());
        assert_eq!(chart.reconcile_axes().expect("reconcile"), vec![FIRST_AXIS_ID + 1]);
        let axes = chart.axes();
        let axis = axes.get(FIRST_AXIS_ID + 1).expect("axis");
        assert_eq!(axis.kind(), Some(AxisKind::Value));
        assert_eq!(axis.cross_axis(), Some(FIRST_AXIS_ID));
        assert!(chart.reconcile_axes().expect("again").is_empty());
    }

    #[test]
    fn unused_axes_are_removed() {
        let mut chart = ChartDocument::new(ChartType::ColumnClustered).expect("new");
        let mut axes = chart.axes_mut();
        let id = axes.add(AxisKind::Date, AxisPosition::Top).expect("add").id().expect("id");
        assert_eq!(chart.remove_unused_axes().expect("remove"), vec![id]);
        assert_eq!(chart.axes().len(), 2);
    }
}
