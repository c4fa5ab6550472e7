//! Initial XML for new charts.
//!
//! Templates reference their axes through `{ax0}`..`{ax3}` placeholders; [`fill_axis_ids`]
//! substitutes ids allocated against the document the template ends up in.

use quick_xml::escape::escape;
use xlchart_dom::{Ns, XmlDocument};

use crate::chart_type::{ChartFamily, ChartType};
use crate::enums::{AxisPosition, Crosses, CrossBetween, LegendPosition, XmlEnum};

/// First id handed out when a document has no axes yet.
pub const FIRST_AXIS_ID: u32 = 100_000_001;

const PLACEHOLDERS: [&str; 4] = ["{ax0}", "{ax1}", "{ax2}", "{ax3}"];

/// Options for [`crate::ChartDocument::new_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewChartOptions {
    /// Built-in chart style (1-48); `None` omits `c:style`.
    pub style: Option<u32>,
    pub rounded_corners: bool,
    pub date_1904: bool,
    pub lang: String,
    /// `None` creates the chart without a legend.
    pub legend: Option<LegendPosition>,
}

impl Default for NewChartOptions {
    fn default() -> Self {
        Self {
            style: Some(2),
            rounded_corners: false,
            date_1904: false,
            lang: "en-US".to_string(),
            legend: Some(LegendPosition::Right),
        }
    }
}

/// Kind of axis element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisKind {
    Category,
    Value,
    Date,
    Series,
}

impl AxisKind {
    pub const ALL: [AxisKind; 4] = [AxisKind::Category, AxisKind::Value, AxisKind::Date, AxisKind::Series];

    pub const fn element_name(self) -> &'static str {
        match self {
            AxisKind::Category => "catAx",
            AxisKind::Value => "valAx",
            AxisKind::Date => "dateAx",
            AxisKind::Series => "serAx",
        }
    }

    pub fn from_element_name(name: &str) -> Option<AxisKind> {
        AxisKind::ALL.into_iter().find(|k| k.element_name() == name)
    }
}

/// Layout of one axis in a template.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AxisSpec<'a> {
    pub kind: AxisKind,
    pub id: &'a str,
    pub cross: &'a str,
    pub position: AxisPosition,
    pub deleted: bool,
    pub crosses: Crosses,
    pub gridlines: bool,
    pub cross_between: CrossBetween,
}

impl<'a> AxisSpec<'a> {
    pub fn new(kind: AxisKind, id: &'a str, cross: &'a str, position: AxisPosition) -> Self {
        Self {
            kind,
            id,
            cross,
            position,
            deleted: false,
            crosses: Crosses::AutoZero,
            gridlines: false,
            cross_between: CrossBetween::Between,
        }
    }
}

pub(crate) fn axis_xml(spec: &AxisSpec<'_>) -> String {
    let el = spec.kind.element_name();
    let mut xml = format!(
        r#"<c:{el}><c:axId val="{id}"/><c:scaling><c:orientation val="minMax"/></c:scaling><c:delete val="{deleted}"/><c:axPos val="{pos}"/>"#,
        id = spec.id,
        deleted = u8::from(spec.deleted),
        pos = spec.position.as_xml(),
    );
    if spec.gridlines {
        xml.push_str("<c:majorGridlines/>");
    }
    let number_format = if spec.kind == AxisKind::Date { "m/d/yyyy" } else { "General" };
    xml.push_str(&format!(
        r#"<c:numFmt formatCode="{number_format}" sourceLinked="1"/><c:majorTickMark val="out"/><c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{cross}"/><c:crosses val="{crosses}"/>"#,
        cross = spec.cross,
        crosses = spec.crosses.as_xml(),
    ));
    match spec.kind {
        AxisKind::Category => xml.push_str(
            r#"<c:auto val="1"/><c:lblAlgn val="ctr"/><c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/>"#,
        ),
        AxisKind::Value => xml.push_str(&format!(
            r#"<c:crossBetween val="{}"/>"#,
            spec.cross_between.as_xml()
        )),
        AxisKind::Date => xml.push_str(
            r#"<c:auto val="1"/><c:lblOffset val="100"/><c:baseTimeUnit val="days"/>"#,
        ),
        AxisKind::Series => {}
    }
    xml.push_str(&format!("</c:{el}>"));
    xml
}

/// Axes for a group using placeholders `{axN}` starting at `first`.
pub(crate) fn axes_xml(chart_type: ChartType, first: usize, secondary: bool) -> String {
    let family = chart_type.family();
    let count = chart_type.axis_count();
    if count == 0 {
        return String::new();
    }
    let ids: Vec<&str> = PLACEHOLDERS[first..first + count].to_vec();
    let horizontal = chart_type
        .bar_direction()
        .is_some_and(|d| d == crate::enums::BarDirection::Bar);

    let (x_pos, y_pos) = match (horizontal, secondary) {
        (false, false) => (AxisPosition::Bottom, AxisPosition::Left),
        (false, true) => (AxisPosition::Bottom, AxisPosition::Right),
        (true, false) => (AxisPosition::Left, AxisPosition::Bottom),
        (true, true) => (AxisPosition::Left, AxisPosition::Top),
    };

    let mut x = if family.uses_xy_values() {
        let mut spec = AxisSpec::new(AxisKind::Value, ids[0], ids[1], x_pos);
        spec.cross_between = CrossBetween::MidCategory;
        spec
    } else {
        AxisSpec::new(AxisKind::Category, ids[0], ids[1], x_pos)
    };
    let mut y = AxisSpec::new(AxisKind::Value, ids[1], ids[0], y_pos);
    y.gridlines = !secondary;
    if family.uses_xy_values() {
        y.cross_between = CrossBetween::MidCategory;
    }
    if secondary {
        x.deleted = true;
        y.crosses = Crosses::Max;
    }

    let mut xml = axis_xml(&x);
    xml.push_str(&axis_xml(&y));
    if count == 3 {
        let z = AxisSpec::new(AxisKind::Series, ids[2], ids[1], AxisPosition::Bottom);
        xml.push_str(&axis_xml(&z));
    }
    xml
}

/// The `c:*Chart` element for a subtype, referencing axes `{ax<first>}`...
pub(crate) fn group_xml(chart_type: ChartType, first: usize) -> String {
    let family = chart_type.family();
    let el = family.element_name();
    let mut body = String::new();
    let push_val = |body: &mut String, local: &str, val: &str| {
        body.push_str(&format!(r#"<c:{local} val="{val}"/>"#));
    };

    match family {
        ChartFamily::Bar | ChartFamily::Bar3D => {
            let direction = chart_type.bar_direction().unwrap_or_default();
            let grouping = chart_type.bar_grouping().unwrap_or_default();
            push_val(&mut body, "barDir", direction.as_xml());
            push_val(&mut body, "grouping", grouping.as_xml());
            push_val(&mut body, "varyColors", "0");
            push_val(&mut body, "gapWidth", "150");
            if family == ChartFamily::Bar {
                if chart_type.is_stacked() || chart_type.is_percent_stacked() {
                    push_val(&mut body, "overlap", "100");
                }
            } else {
                push_val(&mut body, "shape", chart_type.bar_shape().unwrap_or_default().as_xml());
            }
        }
        ChartFamily::Line => {
            push_val(&mut body, "grouping", chart_type.grouping().unwrap_or_default().as_xml());
            push_val(&mut body, "varyColors", "0");
            push_val(&mut body, "marker", if chart_type.shows_markers() { "1" } else { "0" });
        }
        ChartFamily::Line3D | ChartFamily::Area | ChartFamily::Area3D => {
            push_val(&mut body, "grouping", chart_type.grouping().unwrap_or_default().as_xml());
            push_val(&mut body, "varyColors", "0");
        }
        ChartFamily::Pie | ChartFamily::Doughnut => {
            push_val(&mut body, "varyColors", "1");
            push_val(&mut body, "firstSliceAng", "0");
            if family == ChartFamily::Doughnut {
                push_val(&mut body, "holeSize", "50");
            }
        }
        ChartFamily::Pie3D => push_val(&mut body, "varyColors", "1"),
        ChartFamily::OfPie => {
            let of_pie = if chart_type == ChartType::BarOfPie { "bar" } else { "pie" };
            push_val(&mut body, "ofPieType", of_pie);
            push_val(&mut body, "varyColors", "1");
            push_val(&mut body, "gapWidth", "150");
            push_val(&mut body, "secondPieSize", "75");
            body.push_str("<c:serLines/>");
        }
        ChartFamily::Scatter => {
            push_val(&mut body, "scatterStyle", chart_type.scatter_style().unwrap_or_default().as_xml());
            push_val(&mut body, "varyColors", "0");
        }
        ChartFamily::Radar => {
            push_val(&mut body, "radarStyle", chart_type.radar_style().unwrap_or_default().as_xml());
            push_val(&mut body, "varyColors", "0");
        }
        ChartFamily::Bubble => {
            push_val(&mut body, "varyColors", "0");
            push_val(&mut body, "bubble3D", if chart_type == ChartType::Bubble3DEffect { "1" } else { "0" });
            push_val(&mut body, "bubbleScale", "100");
            push_val(&mut body, "showNegBubbles", "0");
        }
        ChartFamily::Surface | ChartFamily::Surface3D => {
            let wireframe = matches!(chart_type, ChartType::SurfaceWireframe | ChartType::SurfaceTopViewWireframe);
            push_val(&mut body, "wireframe", if wireframe { "1" } else { "0" });
        }
        ChartFamily::Stock => {
            body.push_str("<c:hiLowLines/>");
            if matches!(chart_type, ChartType::StockOHLC | ChartType::StockVOHLC) {
                body.push_str(r#"<c:upDownBars><c:gapWidth val="150"/><c:upBars/><c:downBars/></c:upDownBars>"#);
            }
        }
    }

    for placeholder in PLACEHOLDERS[first..first + chart_type.axis_count()].iter().copied() {
        push_val(&mut body, "axId", placeholder);
    }
    format!("<c:{el}>{body}</c:{el}>")
}

pub(crate) fn view_3d_xml(chart_type: ChartType) -> &'static str {
    match chart_type.family() {
        ChartFamily::Pie3D => {
            r#"<c:view3D><c:rotX val="30"/><c:rotY val="0"/><c:rAngAx val="0"/></c:view3D>"#
        }
        ChartFamily::Surface3D => {
            r#"<c:view3D><c:rotX val="15"/><c:rotY val="20"/><c:rAngAx val="0"/><c:perspective val="30"/></c:view3D>"#
        }
        _ => r#"<c:view3D><c:rotX val="15"/><c:rotY val="20"/><c:rAngAx val="1"/></c:view3D>"#,
    }
}

/// Plot area content: groups then axes. Stock charts with volume get a column group on the
/// primary axes and the stock group on secondary axes.
fn plot_area_xml(chart_type: ChartType) -> String {
    let mut xml = String::from("<c:layout/>");
    if matches!(chart_type, ChartType::StockVHLC | ChartType::StockVOHLC) {
        xml.push_str(&group_xml(ChartType::ColumnClustered, 0));
        xml.push_str(&group_xml(chart_type, 2));
        xml.push_str(&axes_xml(ChartType::ColumnClustered, 0, false));
        xml.push_str(&axes_xml(chart_type, 2, true));
    } else {
        xml.push_str(&group_xml(chart_type, 0));
        xml.push_str(&axes_xml(chart_type, 0, false));
    }
    xml
}

/// Number of placeholders a new document of this subtype uses.
pub(crate) fn placeholder_count(chart_type: ChartType) -> usize {
    match chart_type {
        ChartType::StockVHLC | ChartType::StockVOHLC => 4,
        _ => chart_type.axis_count(),
    }
}

/// Complete `c:chartSpace` template with axis placeholders.
pub fn chart_space_xml(chart_type: ChartType, options: &NewChartOptions) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(&format!(
        r#"<c:chartSpace xmlns:c="{}" xmlns:a="{}" xmlns:r="{}">"#,
        Ns::Chart.uri(),
        Ns::Drawing.uri(),
        Ns::Relationships.uri()
    ));
    xml.push_str(&format!(
        r#"<c:date1904 val="{}"/><c:lang val="{}"/><c:roundedCorners val="{}"/>"#,
        u8::from(options.date_1904),
        escape(options.lang.as_str()),
        u8::from(options.rounded_corners)
    ));
    if let Some(style) = options.style {
        xml.push_str(&format!(r#"<c:style val="{style}"/>"#));
    }
    xml.push_str(r#"<c:chart><c:autoTitleDeleted val="0"/>"#);
    if chart_type.is_3d() {
        xml.push_str(view_3d_xml(chart_type));
    }
    xml.push_str("<c:plotArea>");
    xml.push_str(&plot_area_xml(chart_type));
    xml.push_str("</c:plotArea>");
    if let Some(position) = options.legend {
        xml.push_str(&format!(
            r#"<c:legend><c:legendPos val="{}"/><c:overlay val="0"/></c:legend>"#,
            position.as_xml()
        ));
    }
    xml.push_str(r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart>"#);
    xml.push_str(
        r#"<c:printSettings><c:headerFooter/><c:pageMargins b="0.75" l="0.7" r="0.7" t="0.75" header="0.3" footer="0.3"/><c:pageSetup/></c:printSettings>"#,
    );
    xml.push_str("</c:chartSpace>");
    xml
}

/// Replaces `{axN}` placeholders with `ids[N]`.
pub fn fill_axis_ids(template: &str, ids: &[u32]) -> String {
    let mut xml = template.to_string();
    for (placeholder, id) in PLACEHOLDERS.iter().zip(ids) {
        xml = xml.replace(placeholder, &id.to_string());
    }
    xml
}

/// Hands out axis ids that do not collide with the ones already in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisIdAllocator {
    next: u32,
}

impl AxisIdAllocator {
    pub fn new(first: u32) -> Self {
        Self { next: first }
    }

    /// Starts one past the largest `c:axId` referenced anywhere in the plot area.
    pub fn for_document(doc: &XmlDocument) -> Self {
        let Some(plot_area) = doc
            .root
            .child(Ns::Chart, "chart")
            .and_then(|chart| chart.child(Ns::Chart, "plotArea"))
        else {
            return Self::new(FIRST_AXIS_ID);
        };
        let max = plot_area
            .child_elements()
            .flat_map(|el| el.child_elements())
            .filter(|el| el.name.is(Ns::Chart, "axId"))
            .filter_map(|el| el.attr("val")?.trim().parse::<u32>().ok())
            .max();
        Self::new(max.map_or(FIRST_AXIS_ID, |max| max.saturating_add(1)))
    }

    pub fn allocate(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    pub fn take(&mut self, n: usize) -> Vec<u32> {
        (0..n).map(|_| self.allocate()).collect()
    }
}

/// Template for `chart_type` with its axis placeholders filled from `axis_ids`.
pub fn chart_xml(chart_type: ChartType, options: &NewChartOptions, axis_ids: &[u32]) -> String {
    fill_axis_ids(&chart_space_xml(chart_type, options), axis_ids)
}
