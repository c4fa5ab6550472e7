//! Chart groups: the `c:*Chart` elements of the plot area.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use xlchart_dom::{ElementPath, Ns, Step, XmlDocument, XmlElement};

use crate::chart_type::{ChartFamily, ChartFamily as F, ChartType};
use crate::enums::{
    BarDirection, BarGrouping, BarShape, Grouping, OfPieType, RadarStyle, ScatterStyle, SizeRepresents, SplitType,
};
use crate::error::ChartError;
use crate::labels::DataLabels;
use crate::property::{node_wrapper, BoolProp, EnumProp, IntProp, Node, UIntProp, ValProp};
use crate::series::SeriesCollection;
use crate::template::{self, AxisIdAllocator, AxisKind};

pub(crate) const PLOT_AREA: &[Step] = &[Step::c("chart"), Step::c("plotArea")];

/// Family of the group a path points into (`c:chart/c:plotArea/c:barChart[0]/...`).
pub(crate) fn owning_family(path: &ElementPath) -> Option<ChartFamily> {
    let steps = path.steps();
    if steps.len() < 3 || &steps[..2] != PLOT_AREA {
        return None;
    }
    ChartFamily::from_element_name(steps[2].local)
}

/// Classifies the group a path points into.
pub(crate) fn owning_group_type(doc: &XmlDocument, path: &ElementPath) -> Option<ChartType> {
    owning_family(path)?;
    let group = doc.find(&ElementPath::from_steps(&path.steps()[..3]))?;
    ChartType::classify(group)
}

fn axis_ids_of(group: &XmlElement) -> Vec<u32> {
    group
        .child_elements()
        .filter(|el| el.name.is(Ns::Chart, "axId"))
        .filter_map(|el| el.attr("val")?.trim().parse().ok())
        .collect()
}

fn parse_elements(xml: &str) -> Result<Vec<XmlElement>, ChartError> {
    Ok(XmlElement::parse_fragment(xml)?)
}

node_wrapper! {
    /// The chart groups of a plot area, in document order.
    ChartGroups
}

node_wrapper! {
    /// One `c:*Chart` element.
    ChartGroup
}

const BAR_DIRECTION: EnumProp<BarDirection> = ValProp::new("bar direction", &[Step::c("barDir")]);
const BAR_GROUPING: EnumProp<BarGrouping> = ValProp::new("bar grouping", &[Step::c("grouping")]);
const GROUPING: EnumProp<Grouping> = ValProp::new("grouping", &[Step::c("grouping")]);
const SHAPE: EnumProp<BarShape> = ValProp::new("bar shape", &[Step::c("shape")]);
const GAP_WIDTH: UIntProp = ValProp::new("gap width", &[Step::c("gapWidth")]).range(0.0, 500.0);
const OVERLAP: IntProp = ValProp::new("overlap", &[Step::c("overlap")]).range(-100.0, 100.0);
const GAP_DEPTH: UIntProp = ValProp::new("gap depth", &[Step::c("gapDepth")]).range(0.0, 500.0);
const VARY_COLORS: BoolProp = ValProp::new("vary colors", &[Step::c("varyColors")]);
const FIRST_SLICE_ANGLE: UIntProp = ValProp::new("first slice angle", &[Step::c("firstSliceAng")]).range(0.0, 360.0);
const HOLE_SIZE: UIntProp = ValProp::new("hole size", &[Step::c("holeSize")]).range(10.0, 90.0);
const BUBBLE_SCALE: UIntProp = ValProp::new("bubble scale", &[Step::c("bubbleScale")]).range(0.0, 300.0);
const SHOW_NEGATIVE_BUBBLES: BoolProp = ValProp::new("show negative bubbles", &[Step::c("showNegBubbles")]);
const SIZE_REPRESENTS: EnumProp<SizeRepresents> = ValProp::new("size represents", &[Step::c("sizeRepresents")]);
const BUBBLE_3D: BoolProp = ValProp::new("bubble 3D", &[Step::c("bubble3D")]);
const SCATTER_STYLE: EnumProp<ScatterStyle> = ValProp::new("scatter style", &[Step::c("scatterStyle")]);
const RADAR_STYLE: EnumProp<RadarStyle> = ValProp::new("radar style", &[Step::c("radarStyle")]);
const WIREFRAME: BoolProp = ValProp::new("wireframe", &[Step::c("wireframe")]);
const OF_PIE_TYPE: EnumProp<OfPieType> = ValProp::new("of-pie type", &[Step::c("ofPieType")]);
const SPLIT_TYPE: EnumProp<SplitType> = ValProp::new("split type", &[Step::c("splitType")]);
const SECOND_PIE_SIZE: UIntProp = ValProp::new("second pie size", &[Step::c("secondPieSize")]).range(5.0, 200.0);
const MARKERS: BoolProp = ValProp::new("show markers", &[Step::c("marker")]);
const SMOOTH: BoolProp = ValProp::new("smooth", &[Step::c("smooth")]);
const DATA_LABELS: &[Step] = &[Step::c("dLbls")];

impl<D: Deref<Target = XmlDocument>> ChartGroups<D> {
    fn paths(&self) -> Vec<(ChartFamily, ElementPath)> {
        let Some(plot_area) = self.node.element() else {
            return Vec::new();
        };
        let mut seen: HashMap<ChartFamily, usize> = HashMap::new();
        plot_area
            .child_elements()
            .filter(|el| el.name.ns.as_deref() == Some(Ns::Chart.uri()))
            .filter_map(|el| ChartFamily::from_element_name(&el.name.local))
            .map(|family| {
                let n = seen.entry(family).or_insert(0);
                let path = self.node.path().child(Step::c(family.element_name()).nth(*n));
                *n += 1;
                (family, path)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.paths().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<ChartGroup<&XmlDocument>> {
        let (_, path) = self.paths().into_iter().nth(index)?;
        Some(ChartGroup::from_node(Node::new(self.node.doc(), path)))
    }

    pub fn iter(&self) -> impl Iterator<Item = ChartGroup<&XmlDocument>> + '_ {
        self.paths()
            .into_iter()
            .map(|(_, path)| ChartGroup::from_node(Node::new(self.node.doc(), path)))
    }

    /// First group of the given element kind.
    pub fn find(&self, family: ChartFamily) -> Option<ChartGroup<&XmlDocument>> {
        let (_, path) = self.paths().into_iter().find(|(f, _)| *f == family)?;
        Some(ChartGroup::from_node(Node::new(self.node.doc(), path)))
    }

    pub fn chart_types(&self) -> Vec<ChartType> {
        self.iter().filter_map(|g| g.chart_type()).collect()
    }
}

impl<D: DerefMut<Target = XmlDocument>> ChartGroups<D> {
    pub fn get_mut(&mut self, index: usize) -> Option<ChartGroup<&mut XmlDocument>> {
        let (_, path) = self.paths().into_iter().nth(index)?;
        Some(ChartGroup::from_node(Node::new(self.node.doc_mut(), path)))
    }

    /// Adds a group after the existing ones. Axes of a compatible group are shared; otherwise new
    /// axes are created (on the secondary side when the plot area already has axes).
    ///
    /// 3D groups cannot be combined with anything else.
    pub fn add(&mut self, chart_type: ChartType) -> Result<ChartGroup<&mut XmlDocument>, ChartError> {
        let existing = self.chart_types();
        if let Some(three_d) = existing.iter().copied().find(|t| t.is_3d()) {
            return Err(ChartError::Unsupported {
                feature: "combination with another chart group",
                chart_type: three_d,
            });
        }
        if chart_type.is_3d() && !existing.is_empty() {
            return Err(ChartError::Unsupported {
                feature: "combination with another chart group",
                chart_type,
            });
        }

        let needed = chart_type.axis_count();
        let xy = chart_type.family().uses_xy_values();
        let shared = self.iter().find_map(|group| {
            let other = group.chart_type()?;
            let ids = group.axis_ids();
            (needed > 0 && other.axis_count() == needed && other.family().uses_xy_values() == xy && ids.len() == needed)
                .then_some(ids)
        });
        let has_axes = self
            .node
            .element()
            .is_some_and(|plot| plot.child_elements().any(|el| AxisKind::from_element_name(&el.name.local).is_some()));

        let (ids, new_axes) = match shared {
            Some(ids) => (ids, None),
            None => {
                let ids = AxisIdAllocator::for_document(self.node.doc()).take(needed);
                let axes = template::fill_axis_ids(&template::axes_xml(chart_type, 0, has_axes), &ids);
                (ids, Some(axes))
            }
        };

        let group_xml = template::fill_axis_ids(&template::group_xml(chart_type, 0), &ids);
        let group = parse_elements(&group_xml)?
            .into_iter()
            .next()
            .ok_or_else(|| ChartError::InvalidOperation(format!("no template for {chart_type:?}")))?;
        let axes = match new_axes {
            Some(xml) => parse_elements(&xml)?,
            None => Vec::new(),
        };

        if chart_type.is_3d() {
            let view_path = ElementPath::from_steps(&[Step::c("chart"), Step::c("view3D")]);
            if !self.node.doc().exists(&view_path) {
                let view = parse_elements(template::view_3d_xml(chart_type))?;
                for el in view {
                    self.node.doc_mut().insert_element(&ElementPath::from_steps(&[Step::c("chart")]), el)?;
                }
            }
        }

        let family = chart_type.family();
        self.node.insert(group)?;
        for axis in axes {
            self.node.insert(axis)?;
        }
        log::debug!("added {chart_type:?} group on axes {ids:?}");

        let nth = self
            .paths()
            .iter()
            .filter(|(f, _)| *f == family)
            .count()
            .saturating_sub(1);
        let path = self.node.path().child(Step::c(family.element_name()).nth(nth));
        Ok(ChartGroup::from_node(Node::new(self.node.doc_mut(), path)))
    }

    /// Removes a group. Its axes stay; call `ChartDocument::remove_unused_axes` to drop them.
    pub fn remove(&mut self, index: usize) -> Option<XmlElement> {
        let (_, path) = self.paths().into_iter().nth(index)?;
        self.node.doc_mut().delete(&path)
    }
}

impl<D: Deref<Target = XmlDocument>> ChartGroup<D> {
    pub fn family(&self) -> Option<ChartFamily> {
        owning_family(self.path())
    }

    /// Current subtype, derived from the group's content.
    pub fn chart_type(&self) -> Option<ChartType> {
        ChartType::classify(self.element()?)
    }

    pub fn axis_ids(&self) -> Vec<u32> {
        self.element().map(axis_ids_of).unwrap_or_default()
    }

    /// Bar direction; columns when absent.
    pub fn direction(&self) -> BarDirection {
        self.node.get(&BAR_DIRECTION).unwrap_or_default()
    }

    pub fn bar_grouping(&self) -> BarGrouping {
        self.node.get(&BAR_GROUPING).unwrap_or_default()
    }

    /// Grouping of line and area groups.
    pub fn grouping(&self) -> Grouping {
        self.node.get(&GROUPING).unwrap_or_default()
    }

    /// Bar shape; plain boxes when absent, and always boxes for 2D bars.
    pub fn shape(&self) -> BarShape {
        self.node.get(&SHAPE).unwrap_or_default()
    }

    pub fn gap_width(&self) -> u32 {
        self.node.get(&GAP_WIDTH).unwrap_or(150)
    }

    pub fn overlap(&self) -> i32 {
        self.node.get(&OVERLAP).unwrap_or(0)
    }

    pub fn gap_depth(&self) -> u32 {
        self.node.get(&GAP_DEPTH).unwrap_or(150)
    }

    pub fn vary_colors(&self) -> bool {
        self.node.get(&VARY_COLORS).unwrap_or(false)
    }

    pub fn first_slice_angle(&self) -> u32 {
        self.node.get(&FIRST_SLICE_ANGLE).unwrap_or(0)
    }

    pub fn hole_size(&self) -> u32 {
        self.node.get(&HOLE_SIZE).unwrap_or(10)
    }

    pub fn bubble_scale(&self) -> u32 {
        self.node.get(&BUBBLE_SCALE).unwrap_or(100)
    }

    pub fn show_negative_bubbles(&self) -> bool {
        self.node.get(&SHOW_NEGATIVE_BUBBLES).unwrap_or(false)
    }

    pub fn size_represents(&self) -> SizeRepresents {
        self.node.get(&SIZE_REPRESENTS).unwrap_or_default()
    }

    pub fn bubble_3d(&self) -> bool {
        self.node.get(&BUBBLE_3D).unwrap_or(false)
    }

    pub fn scatter_style(&self) -> ScatterStyle {
        self.node.get(&SCATTER_STYLE).unwrap_or_default()
    }

    pub fn radar_style(&self) -> RadarStyle {
        self.node.get(&RADAR_STYLE).unwrap_or_default()
    }

    pub fn wireframe(&self) -> bool {
        self.node.get(&WIREFRAME).unwrap_or(false)
    }

    pub fn of_pie_type(&self) -> OfPieType {
        self.node.get(&OF_PIE_TYPE).unwrap_or_default()
    }

    pub fn split_type(&self) -> SplitType {
        self.node.get(&SPLIT_TYPE).unwrap_or_default()
    }

    pub fn second_pie_size(&self) -> u32 {
        self.node.get(&SECOND_PIE_SIZE).unwrap_or(75)
    }

    pub fn has_markers(&self) -> bool {
        self.node.get(&MARKERS).unwrap_or(false)
    }

    pub fn smooth(&self) -> bool {
        self.node.get(&SMOOTH).unwrap_or(false)
    }

    pub fn data_labels(&self) -> DataLabels<&XmlDocument> {
        DataLabels::from_node(self.node.child(DATA_LABELS))
    }

    pub fn series(&self) -> SeriesCollection<&XmlDocument> {
        SeriesCollection::from_node(self.node.view())
    }

    fn require(&self, feature: &'static str, families: &[ChartFamily]) -> Result<(), ChartError> {
        match self.family() {
            Some(family) if families.contains(&family) => Ok(()),
            _ => match self.chart_type() {
                Some(chart_type) => Err(ChartError::Unsupported { feature, chart_type }),
                None => Err(ChartError::Detached(self.path().to_string())),
            },
        }
    }
}


impl<D: DerefMut<Target = XmlDocument>> ChartGroup<D> {
    pub fn set_direction(&mut self, direction: BarDirection) -> Result<(), ChartError> {
        self.require("bar direction", &[F::Bar, F::Bar3D])?;
        self.node.set(&BAR_DIRECTION, direction)
    }

    /// Stacked bars overlap fully; switching back to clustered clears the overlap.
    pub fn set_bar_grouping(&mut self, grouping: BarGrouping) -> Result<(), ChartError> {
        self.require("bar grouping", &[F::Bar, F::Bar3D])?;
        self.node.set(&BAR_GROUPING, grouping)?;
        if self.family() == Some(F::Bar) {
            match grouping {
                BarGrouping::Stacked | BarGrouping::PercentStacked => self.node.set(&OVERLAP, 100)?,
                _ => {
                    self.node.clear(&OVERLAP);
                }
            }
        }
        Ok(())
    }

    pub fn set_grouping(&mut self, grouping: Grouping) -> Result<(), ChartError> {
        self.require("grouping", &[F::Line, F::Line3D, F::Area, F::Area3D])?;
        self.node.set(&GROUPING, grouping)
    }

    pub fn set_shape(&mut self, shape: BarShape) -> Result<(), ChartError> {
        self.require("bar shape", &[F::Bar3D])?;
        self.node.set(&SHAPE, shape)
    }

    pub fn set_gap_width(&mut self, gap_width: u32) -> Result<(), ChartError> {
        self.require("gap width", &[F::Bar, F::Bar3D, F::OfPie])?;
        self.node.set(&GAP_WIDTH, gap_width)
    }

    pub fn set_overlap(&mut self, overlap: i32) -> Result<(), ChartError> {
        self.require("overlap", &[F::Bar])?;
        self.node.set(&OVERLAP, overlap)
    }

    pub fn set_gap_depth(&mut self, gap_depth: u32) -> Result<(), ChartError> {
        self.require("gap depth", &[F::Bar3D, F::Line3D, F::Area3D])?;
        self.node.set(&GAP_DEPTH, gap_depth)
    }

    pub fn set_vary_colors(&mut self, vary: bool) -> Result<(), ChartError> {
        self.node.set(&VARY_COLORS, vary)
    }

    pub fn set_first_slice_angle(&mut self, degrees: u32) -> Result<(), ChartError> {
        self.require("first slice angle", &[F::Pie, F::Doughnut])?;
        self.node.set(&FIRST_SLICE_ANGLE, degrees)
    }

    pub fn set_hole_size(&mut self, percent: u32) -> Result<(), ChartError> {
        self.require("hole size", &[F::Doughnut])?;
        self.node.set(&HOLE_SIZE, percent)
    }

    pub fn set_bubble_scale(&mut self, percent: u32) -> Result<(), ChartError> {
        self.require("bubble scale", &[F::Bubble])?;
        self.node.set(&BUBBLE_SCALE, percent)
    }

    pub fn set_show_negative_bubbles(&mut self, show: bool) -> Result<(), ChartError> {
        self.require("negative bubbles", &[F::Bubble])?;
        self.node.set(&SHOW_NEGATIVE_BUBBLES, show)
    }

    pub fn set_size_represents(&mut self, represents: SizeRepresents) -> Result<(), ChartError> {
        self.require("bubble size", &[F::Bubble])?;
        self.node.set(&SIZE_REPRESENTS, represents)
    }

    pub fn set_bubble_3d(&mut self, bubble_3d: bool) -> Result<(), ChartError> {
        self.require("3D bubbles", &[F::Bubble])?;
        self.node.set(&BUBBLE_3D, bubble_3d)
    }

    pub fn set_scatter_style(&mut self, style: ScatterStyle) -> Result<(), ChartError> {
        self.require("scatter style", &[F::Scatter])?;
        self.node.set(&SCATTER_STYLE, style)
    }

    pub fn set_radar_style(&mut self, style: RadarStyle) -> Result<(), ChartError> {
        self.require("radar style", &[F::Radar])?;
        self.node.set(&RADAR_STYLE, style)
    }

    pub fn set_wireframe(&mut self, wireframe: bool) -> Result<(), ChartError> {
        self.require("wireframe", &[F::Surface, F::Surface3D])?;
        self.node.set(&WIREFRAME, wireframe)
    }

    pub fn set_of_pie_type(&mut self, of_pie: OfPieType) -> Result<(), ChartError> {
        self.require("of-pie type", &[F::OfPie])?;
        self.node.set(&OF_PIE_TYPE, of_pie)
    }

    pub fn set_split_type(&mut self, split: SplitType) -> Result<(), ChartError> {
        self.require("split type", &[F::OfPie])?;
        self.node.set(&SPLIT_TYPE, split)
    }

    pub fn set_second_pie_size(&mut self, percent: u32) -> Result<(), ChartError> {
        self.require("second pie size", &[F::OfPie])?;
        self.node.set(&SECOND_PIE_SIZE, percent)
    }

    pub fn set_has_markers(&mut self, markers: bool) -> Result<(), ChartError> {
        self.require("markers", &[F::Line])?;
        self.node.set(&MARKERS, markers)
    }

    pub fn set_smooth(&mut self, smooth: bool) -> Result<(), ChartError> {
        self.require("smoothing", &[F::Line])?;
        self.node.set(&SMOOTH, smooth)
    }

    pub fn data_labels_mut(&mut self) -> DataLabels<&mut XmlDocument> {
        DataLabels::from_node(self.node.child_mut(DATA_LABELS))
    }

    pub fn series_mut(&mut self) -> SeriesCollection<&mut XmlDocument> {
        SeriesCollection::from_node(self.node.view_mut())
    }
}
