//! Series of a chart group, identified by their `c:idx`.

use std::ops::{Deref, DerefMut};

use xlchart_dom::{ElementPath, Ns, Step, XmlDocument, XmlElement, XmlNode};

use crate::cells::{CellRange, CellSource};
use crate::chart_type::{ChartFamily, ChartFamily as F, ChartType};
use crate::data_source::{self, DataSource, SlotKind};
use crate::enums::MarkerStyle;
use crate::error::ChartError;
use crate::error_bars::ErrorBars;
use crate::groups::{owning_family, owning_group_type, PLOT_AREA};
use crate::labels::DataLabels;
use crate::marker::Marker;
use crate::points::DataPoints;
use crate::property::{element, node_wrapper, path_key, val_element, BoolProp, Node, TextProp, UIntProp, ValProp};
use crate::trendlines::Trendlines;

node_wrapper! {
    /// The `c:ser` elements of one chart group.
    SeriesCollection
}

node_wrapper! {
    /// One `c:ser`.
    Series
}

const SER: Step = Step::c("ser");
const ORDER: UIntProp = ValProp::new("series order", &[Step::c("order")]);
const NAME_LITERAL: TextProp = ValProp::text("series name", &[Step::c("tx"), Step::c("v")]);
const NAME_REFERENCE: TextProp = ValProp::text("series name reference", &[Step::c("tx"), Step::c("strRef"), Step::c("f")]);
const NAME_CACHE: &[Step] = &[Step::c("tx"), Step::c("strRef"), Step::c("strCache")];
const SMOOTH: BoolProp = ValProp::new("smooth", &[Step::c("smooth")]);
const INVERT_IF_NEGATIVE: BoolProp = ValProp::new("invert if negative", &[Step::c("invertIfNegative")]);
const EXPLOSION: UIntProp = ValProp::new("explosion", &[Step::c("explosion")]).range(0.0, 400.0);
const BUBBLE_3D: BoolProp = ValProp::new("bubble 3D", &[Step::c("bubble3D")]);
const MARKER: &[Step] = &[Step::c("marker")];
const DATA_LABELS: &[Step] = &[Step::c("dLbls")];

const SLOTS: [&str; 5] = ["cat", "val", "xVal", "yVal", "bubbleSize"];

/// Largest `c:idx` and `c:order` over every series in the plot area.
fn max_identity(doc: &XmlDocument) -> (Option<u32>, Option<u32>) {
    let Some(plot_area) = doc.find(&ElementPath::from_steps(PLOT_AREA)) else {
        return (None, None);
    };
    let read = |ser: &XmlElement, local: &str| -> Option<u32> {
        ser.child(Ns::Chart, local)?.attr("val")?.trim().parse().ok()
    };
    plot_area
        .child_elements()
        .filter(|group| ChartFamily::from_element_name(&group.name.local).is_some())
        .flat_map(|group| group.child_elements().filter(|el| el.name.is(Ns::Chart, "ser")))
        .fold((None, None), |(idx, order), ser| {
            (idx.max(read(ser, "idx")), order.max(read(ser, "order")))
        })
}

fn next_after(max: Option<u32>) -> u32 {
    max.map_or(0, |m| m + 1)
}

fn values_slot(family: Option<ChartFamily>) -> &'static str {
    match family {
        Some(f) if f.uses_xy_values() => "yVal",
        _ => "val",
    }
}

fn categories_slot(family: Option<ChartFamily>) -> &'static str {
    match family {
        Some(f) if f.uses_xy_values() => "xVal",
        _ => "cat",
    }
}

impl<D: Deref<Target = XmlDocument>> SeriesCollection<D> {
    /// Series indices in document order.
    pub fn indices(&self) -> Vec<u32> {
        self.node.keys(SER, "idx")
    }

    pub fn len(&self) -> usize {
        self.indices().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: u32) -> Option<Series<&XmlDocument>> {
        let series = Series::from_node(self.node.child(&[SER.keyed("idx", idx)]));
        series.exists().then_some(series)
    }

    pub fn iter(&self) -> impl Iterator<Item = Series<&XmlDocument>> + '_ {
        self.indices()
            .into_iter()
            .map(|idx| Series::from_node(self.node.child(&[SER.keyed("idx", idx)])))
    }
}

impl<D: DerefMut<Target = XmlDocument>> SeriesCollection<D> {
    pub fn get_mut(&mut self, idx: u32) -> Option<Series<&mut XmlDocument>> {
        let node = self.node.child_mut(&[SER.keyed("idx", idx)]);
        node.exists().then(|| Series::from_node(node))
    }

    /// Appends a series plotting `values` against optional `categories` (x values for scatter
    /// and bubble groups). `idx` and `order` continue after the largest in the whole chart.
    pub fn add(
        &mut self,
        values: DataSource,
        categories: Option<DataSource>,
    ) -> Result<Series<&mut XmlDocument>, ChartError> {
        if !self.node.exists() {
            return Err(ChartError::Detached(self.path().to_string()));
        }
        let chart_type = owning_group_type(self.node.doc(), self.node.path());
        let (max_idx, max_order) = max_identity(self.node.doc());
        let idx = next_after(max_idx);
        let order = next_after(max_order);

        let ser = element(Ns::Chart, "ser")
            .with_child(val_element("idx", idx.to_string()))
            .with_child(val_element("order", order.to_string()));
        self.node.insert(ser)?;

        log::debug!("added series idx={idx} order={order} to {}", self.node.path());
        let path = self.node.path().child(SER.keyed("idx", idx));
        let mut series = Series::from_node(Node::new(self.node.doc_mut(), path));
        if let Some(chart_type) = chart_type {
            series.apply_skeleton(chart_type)?;
        }
        series.set_values(values.clone())?;
        if let Some(categories) = categories {
            series.set_categories(Some(categories))?;
        }
        if chart_type.is_some_and(|t| t.family() == F::Bubble) {
            series.set_bubble_size(Some(values))?;
        }
        Ok(series)
    }

    pub fn remove(&mut self, idx: u32) -> bool {
        self.node.remove_at(&[SER.keyed("idx", idx)]).is_some()
    }
}

impl<D: Deref<Target = XmlDocument>> Series<D> {
    pub fn idx(&self) -> Option<u32> {
        path_key(self.path())
    }

    pub fn order(&self) -> Option<u32> {
        self.node.get(&ORDER)
    }

    fn family(&self) -> Option<ChartFamily> {
        owning_family(self.path())
    }

    /// Literal name, or the cached text of a referenced name.
    pub fn name(&self) -> Option<String> {
        if let Some(name) = self.node.get(&NAME_LITERAL) {
            return Some(name);
        }
        let cache = self.node.doc().find(&self.node.at(NAME_CACHE))?;
        data_source::read_cache_points(cache).into_iter().flatten().next()
    }

    pub fn name_reference(&self) -> Option<String> {
        self.node.get(&NAME_REFERENCE)
    }

    fn slot(&self, slot: &str) -> Option<DataSource> {
        let el = self.element()?.child(Ns::Chart, slot)?;
        data_source::read_slot(el)
    }

    fn slot_cache(&self, slot: &str) -> Vec<Option<String>> {
        self.element()
            .and_then(|el| el.child(Ns::Chart, slot))
            .map(data_source::read_cache)
            .unwrap_or_default()
    }

    /// `c:val`, or `c:yVal` for scatter and bubble series.
    pub fn values(&self) -> Option<DataSource> {
        self.slot(values_slot(self.family()))
    }

    /// `c:cat`, or `c:xVal` for scatter and bubble series.
    pub fn categories(&self) -> Option<DataSource> {
        self.slot(categories_slot(self.family()))
    }

    pub fn x_values(&self) -> Option<DataSource> {
        self.slot("xVal")
    }

    pub fn y_values(&self) -> Option<DataSource> {
        self.slot("yVal")
    }

    pub fn bubble_size(&self) -> Option<DataSource> {
        self.slot("bubbleSize")
    }

    /// Cached values of the values reference, as last saved.
    pub fn cached_values(&self) -> Vec<Option<String>> {
        self.slot_cache(values_slot(self.family()))
    }

    pub fn cached_categories(&self) -> Vec<Option<String>> {
        self.slot_cache(categories_slot(self.family()))
    }

    pub fn smooth(&self) -> bool {
        self.node.get(&SMOOTH).unwrap_or(false)
    }

    pub fn invert_if_negative(&self) -> bool {
        self.node.get(&INVERT_IF_NEGATIVE).unwrap_or(false)
    }

    pub fn explosion(&self) -> u32 {
        self.node.get(&EXPLOSION).unwrap_or(0)
    }

    pub fn bubble_3d(&self) -> bool {
        self.node.get(&BUBBLE_3D).unwrap_or(false)
    }

    pub fn marker(&self) -> Marker<&XmlDocument> {
        Marker::from_node(self.node.child(MARKER))
    }

    pub fn data_labels(&self) -> DataLabels<&XmlDocument> {
        DataLabels::from_node(self.node.child(DATA_LABELS))
    }

    pub fn points(&self) -> DataPoints<&XmlDocument> {
        DataPoints::from_node(self.node.view())
    }

    pub fn trendlines(&self) -> Trendlines<&XmlDocument> {
        Trendlines::from_node(self.node.view())
    }

    pub fn error_bars(&self) -> ErrorBars<&XmlDocument> {
        ErrorBars::from_node(self.node.view())
    }

    fn require(&self, feature: &'static str, families: &[ChartFamily]) -> Result<(), ChartError> {
        match self.family() {
            Some(family) if families.contains(&family) => Ok(()),
            None => Ok(()),
            Some(_) => match owning_group_type(self.node.doc(), self.path()) {
                Some(chart_type) => Err(ChartError::Unsupported { feature, chart_type }),
                None => Err(ChartError::Detached(self.path().to_string())),
            },
        }
    }
}

impl<D: DerefMut<Target = XmlDocument>> Series<D> {
    /// Family defaults for a new series.
    fn apply_skeleton(&mut self, chart_type: ChartType) -> Result<(), ChartError> {
        use ChartType::*;
        match chart_type.family() {
            F::Bar | F::Bar3D => self.node.set(&INVERT_IF_NEGATIVE, false)?,
            F::Line | F::Stock | F::Radar if !chart_type.shows_markers() => {
                self.marker_mut().set_style(MarkerStyle::None)?;
            }
            F::Scatter => {
                match chart_type {
                    XYScatter => {
                        let ln = element(Ns::Drawing, "ln")
                            .with_attr("w", "19050")
                            .with_child(element(Ns::Drawing, "noFill"));
                        self.node.put(element(Ns::Chart, "spPr").with_child(ln))?;
                    }
                    XYScatterLinesNoMarkers | XYScatterSmoothNoMarkers => {
                        self.marker_mut().set_style(MarkerStyle::None)?;
                    }
                    _ => {}
                }
            }
            F::Bubble => self.node.set(&BUBBLE_3D, chart_type == Bubble3DEffect)?,
            F::Pie | F::Pie3D | F::Doughnut if chart_type.is_exploded() => self.node.set(&EXPLOSION, 25)?,
            _ => {}
        }
        match chart_type.family() {
            F::Line | F::Scatter => {
                let smooth = matches!(chart_type, XYScatterSmooth | XYScatterSmoothNoMarkers);
                self.node.set(&SMOOTH, smooth)?;
            }
            _ => {}
        }
        Ok(())
    }

    pub fn set_order(&mut self, order: u32) -> Result<(), ChartError> {
        self.node.set(&ORDER, order)
    }

    /// Literal name; replaces a name reference.
    pub fn set_name(&mut self, name: &str) -> Result<(), ChartError> {
        let tx = element(Ns::Chart, "tx").with_child(element(Ns::Chart, "v").with_text(name));
        self.node.put(tx)
    }

    /// Links the name to a cell; replaces a literal name.
    pub fn set_name_reference(&mut self, formula: &str) -> Result<(), ChartError> {
        let reference = element(Ns::Chart, "strRef").with_child(element(Ns::Chart, "f").with_text(formula));
        self.node.put(element(Ns::Chart, "tx").with_child(reference))
    }

    pub fn clear_name(&mut self) -> bool {
        self.node.remove_at(&[Step::c("tx")]).is_some()
    }

    fn set_slot(&mut self, slot: &str, kind: SlotKind, source: Option<DataSource>) -> Result<(), ChartError> {
        match source {
            Some(source) => self.node.put(data_source::slot_element(slot, kind, &source)),
            None => {
                let path = self.path().clone();
                if let Some(el) = self.node.doc_mut().find_mut(&path) {
                    el.children.retain(|child| match child {
                        XmlNode::Element(el) => el.name.local != slot,
                        XmlNode::Text(_) => true,
                    });
                }
                Ok(())
            }
        }
    }

    pub fn set_values(&mut self, values: DataSource) -> Result<(), ChartError> {
        let slot = values_slot(self.family());
        self.set_slot(slot, SlotKind::Numeric, Some(values))
    }

    pub fn set_categories(&mut self, categories: Option<DataSource>) -> Result<(), ChartError> {
        let slot = categories_slot(self.family());
        self.set_slot(slot, SlotKind::Category, categories)
    }

    pub fn set_x_values(&mut self, values: Option<DataSource>) -> Result<(), ChartError> {
        self.require("x values", &[F::Scatter, F::Bubble])?;
        self.set_slot("xVal", SlotKind::Category, values)
    }

    pub fn set_y_values(&mut self, values: DataSource) -> Result<(), ChartError> {
        self.require("y values", &[F::Scatter, F::Bubble])?;
        self.set_slot("yVal", SlotKind::Numeric, Some(values))
    }

    pub fn set_bubble_size(&mut self, sizes: Option<DataSource>) -> Result<(), ChartError> {
        self.require("bubble sizes", &[F::Bubble])?;
        self.set_slot("bubbleSize", SlotKind::Numeric, sizes)
    }

    pub fn set_smooth(&mut self, smooth: bool) -> Result<(), ChartError> {
        self.require("smoothing", &[F::Line, F::Scatter])?;
        self.node.set(&SMOOTH, smooth)
    }

    pub fn set_invert_if_negative(&mut self, invert: bool) -> Result<(), ChartError> {
        self.require("invert if negative", &[F::Bar, F::Bar3D, F::Bubble])?;
        self.node.set(&INVERT_IF_NEGATIVE, invert)
    }

    pub fn set_explosion(&mut self, explosion: u32) -> Result<(), ChartError> {
        self.require("explosion", &[F::Pie, F::Pie3D, F::Doughnut, F::OfPie])?;
        self.node.set(&EXPLOSION, explosion)
    }

    pub fn set_bubble_3d(&mut self, bubble_3d: bool) -> Result<(), ChartError> {
        self.require("3D bubbles", &[F::Bubble])?;
        self.node.set(&BUBBLE_3D, bubble_3d)
    }

    pub fn marker_mut(&mut self) -> Marker<&mut XmlDocument> {
        Marker::from_node(self.node.child_mut(MARKER))
    }

    pub fn data_labels_mut(&mut self) -> DataLabels<&mut XmlDocument> {
        DataLabels::from_node(self.node.child_mut(DATA_LABELS))
    }

    pub fn points_mut(&mut self) -> DataPoints<&mut XmlDocument> {
        DataPoints::from_node(self.node.view_mut())
    }

    pub fn trendlines_mut(&mut self) -> Trendlines<&mut XmlDocument> {
        Trendlines::from_node(self.node.view_mut())
    }

    pub fn error_bars_mut(&mut self) -> ErrorBars<&mut XmlDocument> {
        ErrorBars::from_node(self.node.view_mut())
    }

    /// Rebuilds the cached values of every referenced slot and of a referenced name from
    /// `cells`. Returns the number of caches written.
    pub fn refresh_cache(&mut self, cells: &dyn CellSource) -> Result<usize, ChartError> {
        let name_formula = self.name_reference();
        let path = self.path().clone();
        let Some(ser) = self.node.doc_mut().find_mut(&path) else {
            return Err(ChartError::Detached(path.to_string()));
        };
        let mut refreshed = 0;
        for slot in ser.child_elements_mut() {
            if SLOTS.contains(&slot.name.local.as_str()) && data_source::refresh_slot(slot, cells)? {
                refreshed += 1;
            }
        }

        if let Some(formula) = name_formula {
            let range = CellRange::parse(&formula)?;
            let values = cells.range_values(&range);
            let text = data_source::first_text(&values).unwrap_or_default();
            let cache = data_source::string_cache(std::iter::once((0, text)), 1);
            let reference_path = self.node.at(&NAME_CACHE[..2]);
            self.node.doc_mut().put_element(&reference_path, cache)?;
            refreshed += 1;
        }
        Ok(refreshed)
    }
}
