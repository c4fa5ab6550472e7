//! Axes of the plot area, keyed by `c:axId`.

use std::ops::{Deref, DerefMut};

use xlchart_dom::{ElementPath, Ns, Step, XmlDocument, XmlElement};

use crate::enums::{
    AxisOrientation, AxisPosition, BuiltInUnit, CrossBetween, Crosses, TickLabelPosition, TickMark, TimeUnit,
};
use crate::error::ChartError;
use crate::property::{node_wrapper, path_key, BoolProp, EnumProp, FloatProp, Node, TextProp, UIntProp, ValProp};
use crate::template::{self, AxisIdAllocator, AxisKind, AxisSpec};
use crate::title::Title;

node_wrapper! {
    /// Every axis element of a plot area.
    Axes
}

node_wrapper! {
    /// One `c:catAx`, `c:valAx`, `c:dateAx` or `c:serAx`.
    Axis
}

const DELETED: BoolProp = ValProp::new("axis delete", &[Step::c("delete")]);
const POSITION: EnumProp<AxisPosition> = ValProp::new("axis position", &[Step::c("axPos")]);
const ORIENTATION: EnumProp<AxisOrientation> =
    ValProp::new("axis orientation", &[Step::c("scaling"), Step::c("orientation")]);
const MIN: FloatProp = ValProp::new("axis minimum", &[Step::c("scaling"), Step::c("min")]);
const MAX: FloatProp = ValProp::new("axis maximum", &[Step::c("scaling"), Step::c("max")]);
const LOG_BASE: FloatProp = ValProp::new("log base", &[Step::c("scaling"), Step::c("logBase")]).range(2.0, 1000.0);
const MAJOR_TICK_MARK: EnumProp<TickMark> = ValProp::new("major tick mark", &[Step::c("majorTickMark")]);
const MINOR_TICK_MARK: EnumProp<TickMark> = ValProp::new("minor tick mark", &[Step::c("minorTickMark")]);
const TICK_LABEL_POSITION: EnumProp<TickLabelPosition> =
    ValProp::new("tick label position", &[Step::c("tickLblPos")]);
const CROSS_AXIS: UIntProp = ValProp::new("crossing axis", &[Step::c("crossAx")]);
const CROSSES: EnumProp<Crosses> = ValProp::new("crosses", &[Step::c("crosses")]);
const CROSSES_AT: FloatProp = ValProp::new("crosses at", &[Step::c("crossesAt")]);
const CROSS_BETWEEN: EnumProp<CrossBetween> = ValProp::new("cross between", &[Step::c("crossBetween")]);
const MAJOR_UNIT: FloatProp = ValProp::new("major unit", &[Step::c("majorUnit")]).range(f64::MIN_POSITIVE, f64::MAX);
const MINOR_UNIT: FloatProp = ValProp::new("minor unit", &[Step::c("minorUnit")]).range(f64::MIN_POSITIVE, f64::MAX);
const FORMAT_CODE: TextProp = ValProp::attr("axis number format", &[Step::c("numFmt")], "formatCode");
const SOURCE_LINKED: BoolProp = ValProp::attr("source linked", &[Step::c("numFmt")], "sourceLinked");
const LABEL_OFFSET: UIntProp = ValProp::new("label offset", &[Step::c("lblOffset")]).range(0.0, 1000.0);
const TICK_LABEL_SKIP: UIntProp = ValProp::new("tick label skip", &[Step::c("tickLblSkip")]).range(1.0, f64::MAX);
const TICK_MARK_SKIP: UIntProp = ValProp::new("tick mark skip", &[Step::c("tickMarkSkip")]).range(1.0, f64::MAX);
const BASE_TIME_UNIT: EnumProp<TimeUnit> = ValProp::new("base time unit", &[Step::c("baseTimeUnit")]);
const DISPLAY_UNIT: EnumProp<BuiltInUnit> =
    ValProp::new("display units", &[Step::c("dispUnits"), Step::c("builtInUnit")]);
const MAJOR_GRIDLINES: &[Step] = &[Step::c("majorGridlines")];
const MINOR_GRIDLINES: &[Step] = &[Step::c("minorGridlines")];
const TITLE: &[Step] = &[Step::c("title")];

fn axis_id(el: &XmlElement) -> Option<u32> {
    el.child(Ns::Chart, "axId")?.attr("val")?.trim().parse().ok()
}

fn axis_step(kind: AxisKind, id: u32) -> Step {
    Step::c(kind.element_name()).keyed("axId", id)
}

impl<D: Deref<Target = XmlDocument>> Axes<D> {
    /// `(kind, id)` of every axis, in document order.
    pub fn entries(&self) -> Vec<(AxisKind, u32)> {
        let Some(plot_area) = self.node.element() else {
            return Vec::new();
        };
        plot_area
            .child_elements()
            .filter_map(|el| Some((AxisKind::from_element_name(&el.name.local)?, axis_id(el)?)))
            .collect()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.entries().into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn path_of(&self, id: u32) -> Option<ElementPath> {
        let (kind, _) = self.entries().into_iter().find(|(_, i)| *i == id)?;
        Some(self.node.path().child(axis_step(kind, id)))
    }

    pub fn get(&self, id: u32) -> Option<Axis<&XmlDocument>> {
        let path = self.path_of(id)?;
        Some(Axis::from_node(Node::new(self.node.doc(), path)))
    }

    pub fn iter(&self) -> impl Iterator<Item = Axis<&XmlDocument>> + '_ {
        self.entries()
            .into_iter()
            .map(|(kind, id)| Axis::from_node(Node::new(self.node.doc(), self.node.path().child(axis_step(kind, id)))))
    }

    /// Whether any chart group plots on axis `id`.
    pub fn is_referenced(&self, id: u32) -> bool {
        self.referencing_groups(id) > 0
    }

    fn referencing_groups(&self, id: u32) -> usize {
        let Some(plot_area) = self.node.element() else {
            return 0;
        };
        plot_area
            .child_elements()
            .filter(|el| AxisKind::from_element_name(&el.name.local).is_none())
            .filter(|group| {
                group
                    .child_elements()
                    .filter(|el| el.name.is(Ns::Chart, "axId"))
                    .any(|el| el.attr("val").and_then(|v| v.trim().parse().ok()) == Some(id))
            })
            .count()
    }
}

impl<D: DerefMut<Target = XmlDocument>> Axes<D> {
    pub fn get_mut(&mut self, id: u32) -> Option<Axis<&mut XmlDocument>> {
        let path = self.path_of(id)?;
        Some(Axis::from_node(Node::new(self.node.doc_mut(), path)))
    }

    /// Adds an axis with a fresh id, crossing the first existing axis of another kind (or the
    /// first axis at all).
    pub fn add(&mut self, kind: AxisKind, position: AxisPosition) -> Result<Axis<&mut XmlDocument>, ChartError> {
        let entries = self.entries();
        let id = AxisIdAllocator::for_document(self.node.doc()).allocate();
        let cross = entries
            .iter()
            .find(|(k, _)| *k != kind)
            .or_else(|| entries.first())
            .map_or(id, |(_, cross)| *cross);
        self.insert_axis(kind, id, cross, position)
    }

    pub(crate) fn insert_axis(
        &mut self,
        kind: AxisKind,
        id: u32,
        cross: u32,
        position: AxisPosition,
    ) -> Result<Axis<&mut XmlDocument>, ChartError> {
        let (id_text, cross_text) = (id.to_string(), cross.to_string());
        let mut spec = AxisSpec::new(kind, &id_text, &cross_text, position);
        if kind == AxisKind::Value {
            spec.gridlines = true;
        }
        let axis = XmlElement::parse_fragment(&template::axis_xml(&spec))?
            .into_iter()
            .next()
            .ok_or_else(|| ChartError::InvalidOperation(format!("no template for {kind:?} axis")))?;
        self.node.insert(axis)?;
        log::debug!("added {} {id} crossing {cross}", kind.element_name());
        let path = self.node.path().child(axis_step(kind, id));
        Ok(Axis::from_node(Node::new(self.node.doc_mut(), path)))
    }

    /// Removes an axis no group plots on.
    pub fn remove(&mut self, id: u32) -> Result<bool, ChartError> {
        if self.referencing_groups(id) > 0 {
            return Err(ChartError::InvalidOperation(format!(
                "axis {id} is still used by a chart group"
            )));
        }
        match self.path_of(id) {
            Some(path) => Ok(self.node.doc_mut().delete(&path).is_some()),
            None => Ok(false),
        }
    }
}

impl<D: Deref<Target = XmlDocument>> Axis<D> {
    pub fn id(&self) -> Option<u32> {
        path_key(self.path())
    }

    pub fn kind(&self) -> Option<AxisKind> {
        AxisKind::from_element_name(self.path().last()?.local)
    }

    pub fn deleted(&self) -> bool {
        self.node.get(&DELETED).unwrap_or(false)
    }

    pub fn position(&self) -> AxisPosition {
        self.node.get(&POSITION).unwrap_or_default()
    }

    pub fn orientation(&self) -> AxisOrientation {
        self.node.get(&ORIENTATION).unwrap_or_default()
    }

    pub fn min(&self) -> Option<f64> {
        self.node.get(&MIN)
    }

    pub fn max(&self) -> Option<f64> {
        self.node.get(&MAX)
    }

    pub fn log_base(&self) -> Option<f64> {
        self.node.get(&LOG_BASE)
    }

    /// `cross` when absent.
    pub fn major_tick_mark(&self) -> TickMark {
        self.node.get(&MAJOR_TICK_MARK).unwrap_or_default()
    }

    pub fn minor_tick_mark(&self) -> TickMark {
        self.node.get(&MINOR_TICK_MARK).unwrap_or_default()
    }

    pub fn tick_label_position(&self) -> TickLabelPosition {
        self.node.get(&TICK_LABEL_POSITION).unwrap_or_default()
    }

    pub fn cross_axis(&self) -> Option<u32> {
        self.node.get(&CROSS_AXIS)
    }

    /// `None` when the axis crosses at an explicit value.
    pub fn crosses(&self) -> Option<Crosses> {
        self.node.get(&CROSSES)
    }

    pub fn crosses_at(&self) -> Option<f64> {
        self.node.get(&CROSSES_AT)
    }

    pub fn cross_between(&self) -> CrossBetween {
        self.node.get(&CROSS_BETWEEN).unwrap_or_default()
    }

    pub fn major_unit(&self) -> Option<f64> {
        self.node.get(&MAJOR_UNIT)
    }

    pub fn minor_unit(&self) -> Option<f64> {
        self.node.get(&MINOR_UNIT)
    }

    pub fn number_format(&self) -> Option<String> {
        self.node.get(&FORMAT_CODE)
    }

    pub fn source_linked(&self) -> bool {
        self.node.get(&SOURCE_LINKED).unwrap_or(false)
    }

    pub fn major_gridlines(&self) -> bool {
        self.node.has(MAJOR_GRIDLINES)
    }

    pub fn minor_gridlines(&self) -> bool {
        self.node.has(MINOR_GRIDLINES)
    }

    pub fn label_offset(&self) -> u32 {
        self.node.get(&LABEL_OFFSET).unwrap_or(100)
    }

    pub fn tick_label_skip(&self) -> Option<u32> {
        self.node.get(&TICK_LABEL_SKIP)
    }

    pub fn tick_mark_skip(&self) -> Option<u32> {
        self.node.get(&TICK_MARK_SKIP)
    }

    pub fn base_time_unit(&self) -> Option<TimeUnit> {
        self.node.get(&BASE_TIME_UNIT)
    }

    pub fn display_units(&self) -> Option<BuiltInUnit> {
        self.node.get(&DISPLAY_UNIT)
    }

    pub fn title(&self) -> Title<&XmlDocument> {
        Title::from_node(self.node.child(TITLE))
    }

    fn require(&self, feature: &str, kinds: &[AxisKind]) -> Result<(), ChartError> {
        match self.kind() {
            Some(kind) if kinds.contains(&kind) => Ok(()),
            Some(kind) => Err(ChartError::InvalidOperation(format!(
                "{} has no {feature}",
                kind.element_name()
            ))),
            None => Err(ChartError::Detached(self.path().to_string())),
        }
    }
}

const SCALED: &[AxisKind] = &[AxisKind::Value, AxisKind::Date];
const LABELED: &[AxisKind] = &[AxisKind::Category, AxisKind::Date];
const SKIPPED: &[AxisKind] = &[AxisKind::Category, AxisKind::Series];

impl<D: DerefMut<Target = XmlDocument>> Axis<D> {
    pub fn set_deleted(&mut self, deleted: bool) -> Result<(), ChartError> {
        self.node.set(&DELETED, deleted)
    }

    pub fn set_position(&mut self, position: AxisPosition) -> Result<(), ChartError> {
        self.node.set(&POSITION, position)
    }

    pub fn set_orientation(&mut self, orientation: AxisOrientation) -> Result<(), ChartError> {
        self.node.set(&ORIENTATION, orientation)
    }

    pub fn set_min(&mut self, min: Option<f64>) -> Result<(), ChartError> {
        self.node.set_opt(&MIN, min)
    }

    pub fn set_max(&mut self, max: Option<f64>) -> Result<(), ChartError> {
        self.node.set_opt(&MAX, max)
    }

    /// Logarithmic scaling with the given base; `None` returns to linear.
    pub fn set_log_base(&mut self, base: Option<f64>) -> Result<(), ChartError> {
        self.node.set_opt(&LOG_BASE, base)
    }

    pub fn set_major_tick_mark(&mut self, mark: TickMark) -> Result<(), ChartError> {
        self.node.set(&MAJOR_TICK_MARK, mark)
    }

    pub fn set_minor_tick_mark(&mut self, mark: TickMark) -> Result<(), ChartError> {
        self.node.set(&MINOR_TICK_MARK, mark)
    }

    pub fn set_tick_label_position(&mut self, position: TickLabelPosition) -> Result<(), ChartError> {
        self.node.set(&TICK_LABEL_POSITION, position)
    }

    pub fn set_cross_axis(&mut self, id: u32) -> Result<(), ChartError> {
        self.node.set(&CROSS_AXIS, id)
    }

    /// Replaces an explicit crossing value.
    pub fn set_crosses(&mut self, crosses: Crosses) -> Result<(), ChartError> {
        self.node.clear(&CROSSES_AT);
        self.node.set(&CROSSES, crosses)
    }

    /// Replaces `crosses`. A non-finite value is rejected before `crosses` is touched.
    pub fn set_crosses_at(&mut self, value: f64) -> Result<(), ChartError> {
        CROSSES_AT.validate(&value)?;
        self.node.clear(&CROSSES);
        self.node.set(&CROSSES_AT, value)
    }

    pub fn set_cross_between(&mut self, between: CrossBetween) -> Result<(), ChartError> {
        self.require("cross between", &[AxisKind::Value])?;
        self.node.set(&CROSS_BETWEEN, between)
    }

    pub fn set_major_unit(&mut self, unit: Option<f64>) -> Result<(), ChartError> {
        self.require("major unit", SCALED)?;
        self.node.set_opt(&MAJOR_UNIT, unit)
    }

    pub fn set_minor_unit(&mut self, unit: Option<f64>) -> Result<(), ChartError> {
        self.require("minor unit", SCALED)?;
        self.node.set_opt(&MINOR_UNIT, unit)
    }

    /// Sets an explicit format code, unlinking it from the source data.
    pub fn set_number_format(&mut self, format_code: &str) -> Result<(), ChartError> {
        self.node.set(&FORMAT_CODE, format_code.to_string())?;
        self.node.set(&SOURCE_LINKED, false)
    }

    pub fn set_source_linked(&mut self, linked: bool) -> Result<(), ChartError> {
        if self.number_format().is_none() {
            self.node.set(&FORMAT_CODE, "General".to_string())?;
        }
        self.node.set(&SOURCE_LINKED, linked)
    }

    pub fn set_major_gridlines(&mut self, show: bool) -> Result<(), ChartError> {
        self.toggle(MAJOR_GRIDLINES, show)
    }

    pub fn set_minor_gridlines(&mut self, show: bool) -> Result<(), ChartError> {
        self.toggle(MINOR_GRIDLINES, show)
    }

    fn toggle(&mut self, steps: &[Step], present: bool) -> Result<(), ChartError> {
        if present {
            self.node.ensure_at(steps)?;
        } else {
            self.node.remove_at(steps);
        }
        Ok(())
    }

    pub fn set_label_offset(&mut self, offset: u32) -> Result<(), ChartError> {
        self.require("label offset", LABELED)?;
        self.node.set(&LABEL_OFFSET, offset)
    }

    pub fn set_tick_label_skip(&mut self, skip: Option<u32>) -> Result<(), ChartError> {
        self.require("tick label skip", SKIPPED)?;
        self.node.set_opt(&TICK_LABEL_SKIP, skip)
    }

    pub fn set_tick_mark_skip(&mut self, skip: Option<u32>) -> Result<(), ChartError> {
        self.require("tick mark skip", SKIPPED)?;
        self.node.set_opt(&TICK_MARK_SKIP, skip)
    }

    pub fn set_base_time_unit(&mut self, unit: TimeUnit) -> Result<(), ChartError> {
        self.require("base time unit", &[AxisKind::Date])?;
        self.node.set(&BASE_TIME_UNIT, unit)
    }

    pub fn set_display_units(&mut self, unit: Option<BuiltInUnit>) -> Result<(), ChartError> {
        self.require("display units", &[AxisKind::Value])?;
        match unit {
            Some(unit) => self.node.set(&DISPLAY_UNIT, unit),
            None => {
                self.node.remove_at(&[Step::c("dispUnits")]);
                Ok(())
            }
        }
    }

    pub fn title_mut(&mut self) -> Title<&mut XmlDocument> {
        Title::from_node(self.node.child_mut(TITLE))
    }

    pub fn remove_title(&mut self) -> bool {
        self.node.remove_at(TITLE).is_some()
    }
}
