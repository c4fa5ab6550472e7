use std::ops::{Deref, DerefMut};

use xlchart_dom::{Ns, Step, XmlDocument};

use crate::enums::{ErrorBarDirection, ErrorBarType, ErrorValueType, XmlEnum};
use crate::error::ChartError;
use crate::groups::owning_group_type;
use crate::property::{element, node_wrapper, val_element, BoolProp, EnumProp, FloatProp, Node, ValProp};

node_wrapper! {
    /// The `c:errBars` elements of a series. Scatter and bubble series may carry one per
    /// direction, other series a single vertical set.
    ErrorBars
}

node_wrapper! {
    ErrorBar
}

const ERR_BARS: Step = Step::c("errBars");
const DIRECTION: EnumProp<ErrorBarDirection> = ValProp::new("error bar direction", &[Step::c("errDir")]);
const BAR_TYPE: EnumProp<ErrorBarType> = ValProp::new("error bar type", &[Step::c("errBarType")]);
const VALUE_TYPE: EnumProp<ErrorValueType> = ValProp::new("error value type", &[Step::c("errValType")]);
const NO_END_CAP: BoolProp = ValProp::new("no end cap", &[Step::c("noEndCap")]);
const VALUE: FloatProp = ValProp::new("error amount", &[Step::c("val")]).range(0.0, f64::MAX);

impl<D: Deref<Target = XmlDocument>> ErrorBars<D> {
    /// Directions present, in document order.
    pub fn directions(&self) -> Vec<ErrorBarDirection> {
        (0..self.node.doc().count(self.node.path(), ERR_BARS))
            .map(|i| ErrorBar::from_node(self.node.child(&[ERR_BARS.nth(i)])).direction())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.directions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, direction: ErrorBarDirection) -> Option<usize> {
        self.directions().iter().position(|d| *d == direction)
    }

    pub fn get(&self, direction: ErrorBarDirection) -> Option<ErrorBar<&XmlDocument>> {
        let i = self.position(direction)?;
        Some(ErrorBar::from_node(self.node.child(&[ERR_BARS.nth(i)])))
    }
}

impl<D: DerefMut<Target = XmlDocument>> ErrorBars<D> {
    pub fn get_mut(&mut self, direction: ErrorBarDirection) -> Option<ErrorBar<&mut XmlDocument>> {
        let i = self.position(direction)?;
        Some(ErrorBar::from_node(self.node.child_mut(&[ERR_BARS.nth(i)])))
    }

    /// Adds fixed-value error bars of 1 in both directions of `direction`.
    pub fn add(&mut self, direction: ErrorBarDirection) -> Result<ErrorBar<&mut XmlDocument>, ChartError> {
        let chart_type = owning_group_type(self.node.doc(), self.node.path());
        let xy = match chart_type {
            Some(chart_type) => {
                if !chart_type.capabilities().has_error_bars {
                    return Err(ChartError::Unsupported {
                        feature: "error bars",
                        chart_type,
                    });
                }
                chart_type.family().uses_xy_values()
            }
            None => true,
        };
        if !xy && direction == ErrorBarDirection::X {
            return Err(ChartError::InvalidOperation(
                "horizontal error bars need a scatter or bubble series".to_string(),
            ));
        }
        if self.position(direction).is_some() || (!xy && !self.is_empty()) {
            return Err(ChartError::InvalidOperation(format!(
                "series already has {} error bars",
                direction.as_xml()
            )));
        }

        let mut bars = element(Ns::Chart, "errBars");
        if xy {
            bars = bars.with_child(val_element("errDir", direction.as_xml()));
        }
        let bars = bars
            .with_child(val_element("errBarType", ErrorBarType::Both.as_xml()))
            .with_child(val_element("errValType", ErrorValueType::FixedValue.as_xml()))
            .with_child(val_element("noEndCap", "0"))
            .with_child(val_element("val", "1"));
        self.node.insert(bars)?;
        let index = self.len() - 1;
        let path = self.node.path().child(ERR_BARS.nth(index));
        Ok(ErrorBar::from_node(Node::new(self.node.doc_mut(), path)))
    }

    pub fn remove(&mut self, direction: ErrorBarDirection) -> bool {
        match self.position(direction) {
            Some(i) => self.node.remove_at(&[ERR_BARS.nth(i)]).is_some(),
            None => false,
        }
    }
}

impl<D: Deref<Target = XmlDocument>> ErrorBar<D> {
    /// Bars without `c:errDir` are vertical.
    pub fn direction(&self) -> ErrorBarDirection {
        self.node.get(&DIRECTION).unwrap_or_default()
    }

    pub fn bar_type(&self) -> ErrorBarType {
        self.node.get(&BAR_TYPE).unwrap_or_default()
    }

    pub fn value_type(&self) -> ErrorValueType {
        self.node.get(&VALUE_TYPE).unwrap_or_default()
    }

    pub fn value(&self) -> Option<f64> {
        self.node.get(&VALUE)
    }

    pub fn no_end_cap(&self) -> bool {
        self.node.get(&NO_END_CAP).unwrap_or(false)
    }
}

impl<D: DerefMut<Target = XmlDocument>> ErrorBar<D> {
    pub fn set_bar_type(&mut self, bar_type: ErrorBarType) -> Result<(), ChartError> {
        self.node.set(&BAR_TYPE, bar_type)
    }

    pub fn set_value_type(&mut self, value_type: ErrorValueType) -> Result<(), ChartError> {
        self.node.set(&VALUE_TYPE, value_type)?;
        if value_type != ErrorValueType::Custom {
            self.node.remove_at(&[Step::c("plus")]);
            self.node.remove_at(&[Step::c("minus")]);
        }
        Ok(())
    }

    pub fn set_value(&mut self, value: f64) -> Result<(), ChartError> {
        self.node.set(&VALUE, value)
    }

    pub fn set_no_end_cap(&mut self, no_end_cap: bool) -> Result<(), ChartError> {
        self.node.set(&NO_END_CAP, no_end_cap)
    }

    /// Switches to custom amounts read from `plus` / `minus` references.
    pub fn set_custom(&mut self, plus: &str, minus: &str) -> Result<(), ChartError> {
        self.node.set(&VALUE_TYPE, ErrorValueType::Custom)?;
        for (local, formula) in [("plus", plus), ("minus", minus)] {
            let reference = element(Ns::Chart, "numRef").with_child(element(Ns::Chart, "f").with_text(formula));
            self.node.put(element(Ns::Chart, local).with_child(reference))?;
        }
        self.node.clear(&VALUE);
        Ok(())
    }
}
