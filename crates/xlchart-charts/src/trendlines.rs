use std::ops::{Deref, DerefMut};

use xlchart_dom::{Step, XmlDocument};

use crate::enums::{TrendlineType, XmlEnum};
use crate::error::ChartError;
use crate::groups::owning_group_type;
use crate::property::{node_wrapper, BoolProp, EnumProp, FloatProp, Node, TextProp, UIntProp, ValProp};

node_wrapper! {
    /// The `c:trendline` elements of a series, in document order.
    Trendlines
}

node_wrapper! {
    Trendline
}

const TRENDLINE: Step = Step::c("trendline");
const NAME: TextProp = ValProp::text("trendline name", &[Step::c("name")]);
const KIND: EnumProp<TrendlineType> = ValProp::new("trendline type", &[Step::c("trendlineType")]);
const ORDER: UIntProp = ValProp::new("polynomial order", &[Step::c("order")]).range(2.0, 6.0);
const PERIOD: UIntProp = ValProp::new("moving average period", &[Step::c("period")]).range(2.0, 255.0);
const FORWARD: FloatProp = ValProp::new("forecast forward", &[Step::c("forward")]).range(0.0, f64::MAX);
const BACKWARD: FloatProp = ValProp::new("forecast backward", &[Step::c("backward")]).range(0.0, f64::MAX);
const INTERCEPT: FloatProp = ValProp::new("intercept", &[Step::c("intercept")]);
const DISPLAY_R_SQUARED: BoolProp = ValProp::new("display R squared", &[Step::c("dispRSqr")]);
const DISPLAY_EQUATION: BoolProp = ValProp::new("display equation", &[Step::c("dispEq")]);

impl<D: Deref<Target = XmlDocument>> Trendlines<D> {
    pub fn len(&self) -> usize {
        self.node.doc().count(self.node.path(), TRENDLINE)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Trendline<&XmlDocument>> {
        let trendline = Trendline::from_node(self.node.child(&[TRENDLINE.nth(index)]));
        trendline.exists().then_some(trendline)
    }
}

impl<D: DerefMut<Target = XmlDocument>> Trendlines<D> {
    pub fn get_mut(&mut self, index: usize) -> Option<Trendline<&mut XmlDocument>> {
        let node = self.node.child_mut(&[TRENDLINE.nth(index)]);
        node.exists().then(|| Trendline::from_node(node))
    }

    /// Appends a trendline. 3D, stacked and pie-like groups have none; nothing is created for them.
    pub fn add(&mut self, kind: TrendlineType) -> Result<Trendline<&mut XmlDocument>, ChartError> {
        if let Some(chart_type) = owning_group_type(self.node.doc(), self.node.path()) {
            if !chart_type.capabilities().has_trendlines {
                return Err(ChartError::Unsupported {
                    feature: "trendlines",
                    chart_type,
                });
            }
        }
        let path = self.node.path().child(TRENDLINE.nth(self.len()));
        let mut trendline = Trendline::from_node(Node::new(self.node.doc_mut(), path));
        trendline.set_kind(kind)?;
        trendline.set_display_r_squared(false)?;
        trendline.set_display_equation(false)?;
        Ok(trendline)
    }

    pub fn remove(&mut self, index: usize) -> bool {
        self.node.remove_at(&[TRENDLINE.nth(index)]).is_some()
    }
}

impl<D: Deref<Target = XmlDocument>> Trendline<D> {
    pub fn kind(&self) -> TrendlineType {
        self.node.get(&KIND).unwrap_or_default()
    }

    pub fn name(&self) -> Option<String> {
        self.node.get(&NAME)
    }

    /// Polynomial order; 2 when unset.
    pub fn order(&self) -> u32 {
        self.node.get(&ORDER).unwrap_or(2)
    }

    pub fn period(&self) -> u32 {
        self.node.get(&PERIOD).unwrap_or(2)
    }

    pub fn forward(&self) -> f64 {
        self.node.get(&FORWARD).unwrap_or(0.0)
    }

    pub fn backward(&self) -> f64 {
        self.node.get(&BACKWARD).unwrap_or(0.0)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.node.get(&INTERCEPT)
    }

    pub fn display_r_squared(&self) -> bool {
        self.node.get(&DISPLAY_R_SQUARED).unwrap_or(false)
    }

    pub fn display_equation(&self) -> bool {
        self.node.get(&DISPLAY_EQUATION).unwrap_or(false)
    }
}

impl<D: DerefMut<Target = XmlDocument>> Trendline<D> {
    /// Changing the type drops `order`/`period`, which only apply to polynomial and moving
    /// average trendlines.
    pub fn set_kind(&mut self, kind: TrendlineType) -> Result<(), ChartError> {
        self.node.set(&KIND, kind)?;
        if kind != TrendlineType::Polynomial {
            self.node.clear(&ORDER);
        }
        if kind != TrendlineType::MovingAverage {
            self.node.clear(&PERIOD);
        }
        Ok(())
    }

    pub fn set_name(&mut self, name: Option<&str>) -> Result<(), ChartError> {
        self.node.set_opt(&NAME, name.map(str::to_string))
    }

    pub fn set_order(&mut self, order: u32) -> Result<(), ChartError> {
        self.require(TrendlineType::Polynomial, "polynomial order")?;
        self.node.set(&ORDER, order)
    }

    pub fn set_period(&mut self, period: u32) -> Result<(), ChartError> {
        self.require(TrendlineType::MovingAverage, "moving average period")?;
        self.node.set(&PERIOD, period)
    }

    pub fn set_forward(&mut self, periods: f64) -> Result<(), ChartError> {
        self.node.set(&FORWARD, periods)
    }

    pub fn set_backward(&mut self, periods: f64) -> Result<(), ChartError> {
        self.node.set(&BACKWARD, periods)
    }

    pub fn set_intercept(&mut self, intercept: Option<f64>) -> Result<(), ChartError> {
        self.node.set_opt(&INTERCEPT, intercept)
    }

    pub fn set_display_r_squared(&mut self, display: bool) -> Result<(), ChartError> {
        self.node.set(&DISPLAY_R_SQUARED, display)
    }

    pub fn set_display_equation(&mut self, display: bool) -> Result<(), ChartError> {
        self.node.set(&DISPLAY_EQUATION, display)
    }

    fn require(&self, kind: TrendlineType, property: &str) -> Result<(), ChartError> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(ChartError::InvalidOperation(format!(
                "{property} requires a {} trendline",
                kind.as_xml()
            )))
        }
    }
}
