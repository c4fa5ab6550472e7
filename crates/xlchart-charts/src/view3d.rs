use std::ops::{Deref, DerefMut};

use xlchart_dom::{Step, XmlDocument};

use crate::error::ChartError;
use crate::property::{node_wrapper, BoolProp, IntProp, UIntProp, ValProp};

node_wrapper! {
    /// `c:chart/c:view3D`: rotation and projection of 3D charts.
    View3D
}

const ROT_X: IntProp = ValProp::new("x rotation", &[Step::c("rotX")]).range(-90.0, 90.0);
const ROT_Y: UIntProp = ValProp::new("y rotation", &[Step::c("rotY")]).range(0.0, 360.0);
const DEPTH: UIntProp = ValProp::new("depth percent", &[Step::c("depthPercent")]).range(20.0, 2000.0);
const HEIGHT: UIntProp = ValProp::new("height percent", &[Step::c("hPercent")]).range(5.0, 500.0);
const PERSPECTIVE: UIntProp = ValProp::new("perspective", &[Step::c("perspective")]).range(0.0, 240.0);
const RIGHT_ANGLE_AXES: BoolProp = ValProp::new("right angle axes", &[Step::c("rAngAx")]);

impl<D: Deref<Target = XmlDocument>> View3D<D> {
    pub fn rot_x(&self) -> i32 {
        self.node.get(&ROT_X).unwrap_or(0)
    }

    pub fn rot_y(&self) -> u32 {
        self.node.get(&ROT_Y).unwrap_or(0)
    }

    pub fn depth_percent(&self) -> u32 {
        self.node.get(&DEPTH).unwrap_or(100)
    }

    /// `None` when the height is automatic.
    pub fn height_percent(&self) -> Option<u32> {
        self.node.get(&HEIGHT)
    }

    pub fn perspective(&self) -> u32 {
        self.node.get(&PERSPECTIVE).unwrap_or(30)
    }

    pub fn right_angle_axes(&self) -> bool {
        self.node.get(&RIGHT_ANGLE_AXES).unwrap_or(false)
    }
}

impl<D: DerefMut<Target = XmlDocument>> View3D<D> {
    pub fn set_rot_x(&mut self, degrees: i32) -> Result<(), ChartError> {
        self.node.set(&ROT_X, degrees)
    }

    pub fn set_rot_y(&mut self, degrees: u32) -> Result<(), ChartError> {
        self.node.set(&ROT_Y, degrees)
    }

    pub fn set_depth_percent(&mut self, percent: u32) -> Result<(), ChartError> {
        self.node.set(&DEPTH, percent)
    }

    pub fn set_height_percent(&mut self, percent: Option<u32>) -> Result<(), ChartError> {
        self.node.set_opt(&HEIGHT, percent)
    }

    pub fn set_perspective(&mut self, perspective: u32) -> Result<(), ChartError> {
        self.node.set(&PERSPECTIVE, perspective)
    }

    pub fn set_right_angle_axes(&mut self, enabled: bool) -> Result<(), ChartError> {
        self.node.set(&RIGHT_ANGLE_AXES, enabled)
    }
}
