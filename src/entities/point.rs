//! Point entity

use super::EntityCommon;
use crate::types::Vector3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub common: EntityCommon,
    pub location: Vector3,
    pub thickness: f64,
    pub normal: Vector3,
    /// Angle of the X axis of the UCS in effect when the point was drawn.
    pub x_axis_angle: f64,
}

impl_entity!(Point, "POINT");
