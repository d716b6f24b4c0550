//! Multi-line text entity

use super::EntityCommon;
use crate::types::{Color, Handle, Vector3};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MText {
    pub common: EntityCommon,
    /// Raw contents, formatting codes included
    pub value: String,
    pub insertion: Vector3,
    pub normal: Vector3,
    /// Direction of the text X axis
    pub x_axis: Vector3,
    pub rectangle_width: f64,
    /// Stored from R2007 on
    pub rectangle_height: Option<f64>,
    pub height: f64,
    /// 1 top left .. 9 bottom right
    pub attachment: i16,
    /// 1 left to right, 3 top to bottom, 5 by style
    pub drawing_direction: i16,
    pub extents_height: f64,
    pub extents_width: f64,
    pub line_spacing_style: i16,
    pub line_spacing_factor: f64,
    /// R2004+ background fill flags
    pub background_flags: i32,
    pub background_scale: f64,
    pub background_color: Option<Color>,
    pub background_transparency: u32,
    pub style: Handle,
}

impl MText {
    /// Rotation of the text X axis in the XY plane, in radians.
    pub fn rotation(&self) -> f64 {
        self.x_axis.y.atan2(self.x_axis.x)
    }
}

impl_entity!(MText, "MTEXT");
