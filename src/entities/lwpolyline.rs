//! Lightweight polyline entity

use super::EntityCommon;
use crate::types::{Vector2, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LwVertex {
    pub location: Vector2,
    pub bulge: f64,
    pub start_width: f64,
    pub end_width: f64,
    /// R2010+ vertex id, 0 when not stored
    pub id: i32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LwPolyline {
    pub common: EntityCommon,
    /// Raw flag word; bit 0x200 marks a closed polyline.
    pub flags: i16,
    pub constant_width: f64,
    pub elevation: f64,
    pub thickness: f64,
    pub normal: Vector3,
    pub vertices: Vec<LwVertex>,
}

impl LwPolyline {
    pub fn is_closed(&self) -> bool {
        self.flags & 0x200 != 0
    }
}

impl_entity!(LwPolyline, "LWPOLYLINE");
