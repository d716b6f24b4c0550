//! Line entity

use super::EntityCommon;
use crate::types::Vector3;

/// A line segment between two WCS points.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Line {
    pub common: EntityCommon,
    pub start: Vector3,
    pub end: Vector3,
    pub thickness: f64,
    /// Extrusion direction
    pub normal: Vector3,
}

impl_entity!(Line, "LINE");
