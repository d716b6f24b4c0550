//! Arc entity

use super::EntityCommon;
use crate::types::Vector3;

/// A circular arc. Angles are in radians, counter-clockwise from the OCS
/// X axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Arc {
    pub common: EntityCommon,
    pub center: Vector3,
    pub radius: f64,
    pub thickness: f64,
    pub normal: Vector3,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl_entity!(Arc, "ARC");
