//! Circle entity

use super::EntityCommon;
use crate::types::Vector3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Circle {
    pub common: EntityCommon,
    /// Center in OCS
    pub center: Vector3,
    pub radius: f64,
    pub thickness: f64,
    pub normal: Vector3,
}

impl_entity!(Circle, "CIRCLE");
