//! Ellipse entity

use super::EntityCommon;
use crate::types::Vector3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ellipse {
    pub common: EntityCommon,
    /// Center in WCS
    pub center: Vector3,
    /// Endpoint of the major axis, relative to the center
    pub major_axis: Vector3,
    pub normal: Vector3,
    /// Minor to major axis ratio
    pub axis_ratio: f64,
    /// Start parameter (0 for a full ellipse)
    pub start_parameter: f64,
    /// End parameter (2π for a full ellipse)
    pub end_parameter: f64,
}

impl_entity!(Ellipse, "ELLIPSE");
