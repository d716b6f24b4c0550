//! Ray and construction line entities

use super::EntityCommon;
use crate::types::Vector3;

/// Semi-infinite line starting at `base_point`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ray {
    pub common: EntityCommon,
    pub base_point: Vector3,
    pub direction: Vector3,
}

impl_entity!(Ray, "RAY");

/// Infinite line through `base_point`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XLine {
    pub common: EntityCommon,
    pub base_point: Vector3,
    pub direction: Vector3,
}

impl_entity!(XLine, "XLINE");
