//! Leader entity

use super::EntityCommon;
use crate::types::{Handle, Vector3};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Leader {
    pub common: EntityCommon,
    /// 0 text, 1 tolerance, 2 block reference, 3 none
    pub annotation_type: i16,
    /// 0 straight segments, 1 spline
    pub path_type: i16,
    pub vertices: Vec<Vector3>,
    pub origin: Vector3,
    pub normal: Vector3,
    pub x_direction: Vector3,
    /// R14+
    pub block_offset: Vector3,
    /// R14+
    pub end_point_projection: Vector3,
    /// R13-R14 only
    pub dimgap: f64,
    pub box_height: f64,
    pub box_width: f64,
    pub hookline_on_x_direction: bool,
    pub arrowhead_on: bool,
    /// R13-R14 only
    pub arrowhead_type: i16,
    /// R13-R14 only
    pub arrowhead_size: f64,
    /// R13-R14 only
    pub byblock_color: i16,
    pub annotation: Handle,
    pub dimstyle: Handle,
}

impl_entity!(Leader, "LEADER");
