//! Hatch entity
//!
//! A hatch is a set of boundary loops plus a fill description. Each loop is
//! either a polyline (with optional bulges) or a chain of edges.

use super::EntityCommon;
use crate::types::{Color, Handle, Vector2, Vector3};

/// Gradient fill settings (R2004+).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HatchGradient {
    pub reserved: i32,
    pub angle: f64,
    pub shift: f64,
    pub single_color: bool,
    pub tint: f64,
    /// `(position, color)` stops
    pub colors: Vec<(f64, Color)>,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HatchPolylineVertex {
    pub point: Vector2,
    pub bulge: f64,
}

/// One edge of an edge loop.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryEdge {
    Line {
        start: Vector2,
        end: Vector2,
    },
    CircularArc {
        center: Vector2,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    },
    EllipticArc {
        center: Vector2,
        /// Endpoint of the major axis relative to the center
        major_axis: Vector2,
        axis_ratio: f64,
        start_angle: f64,
        end_angle: f64,
        counter_clockwise: bool,
    },
    Spline {
        degree: i32,
        rational: bool,
        periodic: bool,
        knots: Vec<f64>,
        control_points: Vec<Vector2>,
        /// One per control point when `rational`
        weights: Vec<f64>,
        /// R2010+
        fit_points: Vec<Vector2>,
        start_tangent: Vector2,
        end_tangent: Vector2,
    },
}

/// Geometry of one boundary loop.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryLoop {
    Polyline {
        closed: bool,
        vertices: Vec<HatchPolylineVertex>,
    },
    Edges(Vec<BoundaryEdge>),
}

impl Default for BoundaryLoop {
    fn default() -> Self {
        BoundaryLoop::Edges(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoundaryPath {
    /// Path type flags; bit 0x02 marks a polyline loop.
    pub flags: u32,
    pub boundary: BoundaryLoop,
    /// Entities the loop was built from (associative hatches).
    pub source_objects: Vec<Handle>,
}

impl BoundaryPath {
    pub fn is_polyline(&self) -> bool {
        self.flags & 0x02 != 0
    }
}

/// Line family of a pattern fill.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HatchPatternLine {
    pub angle: f64,
    pub base_point: Vector2,
    pub offset: Vector2,
    pub dash_lengths: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Hatch {
    pub common: EntityCommon,
    pub gradient: Option<HatchGradient>,
    pub elevation: f64,
    pub normal: Vector3,
    pub pattern_name: String,
    pub is_solid: bool,
    pub is_associative: bool,
    pub paths: Vec<BoundaryPath>,
    /// 0 normal, 1 outer, 2 ignore
    pub style: i16,
    /// 0 user defined, 1 predefined, 2 custom
    pub pattern_type: i16,
    pub pattern_angle: f64,
    pub pattern_scale: f64,
    pub is_double: bool,
    pub pattern_lines: Vec<HatchPatternLine>,
    /// Stored when some path has flag 0x04.
    pub pixel_size: Option<f64>,
    pub seed_points: Vec<Vector2>,
}

impl_entity!(Hatch, "HATCH");
