//! Spline entity
//!
//! A spline is stored either by its control points and knots or by the fit
//! points it passes through, never both.

use super::EntityCommon;
use crate::types::Vector3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spline {
    pub common: EntityCommon,
    /// 1 control points and knots, 2 fit points
    pub scenario: i32,
    /// R2013+ spline flags
    pub flags: i32,
    /// R2013+ knot parameterization
    pub knot_parameter: i32,
    pub degree: i32,
    pub rational: bool,
    pub closed: bool,
    pub periodic: bool,
    pub knot_tolerance: f64,
    pub control_tolerance: f64,
    pub fit_tolerance: f64,
    pub start_tangent: Vector3,
    pub end_tangent: Vector3,
    pub knots: Vec<f64>,
    pub control_points: Vec<Vector3>,
    /// One per control point when the weight flag is set, else empty.
    pub weights: Vec<f64>,
    pub fit_points: Vec<Vector3>,
}

impl Spline {
    pub fn has_fit_data(&self) -> bool {
        self.scenario == 2
    }
}

impl_entity!(Spline, "SPLINE");
