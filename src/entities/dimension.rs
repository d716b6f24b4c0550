//! Dimension entities
//!
//! The seven dimension records share a common block (text, measurement,
//! style and the anonymous block holding the rendered graphics) followed
//! by the definition points of their kind.

use super::EntityCommon;
use crate::types::{Handle, Vector2, Vector3};

/// Data shared by every dimension kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionCommon {
    pub common: EntityCommon,
    /// R2010+ class version
    pub version: u8,
    pub normal: Vector3,
    /// Text middle point in OCS; `z` is the elevation
    pub text_midpoint: Vector3,
    pub flags: u8,
    pub user_text: String,
    pub text_rotation: f64,
    pub horizontal_direction: f64,
    pub insert_scale: Vector3,
    pub insert_rotation: f64,
    /// R2000+
    pub attachment: i16,
    pub line_spacing_style: i16,
    pub line_spacing_factor: f64,
    pub actual_measurement: f64,
    /// R2007+
    pub flip_arrow1: bool,
    pub flip_arrow2: bool,
    /// Insertion point of the anonymous block clone (12-pt)
    pub clone_insertion: Vector2,
    pub style: Handle,
    /// Anonymous block with the dimension graphics
    pub block: Handle,
}

/// Definition points of each dimension record type.
#[derive(Debug, Clone, PartialEq)]
pub enum DimensionKind {
    Ordinate {
        definition_point: Vector3,
        feature_location: Vector3,
        leader_endpoint: Vector3,
        /// Ordinate measures X (else Y)
        x_type: bool,
    },
    Linear {
        first_point: Vector3,
        second_point: Vector3,
        definition_point: Vector3,
        /// Extension line rotation
        oblique_angle: f64,
        rotation: f64,
    },
    Aligned {
        first_point: Vector3,
        second_point: Vector3,
        definition_point: Vector3,
        oblique_angle: f64,
    },
    Angular3Point {
        definition_point: Vector3,
        first_point: Vector3,
        second_point: Vector3,
        vertex: Vector3,
    },
    Angular2Line {
        arc_point: Vector2,
        first_start: Vector3,
        first_end: Vector3,
        second_start: Vector3,
        second_end: Vector3,
    },
    Radius {
        definition_point: Vector3,
        chord_point: Vector3,
        leader_length: f64,
    },
    Diameter {
        definition_point: Vector3,
        chord_point: Vector3,
        leader_length: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub base: DimensionCommon,
    pub kind: DimensionKind,
}

impl super::Entity for Dimension {
    fn common(&self) -> &EntityCommon {
        &self.base.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.base.common
    }

    fn entity_type(&self) -> &'static str {
        match self.kind {
            DimensionKind::Ordinate { .. } => "DIMENSION_ORDINATE",
            DimensionKind::Linear { .. } => "DIMENSION_LINEAR",
            DimensionKind::Aligned { .. } => "DIMENSION_ALIGNED",
            DimensionKind::Angular3Point { .. } => "DIMENSION_ANG3PT",
            DimensionKind::Angular2Line { .. } => "DIMENSION_ANG2LN",
            DimensionKind::Radius { .. } => "DIMENSION_RADIUS",
            DimensionKind::Diameter { .. } => "DIMENSION_DIAMETER",
        }
    }
}
