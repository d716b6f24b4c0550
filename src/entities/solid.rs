//! Solid and trace entities
//!
//! Both are stored the same way: four 2D corners at a common elevation.

use super::EntityCommon;
use crate::types::Vector3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Solid {
    pub common: EntityCommon,
    /// Corners in OCS; `z` is the elevation
    pub corners: [Vector3; 4],
    pub thickness: f64,
    pub normal: Vector3,
    /// Decoded from a TRACE record.
    pub is_trace: bool,
}

impl super::Entity for Solid {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        if self.is_trace {
            "TRACE"
        } else {
            "SOLID"
        }
    }
}
