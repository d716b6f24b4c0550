//! Block reference entities (INSERT and MINSERT)

use super::{Attribute, EntityCommon};
use crate::types::{Handle, Vector3};

#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    pub common: EntityCommon,
    /// Block record being inserted
    pub block_header: Handle,
    pub insertion: Vector3,
    pub scale: Vector3,
    pub rotation: f64,
    pub normal: Vector3,
    pub has_attributes: bool,
    /// Handles of the owned attributes, in order. Before R2004 only the
    /// first and last are stored and the rest are chained.
    pub owned: Vec<Handle>,
    pub seqend: Handle,
    pub attributes: Vec<Attribute>,
    /// Decoded from a MINSERT record.
    pub minsert: bool,
    /// MINSERT grid; 1 x 1 for a plain insert.
    pub column_count: i16,
    pub row_count: i16,
    pub column_spacing: f64,
    pub row_spacing: f64,
}

impl Insert {
    pub fn new() -> Self {
        Insert {
            common: EntityCommon::new(),
            block_header: Handle::NULL,
            insertion: Vector3::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: 0.0,
            normal: Vector3::UNIT_Z,
            has_attributes: false,
            owned: Vec::new(),
            seqend: Handle::NULL,
            attributes: Vec::new(),
            minsert: false,
            column_count: 1,
            row_count: 1,
            column_spacing: 0.0,
            row_spacing: 0.0,
        }
    }

    /// Number of block copies placed.
    pub fn copy_count(&self) -> usize {
        self.column_count.max(1) as usize * self.row_count.max(1) as usize
    }
}

impl Default for Insert {
    fn default() -> Self {
        Self::new()
    }
}

impl super::Entity for Insert {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        if self.minsert {
            "MINSERT"
        } else {
            "INSERT"
        }
    }
}
