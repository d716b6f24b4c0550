//! 3D face entity

use super::EntityCommon;
use crate::types::Vector3;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face3D {
    pub common: EntityCommon,
    pub corners: [Vector3; 4],
    /// Bit 0..3: edge 1..4 is invisible.
    pub invisible_edges: u16,
}

impl Face3D {
    /// Whether edge `index` (0-based) is hidden.
    pub fn is_edge_invisible(&self, index: usize) -> bool {
        index < 4 && self.invisible_edges & (1 << index) != 0
    }
}

impl_entity!(Face3D, "3DFACE");
