//! Block bracketing entities
//!
//! A block definition is the run of entities between a BLOCK and an ENDBLK
//! owned by the same block record. SEQEND closes the vertex list of a
//! polyline or the attribute list of an insert.

use super::EntityCommon;

/// Start of a block definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub common: EntityCommon,
    pub name: String,
}

impl_entity!(Block, "BLOCK");

/// End of a block definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockEnd {
    pub common: EntityCommon,
}

impl_entity!(BlockEnd, "ENDBLK");

/// End of a vertex or attribute sequence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Seqend {
    pub common: EntityCommon,
}

impl_entity!(Seqend, "SEQEND");
