//! Block record table entry
//!
//! A block record owns the entities of one block definition. Before R2004
//! they are chained through the first/last entity handles and each
//! entity's next link; from R2004 the record lists them explicitly.

use crate::types::{Handle, Vector3};

use super::TableEntryCommon;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockRecord {
    pub entry: TableEntryCommon,
    pub anonymous: bool,
    pub has_attributes: bool,
    pub is_xref: bool,
    pub is_overlay: bool,
    /// R2000+
    pub loaded: bool,
    pub base_point: Vector3,
    pub xref_path: String,
    pub description: String,
    pub preview: Vec<u8>,
    /// R2007+
    pub units: i16,
    pub explodable: bool,
    pub can_scale: bool,
    pub block_entity: Handle,
    /// Before R2004
    pub first_entity: Handle,
    pub last_entity: Handle,
    /// R2004+
    pub owned: Vec<Handle>,
    pub end_block: Handle,
    pub inserts: Vec<Handle>,
    pub layout: Handle,
}

impl BlockRecord {
    pub fn is_model_space(&self) -> bool {
        self.entry.name.eq_ignore_ascii_case("*Model_Space")
    }

    pub fn is_paper_space(&self) -> bool {
        self.entry
            .name
            .get(..12)
            .is_some_and(|p| p.eq_ignore_ascii_case("*Paper_Space"))
    }
}

impl_table_entry!(BlockRecord, "BLOCK_RECORD");
