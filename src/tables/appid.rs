//! Registered application table entry

use super::TableEntryCommon;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppId {
    pub entry: TableEntryCommon,
    pub unknown: u8,
}

impl_table_entry!(AppId, "APPID");
