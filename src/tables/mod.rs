//! Decoded symbol table records
//!
//! Each table (layers, linetypes, styles, ...) has one control record
//! listing its entries, and one record per entry. Entries share a common
//! prefix kept in [`TableEntryCommon`].

use indexmap::IndexMap;

use crate::io::dwg::object_type::ObjectType;
use crate::record::ExtendedData;
use crate::types::Handle;

/// Implements [`TableEntry`] for a struct with an `entry: TableEntryCommon` field.
macro_rules! impl_table_entry {
    ($ty:ident, $name:literal) => {
        impl $crate::tables::TableEntry for $ty {
            fn entry(&self) -> &$crate::tables::TableEntryCommon {
                &self.entry
            }

            fn entry_mut(&mut self) -> &mut $crate::tables::TableEntryCommon {
                &mut self.entry
            }

            fn table_name(&self) -> &'static str {
                $name
            }
        }
    };
}

pub mod appid;
pub mod block_record;
pub mod dimstyle;
pub mod layer;
pub mod linetype;
pub mod textstyle;
pub mod vport;

pub use appid::AppId;
pub use block_record::BlockRecord;
pub use dimstyle::DimStyle;
pub use layer::{Layer, LayerFlags};
pub use linetype::{LineType, LineTypeSegment};
pub use textstyle::TextStyle;
pub use vport::VPort;

/// Fields every table entry starts with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableEntryCommon {
    pub handle: Handle,
    /// Table control record owning this entry.
    pub owner: Handle,
    pub name: String,
    /// Entry comes from an external reference.
    pub xref_dependent: bool,
    pub xref_index: i16,
    /// Block record of the external reference, when `xref_dependent`.
    pub xref_block: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: Vec<ExtendedData>,
}

/// Behaviour shared by every table entry.
pub trait TableEntry {
    fn entry(&self) -> &TableEntryCommon;

    fn entry_mut(&mut self) -> &mut TableEntryCommon;

    /// DXF table name (`LAYER`, `LTYPE`, ...).
    fn table_name(&self) -> &'static str;

    fn handle(&self) -> Handle {
        self.entry().handle
    }

    fn name(&self) -> &str {
        &self.entry().name
    }

    fn is_xref_dependent(&self) -> bool {
        self.entry().xref_dependent
    }
}

/// A table control record: the ordered entry list of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableControl {
    pub handle: Handle,
    /// Which control this is (`LayerControlObj`, ...).
    pub kind: ObjectType,
    pub entries: Vec<Handle>,
    /// `*Model_Space`/`*Paper_Space` for the block control,
    /// `ByLayer`/`ByBlock` for the linetype control.
    pub special: Vec<Handle>,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: Vec<ExtendedData>,
}

impl TableControl {
    pub fn new(handle: Handle, kind: ObjectType) -> Self {
        TableControl {
            handle,
            kind,
            entries: Vec::new(),
            special: Vec::new(),
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: Vec::new(),
        }
    }

    /// Entry handles followed by the special handles.
    pub fn all_entries(&self) -> impl Iterator<Item = Handle> + '_ {
        self.entries.iter().chain(self.special.iter()).copied()
    }
}

/// Entries of one table keyed by handle, with a case-insensitive name index.
#[derive(Debug, Clone)]
pub struct Table<T: TableEntry> {
    entries: IndexMap<u64, T>,
    names: IndexMap<String, u64>,
}

impl<T: TableEntry> Table<T> {
    pub fn new() -> Self {
        Table {
            entries: IndexMap::new(),
            names: IndexMap::new(),
        }
    }

    /// Add an entry. A later entry with the same handle replaces the
    /// earlier one; the first entry of a given name keeps the name slot.
    pub fn add(&mut self, entry: T) {
        let handle = entry.handle().value();
        self.names
            .entry(entry.name().to_uppercase())
            .or_insert(handle);
        self.entries.insert(handle, entry);
    }

    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.entries.get(&handle.value())
    }

    /// Entry by name (case-insensitive).
    pub fn by_name(&self, name: &str) -> Option<&T> {
        let handle = self.names.get(&name.to_uppercase())?;
        self.entries.get(handle)
    }

    /// Name of the entry with `handle`.
    pub fn name_of(&self, handle: Handle) -> Option<&str> {
        self.get(handle).map(|e| e.name())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.name())
    }
}

impl<T: TableEntry> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(handle: u64, name: &str) -> Layer {
        let mut l = Layer::default();
        l.entry.handle = Handle::new(handle);
        l.entry.name = name.to_string();
        l
    }

    #[test]
    fn test_table_lookup_by_handle_and_name() {
        let mut table = Table::new();
        table.add(layer(0x10, "Walls"));
        table.add(layer(0x11, "0"));
        assert_eq!(table.len(), 2);
        assert_eq!(table.name_of(Handle::new(0x10)), Some("Walls"));
        assert!(table.contains("WALLS"));
        assert_eq!(table.by_name("walls").unwrap().handle().value(), 0x10);
        assert!(table.get(Handle::new(0x12)).is_none());
    }

    #[test]
    fn test_same_handle_replaces_entry() {
        let mut table = Table::new();
        table.add(layer(0x10, "A"));
        table.add(layer(0x10, "B"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.name_of(Handle::new(0x10)), Some("B"));
    }

    #[test]
    fn test_control_lists_special_entries_last() {
        let mut control = TableControl::new(Handle::new(1), ObjectType::BlockControlObj);
        control.entries.push(Handle::new(0x20));
        control.special.push(Handle::new(0x1F));
        let all: Vec<_> = control.all_entries().map(|h| h.value()).collect();
        assert_eq!(all, [0x20, 0x1F]);
    }
}
