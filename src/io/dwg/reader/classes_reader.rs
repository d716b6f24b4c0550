//! DWG Classes section reader.
//!
//! The `AcDb:Classes` section lists the custom classes of a drawing. Type
//! codes of 500 and above are indices into this table; a handful of class
//! names stand for record kinds that have a built-in decoder.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::Result;
use crate::io::dwg::constants::{handle_section, sentinels};
use crate::io::dwg::crc::crc8;
use crate::io::dwg::layout::VersionLayout;
use crate::io::dwg::object_type::ObjectType;
use crate::notification::NotificationCollection;

use super::bit_reader::DwgBitReader;
use super::merged_reader::DwgMergedReader;

/// Item class id of classes whose instances are entities.
pub const ENTITY_CLASS_ID: i16 = 0x1F2;

/// One custom class definition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassEntry {
    /// Type code the class is assigned (500 and above).
    pub class_number: i16,
    pub proxy_flags: u16,
    pub app_name: String,
    pub cpp_class_name: String,
    /// Record name, e.g. `LWPOLYLINE`.
    pub dxf_name: String,
    pub was_zombie: bool,
    /// 0x1F2 for entities, 0x1F3 for objects.
    pub item_class_id: i16,
    pub instance_count: i32,
    pub dwg_version: i32,
    pub maintenance_version: i32,
    /// Built-in record kind this class maps to.
    pub builtin: Option<ObjectType>,
}

impl ClassEntry {
    pub fn is_entity(&self) -> bool {
        self.item_class_id == ENTITY_CLASS_ID
    }

    /// Derived built-in type code; 0 when the class has no decoder.
    pub fn type_code(&self) -> u16 {
        self.builtin.map_or(0, ObjectType::code)
    }
}

/// Classes of one file, keyed by class number.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    entries: IndexMap<i16, ClassEntry>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class, replacing any previous class with the same number.
    pub fn insert(&mut self, mut entry: ClassEntry) {
        entry.builtin = ObjectType::from_class_name(&entry.dxf_name);
        self.entries.insert(entry.class_number, entry);
    }

    pub fn get(&self, class_number: u16) -> Option<&ClassEntry> {
        self.entries.get(&(class_number as i16))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassEntry> {
        self.entries.values()
    }

    /// Translate a raw object type code. Codes below 500 are returned as
    /// built-in types; class codes go through the table.
    pub fn resolve(&self, code: u16) -> Option<ObjectType> {
        if code < ObjectType::FIRST_CLASS_CODE {
            ObjectType::from_code(code)
        } else {
            self.get(code).and_then(|c| c.builtin)
        }
    }
}

/// Reader for the `AcDb:Classes` section.
pub struct DwgClassesReader<'a> {
    data: &'a [u8],
    layout: VersionLayout,
    maintenance_version: u8,
}

impl<'a> DwgClassesReader<'a> {
    pub fn new(layout: VersionLayout, data: &'a [u8], maintenance_version: u8) -> Self {
        Self {
            data,
            layout,
            maintenance_version,
        }
    }

    /// Read every class definition of the section.
    pub fn read(&self, notifications: &mut NotificationCollection) -> Result<ClassTable> {
        let version = self.layout.version;
        let mut table = ClassTable::new();
        let mut reader = DwgBitReader::new(self.data, version);

        // SN: start sentinel
        let sentinel = reader.read_sentinel();
        reader.ensure_good("classes start sentinel")?;
        VersionLayout::check_sentinel(&sentinel, &sentinels::CLASSES_START, "AcDb:Classes", notifications);
        let crc_start = reader.position();

        // RL: size of the class data area
        let size = reader.read_raw_long().max(0) as usize;
        if self.layout.header_has_extra_size(self.maintenance_version) {
            reader.read_raw_long();
        }

        let (mut merged, end) = if self.layout.string_stream {
            // RL: size in bits; strings end just before the flag bit
            let initial = reader.position_in_bits();
            let bits = reader.read_raw_ulong() as i64;
            let flag_pos = initial + bits - 1;
            let mut text = DwgBitReader::new(self.data, version);
            let data_end = text.set_position_by_flag(flag_pos);
            (
                DwgMergedReader::new(reader).with_text(text),
                DataEnd::Bits(data_end, flag_pos),
            )
        } else {
            let end = reader.position() + size;
            (DwgMergedReader::new(reader), DataEnd::Bytes(end))
        };

        if self.layout.r2004_plus {
            // BS: maximum class number, RC: 0x00, RC: 0x00, B: true
            merged.read_bit_short();
            merged.read_byte();
            merged.read_byte();
            merged.read_bit();
        }

        while end.not_reached(&merged) {
            let entry = read_class(&mut merged, self.layout.r2004_plus);
            merged.ensure_good("class entry")?;
            table.insert(entry);
        }

        if let DataEnd::Bits(_, flag_pos) = end {
            merged.set_position_in_bits(flag_pos + 1);
        }
        let crc_end = merged.position() + usize::from(merged.bit_shift() > 0);
        let stored = merged.reset_shift();
        let sentinel = merged.read_sentinel();
        merged.ensure_good("classes end")?;

        if let Some(covered) = self.data.get(crc_start..crc_end) {
            let computed = crc8(handle_section::CRC_SEED, covered);
            if computed != stored {
                notifications.warn(format!(
                    "Classes CRC mismatch: stored {:#06X}, computed {:#06X}",
                    stored, computed
                ));
            }
        }
        VersionLayout::check_sentinel(&sentinel, &sentinels::CLASSES_END, "AcDb:Classes", notifications);

        debug!(classes = table.len(), "read classes");
        Ok(table)
    }
}

/// Where the class data stops: a byte offset, or (R2007+) the bit where
/// the string stream begins plus the flag bit.
#[derive(Debug, Clone, Copy)]
enum DataEnd {
    Bytes(usize),
    Bits(i64, i64),
}

impl DataEnd {
    fn not_reached(&self, reader: &DwgBitReader<'_>) -> bool {
        match *self {
            DataEnd::Bytes(end) => reader.position() < end,
            DataEnd::Bits(end, _) => reader.position_in_bits() < end,
        }
    }
}

fn read_class(reader: &mut DwgMergedReader<'_>, r2004_plus: bool) -> ClassEntry {
    let mut class = ClassEntry {
        class_number: reader.read_bit_short(),
        proxy_flags: reader.read_bit_short() as u16,
        ..Default::default()
    };
    class.app_name = reader.read_variable_text();
    class.cpp_class_name = reader.read_variable_text();
    class.dxf_name = reader.read_variable_text();
    class.was_zombie = reader.read_bit();
    class.item_class_id = reader.read_bit_short();

    if r2004_plus {
        class.instance_count = reader.read_bit_long();
        class.dwg_version = reader.read_bit_long();
        class.maintenance_version = reader.read_bit_long();
        // BL: unknown, BL: unknown
        reader.read_bit_long();
        reader.read_bit_long();
    }
    class
}
