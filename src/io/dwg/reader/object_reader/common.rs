//! Data every record starts with.
//!
//! Entities, non-entity objects and table entries each share a prefix of
//! handle, extended data, reactors and extension dictionary. The data
//! fields come from the main stream; the handle references that belong
//! to them are read from the handle stream once the data part is done.

use crate::entities::{EntityCommon, EntitySpace};
use crate::error::{DwgError, Result};
use crate::record::ExtendedData;
use crate::tables::TableEntryCommon;
use crate::types::{Handle, LineWeight};

use super::StreamSet;

/// Reactor counts above this are treated as corruption.
const MAX_REACTORS: i32 = 10_000;

/// Prefix of a non-entity object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectCommon {
    pub handle: Handle,
    pub owner: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: Vec<ExtendedData>,
}

/// Own handle (main stream), stored as the current handle for relative
/// references.
fn read_own_handle(s: &mut StreamSet<'_>) -> Handle {
    let handle = s.reader().main_mut().handle_reference();
    s.set_current_handle(handle);
    Handle::new(handle)
}

/// EED: runs of `BS size, H application, size bytes` ended by a zero size.
pub fn read_extended_data(s: &mut StreamSet<'_>) -> Result<Vec<ExtendedData>> {
    let mut out = Vec::new();
    loop {
        let size = s.read_bit_short();
        s.ensure_good("extended data size")?;
        if size <= 0 {
            break;
        }
        let application = s.reader().main_mut().handle_reference();
        let data = s.read_bytes(size as usize);
        s.ensure_good("extended data")?;
        out.push(ExtendedData {
            application: Handle::new(application),
            data,
        });
    }
    Ok(out)
}

fn read_reactor_count(s: &mut StreamSet<'_>) -> Result<i32> {
    let count = s.read_bit_long();
    if !(0..=MAX_REACTORS).contains(&count) {
        return Err(DwgError::Parse(format!(
            "{} reactors on {:#X}",
            count, s.map_handle
        )));
    }
    Ok(count)
}

/// BL element count, rejected when that many elements of at least
/// `min_bits` each could not fit in the rest of the data stream.
pub fn read_count(s: &mut StreamSet<'_>, min_bits: usize, what: &str) -> Result<usize> {
    let count = s.read_bit_long();
    s.ensure_good(what)?;
    let fits = usize::try_from(count)
        .ok()
        .filter(|&n| n.saturating_mul(min_bits) <= s.remaining_bits() as usize);
    fits.ok_or_else(|| {
        DwgError::Parse(format!("{} count {} in {:#X}", what, count, s.map_handle))
    })
}

fn read_handles(s: &mut StreamSet<'_>, count: usize) -> Vec<Handle> {
    (0..count).map(|_| Handle::new(s.handle_reference())).collect()
}

/// Common entity data, including its handle references.
pub fn read_common_entity_data(s: &mut StreamSet<'_>) -> Result<EntityCommon> {
    let layout = s.layout;
    if layout.r2000_plus && !layout.r2010_plus {
        s.update_handle_reader()?;
    }

    let mut common = EntityCommon::new();
    common.handle = read_own_handle(s);
    common.extended_data = read_extended_data(s)?;

    // B: graphics present, then its byte size
    if s.read_bit() {
        let size = if layout.r2010_plus {
            s.read_bit_long_long()
        } else {
            u64::from(s.read_raw_ulong())
        };
        if !s.advance(size as usize) {
            return Err(DwgError::StreamOverrun {
                context: format!("graphics of {:#X}", s.map_handle),
                bit_position: s.position_in_bits(),
            });
        }
    }

    if layout.r13_14_only {
        s.update_handle_reader()?;
    }

    let mode = s.read_2bits();
    common.space = EntitySpace::from_mode(mode);
    let reactor_count = read_reactor_count(s)?;
    let xdict_missing = layout.r2004_plus && s.read_bit();
    if layout.r2013_plus {
        // B: has binary data
        s.read_bit();
    }
    let bylayer_linetype = layout.r13_14_only && s.read_bit();
    let no_links = layout.entity_links && s.read_bit();

    let color = s.read_en_color();
    common.color = color.color;
    common.transparency = color.transparency;
    common.linetype_scale = s.read_bit_double();

    let mut linetype_flags = if bylayer_linetype { 0 } else { 3 };
    let mut plotstyle_flags = 0;
    let mut material_flags = 0;
    let mut visual_styles = 0;
    if layout.r2000_plus {
        linetype_flags = s.read_2bits();
        plotstyle_flags = s.read_2bits();
    }
    if layout.r2007_plus {
        material_flags = s.read_2bits();
        // RC: shadow flags
        s.read_byte();
    }
    if layout.r2010_plus {
        // B: full, face, edge visual style
        visual_styles = (0..3).filter(|_| s.read_bit()).count();
    }
    common.linetype_flags = linetype_flags;
    common.invisible = s.read_bit_short() & 1 != 0;
    if layout.r2000_plus {
        common.line_weight = LineWeight::from_dwg_index(s.read_byte());
    }
    s.ensure_good("common entity data")?;

    // Handle stream
    if mode == 0 {
        common.owner = Handle::new(s.handle_reference());
    }
    common.reactors = read_handles(s, reactor_count as usize);
    if !xdict_missing {
        common.xdictionary = Handle::new(s.handle_reference());
    }
    if layout.r13_14_only {
        common.layer = Handle::new(s.handle_reference());
        if !bylayer_linetype {
            common.linetype = Handle::new(s.handle_reference());
        }
    }
    if layout.entity_links {
        if no_links {
            let own = common.handle.value();
            common.prev_entity = Handle::new(own.saturating_sub(1));
            common.next_entity = Handle::new(own + 1);
        } else {
            common.prev_entity = Handle::new(s.handle_reference());
            common.next_entity = Handle::new(s.handle_reference());
        }
    }
    if layout.r2004_plus && color.has_color_handle {
        common.color_handle = Handle::new(s.handle_reference());
    }
    if layout.r2000_plus {
        common.layer = Handle::new(s.handle_reference());
        if linetype_flags == 3 {
            common.linetype = Handle::new(s.handle_reference());
        }
    }
    if layout.r2007_plus && material_flags == 3 {
        common.material = Handle::new(s.handle_reference());
    }
    if layout.r2000_plus && plotstyle_flags == 3 {
        common.plotstyle = Handle::new(s.handle_reference());
    }
    for _ in 0..visual_styles {
        s.handle_reference();
    }
    s.ensure_good("common entity handles")?;
    Ok(common)
}

/// Common data of a non-entity object, including its handle references.
pub fn read_common_non_entity_data(s: &mut StreamSet<'_>) -> Result<ObjectCommon> {
    let layout = s.layout;
    if layout.r2000_plus && !layout.r2010_plus {
        s.update_handle_reader()?;
    }

    let mut common = ObjectCommon {
        handle: read_own_handle(s),
        ..Default::default()
    };
    common.extended_data = read_extended_data(s)?;

    if layout.r13_14_only {
        s.update_handle_reader()?;
    }

    let reactor_count = read_reactor_count(s)?;
    let xdict_missing = layout.r2004_plus && s.read_bit();
    if layout.r2013_plus {
        // B: has binary data
        s.read_bit();
    }
    s.ensure_good("common object data")?;

    common.owner = Handle::new(s.handle_reference());
    common.reactors = read_handles(s, reactor_count as usize);
    if !xdict_missing {
        common.xdictionary = Handle::new(s.handle_reference());
    }
    s.ensure_good("common object handles")?;
    Ok(common)
}

/// Common data of a table entry: the object prefix, the name and the xref
/// bits. The xref block handle is read here as well.
pub fn read_table_entry_common(s: &mut StreamSet<'_>) -> Result<TableEntryCommon> {
    let object = read_common_non_entity_data(s)?;
    let mut entry = TableEntryCommon {
        handle: object.handle,
        owner: object.owner,
        reactors: object.reactors,
        xdictionary: object.xdictionary,
        extended_data: object.extended_data,
        ..Default::default()
    };
    entry.name = s.read_variable_text();

    if s.layout.r2007_plus {
        let flags = s.read_bit_short();
        entry.xref_dependent = flags & 0x100 != 0;
    } else {
        // B: 64-flag, BS: xref index + 1, B: xdep
        s.read_bit();
        entry.xref_index = s.read_bit_short() - 1;
        entry.xref_dependent = s.read_bit();
    }
    entry.xref_block = Handle::new(s.handle_reference());
    s.ensure_good("table entry")?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::layout::VersionLayout;
    use crate::io::dwg::reader::classes_reader::ClassTable;
    use crate::io::dwg::reader::object_reader::DwgObjectReader;
    use crate::types::DwgVersion;

    /// Bit packer for hand-built records.
    struct Bits {
        bytes: Vec<u8>,
        bit: usize,
    }

    impl Bits {
        fn new() -> Self {
            Bits {
                bytes: Vec::new(),
                bit: 0,
            }
        }

        fn push(&mut self, value: u64, count: usize) {
            for i in (0..count).rev() {
                if self.bit % 8 == 0 {
                    self.bytes.push(0);
                }
                if (value >> i) & 1 != 0 {
                    let last = self.bytes.len() - 1;
                    self.bytes[last] |= 0x80 >> (self.bit % 8);
                }
                self.bit += 1;
            }
        }

        /// BS 0 (`10`)
        fn bs_zero(&mut self) {
            self.push(0b10, 2);
        }

        /// BS via the one-byte form.
        fn bs(&mut self, v: u8) {
            self.push(0b01, 2);
            self.push(v as u64, 8);
        }

        /// BL 0 (`10`)
        fn bl_zero(&mut self) {
            self.push(0b10, 2);
        }

        /// BD 1.0 (`01`)
        fn bd_one(&mut self) {
            self.push(0b01, 2);
        }
    }

    /// R2000 APPID record: MS size, BS type, RL bit size, own handle, no
    /// EED, no reactors, TV name, xref bits, RC, then the handle stream.
    fn appid_record(name: &str) -> Vec<u8> {
        let mut body = Bits::new();
        body.bs(0x43);
        let size_pos = body.bit;
        body.push(0, 32);
        body.push(0x01, 8); // handle code 0, 1 byte
        body.push(0x12, 8);
        body.bs_zero(); // EED end
        body.bl_zero(); // reactors
        body.bs(name.len() as u8);
        for b in name.bytes() {
            body.push(b as u64, 8);
        }
        body.push(0, 1); // 64-flag
        body.bs(1); // xref index + 1
        body.push(0, 1); // xdep
        body.push(0, 8); // RC unknown
        let data_bits = body.bit as u64;
        // owner (soft pointer 4, 1 byte 0x11), xdict (null), xref block (null)
        body.push(0x41, 8);
        body.push(0x11, 8);
        body.push(0x30, 8);
        body.push(0x50, 8);

        let size = data_bits as u32;
        for i in 0..32 {
            let bit = (size.to_le_bytes()[i / 8] >> (7 - i % 8)) & 1;
            let pos = size_pos + i;
            if bit != 0 {
                body.bytes[pos / 8] |= 0x80 >> (pos % 8);
            }
        }

        let mut record = vec![body.bytes.len() as u8, 0];
        record.extend(body.bytes);
        record.extend([0, 0]);
        record
    }

    #[test]
    fn test_table_entry_common_r2000() {
        let data = appid_record("ACAD");
        let classes = ClassTable::new();
        let reader = DwgObjectReader::new(VersionLayout::new(DwgVersion::AC1015), &data, &classes, 30);
        let mut s = reader.open(0x12, 0).unwrap();
        let entry = read_table_entry_common(&mut s).unwrap();
        assert_eq!(entry.handle, Handle::new(0x12));
        assert_eq!(entry.owner, Handle::new(0x11));
        assert_eq!(entry.name, "ACAD");
        assert_eq!(entry.xref_index, 0);
        assert!(!entry.xref_dependent);
        assert!(entry.xdictionary.is_null());
        assert!(entry.xref_block.is_null());
    }

    #[test]
    fn test_extended_data_runs() {
        // R2010 record: compact type 0x43, one EED run, terminator, BD 1.0
        let mut stream = Bits::new();
        stream.push(0b00, 2);
        stream.push(0x43, 8);
        stream.bs(2);
        stream.push(0x01, 8);
        stream.push(0x12, 8);
        stream.push(0xAB, 8);
        stream.push(0xCD, 8);
        stream.bs_zero();
        stream.bd_one();
        stream.push(0, 8);

        let mut data = vec![stream.bytes.len() as u8, 0];
        data.push(0); // MC: no handle stream bits
        data.extend(&stream.bytes);
        data.extend([0, 0]);

        let classes = ClassTable::new();
        let reader = DwgObjectReader::new(VersionLayout::new(DwgVersion::AC1024), &data, &classes, 30);
        let mut s = reader.open(5, 0).unwrap();
        assert_eq!(s.type_code, 0x43);
        let eed = read_extended_data(&mut s).unwrap();
        assert_eq!(eed.len(), 1);
        assert_eq!(eed[0].application, Handle::new(0x12));
        assert_eq!(eed[0].data, vec![0xAB, 0xCD]);
        assert_eq!(s.read_bit_double(), 1.0);
    }
}
