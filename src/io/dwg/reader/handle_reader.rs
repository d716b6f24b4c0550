//! DWG handle section (object map) reader.
//!
//! The `AcDb:Handles` section is a run of sub-sections:
//!
//! ```text
//! RS (big endian)  size, counting itself, of at most 2032 bytes of data
//! repeated:        MC handle delta, signed MC location delta
//! RS (big endian)  CRC-8 of size + data, seed 0xC0C1
//! ```
//!
//! Deltas restart at zero in every sub-section. A sub-section of size 2
//! ends the table. Bytes past the 2032-byte limit of a sub-section are
//! skipped with a warning.

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{DwgError, Result};
use crate::io::dwg::constants::handle_section;
use crate::io::dwg::crc::crc8;
use crate::notification::NotificationCollection;
use crate::types::DwgVersion;

use super::bit_reader::DwgBitReader;

#[derive(Debug, Clone, Copy)]
struct MapSlot {
    location: i64,
    decoded: bool,
}

/// Map from handle to the file (or objects section) offset of its record.
///
/// Entries are consumed as their records are decoded; whatever is left at
/// the end of a run is reported as orphaned.
#[derive(Debug, Clone, Default)]
pub struct ObjectMap {
    entries: IndexMap<u64, MapSlot>,
    remaining: usize,
    subsection_counts: Vec<usize>,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Returns `false` when the handle was already present;
    /// the new location replaces the old one.
    pub fn insert(&mut self, handle: u64, location: i64) -> bool {
        let slot = MapSlot {
            location,
            decoded: false,
        };
        match self.entries.insert(handle, slot) {
            Some(old) => {
                if old.decoded {
                    self.remaining += 1;
                }
                false
            }
            None => {
                self.remaining += 1;
                true
            }
        }
    }

    /// Entries not yet consumed.
    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    /// Entries ever inserted, consumed or not.
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Whether `handle` was ever inserted, consumed or not.
    pub fn is_known(&self, handle: u64) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Whether `handle` is present and not yet consumed.
    pub fn contains(&self, handle: u64) -> bool {
        self.entries.get(&handle).is_some_and(|s| !s.decoded)
    }

    /// Location of a pending handle, without consuming it.
    pub fn location(&self, handle: u64) -> Option<i64> {
        self.entries
            .get(&handle)
            .filter(|s| !s.decoded)
            .map(|s| s.location)
    }

    /// Consume a handle, returning its location.
    pub fn remove(&mut self, handle: u64) -> Option<i64> {
        let slot = self.entries.get_mut(&handle)?;
        if slot.decoded {
            return None;
        }
        slot.decoded = true;
        self.remaining -= 1;
        Some(slot.location)
    }

    /// Pending handles in file order.
    pub fn pending(&self) -> Vec<u64> {
        self.iter().map(|(h, _)| h).collect()
    }

    /// Pending `(handle, location)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, i64)> + '_ {
        self.entries
            .iter()
            .filter(|(_, s)| !s.decoded)
            .map(|(&h, s)| (h, s.location))
    }

    /// Entries read from each non-terminal sub-section.
    pub fn subsection_counts(&self) -> &[usize] {
        &self.subsection_counts
    }
}

/// Reader for the `AcDb:Handles` section.
pub struct DwgHandleReader<'a> {
    data: &'a [u8],
    version: DwgVersion,
}

impl<'a> DwgHandleReader<'a> {
    pub fn new(version: DwgVersion, data: &'a [u8]) -> Self {
        Self { data, version }
    }

    /// Read the object map.
    ///
    /// CRC mismatches, zero deltas and duplicate handles are warnings. A
    /// sub-section running past the end of the data, or a missing
    /// terminal sub-section, is an error.
    pub fn read(&self, notifications: &mut NotificationCollection) -> Result<ObjectMap> {
        let mut map = ObjectMap::new();
        let mut reader = DwgBitReader::new(self.data, self.version);

        loop {
            let start = reader.position();
            let size = reader.read_be_ushort() as usize;
            reader.ensure_good("handle sub-section size")?;
            if size < 2 {
                return Err(DwgError::SectionRead {
                    section: "AcDb:Handles".into(),
                    reason: format!("sub-section at {} has size {}", start, size),
                });
            }
            let end = start + size;
            if end > self.data.len() {
                return Err(DwgError::SectionRead {
                    section: "AcDb:Handles".into(),
                    reason: format!(
                        "sub-section at {} needs {} bytes, {} left",
                        start,
                        size,
                        self.data.len() - start
                    ),
                });
            }
            // Entries are read from at most MAX_CHUNK_SIZE bytes; the CRC
            // still sits at the declared end.
            let mut data_end = end;
            if size - 2 > handle_section::MAX_CHUNK_SIZE {
                data_end = start + 2 + handle_section::MAX_CHUNK_SIZE;
                notifications.warn(format!(
                    "Handle sub-section at {} holds {} bytes, more than {}; the rest is ignored",
                    start,
                    size - 2,
                    handle_section::MAX_CHUNK_SIZE
                ));
            }

            let mut last_handle: u64 = 0;
            let mut last_location: i64 = 0;
            let mut count = 0;
            while reader.position() < data_end {
                let delta = reader.read_modular_char();
                let location_delta = reader.read_signed_modular_char();
                reader.ensure_good("handle map entry")?;
                if reader.position() > end {
                    return Err(DwgError::SectionRead {
                        section: "AcDb:Handles".into(),
                        reason: format!("entry crosses the end of the sub-section at {}", start),
                    });
                }
                last_handle = last_handle.wrapping_add(delta);
                last_location = last_location.wrapping_add(location_delta);
                if delta == 0 {
                    notifications.warn(format!(
                        "Zero handle delta in sub-section at {}, entry skipped",
                        start
                    ));
                    continue;
                }
                if !map.insert(last_handle, last_location) {
                    notifications.warn(format!("Duplicate handle {:#X} in object map", last_handle));
                }
                count += 1;
            }

            reader.set_position(end);
            let computed = crc8(handle_section::CRC_SEED, &self.data[start..end]);
            let stored = reader.read_be_ushort();
            reader.ensure_good("handle sub-section CRC")?;
            if stored != computed {
                notifications.warn(format!(
                    "Handle sub-section CRC mismatch at {}: stored {:#06X}, computed {:#06X}",
                    start, stored, computed
                ));
            }

            if size == 2 {
                break;
            }
            map.subsection_counts.push(count);
        }

        debug!(
            entries = map.total(),
            subsections = map.subsection_counts.len(),
            "read object map"
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_mc(mut value: u64, out: &mut Vec<u8>) {
        loop {
            let b = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                out.push(b);
                return;
            }
            out.push(b | 0x80);
        }
    }

    fn encode_signed_mc(value: i64, out: &mut Vec<u8>) {
        let mut magnitude = value.unsigned_abs();
        loop {
            if magnitude < 0x40 {
                let sign = if value < 0 { 0x40 } else { 0 };
                out.push(magnitude as u8 | sign);
                return;
            }
            out.push((magnitude & 0x7F) as u8 | 0x80);
            magnitude >>= 7;
        }
    }

    fn subsection(entries: &[(u64, i64)]) -> Vec<u8> {
        let mut body = Vec::new();
        for &(dh, dl) in entries {
            encode_mc(dh, &mut body);
            encode_signed_mc(dl, &mut body);
        }
        let size = (body.len() + 2) as u16;
        let mut out = size.to_be_bytes().to_vec();
        out.extend_from_slice(&body);
        let crc = crc8(handle_section::CRC_SEED, &out);
        out.extend_from_slice(&crc.to_be_bytes());
        out
    }

    fn terminal() -> Vec<u8> {
        subsection(&[])
    }

    #[test]
    fn test_empty_section() {
        let data = terminal();
        let mut notes = NotificationCollection::new();
        let map = DwgHandleReader::new(DwgVersion::AC1015, &data).read(&mut notes).unwrap();
        assert!(map.is_empty());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_deltas_accumulate_and_restart() {
        let mut data = subsection(&[(1, 0x100), (2, 0x40), (5, -0x20)]);
        data.extend(subsection(&[(0x20, 0x400)]));
        data.extend(terminal());
        let mut notes = NotificationCollection::new();
        let map = DwgHandleReader::new(DwgVersion::AC1015, &data).read(&mut notes).unwrap();
        assert_eq!(map.location(1), Some(0x100));
        assert_eq!(map.location(3), Some(0x140));
        assert_eq!(map.location(8), Some(0x120));
        assert_eq!(map.location(0x20), Some(0x400));
        assert_eq!(map.subsection_counts(), &[3, 1]);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_crc_mismatch_warns() {
        let mut data = subsection(&[(1, 0x100)]);
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        data.extend(terminal());
        let mut notes = NotificationCollection::new();
        let map = DwgHandleReader::new(DwgVersion::AC1015, &data).read(&mut notes).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_truncated_section_fails() {
        let mut data = subsection(&[(1, 0x100), (1, 0x10)]);
        data.extend(terminal());
        data.pop();
        let mut notes = NotificationCollection::new();
        assert!(DwgHandleReader::new(DwgVersion::AC1015, &data).read(&mut notes).is_err());
    }

    #[test]
    fn test_oversized_subsection_fails() {
        let mut data = subsection(&[(1, 0x100)]);
        data[1] = 0x40;
        let mut notes = NotificationCollection::new();
        assert!(DwgHandleReader::new(DwgVersion::AC1015, &data).read(&mut notes).is_err());
    }

    #[test]
    fn test_oversized_subsection_is_capped() {
        // 700 entries of 3 bytes each: 2100 bytes, past the 2032 limit.
        let entries: Vec<(u64, i64)> = (0..700).map(|_| (1, 0x1000)).collect();
        let mut data = subsection(&entries);
        data.extend(terminal());
        let mut notes = NotificationCollection::new();
        let map = DwgHandleReader::new(DwgVersion::AC1015, &data).read(&mut notes).unwrap();

        let kept = handle_section::MAX_CHUNK_SIZE.div_ceil(3);
        assert_eq!(map.total(), kept);
        assert!(map.is_known(kept as u64));
        assert!(!map.is_known(kept as u64 + 1));
        assert_eq!(map.subsection_counts(), &[kept]);
        assert_eq!(notes.len(), 1);
        assert!(notes.iter().any(|n| n.to_string().contains("is ignored")));
    }

    #[test]
    fn test_known_after_remove() {
        let mut map = ObjectMap::new();
        map.insert(0x10, 100);
        map.remove(0x10);
        assert!(map.is_known(0x10));
        assert!(!map.contains(0x10));
        assert!(!map.is_known(0x11));
    }

    #[test]
    fn test_remove_consumes_once() {
        let mut map = ObjectMap::new();
        map.insert(0x10, 100);
        map.insert(0x11, 200);
        assert_eq!(map.remove(0x10), Some(100));
        assert_eq!(map.remove(0x10), None);
        assert!(!map.contains(0x10));
        assert_eq!(map.len(), 1);
        assert_eq!(map.total(), 2);
        assert_eq!(map.pending(), vec![0x11]);
    }

    #[test]
    fn test_duplicate_insert_reports_false() {
        let mut map = ObjectMap::new();
        assert!(map.insert(5, 1));
        assert!(!map.insert(5, 2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.location(5), Some(2));
    }
}
