//! DWG file header: the section directory of each release family.
//!
//! Three incompatible layouts locate the named sections of a file:
//! - [`DwgFileHeaderAC15`]: R13-R2000 flat locator table
//! - [`DwgFileHeaderAC18`]: R2004 and R2010+ encrypted header with page and
//!   section maps
//! - [`DwgFileHeaderAC21`]: R2007 Reed-Solomon protected, compressed maps
//!
//! [`DwgFileHeader`] dispatches on the version tag and assembles a named
//! section into one flat, decompressed buffer.

mod ac15;
mod ac18;
mod ac21;

pub use ac15::{DwgFileHeaderAC15, SectionLocatorRecord};
pub use ac18::DwgFileHeaderAC18;
pub use ac21::DwgFileHeaderAC21;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DwgError, Result};
use crate::notification::NotificationCollection;
use crate::types::DwgVersion;

use super::layout::{DirectoryKind, VersionLayout};

/// Upper bound on any size taken from the file before allocating for it.
pub(crate) const MAX_SECTION_SIZE: u64 = 0x4000_0000;

/// One page of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageInfo {
    /// Page id in the page map. Negative ids are gaps.
    pub id: i64,
    /// Absolute file offset of the page.
    pub address: u64,
    /// Bytes the page occupies in the file.
    pub size: u64,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    /// Offset of the page data within the assembled section.
    pub start_offset: u64,
}

impl PageInfo {
    pub fn is_gap(&self) -> bool {
        self.id < 0
    }
}

/// A named section and its pages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SectionInfo {
    pub id: i32,
    pub name: String,
    pub compressed: bool,
    pub encrypted: bool,
    /// Total uncompressed size.
    pub size: u64,
    /// Maximum uncompressed size of one page.
    pub max_size: u64,
    /// Page data encoding (R2007; 4 means Reed-Solomon interleaved).
    pub encoding: u64,
    pub pages: Vec<PageInfo>,
}

/// Parsed file header, one variant per directory layout.
#[derive(Debug, Clone)]
pub enum DwgFileHeader {
    AC15(DwgFileHeaderAC15),
    AC18(DwgFileHeaderAC18),
    AC21(DwgFileHeaderAC21),
}

impl DwgFileHeader {
    /// Read the file header of `version` from the start of `reader`.
    ///
    /// Unreadable metadata (page map, section map, locator table) is an
    /// `Err`; checksum mismatches are warnings.
    pub fn read<R: Read + Seek>(
        reader: &mut R,
        version: DwgVersion,
        notifications: &mut NotificationCollection,
    ) -> Result<Self> {
        let preamble = Preamble::read(reader)?;
        match VersionLayout::new(version).directory {
            DirectoryKind::Flat => Ok(DwgFileHeader::AC15(DwgFileHeaderAC15::read(
                reader,
                version,
                preamble,
                notifications,
            )?)),
            DirectoryKind::Paged => Ok(DwgFileHeader::AC18(DwgFileHeaderAC18::read(
                reader,
                version,
                preamble,
                notifications,
            )?)),
            DirectoryKind::ReedSolomon => Ok(DwgFileHeader::AC21(DwgFileHeaderAC21::read(
                reader,
                version,
                preamble,
                notifications,
            )?)),
        }
    }

    fn preamble(&self) -> &Preamble {
        match self {
            DwgFileHeader::AC15(h) => &h.preamble,
            DwgFileHeader::AC18(h) => &h.preamble,
            DwgFileHeader::AC21(h) => &h.preamble,
        }
    }

    pub fn version(&self) -> DwgVersion {
        match self {
            DwgFileHeader::AC15(h) => h.version,
            DwgFileHeader::AC18(h) => h.version,
            DwgFileHeader::AC21(h) => h.version,
        }
    }

    pub fn maintenance_version(&self) -> u8 {
        self.preamble().maintenance_version
    }

    pub fn code_page(&self) -> u16 {
        self.preamble().code_page
    }

    pub fn preview_address(&self) -> i64 {
        self.preamble().preview_address
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&SectionInfo> {
        match self {
            DwgFileHeader::AC15(h) => h.section(name),
            DwgFileHeader::AC18(h) => h.sections.get(name),
            DwgFileHeader::AC21(h) => h.sections.get(name),
        }
    }

    /// Names of every section the directory lists.
    pub fn section_names(&self) -> Vec<String> {
        match self {
            DwgFileHeader::AC15(h) => h.sections.iter().map(|s| s.name.clone()).collect(),
            DwgFileHeader::AC18(h) => h.sections.keys().cloned().collect(),
            DwgFileHeader::AC21(h) => h.sections.keys().cloned().collect(),
        }
    }

    /// Assemble the named section into one flat buffer.
    ///
    /// Pre-2004 object data is addressed by absolute file offsets, so the
    /// objects section of those files is the whole file.
    pub fn read_section<R: Read + Seek>(
        &self,
        reader: &mut R,
        name: &str,
        notifications: &mut NotificationCollection,
    ) -> Result<Vec<u8>> {
        match self {
            DwgFileHeader::AC15(h) => h.read_section(reader, name),
            DwgFileHeader::AC18(h) => h.read_section(reader, name, notifications),
            DwgFileHeader::AC21(h) => h.read_section(reader, name, notifications),
        }
    }
}

/// Fields shared by every layout at the start of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preamble {
    pub maintenance_version: u8,
    pub preview_address: i64,
    pub app_version: u8,
    pub app_maintenance_version: u8,
    pub code_page: u16,
}

impl Preamble {
    pub(crate) const SIZE: usize = 0x15;

    fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let bytes = read_block(reader, 0, Self::SIZE)?;
        if bytes.len() < Self::SIZE {
            return Err(DwgError::InvalidHeader(format!(
                "file is {} bytes, too short for a file header",
                bytes.len()
            )));
        }
        Ok(Self::parse(&bytes))
    }

    pub(crate) fn parse(bytes: &[u8]) -> Self {
        Self {
            maintenance_version: bytes[0x0B],
            preview_address: LittleEndian::read_i32(&bytes[0x0D..0x11]) as i64,
            app_version: bytes[0x11],
            app_maintenance_version: bytes[0x12],
            code_page: LittleEndian::read_u16(&bytes[0x13..0x15]),
        }
    }
}

/// Read up to `len` bytes at `offset`. Short files yield a short buffer.
pub(crate) fn read_block<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>> {
    if len as u64 > MAX_SECTION_SIZE {
        return Err(DwgError::InvalidMetadata(format!(
            "refusing to read {} bytes at {:#X}",
            len, offset
        )));
    }
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = Vec::with_capacity(len.min(0x10_0000));
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
    Ok(buf)
}

/// Read exactly `len` bytes at `offset`, failing on a short file.
pub(crate) fn read_exact_block<R: Read + Seek>(
    reader: &mut R,
    offset: u64,
    len: usize,
    what: &str,
) -> Result<Vec<u8>> {
    let buf = read_block(reader, offset, len)?;
    if buf.len() < len {
        return Err(DwgError::InvalidMetadata(format!(
            "{} at {:#X} truncated: {} of {} bytes",
            what,
            offset,
            buf.len(),
            len
        )));
    }
    Ok(buf)
}

/// Check a size taken from the file against [`MAX_SECTION_SIZE`].
pub(crate) fn checked_size(size: u64, what: &str) -> Result<usize> {
    if size > MAX_SECTION_SIZE {
        Err(DwgError::InvalidMetadata(format!("{} size {} is implausible", what, size)))
    } else {
        Ok(size as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_preamble_fields() {
        let mut bytes = vec![0u8; Preamble::SIZE];
        bytes[..6].copy_from_slice(b"AC1018");
        bytes[0x0B] = 3;
        LittleEndian::write_i32(&mut bytes[0x0D..0x11], 0x1C0);
        bytes[0x11] = 0x19;
        LittleEndian::write_u16(&mut bytes[0x13..0x15], 30);
        let p = Preamble::parse(&bytes);
        assert_eq!(p.maintenance_version, 3);
        assert_eq!(p.preview_address, 0x1C0);
        assert_eq!(p.app_version, 0x19);
        assert_eq!(p.code_page, 30);
    }

    #[test]
    fn test_short_file_is_header_error() {
        let mut cursor = Cursor::new(b"AC1015".to_vec());
        let mut notes = NotificationCollection::new();
        let err = DwgFileHeader::read(&mut cursor, DwgVersion::AC1015, &mut notes).unwrap_err();
        assert!(matches!(err, DwgError::InvalidHeader(_)));
    }

    #[test]
    fn test_read_block_is_clamped_to_file() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4]);
        assert_eq!(read_block(&mut cursor, 2, 10).unwrap(), vec![3, 4]);
        assert!(read_exact_block(&mut cursor, 2, 10, "page").is_err());
    }

    #[test]
    fn test_gap_page() {
        let page = PageInfo {
            id: -3,
            ..Default::default()
        };
        assert!(page.is_gap());
    }

    #[test]
    fn test_checked_size_rejects_huge() {
        assert!(checked_size(MAX_SECTION_SIZE + 1, "x").is_err());
        assert_eq!(checked_size(16, "x").unwrap(), 16);
    }
}
