//! R13-R2000 file header: a flat locator table.
//!
//! ```text
//! 0x00  6 bytes   version tag
//! 0x0B  RC        maintenance version
//! 0x0D  RL        preview address
//! 0x13  RS        code page
//! 0x15  RL        record count
//! 0x19  n x 9     (RC number, RL address, RL size)
//!       RS        CRC-8 of everything above, XORed by a count constant
//!       16 bytes  end sentinel
//! ```

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;

use super::{read_block, read_exact_block, PageInfo, Preamble, SectionInfo};
use crate::error::{DwgError, Result};
use crate::io::dwg::constants::{ac15, section_names, sentinels};
use crate::io::dwg::crc::crc8;
use crate::io::dwg::layout::VersionLayout;
use crate::notification::NotificationCollection;
use crate::types::DwgVersion;

const RECORD_SIZE: usize = 9;
const MAX_RECORDS: i32 = 32;

/// One entry of the locator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLocatorRecord {
    pub number: u8,
    pub address: u64,
    pub size: u64,
}

/// Pre-2004 file header.
#[derive(Debug, Clone)]
pub struct DwgFileHeaderAC15 {
    pub version: DwgVersion,
    pub preamble: Preamble,
    pub records: Vec<SectionLocatorRecord>,
    /// Records with a known name, as single-page sections.
    pub sections: Vec<SectionInfo>,
}

impl DwgFileHeaderAC15 {
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut R,
        version: DwgVersion,
        preamble: Preamble,
        notifications: &mut NotificationCollection,
    ) -> Result<Self> {
        let table_start = ac15::RECORD_COUNT_OFFSET as usize + 4;
        let head = read_exact_block(reader, 0, table_start, "locator table")?;
        let count = LittleEndian::read_i32(&head[ac15::RECORD_COUNT_OFFSET as usize..]);
        if !(0..=MAX_RECORDS).contains(&count) {
            return Err(DwgError::InvalidMetadata(format!(
                "locator record count {} out of range",
                count
            )));
        }

        let crc_end = table_start + count as usize * RECORD_SIZE;
        let bytes = read_exact_block(reader, 0, crc_end + 2 + 16, "locator table")?;

        let mut records = Vec::with_capacity(count as usize);
        for chunk in bytes[table_start..crc_end].chunks_exact(RECORD_SIZE) {
            records.push(SectionLocatorRecord {
                number: chunk[0],
                address: LittleEndian::read_u32(&chunk[1..5]) as u64,
                size: LittleEndian::read_u32(&chunk[5..9]) as u64,
            });
        }

        let expected = crc8(0, &bytes[..crc_end]) ^ ac15::crc_xor(count);
        let stored = LittleEndian::read_u16(&bytes[crc_end..crc_end + 2]);
        if expected != stored {
            notifications.warn(format!(
                "File header CRC mismatch: stored {:#06X}, computed {:#06X}",
                stored, expected
            ));
        }

        let mut sentinel = [0u8; 16];
        sentinel.copy_from_slice(&bytes[crc_end + 2..crc_end + 18]);
        VersionLayout::check_sentinel(
            &sentinel,
            &sentinels::FILE_HEADER_END_AC15,
            "file header",
            notifications,
        );

        let sections = records
            .iter()
            .filter_map(|r| {
                section_names::locator_name(r.number).map(|name| SectionInfo {
                    id: r.number as i32,
                    name: name.to_string(),
                    size: r.size,
                    max_size: r.size,
                    pages: vec![PageInfo {
                        id: r.number as i64,
                        address: r.address,
                        size: r.size,
                        compressed_size: r.size,
                        uncompressed_size: r.size,
                        start_offset: 0,
                    }],
                    ..Default::default()
                })
            })
            .collect();

        debug!(count, "read pre-2004 locator table");
        Ok(Self {
            version,
            preamble,
            records,
            sections,
        })
    }

    pub fn section(&self, name: &str) -> Option<&SectionInfo> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub(crate) fn read_section<R: Read + Seek>(&self, reader: &mut R, name: &str) -> Result<Vec<u8>> {
        if name == section_names::ACDB_OBJECTS {
            reader.seek(SeekFrom::Start(0))?;
            let mut all = Vec::new();
            reader.read_to_end(&mut all)?;
            return Ok(all);
        }
        let section = self.section(name).ok_or_else(|| DwgError::SectionRead {
            section: name.to_string(),
            reason: "not listed in the locator table".into(),
        })?;
        let page = section.pages[0];
        let data = read_block(reader, page.address, super::checked_size(page.size, name)?)?;
        if (data.len() as u64) < page.size {
            return Err(DwgError::SectionRead {
                section: name.to_string(),
                reason: format!("{} of {} bytes present", data.len(), page.size),
            });
        }
        Ok(data)
    }
}
