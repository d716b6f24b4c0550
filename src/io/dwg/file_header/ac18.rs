//! R2004 and R2010+ file header.
//!
//! The 0x6C bytes at offset 0x80 are masked with an LCG stream. Once
//! unmasked they point at the page map, a system page listing every page
//! of the file by id and size. The section map, itself a page of that map,
//! groups data pages into named sections.

use std::io::{Read, Seek};

use ahash::AHashMap;
use byteorder::{ByteOrder, LittleEndian};
use indexmap::IndexMap;
use tracing::debug;

use super::{checked_size, read_block, read_exact_block, PageInfo, Preamble, SectionInfo};
use crate::error::{DwgError, Result};
use crate::io::dwg::compression::{Decompressor, Lz77Ac18Decompressor};
use crate::io::dwg::constants::ac18;
use crate::io::dwg::crc::page_checksum;
use crate::io::dwg::encryption::{decrypt_data_page_header, decrypt_file_header};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::DwgVersion;

const METADATA_OFFSET: usize = 0x80;
const SECTION_DESCRIPTION_SIZE: usize = 0x60;
const SECTION_PAGE_SIZE: usize = 16;
const COMPRESSION_LZ77: u32 = 2;

/// R2004+ file header.
#[derive(Debug, Clone)]
pub struct DwgFileHeaderAC18 {
    pub version: DwgVersion,
    pub preamble: Preamble,

    pub security_flags: i32,
    pub summary_info_address: u32,
    pub vba_project_address: u32,

    pub root_tree_node_gap: i32,
    pub left_gap: i32,
    pub right_gap: i32,
    pub last_page_id: i32,
    pub last_section_address: u64,
    pub second_header_address: u64,
    pub gap_amount: u32,
    pub section_amount: u32,
    pub page_map_id: u32,
    /// Absolute file offset of the page map.
    pub page_map_address: u64,
    pub section_map_id: u32,
    pub section_page_array_size: u32,
    pub gap_array_size: u32,
    pub crc: u32,

    /// Page map: page id to location.
    pub pages: AHashMap<i64, PageInfo>,
    pub sections: IndexMap<String, SectionInfo>,
}

impl DwgFileHeaderAC18 {
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut R,
        version: DwgVersion,
        preamble: Preamble,
        notifications: &mut NotificationCollection,
    ) -> Result<Self> {
        let mut bytes = read_exact_block(
            reader,
            0,
            METADATA_OFFSET + ac18::ENCRYPTED_HEADER_SIZE,
            "file header",
        )?;
        let security_flags = LittleEndian::read_i32(&bytes[0x18..]);
        let summary_info_address = LittleEndian::read_u32(&bytes[0x20..]);
        let vba_project_address = LittleEndian::read_u32(&bytes[0x24..]);

        let meta = &mut bytes[METADATA_OFFSET..];
        decrypt_file_header(meta);
        if &meta[..ac18::FILE_ID.len()] != ac18::FILE_ID {
            notifications.warn("File header identification string mismatch");
        }

        let mut header = Self {
            version,
            preamble,
            security_flags,
            summary_info_address,
            vba_project_address,
            root_tree_node_gap: LittleEndian::read_i32(&meta[0x18..]),
            left_gap: LittleEndian::read_i32(&meta[0x1C..]),
            right_gap: LittleEndian::read_i32(&meta[0x20..]),
            last_page_id: LittleEndian::read_i32(&meta[0x28..]),
            last_section_address: LittleEndian::read_u64(&meta[0x2C..]),
            second_header_address: LittleEndian::read_u64(&meta[0x34..]),
            gap_amount: LittleEndian::read_u32(&meta[0x3C..]),
            section_amount: LittleEndian::read_u32(&meta[0x40..]),
            page_map_id: LittleEndian::read_u32(&meta[0x50..]),
            page_map_address: LittleEndian::read_u64(&meta[0x54..])
                .wrapping_add(ac18::PAGE_BASE_ADDRESS),
            section_map_id: LittleEndian::read_u32(&meta[0x5C..]),
            section_page_array_size: LittleEndian::read_u32(&meta[0x60..]),
            gap_array_size: LittleEndian::read_u32(&meta[0x64..]),
            crc: LittleEndian::read_u32(&meta[0x68..]),
            pages: AHashMap::new(),
            sections: IndexMap::new(),
        };

        let page_map = read_system_page(
            reader,
            header.page_map_address,
            ac18::PAGE_TYPE_PAGE_MAP,
            notifications,
        )?;
        header.pages = parse_page_map(&page_map);

        let section_map_address = header
            .pages
            .get(&(header.section_map_id as i64))
            .map(|p| p.address)
            .ok_or_else(|| {
                DwgError::InvalidMetadata(format!(
                    "section map page {} missing from the page map",
                    header.section_map_id
                ))
            })?;
        let section_map = read_system_page(
            reader,
            section_map_address,
            ac18::PAGE_TYPE_SECTION_MAP,
            notifications,
        )?;
        header.sections = parse_section_map(&section_map, &header.pages, notifications)?;

        debug!(
            pages = header.pages.len(),
            sections = header.sections.len(),
            "read R2004+ page and section maps"
        );
        Ok(header)
    }

    pub(crate) fn read_section<R: Read + Seek>(
        &self,
        reader: &mut R,
        name: &str,
        notifications: &mut NotificationCollection,
    ) -> Result<Vec<u8>> {
        let section = self.sections.get(name).ok_or_else(|| DwgError::SectionRead {
            section: name.to_string(),
            reason: "not listed in the section map".into(),
        })?;
        if section.encrypted {
            notifications.notify(
                NotificationType::NotSupported,
                format!("Section {} is encrypted, reading it as plain data", name),
            );
        }

        let size = checked_size(section.size, name)?;
        let mut buffer = vec![0u8; size];
        for page in section.pages.iter().filter(|p| !p.is_gap()) {
            let raw = read_exact_block(reader, page.address, ac18::DATA_PAGE_HEADER_SIZE, name)?;
            let mut encrypted = [0u8; 32];
            encrypted.copy_from_slice(&raw);
            let page_header = decrypt_data_page_header(&encrypted, page.address);
            if page_header.page_type != ac18::PAGE_TYPE_DATA {
                return Err(DwgError::SectionRead {
                    section: name.to_string(),
                    reason: format!(
                        "page {} at {:#X} has type {:#010X}",
                        page.id, page.address, page_header.page_type
                    ),
                });
            }

            let mut compressed = page_header.compressed_size.max(0) as u64;
            if page.size > ac18::DATA_PAGE_HEADER_SIZE as u64 {
                compressed = compressed.min(page.size - ac18::DATA_PAGE_HEADER_SIZE as u64);
            }
            let data = read_block(
                reader,
                page.address + ac18::DATA_PAGE_HEADER_SIZE as u64,
                checked_size(compressed, name)?,
            )?;
            let checksum = page_checksum(0, &data);
            if checksum != page_header.data_checksum {
                notifications.warn(format!(
                    "Data checksum mismatch in {} page {}: stored {:#010X}, computed {:#010X}",
                    name, page.id, page_header.data_checksum, checksum
                ));
            }

            let start = page.start_offset as usize;
            if start >= buffer.len() {
                notifications.warn(format!(
                    "Page {} of {} starts at {} past the section end {}",
                    page.id,
                    name,
                    start,
                    buffer.len()
                ));
                continue;
            }
            let end = (start + page.uncompressed_size as usize).min(buffer.len());
            let dest = &mut buffer[start..end];
            let written = if section.compressed {
                Lz77Ac18Decompressor
                    .decompress_into(&data, dest)
                    .map_err(|e| DwgError::SectionRead {
                        section: name.to_string(),
                        reason: e.to_string(),
                    })?
            } else {
                let n = data.len().min(dest.len());
                dest[..n].copy_from_slice(&data[..n]);
                n
            };
            debug!(section = name, page = page.id, compressed, written, "assembled page");
        }
        Ok(buffer)
    }
}

/// Read a page map or section map page and return its decompressed data.
fn read_system_page<R: Read + Seek>(
    reader: &mut R,
    address: u64,
    expected_type: u32,
    notifications: &mut NotificationCollection,
) -> Result<Vec<u8>> {
    let mut header =
        read_exact_block(reader, address, ac18::SYSTEM_PAGE_HEADER_SIZE, "system page header")?;
    let page_type = LittleEndian::read_u32(&header[0..4]);
    if page_type != expected_type {
        return Err(DwgError::InvalidMetadata(format!(
            "system page at {:#X}: expected type {:#010X}, found {:#010X}",
            address, expected_type, page_type
        )));
    }
    let decompressed_size = LittleEndian::read_u32(&header[4..8]) as u64;
    let compressed_size = LittleEndian::read_u32(&header[8..12]) as u64;
    let compression = LittleEndian::read_u32(&header[12..16]);
    let stored = LittleEndian::read_u32(&header[16..20]);

    let data = read_exact_block(
        reader,
        address + ac18::SYSTEM_PAGE_HEADER_SIZE as u64,
        checked_size(compressed_size, "system page")?,
        "system page",
    )?;

    header[16..20].fill(0);
    let computed = page_checksum(page_checksum(0, &header), &data);
    if computed != stored {
        notifications.warn(format!(
            "System page checksum mismatch at {:#X}: stored {:#010X}, computed {:#010X}",
            address, stored, computed
        ));
    }

    if compression == COMPRESSION_LZ77 {
        Lz77Ac18Decompressor.decompress(&data, checked_size(decompressed_size, "system page")?)
    } else {
        Ok(data)
    }
}

/// Parse the page map: `(id, size)` pairs with running addresses. Gap
/// entries (negative id) carry four more words.
fn parse_page_map(data: &[u8]) -> AHashMap<i64, PageInfo> {
    let mut pages = AHashMap::new();
    let mut address = ac18::PAGE_BASE_ADDRESS;
    let mut pos = 0;
    while pos + 8 <= data.len() {
        let id = LittleEndian::read_i32(&data[pos..]) as i64;
        let size = LittleEndian::read_i32(&data[pos + 4..]).max(0) as u64;
        pos += 8;
        if id < 0 {
            pos += 16;
        }
        pages.insert(
            id,
            PageInfo {
                id,
                address,
                size,
                ..Default::default()
            },
        );
        address += size;
    }
    pages
}

fn parse_section_map(
    data: &[u8],
    pages: &AHashMap<i64, PageInfo>,
    notifications: &mut NotificationCollection,
) -> Result<IndexMap<String, SectionInfo>> {
    if data.len() < 20 {
        return Err(DwgError::InvalidMetadata("section map too short".into()));
    }
    let count = LittleEndian::read_i32(&data[0..4]).max(0) as usize;
    let mut sections = IndexMap::new();
    let mut pos = 20;

    for _ in 0..count {
        if pos + SECTION_DESCRIPTION_SIZE > data.len() {
            notifications.warn("Section map ends inside a section description");
            break;
        }
        let d = &data[pos..pos + SECTION_DESCRIPTION_SIZE];
        let size = LittleEndian::read_u64(&d[0..8]);
        let page_count = LittleEndian::read_i32(&d[8..12]).max(0) as usize;
        let max_size = LittleEndian::read_i32(&d[12..16]).max(0) as u64;
        let compressed = LittleEndian::read_i32(&d[20..24]) == 2;
        let id = LittleEndian::read_i32(&d[24..28]);
        let encrypted = LittleEndian::read_i32(&d[28..32]) == 1;
        let raw_name = &d[32..96];
        let name_len = raw_name.iter().position(|&b| b == 0).unwrap_or(raw_name.len());
        let name = String::from_utf8_lossy(&raw_name[..name_len]).into_owned();
        pos += SECTION_DESCRIPTION_SIZE;

        let mut section = SectionInfo {
            id,
            name,
            compressed,
            encrypted,
            size,
            max_size,
            encoding: 0,
            pages: Vec::with_capacity(page_count.min(1024)),
        };
        for _ in 0..page_count {
            if pos + SECTION_PAGE_SIZE > data.len() {
                notifications.warn(format!("Section map truncated in {}", section.name));
                break;
            }
            let page_id = LittleEndian::read_i32(&data[pos..]) as i64;
            let data_size = LittleEndian::read_i32(&data[pos + 4..]).max(0) as u64;
            let start_offset = LittleEndian::read_u64(&data[pos + 8..]);
            pos += SECTION_PAGE_SIZE;

            let Some(location) = pages.get(&page_id) else {
                notifications.warn(format!(
                    "Page {} of {} is not in the page map",
                    page_id, section.name
                ));
                continue;
            };
            section.pages.push(PageInfo {
                id: page_id,
                address: location.address,
                size: location.size,
                compressed_size: data_size,
                uncompressed_size: max_size.min(size.saturating_sub(start_offset)),
                start_offset,
            });
        }

        if !section.name.is_empty() {
            sections.insert(section.name.clone(), section);
        }
    }
    Ok(sections)
}
