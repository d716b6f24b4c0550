//! R2007 file header.
//!
//! The block at 0x80 is three interleaved (255,239) Reed-Solomon codewords.
//! Once corrected it holds a small frame and the compressed metadata: 34
//! 64-bit fields locating the page map and the section map. Both maps are
//! system pages, themselves RS protected and compressed. Data pages use the
//! (255,251) code when their section's encoding is 4.

use std::io::{Read, Seek};

use ahash::AHashMap;
use byteorder::{ByteOrder, LittleEndian};
use indexmap::IndexMap;
use tracing::debug;

use super::{checked_size, read_block, read_exact_block, PageInfo, Preamble, SectionInfo};
use crate::error::{DwgError, Result};
use crate::io::dwg::compression::{Decompressor, Lz77Ac21Decompressor};
use crate::io::dwg::constants::ac21;
use crate::io::dwg::reed_solomon::{decode_239i, decode_251i, DecodeOutcome, CODEWORD_SIZE};
use crate::notification::NotificationCollection;
use crate::types::DwgVersion;

const HEADER_OFFSET: u64 = 0x80;
const FRAME_SIZE: usize = 32;
const SECTION_FIELDS_SIZE: usize = 64;
const SECTION_PAGE_SIZE: usize = 56;
const MAX_CORRECTION_FACTOR: u64 = 64;

/// The decompressed R2007 metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompressedMetadata {
    pub header_size: u64,
    pub file_size: u64,
    pub pages_map_crc_compressed: u64,
    pub pages_map_correction_factor: u64,
    pub pages_map_crc_seed: u64,
    pub pages_map2_offset: u64,
    pub pages_map2_id: u64,
    pub pages_map_offset: u64,
    pub pages_map_id: u64,
    pub header2_offset: u64,
    pub pages_map_size_compressed: u64,
    pub pages_map_size_uncompressed: u64,
    pub pages_amount: u64,
    pub pages_max_id: u64,
    pub pages_map_crc_uncompressed: u64,
    pub sections_amount: u64,
    pub sections_map_crc_uncompressed: u64,
    pub sections_map_size_compressed: u64,
    pub sections_map2_id: u64,
    pub sections_map_id: u64,
    pub sections_map_size_uncompressed: u64,
    pub sections_map_crc_compressed: u64,
    pub sections_map_correction_factor: u64,
    pub sections_map_crc_seed: u64,
    pub stream_version: u64,
    pub crc_seed: u64,
    pub crc_seed_encoded: u64,
    pub random_seed: u64,
    pub header_crc64: u64,
}

impl CompressedMetadata {
    /// Parse the 0x110-byte block. Missing bytes read as zero.
    pub fn parse(bytes: &[u8]) -> Self {
        let field = |i: usize| {
            bytes
                .get(i * 8..i * 8 + 8)
                .map(LittleEndian::read_u64)
                .unwrap_or(0)
        };
        Self {
            header_size: field(0),
            file_size: field(1),
            pages_map_crc_compressed: field(2),
            pages_map_correction_factor: field(3),
            pages_map_crc_seed: field(4),
            pages_map2_offset: field(5),
            pages_map2_id: field(6),
            pages_map_offset: field(7),
            pages_map_id: field(8),
            header2_offset: field(9),
            pages_map_size_compressed: field(10),
            pages_map_size_uncompressed: field(11),
            pages_amount: field(12),
            pages_max_id: field(13),
            pages_map_crc_uncompressed: field(16),
            sections_amount: field(20),
            sections_map_crc_uncompressed: field(21),
            sections_map_size_compressed: field(22),
            sections_map2_id: field(23),
            sections_map_id: field(24),
            sections_map_size_uncompressed: field(25),
            sections_map_crc_compressed: field(26),
            sections_map_correction_factor: field(27),
            sections_map_crc_seed: field(28),
            stream_version: field(29),
            crc_seed: field(30),
            crc_seed_encoded: field(31),
            random_seed: field(32),
            header_crc64: field(33),
        }
    }
}

/// R2007 file header.
#[derive(Debug, Clone)]
pub struct DwgFileHeaderAC21 {
    pub version: DwgVersion,
    pub preamble: Preamble,
    pub metadata: CompressedMetadata,
    pub pages: AHashMap<i64, PageInfo>,
    pub sections: IndexMap<String, SectionInfo>,
}

impl DwgFileHeaderAC21 {
    pub(crate) fn read<R: Read + Seek>(
        reader: &mut R,
        version: DwgVersion,
        preamble: Preamble,
        notifications: &mut NotificationCollection,
    ) -> Result<Self> {
        let raw = read_exact_block(
            reader,
            HEADER_OFFSET,
            ac21::RS_ENCODED_BLOCK_SIZE,
            "file header",
        )?;
        let decoded = decode_239i(&raw, ac21::HEADER_CODEWORDS);
        report_rs(&decoded, "file header", notifications);
        let frame = &decoded.data;

        let compressed_len = LittleEndian::read_i32(&frame[24..28]);
        let body = &frame[FRAME_SIZE..];
        let meta_bytes = if compressed_len < 0 {
            let n = (compressed_len.unsigned_abs() as usize).min(body.len());
            body[..n].to_vec()
        } else {
            let n = compressed_len as usize;
            if n > body.len() {
                notifications.warn(format!(
                    "File header compressed length {} exceeds the block, clamping",
                    n
                ));
            }
            Lz77Ac21Decompressor.decompress(&body[..n.min(body.len())], ac21::DECOMPRESSED_HEADER_SIZE)?
        };
        let metadata = CompressedMetadata::parse(&meta_bytes);

        let page_map = read_system_page(
            reader,
            metadata.pages_map_offset.wrapping_add(ac21::DATA_PAGE_BASE_OFFSET),
            metadata.pages_map_size_compressed,
            metadata.pages_map_size_uncompressed,
            metadata.pages_map_correction_factor,
            "page map",
            notifications,
        )?;
        let pages = parse_page_map(&page_map);

        let section_map_address = pages
            .get(&(metadata.sections_map_id as i64))
            .map(|p| p.address)
            .ok_or_else(|| {
                DwgError::InvalidMetadata(format!(
                    "section map page {} missing from the page map",
                    metadata.sections_map_id
                ))
            })?;
        let section_map = read_system_page(
            reader,
            section_map_address,
            metadata.sections_map_size_compressed,
            metadata.sections_map_size_uncompressed,
            metadata.sections_map_correction_factor,
            "section map",
            notifications,
        )?;
        let sections = parse_section_map(&section_map, &pages, notifications);

        debug!(
            pages = pages.len(),
            sections = sections.len(),
            "read R2007 page and section maps"
        );
        Ok(Self {
            version,
            preamble,
            metadata,
            pages,
            sections,
        })
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
        let size = checked_size(section.size, name)?;
        let mut buffer = vec![0u8; size];

        for page in section.pages.iter().filter(|p| !p.is_gap()) {
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
            let data = if section.encoding == ac21::PAGE_ENCODING_RS {
                let blocks = (align8(page.compressed_size) as usize).div_ceil(251);
                let raw = read_block(reader, page.address, checked_size((blocks * CODEWORD_SIZE) as u64, name)?)?;
                let decoded = decode_251i(&raw, blocks);
                report_rs(&decoded, name, notifications);
                decoded.data
            } else {
                read_block(reader, page.address, checked_size(page.compressed_size, name)?)?
            };

            let end = (start + page.uncompressed_size as usize).min(buffer.len());
            let dest = &mut buffer[start..end];
            let compressed = (page.compressed_size as usize).min(data.len());
            if page.compressed_size < page.uncompressed_size {
                Lz77Ac21Decompressor
                    .decompress_into(&data[..compressed], dest)
                    .map_err(|e| DwgError::SectionRead {
                        section: name.to_string(),
                        reason: e.to_string(),
                    })?;
            } else {
                let n = compressed.min(dest.len());
                dest[..n].copy_from_slice(&data[..n]);
            }
            debug!(section = name, page = page.id, size = page.uncompressed_size, "assembled page");
        }
        Ok(buffer)
    }
}

fn align8(size: u64) -> u64 {
    (size + 7) & !7
}

fn report_rs(outcome: &DecodeOutcome, what: &str, notifications: &mut NotificationCollection) {
    if outcome.failed_blocks > 0 {
        notifications.warn(format!(
            "Reed-Solomon correction failed for {} of the codewords in {}",
            outcome.failed_blocks, what
        ));
    } else if outcome.corrected > 0 {
        debug!(what, corrected = outcome.corrected, "corrected Reed-Solomon errors");
    }
}

/// Read an RS protected, compressed system page.
fn read_system_page<R: Read + Seek>(
    reader: &mut R,
    address: u64,
    compressed_size: u64,
    uncompressed_size: u64,
    correction_factor: u64,
    what: &str,
    notifications: &mut NotificationCollection,
) -> Result<Vec<u8>> {
    if correction_factor == 0 || correction_factor > MAX_CORRECTION_FACTOR {
        return Err(DwgError::InvalidMetadata(format!(
            "{} correction factor {} out of range",
            what, correction_factor
        )));
    }
    let compressed = checked_size(compressed_size, what)?;
    let uncompressed = checked_size(uncompressed_size, what)?;
    let blocks = (align8(compressed_size) * correction_factor).div_ceil(239) as usize;
    let raw = read_exact_block(reader, address, checked_size((blocks * CODEWORD_SIZE) as u64, what)?, what)?;
    let decoded = decode_239i(&raw, blocks);
    report_rs(&decoded, what, notifications);

    let data = &decoded.data[..compressed.min(decoded.data.len())];
    if compressed >= uncompressed {
        let mut out = data.to_vec();
        out.resize(uncompressed, 0);
        Ok(out)
    } else {
        Lz77Ac21Decompressor.decompress(data, uncompressed)
    }
}

/// Parse the page map: `(size, id)` pairs with running addresses from the
/// data page base.
fn parse_page_map(data: &[u8]) -> AHashMap<i64, PageInfo> {
    let mut pages = AHashMap::new();
    let mut address = ac21::DATA_PAGE_BASE_OFFSET;
    for entry in data.chunks_exact(16) {
        let size = LittleEndian::read_u64(&entry[0..8]);
        let id = LittleEndian::read_i64(&entry[8..16]);
        pages.insert(
            id.abs(),
            PageInfo {
                id,
                address,
                size,
                ..Default::default()
            },
        );
        address = address.wrapping_add(size);
    }
    pages
}

fn parse_section_map(
    data: &[u8],
    pages: &AHashMap<i64, PageInfo>,
    notifications: &mut NotificationCollection,
) -> IndexMap<String, SectionInfo> {
    let mut sections = IndexMap::new();
    let mut pos = 0;
    while pos + SECTION_FIELDS_SIZE <= data.len() {
        let field = |i: usize| LittleEndian::read_u64(&data[pos + i * 8..]);
        let size = field(0);
        let max_size = field(1);
        let encrypted = field(2) != 0;
        let name_length = field(4) as usize;
        let encoding = field(6);
        let page_count = field(7) as usize;
        pos += SECTION_FIELDS_SIZE;

        if name_length > data.len() - pos {
            notifications.warn("Section map ends inside a section name");
            break;
        }
        let units: Vec<u16> = data[pos..pos + name_length]
            .chunks_exact(2)
            .map(LittleEndian::read_u16)
            .take_while(|&u| u != 0)
            .collect();
        let name = String::from_utf16_lossy(&units);
        pos += name_length;

        let mut section = SectionInfo {
            id: sections.len() as i32,
            name,
            compressed: true,
            encrypted,
            size,
            max_size,
            encoding,
            pages: Vec::with_capacity(page_count.min(1024)),
        };
        for _ in 0..page_count {
            if pos + SECTION_PAGE_SIZE > data.len() {
                notifications.warn(format!("Section map truncated in {}", section.name));
                break;
            }
            let page_field = |i: usize| LittleEndian::read_u64(&data[pos + i * 8..]);
            let start_offset = page_field(0);
            let page_id = page_field(2) as i64;
            let uncompressed_size = page_field(3);
            let compressed_size = page_field(4);
            pos += SECTION_PAGE_SIZE;

            let Some(location) = pages.get(&page_id.abs()) else {
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
                compressed_size,
                uncompressed_size,
                start_offset,
            });
        }

        if !section.name.is_empty() {
            sections.insert(section.name.clone(), section);
        }
    }
    sections
}
