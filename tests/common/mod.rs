//! Shared fixture writers for the integration tests.
//!
//! The library only reads DWG, so the tests build their input here: a bit
//! writer mirroring the cursor encodings, section builders for the header,
//! classes, handles and object records, and one packer per section
//! directory layout (flat locator table, paged maps, Reed-Solomon pages).

#![allow(dead_code)]

use std::collections::HashMap;

use dwg_decode::io::dwg::constants::{ac15, ac18, ac21, handle_section, sentinels};
use dwg_decode::io::dwg::crc::{crc8, page_checksum};
use dwg_decode::io::dwg::encryption::{decrypt_file_header, DataPageHeader};
use dwg_decode::io::dwg::layout::VersionLayout;
use dwg_decode::io::dwg::reader::header_reader::{fields_for, FieldKind, Presence};
use dwg_decode::io::dwg::reed_solomon::{ReedSolomon, CODEWORD_SIZE, RS_239, RS_251};
use dwg_decode::io::dwg::ObjectType;
use dwg_decode::{DwgVersion, Vector3};

// ===========================================================================
// Bit writer
// ===========================================================================

/// MSB-first bit packer producing the encodings `DwgBitReader` reads.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bits: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len_bits(&self) -> usize {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn bit(&mut self, value: bool) {
        if self.bits % 8 == 0 {
            self.bytes.push(0);
        }
        if value {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> (self.bits % 8);
        }
        self.bits += 1;
    }

    /// The low `count` bits of `value`, most significant first.
    pub fn bits(&mut self, value: u64, count: usize) {
        for i in (0..count).rev() {
            self.bit((value >> i) & 1 != 0);
        }
    }

    pub fn bb(&mut self, value: u8) {
        self.bits(value as u64, 2);
    }

    pub fn byte(&mut self, value: u8) {
        self.bits(value as u64, 8);
    }

    pub fn bytes(&mut self, data: &[u8]) {
        for &b in data {
            self.byte(b);
        }
    }

    pub fn raw_short(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn raw_long(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    pub fn raw_double(&mut self, value: f64) {
        self.bytes(&value.to_le_bytes());
    }

    /// BS in its shortest form.
    pub fn bit_short(&mut self, value: i16) {
        match value {
            0 => self.bb(0b10),
            256 => self.bb(0b11),
            1..=255 => {
                self.bb(0b01);
                self.byte(value as u8);
            }
            _ => {
                self.bb(0b00);
                self.raw_short(value as u16);
            }
        }
    }

    /// BL in its shortest form.
    pub fn bit_long(&mut self, value: i32) {
        match value {
            0 => self.bb(0b10),
            1..=255 => {
                self.bb(0b01);
                self.byte(value as u8);
            }
            _ => {
                self.bb(0b00);
                self.raw_long(value as u32);
            }
        }
    }

    pub fn bit_long_long(&mut self, value: u64) {
        let count = (8 - value.leading_zeros() as usize / 8).min(7);
        self.bits(count as u64, 3);
        for i in 0..count {
            self.byte((value >> (i * 8)) as u8);
        }
    }

    pub fn bit_double(&mut self, value: f64) {
        if value == 1.0 {
            self.bb(0b01);
        } else if value == 0.0 && value.is_sign_positive() {
            self.bb(0b10);
        } else {
            self.bb(0b00);
            self.raw_double(value);
        }
    }

    /// DD against `default`: unchanged, or a full replacement.
    pub fn bit_double_with_default(&mut self, value: f64, default: f64) {
        if value.to_bits() == default.to_bits() {
            self.bb(0b00);
        } else {
            self.bb(0b11);
            self.raw_double(value);
        }
    }

    pub fn point3(&mut self, p: Vector3) {
        self.bit_double(p.x);
        self.bit_double(p.y);
        self.bit_double(p.z);
    }

    /// H: code and byte count, then the value big-endian.
    pub fn handle(&mut self, code: u8, value: u64) {
        let count = 8 - value.leading_zeros() as usize / 8;
        self.byte((code << 4) | count as u8);
        for i in (0..count).rev() {
            self.byte((value >> (i * 8)) as u8);
        }
    }

    /// TV before R2007: BS length, then single-byte characters.
    pub fn text_code_page(&mut self, text: &str) {
        self.bit_short(text.len() as i16);
        self.bytes(text.as_bytes());
    }

    /// TU: BS unit count, then UTF-16LE.
    pub fn text_unicode(&mut self, text: &str) {
        let units: Vec<u16> = text.encode_utf16().collect();
        self.bit_short(units.len() as i16);
        for u in units {
            self.raw_short(u);
        }
    }

    pub fn append(&mut self, other: &BitWriter) {
        for i in 0..other.bits {
            self.bit(other.bytes[i / 8] & (0x80 >> (i % 8)) != 0);
        }
    }

    /// Overwrite 32 bits at `at_bit` with an RL.
    pub fn patch_raw_long(&mut self, at_bit: usize, value: u32) {
        for (i, byte) in value.to_le_bytes().iter().enumerate() {
            for j in 0..8 {
                let pos = at_bit + i * 8 + j;
                let mask = 0x80 >> (pos % 8);
                if byte & (0x80 >> j) != 0 {
                    self.bytes[pos / 8] |= mask;
                } else {
                    self.bytes[pos / 8] &= !mask;
                }
            }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

// ===========================================================================
// Byte-level encodings
// ===========================================================================

pub fn modular_char(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let b = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out.push(b);
            return out;
        }
        out.push(b | 0x80);
    }
}

pub fn signed_modular_char(value: i64) -> Vec<u8> {
    let mut out = Vec::new();
    let mut magnitude = value.unsigned_abs();
    loop {
        if magnitude < 0x40 {
            let sign = if value < 0 { 0x40 } else { 0 };
            out.push(magnitude as u8 | sign);
            return out;
        }
        out.push((magnitude & 0x7F) as u8 | 0x80);
        magnitude >>= 7;
    }
}

pub fn modular_short(mut value: u32) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let word = (value & 0x7FFF) as u16;
        value >>= 15;
        if value == 0 {
            out.extend_from_slice(&word.to_le_bytes());
            return out;
        }
        out.extend_from_slice(&(word | 0x8000).to_le_bytes());
    }
}

/// R2004 LZ77 stream made of one literal run. Needs at least 4 bytes.
pub fn lz77_ac18_literal(data: &[u8]) -> Vec<u8> {
    assert!(data.len() >= 4, "a literal-only stream needs 4 bytes or more");
    let mut out = Vec::with_capacity(data.len() + 8);
    let count = data.len() - 3;
    if count <= 0x0F {
        out.push(count as u8);
    } else {
        out.push(0x00);
        let mut rest = count - 0x0F;
        while rest > 0xFF {
            out.push(0x00);
            rest -= 0xFF;
        }
        out.push(rest as u8);
    }
    out.extend_from_slice(data);
    out.push(0x11);
    out
}

/// Encode `blocks` codewords and interleave them: byte `i` of codeword
/// `k` at `k + i * blocks`. Data past the end encodes as zeros.
pub fn rs_interleave(rs: &ReedSolomon, data: &[u8], blocks: usize) -> Vec<u8> {
    let mut out = vec![0u8; blocks * CODEWORD_SIZE];
    for k in 0..blocks {
        let start = (k * rs.data_len()).min(data.len());
        let end = ((k + 1) * rs.data_len()).min(data.len());
        let codeword = rs.encode(&data[start..end]);
        for (i, &b) in codeword.iter().enumerate() {
            out[k + i * blocks] = b;
        }
    }
    out
}

fn align8(n: usize) -> usize {
    (n + 7) & !7
}

// ===========================================================================
// Object records
// ===========================================================================

/// Owner and chain position of an entity record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Placement {
    /// Owning record; `None` places the entity in model space.
    pub owner: Option<u64>,
    /// Previous and next entity, written before R2004. `None` sets the
    /// no-links bit.
    pub links: Option<(u64, u64)>,
}

impl Placement {
    pub fn owned_by(owner: u64) -> Self {
        Self {
            owner: Some(owner),
            links: None,
        }
    }

    pub fn linked(owner: Option<u64>, prev: u64, next: u64) -> Self {
        Self {
            owner,
            links: Some((prev, next)),
        }
    }
}

/// One object record: data, (R2007+) string and handle streams.
pub struct RecordWriter {
    layout: VersionLayout,
    pub data: BitWriter,
    pub strings: BitWriter,
    pub handles: BitWriter,
    size_at: Option<usize>,
}

impl RecordWriter {
    /// Start a record with its type code, bit size slot and own handle.
    pub fn new(version: DwgVersion, type_code: u16, handle: u64) -> Self {
        let layout = VersionLayout::new(version);
        assert!(layout.r2000_plus, "records are written for R2000 and later");
        let mut data = BitWriter::new();
        if layout.compact_object_type {
            if type_code < 0x100 {
                data.bb(0);
                data.byte(type_code as u8);
            } else if (0x1F0..0x2F0).contains(&type_code) {
                data.bb(1);
                data.byte((type_code - 0x1F0) as u8);
            } else {
                data.bb(2);
                data.raw_short(type_code);
            }
        } else {
            data.bit_short(type_code as i16);
        }
        let size_at = if layout.object_bit_size_first {
            let at = data.len_bits();
            data.raw_long(0);
            Some(at)
        } else {
            None
        };
        data.handle(0, handle);
        Self {
            layout,
            data,
            strings: BitWriter::new(),
            handles: BitWriter::new(),
            size_at,
        }
    }

    pub fn layout(&self) -> VersionLayout {
        self.layout
    }

    /// TV, routed to the string stream from R2007 on.
    pub fn text(&mut self, text: &str) {
        if self.layout.string_stream {
            self.strings.text_unicode(text);
        } else {
            self.data.text_code_page(text);
        }
    }

    pub fn handle(&mut self, code: u8, value: u64) {
        self.handles.handle(code, value);
    }

    /// Common entity data for an entity in model space with no reactors,
    /// no links, color and linetype by layer.
    pub fn entity_common(&mut self, layer: u64) {
        self.entity_common_at(layer, Placement::default());
    }

    /// Common entity data with an explicit owner and, before R2004, chain
    /// links.
    pub fn entity_common_at(&mut self, layer: u64, at: Placement) {
        let layout = self.layout;
        let d = &mut self.data;
        d.bit_short(0); // no EED
        d.bit(false); // no graphics
        d.bb(if at.owner.is_some() { 0 } else { 2 });
        d.bit_long(0); // reactors
        if layout.r2004_plus {
            d.bit(true); // no xdictionary
        }
        if layout.r2013_plus {
            d.bit(false);
        }
        if layout.entity_links {
            d.bit(at.links.is_none());
        }
        d.bit_short(256); // color by layer
        d.bit_double(1.0);
        d.bb(0); // linetype by layer
        d.bb(0); // plot style by layer
        if layout.r2007_plus {
            d.bb(0);
            d.byte(0);
        }
        if layout.r2010_plus {
            d.bits(0, 3);
        }
        d.bit_short(0);
        d.byte(0);

        if let Some(owner) = at.owner {
            self.handles.handle(4, owner);
        }
        if !layout.r2004_plus {
            self.handles.handle(0, 0);
        }
        if layout.entity_links {
            if let Some((prev, next)) = at.links {
                self.handles.handle(4, prev);
                self.handles.handle(4, next);
            }
        }
        self.handles.handle(5, layer);
    }

    /// Common data of a non-entity object with no reactors.
    pub fn object_common(&mut self, owner: u64) {
        let layout = self.layout;
        self.data.bit_short(0);
        self.data.bit_long(0);
        if layout.r2004_plus {
            self.data.bit(true);
        }
        if layout.r2013_plus {
            self.data.bit(false);
        }
        self.handles.handle(4, owner);
        if !layout.r2004_plus {
            self.handles.handle(0, 0);
        }
    }

    /// Object prefix, name and xref bits of a table entry.
    pub fn table_entry_common(&mut self, owner: u64, name: &str) {
        self.object_common(owner);
        self.text(name);
        if self.layout.r2007_plus {
            self.data.bit_short(0);
        } else {
            self.data.bit(false);
            self.data.bit_short(1);
            self.data.bit(false);
        }
        self.handles.handle(0, 0);
    }

    /// Frame the record: MS size, (R2010+) MC handle bits, streams, CRC.
    pub fn finish(mut self) -> Vec<u8> {
        if self.layout.string_stream {
            if self.strings.is_empty() {
                self.data.bit(false);
            } else {
                let size = self.strings.len_bits();
                assert!(size < 0x8000);
                let strings = std::mem::take(&mut self.strings);
                self.data.append(&strings);
                self.data.raw_short(size as u16);
                self.data.bit(true);
            }
        }
        let data_bits = self.data.len_bits();
        if let Some(at) = self.size_at {
            self.data.patch_raw_long(at, data_bits as u32);
        }
        let handles = std::mem::take(&mut self.handles);
        self.data.append(&handles);
        let body = self.data.into_bytes();

        let mut out = modular_short(body.len() as u32);
        if self.layout.handle_stream_size {
            out.extend(modular_char((body.len() * 8 - data_bits) as u64));
        }
        out.extend_from_slice(&body);
        let crc = crc8(handle_section::CRC_SEED, &out);
        out.extend_from_slice(&crc.to_le_bytes());
        out
    }
}

/// A table control with `entries`, plus null special handles where the
/// control kind carries them.
pub fn table_control(version: DwgVersion, kind: ObjectType, handle: u64, entries: &[u64]) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, kind.code(), handle);
    rec.object_common(0);
    rec.data.bit_long(entries.len() as i32);
    let special = match kind {
        ObjectType::BlockControlObj | ObjectType::LtypeControlObj => 2,
        ObjectType::DimstyleControlObj if rec.layout().r2000_plus => {
            rec.data.byte(0);
            0
        }
        _ => 0,
    };
    for &entry in entries {
        rec.handle(2, entry);
    }
    for _ in 0..special {
        rec.handle(0, 0);
    }
    rec.finish()
}

/// A LAYER entry on, thawed, color 7, with no linetype handle.
pub fn layer(version: DwgVersion, handle: u64, owner: u64, name: &str) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Layer.code(), handle);
    rec.table_entry_common(owner, name);
    let layout = rec.layout();
    rec.data.bit_short(0);
    rec.data.bit_short(7);
    if layout.r2004_plus {
        rec.data.bit_long(0);
        rec.data.byte(0);
    }
    rec.handle(0, 0); // plot style
    if layout.r2007_plus {
        rec.handle(0, 0); // material
    }
    rec.handle(0, 0); // linetype
    if layout.r2013_plus {
        rec.handle(0, 0);
    }
    rec.finish()
}

pub fn line(version: DwgVersion, handle: u64, layer: u64, start: Vector3, end: Vector3) -> Vec<u8> {
    line_at(version, handle, layer, Placement::default(), start, end)
}

pub fn line_at(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    at: Placement,
    start: Vector3,
    end: Vector3,
) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Line.code(), handle);
    rec.entity_common_at(layer, at);
    let d = &mut rec.data;
    let flat = start.z == 0.0 && end.z == 0.0;
    d.bit(flat);
    d.raw_double(start.x);
    d.bit_double_with_default(end.x, start.x);
    d.raw_double(start.y);
    d.bit_double_with_default(end.y, start.y);
    if !flat {
        d.raw_double(start.z);
        d.bit_double_with_default(end.z, start.z);
    }
    d.bit(true); // no thickness
    d.bit(true); // default extrusion
    rec.finish()
}

/// Handles owned by a complex entity or block: the list from R2004 on,
/// first and last before.
fn owned_list(rec: &mut RecordWriter, owned: &[u64]) {
    if rec.layout().r2004_plus {
        for &h in owned {
            rec.handle(4, h);
        }
    } else {
        rec.handle(4, owned.first().copied().unwrap_or(0));
        rec.handle(4, owned.last().copied().unwrap_or(0));
    }
}

/// A BLOCK_HEADER entry for an ordinary block owning `entities`.
pub fn block_record(
    version: DwgVersion,
    handle: u64,
    owner: u64,
    name: &str,
    block: u64,
    entities: &[u64],
    end: u64,
) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::BlockHeader.code(), handle);
    rec.table_entry_common(owner, name);
    let layout = rec.layout();
    rec.data.bit(false); // anonymous
    rec.data.bit(false); // has attribute definitions
    rec.data.bit(false); // xref
    rec.data.bit(false); // overlay
    rec.data.bit(false); // loaded
    if layout.r2004_plus {
        rec.data.bit_long(entities.len() as i32);
    }
    rec.data.point3(Vector3::ZERO);
    rec.text("");
    rec.data.byte(0); // no inserts
    rec.text("");
    rec.data.bit_long(0); // no preview
    if layout.r2007_plus {
        rec.data.bit_short(0);
        rec.data.bit(true);
        rec.data.byte(1);
    }
    rec.handle(3, block);
    owned_list(&mut rec, entities);
    rec.handle(3, end);
    rec.handle(0, 0); // layout
    rec.finish()
}

pub fn block_begin(version: DwgVersion, handle: u64, layer: u64, record: u64, name: &str) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Block.code(), handle);
    rec.entity_common_at(layer, Placement::linked(Some(record), 0, 0));
    rec.text(name);
    rec.finish()
}

pub fn block_end(version: DwgVersion, handle: u64, layer: u64, record: u64) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Endblk.code(), handle);
    rec.entity_common_at(layer, Placement::linked(Some(record), 0, 0));
    rec.finish()
}

pub fn seqend(version: DwgVersion, handle: u64, layer: u64, at: Placement) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Seqend.code(), handle);
    rec.entity_common_at(layer, at);
    rec.finish()
}

/// A POLYLINE_2D with no widths, owning `vertices` and closed by `seqend`.
pub fn polyline_2d(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    at: Placement,
    vertices: &[u64],
    seqend: u64,
) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Polyline2D.code(), handle);
    rec.entity_common_at(layer, at);
    let layout = rec.layout();
    let d = &mut rec.data;
    d.bit_short(0); // flags
    d.bit_short(0); // curve type
    d.bit_double(0.0);
    d.bit_double(0.0);
    d.bit(true); // no thickness
    d.bit_double(0.0); // elevation
    d.bit(true); // default extrusion
    if layout.r2004_plus {
        d.bit_long(vertices.len() as i32);
    }
    owned_list(&mut rec, vertices);
    rec.handle(3, seqend);
    rec.finish()
}

pub fn vertex_2d(version: DwgVersion, handle: u64, layer: u64, at: Placement, point: Vector3) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Vertex2D.code(), handle);
    rec.entity_common_at(layer, at);
    let layout = rec.layout();
    let d = &mut rec.data;
    d.byte(0);
    d.point3(point);
    d.bit_double(0.0); // start width
    d.bit_double(0.0); // end width
    d.bit_double(0.0); // bulge
    if layout.r2010_plus {
        d.bit_long(0);
    }
    d.bit_double(0.0); // tangent direction
    rec.finish()
}

/// An INSERT of `block_record` at unit scale, owning `attributes`.
pub fn insert(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    at: Placement,
    block_record: u64,
    insertion: Vector3,
    attributes: &[u64],
    seqend: u64,
) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Insert.code(), handle);
    rec.entity_common_at(layer, at);
    let layout = rec.layout();
    let d = &mut rec.data;
    d.point3(insertion);
    d.bb(3); // unit scale
    d.bit_double(0.0); // rotation
    d.point3(Vector3::UNIT_Z);
    let has_attributes = !attributes.is_empty();
    d.bit(has_attributes);
    if layout.r2004_plus && has_attributes {
        d.bit_long(attributes.len() as i32);
    }
    rec.handle(5, block_record);
    if has_attributes {
        owned_list(&mut rec, attributes);
        rec.handle(3, seqend);
    }
    rec.finish()
}

/// TEXT fields with no alignment point, oblique, rotation, width,
/// generation or justification. Writes the style handle.
fn text_data(rec: &mut RecordWriter, value: &str, insertion: Vector3, height: f64, style: u64) {
    rec.data.byte(0xFE);
    rec.data.raw_double(insertion.z);
    rec.data.raw_double(insertion.x);
    rec.data.raw_double(insertion.y);
    rec.data.bit(true); // default extrusion
    rec.data.bit(true); // no thickness
    rec.data.raw_double(height);
    rec.text(value);
    rec.handle(5, style);
}

pub fn text(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    value: &str,
    insertion: Vector3,
    height: f64,
    style: u64,
) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Text.code(), handle);
    rec.entity_common(layer);
    text_data(&mut rec, value, insertion, height, style);
    rec.finish()
}

pub fn attrib(
    version: DwgVersion,
    handle: u64,
    layer: u64,
    at: Placement,
    tag: &str,
    value: &str,
    insertion: Vector3,
) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Attrib.code(), handle);
    rec.entity_common_at(layer, at);
    text_data(&mut rec, value, insertion, 2.5, 0);
    let layout = rec.layout();
    if layout.r2010_plus {
        rec.data.byte(0);
    }
    if layout.r2018_plus {
        rec.data.byte(1); // single line
    }
    rec.text(tag);
    rec.data.bit_short(0); // field length
    rec.data.byte(0); // flags
    if layout.r2007_plus {
        rec.data.bit(false);
    }
    rec.finish()
}

// ===========================================================================
// Sections
// ===========================================================================

/// `AcDb:Header` with every variable at its zero value except the named
/// handles.
pub fn header_section(version: DwgVersion, maintenance: u8, handles: &HashMap<&str, u64>) -> Vec<u8> {
    let layout = VersionLayout::new(version);
    let mut main = BitWriter::new();
    let mut refs = BitWriter::new();
    if layout.string_stream {
        main.raw_long(0); // size in bits
    }

    for field in fields_for(&layout) {
        if field.presence == Presence::PlotStyleByHandle {
            continue;
        }
        match field.kind {
            FieldKind::Bit => main.bit(false),
            FieldKind::BitShort => main.bit_short(0),
            FieldKind::BitLong => main.bit_long(0),
            FieldKind::BitLongLong => main.bit_long_long(0),
            FieldKind::BitDouble => main.bit_double(0.0),
            FieldKind::RawChar => main.byte(0),
            FieldKind::Text => {
                if !layout.string_stream {
                    main.bit_short(0);
                }
            }
            FieldKind::Handle => {
                let value = handles.get(field.name).copied().unwrap_or(0);
                let code = if value == 0 { 0 } else { 3 };
                if layout.string_stream {
                    refs.handle(code, value);
                } else {
                    main.handle(code, value);
                }
            }
            FieldKind::HandleSeed => main.handle(0, handles.get(field.name).copied().unwrap_or(0)),
            FieldKind::Point3 => main.point3(Vector3::ZERO),
            FieldKind::RawPoint2 => {
                main.raw_double(0.0);
                main.raw_double(0.0);
            }
            FieldKind::CmColor => {
                main.bit_short(0);
                if layout.r2004_plus {
                    main.bit_long(0);
                    main.byte(0);
                }
            }
            FieldKind::Date | FieldKind::Duration => {
                main.bit_long(0);
                main.bit_long(0);
            }
        }
    }
    if layout.string_stream {
        main.bit(false); // no strings
        let bits = main.len_bits();
        main.patch_raw_long(0, bits as u32);
        main.append(&refs);
    }
    let data = main.into_bytes();

    let mut out = sentinels::HEADER_START.to_vec();
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    if layout.header_has_extra_size(maintenance) {
        out.extend_from_slice(&0u32.to_le_bytes());
    }
    out.extend_from_slice(&data);
    let crc = crc8(handle_section::CRC_SEED, &out[16..]);
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&sentinels::HEADER_END);
    out
}

/// `AcDb:Classes` with no class entries.
pub fn empty_classes_section(version: DwgVersion, maintenance: u8) -> Vec<u8> {
    let layout = VersionLayout::new(version);
    let mut w = BitWriter::new();
    if layout.string_stream {
        w.raw_long(0);
    }
    if layout.r2004_plus {
        w.bit_short(0);
        w.byte(0);
        w.byte(0);
        w.bit(true);
    }
    // Byte size of the entries; whole bytes of the prefix keep the entry
    // loop from starting.
    let mut size = w.len_bits() / 8;
    if layout.string_stream {
        w.bit(false);
        let bits = w.len_bits();
        w.patch_raw_long(0, bits as u32);
        size = 0;
    }
    let data = w.into_bytes();

    let mut out = sentinels::CLASSES_START.to_vec();
    out.extend_from_slice(&(size as u32).to_le_bytes());
    if layout.header_has_extra_size(maintenance) {
        out.extend_from_slice(&0u32.to_le_bytes());
    }
    out.extend_from_slice(&data);
    let crc = crc8(handle_section::CRC_SEED, &out[16..]);
    out.extend_from_slice(&crc.to_le_bytes());
    out.extend_from_slice(&sentinels::CLASSES_END);
    out
}

/// `AcDb:Handles` with at most `per_subsection` entries per sub-section.
/// Entries are sorted by handle first.
pub fn handles_section(entries: &[(u64, i64)], per_subsection: usize) -> Vec<u8> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|&(h, _)| h);

    let mut out = Vec::new();
    for chunk in sorted.chunks(per_subsection.max(1)) {
        let mut body = Vec::new();
        let (mut last_handle, mut last_location) = (0u64, 0i64);
        for &(handle, location) in chunk {
            body.extend(modular_char(handle - last_handle));
            body.extend(signed_modular_char(location - last_location));
            last_handle = handle;
            last_location = location;
        }
        push_subsection(&mut out, &body);
    }
    push_subsection(&mut out, &[]);
    out
}

fn push_subsection(out: &mut Vec<u8>, body: &[u8]) {
    let start = out.len();
    out.extend_from_slice(&((body.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(body);
    let crc = crc8(handle_section::CRC_SEED, &out[start..]);
    out.extend_from_slice(&crc.to_be_bytes());
}

/// Concatenate records from `base` on and return the map entries.
pub fn objects_section(records: &[(u64, Vec<u8>)], base: usize) -> (Vec<u8>, Vec<(u64, i64)>) {
    let mut data = Vec::new();
    let mut map = Vec::new();
    for (handle, bytes) in records {
        map.push((*handle, (base + data.len()) as i64));
        data.extend_from_slice(bytes);
    }
    (data, map)
}

// ===========================================================================
// Drawings
// ===========================================================================

pub const BLOCK_CONTROL: u64 = 0x01;
pub const LAYER_CONTROL: u64 = 0x02;
pub const LTYPE_CONTROL: u64 = 0x05;
pub const LAYER_ZERO: u64 = 0x10;
pub const LINE: u64 = 0x20;
pub const HANDLE_SEED: u64 = 0x40;

/// Block "PART": a 2D polyline with two vertices, then a line.
pub const PART: u64 = 0x50;
pub const PART_BEGIN: u64 = 0x51;
pub const PART_POLYLINE: u64 = 0x52;
pub const PART_VERTICES: [u64; 2] = [0x53, 0x54];
pub const PART_SEQEND: u64 = 0x55;
pub const PART_LINE: u64 = 0x56;
pub const PART_END: u64 = 0x57;

/// Model space INSERT of "PART" with two attributes.
pub const INSERT: u64 = 0x60;
pub const INSERT_ATTRIBS: [u64; 2] = [0x61, 0x62];
pub const INSERT_SEQEND: u64 = 0x63;

/// Records and header handles of a test drawing.
pub struct Drawing {
    pub version: DwgVersion,
    pub maintenance: u8,
    pub records: Vec<(u64, Vec<u8>)>,
    pub header_handles: HashMap<&'static str, u64>,
    /// Drop the last byte of the handles section.
    pub truncate_handles: bool,
}

impl Drawing {
    /// Linetype and layer controls, layer "0" and one LINE on it.
    pub fn single_line(version: DwgVersion, start: Vector3, end: Vector3) -> Self {
        let records = vec![
            (
                LAYER_CONTROL,
                table_control(version, ObjectType::LayerControlObj, LAYER_CONTROL, &[LAYER_ZERO]),
            ),
            (
                LTYPE_CONTROL,
                table_control(version, ObjectType::LtypeControlObj, LTYPE_CONTROL, &[]),
            ),
            (LAYER_ZERO, layer(version, LAYER_ZERO, LAYER_CONTROL, "0")),
            (LINE, line(version, LINE, LAYER_ZERO, start, end)),
        ];
        let header_handles = HashMap::from([
            ("LAYER_CONTROL_OBJECT", LAYER_CONTROL),
            ("LINETYPE_CONTROL_OBJECT", LTYPE_CONTROL),
            ("CLAYER", LAYER_ZERO),
            ("HANDSEED", HANDLE_SEED),
        ]);
        Self {
            version,
            maintenance: 0,
            records,
            header_handles,
            truncate_handles: false,
        }
    }

    /// `single_line` plus block "PART" and an INSERT of it. Before R2004
    /// the block's entities and the attributes are chained by their
    /// next-entity links.
    pub fn block_with_insert(version: DwgVersion) -> Self {
        let v = version;
        let [v1, v2] = PART_VERTICES;
        let [a1, a2] = INSERT_ATTRIBS;
        let in_part = |prev, next| Placement::linked(Some(PART), prev, next);
        let in_polyline = |prev, next| Placement::linked(Some(PART_POLYLINE), prev, next);
        let in_insert = |prev, next| Placement::linked(Some(INSERT), prev, next);

        let part = [
            (
                BLOCK_CONTROL,
                table_control(v, ObjectType::BlockControlObj, BLOCK_CONTROL, &[PART]),
            ),
            (
                PART,
                block_record(v, PART, BLOCK_CONTROL, "PART", PART_BEGIN, &[PART_POLYLINE, PART_LINE], PART_END),
            ),
            (PART_BEGIN, block_begin(v, PART_BEGIN, LAYER_ZERO, PART, "PART")),
            (
                PART_POLYLINE,
                polyline_2d(v, PART_POLYLINE, LAYER_ZERO, in_part(0, PART_LINE), &PART_VERTICES, PART_SEQEND),
            ),
            (v1, vertex_2d(v, v1, LAYER_ZERO, in_polyline(0, v2), Vector3::new(0.0, 0.0, 0.0))),
            (v2, vertex_2d(v, v2, LAYER_ZERO, in_polyline(v1, PART_SEQEND), Vector3::new(4.0, 3.0, 0.0))),
            (PART_SEQEND, seqend(v, PART_SEQEND, LAYER_ZERO, in_polyline(v2, 0))),
            (
                PART_LINE,
                line_at(
                    v,
                    PART_LINE,
                    LAYER_ZERO,
                    in_part(PART_POLYLINE, 0),
                    Vector3::new(4.0, 3.0, 0.0),
                    Vector3::new(8.0, 0.0, 0.0),
                ),
            ),
            (PART_END, block_end(v, PART_END, LAYER_ZERO, PART)),
            (
                INSERT,
                insert(
                    v,
                    INSERT,
                    LAYER_ZERO,
                    Placement::linked(None, LINE, 0),
                    PART,
                    Vector3::new(100.0, 50.0, 0.0),
                    &INSERT_ATTRIBS,
                    INSERT_SEQEND,
                ),
            ),
            (a1, attrib(v, a1, LAYER_ZERO, in_insert(0, a2), "NO", "17", Vector3::new(100.0, 45.0, 0.0))),
            (
                a2,
                attrib(v, a2, LAYER_ZERO, in_insert(a1, INSERT_SEQEND), "MAT", "steel", Vector3::new(100.0, 42.0, 0.0)),
            ),
            (INSERT_SEQEND, seqend(v, INSERT_SEQEND, LAYER_ZERO, in_insert(a2, 0))),
        ];

        let mut drawing = Self::single_line(version, Vector3::ZERO, Vector3::new(1.0, 1.0, 0.0));
        drawing.records.extend(part);
        drawing.header_handles.insert("BLOCK_CONTROL_OBJECT", BLOCK_CONTROL);
        drawing
    }

    /// Add a record, or replace the one already stored under `handle`.
    pub fn with_record(mut self, handle: u64, bytes: Vec<u8>) -> Self {
        match self.records.iter_mut().find(|(h, _)| *h == handle) {
            Some(slot) => slot.1 = bytes,
            None => self.records.push((handle, bytes)),
        }
        self
    }

    pub fn truncated_handles(mut self) -> Self {
        self.truncate_handles = true;
        self
    }

    /// Assemble the file in the directory layout of its version.
    pub fn build(&self) -> Vec<u8> {
        let header = header_section(self.version, self.maintenance, &self.header_handles);
        let classes = empty_classes_section(self.version, self.maintenance);
        let layout = VersionLayout::new(self.version);

        if layout.r13_15_only {
            let base = AC15_HEADER_SIZE + header.len() + classes.len();
            let (objects, map) = objects_section(&self.records, base);
            let handles = self.handles(&map);
            pack_ac15(self.version, self.maintenance, &header, &classes, &objects, &handles)
        } else {
            let (objects, map) = objects_section(&self.records, 0);
            let handles = self.handles(&map);
            let sections = [
                ("AcDb:Header", header),
                ("AcDb:Classes", classes),
                ("AcDb:Handles", handles),
                ("AcDb:AcDbObjects", objects),
            ];
            if self.version == DwgVersion::AC1021 {
                pack_ac21(self.version, self.maintenance, &sections)
            } else {
                pack_ac18(self.version, self.maintenance, &sections)
            }
        }
    }

    fn handles(&self, map: &[(u64, i64)]) -> Vec<u8> {
        let mut handles = handles_section(map, 64);
        if self.truncate_handles {
            handles.pop();
        }
        handles
    }
}

fn preamble(version: DwgVersion, maintenance: u8, size: usize) -> Vec<u8> {
    let mut file = vec![0u8; size];
    file[..6].copy_from_slice(version.tag().as_bytes());
    file[0x0B] = maintenance;
    file[0x13..0x15].copy_from_slice(&30u16.to_le_bytes());
    file
}

const AC15_RECORDS: usize = 3;
const AC15_HEADER_SIZE: usize = 0x19 + AC15_RECORDS * 9 + 2 + 16;

/// Flat layout: locator table, then header, classes, objects and handles.
pub fn pack_ac15(
    version: DwgVersion,
    maintenance: u8,
    header: &[u8],
    classes: &[u8],
    objects: &[u8],
    handles: &[u8],
) -> Vec<u8> {
    let mut file = preamble(version, maintenance, 0x15);
    file.extend_from_slice(&(AC15_RECORDS as i32).to_le_bytes());

    let header_at = AC15_HEADER_SIZE;
    let classes_at = header_at + header.len();
    let handles_at = classes_at + classes.len() + objects.len();
    for (number, address, size) in [
        (0u8, header_at, header.len()),
        (1, classes_at, classes.len()),
        (2, handles_at, handles.len()),
    ] {
        file.push(number);
        file.extend_from_slice(&(address as u32).to_le_bytes());
        file.extend_from_slice(&(size as u32).to_le_bytes());
    }
    let crc = crc8(0, &file) ^ ac15::crc_xor(AC15_RECORDS as i32);
    file.extend_from_slice(&crc.to_le_bytes());
    file.extend_from_slice(&sentinels::FILE_HEADER_END_AC15);
    assert_eq!(file.len(), AC15_HEADER_SIZE);

    file.extend_from_slice(header);
    file.extend_from_slice(classes);
    file.extend_from_slice(objects);
    file.extend_from_slice(handles);
    file
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u64(buf: &mut [u8], at: usize, value: u64) {
    buf[at..at + 8].copy_from_slice(&value.to_le_bytes());
}

/// R2004 system page: header, then LZ77 data.
fn ac18_system_page(page_type: u32, data: &[u8]) -> Vec<u8> {
    let compressed = lz77_ac18_literal(data);
    let mut header = [0u8; ac18::SYSTEM_PAGE_HEADER_SIZE];
    put_u32(&mut header, 0, page_type);
    put_u32(&mut header, 4, data.len() as u32);
    put_u32(&mut header, 8, compressed.len() as u32);
    put_u32(&mut header, 12, 2);
    let checksum = page_checksum(page_checksum(0, &header), &compressed);
    put_u32(&mut header, 16, checksum);

    let mut page = header.to_vec();
    page.extend_from_slice(&compressed);
    page
}

/// R2004 data page at `address`: masked header, then LZ77 data.
fn ac18_data_page(address: u64, section: i32, data: &[u8]) -> Vec<u8> {
    let compressed = lz77_ac18_literal(data);
    let data_checksum = page_checksum(0, &compressed);
    let mut header = DataPageHeader {
        page_type: ac18::PAGE_TYPE_DATA,
        section_number: section,
        compressed_size: compressed.len() as i32,
        page_size: data.len() as i32,
        start_offset: 0,
        header_checksum: 0,
        data_checksum,
        unknown: 0,
    };
    header.header_checksum = page_checksum(data_checksum, &header.checksum_bytes());

    let fields = [
        header.page_type,
        header.section_number as u32,
        header.compressed_size as u32,
        header.page_size as u32,
        header.start_offset as u32,
        header.header_checksum,
        header.data_checksum,
        header.unknown as u32,
    ];
    let mask = ac18::DECRYPTION_MASK ^ address as u32;
    let mut page = Vec::with_capacity(ac18::DATA_PAGE_HEADER_SIZE + compressed.len());
    for field in fields {
        page.extend_from_slice(&(field ^ mask).to_le_bytes());
    }
    page.extend_from_slice(&compressed);
    page
}

/// Paged layout (R2004, R2010+): one page per section, then the section
/// map and the page map.
pub fn pack_ac18(version: DwgVersion, maintenance: u8, sections: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut file = preamble(version, maintenance, ac18::PAGE_BASE_ADDRESS as usize);
    let mut page_map = Vec::new();
    let mut section_map = vec![0u8; 20];
    put_u32(&mut section_map, 0, sections.len() as u32);

    for (i, (name, data)) in sections.iter().enumerate() {
        let id = i as i32 + 1;
        let page = ac18_data_page(file.len() as u64, id, data);

        let mut description = [0u8; 0x60];
        put_u64(&mut description, 0, data.len() as u64);
        put_u32(&mut description, 8, 1);
        put_u32(&mut description, 12, data.len() as u32);
        put_u32(&mut description, 20, 2);
        put_u32(&mut description, 24, id as u32);
        description[32..32 + name.len()].copy_from_slice(name.as_bytes());
        section_map.extend_from_slice(&description);
        section_map.extend_from_slice(&id.to_le_bytes());
        section_map.extend_from_slice(&(page.len() as i32 - ac18::DATA_PAGE_HEADER_SIZE as i32).to_le_bytes());
        section_map.extend_from_slice(&0u64.to_le_bytes());

        page_map.extend_from_slice(&id.to_le_bytes());
        page_map.extend_from_slice(&(page.len() as i32).to_le_bytes());
        file.extend_from_slice(&page);
    }

    let section_map_id = sections.len() as u32 + 1;
    let page = ac18_system_page(ac18::PAGE_TYPE_SECTION_MAP, &section_map);
    page_map.extend_from_slice(&(section_map_id as i32).to_le_bytes());
    page_map.extend_from_slice(&(page.len() as i32).to_le_bytes());
    file.extend_from_slice(&page);

    let page_map_id = section_map_id + 1;
    let page_map_address = file.len() as u64;
    file.extend_from_slice(&ac18_system_page(ac18::PAGE_TYPE_PAGE_MAP, &page_map));

    let mut meta = [0u8; ac18::ENCRYPTED_HEADER_SIZE];
    meta[..ac18::FILE_ID.len()].copy_from_slice(ac18::FILE_ID);
    put_u32(&mut meta, 0x28, page_map_id);
    put_u32(&mut meta, 0x40, sections.len() as u32);
    put_u32(&mut meta, 0x50, page_map_id);
    put_u64(&mut meta, 0x54, page_map_address - ac18::PAGE_BASE_ADDRESS);
    put_u32(&mut meta, 0x5C, section_map_id);
    decrypt_file_header(&mut meta);
    file[0x80..0x80 + meta.len()].copy_from_slice(&meta);
    file
}

fn ac21_system_page(data: &[u8]) -> Vec<u8> {
    let blocks = align8(data.len()).div_ceil(RS_239.data_len());
    rs_interleave(&RS_239, data, blocks)
}

/// Reed-Solomon layout (R2007): stored pages under the (255,251) code,
/// maps under the (255,239) code, uncompressed metadata.
pub fn pack_ac21(version: DwgVersion, maintenance: u8, sections: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut file = preamble(version, maintenance, ac21::DATA_PAGE_BASE_OFFSET as usize);
    let mut page_map = Vec::new();
    let mut section_map = Vec::new();

    for (i, (name, data)) in sections.iter().enumerate() {
        let id = i as u64 + 1;
        let blocks = align8(data.len()).div_ceil(RS_251.data_len());
        let page = rs_interleave(&RS_251, data, blocks);

        let name_units: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
        let mut fields = [0u8; 64];
        put_u64(&mut fields, 0, data.len() as u64);
        put_u64(&mut fields, 8, data.len() as u64);
        put_u64(&mut fields, 32, (name_units.len() * 2) as u64);
        put_u64(&mut fields, 48, ac21::PAGE_ENCODING_RS);
        put_u64(&mut fields, 56, 1);
        section_map.extend_from_slice(&fields);
        for unit in name_units {
            section_map.extend_from_slice(&unit.to_le_bytes());
        }
        let mut page_fields = [0u8; 56];
        put_u64(&mut page_fields, 16, id);
        put_u64(&mut page_fields, 24, data.len() as u64);
        put_u64(&mut page_fields, 32, data.len() as u64);
        section_map.extend_from_slice(&page_fields);

        page_map.extend_from_slice(&(page.len() as u64).to_le_bytes());
        page_map.extend_from_slice(&(id as i64).to_le_bytes());
        file.extend_from_slice(&page);
    }

    let section_map_id = sections.len() as u64 + 1;
    let page = ac21_system_page(&section_map);
    page_map.extend_from_slice(&(page.len() as u64).to_le_bytes());
    page_map.extend_from_slice(&(section_map_id as i64).to_le_bytes());
    file.extend_from_slice(&page);

    let page_map_address = file.len() as u64;
    file.extend_from_slice(&ac21_system_page(&page_map));

    let mut meta = [0u8; ac21::DECOMPRESSED_HEADER_SIZE];
    put_u64(&mut meta, 3 * 8, 1);
    put_u64(&mut meta, 7 * 8, page_map_address - ac21::DATA_PAGE_BASE_OFFSET);
    put_u64(&mut meta, 8 * 8, section_map_id + 1);
    put_u64(&mut meta, 10 * 8, page_map.len() as u64);
    put_u64(&mut meta, 11 * 8, page_map.len() as u64);
    put_u64(&mut meta, 20 * 8, sections.len() as u64);
    put_u64(&mut meta, 22 * 8, section_map.len() as u64);
    put_u64(&mut meta, 24 * 8, section_map_id);
    put_u64(&mut meta, 25 * 8, section_map.len() as u64);
    put_u64(&mut meta, 27 * 8, 1);

    let mut frame = vec![0u8; ac21::HEADER_CODEWORDS * RS_239.data_len()];
    frame[24..28].copy_from_slice(&(-(meta.len() as i32)).to_le_bytes());
    frame[32..32 + meta.len()].copy_from_slice(&meta);
    let block = rs_interleave(&RS_239, &frame, ac21::HEADER_CODEWORDS);
    file[0x80..0x80 + block.len()].copy_from_slice(&block);
    file
}
