//! Bit-level reader for DWG streams.
//!
//! Every DWG section after decompression is a bit stream: values are not
//! byte aligned and most integer/float types carry a short size prefix.
//! [`DwgBitReader`] decodes all of the primitive wire types over an owned
//! or borrowed byte buffer.
//!
//! Failure is sticky. The first read that would cross the end of the
//! buffer clears the `good` flag; from then on every read returns zero or
//! an empty value without touching the buffer. Callers check
//! [`DwgBitReader::is_good`] (or use [`DwgBitReader::ensure_good`] with `?`)
//! after a group of reads instead of after every primitive.

use std::borrow::Cow;

use encoding_rs::Encoding;

use crate::error::{DwgError, Result};
use crate::types::{Color, HandleRef, Vector2, Vector3, DwgVersion};

/// Entity color as stored in the common entity data (`ENC`).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnColor {
    pub color: Color,
    /// Raw transparency value, when the 0x2000 flag is set.
    pub transparency: Option<u32>,
    /// A color-book handle follows in the handle stream.
    pub has_color_handle: bool,
}

/// Bit reader over a DWG byte buffer.
#[derive(Debug, Clone)]
pub struct DwgBitReader<'a> {
    data: Cow<'a, [u8]>,
    /// Index of the byte holding the next unread bit.
    position: usize,
    /// Number of bits of `data[position]` already consumed (0..8).
    bit_shift: u8,
    good: bool,
    /// Set when a string stream is flagged absent; text reads return "".
    empty: bool,
    version: DwgVersion,
    encoding: &'static Encoding,
}

impl<'a> DwgBitReader<'a> {
    /// Create a reader borrowing `data`.
    pub fn new(data: &'a [u8], version: DwgVersion) -> Self {
        Self {
            data: Cow::Borrowed(data),
            position: 0,
            bit_shift: 0,
            good: true,
            empty: false,
            version,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    /// Create a reader that owns its buffer.
    pub fn from_vec(data: Vec<u8>, version: DwgVersion) -> DwgBitReader<'static> {
        DwgBitReader {
            data: Cow::Owned(data),
            position: 0,
            bit_shift: 0,
            good: true,
            empty: false,
            version,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    /// Use the text encoding for the given drawing code page.
    pub fn with_code_page(mut self, code_page: u16) -> Self {
        self.encoding = encoding_from_code_page(code_page);
        self
    }

    /// Use an explicit text encoding.
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// A second reader over the same bytes, positioned at the start.
    ///
    /// Never copies: the new reader borrows this reader's buffer.
    pub fn alias(&self) -> DwgBitReader<'_> {
        DwgBitReader {
            data: Cow::Borrowed(&self.data),
            position: 0,
            bit_shift: 0,
            good: true,
            empty: false,
            version: self.version,
            encoding: self.encoding,
        }
    }

    pub fn version(&self) -> DwgVersion {
        self.version
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Buffer length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The underlying bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether every read so far stayed inside the buffer.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.good
    }

    /// Turn a failed cursor into a [`DwgError::StreamOverrun`].
    pub fn ensure_good(&self, context: &str) -> Result<()> {
        if self.good {
            Ok(())
        } else {
            Err(DwgError::StreamOverrun {
                context: context.to_string(),
                bit_position: self.position_in_bits(),
            })
        }
    }

    #[inline]
    fn fail(&mut self) {
        self.good = false;
    }

    // ---------------------------------------------------------------
    // Positioning
    // ---------------------------------------------------------------

    /// Current byte position (the byte holding the next bit).
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bits already consumed from the current byte.
    pub fn bit_shift(&self) -> u8 {
        self.bit_shift
    }

    pub fn position_in_bits(&self) -> i64 {
        self.position as i64 * 8 + self.bit_shift as i64
    }

    pub fn remaining_bits(&self) -> i64 {
        (self.data.len() as i64 * 8 - self.position_in_bits()).max(0)
    }

    /// Seek to a byte offset, byte aligned. Seeking past the end fails the
    /// cursor.
    pub fn set_position(&mut self, position: usize) -> bool {
        if position > self.data.len() {
            self.fail();
            return false;
        }
        self.position = position;
        self.bit_shift = 0;
        self.good
    }

    /// Seek to an absolute bit offset.
    pub fn set_position_in_bits(&mut self, position: i64) -> bool {
        if position < 0 || position > self.data.len() as i64 * 8 {
            self.fail();
            return false;
        }
        self.position = (position >> 3) as usize;
        self.bit_shift = (position & 7) as u8;
        self.good
    }

    /// Seek relative to the current bit position.
    pub fn move_bit_pos(&mut self, delta: i64) -> bool {
        let target = self.position_in_bits() + delta;
        self.set_position_in_bits(target)
    }

    /// Skip `count` bytes from the current bit position.
    pub fn advance(&mut self, count: usize) -> bool {
        self.move_bit_pos(count as i64 * 8)
    }

    /// Drop the partial byte and read the little-endian CRC that follows.
    pub fn reset_shift(&mut self) -> u16 {
        if self.bit_shift > 0 {
            self.bit_shift = 0;
            self.position += 1;
        }
        self.read_raw_ushort()
    }

    /// Locate an R2007+ string stream that ends at `end_bit`.
    ///
    /// The bit at `end_bit` tells whether strings are present. If so, the
    /// 16 bits before it hold the stream size in bits (with a high word in
    /// front when bit 15 is set) and the reader is moved to the stream
    /// start. Otherwise the reader is marked as having no strings.
    pub fn set_position_by_flag(&mut self, end_bit: i64) -> i64 {
        self.set_position_in_bits(end_bit);
        if !self.read_bit() {
            self.empty = true;
            return end_bit;
        }

        let mut length = end_bit - 16;
        self.set_position_in_bits(length);
        let mut size = self.read_raw_ushort() as i64;
        if size & 0x8000 != 0 {
            length -= 16;
            self.set_position_in_bits(length);
            let hi_size = self.read_raw_ushort() as i64;
            size = (size & 0x7FFF) | (hi_size << 15);
        }

        let start = length - size;
        self.set_position_in_bits(start);
        start
    }

    // ---------------------------------------------------------------
    // Bits and raw bytes
    // ---------------------------------------------------------------

    /// B: a single bit.
    pub fn read_bit(&mut self) -> bool {
        if !self.good {
            return false;
        }
        let Some(&byte) = self.data.get(self.position) else {
            self.fail();
            return false;
        };
        let bit = (byte >> (7 - self.bit_shift)) & 1 == 1;
        self.bit_shift += 1;
        if self.bit_shift == 8 {
            self.bit_shift = 0;
            self.position += 1;
        }
        bit
    }

    /// BB: two bits, most significant first.
    pub fn read_2bits(&mut self) -> u8 {
        let hi = self.read_bit() as u8;
        let lo = self.read_bit() as u8;
        (hi << 1) | lo
    }

    /// 3B: three bits, most significant first.
    pub fn read_3bits(&mut self) -> u8 {
        let b0 = self.read_bit() as u8;
        let b1 = self.read_bit() as u8;
        let b2 = self.read_bit() as u8;
        (b0 << 2) | (b1 << 1) | b2
    }

    /// RC: one byte at the current bit position.
    pub fn read_byte(&mut self) -> u8 {
        if !self.good {
            return 0;
        }
        if self.bit_shift == 0 {
            match self.data.get(self.position) {
                Some(&b) => {
                    self.position += 1;
                    b
                }
                None => {
                    self.fail();
                    0
                }
            }
        } else {
            match (self.data.get(self.position), self.data.get(self.position + 1)) {
                (Some(&hi), Some(&lo)) => {
                    self.position += 1;
                    (hi << self.bit_shift) | (lo >> (8 - self.bit_shift))
                }
                _ => {
                    self.fail();
                    0
                }
            }
        }
    }

    fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut out = [0u8; N];
        if self.remaining_bits() < (N as i64) * 8 {
            self.fail();
            return out;
        }
        for b in out.iter_mut() {
            *b = self.read_byte();
        }
        out
    }

    /// Read `count` bytes. A count larger than what is left fails the
    /// cursor and returns an empty vector; nothing is allocated for it.
    pub fn read_bytes(&mut self, count: usize) -> Vec<u8> {
        if !self.good {
            return Vec::new();
        }
        if (count as i64).saturating_mul(8) > self.remaining_bits() {
            self.fail();
            return Vec::new();
        }
        if self.bit_shift == 0 {
            let out = self.data[self.position..self.position + count].to_vec();
            self.position += count;
            out
        } else {
            (0..count).map(|_| self.read_byte()).collect()
        }
    }

    /// RS: little-endian i16.
    pub fn read_raw_short(&mut self) -> i16 {
        i16::from_le_bytes(self.read_array())
    }

    pub fn read_raw_ushort(&mut self) -> u16 {
        u16::from_le_bytes(self.read_array())
    }

    /// Big-endian u16, used by the handles section framing.
    pub fn read_be_ushort(&mut self) -> u16 {
        u16::from_be_bytes(self.read_array())
    }

    /// RL: little-endian i32.
    pub fn read_raw_long(&mut self) -> i32 {
        i32::from_le_bytes(self.read_array())
    }

    pub fn read_raw_ulong(&mut self) -> u32 {
        u32::from_le_bytes(self.read_array())
    }

    pub fn read_raw_long_long(&mut self) -> u64 {
        u64::from_le_bytes(self.read_array())
    }

    /// RD: little-endian IEEE double.
    pub fn read_raw_double(&mut self) -> f64 {
        f64::from_le_bytes(self.read_array())
    }

    pub fn read_2raw_double(&mut self) -> Vector2 {
        let x = self.read_raw_double();
        let y = self.read_raw_double();
        Vector2::new(x, y)
    }

    pub fn read_3raw_double(&mut self) -> Vector3 {
        let x = self.read_raw_double();
        let y = self.read_raw_double();
        let z = self.read_raw_double();
        Vector3::new(x, y, z)
    }

    pub fn read_sentinel(&mut self) -> [u8; 16] {
        self.read_array()
    }

    // ---------------------------------------------------------------
    // Bit-coded numbers
    // ---------------------------------------------------------------

    /// BS: `00` raw short, `01` unsigned byte, `10` zero, `11` 256.
    pub fn read_bit_short(&mut self) -> i16 {
        match self.read_2bits() {
            0 => self.read_raw_short(),
            1 => self.read_byte() as i16,
            2 => 0,
            _ => 256,
        }
    }

    pub fn read_bit_short_as_bool(&mut self) -> bool {
        self.read_bit_short() != 0
    }

    /// BL: `00` raw long, `01` unsigned byte, `10` zero. `11` is not a
    /// valid prefix and fails the cursor.
    pub fn read_bit_long(&mut self) -> i32 {
        match self.read_2bits() {
            0 => self.read_raw_long(),
            1 => self.read_byte() as i32,
            2 => 0,
            _ => {
                self.fail();
                0
            }
        }
    }

    /// BLL: 3-bit byte count followed by that many little-endian bytes.
    pub fn read_bit_long_long(&mut self) -> u64 {
        let size = self.read_3bits();
        let mut value: u64 = 0;
        for i in 0..size {
            value |= (self.read_byte() as u64) << (i as u64 * 8);
        }
        value
    }

    /// BD: `00` raw double, `01` 1.0, `10` 0.0. `11` fails the cursor.
    pub fn read_bit_double(&mut self) -> f64 {
        match self.read_2bits() {
            0 => self.read_raw_double(),
            1 => 1.0,
            2 => 0.0,
            _ => {
                self.fail();
                0.0
            }
        }
    }

    /// DD: a double stored as a patch over `default`.
    pub fn read_bit_double_with_default(&mut self, default: f64) -> f64 {
        let mut arr = default.to_le_bytes();
        match self.read_2bits() {
            0 => default,
            1 => {
                let patch: [u8; 4] = self.read_array();
                arr[..4].copy_from_slice(&patch);
                f64::from_le_bytes(arr)
            }
            2 => {
                let patch: [u8; 6] = self.read_array();
                arr[4] = patch[0];
                arr[5] = patch[1];
                arr[..4].copy_from_slice(&patch[2..]);
                f64::from_le_bytes(arr)
            }
            _ => self.read_raw_double(),
        }
    }

    pub fn read_2bit_double(&mut self) -> Vector2 {
        let x = self.read_bit_double();
        let y = self.read_bit_double();
        Vector2::new(x, y)
    }

    pub fn read_3bit_double(&mut self) -> Vector3 {
        let x = self.read_bit_double();
        let y = self.read_bit_double();
        let z = self.read_bit_double();
        Vector3::new(x, y, z)
    }

    pub fn read_2bit_double_with_default(&mut self, default: Vector2) -> Vector2 {
        let x = self.read_bit_double_with_default(default.x);
        let y = self.read_bit_double_with_default(default.y);
        Vector2::new(x, y)
    }

    pub fn read_3bit_double_with_default(&mut self, default: Vector3) -> Vector3 {
        let x = self.read_bit_double_with_default(default.x);
        let y = self.read_bit_double_with_default(default.y);
        let z = self.read_bit_double_with_default(default.z);
        Vector3::new(x, y, z)
    }

    /// BE: R2000+ stores a single set bit for the default (0,0,1).
    pub fn read_bit_extrusion(&mut self) -> Vector3 {
        if self.version >= DwgVersion::AC1015 && self.read_bit() {
            return Vector3::UNIT_Z;
        }
        self.read_3bit_double()
    }

    /// BT: R2000+ stores a single set bit for zero thickness.
    pub fn read_bit_thickness(&mut self) -> f64 {
        if self.version >= DwgVersion::AC1015 && self.read_bit() {
            return 0.0;
        }
        self.read_bit_double()
    }

    // ---------------------------------------------------------------
    // Modular numbers
    // ---------------------------------------------------------------

    /// MC (unsigned): 7 bits per byte, high bit continues.
    pub fn read_modular_char(&mut self) -> u64 {
        let mut value: u64 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_byte();
            if !self.good {
                return 0;
            }
            value |= ((b & 0x7F) as u64) << shift;
            if b & 0x80 == 0 {
                return value;
            }
            shift += 7;
            if shift > 63 {
                self.fail();
                return 0;
            }
        }
    }

    /// MC (signed): as above, but bit 6 of the final byte is the sign.
    pub fn read_signed_modular_char(&mut self) -> i64 {
        let mut value: i64 = 0;
        let mut shift = 0u32;
        loop {
            let b = self.read_byte();
            if !self.good {
                return 0;
            }
            if b & 0x80 != 0 {
                value |= ((b & 0x7F) as i64) << shift;
                shift += 7;
                if shift > 56 {
                    self.fail();
                    return 0;
                }
            } else {
                value |= ((b & 0x3F) as i64) << shift;
                if b & 0x40 != 0 {
                    value = -value;
                }
                return value;
            }
        }
    }

    /// MS: 15 bits per little-endian short, high bit continues.
    pub fn read_modular_short(&mut self) -> u32 {
        let mut value: u32 = 0;
        let mut shift = 0u32;
        loop {
            let lo = self.read_byte();
            let hi = self.read_byte();
            if !self.good {
                return 0;
            }
            value |= ((lo as u32) | (((hi & 0x7F) as u32) << 8)) << shift;
            if hi & 0x80 == 0 {
                return value;
            }
            shift += 15;
            if shift > 30 {
                self.fail();
                return 0;
            }
        }
    }

    // ---------------------------------------------------------------
    // Handles
    // ---------------------------------------------------------------

    /// H: `|code:4|count:4|` followed by `count` big-endian bytes, resolved
    /// against `reference` for the relative codes.
    ///
    /// Codes outside the known table fail the cursor.
    pub fn read_handle_from(&mut self, reference: u64) -> HandleRef {
        let form = self.read_byte();
        let code = form >> 4;
        let counter = form & 0x0F;
        if counter > 8 {
            self.fail();
            return HandleRef::default();
        }
        let mut value: u64 = 0;
        for _ in 0..counter {
            value = (value << 8) | self.read_byte() as u64;
        }
        if !self.good {
            return HandleRef::default();
        }
        match HandleRef::resolve(code, value, reference) {
            Some(r) => r,
            None => {
                self.fail();
                HandleRef::default()
            }
        }
    }

    /// H with no reference handle.
    pub fn read_handle(&mut self) -> HandleRef {
        self.read_handle_from(0)
    }

    /// Absolute handle value.
    pub fn handle_reference(&mut self) -> u64 {
        self.read_handle_from(0).handle.value()
    }

    /// Absolute handle value, relative codes resolved against `reference`.
    pub fn handle_reference_from(&mut self, reference: u64) -> u64 {
        self.read_handle_from(reference).handle.value()
    }

    // ---------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------

    /// TV: BS length, then code-page bytes (UTF-16LE code units for
    /// R2007+). NULs are dropped.
    pub fn read_variable_text(&mut self) -> String {
        if self.empty {
            return String::new();
        }
        let length = self.read_bit_short();
        if length <= 0 {
            return String::new();
        }
        if self.version >= DwgVersion::AC1021 {
            self.read_utf16(length as usize)
        } else {
            self.read_encoded(length as usize)
        }
    }

    /// TU: RS length, then UTF-16LE units (R2007+) or a code-page byte and
    /// that many bytes.
    pub fn read_text_unicode(&mut self) -> String {
        if self.empty {
            return String::new();
        }
        let length = self.read_raw_short();
        if self.version >= DwgVersion::AC1021 {
            if length <= 0 {
                return String::new();
            }
            self.read_utf16(length as usize)
        } else {
            let key = self.read_byte();
            if length <= 0 {
                return String::new();
            }
            let bytes = self.read_bytes(length as usize);
            decode_text(encoding_from_code_page(key as u16), &bytes)
        }
    }

    fn read_encoded(&mut self, length: usize) -> String {
        let bytes = self.read_bytes(length);
        decode_text(self.encoding, &bytes)
    }

    fn read_utf16(&mut self, units: usize) -> String {
        let bytes = self.read_bytes(units.saturating_mul(2));
        decode_text(encoding_rs::UTF_16LE, &bytes)
    }

    // ---------------------------------------------------------------
    // Colors and object type
    // ---------------------------------------------------------------

    /// CMC. For R2004+ the optional color/book names are read inline.
    pub fn read_cm_color(&mut self) -> Color {
        if self.version < DwgVersion::AC1018 {
            return Color::from_index(self.read_bit_short());
        }
        let index = self.read_bit_short();
        let rgb = self.read_bit_long() as u32;
        let name_flags = self.read_byte();
        if name_flags & 1 != 0 {
            self.read_variable_text();
        }
        if name_flags & 2 != 0 {
            self.read_variable_text();
        }
        Color::from_true_color(rgb, index)
    }

    /// ENC: entity color with optional true color and transparency.
    pub fn read_en_color(&mut self) -> EnColor {
        if self.version < DwgVersion::AC1018 {
            return EnColor {
                color: Color::from_index(self.read_bit_short()),
                ..EnColor::default()
            };
        }

        let size = self.read_bit_short() as u16;
        if size == 0 {
            return EnColor {
                color: Color::ByBlock,
                ..EnColor::default()
            };
        }

        let flags = size & 0xFF00;
        let index = (size & 0x0FFF) as i16;
        let mut out = EnColor {
            color: Color::from_index(index),
            ..EnColor::default()
        };

        if flags & 0x8000 != 0 {
            let rgb = self.read_bit_long() as u32;
            out.color = match rgb >> 24 {
                0xC0..=0xC3 => Color::from_true_color(rgb, index),
                _ => Color::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
            };
        }
        if flags & 0x4000 != 0 {
            out.has_color_handle = true;
        }
        if flags & 0x2000 != 0 {
            out.transparency = Some(self.read_bit_long() as u32);
        }
        out
    }

    /// OT: BS before R2010; a 2-bit selector plus one or two bytes after.
    pub fn read_object_type(&mut self) -> u16 {
        if self.version >= DwgVersion::AC1024 {
            match self.read_2bits() {
                0 => self.read_byte() as u16,
                1 => 0x1F0 + self.read_byte() as u16,
                _ => self.read_raw_ushort(),
            }
        } else {
            self.read_bit_short() as u16
        }
    }
}

fn decode_text(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, _, _) = encoding.decode(bytes);
    if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text.into_owned()
    }
}

/// Map the drawing code page number stored in the file header to a text
/// encoding. Unknown pages fall back to Windows-1252.
pub fn encoding_from_code_page(code_page: u16) -> &'static Encoding {
    match code_page {
        3 => encoding_rs::ISO_8859_2,
        4 => encoding_rs::ISO_8859_3,
        5 => encoding_rs::ISO_8859_4,
        6 => encoding_rs::ISO_8859_5,
        7 => encoding_rs::ISO_8859_6,
        8 => encoding_rs::ISO_8859_7,
        9 => encoding_rs::ISO_8859_8,
        10 => encoding_rs::WINDOWS_1254,
        22 | 38 => encoding_rs::SHIFT_JIS,
        23 => encoding_rs::MACINTOSH,
        24 | 41 => encoding_rs::BIG5,
        25 | 26 | 40 | 42 => encoding_rs::EUC_KR,
        27 => encoding_rs::IBM866,
        28 => encoding_rs::WINDOWS_1250,
        29 => encoding_rs::WINDOWS_1251,
        31 | 39 => encoding_rs::GBK,
        32 => encoding_rs::WINDOWS_1253,
        33 => encoding_rs::WINDOWS_1254,
        34 => encoding_rs::WINDOWS_1255,
        35 => encoding_rs::WINDOWS_1256,
        36 => encoding_rs::WINDOWS_1257,
        37 => encoding_rs::WINDOWS_874,
        43 => encoding_rs::UTF_16LE,
        44 => encoding_rs::WINDOWS_1258,
        _ => encoding_rs::WINDOWS_1252,
    }
}
