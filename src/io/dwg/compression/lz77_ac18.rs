//! LZ77 AC18 decompression.
//!
//! This is the LZ77 variant used in AC1018 (R2004), AC1024 (R2010),
//! AC1027 (R2013), and AC1032 (R2018) DWG files.
//!
//! The stream opens with an optional literal run, then alternates between
//! back-reference opcodes and literal runs until opcode `0x11`:
//!
//! | opcode      | copy length              | distance                       |
//! |-------------|--------------------------|--------------------------------|
//! | `0x10`      | long count + 9           | two-byte offset + 0x4000       |
//! | `0x12-0x1F` | `(op & 7) + 2`           | two-byte offset + 0x4000 (+0x4000 if `op & 8`) |
//! | `0x20`      | long count + 0x21        | two-byte offset + 1            |
//! | `0x21-0x3F` | `op - 0x1E`              | two-byte offset + 1            |
//! | `0x40-0xFF` | `(op >> 4) - 1`          | `((op >> 2) & 3 | next << 2) + 1` |
//!
//! The low two bits of the last offset byte (or of a short opcode) give the
//! number of literal bytes that follow. Zero means the next byte is either
//! an extended literal length (`0x00-0x0F`) or the next opcode.

use tracing::debug;

use super::{Decompressor, Sink, Source};
use crate::error::{DwgError, Result};

/// Decompressor for the LZ77 AC18 variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz77Ac18Decompressor;

impl Decompressor for Lz77Ac18Decompressor {
    fn decompress_into(&self, source: &[u8], dest: &mut [u8]) -> Result<usize> {
        decompress_into(source, dest)
    }
}

/// Decompress `source` into a new buffer of `decompressed_size` bytes.
pub fn decompress(source: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; decompressed_size];
    decompress_into(source, &mut out)?;
    Ok(out)
}

/// Decompress `source` into `dest`. Returns the number of bytes written.
///
/// Lengths that would overflow `dest` are clamped. Running out of input
/// ends decoding without error; an opcode in `0x00..0x10` where a copy
/// opcode is expected is an error.
pub fn decompress_into(source: &[u8], dest: &mut [u8]) -> Result<usize> {
    let mut src = Source::new(source);
    let mut dst = Sink::new(dest);

    let mut opcode = src.byte();
    if opcode & 0xF0 == 0 {
        let count = literal_count(opcode, &mut src) + 3;
        opcode = copy_literal(count, &mut src, &mut dst);
    }

    while opcode != 0x11 && src.is_good() && !dst.is_full() {
        let count: usize;
        let distance: usize;

        if opcode >= 0x40 {
            count = ((opcode >> 4) - 1) as usize;
            let next = src.byte();
            distance = ((((opcode >> 2) & 3) as usize) | ((next as usize) << 2)) + 1;
        } else if opcode >= 0x20 {
            count = compressed_count(opcode, 0x1F, &mut src);
            let (offset, last) = two_byte_offset(&mut src);
            distance = offset + 1;
            opcode = last;
        } else if opcode >= 0x10 {
            count = compressed_count(opcode, 0x07, &mut src);
            let high = ((opcode & 8) as usize) << 11;
            let (offset, last) = two_byte_offset(&mut src);
            distance = (high | offset) + 0x4000;
            opcode = last;
        } else {
            return Err(DwgError::Decompression(format!(
                "invalid opcode {:#04X} at input offset {}",
                opcode,
                src.position().saturating_sub(1)
            )));
        }

        if count > dst.room() {
            debug!(count, room = dst.room(), "clamping AC18 back-reference");
        }
        dst.back_copy(distance, count);

        let mut literal = (opcode & 3) as usize;
        if literal == 0 {
            opcode = src.byte();
            if opcode & 0xF0 == 0 {
                literal = literal_count(opcode, &mut src) + 3;
            }
        }
        if literal > 0 {
            opcode = copy_literal(literal, &mut src, &mut dst);
        }
    }

    Ok(dst.position())
}

/// Copy a literal run and return the opcode that follows it.
fn copy_literal(count: usize, src: &mut Source<'_>, dst: &mut Sink<'_>) -> u8 {
    if count > dst.room() {
        debug!(count, room = dst.room(), "clamping AC18 literal run");
    }
    let bytes = src.take(count);
    dst.put(bytes);
    src.byte()
}

/// Literal length: the low nibble, or for zero `0x0F` plus 0xFF per zero
/// byte plus the first non-zero byte.
fn literal_count(code: u8, src: &mut Source<'_>) -> usize {
    let mut count = (code & 0x0F) as usize;
    if count == 0 {
        let mut last = src.byte();
        while last == 0 && src.is_good() {
            count += 0xFF;
            last = src.byte();
        }
        count += 0x0F + last as usize;
    }
    count
}

fn compressed_count(opcode: u8, valid_bits: u8, src: &mut Source<'_>) -> usize {
    let mut count = (opcode & valid_bits) as usize;
    if count == 0 {
        let mut last = src.byte();
        while last == 0 && src.is_good() {
            count += 0xFF;
            last = src.byte();
        }
        count += last as usize + valid_bits as usize;
    }
    count + 2
}

/// Read the two-byte offset. Returns the offset and the first byte, whose
/// low two bits carry the following literal count.
fn two_byte_offset(src: &mut Source<'_>) -> (usize, u8) {
    let first = src.byte();
    let second = src.byte();
    let offset = ((first as usize) >> 2) | ((second as usize) << 6);
    (offset, first)
}
