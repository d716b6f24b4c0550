//! LZ77 AC21 decompression.
//!
//! This is the LZ77 variant used exclusively in AC1021 (R2007) DWG files.
//! Literal runs are stored in a shuffled byte order: runs are cut into
//! 32-byte blocks whose 8-byte quarters are reversed, and the tail (under
//! 32 bytes) follows one of 32 fixed block orders. Back-references are
//! encoded by an instruction whose layout depends on the opcode's high
//! nibble.

use tracing::debug;

use super::{Decompressor, Sink, Source};
use crate::error::Result;

/// Decompressor for the LZ77 AC21 variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz77Ac21Decompressor;

impl Decompressor for Lz77Ac21Decompressor {
    fn decompress_into(&self, source: &[u8], dest: &mut [u8]) -> Result<usize> {
        decompress_into(source, dest)
    }
}

/// One contiguous piece of a literal tail: `(source offset, length, reversed)`.
type Segment = (u8, u8, bool);

/// Output order of literal tails of length 0..32, as source segments.
static BLOCK_ORDERS: [&[Segment]; 32] = [
    &[],
    &[(0, 1, false)],
    &[(0, 2, true)],
    &[(0, 3, true)],
    &[(0, 4, false)],
    &[(4, 1, false), (0, 4, false)],
    &[(5, 1, false), (1, 4, false), (0, 1, false)],
    &[(5, 2, true), (1, 4, false), (0, 1, false)],
    &[(0, 8, false)],
    &[(8, 1, false), (0, 8, false)],
    &[(9, 1, false), (1, 8, false), (0, 1, false)],
    &[(9, 2, true), (1, 8, false), (0, 1, false)],
    &[(8, 4, false), (0, 8, false)],
    &[(12, 1, false), (8, 4, false), (0, 8, false)],
    &[(13, 1, false), (9, 4, false), (1, 8, false), (0, 1, false)],
    &[(13, 2, true), (9, 4, false), (1, 8, false), (0, 1, false)],
    &[(8, 8, false), (0, 8, false)],
    &[(9, 8, false), (8, 1, false), (0, 8, false)],
    &[(17, 1, false), (9, 8, false), (1, 8, false), (0, 1, false)],
    &[(16, 3, true), (8, 8, false), (0, 8, false)],
    &[(16, 4, false), (8, 8, false), (0, 8, false)],
    &[(20, 1, false), (16, 4, false), (8, 8, false), (0, 8, false)],
    &[(20, 2, true), (16, 4, false), (8, 8, false), (0, 8, false)],
    &[(20, 3, true), (16, 4, false), (8, 8, false), (0, 8, false)],
    &[(16, 8, false), (8, 8, false), (0, 8, false)],
    &[(17, 8, false), (16, 1, false), (8, 8, false), (0, 8, false)],
    &[
        (25, 1, false),
        (17, 8, false),
        (16, 1, false),
        (8, 8, false),
        (0, 8, false),
    ],
    &[
        (25, 2, true),
        (17, 8, false),
        (16, 1, false),
        (8, 8, false),
        (0, 8, false),
    ],
    &[(24, 4, false), (16, 8, false), (8, 8, false), (0, 8, false)],
    &[
        (28, 1, false),
        (24, 4, false),
        (16, 8, false),
        (8, 8, false),
        (0, 8, false),
    ],
    &[
        (28, 2, true),
        (24, 4, false),
        (16, 8, false),
        (8, 8, false),
        (0, 8, false),
    ],
    &[
        (30, 1, false),
        (26, 4, false),
        (18, 8, false),
        (10, 8, false),
        (2, 8, false),
        (0, 2, true),
    ],
];

/// Decompress `source` into a new buffer of `decompressed_size` bytes.
pub fn decompress(source: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; decompressed_size];
    decompress_into(source, &mut out)?;
    Ok(out)
}

/// Decompress `source` into `dest`. Returns the number of bytes written.
pub fn decompress_into(source: &[u8], dest: &mut [u8]) -> Result<usize> {
    let mut src = Source::new(source);
    let mut dst = Sink::new(dest);
    if source.is_empty() {
        return Ok(0);
    }

    let mut opcode = src.byte();
    let mut length: usize = 0;
    let mut offset: usize = 0;

    if opcode & 0xF0 == 0x20 {
        src.byte();
        src.byte();
        length = (src.byte() & 7) as usize;
    }

    while !src.at_end() && src.is_good() && !dst.is_full() {
        if length == 0 {
            length = literal_length(opcode, &mut src);
        }
        if length > src.remaining() {
            debug!(length, left = src.remaining(), "clamping AC21 literal run");
        }
        copy_literal(src.take(length), length, &mut dst);

        if src.at_end() {
            break;
        }

        opcode = src.byte();
        read_instruction(&mut opcode, &mut offset, &mut length, &mut src);
        loop {
            dst.back_copy(offset, length);
            length = (opcode & 7) as usize;
            if length != 0 || src.at_end() {
                break;
            }
            opcode = src.byte();
            if opcode >> 4 == 0 {
                break;
            }
            if opcode >> 4 == 0x0F {
                opcode &= 0x0F;
            }
            read_instruction(&mut opcode, &mut offset, &mut length, &mut src);
        }
    }

    Ok(dst.position())
}

fn literal_length(opcode: u8, src: &mut Source<'_>) -> usize {
    let mut length = opcode as usize + 8;
    if length == 0x17 {
        let mut n = src.byte() as usize;
        length += n;
        if n == 0xFF {
            loop {
                n = src.byte() as usize;
                n |= (src.byte() as usize) << 8;
                length += n;
                if n != 0xFFFF || !src.is_good() {
                    break;
                }
            }
        }
    }
    length
}

/// Decode one back-reference instruction. `opcode` is left holding the
/// byte whose low three bits give the literal count that follows.
fn read_instruction(opcode: &mut u8, offset: &mut usize, length: &mut usize, src: &mut Source<'_>) {
    let op = *opcode as usize;
    match op >> 4 {
        0 => {
            *length = (op & 0x0F) + 0x13;
            *offset = src.byte() as usize;
            *opcode = src.byte();
            let next = *opcode as usize;
            *length += (next >> 3) & 0x10;
            *offset += ((next & 0x78) << 5) + 1;
        }
        1 => {
            *length = (op & 0x0F) + 3;
            *offset = src.byte() as usize;
            *opcode = src.byte();
            *offset += ((*opcode as usize & 0xF8) << 5) + 1;
        }
        2 => {
            *offset = src.byte() as usize;
            *offset |= (src.byte() as usize) << 8;
            *length = op & 7;
            if op & 8 == 0 {
                *opcode = src.byte();
                *length += *opcode as usize & 0xF8;
            } else {
                *offset += 1;
                *length += (src.byte() as usize) << 3;
                *opcode = src.byte();
                *length += ((*opcode as usize & 0xF8) << 8) + 0x100;
            }
        }
        _ => {
            *length = op >> 4;
            *offset = op & 0x0F;
            *opcode = src.byte();
            *offset += ((*opcode as usize & 0xF8) << 1) + 1;
        }
    }
}

/// Write a literal run of `length` bytes from its shuffled source order.
/// Missing source bytes (truncated input) read as zero.
fn copy_literal(bytes: &[u8], length: usize, dst: &mut Sink<'_>) {
    let padded;
    let bytes = if bytes.len() < length {
        let mut v = bytes.to_vec();
        v.resize(length, 0);
        padded = v;
        &padded[..]
    } else {
        bytes
    };

    let mut chunks = bytes.chunks_exact(32);
    for block in &mut chunks {
        dst.put(&block[24..32]);
        dst.put(&block[16..24]);
        dst.put(&block[8..16]);
        dst.put(&block[0..8]);
    }
    let tail = chunks.remainder();
    for &(start, len, reversed) in BLOCK_ORDERS[tail.len()] {
        let seg = &tail[start as usize..(start + len) as usize];
        if reversed {
            for &b in seg.iter().rev() {
                dst.put_byte(b);
            }
        } else {
            dst.put(seg);
        }
    }
}
