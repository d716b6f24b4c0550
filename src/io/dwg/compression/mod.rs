//! LZ77 decompression for DWG pages.
//!
//! The DWG format uses two LZ77 variants:
//! - **AC18** (R2004, R2010, R2013, R2018): opcode-driven copy/literal stream
//! - **AC21** (R2007): opcode nibbles with permuted literal blocks
//!
//! Both decoders are bounds-safe: copies that would run past the output are
//! clamped, back-references before the start read zeros, and running out of
//! input ends the page with whatever has been produced.

pub mod lz77_ac18;
pub mod lz77_ac21;

pub use lz77_ac18::Lz77Ac18Decompressor;
pub use lz77_ac21::Lz77Ac21Decompressor;

use crate::error::Result;

/// Trait for decompressing a page payload.
pub trait Decompressor {
    /// Decompress `source`, returning exactly `decompressed_size` bytes.
    fn decompress(&self, source: &[u8], decompressed_size: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; decompressed_size];
        self.decompress_into(source, &mut out)?;
        Ok(out)
    }

    /// Decompress into `dest`, returning the number of bytes produced.
    fn decompress_into(&self, source: &[u8], dest: &mut [u8]) -> Result<usize>;
}

/// Input cursor that reads zero past the end and remembers it did.
pub(crate) struct Source<'a> {
    data: &'a [u8],
    pos: usize,
    good: bool,
}

impl<'a> Source<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            good: true,
        }
    }

    #[inline]
    pub(crate) fn byte(&mut self) -> u8 {
        match self.data.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                b
            }
            None => {
                self.good = false;
                0
            }
        }
    }

    pub(crate) fn is_good(&self) -> bool {
        self.good
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Borrow the next `count` bytes, clamped to what is left.
    pub(crate) fn take(&mut self, count: usize) -> &'a [u8] {
        let count = if count > self.remaining() {
            self.good = false;
            self.remaining()
        } else {
            count
        };
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        slice
    }
}

/// Output cursor with clamped writes.
pub(crate) struct Sink<'a> {
    data: &'a mut [u8],
    pos: usize,
}

impl<'a> Sink<'a> {
    pub(crate) fn new(data: &'a mut [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_full(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn room(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Copy `count` bytes starting `distance` bytes back. Overlapping runs
    /// repeat; positions before the start read as zero.
    pub(crate) fn back_copy(&mut self, distance: usize, count: usize) {
        let count = count.min(self.room());
        for _ in 0..count {
            let b = if distance == 0 || distance > self.pos {
                0
            } else {
                self.data[self.pos - distance]
            };
            self.data[self.pos] = b;
            self.pos += 1;
        }
    }

    /// Append bytes, dropping whatever does not fit.
    pub(crate) fn put(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(self.room());
        self.data[self.pos..self.pos + n].copy_from_slice(&bytes[..n]);
        self.pos += n;
    }

    pub(crate) fn put_byte(&mut self, b: u8) {
        if self.pos < self.data.len() {
            self.data[self.pos] = b;
            self.pos += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_back_copy_overlaps() {
        let mut buf = [0u8; 6];
        let mut sink = Sink::new(&mut buf);
        sink.put(&[1, 2]);
        sink.back_copy(2, 4);
        assert_eq!(buf, [1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn test_sink_clamps() {
        let mut buf = [0u8; 3];
        let mut sink = Sink::new(&mut buf);
        sink.put(&[1, 2, 3, 4, 5]);
        assert!(sink.is_full());
        sink.back_copy(1, 10);
        sink.put_byte(9);
        assert_eq!(buf, [1, 2, 3]);
    }

    #[test]
    fn test_sink_back_copy_before_start_is_zero() {
        let mut buf = [0xAAu8; 3];
        let mut sink = Sink::new(&mut buf);
        sink.put(&[7]);
        sink.back_copy(5, 2);
        assert_eq!(buf, [7, 0, 0]);
    }

    #[test]
    fn test_source_take_clamps() {
        let data = [1u8, 2, 3];
        let mut src = Source::new(&data);
        assert_eq!(src.take(2), &[1, 2]);
        assert_eq!(src.take(5), &[3]);
        assert!(!src.is_good());
        assert_eq!(src.byte(), 0);
    }
}
