//! Obfuscation layers of the R2004+ file format.
//!
//! 1. **LCG XOR** over the 0x6C-byte file header metadata at offset 0x80.
//!    The mask stream comes from the MSVC `rand()` generator seeded with 1.
//! 2. **Position XOR** over each 32-byte data page header. Every i32 field
//!    is XORed with `0x4164536B ^ page_address`.

use byteorder::{ByteOrder, LittleEndian};

use super::constants::ac18;

/// Undo the LCG mask on the R2004+ file header metadata in place.
pub fn decrypt_file_header(data: &mut [u8]) {
    let mut seed: u32 = 1;
    for byte in data.iter_mut() {
        seed = seed.wrapping_mul(0x343FD).wrapping_add(0x269EC3);
        *byte ^= (seed >> 16) as u8;
    }
}

/// Decrypted R2004+ data page header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPageHeader {
    /// Should be `0x4163043B`.
    pub page_type: u32,
    pub section_number: i32,
    pub compressed_size: i32,
    pub page_size: i32,
    /// Offset of this page in the decompressed section stream.
    pub start_offset: i64,
    /// Checksum of the header with this field zeroed, seeded with `data_checksum`.
    pub header_checksum: u32,
    /// Checksum of the compressed bytes, seed 0.
    pub data_checksum: u32,
    pub unknown: i32,
}

/// Decrypt a data page header read at file position `address`.
pub fn decrypt_data_page_header(data: &[u8; 32], address: u64) -> DataPageHeader {
    let mask = ac18::DECRYPTION_MASK ^ (address as u32);
    let mut fields = [0u32; 8];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = LittleEndian::read_u32(&data[i * 4..i * 4 + 4]) ^ mask;
    }
    DataPageHeader {
        page_type: fields[0],
        section_number: fields[1] as i32,
        compressed_size: fields[2] as i32,
        page_size: fields[3] as i32,
        start_offset: fields[4] as i32 as i64,
        header_checksum: fields[5],
        data_checksum: fields[6],
        unknown: fields[7] as i32,
    }
}

impl DataPageHeader {
    /// Plain little-endian bytes of the header, `header_checksum` zeroed.
    pub fn checksum_bytes(&self) -> [u8; 32] {
        let fields = [
            self.page_type,
            self.section_number as u32,
            self.compressed_size as u32,
            self.page_size as u32,
            self.start_offset as u32,
            0,
            self.data_checksum,
            self.unknown as u32,
        ];
        let mut out = [0u8; 32];
        for (i, f) in fields.iter().enumerate() {
            LittleEndian::write_u32(&mut out[i * 4..i * 4 + 4], *f);
        }
        out
    }
}
