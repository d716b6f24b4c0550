//! Constants, sentinel bytes, and magic numbers for the DWG file format.

/// Section names as they appear in the R2004+ section map.
pub mod section_names {
    /// All entities, table entries, and objects
    pub const ACDB_OBJECTS: &str = "AcDb:AcDbObjects";
    /// System variables (header variables)
    pub const HEADER: &str = "AcDb:Header";
    /// DXF class definitions
    pub const CLASSES: &str = "AcDb:Classes";
    /// Object map (handle → file offset)
    pub const HANDLES: &str = "AcDb:Handles";
    /// Auxiliary header data
    pub const AUX_HEADER: &str = "AcDb:AuxHeader";
    pub const OBJ_FREE_SPACE: &str = "AcDb:ObjFreeSpace";
    pub const TEMPLATE: &str = "AcDb:Template";

    /// Record index of a section in the pre-2004 locator table.
    pub fn locator_index(name: &str) -> Option<u8> {
        match name {
            HEADER => Some(super::section_locator::HEADER),
            CLASSES => Some(super::section_locator::CLASSES),
            HANDLES => Some(super::section_locator::HANDLES),
            OBJ_FREE_SPACE => Some(super::section_locator::OBJ_FREE_SPACE),
            TEMPLATE => Some(super::section_locator::TEMPLATE),
            AUX_HEADER => Some(super::section_locator::AUX_HEADER),
            _ => None,
        }
    }

    /// Section name of a pre-2004 locator record.
    pub fn locator_name(index: u8) -> Option<&'static str> {
        match index {
            super::section_locator::HEADER => Some(HEADER),
            super::section_locator::CLASSES => Some(CLASSES),
            super::section_locator::HANDLES => Some(HANDLES),
            super::section_locator::OBJ_FREE_SPACE => Some(OBJ_FREE_SPACE),
            super::section_locator::TEMPLATE => Some(TEMPLATE),
            super::section_locator::AUX_HEADER => Some(AUX_HEADER),
            _ => None,
        }
    }
}

/// Sentinel bytes for section boundaries (16-byte markers).
pub mod sentinels {
    /// AcDb:Header section start sentinel
    pub const HEADER_START: [u8; 16] = [
        0xCF, 0x7B, 0x1F, 0x23, 0xFD, 0xDE, 0x38, 0xA9, 0x5F, 0x7C, 0x68, 0xB8, 0x4E, 0x6D,
        0x33, 0x5F,
    ];
    /// AcDb:Header section end sentinel
    pub const HEADER_END: [u8; 16] = [
        0x30, 0x84, 0xE0, 0xDC, 0x02, 0x21, 0xC7, 0x56, 0xA0, 0x83, 0x97, 0x47, 0xB1, 0x92,
        0xCC, 0xA0,
    ];
    /// AcDb:Classes section start sentinel
    pub const CLASSES_START: [u8; 16] = [
        0x8D, 0xA1, 0xC4, 0xB8, 0xC4, 0xA9, 0xF8, 0xC5, 0xC0, 0xDC, 0xF4, 0x5F, 0xE7, 0xCF,
        0xB6, 0x8A,
    ];
    /// AcDb:Classes section end sentinel
    pub const CLASSES_END: [u8; 16] = [
        0x72, 0x5E, 0x3B, 0x47, 0x3B, 0x56, 0x07, 0x3A, 0x3F, 0x23, 0x0B, 0xA0, 0x18, 0x30,
        0x49, 0x75,
    ];
    /// End of the pre-2004 file header
    pub const FILE_HEADER_END_AC15: [u8; 16] = [
        0x95, 0xA0, 0x4E, 0x28, 0x99, 0x82, 0x1A, 0xE5, 0x5E, 0x41, 0xE0, 0x5F, 0x9D, 0x3A,
        0x4D, 0x00,
    ];
}

/// Record indices of the pre-2004 section locator table.
pub mod section_locator {
    pub const HEADER: u8 = 0;
    pub const CLASSES: u8 = 1;
    pub const HANDLES: u8 = 2;
    pub const OBJ_FREE_SPACE: u8 = 3;
    pub const TEMPLATE: u8 = 4;
    pub const AUX_HEADER: u8 = 5;
}

/// Pre-2004 file header constants.
pub mod ac15 {
    /// Offset of the locator record count.
    pub const RECORD_COUNT_OFFSET: u64 = 0x15;

    /// Value XORed into the locator CRC, keyed by record count.
    pub fn crc_xor(record_count: i32) -> u16 {
        match record_count {
            3 => 0xA598,
            4 => 0x8101,
            5 => 0x3CC4,
            6 => 0x8461,
            _ => 0,
        }
    }
}

/// R2004+ paged file constants.
pub mod ac18 {
    /// Size of the encrypted header metadata block at offset 0x80
    pub const ENCRYPTED_HEADER_SIZE: usize = 0x6C;
    /// File identification string of the decrypted header
    pub const FILE_ID: &[u8] = b"AcFssFcAJMB\0";
    /// XOR mask for data page header decryption
    pub const DECRYPTION_MASK: u32 = 0x4164536B;
    /// Page addresses in the page map start after the file header.
    pub const PAGE_BASE_ADDRESS: u64 = 0x100;
    /// Data page type marker
    pub const PAGE_TYPE_DATA: u32 = 0x4163043B;
    /// Page map page type marker
    pub const PAGE_TYPE_PAGE_MAP: u32 = 0x41630E3B;
    /// Section map page type marker
    pub const PAGE_TYPE_SECTION_MAP: u32 = 0x4163003B;
    /// System page header: type, decompressed, compressed, compression, checksum.
    pub const SYSTEM_PAGE_HEADER_SIZE: usize = 20;
    /// Encrypted data page header.
    pub const DATA_PAGE_HEADER_SIZE: usize = 32;
}

/// R2007 file constants.
pub mod ac21 {
    /// Base file offset where pages begin
    pub const DATA_PAGE_BASE_OFFSET: u64 = 0x480;
    /// Reed-Solomon encoded file header block at offset 0x80
    pub const RS_ENCODED_BLOCK_SIZE: usize = 0x2FD;
    /// Size of the decompressed header metadata
    pub const DECOMPRESSED_HEADER_SIZE: usize = 0x110;
    /// Codewords in the file header block.
    pub const HEADER_CODEWORDS: usize = 3;
    /// Page data encoding that requires (255,251) decoding.
    pub const PAGE_ENCODING_RS: u64 = 4;
}

/// Handle section framing.
pub mod handle_section {
    /// Maximum sub-section body size
    pub const MAX_CHUNK_SIZE: usize = 2032;
    /// CRC seed of each sub-section
    pub const CRC_SEED: u16 = 0xC0C1;
}
