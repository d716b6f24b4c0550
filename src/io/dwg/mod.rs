//! DWG binary format decoding.
//!
//! # Module Structure
//!
//! - [`constants`]: sentinels, section names, magic numbers
//! - [`crc`]: CRC-8 (16-bit) and the R2004+ page checksum
//! - [`encryption`]: R2004+ header and data page header masks
//! - [`reed_solomon`]: interleaved (255,239) and (255,251) decoders for R2007
//! - [`compression`]: LZ77 AC18 and AC21 decompressors
//! - [`file_header`]: section directories (AC15, AC18, AC21)
//! - [`layout`]: per-version layout strategy
//! - [`object_type`]: built-in object type codes
//! - [`reader`]: bit cursor, section readers and the record dispatcher

pub mod compression;
pub mod constants;
pub mod crc;
pub mod encryption;
pub mod file_header;
pub mod layout;
pub mod object_type;
pub mod reader;
pub mod reed_solomon;

pub use compression::Decompressor;
pub use file_header::{DwgFileHeader, PageInfo, SectionInfo};
pub use layout::VersionLayout;
pub use object_type::ObjectType;
pub use reader::{DwgReader, DwgReaderConfiguration};
