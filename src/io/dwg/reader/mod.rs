//! DWG bit-level stream readers and section readers.
//!
//! ## Streams
//! - [`bit_reader`]: the bit cursor over one buffer
//! - [`merged_reader`]: main, text and handle streams of one record
//!
//! ## Sections
//! - [`header_reader`]: `AcDb:Header` (header variables)
//! - [`classes_reader`]: `AcDb:Classes` (class table)
//! - [`handle_reader`]: `AcDb:Handles` (object map)
//! - [`object_reader`]: records of `AcDb:AcDbObjects`
//!
//! [`dwg_reader`] drives them in reading order.

pub mod bit_reader;
pub mod merged_reader;

pub mod classes_reader;
pub mod dwg_reader;
pub mod handle_reader;
pub mod header_reader;
pub mod object_reader;

pub use bit_reader::DwgBitReader;
pub use merged_reader::DwgMergedReader;

pub use classes_reader::{ClassEntry, ClassTable, DwgClassesReader};
pub use dwg_reader::{DwgFileInfo, DwgReader, DwgReaderConfiguration};
pub use handle_reader::{DwgHandleReader, ObjectMap};
pub use header_reader::DwgHeaderReader;
pub use object_reader::DwgObjectReader;
