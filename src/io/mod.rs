//! I/O module for decoding DWG files

pub mod dwg;

pub use dwg::{DwgReader, DwgReaderConfiguration};
