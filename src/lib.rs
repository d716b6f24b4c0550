//! # dwg-decode
//!
//! A pure Rust, read-only decoder for the DWG binary CAD format, from R13
//! (AC1012) through R2018 (AC1032).
//!
//! ## Features
//!
//! - All three section directory layouts: the flat R13-R2000 locator table,
//!   the paged R2004+ maps and the Reed-Solomon protected R2007 layout
//! - Both page decompressors (R2004 and R2007 LZ77 variants)
//! - Header variables, classes, the object map, symbol tables, block
//!   definitions, 30+ entity types and image definitions
//! - Corrupt input is reported, never trusted: every read is bounds-checked
//!   and a failing record is skipped without stopping the run
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dwg_decode::{DwgReader, Record};
//!
//! let mut reader = DwgReader::from_file("sample.dwg")?;
//! let records = reader.read_records()?;
//!
//! for record in records.model_space() {
//!     if let Record::Line(line) = record {
//!         println!("line {:?} -> {:?}", line.start, line.end);
//!     }
//! }
//! for note in reader.notifications().iter() {
//!     eprintln!("{}", note);
//! }
//! # Ok::<(), dwg_decode::DwgError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`DwgReader`] walks the file in a fixed order and pushes records into
//!   a [`DwgSink`]; [`RecordCollector`] is the sink that keeps everything
//! - [`Record`] is the closed set of decoded records; records refer to each
//!   other by [`Handle`] only
//! - Diagnostics go to a [`NotificationCollection`] owned by the reader

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod entities;
pub mod error;
pub mod header;
pub mod io;
pub mod notification;
pub mod objects;
pub mod record;
pub mod sink;
pub mod tables;
pub mod types;

// Re-export commonly used types
pub use error::{DwgError, Result};
pub use header::{ControlHandles, HeaderValue, HeaderVariables};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use record::{ExtendedData, Record};
pub use sink::{DwgSink, RecordCollector};
pub use types::{Color, DwgVersion, Handle, LineWeight, Vector2, Vector3};

// Re-export entity types
pub use entities::{
    Arc, Circle, Dimension, Ellipse, Entity, EntityCommon, Hatch, Insert, Line, LwPolyline,
    MText, Point, Polyline, Spline, Text,
};

// Re-export table types
pub use tables::{
    AppId, BlockRecord, DimStyle, Layer, LineType, Table, TableControl, TableEntry, TextStyle,
    VPort,
};

pub use objects::ImageDefinition;

// Re-export I/O types
pub use io::dwg::reader::DwgFileInfo;
pub use io::{DwgReader, DwgReaderConfiguration};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
