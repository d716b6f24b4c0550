//! Error types for dwg-decode

use std::io;
use thiserror::Error;

/// Main error type for DWG decoding operations.
///
/// Fatal conditions (the file cannot be opened, the version tag is unknown,
/// the file header is unreadable) surface as `Err` from the reader entry
/// points. Everything below that level is reported through the
/// [`NotificationCollection`](crate::notification::NotificationCollection)
/// and only uses these variants to carry context up to the step that
/// records it.
#[derive(Debug, Error)]
pub enum DwgError {
    /// IO error occurred while opening or reading the source file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Version tag at offset 0 is not a supported DWG release
    #[error("Unsupported DWG version: {0:?}")]
    UnsupportedVersion(String),

    /// Page map / section map could not be read
    #[error("Invalid file metadata: {0}")]
    InvalidMetadata(String),

    /// File header could not be read
    #[error("Invalid file header: {0}")]
    InvalidHeader(String),

    /// A named section could not be assembled or parsed
    #[error("Failed to read section {section}: {reason}")]
    SectionRead { section: String, reason: String },

    /// CRC / checksum mismatch
    #[error("Checksum mismatch: expected {expected:#X}, got {actual:#X}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// Invalid sentinel in file
    #[error("Invalid sentinel: {0}")]
    InvalidSentinel(String),

    /// Decompression error
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// Handle points outside of the objects buffer
    #[error("Bad location for handle {handle:#X}: offset {offset}")]
    BadLocation { handle: u64, offset: i64 },

    /// Declared record size exceeds the remaining buffer
    #[error("Bad size for handle {handle:#X}: {size} bytes")]
    BadSize { handle: u64, size: u64 },

    /// A read ran past the end of the bit stream
    #[error("Stream overrun while reading {context} at bit {bit_position}")]
    StreamOverrun { context: String, bit_position: i64 },

    /// The record at a handle is not of the expected type
    #[error("Handle {handle:#X}: expected {expected}, found type code {found}")]
    UnexpectedType {
        handle: u64,
        expected: String,
        found: u16,
    },

    /// A required table control object is missing
    #[error("Missing control object: {0}")]
    MissingControl(String),

    /// Generic parse failure
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for dwg-decode operations
pub type Result<T> = std::result::Result<T, DwgError>;

impl From<String> for DwgError {
    fn from(s: String) -> Self {
        DwgError::Parse(s)
    }
}

impl From<&str> for DwgError {
    fn from(s: &str) -> Self {
        DwgError::Parse(s.to_string())
    }
}
