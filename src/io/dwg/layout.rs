//! Per-version layout strategy.
//!
//! Every DWG release changes a handful of structural details: how the file
//! header locates sections, which page compressor applies, whether strings
//! and handles live in separate streams, how colors and type codes are
//! encoded. [`VersionLayout`] is computed once per file so the decoders ask
//! a named question (`layout.string_stream`) instead of repeating release
//! comparisons at every call site.

use crate::notification::NotificationCollection;
use crate::types::DwgVersion;

/// How the file header describes the sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    /// R13-R2000: flat locator table of (number, address, size).
    Flat,
    /// R2004 and R2010+: encrypted header, page map and section map.
    Paged,
    /// R2007: Reed-Solomon protected, compressed header and maps.
    ReedSolomon,
}

/// Page compressor of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCompression {
    None,
    Lz77Ac18,
    Lz77Ac21,
}

/// Version-dependent layout decisions for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionLayout {
    pub version: DwgVersion,
    pub directory: DirectoryKind,
    pub compression: PageCompression,

    /// R13-R14 only
    pub r13_14_only: bool,
    /// R13-R2000 only
    pub r13_15_only: bool,
    /// R2000+
    pub r2000_plus: bool,
    /// R2004+
    pub r2004_plus: bool,
    /// R2007+
    pub r2007_plus: bool,
    /// R2010+
    pub r2010_plus: bool,
    /// R2013+
    pub r2013_plus: bool,
    /// R2018+
    pub r2018_plus: bool,

    /// Object records start with an RL giving the end of their data stream.
    pub object_bit_size_first: bool,
    /// Strings live in a separate stream located from the end of the record.
    pub string_stream: bool,
    /// Records carry an MC handle-stream size after the MS record size.
    pub handle_stream_size: bool,
    /// Object types use the 2-bit prefixed encoding.
    pub compact_object_type: bool,
    /// Entities carry previous/next entity links (with a `nolinks` bit).
    pub entity_links: bool,
    /// Block records list owned entities explicitly instead of first/last.
    pub owned_object_list: bool,
    /// Colors carry true-color and book data.
    pub true_color: bool,
}

impl VersionLayout {
    pub fn new(version: DwgVersion) -> Self {
        let directory = match version {
            DwgVersion::AC1012 | DwgVersion::AC1014 | DwgVersion::AC1015 => DirectoryKind::Flat,
            DwgVersion::AC1021 => DirectoryKind::ReedSolomon,
            _ => DirectoryKind::Paged,
        };
        let compression = match directory {
            DirectoryKind::Flat => PageCompression::None,
            DirectoryKind::Paged => PageCompression::Lz77Ac18,
            DirectoryKind::ReedSolomon => PageCompression::Lz77Ac21,
        };
        Self {
            version,
            directory,
            compression,
            r13_14_only: version <= DwgVersion::AC1014,
            r13_15_only: version <= DwgVersion::AC1015,
            r2000_plus: version >= DwgVersion::AC1015,
            r2004_plus: version >= DwgVersion::AC1018,
            r2007_plus: version >= DwgVersion::AC1021,
            r2010_plus: version >= DwgVersion::AC1024,
            r2013_plus: version >= DwgVersion::AC1027,
            r2018_plus: version >= DwgVersion::AC1032,
            object_bit_size_first: version >= DwgVersion::AC1015 && version < DwgVersion::AC1024,
            string_stream: version >= DwgVersion::AC1021,
            handle_stream_size: version >= DwgVersion::AC1024,
            compact_object_type: version >= DwgVersion::AC1024,
            entity_links: version < DwgVersion::AC1018,
            owned_object_list: version >= DwgVersion::AC1018,
            true_color: version >= DwgVersion::AC1018,
        }
    }

    /// The header section carries an extra RL after its size.
    pub fn header_has_extra_size(&self, maintenance_version: u8) -> bool {
        (self.r2010_plus && maintenance_version > 3) || self.r2018_plus
    }

    /// Compare a sentinel and record a warning on mismatch.
    pub fn check_sentinel(
        actual: &[u8; 16],
        expected: &[u8; 16],
        section_name: &str,
        notifications: &mut NotificationCollection,
    ) -> bool {
        if actual == expected {
            true
        } else {
            notifications.warn(format!("Invalid section sentinel found in {}", section_name));
            false
        }
    }
}
