//! Core value types shared by the decoder and the decoded records.

mod color;
mod handle;
mod line_weight;
mod vector;

pub use color::Color;
pub use handle::{Handle, HandleRef, ReferenceType};
pub use line_weight::LineWeight;
pub use vector::{Vector2, Vector3};

use std::fmt;

/// DWG release, identified by the six-character tag at file offset 0.
///
/// Variants are ordered by release so `version >= DwgVersion::AC1018`
/// reads as "R2004 or later".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DwgVersion {
    /// R13
    AC1012,
    /// R14
    AC1014,
    /// R2000 / R2000i / R2002
    AC1015,
    /// R2004 / R2005 / R2006
    AC1018,
    /// R2007 / R2008 / R2009
    AC1021,
    /// R2010 / R2011 / R2012
    AC1024,
    /// R2013 .. R2017
    AC1027,
    /// R2018+
    AC1032,
}

impl DwgVersion {
    /// Every supported release, oldest first.
    pub const ALL: [DwgVersion; 8] = [
        DwgVersion::AC1012,
        DwgVersion::AC1014,
        DwgVersion::AC1015,
        DwgVersion::AC1018,
        DwgVersion::AC1021,
        DwgVersion::AC1024,
        DwgVersion::AC1027,
        DwgVersion::AC1032,
    ];

    /// Parse the version tag (`"AC1015"`, ...). Returns `None` for anything
    /// this decoder does not handle, including pre-R13 releases.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "AC1012" => Some(DwgVersion::AC1012),
            "AC1014" => Some(DwgVersion::AC1014),
            "AC1015" => Some(DwgVersion::AC1015),
            "AC1018" => Some(DwgVersion::AC1018),
            "AC1021" => Some(DwgVersion::AC1021),
            "AC1024" => Some(DwgVersion::AC1024),
            "AC1027" => Some(DwgVersion::AC1027),
            "AC1032" => Some(DwgVersion::AC1032),
            _ => None,
        }
    }

    /// The six-character tag as stored in the file.
    pub fn tag(&self) -> &'static str {
        match self {
            DwgVersion::AC1012 => "AC1012",
            DwgVersion::AC1014 => "AC1014",
            DwgVersion::AC1015 => "AC1015",
            DwgVersion::AC1018 => "AC1018",
            DwgVersion::AC1021 => "AC1021",
            DwgVersion::AC1024 => "AC1024",
            DwgVersion::AC1027 => "AC1027",
            DwgVersion::AC1032 => "AC1032",
        }
    }

    /// Marketing name of the release.
    pub fn release_name(&self) -> &'static str {
        match self {
            DwgVersion::AC1012 => "R13",
            DwgVersion::AC1014 => "R14",
            DwgVersion::AC1015 => "R2000",
            DwgVersion::AC1018 => "R2004",
            DwgVersion::AC1021 => "R2007",
            DwgVersion::AC1024 => "R2010",
            DwgVersion::AC1027 => "R2013",
            DwgVersion::AC1032 => "R2018",
        }
    }
}

impl fmt::Display for DwgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
