//! Line weight representation for DWG records

use std::fmt;

/// Widths in 1/100 mm addressed by the DWG line weight index 0..=23.
const DWG_WIDTHS: [i16; 24] = [
    0, 5, 9, 13, 15, 18, 20, 25, 30, 35, 40, 50, 53, 60, 70, 80, 90, 100, 106, 120, 140, 158, 200,
    211,
];

/// Represents a line weight.
///
/// DWG files store a small index rather than the width itself: 0..=23 are
/// fixed widths, 29 is by-layer, 30 by-block and 31 the drawing default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LineWeight {
    /// Use the layer's line weight
    #[default]
    ByLayer,
    /// Use the block's line weight
    ByBlock,
    /// Default line weight
    Default,
    /// Specific line weight in 1/100 mm
    Value(i16),
}

impl LineWeight {
    /// Decode the stored line weight index.
    pub fn from_dwg_index(index: u8) -> Self {
        match index {
            0..=23 => LineWeight::Value(DWG_WIDTHS[index as usize]),
            29 => LineWeight::ByLayer,
            30 => LineWeight::ByBlock,
            _ => LineWeight::Default,
        }
    }

    /// Get the width in 1/100 mm, or the DXF sentinel for the special kinds
    pub fn value(&self) -> i16 {
        match self {
            LineWeight::ByLayer => -1,
            LineWeight::ByBlock => -2,
            LineWeight::Default => -3,
            LineWeight::Value(v) => *v,
        }
    }

    /// Get the line weight in millimeters
    pub fn millimeters(&self) -> Option<f64> {
        match self {
            LineWeight::Value(v) => Some(*v as f64 / 100.0),
            _ => None,
        }
    }
}

impl fmt::Display for LineWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineWeight::ByLayer => write!(f, "ByLayer"),
            LineWeight::ByBlock => write!(f, "ByBlock"),
            LineWeight::Default => write!(f, "Default"),
            LineWeight::Value(v) => write!(f, "{:.2}mm", *v as f64 / 100.0),
        }
    }
}
