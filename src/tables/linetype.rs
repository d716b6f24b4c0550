//! Linetype table entry

use crate::types::{Handle, Vector2};

use super::TableEntryCommon;

/// One dash of a linetype pattern, possibly carrying a shape or text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineTypeSegment {
    /// Positive for a dash, negative for a gap, 0 for a dot
    pub length: f64,
    /// Shape number, or offset into the string area for text segments
    pub shape_number: i16,
    pub offset: Vector2,
    pub scale: f64,
    pub rotation: f64,
    /// 0x01 absolute rotation, 0x02 text, 0x04 shape
    pub shape_flag: i16,
    /// Style or shape file of the embedded element.
    pub style: Handle,
    /// Text of a text segment, taken from the string area.
    pub text: Option<String>,
}

impl LineTypeSegment {
    pub fn is_text(&self) -> bool {
        self.shape_flag & 0x02 != 0
    }

    pub fn is_shape(&self) -> bool {
        self.shape_flag & 0x04 != 0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineType {
    pub entry: TableEntryCommon,
    pub description: String,
    pub pattern_length: f64,
    /// Always `b'A'` in practice
    pub alignment: u8,
    pub segments: Vec<LineTypeSegment>,
    /// Raw string area, when stored.
    pub string_area: Vec<u8>,
}

impl LineType {
    /// A linetype without dashes draws a continuous line.
    pub fn is_continuous(&self) -> bool {
        self.segments.is_empty()
    }
}

impl_table_entry!(LineType, "LTYPE");
