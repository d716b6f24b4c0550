//! Layer table entry

use crate::types::{Color, Handle, LineWeight};

use super::TableEntryCommon;

/// Layer state flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayerFlags {
    pub frozen: bool,
    /// Layer is off (invisible)
    pub off: bool,
    /// Frozen in new viewports
    pub frozen_in_new: bool,
    pub locked: bool,
    pub plottable: bool,
}

impl LayerFlags {
    /// Decode the R2000+ packed flag short.
    pub fn from_bits(bits: i16) -> Self {
        LayerFlags {
            frozen: bits & 0x01 != 0,
            off: bits & 0x02 != 0,
            frozen_in_new: bits & 0x04 != 0,
            locked: bits & 0x08 != 0,
            plottable: bits & 0x10 != 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layer {
    pub entry: TableEntryCommon,
    pub flags: LayerFlags,
    pub color: Color,
    pub line_weight: LineWeight,
    pub linetype: Handle,
    /// R2000+
    pub plotstyle: Handle,
    /// R2007+
    pub material: Handle,
}

impl Layer {
    /// A layer is hidden when it is off or frozen.
    pub fn is_visible(&self) -> bool {
        !self.flags.off && !self.flags.frozen
    }
}

impl_table_entry!(Layer, "LAYER");
