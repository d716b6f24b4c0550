//! Text style table entry

use super::TableEntryCommon;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextStyle {
    pub entry: TableEntryCommon,
    pub vertical: bool,
    /// Entry names a shape file, not a font.
    pub is_shape_file: bool,
    /// 0 when the height is not fixed
    pub fixed_height: f64,
    pub width_factor: f64,
    pub oblique_angle: f64,
    /// 0x02 backwards, 0x04 upside down
    pub generation: u8,
    pub last_height: f64,
    pub font_file: String,
    pub big_font_file: String,
}

impl TextStyle {
    pub fn is_backward(&self) -> bool {
        self.generation & 0x02 != 0
    }

    pub fn is_upside_down(&self) -> bool {
        self.generation & 0x04 != 0
    }
}

impl_table_entry!(TextStyle, "STYLE");
