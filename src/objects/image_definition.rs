//! Raster image definition (`IMAGEDEF`)

use crate::record::ExtendedData;
use crate::types::{Handle, Vector2};

/// Unit of [`ImageDefinition::pixel_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionUnit {
    #[default]
    None,
    Centimeters,
    Inches,
}

impl ResolutionUnit {
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => ResolutionUnit::Centimeters,
            5 => ResolutionUnit::Inches,
            _ => ResolutionUnit::None,
        }
    }
}

/// The file behind one or more IMAGE entities.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageDefinition {
    pub handle: Handle,
    pub owner: Handle,
    pub class_version: i32,
    /// Image size in pixels
    pub size: Vector2,
    pub file_path: String,
    pub is_loaded: bool,
    pub resolution_unit: ResolutionUnit,
    /// Size of one pixel in `resolution_unit`s
    pub pixel_size: Vector2,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: Vec<ExtendedData>,
}

impl ImageDefinition {
    /// File name without its directory.
    pub fn file_name(&self) -> &str {
        self.file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_strips_directories() {
        let def = ImageDefinition {
            file_path: "C:\\scans\\site.png".into(),
            ..Default::default()
        };
        assert_eq!(def.file_name(), "site.png");
    }

    #[test]
    fn test_resolution_unit_codes() {
        assert_eq!(ResolutionUnit::from_code(2), ResolutionUnit::Centimeters);
        assert_eq!(ResolutionUnit::from_code(5), ResolutionUnit::Inches);
        assert_eq!(ResolutionUnit::from_code(9), ResolutionUnit::None);
    }
}
