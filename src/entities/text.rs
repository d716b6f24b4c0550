//! Single-line text entity

use super::EntityCommon;
use crate::types::{Handle, Vector3};

/// Horizontal justification (DXF group 72).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
    Aligned,
    Middle,
    Fit,
}

impl HorizontalAlignment {
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => HorizontalAlignment::Center,
            2 => HorizontalAlignment::Right,
            3 => HorizontalAlignment::Aligned,
            4 => HorizontalAlignment::Middle,
            5 => HorizontalAlignment::Fit,
            _ => HorizontalAlignment::Left,
        }
    }
}

/// Vertical justification (DXF group 73).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAlignment {
    #[default]
    Baseline,
    Bottom,
    Middle,
    Top,
}

impl VerticalAlignment {
    pub fn from_code(code: i16) -> Self {
        match code {
            1 => VerticalAlignment::Bottom,
            2 => VerticalAlignment::Middle,
            3 => VerticalAlignment::Top,
            _ => VerticalAlignment::Baseline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Text {
    pub common: EntityCommon,
    pub value: String,
    /// First alignment point in OCS; `z` is the elevation
    pub insertion: Vector3,
    /// Second alignment point; equals `insertion` when not stored
    pub alignment: Vector3,
    pub normal: Vector3,
    pub thickness: f64,
    pub oblique_angle: f64,
    pub rotation: f64,
    pub height: f64,
    pub width_factor: f64,
    /// 2 backwards, 4 upside down
    pub generation: i16,
    pub horizontal_alignment: HorizontalAlignment,
    pub vertical_alignment: VerticalAlignment,
    pub style: Handle,
}

impl_entity!(Text, "TEXT");
