//! Raster image entity
//!
//! The image itself lives in an IMAGEDEF object; the entity only places
//! it. Sinks receive the definition through `link_image`.

use bitflags::bitflags;

use super::EntityCommon;
use crate::types::{Handle, Vector2, Vector3};

bitflags! {
    /// Image display flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ImageDisplayFlags: i16 {
        const SHOW_IMAGE = 1;
        /// Show when not aligned with the screen
        const SHOW_NOT_ALIGNED = 2;
        const USE_CLIPPING_BOUNDARY = 4;
        const TRANSPARENCY_ON = 8;
    }
}

/// Clip boundary of an image.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipBoundary {
    Rectangle(Vector2, Vector2),
    Polygon(Vec<Vector2>),
}

impl Default for ClipBoundary {
    fn default() -> Self {
        ClipBoundary::Polygon(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
    pub common: EntityCommon,
    pub class_version: i32,
    pub insertion: Vector3,
    /// One pixel along the image U axis, in WCS
    pub u_vector: Vector3,
    pub v_vector: Vector3,
    /// Size in pixels
    pub size: Vector2,
    pub display_flags: ImageDisplayFlags,
    pub clipping: bool,
    pub brightness: u8,
    pub contrast: u8,
    pub fade: u8,
    /// R2010+: clip inside (false) or outside (true)
    pub clip_inverted: bool,
    pub clip_boundary: ClipBoundary,
    pub definition: Handle,
    pub definition_reactor: Handle,
}

impl_entity!(Image, "IMAGE");
