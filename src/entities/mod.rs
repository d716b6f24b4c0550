//! Decoded entity records.
//!
//! Entities keep their geometry as stored in the file (OCS points, radians,
//! raw flags) and refer to other records by [`Handle`] only. Resolving a
//! layer or style handle to its name is left to the caller once the tables
//! have been read.

use crate::record::ExtendedData;
use crate::types::{Color, Handle, LineWeight};

/// Implements [`Entity`] for a struct with a `common: EntityCommon` field.
macro_rules! impl_entity {
    ($ty:ident, $name:literal) => {
        impl $crate::entities::Entity for $ty {
            fn common(&self) -> &$crate::entities::EntityCommon {
                &self.common
            }

            fn common_mut(&mut self) -> &mut $crate::entities::EntityCommon {
                &mut self.common
            }

            fn entity_type(&self) -> &'static str {
                $name
            }
        }
    };
}

pub mod arc;
pub mod attribute;
pub mod block;
pub mod circle;
pub mod dimension;
pub mod ellipse;
pub mod face3d;
pub mod hatch;
pub mod image;
pub mod insert;
pub mod leader;
pub mod line;
pub mod lwpolyline;
pub mod mtext;
pub mod point;
pub mod polyline;
pub mod ray;
pub mod solid;
pub mod spline;
pub mod text;
pub mod viewport;

pub use arc::Arc;
pub use attribute::{Attribute, AttributeDefinition, AttributeFlags};
pub use block::{Block, BlockEnd, Seqend};
pub use circle::Circle;
pub use dimension::{Dimension, DimensionCommon, DimensionKind};
pub use ellipse::Ellipse;
pub use face3d::Face3D;
pub use hatch::{
    BoundaryEdge, BoundaryLoop, BoundaryPath, Hatch, HatchGradient, HatchPatternLine,
    HatchPolylineVertex,
};
pub use image::{ClipBoundary, Image, ImageDisplayFlags};
pub use insert::Insert;
pub use leader::Leader;
pub use line::Line;
pub use lwpolyline::{LwPolyline, LwVertex};
pub use mtext::MText;
pub use point::Point;
pub use polyline::{PolyfaceFace, Polyline, PolylineKind, Vertex, VertexKind};
pub use ray::{Ray, XLine};
pub use solid::Solid;
pub use spline::Spline;
pub use text::{HorizontalAlignment, Text, VerticalAlignment};
pub use viewport::Viewport;

/// Behaviour shared by every entity record.
pub trait Entity {
    fn common(&self) -> &EntityCommon;

    fn common_mut(&mut self) -> &mut EntityCommon;

    /// DXF name of the entity (`LINE`, `LWPOLYLINE`, ...).
    fn entity_type(&self) -> &'static str;

    fn handle(&self) -> Handle {
        self.common().handle
    }

    /// Handle of the layer table entry.
    fn layer(&self) -> Handle {
        self.common().layer
    }

    fn color(&self) -> Color {
        self.common().color
    }

    fn line_weight(&self) -> LineWeight {
        self.common().line_weight
    }

    fn is_invisible(&self) -> bool {
        self.common().invisible
    }
}

/// Where an entity lives, from the 2-bit entity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntitySpace {
    /// Owned by a block; the owner handle is stored.
    #[default]
    Block,
    PaperSpace,
    ModelSpace,
}

impl EntitySpace {
    pub fn from_mode(mode: u8) -> Self {
        match mode {
            1 => EntitySpace::PaperSpace,
            2 => EntitySpace::ModelSpace,
            _ => EntitySpace::Block,
        }
    }
}

/// Data every entity record starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCommon {
    pub handle: Handle,
    /// Owning block record; null unless `space` is [`EntitySpace::Block`].
    pub owner: Handle,
    pub space: EntitySpace,
    pub layer: Handle,
    /// Null when the linetype is ByLayer or ByBlock.
    pub linetype: Handle,
    /// 0 ByLayer, 1 ByBlock, 2 Continuous, 3 by handle.
    pub linetype_flags: u8,
    pub plotstyle: Handle,
    pub material: Handle,
    pub color: Color,
    /// Raw transparency value (R2004+), when stored.
    pub transparency: Option<u32>,
    /// Color book entry (R2004+).
    pub color_handle: Handle,
    pub linetype_scale: f64,
    pub line_weight: LineWeight,
    pub invisible: bool,
    /// Previous entity in the owner's list (before R2004).
    pub prev_entity: Handle,
    /// Next entity in the owner's list (before R2004).
    pub next_entity: Handle,
    pub reactors: Vec<Handle>,
    pub xdictionary: Handle,
    pub extended_data: Vec<ExtendedData>,
}

impl EntityCommon {
    pub fn new() -> Self {
        EntityCommon {
            handle: Handle::NULL,
            owner: Handle::NULL,
            space: EntitySpace::Block,
            layer: Handle::NULL,
            linetype: Handle::NULL,
            linetype_flags: 0,
            plotstyle: Handle::NULL,
            material: Handle::NULL,
            color: Color::ByLayer,
            transparency: None,
            color_handle: Handle::NULL,
            linetype_scale: 1.0,
            line_weight: LineWeight::ByLayer,
            invisible: false,
            prev_entity: Handle::NULL,
            next_entity: Handle::NULL,
            reactors: Vec::new(),
            xdictionary: Handle::NULL,
            extended_data: Vec::new(),
        }
    }

    pub fn with_handle(handle: u64) -> Self {
        EntityCommon {
            handle: Handle::new(handle),
            ..Self::new()
        }
    }
}

impl Default for EntityCommon {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_common_defaults() {
        let c = EntityCommon::new();
        assert_eq!(c.linetype_scale, 1.0);
        assert_eq!(c.color, Color::ByLayer);
        assert!(c.handle.is_null());
    }

    #[test]
    fn test_entity_space_from_mode() {
        assert_eq!(EntitySpace::from_mode(0), EntitySpace::Block);
        assert_eq!(EntitySpace::from_mode(1), EntitySpace::PaperSpace);
        assert_eq!(EntitySpace::from_mode(2), EntitySpace::ModelSpace);
    }

    #[test]
    fn test_trait_reads_common() {
        let mut line = Line::default();
        line.common = EntityCommon::with_handle(0x2A);
        line.common.layer = Handle::new(0x10);
        assert_eq!(line.handle().value(), 0x2A);
        assert_eq!(line.layer().value(), 0x10);
        assert_eq!(line.entity_type(), "LINE");
    }
}
