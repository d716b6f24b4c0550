//! Free-standing (non-graphical) objects
//!
//! Only the objects other records depend on are decoded; everything else
//! in the objects section is consumed from the object map and reported.

mod image_definition;

pub use image_definition::{ImageDefinition, ResolutionUnit};
