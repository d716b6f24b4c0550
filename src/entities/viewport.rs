//! Paper space viewport entity

use super::EntityCommon;
use crate::types::{Color, Handle, Vector2, Vector3};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Viewport {
    pub common: EntityCommon,
    pub center: Vector3,
    pub width: f64,
    pub height: f64,
    pub view_target: Vector3,
    pub view_direction: Vector3,
    pub twist_angle: f64,
    pub view_height: f64,
    pub lens_length: f64,
    pub front_clip: f64,
    pub back_clip: f64,
    pub snap_angle: f64,
    pub view_center: Vector2,
    pub snap_base: Vector2,
    pub snap_spacing: Vector2,
    pub grid_spacing: Vector2,
    pub circle_sides: i16,
    /// R2007+
    pub grid_major: i16,
    pub status_flags: i32,
    pub style_sheet: String,
    pub render_mode: u8,
    pub ucs_at_origin: bool,
    pub ucs_per_viewport: bool,
    pub ucs_origin: Vector3,
    pub ucs_x_axis: Vector3,
    pub ucs_y_axis: Vector3,
    pub ucs_elevation: f64,
    pub ucs_ortho_type: i16,
    /// R2004+
    pub shade_plot_mode: i16,
    /// R2007+
    pub default_lighting: bool,
    pub default_lighting_type: u8,
    pub brightness: f64,
    pub contrast: f64,
    pub ambient_color: Option<Color>,
    pub frozen_layers: Vec<Handle>,
    pub clip_boundary: Handle,
    pub viewport_header: Handle,
    pub named_ucs: Handle,
    pub base_ucs: Handle,
    pub background: Handle,
    pub visual_style: Handle,
    pub shade_plot: Handle,
    pub sun: Handle,
}

impl_entity!(Viewport, "VIEWPORT");
