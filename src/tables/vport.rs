//! Viewport configuration table entry

use crate::types::{Color, Handle, Vector2, Vector3};

use super::TableEntryCommon;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VPort {
    pub entry: TableEntryCommon,
    pub view_height: f64,
    pub aspect_ratio: f64,
    pub view_center: Vector2,
    pub view_target: Vector3,
    pub view_direction: Vector3,
    pub twist_angle: f64,
    pub lens_length: f64,
    pub front_clip: f64,
    pub back_clip: f64,
    /// Four view mode bits (UCSFOLLOW, front clip, back clip, perspective)
    pub view_mode: u8,
    /// R2000+
    pub render_mode: u8,
    /// R2007+
    pub default_lighting: bool,
    pub default_lighting_type: u8,
    pub brightness: f64,
    pub contrast: f64,
    pub ambient_color: Option<Color>,
    pub lower_left: Vector2,
    pub upper_right: Vector2,
    pub ucs_follow: bool,
    pub circle_sides: i16,
    pub fast_zoom: bool,
    pub ucs_icon: u8,
    pub grid_on: bool,
    pub grid_spacing: Vector2,
    pub snap_on: bool,
    pub snap_style: bool,
    pub snap_isopair: i16,
    pub snap_rotation: f64,
    pub snap_base: Vector2,
    pub snap_spacing: Vector2,
    pub ucs_per_viewport: bool,
    pub ucs_origin: Vector3,
    pub ucs_x_axis: Vector3,
    pub ucs_y_axis: Vector3,
    pub ucs_elevation: f64,
    pub ucs_ortho_type: i16,
    pub grid_flags: i16,
    pub grid_major: i16,
    pub background: Handle,
    pub visual_style: Handle,
    pub sun: Handle,
    pub named_ucs: Handle,
    pub base_ucs: Handle,
}

impl VPort {
    /// Width of the view, from height and aspect ratio.
    pub fn view_width(&self) -> f64 {
        self.view_height * self.aspect_ratio
    }
}

impl_table_entry!(VPort, "VPORT");
