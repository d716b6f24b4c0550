//! Heavy polylines and their vertices
//!
//! A POLYLINE record is followed by its VERTEX records and a SEQEND. The
//! four polyline record types share this layout and differ in which vertex
//! type they own.

use super::EntityCommon;
use crate::types::{Handle, Vector3};

/// Which of the four heavy polyline records this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolylineKind {
    #[default]
    Polyline2D,
    Polyline3D,
    PolyfaceMesh,
    PolygonMesh,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polyline {
    pub common: EntityCommon,
    pub kind: PolylineKind,
    /// Polyline flags (DXF group 70); for 3D polylines the spline and
    /// closed flags are merged in.
    pub flags: i16,
    /// 0 none, 5 quadratic, 6 cubic, 8 Bezier
    pub curve_type: i16,
    pub start_width: f64,
    pub end_width: f64,
    pub thickness: f64,
    pub elevation: f64,
    pub normal: Vector3,
    /// Polyface: vertex count. Polygon mesh: M vertex count.
    pub m_count: i16,
    /// Polyface: face count. Polygon mesh: N vertex count.
    pub n_count: i16,
    pub m_density: i16,
    pub n_density: i16,
    /// Handles of the owned vertices, in order. Before R2004 only the
    /// first and last are stored and the rest are chained.
    pub owned: Vec<Handle>,
    pub seqend: Handle,
    pub vertices: Vec<Vertex>,
    /// Face records of a polyface mesh.
    pub faces: Vec<PolyfaceFace>,
}

impl Polyline {
    pub fn is_closed(&self) -> bool {
        self.flags & 1 != 0
    }
}

impl super::Entity for Polyline {
    fn common(&self) -> &EntityCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.common
    }

    fn entity_type(&self) -> &'static str {
        match self.kind {
            PolylineKind::Polyline2D => "POLYLINE_2D",
            PolylineKind::Polyline3D => "POLYLINE_3D",
            PolylineKind::PolyfaceMesh => "POLYLINE_PFACE",
            PolylineKind::PolygonMesh => "POLYLINE_MESH",
        }
    }
}

/// Vertex record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VertexKind {
    #[default]
    Vertex2D,
    Vertex3D,
    Mesh,
    Pface,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vertex {
    pub common: EntityCommon,
    pub kind: VertexKind,
    pub flags: u8,
    /// OCS for 2D vertices, WCS otherwise
    pub point: Vector3,
    pub start_width: f64,
    pub end_width: f64,
    pub bulge: f64,
    /// R2010+ vertex id
    pub id: i32,
    pub tangent_direction: f64,
}

impl_entity!(Vertex, "VERTEX");

/// Face of a polyface mesh: up to four 1-based vertex indices, negative
/// when the edge starting there is invisible.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolyfaceFace {
    pub common: EntityCommon,
    pub indices: [i16; 4],
}

impl_entity!(PolyfaceFace, "VERTEX_PFACE_FACE");
