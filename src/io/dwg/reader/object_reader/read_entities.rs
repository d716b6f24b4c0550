//! Entity records.
//!
//! Each decoder reads the common entity data, its own fields from the
//! data stream, and then its own handle references in order.

use crate::entities::*;
use crate::error::{DwgError, Result};
use crate::io::dwg::object_type::ObjectType;
use crate::record::Record;
use crate::types::{Color, DwgVersion, Handle, Vector2, Vector3};

use super::common::{read_common_entity_data, read_count};
use super::StreamSet;

fn handle(s: &mut StreamSet<'_>) -> Handle {
    Handle::new(s.handle_reference())
}

fn handles(s: &mut StreamSet<'_>, count: usize) -> Vec<Handle> {
    (0..count).map(|_| handle(s)).collect()
}

/// Owned handles of a complex entity (R2004+), counted in the data stream.
fn owned_count(s: &mut StreamSet<'_>) -> Result<usize> {
    let count = s.read_bit_long();
    let fits = usize::try_from(count)
        .ok()
        .filter(|&n| n.saturating_mul(8) <= s.handles_mut().remaining_bits() as usize);
    fits.ok_or_else(|| DwgError::Parse(format!("owned count {} in {:#X}", count, s.map_handle)))
}

/// Owned handles of a polyline or insert: first and last before R2004,
/// the explicit list after.
fn owned_handles(s: &mut StreamSet<'_>, count: usize) -> Vec<Handle> {
    if s.layout.r2004_plus {
        handles(s, count)
    } else {
        vec![handle(s), handle(s)]
    }
}

fn read_3d_from_bds(s: &mut StreamSet<'_>) -> Vector3 {
    let x = s.read_bit_double();
    let y = s.read_bit_double();
    let z = s.read_bit_double();
    Vector3::new(x, y, z)
}

pub fn read_point(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    let location = read_3d_from_bds(s);
    let thickness = s.read_bit_thickness();
    let normal = s.read_bit_extrusion();
    let x_axis_angle = s.read_bit_double();
    Ok(Record::Point(Point {
        common,
        location,
        thickness,
        normal,
        x_axis_angle,
    }))
}

pub fn read_line(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    let (start, end) = if s.layout.r13_14_only {
        (s.read_3bit_double(), s.read_3bit_double())
    } else {
        let z_are_zero = s.read_bit();
        let sx = s.read_raw_double();
        let ex = s.read_bit_double_with_default(sx);
        let sy = s.read_raw_double();
        let ey = s.read_bit_double_with_default(sy);
        let (sz, ez) = if z_are_zero {
            (0.0, 0.0)
        } else {
            let sz = s.read_raw_double();
            (sz, s.read_bit_double_with_default(sz))
        };
        (Vector3::new(sx, sy, sz), Vector3::new(ex, ey, ez))
    };
    let thickness = s.read_bit_thickness();
    let normal = s.read_bit_extrusion();
    Ok(Record::Line(Line {
        common,
        start,
        end,
        thickness,
        normal,
    }))
}

pub fn read_ray(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::Ray(Ray {
        common,
        base_point: s.read_3bit_double(),
        direction: s.read_3bit_double(),
    }))
}

pub fn read_xline(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::XLine(XLine {
        common,
        base_point: s.read_3bit_double(),
        direction: s.read_3bit_double(),
    }))
}

pub fn read_circle(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::Circle(Circle {
        common,
        center: s.read_3bit_double(),
        radius: s.read_bit_double(),
        thickness: s.read_bit_thickness(),
        normal: s.read_bit_extrusion(),
    }))
}

pub fn read_arc(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::Arc(Arc {
        common,
        center: s.read_3bit_double(),
        radius: s.read_bit_double(),
        thickness: s.read_bit_thickness(),
        normal: s.read_bit_extrusion(),
        start_angle: s.read_bit_double(),
        end_angle: s.read_bit_double(),
    }))
}

pub fn read_ellipse(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::Ellipse(Ellipse {
        common,
        center: s.read_3bit_double(),
        major_axis: s.read_3bit_double(),
        normal: s.read_3bit_double(),
        axis_ratio: s.read_bit_double(),
        start_parameter: s.read_bit_double(),
        end_parameter: s.read_bit_double(),
    }))
}

/// SOLID and TRACE share one layout.
pub fn read_solid(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    let thickness = s.read_bit_thickness();
    let elevation = s.read_bit_double();
    let mut corners = [Vector3::ZERO; 4];
    for corner in &mut corners {
        *corner = s.read_2raw_double().with_z(elevation);
    }
    let normal = s.read_bit_extrusion();
    Ok(Record::Solid(Solid {
        common,
        corners,
        thickness,
        normal,
        is_trace: s.object_type == ObjectType::Trace,
    }))
}

pub fn read_face3d(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    let mut corners = [Vector3::ZERO; 4];
    let mut invisible_edges = 0;

    if s.layout.r13_14_only {
        for corner in &mut corners {
            *corner = s.read_3bit_double();
        }
        invisible_edges = s.read_bit_short() as u16;
    } else {
        let no_flags = s.read_bit();
        let z_is_zero = s.read_bit();
        let x = s.read_raw_double();
        let y = s.read_raw_double();
        let z = if z_is_zero { 0.0 } else { s.read_raw_double() };
        corners[0] = Vector3::new(x, y, z);
        for i in 1..4 {
            corners[i] = s.read_3bit_double_with_default(corners[i - 1]);
        }
        if !no_flags {
            invisible_edges = s.read_bit_short() as u16;
        }
    }
    Ok(Record::Face3D(Face3D {
        common,
        corners,
        invisible_edges,
    }))
}

/// TEXT fields, shared by ATTRIB and ATTDEF. Reads the style handle.
fn read_text_data(s: &mut StreamSet<'_>, common: EntityCommon) -> Result<Text> {
    let mut text = Text {
        common,
        normal: Vector3::UNIT_Z,
        width_factor: 1.0,
        ..Default::default()
    };

    if s.layout.r13_14_only {
        let elevation = s.read_bit_double();
        text.insertion = s.read_2raw_double().with_z(elevation);
        text.alignment = s.read_2raw_double().with_z(elevation);
        text.normal = s.read_3bit_double();
        text.thickness = s.read_bit_double();
        text.oblique_angle = s.read_bit_double();
        text.rotation = s.read_bit_double();
        text.height = s.read_bit_double();
        text.width_factor = s.read_bit_double();
        text.value = s.read_variable_text();
        text.generation = s.read_bit_short();
        text.horizontal_alignment = HorizontalAlignment::from_code(s.read_bit_short());
        text.vertical_alignment = VerticalAlignment::from_code(s.read_bit_short());
    } else {
        let flags = s.read_byte();
        let elevation = if flags & 0x01 == 0 { s.read_raw_double() } else { 0.0 };
        let insertion = s.read_2raw_double();
        text.insertion = insertion.with_z(elevation);
        let alignment = if flags & 0x02 == 0 {
            s.read_2bit_double_with_default(insertion)
        } else {
            insertion
        };
        text.alignment = alignment.with_z(elevation);
        text.normal = s.read_bit_extrusion();
        text.thickness = s.read_bit_thickness();
        if flags & 0x04 == 0 {
            text.oblique_angle = s.read_raw_double();
        }
        if flags & 0x08 == 0 {
            text.rotation = s.read_raw_double();
        }
        text.height = s.read_raw_double();
        if flags & 0x10 == 0 {
            text.width_factor = s.read_raw_double();
        }
        text.value = s.read_variable_text();
        if flags & 0x20 == 0 {
            text.generation = s.read_bit_short();
        }
        if flags & 0x40 == 0 {
            text.horizontal_alignment = HorizontalAlignment::from_code(s.read_bit_short());
        }
        if flags & 0x80 == 0 {
            text.vertical_alignment = VerticalAlignment::from_code(s.read_bit_short());
        }
    }

    text.style = handle(s);
    Ok(text)
}

pub fn read_text(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::Text(read_text_data(s, common)?))
}

fn read_attribute_data(s: &mut StreamSet<'_>) -> Result<Attribute> {
    let common = read_common_entity_data(s)?;
    let text = read_text_data(s, common)?;
    let mut attribute = Attribute {
        text,
        ..Default::default()
    };
    if s.layout.r2010_plus {
        attribute.version = s.read_byte();
    }
    if s.layout.r2018_plus {
        let kind = s.read_byte();
        if kind > 1 {
            return Err(DwgError::Parse(format!(
                "multi-line attribute {:#X} (type {})",
                s.map_handle, kind
            )));
        }
    }
    attribute.tag = s.read_variable_text();
    attribute.field_length = s.read_bit_short();
    attribute.flags = AttributeFlags::from_bits_truncate(s.read_byte());
    if s.layout.r2007_plus {
        attribute.lock_position = s.read_bit();
    }
    Ok(attribute)
}

pub fn read_attribute(s: &mut StreamSet<'_>) -> Result<Record> {
    Ok(Record::Attribute(read_attribute_data(s)?))
}

pub fn read_attribute_definition(s: &mut StreamSet<'_>) -> Result<Record> {
    let attribute = read_attribute_data(s)?;
    if s.layout.r2010_plus {
        // RC: version, repeated
        s.read_byte();
    }
    let prompt = s.read_variable_text();
    Ok(Record::AttributeDefinition(AttributeDefinition { attribute, prompt }))
}

pub fn read_block(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    let name = s.read_variable_text();
    Ok(Record::Block(Block { common, name }))
}

pub fn read_block_end(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::BlockEnd(BlockEnd { common }))
}

pub fn read_seqend(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    Ok(Record::Seqend(Seqend { common }))
}

/// INSERT and MINSERT.
pub fn read_insert(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut insert = Insert {
        common: read_common_entity_data(s)?,
        minsert: s.object_type == ObjectType::Minsert,
        ..Insert::new()
    };
    insert.insertion = s.read_3bit_double();

    insert.scale = if s.layout.r13_14_only {
        s.read_3bit_double()
    } else {
        match s.read_2bits() {
            0 => {
                let x = s.read_raw_double();
                let y = s.read_bit_double_with_default(x);
                let z = s.read_bit_double_with_default(x);
                Vector3::new(x, y, z)
            }
            1 => {
                let y = s.read_bit_double_with_default(1.0);
                let z = s.read_bit_double_with_default(1.0);
                Vector3::new(1.0, y, z)
            }
            2 => {
                let x = s.read_raw_double();
                Vector3::new(x, x, x)
            }
            _ => Vector3::new(1.0, 1.0, 1.0),
        }
    };
    insert.rotation = s.read_bit_double();
    insert.normal = s.read_3bit_double();
    insert.has_attributes = s.read_bit();
    let mut count = 0;
    if s.layout.r2004_plus && insert.has_attributes {
        count = owned_count(s)?;
    }
    if insert.minsert {
        insert.column_count = s.read_bit_short();
        insert.row_count = s.read_bit_short();
        insert.column_spacing = s.read_bit_double();
        insert.row_spacing = s.read_bit_double();
    }

    insert.block_header = handle(s);
    if insert.has_attributes {
        insert.owned = owned_handles(s, count);
        insert.seqend = handle(s);
    }
    Ok(Record::Insert(insert))
}

pub fn read_vertex_2d(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut vertex = Vertex {
        common: read_common_entity_data(s)?,
        kind: VertexKind::Vertex2D,
        ..Default::default()
    };
    vertex.flags = s.read_byte();
    vertex.point = s.read_3bit_double();
    let start_width = s.read_bit_double();
    if start_width < 0.0 {
        vertex.start_width = -start_width;
        vertex.end_width = -start_width;
    } else {
        vertex.start_width = start_width;
        vertex.end_width = s.read_bit_double();
    }
    vertex.bulge = s.read_bit_double();
    if s.layout.r2010_plus {
        vertex.id = s.read_bit_long();
    }
    vertex.tangent_direction = s.read_bit_double();
    Ok(Record::Vertex(vertex))
}

/// VERTEX_3D, VERTEX_MESH and VERTEX_PFACE share one layout.
pub fn read_vertex_3d(s: &mut StreamSet<'_>) -> Result<Record> {
    let kind = match s.object_type {
        ObjectType::VertexMesh => VertexKind::Mesh,
        ObjectType::VertexPface => VertexKind::Pface,
        _ => VertexKind::Vertex3D,
    };
    let common = read_common_entity_data(s)?;
    let flags = s.read_byte();
    let point = s.read_3bit_double();
    Ok(Record::Vertex(Vertex {
        common,
        kind,
        flags,
        point,
        ..Default::default()
    }))
}

pub fn read_pface_face(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_entity_data(s)?;
    let mut indices = [0i16; 4];
    for index in &mut indices {
        *index = s.read_bit_short();
    }
    Ok(Record::PolyfaceFace(PolyfaceFace { common, indices }))
}

/// Owned count (R2004+) and the vertex and seqend handles of a polyline.
fn read_polyline_owned(s: &mut StreamSet<'_>, polyline: &mut Polyline) -> Result<()> {
    let count = if s.layout.r2004_plus { owned_count(s)? } else { 0 };
    polyline.owned = owned_handles(s, count);
    polyline.seqend = handle(s);
    Ok(())
}

pub fn read_polyline_2d(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut polyline = Polyline {
        common: read_common_entity_data(s)?,
        kind: PolylineKind::Polyline2D,
        ..Default::default()
    };
    polyline.flags = s.read_bit_short();
    polyline.curve_type = s.read_bit_short();
    polyline.start_width = s.read_bit_double();
    polyline.end_width = s.read_bit_double();
    polyline.thickness = s.read_bit_thickness();
    polyline.elevation = s.read_bit_double();
    polyline.normal = s.read_bit_extrusion();
    read_polyline_owned(s, &mut polyline)?;
    Ok(Record::Polyline(polyline))
}

pub fn read_polyline_3d(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut polyline = Polyline {
        common: read_common_entity_data(s)?,
        kind: PolylineKind::Polyline3D,
        normal: Vector3::UNIT_Z,
        ..Default::default()
    };
    let spline_flags = s.read_byte();
    let closed_flags = s.read_byte();
    polyline.curve_type = match spline_flags & 0x03 {
        1 => 5,
        2 => 6,
        _ => 0,
    };
    polyline.flags = 0x08;
    if closed_flags & 0x01 != 0 {
        polyline.flags |= 0x01;
    }
    if polyline.curve_type != 0 {
        polyline.flags |= 0x04;
    }
    read_polyline_owned(s, &mut polyline)?;
    Ok(Record::Polyline(polyline))
}

pub fn read_polyline_pface(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut polyline = Polyline {
        common: read_common_entity_data(s)?,
        kind: PolylineKind::PolyfaceMesh,
        flags: 0x40,
        normal: Vector3::UNIT_Z,
        ..Default::default()
    };
    polyline.m_count = s.read_bit_short();
    polyline.n_count = s.read_bit_short();
    read_polyline_owned(s, &mut polyline)?;
    Ok(Record::Polyline(polyline))
}

pub fn read_polyline_mesh(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut polyline = Polyline {
        common: read_common_entity_data(s)?,
        kind: PolylineKind::PolygonMesh,
        normal: Vector3::UNIT_Z,
        ..Default::default()
    };
    polyline.flags = s.read_bit_short() | 0x10;
    polyline.curve_type = s.read_bit_short();
    polyline.m_count = s.read_bit_short();
    polyline.n_count = s.read_bit_short();
    polyline.m_density = s.read_bit_short();
    polyline.n_density = s.read_bit_short();
    read_polyline_owned(s, &mut polyline)?;
    Ok(Record::Polyline(polyline))
}

pub fn read_lwpolyline(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut pline = LwPolyline {
        common: read_common_entity_data(s)?,
        normal: Vector3::UNIT_Z,
        ..Default::default()
    };
    let flags = s.read_bit_short();
    pline.flags = flags;
    if flags & 0x04 != 0 {
        pline.constant_width = s.read_bit_double();
    }
    if flags & 0x08 != 0 {
        pline.elevation = s.read_bit_double();
    }
    if flags & 0x02 != 0 {
        pline.thickness = s.read_bit_double();
    }
    if flags & 0x01 != 0 {
        pline.normal = s.read_3bit_double();
    }

    let points = read_count(s, 2, "lwpolyline points")?;
    let bulges = if flags & 0x10 != 0 { read_count(s, 2, "lwpolyline bulges")? } else { 0 };
    let ids = if flags & 0x400 != 0 && s.layout.r2010_plus {
        read_count(s, 2, "lwpolyline vertex ids")?
    } else {
        0
    };
    let widths = if flags & 0x20 != 0 { read_count(s, 4, "lwpolyline widths")? } else { 0 };

    let mut previous = Vector2::ZERO;
    for i in 0..points {
        let location = if s.layout.r13_14_only || i == 0 {
            s.read_2raw_double()
        } else {
            s.read_2bit_double_with_default(previous)
        };
        previous = location;
        pline.vertices.push(LwVertex {
            location,
            ..Default::default()
        });
    }
    for i in 0..bulges {
        let bulge = s.read_bit_double();
        if let Some(v) = pline.vertices.get_mut(i) {
            v.bulge = bulge;
        }
    }
    for i in 0..ids {
        let id = s.read_bit_long();
        if let Some(v) = pline.vertices.get_mut(i) {
            v.id = id;
        }
    }
    for i in 0..widths {
        let start = s.read_bit_double();
        let end = s.read_bit_double();
        if let Some(v) = pline.vertices.get_mut(i) {
            v.start_width = start;
            v.end_width = end;
        }
    }
    Ok(Record::LwPolyline(pline))
}

pub fn read_mtext(s: &mut StreamSet<'_>) -> Result<Record> {
    let layout = s.layout;
    let mut mtext = MText {
        common: read_common_entity_data(s)?,
        ..Default::default()
    };
    mtext.insertion = s.read_3bit_double();
    mtext.normal = s.read_3bit_double();
    mtext.x_axis = s.read_3bit_double();
    mtext.rectangle_width = s.read_bit_double();
    if layout.r2007_plus {
        mtext.rectangle_height = Some(s.read_bit_double());
    }
    mtext.height = s.read_bit_double();
    mtext.attachment = s.read_bit_short();
    mtext.drawing_direction = s.read_bit_short();
    mtext.extents_height = s.read_bit_double();
    mtext.extents_width = s.read_bit_double();
    mtext.value = s.read_variable_text();

    if layout.r2000_plus {
        mtext.line_spacing_style = s.read_bit_short();
        mtext.line_spacing_factor = s.read_bit_double();
        // B: unknown
        s.read_bit();
    }
    if layout.r2004_plus {
        mtext.background_flags = s.read_bit_long();
        let has_fill = mtext.background_flags & 0x01 != 0
            || (layout.r2018_plus && mtext.background_flags & 0x10 != 0);
        if has_fill {
            mtext.background_scale = s.read_bit_double();
            mtext.background_color = Some(s.read_cm_color());
            mtext.background_transparency = s.read_bit_long() as u32;
        }
    }
    if layout.r2018_plus && s.read_bit() {
        skip_mtext_context(s)?;
    }

    mtext.style = handle(s);
    Ok(Record::MText(mtext))
}

/// R2018 non-annotative MTEXT repeats its layout and column data; the
/// values match the fields already read and are dropped.
fn skip_mtext_context(s: &mut StreamSet<'_>) -> Result<()> {
    // BS version, B default flag
    s.read_bit_short();
    s.read_bit();
    // H: registered application
    handle(s);
    // BL attachment, 3BD x axis, 3BD insertion, BD width, BD height,
    // BD extents width, BD extents height
    s.read_bit_long();
    s.read_3bit_double();
    s.read_3bit_double();
    for _ in 0..4 {
        s.read_bit_double();
    }
    let column_type = s.read_bit_short();
    if column_type != 0 {
        let columns = read_count(s, 2, "mtext columns")?;
        // BD width, BD gutter
        s.read_bit_double();
        s.read_bit_double();
        let auto_height = s.read_bit();
        // B: flow reversed
        s.read_bit();
        if !auto_height && column_type == 2 {
            for _ in 0..columns {
                s.read_bit_double();
            }
        }
    }
    Ok(())
}

pub fn read_spline(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut spline = Spline {
        common: read_common_entity_data(s)?,
        ..Default::default()
    };
    spline.scenario = s.read_bit_long();
    if s.layout.r2013_plus {
        spline.flags = s.read_bit_long();
        spline.knot_parameter = s.read_bit_long();
        if spline.flags & 0x01 != 0 {
            spline.scenario = 2;
        }
        if spline.knot_parameter == 15 {
            spline.scenario = 1;
        }
    }
    spline.degree = s.read_bit_long();

    let mut knots = 0;
    let mut control_points = 0;
    let mut fit_points = 0;
    let mut weighted = false;
    match spline.scenario {
        2 => {
            spline.fit_tolerance = s.read_bit_double();
            spline.start_tangent = s.read_3bit_double();
            spline.end_tangent = s.read_3bit_double();
            fit_points = read_count(s, 6, "spline fit points")?;
        }
        1 => {
            spline.rational = s.read_bit();
            spline.closed = s.read_bit();
            spline.periodic = s.read_bit();
            spline.knot_tolerance = s.read_bit_double();
            spline.control_tolerance = s.read_bit_double();
            knots = read_count(s, 2, "spline knots")?;
            control_points = read_count(s, 6, "spline control points")?;
            weighted = s.read_bit();
        }
        other => {
            return Err(DwgError::Parse(format!(
                "spline {:#X} has scenario {}",
                s.map_handle, other
            )));
        }
    }

    spline.knots = (0..knots).map(|_| s.read_bit_double()).collect();
    for _ in 0..control_points {
        spline.control_points.push(s.read_3bit_double());
        if weighted {
            spline.weights.push(s.read_bit_double());
        }
    }
    spline.fit_points = (0..fit_points).map(|_| s.read_3bit_double()).collect();
    Ok(Record::Spline(spline))
}

/// Dimension data shared by the seven dimension records, up to the
/// per-kind points.
fn read_dimension_common(s: &mut StreamSet<'_>) -> Result<DimensionCommon> {
    let layout = s.layout;
    let mut dim = DimensionCommon {
        common: read_common_entity_data(s)?,
        ..Default::default()
    };
    if layout.r2010_plus {
        dim.version = s.read_byte();
    }
    dim.normal = s.read_3bit_double();
    let midpoint = s.read_2raw_double();
    let elevation = s.read_bit_double();
    dim.text_midpoint = midpoint.with_z(elevation);
    dim.flags = s.read_byte();
    dim.user_text = s.read_variable_text();
    dim.text_rotation = s.read_bit_double();
    dim.horizontal_direction = s.read_bit_double();
    dim.insert_scale = s.read_3bit_double();
    dim.insert_rotation = s.read_bit_double();
    if layout.r2000_plus {
        dim.attachment = s.read_bit_short();
        dim.line_spacing_style = s.read_bit_short();
        dim.line_spacing_factor = s.read_bit_double();
        dim.actual_measurement = s.read_bit_double();
    }
    if layout.r2007_plus {
        // B: unknown
        s.read_bit();
        dim.flip_arrow1 = s.read_bit();
        dim.flip_arrow2 = s.read_bit();
    }
    dim.clone_insertion = s.read_2raw_double();
    Ok(dim)
}

/// All seven dimension records; the kind comes from the type code.
pub fn read_dimension(s: &mut StreamSet<'_>) -> Result<Record> {
    let object_type = s.object_type;
    let mut base = read_dimension_common(s)?;
    let kind = match object_type {
        ObjectType::DimensionOrdinate => {
            let definition_point = s.read_3bit_double();
            let feature_location = s.read_3bit_double();
            let leader_endpoint = s.read_3bit_double();
            let flags = s.read_byte();
            DimensionKind::Ordinate {
                definition_point,
                feature_location,
                leader_endpoint,
                x_type: flags & 0x01 != 0,
            }
        }
        ObjectType::DimensionLinear => DimensionKind::Linear {
            first_point: s.read_3bit_double(),
            second_point: s.read_3bit_double(),
            definition_point: s.read_3bit_double(),
            oblique_angle: s.read_bit_double(),
            rotation: s.read_bit_double(),
        },
        ObjectType::DimensionAligned => DimensionKind::Aligned {
            first_point: s.read_3bit_double(),
            second_point: s.read_3bit_double(),
            definition_point: s.read_3bit_double(),
            oblique_angle: s.read_bit_double(),
        },
        ObjectType::DimensionAng3Pt => DimensionKind::Angular3Point {
            definition_point: s.read_3bit_double(),
            first_point: s.read_3bit_double(),
            second_point: s.read_3bit_double(),
            vertex: s.read_3bit_double(),
        },
        ObjectType::DimensionAng2Ln => DimensionKind::Angular2Line {
            arc_point: s.read_2raw_double(),
            first_start: s.read_3bit_double(),
            first_end: s.read_3bit_double(),
            second_start: s.read_3bit_double(),
            second_end: s.read_3bit_double(),
        },
        ObjectType::DimensionRadius => DimensionKind::Radius {
            definition_point: s.read_3bit_double(),
            chord_point: s.read_3bit_double(),
            leader_length: s.read_bit_double(),
        },
        ObjectType::DimensionDiameter => DimensionKind::Diameter {
            definition_point: s.read_3bit_double(),
            chord_point: s.read_3bit_double(),
            leader_length: s.read_bit_double(),
        },
        other => {
            return Err(DwgError::UnexpectedType {
                handle: s.map_handle,
                expected: "dimension".into(),
                found: other.code(),
            })
        }
    };
    base.style = handle(s);
    base.block = handle(s);
    Ok(Record::Dimension(Dimension { base, kind }))
}

pub fn read_leader(s: &mut StreamSet<'_>) -> Result<Record> {
    let layout = s.layout;
    let mut leader = Leader {
        common: read_common_entity_data(s)?,
        ..Default::default()
    };
    // B: unknown
    s.read_bit();
    leader.annotation_type = s.read_bit_short();
    leader.path_type = s.read_bit_short();
    let points = read_count(s, 6, "leader points")?;
    leader.vertices = (0..points).map(|_| s.read_3bit_double()).collect();
    leader.origin = s.read_3bit_double();
    leader.normal = s.read_3bit_double();
    leader.x_direction = s.read_3bit_double();
    if layout.version >= DwgVersion::AC1014 {
        leader.block_offset = s.read_3bit_double();
        leader.end_point_projection = s.read_3bit_double();
    }
    if layout.r13_14_only {
        leader.dimgap = s.read_bit_double();
    }
    leader.box_height = s.read_bit_double();
    leader.box_width = s.read_bit_double();
    leader.hookline_on_x_direction = s.read_bit();
    leader.arrowhead_on = s.read_bit();
    if layout.r13_14_only {
        leader.arrowhead_type = s.read_bit_short();
        leader.arrowhead_size = s.read_bit_double();
        // B, B: unknown
        s.read_bit();
        s.read_bit();
        // BS: unknown
        s.read_bit_short();
        leader.byblock_color = s.read_bit_short();
        // B, B: unknown
        s.read_bit();
        s.read_bit();
    }
    if layout.r2000_plus {
        // BS, B, B: unknown
        s.read_bit_short();
        s.read_bit();
        s.read_bit();
    }
    leader.annotation = handle(s);
    leader.dimstyle = handle(s);
    Ok(Record::Leader(leader))
}

pub fn read_viewport(s: &mut StreamSet<'_>) -> Result<Record> {
    let layout = s.layout;
    let mut vp = Viewport {
        common: read_common_entity_data(s)?,
        ..Default::default()
    };
    vp.center = s.read_3bit_double();
    vp.width = s.read_bit_double();
    vp.height = s.read_bit_double();

    let mut frozen_count = 0;
    if layout.r2000_plus {
        vp.view_target = s.read_3bit_double();
        vp.view_direction = s.read_3bit_double();
        vp.twist_angle = s.read_bit_double();
        vp.view_height = s.read_bit_double();
        vp.lens_length = s.read_bit_double();
        vp.front_clip = s.read_bit_double();
        vp.back_clip = s.read_bit_double();
        vp.snap_angle = s.read_bit_double();
        vp.view_center = s.read_2raw_double();
        vp.snap_base = s.read_2raw_double();
        vp.snap_spacing = s.read_2raw_double();
        vp.grid_spacing = s.read_2raw_double();
        vp.circle_sides = s.read_bit_short();
    }
    if layout.r2007_plus {
        vp.grid_major = s.read_bit_short();
    }
    if layout.r2000_plus {
        frozen_count = read_count(s, 0, "viewport frozen layers")?;
        if frozen_count.saturating_mul(8) > s.handles_mut().remaining_bits() as usize {
            return Err(DwgError::Parse(format!(
                "viewport {:#X} freezes {} layers",
                s.map_handle, frozen_count
            )));
        }
        vp.status_flags = s.read_bit_long();
        vp.style_sheet = s.read_variable_text();
        vp.render_mode = s.read_byte();
        vp.ucs_at_origin = s.read_bit();
        vp.ucs_per_viewport = s.read_bit();
        vp.ucs_origin = s.read_3bit_double();
        vp.ucs_x_axis = s.read_3bit_double();
        vp.ucs_y_axis = s.read_3bit_double();
        vp.ucs_elevation = s.read_bit_double();
        vp.ucs_ortho_type = s.read_bit_short();
    }
    if layout.r2004_plus {
        vp.shade_plot_mode = s.read_bit_short();
    }
    if layout.r2007_plus {
        vp.default_lighting = s.read_bit();
        vp.default_lighting_type = s.read_byte();
        vp.brightness = s.read_bit_double();
        vp.contrast = s.read_bit_double();
        vp.ambient_color = Some(s.read_cm_color());
    }

    if layout.r13_14_only {
        vp.viewport_header = handle(s);
    }
    if layout.r2000_plus {
        vp.frozen_layers = handles(s, frozen_count);
        vp.clip_boundary = handle(s);
    }
    if layout.version == DwgVersion::AC1015 {
        vp.viewport_header = handle(s);
    }
    if layout.r2000_plus {
        vp.named_ucs = handle(s);
        vp.base_ucs = handle(s);
    }
    if layout.r2007_plus {
        vp.background = handle(s);
        vp.visual_style = handle(s);
        vp.shade_plot = handle(s);
        vp.sun = handle(s);
    }
    Ok(Record::Viewport(vp))
}

fn read_boundary_edge(s: &mut StreamSet<'_>) -> Result<BoundaryEdge> {
    let edge = match s.read_byte() {
        1 => BoundaryEdge::Line {
            start: s.read_2raw_double(),
            end: s.read_2raw_double(),
        },
        2 => BoundaryEdge::CircularArc {
            center: s.read_2raw_double(),
            radius: s.read_bit_double(),
            start_angle: s.read_bit_double(),
            end_angle: s.read_bit_double(),
            counter_clockwise: s.read_bit(),
        },
        3 => BoundaryEdge::EllipticArc {
            center: s.read_2raw_double(),
            major_axis: s.read_2raw_double(),
            axis_ratio: s.read_bit_double(),
            start_angle: s.read_bit_double(),
            end_angle: s.read_bit_double(),
            counter_clockwise: s.read_bit(),
        },
        4 => {
            let degree = s.read_bit_long();
            let rational = s.read_bit();
            let periodic = s.read_bit();
            let knot_count = read_count(s, 2, "hatch spline knots")?;
            let control_count = read_count(s, 128, "hatch spline control points")?;
            let knots = (0..knot_count).map(|_| s.read_bit_double()).collect();
            let mut control_points = Vec::with_capacity(control_count);
            let mut weights = Vec::new();
            for _ in 0..control_count {
                control_points.push(s.read_2raw_double());
                if rational {
                    weights.push(s.read_bit_double());
                }
            }
            let mut fit_points = Vec::new();
            let mut start_tangent = Vector2::ZERO;
            let mut end_tangent = Vector2::ZERO;
            if s.layout.r2010_plus {
                let fit_count = read_count(s, 128, "hatch spline fit points")?;
                if fit_count > 0 {
                    fit_points = (0..fit_count).map(|_| s.read_2raw_double()).collect();
                    start_tangent = s.read_2raw_double();
                    end_tangent = s.read_2raw_double();
                }
            }
            BoundaryEdge::Spline {
                degree,
                rational,
                periodic,
                knots,
                control_points,
                weights,
                fit_points,
                start_tangent,
                end_tangent,
            }
        }
        other => {
            return Err(DwgError::Parse(format!(
                "hatch {:#X} has edge type {}",
                s.map_handle, other
            )))
        }
    };
    Ok(edge)
}

fn read_boundary_path(s: &mut StreamSet<'_>) -> Result<(BoundaryPath, usize)> {
    let flags = s.read_bit_long() as u32;
    let mut path = BoundaryPath {
        flags,
        ..Default::default()
    };
    if path.is_polyline() {
        let has_bulges = s.read_bit();
        let closed = s.read_bit();
        let count = read_count(s, 128, "hatch polyline vertices")?;
        let mut vertices = Vec::with_capacity(count);
        for _ in 0..count {
            let point = s.read_2raw_double();
            let bulge = if has_bulges { s.read_bit_double() } else { 0.0 };
            vertices.push(HatchPolylineVertex { point, bulge });
        }
        path.boundary = BoundaryLoop::Polyline { closed, vertices };
    } else {
        let count = read_count(s, 8, "hatch edges")?;
        let mut edges = Vec::with_capacity(count);
        for _ in 0..count {
            edges.push(read_boundary_edge(s)?);
        }
        path.boundary = BoundaryLoop::Edges(edges);
    }
    let sources = read_count(s, 0, "hatch boundary objects")?;
    Ok((path, sources))
}

pub fn read_hatch(s: &mut StreamSet<'_>) -> Result<Record> {
    let layout = s.layout;
    let mut hatch = Hatch {
        common: read_common_entity_data(s)?,
        ..Default::default()
    };

    if layout.r2004_plus {
        let is_gradient = s.read_bit_long() != 0;
        let mut gradient = HatchGradient {
            reserved: s.read_bit_long(),
            angle: s.read_bit_double(),
            shift: s.read_bit_double(),
            single_color: s.read_bit_long() != 0,
            tint: s.read_bit_double(),
            ..Default::default()
        };
        let colors = read_count(s, 20, "gradient colors")?;
        for _ in 0..colors {
            let position = s.read_bit_double();
            // BS: unknown
            s.read_bit_short();
            let rgb = s.read_bit_long() as u32;
            // RC: ignored color byte
            s.read_byte();
            let color = Color::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
            gradient.colors.push((position, color));
        }
        gradient.name = s.read_variable_text();
        if is_gradient {
            hatch.gradient = Some(gradient);
        }
    }

    hatch.elevation = s.read_bit_double();
    hatch.normal = s.read_3bit_double();
    hatch.pattern_name = s.read_variable_text();
    hatch.is_solid = s.read_bit();
    hatch.is_associative = s.read_bit();

    let path_count = read_count(s, 8, "hatch paths")?;
    let mut source_counts = Vec::with_capacity(path_count);
    let mut has_derived = false;
    for _ in 0..path_count {
        let (path, sources) = read_boundary_path(s)?;
        has_derived |= path.flags & 0x04 != 0;
        source_counts.push(sources);
        hatch.paths.push(path);
    }

    hatch.style = s.read_bit_short();
    hatch.pattern_type = s.read_bit_short();
    if !hatch.is_solid {
        hatch.pattern_angle = s.read_bit_double();
        hatch.pattern_scale = s.read_bit_double();
        hatch.is_double = s.read_bit();
        let lines = s.read_bit_short().max(0) as usize;
        for _ in 0..lines {
            let angle = s.read_bit_double();
            let base_point = s.read_2bit_double();
            let offset = s.read_2bit_double();
            let dashes = s.read_bit_short().max(0) as usize;
            let dash_lengths = (0..dashes).map(|_| s.read_bit_double()).collect();
            hatch.pattern_lines.push(HatchPatternLine {
                angle,
                base_point,
                offset,
                dash_lengths,
            });
            s.ensure_good("hatch pattern line")?;
        }
    }
    if has_derived {
        hatch.pixel_size = Some(s.read_bit_double());
    }
    let seeds = read_count(s, 128, "hatch seed points")?;
    hatch.seed_points = (0..seeds).map(|_| s.read_2raw_double()).collect();

    for (path, count) in hatch.paths.iter_mut().zip(source_counts) {
        if count.saturating_mul(8) > s.handles_mut().remaining_bits() as usize {
            return Err(DwgError::Parse(format!(
                "hatch {:#X} path lists {} boundary objects",
                s.map_handle, count
            )));
        }
        path.source_objects = handles(s, count);
    }
    Ok(Record::Hatch(hatch))
}

pub fn read_image(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut image = Image {
        common: read_common_entity_data(s)?,
        ..Default::default()
    };
    image.class_version = s.read_bit_long();
    image.insertion = s.read_3bit_double();
    image.u_vector = s.read_3bit_double();
    image.v_vector = s.read_3bit_double();
    image.size = s.read_2raw_double();
    image.display_flags = ImageDisplayFlags::from_bits_truncate(s.read_bit_short());
    image.clipping = s.read_bit();
    image.brightness = s.read_byte();
    image.contrast = s.read_byte();
    image.fade = s.read_byte();
    if s.layout.r2010_plus {
        image.clip_inverted = s.read_bit();
    }
    let boundary_type = s.read_bit_short();
    image.clip_boundary = if boundary_type == 1 {
        ClipBoundary::Rectangle(s.read_2raw_double(), s.read_2raw_double())
    } else {
        let count = read_count(s, 128, "image clip vertices")?;
        ClipBoundary::Polygon((0..count).map(|_| s.read_2raw_double()).collect())
    };
    image.definition = handle(s);
    image.definition_reactor = handle(s);
    Ok(Record::Image(image))
}
