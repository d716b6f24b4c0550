//! Single records decoded straight from an object stream.

mod common;

use common::RecordWriter;
use dwg_decode::io::dwg::layout::VersionLayout;
use dwg_decode::io::dwg::reader::classes_reader::ClassTable;
use dwg_decode::io::dwg::reader::object_reader::{Decoded, DwgObjectReader};
use dwg_decode::io::dwg::ObjectType;
use dwg_decode::entities::{BoundaryEdge, BoundaryLoop, DimensionKind};
use dwg_decode::{DwgError, DwgVersion, Record, Vector2, Vector3};

const OWNER: u64 = 0x05;
const LAYER: u64 = 0x10;
const STYLE: u64 = 0x11;

/// One release per record framing: RL bit size, R2004 paging, string
/// stream, handle stream size, R2018 fields.
const FRAMINGS: [DwgVersion; 5] = [
    DwgVersion::AC1015,
    DwgVersion::AC1018,
    DwgVersion::AC1021,
    DwgVersion::AC1024,
    DwgVersion::AC1032,
];

fn decode(version: DwgVersion, handle: u64, bytes: &[u8]) -> dwg_decode::Result<Record> {
    let classes = ClassTable::new();
    let reader = DwgObjectReader::new(VersionLayout::new(version), bytes, &classes, 30);
    match reader.read(handle, 0)? {
        Decoded::Record(record) => Ok(record),
        Decoded::Unsupported(code) => panic!("type {} has no decoder", code),
    }
}

// ---------------------------------------------------------------------------
// Builders for the records under test
// ---------------------------------------------------------------------------

struct Dash {
    length: f64,
    shape_number: i16,
    shape_flag: i16,
    style: u64,
}

fn linetype(version: DwgVersion, name: &str, dashes: &[Dash], area: &[u8]) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Ltype.code(), 0x20);
    rec.table_entry_common(OWNER, name);
    rec.text("Dash text dash");
    rec.data.bit_double(dashes.iter().map(|d| d.length.abs()).sum());
    rec.data.byte(b'A');
    rec.data.byte(dashes.len() as u8);
    for dash in dashes {
        rec.data.bit_double(dash.length);
        rec.data.bit_short(dash.shape_number);
        rec.data.raw_double(0.0);
        rec.data.raw_double(-0.5);
        rec.data.bit_double(1.0);
        rec.data.bit_double(0.0);
        rec.data.bit_short(dash.shape_flag);
    }
    rec.data.bytes(area);
    for dash in dashes {
        rec.handle(5, dash.style);
    }
    rec.finish()
}

fn weighted_spline(version: DwgVersion, points: &[(Vector3, f64)], knots: &[f64]) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Spline.code(), 0x30);
    rec.entity_common(LAYER);
    let layout = rec.layout();
    let d = &mut rec.data;
    d.bit_long(1);
    if layout.r2013_plus {
        d.bit_long(0);
        d.bit_long(15);
    }
    d.bit_long(3);
    d.bit(true); // rational
    d.bit(false);
    d.bit(false);
    d.bit_double(1e-10);
    d.bit_double(1e-10);
    d.bit_long(knots.len() as i32);
    d.bit_long(points.len() as i32);
    d.bit(true);
    for &k in knots {
        d.bit_double(k);
    }
    for &(p, w) in points {
        d.point3(p);
        d.bit_double(w);
    }
    rec.finish()
}

fn arc(version: DwgVersion, center: Vector3, radius: f64, start: f64, end: f64) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Arc.code(), 0x40);
    rec.entity_common(LAYER);
    let d = &mut rec.data;
    d.point3(center);
    d.bit_double(radius);
    d.bit(true); // no thickness
    d.bit(true); // default extrusion
    d.bit_double(start);
    d.bit_double(end);
    rec.finish()
}

/// LWPOLYLINE with bulges; points after the first are stored against the
/// previous one.
fn lwpolyline(version: DwgVersion, points: &[Vector2], bulges: &[f64]) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::LwPolyline.code(), 0x41);
    rec.entity_common(LAYER);
    let d = &mut rec.data;
    let mut flags = 0x200; // closed
    if !bulges.is_empty() {
        flags |= 0x10;
    }
    d.bit_short(flags);
    d.bit_long(points.len() as i32);
    if !bulges.is_empty() {
        d.bit_long(bulges.len() as i32);
    }
    let mut previous = Vector2::ZERO;
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            d.raw_double(p.x);
            d.raw_double(p.y);
        } else {
            d.bit_double_with_default(p.x, previous.x);
            d.bit_double_with_default(p.y, previous.y);
        }
        previous = *p;
    }
    for &b in bulges {
        d.bit_double(b);
    }
    rec.finish()
}

/// Solid HATCH with a closed polyline loop and a line-and-arc edge loop.
fn solid_hatch(version: DwgVersion, square: &[Vector2]) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Hatch.code(), 0x42);
    rec.entity_common(LAYER);
    if rec.layout().r2004_plus {
        let d = &mut rec.data;
        d.bit_long(0); // not a gradient
        d.bit_long(0);
        d.bit_double(0.0);
        d.bit_double(0.0);
        d.bit_long(0);
        d.bit_double(0.0);
        d.bit_long(0); // no colors
        rec.text("");
    }
    rec.data.bit_double(0.0); // elevation
    rec.data.point3(Vector3::UNIT_Z);
    rec.text("SOLID");
    let d = &mut rec.data;
    d.bit(true); // solid
    d.bit(false); // associative
    d.bit_long(2);

    d.bit_long(0x02);
    d.bit(false); // no bulges
    d.bit(true); // closed
    d.bit_long(square.len() as i32);
    for p in square {
        d.raw_double(p.x);
        d.raw_double(p.y);
    }
    d.bit_long(0); // sources

    d.bit_long(0x01);
    d.bit_long(2);
    d.byte(1);
    for v in [0.0, 0.0, 2.0, 0.0] {
        d.raw_double(v);
    }
    d.byte(2);
    d.raw_double(1.0);
    d.raw_double(0.0);
    d.bit_double(1.0);
    d.bit_double(0.0);
    d.bit_double(std::f64::consts::PI);
    d.bit(true);
    d.bit_long(0);

    d.bit_short(1); // outer style
    d.bit_short(1); // predefined
    d.bit_long(1);
    d.raw_double(0.5);
    d.raw_double(0.5);
    rec.finish()
}

/// Linear DIMENSION measuring from `first` to `second`.
fn linear_dimension(version: DwgVersion, first: Vector3, second: Vector3, text: &str) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::DimensionLinear.code(), 0x43);
    rec.entity_common(LAYER);
    let layout = rec.layout();
    if layout.r2010_plus {
        rec.data.byte(0);
    }
    rec.data.point3(Vector3::UNIT_Z);
    rec.data.raw_double(5.0);
    rec.data.raw_double(3.0);
    rec.data.bit_double(0.0); // elevation
    rec.data.byte(0);
    rec.text(text);
    let d = &mut rec.data;
    d.bit_double(0.0);
    d.bit_double(0.0);
    d.point3(Vector3::new(1.0, 1.0, 1.0));
    d.bit_double(0.0);
    d.bit_short(5); // attachment
    d.bit_short(1);
    d.bit_double(1.0);
    d.bit_double((second.x - first.x).abs());
    if layout.r2007_plus {
        d.bit(false);
        d.bit(true); // flip first arrow
        d.bit(false);
    }
    d.raw_double(0.0);
    d.raw_double(0.0);
    d.point3(first);
    d.point3(second);
    d.point3(Vector3::new(second.x, 3.0, 0.0));
    d.bit_double(0.0);
    d.bit_double(0.0);
    rec.handle(5, STYLE);
    rec.handle(5, 0x2A);
    rec.finish()
}

fn fit_spline(version: DwgVersion, fit: &[Vector3]) -> Vec<u8> {
    let mut rec = RecordWriter::new(version, ObjectType::Spline.code(), 0x31);
    rec.entity_common(LAYER);
    let layout = rec.layout();
    let d = &mut rec.data;
    d.bit_long(2);
    if layout.r2013_plus {
        d.bit_long(1);
        d.bit_long(0);
    }
    d.bit_long(3);
    d.bit_double(0.0);
    d.point3(Vector3::new(1.0, 0.0, 0.0));
    d.point3(Vector3::new(0.0, 1.0, 0.0));
    d.bit_long(fit.len() as i32);
    for &p in fit {
        d.point3(p);
    }
    rec.finish()
}

// ---------------------------------------------------------------------------
// Linetypes
// ---------------------------------------------------------------------------

#[test]
fn test_linetype_text_dash_from_byte_area() {
    let mut area = vec![0u8; 256];
    area[12..16].copy_from_slice(b"GAS\0");
    let dashes = [
        Dash { length: 0.5, shape_number: 0, shape_flag: 0, style: 0 },
        Dash { length: -0.2, shape_number: 12, shape_flag: 2, style: STYLE },
        Dash { length: 0.5, shape_number: 0, shape_flag: 0, style: 0 },
    ];
    let bytes = linetype(DwgVersion::AC1015, "GAS_LINE", &dashes, &area);

    let Record::LineType(ltype) = decode(DwgVersion::AC1015, 0x20, &bytes).unwrap() else {
        panic!("not a linetype");
    };
    assert_eq!(ltype.entry.name, "GAS_LINE");
    assert_eq!(ltype.entry.owner.value(), OWNER);
    assert_eq!(ltype.description, "Dash text dash");
    assert_eq!(ltype.alignment, b'A');
    assert_eq!(ltype.segments.len(), 3);
    assert!((ltype.pattern_length - 1.2).abs() < 1e-12);

    let text = &ltype.segments[1];
    assert!(text.is_text());
    assert_eq!(text.text.as_deref(), Some("GAS"));
    assert_eq!(text.style.value(), STYLE);
    assert_eq!(text.offset.y, -0.5);
    assert!(ltype.segments[0].text.is_none());
}

#[test]
fn test_linetype_text_dash_from_unicode_area() {
    let mut area = vec![0u8; 512];
    for (i, unit) in "HW".encode_utf16().enumerate() {
        area[4 + i * 2..6 + i * 2].copy_from_slice(&unit.to_le_bytes());
    }
    let dashes = [
        Dash { length: 1.0, shape_number: 0, shape_flag: 0, style: 0 },
        Dash { length: -0.25, shape_number: 4, shape_flag: 2, style: STYLE },
    ];
    for version in [DwgVersion::AC1021, DwgVersion::AC1027] {
        let bytes = linetype(version, "HOT_WATER", &dashes, &area);
        let Record::LineType(ltype) = decode(version, 0x20, &bytes).unwrap() else {
            panic!("{:?}: not a linetype", version);
        };
        assert_eq!(ltype.entry.name, "HOT_WATER", "{:?}", version);
        assert_eq!(ltype.description, "Dash text dash");
        assert_eq!(ltype.string_area.len(), 512);
        assert_eq!(ltype.segments[1].text.as_deref(), Some("HW"), "{:?}", version);
    }
}

#[test]
fn test_continuous_linetype_skips_unicode_area() {
    let bytes = linetype(DwgVersion::AC1024, "Continuous", &[], &[]);
    let Record::LineType(ltype) = decode(DwgVersion::AC1024, 0x20, &bytes).unwrap() else {
        panic!("not a linetype");
    };
    assert!(ltype.is_continuous());
    assert!(ltype.string_area.is_empty());
}

// ---------------------------------------------------------------------------
// Entities per record framing
// ---------------------------------------------------------------------------

#[test]
fn test_arc_every_framing() {
    let center = Vector3::new(2.0, -3.5, 0.0);
    for version in FRAMINGS {
        let bytes = arc(version, center, 4.25, 0.0, 1.5);
        let Record::Arc(arc) = decode(version, 0x40, &bytes).unwrap() else {
            panic!("{:?}: not an arc", version);
        };
        assert_eq!(arc.center, center, "{:?}", version);
        assert_eq!(arc.radius, 4.25);
        assert_eq!(arc.start_angle, 0.0);
        assert_eq!(arc.end_angle, 1.5);
        assert_eq!(arc.thickness, 0.0);
        assert_eq!(arc.normal, Vector3::UNIT_Z);
        assert_eq!(arc.common.layer.value(), LAYER);
    }
}

#[test]
fn test_text_every_framing() {
    let at = Vector3::new(10.0, 20.0, 1.5);
    for version in FRAMINGS {
        let bytes = common::text(version, 0x44, LAYER, "M12 bore", at, 3.5, STYLE);
        let Record::Text(text) = decode(version, 0x44, &bytes).unwrap() else {
            panic!("{:?}: not a text", version);
        };
        assert_eq!(text.value, "M12 bore", "{:?}", version);
        assert_eq!(text.insertion, at);
        assert_eq!(text.alignment, at);
        assert_eq!(text.height, 3.5);
        assert_eq!(text.width_factor, 1.0);
        assert_eq!(text.rotation, 0.0);
        assert_eq!(text.style.value(), STYLE);
    }
}

#[test]
fn test_lwpolyline_every_framing() {
    let points = [
        Vector2::new(0.0, 0.0),
        Vector2::new(5.0, 0.0),
        Vector2::new(5.0, 2.5),
        Vector2::new(0.0, 2.5),
    ];
    let bulges = [0.0, 0.5, 0.0, -0.5];
    for version in FRAMINGS {
        let bytes = lwpolyline(version, &points, &bulges);
        let Record::LwPolyline(pline) = decode(version, 0x41, &bytes).unwrap() else {
            panic!("{:?}: not a lwpolyline", version);
        };
        assert_eq!(pline.flags & 0x200, 0x200, "{:?}", version);
        let locations: Vec<Vector2> = pline.vertices.iter().map(|v| v.location).collect();
        assert_eq!(locations, points, "{:?}", version);
        let read: Vec<f64> = pline.vertices.iter().map(|v| v.bulge).collect();
        assert_eq!(read, bulges);
        assert_eq!(pline.normal, Vector3::UNIT_Z);
    }
}

#[test]
fn test_solid_hatch_every_framing() {
    let square = [
        Vector2::new(0.0, 0.0),
        Vector2::new(2.0, 0.0),
        Vector2::new(2.0, 2.0),
        Vector2::new(0.0, 2.0),
    ];
    for version in FRAMINGS {
        let bytes = solid_hatch(version, &square);
        let Record::Hatch(hatch) = decode(version, 0x42, &bytes).unwrap() else {
            panic!("{:?}: not a hatch", version);
        };
        assert!(hatch.is_solid, "{:?}", version);
        assert!(hatch.gradient.is_none());
        assert_eq!(hatch.pattern_name, "SOLID");
        assert_eq!(hatch.style, 1);
        assert_eq!(hatch.paths.len(), 2);
        assert_eq!(hatch.pixel_size, None);
        assert_eq!(hatch.seed_points, vec![Vector2::new(0.5, 0.5)]);

        let BoundaryLoop::Polyline { closed, vertices } = &hatch.paths[0].boundary else {
            panic!("{:?}: first path is not a polyline", version);
        };
        assert!(closed);
        let corners: Vec<Vector2> = vertices.iter().map(|v| v.point).collect();
        assert_eq!(corners, square);

        let BoundaryLoop::Edges(edges) = &hatch.paths[1].boundary else {
            panic!("{:?}: second path has no edges", version);
        };
        assert_eq!(edges.len(), 2);
        assert!(matches!(
            edges[0],
            BoundaryEdge::Line { end, .. } if end == Vector2::new(2.0, 0.0)
        ));
        assert!(matches!(
            edges[1],
            BoundaryEdge::CircularArc { radius, counter_clockwise: true, .. } if radius == 1.0
        ));
    }
}

#[test]
fn test_linear_dimension_every_framing() {
    let first = Vector3::new(0.0, 0.0, 0.0);
    let second = Vector3::new(8.0, 0.0, 0.0);
    for version in FRAMINGS {
        let bytes = linear_dimension(version, first, second, "<> mm");
        let Record::Dimension(dim) = decode(version, 0x43, &bytes).unwrap() else {
            panic!("{:?}: not a dimension", version);
        };
        assert_eq!(dim.base.user_text, "<> mm", "{:?}", version);
        assert_eq!(dim.base.text_midpoint, Vector3::new(5.0, 3.0, 0.0));
        assert_eq!(dim.base.actual_measurement, 8.0);
        assert_eq!(dim.base.attachment, 5);
        assert_eq!(dim.base.flip_arrow1, version >= DwgVersion::AC1021);
        assert_eq!(dim.base.style.value(), STYLE);
        assert_eq!(dim.base.block.value(), 0x2A);
        let DimensionKind::Linear {
            first_point,
            second_point,
            definition_point,
            ..
        } = dim.kind
        else {
            panic!("{:?}: not linear", version);
        };
        assert_eq!(first_point, first);
        assert_eq!(second_point, second);
        assert_eq!(definition_point, Vector3::new(8.0, 3.0, 0.0));
    }
}

// ---------------------------------------------------------------------------
// Splines
// ---------------------------------------------------------------------------

#[test]
fn test_weighted_spline_keeps_one_weight_per_point() {
    let points = [
        (Vector3::new(0.0, 0.0, 0.0), 1.0),
        (Vector3::new(1.0, 2.0, 0.0), 0.5),
        (Vector3::new(3.0, 2.0, 0.0), 0.5),
        (Vector3::new(4.0, 0.0, 0.0), 1.0),
    ];
    let knots = [0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
    for version in [DwgVersion::AC1015, DwgVersion::AC1018, DwgVersion::AC1032] {
        let bytes = weighted_spline(version, &points, &knots);
        let Record::Spline(spline) = decode(version, 0x30, &bytes).unwrap() else {
            panic!("{:?}: not a spline", version);
        };
        assert_eq!(spline.scenario, 1, "{:?}", version);
        assert_eq!(spline.degree, 3);
        assert!(spline.rational);
        assert_eq!(spline.knots, knots);
        assert_eq!(spline.control_points.len(), 4);
        assert_eq!(spline.control_points[1], Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(spline.weights, vec![1.0, 0.5, 0.5, 1.0]);
        assert!(spline.fit_points.is_empty());
        assert_eq!(spline.common.layer.value(), LAYER);
    }
}

#[test]
fn test_fit_spline() {
    let fit = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(2.0, 1.0, 0.0),
        Vector3::new(4.0, 0.0, 0.0),
    ];
    for version in [DwgVersion::AC1018, DwgVersion::AC1027] {
        let bytes = fit_spline(version, &fit);
        let Record::Spline(spline) = decode(version, 0x31, &bytes).unwrap() else {
            panic!("{:?}: not a spline", version);
        };
        assert!(spline.has_fit_data(), "{:?}", version);
        assert_eq!(spline.fit_points, fit);
        assert_eq!(spline.start_tangent, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(spline.end_tangent, Vector3::new(0.0, 1.0, 0.0));
        assert!(spline.weights.is_empty());
        assert!(spline.knots.is_empty());
    }
}

#[test]
fn test_spline_with_bad_scenario_is_an_error() {
    let mut rec = RecordWriter::new(DwgVersion::AC1018, ObjectType::Spline.code(), 0x32);
    rec.entity_common(LAYER);
    rec.data.bit_long(7);
    rec.data.bit_long(3);
    let bytes = rec.finish();
    assert!(matches!(
        decode(DwgVersion::AC1018, 0x32, &bytes),
        Err(DwgError::Parse(_))
    ));
}

// ---------------------------------------------------------------------------
// Table controls
// ---------------------------------------------------------------------------

#[test]
fn test_block_control_specials() {
    let mut rec = RecordWriter::new(DwgVersion::AC1024, ObjectType::BlockControlObj.code(), 0x01);
    rec.object_common(0);
    rec.data.bit_long(1);
    rec.handle(2, 0x1F);
    rec.handle(3, 0x1A);
    rec.handle(3, 0x1B);
    let bytes = rec.finish();

    let Record::TableControl(control) = decode(DwgVersion::AC1024, 0x01, &bytes).unwrap() else {
        panic!("not a table control");
    };
    assert_eq!(control.kind, ObjectType::BlockControlObj);
    let entries: Vec<u64> = control.entries.iter().map(|h| h.value()).collect();
    let special: Vec<u64> = control.special.iter().map(|h| h.value()).collect();
    assert_eq!(entries, vec![0x1F]);
    assert_eq!(special, vec![0x1A, 0x1B]);
}

#[test]
fn test_control_count_past_stream_is_rejected() {
    let mut rec = RecordWriter::new(DwgVersion::AC1015, ObjectType::LayerControlObj.code(), 0x02);
    rec.object_common(0);
    rec.data.bit_long(100_000);
    let bytes = rec.finish();
    assert!(decode(DwgVersion::AC1015, 0x02, &bytes).is_err());
}
