//! Table control objects and table entries.

use crate::header::HeaderVariables;
use crate::error::{DwgError, Result};
use crate::io::dwg::object_type::ObjectType;
use crate::record::Record;
use crate::tables::{
    AppId, BlockRecord, DimStyle, Layer, LayerFlags, LineType, LineTypeSegment, TableControl,
    TextStyle, VPort,
};
use crate::types::{Handle, LineWeight};

use super::super::header_reader::{read_field, DIMSTYLE_LAYOUT};
use super::common::{read_common_non_entity_data, read_table_entry_common};
use super::StreamSet;

/// Size of the linetype string area before R2007.
const LTYPE_STRING_AREA: usize = 256;
/// Size of the R2007+ linetype string area, stored only when a dash
/// carries text.
const LTYPE_STRING_AREA_UNICODE: usize = 512;

fn handle(s: &mut StreamSet<'_>) -> Handle {
    Handle::new(s.handle_reference())
}

/// Any table control: entry count, then the entry handles. Block,
/// linetype and (R2000+) dimstyle controls list extra handles after the
/// entries.
pub fn read_table_control(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_non_entity_data(s)?;
    let kind = s.object_type;
    let mut control = TableControl::new(common.handle, kind);
    control.reactors = common.reactors;
    control.xdictionary = common.xdictionary;
    control.extended_data = common.extended_data;

    let count = s.read_bit_long().max(0) as usize;
    let mut extra = match kind {
        ObjectType::BlockControlObj | ObjectType::LtypeControlObj => 2,
        _ => 0,
    };
    if kind == ObjectType::DimstyleControlObj && s.layout.r2000_plus {
        extra = s.read_byte() as usize;
    }
    s.ensure_good("table control")?;
    if count.saturating_mul(8) > s.handles_mut().remaining_bits() as usize {
        return Err(DwgError::Parse(format!(
            "table control {:#X} lists {} entries",
            s.map_handle, count
        )));
    }

    for _ in 0..count {
        let entry = handle(s);
        if !entry.is_null() {
            control.entries.push(entry);
        }
    }
    for _ in 0..extra {
        let special = handle(s);
        if !special.is_null() {
            control.special.push(special);
        }
    }
    Ok(Record::TableControl(control))
}

pub fn read_layer(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut layer = Layer {
        entry: read_table_entry_common(s)?,
        ..Default::default()
    };

    if s.layout.r2000_plus {
        let values = s.read_bit_short();
        layer.flags = LayerFlags::from_bits(values);
        layer.line_weight = LineWeight::from_dwg_index(((values & 0x3E0) >> 5) as u8);
    } else {
        let frozen = s.read_bit();
        let on = s.read_bit();
        let frozen_in_new = s.read_bit();
        let locked = s.read_bit();
        layer.flags = LayerFlags {
            frozen,
            off: !on,
            frozen_in_new,
            locked,
            plottable: true,
        };
    }
    layer.color = s.read_cm_color();

    if s.layout.r2000_plus {
        layer.plotstyle = handle(s);
    }
    if s.layout.r2007_plus {
        layer.material = handle(s);
    }
    layer.linetype = handle(s);
    if s.layout.r2013_plus {
        // H: unknown
        handle(s);
    }
    Ok(Record::Layer(layer))
}

pub fn read_text_style(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut style = TextStyle {
        entry: read_table_entry_common(s)?,
        ..Default::default()
    };
    style.vertical = s.read_bit();
    style.is_shape_file = s.read_bit();
    style.fixed_height = s.read_bit_double();
    style.width_factor = s.read_bit_double();
    style.oblique_angle = s.read_bit_double();
    style.generation = s.read_byte();
    style.last_height = s.read_bit_double();
    style.font_file = s.read_variable_text();
    style.big_font_file = s.read_variable_text();
    Ok(Record::TextStyle(style))
}

pub fn read_linetype(s: &mut StreamSet<'_>) -> Result<Record> {
    let mut ltype = LineType {
        entry: read_table_entry_common(s)?,
        ..Default::default()
    };
    ltype.description = s.read_variable_text();
    ltype.pattern_length = s.read_bit_double();
    ltype.alignment = s.read_byte();
    let dashes = s.read_byte() as usize;

    for _ in 0..dashes {
        let segment = LineTypeSegment {
            length: s.read_bit_double(),
            shape_number: s.read_bit_short(),
            offset: s.read_2raw_double(),
            scale: s.read_bit_double(),
            rotation: s.read_bit_double(),
            shape_flag: s.read_bit_short(),
            ..Default::default()
        };
        ltype.segments.push(segment);
    }
    s.ensure_good("linetype dashes")?;

    let unicode = s.layout.r2007_plus;
    let area = if !unicode {
        LTYPE_STRING_AREA
    } else if ltype.segments.iter().any(LineTypeSegment::is_text) {
        LTYPE_STRING_AREA_UNICODE
    } else {
        0
    };
    if area > 0 {
        ltype.string_area = s.read_bytes(area);
    }

    let encoding = s.encoding();
    for segment in &mut ltype.segments {
        segment.style = handle(s);
        if segment.is_text() {
            let start = segment.shape_number.max(0) as usize;
            if let Some(bytes) = ltype.string_area.get(start..) {
                segment.text = Some(if unicode {
                    let units: Vec<u16> = bytes
                        .chunks_exact(2)
                        .map(|c| u16::from_le_bytes([c[0], c[1]]))
                        .take_while(|&u| u != 0)
                        .collect();
                    String::from_utf16_lossy(&units)
                } else {
                    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                    encoding.decode(&bytes[..end]).0.into_owned()
                });
            }
        }
    }
    Ok(Record::LineType(ltype))
}

pub fn read_vport(s: &mut StreamSet<'_>) -> Result<Record> {
    let layout = s.layout;
    let mut vport = VPort {
        entry: read_table_entry_common(s)?,
        ..Default::default()
    };
    vport.view_height = s.read_bit_double();
    vport.aspect_ratio = s.read_bit_double();
    vport.view_center = s.read_2raw_double();
    vport.view_target = s.read_3bit_double();
    vport.view_direction = s.read_3bit_double();
    vport.twist_angle = s.read_bit_double();
    vport.lens_length = s.read_bit_double();
    vport.front_clip = s.read_bit_double();
    vport.back_clip = s.read_bit_double();
    // 4 bits: perspective, front clip, back clip, front clip at eye
    vport.view_mode = (s.read_2bits() << 2) | s.read_2bits();

    if layout.r2000_plus {
        vport.render_mode = s.read_byte();
    }
    if layout.r2007_plus {
        vport.default_lighting = s.read_bit();
        vport.default_lighting_type = s.read_byte();
        vport.brightness = s.read_bit_double();
        vport.contrast = s.read_bit_double();
        vport.ambient_color = Some(s.read_cm_color());
    }

    vport.lower_left = s.read_2raw_double();
    vport.upper_right = s.read_2raw_double();
    vport.ucs_follow = s.read_bit();
    vport.circle_sides = s.read_bit_short();
    vport.fast_zoom = s.read_bit();
    vport.ucs_icon = s.read_2bits();
    vport.grid_on = s.read_bit();
    vport.grid_spacing = s.read_2raw_double();
    vport.snap_on = s.read_bit();
    vport.snap_style = s.read_bit();
    vport.snap_isopair = s.read_bit_short();
    vport.snap_rotation = s.read_bit_double();
    vport.snap_base = s.read_2raw_double();
    vport.snap_spacing = s.read_2raw_double();

    if layout.r2000_plus {
        // B: unknown
        s.read_bit();
        vport.ucs_per_viewport = s.read_bit();
        vport.ucs_origin = s.read_3bit_double();
        vport.ucs_x_axis = s.read_3bit_double();
        vport.ucs_y_axis = s.read_3bit_double();
        vport.ucs_elevation = s.read_bit_double();
        vport.ucs_ortho_type = s.read_bit_short();
    }
    if layout.r2007_plus {
        vport.grid_flags = s.read_bit_short();
        vport.grid_major = s.read_bit_short();
    }

    if layout.r2007_plus {
        vport.background = handle(s);
        vport.visual_style = handle(s);
        vport.sun = handle(s);
    }
    if layout.r2000_plus {
        vport.named_ucs = handle(s);
        vport.base_ucs = handle(s);
    }
    Ok(Record::VPort(vport))
}

pub fn read_appid(s: &mut StreamSet<'_>) -> Result<Record> {
    let entry = read_table_entry_common(s)?;
    let unknown = s.read_byte();
    Ok(Record::AppId(AppId { entry, unknown }))
}

/// DIMSTYLE values share their encoding with the header's DIM variables;
/// they are stored by the same names.
pub fn read_dimstyle(s: &mut StreamSet<'_>) -> Result<Record> {
    let layout = s.layout;
    let mut style = DimStyle {
        entry: read_table_entry_common(s)?,
        ..Default::default()
    };

    let mut values = HeaderVariables::new();
    for field in DIMSTYLE_LAYOUT {
        if !field.presence.applies(&layout, &values) {
            continue;
        }
        let value = read_field(s.reader(), field.kind);
        if !field.name.is_empty() {
            values.set(field.name, value);
        }
    }
    style.variables = values;
    s.ensure_good("dimstyle values")?;

    style.text_style = handle(s);
    if layout.r2000_plus {
        style.leader_arrow = handle(s);
        style.arrow = handle(s);
        style.arrow1 = handle(s);
        style.arrow2 = handle(s);
    }
    if layout.r2007_plus {
        style.dimension_linetype = handle(s);
        style.extension1_linetype = handle(s);
        style.extension2_linetype = handle(s);
    }
    Ok(Record::DimStyle(style))
}

pub fn read_block_record(s: &mut StreamSet<'_>) -> Result<Record> {
    let layout = s.layout;
    let mut block = BlockRecord {
        entry: read_table_entry_common(s)?,
        ..Default::default()
    };
    block.anonymous = s.read_bit();
    block.has_attributes = s.read_bit();
    block.is_xref = s.read_bit();
    block.is_overlay = s.read_bit();
    if layout.r2000_plus {
        block.loaded = s.read_bit();
    }

    let lists_entities = !block.is_xref && !block.is_overlay;
    let mut owned_count = 0usize;
    if layout.r2004_plus && lists_entities {
        owned_count = s.read_bit_long().max(0) as usize;
    }
    block.base_point = s.read_3bit_double();
    block.xref_path = s.read_variable_text();

    let mut insert_count = 0usize;
    if layout.r2000_plus {
        // RC run ended by a zero byte; its length is the insert count
        while s.is_good() && s.read_byte() != 0 {
            insert_count += 1;
        }
        block.description = s.read_variable_text();
        let preview_size = s.read_bit_long().max(0) as usize;
        block.preview = s.read_bytes(preview_size);
    }
    if layout.r2007_plus {
        block.units = s.read_bit_short();
        block.explodable = s.read_bit();
        block.can_scale = s.read_byte() != 0;
    }
    s.ensure_good("block record")?;
    if owned_count.saturating_mul(8) > s.handles_mut().remaining_bits() as usize {
        return Err(DwgError::Parse(format!(
            "block record {:#X} owns {} entities",
            s.map_handle, owned_count
        )));
    }

    block.block_entity = handle(s);
    if lists_entities {
        if layout.r2004_plus {
            block.owned = (0..owned_count).map(|_| handle(s)).collect();
        } else {
            block.first_entity = handle(s);
            block.last_entity = handle(s);
        }
    }
    block.end_block = handle(s);
    if layout.r2000_plus {
        block.inserts = (0..insert_count).map(|_| handle(s)).collect();
        block.layout = handle(s);
    }
    Ok(Record::BlockRecord(block))
}
