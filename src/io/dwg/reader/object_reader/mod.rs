//! Record decoder for the `AcDb:AcDbObjects` section.
//!
//! Every handle of the object map points at one record:
//!
//! ```text
//! MS   size of the record data in bytes
//! MC   (R2010+) size of the handle stream in bits
//! OT   object type
//! ...  record data, (R2007+) string stream, handle stream
//! RS   CRC
//! ```
//!
//! The type code picks a decoder from a [`Registry`] built once per file
//! from the built-in codes and the class table. Decoders share one
//! [`StreamSet`] per record: the data, text and handle cursors over the
//! same bytes.

pub mod common;
pub mod read_entities;
pub mod read_objects;
pub mod read_tables;

use std::borrow::Cow;
use std::ops::{Deref, DerefMut};

use ahash::AHashMap;
use encoding_rs::Encoding;
use tracing::trace;

use crate::error::{DwgError, Result};
use crate::io::dwg::layout::VersionLayout;
use crate::io::dwg::object_type::ObjectType;
use crate::record::Record;

use super::bit_reader::{encoding_from_code_page, DwgBitReader};
use super::classes_reader::ClassTable;
use super::merged_reader::DwgMergedReader;

/// Decodes the body of one record type.
pub type Decoder = fn(&mut StreamSet<'_>) -> Result<Record>;

/// Cursors over one record, positioned by [`DwgObjectReader::open`].
///
/// Dereferences to the merged reader so decoders read fields directly.
pub struct StreamSet<'a> {
    data: &'a [u8],
    encoding: &'static Encoding,
    pub layout: VersionLayout,
    /// Raw type code of the record.
    pub type_code: u16,
    /// Resolved type; `Undefined` when the code has no built-in meaning.
    pub object_type: ObjectType,
    /// Handle the record was found under in the object map.
    pub map_handle: u64,
    /// Bit position of the type code, where the size fields count from.
    start_bits: i64,
    reader: DwgMergedReader<'a>,
}

impl<'a> StreamSet<'a> {
    fn stream(&self) -> DwgBitReader<'a> {
        DwgBitReader::new(self.data, self.layout.version).with_encoding(self.encoding)
    }

    /// Position the handle (and for R2007, text) stream from the RL bit
    /// size stored in the record (before R2010).
    pub fn update_handle_reader(&mut self) -> Result<()> {
        let size = i64::from(self.reader.main_mut().read_raw_long());
        self.reader.ensure_good("object bit size")?;
        let end = self.start_bits + size;

        let mut handles = self.stream();
        if !handles.set_position_in_bits(end) {
            return Err(DwgError::StreamOverrun {
                context: format!("handle stream of {:#X}", self.map_handle),
                bit_position: end,
            });
        }
        self.reader.set_handles(Some(handles));

        if self.layout.string_stream && !self.layout.handle_stream_size {
            let mut text = self.stream();
            text.set_position_by_flag(end - 1);
            self.reader.set_text(Some(text));
        }
        Ok(())
    }

    pub fn reader(&mut self) -> &mut DwgMergedReader<'a> {
        &mut self.reader
    }
}

impl<'a> Deref for StreamSet<'a> {
    type Target = DwgMergedReader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl<'a> DerefMut for StreamSet<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

/// Type code to decoder table.
#[derive(Clone)]
pub struct Registry {
    decoders: AHashMap<u16, (ObjectType, Decoder)>,
}

impl Registry {
    /// Built-in codes, plus the class numbers whose names stand for a
    /// built-in record kind.
    pub fn new(classes: &ClassTable) -> Self {
        let mut decoders = AHashMap::new();
        for code in 0..ObjectType::FIRST_CLASS_CODE {
            if let Some(kind) = ObjectType::from_code(code) {
                if let Some(decoder) = decoder_for(kind) {
                    decoders.insert(code, (kind, decoder));
                }
            }
        }
        for class in classes.iter() {
            let code = class.class_number as u16;
            if code < ObjectType::FIRST_CLASS_CODE {
                continue;
            }
            if let Some(kind) = class.builtin {
                if let Some(decoder) = decoder_for(kind) {
                    decoders.insert(code, (kind, decoder));
                }
            }
        }
        Self { decoders }
    }

    pub fn get(&self, code: u16) -> Option<(ObjectType, Decoder)> {
        self.decoders.get(&code).copied()
    }

    pub fn contains(&self, code: u16) -> bool {
        self.decoders.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

fn decoder_for(kind: ObjectType) -> Option<Decoder> {
    use read_entities as e;
    use read_objects as o;
    use read_tables as t;
    use ObjectType::*;

    let decoder: Decoder = match kind {
        Text => e::read_text,
        Attrib => e::read_attribute,
        Attdef => e::read_attribute_definition,
        Block => e::read_block,
        Endblk => e::read_block_end,
        Seqend => e::read_seqend,
        Insert | Minsert => e::read_insert,
        Vertex2D => e::read_vertex_2d,
        Vertex3D | VertexMesh | VertexPface => e::read_vertex_3d,
        VertexPfaceFace => e::read_pface_face,
        Polyline2D => e::read_polyline_2d,
        Polyline3D => e::read_polyline_3d,
        PolylinePface => e::read_polyline_pface,
        PolylineMesh => e::read_polyline_mesh,
        Arc => e::read_arc,
        Circle => e::read_circle,
        Line => e::read_line,
        DimensionOrdinate | DimensionLinear | DimensionAligned | DimensionAng3Pt
        | DimensionAng2Ln | DimensionRadius | DimensionDiameter => e::read_dimension,
        Point => e::read_point,
        Face3D => e::read_face3d,
        Solid | Trace => e::read_solid,
        Viewport => e::read_viewport,
        Ellipse => e::read_ellipse,
        Spline => e::read_spline,
        Ray => e::read_ray,
        Xline => e::read_xline,
        Mtext => e::read_mtext,
        Leader => e::read_leader,
        LwPolyline => e::read_lwpolyline,
        Hatch => e::read_hatch,
        Image => e::read_image,
        BlockControlObj | LayerControlObj | StyleControlObj | LtypeControlObj
        | ViewControlObj | UcsControlObj | VportControlObj | AppidControlObj
        | DimstyleControlObj | VpEntHdrCtrlObj => t::read_table_control,
        BlockHeader => t::read_block_record,
        Layer => t::read_layer,
        Style => t::read_text_style,
        Ltype => t::read_linetype,
        Vport => t::read_vport,
        Appid => t::read_appid,
        Dimstyle => t::read_dimstyle,
        ImageDef => o::read_image_definition,
        _ => return None,
    };
    Some(decoder)
}

/// Outcome of decoding one record.
#[derive(Debug)]
pub enum Decoded {
    Record(Record),
    /// No decoder for this type code; the record was skipped.
    Unsupported(u16),
}

/// Decodes records out of the objects section buffer.
pub struct DwgObjectReader<'a> {
    data: &'a [u8],
    layout: VersionLayout,
    encoding: &'static Encoding,
    classes: &'a ClassTable,
    registry: Cow<'a, Registry>,
}

impl<'a> DwgObjectReader<'a> {
    pub fn new(layout: VersionLayout, data: &'a [u8], classes: &'a ClassTable, code_page: u16) -> Self {
        Self {
            data,
            layout,
            encoding: encoding_from_code_page(code_page),
            classes,
            registry: Cow::Owned(Registry::new(classes)),
        }
    }

    /// Reader over a registry already built from `classes`.
    pub fn with_registry(
        layout: VersionLayout,
        data: &'a [u8],
        classes: &'a ClassTable,
        registry: &'a Registry,
        code_page: u16,
    ) -> Self {
        Self {
            data,
            layout,
            encoding: encoding_from_code_page(code_page),
            classes,
            registry: Cow::Borrowed(registry),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolved type of a raw code, through the class table for 500+.
    pub fn resolve(&self, code: u16) -> Option<ObjectType> {
        self.classes.resolve(code)
    }

    /// Whether records of this code carry common entity data.
    pub fn is_entity_code(&self, code: u16) -> bool {
        match self.resolve(code) {
            Some(kind) => kind.is_entity(),
            None => self.classes.get(code).is_some_and(|c| c.is_entity()),
        }
    }

    /// Frame the record at `location` and position its streams after the
    /// type code.
    pub fn open(&self, handle: u64, location: i64) -> Result<StreamSet<'a>> {
        if location < 0 || location as u64 >= self.data.len() as u64 {
            return Err(DwgError::BadLocation {
                handle,
                offset: location,
            });
        }
        let version = self.layout.version;
        let mut main = DwgBitReader::new(self.data, version).with_encoding(self.encoding);
        main.set_position(location as usize);

        let size = main.read_modular_short();
        main.ensure_good("object size")?;
        if size == 0 || location as u64 + u64::from(size) > self.data.len() as u64 {
            return Err(DwgError::BadSize {
                handle,
                size: u64::from(size),
            });
        }

        let mut text = None;
        let mut handles = None;
        let start_bits;
        if self.layout.handle_stream_size {
            let handle_bits = main.read_modular_char() as i64;
            main.ensure_good("object handle stream size")?;
            start_bits = main.position_in_bits();
            let handle_offset = start_bits + i64::from(size) * 8 - handle_bits;
            if handle_bits < 0 || handle_offset < start_bits {
                return Err(DwgError::BadSize {
                    handle,
                    size: handle_bits as u64,
                });
            }
            let mut h = DwgBitReader::new(self.data, version).with_encoding(self.encoding);
            h.set_position_in_bits(handle_offset);
            handles = Some(h);

            let mut t = DwgBitReader::new(self.data, version).with_encoding(self.encoding);
            t.set_position_by_flag(handle_offset - 1);
            text = Some(t);
        } else {
            start_bits = main.position_in_bits();
        }

        let type_code = main.read_object_type();
        main.ensure_good("object type")?;
        let object_type = self.resolve(type_code).unwrap_or(ObjectType::Undefined);

        let mut reader = DwgMergedReader::new(main);
        reader.set_text(text);
        reader.set_handles(handles);

        Ok(StreamSet {
            data: self.data,
            encoding: self.encoding,
            layout: self.layout,
            type_code,
            object_type,
            map_handle: handle,
            start_bits,
            reader,
        })
    }

    /// Raw type code of the record at `location`.
    pub fn type_code(&self, handle: u64, location: i64) -> Result<u16> {
        Ok(self.open(handle, location)?.type_code)
    }

    /// Decode the record at `location`.
    pub fn read(&self, handle: u64, location: i64) -> Result<Decoded> {
        let mut streams = self.open(handle, location)?;
        let Some((kind, decoder)) = self.registry.get(streams.type_code) else {
            trace!(handle, code = streams.type_code, "no decoder");
            return Ok(Decoded::Unsupported(streams.type_code));
        };
        streams.object_type = kind;
        let record = decoder(&mut streams)?;
        streams.ensure_good(kind_context(kind))?;
        trace!(handle, kind = ?kind, "decoded record");
        Ok(Decoded::Record(record))
    }
}

fn kind_context(kind: ObjectType) -> &'static str {
    if kind.is_entity() {
        "entity record"
    } else if kind.is_control() {
        "table control record"
    } else {
        "object record"
    }
}
