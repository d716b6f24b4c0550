//! Decoded-record sink
//!
//! The reader pushes every successfully decoded record into a [`DwgSink`],
//! one call per record, in reading order: file info and header first,
//! then table controls and entries, then blocks with their entities,
//! then entities outside any block, then free-standing objects.
//!
//! Every method has an empty default, so a sink only implements what it
//! cares about. [`RecordCollector`] keeps everything.

use crate::entities::*;
use crate::header::HeaderVariables;
use crate::io::dwg::reader::DwgFileInfo;
use crate::objects::ImageDefinition;
use crate::record::Record;
use crate::tables::{
    AppId, BlockRecord, DimStyle, Layer, LineType, Table, TableControl, TextStyle, VPort,
};
use crate::types::Handle;

/// Receiver of decoded records.
#[allow(unused_variables)]
pub trait DwgSink {
    fn add_file_info(&mut self, info: &DwgFileInfo) {}
    fn add_header(&mut self, header: &HeaderVariables) {}

    fn add_table_control(&mut self, control: &TableControl) {}
    fn add_layer(&mut self, layer: &Layer) {}
    fn add_linetype(&mut self, linetype: &LineType) {}
    fn add_text_style(&mut self, style: &TextStyle) {}
    fn add_dimstyle(&mut self, style: &DimStyle) {}
    fn add_vport(&mut self, vport: &VPort) {}
    fn add_block_record(&mut self, record: &BlockRecord) {}
    fn add_appid(&mut self, appid: &AppId) {}

    /// Start of a block definition; entities up to `end_block` belong to it.
    fn begin_block(&mut self, record: &BlockRecord, block: &Block) {}
    fn end_block(&mut self, record: &BlockRecord, end: &BlockEnd) {}

    fn add_point(&mut self, point: &Point) {}
    fn add_line(&mut self, line: &Line) {}
    fn add_ray(&mut self, ray: &Ray) {}
    fn add_xline(&mut self, xline: &XLine) {}
    fn add_circle(&mut self, circle: &Circle) {}
    fn add_arc(&mut self, arc: &Arc) {}
    fn add_ellipse(&mut self, ellipse: &Ellipse) {}
    fn add_trace(&mut self, trace: &Solid) {}
    fn add_solid(&mut self, solid: &Solid) {}
    fn add_3dface(&mut self, face: &Face3D) {}
    fn add_text(&mut self, text: &Text) {}
    fn add_mtext(&mut self, mtext: &MText) {}
    /// Attributes outside an insert; owned attributes come with the insert.
    fn add_attribute(&mut self, attribute: &Attribute) {}
    fn add_attdef(&mut self, attdef: &AttributeDefinition) {}
    /// Polyline with its vertices and faces.
    fn add_polyline(&mut self, polyline: &Polyline) {}
    fn add_lwpolyline(&mut self, polyline: &LwPolyline) {}
    /// Insert with its owned attributes.
    fn add_insert(&mut self, insert: &Insert) {}
    fn add_hatch(&mut self, hatch: &Hatch) {}
    fn add_spline(&mut self, spline: &Spline) {}
    fn add_leader(&mut self, leader: &Leader) {}
    fn add_viewport(&mut self, viewport: &Viewport) {}
    fn add_image(&mut self, image: &Image) {}

    fn add_dim_ordinate(&mut self, dim: &Dimension) {}
    fn add_dim_linear(&mut self, dim: &Dimension) {}
    fn add_dim_aligned(&mut self, dim: &Dimension) {}
    fn add_dim_angular3p(&mut self, dim: &Dimension) {}
    fn add_dim_angular(&mut self, dim: &Dimension) {}
    fn add_dim_radial(&mut self, dim: &Dimension) {}
    fn add_dim_diametric(&mut self, dim: &Dimension) {}

    /// Image definition referenced by image entities.
    fn link_image(&mut self, definition: &ImageDefinition) {}
}

/// Route one record to its sink method.
///
/// Block and block end records are not routed here: they need their block
/// record and go through `begin_block`/`end_block`. Vertices, faces and
/// seqends are folded into their polyline or insert.
pub fn emit(sink: &mut dyn DwgSink, record: &Record) {
    match record {
        Record::Point(e) => sink.add_point(e),
        Record::Line(e) => sink.add_line(e),
        Record::Ray(e) => sink.add_ray(e),
        Record::XLine(e) => sink.add_xline(e),
        Record::Circle(e) => sink.add_circle(e),
        Record::Arc(e) => sink.add_arc(e),
        Record::Ellipse(e) => sink.add_ellipse(e),
        Record::Solid(e) if e.is_trace => sink.add_trace(e),
        Record::Solid(e) => sink.add_solid(e),
        Record::Face3D(e) => sink.add_3dface(e),
        Record::Text(e) => sink.add_text(e),
        Record::MText(e) => sink.add_mtext(e),
        Record::Attribute(e) => sink.add_attribute(e),
        Record::AttributeDefinition(e) => sink.add_attdef(e),
        Record::Polyline(e) => sink.add_polyline(e),
        Record::LwPolyline(e) => sink.add_lwpolyline(e),
        Record::Insert(e) => sink.add_insert(e),
        Record::Hatch(e) => sink.add_hatch(e),
        Record::Spline(e) => sink.add_spline(e),
        Record::Leader(e) => sink.add_leader(e),
        Record::Viewport(e) => sink.add_viewport(e),
        Record::Image(e) => sink.add_image(e),
        Record::Dimension(d) => match d.kind {
            DimensionKind::Ordinate { .. } => sink.add_dim_ordinate(d),
            DimensionKind::Linear { .. } => sink.add_dim_linear(d),
            DimensionKind::Aligned { .. } => sink.add_dim_aligned(d),
            DimensionKind::Angular3Point { .. } => sink.add_dim_angular3p(d),
            DimensionKind::Angular2Line { .. } => sink.add_dim_angular(d),
            DimensionKind::Radius { .. } => sink.add_dim_radial(d),
            DimensionKind::Diameter { .. } => sink.add_dim_diametric(d),
        },
        Record::TableControl(c) => sink.add_table_control(c),
        Record::Layer(t) => sink.add_layer(t),
        Record::LineType(t) => sink.add_linetype(t),
        Record::TextStyle(t) => sink.add_text_style(t),
        Record::DimStyle(t) => sink.add_dimstyle(t),
        Record::VPort(t) => sink.add_vport(t),
        Record::BlockRecord(t) => sink.add_block_record(t),
        Record::AppId(t) => sink.add_appid(t),
        Record::ImageDefinition(d) => sink.link_image(d),
        Record::Vertex(_)
        | Record::PolyfaceFace(_)
        | Record::Seqend(_)
        | Record::Block(_)
        | Record::BlockEnd(_) => {}
    }
}

/// Entities of one block definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedBlock {
    pub record: Handle,
    pub block: Block,
    pub end: Option<BlockEnd>,
    pub entities: Vec<Record>,
}

/// A sink that keeps every record and resolves handles to names.
#[derive(Debug, Clone, Default)]
pub struct RecordCollector {
    pub info: Option<DwgFileInfo>,
    pub header: Option<HeaderVariables>,
    pub controls: Vec<TableControl>,
    pub layers: Table<Layer>,
    pub linetypes: Table<LineType>,
    pub text_styles: Table<TextStyle>,
    pub dimstyles: Table<DimStyle>,
    pub vports: Table<VPort>,
    pub block_records: Table<BlockRecord>,
    pub appids: Table<AppId>,
    pub blocks: Vec<CollectedBlock>,
    /// Entities decoded outside any block walk.
    pub entities: Vec<Record>,
    pub image_definitions: Vec<ImageDefinition>,
    open_block: Option<usize>,
}

impl RecordCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_entity(&mut self, record: Record) {
        match self.open_block.and_then(|i| self.blocks.get_mut(i)) {
            Some(block) => block.entities.push(record),
            None => self.entities.push(record),
        }
    }

    /// Name of the table entry with `handle`, in any table.
    pub fn name_of(&self, handle: Handle) -> Option<&str> {
        self.layers
            .name_of(handle)
            .or_else(|| self.linetypes.name_of(handle))
            .or_else(|| self.text_styles.name_of(handle))
            .or_else(|| self.dimstyles.name_of(handle))
            .or_else(|| self.block_records.name_of(handle))
            .or_else(|| self.vports.name_of(handle))
            .or_else(|| self.appids.name_of(handle))
    }

    /// Layer name of an entity.
    pub fn layer_name(&self, entity: &dyn Entity) -> Option<&str> {
        self.layers.name_of(entity.layer())
    }

    /// Block by block record handle.
    pub fn block(&self, record: Handle) -> Option<&CollectedBlock> {
        self.blocks.iter().find(|b| b.record == record)
    }

    /// Block by name (case-insensitive).
    pub fn block_by_name(&self, name: &str) -> Option<&CollectedBlock> {
        let record = self.block_records.by_name(name)?;
        self.block(record.entry.handle)
    }

    /// Entities of `*Model_Space`.
    pub fn model_space(&self) -> &[Record] {
        self.block_by_name("*Model_Space")
            .map_or(&[], |b| b.entities.as_slice())
    }

    /// Every entity record, in block order then free entities.
    pub fn all_entities(&self) -> impl Iterator<Item = &Record> {
        self.blocks
            .iter()
            .flat_map(|b| b.entities.iter())
            .chain(self.entities.iter())
    }

    /// Image definition with `handle`.
    pub fn image_definition(&self, handle: Handle) -> Option<&ImageDefinition> {
        self.image_definitions.iter().find(|d| d.handle == handle)
    }
}

impl DwgSink for RecordCollector {
    fn add_file_info(&mut self, info: &DwgFileInfo) {
        self.info = Some(info.clone());
    }

    fn add_header(&mut self, header: &HeaderVariables) {
        self.header = Some(header.clone());
    }

    fn add_table_control(&mut self, control: &TableControl) {
        self.controls.push(control.clone());
    }

    fn add_layer(&mut self, layer: &Layer) {
        self.layers.add(layer.clone());
    }

    fn add_linetype(&mut self, linetype: &LineType) {
        self.linetypes.add(linetype.clone());
    }

    fn add_text_style(&mut self, style: &TextStyle) {
        self.text_styles.add(style.clone());
    }

    fn add_dimstyle(&mut self, style: &DimStyle) {
        self.dimstyles.add(style.clone());
    }

    fn add_vport(&mut self, vport: &VPort) {
        self.vports.add(vport.clone());
    }

    fn add_block_record(&mut self, record: &BlockRecord) {
        self.block_records.add(record.clone());
    }

    fn add_appid(&mut self, appid: &AppId) {
        self.appids.add(appid.clone());
    }

    fn begin_block(&mut self, record: &BlockRecord, block: &Block) {
        self.blocks.push(CollectedBlock {
            record: record.entry.handle,
            block: block.clone(),
            end: None,
            entities: Vec::new(),
        });
        self.open_block = Some(self.blocks.len() - 1);
    }

    fn end_block(&mut self, _record: &BlockRecord, end: &BlockEnd) {
        if let Some(block) = self.open_block.take().and_then(|i| self.blocks.get_mut(i)) {
            block.end = Some(end.clone());
        }
    }

    fn add_point(&mut self, e: &Point) {
        self.push_entity(Record::Point(e.clone()));
    }

    fn add_line(&mut self, e: &Line) {
        self.push_entity(Record::Line(e.clone()));
    }

    fn add_ray(&mut self, e: &Ray) {
        self.push_entity(Record::Ray(e.clone()));
    }

    fn add_xline(&mut self, e: &XLine) {
        self.push_entity(Record::XLine(e.clone()));
    }

    fn add_circle(&mut self, e: &Circle) {
        self.push_entity(Record::Circle(e.clone()));
    }

    fn add_arc(&mut self, e: &Arc) {
        self.push_entity(Record::Arc(e.clone()));
    }

    fn add_ellipse(&mut self, e: &Ellipse) {
        self.push_entity(Record::Ellipse(e.clone()));
    }

    fn add_trace(&mut self, e: &Solid) {
        self.push_entity(Record::Solid(e.clone()));
    }

    fn add_solid(&mut self, e: &Solid) {
        self.push_entity(Record::Solid(e.clone()));
    }

    fn add_3dface(&mut self, e: &Face3D) {
        self.push_entity(Record::Face3D(e.clone()));
    }

    fn add_text(&mut self, e: &Text) {
        self.push_entity(Record::Text(e.clone()));
    }

    fn add_mtext(&mut self, e: &MText) {
        self.push_entity(Record::MText(e.clone()));
    }

    fn add_attribute(&mut self, e: &Attribute) {
        self.push_entity(Record::Attribute(e.clone()));
    }

    fn add_attdef(&mut self, e: &AttributeDefinition) {
        self.push_entity(Record::AttributeDefinition(e.clone()));
    }

    fn add_polyline(&mut self, e: &Polyline) {
        self.push_entity(Record::Polyline(e.clone()));
    }

    fn add_lwpolyline(&mut self, e: &LwPolyline) {
        self.push_entity(Record::LwPolyline(e.clone()));
    }

    fn add_insert(&mut self, e: &Insert) {
        self.push_entity(Record::Insert(e.clone()));
    }

    fn add_hatch(&mut self, e: &Hatch) {
        self.push_entity(Record::Hatch(e.clone()));
    }

    fn add_spline(&mut self, e: &Spline) {
        self.push_entity(Record::Spline(e.clone()));
    }

    fn add_leader(&mut self, e: &Leader) {
        self.push_entity(Record::Leader(e.clone()));
    }

    fn add_viewport(&mut self, e: &Viewport) {
        self.push_entity(Record::Viewport(e.clone()));
    }

    fn add_image(&mut self, e: &Image) {
        self.push_entity(Record::Image(e.clone()));
    }

    fn add_dim_ordinate(&mut self, d: &Dimension) {
        self.push_entity(Record::Dimension(d.clone()));
    }

    fn add_dim_linear(&mut self, d: &Dimension) {
        self.push_entity(Record::Dimension(d.clone()));
    }

    fn add_dim_aligned(&mut self, d: &Dimension) {
        self.push_entity(Record::Dimension(d.clone()));
    }

    fn add_dim_angular3p(&mut self, d: &Dimension) {
        self.push_entity(Record::Dimension(d.clone()));
    }

    fn add_dim_angular(&mut self, d: &Dimension) {
        self.push_entity(Record::Dimension(d.clone()));
    }

    fn add_dim_radial(&mut self, d: &Dimension) {
        self.push_entity(Record::Dimension(d.clone()));
    }

    fn add_dim_diametric(&mut self, d: &Dimension) {
        self.push_entity(Record::Dimension(d.clone()));
    }

    fn link_image(&mut self, definition: &ImageDefinition) {
        self.image_definitions.push(definition.clone());
    }
}
