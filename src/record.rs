//! The closed set of records the decoder produces.

use crate::entities::*;
use crate::objects::ImageDefinition;
use crate::tables::{
    AppId, BlockRecord, DimStyle, Layer, LineType, TableControl, TableEntry, TextStyle, VPort,
};
use crate::types::Handle;

/// Extended entity data attached to a record by one application.
///
/// The payload is kept as stored (group-code tagged items); it is not
/// interpreted by the decoder.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtendedData {
    /// APPID table entry of the owning application.
    pub application: Handle,
    pub data: Vec<u8>,
}

/// One decoded record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Point(Point),
    Line(Line),
    Ray(Ray),
    XLine(XLine),
    Circle(Circle),
    Arc(Arc),
    Ellipse(Ellipse),
    /// Solid or trace
    Solid(Solid),
    Face3D(Face3D),
    Text(Text),
    MText(MText),
    Attribute(Attribute),
    AttributeDefinition(AttributeDefinition),
    Polyline(Polyline),
    Vertex(Vertex),
    PolyfaceFace(PolyfaceFace),
    Seqend(Seqend),
    LwPolyline(LwPolyline),
    Insert(Insert),
    Hatch(Hatch),
    Spline(Spline),
    Dimension(Dimension),
    Leader(Leader),
    Viewport(Viewport),
    Image(Image),
    Block(Block),
    BlockEnd(BlockEnd),

    TableControl(TableControl),
    Layer(Layer),
    LineType(LineType),
    TextStyle(TextStyle),
    DimStyle(DimStyle),
    VPort(VPort),
    BlockRecord(BlockRecord),
    AppId(AppId),

    ImageDefinition(ImageDefinition),
}

impl Record {
    /// The record as an entity, when it is one.
    pub fn as_entity(&self) -> Option<&dyn Entity> {
        let entity: &dyn Entity = match self {
            Record::Point(e) => e,
            Record::Line(e) => e,
            Record::Ray(e) => e,
            Record::XLine(e) => e,
            Record::Circle(e) => e,
            Record::Arc(e) => e,
            Record::Ellipse(e) => e,
            Record::Solid(e) => e,
            Record::Face3D(e) => e,
            Record::Text(e) => e,
            Record::MText(e) => e,
            Record::Attribute(e) => e,
            Record::AttributeDefinition(e) => e,
            Record::Polyline(e) => e,
            Record::Vertex(e) => e,
            Record::PolyfaceFace(e) => e,
            Record::Seqend(e) => e,
            Record::LwPolyline(e) => e,
            Record::Insert(e) => e,
            Record::Hatch(e) => e,
            Record::Spline(e) => e,
            Record::Dimension(e) => e,
            Record::Leader(e) => e,
            Record::Viewport(e) => e,
            Record::Image(e) => e,
            Record::Block(e) => e,
            Record::BlockEnd(e) => e,
            _ => return None,
        };
        Some(entity)
    }

    pub fn as_entity_mut(&mut self) -> Option<&mut dyn Entity> {
        let entity: &mut dyn Entity = match self {
            Record::Point(e) => e,
            Record::Line(e) => e,
            Record::Ray(e) => e,
            Record::XLine(e) => e,
            Record::Circle(e) => e,
            Record::Arc(e) => e,
            Record::Ellipse(e) => e,
            Record::Solid(e) => e,
            Record::Face3D(e) => e,
            Record::Text(e) => e,
            Record::MText(e) => e,
            Record::Attribute(e) => e,
            Record::AttributeDefinition(e) => e,
            Record::Polyline(e) => e,
            Record::Vertex(e) => e,
            Record::PolyfaceFace(e) => e,
            Record::Seqend(e) => e,
            Record::LwPolyline(e) => e,
            Record::Insert(e) => e,
            Record::Hatch(e) => e,
            Record::Spline(e) => e,
            Record::Dimension(e) => e,
            Record::Leader(e) => e,
            Record::Viewport(e) => e,
            Record::Image(e) => e,
            Record::Block(e) => e,
            Record::BlockEnd(e) => e,
            _ => return None,
        };
        Some(entity)
    }

    /// The record as a table entry, when it is one.
    pub fn as_table_entry(&self) -> Option<&dyn TableEntry> {
        let entry: &dyn TableEntry = match self {
            Record::Layer(e) => e,
            Record::LineType(e) => e,
            Record::TextStyle(e) => e,
            Record::DimStyle(e) => e,
            Record::VPort(e) => e,
            Record::BlockRecord(e) => e,
            Record::AppId(e) => e,
            _ => return None,
        };
        Some(entry)
    }

    pub fn is_entity(&self) -> bool {
        self.as_entity().is_some()
    }

    pub fn handle(&self) -> Handle {
        if let Some(e) = self.as_entity() {
            return e.handle();
        }
        if let Some(t) = self.as_table_entry() {
            return t.handle();
        }
        match self {
            Record::TableControl(c) => c.handle,
            Record::ImageDefinition(d) => d.handle,
            _ => Handle::NULL,
        }
    }

    /// DXF name of the record (`LINE`, `LAYER`, `IMAGEDEF`, ...).
    pub fn type_name(&self) -> &'static str {
        if let Some(e) = self.as_entity() {
            return e.entity_type();
        }
        if let Some(t) = self.as_table_entry() {
            return t.table_name();
        }
        match self {
            Record::TableControl(_) => "TABLE",
            Record::ImageDefinition(_) => "IMAGEDEF",
            _ => "",
        }
    }
}
