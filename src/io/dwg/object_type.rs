//! DWG object type codes.
//!
//! Codes below 500 are fixed by the format. Codes from 500 up are assigned
//! per file by the classes section and translated through the class table
//! to one of the codes here (see [`ObjectType::from_class_name`]).

/// Built-in object type codes.
///
/// `Image` and `ImageDef` have no fixed code in the format; they are the
/// codes class entries named `IMAGE` / `IMAGEDEF` translate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ObjectType {
    Undefined = 0,
    Text = 1,
    Attrib = 2,
    Attdef = 3,
    Block = 4,
    Endblk = 5,
    Seqend = 6,
    Insert = 7,
    Minsert = 8,
    Vertex2D = 0x0A,
    Vertex3D = 0x0B,
    VertexMesh = 0x0C,
    VertexPface = 0x0D,
    VertexPfaceFace = 0x0E,
    Polyline2D = 0x0F,
    Polyline3D = 0x10,
    Arc = 0x11,
    Circle = 0x12,
    Line = 0x13,
    DimensionOrdinate = 0x14,
    DimensionLinear = 0x15,
    DimensionAligned = 0x16,
    DimensionAng3Pt = 0x17,
    DimensionAng2Ln = 0x18,
    DimensionRadius = 0x19,
    DimensionDiameter = 0x1A,
    Point = 0x1B,
    Face3D = 0x1C,
    PolylinePface = 0x1D,
    PolylineMesh = 0x1E,
    Solid = 0x1F,
    Trace = 0x20,
    Shape = 0x21,
    Viewport = 0x22,
    Ellipse = 0x23,
    Spline = 0x24,
    Region = 0x25,
    Solid3D = 0x26,
    Body = 0x27,
    Ray = 0x28,
    Xline = 0x29,
    Dictionary = 0x2A,
    Mtext = 0x2C,
    Leader = 0x2D,
    Tolerance = 0x2E,
    Mline = 0x2F,
    BlockControlObj = 0x30,
    BlockHeader = 0x31,
    LayerControlObj = 0x32,
    Layer = 0x33,
    StyleControlObj = 0x34,
    Style = 0x35,
    LtypeControlObj = 0x38,
    Ltype = 0x39,
    ViewControlObj = 0x3C,
    View = 0x3D,
    UcsControlObj = 0x3E,
    Ucs = 0x3F,
    VportControlObj = 0x40,
    Vport = 0x41,
    AppidControlObj = 0x42,
    Appid = 0x43,
    DimstyleControlObj = 0x44,
    Dimstyle = 0x45,
    VpEntHdrCtrlObj = 0x46,
    VpEntHdr = 0x47,
    Group = 0x48,
    MlineStyle = 0x49,
    Ole2Frame = 0x4A,
    LwPolyline = 0x4D,
    Hatch = 0x4E,
    XRecord = 0x4F,
    Layout = 0x52,
    Image = 0x65,
    ImageDef = 0x66,
    AcadProxyEntity = 0x1F2,
    AcadProxyObject = 0x1F3,
}

impl ObjectType {
    /// First type code assigned through the classes section.
    pub const FIRST_CLASS_CODE: u16 = 500;

    /// Map a raw type code. Returns `None` for codes with no built-in meaning.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Undefined),
            1 => Some(Self::Text),
            2 => Some(Self::Attrib),
            3 => Some(Self::Attdef),
            4 => Some(Self::Block),
            5 => Some(Self::Endblk),
            6 => Some(Self::Seqend),
            7 => Some(Self::Insert),
            8 => Some(Self::Minsert),
            0x0A => Some(Self::Vertex2D),
            0x0B => Some(Self::Vertex3D),
            0x0C => Some(Self::VertexMesh),
            0x0D => Some(Self::VertexPface),
            0x0E => Some(Self::VertexPfaceFace),
            0x0F => Some(Self::Polyline2D),
            0x10 => Some(Self::Polyline3D),
            0x11 => Some(Self::Arc),
            0x12 => Some(Self::Circle),
            0x13 => Some(Self::Line),
            0x14 => Some(Self::DimensionOrdinate),
            0x15 => Some(Self::DimensionLinear),
            0x16 => Some(Self::DimensionAligned),
            0x17 => Some(Self::DimensionAng3Pt),
            0x18 => Some(Self::DimensionAng2Ln),
            0x19 => Some(Self::DimensionRadius),
            0x1A => Some(Self::DimensionDiameter),
            0x1B => Some(Self::Point),
            0x1C => Some(Self::Face3D),
            0x1D => Some(Self::PolylinePface),
            0x1E => Some(Self::PolylineMesh),
            0x1F => Some(Self::Solid),
            0x20 => Some(Self::Trace),
            0x21 => Some(Self::Shape),
            0x22 => Some(Self::Viewport),
            0x23 => Some(Self::Ellipse),
            0x24 => Some(Self::Spline),
            0x25 => Some(Self::Region),
            0x26 => Some(Self::Solid3D),
            0x27 => Some(Self::Body),
            0x28 => Some(Self::Ray),
            0x29 => Some(Self::Xline),
            0x2A => Some(Self::Dictionary),
            0x2C => Some(Self::Mtext),
            0x2D => Some(Self::Leader),
            0x2E => Some(Self::Tolerance),
            0x2F => Some(Self::Mline),
            0x30 => Some(Self::BlockControlObj),
            0x31 => Some(Self::BlockHeader),
            0x32 => Some(Self::LayerControlObj),
            0x33 => Some(Self::Layer),
            0x34 => Some(Self::StyleControlObj),
            0x35 => Some(Self::Style),
            0x38 => Some(Self::LtypeControlObj),
            0x39 => Some(Self::Ltype),
            0x3C => Some(Self::ViewControlObj),
            0x3D => Some(Self::View),
            0x3E => Some(Self::UcsControlObj),
            0x3F => Some(Self::Ucs),
            0x40 => Some(Self::VportControlObj),
            0x41 => Some(Self::Vport),
            0x42 => Some(Self::AppidControlObj),
            0x43 => Some(Self::Appid),
            0x44 => Some(Self::DimstyleControlObj),
            0x45 => Some(Self::Dimstyle),
            0x46 => Some(Self::VpEntHdrCtrlObj),
            0x47 => Some(Self::VpEntHdr),
            0x48 => Some(Self::Group),
            0x49 => Some(Self::MlineStyle),
            0x4A => Some(Self::Ole2Frame),
            0x4D => Some(Self::LwPolyline),
            0x4E => Some(Self::Hatch),
            0x4F => Some(Self::XRecord),
            0x52 => Some(Self::Layout),
            0x65 => Some(Self::Image),
            0x66 => Some(Self::ImageDef),
            0x1F2 => Some(Self::AcadProxyEntity),
            0x1F3 => Some(Self::AcadProxyObject),
            _ => None,
        }
    }

    /// Built-in type a class record name stands for.
    pub fn from_class_name(name: &str) -> Option<Self> {
        match name {
            "LWPLINE" | "LWPOLYLINE" => Some(Self::LwPolyline),
            "HATCH" => Some(Self::Hatch),
            "GROUP" => Some(Self::Group),
            "LAYOUT" => Some(Self::Layout),
            "IMAGE" => Some(Self::Image),
            "IMAGEDEF" => Some(Self::ImageDef),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Table control objects: a handle list of one table's entries.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Self::BlockControlObj
                | Self::LayerControlObj
                | Self::StyleControlObj
                | Self::LtypeControlObj
                | Self::ViewControlObj
                | Self::UcsControlObj
                | Self::VportControlObj
                | Self::AppidControlObj
                | Self::DimstyleControlObj
                | Self::VpEntHdrCtrlObj
        )
    }

    /// Graphical types; these carry common entity data.
    pub fn is_entity(self) -> bool {
        let code = self.code();
        ((0x01..=0x2F).contains(&code) && code != 0x2A)
            || matches!(
                self,
                Self::LwPolyline
                    | Self::Hatch
                    | Self::Ole2Frame
                    | Self::Image
                    | Self::AcadProxyEntity
            )
    }
}
