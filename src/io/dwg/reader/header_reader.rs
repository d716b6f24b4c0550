//! DWG Header section reader.
//!
//! Reads the system variables of the `AcDb:Header` section. The variables
//! are stored back to back with no tags, in an order that changes between
//! releases, so the order is described once by [`HEADER_LAYOUT`] and the
//! reader walks that table.
//!
//! ```text
//! SN   start sentinel
//! RL   size of the variable data in bytes
//! RL   (R2010+ with maintenance > 3, R2018+) unknown
//! RL   (R2007+) size of the variable data in bits
//! ...  variables; strings and handles in their own streams for R2007+
//! RS   CRC-8 (seed 0xC0C1) of everything after the start sentinel
//! SN   end sentinel
//! ```

use tracing::debug;

use crate::error::Result;
use crate::header::{HeaderValue, HeaderVariables};
use crate::io::dwg::constants::{handle_section, sentinels};
use crate::io::dwg::crc::crc8;
use crate::io::dwg::layout::VersionLayout;
use crate::notification::NotificationCollection;

use super::bit_reader::{encoding_from_code_page, DwgBitReader};
use super::merged_reader::DwgMergedReader;

/// Wire type of a header variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// B
    Bit,
    /// BS
    BitShort,
    /// BL
    BitLong,
    /// BLL
    BitLongLong,
    /// BD
    BitDouble,
    /// RC
    RawChar,
    /// TV
    Text,
    /// H, from the handle stream
    Handle,
    /// H, always from the data stream
    HandleSeed,
    /// 3BD
    Point3,
    /// 2RD
    RawPoint2,
    /// CMC
    CmColor,
    /// BL Julian day, BL milliseconds
    Date,
    /// BL days, BL milliseconds
    Duration,
}

/// Releases (or conditions) a variable is stored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Always,
    R13To14,
    R13To15,
    R2000Plus,
    R2004Plus,
    R2007Plus,
    R2010Plus,
    R2013Plus,
    /// Only when `CEPSNTYPE` is 3 (plot style by object handle).
    PlotStyleByHandle,
}

impl Presence {
    pub fn applies(&self, layout: &VersionLayout, values: &HeaderVariables) -> bool {
        match self {
            Presence::Always => true,
            Presence::R13To14 => layout.r13_14_only,
            Presence::R13To15 => layout.r13_15_only,
            Presence::R2000Plus => layout.r2000_plus,
            Presence::R2004Plus => layout.r2004_plus,
            Presence::R2007Plus => layout.r2007_plus,
            Presence::R2010Plus => layout.r2010_plus,
            Presence::R2013Plus => layout.r2013_plus,
            Presence::PlotStyleByHandle => values.int("CEPSNTYPE") == Some(3),
        }
    }
}

/// One entry of the header layout. Unnamed entries are read and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderField {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

const fn f(name: &'static str, kind: FieldKind, presence: Presence) -> HeaderField {
    HeaderField {
        name,
        kind,
        presence,
    }
}

use FieldKind::*;
use Presence::*;

/// Header variables in file order.
pub static HEADER_LAYOUT: &[HeaderField] = &[
    f("REQUIREDVERSIONS", BitLongLong, R2013Plus),
    f("", BitDouble, Always),
    f("", BitDouble, Always),
    f("", BitDouble, Always),
    f("", BitDouble, Always),
    f("", Text, Always),
    f("", Text, Always),
    f("", Text, Always),
    f("", Text, Always),
    f("", BitLong, Always),
    f("", BitLong, Always),
    f("", BitShort, R13To14),
    // current viewport entity header
    f("", Handle, R13To15),
    f("DIMASO", Bit, Always),
    f("DIMSHO", Bit, Always),
    f("DIMSAV", Bit, R13To14),
    f("PLINEGEN", Bit, Always),
    f("ORTHOMODE", Bit, Always),
    f("REGENMODE", Bit, Always),
    f("FILLMODE", Bit, Always),
    f("QTEXTMODE", Bit, Always),
    f("PSLTSCALE", Bit, Always),
    f("LIMCHECK", Bit, Always),
    f("BLIPMODE", Bit, R13To14),
    f("", Bit, R2004Plus),
    f("USRTIMER", Bit, Always),
    f("SKPOLY", Bit, Always),
    f("ANGDIR", Bit, Always),
    f("SPLFRAME", Bit, Always),
    f("ATTREQ", Bit, R13To14),
    f("ATTDIA", Bit, R13To14),
    f("MIRRTEXT", Bit, Always),
    f("WORLDVIEW", Bit, Always),
    f("WIREFRAME", Bit, R13To14),
    f("TILEMODE", Bit, Always),
    f("PLIMCHECK", Bit, Always),
    f("VISRETAIN", Bit, Always),
    f("DELOBJ", Bit, R13To14),
    f("DISPSILH", Bit, Always),
    f("PELLIPSE", Bit, Always),
    f("PROXYGRAPHICS", BitShort, Always),
    f("DRAGMODE", BitShort, R13To14),
    f("TREEDEPTH", BitShort, Always),
    f("LUNITS", BitShort, Always),
    f("LUPREC", BitShort, Always),
    f("AUNITS", BitShort, Always),
    f("AUPREC", BitShort, Always),
    f("OSMODE", BitShort, R13To14),
    f("ATTMODE", BitShort, Always),
    f("COORDS", BitShort, R13To14),
    f("PDMODE", BitShort, Always),
    f("PICKSTYLE", BitShort, R13To14),
    f("", BitLong, R2004Plus),
    f("", BitLong, R2004Plus),
    f("", BitLong, R2004Plus),
    f("USERI1", BitShort, Always),
    f("USERI2", BitShort, Always),
    f("USERI3", BitShort, Always),
    f("USERI4", BitShort, Always),
    f("USERI5", BitShort, Always),
    f("SPLINESEGS", BitShort, Always),
    f("SURFU", BitShort, Always),
    f("SURFV", BitShort, Always),
    f("SURFTYPE", BitShort, Always),
    f("SURFTAB1", BitShort, Always),
    f("SURFTAB2", BitShort, Always),
    f("SPLINETYPE", BitShort, Always),
    f("SHADEDGE", BitShort, Always),
    f("SHADEDIF", BitShort, Always),
    f("UNITMODE", BitShort, Always),
    f("MAXACTVP", BitShort, Always),
    f("ISOLINES", BitShort, Always),
    f("CMLJUST", BitShort, Always),
    f("TEXTQLTY", BitShort, Always),
    f("LTSCALE", BitDouble, Always),
    f("TEXTSIZE", BitDouble, Always),
    f("TRACEWID", BitDouble, Always),
    f("SKETCHINC", BitDouble, Always),
    f("FILLETRAD", BitDouble, Always),
    f("THICKNESS", BitDouble, Always),
    f("ANGBASE", BitDouble, Always),
    f("PDSIZE", BitDouble, Always),
    f("PLINEWID", BitDouble, Always),
    f("USERR1", BitDouble, Always),
    f("USERR2", BitDouble, Always),
    f("USERR3", BitDouble, Always),
    f("USERR4", BitDouble, Always),
    f("USERR5", BitDouble, Always),
    f("CHAMFERA", BitDouble, Always),
    f("CHAMFERB", BitDouble, Always),
    f("CHAMFERC", BitDouble, Always),
    f("CHAMFERD", BitDouble, Always),
    f("FACETRES", BitDouble, Always),
    f("CMLSCALE", BitDouble, Always),
    f("CELTSCALE", BitDouble, Always),
    f("MENU", Text, Always),
    f("TDCREATE", Date, Always),
    f("TDUPDATE", Date, Always),
    f("", BitLong, R2004Plus),
    f("", BitLong, R2004Plus),
    f("", BitLong, R2004Plus),
    f("TDINDWG", Duration, Always),
    f("TDUSRTIMER", Duration, Always),
    f("CECOLOR", CmColor, Always),
    f("HANDSEED", HandleSeed, Always),
    f("CLAYER", Handle, Always),
    f("TEXTSTYLE", Handle, Always),
    f("CELTYPE", Handle, Always),
    f("CMATERIAL", Handle, R2007Plus),
    f("DIMSTYLE", Handle, Always),
    f("CMLSTYLE", Handle, Always),
    f("PSVPSCALE", BitDouble, R2000Plus),
    f("PINSBASE", Point3, Always),
    f("PEXTMIN", Point3, Always),
    f("PEXTMAX", Point3, Always),
    f("PLIMMIN", RawPoint2, Always),
    f("PLIMMAX", RawPoint2, Always),
    f("PELEVATION", BitDouble, Always),
    f("PUCSORG", Point3, Always),
    f("PUCSXDIR", Point3, Always),
    f("PUCSYDIR", Point3, Always),
    f("PUCSNAME", Handle, Always),
    f("PUCSORTHOREF", Handle, R2000Plus),
    f("PUCSORTHOVIEW", BitShort, R2000Plus),
    f("PUCSBASE", Handle, R2000Plus),
    f("PUCSORGTOP", Point3, R2000Plus),
    f("PUCSORGBOTTOM", Point3, R2000Plus),
    f("PUCSORGLEFT", Point3, R2000Plus),
    f("PUCSORGRIGHT", Point3, R2000Plus),
    f("PUCSORGFRONT", Point3, R2000Plus),
    f("PUCSORGBACK", Point3, R2000Plus),
    f("INSBASE", Point3, Always),
    f("EXTMIN", Point3, Always),
    f("EXTMAX", Point3, Always),
    f("LIMMIN", RawPoint2, Always),
    f("LIMMAX", RawPoint2, Always),
    f("ELEVATION", BitDouble, Always),
    f("UCSORG", Point3, Always),
    f("UCSXDIR", Point3, Always),
    f("UCSYDIR", Point3, Always),
    f("UCSNAME", Handle, Always),
    f("UCSORTHOREF", Handle, R2000Plus),
    f("UCSORTHOVIEW", BitShort, R2000Plus),
    f("UCSBASE", Handle, R2000Plus),
    f("UCSORGTOP", Point3, R2000Plus),
    f("UCSORGBOTTOM", Point3, R2000Plus),
    f("UCSORGLEFT", Point3, R2000Plus),
    f("UCSORGRIGHT", Point3, R2000Plus),
    f("UCSORGFRONT", Point3, R2000Plus),
    f("UCSORGBACK", Point3, R2000Plus),
    f("DIMPOST", Text, R2000Plus),
    f("DIMAPOST", Text, R2000Plus),
    f("DIMTOL", Bit, R13To14),
    f("DIMLIM", Bit, R13To14),
    f("DIMTIH", Bit, R13To14),
    f("DIMTOH", Bit, R13To14),
    f("DIMSE1", Bit, R13To14),
    f("DIMSE2", Bit, R13To14),
    f("DIMALT", Bit, R13To14),
    f("DIMTOFL", Bit, R13To14),
    f("DIMSAH", Bit, R13To14),
    f("DIMTIX", Bit, R13To14),
    f("DIMSOXD", Bit, R13To14),
    f("DIMALTD", RawChar, R13To14),
    f("DIMZIN", RawChar, R13To14),
    f("DIMSD1", Bit, R13To14),
    f("DIMSD2", Bit, R13To14),
    f("DIMTOLJ", RawChar, R13To14),
    f("DIMJUST", RawChar, R13To14),
    f("DIMFIT", RawChar, R13To14),
    f("DIMUPT", Bit, R13To14),
    f("DIMTZIN", RawChar, R13To14),
    f("DIMALTZ", RawChar, R13To14),
    f("DIMALTTZ", RawChar, R13To14),
    f("DIMTAD", RawChar, R13To14),
    f("DIMUNIT", BitShort, R13To14),
    f("DIMAUNIT", BitShort, R13To14),
    f("DIMDEC", BitShort, R13To14),
    f("DIMTDEC", BitShort, R13To14),
    f("DIMALTU", BitShort, R13To14),
    f("DIMALTTD", BitShort, R13To14),
    f("DIMTXSTY", Handle, R13To14),
    f("DIMSCALE", BitDouble, Always),
    f("DIMASZ", BitDouble, Always),
    f("DIMEXO", BitDouble, Always),
    f("DIMDLI", BitDouble, Always),
    f("DIMEXE", BitDouble, Always),
    f("DIMRND", BitDouble, Always),
    f("DIMDLE", BitDouble, Always),
    f("DIMTP", BitDouble, Always),
    f("DIMTM", BitDouble, Always),
    f("DIMFXL", BitDouble, R2007Plus),
    f("DIMJOGANG", BitDouble, R2007Plus),
    f("DIMTFILL", BitShort, R2007Plus),
    f("DIMTFILLCLR", CmColor, R2007Plus),
    f("DIMTOL", Bit, R2000Plus),
    f("DIMLIM", Bit, R2000Plus),
    f("DIMTIH", Bit, R2000Plus),
    f("DIMTOH", Bit, R2000Plus),
    f("DIMSE1", Bit, R2000Plus),
    f("DIMSE2", Bit, R2000Plus),
    f("DIMTAD", BitShort, R2000Plus),
    f("DIMZIN", BitShort, R2000Plus),
    f("DIMAZIN", BitShort, R2000Plus),
    f("DIMARCSYM", BitShort, R2007Plus),
    f("DIMTXT", BitDouble, Always),
    f("DIMCEN", BitDouble, Always),
    f("DIMTSZ", BitDouble, Always),
    f("DIMALTF", BitDouble, Always),
    f("DIMLFAC", BitDouble, Always),
    f("DIMTVP", BitDouble, Always),
    f("DIMTFAC", BitDouble, Always),
    f("DIMGAP", BitDouble, Always),
    f("DIMPOST", Text, R13To14),
    f("DIMAPOST", Text, R13To14),
    f("DIMBLK", Text, R13To14),
    f("DIMBLK1", Text, R13To14),
    f("DIMBLK2", Text, R13To14),
    f("DIMALTRND", BitDouble, R2000Plus),
    f("DIMALT", Bit, R2000Plus),
    f("DIMALTD", BitShort, R2000Plus),
    f("DIMTOFL", Bit, R2000Plus),
    f("DIMSAH", Bit, R2000Plus),
    f("DIMTIX", Bit, R2000Plus),
    f("DIMSOXD", Bit, R2000Plus),
    f("DIMCLRD", CmColor, Always),
    f("DIMCLRE", CmColor, Always),
    f("DIMCLRT", CmColor, Always),
    f("DIMADEC", BitShort, R2000Plus),
    f("DIMDEC", BitShort, R2000Plus),
    f("DIMTDEC", BitShort, R2000Plus),
    f("DIMALTU", BitShort, R2000Plus),
    f("DIMALTTD", BitShort, R2000Plus),
    f("DIMAUNIT", BitShort, R2000Plus),
    f("DIMFRAC", BitShort, R2000Plus),
    f("DIMLUNIT", BitShort, R2000Plus),
    f("DIMDSEP", BitShort, R2000Plus),
    f("DIMTMOVE", BitShort, R2000Plus),
    f("DIMJUST", BitShort, R2000Plus),
    f("DIMSD1", Bit, R2000Plus),
    f("DIMSD2", Bit, R2000Plus),
    f("DIMTOLJ", BitShort, R2000Plus),
    f("DIMTZIN", BitShort, R2000Plus),
    f("DIMALTZ", BitShort, R2000Plus),
    f("DIMALTTZ", BitShort, R2000Plus),
    f("DIMUPT", Bit, R2000Plus),
    f("DIMATFIT", BitShort, R2000Plus),
    f("DIMFXLON", Bit, R2007Plus),
    f("DIMTXTDIRECTION", Bit, R2010Plus),
    f("DIMALTMZF", BitDouble, R2010Plus),
    f("DIMALTMZS", Text, R2010Plus),
    f("DIMMZF", BitDouble, R2010Plus),
    f("DIMMZS", Text, R2010Plus),
    f("DIMTXSTY", Handle, R2000Plus),
    f("DIMLDRBLK", Handle, R2000Plus),
    f("DIMBLK", Handle, R2000Plus),
    f("DIMBLK1", Handle, R2000Plus),
    f("DIMBLK2", Handle, R2000Plus),
    f("DIMLTYPE", Handle, R2007Plus),
    f("DIMLTEX1", Handle, R2007Plus),
    f("DIMLTEX2", Handle, R2007Plus),
    f("DIMLWD", BitShort, R2000Plus),
    f("DIMLWE", BitShort, R2000Plus),
    f("BLOCK_CONTROL_OBJECT", Handle, Always),
    f("LAYER_CONTROL_OBJECT", Handle, Always),
    f("STYLE_CONTROL_OBJECT", Handle, Always),
    f("LINETYPE_CONTROL_OBJECT", Handle, Always),
    f("VIEW_CONTROL_OBJECT", Handle, Always),
    f("UCS_CONTROL_OBJECT", Handle, Always),
    f("VPORT_CONTROL_OBJECT", Handle, Always),
    f("APPID_CONTROL_OBJECT", Handle, Always),
    f("DIMSTYLE_CONTROL_OBJECT", Handle, Always),
    f("VPENTHDR_CONTROL_OBJECT", Handle, R13To15),
    f("DICTIONARY_ACAD_GROUP", Handle, Always),
    f("DICTIONARY_ACAD_MLINESTYLE", Handle, Always),
    f("DICTIONARY_NAMED_OBJECTS", Handle, Always),
    f("TSTACKALIGN", BitShort, R2000Plus),
    f("TSTACKSIZE", BitShort, R2000Plus),
    f("HYPERLINKBASE", Text, R2000Plus),
    f("STYLESHEET", Text, R2000Plus),
    f("DICTIONARY_LAYOUTS", Handle, R2000Plus),
    f("DICTIONARY_PLOTSETTINGS", Handle, R2000Plus),
    f("DICTIONARY_PLOTSTYLES", Handle, R2000Plus),
    f("DICTIONARY_MATERIALS", Handle, R2004Plus),
    f("DICTIONARY_COLORS", Handle, R2004Plus),
    f("DICTIONARY_VISUALSTYLE", Handle, R2007Plus),
    f("", Handle, R2013Plus),
    // CELWEIGHT, ENDCAPS, JOINSTYLE, LWDISPLAY, XEDIT, EXTNAMES,
    // PSTYLEMODE and OLESTARTUP packed into one word
    f("FLAGS", BitLong, R2000Plus),
    f("INSUNITS", BitShort, R2000Plus),
    f("CEPSNTYPE", BitShort, R2000Plus),
    f("CPSNID", Handle, PlotStyleByHandle),
    f("FINGERPRINTGUID", Text, R2000Plus),
    f("VERSIONGUID", Text, R2000Plus),
    f("SORTENTS", RawChar, R2004Plus),
    f("INDEXCTL", RawChar, R2004Plus),
    f("HIDETEXT", RawChar, R2004Plus),
    f("XCLIPFRAME", RawChar, R2004Plus),
    f("DIMASSOC", RawChar, R2004Plus),
    f("HALOGAP", RawChar, R2004Plus),
    f("OBSCUREDCOLOR", BitShort, R2004Plus),
    f("INTERSECTIONCOLOR", BitShort, R2004Plus),
    f("OBSCUREDLTYPE", RawChar, R2004Plus),
    f("INTERSECTIONDISPLAY", RawChar, R2004Plus),
    f("PROJECTNAME", Text, R2004Plus),
    f("BLOCK_RECORD_PSPACE", Handle, Always),
    f("BLOCK_RECORD_MSPACE", Handle, Always),
    f("LTYPE_BYLAYER", Handle, Always),
    f("LTYPE_BYBLOCK", Handle, Always),
    f("LTYPE_CONTINUOUS", Handle, Always),
    f("CAMERADISPLAY", Bit, R2007Plus),
    f("", BitLong, R2007Plus),
    f("", BitLong, R2007Plus),
    f("", BitDouble, R2007Plus),
    f("STEPSPERSEC", BitDouble, R2007Plus),
    f("STEPSIZE", BitDouble, R2007Plus),
    f("3DDWFPREC", BitDouble, R2007Plus),
    f("LENSLENGTH", BitDouble, R2007Plus),
    f("CAMERAHEIGHT", BitDouble, R2007Plus),
    f("SOLIDHIST", RawChar, R2007Plus),
    f("SHOWHIST", RawChar, R2007Plus),
    f("PSOLWIDTH", BitDouble, R2007Plus),
    f("PSOLHEIGHT", BitDouble, R2007Plus),
    f("LOFTANG1", BitDouble, R2007Plus),
    f("LOFTANG2", BitDouble, R2007Plus),
    f("LOFTMAG1", BitDouble, R2007Plus),
    f("LOFTMAG2", BitDouble, R2007Plus),
    f("LOFTPARAM", BitShort, R2007Plus),
    f("LOFTNORMALS", RawChar, R2007Plus),
    f("LATITUDE", BitDouble, R2007Plus),
    f("LONGITUDE", BitDouble, R2007Plus),
    f("NORTHDIRECTION", BitDouble, R2007Plus),
    f("TIMEZONE", BitLong, R2007Plus),
    f("LIGHTGLYPHDISPLAY", RawChar, R2007Plus),
    f("TILEMODELIGHTSYNCH", RawChar, R2007Plus),
    f("DWFFRAME", RawChar, R2007Plus),
    f("DGNFRAME", RawChar, R2007Plus),
    f("", Bit, R2007Plus),
    f("INTERFERECOLOR", CmColor, R2007Plus),
    f("INTERFEREOBJVS", Handle, R2007Plus),
    f("INTERFEREVPVS", Handle, R2007Plus),
    f("DRAGVS", Handle, R2007Plus),
    f("CSHADOW", RawChar, R2007Plus),
    f("SHADOWPLANELOCATION", BitDouble, R2007Plus),
];

/// Variables of a DIMSTYLE table entry, after its name and xref bits.
///
/// R13-R14 and R2000+ store the same variables in two unrelated orders.
/// Colors are BS before R2004 and CMC after, which `CmColor` covers.
pub static DIMSTYLE_LAYOUT: &[HeaderField] = &[
    f("DIMTOL", Bit, R13To14),
    f("DIMLIM", Bit, R13To14),
    f("DIMTIH", Bit, R13To14),
    f("DIMTOH", Bit, R13To14),
    f("DIMSE1", Bit, R13To14),
    f("DIMSE2", Bit, R13To14),
    f("DIMALT", Bit, R13To14),
    f("DIMTOFL", Bit, R13To14),
    f("DIMSAH", Bit, R13To14),
    f("DIMTIX", Bit, R13To14),
    f("DIMSOXD", Bit, R13To14),
    f("DIMALTD", RawChar, R13To14),
    f("DIMZIN", RawChar, R13To14),
    f("DIMSD1", Bit, R13To14),
    f("DIMSD2", Bit, R13To14),
    f("DIMTOLJ", RawChar, R13To14),
    f("DIMJUST", RawChar, R13To14),
    f("DIMFIT", RawChar, R13To14),
    f("DIMUPT", Bit, R13To14),
    f("DIMTZIN", RawChar, R13To14),
    f("DIMALTZ", RawChar, R13To14),
    f("DIMALTTZ", RawChar, R13To14),
    f("DIMTAD", RawChar, R13To14),
    f("DIMUNIT", BitShort, R13To14),
    f("DIMAUNIT", BitShort, R13To14),
    f("DIMDEC", BitShort, R13To14),
    f("DIMTDEC", BitShort, R13To14),
    f("DIMALTU", BitShort, R13To14),
    f("DIMALTTD", BitShort, R13To14),
    f("DIMSCALE", BitDouble, R13To14),
    f("DIMASZ", BitDouble, R13To14),
    f("DIMEXO", BitDouble, R13To14),
    f("DIMDLI", BitDouble, R13To14),
    f("DIMEXE", BitDouble, R13To14),
    f("DIMRND", BitDouble, R13To14),
    f("DIMDLE", BitDouble, R13To14),
    f("DIMTP", BitDouble, R13To14),
    f("DIMTM", BitDouble, R13To14),
    f("DIMTXT", BitDouble, R13To14),
    f("DIMCEN", BitDouble, R13To14),
    f("DIMTSZ", BitDouble, R13To14),
    f("DIMALTF", BitDouble, R13To14),
    f("DIMLFAC", BitDouble, R13To14),
    f("DIMTVP", BitDouble, R13To14),
    f("DIMTFAC", BitDouble, R13To14),
    f("DIMGAP", BitDouble, R13To14),
    f("DIMPOST", Text, R13To14),
    f("DIMAPOST", Text, R13To14),
    f("DIMBLK", Text, R13To14),
    f("DIMBLK1", Text, R13To14),
    f("DIMBLK2", Text, R13To14),
    f("DIMCLRD", CmColor, R13To14),
    f("DIMCLRE", CmColor, R13To14),
    f("DIMCLRT", CmColor, R13To14),
    f("DIMPOST", Text, R2000Plus),
    f("DIMAPOST", Text, R2000Plus),
    f("DIMSCALE", BitDouble, R2000Plus),
    f("DIMASZ", BitDouble, R2000Plus),
    f("DIMEXO", BitDouble, R2000Plus),
    f("DIMDLI", BitDouble, R2000Plus),
    f("DIMEXE", BitDouble, R2000Plus),
    f("DIMRND", BitDouble, R2000Plus),
    f("DIMDLE", BitDouble, R2000Plus),
    f("DIMTP", BitDouble, R2000Plus),
    f("DIMTM", BitDouble, R2000Plus),
    f("DIMFXL", BitDouble, R2007Plus),
    f("DIMJOGANG", BitDouble, R2007Plus),
    f("DIMTFILL", BitShort, R2007Plus),
    f("DIMTFILLCLR", CmColor, R2007Plus),
    f("DIMTOL", Bit, R2000Plus),
    f("DIMLIM", Bit, R2000Plus),
    f("DIMTIH", Bit, R2000Plus),
    f("DIMTOH", Bit, R2000Plus),
    f("DIMSE1", Bit, R2000Plus),
    f("DIMSE2", Bit, R2000Plus),
    f("DIMTAD", BitShort, R2000Plus),
    f("DIMZIN", BitShort, R2000Plus),
    f("DIMAZIN", BitShort, R2000Plus),
    f("DIMARCSYM", BitShort, R2007Plus),
    f("DIMTXT", BitDouble, R2000Plus),
    f("DIMCEN", BitDouble, R2000Plus),
    f("DIMTSZ", BitDouble, R2000Plus),
    f("DIMALTF", BitDouble, R2000Plus),
    f("DIMLFAC", BitDouble, R2000Plus),
    f("DIMTVP", BitDouble, R2000Plus),
    f("DIMTFAC", BitDouble, R2000Plus),
    f("DIMGAP", BitDouble, R2000Plus),
    f("DIMALTRND", BitDouble, R2000Plus),
    f("DIMALT", Bit, R2000Plus),
    f("DIMALTD", BitShort, R2000Plus),
    f("DIMTOFL", Bit, R2000Plus),
    f("DIMSAH", Bit, R2000Plus),
    f("DIMTIX", Bit, R2000Plus),
    f("DIMSOXD", Bit, R2000Plus),
    f("DIMCLRD", CmColor, R2000Plus),
    f("DIMCLRE", CmColor, R2000Plus),
    f("DIMCLRT", CmColor, R2000Plus),
    f("DIMADEC", BitShort, R2000Plus),
    f("DIMDEC", BitShort, R2000Plus),
    f("DIMTDEC", BitShort, R2000Plus),
    f("DIMALTU", BitShort, R2000Plus),
    f("DIMALTTD", BitShort, R2000Plus),
    f("DIMAUNIT", BitShort, R2000Plus),
    f("DIMFRAC", BitShort, R2000Plus),
    f("DIMLUNIT", BitShort, R2000Plus),
    f("DIMDSEP", BitShort, R2000Plus),
    f("DIMTMOVE", BitShort, R2000Plus),
    f("DIMJUST", BitShort, R2000Plus),
    f("DIMSD1", Bit, R2000Plus),
    f("DIMSD2", Bit, R2000Plus),
    f("DIMTOLJ", BitShort, R2000Plus),
    f("DIMTZIN", BitShort, R2000Plus),
    f("DIMALTZ", BitShort, R2000Plus),
    f("DIMALTTZ", BitShort, R2000Plus),
    f("DIMUPT", Bit, R2000Plus),
    f("DIMATFIT", BitShort, R2000Plus),
    f("DIMFXLON", Bit, R2007Plus),
    f("DIMTXTDIRECTION", Bit, R2010Plus),
    f("DIMALTMZF", BitDouble, R2010Plus),
    f("DIMALTMZS", Text, R2010Plus),
    f("DIMMZF", BitDouble, R2010Plus),
    f("DIMMZS", Text, R2010Plus),
    f("DIMLWD", BitShort, R2000Plus),
    f("DIMLWE", BitShort, R2000Plus),
    f("", Bit, Always),
];

/// Fields of [`HEADER_LAYOUT`] stored for one release, in order.
pub fn fields_for(layout: &VersionLayout) -> impl Iterator<Item = &'static HeaderField> + '_ {
    // The plot style condition depends on a value; callers writing a
    // header decide it themselves.
    HEADER_LAYOUT.iter().filter(move |field| match field.presence {
        Presence::PlotStyleByHandle => true,
        other => other.applies(layout, &HeaderVariables::default()),
    })
}

/// Reader for the `AcDb:Header` section.
pub struct DwgHeaderReader<'a> {
    data: &'a [u8],
    layout: VersionLayout,
    maintenance_version: u8,
    code_page: u16,
}

impl<'a> DwgHeaderReader<'a> {
    pub fn new(layout: VersionLayout, data: &'a [u8], maintenance_version: u8) -> Self {
        Self {
            data,
            layout,
            maintenance_version,
            code_page: 30,
        }
    }

    /// Code page for pre-R2007 strings.
    pub fn with_code_page(mut self, code_page: u16) -> Self {
        self.code_page = code_page;
        self
    }

    fn stream(&self) -> DwgBitReader<'a> {
        DwgBitReader::new(self.data, self.layout.version)
            .with_encoding(encoding_from_code_page(self.code_page))
    }

    /// Read every variable of the section.
    ///
    /// Sentinel and CRC mismatches are warnings; running out of data is an
    /// error.
    pub fn read(&self, notifications: &mut NotificationCollection) -> Result<HeaderVariables> {
        let mut header = HeaderVariables::new();
        let mut reader = self.stream();

        let sentinel = reader.read_sentinel();
        reader.ensure_good("header start sentinel")?;
        VersionLayout::check_sentinel(&sentinel, &sentinels::HEADER_START, "AcDb:Header", notifications);

        // RL: size of the section
        let size = reader.read_raw_long().max(0) as i64;
        if self.layout.header_has_extra_size(self.maintenance_version) {
            reader.read_raw_long();
        }
        let initial_pos = reader.position_in_bits();

        let mut merged = if self.layout.string_stream {
            // RL: size in bits
            let size_in_bits = reader.read_raw_ulong() as i64;
            let last = initial_pos + size_in_bits - 1;
            let mut text = self.stream();
            text.set_position_by_flag(last);
            let mut handles = self.stream();
            handles.set_position_in_bits(last + 1);
            DwgMergedReader::new(reader).with_text(text).with_handles(handles)
        } else {
            DwgMergedReader::new(reader)
        };

        for field in HEADER_LAYOUT {
            if !field.presence.applies(&self.layout, &header) {
                continue;
            }
            let value = read_field(&mut merged, field.kind);
            if !field.name.is_empty() {
                header.set(field.name, value);
            }
        }
        merged.ensure_good("header variables")?;

        let mut end = self.stream();
        end.set_position_in_bits(initial_pos + size * 8);
        let crc_end = end.position() + usize::from(end.bit_shift() > 0);
        let stored = end.reset_shift();
        let sentinel = end.read_sentinel();
        end.ensure_good("header end")?;

        if let Some(covered) = self.data.get(sentinels::HEADER_START.len()..crc_end) {
            let computed = crc8(handle_section::CRC_SEED, covered);
            if computed != stored {
                notifications.warn(format!(
                    "Header CRC mismatch: stored {:#06X}, computed {:#06X}",
                    stored, computed
                ));
            }
        }
        VersionLayout::check_sentinel(&sentinel, &sentinels::HEADER_END, "AcDb:Header", notifications);

        debug!(variables = header.len(), seed = header.handle_seed(), "read header");
        Ok(header)
    }
}

pub(crate) fn read_field(reader: &mut DwgMergedReader<'_>, kind: FieldKind) -> HeaderValue {
    match kind {
        FieldKind::Bit => HeaderValue::Bool(reader.read_bit()),
        FieldKind::BitShort => HeaderValue::Short(reader.read_bit_short()),
        FieldKind::BitLong => HeaderValue::Long(reader.read_bit_long()),
        FieldKind::BitLongLong => HeaderValue::LongLong(reader.read_bit_long_long()),
        FieldKind::BitDouble => HeaderValue::Double(reader.read_bit_double()),
        FieldKind::RawChar => HeaderValue::Byte(reader.read_byte()),
        FieldKind::Text => HeaderValue::Text(reader.read_variable_text()),
        FieldKind::Handle => HeaderValue::Handle(reader.handle_reference()),
        FieldKind::HandleSeed => HeaderValue::Handle(reader.main_mut().handle_reference()),
        FieldKind::Point3 => HeaderValue::Point3(reader.read_3bit_double()),
        FieldKind::RawPoint2 => HeaderValue::Point2(reader.read_2raw_double()),
        FieldKind::CmColor => HeaderValue::Color(reader.read_cm_color()),
        FieldKind::Date => {
            let (days, ms) = (reader.read_bit_long(), reader.read_bit_long());
            HeaderValue::Date(days as f64 + ms as f64 / 86_400_000.0)
        }
        FieldKind::Duration => {
            let (days, ms) = (reader.read_bit_long(), reader.read_bit_long());
            HeaderValue::Duration(days as f64 + ms as f64 / 86_400_000.0)
        }
    }
}
