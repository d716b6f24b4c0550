//! Drawing header variables.
//!
//! The `AcDb:Header` section stores a few hundred system variables in a
//! fixed, version-dependent order. They are kept here by name in read
//! order; typed accessors cover the ones a consumer usually needs.

use indexmap::IndexMap;

use crate::types::{Color, Vector2, Vector3};

/// One decoded header variable.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(u8),
    Short(i16),
    Long(i32),
    LongLong(u64),
    Double(f64),
    Text(String),
    Handle(u64),
    Point2(Vector2),
    Point3(Vector3),
    Color(Color),
    /// Julian date (days plus fraction of a day)
    Date(f64),
    /// Elapsed time in days
    Duration(f64),
}

/// Header variables by name (`LTSCALE`, `EXTMIN`, `CLAYER`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderVariables {
    values: IndexMap<&'static str, HeaderValue>,
}

impl HeaderVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: HeaderValue) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Variables in read order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &HeaderValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            HeaderValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer variables of any width.
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            HeaderValue::Byte(v) => Some(*v as i64),
            HeaderValue::Short(v) => Some(*v as i64),
            HeaderValue::Long(v) => Some(*v as i64),
            HeaderValue::LongLong(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn double(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            HeaderValue::Double(v) | HeaderValue::Date(v) | HeaderValue::Duration(v) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            HeaderValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn handle(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            HeaderValue::Handle(h) => Some(*h),
            _ => None,
        }
    }

    pub fn point2(&self, name: &str) -> Option<Vector2> {
        match self.get(name)? {
            HeaderValue::Point2(p) => Some(*p),
            _ => None,
        }
    }

    pub fn point3(&self, name: &str) -> Option<Vector3> {
        match self.get(name)? {
            HeaderValue::Point3(p) => Some(*p),
            _ => None,
        }
    }

    pub fn color(&self, name: &str) -> Option<Color> {
        match self.get(name)? {
            HeaderValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Next free handle.
    pub fn handle_seed(&self) -> u64 {
        self.handle("HANDSEED").unwrap_or(0)
    }

    /// Global linetype scale, 1.0 when absent.
    pub fn linetype_scale(&self) -> f64 {
        self.double("LTSCALE").unwrap_or(1.0)
    }

    /// Default text height, 2.5 when absent.
    pub fn text_size(&self) -> f64 {
        self.double("TEXTSIZE").unwrap_or(2.5)
    }

    /// Model space insertion base.
    pub fn insertion_base(&self) -> Vector3 {
        self.point3("INSBASE").unwrap_or_default()
    }

    /// Model space extents as `(EXTMIN, EXTMAX)`.
    pub fn extents(&self) -> (Vector3, Vector3) {
        (
            self.point3("EXTMIN").unwrap_or_default(),
            self.point3("EXTMAX").unwrap_or_default(),
        )
    }

    /// Model space limits as `(LIMMIN, LIMMAX)`.
    pub fn limits(&self) -> (Vector2, Vector2) {
        (
            self.point2("LIMMIN").unwrap_or_default(),
            self.point2("LIMMAX").unwrap_or_default(),
        )
    }

    pub fn current_layer(&self) -> u64 {
        self.handle("CLAYER").unwrap_or(0)
    }

    pub fn current_linetype(&self) -> u64 {
        self.handle("CELTYPE").unwrap_or(0)
    }

    pub fn current_text_style(&self) -> u64 {
        self.handle("TEXTSTYLE").unwrap_or(0)
    }

    /// Table control and special block/linetype handles.
    pub fn control_handles(&self) -> ControlHandles {
        let h = |name| self.handle(name).unwrap_or(0);
        ControlHandles {
            block: h("BLOCK_CONTROL_OBJECT"),
            layer: h("LAYER_CONTROL_OBJECT"),
            style: h("STYLE_CONTROL_OBJECT"),
            linetype: h("LINETYPE_CONTROL_OBJECT"),
            view: h("VIEW_CONTROL_OBJECT"),
            ucs: h("UCS_CONTROL_OBJECT"),
            vport: h("VPORT_CONTROL_OBJECT"),
            appid: h("APPID_CONTROL_OBJECT"),
            dimstyle: h("DIMSTYLE_CONTROL_OBJECT"),
            vp_entity_header: h("VPENTHDR_CONTROL_OBJECT"),
            model_space: h("BLOCK_RECORD_MSPACE"),
            paper_space: h("BLOCK_RECORD_PSPACE"),
            bylayer: h("LTYPE_BYLAYER"),
            byblock: h("LTYPE_BYBLOCK"),
            continuous: h("LTYPE_CONTINUOUS"),
        }
    }
}

/// Handles the header names for the table controls and the special
/// records. 0 stands for "not present".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlHandles {
    pub block: u64,
    pub layer: u64,
    pub style: u64,
    pub linetype: u64,
    pub view: u64,
    pub ucs: u64,
    pub vport: u64,
    pub appid: u64,
    pub dimstyle: u64,
    pub vp_entity_header: u64,
    pub model_space: u64,
    pub paper_space: u64,
    pub bylayer: u64,
    pub byblock: u64,
    pub continuous: u64,
}

impl ControlHandles {
    /// No table control handle is known.
    pub fn is_empty(&self) -> bool {
        [
            self.block,
            self.layer,
            self.style,
            self.linetype,
            self.vport,
            self.appid,
            self.dimstyle,
        ]
        .iter()
        .all(|h| *h == 0)
    }
}
