//! Attribute and attribute definition entities
//!
//! Both extend the single-line text layout with a tag and flags; the
//! definition also carries the prompt shown when the block is inserted.

use bitflags::bitflags;

use super::{EntityCommon, Text};

bitflags! {
    /// Attribute flags (DXF group 70).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AttributeFlags: u8 {
        const INVISIBLE = 0x01;
        const CONSTANT = 0x02;
        const VERIFY = 0x04;
        const PRESET = 0x08;
    }
}

/// Attribute attached to an insert.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Attribute {
    /// Text data; `text.value` holds the attribute value.
    pub text: Text,
    pub tag: String,
    pub field_length: i16,
    pub flags: AttributeFlags,
    /// R2007+
    pub lock_position: bool,
    /// R2010+ class version
    pub version: u8,
}

impl super::Entity for Attribute {
    fn common(&self) -> &EntityCommon {
        &self.text.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.text.common
    }

    fn entity_type(&self) -> &'static str {
        "ATTRIB"
    }
}

/// Attribute template inside a block definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeDefinition {
    /// `attribute.text.value` holds the default value.
    pub attribute: Attribute,
    pub prompt: String,
}

impl super::Entity for AttributeDefinition {
    fn common(&self) -> &EntityCommon {
        &self.attribute.text.common
    }

    fn common_mut(&mut self) -> &mut EntityCommon {
        &mut self.attribute.text.common
    }

    fn entity_type(&self) -> &'static str {
        "ATTDEF"
    }
}
