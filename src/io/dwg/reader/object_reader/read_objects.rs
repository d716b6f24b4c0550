//! Non-graphical object records.

use crate::error::Result;
use crate::objects::{ImageDefinition, ResolutionUnit};
use crate::record::Record;

use super::common::read_common_non_entity_data;
use super::StreamSet;

pub fn read_image_definition(s: &mut StreamSet<'_>) -> Result<Record> {
    let common = read_common_non_entity_data(s)?;
    let mut def = ImageDefinition {
        handle: common.handle,
        owner: common.owner,
        reactors: common.reactors,
        xdictionary: common.xdictionary,
        extended_data: common.extended_data,
        ..Default::default()
    };
    def.class_version = s.read_bit_long();
    def.size = s.read_2raw_double();
    def.file_path = s.read_variable_text();
    def.is_loaded = s.read_bit();
    def.resolution_unit = ResolutionUnit::from_code(s.read_byte());
    def.pixel_size = s.read_2raw_double();
    Ok(Record::ImageDefinition(def))
}
