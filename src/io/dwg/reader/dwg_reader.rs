//! DWG reader, the entry point for decoding a file.
//!
//! Reads the file header, then walks the file in a fixed order and pushes
//! every decoded record into a [`DwgSink`]:
//!
//! 1. header variables
//! 2. classes
//! 3. handles (object map)
//! 4. table controls and their entries, linetypes first
//! 5. blocks, with the entities each block record owns
//! 6. entities no block claimed
//! 7. free-standing objects
//!
//! Each step returns whether it succeeded; a failed step is recorded in the
//! notifications and the next step still runs. Handles still in the object
//! map at the end are reported by [`DwgReader::orphans`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use dwg_decode::{DwgReader, RecordCollector};
//!
//! let mut reader = DwgReader::from_file("sample.dwg")?;
//! let mut records = RecordCollector::new();
//! reader.read(&mut records)?;
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use tracing::{debug, info};

use crate::entities::{Insert, Polyline};
use crate::error::{DwgError, Result};
use crate::header::HeaderVariables;
use crate::notification::{NotificationCollection, NotificationType};
use crate::record::Record;
use crate::sink::{emit, DwgSink, RecordCollector};
use crate::tables::BlockRecord;
use crate::types::{DwgVersion, Handle};

use super::super::constants::section_names;
use super::super::file_header::DwgFileHeader;
use super::super::layout::VersionLayout;
use super::super::object_type::ObjectType;
use super::classes_reader::{ClassTable, DwgClassesReader};
use super::handle_reader::{DwgHandleReader, ObjectMap};
use super::header_reader::DwgHeaderReader;
use super::object_reader::{Decoded, DwgObjectReader, Registry};

/// Configuration options for the DWG reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DwgReaderConfiguration {
    /// When `true`, a record that fails to decode is reported and skipped.
    /// When `false`, the first such failure ends the current step.
    ///
    /// Default: `true`.
    pub failsafe: bool,

    /// When `false`, notifications are also emitted as `tracing` events.
    ///
    /// Default: `true`.
    pub silent: bool,

    /// Report records without a decoder as
    /// [`NotificationType::NotImplemented`]. They are consumed from the
    /// object map either way.
    ///
    /// Default: `false`.
    pub keep_unknown: bool,
}

impl Default for DwgReaderConfiguration {
    fn default() -> Self {
        Self {
            failsafe: true,
            silent: true,
            keep_unknown: false,
        }
    }
}

/// File-level facts handed to the sink before any record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DwgFileInfo {
    pub version: DwgVersion,
    pub maintenance_version: u8,
    /// Code page of pre-R2007 strings.
    pub code_page: u16,
}

/// Table order of the tables step: control type, entry type, name.
const TABLES: [(ObjectType, ObjectType, &str); 7] = [
    (ObjectType::LtypeControlObj, ObjectType::Ltype, "linetype"),
    (ObjectType::LayerControlObj, ObjectType::Layer, "layer"),
    (ObjectType::StyleControlObj, ObjectType::Style, "text style"),
    (ObjectType::DimstyleControlObj, ObjectType::Dimstyle, "dimstyle"),
    (ObjectType::VportControlObj, ObjectType::Vport, "vport"),
    (ObjectType::BlockControlObj, ObjectType::BlockHeader, "block record"),
    (ObjectType::AppidControlObj, ObjectType::Appid, "appid"),
];

/// DWG file reader.
pub struct DwgReader<R: Read + Seek> {
    reader: R,
    config: DwgReaderConfiguration,
    layout: VersionLayout,
    file_header: DwgFileHeader,
    notifications: NotificationCollection,

    header: HeaderVariables,
    classes: ClassTable,
    object_map: ObjectMap,
    /// Objects section, assembled on first use and released by `read`.
    objects: Option<Vec<u8>>,
    /// Decoder table for the current class table.
    registry: Option<Registry>,
    block_records: Vec<BlockRecord>,
    /// Handles whose record failed to decode; left in the map.
    failed: AHashSet<u64>,
}

impl DwgReader<BufReader<File>> {
    /// Open a DWG file by path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> DwgReader<R> {
    /// Create a reader over any seekable byte stream with the default
    /// configuration.
    ///
    /// Fails when the version tag is not supported or the file header
    /// cannot be read.
    pub fn from_reader(reader: R) -> Result<Self> {
        Self::with_config(reader, DwgReaderConfiguration::default())
    }

    pub fn with_config(mut reader: R, config: DwgReaderConfiguration) -> Result<Self> {
        let version = read_version(&mut reader)?;
        let mut notifications = NotificationCollection::with_silent(config.silent);
        let file_header = DwgFileHeader::read(&mut reader, version, &mut notifications)?;
        info!(
            version = %version,
            maintenance = file_header.maintenance_version(),
            "opened DWG file"
        );

        Ok(Self {
            reader,
            config,
            layout: VersionLayout::new(version),
            file_header,
            notifications,
            header: HeaderVariables::new(),
            classes: ClassTable::new(),
            object_map: ObjectMap::new(),
            objects: None,
            registry: None,
            block_records: Vec::new(),
            failed: AHashSet::new(),
        })
    }

    pub fn version(&self) -> DwgVersion {
        self.layout.version
    }

    pub fn file_info(&self) -> DwgFileInfo {
        DwgFileInfo {
            version: self.layout.version,
            maintenance_version: self.file_header.maintenance_version(),
            code_page: self.file_header.code_page(),
        }
    }

    pub fn file_header(&self) -> &DwgFileHeader {
        &self.file_header
    }

    pub fn header(&self) -> &HeaderVariables {
        &self.header
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn object_map(&self) -> &ObjectMap {
        &self.object_map
    }

    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    /// Whether the objects section is currently held in memory.
    pub fn objects_loaded(&self) -> bool {
        self.objects.is_some()
    }

    /// Handles left in the object map: never reached, or failed to decode.
    pub fn orphans(&self) -> Vec<u64> {
        self.object_map.pending()
    }

    /// Run every step in order.
    ///
    /// Step failures do not stop the run; they end up in
    /// [`notifications`](Self::notifications).
    pub fn read(&mut self, sink: &mut dyn DwgSink) -> Result<()> {
        sink.add_file_info(&self.file_info());
        self.read_dwg_header(sink);
        self.read_dwg_classes();
        self.read_dwg_handles();
        self.read_dwg_tables(sink);
        self.read_dwg_blocks(sink);
        self.read_dwg_entities(sink);
        self.read_dwg_objects(sink);
        self.objects = None;

        let orphans = self.object_map.len();
        if orphans > 0 {
            self.notifications
                .warn(format!("{} handles were not resolved", orphans));
        }
        debug!(
            total = self.object_map.total(),
            orphans,
            notifications = self.notifications.len(),
            "finished reading"
        );
        Ok(())
    }

    /// Run every step into a [`RecordCollector`].
    pub fn read_records(&mut self) -> Result<RecordCollector> {
        let mut collector = RecordCollector::new();
        self.read(&mut collector)?;
        Ok(collector)
    }

    fn section(&mut self, name: &str) -> Option<Vec<u8>> {
        match self
            .file_header
            .read_section(&mut self.reader, name, &mut self.notifications)
        {
            Ok(data) => Some(data),
            Err(e) => {
                self.notifications
                    .error(format!("Failed to read section {}: {}", name, e));
                None
            }
        }
    }

    /// Read the `AcDb:Header` section and hand the variables to the sink.
    pub fn read_dwg_header(&mut self, sink: &mut dyn DwgSink) -> bool {
        let Some(data) = self.section(section_names::HEADER) else {
            return false;
        };
        let reader = DwgHeaderReader::new(self.layout, &data, self.file_header.maintenance_version())
            .with_code_page(self.file_header.code_page());
        match reader.read(&mut self.notifications) {
            Ok(header) => {
                self.header = header;
                sink.add_header(&self.header);
                true
            }
            Err(e) => {
                self.notifications
                    .error(format!("Failed to read header variables: {}", e));
                false
            }
        }
    }

    /// Read the `AcDb:Classes` section.
    pub fn read_dwg_classes(&mut self) -> bool {
        let Some(data) = self.section(section_names::CLASSES) else {
            return false;
        };
        let reader = DwgClassesReader::new(self.layout, &data, self.file_header.maintenance_version());
        match reader.read(&mut self.notifications) {
            Ok(classes) => {
                debug!(count = classes.len(), "read classes");
                self.classes = classes;
                self.registry = None;
                true
            }
            Err(e) => {
                self.notifications.error(format!("Failed to read classes: {}", e));
                false
            }
        }
    }

    /// Read the `AcDb:Handles` section into the object map.
    ///
    /// On failure the map keeps whatever it held before.
    pub fn read_dwg_handles(&mut self) -> bool {
        let Some(data) = self.section(section_names::HANDLES) else {
            return false;
        };
        match DwgHandleReader::new(self.layout.version, &data).read(&mut self.notifications) {
            Ok(map) => {
                debug!(handles = map.len(), "read object map");
                self.object_map = map;
                true
            }
            Err(e) => {
                self.notifications.error(format!("Failed to read handles: {}", e));
                false
            }
        }
    }

    fn load_objects(&mut self) -> bool {
        if self.objects.is_none() {
            self.objects = self.section(section_names::ACDB_OBJECTS);
        }
        if self.registry.is_none() {
            self.registry = Some(Registry::new(&self.classes));
        }
        self.objects.is_some()
    }

    /// Decode the table controls and their entries.
    ///
    /// A missing linetype control fails the step; other missing controls
    /// are warnings.
    pub fn read_dwg_tables(&mut self, sink: &mut dyn DwgSink) -> bool {
        if !self.load_objects() {
            return false;
        }
        let controls = self.control_handles();
        let mut walk = self.walk(sink);

        for (control_kind, entry_kind, name) in TABLES {
            let handle = controls.get(&control_kind).copied().unwrap_or(0);
            let control = match walk.decode_as(handle, control_kind, 0) {
                Some(Record::TableControl(control)) => control,
                _ => {
                    let error = DwgError::MissingControl(name.to_string());
                    if control_kind == ObjectType::LtypeControlObj {
                        walk.notifications.error(error.to_string());
                        return false;
                    }
                    walk.notifications.warn(error.to_string());
                    continue;
                }
            };
            walk.sink.add_table_control(&control);
            let owner = control.handle.value();

            for entry in control.entries.iter() {
                if walk.aborted {
                    return false;
                }
                if let Some(record) = walk.decode_as(entry.value(), entry_kind, owner) {
                    walk.accept_table_entry(record);
                }
            }
            // Trailing handles are entries only when they have the entry type.
            for special in control.special.iter() {
                if !walk.check_reference(special.value(), owner) {
                    continue;
                }
                if walk.peek(special.value()) == Some(entry_kind) {
                    if let Some(record) = walk.decode_as(special.value(), entry_kind, owner) {
                        walk.accept_table_entry(record);
                    }
                }
            }
            debug!(table = name, entries = control.entries.len(), "read table");
        }
        !walk.aborted
    }

    /// Decode every block definition: BLOCK, owned entities, ENDBLK.
    pub fn read_dwg_blocks(&mut self, sink: &mut dyn DwgSink) -> bool {
        if !self.load_objects() {
            return false;
        }
        let records = std::mem::take(&mut self.block_records);
        let owned_list = self.layout.owned_object_list;
        let mut walk = self.walk(sink);

        for record in &records {
            if walk.aborted {
                break;
            }
            let owner = record.entry.handle.value();
            let block = match walk.decode_as(record.block_entity.value(), ObjectType::Block, owner) {
                Some(Record::Block(block)) => block,
                _ => {
                    walk.notifications.warn(format!(
                        "Block record {:#X} ({}) has no readable BLOCK entity",
                        record.entry.handle.value(),
                        record.entry.name
                    ));
                    continue;
                }
            };
            walk.sink.begin_block(record, &block);

            if owned_list {
                for handle in record.owned.iter() {
                    if walk.aborted {
                        break;
                    }
                    if walk.check_reference(handle.value(), owner) {
                        walk.read_entity(handle.value());
                    }
                }
            } else {
                walk.read_entity_chain(record.first_entity.value(), record.last_entity.value(), owner);
            }

            match walk.decode_as(record.end_block.value(), ObjectType::Endblk, owner) {
                Some(Record::BlockEnd(end)) => walk.sink.end_block(record, &end),
                _ => walk.notifications.warn(format!(
                    "Block record {:#X} ({}) has no readable ENDBLK entity",
                    record.entry.handle.value(),
                    record.entry.name
                )),
            }
        }
        let ok = !walk.aborted;
        self.block_records = records;
        ok
    }

    /// Decode entities no block walk reached.
    ///
    /// Top-level entities go first so polylines and inserts can still claim
    /// their vertices and attributes; whatever sub-entities remain are
    /// decoded on their own afterwards.
    pub fn read_dwg_entities(&mut self, sink: &mut dyn DwgSink) -> bool {
        if !self.load_objects() {
            return false;
        }
        let mut walk = self.walk(sink);
        let pending = walk.pending();
        let mut leftovers = Vec::new();

        for handle in pending {
            if walk.aborted {
                return false;
            }
            match walk.peek(handle) {
                Some(kind) if is_sub_entity(kind) => leftovers.push(handle),
                Some(kind) if kind.is_entity() => {
                    walk.read_entity(handle);
                }
                None if walk.is_entity_code(handle) => {
                    walk.read_entity(handle);
                }
                _ => {}
            }
        }
        for handle in leftovers {
            if walk.aborted {
                return false;
            }
            if walk.map.contains(handle) {
                walk.read_entity(handle);
            }
        }
        !walk.aborted
    }

    /// Decode every record still in the map that is not an entity.
    pub fn read_dwg_objects(&mut self, sink: &mut dyn DwgSink) -> bool {
        if !self.load_objects() {
            return false;
        }
        let mut walk = self.walk(sink);
        for handle in walk.pending() {
            if walk.aborted {
                return false;
            }
            if walk.is_entity_code(handle) {
                continue;
            }
            if let Some(record) = walk.decode(handle) {
                emit(walk.sink, &record);
            }
        }
        !walk.aborted
    }

    /// Table control handles from the header, or found by scanning the
    /// object map when the header did not provide them.
    fn control_handles(&mut self) -> AHashMap<ObjectType, u64> {
        let mut found = AHashMap::new();
        let from_header = self.header.control_handles();
        if !from_header.is_empty() {
            found.insert(ObjectType::LtypeControlObj, from_header.linetype);
            found.insert(ObjectType::LayerControlObj, from_header.layer);
            found.insert(ObjectType::StyleControlObj, from_header.style);
            found.insert(ObjectType::DimstyleControlObj, from_header.dimstyle);
            found.insert(ObjectType::VportControlObj, from_header.vport);
            found.insert(ObjectType::BlockControlObj, from_header.block);
            found.insert(ObjectType::AppidControlObj, from_header.appid);
            return found;
        }

        self.notifications
            .warn("No table control handles in the header; scanning the object map");
        let Some(data) = self.objects.as_deref() else {
            return found;
        };
        let objects = object_reader(
            self.layout,
            data,
            &self.classes,
            self.registry.as_ref(),
            self.file_header.code_page(),
        );
        for (handle, location) in self.object_map.iter() {
            let Ok(code) = objects.type_code(handle, location) else {
                continue;
            };
            if let Some(kind) = ObjectType::from_code(code).filter(|k| k.is_control()) {
                found.entry(kind).or_insert(handle);
            }
        }
        found
    }

    fn walk<'s>(&'s mut self, sink: &'s mut dyn DwgSink) -> Walk<'s> {
        let Self {
            layout,
            config,
            file_header,
            notifications,
            classes,
            object_map,
            objects,
            registry,
            block_records,
            failed,
            ..
        } = self;
        let data = objects.as_deref().unwrap_or(&[]);
        Walk {
            objects: object_reader(*layout, data, classes, registry.as_ref(), file_header.code_page()),
            layout: *layout,
            config,
            map: object_map,
            notifications,
            block_records,
            failed,
            sink,
            aborted: false,
        }
    }
}

fn object_reader<'a>(
    layout: VersionLayout,
    data: &'a [u8],
    classes: &'a ClassTable,
    registry: Option<&'a Registry>,
    code_page: u16,
) -> DwgObjectReader<'a> {
    match registry {
        Some(registry) => DwgObjectReader::with_registry(layout, data, classes, registry, code_page),
        None => DwgObjectReader::new(layout, data, classes, code_page),
    }
}

/// Read and check the six-character version tag.
fn read_version<R: Read + Seek>(reader: &mut R) -> Result<DwgVersion> {
    let mut tag = [0u8; 6];
    reader.seek(SeekFrom::Start(0))?;
    reader.read_exact(&mut tag)?;
    let tag = String::from_utf8_lossy(&tag);
    DwgVersion::parse(&tag).ok_or_else(|| DwgError::UnsupportedVersion(tag.into_owned()))
}

/// Entity types that belong to a polyline, insert or block.
fn is_sub_entity(kind: ObjectType) -> bool {
    matches!(
        kind,
        ObjectType::Vertex2D
            | ObjectType::Vertex3D
            | ObjectType::VertexMesh
            | ObjectType::VertexPface
            | ObjectType::VertexPfaceFace
            | ObjectType::Attrib
            | ObjectType::Seqend
            | ObjectType::Block
            | ObjectType::Endblk
    )
}

/// State one step borrows from the reader.
struct Walk<'s> {
    objects: DwgObjectReader<'s>,
    layout: VersionLayout,
    config: &'s DwgReaderConfiguration,
    map: &'s mut ObjectMap,
    notifications: &'s mut NotificationCollection,
    block_records: &'s mut Vec<BlockRecord>,
    failed: &'s mut AHashSet<u64>,
    sink: &'s mut dyn DwgSink,
    /// A record failed with `failsafe` off.
    aborted: bool,
}

impl Walk<'_> {
    /// Pending handles that have not already failed.
    fn pending(&self) -> Vec<u64> {
        self.map
            .iter()
            .map(|(h, _)| h)
            .filter(|h| !self.failed.contains(h))
            .collect()
    }

    /// Built-in type of a pending record, without consuming it.
    fn peek(&self, handle: u64) -> Option<ObjectType> {
        let location = self.map.location(handle)?;
        let code = self.objects.type_code(handle, location).ok()?;
        self.objects.resolve(code)
    }

    fn is_entity_code(&self, handle: u64) -> bool {
        self.map
            .location(handle)
            .and_then(|location| self.objects.type_code(handle, location).ok())
            .is_some_and(|code| self.objects.is_entity_code(code))
    }

    fn fail(&mut self, handle: u64, error: DwgError) {
        let offset = self.map.location(handle).unwrap_or(-1);
        self.failed.insert(handle);
        self.notifications.error(format!(
            "Failed to read record {:#X} at offset {}: {}",
            handle, offset, error
        ));
        if !self.config.failsafe {
            self.aborted = true;
        }
    }

    /// Decode a pending record and consume it from the map.
    fn decode(&mut self, handle: u64) -> Option<Record> {
        if self.aborted || handle == 0 || self.failed.contains(&handle) {
            return None;
        }
        let location = self.map.location(handle)?;
        match self.objects.read(handle, location) {
            Ok(Decoded::Record(record)) => {
                self.map.remove(handle);
                Some(record)
            }
            Ok(Decoded::Unsupported(code)) => {
                self.map.remove(handle);
                if self.config.keep_unknown {
                    let name = self
                        .objects
                        .resolve(code)
                        .map_or_else(|| format!("type {}", code), |kind| format!("{:?}", kind));
                    self.notifications.notify(
                        NotificationType::NotImplemented,
                        format!("Record {:#X} of {} is not decoded", handle, name),
                    );
                }
                None
            }
            Err(e) => {
                self.fail(handle, e);
                None
            }
        }
    }

    /// Report a reference from `owner` to a handle the object map never
    /// held. Null handles and known handles pass. An `owner` of 0 stands
    /// for the file header.
    fn check_reference(&mut self, handle: u64, owner: u64) -> bool {
        if handle == 0 || self.map.is_known(handle) {
            return true;
        }
        let referrer = if owner == 0 {
            "the file header".to_string()
        } else {
            format!("{:#X}", owner)
        };
        self.notifications.warn(format!(
            "Handle {:#X} referenced by {} is not in the object map",
            handle, referrer
        ));
        false
    }

    /// Decode a record `owner` refers to.
    fn decode_ref(&mut self, handle: u64, owner: u64) -> Option<Record> {
        if !self.check_reference(handle, owner) {
            return None;
        }
        self.decode(handle)
    }

    /// Decode a record `owner` refers to that must be of type `expected`.
    fn decode_as(&mut self, handle: u64, expected: ObjectType, owner: u64) -> Option<Record> {
        if self.aborted || handle == 0 || !self.check_reference(handle, owner) {
            return None;
        }
        if !self.map.contains(handle) {
            return None;
        }
        let location = self.map.location(handle)?;
        let code = match self.objects.type_code(handle, location) {
            Ok(code) => code,
            Err(e) => {
                self.fail(handle, e);
                return None;
            }
        };
        if self.objects.resolve(code) != Some(expected) {
            self.fail(
                handle,
                DwgError::UnexpectedType {
                    handle,
                    expected: format!("{:?}", expected),
                    found: code,
                },
            );
            return None;
        }
        self.decode(handle)
    }

    fn accept_table_entry(&mut self, record: Record) {
        emit(self.sink, &record);
        if let Record::BlockRecord(block) = record {
            self.block_records.push(block);
        }
    }

    /// Decode an entity with its sub-entities and emit it. Returns the
    /// handle the owner's chain continues with.
    fn read_entity(&mut self, handle: u64) -> Option<u64> {
        let mut record = self.decode(handle)?;
        let mut next = record.as_entity().map_or(0, |e| e.common().next_entity.value());
        let seqend = match &mut record {
            Record::Polyline(polyline) => self.read_vertices(polyline),
            Record::Insert(insert) if insert.has_attributes => self.read_attributes(insert),
            _ => None,
        };
        // Before R2004 the owner's chain continues after the SEQEND.
        if let Some(seqend) = seqend {
            if !self.map.contains(next) {
                next = seqend;
            }
        }
        emit(self.sink, &record);
        Some(next)
    }

    /// Follow the pre-R2004 next-entity links from `first` to `last`.
    fn read_entity_chain(&mut self, first: u64, last: u64, owner: u64) {
        let mut next = first;
        let mut budget = self.map.total() + 1;
        while next != 0 && budget > 0 && !self.aborted {
            budget -= 1;
            let current = next;
            if !self.check_reference(current, owner) {
                return;
            }
            if !self.map.contains(current) {
                self.notifications.warn(format!(
                    "Entity chain of {:#X} reaches {:#X}, which is not pending",
                    owner, current
                ));
                return;
            }
            match self.read_entity(current) {
                Some(following) if current != last => next = following,
                _ => return,
            }
        }
    }

    /// Decode the records `owned` lists. Before R2004 the list holds the
    /// first and last handles and the rest follow the next-entity links.
    fn read_owned(&mut self, owned: &[Handle], owner: u64) -> Vec<Record> {
        let mut records = Vec::new();
        if self.layout.owned_object_list {
            for handle in owned {
                if let Some(record) = self.decode_ref(handle.value(), owner) {
                    records.push(record);
                }
            }
            return records;
        }

        let (Some(first), Some(last)) = (owned.first(), owned.last()) else {
            return records;
        };
        let mut next = first.value();
        let mut budget = self.map.total() + 1;
        while next != 0 && budget > 0 {
            budget -= 1;
            let current = next;
            let Some(record) = self.decode_ref(current, owner) else {
                break;
            };
            next = record.as_entity().map_or(0, |e| e.common().next_entity.value());
            records.push(record);
            if current == last.value() {
                break;
            }
        }
        records
    }

    /// Decode a SEQEND, returning its next-entity link.
    fn read_seqend(&mut self, handle: Handle, owner: u64) -> Option<u64> {
        match self.decode_as(handle.value(), ObjectType::Seqend, owner)? {
            Record::Seqend(seqend) => Some(seqend.common.next_entity.value()),
            _ => None,
        }
    }

    fn read_vertices(&mut self, polyline: &mut Polyline) -> Option<u64> {
        let owner = polyline.common.handle.value();
        for record in self.read_owned(&polyline.owned, owner) {
            match record {
                Record::Vertex(vertex) => polyline.vertices.push(vertex),
                Record::PolyfaceFace(face) => polyline.faces.push(face),
                other => self.notifications.warn(format!(
                    "Polyline {:#X} owns a {} record",
                    owner,
                    other.type_name()
                )),
            }
        }
        self.read_seqend(polyline.seqend, owner)
    }

    fn read_attributes(&mut self, insert: &mut Insert) -> Option<u64> {
        let owner = insert.common.handle.value();
        for record in self.read_owned(&insert.owned, owner) {
            match record {
                Record::Attribute(attribute) => insert.attributes.push(attribute),
                other => self.notifications.warn(format!(
                    "Insert {:#X} owns a {} record",
                    owner,
                    other.type_name()
                )),
            }
        }
        self.read_seqend(insert.seqend, owner)
    }
}
