//! Builds a [`CadDocument`] from assembled sections

use super::section_reader::{RawSection, Record, SectionMap};
use super::tag_compiler::compile_tags;
use crate::blocks::{self, BlockDefinition};
use crate::document::CadDocument;
use crate::entities::{decode, DxfEntity, EntityKind};
use crate::error::{DxfError, Result};
use crate::header::HeaderVariables;
use crate::io::dxf::group_code::SUBCLASS_MARKER;
use crate::io::dxf::tag::Tag;
use crate::layouts::Layout;
use crate::notification::{NotificationCollection, NotificationType};
use crate::tables::{table_key, TableKind};
use crate::types::{DxfVersion, Handle};
use crate::upgrade;
use encoding_rs::Encoding;

/// Entity with its sub-entities (VERTEX/ATTRIB ... SEQEND)
type Compound = (DxfEntity, Vec<DxfEntity>);

/// Counters the recovery loader judges the result by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BuildStats {
    /// Records found in the ENTITIES section
    pub entity_records: usize,
    /// Entities (sub-entities included) placed into a layout
    pub entities_loaded: usize,
}

/// A BLOCK waiting for its ENDBLK
struct PendingBlock {
    begin: DxfEntity,
    entities: Vec<Compound>,
}

/// Section builders.
///
/// Sections are processed in dependency order (HEADER, CLASSES, TABLES,
/// BLOCKS, OBJECTS, ENTITIES) regardless of their order in the file. In
/// strict mode every structural problem is an error; in tolerant mode the
/// problem is repaired, recorded as a `Repair` notification and loading
/// goes on.
pub(crate) struct DocumentBuilder {
    tolerant: bool,
    doc: CadDocument,
    notes: NotificationCollection,
    source: DxfVersion,
    stats: BuildStats,
}

impl DocumentBuilder {
    pub fn new(tolerant: bool, encoding: &'static Encoding) -> Self {
        let mut doc = CadDocument::empty(DxfVersion::AC1009);
        doc.set_encoding(encoding);
        Self {
            tolerant,
            doc,
            notes: NotificationCollection::new(),
            source: DxfVersion::AC1009,
            stats: BuildStats::default(),
        }
    }

    pub fn build(mut self, mut sections: SectionMap) -> Result<(CadDocument, BuildStats)> {
        self.reserve_file_handles(&sections);
        self.load_header(sections.take("HEADER"))?;
        if let Some(section) = sections.take("CLASSES") {
            self.load_classes(section)?;
        }
        if let Some(section) = sections.take("TABLES") {
            self.load_tables(section)?;
        }
        if let Some(section) = sections.take("BLOCKS") {
            self.load_blocks(section)?;
        }
        if let Some(section) = sections.take("OBJECTS") {
            self.load_objects(section)?;
        }
        let report = self.source >= DxfVersion::MIN_MODERN;
        self.doc.ensure_structure(&mut self.notes, report)?;
        if let Some(section) = sections.take("ENTITIES") {
            self.load_entities(section)?;
        }
        for section in sections.into_sections() {
            self.load_unknown(section)?;
        }

        if upgrade::needs_upgrade(self.source) {
            upgrade::upgrade(&mut self.doc, self.source, &mut self.notes);
        }
        self.doc.notifications = self.notes;
        Ok((self.doc, self.stats))
    }

    fn repair(&mut self, message: String) {
        tracing::warn!(%message, "repair");
        self.notes.notify(NotificationType::Repair, message);
    }

    /// Error in strict mode, repair in tolerant mode
    fn problem(&mut self, message: String) -> Result<()> {
        if !self.tolerant {
            return Err(DxfError::Structure(message));
        }
        self.repair(message);
        Ok(())
    }

    /// Keep the handles used in the file out of the allocator's way
    fn reserve_file_handles(&mut self, sections: &SectionMap) {
        let mut max = 0u64;
        for name in sections.names() {
            let Some(section) = sections.get(name) else { continue };
            for record in &section.records {
                let prelude = record
                    .tags
                    .iter()
                    .skip(1)
                    .take_while(|t| t.code != SUBCLASS_MARKER);
                for tag in prelude.filter(|t| t.code == 5 || t.code == 105) {
                    if let Some(handle) = tag.as_str().and_then(Handle::from_hex) {
                        max = max.max(handle.value());
                    }
                }
            }
        }
        self.doc.db.reserve_seed(Handle::new(max + 1));
    }

    fn load_header(&mut self, section: Option<RawSection>) -> Result<()> {
        let Some(section) = section else {
            tracing::debug!("no HEADER section, loading as R12");
            return Ok(());
        };
        let tags = match compile_tags(section.head, section.line) {
            Ok(tags) => tags,
            Err(err) if self.tolerant => {
                self.repair(format!("dropped HEADER variables: {}", err));
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        self.doc.header = HeaderVariables::from_tags(tags);
        self.source = self.doc.header.version();
        if self.source == DxfVersion::Unknown {
            let found = self.doc.header.get_str("$ACADVER").unwrap_or("").to_string();
            self.notes.notify(
                NotificationType::Warning,
                format!("unknown version {:?}, loading as R12", found),
            );
        }
        if let Some(seed) = self.doc.header.handseed() {
            self.doc.db.reserve_seed(seed);
        }
        self.doc.set_version(self.source.normalized());
        tracing::debug!(version = ?self.source, variables = self.doc.header.len(), "loaded HEADER");
        Ok(())
    }

    fn load_classes(&mut self, section: RawSection) -> Result<()> {
        for record in section.records {
            if let Some(tags) = self.compile_record(record)? {
                self.doc.classes.push(tags);
            }
        }
        Ok(())
    }

    /// Compile the tags of one record; `None` if it was dropped.
    ///
    /// Damaged records lost a tag to the tagger and are always dropped.
    fn compile_record(&mut self, record: Record) -> Result<Option<Vec<Tag>>> {
        let dxf_type = record.dxf_type().to_string();
        let Record { line, tags, damage } = record;
        if let Some(reason) = damage {
            self.problem(format!("dropped {} near line {}: {}", dxf_type, line, reason))?;
            return Ok(None);
        }
        match compile_tags(tags, line) {
            Ok(tags) => Ok(Some(tags)),
            Err(err) if self.tolerant => {
                self.repair(format!("dropped {} near line {}: {}", dxf_type, line, err));
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Compile and decode one record; `None` if it was dropped
    fn decode_record(&mut self, record: Record) -> Result<Option<DxfEntity>> {
        let dxf_type = record.dxf_type().to_string();
        let line = record.line;
        let Some(tags) = self.compile_record(record)? else {
            return Ok(None);
        };
        if !self.tolerant {
            return decode(tags).map(Some);
        }

        let backup = tags.clone();
        match decode(tags) {
            Ok(entity) => Ok(Some(entity)),
            Err(DxfError::InvalidHandle(value)) => match decode(strip_invalid_handles(backup)) {
                Ok(mut entity) => {
                    if entity.handle().is_null() {
                        entity.set_handle(self.doc.db.next_handle());
                    }
                    self.repair(format!(
                        "replaced invalid handle {:?} of {} near line {}",
                        value, dxf_type, line
                    ));
                    Ok(Some(entity))
                }
                Err(err) => {
                    self.repair(format!("dropped {} near line {}: {}", dxf_type, line, err));
                    Ok(None)
                }
            },
            Err(err) => {
                self.repair(format!("dropped {} near line {}: {}", dxf_type, line, err));
                Ok(None)
            }
        }
    }

    fn decode_records(&mut self, records: Vec<Record>) -> Result<Vec<DxfEntity>> {
        let mut entities = Vec::with_capacity(records.len());
        for record in records {
            if let Some(entity) = self.decode_record(record)? {
                entities.push(entity);
            }
        }
        Ok(entities)
    }

    /// Put `entity` into the store under its own handle if possible
    fn store(&mut self, mut entity: DxfEntity) -> Result<Handle> {
        let handle = entity.handle();
        if handle.is_null() {
            if self.source >= DxfVersion::MIN_MODERN {
                self.repair(format!("assigned missing handle to {}", entity.dxf_type()));
            }
            return Ok(self.doc.db.add(entity));
        }
        if self.doc.db.contains(handle) {
            if !self.tolerant {
                return Err(DxfError::DuplicateHandle(handle));
            }
            self.repair(format!(
                "assigned new handle to {} with duplicate handle {}",
                entity.dxf_type(),
                handle
            ));
            entity.set_handle(Handle::NULL);
            return Ok(self.doc.db.add(entity));
        }
        self.doc.db.insert(entity)
    }

    // ---- TABLES ----

    fn load_tables(&mut self, section: RawSection) -> Result<()> {
        let mut current: Option<TableKind> = None;
        let mut unknown: Option<RawSection> = None;
        let mut skipping = false;
        for record in section.records {
            let dxf_type = record.dxf_type().to_ascii_uppercase();
            let line = record.line;
            match dxf_type.as_str() {
                "TABLE" => {
                    if let Some(kind) = current.take() {
                        self.problem(format!("{} table without ENDTAB", kind.name()))?;
                    }
                    if let Some(table) = unknown.take() {
                        self.problem(format!("{} table without ENDTAB", table.name))?;
                        self.doc.unknown_tables.push(table);
                    }
                    skipping = false;
                    let name = table_name(&record);
                    if name.is_empty() {
                        self.problem(format!("dropped TABLE without name near line {}", line))?;
                        skipping = true;
                        continue;
                    }
                    let Some(kind) = TableKind::from_name(&name) else {
                        tracing::debug!(table = %name, "keeping unknown table");
                        let mut table = RawSection::new(name, line);
                        match self.compile_record(record)? {
                            Some(tags) => {
                                table.records.push(Record::new(line, tags));
                                unknown = Some(table);
                            }
                            None => skipping = true,
                        }
                        continue;
                    };
                    let Some(head) = self.decode_record(record)? else {
                        skipping = true;
                        continue;
                    };
                    if self.doc.db.contains(self.doc.tables.get(kind).head()) {
                        self.problem(format!("duplicate {} table near line {}", kind.name(), line))?;
                    } else {
                        let handle = self.store(head)?;
                        self.doc.tables.get_mut(kind).set_head(handle);
                    }
                    current = Some(kind);
                }
                "ENDTAB" => {
                    if let Some(table) = unknown.take() {
                        self.doc.unknown_tables.push(table);
                    } else if current.take().is_none() && !skipping {
                        self.problem(format!("ENDTAB without TABLE near line {}", line))?;
                    }
                    skipping = false;
                }
                _ if skipping => {}
                _ if unknown.is_some() => {
                    if let Some(tags) = self.compile_record(record)? {
                        if let Some(table) = unknown.as_mut() {
                            table.records.push(Record::new(line, tags));
                        }
                    }
                }
                _ => {
                    let Some(kind) = current else {
                        self.problem(format!("dropped {} outside of a table near line {}", dxf_type, line))?;
                        continue;
                    };
                    if let Some(entry) = self.decode_record(record)? {
                        self.add_table_entry(kind, entry, line)?;
                    }
                }
            }
        }
        if let Some(kind) = current {
            self.problem(format!("{} table without ENDTAB", kind.name()))?;
        }
        if let Some(table) = unknown {
            self.problem(format!("{} table without ENDTAB", table.name))?;
            self.doc.unknown_tables.push(table);
        }
        tracing::debug!(entries = self.doc.tables.iter().map(|t| t.len()).sum::<usize>(), "loaded TABLES");
        Ok(())
    }

    fn add_table_entry(&mut self, kind: TableKind, mut entry: DxfEntity, line: usize) -> Result<()> {
        if !entry.dxf_type().eq_ignore_ascii_case(kind.entry_type()) {
            return self.problem(format!(
                "dropped {} in {} table near line {}",
                entry.dxf_type(),
                kind.name(),
                line
            ));
        }
        let name = entry.name();
        let table = self.doc.tables.get(kind);
        if table.has_entry(&name) && !kind.allows_multiple(&table_key(&name)) {
            return self.problem(format!(
                "dropped duplicate {} entry {:?} near line {}",
                kind.name(),
                name,
                line
            ));
        }
        if entry.owner().is_null() {
            entry.set_owner(table.head());
        }
        let handle = self.store(entry)?;
        self.doc.tables.get_mut(kind).insert(&name, handle)
    }

    // ---- BLOCKS ----

    fn load_blocks(&mut self, section: RawSection) -> Result<()> {
        let entities = self.decode_records(section.records)?;
        let grouped = self.group_compound(entities)?;
        let mut pending: Option<PendingBlock> = None;
        for (entity, children) in grouped {
            let dxf_type = entity.dxf_type().to_string();
            match dxf_type.as_str() {
                "BLOCK" => {
                    if let Some(open) = pending.take() {
                        let name = open.begin.name();
                        self.problem(format!("block {} without ENDBLK", name))?;
                        self.finish_block(open, None)?;
                    }
                    pending = Some(PendingBlock {
                        begin: entity,
                        entities: Vec::new(),
                    });
                }
                "ENDBLK" => match pending.take() {
                    Some(open) => self.finish_block(open, Some(entity))?,
                    None => self.problem("dropped ENDBLK without BLOCK".to_string())?,
                },
                _ => match pending.as_mut() {
                    Some(open) => open.entities.push((entity, children)),
                    None => self.problem(format!("dropped {} outside of a block", dxf_type))?,
                },
            }
        }
        if let Some(open) = pending.take() {
            let name = open.begin.name();
            self.problem(format!("block {} without ENDBLK", name))?;
            self.finish_block(open, None)?;
        }
        tracing::debug!(blocks = self.doc.blocks.len(), "loaded BLOCKS");
        Ok(())
    }

    fn finish_block(&mut self, block: PendingBlock, end: Option<DxfEntity>) -> Result<()> {
        let PendingBlock { mut begin, entities } = block;
        let mut name = begin.name();
        if self.source.is_legacy() {
            if let Some(mapped) = legacy_layout_block(&name) {
                begin.set("name", mapped)?;
                if begin.has("name2") {
                    begin.set("name2", mapped)?;
                }
                name = mapped.to_string();
            }
        }

        let records = self.doc.tables.get(TableKind::BlockRecord);
        let owner = begin.owner();
        let existing = if owner.is_valid() && records.contains_handle(owner) {
            Some(owner)
        } else {
            records.handle_of(&name)
        };
        let block_record = match existing {
            Some(handle) => handle,
            None => {
                if !self.source.is_legacy() {
                    self.problem(format!("block {} has no BLOCK_RECORD", name))?;
                }
                let record = DxfEntity::new("BLOCK_RECORD").with("name", name.as_str())?;
                self.doc.table_mut(TableKind::BlockRecord).add_entry(record)?
            }
        };
        if self.doc.blocks.contains(block_record) {
            return self.problem(format!("dropped duplicate block {}", name));
        }

        begin.set_owner(block_record);
        let begin = self.store(begin)?;
        let mut end = end.unwrap_or_else(|| DxfEntity::new("ENDBLK"));
        end.set_owner(block_record);
        let end = self.store(end)?;
        self.doc
            .blocks
            .insert(BlockDefinition::new(block_record, begin, end));
        for (entity, children) in entities {
            self.attach_loaded(block_record, entity, children)?;
        }
        Ok(())
    }

    /// Collect the sub-entities of POLYLINE and INSERT (with attributes)
    fn group_compound(&mut self, entities: Vec<DxfEntity>) -> Result<Vec<Compound>> {
        let mut grouped: Vec<Compound> = Vec::with_capacity(entities.len());
        let mut open: Option<Compound> = None;
        for entity in entities {
            let dxf_type = entity.dxf_type().to_string();
            if let Some((parent, mut children)) = open.take() {
                let member = if parent.dxf_type() == "POLYLINE" { "VERTEX" } else { "ATTRIB" };
                if dxf_type == member {
                    children.push(entity);
                    open = Some((parent, children));
                    continue;
                }
                if dxf_type == "SEQEND" {
                    children.push(entity);
                    grouped.push((parent, children));
                    continue;
                }
                self.problem(format!("{} without SEQEND", parent.dxf_type()))?;
                children.push(DxfEntity::new("SEQEND"));
                grouped.push((parent, children));
            }
            match dxf_type.as_str() {
                "POLYLINE" => open = Some((entity, Vec::new())),
                "INSERT" if entity.get_int("attribs_follow") == Some(1) => open = Some((entity, Vec::new())),
                "VERTEX" | "ATTRIB" | "SEQEND" => {
                    self.problem(format!("dropped {} outside of POLYLINE/INSERT", dxf_type))?;
                }
                _ => grouped.push((entity, Vec::new())),
            }
        }
        if let Some((parent, mut children)) = open.take() {
            self.problem(format!("{} without SEQEND", parent.dxf_type()))?;
            children.push(DxfEntity::new("SEQEND"));
            grouped.push((parent, children));
        }
        Ok(grouped)
    }

    /// Store a loaded entity with its sub-entities in a block
    fn attach_loaded(&mut self, block_record: Handle, mut entity: DxfEntity, children: Vec<DxfEntity>) -> Result<()> {
        entity.set_owner(block_record);
        let handle = self.store(entity)?;
        let mut child_handles = Vec::with_capacity(children.len());
        for mut child in children {
            child.set_owner(handle);
            child_handles.push(self.store(child)?);
        }
        if let Some(parent) = self.doc.db.get_mut(handle) {
            *parent.children_mut() = child_handles;
        }
        if let Some(block) = self.doc.blocks.get_mut(block_record) {
            block.entities.push(handle);
        }
        Ok(())
    }

    // ---- OBJECTS ----

    fn load_objects(&mut self, section: RawSection) -> Result<()> {
        let objects = self.decode_records(section.records)?;
        for object in objects {
            let handle = self.store(object)?;
            self.doc.objects.push(handle);
        }
        tracing::debug!(objects = self.doc.objects.len(), "loaded OBJECTS");
        Ok(())
    }

    // ---- ENTITIES ----

    fn load_entities(&mut self, section: RawSection) -> Result<()> {
        self.stats.entity_records += section.records.len();
        let entities = self.decode_records(section.records)?;
        let grouped = self.group_compound(entities)?;

        let model = self.doc.layouts.modelspace().block_record();
        let paper = self.doc.layouts.active_layout().map(Layout::block_record);
        for (entity, children) in grouped {
            if matches!(
                entity.kind(),
                Some(EntityKind::Structure | EntityKind::TableEntry | EntityKind::Object)
            ) {
                self.problem(format!("dropped {} in ENTITIES", entity.dxf_type()))?;
                continue;
            }
            let owner = entity.owner();
            let target = if owner.is_valid() && (owner == model || Some(owner) == paper) {
                owner
            } else if in_paperspace(&entity) {
                paper.unwrap_or(model)
            } else {
                model
            };
            let count = 1 + children.len();
            self.attach_loaded(target, entity, children)?;
            self.stats.entities_loaded += count;
        }
        tracing::debug!(
            records = self.stats.entity_records,
            loaded = self.stats.entities_loaded,
            "loaded ENTITIES"
        );
        Ok(())
    }

    /// Sections without a builder are kept for writing back
    fn load_unknown(&mut self, section: RawSection) -> Result<()> {
        tracing::debug!(section = %section.name, "keeping unknown section");
        let mut kept = RawSection::new(section.name, section.line);
        kept.head = match compile_tags(section.head.clone(), section.line) {
            Ok(head) => head,
            Err(_) => section.head,
        };
        for record in section.records {
            if let Some(reason) = &record.damage {
                let message = format!("dropped {} near line {}: {}", record.dxf_type(), record.line, reason);
                self.problem(message)?;
                continue;
            }
            let tags = match compile_tags(record.tags.clone(), record.line) {
                Ok(tags) => tags,
                Err(_) => record.tags,
            };
            kept.records.push(Record::new(record.line, tags));
        }
        self.doc.unknown_sections.push(kept);
        Ok(())
    }
}

/// Name of a TABLE head, read before the head is decoded
fn table_name(record: &Record) -> String {
    record
        .tags
        .iter()
        .find(|t| t.code == 2)
        .and_then(|t| t.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// R12 names of the layout blocks
fn legacy_layout_block(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("$MODEL_SPACE") {
        Some(blocks::MODEL_SPACE)
    } else if name.eq_ignore_ascii_case("$PAPER_SPACE") {
        Some(blocks::PAPER_SPACE)
    } else {
        None
    }
}

fn in_paperspace(entity: &DxfEntity) -> bool {
    entity.get_int("paperspace") == Some(1)
        || entity
            .extra_tags()
            .any(|t| t.code == 67 && t.value.as_int() == Some(1))
}

/// Drop handle tags of the prelude that are not hexadecimal
fn strip_invalid_handles(tags: Vec<Tag>) -> Vec<Tag> {
    let mut in_prelude = true;
    tags.into_iter()
        .enumerate()
        .filter(|(index, tag)| {
            if *index == 0 {
                return true;
            }
            if tag.code == SUBCLASS_MARKER {
                in_prelude = false;
            }
            let handle_code = matches!(tag.code, 5 | 105 | 330 | 360);
            !(in_prelude && handle_code && tag.as_str().and_then(Handle::from_hex).is_none())
        })
        .map(|(_, tag)| tag)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::reader::section_reader::SectionAssembler;
    use crate::io::dxf::reader::text_reader::DxfTextReader;

    fn sections(data: &str) -> SectionMap {
        SectionAssembler::new(true)
            .assemble(DxfTextReader::new(data.as_bytes()))
            .unwrap()
    }

    fn build(data: &str, tolerant: bool) -> Result<(CadDocument, BuildStats)> {
        DocumentBuilder::new(tolerant, encoding_rs::WINDOWS_1252).build(sections(data))
    }

    const R12: &str = "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1009\n0\nENDSEC\n\
0\nSECTION\n2\nTABLES\n0\nTABLE\n2\nLAYER\n70\n1\n0\nLAYER\n2\nWALLS\n70\n0\n62\n1\n6\nCONTINUOUS\n0\nENDTAB\n0\nENDSEC\n\
0\nSECTION\n2\nBLOCKS\n0\nBLOCK\n8\n0\n2\nDOOR\n70\n0\n10\n0.0\n20\n0.0\n30\n0.0\n3\nDOOR\n1\n\n0\nLINE\n8\n0\n10\n0.0\n20\n0.0\n30\n0.0\n11\n1.0\n21\n0.0\n31\n0.0\n0\nENDBLK\n8\n0\n0\nENDSEC\n\
0\nSECTION\n2\nENTITIES\n0\nLINE\n8\nWALLS\n10\n0.0\n20\n0.0\n30\n0.0\n11\n5.0\n21\n0.0\n31\n0.0\n\
0\nPOLYLINE\n8\n0\n66\n1\n10\n0.0\n20\n0.0\n30\n0.0\n0\nVERTEX\n8\n0\n10\n1.0\n20\n1.0\n30\n0.0\n0\nVERTEX\n8\n0\n10\n2.0\n20\n1.0\n30\n0.0\n0\nSEQEND\n8\n0\n\
0\nCIRCLE\n8\n0\n67\n1\n10\n0.0\n20\n0.0\n30\n0.0\n40\n2.0\n0\nENDSEC\n0\nEOF\n";

    #[test]
    fn test_build_r12() {
        let (doc, stats) = build(R12, false).unwrap();
        assert_eq!(doc.version(), DxfVersion::AC1009);
        assert!(doc.layers().has_entry("walls"));
        assert!(doc.layers().has_entry("0"));
        assert!(doc.block("Door").is_some());
        assert_eq!(doc.block("DOOR").unwrap().entities.len(), 1);
        assert_eq!(stats.entity_records, 6);
        assert_eq!(stats.entities_loaded, 6);
        assert_eq!(doc.modelspace_entities().len(), 2);
        let polyline = doc.modelspace_entities()[1].handle();
        assert_eq!(doc.children_of(polyline).len(), 3);
        assert_eq!(doc.layout_entities("Layout1").unwrap().len(), 1);
        assert!(doc.notifications().is_empty());
    }

    #[test]
    fn test_missing_seqend() {
        let data = R12.replace("0\nSEQEND\n8\n0\n", "");
        assert!(matches!(build(&data, false), Err(DxfError::Structure(_))));
        let (doc, _) = build(&data, true).unwrap();
        let polyline = doc.modelspace_entities()[1].handle();
        assert_eq!(doc.children_of(polyline).last().unwrap().dxf_type(), "SEQEND");
        assert_eq!(doc.notifications().of_type(NotificationType::Repair).len(), 1);
    }

    #[test]
    fn test_duplicate_layer_entry() {
        let data = R12.replace(
            "0\nENDTAB\n",
            "0\nLAYER\n2\nwalls\n70\n0\n62\n2\n6\nCONTINUOUS\n0\nENDTAB\n",
        );
        assert!(matches!(build(&data, false), Err(DxfError::Structure(_))));
        let (doc, _) = build(&data, true).unwrap();
        assert_eq!(doc.layers().get("WALLS").unwrap().get_int("color"), Some(1));
    }

    #[test]
    fn test_duplicate_handles() {
        let data = "0\nSECTION\n2\nENTITIES\n0\nPOINT\n5\n2A\n8\n0\n10\n0.0\n20\n0.0\n\
0\nPOINT\n5\n2A\n8\n0\n10\n1.0\n20\n0.0\n0\nENDSEC\n0\nEOF\n";
        assert!(matches!(build(data, false), Err(DxfError::DuplicateHandle(_))));
        let (doc, stats) = build(data, true).unwrap();
        assert_eq!(stats.entities_loaded, 2);
        let handles: Vec<Handle> = doc.modelspace_entities().iter().map(|e| e.handle()).collect();
        assert_eq!(handles[0], Handle::new(0x2A));
        assert_ne!(handles[1], Handle::new(0x2A));
    }

    #[test]
    fn test_invalid_handle_replaced() {
        let data = "0\nSECTION\n2\nENTITIES\n0\nPOINT\n5\nXYZ\n8\n0\n10\n0.0\n20\n0.0\n0\nENDSEC\n0\nEOF\n";
        assert!(build(data, false).is_err());
        let (doc, stats) = build(data, true).unwrap();
        assert_eq!(stats.entities_loaded, 1);
        assert!(doc.modelspace_entities()[0].handle().is_valid());
    }

    #[test]
    fn test_unknown_table_kept() {
        let data = "0\nSECTION\n2\nTABLES\n0\nTABLE\n2\nFANCY\n70\n1\n0\nFANCY\n2\nX\n0\nENDTAB\n\
0\nTABLE\n2\nLAYER\n70\n1\n0\nLAYER\n2\nWALLS\n70\n0\n62\n1\n6\nCONTINUOUS\n0\nENDTAB\n0\nENDSEC\n0\nEOF\n";
        let (doc, _) = build(data, false).unwrap();
        assert!(doc.notifications().is_empty());
        assert_eq!(doc.unknown_tables.len(), 1);
        let fancy = &doc.unknown_tables[0];
        assert_eq!(fancy.name, "FANCY");
        assert_eq!(fancy.records.len(), 2);
        assert_eq!(fancy.records[1].dxf_type(), "FANCY");
        assert_eq!(fancy.records[0].tags[2], Tag::new(70, 1i64));
        assert!(doc.layers().has_entry("WALLS"));
    }

    #[test]
    fn test_damaged_record_dropped() {
        let data = R12.replace("8\nWALLS\n10\n0.0", "8\nWALLS\n1O\n0.0");
        let (doc, stats) = build(&data, true).unwrap();
        assert_eq!(stats.entity_records, 6);
        assert_eq!(stats.entities_loaded, 5);
        let types: Vec<&str> = doc.modelspace_entities().iter().map(|e| e.dxf_type()).collect();
        assert_eq!(types, ["POLYLINE"]);
        let repairs = doc.notifications().of_type(NotificationType::Repair);
        assert_eq!(repairs.len(), 1);
        assert!(repairs[0].message.starts_with("dropped LINE"));
    }

    #[test]
    fn test_strip_invalid_handles() {
        let tags = vec![
            Tag::text(0, "LINE"),
            Tag::text(5, "ZZ"),
            Tag::text(330, "1F"),
            Tag::text(100, "AcDbEntity"),
            Tag::text(5, "not a handle but not in the prelude"),
        ];
        let cleaned = strip_invalid_handles(tags);
        assert_eq!(cleaned.len(), 4);
        assert_eq!(cleaned[1], Tag::text(330, "1F"));
    }
}
