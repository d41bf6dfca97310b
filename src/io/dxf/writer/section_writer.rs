//! DXF section writers
//!
//! This module contains writers for each section of a DXF file:
//! HEADER, CLASSES, TABLES, BLOCKS, ENTITIES, OBJECTS and the sections
//! that were loaded without being interpreted.

use crate::blocks::{self, BlockDefinition};
use crate::document::CadDocument;
use crate::entities::{encode, DxfEntity};
use crate::error::Result;
use crate::io::dxf::code_page::code_page_name;
use crate::io::dxf::tag::{Tag, TagValue};
use crate::notification::{NotificationCollection, NotificationType};
use crate::tables::{Table, TableKind};
use crate::types::{DxfVersion, Handle};
use indexmap::IndexMap;

use super::stream_writer::{DxfStreamWriter, DxfStreamWriterExt};

/// Block names of the layout blocks in R12 files
fn legacy_block_name(name: &str) -> Option<&'static str> {
    if blocks::is_model_space(name) {
        Some("$MODEL_SPACE")
    } else if blocks::is_active_paper_space(name) {
        Some("$PAPER_SPACE")
    } else {
        None
    }
}

/// Writes all DXF sections for one target version
pub struct SectionWriter<'a, W: DxfStreamWriter> {
    writer: &'a mut W,
    version: DxfVersion,
    skipped: IndexMap<String, usize>,
    notifications: NotificationCollection,
}

impl<'a, W: DxfStreamWriter> SectionWriter<'a, W> {
    /// Create a new section writer
    pub fn new(writer: &'a mut W, version: DxfVersion) -> Self {
        Self {
            writer,
            version,
            skipped: IndexMap::new(),
            notifications: NotificationCollection::new(),
        }
    }

    fn legacy(&self) -> bool {
        self.version.is_legacy()
    }

    /// Write the complete document followed by EOF
    pub fn write_document(mut self, document: &CadDocument) -> Result<NotificationCollection> {
        self.write_header(document)?;
        if !self.legacy() {
            self.write_classes(document)?;
        }
        self.write_tables(document)?;
        self.write_blocks(document)?;
        self.write_entities(document)?;
        if !self.legacy() {
            self.write_objects(document)?;
        }
        self.write_unknown_sections(document)?;
        self.writer.write_eof()?;

        for (dxf_type, count) in std::mem::take(&mut self.skipped) {
            tracing::warn!(dxf_type = %dxf_type, count, version = ?self.version, "entities not supported by the target version were skipped");
            self.notifications.notify(
                NotificationType::Warning,
                format!(
                    "{} {} record(s) skipped, not supported by {}",
                    count,
                    dxf_type,
                    self.version.release()
                ),
            );
        }
        Ok(self.notifications)
    }

    /// Write the HEADER section.
    ///
    /// `$ACADVER`, `$HANDSEED` and `$DWGCODEPAGE` are refreshed, all other
    /// variables are written as loaded.
    pub fn write_header(&mut self, document: &CadDocument) -> Result<()> {
        let mut header = document.header.clone();
        header.set_version(self.version);
        header.set_handseed(document.db.handle_seed());
        if !self.version.is_utf8() {
            header.set_code_page(code_page_name(document.encoding()));
        } else if header.code_page().is_none() {
            header.set_code_page("ANSI_1252");
        }

        self.writer.write_section_start("HEADER")?;
        self.writer.write_tags(&header.to_tags())?;
        self.writer.write_section_end()
    }

    /// Write the CLASSES section
    pub fn write_classes(&mut self, document: &CadDocument) -> Result<()> {
        self.writer.write_section_start("CLASSES")?;
        for record in &document.classes {
            self.writer.write_tags(record)?;
        }
        self.writer.write_section_end()
    }

    /// Write the TABLES section, entry counts are recomputed
    pub fn write_tables(&mut self, document: &CadDocument) -> Result<()> {
        self.writer.write_section_start("TABLES")?;
        for kind in TableKind::ALL {
            if kind.min_version() > self.version {
                continue;
            }
            let table = document.tables.get(kind);
            self.write_table_head(document, table)?;
            for handle in table.handles() {
                if let Some(entry) = document.db.get(handle) {
                    self.write_record(entry)?;
                }
            }
            self.writer.write_string(0, "ENDTAB")?;
        }
        for table in &document.unknown_tables {
            for record in &table.records {
                self.writer.write_tags(&record.tags)?;
            }
            self.writer.write_string(0, "ENDTAB")?;
        }
        self.writer.write_section_end()
    }

    fn write_table_head(&mut self, document: &CadDocument, table: &Table) -> Result<()> {
        let count = table.len() as i64;
        match document.db.get(table.head()) {
            Some(head) => {
                let mut head = head.clone();
                head.set("count", count)?;
                self.write_record(&head)
            }
            None => {
                self.writer.write_string(0, "TABLE")?;
                self.writer.write_string(2, table.kind().name())?;
                self.writer.write_i16(70, count as i16)
            }
        }
    }

    /// Write the BLOCKS section.
    ///
    /// The blocks of model space and of the active paper space layout are
    /// written empty, their entities go to the ENTITIES section.
    pub fn write_blocks(&mut self, document: &CadDocument) -> Result<()> {
        self.writer.write_section_start("BLOCKS")?;
        for block in document.blocks.iter() {
            self.write_block(document, block)?;
        }
        self.writer.write_section_end()
    }

    fn write_block(&mut self, document: &CadDocument, block: &BlockDefinition) -> Result<()> {
        let name = document.block_name(block.block_record).unwrap_or_default();
        let in_entities = is_entity_space(document, block.block_record);
        let rename = if self.legacy() && blocks::is_layout_block(&name) {
            match legacy_block_name(&name) {
                Some(legacy) if in_entities => Some(legacy),
                _ => {
                    tracing::warn!(block = %name, "paper space layout dropped from R12 output");
                    self.notifications.notify(
                        NotificationType::Warning,
                        format!("layout block {} cannot be saved as R12", name),
                    );
                    return Ok(());
                }
            }
        } else {
            None
        };

        if let Some(begin) = document.db.get(block.begin) {
            let mut tags = encode(begin, self.version);
            if let Some(legacy) = rename {
                for tag in tags.iter_mut().filter(|t| t.code == 2 || t.code == 3) {
                    tag.value = TagValue::Str(legacy.to_string());
                }
            }
            self.writer.write_tags(&tags)?;
        }
        if !in_entities {
            for handle in &block.entities {
                self.write_entity(document, *handle)?;
            }
        }
        match document.db.get(block.end) {
            Some(end) => self.write_record(end),
            None => self.writer.write_string(0, "ENDBLK"),
        }
    }

    /// Write the ENTITIES section: model space, then the active layout
    pub fn write_entities(&mut self, document: &CadDocument) -> Result<()> {
        self.writer.write_section_start("ENTITIES")?;
        let mut spaces = vec![document.modelspace().block_record()];
        if let Some(active) = document.active_layout() {
            spaces.push(active.block_record());
        }
        for block_record in spaces {
            if let Some(block) = document.blocks.get(block_record) {
                for handle in &block.entities {
                    self.write_entity(document, *handle)?;
                }
            }
        }
        self.writer.write_section_end()
    }

    /// Write the OBJECTS section
    pub fn write_objects(&mut self, document: &CadDocument) -> Result<()> {
        self.writer.write_section_start("OBJECTS")?;
        for handle in document.objects.handles() {
            if let Some(object) = document.db.get(*handle) {
                if self.supported(object) {
                    self.write_record(object)?;
                }
            }
        }
        self.writer.write_section_end()
    }

    /// Write the preserved sections this library does not interpret
    pub fn write_unknown_sections(&mut self, document: &CadDocument) -> Result<()> {
        for section in &document.unknown_sections {
            self.writer.write_section_start(&section.name)?;
            self.writer.write_tags(&section.head)?;
            for record in &section.records {
                self.writer.write_tags(&record.tags)?;
            }
            self.writer.write_section_end()?;
        }
        Ok(())
    }

    /// Write an entity and its sub-entities
    fn write_entity(&mut self, document: &CadDocument, handle: Handle) -> Result<()> {
        let Some(entity) = document.db.get(handle) else {
            return Ok(());
        };
        if !self.supported(entity) {
            return Ok(());
        }
        self.write_record(entity)?;
        for child in entity.children() {
            if let Some(child) = document.db.get(*child) {
                self.write_record(child)?;
            }
        }
        Ok(())
    }

    /// Is the type known to the target version? Counts the skipped ones.
    fn supported(&mut self, entity: &DxfEntity) -> bool {
        match entity.schema() {
            Some(schema) if schema.min_version > self.version => {
                *self.skipped.entry(entity.dxf_type().to_string()).or_insert(0) += 1;
                false
            }
            _ => true,
        }
    }

    fn write_record(&mut self, entity: &DxfEntity) -> Result<()> {
        let tags: Vec<Tag> = encode(entity, self.version);
        self.writer.write_tags(&tags)
    }
}

/// Are the entities of this block written to the ENTITIES section?
fn is_entity_space(document: &CadDocument, block_record: Handle) -> bool {
    document.modelspace().block_record() == block_record
        || document
            .active_layout()
            .map_or(false, |l| l.block_record() == block_record)
}
