//! CAD document structure

use crate::blocks::{self, BlockDefinition, Blocks};
use crate::database::EntityDb;
use crate::entities::{DxfEntity, EntityKind};
use crate::error::{DxfError, Result};
use crate::header::HeaderVariables;
use crate::io::dxf::reader::RawSection;
use crate::io::dxf::tag::Tag;
use crate::layouts::{Layout, Layouts};
use crate::notification::NotificationCollection;
use crate::objects::{self, Objects};
use crate::tables::{TableKind, TableView, TableViewMut, Tables, TextStyleTable, ViewportTable};
use crate::types::{DxfVersion, Handle, Vector3};

mod structure;
use encoding_rs::Encoding;

/// A DXF document: header, tables, blocks, layouts and objects.
///
/// Every persisted object lives in one handle-keyed store; tables, blocks
/// and layouts refer to their members by handle.
#[derive(Debug, Clone)]
pub struct CadDocument {
    /// HEADER section variables
    pub header: HeaderVariables,
    version: DxfVersion,
    pub(crate) db: EntityDb,
    pub(crate) tables: Tables,
    pub(crate) blocks: Blocks,
    pub(crate) layouts: Layouts,
    pub(crate) objects: Objects,
    /// CLASSES section records, written back for R2000+
    pub(crate) classes: Vec<Vec<Tag>>,
    /// Sections this library does not interpret (THUMBNAILIMAGE, ...)
    pub(crate) unknown_sections: Vec<RawSection>,
    /// Tables of unknown name: the TABLE head followed by the entries
    pub(crate) unknown_tables: Vec<RawSection>,
    encoding: &'static Encoding,
    upgraded_from: Option<DxfVersion>,
    /// Notifications collected during the last load
    pub notifications: NotificationCollection,
}

impl CadDocument {
    /// Create a new document (AutoCAD 2018 format)
    pub fn new() -> Self {
        Self::with_version(DxfVersion::default())
    }

    /// Create a document with a specific version.
    ///
    /// Versions that cannot be written are normalized (R13/R14 to R2000,
    /// older releases to R12).
    pub fn with_version(version: DxfVersion) -> Self {
        let version = version.normalized();
        let mut doc = Self::empty(version);
        doc.header = HeaderVariables::for_version(version);
        let mut notes = NotificationCollection::new();
        if let Err(err) = doc.ensure_structure(&mut notes, false) {
            tracing::error!(%err, "failed to create document structure");
        }
        doc
    }

    /// A document without any tables, blocks or objects
    pub(crate) fn empty(version: DxfVersion) -> Self {
        CadDocument {
            header: HeaderVariables::new(),
            version,
            db: EntityDb::new(),
            tables: Tables::new(),
            blocks: Blocks::new(),
            layouts: Layouts::new(),
            objects: Objects::new(),
            classes: Vec::new(),
            unknown_sections: Vec::new(),
            unknown_tables: Vec::new(),
            encoding: encoding_rs::WINDOWS_1252,
            upgraded_from: None,
            notifications: NotificationCollection::new(),
        }
    }

    /// In-memory version; the default save version
    pub fn version(&self) -> DxfVersion {
        self.version
    }

    /// Change the save version (normalized like [`CadDocument::with_version`])
    pub fn set_version(&mut self, version: DxfVersion) {
        self.version = version.normalized();
        self.header.set_version(self.version);
    }

    /// Source version if the content was upgraded while loading
    pub fn upgraded_from(&self) -> Option<DxfVersion> {
        self.upgraded_from
    }

    pub(crate) fn set_upgraded_from(&mut self, version: DxfVersion) {
        self.upgraded_from = Some(version);
    }

    /// Text encoding for pre-R2007 output
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn set_encoding(&mut self, encoding: &'static Encoding) {
        self.encoding = encoding;
    }

    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    // ---- entity storage ----

    /// Entity, table entry or object by handle
    pub fn entity(&self, handle: Handle) -> Option<&DxfEntity> {
        self.db.get(handle)
    }

    pub fn entity_mut(&mut self, handle: Handle) -> Option<&mut DxfEntity> {
        self.db.get_mut(handle)
    }

    /// Number of stored entities, table entries and objects
    pub fn entity_count(&self) -> usize {
        self.db.len()
    }

    /// All stored entities, table entries and objects
    pub fn entities(&self) -> impl Iterator<Item = &DxfEntity> {
        self.db.iter()
    }

    /// Sub-entities (vertices, attributes, SEQEND) of `handle`
    pub fn children_of(&self, handle: Handle) -> Vec<&DxfEntity> {
        self.db
            .get(handle)
            .map(|e| e.children().iter().filter_map(|h| self.db.get(*h)).collect())
            .unwrap_or_default()
    }

    // ---- tables ----

    pub fn table(&self, kind: TableKind) -> TableView<'_> {
        TableView::new(self.tables.get(kind), &self.db)
    }

    pub fn table_mut(&mut self, kind: TableKind) -> TableViewMut<'_> {
        TableViewMut::new(self.tables.get_mut(kind), &mut self.db)
    }

    pub fn layers(&self) -> TableView<'_> {
        self.table(TableKind::Layer)
    }

    pub fn layers_mut(&mut self) -> TableViewMut<'_> {
        self.table_mut(TableKind::Layer)
    }

    pub fn viewports(&mut self) -> ViewportTable<'_> {
        ViewportTable::new(self.table_mut(TableKind::VPort))
    }

    pub fn text_styles(&mut self) -> TextStyleTable<'_> {
        TextStyleTable::new(self.table_mut(TableKind::TextStyle))
    }

    // ---- blocks ----

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Block definition by block name
    pub fn block(&self, name: &str) -> Option<&BlockDefinition> {
        self.tables
            .get(TableKind::BlockRecord)
            .handle_of(name)
            .and_then(|h| self.blocks.get(h))
    }

    /// Name of the block of `block_record`
    pub fn block_name(&self, block_record: Handle) -> Option<String> {
        self.db.get(block_record).map(DxfEntity::name)
    }

    /// Create an empty block definition, returns its block record handle
    pub fn new_block(&mut self, name: &str, base_point: Vector3) -> Result<Handle> {
        if blocks::is_layout_block(name) {
            return Err(DxfError::UnsupportedOperation(format!(
                "block name {} is reserved for layouts",
                name
            )));
        }
        self.create_block(name, base_point, false)
    }

    pub(crate) fn create_block(&mut self, name: &str, base_point: Vector3, paperspace: bool) -> Result<Handle> {
        let record = DxfEntity::new("BLOCK_RECORD").with("name", name)?;
        let block_record = self.table_mut(TableKind::BlockRecord).add_entry(record)?;
        self.add_block_entities(block_record, name, base_point, paperspace)?;
        Ok(block_record)
    }

    /// Add a graphical entity to the block `name`
    pub fn add_entity_to_block(&mut self, name: &str, entity: DxfEntity) -> Result<Handle> {
        let block_record = self
            .block(name)
            .map(|b| b.block_record)
            .ok_or_else(|| DxfError::EntryNotFound {
                table: "blocks".into(),
                name: name.to_string(),
            })?;
        self.attach(block_record, entity, Vec::new())
    }

    // ---- layouts ----

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    pub fn modelspace(&self) -> &Layout {
        self.layouts.modelspace()
    }

    /// The active paper space layout
    pub fn active_layout(&self) -> Option<&Layout> {
        self.layouts.active_layout()
    }

    /// Add a graphical entity to model space
    pub fn add_entity(&mut self, entity: DxfEntity) -> Result<Handle> {
        let block_record = self.layouts.modelspace().block_record();
        self.attach(block_record, entity, Vec::new())
    }

    /// Add a graphical entity to the layout `name`
    pub fn add_entity_to_layout(&mut self, name: &str, entity: DxfEntity) -> Result<Handle> {
        self.add_entity_with_children(name, entity, Vec::new())
    }

    /// Add an entity with sub-entities (POLYLINE with VERTEX, INSERT with
    /// ATTRIB). A SEQEND is appended when missing.
    pub fn add_entity_with_children(
        &mut self,
        layout: &str,
        entity: DxfEntity,
        mut children: Vec<DxfEntity>,
    ) -> Result<Handle> {
        let block_record = self.layouts.get(layout)?.block_record();
        if !children.is_empty() && children.last().map(DxfEntity::dxf_type) != Some("SEQEND") {
            children.push(DxfEntity::new("SEQEND"));
        }
        self.attach(block_record, entity, children)
    }

    /// Graphical entities of the layout `name`, in drawing order
    pub fn layout_entities(&self, name: &str) -> Result<Vec<&DxfEntity>> {
        let layout = self.layouts.get(name)?;
        Ok(self.block_entities(layout.block_record()))
    }

    pub fn modelspace_entities(&self) -> Vec<&DxfEntity> {
        self.block_entities(self.layouts.modelspace().block_record())
    }

    pub(crate) fn block_entities(&self, block_record: Handle) -> Vec<&DxfEntity> {
        self.blocks
            .get(block_record)
            .map(|b| b.entities.iter().filter_map(|h| self.db.get(*h)).collect())
            .unwrap_or_default()
    }

    /// Remove a graphical entity (and its sub-entities) from its block
    pub fn delete_entity(&mut self, handle: Handle) -> Result<()> {
        let block_record = self
            .blocks
            .owner_of(handle)
            .map(|b| b.block_record)
            .ok_or_else(|| DxfError::EntryNotFound {
                table: "entities".into(),
                name: handle.to_hex(),
            })?;
        if let Some(block) = self.blocks.get_mut(block_record) {
            block.entities.retain(|h| *h != handle);
        }
        self.db.remove_tree(handle);
        Ok(())
    }

    /// Put `entity` and its sub-entities into the block of `block_record`
    /// under new handles
    pub(crate) fn attach(
        &mut self,
        block_record: Handle,
        mut entity: DxfEntity,
        children: Vec<DxfEntity>,
    ) -> Result<Handle> {
        if !entity.is_opaque() && entity.kind() != Some(EntityKind::Graphic) {
            return Err(DxfError::UnsupportedOperation(format!(
                "{} is not a graphical entity",
                entity.dxf_type()
            )));
        }
        if !self.blocks.contains(block_record) {
            return Err(DxfError::EntryNotFound {
                table: "blocks".into(),
                name: block_record.to_hex(),
            });
        }
        let paperspace = self
            .layouts
            .by_block_record(block_record)
            .map(|l| !l.is_modelspace());

        let handle = self.db.next_handle();
        entity.set_handle(handle);
        entity.set_owner(block_record);
        set_space(&mut entity, paperspace)?;

        let mut child_handles = Vec::with_capacity(children.len());
        for mut child in children {
            child.set_handle(Handle::NULL);
            child.set_owner(handle);
            set_space(&mut child, paperspace)?;
            child_handles.push(self.db.add(child));
        }
        *entity.children_mut() = child_handles;
        self.db.insert(entity)?;
        if let Some(block) = self.blocks.get_mut(block_record) {
            block.entities.push(handle);
        }
        Ok(handle)
    }

    /// Create a paper space layout
    pub fn new_layout(&mut self, name: &str) -> Result<&Layout> {
        if name.trim().is_empty() {
            return Err(DxfError::UnsupportedOperation("layout name must not be empty".into()));
        }
        if self.layouts.contains(name) {
            return Err(DxfError::DuplicateEntry {
                table: "layouts".into(),
                name: name.to_string(),
            });
        }
        let block_name = self.free_paper_space_name();
        let block_record = self.create_block(&block_name, Vector3::ZERO, true)?;
        let taborder = self.layouts.len() as i64;
        let object = self.create_layout_object(name, block_record, taborder)?;
        self.layouts
            .add_paperspace(Layout::new(name.trim(), block_record, object))?;
        self.layouts.get(name)
    }

    fn free_paper_space_name(&self) -> String {
        let records = self.tables.get(TableKind::BlockRecord);
        if !records.has_entry(blocks::PAPER_SPACE) {
            return blocks::PAPER_SPACE.to_string();
        }
        (0..)
            .map(|i| format!("{}{}", blocks::PAPER_SPACE, i))
            .find(|n| !records.has_entry(n))
            .unwrap_or_else(|| blocks::PAPER_SPACE.to_string())
    }

    /// LAYOUT object linked into `ACAD_LAYOUT`
    pub(crate) fn create_layout_object(&mut self, name: &str, block_record: Handle, taborder: i64) -> Result<Handle> {
        let layout_dict = self.named_dictionary(objects::ACAD_LAYOUT);
        let mut layout = DxfEntity::new("LAYOUT")
            .with("name", name.trim())?
            .with("block_record", block_record)?
            .with("taborder", taborder)?;
        if taborder == 0 {
            layout.set("layout_flags", 1)?;
        } else {
            layout.set("layout_flags", 0)?;
        }
        layout.set_owner(layout_dict.unwrap_or(Handle::NULL));
        let handle = self.db.add(layout);
        self.objects.push(handle);
        if let Some(dict) = layout_dict.and_then(|h| self.db.get_mut(h)) {
            objects::dictionary_set(dict, name.trim(), handle);
        }
        if let Some(record) = self.db.get_mut(block_record) {
            record.set("layout", handle)?;
        }
        Ok(handle)
    }

    /// Rename a paper space layout
    pub fn rename_layout(&mut self, old: &str, new: &str) -> Result<()> {
        let layout = self.layouts.get(old)?.clone();
        if layout.is_modelspace() {
            return Err(DxfError::UnsupportedOperation("the model space layout cannot be renamed".into()));
        }
        if new.trim().is_empty() {
            return Err(DxfError::UnsupportedOperation("layout name must not be empty".into()));
        }
        if self.layouts.contains(new) && !old.trim().eq_ignore_ascii_case(new.trim()) {
            return Err(DxfError::DuplicateEntry {
                table: "layouts".into(),
                name: new.to_string(),
            });
        }
        if let Some(object) = self.db.get_mut(layout.object()) {
            object.set("name", new.trim())?;
        }
        if let Some(dict) = self
            .named_dictionary(objects::ACAD_LAYOUT)
            .and_then(|h| self.db.get_mut(h))
        {
            objects::dictionary_rename(dict, layout.name(), new.trim());
        }
        self.layouts.rename_paperspace(old, new)
    }

    /// Delete a paper space layout and all of its entities.
    ///
    /// Model space and the last paper space layout cannot be deleted.
    pub fn delete_layout(&mut self, name: &str) -> Result<()> {
        let layout = self.layouts.get(name)?.clone();
        if layout.is_modelspace() {
            return Err(DxfError::UnsupportedOperation("the model space layout cannot be deleted".into()));
        }
        if self.layouts.paperspace().count() < 2 {
            return Err(DxfError::UnsupportedOperation("the last paper space layout cannot be deleted".into()));
        }
        let was_active = self.layouts.active_layout().map(Layout::name) == Some(layout.name());
        if was_active {
            let next = self
                .layouts
                .paperspace()
                .find(|l| l.name() != layout.name())
                .map(|l| l.name().to_string());
            if let Some(next) = next {
                self.set_active_layout(&next)?;
            }
        }

        let block_record = layout.block_record();
        if let Some(block) = self.blocks.remove(block_record) {
            for handle in block.entities {
                self.db.remove_tree(handle);
            }
            self.db.remove(block.begin);
            self.db.remove(block.end);
        }
        self.tables
            .get_mut(TableKind::BlockRecord)
            .remove_handle(block_record);
        self.db.remove(block_record);
        self.db.remove(layout.object());
        self.objects.remove(layout.object());
        if let Some(dict) = self
            .named_dictionary(objects::ACAD_LAYOUT)
            .and_then(|h| self.db.get_mut(h))
        {
            objects::dictionary_remove(dict, layout.name());
        }
        self.layouts.remove_paperspace(layout.name())?;
        Ok(())
    }

    /// Make `name` the active paper space layout.
    ///
    /// The active layout always uses the block `*Paper_Space`; the block
    /// names of the old and the new active layout are swapped.
    pub fn set_active_layout(&mut self, name: &str) -> Result<()> {
        let target = self.layouts.get(name)?.clone();
        if target.is_modelspace() {
            return Err(DxfError::UnsupportedOperation("model space is not a paper space layout".into()));
        }
        let current = match self.layouts.active_layout() {
            Some(current) if current.name() != target.name() => current.clone(),
            _ => return self.layouts.set_active(name),
        };
        let target_block = self.block_name(target.block_record()).unwrap_or_default();
        let current_block = self.block_name(current.block_record()).unwrap_or_default();

        let records = self.tables.get_mut(TableKind::BlockRecord);
        let swap = "\u{1}SWAP";
        records.rename_key(&current_block, swap)?;
        records.rename_key(&target_block, &current_block)?;
        records.rename_key(swap, &target_block)?;

        self.rename_block(current.block_record(), &target_block)?;
        self.rename_block(target.block_record(), &current_block)?;
        self.layouts.set_active(name)
    }

    /// Set the name of a block record and its BLOCK entity
    fn rename_block(&mut self, block_record: Handle, name: &str) -> Result<()> {
        if let Some(record) = self.db.get_mut(block_record) {
            record.set("name", name)?;
        }
        let begin = self.blocks.get(block_record).map(|b| b.begin);
        if let Some(begin) = begin.and_then(|h| self.db.get_mut(h)) {
            begin.set("name", name)?;
            if begin.has("name2") {
                begin.set("name2", name)?;
            }
        }
        Ok(())
    }

    // ---- objects ----

    pub fn objects(&self) -> &Objects {
        &self.objects
    }

    /// The root dictionary
    pub fn root_dictionary(&self) -> Option<&DxfEntity> {
        self.objects.root().and_then(|h| self.db.get(h))
    }

    /// Handle of a dictionary linked in the root dictionary
    pub fn named_dictionary(&self, name: &str) -> Option<Handle> {
        self.root_dictionary()
            .and_then(|root| objects::dictionary_get(root, name))
            .filter(|h| self.db.contains(*h))
    }
}

/// Set or clear the paper space flag of a new entity
fn set_space(entity: &mut DxfEntity, paperspace: Option<bool>) -> Result<()> {
    if entity.is_opaque() {
        return Ok(());
    }
    match paperspace {
        Some(true) => entity.set("paperspace", 1),
        Some(false) => {
            entity.unset("paperspace");
            Ok(())
        }
        None => Ok(()),
    }
}

impl Default for CadDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::tag::TagValue;
    use crate::types::Vector3;

    fn line() -> DxfEntity {
        DxfEntity::new("LINE")
            .with("start", Vector3::new(0.0, 0.0, 0.0))
            .unwrap()
            .with("end", Vector3::new(10.0, 0.0, 0.0))
            .unwrap()
    }

    #[test]
    fn test_new_document_structure() {
        let doc = CadDocument::new();
        assert_eq!(doc.version(), DxfVersion::AC1032);
        assert!(doc.layers().has_entry("0"));
        assert!(doc.table(TableKind::LineType).has_entry("continuous"));
        assert!(doc.table(TableKind::VPort).has_entry("*Active"));
        assert!(doc.block(blocks::MODEL_SPACE).is_some());
        assert!(doc.block(blocks::PAPER_SPACE).is_some());
        assert_eq!(doc.layouts().names(), ["Model", "Layout1"]);
        assert!(doc.named_dictionary(objects::ACAD_LAYOUT).is_some());
        assert!(doc.named_dictionary(objects::ACAD_GROUP).is_some());
    }

    #[test]
    fn test_add_entity_to_modelspace() {
        let mut doc = CadDocument::new();
        let handle = doc.add_entity(line()).unwrap();
        let entity = doc.entity(handle).unwrap();
        assert_eq!(entity.owner(), doc.modelspace().block_record());
        assert_eq!(doc.modelspace_entities().len(), 1);
        assert_eq!(
            doc.layouts().get_layout_for_entity(entity).unwrap().name(),
            "Model"
        );
    }

    #[test]
    fn test_add_entity_to_paperspace_sets_flag() {
        let mut doc = CadDocument::new();
        let handle = doc.add_entity_to_layout("Layout1", line()).unwrap();
        assert_eq!(doc.entity(handle).unwrap().get("paperspace"), Some(&TagValue::Int(1)));
        assert_eq!(doc.layout_entities("layout1").unwrap().len(), 1);
    }

    #[test]
    fn test_add_non_graphical_rejected() {
        let mut doc = CadDocument::new();
        let layer = DxfEntity::new("LAYER");
        assert!(matches!(doc.add_entity(layer), Err(DxfError::UnsupportedOperation(_))));
    }

    #[test]
    fn test_polyline_children() {
        let mut doc = CadDocument::new();
        let vertices = (0..3)
            .map(|i| {
                DxfEntity::new("VERTEX")
                    .with("location", Vector3::new(i as f64, 0.0, 0.0))
                    .unwrap()
            })
            .collect();
        let handle = doc
            .add_entity_with_children("Model", DxfEntity::new("POLYLINE"), vertices)
            .unwrap();
        let children = doc.children_of(handle);
        assert_eq!(children.len(), 4);
        assert_eq!(children[3].dxf_type(), "SEQEND");
        assert!(children.iter().all(|c| c.owner() == handle));

        doc.delete_entity(handle).unwrap();
        assert!(doc.modelspace_entities().is_empty());
        assert!(doc.entity(handle).is_none());
        assert!(doc.delete_entity(handle).is_err());
    }

    #[test]
    fn test_layout_lifecycle() {
        let mut doc = CadDocument::new();
        doc.new_layout("Sheet A").unwrap();
        assert!(matches!(doc.new_layout("sheet a"), Err(DxfError::DuplicateEntry { .. })));
        doc.add_entity_to_layout("Sheet A", line()).unwrap();

        doc.rename_layout("Sheet A", "Sheet B").unwrap();
        assert!(doc.layouts().get("Sheet B").is_ok());
        assert!(matches!(doc.rename_layout("Model", "X"), Err(DxfError::UnsupportedOperation(_))));
        assert!(matches!(doc.rename_layout("Sheet B", "Layout1"), Err(DxfError::DuplicateEntry { .. })));

        let count = doc.entity_count();
        doc.delete_layout("Sheet B").unwrap();
        assert!(doc.entity_count() < count);
        assert!(doc.layouts().get("Sheet B").is_err());
        assert!(matches!(doc.delete_layout("Layout1"), Err(DxfError::UnsupportedOperation(_))));
        assert!(matches!(doc.delete_layout("Model"), Err(DxfError::UnsupportedOperation(_))));
    }

    #[test]
    fn test_set_active_layout_swaps_blocks() {
        let mut doc = CadDocument::new();
        let sheet = doc.new_layout("Sheet").unwrap().block_record();
        assert_ne!(doc.block_name(sheet).as_deref(), Some(blocks::PAPER_SPACE));

        doc.set_active_layout("Sheet").unwrap();
        assert_eq!(doc.active_layout().unwrap().name(), "Sheet");
        assert_eq!(doc.block_name(sheet).as_deref(), Some(blocks::PAPER_SPACE));
        assert_eq!(doc.block(blocks::PAPER_SPACE).unwrap().block_record, sheet);
        let layout1 = doc.layouts().get("Layout1").unwrap().block_record();
        assert!(doc.block_name(layout1).unwrap().starts_with("*Paper_Space"));
        assert_ne!(doc.block_name(layout1).as_deref(), Some(blocks::PAPER_SPACE));
    }

    #[test]
    fn test_new_block() {
        let mut doc = CadDocument::new();
        doc.new_block("Door", Vector3::ZERO).unwrap();
        assert!(doc.new_block("door", Vector3::ZERO).is_err());
        assert!(doc.new_block("*Paper_Space7", Vector3::ZERO).is_err());
        doc.add_entity_to_block("DOOR", line()).unwrap();
        assert_eq!(doc.block("Door").unwrap().entities.len(), 1);
    }
}
