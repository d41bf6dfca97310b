//! Mandatory document structure
//!
//! Every document has the nine table heads, the model space and active
//! paper space blocks, a handful of required table entries, the root
//! dictionary with `ACAD_GROUP` and `ACAD_LAYOUT`, and one LAYOUT object
//! per layout block. Missing parts are created here, both for new documents
//! and after loading a file.

use super::CadDocument;
use crate::blocks::{self, BlockDefinition};
use crate::entities::DxfEntity;
use crate::error::Result;
use crate::io::dxf::tag::TagValue;
use crate::layouts::{self, Layout};
use crate::notification::{NotificationCollection, NotificationType};
use crate::objects;
use crate::tables::TableKind;
use crate::types::{Handle, Vector3};

/// Table entries every document has
const REQUIRED_ENTRIES: &[(TableKind, &str)] = &[
    (TableKind::VPort, "*Active"),
    (TableKind::LineType, "ByBlock"),
    (TableKind::LineType, "ByLayer"),
    (TableKind::LineType, "Continuous"),
    (TableKind::Layer, "0"),
    (TableKind::TextStyle, "Standard"),
    (TableKind::AppId, "ACAD"),
    (TableKind::DimStyle, "Standard"),
];

impl CadDocument {
    /// Create whatever part of the mandatory structure is missing.
    ///
    /// With `report` set, each created part except the required table
    /// entries is recorded as a `Repair` notification.
    pub(crate) fn ensure_structure(&mut self, notes: &mut NotificationCollection, report: bool) -> Result<()> {
        let mut created = Vec::new();
        self.ensure_table_heads(&mut created)?;
        self.ensure_layout_blocks(&mut created)?;
        self.ensure_required_entries()?;
        self.ensure_dictionaries(&mut created)?;
        self.ensure_layouts(&mut created)?;
        if report {
            for message in created {
                notes.notify(NotificationType::Repair, message);
            }
        }
        Ok(())
    }

    fn ensure_table_heads(&mut self, created: &mut Vec<String>) -> Result<()> {
        for kind in TableKind::ALL {
            let mut head = self.tables.get(kind).head();
            if !self.db.contains(head) {
                head = self.db.add(DxfEntity::new("TABLE").with("name", kind.name())?);
                self.tables.get_mut(kind).set_head(head);
                created.push(format!("created missing {} table", kind.name()));
            }
            let entries: Vec<Handle> = self.tables.get(kind).handles().collect();
            for handle in entries {
                if let Some(entry) = self.db.get_mut(handle) {
                    if entry.owner() != head {
                        entry.set_owner(head);
                    }
                }
            }
        }
        Ok(())
    }

    fn ensure_layout_blocks(&mut self, created: &mut Vec<String>) -> Result<()> {
        for (name, paperspace) in [(blocks::MODEL_SPACE, false), (blocks::PAPER_SPACE, true)] {
            if !self.tables.get(TableKind::BlockRecord).has_entry(name) {
                self.create_block(name, Vector3::ZERO, paperspace)?;
                created.push(format!("created missing block {}", name));
            }
        }

        let orphans: Vec<(Handle, String)> = self
            .tables
            .get(TableKind::BlockRecord)
            .handles()
            .filter(|h| !self.blocks.contains(*h))
            .filter_map(|h| self.db.get(h).map(|e| (h, e.name())))
            .collect();
        for (block_record, name) in orphans {
            let paperspace = blocks::is_layout_block(&name) && !blocks::is_model_space(&name);
            self.add_block_entities(block_record, &name, Vector3::ZERO, paperspace)?;
            created.push(format!("created missing BLOCK/ENDBLK for {}", name));
        }
        Ok(())
    }

    /// BLOCK and ENDBLK of an existing block record
    pub(crate) fn add_block_entities(
        &mut self,
        block_record: Handle,
        name: &str,
        base_point: Vector3,
        paperspace: bool,
    ) -> Result<()> {
        let mut begin = DxfEntity::new("BLOCK")
            .with("name", name)?
            .with("name2", name)?
            .with("base_point", base_point)?;
        let mut end = DxfEntity::new("ENDBLK");
        if paperspace {
            begin.set("paperspace", 1)?;
            end.set("paperspace", 1)?;
        }
        begin.set_owner(block_record);
        end.set_owner(block_record);
        let begin = self.db.add(begin);
        let end = self.db.add(end);
        self.blocks
            .insert(BlockDefinition::new(block_record, begin, end));
        Ok(())
    }

    fn ensure_required_entries(&mut self) -> Result<()> {
        for &(kind, name) in REQUIRED_ENTRIES {
            if self.tables.get(kind).has_entry(name) {
                continue;
            }
            let attribs: Vec<(&str, TagValue)> = match (kind, name) {
                (TableKind::LineType, "Continuous") => vec![("description", "Solid line".into())],
                _ => Vec::new(),
            };
            self.table_mut(kind).new_entry(name, &attribs)?;
        }
        Ok(())
    }

    fn ensure_dictionaries(&mut self, created: &mut Vec<String>) -> Result<()> {
        let existing_root = self
            .objects
            .root()
            .filter(|h| self.db.get(*h).map_or(false, |e| e.dxf_type() == "DICTIONARY"));
        let root = match existing_root {
            Some(root) => root,
            None => {
                let root = self.db.add(DxfEntity::new("DICTIONARY"));
                self.objects.push_front(root);
                created.push("created missing root dictionary".to_string());
                root
            }
        };

        for name in [objects::ACAD_GROUP, objects::ACAD_LAYOUT] {
            if self.named_dictionary(name).is_some() {
                continue;
            }
            let mut dictionary = DxfEntity::new("DICTIONARY");
            dictionary.set_owner(root);
            let handle = self.db.add(dictionary);
            self.objects.push(handle);
            if let Some(root) = self.db.get_mut(root) {
                objects::dictionary_set(root, name, handle);
            }
            created.push(format!("created missing {} dictionary", name));
        }
        Ok(())
    }

    /// Rebuild the layout list from the LAYOUT objects
    fn ensure_layouts(&mut self, created: &mut Vec<String>) -> Result<()> {
        self.layouts.clear();
        let records = self.tables.get(TableKind::BlockRecord);

        let mut found: Vec<(i64, String, Handle, Handle)> = Vec::new();
        for &handle in self.objects.handles() {
            let Some(object) = self.db.get(handle) else { continue };
            if object.dxf_type() != "LAYOUT" {
                continue;
            }
            let name = object.name();
            match object.get_handle("block_record") {
                Some(br) if records.contains_handle(br) && self.blocks.contains(br) => {
                    let taborder = object.get_int("taborder").unwrap_or(0);
                    found.push((taborder, name, br, handle));
                }
                _ => created.push(format!("ignored layout {} without block", name)),
            }
        }
        found.sort_by_key(|(taborder, ..)| *taborder);

        let mut model_found = false;
        for (_, name, block_record, object) in found {
            let block_name = self.block_name(block_record).unwrap_or_default();
            if blocks::is_model_space(&block_name) {
                if !model_found {
                    self.layouts
                        .set_modelspace(Layout::new(layouts::MODEL, block_record, object));
                    model_found = true;
                }
                continue;
            }
            if self.layouts.by_block_record(block_record).is_some()
                || self.layouts.add_paperspace(Layout::new(name.as_str(), block_record, object)).is_err()
            {
                created.push(format!("ignored duplicate layout {}", name));
            }
        }

        let records = self.tables.get(TableKind::BlockRecord);
        if !model_found {
            if let Some(block_record) = records.handle_of(blocks::MODEL_SPACE) {
                let object = self.create_layout_object(layouts::MODEL, block_record, 0)?;
                self.layouts
                    .set_modelspace(Layout::new(layouts::MODEL, block_record, object));
                created.push("created missing model space layout".to_string());
            }
        }

        let records = self.tables.get(TableKind::BlockRecord);
        let mut unlinked: Vec<(Handle, String)> = records
            .handles()
            .filter_map(|h| self.db.get(h).map(|e| (h, e.name())))
            .filter(|(h, name)| {
                blocks::is_layout_block(name)
                    && !blocks::is_model_space(name)
                    && self.layouts.by_block_record(*h).is_none()
            })
            .collect();
        // the active paper space first, so that it becomes Layout1
        unlinked.sort_by_key(|(_, name)| !blocks::is_active_paper_space(name));
        for (block_record, block_name) in unlinked {
            let name = (1..)
                .map(|i| format!("Layout{}", i))
                .find(|n| !self.layouts.contains(n))
                .unwrap_or_else(|| block_name.clone());
            let taborder = self.layouts.len() as i64;
            let object = self.create_layout_object(&name, block_record, taborder)?;
            self.layouts
                .add_paperspace(Layout::new(name.as_str(), block_record, object))?;
            created.push(format!("created layout {} for block {}", name, block_name));
        }

        let active = self
            .layouts
            .paperspace()
            .find(|l| {
                self.block_name(l.block_record())
                    .map_or(false, |n| blocks::is_active_paper_space(&n))
            })
            .map(|l| l.name().to_string());
        if let Some(active) = active {
            self.layouts.set_active(&active)?;
        }

        self.link_layouts()
    }

    /// Owner, dictionary entry and block record link of every layout
    fn link_layouts(&mut self) -> Result<()> {
        let layout_dict = self.named_dictionary(objects::ACAD_LAYOUT);
        let links: Vec<(String, Handle, Handle)> = self
            .layouts
            .iter()
            .map(|l| (l.name().to_string(), l.block_record(), l.object()))
            .collect();
        for (name, block_record, object) in links {
            if let Some(dict) = layout_dict {
                if let Some(layout) = self.db.get_mut(object) {
                    if layout.owner() != dict {
                        layout.set_owner(dict);
                    }
                }
                if let Some(dict) = self.db.get_mut(dict) {
                    if objects::dictionary_get(dict, &name) != Some(object) {
                        objects::dictionary_set(dict, &name, object);
                    }
                }
            }
            if let Some(record) = self.db.get_mut(block_record) {
                if record.get_handle("layout") != Some(object) {
                    record.set("layout", object)?;
                }
            }
        }
        Ok(())
    }
}
