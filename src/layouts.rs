//! Layouts: model space and paper space drawing areas
//!
//! A layout links a name and a LAYOUT object to the block record whose
//! block holds the layout's entities. The operations that change layouts
//! live on [`crate::CadDocument`] because they touch blocks, tables and
//! objects at the same time.

use crate::entities::DxfEntity;
use crate::error::{DxfError, Result};
use crate::types::Handle;
use indexmap::IndexMap;

/// Name of the model space layout
pub const MODEL: &str = "Model";

/// A model space or paper space layout
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    name: String,
    block_record: Handle,
    object: Handle,
}

impl Layout {
    pub fn new(name: impl Into<String>, block_record: Handle, object: Handle) -> Self {
        Self {
            name: name.into(),
            block_record,
            object,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// BLOCK_RECORD of the block holding the entities
    pub fn block_record(&self) -> Handle {
        self.block_record
    }

    /// LAYOUT object
    pub fn object(&self) -> Handle {
        self.object
    }

    pub fn is_modelspace(&self) -> bool {
        self.name.eq_ignore_ascii_case(MODEL)
    }
}

fn key(name: &str) -> String {
    name.trim().to_uppercase()
}

fn not_found(name: &str) -> DxfError {
    DxfError::EntryNotFound {
        table: "layouts".into(),
        name: name.to_string(),
    }
}

/// The layouts of a document: one model space and any number of paper
/// space layouts, one of which is active.
#[derive(Debug, Clone)]
pub struct Layouts {
    model: Layout,
    paper: IndexMap<String, Layout>,
    active: Option<String>,
}

impl Default for Layouts {
    fn default() -> Self {
        Self {
            model: Layout::new(MODEL, Handle::NULL, Handle::NULL),
            paper: IndexMap::new(),
            active: None,
        }
    }
}

impl Layouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modelspace(&self) -> &Layout {
        &self.model
    }

    /// Layout by name (case-insensitive)
    pub fn get(&self, name: &str) -> Result<&Layout> {
        if self.model.name.eq_ignore_ascii_case(name.trim()) {
            return Ok(&self.model);
        }
        self.paper.get(&key(name)).ok_or_else(|| not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// The active paper space layout
    pub fn active_layout(&self) -> Option<&Layout> {
        self.active.as_ref().and_then(|k| self.paper.get(k))
    }

    /// Layout whose block holds `entity`
    pub fn get_layout_for_entity(&self, entity: &DxfEntity) -> Option<&Layout> {
        self.by_block_record(entity.owner())
    }

    pub fn by_block_record(&self, block_record: Handle) -> Option<&Layout> {
        if block_record.is_null() {
            return None;
        }
        self.iter().find(|l| l.block_record == block_record)
    }

    /// Model space first, then the paper space layouts in tab order
    pub fn iter(&self) -> impl Iterator<Item = &Layout> {
        std::iter::once(&self.model).chain(self.paper.values())
    }

    pub fn paperspace(&self) -> impl Iterator<Item = &Layout> {
        self.paper.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(Layout::name).collect()
    }

    pub fn len(&self) -> usize {
        1 + self.paper.len()
    }

    pub(crate) fn set_modelspace(&mut self, layout: Layout) {
        self.model = layout;
    }

    pub(crate) fn add_paperspace(&mut self, layout: Layout) -> Result<()> {
        if self.contains(&layout.name) {
            return Err(DxfError::DuplicateEntry {
                table: "layouts".into(),
                name: layout.name,
            });
        }
        let k = key(&layout.name);
        if self.active.is_none() {
            self.active = Some(k.clone());
        }
        self.paper.insert(k, layout);
        Ok(())
    }

    pub(crate) fn remove_paperspace(&mut self, name: &str) -> Result<Layout> {
        let k = key(name);
        let layout = self.paper.shift_remove(&k).ok_or_else(|| not_found(name))?;
        if self.active.as_deref() == Some(k.as_str()) {
            self.active = self.paper.keys().next().cloned();
        }
        Ok(layout)
    }

    pub(crate) fn rename_paperspace(&mut self, old: &str, new: &str) -> Result<()> {
        let old_key = key(old);
        let index = self.paper.get_index_of(&old_key).ok_or_else(|| not_found(old))?;
        let (_, mut layout) = self
            .paper
            .shift_remove_index(index)
            .ok_or_else(|| not_found(old))?;
        layout.name = new.trim().to_string();
        let new_key = key(new);
        if self.active.as_deref() == Some(old_key.as_str()) {
            self.active = Some(new_key.clone());
        }
        self.paper.shift_insert(index, new_key, layout);
        Ok(())
    }

    pub(crate) fn set_active(&mut self, name: &str) -> Result<()> {
        let k = key(name);
        if !self.paper.contains_key(&k) {
            return Err(not_found(name));
        }
        self.active = Some(k);
        Ok(())
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layouts() -> Layouts {
        let mut layouts = Layouts::new();
        layouts.set_modelspace(Layout::new(MODEL, Handle::new(1), Handle::new(2)));
        layouts
            .add_paperspace(Layout::new("Layout1", Handle::new(3), Handle::new(4)))
            .unwrap();
        layouts
            .add_paperspace(Layout::new("Layout2", Handle::new(5), Handle::new(6)))
            .unwrap();
        layouts
    }

    #[test]
    fn test_lookup() {
        let layouts = layouts();
        assert!(layouts.get("model").unwrap().is_modelspace());
        assert_eq!(layouts.get("LAYOUT2").unwrap().block_record(), Handle::new(5));
        assert!(matches!(layouts.get("Layout3"), Err(DxfError::EntryNotFound { .. })));
        assert_eq!(layouts.names(), ["Model", "Layout1", "Layout2"]);
        assert_eq!(layouts.active_layout().unwrap().name(), "Layout1");
    }

    #[test]
    fn test_layout_for_entity() {
        let layouts = layouts();
        let mut line = DxfEntity::new("LINE");
        line.set_owner(Handle::new(5));
        assert_eq!(layouts.get_layout_for_entity(&line).unwrap().name(), "Layout2");
        line.set_owner(Handle::new(99));
        assert!(layouts.get_layout_for_entity(&line).is_none());
    }

    #[test]
    fn test_rename_and_remove() {
        let mut layouts = layouts();
        layouts.rename_paperspace("layout1", "Sheet").unwrap();
        assert_eq!(layouts.names(), ["Model", "Sheet", "Layout2"]);
        assert_eq!(layouts.active_layout().unwrap().name(), "Sheet");
        layouts.remove_paperspace("Sheet").unwrap();
        assert_eq!(layouts.active_layout().unwrap().name(), "Layout2");
        assert!(layouts.add_paperspace(Layout::new("MODEL", Handle::NULL, Handle::NULL)).is_err());
    }
}
