//! Symbol tables
//!
//! A [`Table`] maps case-insensitive entry names to the handles of table
//! entry entities stored in the document's [`EntityDb`]. Access goes through
//! [`TableView`] and [`TableViewMut`], which pair the table with the entity
//! storage.

use crate::database::EntityDb;
use crate::entities::DxfEntity;
use crate::error::{DxfError, Result};
use crate::io::dxf::tag::TagValue;
use crate::types::{DxfVersion, Handle};
use indexmap::IndexMap;

pub mod textstyle;
pub mod vport;

pub use textstyle::TextStyleTable;
pub use vport::ViewportTable;

/// The symbol tables of a DXF document, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    VPort,
    LineType,
    Layer,
    TextStyle,
    View,
    Ucs,
    AppId,
    DimStyle,
    BlockRecord,
}

impl TableKind {
    /// All tables in the order they are written
    pub const ALL: [TableKind; 9] = [
        TableKind::VPort,
        TableKind::LineType,
        TableKind::Layer,
        TableKind::TextStyle,
        TableKind::View,
        TableKind::Ucs,
        TableKind::AppId,
        TableKind::DimStyle,
        TableKind::BlockRecord,
    ];

    /// Table name (group code 2 of the TABLE head)
    pub fn name(self) -> &'static str {
        match self {
            TableKind::VPort => "VPORT",
            TableKind::LineType => "LTYPE",
            TableKind::Layer => "LAYER",
            TableKind::TextStyle => "STYLE",
            TableKind::View => "VIEW",
            TableKind::Ucs => "UCS",
            TableKind::AppId => "APPID",
            TableKind::DimStyle => "DIMSTYLE",
            TableKind::BlockRecord => "BLOCK_RECORD",
        }
    }

    /// DXF type of the entries; identical to the table name
    pub fn entry_type(self) -> &'static str {
        self.name()
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        TableKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    /// Oldest version that has the table
    pub fn min_version(self) -> DxfVersion {
        match self {
            TableKind::BlockRecord => DxfVersion::AC1015,
            _ => DxfVersion::AC1009,
        }
    }

    /// May several entries share the normalized name `key`?
    ///
    /// Viewport configurations consist of several VPORT entries with one
    /// name; shape file styles are STYLE entries without a name.
    pub fn allows_multiple(self, key: &str) -> bool {
        match self {
            TableKind::VPort => true,
            TableKind::TextStyle => key.is_empty(),
            _ => false,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Normalized table key of an entry name
pub fn table_key(name: &str) -> String {
    name.trim().to_uppercase()
}

/// A symbol table: entry handles by normalized name, in insertion order
#[derive(Debug, Clone)]
pub struct Table {
    kind: TableKind,
    head: Handle,
    entries: IndexMap<String, Vec<Handle>>,
}

impl Table {
    pub fn new(kind: TableKind) -> Self {
        Table {
            kind,
            head: Handle::NULL,
            entries: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Handle of the TABLE head entity
    pub fn head(&self) -> Handle {
        self.head
    }

    pub(crate) fn set_head(&mut self, head: Handle) {
        self.head = head;
    }

    /// Normalized key of `name`
    pub fn key(name: &str) -> String {
        table_key(name)
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(&table_key(name))
    }

    /// All handles stored under `name`
    pub fn handles_of(&self, name: &str) -> &[Handle] {
        self.entries
            .get(&table_key(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First handle stored under `name`
    pub fn handle_of(&self, name: &str) -> Option<Handle> {
        self.handles_of(name).first().copied()
    }

    /// All entry handles in insertion order
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.entries.values().flat_map(|v| v.iter().copied())
    }

    pub fn contains_handle(&self, handle: Handle) -> bool {
        self.handles().any(|h| h == handle)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Register `handle` under `name`
    pub(crate) fn insert(&mut self, name: &str, handle: Handle) -> Result<()> {
        let key = table_key(name);
        match self.entries.get_mut(&key) {
            Some(handles) if self.kind.allows_multiple(&key) => handles.push(handle),
            Some(_) => {
                return Err(DxfError::DuplicateEntry {
                    table: self.kind.name().to_string(),
                    name: name.to_string(),
                })
            }
            None => {
                self.entries.insert(key, vec![handle]);
            }
        }
        Ok(())
    }

    /// Unregister all handles of `name`
    pub(crate) fn remove_key(&mut self, name: &str) -> Option<Vec<Handle>> {
        self.entries.shift_remove(&table_key(name))
    }

    /// Unregister a single handle
    pub(crate) fn remove_handle(&mut self, handle: Handle) -> bool {
        let mut removed = false;
        for handles in self.entries.values_mut() {
            let before = handles.len();
            handles.retain(|h| *h != handle);
            removed |= handles.len() != before;
        }
        self.entries.retain(|_, v| !v.is_empty());
        removed
    }

    /// Move the handles of `old` to `new`, keeping the position
    pub(crate) fn rename_key(&mut self, old: &str, new: &str) -> Result<()> {
        let old_key = table_key(old);
        let new_key = table_key(new);
        if old_key == new_key {
            return Ok(());
        }
        if self.entries.contains_key(&new_key) {
            return Err(DxfError::DuplicateEntry {
                table: self.kind.name().to_string(),
                name: new.to_string(),
            });
        }
        let index = self
            .entries
            .get_index_of(&old_key)
            .ok_or_else(|| not_found(self.kind, old))?;
        let (_, handles) = self
            .entries
            .shift_remove_index(index)
            .ok_or_else(|| not_found(self.kind, old))?;
        self.entries.shift_insert(index, new_key, handles);
        Ok(())
    }
}

fn not_found(kind: TableKind, name: &str) -> DxfError {
    DxfError::EntryNotFound {
        table: kind.name().to_string(),
        name: name.to_string(),
    }
}

/// The nine symbol tables of a document
#[derive(Debug, Clone)]
pub struct Tables {
    tables: Vec<Table>,
}

impl Tables {
    pub fn new() -> Self {
        Tables {
            tables: TableKind::ALL.iter().map(|k| Table::new(*k)).collect(),
        }
    }

    pub fn get(&self, kind: TableKind) -> &Table {
        &self.tables[kind.index()]
    }

    pub fn get_mut(&mut self, kind: TableKind) -> &mut Table {
        &mut self.tables[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self::new()
    }
}

/// Read access to a table and its entries
#[derive(Clone, Copy)]
pub struct TableView<'a> {
    table: &'a Table,
    db: &'a EntityDb,
}

impl<'a> TableView<'a> {
    pub(crate) fn new(table: &'a Table, db: &'a EntityDb) -> Self {
        Self { table, db }
    }

    pub fn kind(&self) -> TableKind {
        self.table.kind
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.table.has_entry(name)
    }

    /// Entry named `name`; the first one for multi-entry names
    pub fn get(&self, name: &str) -> Result<&'a DxfEntity> {
        self.table
            .handle_of(name)
            .and_then(|h| self.db.get(h))
            .ok_or_else(|| not_found(self.table.kind, name))
    }

    /// All entries named `name`
    pub fn get_all(&self, name: &str) -> Vec<&'a DxfEntity> {
        self.table
            .handles_of(name)
            .iter()
            .filter_map(|h| self.db.get(*h))
            .collect()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &'a DxfEntity> + 'a {
        let db = self.db;
        self.table.handles().filter_map(move |h| db.get(h))
    }

    /// Entry names as stored in the entries
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Mutable access to a table and its entries
pub struct TableViewMut<'a> {
    pub(crate) table: &'a mut Table,
    pub(crate) db: &'a mut EntityDb,
}

impl<'a> TableViewMut<'a> {
    pub(crate) fn new(table: &'a mut Table, db: &'a mut EntityDb) -> Self {
        Self { table, db }
    }

    pub fn kind(&self) -> TableKind {
        self.table.kind
    }

    pub fn as_view(&self) -> TableView<'_> {
        TableView::new(self.table, self.db)
    }

    pub fn has_entry(&self, name: &str) -> bool {
        self.table.has_entry(name)
    }

    pub fn get(&self, name: &str) -> Result<&DxfEntity> {
        self.table
            .handle_of(name)
            .and_then(|h| self.db.get(h))
            .ok_or_else(|| not_found(self.table.kind, name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut DxfEntity> {
        let kind = self.table.kind;
        match self.table.handle_of(name) {
            Some(handle) => self.db.get_mut(handle).ok_or_else(|| not_found(kind, name)),
            None => Err(not_found(kind, name)),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Create a new entry named `name` with the given attributes.
    ///
    /// Fails with `DuplicateEntry` if the name exists, except for the names
    /// that may hold several entries (viewport configurations).
    pub fn new_entry(&mut self, name: &str, attribs: &[(&str, TagValue)]) -> Result<Handle> {
        let kind = self.table.kind;
        let key = table_key(name);
        if self.table.has_entry(name) && !kind.allows_multiple(&key) {
            return Err(DxfError::DuplicateEntry {
                table: kind.name().to_string(),
                name: name.to_string(),
            });
        }
        let mut entry = DxfEntity::new(kind.entry_type());
        entry.set("name", name)?;
        for (attrib, value) in attribs {
            entry.set(attrib, value.clone())?;
        }
        self.add_entry(entry)
    }

    /// Register a prepared entry entity
    pub(crate) fn add_entry(&mut self, mut entry: DxfEntity) -> Result<Handle> {
        entry.set_owner(self.table.head);
        let name = entry.name();
        let handle = self.db.next_handle();
        entry.set_handle(handle);
        self.table.insert(&name, handle)?;
        self.db.insert(entry)?;
        Ok(handle)
    }

    /// Remove all entries named `name`.
    ///
    /// References to the removed entries held by other objects are not
    /// touched.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let handles = self
            .table
            .remove_key(name)
            .ok_or_else(|| not_found(self.table.kind, name))?;
        for handle in handles {
            self.db.remove(handle);
        }
        Ok(())
    }

    /// Copy the entry `name` as `new_name`
    pub fn duplicate_entry(&mut self, name: &str, new_name: &str) -> Result<Handle> {
        let kind = self.table.kind;
        match kind {
            TableKind::VPort => {
                return Err(DxfError::UnsupportedOperation(
                    "duplicate_entry is not supported for the VPORT table".into(),
                ))
            }
            TableKind::BlockRecord => {
                return Err(DxfError::UnsupportedOperation(
                    "block records are copied together with their block definition".into(),
                ))
            }
            _ => {}
        }
        if self.table.has_entry(new_name) {
            return Err(DxfError::DuplicateEntry {
                table: kind.name().to_string(),
                name: new_name.to_string(),
            });
        }
        let mut copy = self.get(name)?.duplicate();
        copy.set("name", new_name)?;
        self.add_entry(copy)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DxfEntity> + '_ {
        let db = &*self.db;
        self.table.handles().filter_map(move |h| db.get(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_table() -> (Table, EntityDb) {
        let mut db = EntityDb::new();
        let mut table = Table::new(TableKind::Layer);
        let head = db.add(DxfEntity::new("TABLE"));
        table.set_head(head);
        (table, db)
    }

    #[test]
    fn test_table_kind_names() {
        assert_eq!(TableKind::from_name("ltype"), Some(TableKind::LineType));
        assert_eq!(TableKind::from_name("BLOCK_RECORD"), Some(TableKind::BlockRecord));
        assert_eq!(TableKind::from_name("CLASSES"), None);
        assert_eq!(TableKind::BlockRecord.min_version(), DxfVersion::AC1015);
    }

    #[test]
    fn test_new_and_get() {
        let (mut table, mut db) = layer_table();
        let mut view = TableViewMut::new(&mut table, &mut db);
        let handle = view
            .new_entry("Walls", &[("color", TagValue::Int(3))])
            .unwrap();
        assert!(view.has_entry("WALLS"));
        let walls = view.get("walls").unwrap();
        assert_eq!(walls.handle(), handle);
        assert_eq!(walls.get_int("color"), Some(3));
        assert_eq!(walls.owner(), table_head(&view));
    }

    fn table_head(view: &TableViewMut<'_>) -> Handle {
        view.table.head()
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let (mut table, mut db) = layer_table();
        let mut view = TableViewMut::new(&mut table, &mut db);
        view.new_entry("Walls", &[]).unwrap();
        assert!(matches!(
            view.new_entry("WALLS", &[]),
            Err(DxfError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn test_remove_and_not_found() {
        let (mut table, mut db) = layer_table();
        let mut view = TableViewMut::new(&mut table, &mut db);
        view.new_entry("Walls", &[]).unwrap();
        view.remove("walls").unwrap();
        assert!(!view.has_entry("Walls"));
        assert!(matches!(view.remove("Walls"), Err(DxfError::EntryNotFound { .. })));
        assert!(matches!(view.get("Walls"), Err(DxfError::EntryNotFound { .. })));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_duplicate_entry_copies() {
        let (mut table, mut db) = layer_table();
        let mut view = TableViewMut::new(&mut table, &mut db);
        let original = view.new_entry("Walls", &[("color", TagValue::Int(5))]).unwrap();
        let copy = view.duplicate_entry("Walls", "Doors").unwrap();
        assert_ne!(original, copy);
        let doors = view.get("Doors").unwrap();
        assert_eq!(doors.get_int("color"), Some(5));
        assert_eq!(doors.name(), "Doors");
        assert!(matches!(
            view.duplicate_entry("Walls", "doors"),
            Err(DxfError::DuplicateEntry { .. })
        ));
    }

    #[test]
    fn test_iteration_order() {
        let (mut table, mut db) = layer_table();
        let mut view = TableViewMut::new(&mut table, &mut db);
        for name in ["C", "A", "B"] {
            view.new_entry(name, &[]).unwrap();
        }
        let names: Vec<String> = view.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn test_rename_key_keeps_position() {
        let mut table = Table::new(TableKind::Layer);
        table.insert("A", Handle::new(1)).unwrap();
        table.insert("B", Handle::new(2)).unwrap();
        table.rename_key("a", "Z").unwrap();
        assert_eq!(table.handles().collect::<Vec<_>>(), [Handle::new(1), Handle::new(2)]);
        assert!(table.has_entry("z"));
        assert!(table.rename_key("z", "b").is_err());
    }
}
