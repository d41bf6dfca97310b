//! Non-graphical objects (OBJECTS section)
//!
//! The OBJECTS section is kept as an ordered list of object handles. The
//! first object is the root dictionary, which links the named dictionaries
//! (`ACAD_GROUP`, `ACAD_LAYOUT`, ...) of the document.

use crate::entities::DxfEntity;
use crate::io::dxf::tag::Tag;
use crate::types::Handle;

/// Root dictionary entry of the group dictionary
pub const ACAD_GROUP: &str = "ACAD_GROUP";
/// Root dictionary entry of the layout dictionary
pub const ACAD_LAYOUT: &str = "ACAD_LAYOUT";

/// Object handles in OBJECTS section order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objects {
    handles: Vec<Handle>,
}

impl Objects {
    pub fn new() -> Self {
        Self::default()
    }

    /// The root dictionary (first object)
    pub fn root(&self) -> Option<Handle> {
        self.handles.first().copied()
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.handles.contains(&handle)
    }

    pub(crate) fn push(&mut self, handle: Handle) {
        if !self.contains(handle) {
            self.handles.push(handle);
        }
    }

    /// Make `handle` the first object
    pub(crate) fn push_front(&mut self, handle: Handle) {
        self.handles.retain(|h| *h != handle);
        self.handles.insert(0, handle);
    }

    pub(crate) fn remove(&mut self, handle: Handle) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| *h != handle);
        before != self.handles.len()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

fn is_entry_handle(tag: &Tag) -> bool {
    tag.code == 350 || tag.code == 360
}

/// Entries of a DICTIONARY object: `3` name followed by a `350`/`360` handle
pub fn dictionary_entries(dictionary: &DxfEntity) -> Vec<(String, Handle)> {
    let mut entries = Vec::new();
    let mut name: Option<String> = None;
    for tag in dictionary.extra_tags() {
        if tag.code == 3 {
            name = tag.as_str().map(str::to_string);
        } else if is_entry_handle(tag) {
            if let (Some(n), Some(h)) = (name.take(), tag.value.as_handle()) {
                entries.push((n, h));
            }
        }
    }
    entries
}

/// Handle stored under `name` (case-insensitive)
pub fn dictionary_get(dictionary: &DxfEntity, name: &str) -> Option<Handle> {
    dictionary_entries(dictionary)
        .into_iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, h)| h)
}

/// Add or replace the entry `name`
pub fn dictionary_set(dictionary: &mut DxfEntity, name: &str, handle: Handle) {
    if dictionary_get(dictionary, name).is_some() {
        dictionary_remove(dictionary, name);
    }
    dictionary.push_extra(Tag::text(3, name));
    dictionary.push_extra(Tag::handle(350, handle));
}

/// Remove the entry `name`, returns whether it existed
pub fn dictionary_remove(dictionary: &mut DxfEntity, name: &str) -> bool {
    let mut removed = false;
    let mut drop_handle = false;
    dictionary.retain_extras(|tag| {
        if drop_handle && is_entry_handle(tag) {
            drop_handle = false;
            return false;
        }
        if tag.code == 3 && tag.as_str().map_or(false, |n| n.eq_ignore_ascii_case(name)) {
            drop_handle = true;
            removed = true;
            return false;
        }
        true
    });
    removed
}

/// Rename the entry `old` to `new`, keeping its handle
pub fn dictionary_rename(dictionary: &mut DxfEntity, old: &str, new: &str) -> bool {
    match dictionary_get(dictionary, old) {
        Some(handle) => {
            dictionary_remove(dictionary, old);
            dictionary_set(dictionary, new, handle);
            true
        }
        None => false,
    }
}
