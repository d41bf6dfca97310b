//! Handle-keyed storage of every persisted object of a document

use crate::entities::DxfEntity;
use crate::error::{DxfError, Result};
use crate::types::{Handle, HandleSeed};
use indexmap::IndexMap;

/// Arena of all entities, table entries and objects of a document.
///
/// Tables, blocks and layouts refer to entries by handle only; owner and
/// reactor handles stored in the entities are plain lookup keys.
#[derive(Debug, Clone, Default)]
pub struct EntityDb {
    entities: IndexMap<Handle, DxfEntity>,
    seed: HandleSeed,
}

impl EntityDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `entity` under a freshly allocated handle
    pub fn add(&mut self, mut entity: DxfEntity) -> Handle {
        let handle = self.next_handle();
        entity.set_handle(handle);
        self.entities.insert(handle, entity);
        handle
    }

    /// Store `entity` under its own handle.
    ///
    /// A null handle is replaced by a new one; a handle already in use is a
    /// `DuplicateHandle` error.
    pub fn insert(&mut self, mut entity: DxfEntity) -> Result<Handle> {
        let handle = entity.handle();
        if handle.is_null() {
            return Ok(self.add(entity));
        }
        if self.entities.contains_key(&handle) {
            return Err(DxfError::DuplicateHandle(handle));
        }
        self.seed.reserve(handle);
        entity.set_handle(handle);
        self.entities.insert(handle, entity);
        Ok(handle)
    }

    /// Allocate a handle that is not in use
    pub fn next_handle(&mut self) -> Handle {
        loop {
            let handle = self.seed.allocate();
            if !self.entities.contains_key(&handle) {
                return handle;
            }
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&DxfEntity> {
        self.entities.get(&handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut DxfEntity> {
        self.entities.get_mut(&handle)
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entities.contains_key(&handle)
    }

    /// Remove an entity; references to it elsewhere are left untouched
    pub fn remove(&mut self, handle: Handle) -> Option<DxfEntity> {
        self.entities.shift_remove(&handle)
    }

    /// Remove an entity together with its sub-entities
    pub fn remove_tree(&mut self, handle: Handle) -> Option<DxfEntity> {
        let entity = self.remove(handle)?;
        for child in entity.children() {
            self.remove(*child);
        }
        Some(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DxfEntity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DxfEntity> {
        self.entities.values_mut()
    }

    /// Next handle the seed hands out (`$HANDSEED`)
    pub fn handle_seed(&self) -> Handle {
        let max = self
            .entities
            .keys()
            .map(|h| h.value())
            .max()
            .unwrap_or(0);
        Handle::new(self.seed.peek().value().max(max + 1))
    }

    /// Never hand out handles below `seed`
    pub fn reserve_seed(&mut self, seed: Handle) {
        if seed.is_valid() {
            self.seed.reserve(Handle::new(seed.value() - 1));
        }
    }
}
