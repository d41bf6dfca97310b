//! Block definitions
//!
//! A block definition is a BLOCK_RECORD table entry together with the
//! BLOCK/ENDBLK pair and the entities between them. Model space and the
//! paper space layouts are blocks as well (`*Model_Space`, `*Paper_Space*`).

use crate::types::Handle;
use indexmap::IndexMap;

/// Block name of the model space
pub const MODEL_SPACE: &str = "*Model_Space";
/// Block name of the active paper space layout
pub const PAPER_SPACE: &str = "*Paper_Space";

/// Is `name` the block of a layout?
pub fn is_layout_block(name: &str) -> bool {
    let upper = name.trim().to_ascii_uppercase();
    upper == MODEL_SPACE.to_ascii_uppercase() || upper.starts_with("*PAPER_SPACE")
}

pub fn is_model_space(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(MODEL_SPACE)
}

pub fn is_active_paper_space(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(PAPER_SPACE)
}

/// Handles making up one block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDefinition {
    /// BLOCK_RECORD entry
    pub block_record: Handle,
    /// BLOCK entity
    pub begin: Handle,
    /// ENDBLK entity
    pub end: Handle,
    /// Entities owned by the block, in drawing order
    pub entities: Vec<Handle>,
}

impl BlockDefinition {
    pub fn new(block_record: Handle, begin: Handle, end: Handle) -> Self {
        Self {
            block_record,
            begin,
            end,
            entities: Vec::new(),
        }
    }
}

/// All block definitions keyed by block record handle
#[derive(Debug, Clone, Default)]
pub struct Blocks {
    blocks: IndexMap<Handle, BlockDefinition>,
}

impl Blocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, block_record: Handle) -> Option<&BlockDefinition> {
        self.blocks.get(&block_record)
    }

    pub fn get_mut(&mut self, block_record: Handle) -> Option<&mut BlockDefinition> {
        self.blocks.get_mut(&block_record)
    }

    pub fn contains(&self, block_record: Handle) -> bool {
        self.blocks.contains_key(&block_record)
    }

    pub(crate) fn insert(&mut self, block: BlockDefinition) {
        self.blocks.insert(block.block_record, block);
    }

    pub(crate) fn remove(&mut self, block_record: Handle) -> Option<BlockDefinition> {
        self.blocks.shift_remove(&block_record)
    }

    /// Block definition holding the entity `handle`
    pub fn owner_of(&self, handle: Handle) -> Option<&BlockDefinition> {
        self.blocks.values().find(|b| b.entities.contains(&handle))
    }

    /// Block definitions in file order
    pub fn iter(&self) -> impl Iterator<Item = &BlockDefinition> {
        self.blocks.values()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_block_names() {
        assert!(is_layout_block("*Model_Space"));
        assert!(is_layout_block("*PAPER_SPACE"));
        assert!(is_layout_block("*Paper_Space3"));
        assert!(!is_layout_block("Door"));
        assert!(is_active_paper_space("*paper_space"));
        assert!(!is_active_paper_space("*Paper_Space0"));
    }

    #[test]
    fn test_owner_lookup() {
        let mut blocks = Blocks::new();
        let mut block = BlockDefinition::new(Handle::new(1), Handle::new(2), Handle::new(3));
        block.entities.push(Handle::new(10));
        blocks.insert(block);
        assert_eq!(
            blocks.owner_of(Handle::new(10)).map(|b| b.block_record),
            Some(Handle::new(1))
        );
        assert!(blocks.owner_of(Handle::new(11)).is_none());
    }
}
