//! Viewport table
//!
//! Several VPORT entries may share one name; together they describe a tiled
//! viewport configuration. The configuration shown in the drawing window is
//! named `*ACTIVE`.

use super::{TableKind, TableViewMut};
use crate::entities::DxfEntity;
use crate::error::{DxfError, Result};
use crate::io::dxf::tag::TagValue;
use crate::types::Handle;
use std::ops::{Deref, DerefMut};

/// Name of the current viewport configuration
pub const ACTIVE_CONFIG: &str = "*ACTIVE";

/// Viewport specific operations on top of [`TableViewMut`]
pub struct ViewportTable<'a> {
    inner: TableViewMut<'a>,
}

impl<'a> ViewportTable<'a> {
    pub(crate) fn new(inner: TableViewMut<'a>) -> Self {
        debug_assert_eq!(inner.kind(), TableKind::VPort);
        Self { inner }
    }

    /// Add one viewport to the configuration `name`
    pub fn add(&mut self, name: &str, attribs: &[(&str, TagValue)]) -> Result<Handle> {
        self.inner.new_entry(name, attribs)
    }

    /// All viewports of the configuration `name`, in file order
    pub fn get_config(&self, name: &str) -> Vec<&DxfEntity> {
        self.inner
            .table
            .handles_of(name)
            .iter()
            .filter_map(|h| self.inner.db.get(*h))
            .collect()
    }

    /// The viewports of `*ACTIVE`
    pub fn active_config(&self) -> Vec<&DxfEntity> {
        self.get_config(ACTIVE_CONFIG)
    }

    /// Remove all viewports of the configuration `name`
    pub fn delete_config(&mut self, name: &str) -> Result<()> {
        self.inner.remove(name)
    }

    /// Configuration names in file order
    pub fn config_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in self.inner.iter() {
            let name = entry.name();
            if !names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                names.push(name);
            }
        }
        names
    }

    /// Viewport entries cannot be copied one by one
    pub fn duplicate_entry(&mut self, _name: &str, _new_name: &str) -> Result<Handle> {
        Err(DxfError::UnsupportedOperation(
            "duplicate_entry is not supported for the VPORT table".into(),
        ))
    }
}

impl<'a> Deref for ViewportTable<'a> {
    type Target = TableViewMut<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'a> DerefMut for ViewportTable<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
