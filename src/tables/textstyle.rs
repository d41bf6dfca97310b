//! Text style table
//!
//! Besides named text styles the STYLE table holds shape file entries: STYLE
//! records without a name, flagged as shape file (flags bit 1), whose font
//! field names the `.shx` file. They are looked up by file name.

use super::{TableKind, TableViewMut};
use crate::entities::DxfEntity;
use crate::error::{DxfError, Result};
use crate::io::dxf::tag::TagValue;
use crate::types::Handle;
use std::ops::{Deref, DerefMut};

/// STYLE flag bit: the entry describes a shape file
pub const SHAPE_FILE: i64 = 1;

/// Text style specific operations on top of [`TableViewMut`]
pub struct TextStyleTable<'a> {
    inner: TableViewMut<'a>,
}

/// Does `style` describe a shape file?
pub fn is_shape_file(style: &DxfEntity) -> bool {
    style.name().is_empty() && style.get_int("flags").unwrap_or(0) & SHAPE_FILE != 0
}

impl<'a> TextStyleTable<'a> {
    pub(crate) fn new(inner: TableViewMut<'a>) -> Self {
        debug_assert_eq!(inner.kind(), TableKind::TextStyle);
        Self { inner }
    }

    /// Create a text style using `font`
    pub fn add(&mut self, name: &str, font: &str) -> Result<Handle> {
        if name.trim().is_empty() {
            return Err(DxfError::UnsupportedOperation(
                "text styles need a name, use add_shx for shape files".into(),
            ));
        }
        self.inner
            .new_entry(name, &[("font", TagValue::from(font))])
    }

    /// Register the shape file `shx`
    pub fn add_shx(&mut self, shx: &str) -> Result<Handle> {
        if self.find_shx(shx).is_some() {
            return Err(DxfError::DuplicateEntry {
                table: TableKind::TextStyle.name().to_string(),
                name: shx.to_string(),
            });
        }
        self.inner.new_entry(
            "",
            &[
                ("flags", TagValue::Int(SHAPE_FILE)),
                ("font", TagValue::from(shx)),
                ("last_height", TagValue::Real(1.0)),
            ],
        )
    }

    /// Shape file entry of `shx`, created if missing
    pub fn get_shx(&mut self, shx: &str) -> Result<Handle> {
        match self.find_shx(shx) {
            Some(style) => Ok(style.handle()),
            None => self.add_shx(shx),
        }
    }

    /// Find the shape file entry of `shx` (case-insensitive file name)
    pub fn find_shx(&self, shx: &str) -> Option<&DxfEntity> {
        let shx = shx.trim();
        self.inner.iter().find(|style| {
            is_shape_file(style)
                && style
                    .get_str("font")
                    .map_or(false, |font| font.trim().eq_ignore_ascii_case(shx))
        })
    }

    /// Named text styles, without shape file entries
    pub fn styles(&self) -> impl Iterator<Item = &DxfEntity> + '_ {
        self.inner.iter().filter(|s| !is_shape_file(s))
    }
}

impl<'a> Deref for TextStyleTable<'a> {
    type Target = TableViewMut<'a>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<'a> DerefMut for TextStyleTable<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::EntityDb;
    use crate::tables::Table;

    #[test]
    fn test_shx_entries() {
        let mut db = EntityDb::new();
        let mut table = Table::new(TableKind::TextStyle);
        let mut styles = TextStyleTable::new(TableViewMut::new(&mut table, &mut db));
        styles.add("Standard", "txt").unwrap();
        let ltypeshp = styles.add_shx("ltypeshp.shx").unwrap();
        styles.add_shx("gdt.shx").unwrap();

        assert_eq!(styles.find_shx("LTYPESHP.SHX").unwrap().handle(), ltypeshp);
        assert_eq!(styles.get_shx("ltypeshp.shx").unwrap(), ltypeshp);
        assert!(styles.add_shx("ltypeshp.shx").is_err());
        assert!(styles.find_shx("missing.shx").is_none());
        assert_eq!(styles.styles().count(), 1);
        assert_eq!(styles.len(), 3);

        let created = styles.get_shx("new.shx").unwrap();
        assert_ne!(created, ltypeshp);
        assert_eq!(styles.len(), 4);
    }

    #[test]
    fn test_named_style_required() {
        let mut db = EntityDb::new();
        let mut table = Table::new(TableKind::TextStyle);
        let mut styles = TextStyleTable::new(TableViewMut::new(&mut table, &mut db));
        assert!(styles.add("  ", "txt").is_err());
        styles.add("Notes", "arial.ttf").unwrap();
        assert!(styles.add("NOTES", "arial.ttf").is_err());
    }
}
