//! HEADER section variables
//!
//! Variables are kept in file order as `$NAME -> tags`, so unknown variables
//! survive a load/save cycle unchanged.

use crate::io::dxf::tag::{Tag, TagValue};
use crate::types::{DxfVersion, Handle, Vector3};
use indexmap::IndexMap;

/// Ordered header variable map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderVariables {
    vars: IndexMap<String, Vec<Tag>>,
}

impl HeaderVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimal header of a new document
    pub fn for_version(version: DxfVersion) -> Self {
        let mut header = Self::new();
        header.set_version(version);
        header.set(
            "$DWGCODEPAGE",
            vec![Tag::text(3, "ANSI_1252")],
        );
        header.set_point("$INSBASE", Vector3::ZERO);
        header.set_point("$EXTMIN", Vector3::new(1e20, 1e20, 1e20));
        header.set_point("$EXTMAX", Vector3::new(-1e20, -1e20, -1e20));
        header.set("$HANDSEED", vec![Tag::text(5, "1")]);
        header
    }

    /// Build from the (compiled) HEADER section content.
    ///
    /// Tags before the first `9` tag are dropped.
    pub fn from_tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut header = Self::new();
        let mut current: Option<String> = None;
        for tag in tags {
            if tag.code == 9 {
                let name = tag.as_str().unwrap_or("").trim().to_string();
                header.vars.entry(name.clone()).or_default().clear();
                current = Some(name);
            } else if let Some(name) = &current {
                if let Some(values) = header.vars.get_mut(name) {
                    values.push(tag);
                }
            }
        }
        header
    }

    /// Render as `9 $NAME` followed by the value tags
    pub fn to_tags(&self) -> Vec<Tag> {
        let mut tags = Vec::new();
        for (name, values) in &self.vars {
            tags.push(Tag::text(9, name.clone()));
            tags.extend(values.iter().cloned());
        }
        tags
    }

    /// Value tags of `name` (`$` prefix included, case-insensitive)
    pub fn get(&self, name: &str) -> Option<&[Tag]> {
        self.vars
            .get(name)
            .or_else(|| {
                self.vars
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            })
            .map(Vec::as_slice)
    }

    /// First value of `name`
    pub fn value(&self, name: &str) -> Option<&TagValue> {
        self.get(name).and_then(|t| t.first()).map(|t| &t.value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(TagValue::as_str)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(TagValue::as_int)
    }

    pub fn get_real(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(TagValue::as_real)
    }

    pub fn get_point(&self, name: &str) -> Option<Vector3> {
        self.value(name).and_then(TagValue::as_point)
    }

    /// Replace the value tags of `name`, keeping its position
    pub fn set(&mut self, name: &str, tags: Vec<Tag>) {
        let key = self
            .vars
            .keys()
            .find(|k| k.eq_ignore_ascii_case(name))
            .cloned()
            .unwrap_or_else(|| name.to_string());
        self.vars.insert(key, tags);
    }

    /// Set a single-tag variable
    pub fn set_value(&mut self, name: &str, code: i32, value: impl Into<TagValue>) {
        self.set(name, vec![Tag::new(code, value)]);
    }

    pub fn set_point(&mut self, name: &str, point: Vector3) {
        self.set_value(name, 10, point);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<Tag>> {
        let key = self.vars.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned()?;
        self.vars.shift_remove(&key)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Variable names in file order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// `$ACADVER`; files without it are R12
    pub fn version(&self) -> DxfVersion {
        self.get_str("$ACADVER")
            .map(DxfVersion::from_version_string)
            .unwrap_or(DxfVersion::AC1009)
    }

    /// Set `$ACADVER`; always the first variable
    pub fn set_version(&mut self, version: DxfVersion) {
        self.remove("$ACADVER");
        self.vars.shift_insert(
            0,
            "$ACADVER".to_string(),
            vec![Tag::text(1, version.to_dxf_string())],
        );
    }

    /// `$HANDSEED`
    pub fn handseed(&self) -> Option<Handle> {
        self.value("$HANDSEED").and_then(TagValue::as_handle)
    }

    pub fn set_handseed(&mut self, seed: Handle) {
        self.set_value("$HANDSEED", 5, seed);
    }

    /// `$DWGCODEPAGE`
    pub fn code_page(&self) -> Option<&str> {
        self.get_str("$DWGCODEPAGE")
    }

    pub fn set_code_page(&mut self, code_page: &str) {
        self.set_value("$DWGCODEPAGE", 3, code_page);
    }

    /// `$INSBASE`, origin if unset
    pub fn insbase(&self) -> Vector3 {
        self.get_point("$INSBASE").unwrap_or(Vector3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Tag> {
        vec![
            Tag::text(9, "$ACADVER"),
            Tag::text(1, "AC1015"),
            Tag::text(9, "$INSBASE"),
            Tag::new(10, Vector3::new(1.0, 2.0, 0.0)),
            Tag::text(9, "$CUSTOMVAR"),
            Tag::new(70, 3i64),
            Tag::new(40, 0.5),
            Tag::text(9, "$HANDSEED"),
            Tag::text(5, "2F"),
        ]
    }

    #[test]
    fn test_round_trip_keeps_unknown() {
        let header = HeaderVariables::from_tags(sample());
        assert_eq!(header.len(), 4);
        assert_eq!(header.get("$CUSTOMVAR").unwrap().len(), 2);
        assert_eq!(header.to_tags(), sample());
    }

    #[test]
    fn test_typed_accessors() {
        let header = HeaderVariables::from_tags(sample());
        assert_eq!(header.version(), DxfVersion::AC1015);
        assert_eq!(header.handseed(), Some(Handle::new(0x2F)));
        assert_eq!(header.insbase(), Vector3::new(1.0, 2.0, 0.0));
        assert_eq!(header.get_int("$customvar"), Some(3));
        assert!(header.code_page().is_none());
    }

    #[test]
    fn test_missing_version_is_r12() {
        assert_eq!(HeaderVariables::new().version(), DxfVersion::AC1009);
    }

    #[test]
    fn test_set_version_first() {
        let mut header = HeaderVariables::new();
        header.set_code_page("ANSI_1252");
        header.set_version(DxfVersion::AC1018);
        assert_eq!(header.names().next(), Some("$ACADVER"));
        assert_eq!(header.version(), DxfVersion::AC1018);
        header.set_handseed(Handle::new(0x100));
        assert_eq!(header.get_str("$HANDSEED"), Some("100"));
    }
}
