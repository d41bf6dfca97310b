//! Entities, table entries and objects
//!
//! Every persisted object of a document is a [`DxfEntity`]: a DXF type name,
//! a handle, an owner and a set of named attributes described by a static
//! [`EntitySchema`]. Tags the schema does not cover are kept next to the
//! attributes so that a load/save cycle reproduces them.

pub mod codec;
pub mod definitions;
pub mod schema;

pub use codec::{decode, encode};
pub use schema::{schema_for, AttribDef, AttribFlags, EntityKind, EntitySchema};

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::GroupCodeValueType;
use crate::io::dxf::tag::{Tag, TagValue};
use crate::types::{Handle, Vector3};
use crate::xdata::ExtendedData;
use std::collections::HashMap;

/// Attribute values by name
pub(crate) type AttribMap = HashMap<&'static str, TagValue, ahash::RandomState>;

/// Tags not mapped to an attribute
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraTags {
    /// Known subclass after which the tags are written, `None` = before the first
    pub anchor: Option<usize>,
    /// Marker of an unknown subclass heading the group
    pub marker: Option<String>,
    pub tags: Vec<Tag>,
}

/// Application defined group `102 {NAME` ... `102 }`
#[derive(Debug, Clone, PartialEq)]
pub struct AppData {
    pub name: String,
    pub tags: Vec<Tag>,
}

/// A DXF entity, table entry or object
#[derive(Debug, Clone, PartialEq)]
pub struct DxfEntity {
    dxf_type: String,
    schema: Option<&'static EntitySchema>,
    pub(crate) handle: Handle,
    pub(crate) owner: Handle,
    pub(crate) attribs: AttribMap,
    pub(crate) reactors: Vec<Handle>,
    pub(crate) xdictionary: Option<Handle>,
    pub(crate) app_data: Vec<AppData>,
    pub(crate) extras: Vec<ExtraTags>,
    pub(crate) marker_overrides: Vec<(usize, String)>,
    pub(crate) xdata: ExtendedData,
    pub(crate) embedded: Vec<Tag>,
    pub(crate) children: Vec<Handle>,
}

impl DxfEntity {
    /// Create an entity of `dxf_type` without handle and attributes.
    ///
    /// Unknown types produce an opaque entity.
    pub fn new(dxf_type: &str) -> Self {
        let schema = schema_for(dxf_type);
        Self {
            dxf_type: schema
                .map(|s| s.dxf_type.to_string())
                .unwrap_or_else(|| dxf_type.trim().to_string()),
            schema,
            handle: Handle::NULL,
            owner: Handle::NULL,
            attribs: AttribMap::default(),
            reactors: Vec::new(),
            xdictionary: None,
            app_data: Vec::new(),
            extras: Vec::new(),
            marker_overrides: Vec::new(),
            xdata: ExtendedData::new(),
            embedded: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with(mut self, name: &str, value: impl Into<TagValue>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn dxf_type(&self) -> &str {
        &self.dxf_type
    }

    pub fn schema(&self) -> Option<&'static EntitySchema> {
        self.schema
    }

    pub fn kind(&self) -> Option<EntityKind> {
        self.schema.map(|s| s.kind)
    }

    /// Unknown type, only raw tags are available
    pub fn is_opaque(&self) -> bool {
        self.schema.is_none()
    }

    pub fn is_graphic(&self) -> bool {
        self.kind() == Some(EntityKind::Graphic)
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: Handle) {
        self.handle = handle;
    }

    /// Handle of the owning block record, table or dictionary
    pub fn owner(&self) -> Handle {
        self.owner
    }

    pub fn set_owner(&mut self, owner: Handle) {
        self.owner = owner;
    }

    fn attrib_def(&self, name: &str) -> Result<&'static AttribDef> {
        self.schema
            .and_then(|s| s.attrib(name))
            .ok_or_else(|| DxfError::InvalidAttribute {
                dxf_type: self.dxf_type.clone(),
                name: name.to_string(),
            })
    }

    /// Explicitly set attribute value
    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.attribs.get(name)
    }

    /// Attribute value, falling back to the schema default
    pub fn get_or_default(&self, name: &str) -> Option<TagValue> {
        match self.attribs.get(name) {
            Some(value) => Some(value.clone()),
            None => self
                .schema
                .and_then(|s| s.attrib(name))
                .and_then(|a| a.default.to_value()),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.attribs.contains_key(name)
    }

    /// Set an attribute.
    ///
    /// The name must be defined by the schema of the entity type and the
    /// value must fit the attribute's group code.
    pub fn set(&mut self, name: &str, value: impl Into<TagValue>) -> Result<()> {
        let def = self.attrib_def(name)?;
        let value = normalize(value.into(), def.code).ok_or_else(|| DxfError::InvalidAttribute {
            dxf_type: self.dxf_type.clone(),
            name: name.to_string(),
        })?;
        self.attribs.insert(def.name, value);
        Ok(())
    }

    /// Remove an explicitly set attribute
    pub fn unset(&mut self, name: &str) -> Option<TagValue> {
        self.attribs.remove(name)
    }

    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get_or_default(name).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get_or_default(name).and_then(|v| v.as_int())
    }

    pub fn get_real(&self, name: &str) -> Option<f64> {
        self.get_or_default(name).and_then(|v| v.as_real())
    }

    pub fn get_point(&self, name: &str) -> Option<Vector3> {
        self.get_or_default(name).and_then(|v| v.as_point())
    }

    pub fn get_handle(&self, name: &str) -> Option<Handle> {
        self.get(name).and_then(|v| v.as_handle()).filter(|h| h.is_valid())
    }

    /// The `name` attribute of table entries, blocks and layouts, empty if unset
    pub fn name(&self) -> String {
        self.get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string()
    }

    /// Explicitly set attributes in canonical order
    pub fn attribs(&self) -> Vec<(&'static str, &TagValue)> {
        match self.schema {
            Some(schema) => schema
                .attribs()
                .filter_map(|a| self.attribs.get(a.name).map(|v| (a.name, v)))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Set unset attributes flagged for backfilling to their defaults.
    ///
    /// Returns the names of the attributes that were filled.
    pub fn backfill_defaults(&mut self) -> Vec<&'static str> {
        let mut filled = Vec::new();
        if let Some(schema) = self.schema {
            for def in schema.attribs().filter(|a| a.is_backfilled()) {
                if !self.attribs.contains_key(def.name) {
                    if let Some(value) = def.default.to_value() {
                        self.attribs.insert(def.name, value);
                        filled.push(def.name);
                    }
                }
            }
        }
        filled
    }

    pub fn reactors(&self) -> &[Handle] {
        &self.reactors
    }

    pub fn add_reactor(&mut self, handle: Handle) {
        if !self.reactors.contains(&handle) {
            self.reactors.push(handle);
        }
    }

    /// Extension dictionary handle
    pub fn xdictionary(&self) -> Option<Handle> {
        self.xdictionary
    }

    pub fn set_xdictionary(&mut self, handle: Option<Handle>) {
        self.xdictionary = handle;
    }

    pub fn app_data(&self) -> &[AppData] {
        &self.app_data
    }

    pub fn xdata(&self) -> &ExtendedData {
        &self.xdata
    }

    pub fn xdata_mut(&mut self) -> &mut ExtendedData {
        &mut self.xdata
    }

    /// Unmapped tag groups
    pub fn extras(&self) -> &[ExtraTags] {
        &self.extras
    }

    /// All unmapped tags in order
    pub fn extra_tags(&self) -> impl Iterator<Item = &Tag> {
        self.extras.iter().flat_map(|e| e.tags.iter())
    }

    /// Append an unmapped tag to the trailing payload.
    ///
    /// Used for repeated data such as dictionary entries or polyline vertices.
    pub fn push_extra(&mut self, tag: Tag) {
        let anchor = self
            .schema
            .map(|s| s.subclasses.len().saturating_sub(1));
        match self.extras.last_mut() {
            Some(last) if last.anchor == anchor && last.marker.is_none() => last.tags.push(tag),
            _ => self.extras.push(ExtraTags {
                anchor,
                marker: None,
                tags: vec![tag],
            }),
        }
    }

    /// Remove unmapped tags matching `predicate`
    pub fn retain_extras(&mut self, mut predicate: impl FnMut(&Tag) -> bool) {
        for group in &mut self.extras {
            group.tags.retain(|t| predicate(t));
        }
        self.extras.retain(|g| !g.tags.is_empty() || g.marker.is_some());
    }

    /// Handles of attached sub-entities (vertices, attributes and SEQEND)
    pub fn children(&self) -> &[Handle] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Handle> {
        &mut self.children
    }

    /// Embedded object tags (group 101 and following)
    pub fn embedded_object(&self) -> &[Tag] {
        &self.embedded
    }

    /// Copy without identity: no handle, owner, reactors, extension
    /// dictionary or children.
    pub fn duplicate(&self) -> Self {
        let mut copy = self.clone();
        copy.handle = Handle::NULL;
        copy.owner = Handle::NULL;
        copy.reactors.clear();
        copy.xdictionary = None;
        copy.children.clear();
        copy
    }
}

/// Coerce `value` to the value type of `code`, `None` if impossible
pub(crate) fn normalize(value: TagValue, code: i32) -> Option<TagValue> {
    let value_type = GroupCodeValueType::from_code(code);
    let point_code = crate::io::dxf::group_code::is_point_code(code);
    match value {
        TagValue::Point2(_) | TagValue::Point3(_) if point_code => Some(value),
        _ if point_code => None,
        TagValue::Str(text) => match value_type {
            GroupCodeValueType::String | GroupCodeValueType::Handle => Some(TagValue::Str(text)),
            GroupCodeValueType::Double => text.trim().parse().ok().map(TagValue::Real),
            GroupCodeValueType::Binary => None,
            _ => text.trim().parse().ok().map(TagValue::Int),
        },
        TagValue::Int(v) => match value_type {
            GroupCodeValueType::Double => Some(TagValue::Real(v as f64)),
            t if t.is_integer() => Some(TagValue::Int(v)),
            _ => None,
        },
        TagValue::Real(v) => match value_type {
            GroupCodeValueType::Double => Some(TagValue::Real(v)),
            t if t.is_integer() => Some(TagValue::Int(v as i64)),
            _ => None,
        },
        TagValue::Binary(_) if value_type == GroupCodeValueType::Binary => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector2;

    #[test]
    fn test_new_known_and_opaque() {
        let line = DxfEntity::new("LINE");
        assert!(!line.is_opaque());
        assert!(line.is_graphic());
        let proxy = DxfEntity::new("ACAD_PROXY_ENTITY");
        assert!(proxy.is_opaque());
        assert_eq!(proxy.dxf_type(), "ACAD_PROXY_ENTITY");
    }

    #[test]
    fn test_set_and_defaults() {
        let mut line = DxfEntity::new("LINE");
        assert_eq!(line.get_str("layer").as_deref(), Some("0"));
        assert_eq!(line.get_int("color"), Some(256));
        line.set("layer", "Walls").unwrap();
        line.set("color", 3).unwrap();
        line.set("start", Vector3::new(1.0, 2.0, 0.0)).unwrap();
        assert_eq!(line.get_str("layer").as_deref(), Some("Walls"));
        assert_eq!(line.get("color"), Some(&TagValue::Int(3)));
        assert_eq!(line.get_point("start"), Some(Vector3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_set_rejects_unknown_or_mismatched() {
        let mut line = DxfEntity::new("LINE");
        assert!(matches!(
            line.set("radius", 1.0),
            Err(DxfError::InvalidAttribute { .. })
        ));
        assert!(line.set("color", Vector2::new(1.0, 2.0)).is_err());
        assert!(line.set("start", 1.0).is_err());
        assert!(DxfEntity::new("UNKNOWN_THING").set("layer", "0").is_err());
    }

    #[test]
    fn test_normalize_numbers() {
        let mut circle = DxfEntity::new("CIRCLE");
        circle.set("radius", 2).unwrap();
        assert_eq!(circle.get("radius"), Some(&TagValue::Real(2.0)));
        circle.set("color", "5").unwrap();
        assert_eq!(circle.get("color"), Some(&TagValue::Int(5)));
    }

    #[test]
    fn test_backfill() {
        let mut line = DxfEntity::new("LINE");
        let filled = line.backfill_defaults();
        assert!(filled.contains(&"lineweight"));
        assert!(filled.contains(&"ltscale"));
        assert_eq!(line.get("lineweight"), Some(&TagValue::Int(-1)));
        assert!(line.backfill_defaults().is_empty());
    }

    #[test]
    fn test_duplicate_drops_identity() {
        let mut layer = DxfEntity::new("LAYER").with("name", "A").unwrap();
        layer.set_handle(Handle::new(0x20));
        layer.set_owner(Handle::new(0x2));
        layer.add_reactor(Handle::new(0x3));
        let copy = layer.duplicate();
        assert!(copy.handle().is_null());
        assert!(copy.reactors().is_empty());
        assert_eq!(copy.name(), "A");
    }
}
