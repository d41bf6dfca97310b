//! Static attribute schemas of the known entity, table entry and object types
//!
//! A schema lists the subclasses of a DXF type in file order, each with its
//! subclass marker and the attributes it defines. Decoding uses it to route
//! tags into named attributes, encoding uses it to emit tags in canonical
//! order and to drop attributes the target version does not know.

use super::definitions;
use crate::io::dxf::tag::TagValue;
use crate::types::{DxfVersion, Vector2, Vector3};
use ahash::AHashMap;
use bitflags::bitflags;
use once_cell::sync::Lazy;

bitflags! {
    /// Attribute behavior flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttribFlags: u8 {
        /// Always written; the default is used when the attribute is unset
        const REQUIRED = 0b01;
        /// Set to its default when legacy content is upgraded
        const BACKFILL = 0b10;
    }
}

/// Default value of an attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    None,
    Str(&'static str),
    Int(i64),
    Real(f64),
    Point2(f64, f64),
    Point3(f64, f64, f64),
}

impl DefaultValue {
    pub fn to_value(self) -> Option<TagValue> {
        match self {
            DefaultValue::None => None,
            DefaultValue::Str(s) => Some(TagValue::Str(s.to_string())),
            DefaultValue::Int(v) => Some(TagValue::Int(v)),
            DefaultValue::Real(v) => Some(TagValue::Real(v)),
            DefaultValue::Point2(x, y) => Some(TagValue::Point2(Vector2::new(x, y))),
            DefaultValue::Point3(x, y, z) => Some(TagValue::Point3(Vector3::new(x, y, z))),
        }
    }
}

/// One named attribute stored under a single group code
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttribDef {
    pub name: &'static str,
    pub code: i32,
    pub default: DefaultValue,
    /// Oldest version that knows the attribute
    pub min_version: DxfVersion,
    pub flags: AttribFlags,
}

impl AttribDef {
    pub const fn new(name: &'static str, code: i32, default: DefaultValue) -> Self {
        AttribDef {
            name,
            code,
            default,
            min_version: DxfVersion::AC1009,
            flags: AttribFlags::empty(),
        }
    }

    pub const fn since(self, version: DxfVersion) -> Self {
        AttribDef {
            min_version: version,
            ..self
        }
    }

    pub const fn required(self) -> Self {
        AttribDef {
            flags: self.flags.union(AttribFlags::REQUIRED),
            ..self
        }
    }

    pub const fn backfill(self) -> Self {
        AttribDef {
            flags: self.flags.union(AttribFlags::BACKFILL),
            ..self
        }
    }

    pub fn is_required(&self) -> bool {
        self.flags.contains(AttribFlags::REQUIRED)
    }

    pub fn is_backfilled(&self) -> bool {
        self.flags.contains(AttribFlags::BACKFILL)
    }
}

pub const fn text(name: &'static str, code: i32, default: &'static str) -> AttribDef {
    AttribDef::new(name, code, DefaultValue::Str(default))
}

pub const fn int(name: &'static str, code: i32, default: i64) -> AttribDef {
    AttribDef::new(name, code, DefaultValue::Int(default))
}

pub const fn real(name: &'static str, code: i32, default: f64) -> AttribDef {
    AttribDef::new(name, code, DefaultValue::Real(default))
}

pub const fn point2(name: &'static str, code: i32, x: f64, y: f64) -> AttribDef {
    AttribDef::new(name, code, DefaultValue::Point2(x, y))
}

pub const fn point3(name: &'static str, code: i32, x: f64, y: f64, z: f64) -> AttribDef {
    AttribDef::new(name, code, DefaultValue::Point3(x, y, z))
}

/// Handle reference attribute, default "0" (no object)
pub const fn handle(name: &'static str, code: i32) -> AttribDef {
    AttribDef::new(name, code, DefaultValue::Str("0"))
}

/// Subclass section of a schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubclassDef {
    /// Accepted markers; the first one is written for new objects
    pub markers: &'static [&'static str],
    pub attribs: &'static [AttribDef],
}

impl SubclassDef {
    pub fn marker(&self) -> &'static str {
        self.markers.first().copied().unwrap_or("")
    }

    pub fn accepts(&self, marker: &str) -> bool {
        self.markers.iter().any(|m| m.eq_ignore_ascii_case(marker.trim()))
    }

    pub fn attrib_by_code(&self, code: i32) -> Option<&'static AttribDef> {
        self.attribs.iter().find(|a| a.code == code)
    }
}

/// Broad category of a DXF type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Graphical entity placed in a layout or block
    Graphic,
    /// `BLOCK` / `ENDBLK` / `TABLE` heads
    Structure,
    /// Symbol table entry
    TableEntry,
    /// Non-graphical object of the OBJECTS section
    Object,
}

/// Schema of one DXF type
#[derive(Debug, PartialEq)]
pub struct EntitySchema {
    pub dxf_type: &'static str,
    pub kind: EntityKind,
    /// Oldest version that knows the type
    pub min_version: DxfVersion,
    /// Group code of the own handle (5, or 105 for DIMSTYLE)
    pub handle_code: i32,
    pub subclasses: &'static [SubclassDef],
}

impl EntitySchema {
    /// Find an attribute by name
    pub fn attrib(&self, name: &str) -> Option<&'static AttribDef> {
        self.subclasses
            .iter()
            .flat_map(|s| s.attribs.iter())
            .find(|a| a.name == name)
    }

    /// Index of the subclass following `after` that accepts `marker`
    pub fn subclass_for_marker(&self, marker: &str, after: Option<usize>) -> Option<usize> {
        let start = after.map(|i| i + 1).unwrap_or(0);
        (start..self.subclasses.len())
            .find(|&i| self.subclasses[i].accepts(marker))
            .or_else(|| self.subclasses.iter().position(|s| s.accepts(marker)))
    }

    /// All attributes in canonical order
    pub fn attribs(&self) -> impl Iterator<Item = &'static AttribDef> + '_ {
        self.subclasses.iter().flat_map(|s| s.attribs.iter())
    }
}

static REGISTRY: Lazy<AHashMap<&'static str, &'static EntitySchema>> = Lazy::new(|| {
    definitions::ALL
        .iter()
        .map(|schema| (schema.dxf_type, *schema))
        .collect()
});

/// Look up the schema of a DXF type
pub fn schema_for(dxf_type: &str) -> Option<&'static EntitySchema> {
    let key = dxf_type.trim();
    REGISTRY
        .get(key)
        .or_else(|| REGISTRY.get(key.to_ascii_uppercase().as_str()))
        .copied()
}

/// Names of all known DXF types
pub fn known_types() -> impl Iterator<Item = &'static str> {
    definitions::ALL.iter().map(|s| s.dxf_type)
}
