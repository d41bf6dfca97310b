//! DXF tags: (group code, value) pairs
//!
//! Raw tags carry the value exactly as found in the file (ASCII text for
//! text DXF, typed values for binary DXF). Compiled tags carry typed values,
//! with point coordinates merged into a single [`TagValue::Point2`] or
//! [`TagValue::Point3`].

use super::group_code::{is_point_code, GroupCodeValueType};
use crate::error::{DxfError, Result};
use crate::types::{Handle, Vector2, Vector3};
use std::fmt;

/// Value of a DXF tag
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    /// Text, handles and everything not yet compiled
    Str(String),
    /// Any integer type (int16/32/64, bool)
    Int(i64),
    /// Double
    Real(f64),
    /// Compiled 2D point
    Point2(Vector2),
    /// Compiled 3D point
    Point3(Vector3),
    /// Binary chunk (310-319, 1004)
    Binary(Vec<u8>),
}

impl TagValue {
    /// Text value, `None` for typed values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value; raw text is parsed on demand
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TagValue::Int(v) => Some(*v),
            TagValue::Real(v) => Some(*v as i64),
            TagValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Floating point value; raw text is parsed on demand
    pub fn as_real(&self) -> Option<f64> {
        match self {
            TagValue::Real(v) => Some(*v),
            TagValue::Int(v) => Some(*v as f64),
            TagValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// 3D point, 2D points are lifted with z = 0
    pub fn as_point(&self) -> Option<Vector3> {
        match self {
            TagValue::Point3(p) => Some(*p),
            TagValue::Point2(p) => Some(p.with_z(0.0)),
            _ => None,
        }
    }

    /// Handle value parsed from hex text
    pub fn as_handle(&self) -> Option<Handle> {
        self.as_str().and_then(Handle::from_hex)
    }

    /// Does this value fit the value type of `code`?
    pub fn fits(&self, code: i32) -> bool {
        let value_type = GroupCodeValueType::from_code(code);
        match self {
            TagValue::Str(_) => true,
            TagValue::Int(_) => value_type.is_integer() || value_type == GroupCodeValueType::Double,
            TagValue::Real(_) => value_type == GroupCodeValueType::Double || value_type.is_integer(),
            TagValue::Point2(_) | TagValue::Point3(_) => is_point_code(code),
            TagValue::Binary(_) => value_type == GroupCodeValueType::Binary,
        }
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Str(value.to_string())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Str(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        TagValue::Int(value as i64)
    }
}

impl From<i16> for TagValue {
    fn from(value: i16) -> Self {
        TagValue::Int(value as i64)
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Int(value as i64)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Real(value)
    }
}

impl From<Vector2> for TagValue {
    fn from(value: Vector2) -> Self {
        TagValue::Point2(value)
    }
}

impl From<Vector3> for TagValue {
    fn from(value: Vector3) -> Self {
        TagValue::Point3(value)
    }
}

impl From<Handle> for TagValue {
    fn from(value: Handle) -> Self {
        TagValue::Str(value.to_hex())
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Str(s) => write!(f, "{}", s),
            TagValue::Int(v) => write!(f, "{}", v),
            TagValue::Real(v) => write!(f, "{}", format_double(*v)),
            TagValue::Point2(p) => write!(f, "{}", p),
            TagValue::Point3(p) => write!(f, "{}", p),
            TagValue::Binary(data) => write!(f, "{}", encode_hex(data)),
        }
    }
}

/// A single DXF tag
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub code: i32,
    pub value: TagValue,
}

impl Tag {
    pub fn new(code: i32, value: impl Into<TagValue>) -> Self {
        Tag {
            code,
            value: value.into(),
        }
    }

    /// Text tag
    pub fn text(code: i32, value: impl Into<String>) -> Self {
        Tag {
            code,
            value: TagValue::Str(value.into()),
        }
    }

    /// Handle tag rendered as hex text
    pub fn handle(code: i32, handle: Handle) -> Self {
        Tag::text(code, handle.to_hex())
    }

    /// Is this `(code, value)`? Text comparison ignores surrounding blanks.
    pub fn is(&self, code: i32, value: &str) -> bool {
        self.code == code && self.value.as_str().map(str::trim) == Some(value)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Structure tags (code 0) carry the entity/section/table type name
    pub fn is_structure(&self) -> bool {
        self.code == 0
    }

    /// Split a compiled point tag back into its coordinate tags.
    ///
    /// Non-point tags are returned unchanged.
    pub fn expand(&self) -> Vec<Tag> {
        match &self.value {
            TagValue::Point2(p) => vec![
                Tag::new(self.code, p.x),
                Tag::new(self.code + 10, p.y),
            ],
            TagValue::Point3(p) => vec![
                Tag::new(self.code, p.x),
                Tag::new(self.code + 10, p.y),
                Tag::new(self.code + 20, p.z),
            ],
            _ => vec![self.clone()],
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.code, self.value)
    }
}

/// Shortest text form of a double that parses back to the same value.
///
/// Integral values keep a trailing `.0` so they still read as reals; very
/// large and very small magnitudes use exponent notation.
pub fn format_double(value: f64) -> String {
    let magnitude = value.abs();
    if !value.is_finite() {
        format!("{}", value)
    } else if magnitude != 0.0 && !(1e-6..1e15).contains(&magnitude) {
        format!("{:e}", value)
    } else if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Upper-case hex rendering of a binary chunk
pub fn encode_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        out.push_str(&format!("{:02X}", byte));
    }
    out
}

/// Parse a hex rendered binary chunk
pub fn decode_hex(text: &str, line: usize) -> Result<Vec<u8>> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err(DxfError::malformed(line, format!("odd length binary data {:?}", text)));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| DxfError::malformed(line, format!("invalid binary data {:?}", text)))
        })
        .collect()
}
