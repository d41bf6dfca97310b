//! Raw tag to typed tag conversion

use super::stream_reader::DxfStreamReader;
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{is_point_code, GroupCodeValueType};
use crate::io::dxf::tag::{decode_hex, Tag, TagValue};
use crate::types::{Vector2, Vector3};

/// Compile mode of a [`TagCompiler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompileMode {
    /// Typed values, point components merged into one tag
    #[default]
    Compiled,
    /// Pass raw tags through unchanged
    Raw,
}

/// Converts a raw tag stream into typed tags.
///
/// A point x code (10-18, 110-112, 210, 1010-1013) must be followed by its
/// y code (x + 10); the z code (x + 20) is optional and produces a 2D point
/// when absent. Integer codes accept float text ("1.0") as written by some
/// exporters.
pub struct TagCompiler<R: DxfStreamReader> {
    reader: R,
    mode: CompileMode,
    undo: Option<Tag>,
    line: usize,
}

impl<R: DxfStreamReader> TagCompiler<R> {
    pub fn new(reader: R, mode: CompileMode) -> Self {
        Self {
            reader,
            mode,
            undo: None,
            line: 0,
        }
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn next_raw(&mut self) -> Result<Option<Tag>> {
        if let Some(tag) = self.undo.take() {
            return Ok(Some(tag));
        }
        self.reader.read_tag()
    }

    fn compile_point(&mut self, x_tag: Tag) -> Result<Tag> {
        let line = self.line;
        let code = x_tag.code;
        let x = to_double(&x_tag.value, code, line)?;

        let y = match self.next_raw()? {
            Some(tag) if tag.code == code + 10 => to_double(&tag.value, tag.code, line)?,
            Some(tag) => {
                return Err(DxfError::malformed(
                    line,
                    format!("point code {} not followed by y code {} (got {})", code, code + 10, tag.code),
                ))
            }
            None => {
                return Err(DxfError::malformed(
                    line,
                    format!("point code {} at end of stream", code),
                ))
            }
        };

        match self.next_raw()? {
            Some(tag) if tag.code == code + 20 => {
                let z = to_double(&tag.value, tag.code, line)?;
                Ok(Tag::new(code, Vector3::new(x, y, z)))
            }
            other => {
                self.undo = other;
                Ok(Tag::new(code, Vector2::new(x, y)))
            }
        }
    }
}

impl<R: DxfStreamReader> DxfStreamReader for TagCompiler<R> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        let tag = match self.next_raw()? {
            Some(tag) => tag,
            None => return Ok(None),
        };
        self.line = self.reader.line();
        if self.mode == CompileMode::Raw {
            return Ok(Some(tag));
        }
        if is_point_code(tag.code) && !matches!(tag.value, TagValue::Point2(_) | TagValue::Point3(_)) {
            return self.compile_point(tag).map(Some);
        }
        compile_value(tag, self.line).map(Some)
    }

    fn line(&self) -> usize {
        self.line
    }
}

/// Convert one non-point tag to its typed value.
pub fn compile_value(tag: Tag, line: usize) -> Result<Tag> {
    let Tag { code, value } = tag;
    let text = match value {
        TagValue::Str(text) => text,
        typed => return Ok(Tag { code, value: typed }),
    };
    let value = match GroupCodeValueType::from_code(code) {
        GroupCodeValueType::String | GroupCodeValueType::Handle => TagValue::Str(text),
        GroupCodeValueType::Double => TagValue::Real(parse_double(&text, code, line)?),
        GroupCodeValueType::Int16
        | GroupCodeValueType::Int32
        | GroupCodeValueType::Int64
        | GroupCodeValueType::Bool => TagValue::Int(parse_int(&text, code, line)?),
        GroupCodeValueType::Binary => TagValue::Binary(decode_hex(&text, line)?),
    };
    Ok(Tag { code, value })
}

/// Compile a complete tag list, e.g. one entity record.
pub fn compile_tags(tags: Vec<Tag>, start_line: usize) -> Result<Vec<Tag>> {
    let mut compiler = TagCompiler::new(
        super::stream_reader::TagBuffer::new(tags, start_line),
        CompileMode::Compiled,
    );
    let mut out = Vec::new();
    while let Some(tag) = compiler.read_tag()? {
        out.push(tag);
    }
    Ok(out)
}

fn to_double(value: &TagValue, code: i32, line: usize) -> Result<f64> {
    match value {
        TagValue::Real(v) => Ok(*v),
        TagValue::Int(v) => Ok(*v as f64),
        TagValue::Str(text) => parse_double(text, code, line),
        other => Err(DxfError::malformed(
            line,
            format!("group code {} expects a number, got {:?}", code, other),
        )),
    }
}

fn parse_double(text: &str, code: i32, line: usize) -> Result<f64> {
    text.trim().parse::<f64>().map_err(|_| {
        DxfError::malformed(line, format!("invalid float {:?} for group code {}", text, code))
    })
}

fn parse_int(text: &str, code: i32, line: usize) -> Result<i64> {
    let trimmed = text.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    // ProE writes integers as "1.0"
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(DxfError::malformed(
            line,
            format!("invalid integer {:?} for group code {}", text, code),
        )),
    }
}
