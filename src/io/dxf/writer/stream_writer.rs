//! DXF stream writer trait and common types

use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::GroupCodeValueType;
use crate::io::dxf::tag::{decode_hex, Tag, TagValue};
use crate::types::{Handle, Vector2, Vector3};

/// Trait for writing DXF code/value pairs
pub trait DxfStreamWriter {
    /// Write a code/value pair with a string value
    fn write_string(&mut self, code: i32, value: &str) -> Result<()>;

    /// Write a code/value pair with an i16 value
    fn write_i16(&mut self, code: i32, value: i16) -> Result<()>;

    /// Write a code/value pair with an i32 value
    fn write_i32(&mut self, code: i32, value: i32) -> Result<()>;

    /// Write a code/value pair with an i64 value
    fn write_i64(&mut self, code: i32, value: i64) -> Result<()>;

    /// Write a code/value pair with a double value
    fn write_double(&mut self, code: i32, value: f64) -> Result<()>;

    /// Write a code/value pair with a boolean value (codes 290-299)
    fn write_bool(&mut self, code: i32, value: bool) -> Result<()>;

    /// Write a code/value pair with a handle value
    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()>;

    /// Write binary data
    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()>;

    /// Flush the writer
    fn flush(&mut self) -> Result<()>;
}

fn misfit(tag: &Tag) -> DxfError {
    DxfError::UnsupportedOperation(format!(
        "value {:?} does not fit group code {}",
        tag.value.to_string(),
        tag.code
    ))
}

/// Extension trait for convenient writing operations
pub trait DxfStreamWriterExt: DxfStreamWriter {
    /// Write a 2D point (codes 10/20 or similar)
    fn write_point2d(&mut self, x_code: i32, point: Vector2) -> Result<()> {
        self.write_double(x_code, point.x)?;
        self.write_double(x_code + 10, point.y)?;
        Ok(())
    }

    /// Write a 3D point (codes 10/20/30 or similar)
    fn write_point3d(&mut self, x_code: i32, point: Vector3) -> Result<()> {
        self.write_double(x_code, point.x)?;
        self.write_double(x_code + 10, point.y)?;
        self.write_double(x_code + 20, point.z)?;
        Ok(())
    }

    /// Write a tag with the value type its group code calls for.
    ///
    /// Compiled points are split into their coordinates; text values of
    /// numeric codes are parsed first.
    fn write_tag(&mut self, tag: &Tag) -> Result<()> {
        let code = tag.code;
        match &tag.value {
            TagValue::Point2(p) => return self.write_point2d(code, *p),
            TagValue::Point3(p) => return self.write_point3d(code, *p),
            TagValue::Binary(data) => return self.write_binary(code, data),
            _ => {}
        }
        match GroupCodeValueType::from_code(code) {
            GroupCodeValueType::String | GroupCodeValueType::Handle => match &tag.value {
                TagValue::Str(text) => self.write_string(code, text),
                other => self.write_string(code, &other.to_string()),
            },
            GroupCodeValueType::Double => {
                let value = tag.value.as_real().ok_or_else(|| misfit(tag))?;
                self.write_double(code, value)
            }
            GroupCodeValueType::Int16 => {
                let value = tag.value.as_int().ok_or_else(|| misfit(tag))?;
                self.write_i16(code, value as i16)
            }
            GroupCodeValueType::Int32 => {
                let value = tag.value.as_int().ok_or_else(|| misfit(tag))?;
                self.write_i32(code, value as i32)
            }
            GroupCodeValueType::Int64 => {
                let value = tag.value.as_int().ok_or_else(|| misfit(tag))?;
                self.write_i64(code, value)
            }
            GroupCodeValueType::Bool => {
                let value = tag.value.as_int().ok_or_else(|| misfit(tag))?;
                self.write_bool(code, value != 0)
            }
            GroupCodeValueType::Binary => {
                let text = tag.value.as_str().ok_or_else(|| misfit(tag))?;
                self.write_binary(code, &decode_hex(text, 0)?)
            }
        }
    }

    /// Write a sequence of tags
    fn write_tags<'t>(&mut self, tags: impl IntoIterator<Item = &'t Tag>) -> Result<()> {
        for tag in tags {
            self.write_tag(tag)?;
        }
        Ok(())
    }

    /// Write section start
    fn write_section_start(&mut self, section_name: &str) -> Result<()> {
        self.write_string(0, "SECTION")?;
        self.write_string(2, section_name)?;
        Ok(())
    }

    /// Write section end
    fn write_section_end(&mut self) -> Result<()> {
        self.write_string(0, "ENDSEC")
    }

    /// Write end of file
    fn write_eof(&mut self) -> Result<()> {
        self.write_string(0, "EOF")
    }
}

// Auto-implement the extension trait for all stream writers
impl<T: DxfStreamWriter + ?Sized> DxfStreamWriterExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::writer::DxfTextWriter;

    fn render(tags: &[Tag]) -> Result<String> {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_tags(tags)?;
        }
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_write_tag_dispatch() {
        let out = render(&[
            Tag::new(10, Vector2::new(1.0, 2.5)),
            Tag::text(40, "3"),
            Tag::new(70, 5i64),
            Tag::new(290, 1i64),
            Tag::new(310, TagValue::Binary(vec![0xAB, 0x01])),
        ])
        .unwrap();
        assert_eq!(
            out,
            " 10\n1.0\n 20\n2.5\n 40\n3.0\n 70\n5\n290\n1\n310\nAB01\n"
        );
    }

    #[test]
    fn test_write_tag_misfit() {
        let err = render(&[Tag::text(40, "not a number")]).unwrap_err();
        assert!(matches!(err, DxfError::UnsupportedOperation(_)));
    }
}
