//! DXF binary reader

use super::stream_reader::DxfStreamReader;
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{GroupCodeValueType, COMMENT};
use crate::io::dxf::tag::{Tag, TagValue};
use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::Encoding;

/// Binary DXF sentinel: "AutoCAD Binary DXF\r\n\x1a\0"
pub const BINARY_SENTINEL: &[u8; 22] = b"AutoCAD Binary DXF\r\n\x1a\0";

/// Check for the binary DXF sentinel
pub fn is_binary(data: &[u8]) -> bool {
    data.starts_with(b"AutoCAD Binary DXF")
}

/// DXF binary tagger.
///
/// R13 and later store group codes as 2-byte little-endian integers, R12
/// uses one byte with 255 escaping a following 2-byte code. The variant is
/// detected from the first group code after the sentinel (always 0).
///
/// Binary input cannot be resynchronized after a broken value, so the
/// first error ends the stream: later reads return `None`.
pub struct DxfBinaryReader<'a> {
    data: &'a [u8],
    pos: usize,
    tag_pos: usize,
    wide_codes: bool,
    encoding: Option<&'static Encoding>,
    skip_comments: bool,
    exhausted: bool,
}

impl<'a> DxfBinaryReader<'a> {
    /// Create a reader; `data` must start with the sentinel.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        if !data.starts_with(BINARY_SENTINEL) {
            return Err(DxfError::malformed(0, "missing binary DXF sentinel"));
        }
        let start = BINARY_SENTINEL.len();
        let wide_codes = data.len() >= start + 2 && data[start] == 0 && data[start + 1] == 0;
        Ok(Self {
            data,
            pos: start,
            tag_pos: start,
            wide_codes,
            encoding: None,
            skip_comments: true,
            exhausted: false,
        })
    }

    /// Keep `999` comment tags in the stream
    pub fn with_comments(mut self, preserve: bool) -> Self {
        self.skip_comments = !preserve;
        self
    }

    /// Decode non-UTF8 text with `encoding`
    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Are group codes stored as 2 bytes (R13+)?
    pub fn has_wide_codes(&self) -> bool {
        self.wide_codes
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.pos + count;
        if end > self.data.len() {
            return Err(DxfError::malformed(
                self.tag_pos,
                format!("unexpected end of binary data, {} byte(s) needed", count),
            ));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_code(&mut self) -> Result<i32> {
        if self.wide_codes {
            Ok(LittleEndian::read_u16(self.take(2)?) as i32)
        } else {
            let code = self.take(1)?[0];
            if code == 255 {
                Ok(LittleEndian::read_u16(self.take(2)?) as i32)
            } else {
                Ok(code as i32)
            }
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|&b| b == 0).ok_or_else(|| {
            DxfError::malformed(self.tag_pos, "unterminated string in binary data")
        })?;
        let bytes = &rest[..end];
        self.pos += end + 1;
        Ok(match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => match self.encoding {
                Some(enc) => enc.decode_without_bom_handling(bytes).0.into_owned(),
                None => bytes.iter().map(|&b| b as char).collect(),
            },
        })
    }

    fn read_value(&mut self, code: i32) -> Result<TagValue> {
        let value = match GroupCodeValueType::from_code(code) {
            GroupCodeValueType::String | GroupCodeValueType::Handle => {
                TagValue::Str(self.read_string()?)
            }
            GroupCodeValueType::Double => TagValue::Real(LittleEndian::read_f64(self.take(8)?)),
            GroupCodeValueType::Int16 => TagValue::Int(LittleEndian::read_i16(self.take(2)?) as i64),
            GroupCodeValueType::Int32 => TagValue::Int(LittleEndian::read_i32(self.take(4)?) as i64),
            GroupCodeValueType::Int64 => TagValue::Int(LittleEndian::read_i64(self.take(8)?)),
            GroupCodeValueType::Bool => {
                if self.wide_codes {
                    TagValue::Int(self.take(1)?[0] as i64)
                } else {
                    TagValue::Int(LittleEndian::read_i16(self.take(2)?) as i64)
                }
            }
            GroupCodeValueType::Binary => {
                let length = self.take(1)?[0] as usize;
                TagValue::Binary(self.take(length)?.to_vec())
            }
        };
        Ok(value)
    }

    fn read_pair(&mut self) -> Result<Option<Tag>> {
        if self.exhausted || self.pos >= self.data.len() {
            return Ok(None);
        }
        self.tag_pos = self.pos;
        let code = self.read_code()?;
        let value = self.read_value(code)?;
        Ok(Some(Tag { code, value }))
    }
}

impl DxfStreamReader for DxfBinaryReader<'_> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        loop {
            match self.read_pair() {
                Ok(Some(tag)) if tag.code == COMMENT && self.skip_comments => continue,
                Ok(tag) => return Ok(tag),
                Err(e) => {
                    self.exhausted = true;
                    return Err(e);
                }
            }
        }
    }

    fn line(&self) -> usize {
        self.tag_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wide(tags: &[(u16, &[u8])]) -> Vec<u8> {
        let mut data = BINARY_SENTINEL.to_vec();
        for (code, value) in tags {
            data.extend_from_slice(&code.to_le_bytes());
            data.extend_from_slice(value);
        }
        data
    }

    #[test]
    fn test_is_binary() {
        assert!(is_binary(BINARY_SENTINEL));
        assert!(!is_binary(b"  0\nSECTION\n"));
    }

    #[test]
    fn test_wide_codes() {
        let data = wide(&[
            (0, &b"SECTION\0"[..]),
            (10, &1.5f64.to_le_bytes()[..]),
            (70, &7i16.to_le_bytes()[..]),
            (290, &[1u8][..]),
            (310, &[2u8, 0xAB, 0xCD][..]),
        ]);
        let mut reader = DxfBinaryReader::new(&data).unwrap();
        assert!(reader.has_wide_codes());
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::text(0, "SECTION")));
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::new(10, 1.5)));
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::new(70, 7i64)));
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::new(290, 1i64)));
        assert_eq!(
            reader.read_tag().unwrap(),
            Some(Tag::new(310, TagValue::Binary(vec![0xAB, 0xCD])))
        );
        assert_eq!(reader.read_tag().unwrap(), None);
    }

    #[test]
    fn test_narrow_codes() {
        let mut data = BINARY_SENTINEL.to_vec();
        data.push(0);
        data.extend_from_slice(b"SECTION\0");
        data.push(255);
        data.extend_from_slice(&1001u16.to_le_bytes());
        data.extend_from_slice(b"ACAD\0");
        let mut reader = DxfBinaryReader::new(&data).unwrap();
        assert!(!reader.has_wide_codes());
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::text(0, "SECTION")));
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::text(1001, "ACAD")));
    }

    #[test]
    fn test_truncated_value_ends_stream() {
        let mut data = wide(&[(0, &b"SECTION\0"[..])]);
        data.extend_from_slice(&10u16.to_le_bytes());
        data.extend_from_slice(&[0, 0, 0]);
        let mut reader = DxfBinaryReader::new(&data).unwrap();
        reader.read_tag().unwrap();
        assert!(reader.read_tag().is_err());
        assert_eq!(reader.read_tag().unwrap(), None);
    }
}
