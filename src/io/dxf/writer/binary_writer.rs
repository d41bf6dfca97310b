//! Binary DXF writer

use super::stream_writer::DxfStreamWriter;
use super::text_writer::encode_text;
use crate::error::Result;
use crate::io::dxf::reader::BINARY_SENTINEL;
use crate::types::Handle;
use byteorder::{LittleEndian, WriteBytesExt};
use encoding_rs::Encoding;
use std::io::Write;

/// Longest binary chunk of a single tag
const MAX_CHUNK: usize = 127;

/// Binary DXF stream writer.
///
/// R13 and later use 2-byte group codes; R12 files use 1-byte codes with
/// 255 escaping codes above 254, and 2-byte booleans.
pub struct DxfBinaryWriter<W: Write> {
    writer: W,
    wide_codes: bool,
    encoding: &'static Encoding,
}

impl<W: Write> DxfBinaryWriter<W> {
    /// Create a new binary DXF writer (R13+ layout)
    pub fn new(writer: W) -> Result<Self> {
        Self::with_layout(writer, true)
    }

    /// Create a binary DXF writer with the R12 code layout
    pub fn legacy(writer: W) -> Result<Self> {
        Self::with_layout(writer, false)
    }

    fn with_layout(mut writer: W, wide_codes: bool) -> Result<Self> {
        writer.write_all(BINARY_SENTINEL)?;
        Ok(Self {
            writer,
            wide_codes,
            encoding: encoding_rs::UTF_8,
        })
    }

    /// Encode text values with `encoding`
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn write_code(&mut self, code: i32) -> Result<()> {
        if self.wide_codes {
            self.writer.write_u16::<LittleEndian>(code as u16)?;
        } else if (0..255).contains(&code) {
            self.writer.write_u8(code as u8)?;
        } else {
            self.writer.write_u8(255)?;
            self.writer.write_u16::<LittleEndian>(code as u16)?;
        }
        Ok(())
    }

    fn write_null_string(&mut self, value: &str) -> Result<()> {
        let bytes = encode_text(value, self.encoding);
        self.writer.write_all(&bytes)?;
        self.writer.write_u8(0)?;
        Ok(())
    }

    /// Get the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DxfStreamWriter for DxfBinaryWriter<W> {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        self.write_null_string(value)
    }

    fn write_i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_i16::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_i64(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_i64::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_f64::<LittleEndian>(value)?;
        Ok(())
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_code(code)?;
        if self.wide_codes {
            self.writer.write_u8(value as u8)?;
        } else {
            self.writer.write_i16::<LittleEndian>(value as i16)?;
        }
        Ok(())
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.write_code(code)?;
        // Handles are written as hex strings even in binary DXF
        self.write_null_string(&handle.to_hex())
    }

    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()> {
        if data.is_empty() {
            self.write_code(code)?;
            self.writer.write_u8(0)?;
            return Ok(());
        }
        for chunk in data.chunks(MAX_CHUNK) {
            self.write_code(code)?;
            self.writer.write_u8(chunk.len() as u8)?;
            self.writer.write_all(chunk)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::reader::{DxfBinaryReader, DxfStreamReader};
    use crate::io::dxf::tag::{Tag, TagValue};

    const OFFSET: usize = BINARY_SENTINEL.len();

    #[test]
    fn test_binary_sentinel() {
        let mut buf = Vec::new();
        DxfBinaryWriter::new(&mut buf).unwrap();
        assert_eq!(&buf[..], &BINARY_SENTINEL[..]);
    }

    #[test]
    fn test_write_string() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
            writer.write_string(0, "LINE").unwrap();
        }
        assert_eq!(buf[OFFSET..OFFSET + 2], [0, 0]);
        assert_eq!(&buf[OFFSET + 2..OFFSET + 6], b"LINE");
        assert_eq!(buf[OFFSET + 6], 0);
    }

    #[test]
    fn test_write_double() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
            writer.write_double(10, 1.5).unwrap();
        }
        assert_eq!(buf[OFFSET..OFFSET + 2], [10, 0]);
        assert_eq!(&buf[OFFSET + 2..OFFSET + 10], &1.5f64.to_le_bytes());
    }

    #[test]
    fn test_legacy_codes() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::legacy(&mut buf).unwrap();
            writer.write_i16(62, 7).unwrap();
            writer.write_string(1001, "APP").unwrap();
        }
        assert_eq!(buf[OFFSET..OFFSET + 3], [62, 7, 0]);
        assert_eq!(buf[OFFSET + 3..OFFSET + 6], [255, 0xE9, 0x03]);
    }

    #[test]
    fn test_long_binary_is_chunked() {
        let data: Vec<u8> = (0..200u8).collect();
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
            writer.write_binary(310, &data).unwrap();
        }
        assert_eq!(buf.len(), OFFSET + 2 + 1 + 127 + 2 + 1 + 73);
    }

    #[test]
    fn test_read_back() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfBinaryWriter::new(&mut buf).unwrap();
            writer.write_string(0, "SECTION").unwrap();
            writer.write_bool(290, true).unwrap();
            writer.write_i32(90, -3).unwrap();
        }
        let mut reader = DxfBinaryReader::new(&buf).unwrap();
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::text(0, "SECTION")));
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::new(290, TagValue::Int(1))));
        assert_eq!(reader.read_tag().unwrap(), Some(Tag::new(90, TagValue::Int(-3))));
        assert_eq!(reader.read_tag().unwrap(), None);
    }
}
