//! ASCII DXF writer

use super::stream_writer::DxfStreamWriter;
use crate::error::Result;
use crate::io::dxf::tag::{encode_hex, format_double};
use crate::types::Handle;
use encoding_rs::Encoding;
use std::io::Write;

/// Encode `value` with `encoding`; characters the code page lacks become
/// `\U+XXXX` escapes.
pub(crate) fn encode_text(value: &str, encoding: &'static Encoding) -> Vec<u8> {
    if encoding == encoding_rs::UTF_8 {
        return value.as_bytes().to_vec();
    }
    let (bytes, _, unmappable) = encoding.encode(value);
    if !unmappable {
        return bytes.into_owned();
    }
    let mut out = Vec::with_capacity(value.len());
    let mut buf = [0u8; 4];
    for c in value.chars() {
        let (bytes, _, unmappable) = encoding.encode(c.encode_utf8(&mut buf));
        if unmappable {
            out.extend_from_slice(format!("\\U+{:04X}", c as u32).as_bytes());
        } else {
            out.extend_from_slice(&bytes);
        }
    }
    out
}

/// ASCII DXF stream writer
pub struct DxfTextWriter<W: Write> {
    writer: W,
    encoding: &'static Encoding,
}

impl<W: Write> DxfTextWriter<W> {
    /// Create a new ASCII DXF writer producing UTF-8 text
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            encoding: encoding_rs::UTF_8,
        }
    }

    /// Encode text values with `encoding` (pre-R2007 code pages)
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Write a DXF code with proper formatting (right-aligned in 3-character field)
    fn write_code(&mut self, code: i32) -> Result<()> {
        writeln!(self.writer, "{:>3}", code)?;
        Ok(())
    }

    fn write_pair(&mut self, code: i32, value: impl std::fmt::Display) -> Result<()> {
        self.write_code(code)?;
        writeln!(self.writer, "{}", value)?;
        Ok(())
    }

    /// Get the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DxfStreamWriter for DxfTextWriter<W> {
    fn write_string(&mut self, code: i32, value: &str) -> Result<()> {
        self.write_code(code)?;
        self.writer.write_all(&encode_text(value, self.encoding))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn write_i16(&mut self, code: i32, value: i16) -> Result<()> {
        self.write_pair(code, value)
    }

    fn write_i32(&mut self, code: i32, value: i32) -> Result<()> {
        self.write_pair(code, value)
    }

    fn write_i64(&mut self, code: i32, value: i64) -> Result<()> {
        self.write_pair(code, value)
    }

    fn write_double(&mut self, code: i32, value: f64) -> Result<()> {
        self.write_pair(code, format_double(value))
    }

    fn write_bool(&mut self, code: i32, value: bool) -> Result<()> {
        self.write_pair(code, value as u8)
    }

    fn write_handle(&mut self, code: i32, handle: Handle) -> Result<()> {
        self.write_pair(code, handle.to_hex())
    }

    fn write_binary(&mut self, code: i32, data: &[u8]) -> Result<()> {
        self.write_pair(code, encode_hex(data))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::writer::DxfStreamWriterExt;
    use crate::types::Vector3;

    #[test]
    fn test_write_string() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_string(0, "LINE").unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, "  0\nLINE\n");
    }

    #[test]
    fn test_write_code_formatting() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_i16(5, 100).unwrap();
            writer.write_i16(62, 7).unwrap();
            writer.write_i16(100, 1).unwrap();
            writer.write_string(1001, "APP").unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, "  5\n100\n 62\n7\n100\n1\n1001\nAPP\n");
    }

    #[test]
    fn test_write_point3d() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_point3d(10, Vector3::new(1.0, 2.0, 0.125)).unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, " 10\n1.0\n 20\n2.0\n 30\n0.125\n");
    }

    #[test]
    fn test_write_handle() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf);
            writer.write_handle(5, Handle::new(255)).unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output, "  5\nFF\n");
    }

    #[test]
    fn test_code_page_output() {
        let mut buf = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buf).with_encoding(encoding_rs::WINDOWS_1251);
            writer.write_string(1, "Слой").unwrap();
        }
        assert_eq!(&buf[4..8], &[0xD1, 0xEB, 0xEE, 0xE9]);
    }

    #[test]
    fn test_unmappable_characters_escaped() {
        let bytes = encode_text("a\u{4E2D}b", encoding_rs::WINDOWS_1252);
        assert_eq!(bytes, b"a\\U+4E2Db".to_vec());
    }
}
