//! DXF ASCII text reader

use super::stream_reader::DxfStreamReader;
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::COMMENT;
use crate::io::dxf::tag::Tag;
use encoding_rs::Encoding;

/// DXF ASCII tagger.
///
/// Reads alternating code/value lines from a memory-resident buffer and
/// produces raw tags. The code line is trimmed, the value line only loses
/// its line terminator. A code line that is not an integer yields a
/// `MalformedTag` error; the offending pair is consumed, so a tolerant
/// caller can keep reading with the next pair.
pub struct DxfTextReader<'a> {
    data: &'a [u8],
    pos: usize,
    line_number: usize,
    tag_line: usize,
    /// Non-UTF8 fallback encoding. `None` means use Latin-1 (byte-to-char).
    encoding: Option<&'static Encoding>,
    skip_comments: bool,
}

impl<'a> DxfTextReader<'a> {
    /// Create a new DXF text reader
    pub fn new(data: &'a [u8]) -> Self {
        // UTF-8 BOM
        let pos = if data.starts_with(&[0xEF, 0xBB, 0xBF]) { 3 } else { 0 };
        Self {
            data,
            pos,
            line_number: 0,
            tag_line: 0,
            encoding: None,
            skip_comments: true,
        }
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

    /// Read a single raw line without its terminator
    fn read_line(&mut self) -> Option<&'a [u8]> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let (line, advance) = match rest.iter().position(|&b| b == b'\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        self.line_number += 1;
        Some(line.strip_suffix(b"\r").unwrap_or(line))
    }

    /// Try UTF-8 first, then the configured encoding or Latin-1
    fn decode(&self, bytes: &[u8]) -> String {
        match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => {
                if let Some(enc) = self.encoding {
                    let (decoded, _) = enc.decode_without_bom_handling(bytes);
                    decoded.into_owned()
                } else {
                    // Latin-1 is a 1:1 mapping of bytes 0-255 to Unicode code points
                    bytes.iter().map(|&b| b as char).collect()
                }
            }
        }
    }

    fn read_pair(&mut self) -> Result<Option<Tag>> {
        let code_line = match self.read_line() {
            Some(line) => line,
            None => return Ok(None),
        };
        self.tag_line = self.line_number;
        let code_text = self.decode(code_line);
        let code_text = code_text.trim();

        let value_line = match self.read_line() {
            Some(line) => line,
            None if code_text.is_empty() => return Ok(None),
            None => {
                return Err(DxfError::malformed(
                    self.tag_line,
                    format!("missing value for group code {:?}", code_text),
                ))
            }
        };

        let code = code_text.parse::<i32>().map_err(|_| {
            DxfError::malformed(self.tag_line, format!("invalid group code {:?}", code_text))
        })?;
        Ok(Some(Tag::text(code, self.decode(value_line))))
    }
}

impl DxfStreamReader for DxfTextReader<'_> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        loop {
            match self.read_pair()? {
                Some(tag) if tag.code == COMMENT && self.skip_comments => continue,
                other => return Ok(other),
            }
        }
    }

    fn line(&self) -> usize {
        self.tag_line
    }
}
