//! DXF stream reader trait and common types

use crate::error::Result;
use crate::io::dxf::tag::Tag;

/// Trait for reading DXF tags from a stream
///
/// Implemented by the ASCII and binary taggers, by the tag compiler that
/// wraps them and by [`TagBuffer`] for already collected tags.
pub trait DxfStreamReader {
    /// Read the next tag, `None` at the end of the stream
    fn read_tag(&mut self) -> Result<Option<Tag>>;

    /// Current source position: line number for ASCII, byte offset for binary
    fn line(&self) -> usize;
}

impl<R: DxfStreamReader + ?Sized> DxfStreamReader for Box<R> {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        (**self).read_tag()
    }

    fn line(&self) -> usize {
        (**self).line()
    }
}

impl<R: DxfStreamReader + ?Sized> DxfStreamReader for &mut R {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        (**self).read_tag()
    }

    fn line(&self) -> usize {
        (**self).line()
    }
}

/// Tags collected in memory, replayed as a stream.
///
/// Line numbers advance by two per tag starting at the record's first line.
pub struct TagBuffer {
    tags: std::vec::IntoIter<Tag>,
    line: usize,
}

impl TagBuffer {
    pub fn new(tags: Vec<Tag>, start_line: usize) -> Self {
        Self {
            tags: tags.into_iter(),
            line: start_line.saturating_sub(2),
        }
    }
}

impl DxfStreamReader for TagBuffer {
    fn read_tag(&mut self) -> Result<Option<Tag>> {
        let tag = self.tags.next();
        if tag.is_some() {
            self.line += 2;
        }
        Ok(tag)
    }

    fn line(&self) -> usize {
        self.line
    }
}

/// Iterator adapter over a stream reader.
///
/// Stops after the first error.
pub struct TagIter<R: DxfStreamReader> {
    reader: R,
    failed: bool,
}

impl<R: DxfStreamReader> TagIter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            failed: false,
        }
    }
}

impl<R: DxfStreamReader> Iterator for TagIter<R> {
    type Item = Result<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.read_tag() {
            Ok(tag) => tag.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
