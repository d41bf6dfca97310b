//! DXF writer module

mod binary_writer;
mod section_writer;
mod stream_writer;
mod text_writer;

pub use binary_writer::DxfBinaryWriter;
pub use section_writer::SectionWriter;
pub use stream_writer::{DxfStreamWriter, DxfStreamWriterExt};
pub use text_writer::DxfTextWriter;

use crate::document::CadDocument;
use crate::error::{DxfError, Result};
use crate::notification::NotificationCollection;
use crate::types::DxfVersion;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Configuration for the DXF writer
#[derive(Debug, Clone, Default)]
pub struct DxfWriterConfiguration {
    /// Write binary DXF
    pub binary: bool,
    /// Target version, the document version if `None`
    pub version: Option<DxfVersion>,
}

/// DXF file writer
pub struct DxfWriter<'a> {
    document: &'a CadDocument,
    config: DxfWriterConfiguration,
    notifications: NotificationCollection,
}

impl<'a> DxfWriter<'a> {
    /// Create a new DXF writer for ASCII output
    pub fn new(document: &'a CadDocument) -> Self {
        Self {
            document,
            config: DxfWriterConfiguration::default(),
            notifications: NotificationCollection::new(),
        }
    }

    /// Create a new DXF writer for binary output
    pub fn new_binary(document: &'a CadDocument) -> Self {
        Self::new(document).with_configuration(DxfWriterConfiguration {
            binary: true,
            version: None,
        })
    }

    pub fn with_configuration(mut self, config: DxfWriterConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Set whether to write binary format
    pub fn set_binary(&mut self, binary: bool) {
        self.config.binary = binary;
    }

    /// Set the target version
    pub fn set_version(&mut self, version: DxfVersion) {
        self.config.version = Some(version);
    }

    /// Warnings of the last write (skipped entity types, dropped layouts)
    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    /// The version the output is written in
    pub fn target_version(&self) -> Result<DxfVersion> {
        let version = self.config.version.unwrap_or(self.document.version());
        if !version.is_writable() {
            return Err(DxfError::UnsupportedVersion(version.to_dxf_string().to_string()));
        }
        Ok(version)
    }

    /// Write to a file
    pub fn write_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let version = self.target_version()?;
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        self.write_version(writer, version)
    }

    /// Write to any writer
    pub fn write_to_writer<W: Write>(&mut self, writer: W) -> Result<()> {
        let version = self.target_version()?;
        self.write_version(writer, version)
    }

    /// Write to a byte vector
    pub fn write_to_vec(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_to_writer(&mut buffer)?;
        Ok(buffer)
    }

    fn write_version<W: Write>(&mut self, writer: W, version: DxfVersion) -> Result<()> {
        let encoding = if version.is_utf8() {
            encoding_rs::UTF_8
        } else {
            self.document.encoding()
        };
        tracing::debug!(?version, binary = self.config.binary, encoding = encoding.name(), "writing document");

        self.notifications = if self.config.binary {
            let mut stream_writer = if version.is_legacy() {
                DxfBinaryWriter::legacy(writer)?
            } else {
                DxfBinaryWriter::new(writer)?
            }
            .with_encoding(encoding);
            let notes = SectionWriter::new(&mut stream_writer, version).write_document(self.document)?;
            stream_writer.flush()?;
            notes
        } else {
            let mut stream_writer = DxfTextWriter::new(writer).with_encoding(encoding);
            let notes = SectionWriter::new(&mut stream_writer, version).write_document(self.document)?;
            stream_writer.flush()?;
            notes
        };
        tracing::info!(?version, objects = self.document.entity_count(), "saved document");
        Ok(())
    }

    /// Get a reference to the document
    pub fn document(&self) -> &CadDocument {
        self.document
    }
}

/// Convenience function to write a document to a file
pub fn write_dxf<P: AsRef<Path>>(document: &CadDocument, path: P) -> Result<()> {
    DxfWriter::new(document).write_to_file(path)
}

/// Convenience function to write a document to a binary DXF file
pub fn write_binary_dxf<P: AsRef<Path>>(document: &CadDocument, path: P) -> Result<()> {
    DxfWriter::new_binary(document).write_to_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::reader::{is_binary, DxfReader};

    #[test]
    fn test_unwritable_version() {
        let doc = CadDocument::new();
        let mut writer = DxfWriter::new(&doc).with_configuration(DxfWriterConfiguration {
            binary: false,
            version: Some(DxfVersion::AC1014),
        });
        assert!(matches!(
            writer.write_to_vec(),
            Err(DxfError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_binary_output_reads_back() {
        let doc = CadDocument::with_version(DxfVersion::AC1015);
        let data = DxfWriter::new_binary(&doc).write_to_vec().unwrap();
        assert!(is_binary(&data));
        let loaded = DxfReader::from_bytes(data).read().unwrap();
        assert_eq!(loaded.version(), DxfVersion::AC1015);
        assert_eq!(loaded.layouts().len(), doc.layouts().len());
    }

    #[test]
    fn test_legacy_binary_reads_back() {
        let doc = CadDocument::with_version(DxfVersion::AC1009);
        let data = DxfWriter::new_binary(&doc).write_to_vec().unwrap();
        let loaded = DxfReader::from_bytes(data).read().unwrap();
        assert_eq!(loaded.version(), DxfVersion::AC1009);
    }
}
