//! DXF file reader

mod binary_reader;
mod document_builder;
mod recover;
mod section_reader;
mod stream_reader;
mod tag_compiler;
mod text_reader;

pub use binary_reader::{is_binary, DxfBinaryReader, BINARY_SENTINEL};
pub use recover::{LoaderState, RecoveryLoader};
pub use section_reader::{RawSection, Record, SectionAssembler, SectionMap};
pub use stream_reader::{DxfStreamReader, TagBuffer, TagIter};
pub use tag_compiler::{compile_tags, compile_value, CompileMode, TagCompiler};
pub use text_reader::DxfTextReader;

use document_builder::DocumentBuilder;

use crate::document::CadDocument;
use crate::error::Result;
use crate::io::dxf::code_page::text_encoding;
use crate::io::dxf::tag::Tag;
use crate::types::{DxfVersion, Handle};
use encoding_rs::Encoding;
use std::io::Read;
use std::path::Path;

/// Configuration for the DXF reader.
#[derive(Debug, Clone)]
pub struct DxfReaderConfiguration {
    /// When `true`, a stream that fails to load strictly is loaded again by
    /// the [`RecoveryLoader`], which repairs what it can and reports every
    /// fix as a notification.
    ///
    /// Default: `false` (strict mode, the first structural error is returned).
    pub failsafe: bool,
    /// Keep `999` comment tags. Default: `false`.
    pub preserve_comments: bool,
    /// Compile point components into point tags in [`DxfReader::tags`].
    /// Default: `true`.
    pub compile_tags: bool,
    /// Text encoding overriding `$DWGCODEPAGE`
    pub encoding: Option<&'static Encoding>,
}

impl Default for DxfReaderConfiguration {
    fn default() -> Self {
        Self {
            failsafe: false,
            preserve_comments: false,
            compile_tags: true,
            encoding: None,
        }
    }
}

/// Result of the HEADER pre-scan
#[derive(Debug, Clone, PartialEq)]
pub struct DxfInfo {
    /// `$ACADVER`, R12 if absent
    pub version: DxfVersion,
    /// `$DWGCODEPAGE`
    pub code_page: Option<String>,
    /// `$HANDSEED`
    pub handseed: Option<Handle>,
    /// Encoding of the text values
    pub encoding: &'static Encoding,
    pub binary: bool,
}

impl DxfInfo {
    pub fn release(&self) -> &'static str {
        self.version.release()
    }
}

/// Tagger for ASCII or binary data
pub(crate) fn tagger<'a>(
    data: &'a [u8],
    comments: bool,
    encoding: &'static Encoding,
) -> Result<Box<dyn DxfStreamReader + 'a>> {
    if is_binary(data) {
        Ok(Box::new(
            DxfBinaryReader::new(data)?
                .with_comments(comments)
                .with_encoding(Some(encoding)),
        ))
    } else {
        Ok(Box::new(
            DxfTextReader::new(data)
                .with_comments(comments)
                .with_encoding(Some(encoding)),
        ))
    }
}

/// Scan the HEADER section for version, code page and handle seed.
///
/// Stops at the end of the HEADER section, at the first other section or at
/// the first broken tag.
pub fn dxf_info(data: &[u8]) -> Result<DxfInfo> {
    let binary = is_binary(data);
    let mut reader = tagger(data, false, encoding_rs::WINDOWS_1252)?;
    let mut version = None;
    let mut code_page = None;
    let mut handseed = None;

    let mut in_header = false;
    let mut expect_name = false;
    let mut variable: Option<String> = None;
    while let Ok(Some(tag)) = reader.read_tag() {
        let text = tag.as_str().map(str::trim).unwrap_or("");
        if tag.code == 0 {
            match text.to_ascii_uppercase().as_str() {
                "SECTION" => expect_name = true,
                "ENDSEC" if in_header => break,
                "EOF" => break,
                _ => {}
            }
            continue;
        }
        if expect_name {
            expect_name = false;
            if tag.code == 2 && text.eq_ignore_ascii_case("HEADER") {
                in_header = true;
                continue;
            }
            break;
        }
        if !in_header {
            continue;
        }
        if tag.code == 9 {
            variable = Some(text.to_ascii_uppercase());
            continue;
        }
        match variable.take().as_deref() {
            Some("$ACADVER") => version = Some(DxfVersion::from_version_string(text)),
            Some("$DWGCODEPAGE") => code_page = Some(text.to_string()),
            Some("$HANDSEED") => handseed = Handle::from_hex(text),
            _ => {}
        }
    }

    let version = version.unwrap_or(DxfVersion::AC1009);
    let encoding = text_encoding(version, code_page.as_deref());
    Ok(DxfInfo {
        version,
        code_page,
        handseed,
        encoding,
        binary,
    })
}

/// Strict pipeline: tagger, compiler, assembler, builder
pub(crate) fn load_strict(data: &[u8], config: &DxfReaderConfiguration) -> Result<CadDocument> {
    let info = dxf_info(data)?;
    let encoding = config.encoding.unwrap_or(info.encoding);
    tracing::debug!(version = ?info.version, encoding = encoding.name(), binary = info.binary, "loading");

    let reader = tagger(data, config.preserve_comments, encoding)?;
    let sections = SectionAssembler::new(false)
        .assemble(TagCompiler::new(reader, CompileMode::Compiled))?;
    let (doc, _) = DocumentBuilder::new(false, encoding).build(sections)?;
    tracing::info!(version = ?doc.version(), objects = doc.entity_count(), "loaded document");
    Ok(doc)
}

/// DXF file reader
pub struct DxfReader {
    data: Vec<u8>,
    config: DxfReaderConfiguration,
}

impl DxfReader {
    /// Create a reader over in-memory data
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            config: DxfReaderConfiguration::default(),
        }
    }

    /// Create a new DXF reader from any reader
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(data))
    }

    /// Create a new DXF reader from a file path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }

    /// Set the reader configuration.
    pub fn with_configuration(mut self, config: DxfReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    pub fn configuration(&self) -> &DxfReaderConfiguration {
        &self.config
    }

    /// HEADER pre-scan
    pub fn info(&self) -> Result<DxfInfo> {
        dxf_info(&self.data)
    }

    /// Read the document, through the recovery loader if `failsafe` is set
    pub fn read(self) -> Result<CadDocument> {
        if self.config.failsafe {
            return self.recover();
        }
        load_strict(&self.data, &self.config)
    }

    /// Read the document with the recovery loader
    pub fn recover(&self) -> Result<CadDocument> {
        self.loader().load()
    }

    /// A recovery loader over the data, for callers that want its state
    pub fn loader(&self) -> RecoveryLoader<'_> {
        RecoveryLoader::new(&self.data, self.config.clone())
    }

    /// The tag stream: compiled or raw per `compile_tags`, with or without
    /// comments per `preserve_comments`
    pub fn tags(&self) -> Result<Vec<Tag>> {
        let encoding = match self.config.encoding {
            Some(encoding) => encoding,
            None => dxf_info(&self.data)?.encoding,
        };
        let reader = tagger(&self.data, self.config.preserve_comments, encoding)?;
        let mode = if self.config.compile_tags {
            CompileMode::Compiled
        } else {
            CompileMode::Raw
        };
        TagIter::new(TagCompiler::new(reader, mode)).collect()
    }
}
