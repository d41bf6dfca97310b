//! # dxfdoc
//!
//! A pure Rust DXF document model: tag streams, tables, blocks, layouts and
//! objects, with versioned reading and writing.
//!
//! ## Features
//!
//! - Read and write ASCII and binary DXF
//! - Read R12 and older through R2018; write R12 and R2000 through R2018
//! - R13/R14 and pre-R12 content is upgraded while loading
//! - Unknown tags, entity types and sections survive a load/save cycle
//! - Recovery loading of damaged files with a report of every repair
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dxfdoc::{CadDocument, DxfReader, DxfWriter, DxfEntity, Vector3};
//!
//! let mut doc = DxfReader::from_file("sample.dxf")?.read()?;
//! for entity in doc.modelspace_entities() {
//!     println!("{} on layer {:?}", entity.dxf_type(), entity.get_str("layer"));
//! }
//!
//! let line = DxfEntity::new("LINE")
//!     .with("start", Vector3::new(0.0, 0.0, 0.0))?
//!     .with("end", Vector3::new(10.0, 0.0, 0.0))?;
//! doc.add_entity(line)?;
//! DxfWriter::new(&doc).write_to_file("output.dxf")?;
//! # Ok::<(), dxfdoc::DxfError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`io::dxf::reader`] - taggers, tag compiler, section assembler,
//!   document builder and the recovery loader
//! - [`entities`] - the generic [`DxfEntity`] with static per-type schemas
//!   and the record codec
//! - [`CadDocument`] - one handle-keyed store, with tables, blocks, layouts
//!   and objects referring to it by handle
//! - [`io::dxf::writer`] - section writer and ASCII/binary stream writers

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod blocks;
pub mod database;
pub mod document;
pub mod entities;
pub mod error;
pub mod header;
pub mod io;
pub mod layouts;
pub mod notification;
pub mod objects;
pub mod tables;
pub mod types;
pub mod upgrade;
pub mod xdata;

// Re-export commonly used types
pub use error::{DxfError, Result};
pub use types::{DxfVersion, Handle, Vector2, Vector3};

pub use entities::{DxfEntity, EntityKind};
pub use header::HeaderVariables;
pub use layouts::{Layout, Layouts};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use tables::{Table, TableKind, TableView, TableViewMut};

// Re-export document
pub use document::CadDocument;

// Re-export I/O types
pub use io::dxf::{
    dxf_info, read_files_parallel, DxfReader, DxfReaderConfiguration, DxfWriter,
    DxfWriterConfiguration, LoaderState, RecoveryLoader,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_cad_document_creation() {
        let doc = CadDocument::new();
        assert_eq!(doc.version(), DxfVersion::AC1032);

        let doc2 = CadDocument::with_version(DxfVersion::AC1014);
        assert_eq!(doc2.version(), DxfVersion::AC1015);
    }
}
