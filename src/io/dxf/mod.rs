//! DXF (Drawing Exchange Format) reading and writing

pub mod code_page;
pub mod group_code;
pub mod reader;
pub mod tag;
pub mod writer;

pub use group_code::GroupCodeValueType;
pub use reader::{dxf_info, DxfInfo, DxfReader, DxfReaderConfiguration, LoaderState, RecoveryLoader};
pub use tag::{Tag, TagValue};
pub use writer::{
    write_binary_dxf, write_dxf, DxfBinaryWriter, DxfStreamWriter, DxfStreamWriterExt,
    DxfTextWriter, DxfWriter, DxfWriterConfiguration, SectionWriter,
};

use crate::document::CadDocument;
use crate::error::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Load independent files on the rayon thread pool.
///
/// Results are returned in the order of `paths`; one broken file does not
/// affect the others.
pub fn read_files_parallel<P>(paths: &[P], config: &DxfReaderConfiguration) -> Vec<(PathBuf, Result<CadDocument>)>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            let result = DxfReader::from_file(path)
                .map(|reader| reader.with_configuration(config.clone()))
                .and_then(DxfReader::read);
            if let Err(err) = &result {
                tracing::warn!(path = %path.display(), %err, "failed to load");
            }
            (path.to_path_buf(), result)
        })
        .collect()
}
