//! Error types for dxfdoc

use crate::types::Handle;
use std::io;
use thiserror::Error;

/// Main error type for dxfdoc operations
#[derive(Debug, Error)]
pub enum DxfError {
    /// IO error occurred during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported DXF version
    #[error("Unsupported DXF version: {0:?}")]
    UnsupportedVersion(String),

    /// A group code or value could not be parsed
    #[error("Malformed tag near line {line}: {message}")]
    MalformedTag { line: usize, message: String },

    /// ENDSEC without a matching SECTION
    #[error("ENDSEC without SECTION near line {line}")]
    UnexpectedSectionEnd { line: usize },

    /// Stream ended (or a new SECTION started) before ENDSEC
    #[error("Missing ENDSEC for section {0}")]
    MissingSectionEnd(String),

    /// Stream ended without the `0/EOF` tag
    #[error("Unexpected end of stream, missing EOF tag")]
    MissingEof,

    /// The same section appears more than once
    #[error("Duplicate section: {0}")]
    DuplicateSection(String),

    /// Generic structural problem (missing section name, broken table, ...)
    #[error("Invalid DXF structure: {0}")]
    Structure(String),

    /// Handle value is not a hexadecimal number
    #[error("Invalid handle: {0:?}")]
    InvalidHandle(String),

    /// Two objects claim the same handle
    #[error("Duplicate handle: {0:X}")]
    DuplicateHandle(Handle),

    /// Table entry name already exists
    #[error("Entry '{name}' already exists in table {table}")]
    DuplicateEntry { table: String, name: String },

    /// Table entry or layout does not exist
    #[error("Entry '{name}' not found in {table}")]
    EntryNotFound { table: String, name: String },

    /// Operation is not supported for this object
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Attribute name unknown for the entity type, or value of the wrong kind
    #[error("Invalid attribute '{name}' for {dxf_type}")]
    InvalidAttribute { dxf_type: String, name: String },

    /// The recovery loader could not produce a valid document
    #[error("Recovery failed: {} failure(s) after {} repair action(s)", failures.len(), actions.len())]
    RecoveryFailed {
        actions: Vec<String>,
        failures: Vec<String>,
    },
}

impl DxfError {
    pub(crate) fn malformed(line: usize, message: impl Into<String>) -> Self {
        DxfError::MalformedTag {
            line,
            message: message.into(),
        }
    }

    /// Errors caused by a broken tag stream or document structure.
    ///
    /// These move the recovery loader from strict parsing into repair mode;
    /// everything else (IO, API contract violations) is reported as-is.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            DxfError::MalformedTag { .. }
                | DxfError::UnexpectedSectionEnd { .. }
                | DxfError::MissingSectionEnd(_)
                | DxfError::MissingEof
                | DxfError::DuplicateSection(_)
                | DxfError::Structure(_)
                | DxfError::InvalidHandle(_)
                | DxfError::DuplicateHandle(_)
        )
    }
}

/// Result type alias for dxfdoc operations
pub type Result<T> = std::result::Result<T, DxfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DxfError::UnsupportedVersion("AC1001".to_string());
        assert_eq!(err.to_string(), "Unsupported DXF version: \"AC1001\"");
    }

    #[test]
    fn test_duplicate_entry_display() {
        let err = DxfError::DuplicateEntry {
            table: "LAYER".to_string(),
            name: "Walls".to_string(),
        };
        assert_eq!(err.to_string(), "Entry 'Walls' already exists in table LAYER");
    }

    #[test]
    fn test_structural_classification() {
        assert!(DxfError::malformed(3, "bad code").is_structural());
        assert!(DxfError::MissingEof.is_structural());
        assert!(DxfError::DuplicateHandle(Handle::new(0x1F)).is_structural());
        assert!(!DxfError::UnsupportedOperation("x".into()).is_structural());
        let io_err: DxfError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(!io_err.is_structural());
    }

    #[test]
    fn test_recovery_failed_display() {
        let err = DxfError::RecoveryFailed {
            actions: vec!["a".into(), "b".into()],
            failures: vec!["f".into()],
        };
        assert!(err.to_string().contains("1 failure(s) after 2 repair action(s)"));
    }
}
