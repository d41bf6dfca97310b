//! Basic value types shared by the whole crate

mod handle;
mod vector;

pub use handle::{Handle, HandleSeed};
pub use vector::{Vector2, Vector3};

use std::fmt;

/// DXF file format version (`$ACADVER`)
///
/// Variants are declared in release order so that `<`/`>` compare releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DxfVersion {
    /// Version string not recognized
    Unknown,
    /// Release 2.5
    AC1002,
    /// Release 2.6
    AC1003,
    /// Release 9
    AC1004,
    /// Release 10
    AC1006,
    /// Release 11/12
    AC1009,
    /// Release 13
    AC1012,
    /// Release 14
    AC1014,
    /// AutoCAD 2000
    AC1015,
    /// AutoCAD 2004
    AC1018,
    /// AutoCAD 2007
    AC1021,
    /// AutoCAD 2010
    AC1024,
    /// AutoCAD 2013
    AC1027,
    /// AutoCAD 2018
    AC1032,
}

impl DxfVersion {
    /// Oldest version written natively besides R12
    pub const MIN_MODERN: DxfVersion = DxfVersion::AC1015;

    /// Parse a `$ACADVER` value
    pub fn from_version_string(text: &str) -> Self {
        match text.trim().to_ascii_uppercase().as_str() {
            "AC1002" => DxfVersion::AC1002,
            "AC1003" => DxfVersion::AC1003,
            "AC1004" => DxfVersion::AC1004,
            "AC1006" => DxfVersion::AC1006,
            "AC1009" => DxfVersion::AC1009,
            "AC1012" => DxfVersion::AC1012,
            "AC1014" => DxfVersion::AC1014,
            "AC1015" => DxfVersion::AC1015,
            "AC1018" => DxfVersion::AC1018,
            "AC1021" => DxfVersion::AC1021,
            "AC1024" => DxfVersion::AC1024,
            "AC1027" => DxfVersion::AC1027,
            "AC1032" => DxfVersion::AC1032,
            _ => DxfVersion::Unknown,
        }
    }

    /// The `$ACADVER` string
    pub fn to_dxf_string(self) -> &'static str {
        match self {
            DxfVersion::Unknown => "AC1009",
            DxfVersion::AC1002 => "AC1002",
            DxfVersion::AC1003 => "AC1003",
            DxfVersion::AC1004 => "AC1004",
            DxfVersion::AC1006 => "AC1006",
            DxfVersion::AC1009 => "AC1009",
            DxfVersion::AC1012 => "AC1012",
            DxfVersion::AC1014 => "AC1014",
            DxfVersion::AC1015 => "AC1015",
            DxfVersion::AC1018 => "AC1018",
            DxfVersion::AC1021 => "AC1021",
            DxfVersion::AC1024 => "AC1024",
            DxfVersion::AC1027 => "AC1027",
            DxfVersion::AC1032 => "AC1032",
        }
    }

    /// Marketing release name ("R12", "R2000", ...)
    pub fn release(self) -> &'static str {
        match self {
            DxfVersion::Unknown => "unknown",
            DxfVersion::AC1002 => "R2.5",
            DxfVersion::AC1003 => "R2.6",
            DxfVersion::AC1004 => "R9",
            DxfVersion::AC1006 => "R10",
            DxfVersion::AC1009 => "R12",
            DxfVersion::AC1012 => "R13",
            DxfVersion::AC1014 => "R14",
            DxfVersion::AC1015 => "R2000",
            DxfVersion::AC1018 => "R2004",
            DxfVersion::AC1021 => "R2007",
            DxfVersion::AC1024 => "R2010",
            DxfVersion::AC1027 => "R2013",
            DxfVersion::AC1032 => "R2018",
        }
    }

    /// Version used for the in-memory document after loading.
    ///
    /// Pre-R12 content becomes R12, R13/R14 content becomes R2000.
    pub fn normalized(self) -> Self {
        match self {
            DxfVersion::Unknown
            | DxfVersion::AC1002
            | DxfVersion::AC1003
            | DxfVersion::AC1004
            | DxfVersion::AC1006 => DxfVersion::AC1009,
            DxfVersion::AC1012 | DxfVersion::AC1014 => DxfVersion::AC1015,
            other => other,
        }
    }

    /// Can documents be saved in this version?
    pub fn is_writable(self) -> bool {
        self == DxfVersion::AC1009 || self >= DxfVersion::MIN_MODERN
    }

    /// R12 and older: no subclass markers, owners or OBJECTS section
    pub fn is_legacy(self) -> bool {
        self <= DxfVersion::AC1009
    }

    /// R2007+ files are always UTF-8
    pub fn is_utf8(self) -> bool {
        self >= DxfVersion::AC1021
    }
}

impl Default for DxfVersion {
    fn default() -> Self {
        DxfVersion::AC1032
    }
}

impl fmt::Display for DxfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_dxf_string(), self.release())
    }
}
