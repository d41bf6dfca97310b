//! DXF group codes
//!
//! The group code of a tag determines the type of the value that follows.
//! The ranges below follow the DXF reference "Group Code Value Types" table.

/// Value type implied by a group code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupCodeValueType {
    /// Text, names, subclass markers
    String,
    /// 64-bit float (coordinates, distances, angles)
    Double,
    /// 16-bit integer
    Int16,
    /// 32-bit integer
    Int32,
    /// 64-bit integer
    Int64,
    /// Boolean flag (0/1), one byte in binary DXF
    Bool,
    /// Object handle rendered as hex string
    Handle,
    /// Binary chunk rendered as hex string in ASCII DXF
    Binary,
}

impl GroupCodeValueType {
    /// Look up the value type of a group code
    pub fn from_code(code: i32) -> Self {
        use GroupCodeValueType::*;
        match code {
            5 | 105 => Handle,
            0..=9 => String,
            10..=59 => Double,
            60..=79 => Int16,
            90..=99 => Int32,
            100..=104 => String,
            110..=149 => Double,
            160..=169 => Int64,
            170..=179 => Int16,
            210..=239 => Double,
            270..=289 => Int16,
            290..=299 => Bool,
            300..=309 => String,
            310..=319 => Binary,
            320..=369 => Handle,
            370..=389 => Int16,
            390..=399 => Handle,
            400..=409 => Int16,
            410..=419 => String,
            420..=429 => Int32,
            430..=439 => String,
            440..=459 => Int32,
            460..=469 => Double,
            470..=479 => String,
            480..=481 => Handle,
            999 => String,
            1004 => Binary,
            1005 => Handle,
            1000..=1009 => String,
            1010..=1059 => Double,
            1060..=1070 => Int16,
            1071 => Int32,
            _ => String,
        }
    }

    /// Integer-valued types
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            GroupCodeValueType::Int16
                | GroupCodeValueType::Int32
                | GroupCodeValueType::Int64
                | GroupCodeValueType::Bool
        )
    }

    /// Types stored as text in both ASCII and binary DXF
    pub fn is_text(self) -> bool {
        matches!(self, GroupCodeValueType::String | GroupCodeValueType::Handle)
    }
}

/// Comment tag, dropped by the tagger unless comments are preserved
pub const COMMENT: i32 = 999;

/// First XDATA code; 1001 starts an application group
pub const XDATA_APP: i32 = 1001;

/// Application-defined group brackets `{NAME` ... `}`
pub const APP_DATA: i32 = 102;

/// Subclass marker
pub const SUBCLASS_MARKER: i32 = 100;

/// Embedded object marker
pub const EMBEDDED_OBJECT: i32 = 101;

/// Is `code` the x component of a point that is compiled into one tag?
///
/// The matching y code is `code + 10`, the optional z code `code + 20`.
pub fn is_point_code(code: i32) -> bool {
    matches!(code, 10..=18 | 110..=112 | 210 | 1010..=1013)
}

/// Is `code` a coordinate component that only exists as part of a point?
pub fn is_point_component(code: i32) -> bool {
    is_point_code(code)
        || is_point_code(code - 10)
        || is_point_code(code - 20)
}
