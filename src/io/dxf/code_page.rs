//! `$DWGCODEPAGE` to text encoding mapping.
//!
//! Files older than R2007 store text in the code page named by the header;
//! R2007 and later are always UTF-8.

use crate::types::DxfVersion;
use encoding_rs::Encoding;

/// Get the `encoding_rs` encoding for a DXF code page string.
///
/// Returns `None` if the encoding is UTF-8 (no transcoding needed) or the
/// code page string is not recognized.
///
/// The lookup is case-insensitive. Unknown names fall back to Windows-1252.
pub fn encoding_from_code_page(code_page: &str) -> Option<&'static Encoding> {
    match code_page.to_ascii_lowercase().as_str() {
        // Asian encodings
        "gb2312" | "ansi_936" => Some(encoding_rs::GBK),
        "big5" | "ansi_950" => Some(encoding_rs::BIG5),
        "korean" | "ansi_949" | "johab" => Some(encoding_rs::EUC_KR),
        "ansi_932" => Some(encoding_rs::SHIFT_JIS),

        // DOS/OEM code pages
        "dos437" => Some(encoding_rs::IBM866), // closest available in encoding_rs
        "dos850" => Some(encoding_rs::WINDOWS_1252), // Western European
        "dos852" => Some(encoding_rs::WINDOWS_1250), // Central European
        "dos855" | "dos866" => Some(encoding_rs::IBM866), // Cyrillic
        "dos857" => Some(encoding_rs::WINDOWS_1254), // Turkish
        "dos860" => Some(encoding_rs::WINDOWS_1252), // Portuguese
        "dos861" => Some(encoding_rs::WINDOWS_1252), // Icelandic
        "dos863" => Some(encoding_rs::WINDOWS_1252), // Canadian-French
        "dos865" => Some(encoding_rs::WINDOWS_1252), // Nordic
        "dos869" => Some(encoding_rs::WINDOWS_1253), // Greek

        // Windows/ANSI code pages
        "ansi_874" => Some(encoding_rs::WINDOWS_874),
        "ansi_1250" => Some(encoding_rs::WINDOWS_1250),
        "ansi_1251" => Some(encoding_rs::WINDOWS_1251),
        "ansi_1252" => Some(encoding_rs::WINDOWS_1252),
        "ansi_1253" => Some(encoding_rs::WINDOWS_1253),
        "ansi_1254" => Some(encoding_rs::WINDOWS_1254),
        "ansi_1255" => Some(encoding_rs::WINDOWS_1255),
        "ansi_1256" => Some(encoding_rs::WINDOWS_1256),
        "ansi_1257" => Some(encoding_rs::WINDOWS_1257),
        "ansi_1258" => Some(encoding_rs::WINDOWS_1258),

        // ISO encodings
        "iso8859-1" | "iso_8859-1" => Some(encoding_rs::WINDOWS_1252),
        "iso8859-2" | "iso_8859-2" => Some(encoding_rs::ISO_8859_2),
        "iso8859-3" | "iso_8859-3" => Some(encoding_rs::ISO_8859_3),
        "iso8859-4" | "iso_8859-4" => Some(encoding_rs::ISO_8859_4),
        "iso8859-5" | "iso_8859-5" => Some(encoding_rs::ISO_8859_5),
        "iso8859-6" | "iso_8859-6" => Some(encoding_rs::ISO_8859_6),
        "iso8859-7" | "iso_8859-7" => Some(encoding_rs::ISO_8859_7),
        "iso8859-8" | "iso_8859-8" => Some(encoding_rs::ISO_8859_8),
        "iso8859-9" | "iso_8859-9" => Some(encoding_rs::WINDOWS_1254),
        "iso8859-10" | "iso_8859-10" => Some(encoding_rs::ISO_8859_10),
        "iso8859-13" | "iso_8859-13" => Some(encoding_rs::ISO_8859_13),
        "iso8859-14" | "iso_8859-14" => Some(encoding_rs::ISO_8859_14),
        "iso8859-15" | "iso_8859-15" => Some(encoding_rs::ISO_8859_15),

        // KOI8-R (Russian)
        "koi8-r" => Some(encoding_rs::KOI8_R),
        "koi8-u" => Some(encoding_rs::KOI8_U),

        // ASCII / UTF-8 / no fallback needed
        "ascii" | "utf-8" | "utf8" | "unicode" => None,

        // Default: Windows-1252 (most common DXF fallback)
        _ => Some(encoding_rs::WINDOWS_1252),
    }
}

/// Encoding used for the text of a file of the given version.
pub fn text_encoding(version: DxfVersion, code_page: Option<&str>) -> &'static Encoding {
    if version.is_utf8() {
        return encoding_rs::UTF_8;
    }
    code_page
        .and_then(encoding_from_code_page)
        .unwrap_or(encoding_rs::WINDOWS_1252)
}

/// `$DWGCODEPAGE` value written for an encoding.
pub fn code_page_name(encoding: &'static Encoding) -> &'static str {
    if encoding == encoding_rs::GBK {
        "ANSI_936"
    } else if encoding == encoding_rs::BIG5 {
        "ANSI_950"
    } else if encoding == encoding_rs::EUC_KR {
        "ANSI_949"
    } else if encoding == encoding_rs::SHIFT_JIS {
        "ANSI_932"
    } else if encoding == encoding_rs::WINDOWS_874 {
        "ANSI_874"
    } else if encoding == encoding_rs::WINDOWS_1250 {
        "ANSI_1250"
    } else if encoding == encoding_rs::WINDOWS_1251 {
        "ANSI_1251"
    } else if encoding == encoding_rs::WINDOWS_1253 {
        "ANSI_1253"
    } else if encoding == encoding_rs::WINDOWS_1254 {
        "ANSI_1254"
    } else if encoding == encoding_rs::WINDOWS_1255 {
        "ANSI_1255"
    } else if encoding == encoding_rs::WINDOWS_1256 {
        "ANSI_1256"
    } else if encoding == encoding_rs::WINDOWS_1257 {
        "ANSI_1257"
    } else if encoding == encoding_rs::WINDOWS_1258 {
        "ANSI_1258"
    } else {
        "ANSI_1252"
    }
}
