//! Property tests for value formatting and table name handling.

use dxfdoc::io::dxf::tag::{format_double, Tag};
use dxfdoc::io::dxf::{DxfStreamWriterExt, DxfTextWriter};
use dxfdoc::{CadDocument, DxfError, DxfReader, DxfVersion, Handle};
use proptest::prelude::*;

proptest! {
    /// Written doubles parse back to the same value and still read as reals.
    #[test]
    fn format_double_parses_back(value in proptest::num::f64::NORMAL | proptest::num::f64::ZERO) {
        let text = format_double(value);
        prop_assert_eq!(text.parse::<f64>().unwrap(), value);
        prop_assert!(text.contains('.') || text.contains('e'));
    }

    /// Handles render as upper-case hex and parse back.
    #[test]
    fn handle_hex_round_trip(value in 1u64..u64::MAX) {
        let handle = Handle::new(value);
        let text = handle.to_hex();
        prop_assert_eq!(text.to_ascii_uppercase(), text.clone());
        prop_assert_eq!(Handle::from_hex(&text), Some(handle));
    }

    /// Any spelling of an existing layer name finds the same entry.
    #[test]
    fn layer_names_case_insensitive(name in "[A-Za-z][A-Za-z0-9_]{0,15}") {
        let mut doc = CadDocument::with_version(DxfVersion::AC1015);
        prop_assume!(!doc.layers().has_entry(&name));
        let handle = doc.layers_mut().new_entry(&name, &[]).unwrap();

        prop_assert_eq!(doc.layers().get(&name.to_ascii_uppercase()).unwrap().handle(), handle);
        prop_assert_eq!(doc.layers().get(&name.to_ascii_lowercase()).unwrap().handle(), handle);
        let is_duplicate = matches!(
            doc.layers_mut().new_entry(&name.to_ascii_lowercase(), &[]),
            Err(DxfError::DuplicateEntry { .. })
        );
        prop_assert!(is_duplicate);
        prop_assert_eq!(doc.layers().get(&name).unwrap().name(), name);
    }

    /// String values survive the text writer and the tagger unchanged.
    #[test]
    fn text_values_survive_tagging(value in "[ -~]{0,40}") {
        let value = value.trim().to_string();
        let mut buffer = Vec::new();
        {
            let mut writer = DxfTextWriter::new(&mut buffer);
            writer.write_tag(&Tag::text(1, value.clone())).unwrap();
            writer.write_eof().unwrap();
        }
        let tags = DxfReader::from_bytes(buffer).tags().unwrap();
        prop_assert_eq!(tags[0].as_str().map(str::trim), Some(value.as_str()));
    }
}
