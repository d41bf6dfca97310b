//! Loading of versions that cannot be written back as-is.

mod common;

use common::*;
use dxfdoc::{dxf_info, DxfReader, DxfVersion, NotificationType, TableKind, Vector3};

/// R14 content is upgraded to R2000 while loading.
#[test]
fn test_r14_upgrade() {
    let doc = load(&r14_file());
    assert_eq!(doc.version(), DxfVersion::AC1015);
    assert_eq!(doc.upgraded_from(), Some(DxfVersion::AC1014));
    assert!(doc.notifications().has_type(NotificationType::Upgrade));

    let line = doc.modelspace_entities()[0];
    assert_eq!(line.get_point("start"), Some(Vector3::new(1.0, 2.0, 2.5)));
    assert_eq!(line.get_point("end"), Some(Vector3::new(3.0, 4.0, 2.5)));
    assert!(line.extra_tags().all(|t| t.code != 38));
}

/// DIMFIT is replaced by DIMATFIT and DIMTMOVE.
#[test]
fn test_dimfit_replaced() {
    let doc = load(&r14_file());
    assert!(!doc.header.contains("$DIMFIT"));
    assert_eq!(doc.header.get_int("$DIMATFIT"), Some(3));
    assert_eq!(doc.header.get_int("$DIMTMOVE"), Some(2));
}

/// The upgraded document saves as R2000 by default.
#[test]
fn test_upgraded_document_saves() {
    let doc = load(&r14_file());
    let text = save_text(&doc, doc.version());
    assert!(text.contains("AC1015"));
    let loaded = DxfReader::from_bytes(text.into_bytes()).read().unwrap();
    assert_eq!(loaded.upgraded_from(), None);
    assert_eq!(
        loaded.modelspace_entities()[0].get_point("start"),
        Some(Vector3::new(1.0, 2.0, 2.5))
    );
}

/// Releases before R12 load as R12.
#[test]
fn test_pre_r12_upgrade() {
    let data = r12_file(&r12_line("0", "0.0")).replace("AC1009", "AC1006");
    assert_eq!(dxf_info(data.as_bytes()).unwrap().version, DxfVersion::AC1006);
    let doc = load(&data);
    assert_eq!(doc.version(), DxfVersion::AC1009);
    assert_eq!(doc.upgraded_from(), Some(DxfVersion::AC1006));
    assert_eq!(doc.modelspace_entities().len(), 1);

    assert!(doc.table(TableKind::BlockRecord).len() >= 2);
    assert!(!doc.objects().is_empty());
    assert!(doc.root_dictionary().is_some());
    assert!(doc.named_dictionary("ACAD_LAYOUT").is_some());
}

/// R12 loads without an upgrade and keeps its layout blocks.
#[test]
fn test_r12_not_upgraded() {
    let doc = load(&r12_drawing());
    assert_eq!(doc.version(), DxfVersion::AC1009);
    assert_eq!(doc.upgraded_from(), None);
    assert!(!doc.notifications().has_type(NotificationType::Upgrade));
    assert!(doc.layers().has_entry("walls"));
    assert_eq!(doc.block("door").unwrap().entities.len(), 1);
    assert!(doc.active_layout().is_some());
}

/// The HEADER scan reports version, code page and encoding.
#[test]
fn test_dxf_info() {
    let data = r12_file("").replace("ANSI_1252", "ANSI_1251");
    let info = dxf_info(data.as_bytes()).unwrap();
    assert_eq!(info.version, DxfVersion::AC1009);
    assert_eq!(info.code_page.as_deref(), Some("ANSI_1251"));
    assert_eq!(info.encoding, encoding_rs::WINDOWS_1251);
    assert!(!info.binary);
    assert_eq!(info.release(), "R12");
}
