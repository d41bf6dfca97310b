//! Tag level access: comments, raw and compiled mode, ASCII against binary.

mod common;

use common::*;
use dxfdoc::io::dxf::tag::{Tag, TagValue};
use dxfdoc::{CadDocument, DxfReader, DxfReaderConfiguration, DxfVersion, Vector2, Vector3};

fn tags(data: &[u8], config: DxfReaderConfiguration) -> Vec<Tag> {
    DxfReader::from_bytes(data)
        .with_configuration(config)
        .tags()
        .unwrap()
}

/// Comments are dropped by default and kept on request.
#[test]
fn test_comments() {
    let data = format!("999\nexported by hand\n{}", r12_file(&r12_line("0", "0.0")));

    let default = tags(data.as_bytes(), DxfReaderConfiguration::default());
    assert!(default.iter().all(|t| t.code != 999));

    let config = DxfReaderConfiguration {
        preserve_comments: true,
        ..Default::default()
    };
    let kept = tags(data.as_bytes(), config);
    assert_eq!(kept[0], Tag::text(999, "exported by hand"));
    assert_eq!(kept.len(), default.len() + 1);

    // comments never reach the document
    assert_eq!(load(&data).modelspace_entities().len(), 1);
}

/// Points compile into one tag; raw mode keeps the coordinates apart.
#[test]
fn test_raw_and_compiled() {
    let data = r12_file(&dxf(&[(0, "POINT"), (8, "0"), (10, "1.5"), (20, "2.5")]));

    let compiled = tags(data.as_bytes(), DxfReaderConfiguration::default());
    let point = compiled.iter().find(|t| t.code == 10).unwrap();
    assert_eq!(point.value, TagValue::Point2(Vector2::new(1.5, 2.5)));
    assert!(compiled.iter().all(|t| t.code != 20));

    let config = DxfReaderConfiguration {
        compile_tags: false,
        ..Default::default()
    };
    let raw = tags(data.as_bytes(), config);
    assert!(raw.iter().any(|t| t.code == 20));
    assert_eq!(raw.len(), compiled.len() + 1);
}

/// Binary and ASCII output of one document produce the same tags.
#[test]
fn test_binary_matches_ascii() {
    let mut doc = CadDocument::with_version(DxfVersion::AC1027);
    doc.add_entity(line(Vector3::new(0.5, 0.25, 0.0), Vector3::new(8.0, 8.0, 1.0)))
        .unwrap();

    let ascii = tags(&save(&doc, DxfVersion::AC1027, false), Default::default());
    let binary = tags(&save(&doc, DxfVersion::AC1027, true), Default::default());
    assert_eq!(ascii.len(), binary.len());
    for (a, b) in ascii.iter().zip(&binary) {
        assert_eq!(a.code, b.code);
        match (&a.value, &b.value) {
            (TagValue::Str(x), TagValue::Str(y)) => assert_eq!(x.trim(), y.trim()),
            (x, y) => assert_eq!(x, y, "group code {}", a.code),
        }
    }
}
