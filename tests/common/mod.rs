//! Shared helpers for integration tests.
//!
//! DXF fixtures are built from text so every test states exactly which tags
//! the reader sees. Documents built through the API are saved and loaded
//! again with [`save_and_load`].

#![allow(dead_code)]

use dxfdoc::{CadDocument, DxfEntity, DxfReader, DxfWriter, DxfWriterConfiguration, DxfVersion, Vector3};

// ===========================================================================
// Text fixtures
// ===========================================================================

/// Join `code, value` pairs into an ASCII DXF stream.
pub fn dxf(pairs: &[(i32, &str)]) -> String {
    let mut out = String::new();
    for (code, value) in pairs {
        out.push_str(&format!("{}\n{}\n", code, value));
    }
    out
}

/// A LINE record as R12 writes it (no handle, no subclass markers).
pub fn r12_line(layer: &str, y: &str) -> String {
    dxf(&[
        (0, "LINE"),
        (8, layer),
        (10, "0.0"),
        (20, y),
        (30, "0.0"),
        (11, "10.0"),
        (21, y),
        (31, "0.0"),
    ])
}

/// An R12 file with a HEADER and the given ENTITIES records.
pub fn r12_file(entities: &str) -> String {
    let mut out = dxf(&[
        (0, "SECTION"),
        (2, "HEADER"),
        (9, "$ACADVER"),
        (1, "AC1009"),
        (9, "$DWGCODEPAGE"),
        (3, "ANSI_1252"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "ENTITIES"),
    ]);
    out.push_str(entities);
    out.push_str(&dxf(&[(0, "ENDSEC"), (0, "EOF")]));
    out
}

/// An R12 file with a layer table, one block and three entities.
pub fn r12_drawing() -> String {
    let mut out = dxf(&[
        (0, "SECTION"),
        (2, "HEADER"),
        (9, "$ACADVER"),
        (1, "AC1009"),
        (9, "$INSBASE"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "TABLES"),
        (0, "TABLE"),
        (2, "LAYER"),
        (70, "2"),
        (0, "LAYER"),
        (2, "0"),
        (70, "0"),
        (62, "7"),
        (6, "CONTINUOUS"),
        (0, "LAYER"),
        (2, "WALLS"),
        (70, "0"),
        (62, "1"),
        (6, "CONTINUOUS"),
        (0, "ENDTAB"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "BLOCKS"),
        (0, "BLOCK"),
        (8, "0"),
        (2, "DOOR"),
        (70, "0"),
        (10, "0.0"),
        (20, "0.0"),
        (30, "0.0"),
        (3, "DOOR"),
        (1, ""),
    ]);
    out.push_str(&r12_line("0", "1.0"));
    out.push_str(&dxf(&[
        (0, "ENDBLK"),
        (8, "0"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "ENTITIES"),
    ]));
    out.push_str(&r12_line("WALLS", "0.0"));
    out.push_str(&r12_line("WALLS", "5.0"));
    out.push_str(&dxf(&[
        (0, "INSERT"),
        (8, "0"),
        (2, "DOOR"),
        (10, "3.0"),
        (20, "4.0"),
        (30, "0.0"),
        (0, "ENDSEC"),
        (0, "EOF"),
    ]));
    out
}

/// An R14 file with an entity elevation and the legacy DIMFIT variable.
pub fn r14_file() -> String {
    dxf(&[
        (0, "SECTION"),
        (2, "HEADER"),
        (9, "$ACADVER"),
        (1, "AC1014"),
        (9, "$DIMFIT"),
        (70, "5"),
        (0, "ENDSEC"),
        (0, "SECTION"),
        (2, "ENTITIES"),
        (0, "LINE"),
        (5, "2F"),
        (100, "AcDbEntity"),
        (8, "0"),
        (100, "AcDbLine"),
        (38, "2.5"),
        (10, "1.0"),
        (20, "2.0"),
        (11, "3.0"),
        (21, "4.0"),
        (0, "ENDSEC"),
        (0, "EOF"),
    ])
}

// ===========================================================================
// Documents
// ===========================================================================

pub fn line(start: Vector3, end: Vector3) -> DxfEntity {
    DxfEntity::new("LINE")
        .with("start", start)
        .unwrap()
        .with("end", end)
        .unwrap()
}

/// Load a text fixture with the default (strict) configuration.
pub fn load(data: &str) -> CadDocument {
    DxfReader::from_bytes(data.as_bytes())
        .read()
        .unwrap_or_else(|e| panic!("failed to load fixture: {e}"))
}

/// Save as `version` and load the output again.
pub fn save_and_load(doc: &CadDocument, version: DxfVersion, binary: bool) -> CadDocument {
    let data = save(doc, version, binary);
    DxfReader::from_bytes(data)
        .read()
        .unwrap_or_else(|e| panic!("failed to load saved {version:?}: {e}"))
}

pub fn save(doc: &CadDocument, version: DxfVersion, binary: bool) -> Vec<u8> {
    DxfWriter::new(doc)
        .with_configuration(DxfWriterConfiguration {
            binary,
            version: Some(version),
        })
        .write_to_vec()
        .unwrap_or_else(|e| panic!("failed to save {version:?}: {e}"))
}

/// Save as ASCII and return the text.
pub fn save_text(doc: &CadDocument, version: DxfVersion) -> String {
    String::from_utf8_lossy(&save(doc, version, false)).into_owned()
}

/// Entity types of model space in drawing order.
pub fn modelspace_types(doc: &CadDocument) -> Vec<String> {
    doc.modelspace_entities()
        .iter()
        .map(|e| e.dxf_type().to_string())
        .collect()
}

/// A temp file path unique to the calling test.
pub fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("dxfdoc-tests-{}", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    dir.join(name)
}
