//! In-memory upgrade of documents loaded from versions that cannot be
//! written (pre-R12, R13, R14)

use crate::document::CadDocument;
use crate::entities::DxfEntity;
use crate::io::dxf::tag::{Tag, TagValue};
use crate::notification::{NotificationCollection, NotificationType};
use crate::types::{DxfVersion, Vector3};

/// Points that take over the legacy entity elevation (group code 38)
static ELEVATION_POINTS: &[(&str, &[&str])] = &[
    ("LINE", &["start", "end"]),
    ("POINT", &["location"]),
    ("CIRCLE", &["center"]),
    ("ARC", &["center"]),
    ("TEXT", &["insert", "align_point"]),
    ("ATTRIB", &["insert", "align_point"]),
    ("ATTDEF", &["insert", "align_point"]),
    ("SOLID", &["vtx0", "vtx1", "vtx2", "vtx3"]),
    ("TRACE", &["vtx0", "vtx1", "vtx2", "vtx3"]),
    ("INSERT", &["insert"]),
    ("VERTEX", &["location"]),
];

/// Does a document saved as `version` need an upgrade after loading?
pub fn needs_upgrade(version: DxfVersion) -> bool {
    version != DxfVersion::Unknown && version.normalized() != version
}

/// Upgrade the content of `doc` loaded from `source`.
pub(crate) fn upgrade(doc: &mut CadDocument, source: DxfVersion, notes: &mut NotificationCollection) {
    let target = source.normalized();
    let backfill = target >= DxfVersion::AC1015;

    let mut merged = 0usize;
    let mut backfilled = 0usize;
    for entity in doc.db.iter_mut() {
        if merge_elevation(entity) {
            merged += 1;
        }
        if backfill && !entity.backfill_defaults().is_empty() {
            backfilled += 1;
        }
        if entity.dxf_type() == "DIMSTYLE" {
            upgrade_dimstyle(entity);
        }
    }
    upgrade_dimfit(doc);

    doc.set_version(target);
    doc.set_upgraded_from(source);
    tracing::info!(?source, ?target, merged, backfilled, "upgraded document");
    notes.notify(
        NotificationType::Upgrade,
        format!("upgraded from {} to {}", source.release(), target.release()),
    );
}

/// Move the entity elevation into the z axis of the primary points.
///
/// Points with a non-zero z keep their value; the 38 tag is dropped when all
/// points could take it over.
fn merge_elevation(entity: &mut DxfEntity) -> bool {
    let Some((_, points)) = ELEVATION_POINTS
        .iter()
        .find(|(dxf_type, _)| *dxf_type == entity.dxf_type())
    else {
        return false;
    };
    let Some(elevation) = entity
        .extra_tags()
        .find(|t| t.code == 38)
        .and_then(|t| t.value.as_real())
    else {
        return false;
    };

    let mut conflict = false;
    for name in points.iter() {
        let merged = match entity.get(name) {
            Some(TagValue::Point2(p)) => Vector3::new(p.x, p.y, elevation),
            Some(TagValue::Point3(p)) if p.z == 0.0 => Vector3::new(p.x, p.y, elevation),
            Some(TagValue::Point3(p)) => {
                conflict |= p.z != elevation;
                continue;
            }
            _ => continue,
        };
        if entity.set(name, merged).is_err() {
            conflict = true;
        }
    }
    if !conflict {
        entity.retain_extras(|t| t.code != 38);
    }
    true
}

/// Map the pre-R2000 `DIMFIT` value to `DIMATFIT` and `DIMTMOVE`
fn dimfit_mapping(dimfit: i64) -> (i64, i64) {
    match dimfit {
        0..=3 => (dimfit, 0),
        4 => (3, 1),
        5 => (3, 2),
        _ => (3, 0),
    }
}

fn upgrade_dimfit(doc: &mut CadDocument) {
    let Some(dimfit) = doc.header.get_int("$DIMFIT") else { return };
    let (atfit, tmove) = dimfit_mapping(dimfit);
    doc.header.remove("$DIMFIT");
    doc.header.set("$DIMATFIT", vec![Tag::new(70, atfit)]);
    doc.header.set("$DIMTMOVE", vec![Tag::new(70, tmove)]);
}

/// DIMFIT of a DIMSTYLE entry (group code 287)
fn upgrade_dimstyle(entity: &mut DxfEntity) {
    let Some(dimfit) = entity
        .extra_tags()
        .find(|t| t.code == 287)
        .and_then(|t| t.value.as_int())
    else {
        return;
    };
    let (atfit, tmove) = dimfit_mapping(dimfit);
    if entity.set("dimatfit", atfit).is_ok() && entity.set("dimtmove", tmove).is_ok() {
        entity.retain_extras(|t| t.code != 287);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector2;

    #[test]
    fn test_needs_upgrade() {
        assert!(needs_upgrade(DxfVersion::AC1012));
        assert!(needs_upgrade(DxfVersion::AC1014));
        assert!(needs_upgrade(DxfVersion::AC1006));
        assert!(!needs_upgrade(DxfVersion::AC1009));
        assert!(!needs_upgrade(DxfVersion::AC1015));
        assert!(!needs_upgrade(DxfVersion::Unknown));
    }

    #[test]
    fn test_merge_elevation_into_2d_point() {
        let mut line = DxfEntity::new("LINE")
            .with("start", Vector2::new(1.0, 2.0))
            .unwrap()
            .with("end", Vector3::new(3.0, 4.0, 0.0))
            .unwrap();
        line.push_extra(Tag::new(38, 5.0));
        assert!(merge_elevation(&mut line));
        assert_eq!(line.get_point("start"), Some(Vector3::new(1.0, 2.0, 5.0)));
        assert_eq!(line.get_point("end"), Some(Vector3::new(3.0, 4.0, 5.0)));
        assert!(line.extra_tags().all(|t| t.code != 38));
    }

    #[test]
    fn test_elevation_kept_on_conflict() {
        let mut point = DxfEntity::new("POINT")
            .with("location", Vector3::new(1.0, 2.0, 7.0))
            .unwrap();
        point.push_extra(Tag::new(38, 5.0));
        merge_elevation(&mut point);
        assert_eq!(point.get_point("location"), Some(Vector3::new(1.0, 2.0, 7.0)));
        assert!(point.extra_tags().any(|t| t.code == 38));
    }

    #[test]
    fn test_dimfit_mapping() {
        assert_eq!(dimfit_mapping(2), (2, 0));
        assert_eq!(dimfit_mapping(4), (3, 1));
        assert_eq!(dimfit_mapping(5), (3, 2));
    }

    #[test]
    fn test_upgrade_document() {
        let mut doc = CadDocument::with_version(DxfVersion::AC1015);
        doc.header.set("$DIMFIT", vec![Tag::new(70, 4i64)]);
        let mut notes = NotificationCollection::new();
        upgrade(&mut doc, DxfVersion::AC1014, &mut notes);
        assert_eq!(doc.upgraded_from(), Some(DxfVersion::AC1014));
        assert_eq!(doc.header.get_int("$DIMATFIT"), Some(3));
        assert_eq!(doc.header.get_int("$DIMTMOVE"), Some(1));
        assert!(!doc.header.contains("$DIMFIT"));
        assert!(notes.has_type(NotificationType::Upgrade));
    }
}
