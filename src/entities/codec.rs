//! Record <-> entity conversion
//!
//! Decoding takes the compiled tags of one record (starting with its code 0
//! tag) and routes every tag either into a schema attribute or into the
//! preserved payload of the entity. Encoding reverses this, emitting the
//! schema attributes in canonical order for a target version.

use super::{normalize, AppData, DxfEntity, ExtraTags};
use crate::error::{DxfError, Result};
use crate::io::dxf::group_code::{APP_DATA, EMBEDDED_OBJECT, SUBCLASS_MARKER, XDATA_APP};
use crate::io::dxf::tag::Tag;
use crate::types::{DxfVersion, Handle};
use crate::xdata::ExtendedData;

const REACTORS: &str = "ACAD_REACTORS";
const XDICTIONARY: &str = "ACAD_XDICTIONARY";

fn parse_handle(tag: &Tag) -> Result<Handle> {
    let text = tag.as_str().unwrap_or("");
    Handle::from_hex(text).ok_or_else(|| DxfError::InvalidHandle(text.to_string()))
}

/// Where the next unmapped tag goes
#[derive(Debug, Clone, Copy, PartialEq)]
enum Position {
    /// Before any subclass marker
    Prelude,
    /// Inside the known subclass with this index
    Known(usize),
    /// Inside an unknown subclass (the last extra group)
    Unknown,
}

/// Decode a compiled record into an entity.
///
/// Handles are validated: a garbled own handle yields `InvalidHandle`, which
/// the loader turns into an error (strict) or a fresh handle (recovery).
pub fn decode(tags: Vec<Tag>) -> Result<DxfEntity> {
    let mut iter = tags.into_iter().peekable();
    let first = iter
        .next()
        .filter(|t| t.code == 0)
        .ok_or_else(|| DxfError::Structure("record does not start with a structure tag".into()))?;
    let mut entity = DxfEntity::new(first.as_str().unwrap_or(""));
    let schema = entity.schema;
    let handle_code = schema.map(|s| s.handle_code).unwrap_or(5);
    let last_subclass = schema.map(|s| s.subclasses.len().saturating_sub(1));

    let mut position = Position::Prelude;
    let mut handle_seen = false;
    let mut owner_seen = false;

    while let Some(tag) = iter.next() {
        match tag.code {
            XDATA_APP => {
                let mut xdata = vec![tag];
                xdata.extend(iter.by_ref());
                entity.xdata = ExtendedData::from_tags(xdata);
                break;
            }
            EMBEDDED_OBJECT if schema.is_some() => {
                entity.embedded.push(tag);
                while iter.peek().map_or(false, |t| t.code != XDATA_APP) {
                    if let Some(t) = iter.next() {
                        entity.embedded.push(t);
                    }
                }
                continue;
            }
            code if code == handle_code && !handle_seen && position == Position::Prelude => {
                handle_seen = true;
                entity.handle = parse_handle(&tag)?;
                continue;
            }
            APP_DATA if position == Position::Prelude => {
                let name = tag.as_str().unwrap_or("").trim();
                if let Some(name) = name.strip_prefix('{') {
                    let mut group = Vec::new();
                    while let Some(t) = iter.next() {
                        if t.code == APP_DATA && t.as_str().map(str::trim) == Some("}") {
                            break;
                        }
                        group.push(t);
                    }
                    match name {
                        REACTORS => {
                            for t in &group {
                                entity.reactors.push(parse_handle(t)?);
                            }
                        }
                        XDICTIONARY if group.len() == 1 => {
                            entity.xdictionary = Some(parse_handle(&group[0])?);
                        }
                        _ => entity.app_data.push(AppData {
                            name: name.to_string(),
                            tags: group,
                        }),
                    }
                    continue;
                }
            }
            330 if !owner_seen && position == Position::Prelude => {
                owner_seen = true;
                entity.owner = parse_handle(&tag)?;
                continue;
            }
            SUBCLASS_MARKER => {
                let Some(schema) = schema else {
                    // opaque: markers stay in the raw payload
                    position = Position::Unknown;
                    route(&mut entity, tag, position, last_subclass);
                    continue;
                };
                let marker = tag.as_str().unwrap_or("").trim().to_string();
                let after = match position {
                    Position::Known(i) => Some(i),
                    Position::Unknown => entity.extras.last().and_then(|e| e.anchor),
                    Position::Prelude => None,
                };
                match schema.subclass_for_marker(&marker, after) {
                    Some(index) => {
                        if marker != schema.subclasses[index].marker() {
                            entity.marker_overrides.push((index, marker));
                        }
                        position = Position::Known(index);
                    }
                    None => {
                        entity.extras.push(ExtraTags {
                            anchor: after,
                            marker: Some(marker),
                            tags: Vec::new(),
                        });
                        position = Position::Unknown;
                    }
                }
                continue;
            }
            _ => {}
        }
        route(&mut entity, tag, position, last_subclass);
    }
    Ok(entity)
}

/// Put a non-structural tag into an attribute or the extra payload
fn route(entity: &mut DxfEntity, tag: Tag, position: Position, last_subclass: Option<usize>) {
    let schema = match entity.schema {
        Some(schema) => schema,
        None => {
            push_extra(entity, None, tag);
            return;
        }
    };

    let def = match position {
        Position::Unknown => None,
        Position::Known(index) => schema.subclasses[index]
            .attribs
            .iter()
            .find(|a| a.code == tag.code && !entity.attribs.contains_key(a.name)),
        // R12 and older: no markers, search every subclass
        Position::Prelude => schema
            .attribs()
            .find(|a| a.code == tag.code && !entity.attribs.contains_key(a.name)),
    };

    if let Some(def) = def {
        if let Some(value) = normalize(tag.value.clone(), def.code) {
            entity.attribs.insert(def.name, value);
            return;
        }
    }

    match position {
        Position::Unknown => match entity.extras.last_mut() {
            Some(group) => group.tags.push(tag),
            None => push_extra(entity, last_subclass, tag),
        },
        Position::Known(index) => push_extra(entity, Some(index), tag),
        Position::Prelude => push_extra(entity, last_subclass, tag),
    }
}

fn push_extra(entity: &mut DxfEntity, anchor: Option<usize>, tag: Tag) {
    match entity.extras.last_mut() {
        Some(group) if group.anchor == anchor && group.marker.is_none() => group.tags.push(tag),
        _ => entity.extras.push(ExtraTags {
            anchor,
            marker: None,
            tags: vec![tag],
        }),
    }
}

fn push_group(out: &mut Vec<Tag>, name: &str, tags: impl IntoIterator<Item = Tag>) {
    out.push(Tag::text(APP_DATA, format!("{{{}", name)));
    out.extend(tags);
    out.push(Tag::text(APP_DATA, "}"));
}

/// Encode an entity for `version`.
///
/// R12 and older output has no subclass markers, owner handles or
/// application groups; attributes newer than `version` are omitted.
pub fn encode(entity: &DxfEntity, version: DxfVersion) -> Vec<Tag> {
    let legacy = version.is_legacy();
    let schema = entity.schema;
    let mut out = vec![Tag::text(0, entity.dxf_type())];

    if entity.handle.is_valid() {
        out.push(Tag::handle(schema.map(|s| s.handle_code).unwrap_or(5), entity.handle));
    }
    if !legacy {
        if !entity.reactors.is_empty() {
            push_group(
                &mut out,
                REACTORS,
                entity.reactors.iter().map(|h| Tag::handle(330, *h)),
            );
        }
        if let Some(xdict) = entity.xdictionary {
            push_group(&mut out, XDICTIONARY, [Tag::handle(360, xdict)]);
        }
        for app in &entity.app_data {
            push_group(&mut out, &app.name, app.tags.iter().cloned());
        }
        out.push(Tag::handle(330, entity.owner));
    }

    let write_extras = |out: &mut Vec<Tag>, anchor: Option<usize>| {
        for group in entity.extras.iter().filter(|g| g.anchor == anchor) {
            if let Some(marker) = &group.marker {
                if !legacy {
                    out.push(Tag::text(SUBCLASS_MARKER, marker.clone()));
                }
            }
            out.extend(
                group
                    .tags
                    .iter()
                    .filter(|t| !(legacy && t.code == SUBCLASS_MARKER))
                    .cloned(),
            );
        }
    };

    write_extras(&mut out, None);
    if let Some(schema) = schema {
        for (index, subclass) in schema.subclasses.iter().enumerate() {
            if !legacy {
                let marker = entity
                    .marker_overrides
                    .iter()
                    .find(|(i, _)| *i == index)
                    .map(|(_, m)| m.clone())
                    .unwrap_or_else(|| subclass.marker().to_string());
                out.push(Tag::text(SUBCLASS_MARKER, marker));
            }
            for def in subclass.attribs {
                if def.min_version > version {
                    continue;
                }
                let value = match entity.attribs.get(def.name) {
                    Some(value) => Some(value.clone()),
                    None if def.is_required() => def.default.to_value(),
                    None => None,
                };
                if let Some(value) = value {
                    out.push(Tag { code: def.code, value });
                }
            }
            write_extras(&mut out, Some(index));
        }
    }

    if !legacy {
        out.extend(entity.embedded.iter().cloned());
    }
    out.extend(entity.xdata.to_tags());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dxf::tag::TagValue;
    use crate::types::{Vector2, Vector3};

    fn line_r2000() -> Vec<Tag> {
        vec![
            Tag::text(0, "LINE"),
            Tag::text(5, "2A"),
            Tag::text(102, "{ACAD_REACTORS"),
            Tag::text(330, "1F"),
            Tag::text(102, "}"),
            Tag::text(330, "1F"),
            Tag::text(100, "AcDbEntity"),
            Tag::text(8, "Walls"),
            Tag::new(62, 1i64),
            Tag::text(100, "AcDbLine"),
            Tag::new(10, Vector3::new(0.0, 0.0, 0.0)),
            Tag::new(11, Vector3::new(10.0, 5.0, 0.0)),
            Tag::text(300, "VENDOR_PAYLOAD"),
            Tag::text(1001, "MYAPP"),
            Tag::text(1000, "note"),
        ]
    }

    #[test]
    fn test_decode_structured() {
        let line = decode(line_r2000()).unwrap();
        assert_eq!(line.handle(), Handle::new(0x2A));
        assert_eq!(line.owner(), Handle::new(0x1F));
        assert_eq!(line.reactors(), &[Handle::new(0x1F)]);
        assert_eq!(line.get_str("layer").as_deref(), Some("Walls"));
        assert_eq!(line.get_point("end"), Some(Vector3::new(10.0, 5.0, 0.0)));
        assert_eq!(
            line.extra_tags().cloned().collect::<Vec<_>>(),
            vec![Tag::text(300, "VENDOR_PAYLOAD")]
        );
        assert_eq!(line.xdata().len(), 1);
    }

    #[test]
    fn test_encode_reproduces_record() {
        let tags = line_r2000();
        let line = decode(tags.clone()).unwrap();
        assert_eq!(encode(&line, DxfVersion::AC1015), tags);
    }

    #[test]
    fn test_decode_flat_r12() {
        let tags = vec![
            Tag::text(0, "CIRCLE"),
            Tag::text(8, "0"),
            Tag::new(10, Vector3::new(1.0, 2.0, 0.0)),
            Tag::new(40, 3.0),
            Tag::new(71, 1i64),
        ];
        let circle = decode(tags).unwrap();
        assert!(circle.handle().is_null());
        assert_eq!(circle.get_real("radius"), Some(3.0));
        assert_eq!(circle.extra_tags().count(), 1);
    }

    #[test]
    fn test_encode_legacy_omits_modern_data() {
        let mut line = decode(line_r2000()).unwrap();
        line.set("lineweight", 25).unwrap();
        let tags = encode(&line, DxfVersion::AC1009);
        assert!(tags.iter().all(|t| t.code != 100 && t.code != 330 && t.code != 102));
        assert!(tags.iter().all(|t| t.code != 370));
        let tags = encode(&line, DxfVersion::AC1015);
        assert!(tags.contains(&Tag::new(370, 25i64)));
    }

    #[test]
    fn test_required_defaults_written() {
        let line = DxfEntity::new("LINE");
        let tags = encode(&line, DxfVersion::AC1009);
        assert_eq!(
            tags,
            vec![
                Tag::text(0, "LINE"),
                Tag::text(8, "0"),
                Tag::new(10, Vector3::ZERO),
                Tag::new(11, Vector3::ZERO),
            ]
        );
    }

    #[test]
    fn test_unknown_subclass_preserved() {
        let tags = vec![
            Tag::text(0, "LINE"),
            Tag::text(5, "10"),
            Tag::text(330, "1F"),
            Tag::text(100, "AcDbEntity"),
            Tag::text(8, "0"),
            Tag::text(100, "AcDbLine"),
            Tag::new(10, Vector3::ZERO),
            Tag::new(11, Vector3::ZERO),
            Tag::text(100, "AcDbVendorLine"),
            Tag::new(70, 4i64),
            Tag::new(40, 0.25),
        ];
        let line = decode(tags.clone()).unwrap();
        assert_eq!(line.extras().len(), 1);
        assert_eq!(line.extras()[0].marker.as_deref(), Some("AcDbVendorLine"));
        assert_eq!(encode(&line, DxfVersion::AC1015), tags);
    }

    #[test]
    fn test_opaque_round_trip() {
        let tags = vec![
            Tag::text(0, "ACAD_PROXY_ENTITY"),
            Tag::text(5, "33"),
            Tag::text(330, "1F"),
            Tag::text(100, "AcDbEntity"),
            Tag::text(8, "0"),
            Tag::text(100, "AcDbProxyEntity"),
            Tag::new(90, 498i64),
        ];
        let proxy = decode(tags.clone()).unwrap();
        assert!(proxy.is_opaque());
        assert_eq!(proxy.handle(), Handle::new(0x33));
        assert_eq!(encode(&proxy, DxfVersion::AC1015), tags);
    }

    #[test]
    fn test_invalid_handle() {
        let tags = vec![Tag::text(0, "LINE"), Tag::text(5, "XYZ!")];
        assert!(matches!(decode(tags), Err(DxfError::InvalidHandle(_))));
    }

    #[test]
    fn test_dimstyle_handle_code() {
        let tags = vec![
            Tag::text(0, "DIMSTYLE"),
            Tag::text(105, "4E"),
            Tag::text(330, "A"),
            Tag::text(100, "AcDbSymbolTableRecord"),
            Tag::text(100, "AcDbDimStyleTableRecord"),
            Tag::text(2, "Standard"),
            Tag::new(70, 0i64),
        ];
        let style = decode(tags.clone()).unwrap();
        assert_eq!(style.handle(), Handle::new(0x4E));
        assert_eq!(style.name(), "Standard");
        assert_eq!(encode(&style, DxfVersion::AC1015), tags);
    }

    #[test]
    fn test_marker_variant_kept() {
        let tags = vec![
            Tag::text(0, "VERTEX"),
            Tag::text(5, "40"),
            Tag::text(330, "3F"),
            Tag::text(100, "AcDbEntity"),
            Tag::text(8, "0"),
            Tag::text(100, "AcDbVertex"),
            Tag::text(100, "AcDb3dPolylineVertex"),
            Tag::new(10, Vector3::new(1.0, 1.0, 1.0)),
            Tag::new(70, 32i64),
        ];
        let vertex = decode(tags.clone()).unwrap();
        assert_eq!(encode(&vertex, DxfVersion::AC1015), tags);
    }

    #[test]
    fn test_vport_points_2d() {
        let tags = vec![
            Tag::text(0, "VPORT"),
            Tag::text(2, "*ACTIVE"),
            Tag::new(70, 0i64),
            Tag::new(10, Vector2::new(0.0, 0.0)),
        ];
        let vport = decode(tags).unwrap();
        assert_eq!(
            vport.get("lower_left"),
            Some(&TagValue::Point2(Vector2::new(0.0, 0.0)))
        );
    }
}
