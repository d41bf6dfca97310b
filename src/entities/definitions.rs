//! Schema definitions of the supported DXF types
//!
//! Types not listed here are loaded as opaque entities: their tags are kept
//! verbatim and written back unchanged.

use super::schema::{
    handle, int, point2, point3, real, text, EntityKind, EntitySchema, SubclassDef,
};
use crate::types::DxfVersion::{AC1009, AC1015, AC1018};

macro_rules! schema {
    ($kind:ident, $dxf_type:literal, $min_version:expr, [$($subclass:expr),* $(,)?]) => {
        EntitySchema {
            dxf_type: $dxf_type,
            kind: EntityKind::$kind,
            min_version: $min_version,
            handle_code: 5,
            subclasses: &[$($subclass),*],
        }
    };
}

/// Common graphical attributes
const ENTITY: SubclassDef = SubclassDef {
    markers: &["AcDbEntity"],
    attribs: &[
        int("paperspace", 67, 0),
        text("layer", 8, "0").required(),
        text("linetype", 6, "BYLAYER"),
        text("material_handle", 347, "0").since(AC1018),
        int("color", 62, 256),
        int("lineweight", 370, -1).since(AC1015).backfill(),
        real("ltscale", 48, 1.0).since(AC1015).backfill(),
        int("invisible", 60, 0).since(AC1015),
        int("true_color", 420, 0).since(AC1018),
        text("color_name", 430, "").since(AC1018),
        int("transparency", 440, 0).since(AC1018),
        handle("plotstyle_handle", 390).since(AC1015),
    ],
};

const SYMBOL_TABLE_RECORD: SubclassDef = SubclassDef {
    markers: &["AcDbSymbolTableRecord"],
    attribs: &[],
};

const TEXT_BASE: SubclassDef = SubclassDef {
    markers: &["AcDbText"],
    attribs: &[
        real("thickness", 39, 0.0),
        point3("insert", 10, 0.0, 0.0, 0.0).required(),
        real("height", 40, 2.5).required(),
        text("text", 1, "").required(),
        real("rotation", 50, 0.0),
        real("width", 41, 1.0),
        real("oblique", 51, 0.0),
        text("style", 7, "Standard"),
        int("text_generation_flag", 71, 0),
        int("halign", 72, 0),
        point3("align_point", 11, 0.0, 0.0, 0.0),
        point3("extrusion", 210, 0.0, 0.0, 1.0),
    ],
};

pub static LINE: EntitySchema = schema!(Graphic, "LINE", AC1009, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbLine"],
        attribs: &[
            real("thickness", 39, 0.0),
            point3("start", 10, 0.0, 0.0, 0.0).required(),
            point3("end", 11, 0.0, 0.0, 0.0).required(),
            point3("extrusion", 210, 0.0, 0.0, 1.0),
        ],
    },
]);

pub static POINT: EntitySchema = schema!(Graphic, "POINT", AC1009, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbPoint"],
        attribs: &[
            point3("location", 10, 0.0, 0.0, 0.0).required(),
            real("thickness", 39, 0.0),
            point3("extrusion", 210, 0.0, 0.0, 1.0),
            real("angle", 50, 0.0),
        ],
    },
]);

const CIRCLE_BASE: SubclassDef = SubclassDef {
    markers: &["AcDbCircle"],
    attribs: &[
        real("thickness", 39, 0.0),
        point3("center", 10, 0.0, 0.0, 0.0).required(),
        real("radius", 40, 1.0).required(),
        point3("extrusion", 210, 0.0, 0.0, 1.0),
    ],
};

pub static CIRCLE: EntitySchema = schema!(Graphic, "CIRCLE", AC1009, [ENTITY, CIRCLE_BASE]);

pub static ARC: EntitySchema = schema!(Graphic, "ARC", AC1009, [
    ENTITY,
    CIRCLE_BASE,
    SubclassDef {
        markers: &["AcDbArc"],
        attribs: &[
            real("start_angle", 50, 0.0).required(),
            real("end_angle", 51, 360.0).required(),
        ],
    },
]);

pub static TEXT: EntitySchema = schema!(Graphic, "TEXT", AC1009, [
    ENTITY,
    TEXT_BASE,
    SubclassDef {
        markers: &["AcDbText"],
        attribs: &[int("valign", 73, 0)],
    },
]);

pub static ATTRIB: EntitySchema = schema!(Graphic, "ATTRIB", AC1009, [
    ENTITY,
    TEXT_BASE,
    SubclassDef {
        markers: &["AcDbAttribute"],
        attribs: &[
            text("tag", 2, "").required(),
            int("flags", 70, 0).required(),
            int("field_length", 73, 0),
            int("valign", 74, 0),
            int("lock_position", 280, 0).since(AC1018),
        ],
    },
]);

pub static ATTDEF: EntitySchema = schema!(Graphic, "ATTDEF", AC1009, [
    ENTITY,
    TEXT_BASE,
    SubclassDef {
        markers: &["AcDbAttributeDefinition"],
        attribs: &[
            text("prompt", 3, "").required(),
            text("tag", 2, "").required(),
            int("flags", 70, 0).required(),
            int("field_length", 73, 0),
            int("valign", 74, 0),
            int("lock_position", 280, 0).since(AC1018),
        ],
    },
]);

const TRACE: SubclassDef = SubclassDef {
    markers: &["AcDbTrace"],
    attribs: &[
        point3("vtx0", 10, 0.0, 0.0, 0.0).required(),
        point3("vtx1", 11, 0.0, 0.0, 0.0).required(),
        point3("vtx2", 12, 0.0, 0.0, 0.0).required(),
        point3("vtx3", 13, 0.0, 0.0, 0.0).required(),
        real("thickness", 39, 0.0),
        point3("extrusion", 210, 0.0, 0.0, 1.0),
    ],
};

pub static SOLID: EntitySchema = schema!(Graphic, "SOLID", AC1009, [ENTITY, TRACE]);

pub static TRACE_ENTITY: EntitySchema = schema!(Graphic, "TRACE", AC1009, [ENTITY, TRACE]);

pub static FACE3D: EntitySchema = schema!(Graphic, "3DFACE", AC1009, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbFace"],
        attribs: &[
            point3("vtx0", 10, 0.0, 0.0, 0.0).required(),
            point3("vtx1", 11, 0.0, 0.0, 0.0).required(),
            point3("vtx2", 12, 0.0, 0.0, 0.0).required(),
            point3("vtx3", 13, 0.0, 0.0, 0.0).required(),
            int("invisible_edge", 70, 0),
        ],
    },
]);

pub static INSERT: EntitySchema = schema!(Graphic, "INSERT", AC1009, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbBlockReference", "AcDbMInsertBlock"],
        attribs: &[
            int("attribs_follow", 66, 0),
            text("name", 2, "").required(),
            point3("insert", 10, 0.0, 0.0, 0.0).required(),
            real("xscale", 41, 1.0),
            real("yscale", 42, 1.0),
            real("zscale", 43, 1.0),
            real("rotation", 50, 0.0),
            int("column_count", 70, 1),
            int("row_count", 71, 1),
            real("column_spacing", 44, 0.0),
            real("row_spacing", 45, 0.0),
            point3("extrusion", 210, 0.0, 0.0, 1.0),
        ],
    },
]);

pub static POLYLINE: EntitySchema = schema!(Graphic, "POLYLINE", AC1009, [
    ENTITY,
    SubclassDef {
        markers: &[
            "AcDb2dPolyline",
            "AcDb3dPolyline",
            "AcDbPolyFaceMesh",
            "AcDbPolygonMesh",
        ],
        attribs: &[
            int("vertices_follow", 66, 1).required(),
            point3("elevation", 10, 0.0, 0.0, 0.0).required(),
            real("thickness", 39, 0.0),
            int("flags", 70, 0),
            real("default_start_width", 40, 0.0),
            real("default_end_width", 41, 0.0),
            int("m_count", 71, 0),
            int("n_count", 72, 0),
            int("m_smooth_density", 73, 0),
            int("n_smooth_density", 74, 0),
            int("smooth_type", 75, 0),
            point3("extrusion", 210, 0.0, 0.0, 1.0),
        ],
    },
]);

pub static VERTEX: EntitySchema = schema!(Graphic, "VERTEX", AC1009, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbVertex"],
        attribs: &[],
    },
    SubclassDef {
        markers: &[
            "AcDb2dVertex",
            "AcDb3dPolylineVertex",
            "AcDbPolyFaceMeshVertex",
            "AcDbPolygonMeshVertex",
            "AcDbFaceRecord",
        ],
        attribs: &[
            point3("location", 10, 0.0, 0.0, 0.0).required(),
            real("start_width", 40, 0.0),
            real("end_width", 41, 0.0),
            real("bulge", 42, 0.0),
            int("flags", 70, 0),
            real("tangent", 50, 0.0),
            int("vtx0", 71, 0),
            int("vtx1", 72, 0),
            int("vtx2", 73, 0),
            int("vtx3", 74, 0),
        ],
    },
]);

pub static SEQEND: EntitySchema = schema!(Graphic, "SEQEND", AC1009, [ENTITY]);

pub static LWPOLYLINE: EntitySchema = schema!(Graphic, "LWPOLYLINE", AC1015, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbPolyline"],
        attribs: &[
            int("count", 90, 0).required(),
            int("flags", 70, 0).required(),
            real("const_width", 43, 0.0),
            real("elevation", 38, 0.0),
            real("thickness", 39, 0.0),
            point3("extrusion", 210, 0.0, 0.0, 1.0),
        ],
    },
]);

pub static ELLIPSE: EntitySchema = schema!(Graphic, "ELLIPSE", AC1015, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbEllipse"],
        attribs: &[
            point3("center", 10, 0.0, 0.0, 0.0).required(),
            point3("major_axis", 11, 1.0, 0.0, 0.0).required(),
            point3("extrusion", 210, 0.0, 0.0, 1.0),
            real("ratio", 40, 1.0).required(),
            real("start_param", 41, 0.0).required(),
            real("end_param", 42, std::f64::consts::TAU).required(),
        ],
    },
]);

// The text content (codes 3 and 1) stays in the subclass payload so the
// chunk order is preserved.
pub static MTEXT: EntitySchema = schema!(Graphic, "MTEXT", AC1015, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbMText"],
        attribs: &[
            point3("insert", 10, 0.0, 0.0, 0.0).required(),
            real("char_height", 40, 2.5).required(),
            real("width", 41, 0.0),
            int("attachment_point", 71, 1).required(),
            int("flow_direction", 72, 1),
            text("style", 7, "Standard"),
            point3("extrusion", 210, 0.0, 0.0, 1.0),
            point3("text_direction", 11, 1.0, 0.0, 0.0),
            real("rotation", 50, 0.0),
            int("line_spacing_style", 73, 1),
            real("line_spacing_factor", 44, 1.0),
        ],
    },
]);

pub static VIEWPORT: EntitySchema = schema!(Graphic, "VIEWPORT", AC1009, [
    ENTITY,
    SubclassDef {
        markers: &["AcDbViewport"],
        attribs: &[
            point3("center", 10, 0.0, 0.0, 0.0).required(),
            real("width", 40, 1.0).required(),
            real("height", 41, 1.0).required(),
            int("status", 68, 0).required(),
            int("id", 69, 2).required(),
            point2("view_center", 12, 0.0, 0.0).since(AC1015),
            point2("snap_base", 13, 0.0, 0.0).since(AC1015),
            point2("snap_spacing", 14, 10.0, 10.0).since(AC1015),
            point2("grid_spacing", 15, 10.0, 10.0).since(AC1015),
            point3("view_direction", 16, 0.0, 0.0, 1.0).since(AC1015),
            point3("view_target", 17, 0.0, 0.0, 0.0).since(AC1015),
            real("lens", 42, 50.0).since(AC1015),
            real("front_clip", 43, 0.0).since(AC1015),
            real("back_clip", 44, 0.0).since(AC1015),
            real("view_height", 45, 1.0).since(AC1015),
            real("snap_angle", 50, 0.0).since(AC1015),
            real("view_twist", 51, 0.0).since(AC1015),
            int("circle_zoom", 72, 100).since(AC1015),
            int("flags", 90, 0).since(AC1015),
        ],
    },
]);

pub static BLOCK: EntitySchema = EntitySchema {
    dxf_type: "BLOCK",
    kind: EntityKind::Structure,
    min_version: AC1009,
    handle_code: 5,
    subclasses: &[
        ENTITY,
        SubclassDef {
            markers: &["AcDbBlockBegin"],
            attribs: &[
                text("name", 2, "").required(),
                int("flags", 70, 0).required(),
                point3("base_point", 10, 0.0, 0.0, 0.0).required(),
                text("name2", 3, "").required(),
                text("xref_path", 1, "").required(),
                text("description", 4, "").since(AC1015),
            ],
        },
    ],
};

pub static ENDBLK: EntitySchema = EntitySchema {
    dxf_type: "ENDBLK",
    kind: EntityKind::Structure,
    min_version: AC1009,
    handle_code: 5,
    subclasses: &[
        ENTITY,
        SubclassDef {
            markers: &["AcDbBlockEnd"],
            attribs: &[],
        },
    ],
};

pub static TABLE_HEAD: EntitySchema = EntitySchema {
    dxf_type: "TABLE",
    kind: EntityKind::Structure,
    min_version: AC1009,
    handle_code: 5,
    subclasses: &[SubclassDef {
        markers: &["AcDbSymbolTable"],
        attribs: &[text("name", 2, "").required(), int("count", 70, 0).required()],
    }],
};

pub static LAYER: EntitySchema = schema!(TableEntry, "LAYER", AC1009, [
    SYMBOL_TABLE_RECORD,
    SubclassDef {
        markers: &["AcDbLayerTableRecord"],
        attribs: &[
            text("name", 2, "").required(),
            int("flags", 70, 0).required(),
            int("color", 62, 7).required(),
            text("linetype", 6, "Continuous").required(),
            int("plot", 290, 1).since(AC1015),
            int("lineweight", 370, -3).since(AC1015).backfill(),
            handle("plotstyle_handle", 390).since(AC1015),
            handle("material_handle", 347).since(AC1018),
            int("true_color", 420, 0).since(AC1018),
        ],
    },
]);

pub static LTYPE: EntitySchema = schema!(TableEntry, "LTYPE", AC1009, [
    SYMBOL_TABLE_RECORD,
    SubclassDef {
        markers: &["AcDbLinetypeTableRecord"],
        attribs: &[
            text("name", 2, "").required(),
            int("flags", 70, 0).required(),
            text("description", 3, "").required(),
            int("alignment", 72, 65).required(),
            int("items", 73, 0).required(),
            real("total_length", 40, 0.0).required(),
        ],
    },
]);

pub static STYLE: EntitySchema = schema!(TableEntry, "STYLE", AC1009, [
    SYMBOL_TABLE_RECORD,
    SubclassDef {
        markers: &["AcDbTextStyleTableRecord"],
        attribs: &[
            text("name", 2, "").required(),
            int("flags", 70, 0).required(),
            real("height", 40, 0.0).required(),
            real("width", 41, 1.0).required(),
            real("oblique", 50, 0.0).required(),
            int("generation_flags", 71, 0).required(),
            real("last_height", 42, 2.5).required(),
            text("font", 3, "txt").required(),
            text("bigfont", 4, "").required(),
        ],
    },
]);

pub static VPORT: EntitySchema = schema!(TableEntry, "VPORT", AC1009, [
    SYMBOL_TABLE_RECORD,
    SubclassDef {
        markers: &["AcDbViewportTableRecord"],
        attribs: &[
            text("name", 2, "").required(),
            int("flags", 70, 0).required(),
            point2("lower_left", 10, 0.0, 0.0).required(),
            point2("upper_right", 11, 1.0, 1.0).required(),
            point2("center", 12, 0.0, 0.0).required(),
            point2("snap_base", 13, 0.0, 0.0).required(),
            point2("snap_spacing", 14, 0.5, 0.5).required(),
            point2("grid_spacing", 15, 0.5, 0.5).required(),
            point3("direction", 16, 0.0, 0.0, 1.0).required(),
            point3("target", 17, 0.0, 0.0, 0.0).required(),
            real("height", 40, 1.0).required(),
            real("aspect_ratio", 41, 1.0).required(),
            real("focal_length", 42, 50.0).required(),
            real("front_clipping", 43, 0.0).required(),
            real("back_clipping", 44, 0.0).required(),
            real("snap_rotation", 50, 0.0).required(),
            real("view_twist", 51, 0.0).required(),
            int("view_mode", 71, 0).required(),
            int("circle_sides", 72, 1000).required(),
            int("fast_zoom", 73, 1).required(),
            int("ucs_icon", 74, 3).required(),
            int("snap_on", 75, 0).required(),
            int("grid_on", 76, 0).required(),
            int("snap_style", 77, 0).required(),
            int("snap_isopair", 78, 0).required(),
        ],
    },
]);

pub static VIEW: EntitySchema = schema!(TableEntry, "VIEW", AC1009, [
    SYMBOL_TABLE_RECORD,
    SubclassDef {
        markers: &["AcDbViewTableRecord"],
        attribs: &[
            text("name", 2, "").required(),
            int("flags", 70, 0).required(),
            real("height", 40, 1.0).required(),
            point2("center", 10, 0.0, 0.0).required(),
            real("width", 41, 1.0).required(),
            point3("direction", 11, 0.0, 0.0, 1.0).required(),
            point3("target", 12, 0.0, 0.0, 0.0).required(),
            real("focal_length", 42, 50.0).required(),
            real("front_clipping", 43, 0.0).required(),
            real("back_clipping", 44, 0.0).required(),
            real("view_twist", 50, 0.0).required(),
            int("view_mode", 71, 0).required(),
        ],
    },
]);

pub static UCS: EntitySchema = schema!(TableEntry, "UCS", AC1009, [
    SYMBOL_TABLE_RECORD,
    SubclassDef {
        markers: &["AcDbUCSTableRecord"],
        attribs: &[
            text("name", 2, "").required(),
            int("flags", 70, 0).required(),
            point3("origin", 10, 0.0, 0.0, 0.0).required(),
            point3("xaxis", 11, 1.0, 0.0, 0.0).required(),
            point3("yaxis", 12, 0.0, 1.0, 0.0).required(),
        ],
    },
]);

pub static APPID: EntitySchema = schema!(TableEntry, "APPID", AC1009, [
    SYMBOL_TABLE_RECORD,
    SubclassDef {
        markers: &["AcDbRegAppTableRecord"],
        attribs: &[text("name", 2, "").required(), int("flags", 70, 0).required()],
    },
]);

pub static DIMSTYLE: EntitySchema = EntitySchema {
    dxf_type: "DIMSTYLE",
    kind: EntityKind::TableEntry,
    min_version: AC1009,
    handle_code: 105,
    subclasses: &[
        SYMBOL_TABLE_RECORD,
        SubclassDef {
            markers: &["AcDbDimStyleTableRecord"],
            attribs: &[
                text("name", 2, "").required(),
                int("flags", 70, 0).required(),
                text("dimpost", 3, ""),
                text("dimapost", 4, ""),
                real("dimscale", 40, 1.0),
                real("dimasz", 41, 2.5),
                real("dimexo", 42, 0.625),
                real("dimdli", 43, 3.75),
                real("dimexe", 44, 1.25),
                real("dimtxt", 140, 2.5),
                real("dimcen", 141, 2.5),
                real("dimgap", 147, 0.625),
                int("dimtad", 77, 0),
                int("dimdec", 271, 4).since(AC1015),
                int("dimatfit", 289, 3).since(AC1015).backfill(),
                int("dimtmove", 279, 0).since(AC1015).backfill(),
                handle("dimtxsty", 340).since(AC1015),
            ],
        },
    ],
};

pub static BLOCK_RECORD: EntitySchema = EntitySchema {
    dxf_type: "BLOCK_RECORD",
    kind: EntityKind::TableEntry,
    min_version: AC1015,
    handle_code: 5,
    subclasses: &[
        SYMBOL_TABLE_RECORD,
        SubclassDef {
            markers: &["AcDbBlockTableRecord"],
            attribs: &[
                text("name", 2, "").required(),
                handle("layout", 340).required(),
                int("units", 70, 0).since(AC1018),
                int("explode", 280, 1).since(AC1018),
                int("scale", 281, 0).since(AC1018),
            ],
        },
    ],
};

pub static DICTIONARY: EntitySchema = schema!(Object, "DICTIONARY", AC1015, [SubclassDef {
    markers: &["AcDbDictionary"],
    attribs: &[int("hard_owned", 280, 0), int("cloning", 281, 1)],
}]);

pub static LAYOUT: EntitySchema = schema!(Object, "LAYOUT", AC1015, [
    SubclassDef {
        markers: &["AcDbPlotSettings"],
        attribs: &[
            text("page_setup_name", 1, "").required(),
            text("plot_configuration_file", 2, "").required(),
            text("paper_size", 4, "").required(),
            text("plot_view_name", 6, "").required(),
            real("left_margin", 40, 0.0).required(),
            real("bottom_margin", 41, 0.0).required(),
            real("right_margin", 42, 0.0).required(),
            real("top_margin", 43, 0.0).required(),
            real("paper_width", 44, 0.0).required(),
            real("paper_height", 45, 0.0).required(),
            real("plot_origin_x", 46, 0.0).required(),
            real("plot_origin_y", 47, 0.0).required(),
            real("scale_numerator", 142, 1.0).required(),
            real("scale_denominator", 143, 1.0).required(),
            int("plot_layout_flags", 70, 688).required(),
            int("plot_paper_units", 72, 0).required(),
            int("plot_rotation", 73, 0).required(),
            int("plot_type", 74, 5).required(),
            text("current_style_sheet", 7, "").required(),
            int("standard_scale_type", 75, 16).required(),
        ],
    },
    SubclassDef {
        markers: &["AcDbLayout"],
        attribs: &[
            text("name", 1, "").required(),
            int("layout_flags", 70, 1).required(),
            int("taborder", 71, 0).required(),
            point2("limmin", 10, 0.0, 0.0).required(),
            point2("limmax", 11, 420.0, 297.0).required(),
            point3("insert_base", 12, 0.0, 0.0, 0.0).required(),
            point3("extmin", 14, 1e20, 1e20, 1e20).required(),
            point3("extmax", 15, -1e20, -1e20, -1e20).required(),
            real("elevation", 146, 0.0).required(),
            point3("ucs_origin", 13, 0.0, 0.0, 0.0).required(),
            point3("ucs_xaxis", 16, 1.0, 0.0, 0.0).required(),
            point3("ucs_yaxis", 17, 0.0, 1.0, 0.0).required(),
            int("ucs_type", 76, 1).required(),
            handle("block_record", 330).required(),
            handle("viewport", 331),
        ],
    },
]);

/// All schemas known to the codec
pub static ALL: &[&EntitySchema] = &[
    &LINE,
    &POINT,
    &CIRCLE,
    &ARC,
    &TEXT,
    &ATTRIB,
    &ATTDEF,
    &SOLID,
    &TRACE_ENTITY,
    &FACE3D,
    &INSERT,
    &POLYLINE,
    &VERTEX,
    &SEQEND,
    &LWPOLYLINE,
    &ELLIPSE,
    &MTEXT,
    &VIEWPORT,
    &BLOCK,
    &ENDBLK,
    &TABLE_HEAD,
    &LAYER,
    &LTYPE,
    &STYLE,
    &VPORT,
    &VIEW,
    &UCS,
    &APPID,
    &DIMSTYLE,
    &BLOCK_RECORD,
    &DICTIONARY,
    &LAYOUT,
];
