//! End-to-end parsing of IDF documents.

use emn_importer::idf::{self, IdfError, Point, Primitive, SectionKind, Units};

const HEADER_MM: &str = r#".HEADER
IDF_FILE 3.0 "Test System" "2024-01-01" 1 "TestBoard" "MM"
.END_HEADER
"#;

const HEADER_THOU: &str = r#".HEADER
IDF_FILE 3.0 "Test System" "2024-01-01" 1 "TestBoard" "THOU"
.END_HEADER
"#;

const RECT_BOARD: &str = r#"
.BOARD_OUTLINE "TEST_OWNER" 1.6
0 0 0 0
0 100 0 0
0 100 50 0
0 0 50 0
0 0 0 0
.END_BOARD_OUTLINE
"#;

fn doc(sections: &[&str]) -> String {
    sections.concat()
}

// =============================================================================
// Header and units
// =============================================================================

#[test]
fn test_simple_board() {
    let doc = idf::parse(&doc(&[HEADER_MM, RECT_BOARD])).expect("parse");

    assert_eq!(doc.header.file_type, "IDF_FILE");
    assert_eq!(doc.header.source_system, "Test System");
    assert_eq!(doc.header.name, "TestBoard");
    assert_eq!(doc.header.units, Units::Mm);
    assert_eq!(doc.board_owner, "TEST_OWNER");
    assert!(doc.board_cutouts.is_empty());
    assert!(doc.holes.is_empty());
}

#[test]
fn test_thou_scaling_matches_mm() {
    let thou_board = r#"
.BOARD_OUTLINE "TEST_OWNER" 63
0 0 0 0
0 4000 0 0
0 4000 2000 0
0 0 2000 0
.END_BOARD_OUTLINE
"#;
    let mm = idf::parse(&doc(&[HEADER_MM, thou_board])).expect("parse mm");
    let thou = idf::parse(&doc(&[HEADER_THOU, thou_board])).expect("parse thou");

    let mm_vertices = mm.board_outline.vertices();
    let thou_vertices = thou.board_outline.vertices();
    assert_eq!(mm_vertices.len(), thou_vertices.len());
    for (a, b) in mm_vertices.iter().zip(&thou_vertices) {
        assert!((a.x * 0.0254 - b.x).abs() < 1e-9);
        assert!((a.y * 0.0254 - b.y).abs() < 1e-9);
    }
    assert!((thou_vertices[2].x - 101.6).abs() < 1e-9);
    assert!((thou.board_thickness - 63.0 * 0.0254).abs() < 1e-9);
}

#[test]
fn test_unknown_units_not_fatal() {
    let header = HEADER_MM.replace("\"MM\"", "\"FURLONG\"");
    let doc = idf::parse(&doc(&[&header, RECT_BOARD])).expect("parse");
    assert_eq!(doc.header.units, Units::Unknown("FURLONG".to_string()));
    assert_eq!(doc.board_outline.vertices()[1], Point::new(100.0, 0.0));
}

// =============================================================================
// Cardinality
// =============================================================================

#[test]
fn test_two_headers_rejected() {
    let err = idf::parse(&doc(&[HEADER_MM, "\n", HEADER_MM, RECT_BOARD])).unwrap_err();
    assert!(matches!(err, IdfError::HeaderCardinality { count: 2 }));
}

#[test]
fn test_missing_header_rejected() {
    let err = idf::parse(RECT_BOARD).unwrap_err();
    assert!(matches!(err, IdfError::HeaderCardinality { count: 0 }));
}

#[test]
fn test_missing_board_outline_rejected() {
    let err = idf::parse(HEADER_MM).unwrap_err();
    assert!(matches!(err, IdfError::BoardOutlineCardinality { count: 0 }));
}

#[test]
fn test_unclosed_section_rejected() {
    let text = doc(&[HEADER_MM, ".DRILLED_HOLES\n2.0 10 10 PTH VIA THRU OWNER\n"]);
    let err = idf::parse(&text).unwrap_err();
    assert!(matches!(
        err,
        IdfError::SectionNotClosed { ref terminator } if terminator == ".END_DRILLED_HOLES"
    ));
}

#[test]
fn test_stray_token_rejected() {
    let err = idf::parse(&doc(&[HEADER_MM, "GARBAGE\n", RECT_BOARD])).unwrap_err();
    assert!(matches!(err, IdfError::UnexpectedToken { ref token, .. } if token == "GARBAGE"));
}

// =============================================================================
// Record sections
// =============================================================================

#[test]
fn test_minimal_end_to_end() {
    let text = doc(&[
        HEADER_MM,
        r#"
.BOARD_OUTLINE "TEST_OWNER" 1.6
0 0 0 0
0 50 0 0
0 50 30 0
0 0 30 0
.END_BOARD_OUTLINE

.DRILLED_HOLES
2.0 10 10 "PTH" "VIA" "THRU" "OWNER1"
.END_DRILLED_HOLES

.NOTES
15 25 1.5 12 "KEEP OUT AREA"
.END_NOTES
"#,
    ]);
    let text = text.replace("KEEP OUT", "KEEP\u{1} OUT\u{2}");
    let doc = idf::parse(&text).expect("parse");

    let vertices = doc.board_outline.vertices();
    assert_eq!(
        vertices,
        vec![
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 30.0),
            Point::new(0.0, 30.0),
        ]
    );
    assert_eq!(doc.holes.len(), 1);
    assert_eq!(doc.notes.len(), 1);
    assert_eq!(doc.notes[0].text, "KEEP OUT AREA");
}

#[test]
fn test_holes() {
    let text = doc(&[
        HEADER_MM,
        RECT_BOARD,
        r#"
.DRILLED_HOLES
2.0 10 10 "PTH" "VIA" "THRU" "OWNER1"
1.5 40 20 "PTH" "VIA" "THRU" "OWNER1"
3.0 25 15 "NPTH" "MTG" "THRU" "OWNER2"
.END_DRILLED_HOLES
"#,
    ]);
    let doc = idf::parse(&text).expect("parse");

    assert_eq!(doc.holes.len(), 3);
    let hole = &doc.holes[2];
    assert!((hole.diameter - 3.0).abs() < f64::EPSILON);
    assert_eq!(hole.position, Point::new(25.0, 15.0));
    assert!(!hole.is_plated());
    assert_eq!(hole.assoc, "MTG");
    assert_eq!(hole.owner, "OWNER2");
}

#[test]
fn test_holes_field_count_mismatch() {
    let text = doc(&[
        HEADER_MM,
        RECT_BOARD,
        ".DRILLED_HOLES\n2.0 10 10 PTH VIA THRU\n.END_DRILLED_HOLES\n",
    ]);
    let err = idf::parse(&text).unwrap_err();
    assert!(matches!(
        err,
        IdfError::FieldCountMismatch { ref section, expected_multiple: 7, actual: 6 }
            if section == ".DRILLED_HOLES"
    ));
}

#[test]
fn test_placement_and_find_refdes() {
    let text = doc(&[
        HEADER_MM,
        RECT_BOARD,
        r#"
.PLACEMENT
"0603" "R0603_10K" "R1" 20 10 0 0 "TOP" "PLACED"
"SOIC8" "IC_OPAMP" "U1" 30 20 0 0 "TOP" "PLACED"
"0402" "C0402_100NF" "C1" 15 8 0 90 "BOTTOM" "PLACED"
.END_PLACEMENT
"#,
    ]);
    let doc = idf::parse(&text).expect("parse");

    assert_eq!(doc.placement.len(), 3);
    let u1 = doc.find_refdes("U1").expect("U1 present");
    assert_eq!(u1.package, "SOIC8");
    assert_eq!(u1.position, Point::new(30.0, 20.0));

    let c1 = doc.find_refdes("C1").expect("C1 present");
    assert!(c1.is_bottom());
    assert!((c1.rotation - 90.0).abs() < f64::EPSILON);

    assert!(doc.find_refdes("X999").is_none());
}

#[test]
fn test_malformed_number_rejected() {
    let text = doc(&[HEADER_MM, RECT_BOARD, ".NOTES\n15 abc 1.5 12 \"X\"\n.END_NOTES\n"]);
    let err = idf::parse(&text).unwrap_err();
    assert!(matches!(err, IdfError::InvalidField { field: "y", .. }));
}

// =============================================================================
// Outline sections
// =============================================================================

#[test]
fn test_board_cutout() {
    let board = r#"
.BOARD_OUTLINE "TEST_OWNER" 1.6
0 0 0 0
0 100 0 0
0 100 50 0
0 0 50 0
0 0 0 0
1 40 20 0
1 60 20 0
1 60 30 0
1 40 30 0
1 40 20 0
.END_BOARD_OUTLINE
"#;
    let doc = idf::parse(&doc(&[HEADER_MM, board])).expect("parse");

    assert_eq!(doc.board_cutouts.len(), 1);
    let cutout = doc.board_cutouts[0].vertices();
    assert_eq!(
        cutout,
        vec![
            Point::new(40.0, 30.0),
            Point::new(60.0, 30.0),
            Point::new(60.0, 20.0),
            Point::new(40.0, 20.0),
        ]
    );
}

#[test]
fn test_keepouts() {
    let text = doc(&[
        HEADER_MM,
        RECT_BOARD,
        r#"
.ROUTE_KEEPOUT "OWNER" "TOP"
0 10 10 0
0 20 10 0
0 20 20 0
0 10 20 0
0 10 10 0
.END_ROUTE_KEEPOUT

.VIA_KEEPOUT "OWNER"
0 50 25 0
0 60 25 0
0 60 35 0
0 50 35 0
0 50 25 0
.END_VIA_KEEPOUT

.PLACE_KEEPOUT "MCAD" "BOTTOM" 2.5
0 70 10 0
0 80 10 0
0 80 20 0
.END_PLACE_KEEPOUT
"#,
    ]);
    let doc = idf::parse(&text).expect("parse");

    assert_eq!(doc.route_keepouts.len(), 1);
    assert_eq!(doc.route_keepouts[0].layers, "TOP");
    assert_eq!(doc.route_keepouts[0].kind, SectionKind::RouteKeepout);
    assert_eq!(doc.via_keepouts.len(), 1);
    assert_eq!(doc.via_keepouts[0].shape.vertices().len(), 4);
    assert_eq!(doc.place_keepouts.len(), 1);
    assert_eq!(doc.place_keepouts[0].layers, "BOTTOM");
    assert!((doc.place_keepouts[0].thickness - 2.5).abs() < f64::EPSILON);
}

#[test]
fn test_other_route_and_place_outlines() {
    let text = doc(&[
        HEADER_MM,
        RECT_BOARD,
        r#"
.OTHER_OUTLINE MCAD
heatsink_area 3.0 TOP
0 5 5 0
0 15 5 0
0 15 15 0
.END_OTHER_OUTLINE

.ROUTE_OUTLINE ECAD
ALL
0 1 1 0
0 99 1 0
0 99 49 0
0 1 49 0
.END_ROUTE_OUTLINE

.PLACE_OUTLINE MCAD
TOP 10.0
0 2 2 0
0 98 2 0
0 98 48 0
.END_PLACE_OUTLINE
"#,
    ]);
    let doc = idf::parse(&text).expect("parse");

    assert_eq!(doc.other_outlines.len(), 1);
    let other = &doc.other_outlines[0];
    assert_eq!(other.ident, "heatsink_area");
    assert_eq!(other.layers, "TOP");
    assert!((other.thickness - 3.0).abs() < f64::EPSILON);

    assert_eq!(doc.route_outlines.len(), 1);
    assert_eq!(doc.route_outlines[0].layers, "ALL");
    assert!(doc.route_outlines[0].thickness.abs() < f64::EPSILON);

    assert_eq!(doc.place_outlines.len(), 1);
    assert!((doc.place_outlines[0].thickness - 10.0).abs() < f64::EPSILON);
}

#[test]
fn test_panel_end_marker() {
    let panel = RECT_BOARD.replace("BOARD_OUTLINE", "PANEL_OUTLINE");
    let doc = idf::parse(&doc(&[HEADER_MM, &panel])).expect("parse");
    assert!(doc.is_panel);
}

#[test]
fn test_circular_board() {
    let board = r#"
.BOARD_OUTLINE "TEST_OWNER" 1.6
0 0 25 0
0 50 25 360
.END_BOARD_OUTLINE
"#;
    let doc = idf::parse(&doc(&[HEADER_MM, board])).expect("parse");
    let circle = doc.board_outline.as_circle().expect("circle outline");
    assert_eq!(circle.center, Point::new(0.0, 25.0));
    assert!((circle.radius - 50.0).abs() < 1e-9);
}

#[test]
fn test_rounded_rectangle() {
    let board = r#"
.BOARD_OUTLINE "TEST_OWNER" 1.6
0 0 0 0
0 45 0 0
0 50 5 90
0 50 25 0
0 45 30 90
0 5 30 0
0 0 25 90
0 0 5 0
0 5 0 90
0 0 0 0
.END_BOARD_OUTLINE
"#;
    let doc = idf::parse(&doc(&[HEADER_MM, board])).expect("parse");
    let elements = doc.board_outline.elements().expect("polygon");

    let arcs = doc.board_outline.arcs();
    assert_eq!(arcs.len(), 4);
    for arc in &arcs {
        assert!((arc.radius - 5.0).abs() < 1e-9);
        assert!((arc.sweep - 90.0).abs() < 1e-9);
    }

    // Corners are carried by the arcs; the straight vertices at their ends go.
    let vertices = doc.board_outline.vertices();
    assert!(!vertices.contains(&Point::new(45.0, 0.0)));
    assert!(!vertices.contains(&Point::new(50.0, 25.0)));
    assert!(vertices.contains(&Point::new(0.0, 0.0)));
    assert!(matches!(elements[1], Primitive::Arc(_)));
}
