//! Fixed-arity record decoders.
//!
//! Record sections are flat token lists consumed a fixed number of fields at
//! a time:
//!
//! | Section          | Fields per record |
//! |------------------|-------------------|
//! | `.HEADER`        | 7 (exactly one)   |
//! | `.DRILLED_HOLES` | 7                 |
//! | `.NOTES`         | 5                 |
//! | `.PLACEMENT`     | 9                 |
//! | loop points      | 4                 |
//!
//! Linear distances are multiplied by the header's unit scale; angles, flags
//! and strings are left alone.

use serde::{Deserialize, Serialize};

use super::error::{IdfError, IdfResult};
use super::geometry::{LoopPoint, Point};
use super::section::SectionKind;
use super::tokenizer::Token;

/// Millimetres per thou (1/1000 inch).
pub const MM_PER_THOU: f64 = 0.0254;

/// Field count of a header record.
pub const HEADER_FIELDS: usize = 7;
/// Field count of a drilled hole record.
pub const HOLE_FIELDS: usize = 7;
/// Field count of a note record.
pub const NOTE_FIELDS: usize = 5;
/// Field count of a placement record.
pub const PART_FIELDS: usize = 9;
/// Field count of a loop point record.
pub const LOOP_POINT_FIELDS: usize = 4;

/// Linear units declared in the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Units {
    /// Thousandths of an inch.
    Thou,
    /// Millimetres.
    Mm,
    /// Anything else, kept verbatim.
    Unknown(String),
}

impl Units {
    /// Factor converting file units to millimetres.
    ///
    /// Unknown units are not converted.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        match self {
            Self::Thou => MM_PER_THOU,
            Self::Mm | Self::Unknown(_) => 1.0,
        }
    }
}

impl From<&str> for Units {
    fn from(s: &str) -> Self {
        match s {
            "THOU" => Self::Thou,
            "MM" => Self::Mm,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for Units {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Units> for String {
    fn from(units: Units) -> Self {
        match units {
            Units::Thou => "THOU".to_string(),
            Units::Mm => "MM".to_string(),
            Units::Unknown(s) => s,
        }
    }
}

/// File header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// File type tag, e.g. `BOARD_FILE`.
    pub file_type: String,
    /// IDF format version, e.g. `3.0`.
    pub idf_version: f64,
    /// System that produced the file.
    pub source_system: String,
    /// Creation date as written in the file.
    pub date: String,
    /// Board file version / record count field.
    pub file_version: i64,
    /// Board name.
    pub name: String,
    /// Linear units of every following section.
    pub units: Units,
}

/// A drilled hole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hole {
    /// Diameter in mm.
    pub diameter: f64,
    /// Centre in mm.
    pub position: Point,
    /// Plating flag, `PTH` or `NPTH`.
    pub plating: String,
    /// Associated part (refdes), `BOARD`, `NOREFDES` or `PANEL`.
    pub assoc: String,
    /// Hole type, e.g. `PIN`, `VIA`, `MTG`, `TOOL`.
    pub hole_type: String,
    /// Owner, e.g. `ECAD`, `MCAD`, `UNOWNED`.
    pub owner: String,
}

impl Hole {
    /// Returns `true` for plated-through holes.
    #[must_use]
    pub fn is_plated(&self) -> bool {
        self.plating.eq_ignore_ascii_case("PTH")
    }
}

/// A text note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Text origin in mm.
    pub position: Point,
    /// Text height in mm.
    pub height: f64,
    /// Maximum text length in mm.
    pub length: f64,
    /// Text content with `\u{1}` and `\u{2}` removed.
    pub text: String,
}

/// A component placement record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Package name.
    pub package: String,
    /// Part number.
    pub part_number: String,
    /// Reference designator.
    pub refdes: String,
    /// Placement origin in mm.
    pub position: Point,
    /// Mounting offset from the board surface in mm.
    pub offset: f64,
    /// Rotation in degrees.
    pub rotation: f64,
    /// Board side, `TOP` or `BOTTOM`.
    pub side: String,
    /// Placement status, e.g. `PLACED`, `UNPLACED`, `MCAD`, `ECAD`.
    pub status: String,
}

impl Part {
    /// Returns `true` when the part is mounted on the bottom side.
    #[must_use]
    pub fn is_bottom(&self) -> bool {
        self.side.eq_ignore_ascii_case("BOTTOM")
    }
}

/// Parses a floating-point field.
///
/// # Errors
///
/// Returns [`IdfError::InvalidField`] if the token is not a number.
pub fn parse_f64(section: SectionKind, field: &'static str, token: &Token) -> IdfResult<f64> {
    token.text.parse::<f64>().map_err(|_| {
        IdfError::invalid_field(section.begin_marker(), field, &token.text, token.line)
    })
}

/// Parses an integer field.
///
/// Some writers emit integral fields as `1.0`; those are accepted when the
/// value has no fractional part.
///
/// # Errors
///
/// Returns [`IdfError::InvalidField`] if the token is not an integer.
#[allow(clippy::cast_possible_truncation)] // fract() == 0 checked, range checked
pub fn parse_i64(section: SectionKind, field: &'static str, token: &Token) -> IdfResult<i64> {
    if let Ok(value) = token.text.parse::<i64>() {
        return Ok(value);
    }
    match token.text.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value.abs() < 9.0e15 => Ok(value as i64),
        _ => Err(IdfError::invalid_field(
            section.begin_marker(),
            field,
            &token.text,
            token.line,
        )),
    }
}

/// Returns a section's leading field by index.
///
/// # Errors
///
/// Returns [`IdfError::MissingField`] if the section is too short.
pub fn field<'a>(
    section: SectionKind,
    tokens: &'a [Token],
    index: usize,
    name: &'static str,
) -> IdfResult<&'a Token> {
    tokens
        .get(index)
        .ok_or_else(|| IdfError::missing_field(section.begin_marker(), name))
}

/// Splits `tokens` into records of `width` fields and decodes each one.
fn decode_records<T>(
    section: SectionKind,
    tokens: &[Token],
    width: usize,
    mut decode: impl FnMut(usize, &[Token]) -> IdfResult<T>,
) -> IdfResult<Vec<T>> {
    if tokens.len() % width != 0 {
        return Err(IdfError::field_count_mismatch(
            section.begin_marker(),
            width,
            tokens.len(),
        ));
    }

    let records = tokens
        .chunks_exact(width)
        .enumerate()
        .map(|(index, chunk)| decode(index, chunk))
        .collect::<IdfResult<Vec<T>>>()?;

    tracing::trace!(section = %section, count = records.len(), "Decoded records");
    Ok(records)
}

/// Decodes the header section.
///
/// # Errors
///
/// Returns an error if the header does not have exactly seven fields or a
/// numeric field is malformed.
pub fn decode_header(tokens: &[Token]) -> IdfResult<Header> {
    let section = SectionKind::Header;
    if tokens.len() != HEADER_FIELDS {
        return Err(IdfError::field_count_mismatch(
            section.begin_marker(),
            HEADER_FIELDS,
            tokens.len(),
        ));
    }

    Ok(Header {
        file_type: tokens[0].text.clone(),
        idf_version: parse_f64(section, "version", &tokens[1])?,
        source_system: tokens[2].text.clone(),
        date: tokens[3].text.clone(),
        file_version: parse_i64(section, "file version", &tokens[4])?,
        name: tokens[5].text.clone(),
        units: Units::from(tokens[6].text.as_str()),
    })
}

/// Decodes a `.DRILLED_HOLES` section.
///
/// # Errors
///
/// Returns an error on a field count mismatch or a malformed number.
pub fn decode_holes(tokens: &[Token], scale: f64) -> IdfResult<Vec<Hole>> {
    let section = SectionKind::DrilledHoles;
    decode_records(section, tokens, HOLE_FIELDS, |_, f| {
        Ok(Hole {
            diameter: parse_f64(section, "diameter", &f[0])? * scale,
            position: Point::new(
                parse_f64(section, "x", &f[1])? * scale,
                parse_f64(section, "y", &f[2])? * scale,
            ),
            plating: f[3].text.clone(),
            assoc: f[4].text.clone(),
            hole_type: f[5].text.clone(),
            owner: f[6].text.clone(),
        })
    })
}

/// Decodes a `.NOTES` section.
///
/// # Errors
///
/// Returns an error on a field count mismatch or a malformed number.
pub fn decode_notes(tokens: &[Token], scale: f64) -> IdfResult<Vec<Note>> {
    let section = SectionKind::Notes;
    decode_records(section, tokens, NOTE_FIELDS, |_, f| {
        Ok(Note {
            position: Point::new(
                parse_f64(section, "x", &f[0])? * scale,
                parse_f64(section, "y", &f[1])? * scale,
            ),
            height: parse_f64(section, "text height", &f[2])? * scale,
            length: parse_f64(section, "text length", &f[3])? * scale,
            text: strip_control(&f[4].text),
        })
    })
}

/// Decodes a `.PLACEMENT` section.
///
/// # Errors
///
/// Returns an error on a field count mismatch or a malformed number.
pub fn decode_placement(tokens: &[Token], scale: f64) -> IdfResult<Vec<Part>> {
    let section = SectionKind::Placement;
    decode_records(section, tokens, PART_FIELDS, |_, f| {
        Ok(Part {
            package: f[0].text.clone(),
            part_number: f[1].text.clone(),
            refdes: f[2].text.clone(),
            position: Point::new(
                parse_f64(section, "x", &f[3])? * scale,
                parse_f64(section, "y", &f[4])? * scale,
            ),
            offset: parse_f64(section, "mounting offset", &f[5])? * scale,
            rotation: parse_f64(section, "rotation", &f[6])?,
            side: f[7].text.clone(),
            status: f[8].text.clone(),
        })
    })
}

/// Decodes the loop-point tail of an outline section.
///
/// Sequence ids are the record's index within the tail.
///
/// # Errors
///
/// Returns an error on a field count mismatch or a malformed number.
pub fn decode_loop_points(
    section: SectionKind,
    tokens: &[Token],
    scale: f64,
) -> IdfResult<Vec<LoopPoint>> {
    decode_records(section, tokens, LOOP_POINT_FIELDS, |sequence, f| {
        Ok(LoopPoint {
            sequence,
            loop_id: parse_i64(section, "loop id", &f[0])?,
            point: Point::new(
                parse_f64(section, "x", &f[1])? * scale,
                parse_f64(section, "y", &f[2])? * scale,
            ),
            angle: parse_f64(section, "angle", &f[3])?,
        })
    })
}

fn strip_control(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\u{1}' | '\u{2}')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idf::tokenizer::tokenize;

    #[test]
    fn units_scale() {
        assert!((Units::from("THOU").scale() - 0.0254).abs() < f64::EPSILON);
        assert!((Units::from("MM").scale() - 1.0).abs() < f64::EPSILON);
        assert_eq!(Units::from("INCH"), Units::Unknown("INCH".to_string()));
        assert!((Units::from("INCH").scale() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn units_serialise_as_text() {
        let json = serde_json::to_string(&Units::Thou).unwrap();
        assert_eq!(json, "\"THOU\"");
        let units: Units = serde_json::from_str("\"MM\"").unwrap();
        assert_eq!(units, Units::Mm);
    }

    #[test]
    fn header_decodes() {
        let tokens =
            tokenize("IDF_FILE 3.0 \"Test System\" \"2024-01-01\" 1\n\"TestBoard\" \"MM\"");
        let header = decode_header(&tokens).unwrap();
        assert_eq!(header.file_type, "IDF_FILE");
        assert!((header.idf_version - 3.0).abs() < f64::EPSILON);
        assert_eq!(header.source_system, "Test System");
        assert_eq!(header.file_version, 1);
        assert_eq!(header.name, "TestBoard");
        assert_eq!(header.units, Units::Mm);
    }

    #[test]
    fn short_header_is_mismatch() {
        let tokens = tokenize("IDF_FILE 3.0 \"Test\"");
        let err = decode_header(&tokens).unwrap_err();
        assert!(matches!(
            err,
            IdfError::FieldCountMismatch { expected_multiple: 7, actual: 3, .. }
        ));
    }

    #[test]
    fn holes_scaled() {
        let tokens = tokenize("100 1000 2000 PTH BOARD PIN ECAD");
        let holes = decode_holes(&tokens, MM_PER_THOU).unwrap();
        assert_eq!(holes.len(), 1);
        assert!((holes[0].diameter - 2.54).abs() < 1e-9);
        assert!((holes[0].position.x - 25.4).abs() < 1e-9);
        assert!((holes[0].position.y - 50.8).abs() < 1e-9);
        assert!(holes[0].is_plated());
        assert_eq!(holes[0].hole_type, "PIN");
    }

    #[test]
    fn holes_remainder_is_mismatch() {
        let tokens = tokenize("2.0 10 10 PTH VIA THRU OWNER\n1.5 40");
        let err = decode_holes(&tokens, 1.0).unwrap_err();
        assert!(matches!(
            err,
            IdfError::FieldCountMismatch { expected_multiple: 7, actual: 9, .. }
        ));
    }

    #[test]
    fn notes_strip_control_characters() {
        let tokens = tokenize("15 25 1.5 12 \"KEEP\u{1} OUT\u{2}\"");
        let notes = decode_notes(&tokens, 1.0).unwrap();
        assert_eq!(notes[0].text, "KEEP OUT");
        assert!((notes[0].height - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn placement_angle_not_scaled() {
        let tokens = tokenize("\"0402\" \"C0402\" \"C1\" 1000 500 10 90 \"BOTTOM\" \"PLACED\"");
        let parts = decode_placement(&tokens, MM_PER_THOU).unwrap();
        let part = &parts[0];
        assert_eq!(part.refdes, "C1");
        assert!((part.position.x - 25.4).abs() < 1e-9);
        assert!((part.offset - 0.254).abs() < 1e-9);
        assert!((part.rotation - 90.0).abs() < f64::EPSILON);
        assert!(part.is_bottom());
    }

    #[test]
    fn loop_points_enumerated() {
        let tokens = tokenize("0 0 0 0\n0 100 0 0\n1 40 20 90");
        let points = decode_loop_points(SectionKind::BoardOutline, &tokens, 1.0).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[2].sequence, 2);
        assert_eq!(points[2].loop_id, 1);
        assert!((points[2].angle - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_number_names_field() {
        let tokens = tokenize("0 abc 0 0");
        let err = decode_loop_points(SectionKind::BoardOutline, &tokens, 1.0).unwrap_err();
        match err {
            IdfError::InvalidField {
                section,
                field,
                value,
                line,
            } => {
                assert_eq!(section, ".BOARD_OUTLINE");
                assert_eq!(field, "x");
                assert_eq!(value, "abc");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn integer_field_accepts_integral_float() {
        let tokens = tokenize("1.0 2.5");
        assert_eq!(parse_i64(SectionKind::BoardOutline, "loop id", &tokens[0]).unwrap(), 1);
        assert!(parse_i64(SectionKind::BoardOutline, "loop id", &tokens[1]).is_err());
    }

    #[test]
    fn empty_section_decodes_to_nothing() {
        assert!(decode_notes(&[], 1.0).unwrap().is_empty());
    }
}
