//! Document assembly.
//!
//! The assembler walks the token stream once. Every top-level token must be
//! a section begin marker; its body is handed to the matching decoder and the
//! result is collected per kind. Cardinality is checked once the scan ends.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{IdfError, IdfResult};
use super::geometry::{reconstruct_shapes, Shape};
use super::records::{
    decode_header, decode_holes, decode_loop_points, decode_notes, decode_placement, field,
    parse_f64, Header, Hole, Note, Part, Units,
};
use super::section::{read_section, SectionKind};
use super::tokenizer::{tokenize, Token};

/// An outline or keepout section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    /// Section that produced this outline.
    pub kind: SectionKind,
    /// Owner, e.g. `ECAD`, `MCAD`, `UNOWNED`.
    pub owner: String,
    /// Identifier: the section marker, or the outline name for `.OTHER_OUTLINE`.
    pub ident: String,
    /// Thickness or height in mm; `0.0` when the section has none.
    pub thickness: f64,
    /// Side or layer tag; empty when the section has none.
    pub layers: String,
    /// Primary shape (the first loop).
    pub shape: Shape,
    /// Cutouts (every further loop).
    #[serde(default)]
    pub cutouts: Vec<Shape>,
}

/// A fully parsed and validated IDF file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// File header.
    pub header: Header,
    /// `true` when the board came from a `.PANEL_OUTLINE` section.
    #[serde(default)]
    pub is_panel: bool,
    /// Owner of the board outline.
    pub board_owner: String,
    /// Board thickness in mm.
    pub board_thickness: f64,
    /// Board outline shape.
    pub board_outline: Shape,
    /// Cutouts in the board outline.
    #[serde(default)]
    pub board_cutouts: Vec<Shape>,
    /// `.OTHER_OUTLINE` sections.
    #[serde(default)]
    pub other_outlines: Vec<Outline>,
    /// `.ROUTE_OUTLINE` sections.
    #[serde(default)]
    pub route_outlines: Vec<Outline>,
    /// `.PLACE_OUTLINE` sections.
    #[serde(default)]
    pub place_outlines: Vec<Outline>,
    /// `.ROUTE_KEEPOUT` sections.
    #[serde(default)]
    pub route_keepouts: Vec<Outline>,
    /// `.VIA_KEEPOUT` sections.
    #[serde(default)]
    pub via_keepouts: Vec<Outline>,
    /// `.PLACE_KEEPOUT` sections.
    #[serde(default)]
    pub place_keepouts: Vec<Outline>,
    /// Drilled holes.
    #[serde(default)]
    pub holes: Vec<Hole>,
    /// Text notes.
    #[serde(default)]
    pub notes: Vec<Note>,
    /// Component placement.
    #[serde(default)]
    pub placement: Vec<Part>,
}

impl Document {
    /// Parses IDF text into a document.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; no partial document is produced.
    pub fn parse(text: &str) -> IdfResult<Self> {
        let tokens = tokenize(text);
        let mut assembler = Assembler::default();

        let mut cursor = 0;
        while let Some(token) = tokens.get(cursor) {
            if token.text.is_empty() {
                cursor += 1;
                continue;
            }

            let kind = SectionKind::from_marker(&token.text)
                .ok_or_else(|| IdfError::unexpected_token(&token.text, token.line))?;
            let section = read_section(&tokens, cursor + 1, kind.end_marker())?;

            tracing::debug!(
                section = %kind,
                line = token.line,
                fields = section.body.len(),
                "Read section"
            );
            assembler.add(kind, section.body)?;
            cursor = section.next;
        }

        assembler.finish()
    }

    /// Reads and parses an IDF/EMN/BDF file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub fn read(path: impl AsRef<Path>) -> IdfResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| IdfError::file_read(path, e))?;
        let document = Self::parse(&text)?;

        tracing::info!(
            path = %path.display(),
            board = %document.header.name,
            holes = document.holes.len(),
            notes = document.notes.len(),
            parts = document.placement.len(),
            "Read IDF file"
        );

        Ok(document)
    }

    /// Finds a placement record by reference designator.
    #[must_use]
    pub fn find_refdes(&self, refdes: &str) -> Option<&Part> {
        self.placement.iter().find(|p| p.refdes == refdes)
    }

    /// Units declared in the header.
    #[must_use]
    pub const fn units(&self) -> &Units {
        &self.header.units
    }
}

/// Per-parse accumulators.
#[derive(Debug, Default)]
struct Assembler {
    scale: Option<f64>,
    headers: Vec<Header>,
    boards: Vec<Outline>,
    other_outlines: Vec<Outline>,
    route_outlines: Vec<Outline>,
    place_outlines: Vec<Outline>,
    route_keepouts: Vec<Outline>,
    via_keepouts: Vec<Outline>,
    place_keepouts: Vec<Outline>,
    holes: Vec<Hole>,
    notes: Vec<Note>,
    placement: Vec<Part>,
}

impl Assembler {
    fn scale(&self) -> f64 {
        self.scale.unwrap_or(1.0)
    }

    fn add(&mut self, kind: SectionKind, body: &[Token]) -> IdfResult<()> {
        let scale = self.scale();
        match kind {
            SectionKind::Header => {
                let header = decode_header(body)?;
                if let Units::Unknown(ref units) = header.units {
                    tracing::warn!(units = %units, "Unknown units, assuming MM");
                }
                self.scale = Some(header.units.scale());
                self.headers.push(header);
            }
            SectionKind::DrilledHoles => self.holes.extend(decode_holes(body, scale)?),
            SectionKind::Notes => self.notes.extend(decode_notes(body, scale)?),
            SectionKind::Placement => self.placement.extend(decode_placement(body, scale)?),
            _ => {
                let Some(outline) = decode_outline(kind, body, scale)? else {
                    return Ok(());
                };
                let target = match kind {
                    k if k.is_board_outline() => &mut self.boards,
                    SectionKind::OtherOutline => &mut self.other_outlines,
                    SectionKind::RouteOutline => &mut self.route_outlines,
                    SectionKind::PlaceOutline => &mut self.place_outlines,
                    SectionKind::RouteKeepout => &mut self.route_keepouts,
                    SectionKind::ViaKeepout => &mut self.via_keepouts,
                    _ => &mut self.place_keepouts,
                };
                target.push(outline);
            }
        }
        Ok(())
    }

    fn finish(mut self) -> IdfResult<Document> {
        if self.headers.len() != 1 {
            return Err(IdfError::HeaderCardinality {
                count: self.headers.len(),
            });
        }
        if self.boards.len() != 1 {
            return Err(IdfError::BoardOutlineCardinality {
                count: self.boards.len(),
            });
        }

        let header = self.headers.remove(0);
        let board = self.boards.remove(0);

        Ok(Document {
            header,
            is_panel: board.kind == SectionKind::PanelOutline,
            board_owner: board.owner,
            board_thickness: board.thickness,
            board_outline: board.shape,
            board_cutouts: board.cutouts,
            other_outlines: self.other_outlines,
            route_outlines: self.route_outlines,
            place_outlines: self.place_outlines,
            route_keepouts: self.route_keepouts,
            via_keepouts: self.via_keepouts,
            place_keepouts: self.place_keepouts,
            holes: self.holes,
            notes: self.notes,
            placement: self.placement,
        })
    }
}

/// Decodes an outline section: leading fields, then the loop-point tail.
///
/// Returns `None` when none of the section's loops forms a shape.
fn decode_outline(kind: SectionKind, body: &[Token], scale: f64) -> IdfResult<Option<Outline>> {
    let leading = kind.leading_fields().unwrap_or(0);
    let owner = field(kind, body, 0, "owner")?.text.clone();

    let (ident, thickness, layers) = match kind {
        SectionKind::BoardOutline | SectionKind::PanelOutline => (
            kind.begin_marker().to_string(),
            parse_f64(kind, "thickness", field(kind, body, 1, "thickness")?)? * scale,
            String::new(),
        ),
        SectionKind::OtherOutline => (
            field(kind, body, 1, "ident")?.text.clone(),
            parse_f64(kind, "thickness", field(kind, body, 2, "thickness")?)? * scale,
            field(kind, body, 3, "board side")?.text.clone(),
        ),
        SectionKind::PlaceOutline | SectionKind::PlaceKeepout => (
            kind.begin_marker().to_string(),
            parse_f64(kind, "height", field(kind, body, 2, "height")?)? * scale,
            field(kind, body, 1, "board side")?.text.clone(),
        ),
        SectionKind::RouteOutline | SectionKind::RouteKeepout => (
            kind.begin_marker().to_string(),
            0.0,
            field(kind, body, 1, "routing layers")?.text.clone(),
        ),
        _ => (kind.begin_marker().to_string(), 0.0, String::new()),
    };

    let points = decode_loop_points(kind, &body[leading..], scale)?;
    let mut shapes = reconstruct_shapes(&points).into_iter();

    let Some(shape) = shapes.next() else {
        tracing::warn!(section = %kind, owner = %owner, "Section has no closed loop, skipping");
        return Ok(None);
    };

    Ok(Some(Outline {
        kind,
        owner,
        ident,
        thickness,
        layers,
        shape,
        cutouts: shapes.collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        ".HEADER\nIDF_FILE 3.0 \"Test\" \"2024-01-01\" 1\n\"Board\" \"MM\"\n.END_HEADER\n\n";
    const BOARD: &str = ".BOARD_OUTLINE \"OWNER\"\n1.6\n\
                         0 0 0 0\n0 10 0 0\n0 10 10 0\n0 0 10 0\n\
                         .END_BOARD_OUTLINE\n\n";

    #[test]
    fn minimal_document() {
        let doc = Document::parse(&format!("{HEADER}{BOARD}")).unwrap();
        assert_eq!(doc.header.name, "Board");
        assert_eq!(doc.board_owner, "OWNER");
        assert!((doc.board_thickness - 1.6).abs() < f64::EPSILON);
        assert!(!doc.is_panel);
        assert_eq!(doc.units(), &Units::Mm);
        assert_eq!(doc.board_outline.vertices().len(), 4);
    }

    #[test]
    fn panel_outline_counts_as_board() {
        let panel = BOARD.replace("BOARD_OUTLINE", "PANEL_OUTLINE");
        let doc = Document::parse(&format!("{HEADER}{panel}")).unwrap();
        assert!(doc.is_panel);
    }

    #[test]
    fn board_and_panel_together_rejected() {
        let panel = BOARD.replace("BOARD_OUTLINE", "PANEL_OUTLINE");
        let err = Document::parse(&format!("{HEADER}{BOARD}{panel}")).unwrap_err();
        assert!(matches!(err, IdfError::BoardOutlineCardinality { count: 2 }));
    }

    #[test]
    fn unknown_keyword_is_fatal() {
        let err = Document::parse(&format!("{HEADER}.BOGUS\n{BOARD}")).unwrap_err();
        assert!(matches!(
            err,
            IdfError::UnexpectedToken { ref token, line: 6 } if token == ".BOGUS"
        ));
    }

    #[test]
    fn via_keepout_has_no_layers() {
        let keepout = ".VIA_KEEPOUT ECAD\n0 1 1 0\n0 2 1 0\n0 2 2 0\n.END_VIA_KEEPOUT\n";
        let doc = Document::parse(&format!("{HEADER}{BOARD}{keepout}")).unwrap();
        assert_eq!(doc.via_keepouts.len(), 1);
        let outline = &doc.via_keepouts[0];
        assert_eq!(outline.owner, "ECAD");
        assert!(outline.layers.is_empty());
        assert_eq!(outline.ident, ".VIA_KEEPOUT");
    }

    #[test]
    fn missing_leading_field() {
        let bad = ".BOARD_OUTLINE\n.END_BOARD_OUTLINE\n";
        let err = Document::parse(&format!("{HEADER}{bad}")).unwrap_err();
        assert!(matches!(err, IdfError::MissingField { field: "owner", .. }));
    }

    #[test]
    fn empty_outline_contributes_nothing() {
        let bad = ".BOARD_OUTLINE OWNER 1.6\n.END_BOARD_OUTLINE\n";
        let err = Document::parse(&format!("{HEADER}{bad}")).unwrap_err();
        assert!(matches!(err, IdfError::BoardOutlineCardinality { count: 0 }));
    }
}
