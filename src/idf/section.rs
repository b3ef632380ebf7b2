//! Section keywords and the section reader.
//!
//! # Section Layout
//!
//! ```text
//! .BOARD_OUTLINE owner          // begin marker + leading fields
//! thickness
//! loop x y angle                // loop-point tail (outline sections)
//! ...
//! .END_BOARD_OUTLINE            // end marker
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{IdfError, IdfResult};
use super::tokenizer::Token;

/// The section keywords recognised at the top level of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionKind {
    /// `.HEADER`
    Header,
    /// `.BOARD_OUTLINE`
    BoardOutline,
    /// `.PANEL_OUTLINE`
    PanelOutline,
    /// `.OTHER_OUTLINE`
    OtherOutline,
    /// `.ROUTE_OUTLINE`
    RouteOutline,
    /// `.PLACE_OUTLINE`
    PlaceOutline,
    /// `.ROUTE_KEEPOUT`
    RouteKeepout,
    /// `.VIA_KEEPOUT`
    ViaKeepout,
    /// `.PLACE_KEEPOUT`
    PlaceKeepout,
    /// `.DRILLED_HOLES`
    DrilledHoles,
    /// `.NOTES`
    Notes,
    /// `.PLACEMENT`
    Placement,
}

impl SectionKind {
    /// Every section kind, in file order.
    pub const ALL: [Self; 12] = [
        Self::Header,
        Self::BoardOutline,
        Self::PanelOutline,
        Self::OtherOutline,
        Self::RouteOutline,
        Self::PlaceOutline,
        Self::RouteKeepout,
        Self::ViaKeepout,
        Self::PlaceKeepout,
        Self::DrilledHoles,
        Self::Notes,
        Self::Placement,
    ];

    /// Looks up the section kind for a begin marker such as `.NOTES`.
    #[must_use]
    pub fn from_marker(marker: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.begin_marker() == marker)
    }

    /// Returns the begin marker, e.g. `.BOARD_OUTLINE`.
    #[must_use]
    pub const fn begin_marker(self) -> &'static str {
        match self {
            Self::Header => ".HEADER",
            Self::BoardOutline => ".BOARD_OUTLINE",
            Self::PanelOutline => ".PANEL_OUTLINE",
            Self::OtherOutline => ".OTHER_OUTLINE",
            Self::RouteOutline => ".ROUTE_OUTLINE",
            Self::PlaceOutline => ".PLACE_OUTLINE",
            Self::RouteKeepout => ".ROUTE_KEEPOUT",
            Self::ViaKeepout => ".VIA_KEEPOUT",
            Self::PlaceKeepout => ".PLACE_KEEPOUT",
            Self::DrilledHoles => ".DRILLED_HOLES",
            Self::Notes => ".NOTES",
            Self::Placement => ".PLACEMENT",
        }
    }

    /// Returns the end marker, e.g. `.END_BOARD_OUTLINE`.
    #[must_use]
    pub const fn end_marker(self) -> &'static str {
        match self {
            Self::Header => ".END_HEADER",
            Self::BoardOutline => ".END_BOARD_OUTLINE",
            Self::PanelOutline => ".END_PANEL_OUTLINE",
            Self::OtherOutline => ".END_OTHER_OUTLINE",
            Self::RouteOutline => ".END_ROUTE_OUTLINE",
            Self::PlaceOutline => ".END_PLACE_OUTLINE",
            Self::RouteKeepout => ".END_ROUTE_KEEPOUT",
            Self::ViaKeepout => ".END_VIA_KEEPOUT",
            Self::PlaceKeepout => ".END_PLACE_KEEPOUT",
            Self::DrilledHoles => ".END_DRILLED_HOLES",
            Self::Notes => ".END_NOTES",
            Self::Placement => ".END_PLACEMENT",
        }
    }

    /// Number of leading fields before the loop-point tail.
    ///
    /// Returns `None` for sections that carry no geometry.
    #[must_use]
    pub const fn leading_fields(self) -> Option<usize> {
        match self {
            Self::ViaKeepout => Some(1),
            Self::BoardOutline | Self::PanelOutline | Self::RouteOutline | Self::RouteKeepout => {
                Some(2)
            }
            Self::PlaceOutline | Self::PlaceKeepout => Some(3),
            Self::OtherOutline => Some(4),
            Self::Header | Self::DrilledHoles | Self::Notes | Self::Placement => None,
        }
    }

    /// Returns `true` for the board and panel outline sections.
    #[must_use]
    pub const fn is_board_outline(self) -> bool {
        matches!(self, Self::BoardOutline | Self::PanelOutline)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.begin_marker())
    }
}

/// The tokens of one section, between its begin and end markers.
#[derive(Debug, Clone, Copy)]
pub struct Section<'a> {
    /// Tokens strictly between the begin marker and the end marker.
    pub body: &'a [Token],
    /// Cursor positioned just past the end marker.
    pub next: usize,
}

/// Reads the section body starting at `start` up to `terminator`.
///
/// `start` is the index of the first token after the begin marker. Blank
/// separator lines produce no tokens, so the returned cursor also steps over
/// the separator that follows every section.
///
/// # Errors
///
/// Returns [`IdfError::SectionNotClosed`] if `terminator` does not occur at
/// or after `start`.
pub fn read_section<'a>(
    tokens: &'a [Token],
    start: usize,
    terminator: &str,
) -> IdfResult<Section<'a>> {
    let rest = tokens.get(start..).unwrap_or_default();
    let end = rest
        .iter()
        .position(|t| t.text == terminator)
        .ok_or_else(|| IdfError::section_not_closed(terminator))?;

    Ok(Section {
        body: &rest[..end],
        next: start + end + 1,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idf::tokenizer::tokenize;

    #[test]
    fn markers_round_trip() {
        for kind in SectionKind::ALL {
            assert_eq!(SectionKind::from_marker(kind.begin_marker()), Some(kind));
            assert!(kind.end_marker().starts_with(".END_"));
        }
        assert_eq!(SectionKind::from_marker(".END_NOTES"), None);
        assert_eq!(SectionKind::from_marker("NOTES"), None);
    }

    #[test]
    fn leading_field_counts() {
        assert_eq!(SectionKind::BoardOutline.leading_fields(), Some(2));
        assert_eq!(SectionKind::PlaceOutline.leading_fields(), Some(3));
        assert_eq!(SectionKind::OtherOutline.leading_fields(), Some(4));
        assert_eq!(SectionKind::ViaKeepout.leading_fields(), Some(1));
        assert_eq!(SectionKind::Notes.leading_fields(), None);
    }

    #[test]
    fn reads_body_and_advances() {
        let tokens = tokenize(".NOTES\n1 2 3 4 \"T\"\n.END_NOTES\n\n.PLACEMENT\n");
        let section = read_section(&tokens, 1, ".END_NOTES").unwrap();
        assert_eq!(section.body.len(), 5);
        assert_eq!(section.next, 7);
        assert_eq!(tokens[section.next].text, ".PLACEMENT");
    }

    #[test]
    fn empty_section_body() {
        let tokens = tokenize(".NOTES\n.END_NOTES\n");
        let section = read_section(&tokens, 1, ".END_NOTES").unwrap();
        assert!(section.body.is_empty());
        assert_eq!(section.next, 2);
    }

    #[test]
    fn missing_terminator_is_error() {
        let tokens = tokenize(".NOTES\n1 2 3 4 \"T\"\n");
        let err = read_section(&tokens, 1, ".END_NOTES").unwrap_err();
        assert!(matches!(
            err,
            IdfError::SectionNotClosed { ref terminator } if terminator == ".END_NOTES"
        ));
    }

    #[test]
    fn start_past_end_is_not_closed() {
        let tokens = tokenize(".NOTES\n");
        assert!(read_section(&tokens, 5, ".END_NOTES").is_err());
    }
}
