//! IDF/EMN/BDF mechanical exchange file handling.
//!
//! This module reads the IDF 3.0 text format used to pass board outlines and
//! mechanical features between ECAD and MCAD tools. `.emn` (board) and
//! `.bdf`/`.idf` files share the same syntax.
//!
//! # File Format
//!
//! A file is a sequence of sections, each opened by a `.KEYWORD` line and
//! closed by the matching `.END_KEYWORD` line:
//!
//! ```text
//! .HEADER
//! BOARD_FILE 3.0 "Sample File Generator" 10/22/96.16:02:44 1
//! sample_board THOU
//! .END_HEADER
//!
//! .BOARD_OUTLINE MCAD
//! 62.0
//! 0 5.5 -120.0 0.0
//! 0 36.1 -120.0 0.0
//! ...
//! .END_BOARD_OUTLINE
//! ```
//!
//! # Pipeline
//!
//! - [`tokenizer`] — quote-aware line tokenizer
//! - [`section`] — begin/end marker scanning
//! - [`records`] — fixed-arity record decoders with unit scaling
//! - [`geometry`] — loop-point to polygon/arc/circle reconstruction
//! - [`document`] — section dispatch and validation

pub mod document;
pub mod error;
pub mod geometry;
pub mod records;
pub mod section;
pub mod tokenizer;

pub use document::{Document, Outline};
pub use error::{IdfError, IdfResult};
pub use geometry::{Arc, Circle, Point, Primitive, Shape};
pub use records::{Header, Hole, Note, Part, Units};
pub use section::SectionKind;

use std::path::Path;

/// Parses IDF text into a validated document.
///
/// # Errors
///
/// Returns the first parse or validation error.
pub fn parse(text: &str) -> IdfResult<Document> {
    Document::parse(text)
}

/// Reads a whole IDF file and parses it.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn read_file(path: impl AsRef<Path>) -> IdfResult<Document> {
    Document::read(path)
}
