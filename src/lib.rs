//! emn-importer: IDF/EMN/BDF board outline parser
//!
//! This library reads the IDF 3.0 mechanical exchange format and rebuilds the
//! board it describes as typed geometry: outline, cutouts, keepouts, drilled
//! holes, notes and component placement.
//!
//! # Architecture
//!
//! - **Parsing**: tokenizer → section reader → record decoders → geometry
//!   reconstruction → validated [`idf::Document`]
//! - **Features**: tool-neutral cutouts, keepouts and annotations
//! - **Export**: JSON bundle for downstream code generators
//!
//! # Example
//!
//! ```
//! let text = r#".HEADER
//! BOARD_FILE 3.0 "Generator" 2024/01/01 1
//! demo MM
//! .END_HEADER
//!
//! .BOARD_OUTLINE MCAD
//! 1.6
//! 0 0 0 0
//! 0 50 0 0
//! 0 50 30 0
//! 0 0 30 0
//! 0 0 0 0
//! .END_BOARD_OUTLINE
//! "#;
//!
//! let doc = emn_importer::idf::parse(text).unwrap();
//! assert_eq!(doc.board_outline.vertices().len(), 4);
//! ```
//!
//! # Modules
//!
//! - [`idf`] — File format parsing
//! - [`features`] — Feature mapping
//! - [`export`] — JSON export
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types

pub mod config;
pub mod error;
pub mod export;
pub mod features;
pub mod idf;
