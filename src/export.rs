//! JSON export of a parsed board.
//!
//! The export bundles the validated document with its mapped features so a
//! downstream generator can work from one file.
//!
//! ```text
//! {
//!   "name": "MyBoard",
//!   "source": "board.emn",
//!   "document": { "header": {...}, "board_outline": {...}, ... },
//!   "features": [ { "feature": "cutout", ... }, ... ]
//! }
//! ```

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::config::OutputConfig;
use crate::features::Feature;
use crate::idf::{Document, IdfError, IdfResult};

/// A board ready to be written out.
#[derive(Debug, Clone, Serialize)]
pub struct Export<'a> {
    /// Identifier-safe board name.
    pub name: String,
    /// Path of the source file, as given.
    pub source: String,
    /// Parsed document.
    pub document: &'a Document,
    /// Mapped features.
    pub features: Vec<Feature>,
}

impl<'a> Export<'a> {
    /// Creates an export, sanitising `name` into an identifier.
    #[must_use]
    pub fn new(
        name: &str,
        source: impl AsRef<Path>,
        document: &'a Document,
        features: Vec<Feature>,
    ) -> Self {
        Self {
            name: sanitize_identifier(name),
            source: source.as_ref().display().to_string(),
            document,
            features,
        }
    }

    /// Serialises the export to a JSON string.
    ///
    /// Every number is rounded to `config.precision` decimal places.
    ///
    /// # Errors
    ///
    /// Returns [`IdfError::Serialize`] if serialisation fails.
    pub fn to_json(&self, config: &OutputConfig) -> IdfResult<String> {
        let mut value =
            serde_json::to_value(self).map_err(|source| IdfError::Serialize { source })?;
        round_numbers(&mut value, config.precision);

        let text = if config.pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        text.map_err(|source| IdfError::Serialize { source })
    }

    /// Writes the export to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn write(&self, path: impl AsRef<Path>, config: &OutputConfig) -> IdfResult<()> {
        let path = path.as_ref();
        let mut json = self.to_json(config)?;
        json.push('\n');
        std::fs::write(path, json).map_err(|e| IdfError::file_write(path, e))?;

        tracing::info!(
            path = %path.display(),
            name = %self.name,
            features = self.features.len(),
            "Wrote export"
        );
        Ok(())
    }
}

/// Turns an arbitrary name into an identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`; a name that does not start
/// with a letter or underscore gets a leading `_`.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let invalid = INVALID
        .get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("identifier pattern is valid"));

    let sanitized = invalid.replace_all(name, "_").into_owned();
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => sanitized,
        _ => format!("_{sanitized}"),
    }
}

/// Rounds every float in a JSON tree to `precision` decimal places.
fn round_numbers(value: &mut Value, precision: u32) {
    match value {
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(rounded) = n.as_f64().map(|f| round_to(f, precision)) {
                    if let Some(num) = serde_json::Number::from_f64(rounded) {
                        *n = num;
                    }
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|v| round_numbers(v, precision)),
        Value::Object(map) => map.values_mut().for_each(|v| round_numbers(v, precision)),
        Value::Null | Value::Bool(_) | Value::String(_) => {}
    }
}

fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10_f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    let rounded = (value * factor).round() / factor;
    // avoid "-0.0" in the output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_kept_when_valid() {
        assert_eq!(sanitize_identifier("MyBoard_2"), "MyBoard_2");
        assert_eq!(sanitize_identifier("_private"), "_private");
    }

    #[test]
    fn identifier_invalid_chars_replaced() {
        assert_eq!(sanitize_identifier("my-board v2"), "my_board_v2");
    }

    #[test]
    fn identifier_leading_digit_prefixed() {
        assert_eq!(sanitize_identifier("2layer"), "_2layer");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn rounding() {
        assert!((round_to(1.234_56, 4) - 1.2346).abs() < 1e-12);
        assert!((round_to(0.1 + 0.2, 4) - 0.3).abs() < 1e-12);
        assert!(round_to(-0.000_01, 4).is_sign_positive());
    }

    #[test]
    fn round_numbers_walks_tree() {
        let mut value = serde_json::json!({ "a": [1.000_004_9, { "b": 2.5 }], "c": 3 });
        round_numbers(&mut value, 3);
        assert_eq!(value, serde_json::json!({ "a": [1.0, { "b": 2.5 }], "c": 3 }));
    }
}
