//! Error types for IDF parsing.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for IDF operations.
pub type IdfResult<T> = Result<T, IdfError>;

/// Errors that can occur while reading an IDF/EMN/BDF file.
///
/// Every variant is terminal: a failed parse never yields a partial document.
#[derive(Debug, Error)]
pub enum IdfError {
    /// Failed to open or read the file.
    #[error("Failed to read file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Failed to write an output file.
    #[error("Failed to write file: {path}")]
    FileWrite {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A section's end marker is missing.
    #[error("Section not closed: {terminator} not found")]
    SectionNotClosed {
        /// The end marker that was searched for.
        terminator: String,
    },

    /// A section's field count is not a multiple of its record width.
    #[error("Field count mismatch in {section}: {actual} is not a multiple of {expected_multiple}")]
    FieldCountMismatch {
        /// Section keyword.
        section: String,
        /// Record width in fields.
        expected_multiple: usize,
        /// Number of fields found.
        actual: usize,
    },

    /// Unrecognised token outside any section.
    #[error("Unexpected token '{token}' on line {line}")]
    UnexpectedToken {
        /// The offending token.
        token: String,
        /// 1-based source line.
        line: usize,
    },

    /// The document does not contain exactly one header.
    #[error("Expected exactly 1 header, found {count}")]
    HeaderCardinality {
        /// Number of headers found.
        count: usize,
    },

    /// The document does not contain exactly one board or panel outline.
    #[error("Expected exactly 1 board outline, found {count}")]
    BoardOutlineCardinality {
        /// Number of board/panel outlines found.
        count: usize,
    },

    /// A field could not be decoded (e.g. non-numeric text in a number).
    #[error("Invalid {field} in {section} on line {line}: '{value}'")]
    InvalidField {
        /// Section keyword.
        section: String,
        /// Field name.
        field: &'static str,
        /// Raw token text.
        value: String,
        /// 1-based source line.
        line: usize,
    },

    /// A section ended before a required leading field.
    #[error("Missing {field} in {section}")]
    MissingField {
        /// Section keyword.
        section: String,
        /// Field name.
        field: &'static str,
    },

    /// Serialising an export failed.
    #[error("Failed to serialise export")]
    Serialize {
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

impl IdfError {
    /// Creates a file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a file write error.
    pub fn file_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a section-not-closed error.
    pub fn section_not_closed(terminator: impl Into<String>) -> Self {
        Self::SectionNotClosed {
            terminator: terminator.into(),
        }
    }

    /// Creates a field count mismatch error.
    pub fn field_count_mismatch(
        section: impl Into<String>,
        expected_multiple: usize,
        actual: usize,
    ) -> Self {
        Self::FieldCountMismatch {
            section: section.into(),
            expected_multiple,
            actual,
        }
    }

    /// Creates an unexpected token error.
    pub fn unexpected_token(token: impl Into<String>, line: usize) -> Self {
        Self::UnexpectedToken {
            token: token.into(),
            line,
        }
    }

    /// Creates an invalid field error.
    pub fn invalid_field(
        section: impl Into<String>,
        field: &'static str,
        value: impl Into<String>,
        line: usize,
    ) -> Self {
        Self::InvalidField {
            section: section.into(),
            field,
            value: value.into(),
            line,
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(section: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            section: section.into(),
            field,
        }
    }
}
