//! Crate-level error types.
//!
//! Parse errors for IDF files live in [`crate::idf::error`]; this module adds
//! configuration errors and the umbrella [`ImportError`] used by the
//! command-line importer.

use std::path::PathBuf;

use thiserror::Error;

use crate::idf::IdfError;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Anything that can stop an import run.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The input could not be parsed or the export could not be written.
    #[error(transparent)]
    Idf(#[from] IdfError),
}
