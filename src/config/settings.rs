//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use serde::Deserialize;

use crate::error::ConfigError;

/// Largest number of decimal places accepted for exported coordinates.
pub const MAX_PRECISION: u32 = 12;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Export settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Feature mapping settings.
    #[serde(default)]
    pub features: FeatureConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.precision > MAX_PRECISION {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid output precision {}. Must be at most {MAX_PRECISION}",
                    self.output.precision
                ),
            });
        }

        let size = self.features.marker_text_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(ConfigError::ValidationError {
                message: format!("Invalid marker text size {size}. Must be positive"),
            });
        }
        Ok(())
    }
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Pretty-print the JSON export.
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Decimal places kept for exported numbers.
    /// Default: 4
    #[serde(default = "default_precision")]
    pub precision: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_true(),
            precision: default_precision(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_precision() -> u32 {
    4
}

/// Feature mapping configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeatureConfig {
    /// Text size of component placement markers in mm.
    #[serde(default = "default_marker_text_size")]
    pub marker_text_size: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            marker_text_size: default_marker_text_size(),
        }
    }
}

const fn default_marker_text_size() -> f64 {
    1.0
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
