use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Top-level configuration, typically loaded from a JSON file.
///
/// ```json
/// {
///   "reader": { "extension": "cap", "manifest_entry": "main.xml" },
///   "table":  { "decimal_separator": ",", "cell_separator": ";" }
/// }
/// ```
///
/// Every field is optional; missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub reader: ReaderConfig,
    pub table: TableOptions,
}

impl Config {
    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}

/// How archives are located and opened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Required file extension, compared case-insensitively (without the dot).
    pub extension: String,
    /// Name of the XML manifest entry at the archive root.
    pub manifest_entry: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            extension: "cap".to_string(),
            manifest_entry: "main.xml".to_string(),
        }
    }
}

/// Rendering options for the delimited table export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptions {
    /// Replaces `.` in rendered numbers (e.g. `,` for European locales).
    pub decimal_separator: char,
    /// Cell separator; must be a single ASCII character.
    pub cell_separator: char,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            cell_separator: ';',
        }
    }
}
