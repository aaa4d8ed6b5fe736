//! Merge configuration file (JSON)
//!
//! ```json
//! {
//!   "input_delimiter": ";",
//!   "output_delimiter": "\t",
//!   "date_row": "Report date",
//!   "renames": { "Net profit": "net_income" },
//!   "row_transforms": { "Ticker": "verbatim" }
//! }
//! ```

use crate::error::{Error, Result};
use crate::merger::MergeOptions;
use crate::normalize::CellTransform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn default_input_delimiter() -> String {
    ";".to_string()
}

fn default_output_delimiter() -> String {
    "\t".to_string()
}

/// Settings shared by the `merge`, `show` and `batch` commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_input_delimiter")]
    pub input_delimiter: String,
    #[serde(default = "default_output_delimiter")]
    pub output_delimiter: String,
    /// Row holding report dates, reformatted to ISO dates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_row: Option<String>,
    #[serde(default)]
    pub renames: HashMap<String, String>,
    #[serde(default)]
    pub row_transforms: HashMap<String, CellTransform>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            input_delimiter: default_input_delimiter(),
            output_delimiter: default_output_delimiter(),
            date_row: None,
            renames: HashMap::new(),
            row_transforms: HashMap::new(),
        }
    }
}

impl MergeConfig {
    /// Load a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.input_delimiter()?;
        config.output_delimiter()?;
        Ok(config)
    }

    /// Save the config as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn input_delimiter(&self) -> Result<u8> {
        delimiter_byte(&self.input_delimiter)
    }

    pub fn output_delimiter(&self) -> Result<u8> {
        delimiter_byte(&self.output_delimiter)
    }

    /// Build merge options; `date_row` adds a date transform for that row
    pub fn merge_options(&self) -> MergeOptions {
        let options = MergeOptions {
            renames: self.renames.clone(),
            row_transforms: self.row_transforms.clone(),
        };
        match &self.date_row {
            Some(row) => options.with_date_row(row.clone()),
            None => options,
        }
    }

    /// Template written by `init-config`
    pub fn template() -> Self {
        let mut config = Self {
            date_row: Some("Report date".to_string()),
            ..Self::default()
        };
        config
            .renames
            .insert("Net profit".to_string(), "net_income".to_string());
        config
            .row_transforms
            .insert("Currency".to_string(), CellTransform::Verbatim);
        config
    }
}

/// Convert a delimiter setting to a byte.
///
/// Accepts a single ASCII character, or the escapes `\t` and `tab`.
pub fn delimiter_byte(value: &str) -> Result<u8> {
    if matches!(value, "\\t" | "tab") {
        return Ok(b'\t');
    }
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(Error::InvalidDelimiter(value.to_string())),
    }
}
