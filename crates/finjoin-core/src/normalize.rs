//! Cell value normalization
//!
//! Statement exports format numbers for humans: thousands are separated by
//! spaces and decimals use a comma. Merged output is machine-readable, so
//! every cell goes through one of the transforms below before it is emitted.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static DECIMAL_COMMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+,[0-9]+$").expect("decimal comma pattern is valid"));

static DOTTED_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{2}\.[0-9]{2}\.[0-9]{4}$").expect("dotted date pattern is valid")
});

/// Characters treated as spaces: plain space plus the no-break variants
/// used as thousands separators.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\u{a0}' | '\u{202f}')
}

/// Remove every space character, including ones inside the value
pub fn strip_spaces(raw: &str) -> String {
    raw.chars().filter(|c| !is_space(*c)).collect()
}

/// Normalize a numeric cell.
///
/// All spaces are removed. If what remains is a decimal number written with
/// a comma (`-12,5`), the comma becomes a dot. Anything else keeps its
/// commas, so identifiers like `A,B` pass through.
///
/// ```
/// use finjoin_core::normalize;
/// assert_eq!(normalize("1 234,50"), "1234.50");
/// assert_eq!(normalize("0,08"), "0.08");
/// assert_eq!(normalize("n/a"), "n/a");
/// ```
pub fn normalize(raw: &str) -> String {
    let value = strip_spaces(raw);
    if DECIMAL_COMMA.is_match(&value) {
        value.replacen(',', ".", 1)
    } else {
        value
    }
}

/// Rewrite a `dd.mm.yyyy` date as `yyyy-mm-dd`.
///
/// Spaces are removed first. Values that are not a valid calendar date in
/// that shape are returned without further changes.
pub fn reformat_date(raw: &str) -> String {
    let value = strip_spaces(raw);
    if !DOTTED_DATE.is_match(&value) {
        return value;
    }
    match NaiveDate::parse_from_str(&value, "%d.%m.%Y") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => value,
    }
}

/// Per-row cell transform, selected by row name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellTransform {
    /// Space removal and decimal comma conversion
    #[default]
    Numeric,
    /// Space removal and `dd.mm.yyyy` to `yyyy-mm-dd`
    Date,
    /// Emit the source text untouched
    Verbatim,
}

impl CellTransform {
    pub fn apply(self, raw: &str) -> String {
        match self {
            CellTransform::Numeric => normalize(raw),
            CellTransform::Date => reformat_date(raw),
            CellTransform::Verbatim => raw.to_string(),
        }
    }
}
