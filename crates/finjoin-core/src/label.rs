//! Column label classification
//!
//! Statement headers are either a calendar year (`2022`), a year-quarter
//! (`2022Q3`) or the trailing-twelve-months marker `LTM`. Anything else is
//! kept as an opaque label.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal header of the trailing-twelve-months column
pub const LTM: &str = "LTM";

/// A parsed column header
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnLabel {
    /// Full-year column, e.g. `2022`
    Year(i32),
    /// Quarter column, e.g. `2022Q4`; quarter is 1..=4
    Quarter { year: i32, quarter: u8 },
    /// Trailing twelve months, always placed last
    Ltm,
    /// Unrecognized header, passed through unchanged
    Other(String),
}

impl ColumnLabel {
    /// Classify a header label.
    ///
    /// Surrounding whitespace is ignored. `LTM` is matched case-sensitively.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();

        if label == LTM {
            return ColumnLabel::Ltm;
        }

        let bytes = label.as_bytes();
        match bytes.len() {
            4 if bytes.iter().all(u8::is_ascii_digit) => match label.parse() {
                Ok(year) => ColumnLabel::Year(year),
                Err(_) => ColumnLabel::Other(label.to_string()),
            },
            6 if bytes[..4].iter().all(u8::is_ascii_digit)
                && bytes[4] == b'Q'
                && (b'1'..=b'4').contains(&bytes[5]) =>
            {
                match label[..4].parse() {
                    Ok(year) => ColumnLabel::Quarter {
                        year,
                        quarter: bytes[5] - b'0',
                    },
                    Err(_) => ColumnLabel::Other(label.to_string()),
                }
            }
            _ => ColumnLabel::Other(label.to_string()),
        }
    }

    /// Calendar year, if the label is chronological
    pub fn year(&self) -> Option<i32> {
        match self {
            ColumnLabel::Year(y) | ColumnLabel::Quarter { year: y, .. } => Some(*y),
            _ => None,
        }
    }

    /// Quarter number: 0 for annual and LTM columns, 1..=4 for quarters
    pub fn quarter(&self) -> u8 {
        match self {
            ColumnLabel::Quarter { quarter, .. } => *quarter,
            _ => 0,
        }
    }

    /// True for year and quarter labels, which take part in year ordering
    pub fn is_chronological(&self) -> bool {
        self.year().is_some()
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnLabel::Year(y) => write!(f, "{:04}", y),
            ColumnLabel::Quarter { year, quarter } => write!(f, "{:04}Q{}", year, quarter),
            ColumnLabel::Ltm => write!(f, "{}", LTM),
            ColumnLabel::Other(s) => write!(f, "{}", s),
        }
    }
}
