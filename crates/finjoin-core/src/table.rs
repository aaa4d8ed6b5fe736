//! Core table types for statement data

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A statement table loaded from a single source
///
/// Rows are keyed by metric name and keep insertion order. Cells are sparse:
/// an absent entry means "no value".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// Header of the row-name column (first header cell)
    pub index_name: String,
    /// Column labels in first-seen order, without duplicates
    pub columns: Vec<String>,
    /// Row name -> (column label -> raw cell)
    pub rows: IndexMap<String, HashMap<String, String>>,
    /// Source file path
    pub source: PathBuf,
}

impl Table {
    /// Create a new empty table
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Register a column label; repeated labels are ignored
    pub fn push_column(&mut self, label: impl Into<String>) {
        let label = label.into();
        if !self.columns.contains(&label) {
            self.columns.push(label);
        }
    }

    /// Insert a row name without cells.
    ///
    /// An existing row keeps both its position and its cells.
    pub fn insert_row(&mut self, name: impl Into<String>) {
        self.rows.entry(name.into()).or_default();
    }

    /// Set a cell, creating the row at the end if needed.
    ///
    /// Empty values are not stored. A later write to the same cell wins.
    pub fn set_cell(&mut self, row: &str, column: &str, value: impl Into<String>) {
        let value = value.into();
        let cells = self.rows.entry(row.to_string()).or_default();
        if value.is_empty() {
            return;
        }
        cells.insert(column.to_string(), value);
    }

    /// Get a raw cell value
    pub fn get(&self, row: &str, column: &str) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    pub fn row_names(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn contains_row(&self, name: &str) -> bool {
        self.rows.contains_key(name)
    }
}

/// Which input table a merged column is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Annual,
    Quarterly,
}

/// A column of the merged table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedColumn {
    /// Column label as it appears in the source header
    pub label: String,
    /// Table the values come from
    pub source: Source,
}

impl MergedColumn {
    pub fn new(label: impl Into<String>, source: Source) -> Self {
        Self {
            label: label.into(),
            source,
        }
    }
}

/// A row of the merged table, one cell per merged column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedRow {
    /// Emitted row name (after renaming)
    pub name: String,
    /// Normalized cells; missing values are empty strings
    pub cells: Vec<String>,
}

/// Result of merging an annual and a quarterly table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedTable {
    /// Header of the row-name column
    pub index_name: String,
    /// Columns in chronological order, `LTM` last
    pub columns: Vec<MergedColumn>,
    /// Rows: annual order, then quarterly-only rows
    pub rows: Vec<MergedRow>,
    /// Q4 columns dropped in favor of the annual column
    pub suppressed: Vec<String>,
}

impl MergedTable {
    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column labels in output order
    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.label.as_str()).collect()
    }

    /// Find a column index by label
    pub fn find_column(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.label == label)
    }

    /// Find the first row with the given (emitted) name
    pub fn find_row(&self, name: &str) -> Option<&MergedRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Get a cell by row name and column label
    pub fn get(&self, row: &str, column: &str) -> Option<&str> {
        let idx = self.find_column(column)?;
        self.find_row(row)
            .and_then(|r| r.cells.get(idx))
            .map(String::as_str)
    }
}
