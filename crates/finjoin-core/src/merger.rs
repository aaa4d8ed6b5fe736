//! Merge engine for combining annual and quarterly statement tables

use crate::columns::reconcile_columns;
use crate::label::ColumnLabel;
use crate::normalize::CellTransform;
use crate::table::{MergedRow, MergedTable, Source, Table};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Presentation settings applied while assembling the merged table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Row name -> emitted row name (exact match)
    #[serde(default)]
    pub renames: HashMap<String, String>,
    /// Row name -> cell transform; rows not listed use `CellTransform::Numeric`
    #[serde(default)]
    pub row_transforms: HashMap<String, CellTransform>,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat the named row as report dates (`dd.mm.yyyy` -> `yyyy-mm-dd`)
    pub fn with_date_row(mut self, name: impl Into<String>) -> Self {
        self.row_transforms.insert(name.into(), CellTransform::Date);
        self
    }

    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    pub fn with_transform(mut self, row: impl Into<String>, transform: CellTransform) -> Self {
        self.row_transforms.insert(row.into(), transform);
        self
    }

    /// Transform for a source row name
    pub fn transform_for(&self, row: &str) -> CellTransform {
        self.row_transforms.get(row).copied().unwrap_or_default()
    }

    /// Emitted name for a source row name
    pub fn rename<'a>(&'a self, row: &'a str) -> &'a str {
        self.renames.get(row).map(String::as_str).unwrap_or(row)
    }
}

/// Union of row names: annual rows in order, then rows only the quarterly
/// table has, in their original order.
pub fn reconcile_rows(annual: &Table, quarterly: &Table) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::with_capacity(annual.row_count() + quarterly.row_count());

    for name in annual.row_names().chain(quarterly.row_names()) {
        if seen.insert(name) {
            rows.push(name.to_string());
        }
    }

    rows
}

/// Merge an annual and a quarterly table into one chronological table.
///
/// Columns follow `reconcile_columns`; every cell is read from the table its
/// column comes from and passed through the row's transform. An unrecognized
/// label carried by both tables reads the quarterly cell when the annual one
/// is missing. Missing cells are emitted as empty strings. This never fails:
/// malformed labels and absent data degrade to pass-through columns and
/// empty cells.
pub fn merge(annual: &Table, quarterly: &Table, options: &MergeOptions) -> MergedTable {
    let plan = reconcile_columns(annual.columns.as_slice(), quarterly.columns.as_slice());
    let row_order = reconcile_rows(annual, quarterly);

    let sources: Vec<(&Table, Option<&Table>)> = plan
        .columns
        .iter()
        .map(|column| {
            let opaque = matches!(ColumnLabel::parse(&column.label), ColumnLabel::Other(_));
            match column.source {
                Source::Annual if opaque => (annual, Some(quarterly)),
                Source::Annual => (annual, None),
                Source::Quarterly => (quarterly, None),
            }
        })
        .collect();

    let rows: Vec<MergedRow> = row_order
        .iter()
        .map(|name| {
            let transform = options.transform_for(name);
            let cells = plan
                .columns
                .iter()
                .zip(&sources)
                .map(|(column, (table, fallback))| {
                    table
                        .get(name, &column.label)
                        .or_else(|| fallback.and_then(|t| t.get(name, &column.label)))
                        .map(|raw| transform.apply(raw))
                        .unwrap_or_default()
                })
                .collect();

            MergedRow {
                name: options.rename(name).to_string(),
                cells,
            }
        })
        .collect();

    let index_name = if annual.index_name.is_empty() {
        quarterly.index_name.clone()
    } else {
        annual.index_name.clone()
    };

    debug!(
        rows = rows.len(),
        columns = plan.columns.len(),
        suppressed = plan.suppressed.len(),
        "merged statement tables"
    );

    MergedTable {
        index_name,
        columns: plan.columns,
        rows,
        suppressed: plan.suppressed,
    }
}
