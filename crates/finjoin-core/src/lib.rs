//! finjoin-core: Core library for merging annual and quarterly statement tables
//!
//! This library provides functionality to:
//! - Parse delimited statement exports into structured tables
//! - Normalize cell values (thousands separators, decimal commas, report dates)
//! - Reconcile annual and quarterly columns into one chronological order
//! - Merge both tables, preserving row order, and write the result
//! - Scan directories for annual/quarterly file pairs

pub mod columns;
pub mod config;
pub mod error;
pub mod label;
pub mod merger;
pub mod normalize;
pub mod parser;
pub mod scanner;
pub mod table;
pub mod writer;

pub use columns::{reconcile_columns, ColumnPlan};
pub use config::{delimiter_byte, MergeConfig};
pub use error::{Error, Result};
pub use label::{ColumnLabel, LTM};
pub use merger::{merge, reconcile_rows, MergeOptions};
pub use normalize::{normalize, reformat_date, CellTransform};
pub use parser::{parse_table_str, read_table, DEFAULT_DELIMITER};
pub use scanner::{scan_directory, ScanResult, StatementKind, StatementPair};
pub use table::{MergedColumn, MergedRow, MergedTable, Source, Table};
pub use writer::{write_json, write_merged, write_merged_file, DEFAULT_OUTPUT_DELIMITER};
