//! Delimited reader for statement tables
//!
//! The first header cell names the row index; the remaining header cells are
//! column labels. The first field of every record is the row name.

use crate::error::{Error, Result};
use crate::table::Table;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Delimiter used by statement exports
pub const DEFAULT_DELIMITER: u8 = b';';

/// Read a delimited file into a Table
pub fn read_table<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    read_table_from(BufReader::new(file), delimiter, path.to_path_buf())
}

/// Parse delimited text into a Table (useful for testing)
pub fn parse_table_str(content: &str, delimiter: u8, source_name: &str) -> Result<Table> {
    read_table_from(content.as_bytes(), delimiter, PathBuf::from(source_name))
}

fn read_table_from<R: Read>(reader: R, delimiter: u8, path: PathBuf) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?
        .clone();

    if headers.is_empty() {
        return Err(Error::CsvParse {
            path,
            message: "no header row found".to_string(),
        });
    }

    let mut table = Table::new(path.clone());
    table.index_name = headers
        .get(0)
        .unwrap_or_default()
        .trim_start_matches('\u{feff}')
        .to_string();

    let labels: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
    for label in &labels {
        table.push_column(label.as_str());
    }

    for (row_idx, result) in csv_reader.records().enumerate() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        let Some(name) = record.get(0) else {
            continue;
        };

        if record.len() > labels.len() + 1 {
            warn!(
                row = row_idx + 1,
                path = %path.display(),
                "row has more cells than columns, truncating"
            );
        }

        table.insert_row(name);
        // Repeated labels: the rightmost non-empty cell wins
        for (label, value) in labels.iter().zip(record.iter().skip(1)) {
            table.set_cell(name, label, value);
        }
    }

    Ok(table)
}
