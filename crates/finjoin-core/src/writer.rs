//! Writers for merged tables

use crate::error::{Error, Result};
use crate::table::MergedTable;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Delimiter of merged output
pub const DEFAULT_OUTPUT_DELIMITER: u8 = b'\t';

/// Write a merged table as delimited text.
///
/// The header row is the index name followed by the column labels; every
/// row starts with its name.
pub fn write_merged<W: Write>(merged: &MergedTable, writer: W, delimiter: u8) -> Result<()> {
    write_records(merged, writer, delimiter).map_err(Error::CsvWrite)
}

/// Write a merged table to a delimited file
pub fn write_merged_file<P: AsRef<Path>>(
    merged: &MergedTable,
    path: P,
    delimiter: u8,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_records(merged, BufWriter::new(file), delimiter).map_err(|e| Error::Csv {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_records<W: Write>(
    merged: &MergedTable,
    writer: W,
    delimiter: u8,
) -> std::result::Result<(), csv::Error> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(false)
        .from_writer(writer);

    let header = std::iter::once(merged.index_name.as_str()).chain(merged.labels());
    csv_writer.write_record(header)?;

    for row in &merged.rows {
        let record = std::iter::once(row.name.as_str()).chain(row.cells.iter().map(String::as_str));
        csv_writer.write_record(record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Export a merged table as pretty-printed JSON
pub fn write_json<W: Write>(merged: &MergedTable, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, merged)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::{merge, MergeOptions};
    use crate::parser::parse_table_str;

    fn merged_fixture() -> MergedTable {
        let annual =
            parse_table_str("Metric;2021;2022;LTM\nRevenue;1 000;1 100;1 150\n", b';', "a.csv")
                .unwrap();
        let quarterly = parse_table_str(
            "Metric;2022Q4;2023Q1\nRevenue;280;300\nMargin;0,1;0,2\n",
            b';',
            "q.csv",
        )
        .unwrap();
        merge(&annual, &quarterly, &MergeOptions::new())
    }

    #[test]
    fn test_write_tsv() {
        let mut out = Vec::new();
        write_merged(&merged_fixture(), &mut out, DEFAULT_OUTPUT_DELIMITER).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Metric\t2021\t2022\t2023Q1\tLTM",
                "Revenue\t1000\t1100\t300\t1150",
                "Margin\t\t\t0.2\t",
            ]
        );
    }

    #[test]
    fn test_write_quotes_delimiter_in_names() {
        let annual = parse_table_str("m;2022\n\"Debt, net\";5\n", b';', "a.csv").unwrap();
        let merged = merge(&annual, &Default::default(), &MergeOptions::new());

        let mut out = Vec::new();
        write_merged(&merged, &mut out, b',').unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"Debt, net\",5"));
    }

    #[test]
    fn test_write_file_and_reparse() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.tsv");
        write_merged_file(&merged_fixture(), &path, b'\t').unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let table = parse_table_str(&content, b'\t', "merged.tsv").unwrap();
        assert_eq!(table.columns, vec!["2021", "2022", "2023Q1", "LTM"]);
        assert_eq!(table.get("Margin", "2023Q1"), Some("0.2"));
    }

    #[test]
    fn test_write_file_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("merged.tsv");

        let err = write_merged_file(&merged_fixture(), &path, b'\t').unwrap_err();
        assert!(err.to_string().contains("merged.tsv"));
        match err {
            Error::FileWrite { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&merged_fixture(), &mut out).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["index_name"], "Metric");
        assert_eq!(value["columns"][2]["label"], "2023Q1");
        assert_eq!(value["columns"][2]["source"], "quarterly");
        assert_eq!(value["suppressed"][0], "2022Q4");
    }
}
