//! Error types for finjoin-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, configuring or writing tables.
///
/// The merge itself never fails; every variant here belongs to the I/O and
/// configuration layers around it.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create an output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse delimited input
    #[error("failed to parse table '{path}': {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV error from the csv crate
    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV error while writing to a caller-supplied writer
    #[error("CSV write error: {0}")]
    CsvWrite(#[source] csv::Error),

    /// Failed to parse a configuration file
    #[error("invalid config '{path}': {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Delimiter is not a single ASCII character
    #[error("invalid delimiter {0:?}: expected a single ASCII character")]
    InvalidDelimiter(String),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
