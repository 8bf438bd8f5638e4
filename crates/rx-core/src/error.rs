//! Error types for rx-core
//!
//! Parsing and querying are total; only document loading, export and job
//! files can fail.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rx-core
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV writer error from the csv crate
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Directory traversal error
    #[error("failed to traverse directory: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Column identifier not recognised
    #[error("unknown column '{0}' (expected one of: document, entity_name, code, description, quantity, discount)")]
    UnknownColumn(String),

    /// Filter argument not in `column=pattern` form
    #[error("invalid filter '{0}', expected 'column=pattern'")]
    InvalidFilter(String),

    /// Export format not supported
    #[error("unknown format '{0}', supported formats: csv, json")]
    UnknownFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
