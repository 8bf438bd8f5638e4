//! rx-core: Core library for extracting product tables from text reports
//!
//! This library provides functionality to:
//! - Parse fixed-layout reports into structured records
//! - Scan directories for reports and load them as decoded text
//! - Aggregate records and query them with column filters and sorting
//! - Export the filtered view as CSV or JSON
//! - Save and run extraction jobs

pub mod error;
pub mod export;
pub mod job;
pub mod parser;
pub mod record;
pub mod scanner;
pub mod store;

pub use error::{Error, Result};
pub use export::{
    default_export_file_name, export, export_csv, export_json, export_row, ExportFormat,
};
pub use job::{ExtractJob, JobResult};
pub use parser::{entity_name, parse_report};
pub use record::{Column, Record};
pub use scanner::{
    ingest_paths, load_document, resolve_inputs, scan_directory, Document, IngestReport,
};
pub use store::{compare_values, FilterState, RecordStore, SortDirection, SortState};
