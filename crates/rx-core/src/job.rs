//! Extraction job files
//!
//! A job bundles everything one export needs: the reports to read, the
//! filters and sort to apply, and where to write the result. Jobs are
//! stored as JSON so they can be edited by hand and re-run.

use crate::error::{Error, Result};
use crate::export::{default_export_file_name, export, ExportFormat};
use crate::record::Column;
use crate::scanner::{ingest_paths, resolve_inputs, IngestReport};
use crate::store::{FilterState, RecordStore, SortState};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// A saved extraction job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractJob {
    /// Report files or directories to read
    pub inputs: Vec<PathBuf>,
    /// Substring filters per column
    #[serde(default)]
    pub filters: FilterState,
    /// Sort to apply, if any
    #[serde(default)]
    pub sort: Option<SortState>,
    /// Output format
    #[serde(default)]
    pub format: ExportFormat,
    /// Output file; a dated default name is used when absent
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Outcome of running a job
#[derive(Debug, Clone)]
pub struct JobResult {
    /// Per-document ingest outcome
    pub ingest: IngestReport,
    /// Rows written after filtering
    pub rows_written: usize,
    /// File the rows were written to
    pub output: PathBuf,
}

impl ExtractJob {
    /// Create a job over the given inputs with no filters or sort
    pub fn new(inputs: Vec<PathBuf>) -> Self {
        Self {
            inputs,
            ..Default::default()
        }
    }

    /// Add or replace a column filter
    pub fn with_filter(mut self, column: Column, pattern: impl Into<String>) -> Self {
        self.filters.set(column, pattern);
        self
    }

    /// Load a job file from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the job file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Store with this job's inputs ingested and its filters and sort applied
    pub fn build_store(&self) -> Result<(RecordStore, IngestReport)> {
        let paths = resolve_inputs(&self.inputs)?;
        let mut store = RecordStore::new();
        let report = ingest_paths(&mut store, &paths);

        for column in Column::ALL {
            store.set_filter(column, self.filters.get(column));
        }
        if let Some(sort) = self.sort {
            store.set_sort(sort);
        }

        Ok((store, report))
    }

    /// Ingest, filter, sort and export; `today` names the default output
    pub fn run(&self, today: NaiveDate) -> Result<JobResult> {
        let (store, ingest) = self.build_store()?;

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_export_file_name(today, self.format)));

        let file = File::create(&output)?;
        let rows_written = export(self.format, store.view(), BufWriter::new(file))?;

        tracing::info!(
            rows = rows_written,
            output = %output.display(),
            "job complete"
        );

        Ok(JobResult {
            ingest,
            rows_written,
            output,
        })
    }
}
