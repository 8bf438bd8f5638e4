//! Document discovery and loading
//!
//! Reading and decoding files happens here; the parser only ever sees
//! decoded text. A document that cannot be read is reported and skipped,
//! it never aborts the remaining documents.

use crate::error::{Error, Result};
use crate::parser::parse_report;
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A decoded report ready for parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier attached to parsed records (the file name)
    pub id: String,
    /// Full path the document was read from
    pub path: PathBuf,
    /// Decoded text
    pub text: String,
}

/// Per-document outcome of an ingest run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    /// Documents parsed, with the number of records each contributed
    pub documents: Vec<(String, usize)>,
    /// Documents that could not be read, with the reason
    pub failures: Vec<(PathBuf, String)>,
}

impl IngestReport {
    /// Total records contributed by all parsed documents
    pub fn total_records(&self) -> usize {
        self.documents.iter().map(|(_, n)| n).sum()
    }
}

/// Scan one or more directories for `.txt` reports, sorted by path
pub fn scan_directory<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for root in roots {
        for entry in WalkDir::new(root.as_ref()).follow_links(true) {
            let entry = entry?;
            if entry.file_type().is_file() && is_report_file(entry.path()) {
                files.insert(entry.path().to_path_buf());
            }
        }
    }

    Ok(files.into_iter().collect())
}

/// Only plain-text reports are considered
fn is_report_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Read a report from disk
///
/// Invalid UTF-8 is replaced rather than rejected, so a mis-encoded report
/// still yields whatever rows remain recognisable.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Document> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), "report is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    let id = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(Document {
        id,
        path: path.to_path_buf(),
        text,
    })
}

/// Expand directories among `inputs` into the reports they contain
pub fn resolve_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            paths.extend(scan_directory(&[input])?);
        } else {
            paths.push(input.to_path_buf());
        }
    }
    Ok(paths)
}

/// Load, parse and ingest each path in order
pub fn ingest_paths<P: AsRef<Path>>(store: &mut RecordStore, paths: &[P]) -> IngestReport {
    let mut report = IngestReport::default();

    for path in paths {
        let path = path.as_ref();
        match load_document(path) {
            Ok(doc) => {
                let records = parse_report(&doc.text, &doc.id);
                tracing::info!(document = %doc.id, records = records.len(), "ingested report");
                report.documents.push((doc.id, records.len()));
                store.ingest(records);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable report");
                report.failures.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    report
}
