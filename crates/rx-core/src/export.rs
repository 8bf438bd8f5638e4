//! CSV and JSON export of the current view

use crate::error::{Error, Result};
use crate::record::{Column, Record};
use chrono::NaiveDate;
use std::io::Write;
use std::str::FromStr;

/// Output format for exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// The six export cells of a record
///
/// Free-text cells are wrapped in double quotes (embedded quotes doubled)
/// so they survive comma-delimited output; numeric cells are written as-is.
pub fn export_row(record: &Record) -> [String; 6] {
    Column::ALL.map(|column| {
        let value = column.value(record);
        if column.is_free_text() {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    })
}

/// Write a header line followed by one line per record, in order
pub fn export_csv<'a, W, I>(records: I, writer: W) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    // Cells arrive pre-quoted, so the writer must not quote again.
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer.write_record(Column::ALL.map(Column::label))?;

    let mut count = 0;
    for record in records {
        csv_writer.write_record(export_row(record))?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

/// Write records as a pretty-printed JSON array
pub fn export_json<'a, W, I>(records: I, mut writer: W) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let records: Vec<&Record> = records.into_iter().collect();
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;
    Ok(records.len())
}

/// Export in the requested format
pub fn export<'a, W, I>(format: ExportFormat, records: I, writer: W) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    match format {
        ExportFormat::Csv => export_csv(records, writer),
        ExportFormat::Json => export_json(records, writer),
    }
}

/// Default export file name for a given day, e.g. `tabla_extraida_2024-01-31.csv`
pub fn default_export_file_name(date: NaiveDate, format: ExportFormat) -> String {
    let ext = match format {
        ExportFormat::Csv => "csv",
        ExportFormat::Json => "json",
    };
    format!("tabla_extraida_{}.{}", date.format("%Y-%m-%d"), ext)
}
