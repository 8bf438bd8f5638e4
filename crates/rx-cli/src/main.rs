//! Report Extractor CLI
//!
//! Command-line tool for extracting, filtering and exporting product tables
//! from fixed-layout text reports.

mod logging;

use clap::{Args, Parser, Subcommand};
use rx_core::{
    default_export_file_name, entity_name, export, ingest_paths, load_document, parse_report,
    resolve_inputs, scan_directory, Column, ExportFormat, ExtractJob, IngestReport, RecordStore,
};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rx-cli")]
#[command(about = "Report table extractor", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Which records to select and how to order them
#[derive(Args)]
struct Selection {
    /// Report files or directories to read
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Column filter as column=pattern (case-insensitive substring)
    #[arg(short = 'F', long)]
    filter: Vec<String>,

    /// Column to sort by
    #[arg(short, long)]
    sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    desc: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories for report files
    Scan {
        /// Root directories to scan
        #[arg(short, long, required = true)]
        root: Vec<PathBuf>,
    },

    /// Parse and display a single report
    Parse {
        /// Path to report file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show extracted records as a table
    Show {
        #[command(flatten)]
        selection: Selection,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Export extracted records to a file
    Export {
        #[command(flatten)]
        selection: Selection,

        /// Output format (csv or json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Output file path (defaults to tabla_extraida_<date>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a saved extraction job
    Run {
        /// Path to job file (JSON)
        #[arg(short, long)]
        job: PathBuf,
    },

    /// Create a job file template
    CreateJob {
        /// Output path for the job file
        #[arg(short, long)]
        output: PathBuf,

        /// Report files or directories to include
        #[arg(short, long)]
        input: Vec<PathBuf>,

        /// Column filter as column=pattern
        #[arg(short = 'F', long)]
        filter: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> rx_core::Result<()> {
    match command {
        Commands::Scan { root } => cmd_scan(&root),
        Commands::Parse { file } => cmd_parse(&file),
        Commands::Show { selection, limit } => cmd_show(&selection, limit),
        Commands::Export {
            selection,
            format,
            output,
        } => cmd_export(&selection, &format, output),
        Commands::Run { job } => cmd_run(&job),
        Commands::CreateJob {
            output,
            input,
            filter,
        } => cmd_create_job(&output, input, &filter),
    }
}

fn cmd_scan(roots: &[PathBuf]) -> rx_core::Result<()> {
    let files = scan_directory(roots)?;

    println!("Scanned {} root(s):", roots.len());
    for root in roots {
        println!("  {}", root.display());
    }
    println!();
    println!("Found {} report(s)", files.len());
    for file in &files {
        println!("  {}", file.display());
    }

    Ok(())
}

fn cmd_parse(file: &PathBuf) -> rx_core::Result<()> {
    let doc = load_document(file)?;
    let records = parse_report(&doc.text, &doc.id);

    println!("File: {}", file.display());
    println!("Razón Social: {}", entity_name(&doc.text));
    println!("Records: {}", records.len());
    println!();

    print_table(records.iter(), records.len(), Some(10));

    Ok(())
}

fn cmd_show(selection: &Selection, limit: Option<usize>) -> rx_core::Result<()> {
    let (store, report) = build_store(selection)?;
    print_ingest_report(&report);

    let view = store.view();
    if view.is_empty() {
        println!(
            "No records found in {} document(s)",
            report.documents.len()
        );
        return Ok(());
    }

    println!("Extracted data ({} of {} records)", view.len(), store.len());
    println!();
    print_table(view.iter().copied(), view.len(), limit);

    Ok(())
}

fn cmd_export(
    selection: &Selection,
    format: &str,
    output: Option<PathBuf>,
) -> rx_core::Result<()> {
    let format: ExportFormat = format.parse()?;
    let (store, report) = build_store(selection)?;
    print_ingest_report(&report);

    let output = output.unwrap_or_else(|| {
        PathBuf::from(default_export_file_name(
            chrono::Local::now().date_naive(),
            format,
        ))
    });

    let file = File::create(&output)?;
    let count = export(format, store.view(), BufWriter::new(file))?;

    println!("Exported {} rows to {}", count, output.display());

    Ok(())
}

fn cmd_run(job_path: &PathBuf) -> rx_core::Result<()> {
    let job = ExtractJob::load(job_path)?;
    println!("Running job with {} input(s)", job.inputs.len());

    let result = job.run(chrono::Local::now().date_naive())?;
    print_ingest_report(&result.ingest);

    println!();
    println!("Job complete:");
    println!("  {} records extracted", result.ingest.total_records());
    println!("  {} rows written to {}", result.rows_written, result.output.display());

    Ok(())
}

fn cmd_create_job(output: &PathBuf, inputs: Vec<PathBuf>, filters: &[String]) -> rx_core::Result<()> {
    let inputs = if inputs.is_empty() {
        vec![PathBuf::from("reports")]
    } else {
        inputs
    };

    let mut job = ExtractJob::new(inputs);
    for filter in filters {
        let (column, pattern) = parse_filter(filter)?;
        job.filters.set(column, pattern);
    }

    job.save(output)?;
    println!("Created job file: {}", output.display());
    println!();
    println!("Edit the file to configure your job, then run:");
    println!("  rx-cli run --job {}", output.display());

    Ok(())
}

/// Ingest the selected inputs and apply filters and sort
fn build_store(selection: &Selection) -> rx_core::Result<(RecordStore, IngestReport)> {
    let paths = resolve_inputs(&selection.input)?;
    let mut store = RecordStore::new();
    let report = ingest_paths(&mut store, &paths);

    for filter in &selection.filter {
        let (column, pattern) = parse_filter(filter)?;
        store.set_filter(column, pattern);
    }

    if let Some(sort) = &selection.sort {
        let column: Column = sort.parse()?;
        store.cycle_sort(column);
        if selection.desc {
            store.cycle_sort(column);
        }
    }

    Ok((store, report))
}

/// Parse a `column=pattern` argument
fn parse_filter(arg: &str) -> rx_core::Result<(Column, String)> {
    let (column, pattern) = arg
        .split_once('=')
        .ok_or_else(|| rx_core::Error::InvalidFilter(arg.to_string()))?;
    Ok((column.parse()?, pattern.to_string()))
}

fn print_ingest_report(report: &IngestReport) {
    for (document, count) in &report.documents {
        println!("  {}: {} record(s)", document, count);
    }
    if !report.failures.is_empty() {
        println!("\nErrors ({}):", report.failures.len());
        for (path, err) in &report.failures {
            println!("  {}: {}", path.display(), err);
        }
    }
    println!();
}

fn print_table<'a>(
    rows: impl Iterator<Item = &'a rx_core::Record>,
    total: usize,
    limit: Option<usize>,
) {
    let header: Vec<&str> = Column::ALL.iter().map(|c| c.label()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    let row_limit = limit.unwrap_or(total);
    for record in rows.take(row_limit) {
        let values: Vec<&str> = Column::ALL.iter().map(|c| c.value(record)).collect();
        println!("{}", values.join("\t"));
    }

    if total > row_limit {
        println!("... ({} more rows)", total - row_limit);
    }
}
