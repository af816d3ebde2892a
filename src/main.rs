//! tabular-ingest - preview and count a delimited text file

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;

use tabular_ingest::execution::{run_session, ExecutionObserver, ExecutionOptions, StdErrExecutionObserver};
use tabular_ingest::ingestion::{
    BytesResource, CompositeObserver, CsvOptions, FileObserver, IngestionObserver, IngestionOptions,
    IngestionSeverity, PathResource, ResourceProvider, StdErrObserver,
};
use tabular_ingest::query::Preview;

/// Sample data ingested when no path is given.
const BUNDLED_SAMPLE: &[u8] = include_bytes!("../resources/sample.csv");

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Ingest a delimited text file, infer its schema, and print a preview and the row count
#[derive(Parser, Debug)]
#[command(name = "tabular-ingest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// File to ingest (defaults to the bundled sample)
    path: Option<PathBuf>,

    /// Treat the first record as data; columns are named _0, _1, ...
    #[arg(long)]
    no_header: bool,

    /// Skip type inference; every column is a string
    #[arg(long)]
    no_infer: bool,

    /// Field delimiter (single ASCII character)
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Trim whitespace around fields
    #[arg(long)]
    trim: bool,

    /// Number of rows to preview
    #[arg(short = 'n', long, default_value_t = 5)]
    limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Maximum rendered cell width in table output (0 disables truncation)
    #[arg(long, default_value_t = 20)]
    truncate: usize,

    /// Append ingestion events to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log ingestion and session events to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    preview: Preview<'a>,
    count: usize,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let delimiter = u8::try_from(cli.delimiter)
        .ok()
        .filter(u8::is_ascii)
        .with_context(|| format!("delimiter must be a single ASCII character, got {:?}", cli.delimiter))?;

    let mut observers: Vec<Arc<dyn IngestionObserver>> = Vec::new();
    if cli.verbose {
        observers.push(Arc::new(StdErrObserver));
    }
    let mut log_file = None;
    if let Some(path) = &cli.log_file {
        match FileObserver::try_new(path) {
            Ok(file) => {
                let file = Arc::new(file);
                observers.push(file.clone());
                log_file = Some(file);
            }
            Err(e) => eprintln!("warning: cannot write log file {}: {e}", path.display()),
        }
    }
    let observer: Option<Arc<dyn IngestionObserver>> = if observers.is_empty() {
        None
    } else {
        Some(Arc::new(CompositeObserver::new(observers)))
    };

    let options = IngestionOptions {
        csv: CsvOptions {
            has_header: !cli.no_header,
            infer_schema: !cli.no_infer,
            delimiter,
            trim: cli.trim,
            ..Default::default()
        },
        observer,
        alert_at_or_above: IngestionSeverity::Critical,
    };

    let resource: Box<dyn ResourceProvider> = match &cli.path {
        Some(path) => Box::new(PathResource::new(path)),
        None => Box::new(BytesResource::bundled("sample.csv", BUNDLED_SAMPLE)),
    };

    let session_observer: Option<Arc<dyn ExecutionObserver>> = if cli.verbose {
        Some(Arc::new(StdErrExecutionObserver))
    } else {
        None
    };
    let session = ExecutionOptions {
        observer: session_observer,
        ..Default::default()
    };

    let outcome = run_session(session, |ctx| -> Result<()> {
        let table = ctx
            .ingest(resource.as_ref(), &options)
            .with_context(|| format!("Failed to ingest {}", resource.name()))?;
        let (preview, count) = ctx.summarize(&table, cli.limit);

        let mut out = std::io::stdout().lock();
        match cli.format {
            OutputFormat::Table => {
                let truncate = (cli.truncate > 0).then_some(cli.truncate);
                write!(out, "{}", table.schema())?;
                writeln!(out)?;
                write!(out, "{}", preview.with_truncate(truncate))?;
                writeln!(out, "Total rows: {count}")?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, &JsonReport { preview, count })?;
                writeln!(out)?;
            }
        }
        Ok(())
    });

    if let Some(file) = log_file.filter(|f| f.write_failed()) {
        eprintln!("warning: some events could not be written to {}", file.path().display());
    }
    outcome
}
