//! Outcome reporting for [`super::ingest`].
//!
//! Ingestion itself writes nothing anywhere. A caller that wants a record of what was ingested,
//! or wants to page someone when a resource disappears, plugs an [`IngestionObserver`] into
//! [`super::IngestionOptions`]. Three sinks ship with the crate: [`StdErrObserver`],
//! [`FileObserver`] and the fan-out [`CompositeObserver`].

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::IngestionError;

/// How bad a failed ingestion is. Ordered, so it can be compared against an alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    Info,
    Warning,
    /// The input was read but rejected (bad arity, bad header, bad value).
    Error,
    /// The input could not be read at all.
    Critical,
}

impl IngestionSeverity {
    /// Classify an ingestion error.
    pub fn for_error(e: &IngestionError) -> Self {
        match e {
            IngestionError::ResourceNotFound { .. }
            | IngestionError::Io(_)
            | IngestionError::ExecutionHost { .. } => IngestionSeverity::Critical,
            IngestionError::Csv(err) if matches!(err.kind(), ::csv::ErrorKind::Io(_)) => {
                IngestionSeverity::Critical
            }
            IngestionError::Csv(_)
            | IngestionError::Ingest { .. }
            | IngestionError::Schema { .. }
            | IngestionError::ParseError { .. } => IngestionSeverity::Error,
        }
    }
}

/// What was being ingested, and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionContext {
    pub resource: String,
    pub has_header: bool,
    pub infer_schema: bool,
}

/// Shape of a successfully built table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    pub rows: usize,
    pub columns: usize,
}

/// Receives the outcome of every ingestion it is attached to.
///
/// All methods default to no-ops except [`Self::on_alert`], which falls back to
/// [`Self::on_failure`].
pub trait IngestionObserver: Send + Sync {
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Failure whose severity reached [`super::IngestionOptions::alert_at_or_above`]. Called after
    /// [`Self::on_failure`] for the same error.
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// One rendered outcome line, shared by the text sinks.
enum Outcome<'a> {
    Ok(IngestionStats),
    Failed(IngestionSeverity, &'a IngestionError),
    Alert(IngestionSeverity, &'a IngestionError),
}

fn outcome_line(ctx: &IngestionContext, outcome: Outcome<'_>) -> String {
    match outcome {
        Outcome::Ok(stats) => format!(
            "ok resource={} rows={} columns={} header={} infer={}",
            ctx.resource, stats.rows, stats.columns, ctx.has_header, ctx.infer_schema
        ),
        Outcome::Failed(severity, error) => {
            format!("fail severity={severity:?} resource={} err={error}", ctx.resource)
        }
        Outcome::Alert(severity, error) => {
            format!("ALERT severity={severity:?} resource={} err={error}", ctx.resource)
        }
    }
}

/// Forwards every callback to each inner observer, in order.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompositeObserver({} observers)", self.observers.len())
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers.iter().for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers.iter().for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Prints `[ingest] <outcome>` lines to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!("[ingest] {}", outcome_line(ctx, Outcome::Ok(stats)));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[ingest] {}", outcome_line(ctx, Outcome::Failed(severity, error)));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!("[ingest] {}", outcome_line(ctx, Outcome::Alert(severity, error)));
    }
}

/// Appends `<unix seconds> <outcome>` lines to a log file.
///
/// Callbacks cannot return errors, so a failed write is recorded in [`FileObserver::write_failed`]
/// instead of being reported immediately.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
    write_failed: AtomicBool,
}

impl FileObserver {
    /// Observer for `path`. The file is opened lazily on each event.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
            write_failed: AtomicBool::new(false),
        }
    }

    /// Like [`FileObserver::new`], but first checks that `path` can be opened for appending.
    pub fn try_new(path: impl AsRef<Path>) -> io::Result<Self> {
        let observer = Self::new(path);
        observer.open()?;
        Ok(observer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` once any event could not be written.
    pub fn write_failed(&self) -> bool {
        self.write_failed.load(Ordering::SeqCst)
    }

    fn open(&self) -> io::Result<File> {
        OpenOptions::new().create(true).append(true).open(&self.path)
    }

    fn append(&self, ctx: &IngestionContext, outcome: Outcome<'_>) {
        let line = format!("{} {}", unix_ts(), outcome_line(ctx, outcome));
        let _guard = self.lock.lock().ok();
        let written = self.open().and_then(|mut f| writeln!(f, "{line}"));
        if written.is_err() {
            self.write_failed.store(true, Ordering::SeqCst);
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append(ctx, Outcome::Ok(stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append(ctx, Outcome::Failed(severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append(ctx, Outcome::Alert(severity, error));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
