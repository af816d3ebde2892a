//! Ingestion entrypoint.
//!
//! [`ingest`] opens a [`ResourceProvider`], materializes its contents into a [`Table`] and, if an
//! [`IngestionObserver`] is configured, reports the outcome to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::IngestionResult;
use crate::types::Table;

use super::csv::{ingest_csv_from_reader, CsvOptions};
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::resource::{PathResource, ResourceProvider};

/// Options controlling ingestion.
///
/// Use [`Default`] for the common case: header present, types inferred, comma-delimited, no
/// observer.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Reader and schema options.
    pub csv: CsvOptions,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("csv", &self.csv)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            csv: CsvOptions::default(),
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Ingest a resource into a [`Table`].
///
/// The resource's stream is opened here and closed before this function returns, whatever the
/// outcome.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row and column counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```rust
/// use tabular_ingest::ingestion::{ingest, BytesResource, IngestionOptions};
/// use tabular_ingest::types::{DataType, Value};
///
/// let resource = BytesResource::owned("people.csv", "name,age\nAlice,30\nBob,\n");
/// let table = ingest(&resource, &IngestionOptions::default()).unwrap();
///
/// assert_eq!(table.schema().fields[1].data_type, DataType::Int64);
/// assert_eq!(table.count(), 2);
/// assert_eq!(table.preview(1).rows()[0][1], Value::Int64(30));
/// ```
pub fn ingest(resource: &dyn ResourceProvider, options: &IngestionOptions) -> IngestionResult<Table> {
    let ctx = IngestionContext {
        resource: resource.name(),
        has_header: options.csv.has_header,
        infer_schema: options.csv.infer_schema,
    };

    let result = resource
        .open()
        .and_then(|stream| ingest_csv_from_reader(stream, &options.csv));

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(table) => obs.on_success(
                &ctx,
                IngestionStats {
                    rows: table.row_count(),
                    columns: table.schema().len(),
                },
            ),
            Err(e) => {
                let sev = IngestionSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

/// [`ingest`] for a local file path.
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Table> {
    ingest(&PathResource::new(path), options)
}

/// An owned ingestion request, e.g. for handing work to an
/// [`crate::execution::ExecutionContext`] or a job queue.
#[derive(Clone)]
pub struct IngestionRequest {
    /// Where to read from.
    pub resource: Arc<dyn ResourceProvider>,
    /// Options controlling ingestion.
    pub options: IngestionOptions,
}

impl fmt::Debug for IngestionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionRequest")
            .field("resource", &self.resource.name())
            .field("options", &self.options)
            .finish()
    }
}

impl IngestionRequest {
    pub fn new(resource: Arc<dyn ResourceProvider>, options: IngestionOptions) -> Self {
        Self { resource, options }
    }

    /// Execute the request by calling [`ingest`].
    pub fn run(&self) -> IngestionResult<Table> {
        ingest(self.resource.as_ref(), &self.options)
    }
}
