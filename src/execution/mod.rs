//! Execution host: an explicit, per-run session in which ingestion and queries happen.
//!
//! An [`ExecutionContext`] is created at the start of a run, passed by reference to whatever needs
//! it, and stopped at the end. There is no global session. It provides:
//!
//! - a local rayon thread pool that ingestion and queries run on
//! - lifecycle events and counters via [`ExecutionObserver`] / [`ExecutionMetrics`]
//!
//! ```rust
//! use tabular_ingest::execution::{run_session, ExecutionOptions};
//! use tabular_ingest::ingestion::{BytesResource, IngestionOptions};
//!
//! let resource = BytesResource::owned("inline.csv", "id\n1\n2\n3\n");
//! let count = run_session(ExecutionOptions::default(), |ctx| {
//!     let table = ctx.ingest(&resource, &IngestionOptions::default())?;
//!     Ok::<_, tabular_ingest::IngestionError>(ctx.count(&table))
//! })
//! .unwrap();
//! assert_eq!(count, 3);
//! ```

mod observer;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::{IngestionError, IngestionResult};
use crate::ingestion::{self, IngestionOptions, IngestionRequest, ResourceProvider};
use crate::query::Preview;
use crate::types::Table;

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, StdErrExecutionObserver,
};

/// Configuration for an [`ExecutionContext`].
#[derive(Clone)]
pub struct ExecutionOptions {
    /// Name reported in the session-started event.
    pub app_name: String,
    /// Number of worker threads.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Optional observer for session events.
    pub observer: Option<Arc<dyn ExecutionObserver>>,
}

impl fmt::Debug for ExecutionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionOptions")
            .field("app_name", &self.app_name)
            .field("num_threads", &self.num_threads)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            app_name: env!("CARGO_PKG_NAME").to_string(),
            num_threads: None,
            observer: None,
        }
    }
}

/// A running local session.
///
/// Stopping is explicit via [`ExecutionContext::stop`]; a context that is dropped without being
/// stopped stops itself.
pub struct ExecutionContext {
    pool: ThreadPool,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
    stopped: bool,
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("threads", &self.pool.current_num_threads())
            .field("observer_set", &self.observer.is_some())
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl ExecutionContext {
    /// Start a session.
    ///
    /// Fails with [`IngestionError::ExecutionHost`] if `num_threads == Some(0)` or the thread pool
    /// cannot be built.
    pub fn start(opts: ExecutionOptions) -> IngestionResult<Self> {
        if opts.num_threads == Some(0) {
            return Err(IngestionError::ExecutionHost {
                message: "num_threads must be > 0 when set".to_string(),
            });
        }
        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1));

        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("tabular-ingest-{i}"))
            .build()
            .map_err(|e| IngestionError::ExecutionHost {
                message: format!("failed to build thread pool: {e}"),
            })?;

        let ctx = Self {
            pool,
            observer: opts.observer,
            metrics: Arc::new(ExecutionMetrics::new()),
            stopped: false,
        };
        ctx.metrics.begin_session();
        ctx.emit(ExecutionEvent::SessionStarted {
            app_name: opts.app_name,
            threads: n_threads,
        });
        Ok(ctx)
    }

    /// Get a handle to the session counters.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Number of worker threads in the session's pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Ingest a resource inside this session.
    pub fn ingest(&self, resource: &dyn ResourceProvider, options: &IngestionOptions) -> IngestionResult<Table> {
        let name = resource.name();
        let start = Instant::now();
        self.metrics.on_ingest_started();
        self.emit(ExecutionEvent::IngestStarted {
            resource: name.clone(),
        });

        let result = self.pool.install(|| ingestion::ingest(resource, options));

        match &result {
            Ok(table) => {
                self.metrics.on_ingest_finished(table.row_count());
                self.emit(ExecutionEvent::IngestFinished {
                    resource: name,
                    rows: table.row_count(),
                    elapsed: start.elapsed(),
                });
            }
            Err(e) => {
                self.metrics.on_ingest_failed();
                self.emit(ExecutionEvent::IngestFailed {
                    resource: name,
                    error: e.to_string(),
                });
            }
        }
        result
    }

    /// Execute an owned [`IngestionRequest`] inside this session.
    pub fn run(&self, request: &IngestionRequest) -> IngestionResult<Table> {
        self.ingest(request.resource.as_ref(), &request.options)
    }

    /// [`Table::preview`], recorded in the session counters.
    pub fn preview<'t>(&self, table: &'t Table, n: usize) -> Preview<'t> {
        let preview = table.preview(n);
        self.metrics.on_preview();
        self.emit(ExecutionEvent::PreviewServed {
            requested: n,
            returned: preview.len(),
        });
        preview
    }

    /// [`Table::count`], recorded in the session counters.
    pub fn count(&self, table: &Table) -> usize {
        let rows = table.count();
        self.metrics.on_count();
        self.emit(ExecutionEvent::CountServed { rows });
        rows
    }

    /// Compute the preview and the count concurrently on the session's pool.
    pub fn summarize<'t>(&self, table: &'t Table, n: usize) -> (Preview<'t>, usize) {
        self.pool.join(|| self.preview(table, n), || self.count(table))
    }

    /// Stop the session and return its final counters.
    pub fn stop(mut self) -> ExecutionMetricsSnapshot {
        self.shutdown()
    }

    fn shutdown(&mut self) -> ExecutionMetricsSnapshot {
        self.metrics.end_session();
        let metrics = self.metrics.snapshot();
        if !self.stopped {
            self.stopped = true;
            self.emit(ExecutionEvent::SessionStopped {
                metrics: metrics.clone(),
            });
        }
        metrics
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

impl Drop for ExecutionContext {
    fn drop(&mut self) {
        if !self.stopped {
            let _ = self.shutdown();
        }
    }
}

/// Start a session, run `f` in it, and stop the session on every exit path.
pub fn run_session<T, E, F>(opts: ExecutionOptions, f: F) -> Result<T, E>
where
    F: FnOnce(&ExecutionContext) -> Result<T, E>,
    E: From<IngestionError>,
{
    let ctx = ExecutionContext::start(opts)?;
    let out = f(&ctx);
    ctx.stop();
    out
}

#[cfg(test)]
mod tests {
    use super::{run_session, ExecutionContext, ExecutionOptions};
    use std::sync::{Arc, Mutex};

    use crate::error::IngestionError;
    use crate::execution::{ExecutionEvent, ExecutionObserver};
    use crate::ingestion::{BytesResource, IngestionOptions};

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<ExecutionEvent>>,
    }

    impl RecordingObserver {
        fn names(&self) -> Vec<&'static str> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .map(|e| match e {
                    ExecutionEvent::SessionStarted { .. } => "started",
                    ExecutionEvent::IngestStarted { .. } => "ingest",
                    ExecutionEvent::IngestFinished { .. } => "ingested",
                    ExecutionEvent::IngestFailed { .. } => "failed",
                    ExecutionEvent::PreviewServed { .. } => "preview",
                    ExecutionEvent::CountServed { .. } => "count",
                    ExecutionEvent::SessionStopped { .. } => "stopped",
                })
                .collect()
        }
    }

    impl ExecutionObserver for RecordingObserver {
        fn on_event(&self, event: &ExecutionEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn opts_with(observer: Arc<RecordingObserver>) -> ExecutionOptions {
        ExecutionOptions {
            num_threads: Some(2),
            observer: Some(observer),
            ..Default::default()
        }
    }

    fn people() -> BytesResource {
        BytesResource::owned("people.csv", "name,age\nAlice,30\nBob,\nCarol,41\n")
    }

    #[test]
    fn session_lifecycle_emits_events_in_order() {
        let observer = Arc::new(RecordingObserver::default());
        let ctx = ExecutionContext::start(opts_with(observer.clone())).unwrap();

        let table = ctx.ingest(&people(), &IngestionOptions::default()).unwrap();
        let preview = ctx.preview(&table, 2);
        assert_eq!(preview.len(), 2);
        assert_eq!(ctx.count(&table), 3);

        let snap = ctx.stop();
        assert_eq!(snap.ingestions_started, 1);
        assert_eq!(snap.rows_ingested, 3);
        assert_eq!(snap.previews_served, 1);
        assert_eq!(snap.counts_served, 1);
        assert!(snap.elapsed.is_some());

        assert_eq!(
            observer.names(),
            vec!["started", "ingest", "ingested", "preview", "count", "stopped"]
        );
    }

    #[test]
    fn dropped_context_stops_once() {
        let observer = Arc::new(RecordingObserver::default());
        {
            let _ctx = ExecutionContext::start(opts_with(observer.clone())).unwrap();
        }
        assert_eq!(observer.names(), vec!["started", "stopped"]);
    }

    #[test]
    fn run_session_stops_after_failure() {
        let observer = Arc::new(RecordingObserver::default());
        let missing = BytesResource::owned("empty.csv", "");

        let err = run_session(opts_with(observer.clone()), |ctx| {
            ctx.ingest(&missing, &IngestionOptions::default())
        })
        .unwrap_err();

        assert!(matches!(err, IngestionError::Ingest { .. }));
        assert_eq!(observer.names(), vec!["started", "ingest", "failed", "stopped"]);
    }

    #[test]
    fn summarize_returns_preview_and_count() {
        let ctx = ExecutionContext::start(ExecutionOptions {
            num_threads: Some(4),
            ..Default::default()
        })
        .unwrap();
        let table = ctx.ingest(&people(), &IngestionOptions::default()).unwrap();

        let (preview, count) = ctx.summarize(&table, 1);
        assert_eq!(count, 3);
        assert_eq!(preview.rows(), &table.rows()[..1]);

        let snap = ctx.stop();
        assert_eq!(snap.previews_served, 1);
        assert_eq!(snap.counts_served, 1);
    }

    #[test]
    fn zero_threads_is_rejected() {
        let err = ExecutionContext::start(ExecutionOptions {
            num_threads: Some(0),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, IngestionError::ExecutionHost { .. }));
    }
}
