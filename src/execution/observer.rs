use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Lifecycle and query events emitted by an [`super::ExecutionContext`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    SessionStarted { app_name: String, threads: usize },
    IngestStarted { resource: String },
    IngestFinished { resource: String, rows: usize, elapsed: Duration },
    IngestFailed { resource: String, error: String },
    PreviewServed { requested: usize, returned: usize },
    CountServed { rows: usize },
    SessionStopped { metrics: ExecutionMetricsSnapshot },
}

/// Observer hook for execution events.
pub trait ExecutionObserver: Send + Sync {
    fn on_event(&self, event: &ExecutionEvent);
}

/// A simple stderr logger for execution events.
#[derive(Debug, Default)]
pub struct StdErrExecutionObserver;

impl ExecutionObserver for StdErrExecutionObserver {
    fn on_event(&self, event: &ExecutionEvent) {
        eprintln!("[session] {event:?}");
    }
}

/// Counters for a session.
///
/// The context updates these as it works; callers can snapshot them at any time.
pub struct ExecutionMetrics {
    started_at: Mutex<Option<Instant>>,
    elapsed_ns: AtomicU64,

    ingestions_started: AtomicU64,
    ingestions_failed: AtomicU64,
    rows_ingested: AtomicU64,
    previews_served: AtomicU64,
    counts_served: AtomicU64,
}

impl ExecutionMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Mutex::new(None),
            elapsed_ns: AtomicU64::new(0),
            ingestions_started: AtomicU64::new(0),
            ingestions_failed: AtomicU64::new(0),
            rows_ingested: AtomicU64::new(0),
            previews_served: AtomicU64::new(0),
            counts_served: AtomicU64::new(0),
        }
    }

    pub fn begin_session(&self) {
        if let Ok(mut started) = self.started_at.lock() {
            *started = Some(Instant::now());
        }
    }

    pub fn end_session(&self) {
        let elapsed = self
            .started_at
            .lock()
            .ok()
            .and_then(|s| *s)
            .map(|s| s.elapsed())
            .unwrap_or_default();
        self.elapsed_ns
            .store(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
    }

    pub fn on_ingest_started(&self) {
        let _ = self.ingestions_started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_ingest_finished(&self, rows: usize) {
        let _ = self.rows_ingested.fetch_add(rows as u64, Ordering::SeqCst);
    }

    pub fn on_ingest_failed(&self) {
        let _ = self.ingestions_failed.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_preview(&self) {
        let _ = self.previews_served.fetch_add(1, Ordering::SeqCst);
    }

    pub fn on_count(&self) {
        let _ = self.counts_served.fetch_add(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> ExecutionMetricsSnapshot {
        let elapsed_ns = self.elapsed_ns.load(Ordering::SeqCst);
        let elapsed = if elapsed_ns > 0 {
            Some(Duration::from_nanos(elapsed_ns))
        } else {
            None
        };

        ExecutionMetricsSnapshot {
            elapsed,
            ingestions_started: self.ingestions_started.load(Ordering::SeqCst),
            ingestions_failed: self.ingestions_failed.load(Ordering::SeqCst),
            rows_ingested: self.rows_ingested.load(Ordering::SeqCst),
            previews_served: self.previews_served.load(Ordering::SeqCst),
            counts_served: self.counts_served.load(Ordering::SeqCst),
        }
    }
}

impl Default for ExecutionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`ExecutionMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionMetricsSnapshot {
    /// Session duration; `None` until the session has stopped.
    pub elapsed: Option<Duration>,
    pub ingestions_started: u64,
    pub ingestions_failed: u64,
    pub rows_ingested: u64,
    pub previews_served: u64,
    pub counts_served: u64,
}

impl fmt::Display for ExecutionMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ingestions={} (failed={}), rows_ingested={}, previews={}, counts={}, elapsed={:?}",
            self.ingestions_started,
            self.ingestions_failed,
            self.rows_ingested,
            self.previews_served,
            self.counts_served,
            self.elapsed
        )
    }
}
