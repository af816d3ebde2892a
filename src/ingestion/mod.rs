//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest`] (from [`pipeline`]) which:
//!
//! - opens the input through a [`ResourceProvider`]
//! - materializes it into an immutable [`crate::types::Table`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! The delimited-text materializer itself lives in [`csv`].

pub mod csv;
pub mod observability;
pub mod pipeline;
pub mod resource;

pub use self::csv::CsvOptions;
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use pipeline::{ingest, ingest_from_path, IngestionOptions, IngestionRequest};
pub use resource::{BytesResource, PathResource, ResourceProvider};
