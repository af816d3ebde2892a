//! `tabular-ingest` reads delimited text (CSV and friends) into an immutable in-memory
//! [`types::Table`], inferring a [`types::Schema`] from the data, and answers two queries over it:
//! a bounded [`query::Preview`] and a total row count.
//!
//! ## Pipeline
//!
//! 1. A [`ingestion::ResourceProvider`] supplies the byte stream (local file, bundled asset,
//!    in-memory buffer).
//! 2. The materializer ([`ingestion::csv`]) splits it into records with RFC-4180 quoting, takes
//!    column names from the header (or names them `_0`, `_1`, ...), and asks the
//!    [`inference`] module for column types.
//! 3. Every record is converted into a typed row; the resulting [`types::Table`] is immutable.
//! 4. [`types::Table::preview`] and [`types::Table::count`] query it.
//!
//! **Value types:** [`types::DataType::Int64`], [`types::DataType::Float64`],
//! [`types::DataType::Bool`], [`types::DataType::Utf8`]. Inference scans every value of a column
//! and picks the most specific type that accepts all of them. Empty fields become
//! [`types::Value::Null`] and never influence inference.
//!
//! ## Quick example
//!
//! ```rust
//! use tabular_ingest::ingestion::csv::{ingest_csv_from_str, CsvOptions};
//! use tabular_ingest::types::{DataType, Value};
//!
//! # fn main() -> Result<(), tabular_ingest::IngestionError> {
//! let table = ingest_csv_from_str("name,age\nAlice,30\nBob,\n", &CsvOptions::default())?;
//!
//! let types: Vec<DataType> = table.schema().fields.iter().map(|f| f.data_type).collect();
//! assert_eq!(types, vec![DataType::Utf8, DataType::Int64]);
//! assert_eq!(table.count(), 2);
//! assert_eq!(table.rows()[1][1], Value::Null);
//! assert_eq!(
//!     table.preview(1).rows(),
//!     &[vec![Value::Utf8("Alice".to_string()), Value::Int64(30)]]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Sessions
//!
//! [`execution::ExecutionContext`] is the explicit per-run host: start it, ingest and query inside
//! it, stop it. [`execution::run_session`] wraps that lifecycle around a closure.
//!
//! ## Modules
//!
//! - [`ingestion`]: entrypoints, resource providers, the CSV materializer, observers
//! - [`inference`]: full-scan column type inference
//! - [`types`]: schema, values and the table type
//! - [`query`]: preview rendering
//! - [`execution`]: session lifecycle, events and counters
//! - [`error`]: the error type shared across the crate

pub mod error;
pub mod execution;
pub mod inference;
pub mod ingestion;
pub mod query;
pub mod types;

pub use error::{IngestionError, IngestionResult};
pub use types::Table;
