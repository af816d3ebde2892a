use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion, inference and the execution context.
///
/// Every variant is fatal to the ingestion attempt that produced it: no partial [`crate::types::Table`]
/// is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// The resource provider could not find the requested input.
    #[error("resource not found: {resource}")]
    ResourceNotFound { resource: String },

    /// Underlying I/O error other than a missing resource (e.g. permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Tokenizer error from the delimited-text reader (e.g. invalid UTF-8).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed input: empty stream, missing header, or a record whose field count does not
    /// match the column count.
    #[error("ingest error: {message}")]
    Ingest { message: String },

    /// Row/column arity mismatch detected while building a schema.
    #[error("schema error: {message}")]
    Schema { message: String },

    /// A value could not be converted into its column's [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// The execution context could not be started.
    #[error("execution host error: {message}")]
    ExecutionHost { message: String },
}

impl IngestionError {
    pub(crate) fn ingest(message: impl Into<String>) -> Self {
        Self::Ingest {
            message: message.into(),
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}
