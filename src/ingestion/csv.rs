//! Delimited-text materializer.
//!
//! Turns a byte stream into an immutable [`Table`]:
//!
//! 1. split the stream into records (RFC-4180 quoting via the `csv` crate)
//! 2. take column names from the header record, or name columns `_0`, `_1`, ...
//! 3. pick a schema: explicit, inferred with [`crate::inference::infer_schema`], or all-`Utf8`
//! 4. convert every record into a typed row
//!
//! Any malformed record aborts the whole ingestion; no partial table is returned.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::inference::{infer_schema, parse_value};
use crate::types::{DataType, Field, Row, Schema, Table};

use super::resource::{PathResource, ResourceProvider};

/// Reader options for delimited text.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    /// First record holds column names.
    pub has_header: bool,
    /// Infer column types from the data. When `false` (and no explicit schema is given) every
    /// column is [`DataType::Utf8`] and values are kept as raw text.
    pub infer_schema: bool,
    /// Field delimiter.
    pub delimiter: u8,
    /// Quote character; a literal quote inside a quoted field is written twice.
    pub quote: u8,
    /// Trim leading/trailing whitespace from every field (header included).
    pub trim: bool,
    /// Explicit schema. Takes precedence over `infer_schema`; its field count must match the
    /// record width. Column names come from the schema.
    pub schema: Option<Schema>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            infer_schema: true,
            delimiter: b',',
            quote: b'"',
            trim: false,
            schema: None,
        }
    }
}

/// Ingest a delimited-text file from a local path.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, options: &CsvOptions) -> IngestionResult<Table> {
    let resource = PathResource::new(path);
    ingest_csv_from_reader(resource.open()?, options)
}

/// Ingest delimited text held in memory.
pub fn ingest_csv_from_str(input: &str, options: &CsvOptions) -> IngestionResult<Table> {
    ingest_csv_from_reader(input.as_bytes(), options)
}

/// Ingest delimited text from any byte stream.
///
/// The stream is consumed to the end and dropped before this function returns, on success and
/// on failure.
pub fn ingest_csv_from_reader<R: Read>(reader: R, options: &CsvOptions) -> IngestionResult<Table> {
    let mut reader = BufReader::new(reader);
    if reader.fill_buf()?.is_empty() {
        return Err(IngestionError::ingest("input stream is empty"));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .quote(options.quote)
        .double_quote(true)
        .trim(if options.trim { csv::Trim::All } else { csv::Trim::None })
        .from_reader(reader);

    let mut records = rdr.records();
    let first = match records.next() {
        Some(result) => result?,
        None if options.has_header => {
            return Err(IngestionError::ingest(
                "header declared but input contains no records",
            ));
        }
        None => return Err(IngestionError::ingest("input contains no records")),
    };

    let width = first.len();
    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    // 1-based source line of each data record, for error messages.
    let mut lines: Vec<u64> = Vec::new();

    let column_names: Vec<String> = if options.has_header {
        first
            .iter()
            .enumerate()
            .map(|(i, name)| {
                if name.is_empty() {
                    positional_name(i)
                } else {
                    name.to_owned()
                }
            })
            .collect()
    } else {
        lines.push(record_line(&first, 1));
        raw_rows.push(first.iter().map(str::to_owned).collect());
        (0..width).map(positional_name).collect()
    };

    for result in records {
        let record = result?;
        let line = record_line(&record, lines.last().map_or(2, |l| l + 1));
        if record.len() != width {
            return Err(IngestionError::ingest(format!(
                "record at line {line} has {} fields but {width} columns are declared",
                record.len()
            )));
        }
        lines.push(line);
        raw_rows.push(record.iter().map(str::to_owned).collect());
    }
    drop(rdr);

    let schema = match &options.schema {
        Some(explicit) => {
            if explicit.len() != width {
                return Err(IngestionError::schema(format!(
                    "explicit schema has {} fields but input records have {width}",
                    explicit.len()
                )));
            }
            explicit.clone()
        }
        None if options.infer_schema => infer_schema(&column_names, &raw_rows)?,
        None => Schema::new(
            column_names
                .iter()
                .map(|name| Field::new(name.as_str(), DataType::Utf8))
                .collect(),
        ),
    };

    let rows = raw_rows
        .into_iter()
        .zip(lines)
        .map(|(raw, line)| convert_row(&schema, raw, line))
        .collect::<IngestionResult<Vec<Row>>>()?;

    Table::new(schema, rows)
}

fn convert_row(schema: &Schema, raw: Vec<String>, line: u64) -> IngestionResult<Row> {
    schema
        .fields
        .iter()
        .zip(raw)
        .map(|(field, raw)| {
            parse_value(field.data_type, &raw).map_err(|message| IngestionError::ParseError {
                row: line as usize,
                column: field.name.clone(),
                raw,
                message,
            })
        })
        .collect()
}

fn positional_name(idx: usize) -> String {
    format!("_{idx}")
}

fn record_line(record: &csv::StringRecord, fallback: u64) -> u64 {
    record.position().map_or(fallback, |p| p.line())
}
