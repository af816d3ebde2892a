//! Terminal queries over a [`crate::types::Table`].
//!
//! A [`Preview`] is a borrowed, order-preserving prefix of a table's rows. It renders as a text
//! grid through [`std::fmt::Display`] and serializes to JSON through `serde`.
//!
//! ```rust
//! use tabular_ingest::ingestion::csv::{ingest_csv_from_str, CsvOptions};
//!
//! let table = ingest_csv_from_str("name,age\nAlice,30\nBob,\n", &CsvOptions::default()).unwrap();
//! assert_eq!(table.count(), 2);
//! print!("{}", table.preview(5));
//! ```

use std::fmt;

use serde::Serialize;

use crate::types::{Row, Schema};

/// Default maximum cell width used when rendering a [`Preview`].
pub const DEFAULT_TRUNCATE: usize = 20;

/// The first rows of a table, paired with its schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview<'a> {
    schema: &'a Schema,
    rows: &'a [Row],
    total_rows: usize,
    #[serde(skip)]
    truncate: Option<usize>,
}

impl<'a> Preview<'a> {
    pub(crate) fn new(schema: &'a Schema, rows: &'a [Row], total_rows: usize) -> Self {
        Self {
            schema,
            rows,
            total_rows,
            truncate: Some(DEFAULT_TRUNCATE),
        }
    }

    /// Set the maximum rendered cell width; `None` disables truncation.
    pub fn with_truncate(mut self, truncate: Option<usize>) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn rows(&self) -> &'a [Row] {
        self.rows
    }

    /// Number of rows in the preview.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row count of the whole table the preview was taken from.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// `true` when the table has more rows than the preview shows.
    pub fn is_partial(&self) -> bool {
        self.rows.len() < self.total_rows
    }

    fn render_cell(&self, raw: String) -> String {
        match self.truncate {
            Some(max) if raw.chars().count() > max => {
                if max < 4 {
                    raw.chars().take(max).collect()
                } else {
                    let mut out: String = raw.chars().take(max - 3).collect();
                    out.push_str("...");
                    out
                }
            }
            _ => raw,
        }
    }
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = self
            .schema
            .field_names()
            .map(|n| self.render_cell(n.to_owned()))
            .collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(|v| self.render_cell(v.to_string())).collect())
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count().max(3)).collect();
        for row in &body {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let sep: String = widths
            .iter()
            .fold(String::from("+"), |mut acc, w| {
                acc.push_str(&"-".repeat(*w));
                acc.push('+');
                acc
            });

        writeln!(f, "{sep}")?;
        write_grid_line(f, &header, &widths)?;
        writeln!(f, "{sep}")?;
        for row in &body {
            write_grid_line(f, row, &widths)?;
        }
        writeln!(f, "{sep}")?;

        if self.is_partial() {
            let noun = if self.rows.len() == 1 { "row" } else { "rows" };
            writeln!(f, "only showing top {} {noun}", self.rows.len())?;
        }
        Ok(())
    }
}

fn write_grid_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    write!(f, "|")?;
    for (cell, width) in cells.iter().zip(widths) {
        let pad = width.saturating_sub(cell.chars().count());
        write!(f, "{}{}|", " ".repeat(pad), cell)?;
    }
    writeln!(f)
}
