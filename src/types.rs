//! Core data model types.
//!
//! Ingestion produces an immutable [`Table`]: a [`Schema`] (a list of typed [`Field`]s) plus the
//! rows materialized under it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::query::Preview;

/// Logical data type for a schema field.
///
/// Variants are ordered from most to least specific; inference picks the first one that accepts
/// every non-missing value of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int64 => write!(f, "integer"),
            DataType::Float64 => write!(f, "double"),
            DataType::Bool => write!(f, "boolean"),
            DataType::Utf8 => write!(f, "string"),
        }
    }
}

/// A single named, typed column in a [`Schema`].
///
/// The ordinal position of a field is its index in [`Schema::fields`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Column data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`Table`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// `true` if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of the first field called `name`, if present.
    ///
    /// Duplicate names are allowed in a schema; later duplicates are shadowed here.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl fmt::Display for Schema {
    /// Tree rendering, one line per column.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "root")?;
        for field in &self.fields {
            writeln!(f, " |-- {}: {} (nullable = true)", field.name, field.data_type)?;
        }
        Ok(())
    }
}

/// A single typed value in a [`Table`].
///
/// `Null` marks a missing (empty) field and is distinct from `Int64(0)`, `Bool(false)` and
/// `Utf8(String::new())`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int64(v) => write!(f, "{v}"),
            // Debug keeps the fractional part on whole numbers (`30.0`, not `30`).
            Value::Float64(v) => write!(f, "{v:?}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => write!(f, "{v}"),
        }
    }
}

/// A row of values, positionally aligned with a [`Schema`].
pub type Row = Vec<Value>;

/// Immutable in-memory table.
///
/// Rows are stored row-major in file order. A `Table` can only be built through [`Table::new`],
/// which checks that every row matches the schema width, and exposes read-only accessors only.
/// It is `Send + Sync`, so a built table can be queried from several threads at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    rows: Vec<Row>,
    row_count: usize,
}

impl Table {
    /// Create a table from a schema and rows.
    ///
    /// Fails with [`IngestionError::Schema`] if any row's length differs from the schema's
    /// column count.
    pub fn new(schema: Schema, rows: Vec<Row>) -> IngestionResult<Self> {
        let width = schema.len();
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(IngestionError::schema(format!(
                "row {} has {} values but schema has {} columns",
                idx + 1,
                row.len(),
                width
            )));
        }
        let row_count = rows.len();
        Ok(Self {
            schema,
            rows,
            row_count,
        })
    }

    /// Schema describing row shape.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// All rows in file order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows (header excluded).
    ///
    /// Computed once at construction.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Alias of [`Table::row_count`].
    pub fn count(&self) -> usize {
        self.row_count
    }

    /// The first `min(n, count())` rows, in file order, paired with the schema.
    pub fn preview(&self, n: usize) -> Preview<'_> {
        let shown = n.min(self.row_count);
        Preview::new(&self.schema, &self.rows[..shown], self.row_count)
    }
}
