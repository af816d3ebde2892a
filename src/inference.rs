//! Full-scan schema inference over raw text fields.
//!
//! Every non-missing value of a column is tried against the candidate types in order of
//! specificity: [`DataType::Int64`], [`DataType::Float64`], [`DataType::Bool`], and finally
//! [`DataType::Utf8`] which accepts anything. A column is assigned the most specific candidate that
//! accepts all of its values. Empty fields are missing and never demote a column; a column with no
//! non-missing values is `Utf8`.
//!
//! The value parsers in this module are the same ones the materializer uses to convert fields, so
//! converting a column under its inferred type cannot fail.

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataType, Field, Schema, Value};

/// Infer a [`Schema`] from declared column names and raw data rows (header excluded).
///
/// Fails with [`IngestionError::Schema`] if any row's field count differs from
/// `column_names.len()`. Duplicate names are kept as given.
pub fn infer_schema<S, R>(column_names: &[S], rows: &[R]) -> IngestionResult<Schema>
where
    S: AsRef<str>,
    R: AsRef<[String]>,
{
    let width = column_names.len();
    let mut columns = vec![ColumnTypeState::default(); width];

    for (idx0, row) in rows.iter().enumerate() {
        let row: &[String] = row.as_ref();
        if row.len() != width {
            return Err(IngestionError::schema(format!(
                "data row {} has {} fields but {} columns are declared",
                idx0 + 1,
                row.len(),
                width
            )));
        }
        for (state, raw) in columns.iter_mut().zip(row) {
            state.observe(raw);
        }
    }

    let fields = column_names
        .iter()
        .zip(&columns)
        .map(|(name, state)| {
            let name: &str = name.as_ref();
            Field::new(name, state.resolve())
        })
        .collect();
    Ok(Schema::new(fields))
}

/// Per-column record of which candidate types still accept every value seen so far.
#[derive(Debug, Clone, Copy)]
struct ColumnTypeState {
    seen_value: bool,
    int_ok: bool,
    float_ok: bool,
    bool_ok: bool,
}

impl Default for ColumnTypeState {
    fn default() -> Self {
        Self {
            seen_value: false,
            int_ok: true,
            float_ok: true,
            bool_ok: true,
        }
    }
}

impl ColumnTypeState {
    fn observe(&mut self, raw: &str) {
        if is_missing(raw) {
            return;
        }
        self.seen_value = true;
        // Once every candidate is ruled out the column is Utf8; skip the parse attempts.
        if self.int_ok {
            self.int_ok = parse_int(raw).is_ok();
        }
        if self.float_ok {
            self.float_ok = parse_float(raw).is_ok();
        }
        if self.bool_ok {
            self.bool_ok = parse_bool(raw).is_ok();
        }
    }

    fn resolve(&self) -> DataType {
        if !self.seen_value {
            DataType::Utf8
        } else if self.int_ok {
            DataType::Int64
        } else if self.float_ok {
            DataType::Float64
        } else if self.bool_ok {
            DataType::Bool
        } else {
            DataType::Utf8
        }
    }
}

/// `true` for an empty field.
pub fn is_missing(raw: &str) -> bool {
    raw.is_empty()
}

/// Convert a raw field into a [`Value`] of `data_type`.
///
/// Missing fields become [`Value::Null`] regardless of type. On failure the error message
/// describes the expected type.
pub fn parse_value(data_type: DataType, raw: &str) -> Result<Value, String> {
    if is_missing(raw) {
        return Ok(Value::Null);
    }
    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => parse_int(raw).map(Value::Int64),
        DataType::Float64 => parse_float(raw).map(Value::Float64),
        DataType::Bool => parse_bool(raw).map(Value::Bool),
    }
}

fn parse_int(s: &str) -> Result<i64, String> {
    s.parse::<i64>().map_err(|e| format!("expected integer: {e}"))
}

fn parse_float(s: &str) -> Result<f64, String> {
    // `f64::from_str` also takes "inf"/"NaN"/"infinity"; only plain decimal literals count here.
    if !s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return Err("expected double: not a decimal literal".to_string());
    }
    let v = s.parse::<f64>().map_err(|e| format!("expected double: {e}"))?;
    if !v.is_finite() {
        return Err("expected double: literal overflows f64".to_string());
    }
    Ok(v)
}

fn parse_bool(s: &str) -> Result<bool, String> {
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected boolean (true/false)".to_string())
    }
}
