//! Cell value conversion to JSON.
//!
//! Missing values (empty cells, NA markers, NaN, error cells) always become
//! `null`; nothing is coerced to zero.

use calamine::{Data, DataType};
use chrono::NaiveDateTime;
use serde_json::{Number, Value};

/// Strings treated as missing in CSV input.
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S";

/// Largest integer magnitude an f64 represents exactly.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Convert a float, collapsing whole numbers to integers and NaN/inf to null.
pub fn float_value(f: f64) -> Value {
    if !f.is_finite() {
        return Value::Null;
    }
    if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

/// Convert a spreadsheet cell.
pub fn workbook_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) => match cell.as_datetime() {
            Some(dt) => Value::String(iso_datetime(dt)),
            None => cell.as_f64().map_or(Value::Null, float_value),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
    }
}

fn iso_datetime(dt: NaiveDateTime) -> String {
    dt.format(ISO_DATETIME).to_string()
}

/// Infer a CSV field: integer, float, boolean, or string.
pub fn csv_value(field: &str) -> Value {
    let trimmed = field.trim();
    if NA_VALUES.contains(&trimmed) {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Number::from_f64(f).map_or(Value::Null, Value::Number);
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::String(field.to_string())
}

/// Header text of a spreadsheet cell, if any.
pub fn header_text(cell: &Data) -> Option<String> {
    match workbook_value(cell) {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
