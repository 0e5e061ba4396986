//! Typed cell values and the tagged missing-value marker.
//!
//! Columns are materialized as vectors of [`Cell`]s. A cell is either the
//! missing marker or a concrete [`Value`]. Missing is an explicit state in
//! the value domain, so equality and set membership over cells stay
//! reflexive; float NaN never reaches the core (the loader normalizes it to
//! missing).

use std::fmt;
use std::hash::{Hash, Hasher};

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A concrete (non-missing) column value.
///
/// Invariant: `Float` never holds NaN; NaN is folded into the missing marker
/// when a dataset is ingested.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Date(d) => d.hash(state),
            Value::DateTime(dt) => dt.hash(state),
        }
    }
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Numeric reading of the value, when one exists.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_infinite())
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Integer(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Integer(b)) => a.total_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            // A bare date sorts as midnight of that day.
            (Value::Date(a), Value::DateTime(b)) => a.and_hms_opt(0, 0, 0).unwrap().cmp(b),
            (Value::DateTime(a), Value::Date(b)) => a.cmp(&b.and_hms_opt(0, 0, 0).unwrap()),
            _ => panic!("Cannot compare heterogeneous Value variants"),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Date(_) | Value::DateTime(_) => serializer.serialize_str(&self.as_display()),
        }
    }
}

/// One observation in a column: the missing marker or a concrete value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell(pub Option<Value>);

impl Cell {
    pub fn missing() -> Self {
        Cell(None)
    }

    pub fn value(value: Value) -> Self {
        Cell(Some(value))
    }

    pub fn is_missing(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_value(&self) -> Option<&Value> {
        self.0.as_ref()
    }

    /// Rendering used by tabular views; the marker displays as `<missing>`.
    pub fn as_display(&self) -> String {
        match &self.0 {
            Some(value) => value.as_display(),
            None => String::from("<missing>"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match &self.0 {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        }
    }
}

pub fn parse_naive_date(value: &str) -> Result<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as date"))
}

pub fn parse_naive_datetime(value: &str) -> Result<NaiveDateTime> {
    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(parsed);
        }
    }
    Err(anyhow!("Failed to parse '{value}' as datetime"))
}

/// Tokens that stand in for an absent value in raw CSV data.
pub fn is_placeholder_token(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    let stripped = lowered.trim_start_matches('#');
    matches!(
        stripped,
        "na" | "n/a" | "n.a." | "null" | "none" | "nan" | "missing"
    ) || (!stripped.is_empty() && stripped.chars().all(|c| c == '-'))
}

/// Parse one raw CSV field as a numeric cell. Empty fields and placeholder
/// tokens become the missing marker; NaN literals do too.
pub fn parse_numeric_cell(raw: &str) -> Result<Cell> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_placeholder_token(trimmed) {
        return Ok(Cell::missing());
    }
    if let Ok(parsed) = trimmed.parse::<i64>() {
        return Ok(Cell::value(Value::Integer(parsed)));
    }
    let parsed: f64 = trimmed
        .parse()
        .with_context(|| format!("Failed to parse '{trimmed}' as number"))?;
    if parsed.is_nan() {
        return Ok(Cell::missing());
    }
    Ok(Cell::value(Value::Float(parsed)))
}

/// Parse one raw CSV field as a temporal cell. Datetime formats are tried
/// before date-only formats so timestamps keep their time component.
pub fn parse_datetime_cell(raw: &str) -> Result<Cell> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || is_placeholder_token(trimmed) {
        return Ok(Cell::missing());
    }
    if let Ok(parsed) = parse_naive_datetime(trimmed) {
        return Ok(Cell::value(Value::DateTime(parsed)));
    }
    let parsed = parse_naive_date(trimmed)
        .with_context(|| format!("Failed to parse '{trimmed}' as date or datetime"))?;
    Ok(Cell::value(Value::Date(parsed)))
}

/// Parse one raw CSV field as a categorical/text cell.
pub fn parse_text_cell(raw: &str) -> Cell {
    if raw.trim().is_empty() || is_placeholder_token(raw) {
        Cell::missing()
    } else {
        Cell::value(Value::String(raw.to_string()))
    }
}
