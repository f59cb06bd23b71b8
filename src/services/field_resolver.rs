//! Tolerant field lookup over loosely-typed upstream records.
//!
//! A record's meaningful fields may live under any of several aliases, or be
//! nested one or two levels deep (`part.partNo`, `partLot.part.partNo`). An
//! [`AliasTable`] names the candidate paths for one field in priority order and
//! [`resolve`] returns the first candidate holding a usable value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::ServiceError;

/// Maximum number of keys in a dot-joined candidate path.
pub const MAX_PATH_DEPTH: usize = 3;

/// A validated chain of one to three object keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self, ServiceError> {
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.trim().is_empty()) {
            return Err(ServiceError::InvalidPath(format!(
                "'{}' contains an empty key",
                raw
            )));
        }
        if segments.len() > MAX_PATH_DEPTH {
            return Err(ServiceError::InvalidPath(format!(
                "'{}' is nested deeper than {} keys",
                raw, MAX_PATH_DEPTH
            )));
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walks the path; any missing or non-object intermediate short-circuits to `None`.
    pub fn lookup<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(record, |current, key| current.as_object()?.get(key))
    }
}

impl FromStr for FieldPath {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Ordered candidate paths for one canonical field.
#[derive(Debug, Clone, Copy)]
pub struct AliasTable {
    pub field: &'static str,
    pub paths: &'static [&'static str],
}

impl AliasTable {
    pub const fn new(field: &'static str, paths: &'static [&'static str]) -> Self {
        Self { field, paths }
    }

    /// Checks every candidate path's syntax.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.paths.is_empty() {
            return Err(ServiceError::InvalidPath(format!(
                "alias table '{}' has no candidates",
                self.field
            )));
        }
        for path in self.paths {
            FieldPath::parse(path)?;
        }
        Ok(())
    }

    pub fn resolve<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        resolve(record, self.paths)
    }

    pub fn text(&self, record: &Value) -> Option<String> {
        self.resolve(record).and_then(as_text)
    }

    pub fn decimal(&self, record: &Value) -> Option<Decimal> {
        self.resolve(record).and_then(as_decimal)
    }

    pub fn timestamp(&self, record: &Value) -> Option<DateTime<Utc>> {
        self.resolve(record).and_then(as_timestamp)
    }

    pub fn date(&self, record: &Value) -> Option<NaiveDate> {
        self.resolve(record).and_then(as_date)
    }
}

/// Returns the first candidate value that is neither missing, `null`, nor `""`.
///
/// Candidates are tried in the given order. Never fails: a malformed path is
/// simply a candidate that matches nothing.
pub fn resolve<'a>(record: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|path| lookup_path(record, path))
        .find(|value| is_present(value))
}

fn lookup_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut depth = 0;
    path.split('.').try_fold(record, |current, key| {
        depth += 1;
        if key.is_empty() || depth > MAX_PATH_DEPTH {
            return None;
        }
        current.as_object()?.get(key)
    })
}

/// A value counts as present unless it is `null` or an empty string.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Renders scalar values as text; objects and arrays have no text form.
pub fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads numbers and numeric strings.
pub fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .ok()
        }
        _ => None,
    }
}

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Reads RFC 3339 strings, naive ISO date-times (taken as UTC), plain dates,
/// epoch milliseconds and `[y, m, d, h, min, s]` arrays.
pub fn as_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp_str(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Value::Array(parts) => {
            let fields = numeric_parts(parts)?;
            let date = date_from_parts(&fields)?;
            let time = date.and_hms_opt(
                part_or_zero(&fields, 3)?,
                part_or_zero(&fields, 4)?,
                part_or_zero(&fields, 5)?,
            )?;
            Some(Utc.from_utc_datetime(&time))
        }
        _ => None,
    }
}

fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Reads ISO dates, full timestamps (date part only) and `[y, m, d]` arrays.
pub fn as_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            let head = trimmed.get(..10).unwrap_or(trimmed);
            NaiveDate::parse_from_str(head, "%Y-%m-%d")
                .ok()
                .or_else(|| parse_timestamp_str(trimmed).map(|ts| ts.date_naive()))
        }
        Value::Array(parts) => date_from_parts(&numeric_parts(parts)?),
        Value::Number(_) => as_timestamp(value).map(|ts| ts.date_naive()),
        _ => None,
    }
}

fn numeric_parts(parts: &[Value]) -> Option<Vec<i64>> {
    parts.iter().map(Value::as_i64).collect()
}

fn date_from_parts(fields: &[i64]) -> Option<NaiveDate> {
    if fields.len() < 3 {
        return None;
    }
    let year = i32::try_from(fields[0]).ok()?;
    let month = u32::try_from(fields[1]).ok()?;
    let day = u32::try_from(fields[2]).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn part_or_zero(fields: &[i64], index: usize) -> Option<u32> {
    fields
        .get(index)
        .map_or(Some(0), |value| u32::try_from(*value).ok())
}
