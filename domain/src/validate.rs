//! Positional parameter coercion. Each helper reads one parameter by index;
//! a missing trailing parameter reads as `Param::Null`.

use chrono::{DateTime, Utc};

use crate::timestamp;
use crate::{CoreError, Param};

static NULL: Param = Param::Null;

fn at(params: &[Param], index: usize) -> &Param {
    params.get(index).unwrap_or(&NULL)
}

fn invalid(index: usize, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidParameter {
        position: index + 1,
        reason: reason.into(),
    }
}

/// Text value for a title or body column.
pub fn required_text(params: &[Param], index: usize) -> Result<String, CoreError> {
    match at(params, index) {
        Param::Text(s) => Ok(s.clone()),
        Param::Int(n) => Ok(n.to_string()),
        Param::Null => Err(invalid(index, "missing text value")),
        Param::Timestamp(_) => Err(invalid(index, "expected text, got timestamp")),
    }
}

/// Title search needle: `%` wildcards stripped, trimmed, lowercased. Empty
/// means "no filtering".
pub fn needle(params: &[Param], index: usize) -> Result<String, CoreError> {
    let raw = match at(params, index) {
        Param::Null => String::new(),
        Param::Text(s) => s.clone(),
        Param::Int(n) => n.to_string(),
        Param::Timestamp(_) => return Err(invalid(index, "expected a title pattern")),
    };
    Ok(raw.replace('%', "").trim().to_lowercase())
}

/// Integer note id.
pub fn id(params: &[Param], index: usize) -> Result<i64, CoreError> {
    match at(params, index) {
        Param::Int(n) => Ok(*n),
        Param::Text(s) => parse_id(s).ok_or_else(|| invalid(index, format!("{s:?} is not an integer id"))),
        Param::Null => Err(invalid(index, "missing id")),
        Param::Timestamp(_) => Err(invalid(index, "expected an integer id, got timestamp")),
    }
}

fn parse_id(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
}

/// Optional timestamp. `None` tells the caller to use the current time.
pub fn optional_timestamp(
    params: &[Param],
    index: usize,
) -> Result<Option<DateTime<Utc>>, CoreError> {
    match at(params, index) {
        Param::Null => Ok(None),
        Param::Timestamp(t) => Ok(Some(timestamp::truncate(*t))),
        Param::Int(ms) => timestamp::from_millis(*ms).map(Some),
        Param::Text(s) if s.trim().is_empty() => Ok(None),
        Param::Text(s) => timestamp::parse(s).map(Some),
    }
}
