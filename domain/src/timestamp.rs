//! Timestamp normalization.
//!
//! Every instant the engine stores passes through here, so seed data and
//! query parameters written in different shapes end up in one canonical
//! textual form: RFC 3339 with millisecond precision and a `Z` suffix.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::CoreError;

/// Naive layouts accepted in addition to RFC 3339 / RFC 2822. Read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Render an instant in canonical form, e.g. `2024-01-02T03:04:05.000Z`.
pub fn format_canonical(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Drop sub-millisecond precision.
pub fn truncate(t: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(t.timestamp_millis())
        .single()
        .unwrap_or(t)
}

/// Interpret an integer as milliseconds since the UNIX epoch.
pub fn from_millis(ms: i64) -> Result<DateTime<Utc>, CoreError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| CoreError::InvalidTimestamp(ms.to_string()))
}

/// Parse a textual timestamp.
pub fn parse(input: &str) -> Result<DateTime<Utc>, CoreError> {
    let s = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(truncate(dt.with_timezone(&Utc)));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Ok(truncate(dt.with_timezone(&Utc)));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(truncate(Utc.from_utc_datetime(&naive)));
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(Utc.from_utc_datetime(&naive));
    }
    Err(CoreError::InvalidTimestamp(input.to_string()))
}

/// Serde adapter: writes canonical text, reads text or epoch milliseconds.
pub mod canonical {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_canonical(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let parsed = match Raw::deserialize(d)? {
            Raw::Millis(ms) => super::from_millis(ms),
            Raw::Text(s) => super::parse(&s),
        };
        parsed.map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_shapes() {
        let expected = "2024-06-01T12:30:00.000Z";
        for input in [
            "2024-06-01T12:30:00Z",
            "2024-06-01T14:30:00+02:00",
            "2024-06-01T12:30:00.000Z",
            "2024-06-01 12:30:00",
            "2024-06-01T12:30:00",
            "Sat, 01 Jun 2024 12:30:00 +0000",
        ] {
            let t = parse(input).unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!(format_canonical(&t), expected, "input {input}");
        }
    }

    #[test]
    fn bare_date_is_utc_midnight() {
        let t = parse("2023-12-31").unwrap();
        assert_eq!(format_canonical(&t), "2023-12-31T00:00:00.000Z");
    }

    #[test]
    fn keeps_milliseconds_drops_finer_precision() {
        let t = parse("2024-06-01T12:30:00.123456Z").unwrap();
        assert_eq!(format_canonical(&t), "2024-06-01T12:30:00.123Z");
        assert_eq!(t.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn epoch_millis() {
        let t = from_millis(0).unwrap();
        assert_eq!(format_canonical(&t), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            parse("yesterday-ish"),
            Err(CoreError::InvalidTimestamp(s)) if s == "yesterday-ish"
        ));
        assert!(parse("").is_err());
    }
}
