//! Domain library for the shared notes database.
//!
//! Holds the `Note` entity, the positional query protocol (`Param`,
//! `QueryResult`, `Command`), the `NotesClient` port both backends implement,
//! and the in-memory emulation engine under `adapters`. Keep network and
//! driver concerns out of this crate; the Postgres backend lives in
//! `adapters/pg-adapter`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use command::Command;
pub use query::{Param, QueryResult, Row};

/// A single note record.
///
/// Timestamps serialize in the canonical `YYYY-MM-DDTHH:MM:SS.mmmZ` form and
/// deserialize from any form `timestamp::parse` understands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(with = "timestamp::canonical")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp::canonical")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Create a note whose `updated_at` equals `created_at`.
    pub fn new<T: Into<String>, B: Into<String>>(
        id: i64,
        title: T,
        body: B,
        created_at: DateTime<Utc>,
    ) -> Self {
        let at = timestamp::truncate(created_at);
        Self {
            id,
            title: title.into(),
            body: body.into(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Copy with both timestamps truncated to millisecond precision and
    /// `updated_at` clamped to be no earlier than `created_at`.
    pub fn normalized(&self) -> Self {
        let created_at = timestamp::truncate(self.created_at);
        let updated_at = timestamp::truncate(self.updated_at).max(created_at);
        Self {
            id: self.id,
            title: self.title.clone(),
            body: self.body.clone(),
            created_at,
            updated_at,
        }
    }
}

/// Time source abstraction to make code testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Client port shared by every notes backend.
///
/// Callers write against this trait and stay unaware of whether the handle
/// talks to Postgres or to the in-memory engine.
#[async_trait]
pub trait NotesClient: Send + Sync {
    /// Run one protocol query with positional parameters.
    async fn query(&self, text: &str, params: &[Param]) -> Result<QueryResult, CoreError>;
    /// Release backend resources. Safe to call more than once.
    async fn end(&self) -> Result<(), CoreError>;
}

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported query: {0}")]
    UnsupportedQuery(String),
    #[error("invalid parameter ${position}: {reason}")]
    InvalidParameter { position: usize, reason: String },
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
    #[error("duplicate note id {0} in seed data")]
    DuplicateId(i64),
    #[error("invalid seed data: {0}")]
    Seed(String),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("repository error: {0}")]
    Repository(String),
}

/// Return a short about/version line for binaries to print.
pub fn about() -> String {
    let pkg = env!("CARGO_PKG_NAME");
    let ver = env!("CARGO_PKG_VERSION");
    format!("{} v{}", pkg, ver)
}

pub mod adapters;
pub mod command;
pub mod query;
pub mod seed;
pub mod timestamp;
pub mod validate;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn note_serializes_canonical_timestamps() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let note = Note::new(7, "Title", "Body", at);
        let v = serde_json::to_value(&note).unwrap();
        assert_eq!(v["created_at"], "2024-01-02T03:04:05.000Z");
        assert_eq!(v["updated_at"], "2024-01-02T03:04:05.000Z");
        assert_eq!(v["id"], 7);
    }

    #[test]
    fn note_deserializes_lenient_timestamps() {
        let note: Note = serde_json::from_str(
            r#"{"id":1,"title":"t","body":"b","created_at":"2024-03-01","updated_at":1709251200000}"#,
        )
        .unwrap();
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(
            timestamp::format_canonical(&note.created_at),
            "2024-03-01T00:00:00.000Z"
        );
    }

    #[test]
    fn normalized_clamps_updated_at() {
        let created = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut note = Note::new(1, "a", "b", created);
        note.updated_at = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(note.normalized().updated_at, created);
    }

    #[test]
    fn invalid_parameter_display_is_one_based() {
        let err = CoreError::InvalidParameter {
            position: 2,
            reason: "not an integer".into(),
        };
        assert_eq!(err.to_string(), "invalid parameter $2: not an integer");
    }
}
