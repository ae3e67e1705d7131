//! Textual query protocol.
//!
//! Callers send SQL-looking text with positional parameters. The text is
//! matched by case-insensitive prefix against six fixed shapes and turned
//! into a `Command`; dispatch after that point is typed.

use chrono::{DateTime, Utc};

use crate::validate;
use crate::{CoreError, Param};

const SELECT_BY_TITLE: &str = "select * from notes where title ilike";
const SELECT_ALL: &str = "select * from notes order by id desc";
const SELECT_BY_ID: &str = "select * from notes where id =";
const INSERT: &str = "insert into notes";
const UPDATE: &str = "update notes set";
const DELETE_BY_ID: &str = "delete from notes where id =";

/// A parsed protocol query. Timestamps left as `None` are filled from the
/// engine clock at execution time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `[pattern]`
    SelectByTitle { needle: String },
    SelectAll,
    /// `[id]`
    SelectById { id: i64 },
    /// `[title, body, timestamp?]`
    Insert {
        title: String,
        body: String,
        timestamp: Option<DateTime<Utc>>,
    },
    /// `[title, body, updated_at?, id]`
    Update {
        title: String,
        body: String,
        updated_at: Option<DateTime<Utc>>,
        id: i64,
    },
    /// `[id]`
    DeleteById { id: i64 },
}

impl Command {
    /// Classify `text` and coerce `params` for the matched shape.
    ///
    /// Unrecognized text fails with `CoreError::UnsupportedQuery` carrying the
    /// text exactly as given.
    pub fn parse(text: &str, params: &[Param]) -> Result<Self, CoreError> {
        let normalized = normalize(text);
        let q = normalized.as_str();

        if q.starts_with(SELECT_BY_TITLE) {
            return Ok(Command::SelectByTitle {
                needle: validate::needle(params, 0)?,
            });
        }
        if q.starts_with(SELECT_ALL) {
            return Ok(Command::SelectAll);
        }
        if q.starts_with(SELECT_BY_ID) {
            return Ok(Command::SelectById {
                id: validate::id(params, 0)?,
            });
        }
        if q.starts_with(INSERT) {
            return Ok(Command::Insert {
                title: validate::required_text(params, 0)?,
                body: validate::required_text(params, 1)?,
                timestamp: validate::optional_timestamp(params, 2)?,
            });
        }
        if q.starts_with(UPDATE) {
            return Ok(Command::Update {
                title: validate::required_text(params, 0)?,
                body: validate::required_text(params, 1)?,
                updated_at: validate::optional_timestamp(params, 2)?,
                id: validate::id(params, 3)?,
            });
        }
        if q.starts_with(DELETE_BY_ID) {
            return Ok(Command::DeleteById {
                id: validate::id(params, 0)?,
            });
        }
        Err(CoreError::UnsupportedQuery(text.to_string()))
    }

    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::SelectByTitle { .. } => "select_by_title",
            Command::SelectAll => "select_all",
            Command::SelectById { .. } => "select_by_id",
            Command::Insert { .. } => "insert",
            Command::Update { .. } => "update",
            Command::DeleteById { .. } => "delete_by_id",
        }
    }
}

/// Trim, collapse whitespace runs, lowercase.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
