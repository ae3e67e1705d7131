//! Positional query parameters and the result envelope shared by backends.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::Note;

/// One positional parameter (`$1`, `$2`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Null,
    Int(i64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Param {
    /// Best-effort conversion of a command-line token: `null`, an integer,
    /// otherwise text.
    pub fn from_arg(arg: &str) -> Self {
        if arg.eq_ignore_ascii_case("null") {
            return Param::Null;
        }
        match arg.parse::<i64>() {
            Ok(n) => Param::Int(n),
            Err(_) => Param::Text(arg.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Param::Null)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Text(s)
    }
}

impl From<i64> for Param {
    fn from(n: i64) -> Self {
        Param::Int(n)
    }
}

impl From<i32> for Param {
    fn from(n: i32) -> Self {
        Param::Int(n.into())
    }
}

impl From<u32> for Param {
    fn from(n: u32) -> Self {
        Param::Int(n.into())
    }
}

impl From<DateTime<Utc>> for Param {
    fn from(t: DateTime<Utc>) -> Self {
        Param::Timestamp(t)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map_or(Param::Null, Into::into)
    }
}

/// A row in a result envelope: a full note for reads, or just the new id for
/// `INSERT ... RETURNING id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Note(Note),
    Inserted { id: i64 },
}

impl Row {
    pub fn id(&self) -> i64 {
        match self {
            Row::Note(note) => note.id,
            Row::Inserted { id } => *id,
        }
    }
}

/// Result envelope. Field names follow the Postgres client: `rows` for
/// statements that return rows, `rowCount` for writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(rename = "rowCount", skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
}

impl QueryResult {
    pub fn from_notes(notes: Vec<Note>) -> Self {
        Self {
            rows: Some(notes.into_iter().map(Row::Note).collect()),
            row_count: None,
        }
    }

    pub fn inserted(id: i64) -> Self {
        Self {
            rows: Some(vec![Row::Inserted { id }]),
            row_count: None,
        }
    }

    pub fn affected(count: u64) -> Self {
        Self {
            rows: None,
            row_count: Some(count),
        }
    }

    /// Ids of all returned rows, in order.
    pub fn ids(&self) -> Vec<i64> {
        self.rows
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(Row::id)
            .collect()
    }

    /// Notes among the returned rows, in order.
    pub fn notes(&self) -> Vec<&Note> {
        self.rows
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|row| match row {
                Row::Note(note) => Some(note),
                Row::Inserted { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_field_names_match_pg_client() {
        let inserted = serde_json::to_value(QueryResult::inserted(3)).unwrap();
        assert_eq!(inserted, json!({ "rows": [{ "id": 3 }] }));

        let affected = serde_json::to_value(QueryResult::affected(0)).unwrap();
        assert_eq!(affected, json!({ "rowCount": 0 }));
    }

    #[test]
    fn params_from_common_types() {
        assert_eq!(Param::from("x"), Param::Text("x".into()));
        assert_eq!(Param::from(5i32), Param::Int(5));
        assert_eq!(Param::from(None::<&str>), Param::Null);
        assert_eq!(Param::from(Some(9i64)), Param::Int(9));
    }

    #[test]
    fn from_arg_classifies_tokens() {
        assert_eq!(Param::from_arg("NULL"), Param::Null);
        assert_eq!(Param::from_arg("42"), Param::Int(42));
        assert_eq!(Param::from_arg("%note%"), Param::Text("%note%".into()));
    }
}
