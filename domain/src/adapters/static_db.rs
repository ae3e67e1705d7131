use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::seed;
use crate::timestamp;
use crate::{Clock, Command, CoreError, Note, NotesClient, Param, QueryResult, SystemClock};

/// In-memory emulation of the notes table.
///
/// Answers the same protocol queries as the Postgres pool and returns
/// identically shaped envelopes. The mutex only makes each query atomic for
/// callers that share the handle; the engine is meant for one in-process
/// consumer and keeps nothing across restarts.
pub struct StaticNotesDb<C: Clock = SystemClock> {
    state: Mutex<NotesState>,
    clock: C,
}

struct NotesState {
    notes: Vec<Note>,
    /// Strictly greater than every id ever assigned, deleted ones included.
    next_id: i64,
}

impl StaticNotesDb<SystemClock> {
    /// Engine seeded with a copy of `seed`.
    pub fn new(seed: &[Note]) -> Result<Self, CoreError> {
        Self::with_clock(seed, SystemClock)
    }

    /// Engine seeded with the built-in dataset.
    pub fn with_default_notes() -> Result<Self, CoreError> {
        Self::new(&seed::default_notes()?)
    }
}

impl<C: Clock> StaticNotesDb<C> {
    pub fn with_clock(seed: &[Note], clock: C) -> Result<Self, CoreError> {
        let mut seen = BTreeSet::new();
        let mut notes = Vec::with_capacity(seed.len());
        for note in seed {
            if !seen.insert(note.id) {
                return Err(CoreError::DuplicateId(note.id));
            }
            notes.push(note.normalized());
        }
        let next_id = notes
            .iter()
            .map(|n| n.id)
            .fold(0, i64::max)
            .checked_add(1)
            .ok_or_else(|| CoreError::Seed("note id space exhausted".into()))?;
        debug!(seeded = notes.len(), next_id, "static notes db ready");
        Ok(Self {
            state: Mutex::new(NotesState { notes, next_id }),
            clock,
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, NotesState>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Repository("mutex poisoned".into()))
    }

    fn now(&self) -> DateTime<Utc> {
        timestamp::truncate(self.clock.now())
    }

    /// Parse and execute one protocol query synchronously.
    pub fn run(&self, text: &str, params: &[Param]) -> Result<QueryResult, CoreError> {
        let command = Command::parse(text, params).inspect_err(|e| {
            if let CoreError::UnsupportedQuery(text) = e {
                warn!(query = %text, "static notes db cannot run query");
            }
        })?;
        self.execute(command)
    }

    /// Execute an already parsed command.
    pub fn execute(&self, command: Command) -> Result<QueryResult, CoreError> {
        debug!(command = command.name(), "static notes db query");
        let mut state = self.lock()?;
        match command {
            Command::SelectByTitle { needle } => {
                let rows = state
                    .notes
                    .iter()
                    .filter(|n| needle.is_empty() || n.title.to_lowercase().contains(&needle))
                    .cloned()
                    .collect();
                Ok(QueryResult::from_notes(sorted_desc(rows)))
            }
            Command::SelectAll => Ok(QueryResult::from_notes(sorted_desc(state.notes.clone()))),
            Command::SelectById { id } => {
                let rows = state.notes.iter().filter(|n| n.id == id).cloned().collect();
                Ok(QueryResult::from_notes(rows))
            }
            Command::Insert {
                title,
                body,
                timestamp,
            } => {
                let at = timestamp.unwrap_or_else(|| self.now());
                let id = state.next_id;
                state.next_id = id
                    .checked_add(1)
                    .ok_or_else(|| CoreError::Repository("note id space exhausted".into()))?;
                state.notes.push(Note::new(id, title, body, at));
                Ok(QueryResult::inserted(id))
            }
            Command::Update {
                title,
                body,
                updated_at,
                id,
            } => {
                let at = updated_at.unwrap_or_else(|| self.now());
                match state.notes.iter_mut().find(|n| n.id == id) {
                    Some(note) => {
                        note.title = title;
                        note.body = body;
                        note.updated_at = at.max(note.created_at);
                        Ok(QueryResult::affected(1))
                    }
                    None => Ok(QueryResult::affected(0)),
                }
            }
            Command::DeleteById { id } => {
                let before = state.notes.len();
                state.notes.retain(|n| n.id != id);
                Ok(QueryResult::affected((before - state.notes.len()) as u64))
            }
        }
    }

    /// Copy of the live collection in insertion order.
    pub fn snapshot(&self) -> Result<Vec<Note>, CoreError> {
        Ok(self.lock()?.notes.clone())
    }
}

fn sorted_desc(mut notes: Vec<Note>) -> Vec<Note> {
    notes.sort_by(|a, b| b.id.cmp(&a.id));
    notes
}

#[async_trait]
impl<C: Clock> NotesClient for StaticNotesDb<C> {
    async fn query(&self, text: &str, params: &[Param]) -> Result<QueryResult, CoreError> {
        self.run(text, params)
    }

    async fn end(&self) -> Result<(), CoreError> {
        Ok(())
    }
}
