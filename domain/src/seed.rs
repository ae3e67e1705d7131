//! Seed datasets for the emulation engine.

use crate::{CoreError, Note};

const DEFAULT_NOTES_JSON: &str = include_str!("../data/notes.json");

/// The built-in dataset used when a caller supplies no seed.
pub fn default_notes() -> Result<Vec<Note>, CoreError> {
    parse_notes(DEFAULT_NOTES_JSON)
}

/// Parse a JSON array of note records. Timestamps may use any shape
/// `timestamp::parse` accepts, or epoch milliseconds.
pub fn parse_notes(json: &str) -> Result<Vec<Note>, CoreError> {
    serde_json::from_str(json).map_err(|e| CoreError::Seed(e.to_string()))
}
