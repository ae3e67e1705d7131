//! Centralized configuration for notes-cli.
//!
//! Environment variables are read once at startup. Backend mode flags
//! (`USE_PG`, `NOTES_DB_MODE`) are read by the selector itself.

use std::env;
use std::fs;
use std::path::PathBuf;

use notes_domain::{seed, Note};
use shared_notes_db::{ConfigError, NotesDbConfig, PgCredentials};

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// CLI configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log format (`LOG_FORMAT`, default pretty)
    pub log_format: LogFormat,
    /// Optional JSON seed file for the in-memory engine (`NOTES_DB_SEED`)
    pub seed_path: Option<PathBuf>,
    /// Postgres credentials (`DATABASE_URL` or `PG*` variables)
    pub credentials: Option<PgCredentials>,
}

impl Config {
    pub fn from_env() -> Self {
        let log_format =
            LogFormat::from_str(&env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".into()));
        let seed_path = env::var("NOTES_DB_SEED")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        Self {
            log_format,
            seed_path,
            credentials: PgCredentials::from_env(),
        }
    }

    /// Read and parse the seed file, if one is configured.
    pub fn load_seed(&self) -> Result<Option<Vec<Note>>, ConfigError> {
        let Some(path) = &self.seed_path else {
            return Ok(None);
        };
        let json = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("NOTES_DB_SEED", format!("cannot read {}: {}", path.display(), e))
        })?;
        seed::parse_notes(&json)
            .map(Some)
            .map_err(|e| ConfigError::new("NOTES_DB_SEED", e.to_string()))
    }

    /// Selector input built from this configuration.
    pub fn notes_db_config(&self) -> Result<NotesDbConfig, ConfigError> {
        Ok(NotesDbConfig {
            mode: None,
            credentials: self.credentials.clone(),
            seed: self.load_seed()?,
        })
    }
}
