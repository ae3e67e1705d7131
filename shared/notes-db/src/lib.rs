//! shared-notes-db: backend selector for the notes store.
//!
//! `create_notes_db` returns a `NotesDb` handle. Depending on configuration
//! it wraps a lazily connected Postgres pool (feature `pg`, on by default) or
//! an in-memory `StaticNotesDb` seeded with the caller's dataset or the
//! built-in one. Either way callers issue the same protocol queries through
//! `NotesClient` and get identically shaped results.
//!
//! Selection order: `config.mode`, then `USE_PG`, then `NOTES_DB_MODE`, then
//! the in-memory engine. See `config.rs`.

pub mod config;

use async_trait::async_trait;
use notes_domain::adapters::static_db::StaticNotesDb;
use notes_domain::{seed, CoreError, NotesClient, Param, QueryResult};
use tracing::{debug, info};

pub use config::{resolve_backend, Backend, ConfigError, EnvFlags, ModeSource, NotesDbConfig};
#[cfg(feature = "pg")]
pub use config::PgCredentials;
pub use notes_domain::{Note, Row};

/// Handle returned by the selector.
pub enum NotesDb {
    Static(StaticNotesDb),
    #[cfg(feature = "pg")]
    Postgres(pg_adapter::PgNotesPool),
}

impl NotesDb {
    pub fn backend(&self) -> Backend {
        match self {
            NotesDb::Static(_) => Backend::Static,
            #[cfg(feature = "pg")]
            NotesDb::Postgres(_) => Backend::Postgres,
        }
    }

    /// The in-memory engine, when that is the selected backend.
    pub fn as_static(&self) -> Option<&StaticNotesDb> {
        match self {
            NotesDb::Static(db) => Some(db),
            #[cfg(feature = "pg")]
            NotesDb::Postgres(_) => None,
        }
    }
}

#[async_trait]
impl NotesClient for NotesDb {
    async fn query(&self, text: &str, params: &[Param]) -> Result<QueryResult, CoreError> {
        match self {
            NotesDb::Static(db) => db.query(text, params).await,
            #[cfg(feature = "pg")]
            NotesDb::Postgres(db) => db.query(text, params).await,
        }
    }

    async fn end(&self) -> Result<(), CoreError> {
        match self {
            NotesDb::Static(db) => db.end().await,
            #[cfg(feature = "pg")]
            NotesDb::Postgres(db) => db.end().await,
        }
    }
}

/// Build a handle using the process environment for mode fallback.
pub fn create_notes_db(config: NotesDbConfig) -> Result<NotesDb, ConfigError> {
    create_notes_db_with_env(config, &EnvFlags::from_env())
}

/// Build a handle against an explicit environment snapshot.
pub fn create_notes_db_with_env(
    config: NotesDbConfig,
    env: &EnvFlags,
) -> Result<NotesDb, ConfigError> {
    let (backend, source) = resolve_backend(config.mode.as_deref(), env);
    debug!(backend = backend.as_str(), source = source.as_str(), "resolved notes backend");
    match backend {
        Backend::Postgres => build_postgres(config),
        Backend::Static => build_static(config),
    }
}

fn build_static(config: NotesDbConfig) -> Result<NotesDb, ConfigError> {
    let seed = match config.seed {
        Some(seed) => seed,
        None => seed::default_notes().map_err(|e| ConfigError::new("seed", e.to_string()))?,
    };
    let db = StaticNotesDb::new(&seed).map_err(|e| ConfigError::new("seed", e.to_string()))?;
    info!(backend = "static", notes = seed.len(), "notes db ready");
    Ok(NotesDb::Static(db))
}

#[cfg(feature = "pg")]
fn build_postgres(config: NotesDbConfig) -> Result<NotesDb, ConfigError> {
    let credentials = config.credentials.ok_or_else(|| {
        ConfigError::new("credentials", "credentials required for external backend")
    })?;
    let pool = pg_adapter::PgNotesPool::connect_lazy(&credentials)
        .map_err(|e| ConfigError::new("credentials", e.to_string()))?;
    info!(backend = "postgres", "notes db ready");
    Ok(NotesDb::Postgres(pool))
}

#[cfg(not(feature = "pg"))]
fn build_postgres(_config: NotesDbConfig) -> Result<NotesDb, ConfigError> {
    Err(ConfigError::new(
        "mode",
        "postgres backend not compiled in; enable the `pg` feature",
    ))
}
