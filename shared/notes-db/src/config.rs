//! Backend selection configuration.
//!
//! The selector takes an explicit `NotesDbConfig` value plus a snapshot of
//! the environment flags. Nothing here reads global state except
//! `EnvFlags::from_env`.

use std::env;

use notes_domain::Note;
use thiserror::Error;

#[cfg(feature = "pg")]
pub use pg_adapter::PgCredentials;

/// Which backend a handle talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-memory emulation engine (data lost on exit)
    Static,
    /// External Postgres pool
    Postgres,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Static => "static",
            Backend::Postgres => "postgres",
        }
    }
}

/// Where the backend decision came from, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSource {
    Config,
    UsePgFlag,
    EnvMode,
    Default,
}

impl ModeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModeSource::Config => "config.mode",
            ModeSource::UsePgFlag => "USE_PG",
            ModeSource::EnvMode => "NOTES_DB_MODE",
            ModeSource::Default => "default",
        }
    }
}

/// Snapshot of the environment variables that influence backend selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvFlags {
    /// `USE_PG`: boolean-like request for the Postgres backend
    pub use_pg: Option<String>,
    /// `NOTES_DB_MODE`: `pg` selects Postgres
    pub mode: Option<String>,
}

impl EnvFlags {
    pub fn from_env() -> Self {
        Self {
            use_pg: env::var("USE_PG").ok(),
            mode: env::var("NOTES_DB_MODE").ok(),
        }
    }
}

/// Factory input.
#[derive(Debug, Clone, Default)]
pub struct NotesDbConfig {
    /// `pg` or `postgres` selects Postgres; any other value selects the
    /// in-memory engine without consulting the environment.
    pub mode: Option<String>,
    /// Required when Postgres is selected.
    #[cfg(feature = "pg")]
    pub credentials: Option<PgCredentials>,
    /// Seed for the in-memory engine; the built-in dataset when absent.
    pub seed: Option<Vec<Note>>,
}

impl NotesDbConfig {
    pub fn with_mode<S: Into<String>>(mut self, mode: S) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn with_seed(mut self, seed: Vec<Note>) -> Self {
        self.seed = Some(seed);
        self
    }

    #[cfg(feature = "pg")]
    pub fn with_credentials(mut self, credentials: PgCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

/// Configuration error, raised when a handle cannot be constructed.
#[derive(Debug, Error)]
#[error("configuration error for {field}: {message}")]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl ConfigError {
    pub fn new<S: Into<String>>(field: &'static str, message: S) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Decide the backend: explicit mode, then `USE_PG`, then `NOTES_DB_MODE`,
/// then the in-memory default.
pub fn resolve_backend(mode: Option<&str>, env: &EnvFlags) -> (Backend, ModeSource) {
    if let Some(mode) = non_empty(mode) {
        let pg = mode.eq_ignore_ascii_case("pg") || mode.eq_ignore_ascii_case("postgres");
        let backend = if pg { Backend::Postgres } else { Backend::Static };
        return (backend, ModeSource::Config);
    }
    if non_empty(env.use_pg.as_deref()).is_some_and(is_truthy) {
        return (Backend::Postgres, ModeSource::UsePgFlag);
    }
    if let Some(mode) = non_empty(env.mode.as_deref()) {
        let backend = if mode.eq_ignore_ascii_case("pg") {
            Backend::Postgres
        } else {
            Backend::Static
        };
        return (backend, ModeSource::EnvMode);
    }
    (Backend::Static, ModeSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(use_pg: Option<&str>, mode: Option<&str>) -> EnvFlags {
        EnvFlags {
            use_pg: use_pg.map(String::from),
            mode: mode.map(String::from),
        }
    }

    #[test]
    fn explicit_mode_wins() {
        let pg_env = env(Some("true"), Some("pg"));
        assert_eq!(
            resolve_backend(Some("static"), &pg_env),
            (Backend::Static, ModeSource::Config)
        );
        assert_eq!(
            resolve_backend(Some("postgres"), &EnvFlags::default()),
            (Backend::Postgres, ModeSource::Config)
        );
        assert_eq!(
            resolve_backend(Some("PG"), &EnvFlags::default()),
            (Backend::Postgres, ModeSource::Config)
        );
    }

    #[test]
    fn use_pg_flag_before_env_mode() {
        assert_eq!(
            resolve_backend(None, &env(Some("true"), Some("static"))),
            (Backend::Postgres, ModeSource::UsePgFlag)
        );
        assert_eq!(
            resolve_backend(None, &env(Some("1"), None)).0,
            Backend::Postgres
        );
        assert_eq!(
            resolve_backend(None, &env(Some("YES"), None)).0,
            Backend::Postgres
        );
    }

    #[test]
    fn falsy_use_pg_falls_through() {
        assert_eq!(
            resolve_backend(None, &env(Some("false"), Some("pg"))),
            (Backend::Postgres, ModeSource::EnvMode)
        );
        assert_eq!(
            resolve_backend(None, &env(Some("0"), None)),
            (Backend::Static, ModeSource::Default)
        );
    }

    #[test]
    fn env_mode_only_accepts_pg() {
        assert_eq!(
            resolve_backend(None, &env(None, Some("postgres"))),
            (Backend::Static, ModeSource::EnvMode)
        );
        assert_eq!(
            resolve_backend(None, &env(None, Some("pg"))),
            (Backend::Postgres, ModeSource::EnvMode)
        );
    }

    #[test]
    fn blank_values_are_ignored() {
        assert_eq!(
            resolve_backend(Some("  "), &env(Some(""), Some(""))),
            (Backend::Static, ModeSource::Default)
        );
    }
}
