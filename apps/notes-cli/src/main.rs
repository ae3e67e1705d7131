//! notes-cli: run one notes query through the backend selector.
//!
//! Without Postgres configuration every run starts from the seed dataset and
//! nothing is persisted between runs.
//!
//! Run:
//! ```bash
//! cargo run -p notes-cli -- list
//! cargo run -p notes-cli -- search meeting
//!
//! # against Postgres
//! USE_PG=true DATABASE_URL=postgres://localhost/notes cargo run -p notes-cli -- list
//! ```

mod config;

use std::env;
use std::process;

use notes_domain::{NotesClient, Param};
use shared_notes_db::create_notes_db;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SELECT_ALL: &str = "SELECT * FROM notes ORDER BY id DESC";
const SELECT_BY_TITLE: &str = "SELECT * FROM notes WHERE title ILIKE $1 ORDER BY id DESC";
const SELECT_BY_ID: &str = "SELECT * FROM notes WHERE id = $1";
const INSERT: &str = "INSERT INTO notes (title, body, created_at, updated_at) VALUES ($1, $2, COALESCE($3::timestamptz, NOW()), COALESCE($3::timestamptz, NOW())) RETURNING id";
const UPDATE: &str = "UPDATE notes SET title = $1, body = $2, updated_at = COALESCE($3::timestamptz, NOW()) WHERE id = $4";
const DELETE_BY_ID: &str = "DELETE FROM notes WHERE id = $1";

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  notes-cli list\n  notes-cli search <pattern>\n  notes-cli show <id>\n  notes-cli add <title> <body> [timestamp]\n  notes-cli edit <id> <title> <body> [timestamp]\n  notes-cli rm <id>\n  notes-cli sql <text> [param...]\n\nNotes:\n  - Set USE_PG=true (or NOTES_DB_MODE=pg) with DATABASE_URL/PG* variables to use Postgres.\n  - NOTES_DB_SEED=<file.json> seeds the in-memory engine.",
        notes_domain::about()
    );
}

fn arg<'a>(rest: &'a [String], index: usize, name: &str) -> Result<&'a str, String> {
    rest.get(index)
        .map(String::as_str)
        .ok_or_else(|| format!("missing <{}>", name))
}

fn optional(rest: &[String], index: usize) -> Param {
    rest.get(index).map(String::as_str).into()
}

/// Map a subcommand to protocol text and positional parameters. `None` means
/// the command is unknown.
fn build_query(cmd: &str, rest: &[String]) -> Result<Option<(String, Vec<Param>)>, String> {
    let query: (String, Vec<Param>) = match cmd {
        "list" => (SELECT_ALL.to_string(), vec![]),
        "search" => {
            let pattern = arg(rest, 0, "pattern")?;
            (SELECT_BY_TITLE.to_string(), vec![format!("%{}%", pattern).into()])
        }
        "show" => (
            SELECT_BY_ID.to_string(),
            vec![Param::from_arg(arg(rest, 0, "id")?)],
        ),
        "add" => (
            INSERT.to_string(),
            vec![
                arg(rest, 0, "title")?.into(),
                arg(rest, 1, "body")?.into(),
                optional(rest, 2),
            ],
        ),
        "edit" => (
            UPDATE.to_string(),
            vec![
                arg(rest, 1, "title")?.into(),
                arg(rest, 2, "body")?.into(),
                optional(rest, 3),
                Param::from_arg(arg(rest, 0, "id")?),
            ],
        ),
        "rm" => (
            DELETE_BY_ID.to_string(),
            vec![Param::from_arg(arg(rest, 0, "id")?)],
        ),
        "sql" => {
            let text = arg(rest, 0, "text")?.to_string();
            let params = rest[1..].iter().map(|a| Param::from_arg(a)).collect();
            (text, params)
        }
        _ => return Ok(None),
    };
    Ok(Some(query))
}

async fn run(cfg: &config::Config) -> Result<(), String> {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        print_usage();
        return Ok(());
    };
    let rest: Vec<String> = args.collect();
    let Some((text, params)) = build_query(&cmd, &rest)? else {
        print_usage();
        return Ok(());
    };

    let db_config = cfg.notes_db_config().map_err(|e| e.to_string())?;
    let db = create_notes_db(db_config).map_err(|e| e.to_string())?;
    info!(backend = db.backend().as_str(), command = %cmd, "running query");

    let result = db.query(&text, &params).await;
    db.end().await.map_err(|e| format!("closing backend failed: {}", e))?;
    let result = result.map_err(|e| format!("{} failed: {}", cmd, e))?;

    let out = serde_json::to_string_pretty(&result).map_err(|e| e.to_string())?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cfg = config::Config::from_env();
    init_tracing(&cfg);

    if let Err(msg) = run(&cfg).await {
        eprintln!("error: {}", msg);
        process::exit(1);
    }
}

// Logs go to stderr; stdout carries the JSON result.
fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}
