//! Backends that live inside the domain crate.
//!
//! The in-memory engine answers the query protocol without any external
//! storage. It backs local development and tests; nothing it holds survives
//! the process. The Postgres backend lives in its own crate.

pub mod static_db;
