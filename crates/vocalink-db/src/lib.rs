//! Database layer for the Vocalink platform.
//!
//! Provides SQLite connection pooling (via `r2d2`), WAL-mode initialization,
//! and embedded SQL migrations. Every table in Vocalink is created through
//! versioned migrations managed by this crate.
//!
//! # Design decisions
//!
//! - **SQLite with WAL mode**: a single-process call service needs no
//!   external database; WAL allows concurrent readers with a single writer,
//!   which matches the access pattern of session and profile lookups.
//! - **`r2d2` connection pool**: bounded connection reuse without manual
//!   lifetime management.
//! - **Embedded migrations**: SQL files are compiled into the binary via
//!   `include_str!`, so the schema ships with the server and cannot drift
//!   from the code that depends on it.
//! - **External ids as canonical keys**: every entity row is keyed by a
//!   caller-visible UUID, never a storage-internal rowid, so the store can
//!   be swapped without changing any API contract.

mod migrations;
mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
