//! Test utilities for database setup.
//!
//! Provides helpers that reuse the authoritative schema initialization and
//! seed data, so test code never duplicates the schema.

use rusqlite::Connection;
use tempfile::TempDir;

use crate::db;
use crate::error::Result;

/// Test environment with an on-disk database using the authoritative schema.
///
/// The database lives in a temporary directory that is removed on drop.
pub struct TestEnv {
  /// Temporary directory (kept alive for database file persistence)
  pub temp: TempDir,
  /// Migrated and seeded connection
  pub conn: Connection,
}

impl TestEnv {
  pub fn new() -> Result<Self> {
    let temp = TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let conn = Connection::open(temp.path().join("recital.db"))?;
    db::run_migrations(&conn)?;
    db::seed_database(&conn)?;

    Ok(Self { temp, conn })
  }
}

/// In-memory connection with schema and seed passages
pub fn seeded_connection() -> Connection {
  let conn = Connection::open_in_memory().expect("in-memory database");
  db::run_migrations(&conn).expect("migrations");
  db::seed_database(&conn).expect("seed data");
  conn
}
