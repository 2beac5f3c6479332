use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  conn.execute_batch(
    r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS versions (
      version_code TEXT PRIMARY KEY,
      name TEXT NOT NULL,
      language TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS passages (
      passage_id TEXT PRIMARY KEY,
      container_code TEXT NOT NULL,
      container_name TEXT NOT NULL,
      container_order INTEGER NOT NULL,
      sub_unit INTEGER NOT NULL,
      unit INTEGER NOT NULL,
      text TEXT NOT NULL,
      version_code TEXT NOT NULL,
      UNIQUE (container_code, sub_unit, unit, version_code)
    );

    CREATE TABLE IF NOT EXISTS plans (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      title TEXT NOT NULL,
      start_container TEXT NOT NULL,
      start_sub_unit INTEGER NOT NULL,
      start_unit INTEGER NOT NULL,
      end_container TEXT NOT NULL,
      end_sub_unit INTEGER NOT NULL,
      end_unit INTEGER NOT NULL,
      version_code TEXT NOT NULL,
      start_date TEXT NOT NULL,
      target_date TEXT NOT NULL,
      is_completed INTEGER NOT NULL DEFAULT 0,
      created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS daily_allocations (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      plan_id INTEGER NOT NULL,
      day_index INTEGER NOT NULL,
      date TEXT NOT NULL,
      passage_ids TEXT NOT NULL,
      is_completed INTEGER NOT NULL DEFAULT 0,
      completed_at TEXT,
      FOREIGN KEY (plan_id) REFERENCES plans(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS test_results (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      plan_id INTEGER NOT NULL,
      test_date TEXT NOT NULL,
      test_type TEXT NOT NULL,
      accuracy REAL NOT NULL,
      total_units INTEGER NOT NULL,
      correct_units INTEGER NOT NULL,
      total_passages INTEGER NOT NULL,
      correct_passages INTEGER NOT NULL,
      incorrect_passage_ids TEXT NOT NULL,
      user_input TEXT NOT NULL,
      expected_text TEXT NOT NULL,
      mistakes TEXT NOT NULL DEFAULT '{}',
      FOREIGN KEY (plan_id) REFERENCES plans(id) ON DELETE CASCADE
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_passages_position
      ON passages(version_code, container_order, sub_unit, unit);
    CREATE INDEX IF NOT EXISTS idx_allocations_plan_id ON daily_allocations(plan_id);
    CREATE INDEX IF NOT EXISTS idx_allocations_date ON daily_allocations(date);
    CREATE INDEX IF NOT EXISTS idx_test_results_plan_id ON test_results(plan_id);
    "#,
  )?;

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_migrations_are_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    run_migrations(&conn).unwrap();

    let tables: i64 = conn
      .query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name != 'sqlite_sequence'",
        [],
        |row| row.get(0),
      )
      .unwrap();
    assert_eq!(tables, 5);
    assert!(conn.prepare("SELECT mistakes FROM test_results LIMIT 1").is_ok());
  }
}
