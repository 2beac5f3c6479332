//! Passage repository: the read-side interface to passage storage, and its
//! SQLite implementation.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Container, Passage, PassageRange, Version};
use crate::error::Result;

/// Lookup and range expansion over stored passages.
///
/// Passed explicitly to the planner and handlers; there is no global instance.
pub trait PassageRepository {
  fn lookup_passage(
    &self,
    container_code: &str,
    sub_unit: u32,
    unit: u32,
    version_code: &str,
  ) -> Result<Option<Passage>>;

  fn passage_by_id(&self, passage_id: &str) -> Result<Option<Passage>>;

  /// Every passage of the range's version between start and end inclusive,
  /// walking across containers and sub-units. Empty when start is after end.
  fn expand_range(&self, range: &PassageRange) -> Result<Vec<Passage>>;

  fn list_containers(&self, version_code: &str) -> Result<Vec<Container>>;

  fn list_versions(&self) -> Result<Vec<Version>>;

  /// Highest unit number within a sub-unit (0 when unknown)
  fn unit_count(&self, container_code: &str, sub_unit: u32, version_code: &str) -> Result<u32>;

  fn search(&self, keyword: &str, version_code: &str, limit: usize) -> Result<Vec<Passage>>;

  /// Resolve passage ids in order, skipping ids that no longer exist
  fn passages_by_ids(&self, passage_ids: &[String]) -> Result<Vec<Passage>> {
    let mut passages = Vec::with_capacity(passage_ids.len());
    for id in passage_ids {
      if let Some(passage) = self.passage_by_id(id)? {
        passages.push(passage);
      }
    }
    Ok(passages)
  }
}

const PASSAGE_COLUMNS: &str =
  "passage_id, container_code, container_name, container_order, sub_unit, unit, text, version_code";

fn row_to_passage(row: &Row) -> rusqlite::Result<Passage> {
  Ok(Passage {
    id: row.get(0)?,
    container_code: row.get(1)?,
    container_name: row.get(2)?,
    container_order: row.get(3)?,
    sub_unit: row.get(4)?,
    unit: row.get(5)?,
    text: row.get(6)?,
    version_code: row.get(7)?,
  })
}

impl PassageRepository for Connection {
  fn lookup_passage(
    &self,
    container_code: &str,
    sub_unit: u32,
    unit: u32,
    version_code: &str,
  ) -> Result<Option<Passage>> {
    let passage = self
      .query_row(
        &format!(
          "SELECT {} FROM passages
           WHERE container_code = ?1 AND sub_unit = ?2 AND unit = ?3 AND version_code = ?4",
          PASSAGE_COLUMNS
        ),
        params![container_code, sub_unit, unit, version_code],
        row_to_passage,
      )
      .optional()?;
    Ok(passage)
  }

  fn passage_by_id(&self, passage_id: &str) -> Result<Option<Passage>> {
    let passage = self
      .query_row(
        &format!("SELECT {} FROM passages WHERE passage_id = ?1", PASSAGE_COLUMNS),
        params![passage_id],
        row_to_passage,
      )
      .optional()?;
    Ok(passage)
  }

  fn expand_range(&self, range: &PassageRange) -> Result<Vec<Passage>> {
    let (start, end) = (&range.start, &range.end);
    let mut stmt = self.prepare(&format!(
      r#"
      SELECT {} FROM passages
      WHERE version_code = ?1
        AND (container_order, sub_unit, unit) >= (?2, ?3, ?4)
        AND (container_order, sub_unit, unit) <= (?5, ?6, ?7)
      ORDER BY container_order, sub_unit, unit
      "#,
      PASSAGE_COLUMNS
    ))?;

    let passages = stmt
      .query_map(
        params![
          range.version_code,
          start.container_order,
          start.sub_unit,
          start.unit,
          end.container_order,
          end.sub_unit,
          end.unit,
        ],
        row_to_passage,
      )?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(passages)
  }

  fn list_containers(&self, version_code: &str) -> Result<Vec<Container>> {
    let mut stmt = self.prepare(
      r#"
      SELECT container_code, container_name, container_order, MAX(sub_unit)
      FROM passages
      WHERE version_code = ?1
      GROUP BY container_code
      ORDER BY container_order
      "#,
    )?;

    let containers = stmt
      .query_map(params![version_code], |row| {
        Ok(Container {
          code: row.get(0)?,
          name: row.get(1)?,
          order: row.get(2)?,
          sub_units: row.get(3)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(containers)
  }

  fn list_versions(&self) -> Result<Vec<Version>> {
    let mut stmt = self.prepare("SELECT version_code, name, language FROM versions ORDER BY version_code")?;
    let versions = stmt
      .query_map([], |row| {
        Ok(Version {
          code: row.get(0)?,
          name: row.get(1)?,
          language: row.get(2)?,
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(versions)
  }

  fn unit_count(&self, container_code: &str, sub_unit: u32, version_code: &str) -> Result<u32> {
    let count: Option<u32> = self.query_row(
      "SELECT MAX(unit) FROM passages WHERE container_code = ?1 AND sub_unit = ?2 AND version_code = ?3",
      params![container_code, sub_unit, version_code],
      |row| row.get(0),
    )?;
    Ok(count.unwrap_or(0))
  }

  fn search(&self, keyword: &str, version_code: &str, limit: usize) -> Result<Vec<Passage>> {
    let mut stmt = self.prepare(&format!(
      r#"
      SELECT {} FROM passages
      WHERE text LIKE '%' || ?1 || '%' ESCAPE '\' AND version_code = ?2
      ORDER BY container_order, sub_unit, unit
      LIMIT ?3
      "#,
      PASSAGE_COLUMNS
    ))?;

    let passages = stmt
      .query_map(params![escape_like(keyword), version_code, limit as i64], row_to_passage)?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(passages)
  }
}

/// Make `%`, `_` and `\` match literally in a LIKE pattern escaped with `\`
fn escape_like(keyword: &str) -> String {
  let mut escaped = String::with_capacity(keyword.len());
  for c in keyword.chars() {
    if matches!(c, '\\' | '%' | '_') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped
}

pub fn insert_version(conn: &Connection, version: &Version) -> Result<()> {
  conn.execute(
    "INSERT OR REPLACE INTO versions (version_code, name, language) VALUES (?1, ?2, ?3)",
    params![version.code, version.name, version.language],
  )?;
  Ok(())
}

pub fn insert_passage(conn: &Connection, passage: &Passage) -> Result<()> {
  conn.execute(
    &format!(
      "INSERT OR REPLACE INTO passages ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      PASSAGE_COLUMNS
    ),
    params![
      passage.id,
      passage.container_code,
      passage.container_name,
      passage.container_order,
      passage.sub_unit,
      passage.unit,
      passage.text,
      passage.version_code,
    ],
  )?;
  Ok(())
}

pub fn passage_count(conn: &Connection) -> Result<i64> {
  Ok(conn.query_row("SELECT COUNT(*) FROM passages", [], |row| row.get(0))?)
}
