//! Plan and daily allocation storage

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{parse_date, parse_json, parse_timestamp};
use crate::domain::{DailyAllocation, PassageKey, RecitationPlan};
use crate::error::{RecitalError, Result};

const PLAN_COLUMNS: &str = "id, title, start_container, start_sub_unit, start_unit, end_container, \
   end_sub_unit, end_unit, version_code, start_date, target_date, is_completed, created_at";

fn row_to_plan(row: &Row) -> rusqlite::Result<RecitationPlan> {
  let version_code: String = row.get(8)?;
  Ok(RecitationPlan {
    id: row.get(0)?,
    title: row.get(1)?,
    start: PassageKey {
      container_code: row.get(2)?,
      sub_unit: row.get(3)?,
      unit: row.get(4)?,
      version_code: version_code.clone(),
    },
    end: PassageKey {
      container_code: row.get(5)?,
      sub_unit: row.get(6)?,
      unit: row.get(7)?,
      version_code: version_code.clone(),
    },
    version_code,
    start_date: parse_date(9, row.get(9)?)?,
    target_date: parse_date(10, row.get(10)?)?,
    is_completed: row.get::<_, i64>(11)? != 0,
    created_at: parse_timestamp(12, row.get(12)?)?,
  })
}

fn row_to_allocation(row: &Row) -> rusqlite::Result<DailyAllocation> {
  let completed_at: Option<String> = row.get(6)?;
  Ok(DailyAllocation {
    id: row.get(0)?,
    plan_id: row.get(1)?,
    day_index: row.get(2)?,
    date: parse_date(3, row.get(3)?)?,
    passage_ids: parse_json(4, row.get(4)?)?,
    is_completed: row.get::<_, i64>(5)? != 0,
    completed_at: completed_at.map(|s| parse_timestamp(6, s)).transpose()?,
  })
}

/// Insert a plan and its allocations atomically. Returns the new plan id.
pub fn insert_plan(
  conn: &Connection,
  plan: &RecitationPlan,
  allocations: &[DailyAllocation],
) -> Result<i64> {
  let tx = conn.unchecked_transaction()?;
  tx.execute(
    r#"
    INSERT INTO plans (title, start_container, start_sub_unit, start_unit, end_container,
                       end_sub_unit, end_unit, version_code, start_date, target_date,
                       is_completed, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    "#,
    params![
      plan.title,
      plan.start.container_code,
      plan.start.sub_unit,
      plan.start.unit,
      plan.end.container_code,
      plan.end.sub_unit,
      plan.end.unit,
      plan.version_code,
      plan.start_date.to_string(),
      plan.target_date.to_string(),
      plan.is_completed as i64,
      plan.created_at.to_rfc3339(),
    ],
  )?;
  let plan_id = tx.last_insert_rowid();

  for allocation in allocations {
    tx.execute(
      r#"
      INSERT INTO daily_allocations (plan_id, day_index, date, passage_ids, is_completed, completed_at)
      VALUES (?1, ?2, ?3, ?4, ?5, ?6)
      "#,
      params![
        plan_id,
        allocation.day_index,
        allocation.date.to_string(),
        serde_json::to_string(&allocation.passage_ids)?,
        allocation.is_completed as i64,
        allocation.completed_at.map(|dt| dt.to_rfc3339()),
      ],
    )?;
  }

  tx.commit()?;
  Ok(plan_id)
}

pub fn get_plan(conn: &Connection, plan_id: i64) -> Result<Option<RecitationPlan>> {
  let plan = conn
    .query_row(
      &format!("SELECT {} FROM plans WHERE id = ?1", PLAN_COLUMNS),
      params![plan_id],
      row_to_plan,
    )
    .optional()?;
  Ok(plan)
}

/// Like [`get_plan`] but a missing plan is an error
pub fn require_plan(conn: &Connection, plan_id: i64) -> Result<RecitationPlan> {
  get_plan(conn, plan_id)?.ok_or(RecitalError::PlanNotFound(plan_id))
}

/// All plans, newest first
pub fn list_plans(conn: &Connection) -> Result<Vec<RecitationPlan>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {} FROM plans ORDER BY created_at DESC, id DESC",
    PLAN_COLUMNS
  ))?;
  let plans = stmt
    .query_map([], row_to_plan)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(plans)
}

/// Delete a plan; allocations and results cascade. Returns whether a row was removed.
pub fn delete_plan(conn: &Connection, plan_id: i64) -> Result<bool> {
  let removed = conn.execute("DELETE FROM plans WHERE id = ?1", params![plan_id])?;
  Ok(removed > 0)
}

pub fn get_allocations(conn: &Connection, plan_id: i64) -> Result<Vec<DailyAllocation>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, plan_id, day_index, date, passage_ids, is_completed, completed_at
    FROM daily_allocations
    WHERE plan_id = ?1
    ORDER BY day_index
    "#,
  )?;
  let allocations = stmt
    .query_map(params![plan_id], row_to_allocation)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(allocations)
}

/// Allocations dated `date`, across all plans
pub fn allocations_on(conn: &Connection, date: NaiveDate) -> Result<Vec<DailyAllocation>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT a.id, a.plan_id, a.day_index, a.date, a.passage_ids, a.is_completed, a.completed_at
    FROM daily_allocations a
    JOIN plans p ON p.id = a.plan_id
    WHERE a.date = ?1
    ORDER BY p.created_at DESC, a.plan_id DESC
    "#,
  )?;
  let allocations = stmt
    .query_map(params![date.to_string()], row_to_allocation)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(allocations)
}

/// Mark one day of a plan completed or incomplete.
///
/// The plan itself is flagged completed once every day is.
pub fn set_allocation_completed(
  conn: &Connection,
  plan_id: i64,
  day_index: u32,
  completed: bool,
) -> Result<DailyAllocation> {
  let completed_at = completed.then(|| Utc::now().to_rfc3339());
  let tx = conn.unchecked_transaction()?;
  let updated = tx.execute(
    r#"
    UPDATE daily_allocations SET is_completed = ?1, completed_at = ?2
    WHERE plan_id = ?3 AND day_index = ?4
    "#,
    params![completed as i64, completed_at, plan_id, day_index],
  )?;
  if updated == 0 {
    return Err(RecitalError::PlanNotFound(plan_id));
  }

  tx.execute(
    r#"
    UPDATE plans SET is_completed = (
      SELECT COUNT(*) = SUM(is_completed) FROM daily_allocations WHERE plan_id = ?1
    )
    WHERE id = ?1
    "#,
    params![plan_id],
  )?;
  tx.commit()?;

  let allocation = get_allocations(conn, plan_id)?
    .into_iter()
    .find(|a| a.day_index == day_index)
    .ok_or(RecitalError::PlanNotFound(plan_id))?;
  Ok(allocation)
}
