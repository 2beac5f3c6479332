//! Plan creation: range resolution, validation, quota scheduling and storage.

pub mod scheduler;
pub mod validator;

pub use scheduler::{day_count, quotas, schedule};
pub use validator::{validate_passages, validate_plan, PlanVerdict};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::{self, PassageRepository};
use crate::domain::{Passage, PassageKey, PassageRange, PlanDetail, RecitationPlan, TestType};
use crate::error::{RecitalError, Result};

/// Look up one passage by its structured key
pub fn resolve_passage(repo: &dyn PassageRepository, key: &PassageKey) -> Result<Passage> {
  repo
    .lookup_passage(&key.container_code, key.sub_unit, key.unit, &key.version_code)?
    .ok_or_else(|| RecitalError::PassageNotFound(key.id()))
}

pub fn resolve_range(
  repo: &dyn PassageRepository,
  start: &PassageKey,
  end: &PassageKey,
) -> Result<PassageRange> {
  Ok(PassageRange::new(
    resolve_passage(repo, start)?,
    resolve_passage(repo, end)?,
  ))
}

/// Rebuild a stored plan's range from its start and end keys
pub fn plan_range(repo: &dyn PassageRepository, plan: &RecitationPlan) -> Result<PassageRange> {
  resolve_range(repo, &plan.start, &plan.end)
}

/// Validate, schedule and persist a new plan starting `today`.
pub fn create_plan(
  repo: &dyn PassageRepository,
  conn: &Connection,
  title: &str,
  range: &PassageRange,
  today: NaiveDate,
  target: NaiveDate,
) -> Result<PlanDetail> {
  let passages = if range.is_well_formed() {
    repo.expand_range(range)?
  } else {
    Vec::new()
  };

  let verdict = validate_passages(&passages, today, target);
  if let Some(message) = verdict.error_message() {
    tracing::warn!("Rejected plan '{}' ({}): {}", title, range.display_name(), message);
  }
  verdict.into_result()?;

  let allocations = schedule(&passages, today, target)?;
  let title = if title.trim().is_empty() {
    range.display_name()
  } else {
    title.trim().to_string()
  };
  let mut plan = RecitationPlan::new(title, range.start.key(), range.end.key(), today, target);
  plan.id = db::insert_plan(conn, &plan, &allocations)?;

  tracing::info!(
    plan_id = plan.id,
    passages = passages.len(),
    days = allocations.len(),
    "Created plan '{}'",
    plan.title
  );

  let allocations = db::get_allocations(conn, plan.id)?;
  Ok(PlanDetail::new(plan, allocations, today))
}

pub fn plan_detail(conn: &Connection, plan_id: i64, today: NaiveDate) -> Result<PlanDetail> {
  let plan = db::require_plan(conn, plan_id)?;
  let allocations = db::get_allocations(conn, plan_id)?;
  Ok(PlanDetail::new(plan, allocations, today))
}

/// Passages a test of `test_type` covers on `today`, in plan order.
///
/// Daily: today's allocation. Cumulative: every allocation dated on or before today.
pub fn test_passages(
  repo: &dyn PassageRepository,
  conn: &Connection,
  plan_id: i64,
  test_type: TestType,
  today: NaiveDate,
) -> Result<Vec<Passage>> {
  db::require_plan(conn, plan_id)?;
  let allocations = db::get_allocations(conn, plan_id)?;

  let ids: Vec<String> = match test_type {
    TestType::Daily => allocations
      .into_iter()
      .find(|a| a.date == today)
      .map(|a| a.passage_ids)
      .unwrap_or_default(),
    TestType::Cumulative => allocations
      .into_iter()
      .filter(|a| a.date <= today)
      .flat_map(|a| a.passage_ids)
      .collect(),
  };
  repo.passages_by_ids(&ids)
}
