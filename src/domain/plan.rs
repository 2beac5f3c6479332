use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::PassageKey;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecitationPlan {
  pub id: i64,
  pub title: String,
  pub start: PassageKey,
  pub end: PassageKey,
  pub version_code: String,
  pub start_date: NaiveDate,
  pub target_date: NaiveDate,
  pub is_completed: bool,
  pub created_at: DateTime<Utc>,
}

impl RecitationPlan {
  pub fn new(
    title: String,
    start: PassageKey,
    end: PassageKey,
    start_date: NaiveDate,
    target_date: NaiveDate,
  ) -> Self {
    let version_code = start.version_code.clone();
    Self {
      id: 0,
      title,
      start,
      end,
      version_code,
      start_date,
      target_date,
      is_completed: false,
      created_at: Utc::now(),
    }
  }

  /// Calendar days left until the target date, never negative
  pub fn days_remaining(&self, today: NaiveDate) -> i64 {
    (self.target_date - today).num_days().max(0)
  }
}

/// Passages assigned to one day of a plan.
///
/// Holds the owning plan's id rather than a reference to the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAllocation {
  pub id: i64,
  pub plan_id: i64,
  pub day_index: u32,
  pub date: NaiveDate,
  pub passage_ids: Vec<String>,
  pub is_completed: bool,
  pub completed_at: Option<DateTime<Utc>>,
}

impl DailyAllocation {
  pub fn new(day_index: u32, date: NaiveDate, passage_ids: Vec<String>) -> Self {
    Self {
      id: 0,
      plan_id: 0,
      day_index,
      date,
      passage_ids,
      is_completed: false,
      completed_at: None,
    }
  }
}

/// Fraction of allocations marked completed (0.0 for an empty plan)
pub fn plan_progress(allocations: &[DailyAllocation]) -> f64 {
  if allocations.is_empty() {
    return 0.0;
  }
  let completed = allocations.iter().filter(|a| a.is_completed).count();
  completed as f64 / allocations.len() as f64
}

/// A plan together with its allocations, as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct PlanDetail {
  #[serde(flatten)]
  pub plan: RecitationPlan,
  pub allocations: Vec<DailyAllocation>,
  pub progress: f64,
  pub days_remaining: i64,
}

impl PlanDetail {
  pub fn new(plan: RecitationPlan, allocations: Vec<DailyAllocation>, today: NaiveDate) -> Self {
    let progress = plan_progress(&allocations);
    let days_remaining = plan.days_remaining(today);
    Self {
      plan,
      allocations,
      progress,
      days_remaining,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn allocation(completed: bool) -> DailyAllocation {
    let mut a = DailyAllocation::new(0, date(2025, 1, 1), vec!["PSA_23_1_WEB".into()]);
    a.is_completed = completed;
    a
  }

  #[test]
  fn test_progress_empty() {
    assert_eq!(plan_progress(&[]), 0.0);
  }

  #[test]
  fn test_progress_partial() {
    let allocations = vec![allocation(true), allocation(false), allocation(true), allocation(false)];
    assert!((plan_progress(&allocations) - 0.5).abs() < f64::EPSILON);
  }

  #[test]
  fn test_days_remaining_clamps_at_zero() {
    let plan = RecitationPlan::new(
      "Psalm 23".into(),
      PassageKey::new("PSA", 23, 1, "WEB"),
      PassageKey::new("PSA", 23, 6, "WEB"),
      date(2025, 1, 1),
      date(2025, 1, 10),
    );
    assert_eq!(plan.days_remaining(date(2025, 1, 1)), 9);
    assert_eq!(plan.days_remaining(date(2025, 1, 10)), 0);
    assert_eq!(plan.days_remaining(date(2025, 2, 1)), 0);
    assert_eq!(plan.version_code, "WEB");
  }
}
