//! Business rules checked before a plan is scheduled.

use chrono::NaiveDate;
use serde::Serialize;

use super::scheduler::day_count;
use crate::config;
use crate::db::PassageRepository;
use crate::domain::{Passage, PassageRange};
use crate::error::{RecitalError, Result};

/// Outcome of plan validation. Rejections carry a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", content = "message", rename_all = "snake_case")]
pub enum PlanVerdict {
  Valid,
  InvalidDate(String),
  InvalidRange(String),
  ExcessiveLoad(String),
}

impl PlanVerdict {
  pub fn is_valid(&self) -> bool {
    matches!(self, Self::Valid)
  }

  pub fn error_message(&self) -> Option<&str> {
    match self {
      Self::Valid => None,
      Self::InvalidDate(message) | Self::InvalidRange(message) | Self::ExcessiveLoad(message) => {
        Some(message.as_str())
      }
    }
  }

  /// Convert a rejection into the matching error
  pub fn into_result(self) -> Result<()> {
    match self {
      Self::Valid => Ok(()),
      Self::InvalidDate(message) => Err(RecitalError::InvalidDate(message)),
      Self::InvalidRange(message) => Err(RecitalError::EmptyRange(message)),
      Self::ExcessiveLoad(message) => Err(RecitalError::ExcessiveLoad(message)),
    }
  }
}

/// Validate an already-expanded passage list against the date span.
///
/// Checks run in order: date, range, daily load.
pub fn validate_passages(passages: &[Passage], start: NaiveDate, target: NaiveDate) -> PlanVerdict {
  let days = day_count(start, target);
  if days < 1 {
    return PlanVerdict::InvalidDate("Target date must be today or later.".to_string());
  }

  if passages.is_empty() {
    return PlanVerdict::InvalidRange("The selected range contains no passages.".to_string());
  }

  let per_day = passages.len() as f64 / days as f64;
  if per_day > config::MAX_DAILY_LOAD {
    return PlanVerdict::ExcessiveLoad(format!(
      "Daily load of {:.1} passages exceeds the limit of {}. Extend the period or shorten the range.",
      per_day,
      config::MAX_DAILY_LOAD
    ));
  }

  PlanVerdict::Valid
}

/// Expand `range` through the repository and validate it.
///
/// A `Valid` verdict guarantees [`super::schedule`] succeeds for the same inputs.
pub fn validate_plan(
  repo: &dyn PassageRepository,
  range: &PassageRange,
  start: NaiveDate,
  target: NaiveDate,
) -> Result<PlanVerdict> {
  let passages = if range.is_well_formed() {
    repo.expand_range(range)?
  } else {
    Vec::new()
  };
  Ok(validate_passages(&passages, start, target))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{seed_passages, MemoryRepository};

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn passages(n: u32) -> Vec<Passage> {
    (1..=n)
      .map(|v| Passage::new("PSA", "Psalms", 19, 119, v, "text", "WEB"))
      .collect()
  }

  fn repo() -> MemoryRepository {
    let (passages, versions) = seed_passages();
    MemoryRepository::new(passages, versions)
  }

  #[test]
  fn test_valid_plan() {
    let verdict = validate_passages(&passages(6), date(2025, 1, 1), date(2025, 1, 3));
    assert_eq!(verdict, PlanVerdict::Valid);
    assert!(verdict.is_valid());
    assert!(verdict.error_message().is_none());
  }

  #[test]
  fn test_target_before_today() {
    let verdict = validate_passages(&passages(6), date(2025, 1, 3), date(2025, 1, 2));
    assert!(matches!(verdict, PlanVerdict::InvalidDate(_)));
    assert!(matches!(verdict.into_result(), Err(RecitalError::InvalidDate(_))));
  }

  #[test]
  fn test_same_day_is_one_day() {
    let today = date(2025, 1, 3);
    assert!(validate_passages(&passages(10), today, today).is_valid());
    assert!(matches!(
      validate_passages(&passages(11), today, today),
      PlanVerdict::ExcessiveLoad(_)
    ));
  }

  #[test]
  fn test_date_checked_before_range() {
    let verdict = validate_passages(&[], date(2025, 1, 3), date(2025, 1, 1));
    assert!(matches!(verdict, PlanVerdict::InvalidDate(_)));
  }

  #[test]
  fn test_empty_range() {
    let verdict = validate_passages(&[], date(2025, 1, 1), date(2025, 1, 10));
    assert!(matches!(verdict, PlanVerdict::InvalidRange(_)));
    assert!(matches!(verdict.into_result(), Err(RecitalError::EmptyRange(_))));
  }

  #[test]
  fn test_excessive_load() {
    // 50 passages over 2 days = 25 per day
    let verdict = validate_passages(&passages(50), date(2025, 1, 1), date(2025, 1, 2));
    assert!(matches!(verdict, PlanVerdict::ExcessiveLoad(_)));
    assert!(verdict.error_message().unwrap().contains("25.0"));

    // Exactly 10 per day is allowed
    assert!(validate_passages(&passages(20), date(2025, 1, 1), date(2025, 1, 2)).is_valid());
  }

  #[test]
  fn test_validate_plan_through_repository() {
    let repo = repo();
    let start = repo.lookup_passage("PSA", 23, 1, "WEB").unwrap().unwrap();
    let end = repo.lookup_passage("PSA", 23, 6, "WEB").unwrap().unwrap();
    let range = PassageRange::new(start.clone(), end.clone());

    let verdict = validate_plan(&repo, &range, date(2025, 1, 1), date(2025, 1, 3)).unwrap();
    assert!(verdict.is_valid());

    let reversed = PassageRange::new(end, start);
    let verdict = validate_plan(&repo, &reversed, date(2025, 1, 1), date(2025, 1, 3)).unwrap();
    assert!(matches!(verdict, PlanVerdict::InvalidRange(_)));
  }

  #[test]
  fn test_verdict_serialization() {
    let json = serde_json::to_value(PlanVerdict::InvalidRange("empty".into())).unwrap();
    assert_eq!(json, serde_json::json!({"verdict": "invalid_range", "message": "empty"}));
    let json = serde_json::to_value(PlanVerdict::Valid).unwrap();
    assert_eq!(json, serde_json::json!({"verdict": "valid"}));
  }
}
