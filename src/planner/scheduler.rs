//! Quota scheduler: partitions an ordered passage list across calendar days.

use chrono::{Days, NaiveDate};

use crate::domain::{DailyAllocation, Passage};
use crate::error::{RecitalError, Result};

/// Number of days from `start` to `target`, both endpoints included.
///
/// Zero or negative when the target precedes the start date.
pub fn day_count(start: NaiveDate, target: NaiveDate) -> i64 {
  (target - start).num_days() + 1
}

/// Per-day quotas for `n` passages over `days` days.
///
/// The first `n % days` days receive one extra passage. Days that would
/// receive nothing are dropped, so the result has `min(n, days)` entries.
pub fn quotas(n: usize, days: usize) -> Vec<usize> {
  if days == 0 {
    return Vec::new();
  }
  let base = n / days;
  let remainder = n % days;

  let mut result = Vec::with_capacity(days.min(n));
  let mut assigned = 0;
  for d in 0..days {
    if assigned >= n {
      break;
    }
    let quota = if d < remainder { base + 1 } else { base };
    result.push(quota);
    assigned += quota;
  }
  result
}

/// Split `passages` into contiguous daily allocations from `start` through
/// `target` inclusive.
pub fn schedule(
  passages: &[Passage],
  start: NaiveDate,
  target: NaiveDate,
) -> Result<Vec<DailyAllocation>> {
  let days = day_count(start, target);
  if days < 1 {
    return Err(RecitalError::InvalidDate(
      "Target date must be on or after the start date.".to_string(),
    ));
  }

  let mut allocations = Vec::new();
  let mut cursor = 0;
  for (day_index, quota) in quotas(passages.len(), days as usize).into_iter().enumerate() {
    let date = start
      .checked_add_days(Days::new(day_index as u64))
      .ok_or_else(|| RecitalError::InvalidDate("Plan runs past the supported calendar.".to_string()))?;
    let ids = passages[cursor..cursor + quota]
      .iter()
      .map(|p| p.id.clone())
      .collect();
    allocations.push(DailyAllocation::new(day_index as u32, date, ids));
    cursor += quota;
  }

  tracing::debug!(
    passages = passages.len(),
    days,
    allocations = allocations.len(),
    "scheduled daily quotas"
  );

  Ok(allocations)
}
