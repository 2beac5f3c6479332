//! LCS alignment of a reference against an attempt, plus the substitution
//! merge that folds adjacent Missing+Extra pairs into Wrong units.

use crate::domain::{DiffKind, DiffUnit, Token};

/// Align `reference` against `attempt`.
///
/// Every element of both sequences appears exactly once in the output, which
/// only contains Correct, Missing and Extra units. On ties the backtrack
/// prefers Extra over Missing.
pub fn align(reference: &[Token], attempt: &[Token]) -> Vec<DiffUnit> {
  let n = reference.len();
  let m = attempt.len();

  // dp[i][j] = LCS length of reference[..i] and attempt[..j]
  let mut dp = vec![vec![0usize; m + 1]; n + 1];
  for i in 1..=n {
    for j in 1..=m {
      dp[i][j] = if reference[i - 1] == attempt[j - 1] {
        dp[i - 1][j - 1] + 1
      } else {
        dp[i - 1][j].max(dp[i][j - 1])
      };
    }
  }

  let mut units = Vec::with_capacity(n + m);
  let (mut i, mut j) = (n, m);
  while i > 0 || j > 0 {
    if i > 0 && j > 0 && reference[i - 1] == attempt[j - 1] {
      units.push(DiffUnit::new(DiffKind::Correct, reference[i - 1].surface.clone(), i - 1));
      i -= 1;
      j -= 1;
    } else if j > 0 && (i == 0 || dp[i][j - 1] >= dp[i - 1][j]) {
      units.push(DiffUnit::new(DiffKind::Extra, attempt[j - 1].surface.clone(), j - 1));
      j -= 1;
    } else {
      units.push(DiffUnit::new(DiffKind::Missing, reference[i - 1].surface.clone(), i - 1));
      i -= 1;
    }
  }

  units.reverse();
  units
}

/// Replace each Missing immediately followed by an Extra with one Wrong unit
/// carrying the Extra's text and the Missing's reference index.
pub fn merge_substitutions(units: &[DiffUnit]) -> Vec<DiffUnit> {
  let mut merged = Vec::with_capacity(units.len());
  let mut k = 0;
  while k < units.len() {
    let unit = &units[k];
    match units.get(k + 1) {
      Some(next) if unit.kind == DiffKind::Missing && next.kind == DiffKind::Extra => {
        merged.push(DiffUnit::new(DiffKind::Wrong, next.text.clone(), unit.index));
        k += 2;
      }
      _ => {
        merged.push(unit.clone());
        k += 1;
      }
    }
  }
  merged
}

/// Align and merge in one step
pub fn diff(reference: &[Token], attempt: &[Token]) -> Vec<DiffUnit> {
  merge_substitutions(&align(reference, attempt))
}
