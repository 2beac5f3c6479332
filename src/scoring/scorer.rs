//! Aggregate scoring of a recitation attempt across passages.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::alignment::diff;
use super::tokenizer::{tokenize, TokenMode};
use crate::domain::{DiffUnit, Passage};

/// Canonical text of one passage to score against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringInput {
  pub passage_id: String,
  pub text: String,
}

impl From<&Passage> for ScoringInput {
  fn from(passage: &Passage) -> Self {
    Self {
      passage_id: passage.id.clone(),
      text: passage.text.clone(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageVerdict {
  pub passage_id: String,
  pub correct: bool,
  pub diff: Vec<DiffUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
  pub total_units: usize,
  pub correct_units: usize,
  pub accuracy: f64,
  pub passages: Vec<PassageVerdict>,
}

impl ScoreResult {
  pub fn diff_by_passage(&self) -> HashMap<String, Vec<DiffUnit>> {
    self
      .passages
      .iter()
      .map(|p| (p.passage_id.clone(), p.diff.clone()))
      .collect()
  }

  pub fn incorrect_passage_ids(&self) -> Vec<String> {
    self
      .passages
      .iter()
      .filter(|p| !p.correct)
      .map(|p| p.passage_id.clone())
      .collect()
  }

  pub fn correct_passages(&self) -> usize {
    self.passages.iter().filter(|p| p.correct).count()
  }
}

fn trim_line(line: &str) -> &str {
  line.trim_matches(|c: char| c.is_whitespace() && c != '\n' && c != '\r')
}

/// Split a raw attempt into one line per passage, trimmed of surrounding
/// horizontal whitespace. `\r\n`, `\n` and a lone `\r` all end a line.
/// Missing lines become empty strings.
pub fn split_attempt(raw_attempt: &str, passage_count: usize) -> Vec<String> {
  let normalized = raw_attempt.replace("\r\n", "\n");
  let mut lines: Vec<String> = normalized
    .split(['\n', '\r'])
    .map(|line| trim_line(line).to_string())
    .take(passage_count)
    .collect();
  lines.resize(passage_count, String::new());
  lines
}

/// Score `raw_attempt` (one line per passage) against the canonical texts.
pub fn score(passages: &[ScoringInput], raw_attempt: &str) -> ScoreResult {
  let attempts = split_attempt(raw_attempt, passages.len());
  score_lines(passages, &attempts, raw_attempt.trim().is_empty())
}

/// Score attempts already paired with their passages by index.
///
/// An attempt may span several lines; it is never re-split. Surrounding
/// whitespace, newlines included, is trimmed. Missing attempts count as empty.
pub fn score_attempts(passages: &[ScoringInput], attempts: &[String]) -> ScoreResult {
  let attempts: Vec<String> = (0..passages.len())
    .map(|k| attempts.get(k).map(|a| a.trim().to_string()).unwrap_or_default())
    .collect();
  let attempt_is_empty = attempts.iter().all(String::is_empty);
  score_lines(passages, &attempts, attempt_is_empty)
}

fn score_lines(passages: &[ScoringInput], attempts: &[String], attempt_is_empty: bool) -> ScoreResult {
  let mut total_units = 0;
  let mut correct_units = 0;
  let mut verdicts = Vec::with_capacity(passages.len());

  for (passage, attempt) in passages.iter().zip(attempts.iter()) {
    let reference = tokenize(&passage.text, TokenMode::Char);
    let attempt = tokenize(attempt, TokenMode::Char);
    let units = diff(&reference, &attempt);

    total_units += reference.len();
    correct_units += units.iter().filter(|u| u.is_correct()).count();
    verdicts.push(PassageVerdict {
      passage_id: passage.passage_id.clone(),
      correct: units.iter().all(DiffUnit::is_correct),
      diff: units,
    });
  }

  let accuracy = if total_units == 0 {
    if attempt_is_empty { 1.0 } else { 0.0 }
  } else {
    correct_units as f64 / total_units as f64
  };

  tracing::debug!(
    passages = passages.len(),
    total_units,
    correct_units,
    accuracy,
    "scored recitation attempt"
  );

  ScoreResult {
    total_units,
    correct_units,
    accuracy,
    passages: verdicts,
  }
}
