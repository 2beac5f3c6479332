use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::DiffUnit;

/// Which passages a recitation test covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
  /// Today's allocation only
  #[default]
  Daily,
  /// Every allocation dated on or before today
  Cumulative,
}

impl TestType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Daily => "daily",
      Self::Cumulative => "cumulative",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "daily" => Some(Self::Daily),
      "cumulative" => Some(Self::Cumulative),
      _ => None,
    }
  }
}

/// Persisted record of one scored submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
  pub id: i64,
  pub plan_id: i64,
  pub test_date: DateTime<Utc>,
  pub test_type: TestType,
  pub accuracy: f64,
  pub total_units: usize,
  pub correct_units: usize,
  pub total_passages: usize,
  pub correct_passages: usize,
  pub incorrect_passage_ids: Vec<String>,
  pub user_input: String,
  pub expected_text: String,
  /// Passage id -> diff, kept for re-display
  pub mistakes: HashMap<String, Vec<DiffUnit>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStatistics {
  pub total_tests: usize,
  pub average_accuracy: f64,
  pub best_accuracy: f64,
  pub worst_accuracy: f64,
  pub daily_tests: usize,
  pub cumulative_tests: usize,
}

impl TestStatistics {
  pub fn from_results(results: &[TestResult]) -> Self {
    let total_tests = results.len();
    let average_accuracy = if results.is_empty() {
      0.0
    } else {
      results.iter().map(|r| r.accuracy).sum::<f64>() / total_tests as f64
    };
    let best_accuracy = results
      .iter()
      .map(|r| r.accuracy)
      .fold(None, |acc: Option<f64>, a| Some(acc.map_or(a, |b| b.max(a))))
      .unwrap_or(0.0);
    let worst_accuracy = results
      .iter()
      .map(|r| r.accuracy)
      .fold(None, |acc: Option<f64>, a| Some(acc.map_or(a, |b| b.min(a))))
      .unwrap_or(0.0);

    Self {
      total_tests,
      average_accuracy,
      best_accuracy,
      worst_accuracy,
      daily_tests: results.iter().filter(|r| r.test_type == TestType::Daily).count(),
      cumulative_tests: results
        .iter()
        .filter(|r| r.test_type == TestType::Cumulative)
        .count(),
    }
  }

  pub fn accuracy_percentage(&self) -> String {
    format_percentage(self.average_accuracy)
  }

  pub fn best_accuracy_percentage(&self) -> String {
    format_percentage(self.best_accuracy)
  }

  pub fn worst_accuracy_percentage(&self) -> String {
    format_percentage(self.worst_accuracy)
  }
}

fn format_percentage(ratio: f64) -> String {
  format!("{:.1}%", ratio * 100.0)
}
