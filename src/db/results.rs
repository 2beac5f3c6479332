//! Test result storage

use rusqlite::{params, Connection, Row};

use super::{parse_json, parse_test_type, parse_timestamp};
use crate::domain::TestResult;
use crate::error::Result;

fn row_to_result(row: &Row) -> rusqlite::Result<TestResult> {
  Ok(TestResult {
    id: row.get(0)?,
    plan_id: row.get(1)?,
    test_date: parse_timestamp(2, row.get(2)?)?,
    test_type: parse_test_type(3, row.get(3)?)?,
    accuracy: row.get(4)?,
    total_units: row.get::<_, i64>(5)? as usize,
    correct_units: row.get::<_, i64>(6)? as usize,
    total_passages: row.get::<_, i64>(7)? as usize,
    correct_passages: row.get::<_, i64>(8)? as usize,
    incorrect_passage_ids: parse_json(9, row.get(9)?)?,
    user_input: row.get(10)?,
    expected_text: row.get(11)?,
    mistakes: parse_json(12, row.get(12)?)?,
  })
}

pub fn insert_test_result(conn: &Connection, result: &TestResult) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO test_results (plan_id, test_date, test_type, accuracy, total_units, correct_units,
                              total_passages, correct_passages, incorrect_passage_ids,
                              user_input, expected_text, mistakes)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    "#,
    params![
      result.plan_id,
      result.test_date.to_rfc3339(),
      result.test_type.as_str(),
      result.accuracy,
      result.total_units as i64,
      result.correct_units as i64,
      result.total_passages as i64,
      result.correct_passages as i64,
      serde_json::to_string(&result.incorrect_passage_ids)?,
      result.user_input,
      result.expected_text,
      serde_json::to_string(&result.mistakes)?,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Results for a plan, oldest first
pub fn get_test_results(conn: &Connection, plan_id: i64) -> Result<Vec<TestResult>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT id, plan_id, test_date, test_type, accuracy, total_units, correct_units,
           total_passages, correct_passages, incorrect_passage_ids, user_input,
           expected_text, mistakes
    FROM test_results
    WHERE plan_id = ?1
    ORDER BY test_date ASC, id ASC
    "#,
  )?;
  let results = stmt
    .query_map(params![plan_id], row_to_result)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(results)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::plans::insert_plan;
  use crate::domain::{DiffKind, DiffUnit, PassageKey, RecitationPlan, TestStatistics, TestType};
  use crate::testing::TestEnv;
  use chrono::{NaiveDate, Utc};
  use std::collections::HashMap;

  fn plan_id(env: &TestEnv) -> i64 {
    let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let plan = RecitationPlan::new(
      "Psalm 23".into(),
      PassageKey::new("PSA", 23, 1, "WEB"),
      PassageKey::new("PSA", 23, 1, "WEB"),
      day,
      day,
    );
    insert_plan(&env.conn, &plan, &[]).unwrap()
  }

  fn result(plan_id: i64, test_type: TestType, accuracy: f64) -> TestResult {
    let mut mistakes = HashMap::new();
    mistakes.insert(
      "PSA_23_1_WEB".to_string(),
      vec![
        DiffUnit::new(DiffKind::Correct, "a", 0),
        DiffUnit::new(DiffKind::Wrong, "x", 1),
      ],
    );
    TestResult {
      id: 0,
      plan_id,
      test_date: Utc::now(),
      test_type,
      accuracy,
      total_units: 2,
      correct_units: 1,
      total_passages: 1,
      correct_passages: 0,
      incorrect_passage_ids: vec!["PSA_23_1_WEB".to_string()],
      user_input: "ax".to_string(),
      expected_text: "ab".to_string(),
      mistakes,
    }
  }

  #[test]
  fn test_insert_and_read_back() {
    let env = TestEnv::new().unwrap();
    let plan_id = plan_id(&env);
    let id = insert_test_result(&env.conn, &result(plan_id, TestType::Daily, 0.5)).unwrap();

    let stored = get_test_results(&env.conn, plan_id).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, id);
    assert_eq!(stored[0].test_type, TestType::Daily);
    assert_eq!(stored[0].incorrect_passage_ids, vec!["PSA_23_1_WEB".to_string()]);
    assert_eq!(stored[0].mistakes["PSA_23_1_WEB"][1].kind, DiffKind::Wrong);
  }

  #[test]
  fn test_statistics_for_plan() {
    let env = TestEnv::new().unwrap();
    let plan_id = plan_id(&env);
    insert_test_result(&env.conn, &result(plan_id, TestType::Daily, 0.5)).unwrap();
    insert_test_result(&env.conn, &result(plan_id, TestType::Cumulative, 1.0)).unwrap();

    let stats = TestStatistics::from_results(&get_test_results(&env.conn, plan_id).unwrap());
    assert_eq!(stats.total_tests, 2);
    assert_eq!(stats.daily_tests, 1);
    assert_eq!(stats.cumulative_tests, 1);
    assert!((stats.average_accuracy - 0.75).abs() < 1e-9);

    assert!(get_test_results(&env.conn, plan_id + 1).unwrap().is_empty());
  }

  #[test]
  fn test_unknown_test_type_is_an_error() {
    let env = TestEnv::new().unwrap();
    let plan_id = plan_id(&env);
    insert_test_result(&env.conn, &result(plan_id, TestType::Cumulative, 1.0)).unwrap();
    env
      .conn
      .execute("UPDATE test_results SET test_type = 'weekly' WHERE plan_id = ?1", params![plan_id])
      .unwrap();

    assert!(get_test_results(&env.conn, plan_id).is_err());
  }
}
