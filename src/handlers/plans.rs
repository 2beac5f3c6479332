//! Plan handlers: validation, creation, progress bookkeeping and statistics.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::db::{self, LogOnError, PassageRepository};
use crate::domain::{DailyAllocation, Passage, PassageKey, PlanDetail, TestResult, TestStatistics};
use crate::error::{RecitalError, Result};
use crate::planner::{self, PlanVerdict};
use crate::state::AppState;

use super::local_today;

/// A passage position without its version
#[derive(Debug, Deserialize)]
pub struct PassagePosition {
  pub container_code: String,
  pub sub_unit: u32,
  pub unit: u32,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
  #[serde(default)]
  pub title: String,
  pub version: Option<String>,
  pub start: PassagePosition,
  pub end: PassagePosition,
  pub target_date: NaiveDate,
}

impl PlanRequest {
  fn keys(&self) -> (PassageKey, PassageKey) {
    let version = self.version.as_deref().unwrap_or(config::DEFAULT_VERSION);
    let key = |p: &PassagePosition| PassageKey::new(&p.container_code, p.sub_unit, p.unit, version);
    (key(&self.start), key(&self.end))
  }
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
  pub plan_id: i64,
  #[serde(flatten)]
  pub statistics: TestStatistics,
  pub average_percentage: String,
  pub results: Vec<TestResult>,
}

/// One plan's work for today
#[derive(Debug, Serialize)]
pub struct TodayEntry {
  pub plan_id: i64,
  pub plan_title: String,
  pub allocation: DailyAllocation,
  pub passages: Vec<Passage>,
}

/// POST /api/plans/validate
pub async fn validate_plan(
  State(state): State<AppState>,
  Json(request): Json<PlanRequest>,
) -> Result<Json<PlanVerdict>> {
  let conn = db::try_lock(&state.db)?;
  let (start, end) = request.keys();
  let range = planner::resolve_range(&*conn, &start, &end)?;
  let verdict = planner::validate_plan(&*conn, &range, local_today(), request.target_date)?;
  Ok(Json(verdict))
}

/// POST /api/plans
pub async fn create_plan(
  State(state): State<AppState>,
  Json(request): Json<PlanRequest>,
) -> Result<impl IntoResponse> {
  let conn = db::try_lock(&state.db)?;
  let (start, end) = request.keys();
  let range = planner::resolve_range(&*conn, &start, &end)?;
  let detail = planner::create_plan(
    &*conn,
    &conn,
    &request.title,
    &range,
    local_today(),
    request.target_date,
  )?;
  Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/plans
pub async fn list_plans(State(state): State<AppState>) -> Result<Json<Vec<PlanDetail>>> {
  let conn = db::try_lock(&state.db)?;
  let today = local_today();
  let details = db::list_plans(&conn)?
    .into_iter()
    .map(|plan| {
      let allocations = db::get_allocations(&conn, plan.id)
        .log_warn_default("Failed to load plan allocations");
      PlanDetail::new(plan, allocations, today)
    })
    .collect();
  Ok(Json(details))
}

/// GET /api/plans/{id}
pub async fn get_plan(
  State(state): State<AppState>,
  Path(plan_id): Path<i64>,
) -> Result<Json<PlanDetail>> {
  let conn = db::try_lock(&state.db)?;
  Ok(Json(planner::plan_detail(&conn, plan_id, local_today())?))
}

/// DELETE /api/plans/{id}
pub async fn delete_plan(
  State(state): State<AppState>,
  Path(plan_id): Path<i64>,
) -> Result<StatusCode> {
  let conn = db::try_lock(&state.db)?;
  if !db::delete_plan(&conn, plan_id)? {
    return Err(RecitalError::PlanNotFound(plan_id));
  }
  tracing::info!(plan_id, "Deleted plan");
  Ok(StatusCode::NO_CONTENT)
}

fn mark_day(state: &AppState, plan_id: i64, day: u32, completed: bool) -> Result<Json<DailyAllocation>> {
  let conn = db::try_lock(&state.db)?;
  db::require_plan(&conn, plan_id)?;
  let allocation = db::set_allocation_completed(&conn, plan_id, day, completed)?;
  tracing::debug!(plan_id, day, completed, "Updated day completion");
  Ok(Json(allocation))
}

/// POST /api/plans/{id}/days/{day}/complete
pub async fn complete_day(
  State(state): State<AppState>,
  Path((plan_id, day)): Path<(i64, u32)>,
) -> Result<Json<DailyAllocation>> {
  mark_day(&state, plan_id, day, true)
}

/// POST /api/plans/{id}/days/{day}/incomplete
pub async fn incomplete_day(
  State(state): State<AppState>,
  Path((plan_id, day)): Path<(i64, u32)>,
) -> Result<Json<DailyAllocation>> {
  mark_day(&state, plan_id, day, false)
}

/// GET /api/plans/{id}/statistics
pub async fn plan_statistics(
  State(state): State<AppState>,
  Path(plan_id): Path<i64>,
) -> Result<Json<StatisticsResponse>> {
  let conn = db::try_lock(&state.db)?;
  db::require_plan(&conn, plan_id)?;
  let results = db::get_test_results(&conn, plan_id)?;
  let statistics = TestStatistics::from_results(&results);
  Ok(Json(StatisticsResponse {
    plan_id,
    average_percentage: statistics.accuracy_percentage(),
    statistics,
    results,
  }))
}

/// GET /api/today
pub async fn today(State(state): State<AppState>) -> Result<Json<Vec<TodayEntry>>> {
  let conn = db::try_lock(&state.db)?;
  let mut entries = Vec::new();
  for allocation in db::allocations_on(&conn, local_today())? {
    let Some(plan) = db::get_plan(&conn, allocation.plan_id)? else {
      continue;
    };
    let passages = conn.passages_by_ids(&allocation.passage_ids)?;
    entries.push(TodayEntry {
      plan_id: plan.id,
      plan_title: plan.title,
      allocation,
      passages,
    });
  }
  Ok(Json(entries))
}

#[cfg(test)]
mod tests {
  use super::super::test_support::{days_from_today, psalm_23_plan, server};
  use axum::http::StatusCode;
  use serde_json::{json, Value};

  fn range_body(end_unit: u32, target_days: u64) -> Value {
    json!({
      "start": {"container_code": "PSA", "sub_unit": 23, "unit": 1},
      "end": {"container_code": "PSA", "sub_unit": 23, "unit": end_unit},
      "target_date": days_from_today(target_days),
    })
  }

  #[tokio::test]
  async fn test_validate_plan_verdicts() {
    let server = server();

    let verdict = server.post("/api/plans/validate").json(&range_body(6, 2)).await.json::<Value>();
    assert_eq!(verdict, json!({"verdict": "valid"}));

    let mut late = range_body(6, 0);
    late["target_date"] = json!(chrono::Local::now().date_naive().pred_opt().unwrap());
    let verdict = server.post("/api/plans/validate").json(&late).await.json::<Value>();
    assert_eq!(verdict["verdict"], "invalid_date");

    let reversed = json!({
      "start": {"container_code": "PSA", "sub_unit": 24, "unit": 2},
      "end": {"container_code": "PSA", "sub_unit": 23, "unit": 1},
      "target_date": days_from_today(2),
    });
    let verdict = server.post("/api/plans/validate").json(&reversed).await.json::<Value>();
    assert_eq!(verdict["verdict"], "invalid_range");
  }

  #[tokio::test]
  async fn test_create_plan_with_unknown_passage() {
    let server = server();
    let response = server.post("/api/plans").json(&range_body(42, 2)).await;
    response.assert_status(StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_create_rejects_with_error_body() {
    let server = server();
    let mut body = range_body(6, 0);
    body["target_date"] = json!("2000-01-01");
    let response = server.post("/api/plans").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].as_str().unwrap().contains("Target date"));
  }

  #[tokio::test]
  async fn test_plan_lifecycle() {
    let server = server();
    let plan_id = psalm_23_plan(&server).await;

    let plans = server.get("/api/plans").await.json::<Vec<Value>>();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0]["title"], "Psalm 23");

    let detail = server.get(&format!("/api/plans/{}", plan_id)).await.json::<Value>();
    let allocations = detail["allocations"].as_array().unwrap();
    assert_eq!(allocations.len(), 3);
    assert_eq!(allocations[0]["passage_ids"], json!(["PSA_23_1_WEB", "PSA_23_2_WEB"]));

    let day = server
      .post(&format!("/api/plans/{}/days/0/complete", plan_id))
      .await
      .json::<Value>();
    assert_eq!(day["is_completed"], true);

    let detail = server.get(&format!("/api/plans/{}", plan_id)).await.json::<Value>();
    assert!((detail["progress"].as_f64().unwrap() - 1.0 / 3.0).abs() < 1e-9);

    let day = server
      .post(&format!("/api/plans/{}/days/0/incomplete", plan_id))
      .await
      .json::<Value>();
    assert_eq!(day["is_completed"], false);

    server
      .delete(&format!("/api/plans/{}", plan_id))
      .await
      .assert_status(StatusCode::NO_CONTENT);
    server
      .get(&format!("/api/plans/{}", plan_id))
      .await
      .assert_status(StatusCode::NOT_FOUND);
    server
      .delete(&format!("/api/plans/{}", plan_id))
      .await
      .assert_status(StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn test_today_lists_current_allocation() {
    let server = server();
    let plan_id = psalm_23_plan(&server).await;

    let today = server.get("/api/today").await.json::<Vec<Value>>();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0]["plan_id"], plan_id);
    assert_eq!(today[0]["passages"].as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn test_statistics_for_new_plan() {
    let server = server();
    let plan_id = psalm_23_plan(&server).await;

    let stats = server
      .get(&format!("/api/plans/{}/statistics", plan_id))
      .await
      .json::<Value>();
    assert_eq!(stats["total_tests"], 0);
    assert_eq!(stats["average_percentage"], "0.0%");

    server
      .get("/api/plans/999/statistics")
      .await
      .assert_status(StatusCode::NOT_FOUND);
  }
}
