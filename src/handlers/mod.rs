//! JSON API handlers and router.

pub mod passages;
pub mod plans;
pub mod recitation;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post, put},
  Json, Router,
};
use chrono::{Local, NaiveDate};

use crate::error::RecitalError;
use crate::state::AppState;

pub use passages::{get_passage, list_containers, list_versions, search_passages};
pub use plans::{
  complete_day, create_plan, delete_plan, get_plan, incomplete_day, list_plans, plan_statistics,
  today, validate_plan,
};
pub use recitation::{
  delete_test, get_test, next_passage, previous_passage, score_attempt, start_test, submit_test,
  update_attempt,
};

impl IntoResponse for RecitalError {
  fn into_response(self) -> Response {
    let status = if self.is_planning_error() {
      StatusCode::BAD_REQUEST
    } else if self.is_not_found() {
      StatusCode::NOT_FOUND
    } else {
      tracing::error!("Request failed: {}", self);
      StatusCode::INTERNAL_SERVER_ERROR
    };

    (
      status,
      Json(serde_json::json!({
        "error": self.to_string()
      })),
    )
      .into_response()
  }
}

/// Calendar day used for scheduling and tests
pub(crate) fn local_today() -> NaiveDate {
  Local::now().date_naive()
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/api/versions", get(list_versions))
    .route("/api/containers", get(list_containers))
    .route("/api/passages/{code}/{sub_unit}/{unit}", get(get_passage))
    .route("/api/search", get(search_passages))
    .route("/api/plans/validate", post(validate_plan))
    .route("/api/plans", get(list_plans).post(create_plan))
    .route("/api/plans/{id}", get(get_plan).delete(delete_plan))
    .route("/api/plans/{id}/days/{day}/complete", post(complete_day))
    .route("/api/plans/{id}/days/{day}/incomplete", post(incomplete_day))
    .route("/api/plans/{id}/statistics", get(plan_statistics))
    .route("/api/today", get(today))
    .route("/api/tests", post(start_test))
    .route("/api/tests/{session_id}", get(get_test).delete(delete_test))
    .route("/api/tests/{session_id}/attempts/{index}", put(update_attempt))
    .route("/api/tests/{session_id}/next", post(next_passage))
    .route("/api/tests/{session_id}/previous", post(previous_passage))
    .route("/api/tests/{session_id}/submit", post(submit_test))
    .route("/api/score", post(score_attempt))
    .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
  use axum_test::TestServer;
  use chrono::{Days, NaiveDate};

  use super::*;
  use crate::db;
  use crate::testing::seeded_connection;

  pub fn server() -> TestServer {
    let pool = db::pool_from(seeded_connection()).unwrap();
    TestServer::new(router(AppState::new(pool))).unwrap()
  }

  pub fn days_from_today(n: u64) -> NaiveDate {
    local_today().checked_add_days(Days::new(n)).unwrap()
  }

  /// Psalm 23:1-6 over three days starting today; returns the plan id
  pub async fn psalm_23_plan(server: &TestServer) -> i64 {
    let response = server
      .post("/api/plans")
      .json(&serde_json::json!({
        "title": "Psalm 23",
        "start": {"container_code": "PSA", "sub_unit": 23, "unit": 1},
        "end": {"container_code": "PSA", "sub_unit": 23, "unit": 6},
        "target_date": days_from_today(2),
      }))
      .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<serde_json::Value>()["id"].as_i64().unwrap()
  }
}
