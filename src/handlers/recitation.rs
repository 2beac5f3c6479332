//! Recitation test handlers: session lifecycle, submission and stateless scoring.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{self, PassageRepository};
use crate::domain::{Passage, TestResult, TestType};
use crate::error::{RecitalError, Result};
use crate::scoring::{score, ScoreResult, ScoringInput};
use crate::session::{self, TestSession};
use crate::state::AppState;

use super::local_today;

#[derive(Debug, Deserialize)]
pub struct StartTestRequest {
  pub plan_id: i64,
  #[serde(default)]
  pub test_type: TestType,
}

#[derive(Debug, Deserialize)]
pub struct AttemptRequest {
  pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScorePassage {
  pub id: String,
  /// Reference text; looked up by id when absent
  pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
  pub passages: Vec<ScorePassage>,
  #[serde(default)]
  pub attempt: String,
}

/// Session state as seen by the client
#[derive(Debug, Serialize)]
pub struct SessionView {
  pub session_id: String,
  pub plan_id: i64,
  pub test_type: TestType,
  pub passages: Vec<Passage>,
  pub cursor: usize,
  pub attempts: Vec<String>,
  pub progress: f64,
  pub is_last: bool,
  pub is_completed: bool,
}

impl SessionView {
  fn new(session_id: &str, session: TestSession) -> Self {
    Self {
      session_id: session_id.to_string(),
      plan_id: session.plan_id,
      test_type: session.test_type,
      progress: session.progress(),
      is_last: session.is_last(),
      is_completed: session.is_completed,
      cursor: session.cursor,
      attempts: session.attempts,
      passages: session.passages,
    }
  }
}

/// POST /api/tests
pub async fn start_test(
  State(state): State<AppState>,
  Json(request): Json<StartTestRequest>,
) -> Result<impl IntoResponse> {
  let conn = db::try_lock(&state.db)?;
  let (session_id, session) = session::start_test(
    &*conn,
    &conn,
    &state.sessions,
    request.plan_id,
    request.test_type,
    local_today(),
  )?;
  Ok((StatusCode::CREATED, Json(SessionView::new(&session_id, session))))
}

/// GET /api/tests/{session_id}
pub async fn get_test(
  State(state): State<AppState>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionView>> {
  let session = state.sessions.get(&session_id)?;
  Ok(Json(SessionView::new(&session_id, session)))
}

/// PUT /api/tests/{session_id}/attempts/{index}
pub async fn update_attempt(
  State(state): State<AppState>,
  Path((session_id, index)): Path<(String, usize)>,
  Json(request): Json<AttemptRequest>,
) -> Result<Json<SessionView>> {
  let session = state.sessions.update(&session_id, |session| {
    if session.set_attempt(index, &request.text) {
      Ok(session.clone())
    } else {
      Err(RecitalError::PassageNotFound(format!(
        "attempt {} of {}",
        index,
        session.passages.len()
      )))
    }
  })??;
  Ok(Json(SessionView::new(&session_id, session)))
}

/// POST /api/tests/{session_id}/next
pub async fn next_passage(
  State(state): State<AppState>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionView>> {
  let session = state.sessions.update(&session_id, |session| {
    session.next();
    session.clone()
  })?;
  Ok(Json(SessionView::new(&session_id, session)))
}

/// POST /api/tests/{session_id}/previous
pub async fn previous_passage(
  State(state): State<AppState>,
  Path(session_id): Path<String>,
) -> Result<Json<SessionView>> {
  let session = state.sessions.update(&session_id, |session| {
    session.previous();
    session.clone()
  })?;
  Ok(Json(SessionView::new(&session_id, session)))
}

/// POST /api/tests/{session_id}/submit
pub async fn submit_test(
  State(state): State<AppState>,
  Path(session_id): Path<String>,
) -> Result<Json<TestResult>> {
  let conn = db::try_lock(&state.db)?;
  Ok(Json(session::submit(&conn, &state.sessions, &session_id)?))
}

/// DELETE /api/tests/{session_id}
pub async fn delete_test(
  State(state): State<AppState>,
  Path(session_id): Path<String>,
) -> Result<StatusCode> {
  state.sessions.remove(&session_id)?;
  Ok(StatusCode::NO_CONTENT)
}

/// POST /api/score
///
/// Scores an attempt without creating a session or saving a result.
/// Passages given only by id are resolved from the repository.
pub async fn score_attempt(
  State(state): State<AppState>,
  Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResult>> {
  let mut inputs = Vec::with_capacity(request.passages.len());
  for passage in request.passages {
    let text = match passage.text {
      Some(text) => text,
      None => {
        let conn = db::try_lock(&state.db)?;
        conn
          .passage_by_id(&passage.id)?
          .map(|p| p.text)
          .ok_or_else(|| RecitalError::PassageNotFound(passage.id.clone()))?
      }
    };
    inputs.push(ScoringInput {
      passage_id: passage.id,
      text,
    });
  }
  Ok(Json(score(&inputs, &request.attempt)))
}
