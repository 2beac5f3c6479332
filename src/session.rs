//! In-memory storage for recitation test sessions.
//!
//! A session holds the passages under test, a cursor and one attempt per
//! passage. Sessions live in [`SessionStore`] (owned by the application
//! state) and auto-expire after a configurable duration of inactivity.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::config;
use crate::db::{self, PassageRepository};
use crate::domain::{Passage, TestResult, TestType};
use crate::error::{RecitalError, Result};
use crate::planner;
use crate::scoring::{score_attempts, ScoringInput};

#[derive(Debug, Clone, Serialize)]
pub struct TestSession {
  pub plan_id: i64,
  pub test_type: TestType,
  pub passages: Vec<Passage>,
  pub cursor: usize,
  pub attempts: Vec<String>,
  pub is_completed: bool,
}

impl TestSession {
  pub fn new(plan_id: i64, test_type: TestType, passages: Vec<Passage>) -> Self {
    let attempts = vec![String::new(); passages.len()];
    Self {
      plan_id,
      test_type,
      passages,
      cursor: 0,
      attempts,
      is_completed: false,
    }
  }

  pub fn current_passage(&self) -> Option<&Passage> {
    self.passages.get(self.cursor)
  }

  pub fn set_current_attempt(&mut self, text: &str) {
    if let Some(attempt) = self.attempts.get_mut(self.cursor) {
      *attempt = text.to_string();
    }
  }

  /// Record the attempt for passage `index`. Returns false when out of range.
  pub fn set_attempt(&mut self, index: usize, text: &str) -> bool {
    match self.attempts.get_mut(index) {
      Some(attempt) => {
        *attempt = text.to_string();
        true
      }
      None => false,
    }
  }

  /// Advance the cursor; moving past the last passage completes the session
  pub fn next(&mut self) {
    if self.cursor + 1 < self.passages.len() {
      self.cursor += 1;
    } else {
      self.is_completed = true;
    }
  }

  pub fn previous(&mut self) {
    self.cursor = self.cursor.saturating_sub(1);
  }

  pub fn progress(&self) -> f64 {
    if self.passages.is_empty() {
      0.0
    } else {
      self.cursor as f64 / self.passages.len() as f64
    }
  }

  pub fn is_last(&self) -> bool {
    self.cursor + 1 >= self.passages.len()
  }

  /// Attempts joined one per line, in passage order
  pub fn full_text(&self) -> String {
    self.attempts.join("\n")
  }

  pub fn expected_text(&self) -> String {
    self
      .passages
      .iter()
      .map(|p| p.text.as_str())
      .collect::<Vec<_>>()
      .join("\n")
  }

  /// Score each attempt against its own passage and build an unsaved result
  pub fn grade(&self, test_date: DateTime<Utc>) -> TestResult {
    let inputs: Vec<ScoringInput> = self.passages.iter().map(ScoringInput::from).collect();
    let scored = score_attempts(&inputs, &self.attempts);

    TestResult {
      id: 0,
      plan_id: self.plan_id,
      test_date,
      test_type: self.test_type,
      accuracy: scored.accuracy,
      total_units: scored.total_units,
      correct_units: scored.correct_units,
      total_passages: self.passages.len(),
      correct_passages: scored.correct_passages(),
      incorrect_passage_ids: scored.incorrect_passage_ids(),
      user_input: self.full_text(),
      expected_text: self.expected_text(),
      mistakes: scored.diff_by_passage(),
    }
  }
}

/// Session entry with last access time for expiration
struct SessionEntry {
  session: TestSession,
  last_access: DateTime<Utc>,
}

pub struct SessionStore {
  sessions: Mutex<HashMap<String, SessionEntry>>,
  expiry: Duration,
}

impl Default for SessionStore {
  fn default() -> Self {
    Self::new()
  }
}

impl SessionStore {
  pub fn new() -> Self {
    Self::with_expiry(Duration::hours(config::SESSION_EXPIRY_HOURS))
  }

  pub fn with_expiry(expiry: Duration) -> Self {
    Self {
      sessions: Mutex::new(HashMap::new()),
      expiry,
    }
  }

  fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SessionEntry>>> {
    self.sessions.lock().map_err(|_| {
      tracing::error!("Session store mutex poisoned");
      RecitalError::StorageUnavailable
    })
  }

  /// Register a session under a fresh id
  pub fn insert(&self, session: TestSession) -> Result<String> {
    let mut sessions = self.lock()?;
    self.maybe_cleanup(&mut sessions);

    let mut session_id = generate_session_id();
    while sessions.contains_key(&session_id) {
      session_id = generate_session_id();
    }
    sessions.insert(
      session_id.clone(),
      SessionEntry {
        session,
        last_access: Utc::now(),
      },
    );
    Ok(session_id)
  }

  pub fn get(&self, session_id: &str) -> Result<TestSession> {
    self.update(session_id, |session| session.clone())
  }

  /// Apply `f` to a live session, refreshing its access time
  pub fn update<T>(&self, session_id: &str, f: impl FnOnce(&mut TestSession) -> T) -> Result<T> {
    let mut sessions = self.lock()?;
    self.maybe_cleanup(&mut sessions);

    let entry = sessions
      .get_mut(session_id)
      .filter(|entry| !self.is_expired(entry))
      .ok_or(RecitalError::NoActiveSession)?;
    entry.last_access = Utc::now();
    Ok(f(&mut entry.session))
  }

  pub fn remove(&self, session_id: &str) -> Result<TestSession> {
    let mut sessions = self.lock()?;
    match sessions.remove(session_id) {
      Some(entry) if !self.is_expired(&entry) => Ok(entry.session),
      _ => Err(RecitalError::NoActiveSession),
    }
  }

  pub fn len(&self) -> usize {
    self.lock().map(|s| s.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  fn is_expired(&self, entry: &SessionEntry) -> bool {
    entry.last_access <= Utc::now() - self.expiry
  }

  /// Clean up expired sessions occasionally (~10% chance)
  fn maybe_cleanup(&self, sessions: &mut HashMap<String, SessionEntry>) {
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      self.cleanup_expired(sessions);
    }
  }

  fn cleanup_expired(&self, sessions: &mut HashMap<String, SessionEntry>) {
    let before = sessions.len();
    let expiry = Utc::now() - self.expiry;
    sessions.retain(|_, entry| entry.last_access > expiry);
    if sessions.len() < before {
      tracing::debug!("Dropped {} expired test sessions", before - sessions.len());
    }
  }
}

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..config::SESSION_ID_LEN)
    .map(|_| {
      let idx = rng.random_range(0..36u8);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

/// Resolve the passages for a test and open a session over them.
///
/// A test with nothing scheduled is rejected with `EmptyRange`.
pub fn start_test(
  repo: &dyn PassageRepository,
  conn: &Connection,
  store: &SessionStore,
  plan_id: i64,
  test_type: TestType,
  today: NaiveDate,
) -> Result<(String, TestSession)> {
  let passages = planner::test_passages(repo, conn, plan_id, test_type, today)?;
  if passages.is_empty() {
    return Err(RecitalError::EmptyRange(format!(
      "No passages are scheduled for a {} test on {}.",
      test_type.as_str(),
      today
    )));
  }

  let session = TestSession::new(plan_id, test_type, passages);
  let session_id = store.insert(session.clone())?;
  tracing::info!(
    plan_id,
    test_type = test_type.as_str(),
    passages = session.passages.len(),
    "Started test session"
  );
  Ok((session_id, session))
}

/// Score a session, persist the result and end the session.
///
/// The session survives a failed save so the attempt is not lost.
pub fn submit(conn: &Connection, store: &SessionStore, session_id: &str) -> Result<TestResult> {
  let session = store.get(session_id)?;
  let mut result = session.grade(Utc::now());
  result.id = db::insert_test_result(conn, &result)?;
  store.remove(session_id)?;

  tracing::info!(
    plan_id = result.plan_id,
    result_id = result.id,
    accuracy = result.accuracy,
    "Submitted {} test",
    result.test_type.as_str()
  );
  Ok(result)
}
