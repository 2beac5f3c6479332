//! Error types for planning, scoring sessions and storage.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RecitalError>;

#[derive(Error, Debug)]
pub enum RecitalError {
  /// Target date yields fewer than one day
  #[error("{0}")]
  InvalidDate(String),

  /// Range expands to no passages
  #[error("{0}")]
  EmptyRange(String),

  /// Average daily quota exceeds the ceiling
  #[error("{0}")]
  ExcessiveLoad(String),

  #[error("Passage not found: {0}")]
  PassageNotFound(String),

  #[error("Plan not found: {0}")]
  PlanNotFound(i64),

  #[error("No active test session")]
  NoActiveSession,

  #[error("Storage unavailable")]
  StorageUnavailable,

  #[error("Database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("Serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl RecitalError {
  /// Planning errors the caller can fix by changing the request
  pub fn is_planning_error(&self) -> bool {
    matches!(
      self,
      Self::InvalidDate(_) | Self::EmptyRange(_) | Self::ExcessiveLoad(_)
    )
  }

  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::PassageNotFound(_) | Self::PlanNotFound(_) | Self::NoActiveSession
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_messages() {
    assert_eq!(
      RecitalError::InvalidDate("Target date must be today or later.".into()).to_string(),
      "Target date must be today or later."
    );
    assert_eq!(
      RecitalError::PassageNotFound("PSA_99_1_WEB".into()).to_string(),
      "Passage not found: PSA_99_1_WEB"
    );
    assert_eq!(RecitalError::NoActiveSession.to_string(), "No active test session");
  }

  #[test]
  fn test_classification() {
    assert!(RecitalError::EmptyRange(String::new()).is_planning_error());
    assert!(!RecitalError::NoActiveSession.is_planning_error());
    assert!(RecitalError::NoActiveSession.is_not_found());
    assert!(RecitalError::PlanNotFound(3).is_not_found());
    assert!(!RecitalError::StorageUnavailable.is_not_found());
  }
}
