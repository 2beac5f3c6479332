use serde::{Deserialize, Serialize};

/// Classification of one aligned unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffKind {
  /// Present in both reference and attempt
  Correct,
  /// In the reference, absent from the attempt
  Missing,
  /// In the attempt, absent from the reference
  Extra,
  /// A Missing unit directly replaced by an Extra one
  Wrong,
}

/// One classified output of alignment.
///
/// `index` points into the reference for Correct/Missing/Wrong and into the
/// attempt for Extra.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffUnit {
  pub kind: DiffKind,
  pub text: String,
  pub index: usize,
}

impl DiffUnit {
  pub fn new(kind: DiffKind, text: impl Into<String>, index: usize) -> Self {
    Self {
      kind,
      text: text.into(),
      index,
    }
  }

  pub fn is_correct(&self) -> bool {
    self.kind == DiffKind::Correct
  }
}

/// Normalized comparable unit. Equality compares the normalized form only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
  pub normalized: String,
  pub surface: String,
}

impl Token {
  pub fn new(normalized: impl Into<String>, surface: impl Into<String>) -> Self {
    Self {
      normalized: normalized.into(),
      surface: surface.into(),
    }
  }
}

impl PartialEq for Token {
  fn eq(&self, other: &Self) -> bool {
    self.normalized == other.normalized
  }
}

impl Eq for Token {}
