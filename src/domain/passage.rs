use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Structured identity of a passage: container (book), sub-unit (chapter),
/// unit (verse) and version (translation).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PassageKey {
  pub container_code: String,
  pub sub_unit: u32,
  pub unit: u32,
  pub version_code: String,
}

impl PassageKey {
  pub fn new(container_code: &str, sub_unit: u32, unit: u32, version_code: &str) -> Self {
    Self {
      container_code: container_code.to_string(),
      sub_unit,
      unit,
      version_code: version_code.to_string(),
    }
  }

  /// Stable identifier, e.g. `PSA_23_1_WEB`
  pub fn id(&self) -> String {
    format!(
      "{}_{}_{}_{}",
      self.container_code, self.sub_unit, self.unit, self.version_code
    )
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
  pub id: String,
  pub container_code: String,
  pub container_name: String,
  pub container_order: u32,
  pub sub_unit: u32,
  pub unit: u32,
  pub text: String,
  pub version_code: String,
}

impl Passage {
  pub fn new(
    container_code: &str,
    container_name: &str,
    container_order: u32,
    sub_unit: u32,
    unit: u32,
    text: &str,
    version_code: &str,
  ) -> Self {
    let key = PassageKey::new(container_code, sub_unit, unit, version_code);
    Self {
      id: key.id(),
      container_code: container_code.to_string(),
      container_name: container_name.to_string(),
      container_order,
      sub_unit,
      unit,
      text: text.to_string(),
      version_code: version_code.to_string(),
    }
  }

  pub fn key(&self) -> PassageKey {
    PassageKey::new(&self.container_code, self.sub_unit, self.unit, &self.version_code)
  }

  /// "Psalms 23:1"
  pub fn reference(&self) -> String {
    format!("{} {}:{}", self.container_name, self.sub_unit, self.unit)
  }

  /// "Psalms 23:1 (WEB)"
  pub fn full_reference(&self) -> String {
    format!("{} ({})", self.reference(), self.version_code)
  }

  /// Position used for range ordering: container, then sub-unit, then unit.
  pub fn position(&self) -> (u32, u32, u32) {
    (self.container_order, self.sub_unit, self.unit)
  }

  pub fn cmp_position(&self, other: &Passage) -> Ordering {
    self.position().cmp(&other.position())
  }
}

/// Inclusive span of passages within one version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageRange {
  pub start: Passage,
  pub end: Passage,
  pub version_code: String,
}

impl PassageRange {
  pub fn new(start: Passage, end: Passage) -> Self {
    let version_code = start.version_code.clone();
    Self {
      start,
      end,
      version_code,
    }
  }

  /// Start precedes or equals end
  pub fn is_well_formed(&self) -> bool {
    self.start.cmp_position(&self.end) != Ordering::Greater
  }

  pub fn display_name(&self) -> String {
    let (start, end) = (&self.start, &self.end);
    if start.container_code == end.container_code {
      if start.sub_unit == end.sub_unit {
        format!("{} {}:{}-{}", start.container_name, start.sub_unit, start.unit, end.unit)
      } else {
        format!(
          "{} {}:{}-{}:{}",
          start.container_name, start.sub_unit, start.unit, end.sub_unit, end.unit
        )
      }
    } else {
      format!("{} - {}", start.reference(), end.reference())
    }
  }
}

/// Container (book) listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
  pub code: String,
  pub name: String,
  pub order: u32,
  pub sub_units: u32,
}

/// Version (translation) listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
  pub code: String,
  pub name: String,
  pub language: String,
}
