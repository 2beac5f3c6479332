//! In-memory passage repository, for tests and for embedding the planner
//! without a database.

use std::collections::BTreeMap;

use super::repository::PassageRepository;
use crate::domain::{Container, Passage, PassageRange, Version};
use crate::error::Result;

#[derive(Debug, Default, Clone)]
pub struct MemoryRepository {
  passages: Vec<Passage>,
  versions: Vec<Version>,
}

impl MemoryRepository {
  pub fn new(passages: Vec<Passage>, versions: Vec<Version>) -> Self {
    let mut repo = Self { passages, versions };
    repo.sort();
    repo
  }

  pub fn insert(&mut self, passage: Passage) {
    self.passages.retain(|p| p.id != passage.id);
    self.passages.push(passage);
    self.sort();
  }

  fn sort(&mut self) {
    self.passages.sort_by(|a, b| a.cmp_position(b));
  }

  fn in_version<'a>(&'a self, version_code: &'a str) -> impl Iterator<Item = &'a Passage> + 'a {
    self.passages.iter().filter(move |p| p.version_code == version_code)
  }
}

impl PassageRepository for MemoryRepository {
  fn lookup_passage(
    &self,
    container_code: &str,
    sub_unit: u32,
    unit: u32,
    version_code: &str,
  ) -> Result<Option<Passage>> {
    Ok(
      self
        .in_version(version_code)
        .find(|p| p.container_code == container_code && p.sub_unit == sub_unit && p.unit == unit)
        .cloned(),
    )
  }

  fn passage_by_id(&self, passage_id: &str) -> Result<Option<Passage>> {
    Ok(self.passages.iter().find(|p| p.id == passage_id).cloned())
  }

  fn expand_range(&self, range: &PassageRange) -> Result<Vec<Passage>> {
    let (low, high) = (range.start.position(), range.end.position());
    Ok(
      self
        .in_version(&range.version_code)
        .filter(|p| p.position() >= low && p.position() <= high)
        .cloned()
        .collect(),
    )
  }

  fn list_containers(&self, version_code: &str) -> Result<Vec<Container>> {
    let mut containers: BTreeMap<(u32, String), Container> = BTreeMap::new();
    for p in self.in_version(version_code) {
      let entry = containers
        .entry((p.container_order, p.container_code.clone()))
        .or_insert_with(|| Container {
          code: p.container_code.clone(),
          name: p.container_name.clone(),
          order: p.container_order,
          sub_units: 0,
        });
      entry.sub_units = entry.sub_units.max(p.sub_unit);
    }
    Ok(containers.into_values().collect())
  }

  fn list_versions(&self) -> Result<Vec<Version>> {
    let mut versions = self.versions.clone();
    versions.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(versions)
  }

  fn unit_count(&self, container_code: &str, sub_unit: u32, version_code: &str) -> Result<u32> {
    Ok(
      self
        .in_version(version_code)
        .filter(|p| p.container_code == container_code && p.sub_unit == sub_unit)
        .map(|p| p.unit)
        .max()
        .unwrap_or(0),
    )
  }

  fn search(&self, keyword: &str, version_code: &str, limit: usize) -> Result<Vec<Passage>> {
    let needle = keyword.to_lowercase();
    Ok(
      self
        .in_version(version_code)
        .filter(|p| p.text.to_lowercase().contains(&needle))
        .take(limit)
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::seed::seed_passages;

  fn repo() -> MemoryRepository {
    let (passages, versions) = seed_passages();
    MemoryRepository::new(passages, versions)
  }

  #[test]
  fn test_expand_range_matches_walk_order() {
    let repo = repo();
    let start = repo.lookup_passage("PSA", 23, 6, "WEB").unwrap().unwrap();
    let end = repo.lookup_passage("PSA", 24, 1, "WEB").unwrap().unwrap();
    let ids: Vec<String> = repo
      .expand_range(&PassageRange::new(start, end))
      .unwrap()
      .into_iter()
      .map(|p| p.id)
      .collect();
    assert_eq!(ids, vec!["PSA_23_6_WEB".to_string(), "PSA_24_1_WEB".to_string()]);
  }

  #[test]
  fn test_insert_replaces_and_keeps_order() {
    let mut repo = MemoryRepository::default();
    repo.insert(Passage::new("PSA", "Psalms", 19, 23, 2, "second", "WEB"));
    repo.insert(Passage::new("PSA", "Psalms", 19, 23, 1, "first", "WEB"));
    repo.insert(Passage::new("PSA", "Psalms", 19, 23, 2, "second again", "WEB"));

    let start = repo.lookup_passage("PSA", 23, 1, "WEB").unwrap().unwrap();
    let end = repo.lookup_passage("PSA", 23, 2, "WEB").unwrap().unwrap();
    let texts: Vec<String> = repo
      .expand_range(&PassageRange::new(start, end))
      .unwrap()
      .into_iter()
      .map(|p| p.text)
      .collect();
    assert_eq!(texts, vec!["first".to_string(), "second again".to_string()]);
  }

  #[test]
  fn test_listings() {
    let repo = repo();
    let containers = repo.list_containers("WEB").unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].sub_units, 24);
    assert_eq!(repo.unit_count("PSA", 24, "WEB").unwrap(), 2);
    assert_eq!(repo.list_versions().unwrap()[0].code, "WEB");
    assert_eq!(repo.search("SHEPHERD", "WEB", 10).unwrap().len(), 1);
  }
}
