//! Passage lookup handlers: versions, containers, single passages and search.

use axum::{
  extract::{Path, Query, State},
  Json,
};
use serde::Deserialize;

use crate::config;
use crate::db::{self, PassageRepository};
use crate::domain::{Container, Passage, PassageKey, Version};
use crate::error::{RecitalError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VersionQuery {
  pub version: Option<String>,
}

impl VersionQuery {
  pub fn version(&self) -> &str {
    self.version.as_deref().unwrap_or(config::DEFAULT_VERSION)
  }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
  #[serde(default)]
  pub q: String,
  pub version: Option<String>,
}

/// GET /api/versions
pub async fn list_versions(State(state): State<AppState>) -> Result<Json<Vec<Version>>> {
  let conn = db::try_lock(&state.db)?;
  Ok(Json(conn.list_versions()?))
}

/// GET /api/containers?version=
pub async fn list_containers(
  State(state): State<AppState>,
  Query(query): Query<VersionQuery>,
) -> Result<Json<Vec<Container>>> {
  let conn = db::try_lock(&state.db)?;
  Ok(Json(conn.list_containers(query.version())?))
}

/// GET /api/passages/{code}/{sub_unit}/{unit}?version=
pub async fn get_passage(
  State(state): State<AppState>,
  Path((code, sub_unit, unit)): Path<(String, u32, u32)>,
  Query(query): Query<VersionQuery>,
) -> Result<Json<Passage>> {
  let conn = db::try_lock(&state.db)?;
  let key = PassageKey::new(&code, sub_unit, unit, query.version());
  let passage = conn
    .lookup_passage(&key.container_code, key.sub_unit, key.unit, &key.version_code)?
    .ok_or_else(|| RecitalError::PassageNotFound(key.id()))?;
  Ok(Json(passage))
}

/// GET /api/search?q=&version=
pub async fn search_passages(
  State(state): State<AppState>,
  Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Passage>>> {
  let keyword = query.q.trim();
  if keyword.is_empty() {
    return Ok(Json(Vec::new()));
  }
  let version = query.version.as_deref().unwrap_or(config::DEFAULT_VERSION);

  let conn = db::try_lock(&state.db)?;
  Ok(Json(conn.search(keyword, version, config::SEARCH_LIMIT)?))
}

#[cfg(test)]
mod tests {
  use super::super::test_support::server;
  use axum::http::StatusCode;

  #[tokio::test]
  async fn test_list_versions_and_containers() {
    let server = server();

    let versions = server.get("/api/versions").await.json::<serde_json::Value>();
    assert_eq!(versions[0]["code"], "WEB");

    let containers = server.get("/api/containers").await.json::<serde_json::Value>();
    assert_eq!(containers[0]["code"], "PSA");
    assert_eq!(containers[0]["sub_units"], 24);
  }

  #[tokio::test]
  async fn test_get_passage() {
    let server = server();

    let response = server.get("/api/passages/PSA/23/1").await;
    response.assert_status_ok();
    let passage = response.json::<serde_json::Value>();
    assert_eq!(passage["id"], "PSA_23_1_WEB");

    let response = server.get("/api/passages/PSA/23/99").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
      response.json::<serde_json::Value>()["error"],
      "Passage not found: PSA_23_99_WEB"
    );
  }

  #[tokio::test]
  async fn test_search() {
    let server = server();

    let hits = server
      .get("/api/search")
      .add_query_param("q", "shepherd")
      .await
      .json::<Vec<serde_json::Value>>();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["id"], "PSA_23_1_WEB");

    let none = server
      .get("/api/search")
      .add_query_param("q", "  ")
      .await
      .json::<Vec<serde_json::Value>>();
    assert!(none.is_empty());
  }
}
