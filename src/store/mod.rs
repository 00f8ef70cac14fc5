//! Scenario collection synchronized with the remote API
//!
//! The remote API is the source of truth; the local cache file is a
//! fallback, written whenever a mutation could not reach the backend and
//! read whenever a listing fails. All persisted mutation goes through
//! this store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use crate::api::ApiClient;
use crate::common::{Error, Result};
use crate::model::{Category, Scenario, ScenarioDraft, ScenarioPatch};
use crate::selection::SelectionSet;

/// Where a mutation ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    Remote,
    LocalFallback,
}

/// Outcome of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted(Persistence),
    /// Deleting an unknown id is a logged no-op
    NotFound,
}

pub struct ScenarioStore {
    api: ApiClient,
    cache_path: PathBuf,
    scenarios: Vec<Scenario>,
}

impl ScenarioStore {
    pub fn new(api: ApiClient, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            cache_path: cache_path.into(),
            scenarios: Vec::new(),
        }
    }

    /// Reload the collection from the backend, falling back to the local
    /// cache file on any failure
    pub async fn refresh(&mut self) -> Persistence {
        match self.api.list_scenarios().await {
            Ok(scenarios) => {
                self.scenarios = scenarios;
                Persistence::Remote
            }
            Err(e) => {
                warn!("could not load scenarios from the backend, using local data: {e}");
                self.scenarios = read_cache(&self.cache_path);
                Persistence::LocalFallback
            }
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    /// Client-side filtering: case-insensitive substring match on name
    /// and description, equality on category
    pub fn filtered(&self, search: Option<&str>, category: Option<Category>) -> Vec<&Scenario> {
        let needle = search.map(str::to_lowercase);
        self.scenarios
            .iter()
            .filter(|s| {
                let matches_search = needle.as_ref().map_or(true, |n| {
                    s.name.to_lowercase().contains(n)
                        || s.description.to_lowercase().contains(n)
                });
                let matches_category = category.map_or(true, |c| s.category == c);
                matches_search && matches_category
            })
            .collect()
    }

    /// Validate and persist a new scenario.
    ///
    /// An invalid draft is rejected before anything is touched. A remote
    /// failure appends the record locally instead.
    pub async fn create(&mut self, draft: ScenarioDraft) -> Result<(Scenario, Persistence)> {
        let scenario = draft.into_scenario(Utc::now())?;
        match self.api.create_scenario(&scenario).await {
            Ok(()) => {
                self.refresh().await;
                Ok((scenario, Persistence::Remote))
            }
            Err(e) => {
                warn!("could not save scenario to the backend, saving locally: {e}");
                self.scenarios.push(scenario.clone());
                self.write_cache()?;
                Ok((scenario, Persistence::LocalFallback))
            }
        }
    }

    /// Merge a patch over the existing record and persist the full
    /// replacement
    pub async fn update(
        &mut self,
        id: &str,
        patch: ScenarioPatch,
    ) -> Result<(Scenario, Persistence)> {
        let index = self
            .scenarios
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::not_found(id))?;

        let merged = self.scenarios[index].merged(patch, Utc::now());
        merged.validate()?;

        match self.api.update_scenario(&merged).await {
            Ok(()) => {
                self.refresh().await;
                Ok((merged, Persistence::Remote))
            }
            Err(e) => {
                warn!("could not update scenario on the backend, updating locally: {e}");
                self.scenarios[index] = merged.clone();
                self.write_cache()?;
                Ok((merged, Persistence::LocalFallback))
            }
        }
    }

    /// Delete a scenario and drop it from the active selection
    pub async fn delete(
        &mut self,
        id: &str,
        selection: &mut SelectionSet,
    ) -> Result<DeleteOutcome> {
        if self.get(id).is_none() {
            warn!("delete of unknown scenario '{id}' ignored");
            return Ok(DeleteOutcome::NotFound);
        }

        let persistence = match self.api.delete_scenario(id).await {
            Ok(()) => {
                self.refresh().await;
                Persistence::Remote
            }
            Err(e) => {
                warn!("could not delete scenario on the backend, deleting locally: {e}");
                self.scenarios.retain(|s| s.id != id);
                self.write_cache()?;
                Persistence::LocalFallback
            }
        };

        selection.remove(id);
        Ok(DeleteOutcome::Deleted(persistence))
    }

    /// Append imported records to the collection and persist them to the
    /// cache file only; imports are never pushed to the backend.
    /// Duplicate ids are kept as-is and logged.
    pub fn import(&mut self, imported: Vec<Scenario>) -> Result<usize> {
        let existing: HashSet<String> =
            self.scenarios.iter().map(|s| s.id.clone()).collect();
        let duplicates = imported
            .iter()
            .filter(|s| existing.contains(&s.id))
            .count();
        if duplicates > 0 {
            warn!("{duplicates} imported scenario(s) share an id with existing ones");
        }

        let count = imported.len();
        self.scenarios.extend(imported);
        self.write_cache()?;
        Ok(count)
    }

    fn write_cache(&self) -> Result<()> {
        if let Some(parent) = self.cache_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(
            &self.cache_path,
            serde_json::to_string_pretty(&self.scenarios)?,
        )?;
        Ok(())
    }
}

fn read_cache(path: &Path) -> Vec<Scenario> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&content) {
        Ok(scenarios) => scenarios,
        Err(e) => {
            warn!("discarding corrupt scenario cache: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{steps_from_descriptions, Priority};
    use serde_json::json;
    use std::time::Duration;

    fn offline_api() -> ApiClient {
        // Nothing listens on port 1; every call fails fast and exercises
        // the fallback paths.
        ApiClient::new("http://127.0.0.1:1", Duration::from_millis(250)).unwrap()
    }

    fn offline_store(dir: &tempfile::TempDir) -> ScenarioStore {
        ScenarioStore::new(offline_api(), dir.path().join("scenarios.json"))
    }

    fn draft(name: &str) -> ScenarioDraft {
        ScenarioDraft {
            name: name.to_string(),
            description: "checks the basics".to_string(),
            category: Some(Category::Api),
            priority: Some(Priority::Low),
            steps: steps_from_descriptions(&["call endpoint", "check response"]),
            expected_results: "200 OK".to_string(),
            test_data: Some(json!({"token": "t"})),
        }
    }

    #[tokio::test]
    async fn test_create_falls_back_locally_and_survives_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);

        let (created, persistence) = store.create(draft("Smoke")).await.unwrap();
        assert_eq!(persistence, Persistence::LocalFallback);

        // A fresh store over the same cache path sees the record after a
        // failed remote listing.
        let mut reloaded = offline_store(&dir);
        assert_eq!(reloaded.refresh().await, Persistence::LocalFallback);
        let found = reloaded.get(&created.id).unwrap();
        assert_eq!(found.name, "Smoke");
        assert_eq!(found.description, "checks the basics");
        assert_eq!(found.category, Category::Api);
        assert_eq!(found.priority, Priority::Low);
        assert_eq!(found.steps.len(), 2);
        assert_eq!(found.expected_results, "200 OK");
        assert_eq!(found.test_data, json!({"token": "t"}));
        assert_eq!(found.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_invalid_draft_rejected_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);

        let mut bad = draft("");
        bad.name = String::new();
        let err = store.create(bad).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.scenarios().is_empty());
        assert!(!dir.path().join("scenarios.json").exists());
    }

    #[tokio::test]
    async fn test_update_merges_and_stamps_last_modified() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);
        let (created, _) = store.create(draft("Original")).await.unwrap();

        let (updated, persistence) = store
            .update(
                &created.id,
                ScenarioPatch {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(persistence, Persistence::LocalFallback);
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.expected_results, "200 OK");
        assert!(updated.last_modified >= created.last_modified);
        assert_eq!(store.get(&created.id).unwrap().name, "Renamed");
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);
        let err = store
            .update("missing", ScenarioPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_purges_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);
        let (created, _) = store.create(draft("Doomed")).await.unwrap();

        let mut selection = SelectionSet::default();
        selection.toggle(&created);
        assert!(selection.contains(&created.id));

        let outcome = store.delete(&created.id, &mut selection).await.unwrap();
        assert_eq!(
            outcome,
            DeleteOutcome::Deleted(Persistence::LocalFallback)
        );
        assert!(store.get(&created.id).is_none());
        assert!(!selection.contains(&created.id));
    }

    #[tokio::test]
    async fn test_delete_unknown_id_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);
        let mut selection = SelectionSet::default();
        let outcome = store.delete("missing", &mut selection).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_filtered_by_search_and_category() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);
        store.create(draft("Checkout flow")).await.unwrap();
        let mut ui = draft("Landing page");
        ui.category = Some(Category::Ui);
        store.create(ui).await.unwrap();

        assert_eq!(store.filtered(Some("landing"), None).len(), 1);
        assert_eq!(store.filtered(None, Some(Category::Api)).len(), 1);
        assert_eq!(store.filtered(Some("checkout"), Some(Category::Ui)).len(), 0);
        // Description text matches too.
        assert_eq!(store.filtered(Some("basics"), None).len(), 2);
    }

    #[tokio::test]
    async fn test_import_appends_without_dedup() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = offline_store(&dir);
        let (created, _) = store.create(draft("Kept")).await.unwrap();

        let count = store
            .import(vec![created.clone()])
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.scenarios().len(), 2);
    }
}
