//! Selection of scenarios for an execution run
//!
//! Keeps insertion order and a cached copy of each record taken at
//! selection time. Persisted in the data directory so a selection made in
//! one CLI invocation is still there for `scenario run` in the next.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::model::Scenario;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    entries: Vec<Scenario>,
}

impl SelectionSet {
    /// Read the persisted selection; a missing or corrupt file loads as
    /// an empty selection
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(set) => set,
            Err(e) => {
                tracing::warn!("discarding corrupt selection file: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }

    /// Add the scenario if absent, remove it if present.
    /// Returns true when the scenario was added.
    pub fn toggle(&mut self, scenario: &Scenario) -> bool {
        if let Some(pos) = self.entries.iter().position(|s| s.id == scenario.id) {
            self.entries.remove(pos);
            false
        } else {
            self.entries.push(scenario.clone());
            true
        }
    }

    /// Drop the given id if selected. Returns true when something was
    /// removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|s| s.id == id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Insertion-order snapshot of the selected scenarios
    pub fn all(&self) -> &[Scenario] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{steps_from_descriptions, Category, ScenarioDraft};
    use chrono::Utc;

    fn scenario(name: &str) -> Scenario {
        ScenarioDraft {
            name: name.to_string(),
            category: Some(Category::Ui),
            steps: steps_from_descriptions(&["one step"]),
            expected_results: "ok".to_string(),
            ..Default::default()
        }
        .into_scenario(Utc::now())
        .unwrap()
    }

    #[test]
    fn test_double_toggle_restores_original_state() {
        let mut selection = SelectionSet::default();
        let s = scenario("a");
        assert!(selection.toggle(&s));
        assert!(selection.contains(&s.id));
        assert!(!selection.toggle(&s));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_keeps_insertion_order() {
        let mut selection = SelectionSet::default();
        let (a, b, c) = (scenario("a"), scenario("b"), scenario("c"));
        selection.toggle(&a);
        selection.toggle(&b);
        selection.toggle(&c);
        selection.toggle(&b);
        let names: Vec<&str> = selection.all().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_remove_by_id() {
        let mut selection = SelectionSet::default();
        let s = scenario("a");
        selection.toggle(&s);
        assert!(selection.remove(&s.id));
        assert!(!selection.remove(&s.id));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let selection = SelectionSet::load(&dir.path().join("selection.json"));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        let mut selection = SelectionSet::default();
        selection.toggle(&scenario("a"));
        selection.save(&path).unwrap();

        let loaded = SelectionSet::load(&path);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.all()[0].name, "a");
    }
}
