//! Scenario records, drafts, and validation
//!
//! Field names serialize as camelCase to match both the backend wire
//! format and the local fallback files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::ValidationError;

/// Scenario category, a fixed enumerated set
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Login,
    Ui,
    Api,
    Security,
    Performance,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::Login => "login",
            Category::Ui => "ui",
            Category::Api => "api",
            Category::Security => "security",
            Category::Performance => "performance",
        };
        write!(f, "{}", name)
    }
}

/// Scenario priority
///
/// An absent priority never blocks saving; drafts default to medium.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        write!(f, "{}", name)
    }
}

/// One ordered instruction within a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position within the scenario
    pub order: u32,
    pub description: String,
}

/// A named, ordered test case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    #[serde(default)]
    pub priority: Priority,
    pub steps: Vec<Step>,
    pub expected_results: String,
    #[serde(default = "empty_test_data")]
    pub test_data: Value,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

fn empty_test_data() -> Value {
    Value::Object(Default::default())
}

/// Candidate scenario before it is persisted
#[derive(Debug, Clone, Default)]
pub struct ScenarioDraft {
    pub name: String,
    pub description: String,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub steps: Vec<Step>,
    pub expected_results: String,
    pub test_data: Option<Value>,
}

impl ScenarioDraft {
    /// Check the draft for completeness, returning the first violated rule
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.category.is_none() {
            return Err(ValidationError::MissingCategory);
        }
        if normalized_count(&self.steps) == 0 {
            return Err(ValidationError::NoSteps);
        }
        if self.expected_results.trim().is_empty() {
            return Err(ValidationError::MissingExpectedResults);
        }
        Ok(())
    }

    /// Validate and turn the draft into a full record with a generated id
    /// and creation timestamps
    pub fn into_scenario(self, now: DateTime<Utc>) -> Result<Scenario, ValidationError> {
        self.validate()?;
        let category = self.category.ok_or(ValidationError::MissingCategory)?;
        Ok(Scenario {
            id: uuid::Uuid::new_v4().to_string(),
            name: self.name,
            description: self.description,
            category,
            priority: self.priority.unwrap_or_default(),
            steps: normalize_steps(self.steps),
            expected_results: self.expected_results,
            test_data: self.test_data.unwrap_or_else(empty_test_data),
            created_at: now,
            last_modified: now,
        })
    }
}

/// Partial update merged over an existing scenario; absent fields are
/// preserved
#[derive(Debug, Clone, Default)]
pub struct ScenarioPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub steps: Option<Vec<Step>>,
    pub expected_results: Option<String>,
    pub test_data: Option<Value>,
}

impl ScenarioPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.steps.is_none()
            && self.expected_results.is_none()
            && self.test_data.is_none()
    }
}

impl Scenario {
    /// Apply a patch, renumber steps, and stamp `lastModified`
    pub fn merged(&self, patch: ScenarioPatch, now: DateTime<Utc>) -> Scenario {
        Scenario {
            id: self.id.clone(),
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            description: patch.description.unwrap_or_else(|| self.description.clone()),
            category: patch.category.unwrap_or(self.category),
            priority: patch.priority.unwrap_or(self.priority),
            steps: normalize_steps(patch.steps.unwrap_or_else(|| self.steps.clone())),
            expected_results: patch
                .expected_results
                .unwrap_or_else(|| self.expected_results.clone()),
            test_data: patch.test_data.unwrap_or_else(|| self.test_data.clone()),
            created_at: self.created_at,
            last_modified: now,
        }
    }

    /// Re-check completeness of a merged record before persisting.
    /// Category is inherently present on a typed record, so only the
    /// remaining rules apply.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.steps.is_empty() {
            return Err(ValidationError::NoSteps);
        }
        if self.expected_results.trim().is_empty() {
            return Err(ValidationError::MissingExpectedResults);
        }
        Ok(())
    }
}

/// Drop blank steps and renumber the remainder densely from 1
pub fn normalize_steps(steps: Vec<Step>) -> Vec<Step> {
    steps
        .into_iter()
        .filter(|s| !s.description.trim().is_empty())
        .enumerate()
        .map(|(i, s)| Step {
            order: i as u32 + 1,
            description: s.description.trim().to_string(),
        })
        .collect()
}

fn normalized_count(steps: &[Step]) -> usize {
    steps
        .iter()
        .filter(|s| !s.description.trim().is_empty())
        .count()
}

/// Build an ordered step sequence from plain descriptions
pub fn steps_from_descriptions<S: AsRef<str>>(descriptions: &[S]) -> Vec<Step> {
    normalize_steps(
        descriptions
            .iter()
            .map(|d| Step {
                order: 0,
                description: d.as_ref().to_string(),
            })
            .collect(),
    )
}

/// Parse freeform test data input, defaulting to an empty mapping when the
/// input is blank or not valid JSON (surfaced as a warning, never an error)
pub fn parse_test_data(input: &str) -> Value {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return empty_test_data();
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("test data is not valid JSON, using an empty object: {e}");
            empty_test_data()
        }
    }
}
