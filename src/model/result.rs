//! Execution result and run history types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal outcome of one scenario execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Result of executing a single scenario
///
/// `scenario_name` is a snapshot taken at execution time so the result
/// survives later edits or deletion of the scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub scenario_id: String,
    pub scenario_name: String,
    pub status: RunStatus,
    /// Wall-clock duration in milliseconds
    pub duration: u64,
    pub timestamp: DateTime<Utc>,
    /// Number of steps in the scenario at execution time
    pub steps: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

/// Summary statistics over one run's result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// Percentage rounded to one decimal; 0.0 for an empty run
    pub success_rate: f64,
    /// Sum of all result durations in milliseconds
    pub duration: u64,
}

/// One completed invocation of the execution controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRun {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Names of the scenarios that were selected for this run
    pub scenarios: Vec<String>,
    pub results: Vec<ExecutionResult>,
    pub summary: RunSummary,
}
