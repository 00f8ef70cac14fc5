//! Result aggregation and run history
//!
//! Summaries are computed over a run's result set in the order the
//! controller produced it. History writes go to the backend first and
//! fall back to the local history file; reads never trust the source
//! ordering and always re-sort most-recent-first.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use crate::api::ApiClient;
use crate::common::Result;
use crate::model::{ExecutionResult, ExecutionRun, RunStatus, RunSummary};
use crate::store::Persistence;

/// Compute summary statistics over one run's result set
pub fn summarize(results: &[ExecutionResult]) -> RunSummary {
    let total = results.len();
    let success = results
        .iter()
        .filter(|r| r.status == RunStatus::Success)
        .count();
    let failed = total - success;
    let success_rate = if total == 0 {
        0.0
    } else {
        (success as f64 / total as f64 * 1000.0).round() / 10.0
    };
    let duration = results.iter().map(|r| r.duration).sum();

    RunSummary {
        total,
        success,
        failed,
        success_rate,
        duration,
    }
}

/// Build a run record from a finished execution
pub fn build_run(
    execution_id: Option<String>,
    scenario_names: Vec<String>,
    results: Vec<ExecutionResult>,
) -> ExecutionRun {
    let summary = summarize(&results);
    ExecutionRun {
        id: execution_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        timestamp: Utc::now(),
        scenarios: scenario_names,
        results,
        summary,
    }
}

/// Persisted run history with a local fallback file
pub struct RunHistory {
    api: ApiClient,
    path: PathBuf,
}

impl RunHistory {
    pub fn new(api: ApiClient, path: impl Into<PathBuf>) -> Self {
        Self {
            api,
            path: path.into(),
        }
    }

    /// Save a completed run, prepending to the local history file when the
    /// backend is unreachable
    pub async fn persist(&self, run: &ExecutionRun) -> Result<Persistence> {
        match self.api.save_run(run).await {
            Ok(()) => Ok(Persistence::Remote),
            Err(e) => {
                warn!("could not save the run to the backend, saving locally: {e}");
                let mut runs = self.read_local();
                runs.insert(0, run.clone());
                self.write_local(&runs)?;
                Ok(Persistence::LocalFallback)
            }
        }
    }

    /// Fetch saved runs, most recent first
    pub async fn fetch(&self) -> Vec<ExecutionRun> {
        let mut runs = match self.api.fetch_runs().await {
            Ok(runs) => runs,
            Err(e) => {
                warn!("could not fetch run history from the backend, using local data: {e}");
                self.read_local()
            }
        };
        runs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        runs
    }

    fn read_local(&self) -> Vec<ExecutionRun> {
        read_history(&self.path)
    }

    fn write_local(&self, runs: &[ExecutionRun]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(runs)?)?;
        Ok(())
    }
}

fn read_history(path: &Path) -> Vec<ExecutionRun> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    match serde_json::from_str(&content) {
        Ok(runs) => runs,
        Err(e) => {
            warn!("discarding corrupt run history: {e}");
            Vec::new()
        }
    }
}
