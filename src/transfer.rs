//! JSON import/export of scenario collections and result reports

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Error, Result};
use crate::model::{ExecutionResult, RunSummary, Scenario};

/// Exported report for one run
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub timestamp: DateTime<Utc>,
    pub summary: RunSummary,
    pub results: Vec<ExecutionResult>,
}

/// Write the scenario collection as a pretty-printed JSON array,
/// returning how many records were exported
pub fn export_scenarios(scenarios: &[Scenario], path: &Path) -> Result<usize> {
    write_json(path, &scenarios)?;
    Ok(scenarios.len())
}

/// Read a JSON array of scenario records.
///
/// Anything other than an array of well-formed records rejects the whole
/// import.
pub fn import_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        error: e.to_string(),
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|e| Error::parse(path, e))?;
    if !value.is_array() {
        return Err(Error::InvalidImport);
    }
    serde_json::from_value(value).map_err(|e| Error::parse(path, e))
}

/// Write a results report for one run
pub fn export_report(report: &ResultsReport, path: &Path) -> Result<()> {
    write_json(path, report)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{steps_from_descriptions, Category, ScenarioDraft};

    fn scenario(name: &str) -> Scenario {
        ScenarioDraft {
            name: name.to_string(),
            category: Some(Category::Security),
            steps: steps_from_descriptions(&["probe", "verify"]),
            expected_results: "denied".to_string(),
            ..Default::default()
        }
        .into_scenario(Utc::now())
        .unwrap()
    }

    #[test]
    fn test_export_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scenarios.json");
        let scenarios = vec![scenario("a"), scenario("b")];

        let count = export_scenarios(&scenarios, &path).unwrap();
        assert_eq!(count, 2);

        let imported = import_scenarios(&path).unwrap();
        assert_eq!(imported, scenarios);
    }

    #[test]
    fn test_import_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"name": "not a collection"}"#).unwrap();

        let err = import_scenarios(&path).unwrap_err();
        assert!(matches!(err, Error::InvalidImport));
    }

    #[test]
    fn test_import_rejects_malformed_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"[{"name": "missing everything"}]"#).unwrap();

        let err = import_scenarios(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json at all").unwrap();

        let err = import_scenarios(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
