//! End-to-end tests for the offline workflow
//!
//! Every test points the API client at a port nothing listens on, so all
//! network calls fail fast and the local fallback paths carry the whole
//! flow: create, select, run, aggregate, history, export/import.

use std::time::Duration;

use scenario::api::ApiClient;
use scenario::common::config::{ExecutionConfig, SimulatorConfig};
use scenario::exec::{ExecutionController, NullSink, RunOptions, SimulatedExecutor};
use scenario::model::{steps_from_descriptions, Category, Priority, RunStatus, ScenarioDraft};
use scenario::report::{self, RunHistory};
use scenario::selection::SelectionSet;
use scenario::store::{Persistence, ScenarioStore};
use scenario::transfer;

fn offline_api() -> ApiClient {
    ApiClient::new("http://127.0.0.1:1", Duration::from_millis(250)).unwrap()
}

fn instant_simulator(failure_rate: f64) -> SimulatorConfig {
    SimulatorConfig {
        step_delay_min_ms: 0,
        step_delay_max_ms: 0,
        failure_rate,
        screenshot_delay_ms: 0,
    }
}

fn controller(failure_rate: f64) -> ExecutionController {
    ExecutionController::new(
        offline_api(),
        Box::new(SimulatedExecutor::new(instant_simulator(failure_rate))),
        Box::new(NullSink),
        ExecutionConfig::default(),
    )
}

fn draft(name: &str) -> ScenarioDraft {
    ScenarioDraft {
        name: name.to_string(),
        description: format!("{name} end to end"),
        category: Some(Category::Login),
        priority: Some(Priority::High),
        steps: steps_from_descriptions(&["open page", "fill form", "submit"]),
        expected_results: "it works".to_string(),
        test_data: Some(serde_json::json!({"user": "demo"})),
    }
}

#[tokio::test]
async fn offline_end_to_end_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let cache_path = dir.path().join("scenarios.json");
    let selection_path = dir.path().join("selection.json");
    let history_path = dir.path().join("results.json");

    // Create falls back to the local cache file when the backend is down.
    let mut store = ScenarioStore::new(offline_api(), cache_path.clone());
    let (login, persistence) = store.create(draft("Login")).await.unwrap();
    assert_eq!(persistence, Persistence::LocalFallback);
    let (checkout, _) = store.create(draft("Checkout")).await.unwrap();

    // Select both; the selection survives a save/load cycle like two CLI
    // invocations.
    let mut selection = SelectionSet::default();
    selection.toggle(&login);
    selection.toggle(&checkout);
    selection.save(&selection_path).unwrap();
    let selection = SelectionSet::load(&selection_path);
    assert_eq!(selection.len(), 2);

    // Remote delegation fails, the local simulation runs the selection in
    // order.
    let outcome = controller(0.0)
        .start(selection.all(), &RunOptions { screenshots: true })
        .await
        .unwrap();
    assert!(!outcome.stopped);
    assert_eq!(outcome.results.len(), 2);
    assert_eq!(outcome.results[0].scenario_name, "Login");
    assert_eq!(outcome.results[1].scenario_name, "Checkout");
    assert!(outcome
        .results
        .iter()
        .all(|r| r.status == RunStatus::Success && r.screenshot.is_some()));

    // Aggregate and persist the run history locally.
    let names = selection.all().iter().map(|s| s.name.clone()).collect();
    let run = report::build_run(outcome.execution_id.clone(), names, outcome.results);
    assert_eq!(run.summary.total, 2);
    assert_eq!(run.summary.success, 2);
    assert_eq!(run.summary.success_rate, 100.0);

    let history = RunHistory::new(offline_api(), history_path);
    assert_eq!(
        history.persist(&run).await.unwrap(),
        Persistence::LocalFallback
    );
    let runs = history.fetch().await;
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, run.id);

    // Export/import round-trips the collection.
    let export_path = dir.path().join("export.json");
    assert_eq!(
        transfer::export_scenarios(store.scenarios(), &export_path).unwrap(),
        2
    );
    let imported = transfer::import_scenarios(&export_path).unwrap();
    assert_eq!(imported.len(), 2);
    assert_eq!(imported[0].name, "Login");

    // Deleting a selected scenario removes it from both store and
    // selection.
    let mut selection = SelectionSet::load(&selection_path);
    store.delete(&login.id, &mut selection).await.unwrap();
    assert!(store.get(&login.id).is_none());
    assert!(!selection.contains(&login.id));
}

#[tokio::test]
async fn failing_steps_are_reported_per_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ScenarioStore::new(offline_api(), dir.path().join("scenarios.json"));
    let (scenario, _) = store.create(draft("Flaky")).await.unwrap();

    let outcome = controller(1.0)
        .start(&[scenario], &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.results.len(), 1);
    let result = &outcome.results[0];
    assert_eq!(result.status, RunStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("step 1 failed"));
    assert!(result.screenshot.is_none());

    let summary = report::summarize(&outcome.results);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.success_rate, 0.0);
}

#[tokio::test]
async fn report_export_writes_camel_case_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = ScenarioStore::new(offline_api(), dir.path().join("scenarios.json"));
    let (scenario, _) = store.create(draft("Reported")).await.unwrap();

    let outcome = controller(0.0)
        .start(&[scenario.clone()], &RunOptions::default())
        .await
        .unwrap();
    let run = report::build_run(None, vec![scenario.name.clone()], outcome.results);

    let path = dir.path().join("report.json");
    transfer::export_report(
        &transfer::ResultsReport {
            timestamp: run.timestamp,
            summary: run.summary.clone(),
            results: run.results.clone(),
        },
        &path,
    )
    .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert!(value.get("timestamp").is_some());
    assert_eq!(value["summary"]["total"], serde_json::json!(1));
    assert!(value["summary"].get("successRate").is_some());
    assert_eq!(value["results"][0]["scenarioName"], "Reported");
}
