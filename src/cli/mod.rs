//! CLI command handling
//!
//! The composition root: builds the API client, store, selection, and
//! execution controller from configuration, dispatches commands, and
//! formats output for the console.

mod console;

use colored::Colorize;

pub use console::ConsoleSink;

use crate::api::ApiClient;
use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::exec::{ExecutionController, RunOptions, SimulatedExecutor};
use crate::model::{
    parse_test_data, steps_from_descriptions, Scenario, ScenarioDraft, ScenarioPatch,
};
use crate::report::{self, RunHistory};
use crate::selection::SelectionSet;
use crate::store::{DeleteOutcome, Persistence, ScenarioStore};
use crate::transfer;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    let config = Config::load()?;
    let api = ApiClient::from_config(&config.api)?;
    let data_dir = paths::ensure_data_dir()?;
    let cache_path = data_dir.join(paths::SCENARIOS_FILE);
    let selection_path = data_dir.join(paths::SELECTION_FILE);
    let history_path = data_dir.join(paths::RESULTS_FILE);

    match command {
        Commands::List { category, search } => {
            let mut store = ScenarioStore::new(api, cache_path);
            print_fallback_notice(store.refresh().await);

            let selection = SelectionSet::load(&selection_path);
            let scenarios = store.filtered(search.as_deref(), category);

            if scenarios.is_empty() {
                println!("No scenarios found");
            } else {
                for scenario in scenarios {
                    print_scenario_line(scenario, selection.contains(&scenario.id));
                }
            }
            Ok(())
        }

        Commands::Show { id } => {
            let mut store = ScenarioStore::new(api, cache_path);
            print_fallback_notice(store.refresh().await);

            let scenario = store.get(&id).ok_or_else(|| Error::not_found(&id))?;
            print_scenario_details(scenario);
            Ok(())
        }

        Commands::Create {
            name,
            description,
            category,
            priority,
            steps,
            expected,
            data,
        } => {
            let mut store = ScenarioStore::new(api, cache_path);
            store.refresh().await;

            let draft = ScenarioDraft {
                name,
                description,
                category,
                priority,
                steps: steps_from_descriptions(&steps),
                expected_results: expected,
                test_data: data.as_deref().map(parse_test_data),
            };

            let (scenario, persistence) = store.create(draft).await?;
            match persistence {
                Persistence::Remote => {
                    println!("{} Scenario '{}' saved", "✓".green(), scenario.name)
                }
                Persistence::LocalFallback => println!(
                    "{} Scenario '{}' saved locally (backend unreachable)",
                    "✓".yellow(),
                    scenario.name
                ),
            }
            println!("  id: {}", scenario.id.dimmed());
            Ok(())
        }

        Commands::Edit {
            id,
            name,
            description,
            category,
            priority,
            steps,
            expected,
            data,
        } => {
            let mut store = ScenarioStore::new(api, cache_path);
            store.refresh().await;

            let patch = ScenarioPatch {
                name,
                description,
                category,
                priority,
                steps: if steps.is_empty() {
                    None
                } else {
                    Some(steps_from_descriptions(&steps))
                },
                expected_results: expected,
                test_data: data.as_deref().map(parse_test_data),
            };

            if patch.is_empty() {
                println!("Nothing to change");
                return Ok(());
            }

            let (scenario, persistence) = store.update(&id, patch).await?;
            match persistence {
                Persistence::Remote => {
                    println!("{} Scenario '{}' updated", "✓".green(), scenario.name)
                }
                Persistence::LocalFallback => println!(
                    "{} Scenario '{}' updated locally (backend unreachable)",
                    "✓".yellow(),
                    scenario.name
                ),
            }
            Ok(())
        }

        Commands::Delete { id } => {
            let mut store = ScenarioStore::new(api, cache_path);
            store.refresh().await;
            let mut selection = SelectionSet::load(&selection_path);

            match store.delete(&id, &mut selection).await? {
                DeleteOutcome::Deleted(persistence) => {
                    selection.save(&selection_path)?;
                    match persistence {
                        Persistence::Remote => println!("{} Scenario deleted", "✓".green()),
                        Persistence::LocalFallback => println!(
                            "{} Scenario deleted locally (backend unreachable)",
                            "✓".yellow()
                        ),
                    }
                }
                DeleteOutcome::NotFound => {
                    println!("Scenario '{}' was not found (nothing deleted)", id)
                }
            }
            Ok(())
        }

        Commands::Select { id, clear } => {
            let mut selection = SelectionSet::load(&selection_path);

            if clear {
                selection.clear();
                selection.save(&selection_path)?;
                println!("Selection cleared");
                return Ok(());
            }

            match id {
                Some(id) => {
                    let mut store = ScenarioStore::new(api, cache_path);
                    store.refresh().await;
                    let scenario = store.get(&id).ok_or_else(|| Error::not_found(&id))?;

                    let added = selection.toggle(scenario);
                    selection.save(&selection_path)?;
                    if added {
                        println!(
                            "{} '{}' added to selection ({} selected)",
                            "✓".green(),
                            scenario.name,
                            selection.len()
                        );
                    } else {
                        println!(
                            "'{}' removed from selection ({} selected)",
                            scenario.name,
                            selection.len()
                        );
                    }
                }
                None => {
                    if selection.is_empty() {
                        println!("No scenarios selected");
                    } else {
                        println!("Selected scenarios:");
                        for scenario in selection.all() {
                            print_scenario_line(scenario, true);
                        }
                    }
                }
            }
            Ok(())
        }

        Commands::Run { screenshots } => {
            let selection = SelectionSet::load(&selection_path);

            let controller = ExecutionController::new(
                api.clone(),
                Box::new(SimulatedExecutor::new(config.simulator.clone())),
                Box::new(ConsoleSink::new()),
                config.execution.clone(),
            );

            // Ctrl-C cancels the run at its next checkpoint.
            {
                let controller = controller.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        controller.stop().await;
                    }
                });
            }

            let outcome = controller
                .start(selection.all(), &RunOptions { screenshots })
                .await?;

            let names = selection.all().iter().map(|s| s.name.clone()).collect();
            let run = report::build_run(outcome.execution_id.clone(), names, outcome.results);

            let history = RunHistory::new(api, history_path);
            let persistence = history.persist(&run).await?;

            console::print_summary(&run, outcome.stopped, persistence);
            Ok(())
        }

        Commands::Results { limit } => {
            let history = RunHistory::new(api, history_path);
            let runs = history.fetch().await;

            if runs.is_empty() {
                println!("No runs recorded yet");
                return Ok(());
            }

            let shown = limit.unwrap_or(runs.len());
            for run in runs.iter().take(shown) {
                let badge = if run.summary.failed > 0 {
                    format!("{}/{} passed", run.summary.success, run.summary.total).red()
                } else {
                    format!("{}/{} passed", run.summary.success, run.summary.total).green()
                };
                println!(
                    "{}  {}  {}",
                    run.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    badge,
                    format!("{:.2}s", run.summary.duration as f64 / 1000.0).dimmed()
                );
                if !run.scenarios.is_empty() {
                    println!("    {}", run.scenarios.join(", ").dimmed());
                }
            }
            Ok(())
        }

        Commands::Export { output } => {
            let mut store = ScenarioStore::new(api, cache_path);
            print_fallback_notice(store.refresh().await);

            let count = transfer::export_scenarios(store.scenarios(), &output)?;
            println!("Exported {} scenario(s) to {}", count, output.display());
            Ok(())
        }

        Commands::Import { path } => {
            let imported = transfer::import_scenarios(&path)?;
            let mut store = ScenarioStore::new(api, cache_path);
            store.refresh().await;

            let count = store.import(imported)?;
            println!("Imported {} scenario(s)", count);
            Ok(())
        }

        Commands::Report { output } => {
            let history = RunHistory::new(api, history_path);
            let latest = history
                .fetch()
                .await
                .into_iter()
                .next()
                .ok_or(Error::NoRunHistory)?;

            let document = transfer::ResultsReport {
                timestamp: latest.timestamp,
                summary: latest.summary,
                results: latest.results,
            };
            transfer::export_report(&document, &output)?;
            println!("Report written to {}", output.display());
            Ok(())
        }
    }
}

fn print_fallback_notice(persistence: Persistence) {
    if persistence == Persistence::LocalFallback {
        println!(
            "{}",
            "(backend unreachable, showing local data)".yellow().dimmed()
        );
    }
}

fn print_scenario_line(scenario: &Scenario, selected: bool) {
    let mark = if selected { "*" } else { " " };
    println!(
        "{} {} {} ({}, {}, {} steps)",
        mark,
        scenario.id.dimmed(),
        scenario.name.bold(),
        scenario.category,
        scenario.priority,
        scenario.steps.len()
    );
}

fn print_scenario_details(scenario: &Scenario) {
    println!("{}", scenario.name.bold());
    println!("  id: {}", scenario.id.dimmed());
    if !scenario.description.is_empty() {
        println!("  description: {}", scenario.description);
    }
    println!("  category: {}", scenario.category);
    println!("  priority: {}", scenario.priority);
    println!("  steps:");
    for step in &scenario.steps {
        println!("    {}. {}", step.order, step.description);
    }
    println!("  expected results: {}", scenario.expected_results);
    if !scenario.test_data.is_null()
        && scenario.test_data != serde_json::json!({})
    {
        println!(
            "  test data: {}",
            serde_json::to_string(&scenario.test_data).unwrap_or_default()
        );
    }
    println!(
        "  created: {}  modified: {}",
        scenario.created_at.format("%Y-%m-%d %H:%M:%S"),
        scenario.last_modified.format("%Y-%m-%d %H:%M:%S")
    );
}
