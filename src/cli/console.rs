//! Console rendering for run progress and summaries

use std::sync::Mutex;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use crate::exec::{EventSink, RunEvent};
use crate::model::{ExecutionRun, RunStatus};
use crate::store::Persistence;

/// Event sink that renders run progress with a progress bar and colored
/// step/result lines
pub struct ConsoleSink {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn println(&self, line: String) {
        // Route through the bar while it is visible so lines don't
        // clobber it.
        let bar = self.bar.lock().expect("progress bar lock");
        match bar.as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: RunEvent) {
        match event {
            RunEvent::Started { total, remote } => {
                if remote {
                    println!("{}", "Execution delegated to the backend".cyan());
                } else {
                    println!("{}", "Running local simulation".cyan());
                }
                println!("  {} scenario(s) queued", total);

                let bar = ProgressBar::new(total as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("  [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                        .unwrap()
                        .progress_chars("=> "),
                );
                *self.bar.lock().expect("progress bar lock") = Some(bar);
            }
            RunEvent::Progress { current, name, .. } => {
                let bar = self.bar.lock().expect("progress bar lock");
                if let Some(bar) = bar.as_ref() {
                    bar.set_position(current as u64);
                    if let Some(name) = name {
                        bar.set_message(name);
                    }
                }
            }
            RunEvent::ScenarioStarted { name, index, total } => {
                self.println(format!(
                    "{} {} ({}/{})",
                    "Running:".blue().bold(),
                    name.white().bold(),
                    index + 1,
                    total
                ));
            }
            RunEvent::Step { order, description } => {
                self.println(format!("    {}. {}", order, description.dimmed()));
            }
            RunEvent::Screenshot { scenario } => {
                self.println(format!("    capturing screenshot for {}", scenario.dimmed()));
            }
            RunEvent::Log { message } => {
                self.println(message);
            }
            RunEvent::ScenarioFinished { name, status, error } => match status {
                RunStatus::Success => {
                    self.println(format!("  {} {}", "✓".green(), name));
                }
                RunStatus::Failed => {
                    self.println(format!(
                        "  {} {}: {}",
                        "✗".red(),
                        name,
                        error.unwrap_or_else(|| "failed".to_string())
                    ));
                }
            },
            RunEvent::Finished { stopped } => {
                if let Some(bar) = self.bar.lock().expect("progress bar lock").take() {
                    bar.finish_and_clear();
                }
                if stopped {
                    println!("{}", "Run stopped".yellow().bold());
                }
            }
        }
    }
}

/// Print the summary block for a finished run
pub fn print_summary(run: &ExecutionRun, stopped: bool, persistence: Persistence) {
    if stopped {
        println!("\n{}", "Run stopped early".yellow().bold());
    } else {
        println!("\n{}", "Run completed".green().bold());
    }

    let summary = &run.summary;
    println!(
        "  {} total, {} passed, {} failed",
        summary.total,
        summary.success.to_string().green(),
        summary.failed.to_string().red()
    );
    println!("  success rate: {:.1}%", summary.success_rate);
    println!("  total duration: {:.2}s", summary.duration as f64 / 1000.0);

    for result in &run.results {
        let duration = format!("{:.2}s", result.duration as f64 / 1000.0);
        match result.status {
            RunStatus::Success => {
                let screenshot = result
                    .screenshot
                    .as_ref()
                    .map(|s| format!(" [{s}]"))
                    .unwrap_or_default();
                println!(
                    "  {} {} ({} steps, {}){}",
                    "✓".green(),
                    result.scenario_name,
                    result.steps,
                    duration.dimmed(),
                    screenshot.dimmed()
                );
            }
            RunStatus::Failed => {
                println!(
                    "  {} {} ({} steps, {}): {}",
                    "✗".red(),
                    result.scenario_name,
                    result.steps,
                    duration.dimmed(),
                    result.error.as_deref().unwrap_or("failed")
                );
            }
        }
    }

    match persistence {
        Persistence::Remote => println!("  results saved"),
        Persistence::LocalFallback => {
            println!(
                "  {}",
                "results saved locally (backend unreachable)".yellow()
            )
        }
    }
}
