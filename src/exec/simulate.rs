//! Local step-by-step simulation
//!
//! Intentionally nondeterministic: bounded random per-step latency and a
//! fixed per-step failure probability stand in for real automation on
//! demonstration runs. Tests pin the knobs through [`SimulatorConfig`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::common::config::SimulatorConfig;
use crate::model::{ExecutionResult, RunStatus, Scenario};

use super::{EventSink, RunEvent, RunOptions, ScenarioExecutor};

pub struct SimulatedExecutor {
    config: SimulatorConfig,
}

impl SimulatedExecutor {
    pub fn new(config: SimulatorConfig) -> Self {
        Self { config }
    }

    fn roll_step(&self) -> (u64, f64) {
        let min = self.config.step_delay_min_ms;
        let max = self.config.step_delay_max_ms.max(min);
        let mut rng = rand::thread_rng();
        (rng.gen_range(min..=max), rng.gen::<f64>())
    }
}

#[async_trait]
impl ScenarioExecutor for SimulatedExecutor {
    async fn execute(
        &self,
        scenario: &Scenario,
        options: &RunOptions,
        cancel: &AtomicBool,
        sink: &dyn EventSink,
    ) -> ExecutionResult {
        let started = Instant::now();
        let steps = scenario.steps.len();
        let mut cancelled = false;

        for step in &scenario.steps {
            if cancel.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }
            sink.emit(RunEvent::Step {
                order: step.order,
                description: step.description.clone(),
            });

            let (delay_ms, roll) = self.roll_step();
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;

            if roll < self.config.failure_rate {
                return ExecutionResult {
                    scenario_id: scenario.id.clone(),
                    scenario_name: scenario.name.clone(),
                    status: RunStatus::Failed,
                    duration: started.elapsed().as_millis() as u64,
                    timestamp: Utc::now(),
                    steps,
                    error: Some(format!("step {} failed", step.order)),
                    screenshot: None,
                };
            }
        }

        // Capture is skipped once cancellation has been observed so a
        // stop request is not delayed by the capture latency.
        let screenshot = if options.screenshots && !cancelled {
            sink.emit(RunEvent::Screenshot {
                scenario: scenario.name.clone(),
            });
            tokio::time::sleep(Duration::from_millis(self.config.screenshot_delay_ms)).await;
            Some(format!(
                "screenshot_{}_{}.png",
                scenario.id,
                Utc::now().timestamp_millis()
            ))
        } else {
            None
        };

        ExecutionResult {
            scenario_id: scenario.id.clone(),
            scenario_name: scenario.name.clone(),
            status: RunStatus::Success,
            duration: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
            steps,
            error: None,
            screenshot,
        }
    }
}
