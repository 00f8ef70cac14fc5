//! Execution controller state machine
//!
//! Idle -> Requested -> Running(remote | local) -> Completed | Stopped |
//! FailedToStart. One run at a time; a second `start` while a run is in
//! flight is rejected. Cancellation is cooperative: the flag is checked
//! before each scenario, before each step, and between status polls, and
//! the polling loop always exits through a state transition so no timer
//! outlives the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::warn;

use crate::api::ApiClient;
use crate::common::config::ExecutionConfig;
use crate::common::{Error, Result};
use crate::model::{ExecutionResult, Scenario};

use super::{EventSink, RunEvent, RunOptions, ScenarioExecutor};

/// Lifecycle of one controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Requested,
    Running(RunMode),
    Completed,
    Stopped,
    FailedToStart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Delegated to the backend; polled until a terminal status
    Remote { execution_id: String },
    /// Local step-by-step simulation
    Local,
}

/// Everything a finished `start` hands to result aggregation
#[derive(Debug)]
pub struct RunOutcome {
    /// Per-scenario results in selection order (or server order for a
    /// remote run)
    pub results: Vec<ExecutionResult>,
    pub stopped: bool,
    pub execution_id: Option<String>,
}

#[derive(Clone)]
pub struct ExecutionController {
    inner: Arc<Inner>,
}

struct Inner {
    api: ApiClient,
    executor: Box<dyn ScenarioExecutor>,
    sink: Box<dyn EventSink>,
    config: ExecutionConfig,
    state: Mutex<RunState>,
    cancel: AtomicBool,
}

impl ExecutionController {
    pub fn new(
        api: ApiClient,
        executor: Box<dyn ScenarioExecutor>,
        sink: Box<dyn EventSink>,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                executor,
                sink,
                config,
                state: Mutex::new(RunState::Idle),
                cancel: AtomicBool::new(false),
            }),
        }
    }

    pub fn state(&self) -> RunState {
        self.inner.state.lock().expect("state lock").clone()
    }

    /// Run the given selection to completion.
    ///
    /// Delegates to the backend when possible; on delegation failure runs
    /// the local simulation (unless disabled in configuration, in which
    /// case the delegation error propagates).
    pub async fn start(
        &self,
        selection: &[Scenario],
        options: &RunOptions,
    ) -> Result<RunOutcome> {
        if selection.is_empty() {
            return Err(Error::EmptySelection);
        }
        {
            let mut state = self.inner.state.lock().expect("state lock");
            if matches!(*state, RunState::Requested | RunState::Running(_)) {
                return Err(Error::invalid_state("start", state_name(&state)));
            }
            *state = RunState::Requested;
        }
        self.inner.cancel.store(false, Ordering::SeqCst);

        let ids: Vec<String> = selection.iter().map(|s| s.id.clone()).collect();
        match self.inner.api.start_execution(&ids).await {
            Ok(execution_id) => {
                self.set_state(RunState::Running(RunMode::Remote {
                    execution_id: execution_id.clone(),
                }));
                self.inner.sink.emit(RunEvent::Started {
                    total: selection.len(),
                    remote: true,
                });
                self.poll_remote(execution_id, selection.len()).await
            }
            Err(e) if self.inner.config.local_fallback => {
                warn!("could not delegate execution to the backend, running local simulation: {e}");
                self.set_state(RunState::Running(RunMode::Local));
                self.inner.sink.emit(RunEvent::Started {
                    total: selection.len(),
                    remote: false,
                });
                Ok(self.run_local(selection, options).await)
            }
            Err(e) => {
                self.set_state(RunState::FailedToStart);
                Err(Error::FailedToStart(e.to_string()))
            }
        }
    }

    /// Cancel the run in flight. No-op unless Running.
    ///
    /// In remote mode the backend is notified but the local transition to
    /// Stopped happens regardless of its answer. In local mode the
    /// simulation loop observes the flag at its next checkpoint.
    pub async fn stop(&self) {
        let mode = {
            let state = self.inner.state.lock().expect("state lock");
            match &*state {
                RunState::Running(mode) => Some(mode.clone()),
                _ => None,
            }
        };
        let Some(mode) = mode else {
            return;
        };

        if let RunMode::Remote { execution_id } = &mode {
            if let Err(e) = self.inner.api.stop_execution(execution_id).await {
                warn!("could not notify the backend about the stop: {e}");
            }
            self.set_state(RunState::Stopped);
        }
        self.inner.cancel.store(true, Ordering::SeqCst);
    }

    async fn poll_remote(&self, execution_id: String, total: usize) -> Result<RunOutcome> {
        let interval = Duration::from_millis(self.inner.config.poll_interval_ms);
        loop {
            if self.cancelled() {
                self.set_state(RunState::Stopped);
                self.inner.sink.emit(RunEvent::Finished { stopped: true });
                return Ok(RunOutcome {
                    results: Vec::new(),
                    stopped: true,
                    execution_id: Some(execution_id),
                });
            }

            tokio::time::sleep(interval).await;
            if self.cancelled() {
                continue;
            }

            let status = match self.inner.api.execution_status(&execution_id).await {
                Ok(status) => status,
                Err(e) => {
                    warn!("status poll failed: {e}");
                    continue;
                }
            };

            if let Some(progress) = status.progress {
                let current = ((progress / 100.0) * total as f64).floor() as usize;
                self.inner.sink.emit(RunEvent::Progress {
                    current: current.min(total),
                    total,
                    name: None,
                });
            }
            for line in status.logs {
                self.inner.sink.emit(RunEvent::Log {
                    message: line.message,
                });
            }

            if status.status.is_terminal() {
                let results = match self.inner.api.execution_results(&execution_id).await {
                    Ok(report) => report.results,
                    Err(e) => {
                        warn!("could not fetch final results: {e}");
                        Vec::new()
                    }
                };
                self.set_state(RunState::Completed);
                self.inner.sink.emit(RunEvent::Finished { stopped: false });
                return Ok(RunOutcome {
                    results,
                    stopped: false,
                    execution_id: Some(execution_id),
                });
            }
        }
    }

    async fn run_local(&self, selection: &[Scenario], options: &RunOptions) -> RunOutcome {
        let total = selection.len();
        let mut results = Vec::new();

        for (index, scenario) in selection.iter().enumerate() {
            if self.cancelled() {
                break;
            }
            self.inner.sink.emit(RunEvent::Progress {
                current: index + 1,
                total,
                name: Some(scenario.name.clone()),
            });
            self.inner.sink.emit(RunEvent::ScenarioStarted {
                index,
                total,
                name: scenario.name.clone(),
            });

            let result = self
                .inner
                .executor
                .execute(scenario, options, &self.inner.cancel, self.inner.sink.as_ref())
                .await;

            self.inner.sink.emit(RunEvent::ScenarioFinished {
                name: result.scenario_name.clone(),
                status: result.status,
                error: result.error.clone(),
            });
            results.push(result);
        }

        let stopped = self.cancelled();
        self.set_state(if stopped {
            RunState::Stopped
        } else {
            RunState::Completed
        });
        self.inner.sink.emit(RunEvent::Finished { stopped });

        RunOutcome {
            results,
            stopped,
            execution_id: None,
        }
    }

    fn cancelled(&self) -> bool {
        self.inner.cancel.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: RunState) {
        *self.inner.state.lock().expect("state lock") = state;
    }
}

fn state_name(state: &RunState) -> &'static str {
    match state {
        RunState::Idle => "idle",
        RunState::Requested => "requested",
        RunState::Running(_) => "running",
        RunState::Completed => "completed",
        RunState::Stopped => "stopped",
        RunState::FailedToStart => "failed to start",
    }
}
