//! Execution of selected scenarios
//!
//! The controller delegates a run to the backend and polls it, or falls
//! back to a local step-by-step simulation. Progress is pushed through
//! the [`EventSink`] trait so the core stays independent of any
//! particular rendering.

pub mod controller;
pub mod simulate;

use std::sync::atomic::AtomicBool;

use async_trait::async_trait;

use crate::model::{ExecutionResult, RunStatus, Scenario};

pub use controller::{ExecutionController, RunMode, RunOutcome, RunState};
pub use simulate::SimulatedExecutor;

/// Options for one run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Capture a simulated screenshot after each passing scenario
    pub screenshots: bool,
}

/// Progress notifications emitted while a run is in flight
#[derive(Debug, Clone)]
pub enum RunEvent {
    Started {
        total: usize,
        remote: bool,
    },
    Progress {
        current: usize,
        total: usize,
        name: Option<String>,
    },
    ScenarioStarted {
        index: usize,
        total: usize,
        name: String,
    },
    Step {
        order: u32,
        description: String,
    },
    Screenshot {
        scenario: String,
    },
    Log {
        message: String,
    },
    ScenarioFinished {
        name: String,
        status: RunStatus,
        error: Option<String>,
    },
    Finished {
        stopped: bool,
    },
}

/// Sink for run events; the UI layer subscribes by implementing this
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RunEvent);
}

/// Sink that drops every event
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: RunEvent) {}
}

/// Executes a single scenario.
///
/// The default implementation is the simulator; a real automation backend
/// plugs in at this seam. Implementations check the cancellation flag
/// before each step and never start work past it.
#[async_trait]
pub trait ScenarioExecutor: Send + Sync {
    async fn execute(
        &self,
        scenario: &Scenario,
        options: &RunOptions,
        cancel: &AtomicBool,
        sink: &dyn EventSink,
    ) -> ExecutionResult;
}
