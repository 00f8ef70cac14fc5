//! Scenario and execution result data model

mod result;
mod scenario;

pub use result::{ExecutionRun, ExecutionResult, RunStatus, RunSummary};
pub use scenario::{
    normalize_steps, parse_test_data, steps_from_descriptions, Category, Priority, Scenario,
    ScenarioDraft, ScenarioPatch, Step,
};
