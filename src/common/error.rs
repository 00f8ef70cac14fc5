//! Error types for the scenario CLI
//!
//! Remote failures are never fatal: every network error is caught by the
//! caller and recovered through the local fallback path. Only validation
//! errors block the triggering action.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scenario CLI
#[derive(Error, Debug)]
pub enum Error {
    // === Validation Errors ===
    #[error("invalid scenario: {0}")]
    Validation(#[from] ValidationError),

    #[error("No scenarios selected. Use 'scenario select <id>' to choose scenarios to run")]
    EmptySelection,

    // === Remote API Errors ===
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    // === Lookup Errors ===
    #[error("scenario '{id}' not found")]
    NotFound { id: String },

    #[error("no completed run found. Use 'scenario run' first")]
    NoRunHistory,

    // === Execution Errors ===
    #[error("cannot {action} while execution is {state}")]
    InvalidState { action: String, state: String },

    #[error("execution could not be started: {0}")]
    FailedToStart(String),

    // === Parse Errors ===
    #[error("invalid JSON in '{path}': {error}")]
    Parse { path: String, error: String },

    #[error("imported file must contain a JSON array of scenarios")]
    InvalidImport,

    // === Configuration Errors ===
    #[error("invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: &str) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }

    /// Create a not-found error
    pub fn not_found(id: &str) -> Self {
        Self::NotFound { id: id.to_string() }
    }

    /// Create a parse error for a file
    pub fn parse(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}

/// First violated rule for an incomplete scenario, checked in order.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a scenario name is required")]
    MissingName,

    #[error("a category is required")]
    MissingCategory,

    #[error("at least one test step is required")]
    NoSteps,

    #[error("expected results are required")]
    MissingExpectedResults,
}
