//! Configuration and data file paths
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/scenario-cli/` and `~/.local/share/scenario-cli/`
//! - macOS: `~/Library/Application Support/scenario-cli/`
//! - Windows: `%APPDATA%\scenario-cli\`

use std::io;
use std::path::PathBuf;

const APP_NAME: &str = "scenario-cli";

/// Local fallback file for the scenario collection
pub const SCENARIOS_FILE: &str = "scenarios.json";
/// Local fallback file for the run history
pub const RESULTS_FILE: &str = "results.json";
/// Persisted selection between CLI invocations
pub const SELECTION_FILE: &str = "selection.json";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the data directory path (fallback files live here)
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Ensure the data directory exists, returning its path
pub fn ensure_data_dir() -> io::Result<PathBuf> {
    let dir = data_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "could not determine data directory")
    })?;
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}
