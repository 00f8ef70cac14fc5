//! Configuration file handling

use serde::Deserialize;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Execution settings
    #[serde(default)]
    pub execution: ExecutionConfig,

    /// Local simulation settings
    #[serde(default)]
    pub simulator: SimulatorConfig,
}

/// Remote API settings
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the scenario backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for individual API requests
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api/test-scenarios".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

/// Execution settings
#[derive(Debug, Deserialize, Clone)]
pub struct ExecutionConfig {
    /// Interval between status polls of a remote execution
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Fall back to local simulation when remote delegation fails
    #[serde(default = "default_local_fallback")]
    pub local_fallback: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            local_fallback: default_local_fallback(),
        }
    }
}

fn default_poll_interval() -> u64 {
    2000
}

fn default_local_fallback() -> bool {
    true
}

/// Local simulation settings
///
/// The simulator is intentionally nondeterministic for demonstration runs;
/// tests pin `failure_rate` and zero the delays.
#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    /// Lower bound of the simulated per-step latency
    #[serde(default = "default_step_delay_min")]
    pub step_delay_min_ms: u64,

    /// Upper bound of the simulated per-step latency
    #[serde(default = "default_step_delay_max")]
    pub step_delay_max_ms: u64,

    /// Per-step failure probability, 0.0..=1.0
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,

    /// Simulated screenshot capture delay
    #[serde(default = "default_screenshot_delay")]
    pub screenshot_delay_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            step_delay_min_ms: default_step_delay_min(),
            step_delay_max_ms: default_step_delay_max(),
            failure_rate: default_failure_rate(),
            screenshot_delay_ms: default_screenshot_delay(),
        }
    }
}

fn default_step_delay_min() -> u64 {
    1000
}
fn default_step_delay_max() -> u64 {
    3000
}
fn default_failure_rate() -> f64 {
    0.1
}
fn default_screenshot_delay() -> u64 {
    500
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    super::Error::FileRead {
                        path: path.display().to_string(),
                        error: e.to_string(),
                    }
                })?;
                return toml::from_str(&content)
                    .map_err(|e| super::Error::ConfigParse(e.to_string()));
            }
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8080/api/test-scenarios");
        assert_eq!(config.execution.poll_interval_ms, 2000);
        assert!(config.execution.local_fallback);
        assert_eq!(config.simulator.failure_rate, 0.1);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [api]
            base_url = "http://example.test/scenarios"

            [simulator]
            failure_rate = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "http://example.test/scenarios");
        assert_eq!(config.api.request_timeout_secs, 10);
        assert_eq!(config.simulator.failure_rate, 0.5);
        assert_eq!(config.simulator.step_delay_min_ms, 1000);
    }
}
