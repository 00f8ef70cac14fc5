//! Wire types for the scenario backend API
//!
//! Every endpoint wraps its payload in a `{success, data?, error?}`
//! envelope, except `POST /execute` which answers flat.

use serde::Deserialize;

use crate::model::{ExecutionResult, RunSummary};

/// Standard response envelope
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `POST /execute`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAck {
    pub success: bool,
    #[serde(default)]
    pub execution_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Remote execution phase reported by the status endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemotePhase {
    Running,
    Completed,
    Failed,
}

impl RemotePhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RemotePhase::Running)
    }
}

/// One incremental log line from a remote execution
#[derive(Debug, Clone, Deserialize)]
pub struct LogLine {
    pub message: String,
}

/// Payload of `GET /execution/{id}/status`
#[derive(Debug, Deserialize)]
pub struct ExecutionStatus {
    /// Completion percentage, 0-100
    pub progress: Option<f64>,
    #[serde(default)]
    pub logs: Vec<LogLine>,
    pub status: RemotePhase,
}

/// Payload of `GET /execution/{id}/results`
#[derive(Debug, Deserialize)]
pub struct ExecutionReport {
    #[serde(default)]
    pub results: Vec<ExecutionResult>,
    #[serde(default)]
    pub summary: Option<RunSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_without_data() {
        let env: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"success": false, "error": "boom"}"#).unwrap();
        assert!(!env.success);
        assert!(env.data.is_none());
        assert_eq!(env.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_execute_ack() {
        let ack: ExecuteAck =
            serde_json::from_str(r#"{"success": true, "executionId": "ex-42"}"#).unwrap();
        assert!(ack.success);
        assert_eq!(ack.execution_id.as_deref(), Some("ex-42"));
    }

    #[test]
    fn test_execution_status_payload() {
        let json = r#"{
            "progress": 50,
            "logs": [{"message": "running scenario 2"}],
            "status": "running"
        }"#;
        let status: ExecutionStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.progress, Some(50.0));
        assert_eq!(status.logs.len(), 1);
        assert!(!status.status.is_terminal());

        let done: ExecutionStatus =
            serde_json::from_str(r#"{"status": "completed"}"#).unwrap();
        assert!(done.status.is_terminal());
        assert!(done.logs.is_empty());
    }
}
