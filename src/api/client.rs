//! HTTP client for the scenario backend
//!
//! Callers treat every error from this client as recoverable: the store
//! and the results aggregator fall back to local files, the execution
//! controller falls back to local simulation.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::common::config::ApiConfig;
use crate::common::{Error, Result};
use crate::model::{ExecutionRun, Scenario};

use super::types::{Envelope, ExecuteAck, ExecutionReport, ExecutionStatus};

/// Client for the scenario backend REST API
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        if path.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Fetch all scenarios
    pub async fn list_scenarios(&self) -> Result<Vec<Scenario>> {
        let envelope: Envelope<Vec<Scenario>> = self.get_json("").await?;
        if envelope.success {
            Ok(envelope.data.unwrap_or_default())
        } else {
            Err(api_error(envelope.error, "listing scenarios"))
        }
    }

    /// Create a scenario
    pub async fn create_scenario(&self, scenario: &Scenario) -> Result<()> {
        let response = self.http.post(self.url("")).json(scenario).send().await?;
        check_ack(response).await
    }

    /// Full replace of an existing scenario
    pub async fn update_scenario(&self, scenario: &Scenario) -> Result<()> {
        let response = self
            .http
            .put(self.url(&scenario.id))
            .json(scenario)
            .send()
            .await?;
        check_ack(response).await
    }

    /// Delete a scenario
    pub async fn delete_scenario(&self, id: &str) -> Result<()> {
        let response = self.http.delete(self.url(id)).send().await?;
        check_ack(response).await
    }

    /// Delegate execution of the given scenario ids, returning the opaque
    /// execution id assigned by the server
    pub async fn start_execution(&self, scenario_ids: &[String]) -> Result<String> {
        let response = self
            .http
            .post(self.url("execute"))
            .json(&json!({ "scenarioIds": scenario_ids }))
            .send()
            .await?
            .error_for_status()?;
        let ack: ExecuteAck = response.json().await?;
        if !ack.success {
            return Err(api_error(ack.error, "starting execution"));
        }
        ack.execution_id
            .ok_or_else(|| Error::Api("execute response missing executionId".to_string()))
    }

    /// Poll the status of a delegated execution
    pub async fn execution_status(&self, execution_id: &str) -> Result<ExecutionStatus> {
        let envelope: Envelope<ExecutionStatus> = self
            .get_json(&format!("execution/{execution_id}/status"))
            .await?;
        expect_data(envelope, "execution status")
    }

    /// Fetch the final results of a delegated execution
    pub async fn execution_results(&self, execution_id: &str) -> Result<ExecutionReport> {
        let envelope: Envelope<ExecutionReport> = self
            .get_json(&format!("execution/{execution_id}/results"))
            .await?;
        expect_data(envelope, "execution results")
    }

    /// Ask the server to cancel a delegated execution
    pub async fn stop_execution(&self, execution_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("execution/{execution_id}/stop")))
            .send()
            .await?;
        check_ack(response).await
    }

    /// Persist a completed run
    pub async fn save_run(&self, run: &ExecutionRun) -> Result<()> {
        let response = self.http.post(self.url("results")).json(run).send().await?;
        check_ack(response).await
    }

    /// Fetch the saved run history
    pub async fn fetch_runs(&self) -> Result<Vec<ExecutionRun>> {
        let envelope: Envelope<Vec<ExecutionRun>> = self.get_json("results").await?;
        if envelope.success {
            Ok(envelope.data.unwrap_or_default())
        } else {
            Err(api_error(envelope.error, "fetching run history"))
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

fn api_error(error: Option<String>, context: &str) -> Error {
    Error::Api(error.unwrap_or_else(|| format!("{context} failed")))
}

fn expect_data<T>(envelope: Envelope<T>, context: &str) -> Result<T> {
    if !envelope.success {
        return Err(api_error(envelope.error, context));
    }
    envelope
        .data
        .ok_or_else(|| Error::Api(format!("{context}: response missing data")))
}

async fn check_ack(response: reqwest::Response) -> Result<()> {
    let envelope: Envelope<serde_json::Value> =
        response.error_for_status()?.json().await?;
    if envelope.success {
        Ok(())
    } else {
        Err(api_error(envelope.error, "request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:8080/api/test-scenarios/", Duration::from_secs(1))
            .unwrap()
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = client();
        assert_eq!(client.url(""), "http://localhost:8080/api/test-scenarios");
        assert_eq!(
            client.url("execute"),
            "http://localhost:8080/api/test-scenarios/execute"
        );
        assert_eq!(
            client.url("execution/ex-1/status"),
            "http://localhost:8080/api/test-scenarios/execution/ex-1/status"
        );
    }
}
