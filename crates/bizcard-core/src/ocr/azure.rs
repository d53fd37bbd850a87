//! Azure Document Intelligence client.
//!
//! Submits a document to the prebuilt business card model and polls the
//! returned operation until it settles. All calls are blocking; the
//! pipeline processes one file at a time.

use std::fs;
use std::io::Write;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::analysis::{self, AnalyzeResult};
use crate::error::{AnalyzeError, BizcardError};
use crate::models::AzureConfig;
use crate::ocr::CardAnalyzer;

/// Blocking client for the document analysis REST API.
pub struct AzureCardAnalyzer {
    client: reqwest::blocking::Client,
    endpoint: String,
    key: String,
    model_id: String,
    api_version: String,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl AzureCardAnalyzer {
    /// Build a client from configuration. Fails when the endpoint or key
    /// is missing or the HTTP client cannot be constructed.
    pub fn new(config: &AzureConfig) -> Result<Self, BizcardError> {
        if config.endpoint.is_empty() || config.key.is_empty() {
            return Err(BizcardError::Config(
                "Azure endpoint and key must be configured".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(AnalyzeError::Request)?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            key: config.key.clone(),
            model_id: config.model_id.clone(),
            api_version: config.api_version.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            max_poll_attempts: config.max_poll_attempts,
        })
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/documentintelligence/documentModels/{}:analyze?api-version={}",
            self.endpoint, self.model_id, self.api_version
        )
    }

    /// Submit the document and return the operation URL to poll.
    fn submit(&self, bytes: Vec<u8>) -> Result<String, AnalyzeError> {
        let response = self
            .client
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalyzeError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .headers()
            .get("Operation-Location")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(AnalyzeError::MissingOperation)
    }

    /// Poll the operation until it succeeds or fails, up to the configured
    /// attempt budget.
    fn poll(&self, operation_url: &str) -> Result<AnalyzeResult, AnalyzeError> {
        for attempt in 0..self.max_poll_attempts {
            std::thread::sleep(self.poll_interval);

            let body: Value = self
                .client
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.key)
                .send()?
                .json()
                .map_err(|e| AnalyzeError::Malformed(e.to_string()))?;

            match body.get("status").and_then(Value::as_str).unwrap_or("") {
                "succeeded" => {
                    let raw = body.get("analyzeResult").ok_or_else(|| {
                        AnalyzeError::Malformed("no analyzeResult in response".to_string())
                    })?;
                    return Ok(analysis::parse_analyze_result(raw));
                }
                "failed" => {
                    let message = body
                        .get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(Value::as_str)
                        .unwrap_or("unknown error");
                    return Err(AnalyzeError::Failed(message.to_string()));
                }
                status => debug!(attempt, status, "analysis still running"),
            }
        }

        Err(AnalyzeError::TimedOut)
    }
}

impl CardAnalyzer for AzureCardAnalyzer {
    fn analyze(&self, bytes: &[u8], suffix: &str) -> Result<AnalyzeResult, AnalyzeError> {
        // Stage the upload as a temp file scoped to this one call; it is
        // removed on every exit path when `staged` drops.
        let mut staged = tempfile::Builder::new()
            .suffix(&format!(".{}", suffix))
            .tempfile()?;
        staged.write_all(bytes)?;
        staged.flush()?;

        let body = fs::read(staged.path())?;
        let operation_url = self.submit(body)?;
        debug!(url = %operation_url, "document submitted for analysis");

        self.poll(&operation_url)
    }
}
