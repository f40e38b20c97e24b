use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Malformed job request, rejected before anything reaches the scheduler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("job id must not be empty")]
    EmptyJobId,
    #[error("url must not be empty")]
    EmptyUrl,
    #[error("http method must not be empty")]
    EmptyHttpMethod,
}

/// Base shape of an HTTP-triggered job as submitted by operators.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpJobRequest {
    /// Globally unique; doubles as the scheduler key and idempotency key.
    /// Enforced non-empty by the normalizer rather than here, because
    /// delayed jobs are keyed by a scheduler-generated id instead.
    pub job_id: String,
    #[validate(length(min = 1, message = "url must not be empty"))]
    pub url: String,
    #[validate(length(min = 1, message = "httpMethod must not be empty"))]
    pub http_method: String,
    /// Arbitrary-shape data, serialized once to a canonical string before
    /// the scheduler stores it.
    pub payload: Option<serde_json::Value>,
    pub headers: HashMap<String, String>,
    pub queue: String,
    pub timeout_in_seconds: Option<u64>,
    pub requires_authentication: bool,
}

impl Default for HttpJobRequest {
    fn default() -> Self {
        Self {
            job_id: String::new(),
            url: String::new(),
            http_method: String::new(),
            payload: None,
            headers: HashMap::new(),
            queue: "default".to_string(),
            timeout_in_seconds: None,
            requires_authentication: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecurringJobRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub job: HttpJobRequest,
    /// Owned and interpreted entirely by the scheduler.
    #[validate(length(min = 1, message = "cronExpression must not be empty"))]
    pub cron_expression: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(rename_all = "camelCase")]
pub struct DelayedJobRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub job: HttpJobRequest,
    /// Time until the single execution fires.
    pub delay_seconds: u64,
}

/// One entry of the declarative job configuration file. Tags and
/// description are observability-only and never affect execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationEntry {
    #[serde(flatten)]
    pub request: RecurringJobRequest,
    #[serde(default = "enabled_by_default")]
    pub is_enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct JobConfigurationFile {
    #[serde(default)]
    pub jobs: Vec<JobConfigurationEntry>,
}

const fn enabled_by_default() -> bool {
    true
}

/// A job request shaped for durable storage: validated, with the payload
/// serialized exactly once into its canonical string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedJob {
    pub job_id: String,
    pub url: String,
    pub http_method: String,
    pub payload: Option<String>,
    pub headers: HashMap<String, String>,
    pub queue: String,
    pub timeout_seconds: Option<u64>,
    pub requires_authentication: bool,
}

impl HttpJobRequest {
    /// Validates and shapes the request for hand-off to the scheduler.
    ///
    /// The canonical payload form is compact JSON with deterministic key
    /// order, so re-execution after a restart is byte-for-byte identical
    /// and independent of in-memory object identity.
    pub fn normalize(&self) -> Result<NormalizedJob, ValidationError> {
        if self.job_id.trim().is_empty() {
            return Err(ValidationError::EmptyJobId);
        }
        if self.url.trim().is_empty() {
            return Err(ValidationError::EmptyUrl);
        }
        if self.http_method.trim().is_empty() {
            return Err(ValidationError::EmptyHttpMethod);
        }

        Ok(NormalizedJob {
            job_id: self.job_id.clone(),
            url: self.url.clone(),
            http_method: self.http_method.clone(),
            payload: canonical_payload(self.payload.as_ref()),
            headers: self.headers.clone(),
            queue: self.queue.clone(),
            timeout_seconds: self.timeout_in_seconds,
            requires_authentication: self.requires_authentication,
        })
    }
}

fn canonical_payload(payload: Option<&serde_json::Value>) -> Option<String> {
    match payload {
        None | Some(serde_json::Value::Null) => None,
        Some(value) => Some(value.to_string()),
    }
}
