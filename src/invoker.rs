use std::{sync::Arc, time::Duration};

use reqwest::header::CONTENT_TYPE;
use thiserror::Error;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{auth::token_cache::TokenCache, auth::AuthProviderError, jobs::requests::NormalizedJob};

/// Outcome classification for a single job invocation.
///
/// `Timeout` carries the effective deadline so "too slow" is
/// distinguishable from "unreachable" (`Transport`) and "rejected"
/// (`Status`). Retrying is the scheduler's responsibility, never ours.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error(transparent)]
    Auth(#[from] AuthProviderError),
    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),
    #[error("request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("request failed: {0}")]
    Transport(reqwest::Error),
    #[error("endpoint returned status {status}")]
    Status { status: u16, body: String },
    #[error("job execution was cancelled")]
    Cancelled,
}

/// Executes one HTTP call for a fully-resolved job, pulling a bearer
/// token from the cache first when the job requires authentication.
pub struct HttpInvoker {
    client: reqwest::Client,
    token_cache: Arc<TokenCache>,
    default_timeout: Duration,
}

impl HttpInvoker {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        token_cache: Arc<TokenCache>,
        default_timeout: Duration,
    ) -> Self {
        Self {
            client,
            token_cache,
            default_timeout,
        }
    }

    /// Runs the call and returns the raw response body.
    ///
    /// The timeout is a hard deadline on the whole call including
    /// connection setup. Cancellation aborts the outbound call promptly.
    pub async fn execute(
        &self,
        job: &NormalizedJob,
        cancel: CancellationToken,
    ) -> Result<String, InvokeError> {
        let timeout_seconds = job.timeout_seconds.unwrap_or(self.default_timeout.as_secs());

        info!(
            job_id = %job.job_id,
            method = %job.http_method,
            url = %job.url,
            "Starting HTTP job"
        );

        let result = self.send(job, timeout_seconds, &cancel).await;

        match &result {
            Ok(_) => {}
            Err(InvokeError::Timeout { seconds }) => {
                error!(
                    job_id = %job.job_id,
                    "HTTP job timed out after {} seconds: {} {}",
                    seconds, job.http_method, job.url
                );
            }
            Err(e) => {
                error!(
                    job_id = %job.job_id,
                    "HTTP job failed: {} {}: {}",
                    job.http_method, job.url, e
                );
            }
        }

        result
    }

    async fn send(
        &self,
        job: &NormalizedJob,
        timeout_seconds: u64,
        cancel: &CancellationToken,
    ) -> Result<String, InvokeError> {
        let method = reqwest::Method::from_bytes(job.http_method.as_bytes())
            .map_err(|_| InvokeError::InvalidMethod(job.http_method.clone()))?;

        let mut request = self.client.request(method, &job.url);

        // Caller-supplied headers pass through verbatim; the bearer token
        // overrides any caller-supplied Authorization value.
        for (name, value) in &job.headers {
            if job.requires_authentication && name.eq_ignore_ascii_case("authorization") {
                continue;
            }
            request = request.header(name, value);
        }

        if job.requires_authentication {
            let token = self.token_cache.get_token().await?;
            request = request.header("Authorization", format!("Bearer {token}"));
            debug!(job_id = %job.job_id, "Authentication token added to request");
        } else {
            debug!(job_id = %job.job_id, "Authentication not required for this request");
        }

        if let Some(payload) = &job.payload {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(payload.clone());
        }

        let send = async {
            let response = request.send().await.map_err(|e| {
                if e.is_timeout() {
                    InvokeError::Timeout {
                        seconds: timeout_seconds,
                    }
                } else {
                    InvokeError::Transport(e)
                }
            })?;

            let status = response.status();
            let body = response.text().await.map_err(InvokeError::Transport)?;

            info!(
                job_id = %job.job_id,
                status = status.as_u16(),
                body = %body,
                "HTTP job completed"
            );

            if !status.is_success() {
                return Err(InvokeError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(body)
        };

        tokio::select! {
            () = cancel.cancelled() => Err(InvokeError::Cancelled),
            outcome = timeout(Duration::from_secs(timeout_seconds), send) => {
                outcome.unwrap_or(Err(InvokeError::Timeout { seconds: timeout_seconds }))
            }
        }
    }
}
