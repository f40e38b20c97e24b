pub mod in_memory;
pub mod mock;

use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::jobs::JobError;

/// Type alias for the stored job continuation to reduce type complexity
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
pub type JobCallback =
    Arc<dyn Fn(CancellationToken) -> BoxFuture<'static, Result<(), JobError>> + Send + Sync>;

/// The external scheduler rejected a registration or removal.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },
    #[error("scheduler backend error: {0}")]
    Backend(String),
}

/// A recurring job as visible through the scheduler's API surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredJob {
    pub id: String,
    pub queue: String,
    pub cron_expression: String,
}

/// The external job-scheduling backend, treated as an opaque collaborator.
///
/// The backend owns durable persistence, cron interpretation, retry and
/// backoff, and single-active-worker-per-job execution. This crate only
/// hands it callbacks keyed by job id.
#[async_trait]
pub trait JobScheduler: Send + Sync {
    /// Registers or replaces a recurring job under a stable id.
    async fn add_or_update_recurring(
        &self,
        job_id: &str,
        queue: &str,
        cron_expression: &str,
        callback: JobCallback,
    ) -> Result<(), SchedulerError>;

    /// Schedules a one-shot job after `delay`, returning the generated id.
    async fn schedule_once(
        &self,
        delay: Duration,
        callback: JobCallback,
    ) -> Result<String, SchedulerError>;

    /// Removes a recurring job if present; returns whether it existed.
    async fn remove_if_exists(&self, job_id: &str) -> Result<bool, SchedulerError>;

    /// Lists the currently registered recurring jobs.
    async fn list_recurring(&self) -> Result<Vec<RegisteredJob>, SchedulerError>;
}
