use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tracing::info;

use crate::{
    invoker::HttpInvoker,
    jobs::{
        requests::{DelayedJobRequest, NormalizedJob, RecurringJobRequest, ValidationError},
        JobError,
    },
    scheduler::{JobCallback, JobScheduler, SchedulerError},
};

#[derive(Debug, Error)]
pub enum JobServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// Facade over the normalizer and the external scheduler, used by the
/// HTTP API and the registration bootstrap.
#[derive(Clone)]
pub struct JobService {
    scheduler: Arc<dyn JobScheduler>,
    invoker: Arc<HttpInvoker>,
}

impl JobService {
    #[must_use]
    pub fn new(scheduler: Arc<dyn JobScheduler>, invoker: Arc<HttpInvoker>) -> Self {
        Self { scheduler, invoker }
    }

    /// Validates, normalizes, and registers a recurring HTTP job. The
    /// scheduler stores the callback closed over the normalized request.
    pub async fn create_recurring(&self, request: RecurringJobRequest) -> Result<(), JobServiceError> {
        let normalized = request.job.normalize()?;

        info!(
            "Creating recurring HTTP job '{}': {} {} (auth required: {})",
            normalized.job_id, normalized.http_method, normalized.url,
            normalized.requires_authentication
        );

        let callback = self.callback(normalized.clone());
        self.scheduler
            .add_or_update_recurring(
                &normalized.job_id,
                &normalized.queue,
                &request.cron_expression,
                callback,
            )
            .await?;

        info!("Created recurring HTTP job: {}", normalized.job_id);
        Ok(())
    }

    /// Schedules a one-shot HTTP job, returning the scheduler-generated id.
    pub async fn create_delayed(&self, request: DelayedJobRequest) -> Result<String, JobServiceError> {
        let mut job = request.job;
        // Delayed jobs are keyed by the scheduler's generated id; the
        // request's own id is only a display label, so fill one in when
        // the caller left it out.
        if job.job_id.trim().is_empty() {
            job.job_id = format!("delayed-{}", uuid::Uuid::new_v4());
        }

        let normalized = job.normalize()?;
        let callback = self.callback(normalized);
        let job_id = self
            .scheduler
            .schedule_once(Duration::from_secs(request.delay_seconds), callback)
            .await?;

        info!("Created delayed HTTP job with scheduler id: {}", job_id);
        Ok(job_id)
    }

    /// Removes a recurring job; returns whether it existed.
    pub async fn delete_job(&self, job_id: &str) -> Result<bool, SchedulerError> {
        let existed = self.scheduler.remove_if_exists(job_id).await?;
        if existed {
            info!("Deleted recurring job: {}", job_id);
        }
        Ok(existed)
    }

    pub async fn job_exists(&self, job_id: &str) -> Result<bool, SchedulerError> {
        let jobs = self.scheduler.list_recurring().await?;
        Ok(jobs.iter().any(|job| job.id == job_id))
    }

    /// Snapshot of the scheduler's registered recurring jobs.
    pub async fn registered_jobs(&self) -> Result<Vec<crate::scheduler::RegisteredJob>, SchedulerError> {
        self.scheduler.list_recurring().await
    }

    /// Registers a pre-built callback directly, used for the compiled-in
    /// jobs whose business logic is not an HTTP invocation.
    pub(crate) async fn register_callback(
        &self,
        job_id: &str,
        queue: &str,
        cron_expression: &str,
        callback: JobCallback,
    ) -> Result<(), SchedulerError> {
        self.scheduler
            .add_or_update_recurring(job_id, queue, cron_expression, callback)
            .await
    }

    fn callback(&self, job: NormalizedJob) -> JobCallback {
        let invoker = self.invoker.clone();
        Arc::new(move |cancel| {
            let invoker = invoker.clone();
            let job = job.clone();
            Box::pin(async move {
                invoker
                    .execute(&job, cancel)
                    .await
                    .map(|_| ())
                    .map_err(JobError::from)
            })
        })
    }
}
