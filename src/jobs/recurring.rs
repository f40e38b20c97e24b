use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::JobError;
use crate::app::App;

/// A statically-defined recurring job: business logic compiled into the
/// binary, registered against the scheduler at startup.
#[async_trait]
pub trait RecurringJob: Send + Sync {
    fn job_id(&self) -> &'static str;
    fn cron_expression(&self) -> &'static str;

    fn queue(&self) -> &'static str {
        "default"
    }

    async fn run(&self, app: &App, cancel: CancellationToken) -> Result<(), JobError>;
}

/// Explicit registry of the compiled-in jobs, supplied at startup. Being
/// a plain list keeps the bootstrap reconciliation trivially testable.
pub type JobRegistry = Vec<Arc<dyn RecurringJob>>;

/// Runs a static job with start/success/failure logging, re-raising the
/// error so the scheduler's retry policy can act on it.
pub async fn execute_with_logging(
    job: &dyn RecurringJob,
    app: &App,
    cancel: CancellationToken,
) -> Result<(), JobError> {
    info!("{} started at: {} UTC", job.job_id(), Utc::now().format("%Y-%m-%d %H:%M:%S"));

    match job.run(app, cancel).await {
        Ok(()) => {
            info!(
                "{} completed successfully at: {} UTC",
                job.job_id(),
                Utc::now().format("%Y-%m-%d %H:%M:%S")
            );
            Ok(())
        }
        Err(e) => {
            error!("Error executing {}: {}", job.job_id(), e);
            Err(e)
        }
    }
}
