use std::sync::Arc;

use tracing::{error, info, warn};

use super::{
    recurring::{execute_with_logging, JobRegistry, RecurringJob},
    requests::JobConfigurationFile,
};
use crate::{app::App, scheduler::JobCallback, scheduler::SchedulerError};

/// Startup reconciliation of the scheduler against the two static
/// sources of truth: the compiled-in job registry and the declarative
/// configuration file.
///
/// Every currently-registered recurring job is removed first, so the
/// registered set after each restart is exactly the union of the two
/// sources. Per-entry configuration failures are logged and skipped.
pub async fn register_startup_jobs(app: &App, registry: &JobRegistry) -> Result<(), SchedulerError> {
    let existing = app.jobs.registered_jobs().await?;
    for job in existing {
        app.jobs.delete_job(&job.id).await?;
    }

    for job in registry {
        let callback = static_job_callback(app.clone(), job.clone());
        app.jobs
            .register_callback(job.job_id(), job.queue(), job.cron_expression(), callback)
            .await?;
        info!(
            "Registered static recurring job '{}' ({})",
            job.job_id(),
            job.cron_expression()
        );
    }

    load_jobs_from_configuration(app).await;
    Ok(())
}

fn static_job_callback(app: App, job: Arc<dyn RecurringJob>) -> JobCallback {
    Arc::new(move |cancel| {
        let app = app.clone();
        let job = job.clone();
        Box::pin(async move { execute_with_logging(job.as_ref(), &app, cancel).await })
    })
}

async fn load_jobs_from_configuration(app: &App) {
    let path = &app.config.jobs.configuration_file;

    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(_) => {
            warn!("Jobs configuration file not found at {}", path);
            return;
        }
    };

    let parsed: JobConfigurationFile = match serde_json::from_str(&contents) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!("Error loading jobs from configuration: {}", e);
            return;
        }
    };

    if parsed.jobs.is_empty() {
        warn!("No jobs found in configuration");
        return;
    }

    for entry in parsed.jobs.into_iter().filter(|entry| entry.is_enabled) {
        let job_id = entry.request.job.job_id.clone();
        let tags = entry.tags.join(", ");

        info!("Configuring job: {}", job_id);

        match app.jobs.create_recurring(entry.request).await {
            Ok(()) => info!("Job configured successfully: {} [{}]", job_id, tags),
            Err(e) => error!("Error configuring job {}: {}", job_id, e),
        }
    }
}
