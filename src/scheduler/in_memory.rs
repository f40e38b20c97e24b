use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::{JobCallback, JobScheduler, RegisteredJob, SchedulerError};

/// Single-process scheduler that spawns one task per registered job.
///
/// Serves as the default backend behind the `JobScheduler` trait; a
/// durable, multi-worker backend would plug in at the same boundary.
/// Nothing survives a restart, which is why bootstrap re-registers the
/// full job set on every start.
pub struct InMemoryScheduler {
    recurring: DashMap<String, RecurringEntry>,
    shutdown: CancellationToken,
}

struct RecurringEntry {
    queue: String,
    cron_expression: String,
    cancel: CancellationToken,
}

impl InMemoryScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            recurring: DashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancels every scheduled task, recurring and delayed.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Default for InMemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InMemoryScheduler {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl JobScheduler for InMemoryScheduler {
    async fn add_or_update_recurring(
        &self,
        job_id: &str,
        queue: &str,
        cron_expression: &str,
        callback: JobCallback,
    ) -> Result<(), SchedulerError> {
        let schedule = parse_cron(cron_expression)?;

        // Re-registering under the same id replaces the definition.
        if let Some((_, previous)) = self.recurring.remove(job_id) {
            previous.cancel.cancel();
            debug!("📅 Replacing recurring job '{}'", job_id);
        }

        let cancel = self.shutdown.child_token();
        let task_cancel = cancel.clone();
        let task_job_id = job_id.to_string();

        tokio::spawn(async move {
            run_recurring_job(&task_job_id, &schedule, &callback, &task_cancel).await;
        });

        self.recurring.insert(
            job_id.to_string(),
            RecurringEntry {
                queue: queue.to_string(),
                cron_expression: cron_expression.to_string(),
                cancel,
            },
        );

        info!("📅 Registered recurring job '{}' ({})", job_id, cron_expression);
        Ok(())
    }

    async fn schedule_once(
        &self,
        delay: Duration,
        callback: JobCallback,
    ) -> Result<String, SchedulerError> {
        let job_id = uuid::Uuid::new_v4().to_string();
        let cancel = self.shutdown.child_token();
        let task_job_id = job_id.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => return,
                () = sleep(delay) => {}
            }
            match callback(cancel.child_token()).await {
                Ok(()) => debug!("⏰ Delayed job '{}' completed", task_job_id),
                Err(e) => error!("❌ Delayed job '{}' failed: {}", task_job_id, e),
            }
        });

        info!("⏰ Scheduled delayed job '{}' in {:?}", job_id, delay);
        Ok(job_id)
    }

    async fn remove_if_exists(&self, job_id: &str) -> Result<bool, SchedulerError> {
        match self.recurring.remove(job_id) {
            Some((_, entry)) => {
                entry.cancel.cancel();
                info!("🗑️ Removed recurring job '{}'", job_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_recurring(&self) -> Result<Vec<RegisteredJob>, SchedulerError> {
        Ok(self
            .recurring
            .iter()
            .map(|entry| RegisteredJob {
                id: entry.key().clone(),
                queue: entry.value().queue.clone(),
                cron_expression: entry.value().cron_expression.clone(),
            })
            .collect())
    }
}

/// Parses a cron expression, accepting the five-field form by prepending
/// a seconds field.
fn parse_cron(expression: &str) -> Result<cron::Schedule, SchedulerError> {
    let normalized = if expression.split_whitespace().count() == 5 {
        format!("0 {expression}")
    } else {
        expression.to_string()
    };

    cron::Schedule::from_str(&normalized).map_err(|e| SchedulerError::InvalidCron {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

/// Fires a single recurring job at each upcoming cron occurrence until
/// cancelled.
async fn run_recurring_job(
    job_id: &str,
    schedule: &cron::Schedule,
    callback: &JobCallback,
    cancel: &CancellationToken,
) {
    debug!("📅 Starting scheduler task for '{}'", job_id);

    loop {
        let now = chrono::Utc::now();
        let Some(next_execution) = schedule.upcoming(chrono::Utc).take(1).next() else {
            error!("❌ Could not determine next execution time for job '{}'", job_id);
            return;
        };

        debug!(
            "🔄 Job '{}' next execution at: {}",
            job_id,
            next_execution.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let wait = (next_execution - now).to_std().unwrap_or_default();
        tokio::select! {
            () = cancel.cancelled() => {
                debug!("📅 Scheduler task for '{}' cancelled", job_id);
                return;
            }
            () = sleep_until(Instant::now() + wait) => {}
        }

        match callback(cancel.child_token()).await {
            Ok(()) => debug!("📅 Recurring job '{}' completed", job_id),
            Err(e) => error!("❌ Recurring job '{}' failed: {}", job_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    fn counting_callback() -> (JobCallback, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let callback: JobCallback = Arc::new(move |_cancel| {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });
        (callback, fired)
    }

    #[test]
    fn five_field_cron_expressions_are_accepted() {
        assert!(parse_cron("0 0 * * *").is_ok());
        assert!(parse_cron("*/5 * * * *").is_ok());
    }

    #[test]
    fn six_field_cron_expressions_pass_through() {
        assert!(parse_cron("*/10 * * * * *").is_ok());
    }

    #[test]
    fn garbage_cron_expression_is_rejected() {
        assert!(matches!(
            parse_cron("not a cron"),
            Err(SchedulerError::InvalidCron { .. })
        ));
    }

    #[tokio::test]
    async fn registered_jobs_are_listed_and_removable() {
        let scheduler = InMemoryScheduler::new();
        let (callback, _) = counting_callback();

        scheduler
            .add_or_update_recurring("cleanup", "maintenance", "0 0 * * *", callback)
            .await
            .unwrap();

        let listed = scheduler.list_recurring().await.unwrap();
        assert_eq!(
            listed,
            vec![RegisteredJob {
                id: "cleanup".to_string(),
                queue: "maintenance".to_string(),
                cron_expression: "0 0 * * *".to_string(),
            }]
        );

        assert!(scheduler.remove_if_exists("cleanup").await.unwrap());
        assert!(!scheduler.remove_if_exists("cleanup").await.unwrap());
        assert!(scheduler.list_recurring().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reregistering_replaces_the_definition() {
        let scheduler = InMemoryScheduler::new();
        let (callback, _) = counting_callback();

        scheduler
            .add_or_update_recurring("sync", "default", "0 0 * * *", callback.clone())
            .await
            .unwrap();
        scheduler
            .add_or_update_recurring("sync", "bulk", "0 12 * * *", callback)
            .await
            .unwrap();

        let listed = scheduler.list_recurring().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].queue, "bulk");
        assert_eq!(listed[0].cron_expression, "0 12 * * *");
    }

    #[tokio::test]
    async fn delayed_job_fires_once_after_the_delay() {
        let scheduler = InMemoryScheduler::new();
        let (callback, fired) = counting_callback();

        let id = scheduler
            .schedule_once(Duration::from_millis(50), callback)
            .await
            .unwrap();
        assert!(!id.is_empty());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(300)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recurring_job_fires_on_its_schedule() {
        let scheduler = InMemoryScheduler::new();
        let (callback, fired) = counting_callback();

        scheduler
            .add_or_update_recurring("tick", "default", "* * * * * *", callback)
            .await
            .unwrap();

        sleep(Duration::from_millis(2500)).await;
        assert!(fired.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn removed_job_stops_firing() {
        let scheduler = InMemoryScheduler::new();
        let (callback, fired) = counting_callback();

        scheduler
            .add_or_update_recurring("tick", "default", "* * * * * *", callback)
            .await
            .unwrap();
        scheduler.remove_if_exists("tick").await.unwrap();

        let before = fired.load(Ordering::SeqCst);
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), before);
    }
}
