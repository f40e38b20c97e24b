use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{JobCallback, JobScheduler, RegisteredJob, SchedulerError};

/// Recording scheduler for tests: captures registrations instead of
/// executing them, and lets a test fire a captured callback by hand.
#[derive(Default)]
pub struct RecordingScheduler {
    recurring: Mutex<Vec<RecordedRecurring>>,
    delayed: Mutex<Vec<RecordedDelayed>>,
    removed: Mutex<Vec<String>>,
}

pub struct RecordedRecurring {
    pub job: RegisteredJob,
    pub callback: JobCallback,
}

pub struct RecordedDelayed {
    pub id: String,
    pub delay: Duration,
    pub callback: JobCallback,
}

impl RecordingScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recurring_jobs(&self) -> Vec<RegisteredJob> {
        self.recurring
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.job.clone())
            .collect()
    }

    pub fn removed_ids(&self) -> Vec<String> {
        self.removed.lock().unwrap().clone()
    }

    pub fn delayed_count(&self) -> usize {
        self.delayed.lock().unwrap().len()
    }

    /// The callback registered for `job_id`, if any.
    pub fn callback_for(&self, job_id: &str) -> Option<JobCallback> {
        self.recurring
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.job.id == job_id)
            .map(|r| r.callback.clone())
    }

    /// Pre-seeds a registration, as if it survived from a previous run.
    pub fn seed_recurring(&self, job_id: &str, queue: &str, cron_expression: &str) {
        self.recurring.lock().unwrap().push(RecordedRecurring {
            job: RegisteredJob {
                id: job_id.to_string(),
                queue: queue.to_string(),
                cron_expression: cron_expression.to_string(),
            },
            callback: std::sync::Arc::new(|_| Box::pin(async { Ok(()) })),
        });
    }
}

#[async_trait]
impl JobScheduler for RecordingScheduler {
    async fn add_or_update_recurring(
        &self,
        job_id: &str,
        queue: &str,
        cron_expression: &str,
        callback: JobCallback,
    ) -> Result<(), SchedulerError> {
        let mut recurring = self.recurring.lock().unwrap();
        recurring.retain(|r| r.job.id != job_id);
        recurring.push(RecordedRecurring {
            job: RegisteredJob {
                id: job_id.to_string(),
                queue: queue.to_string(),
                cron_expression: cron_expression.to_string(),
            },
            callback,
        });
        Ok(())
    }

    async fn schedule_once(
        &self,
        delay: Duration,
        callback: JobCallback,
    ) -> Result<String, SchedulerError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.delayed.lock().unwrap().push(RecordedDelayed {
            id: id.clone(),
            delay,
            callback,
        });
        Ok(id)
    }

    async fn remove_if_exists(&self, job_id: &str) -> Result<bool, SchedulerError> {
        let mut recurring = self.recurring.lock().unwrap();
        let before = recurring.len();
        recurring.retain(|r| r.job.id != job_id);
        let existed = recurring.len() < before;
        if existed {
            self.removed.lock().unwrap().push(job_id.to_string());
        }
        Ok(existed)
    }

    async fn list_recurring(&self) -> Result<Vec<RegisteredJob>, SchedulerError> {
        Ok(self.recurring_jobs())
    }
}
