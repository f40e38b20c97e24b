use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::{recurring::RecurringJob, JobError};
use crate::app::App;

const BATCH_SIZE: usize = 100;
const OLDER_THAN_DAYS: u32 = 30;

/// Nightly maintenance job: finds completed todo items past their
/// retention window, soft-deletes them in batches, then archives them.
pub struct TodoItemsCleanupJob {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoItem {
    id: i64,
}

impl TodoItemsCleanupJob {
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:5001".to_string())
    }

    #[must_use]
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn items_to_cleanup(&self) -> Result<Vec<TodoItem>, JobError> {
        let url = format!(
            "{}/api/todo-items/search?olderThanDays={OLDER_THAN_DAYS}&status=completed",
            self.base_url
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| JobError::TryAgainLater(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JobError::TryAgainLater(format!(
                "search returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| JobError::FailPermanently(e.to_string()))
    }

    async fn process_batch(&self, batch: &[TodoItem], cancel: &CancellationToken) -> Result<(), JobError> {
        for item in batch {
            let url = format!("{}/api/todo-items/{}", self.base_url, item.id);
            match self.client.delete(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    info!("Successfully deleted item {}", item.id);
                }
                Ok(response) => {
                    // Continue with other items even if one fails
                    error!("Error deleting item {}: status {}", item.id, response.status());
                }
                Err(e) => {
                    error!("Error deleting item {}: {}", item.id, e);
                }
            }

            // Small delay between deletes to not overwhelm the target
            tokio::select! {
                () = cancel.cancelled() => return Err(JobError::FailPermanently("cleanup cancelled".to_string())),
                () = tokio::time::sleep(Duration::from_millis(100)) => {}
            }
        }
        Ok(())
    }

    async fn archive_items(&self, item_ids: Vec<i64>) -> Result<(), JobError> {
        let url = format!("{}/api/todo-items/archive", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "itemIds": item_ids }))
            .send()
            .await
            .map_err(|e| JobError::TryAgainLater(e.to_string()))?;

        if !response.status().is_success() {
            return Err(JobError::TryAgainLater(format!(
                "archive returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

impl Default for TodoItemsCleanupJob {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecurringJob for TodoItemsCleanupJob {
    fn job_id(&self) -> &'static str {
        "todo-items-cleanup-job"
    }

    fn cron_expression(&self) -> &'static str {
        "0 0 * * *" // At midnight every day
    }

    fn queue(&self) -> &'static str {
        "maintenance"
    }

    async fn run(&self, _app: &App, cancel: CancellationToken) -> Result<(), JobError> {
        let items = self.items_to_cleanup().await?;
        info!("Found {} items to cleanup", items.len());

        if items.is_empty() {
            return Ok(());
        }

        let total_batches = items.len().div_ceil(BATCH_SIZE);
        for (index, batch) in items.chunks(BATCH_SIZE).enumerate() {
            self.process_batch(batch, &cancel).await?;
            info!("Processed batch {} of {}", index + 1, total_batches);
        }

        let item_ids: Vec<i64> = items.iter().map(|item| item.id).collect();
        let archived = item_ids.len();
        self.archive_items(item_ids).await?;
        info!("Archived {} items", archived);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::app::test_support::test_app;

    #[tokio::test]
    async fn cleanup_deletes_and_archives_found_items() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/todo-items/search"))
            .and(query_param("olderThanDays", "30"))
            .and(query_param("status", "completed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1}, {"id": 2}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("DELETE"))
            .and(path("/api/todo-items/1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/todo-items/2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/todo-items/archive"))
            .and(body_json(serde_json::json!({"itemIds": [1, 2]})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let job = TodoItemsCleanupJob::with_base_url(server.uri());
        let app = test_app().await;
        job.run(&app, CancellationToken::new()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_search_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/todo-items/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let job = TodoItemsCleanupJob::with_base_url(server.uri());
        let app = test_app().await;
        assert!(matches!(
            job.run(&app, CancellationToken::new()).await,
            Err(JobError::TryAgainLater(_))
        ));
    }
}
