use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::{
    api::validated_json::ValidatedJson,
    app::App,
    jobs::{
        requests::{DelayedJobRequest, RecurringJobRequest},
        service::JobServiceError,
    },
};

/// `POST /api/jobs/recurring`
pub async fn create_recurring(
    State(app): State<App>,
    ValidatedJson(request): ValidatedJson<RecurringJobRequest>,
) -> Response {
    let job_id = request.job.job_id.clone();

    match app.jobs.create_recurring(request).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "jobId": job_id, "status": "Created" })),
        )
            .into_response(),
        Err(JobServiceError::Validation(e)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            error!("Error creating recurring job: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create recurring job" })),
            )
                .into_response()
        }
    }
}

/// `POST /api/jobs/delayed` - the returned id is scheduler-generated.
pub async fn create_delayed(
    State(app): State<App>,
    ValidatedJson(request): ValidatedJson<DelayedJobRequest>,
) -> Response {
    match app.jobs.create_delayed(request).await {
        Ok(job_id) => (
            StatusCode::OK,
            Json(json!({ "jobId": job_id, "status": "Created" })),
        )
            .into_response(),
        Err(JobServiceError::Validation(e)) => {
            (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            error!("Error creating delayed job: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to create delayed job" })),
            )
                .into_response()
        }
    }
}

/// `DELETE /api/jobs/{job_id}`
pub async fn delete_job(State(app): State<App>, Path(job_id): Path<String>) -> Response {
    match app.jobs.delete_job(&job_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "jobId": job_id, "status": "Deleted" })),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Job not found", "jobId": job_id })),
        )
            .into_response(),
        Err(e) => {
            error!("Error deleting job: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to delete job" })),
            )
                .into_response()
        }
    }
}

/// `GET /api/jobs/{job_id}/exists`
pub async fn job_exists(State(app): State<App>, Path(job_id): Path<String>) -> Response {
    match app.jobs.job_exists(&job_id).await {
        Ok(exists) => (
            StatusCode::OK,
            Json(json!({ "jobId": job_id, "exists": exists })),
        )
            .into_response(),
        Err(e) => {
            error!("Error checking job existence: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to check job existence" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        app::test_support::test_app_with, router::router, scheduler::mock::RecordingScheduler,
    };

    async fn server(scheduler: Arc<RecordingScheduler>) -> TestServer {
        let app = test_app_with(scheduler).await;
        TestServer::new(router(app)).unwrap()
    }

    #[tokio::test]
    async fn create_recurring_returns_created_status() {
        let scheduler = Arc::new(RecordingScheduler::new());
        let server = server(scheduler.clone()).await;

        let response = server
            .post("/api/jobs/recurring")
            .json(&json!({
                "jobId": "nightly-cleanup",
                "url": "http://svc/clean",
                "httpMethod": "POST",
                "cronExpression": "0 0 * * *"
            }))
            .await;

        response.assert_status_ok();
        response.assert_json(&json!({ "jobId": "nightly-cleanup", "status": "Created" }));
        assert_eq!(scheduler.recurring_jobs().len(), 1);
    }

    #[tokio::test]
    async fn create_recurring_without_job_id_is_rejected() {
        let scheduler = Arc::new(RecordingScheduler::new());
        let server = server(scheduler.clone()).await;

        let response = server
            .post("/api/jobs/recurring")
            .json(&json!({
                "url": "http://svc/clean",
                "httpMethod": "POST",
                "cronExpression": "0 0 * * *"
            }))
            .await;

        response.assert_status_bad_request();
        assert!(scheduler.recurring_jobs().is_empty());
    }

    #[tokio::test]
    async fn create_recurring_without_cron_expression_is_rejected() {
        let scheduler = Arc::new(RecordingScheduler::new());
        let server = server(scheduler).await;

        let response = server
            .post("/api/jobs/recurring")
            .json(&json!({
                "jobId": "broken",
                "url": "http://svc/clean",
                "httpMethod": "POST"
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn create_delayed_returns_a_generated_id() {
        let scheduler = Arc::new(RecordingScheduler::new());
        let server = server(scheduler.clone()).await;

        let response = server
            .post("/api/jobs/delayed")
            .json(&json!({
                "url": "http://svc/once",
                "httpMethod": "GET",
                "delaySeconds": 30
            }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], "Created");
        assert!(!body["jobId"].as_str().unwrap().is_empty());
        assert_eq!(scheduler.delayed_count(), 1);
    }

    #[tokio::test]
    async fn delete_returns_not_found_for_unknown_job() {
        let scheduler = Arc::new(RecordingScheduler::new());
        let server = server(scheduler).await;

        let response = server.delete("/api/jobs/ghost").await;
        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn delete_removes_a_registered_job() {
        let scheduler = Arc::new(RecordingScheduler::new());
        scheduler.seed_recurring("sync", "default", "0 0 * * *");
        let server = server(scheduler.clone()).await;

        let response = server.delete("/api/jobs/sync").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "jobId": "sync", "status": "Deleted" }));
        assert!(scheduler.recurring_jobs().is_empty());
    }

    #[tokio::test]
    async fn exists_reflects_registration_state() {
        let scheduler = Arc::new(RecordingScheduler::new());
        scheduler.seed_recurring("sync", "default", "0 0 * * *");
        let server = server(scheduler).await;

        let response = server.get("/api/jobs/sync/exists").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "jobId": "sync", "exists": true }));

        let response = server.get("/api/jobs/ghost/exists").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "jobId": "ghost", "exists": false }));
    }

    #[tokio::test]
    async fn liveness_and_readiness_respond_ok() {
        let scheduler = Arc::new(RecordingScheduler::new());
        let server = server(scheduler).await;

        server.get("/liveness").await.assert_status_ok();
        server.get("/readiness").await.assert_status_ok();
    }
}
