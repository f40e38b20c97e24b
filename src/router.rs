use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{api, app::App};

pub fn router(app: App) -> Router {
    let api_router = Router::new()
        .route("/jobs/recurring", post(api::jobs::create_recurring))
        .route("/jobs/delayed", post(api::jobs::create_delayed))
        .route("/jobs/{job_id}", delete(api::jobs::delete_job))
        .route("/jobs/{job_id}/exists", get(api::jobs::job_exists))
        .with_state(app);

    Router::new()
        .route("/liveness", get(api::health_checks::ok))
        .route("/readiness", get(api::health_checks::ok))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
}
