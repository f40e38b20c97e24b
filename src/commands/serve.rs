use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{
    app::App,
    auth::{identity::HttpIdentityProvider, token_cache::TokenCache},
    config::Config,
    environment::Environment,
    invoker::HttpInvoker,
    jobs::{recurring::JobRegistry, registration::register_startup_jobs, service::JobService},
    router::router,
    scheduler::{in_memory::InMemoryScheduler, JobScheduler},
};

pub async fn handle_serve_command(
    environment: Environment,
    config: Config,
    job_registry: JobRegistry,
) {
    let port = config.server.port;

    let identity = HttpIdentityProvider::new(config.identity.clone());
    let token_cache = Arc::new(TokenCache::new(Arc::new(identity)));

    let invoker = Arc::new(HttpInvoker::new(
        reqwest::Client::new(),
        token_cache.clone(),
        Duration::from_secs(config.http_client.default_timeout_seconds),
    ));

    let scheduler: Arc<dyn JobScheduler> = Arc::new(InMemoryScheduler::new());
    let jobs = JobService::new(scheduler, invoker);

    let app = App {
        config: config.clone(),
        environment,
        jobs,
        token_cache,
    };

    // Reconcile static jobs and the declarative configuration against the
    // scheduler. A failing scheduler is logged but does not stop the API
    // from serving; operators can re-register jobs through it.
    if let Err(e) = register_startup_jobs(&app, &job_registry).await {
        error!("❌ Job registration bootstrap failed: {}", e);
    }

    let router = router(app);
    start_server(router, port).await;
}

async fn start_server(router: axum::Router, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await.unwrap();

    info!("🌐 Server starting on http://{}", addr);
    axum::serve(listener, router).await.unwrap();
}
