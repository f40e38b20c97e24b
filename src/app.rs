use std::sync::Arc;

use crate::{
    auth::token_cache::TokenCache, config::Config, environment::Environment,
    jobs::service::JobService,
};

/// Shared application state, cloned into API handlers and job callbacks.
#[derive(Clone)]
pub struct App {
    pub config: Config,
    pub environment: Environment,
    pub jobs: JobService,
    pub token_cache: Arc<TokenCache>,
}

#[cfg(test)]
pub mod test_support {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        auth::{AuthProviderError, IdentityProvider, IssuedToken},
        invoker::HttpInvoker,
        scheduler::{mock::RecordingScheduler, JobScheduler},
    };

    struct StubProvider;

    #[async_trait]
    impl IdentityProvider for StubProvider {
        async fn fetch_token(&self) -> Result<IssuedToken, AuthProviderError> {
            Ok(IssuedToken {
                token: "stub-token".to_string(),
                expires_in_minutes: 60,
            })
        }
    }

    /// An `App` wired to the given scheduler, with a stub identity
    /// provider and test configuration.
    pub async fn test_app_with(scheduler: Arc<dyn JobScheduler>) -> App {
        let token_cache = Arc::new(TokenCache::new(Arc::new(StubProvider)));
        let invoker = Arc::new(HttpInvoker::new(
            reqwest::Client::new(),
            token_cache.clone(),
            Duration::from_secs(60),
        ));

        App {
            config: Config::test(),
            environment: Environment::Test,
            jobs: JobService::new(scheduler, invoker),
            token_cache,
        }
    }

    pub async fn test_app() -> App {
        test_app_with(Arc::new(RecordingScheduler::new())).await
    }
}
