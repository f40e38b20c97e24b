pub mod identity;
pub mod token_cache;

use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of a token refresh against the identity provider.
///
/// Never carries credentials or token values; the messages are safe to
/// log and to return to API callers.
#[derive(Debug, Error)]
pub enum AuthProviderError {
    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("identity provider returned status {0}")]
    Status(u16),
    #[error("identity provider response is missing a token")]
    InvalidResponse,
}

/// A freshly issued bearer token and its advertised lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in_minutes: i64,
}

/// Seam between the token cache and the identity provider, so tests can
/// inject a counting or failing provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<IssuedToken, AuthProviderError>;
}
