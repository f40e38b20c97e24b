use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{AuthProviderError, IdentityProvider};

/// Buffer subtracted from a token's expiry so a token is never handed out
/// when it could expire mid-flight of a long-running call.
const SAFETY_MARGIN_MINUTES: i64 = 5;

/// The cached credential. `value` empty means no token has been fetched yet.
#[derive(Debug, Clone)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn empty() -> Self {
        Self {
            value: String::new(),
            expires_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    /// A token is usable only while `now + safety margin < expires_at`.
    /// At exactly the margin boundary the token counts as expired.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && now + Duration::minutes(SAFETY_MARGIN_MINUTES) < self.expires_at
    }
}

/// Process-wide bearer token cache with single-flight refresh.
///
/// Many scheduler workers call `get_token` concurrently. The refresh gate
/// guarantees at most one in-flight call against the identity provider per
/// invalidation: callers that lose the race wait on the gate, re-check
/// validity, and reuse the winner's token.
pub struct TokenCache {
    provider: Arc<dyn IdentityProvider>,
    current: RwLock<CachedToken>,
    refresh_gate: Mutex<()>,
}

impl TokenCache {
    #[must_use]
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            provider,
            current: RwLock::new(CachedToken::empty()),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Returns a currently-valid token, refreshing it first if needed.
    pub async fn get_token(&self) -> Result<String, AuthProviderError> {
        if let Some(token) = self.current_if_valid() {
            return Ok(token);
        }

        let _gate = self.refresh_gate.lock().await;

        // Double-check: another caller may have refreshed while we waited
        // on the gate.
        if let Some(token) = self.current_if_valid() {
            debug!("Reusing token refreshed by a concurrent caller");
            return Ok(token);
        }

        self.refresh_locked().await
    }

    /// Pure validity check against the safety-margin invariant.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.current.read().unwrap().is_valid_at(Utc::now())
    }

    /// Unconditionally contacts the identity provider and replaces the
    /// cached token, serialized behind the refresh gate.
    pub async fn refresh(&self) -> Result<String, AuthProviderError> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    fn current_if_valid(&self) -> Option<String> {
        let current = self.current.read().unwrap();
        current
            .is_valid_at(Utc::now())
            .then(|| current.value.clone())
    }

    async fn refresh_locked(&self) -> Result<String, AuthProviderError> {
        let issued = self.provider.fetch_token().await?;
        let expires_at = Utc::now() + Duration::minutes(issued.expires_in_minutes);

        let mut current = self.current.write().unwrap();
        *current = CachedToken {
            value: issued.token.clone(),
            expires_at,
        };

        info!("🔑 Token refreshed, valid until {}", expires_at);
        Ok(issued.token)
    }
}
