use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthProviderError, IdentityProvider, IssuedToken};
use crate::config::IdentityConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: Option<String>,
    #[serde(default)]
    expires_in_minutes: i64,
}

/// Identity provider client posting client credentials to the configured
/// login endpoint.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    settings: IdentityConfig,
}

impl HttpIdentityProvider {
    #[must_use]
    pub fn new(settings: IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn fetch_token(&self) -> Result<IssuedToken, AuthProviderError> {
        debug!("Requesting token from {}", self.settings.login_endpoint);

        let response = self
            .client
            .post(&self.settings.login_endpoint)
            .json(&LoginRequest {
                client_id: &self.settings.client_id,
                client_secret: &self.settings.client_secret,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthProviderError::Status(status.as_u16()));
        }

        let body: TokenResponse = response.json().await?;

        match body.token {
            Some(token) if !token.is_empty() => Ok(IssuedToken {
                token,
                expires_in_minutes: body.expires_in_minutes,
            }),
            _ => Err(AuthProviderError::InvalidResponse),
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings(server: &MockServer) -> IdentityConfig {
        IdentityConfig {
            login_endpoint: format!("{}/login", server.uri()),
            client_id: "svc-client".to_string(),
            client_secret: "svc-secret".to_string(),
        }
    }

    #[tokio::test]
    async fn fetch_token_posts_credentials_and_parses_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .and(body_json(serde_json::json!({
                "clientId": "svc-client",
                "clientSecret": "svc-secret",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "issued-token",
                "expiresInMinutes": 30,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(settings(&server));
        let issued = provider.fetch_token().await.unwrap();

        assert_eq!(issued.token, "issued-token");
        assert_eq!(issued.expires_in_minutes, 30);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(settings(&server));
        assert!(matches!(
            provider.fetch_token().await,
            Err(AuthProviderError::Status(401))
        ));
    }

    #[tokio::test]
    async fn response_without_a_token_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "expiresInMinutes": 30 })),
            )
            .mount(&server)
            .await;

        let provider = HttpIdentityProvider::new(settings(&server));
        assert!(matches!(
            provider.fetch_token().await,
            Err(AuthProviderError::InvalidResponse)
        ));
    }
}
