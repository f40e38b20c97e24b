use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tracing: TracingConfig,
    pub server: ServerConfig,
    pub http_client: HttpClientConfig,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub jobs: JobsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TracingConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Hard deadline applied to an outbound job call when the job itself
    /// does not carry a timeout override (default: 60)
    #[serde(default = "default_timeout_seconds")]
    pub default_timeout_seconds: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            default_timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Credentials and endpoint for the external identity provider that
/// issues bearer tokens for authenticated jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub login_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Declarative job configuration file loaded once at startup.
    /// A missing file is logged and skipped, never fatal.
    #[serde(default = "default_configuration_file")]
    pub configuration_file: String,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            configuration_file: default_configuration_file(),
        }
    }
}

const fn default_timeout_seconds() -> u64 {
    60
}

fn default_configuration_file() -> String {
    "config/http_jobs.json".to_string()
}

#[cfg(test)]
impl Config {
    /// Minimal configuration for unit tests. The identity endpoint points
    /// nowhere; tests that need one inject a mock provider instead.
    pub fn test() -> Self {
        Self {
            tracing: TracingConfig {
                log_level: "warn".to_string(),
            },
            server: ServerConfig { port: 0 },
            http_client: HttpClientConfig::default(),
            identity: IdentityConfig {
                login_endpoint: "http://localhost:0/login".to_string(),
                client_id: "test-client".to_string(),
                client_secret: "test-secret".to_string(),
            },
            jobs: JobsConfig::default(),
        }
    }
}
