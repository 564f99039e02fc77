use std::time::Duration;

use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::cache::CacheConfig;
use crate::infrastructure::logging::LoggingConfig;
use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::services::DEFAULT_SEARCH_CACHE_TTL;
use crate::infrastructure::spotify::{
    ClientCredentials, SpotifyClientConfig, DEFAULT_API_BASE_URL, DEFAULT_TOKEN_URL,
};

/// Plain environment variables honoured on top of the `APP__` ones
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SPOTIFY_CLIENT_ID", "spotify.client_id"),
    ("SPOTIFY_CLIENT_SECRET", "spotify.client_secret"),
    ("REDIS_URL", "cache.redis_url"),
    ("PORT", "server.port"),
    ("LOG_FORMAT", "logging.format"),
    ("LOG_LEVEL", "logging.level"),
];

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub spotify: SpotifyConfig,
    pub cache: CacheConfig,
    pub search: SearchConfig,
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on a whole request, upstream call included
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    #[serde(alias = "text")]
    Pretty,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: String,
    pub api_base_url: String,
    pub renewal_margin_secs: u64,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for SpotifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .field("renewal_margin_secs", &self.renewal_margin_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub cache_ttl_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1323,
            request_timeout_secs: 15,
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            renewal_margin_secs: 300,
            request_timeout_secs: 10,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_SEARCH_CACHE_TTL.as_secs(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SpotifyConfig {
    /// Both halves of the client credentials, or a configuration error naming the missing one
    pub fn credentials(&self) -> Result<ClientCredentials, DomainError> {
        let client_id = non_empty(&self.client_id)
            .ok_or_else(|| DomainError::configuration("SPOTIFY_CLIENT_ID is required"))?;
        let client_secret = non_empty(&self.client_secret)
            .ok_or_else(|| DomainError::configuration("SPOTIFY_CLIENT_SECRET is required"))?;

        Ok(ClientCredentials::new(client_id, client_secret))
    }

    pub fn client_config(&self) -> SpotifyClientConfig {
        SpotifyClientConfig::default()
            .with_token_url(self.token_url.clone())
            .with_api_base_url(self.api_base_url.clone())
            .with_renewal_margin(Duration::from_secs(self.renewal_margin_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl SearchConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Loads `config/default`, `config/local`, `APP__*` variables and the plain overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder, |name| std::env::var(name).ok())
    }

    fn from_builder(
        mut builder: ConfigBuilder<DefaultState>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, config::ConfigError> {
        for (variable, key) in ENV_OVERRIDES {
            let value = lookup(variable).filter(|v| !v.is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        builder.build()?.try_deserialize()
    }
}
