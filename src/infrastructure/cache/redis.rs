//! Redis cache implementation

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, IntoConnectionInfo};
use tokio::sync::OnceCell;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

/// Configuration for Redis cache
#[derive(Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Username, overriding the one in the URL
    pub username: Option<String>,
    /// Password, overriding the one in the URL
    pub password: Option<String>,
    /// TTL used when a write passes a zero TTL
    pub default_ttl: Duration,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
    /// Deadline applied to every cache operation, connection setup included
    pub operation_timeout: Duration,
}

impl fmt::Debug for RedisCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCacheConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("default_ttl", &self.default_ttl)
            .field("key_prefix", &self.key_prefix)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            username: None,
            password: None,
            default_ttl: Duration::from_secs(24 * 60 * 60),
            key_prefix: None,
            operation_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisCacheConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_credentials(
        mut self,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        self.username = username;
        self.password = password;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }
}

/// Redis cache implementation
///
/// The connection manager is created on first use, so the service starts and
/// keeps answering (uncached) while Redis is unreachable. Every operation is
/// bounded by `operation_timeout`.
pub struct RedisCache {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connected", &self.connection.initialized())
            .finish()
    }
}

impl RedisCache {
    /// Validates the URL and credentials. Does not connect.
    pub fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let mut info = config
            .url
            .as_str()
            .into_connection_info()
            .map_err(|e| DomainError::configuration(format!("Invalid Redis URL: {}", e)))?;

        if config.username.is_some() {
            info.redis.username = config.username.clone();
        }

        if config.password.is_some() {
            info.redis.password = config.password.clone();
        }

        let client = Client::open(info)
            .map_err(|e| DomainError::configuration(format!("Failed to create Redis client: {}", e)))?;

        Ok(Self {
            client,
            connection: OnceCell::new(),
            config,
        })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    async fn connection(&self) -> Result<ConnectionManager, DomainError> {
        self.connection
            .get_or_try_init(|| async {
                ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))
            })
            .await
            .cloned()
    }

    async fn with_deadline<T, F>(&self, operation: &str, key: &str, fut: F) -> Result<T, DomainError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        tokio::time::timeout(self.config.operation_timeout, fut)
            .await
            .map_err(|_| {
                DomainError::cache(format!(
                    "Redis {} for key '{}' timed out after {:?}",
                    operation, key, self.config.operation_timeout
                ))
            })?
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError> {
        let prefixed_key = self.prefix_key(key);

        self.with_deadline("GET", key, async {
            let mut conn = self.connection().await?;

            conn.get::<_, Option<Vec<u8>>>(&prefixed_key)
                .await
                .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))
        })
        .await
    }

    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let ttl = if ttl.is_zero() {
            self.config.default_ttl
        } else {
            ttl
        };
        let ttl_secs = ttl.as_secs().max(1);

        self.with_deadline("SET", key, async {
            let mut conn = self.connection().await?;

            conn.set_ex::<_, _, ()>(&prefixed_key, value, ttl_secs)
                .await
                .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))
        })
        .await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        self.with_deadline("PING", "-", async {
            let mut conn = self.connection().await?;

            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map(|_| ())
                .map_err(|e| DomainError::cache(format!("Failed to ping Redis: {}", e)))
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
