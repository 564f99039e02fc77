//! Cache factory for runtime selection

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported cache types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheType {
    /// Redis cache
    #[default]
    Redis,
    /// In-memory cache using moka
    #[serde(alias = "memory", alias = "inmemory")]
    InMemory,
}

impl std::fmt::Display for CacheType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheType::InMemory => write!(f, "in_memory"),
            CacheType::Redis => write!(f, "redis"),
        }
    }
}

/// `cache` section of the application configuration
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheType,
    /// Redis URL (required for the Redis backend)
    pub redis_url: Option<String>,
    pub redis_username: Option<String>,
    pub redis_password: Option<String>,
    pub key_prefix: Option<String>,
    /// Fallback TTL for writes that pass a zero TTL
    pub default_ttl_secs: u64,
    /// Deadline for every Redis operation
    pub operation_timeout_ms: u64,
    /// Entry cap for the in-memory backend
    pub max_capacity: u64,
}

impl std::fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheConfig")
            .field("backend", &self.backend)
            .field("redis_url", &self.redis_url)
            .field("redis_username", &self.redis_username)
            .field("redis_password", &self.redis_password.as_ref().map(|_| "[REDACTED]"))
            .field("key_prefix", &self.key_prefix)
            .field("default_ttl_secs", &self.default_ttl_secs)
            .field("operation_timeout_ms", &self.operation_timeout_ms)
            .field("max_capacity", &self.max_capacity)
            .finish()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheType::Redis,
            redis_url: None,
            redis_username: None,
            redis_password: None,
            key_prefix: None,
            default_ttl_secs: 24 * 60 * 60,
            operation_timeout_ms: 5_000,
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: CacheType::InMemory,
            ..Default::default()
        }
    }

    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: CacheType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Factory for creating cache instances
#[derive(Debug, Default)]
pub struct CacheFactory;

impl CacheFactory {
    pub fn new() -> Self {
        Self
    }

    /// Creates a cache instance based on configuration
    pub fn create(&self, config: &CacheConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.backend {
            CacheType::InMemory => {
                let in_memory_config = InMemoryCacheConfig::default()
                    .with_default_ttl(config.default_ttl())
                    .with_max_capacity(config.max_capacity);

                Ok(Arc::new(InMemoryCache::with_config(in_memory_config)))
            }
            CacheType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("Redis URL is required for Redis cache type")
                })?;

                let mut redis_config = RedisCacheConfig::new(url)
                    .with_credentials(config.redis_username.clone(), config.redis_password.clone())
                    .with_default_ttl(config.default_ttl())
                    .with_operation_timeout(config.operation_timeout());

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                Ok(Arc::new(RedisCache::new(redis_config)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_type_aliases() {
        for (raw, expected) in [
            ("in_memory", CacheType::InMemory),
            ("memory", CacheType::InMemory),
            ("inmemory", CacheType::InMemory),
            ("redis", CacheType::Redis),
        ] {
            let parsed: CacheType = serde_json::from_value(serde_json::json!(raw)).unwrap();
            assert_eq!(parsed, expected, "{}", raw);
        }

        assert!(serde_json::from_value::<CacheType>(serde_json::json!("memcached")).is_err());
    }

    #[test]
    fn test_cache_config_deserializes_with_defaults() {
        let config: CacheConfig =
            serde_json::from_value(serde_json::json!({"backend": "memory"})).unwrap();

        assert_eq!(config.backend, CacheType::InMemory);
        assert_eq!(config.default_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.operation_timeout(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_factory_create_in_memory() {
        let cache = CacheFactory::new().create(&CacheConfig::in_memory()).unwrap();

        cache.set_raw("test", b"1", Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get_raw("test").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(cache.backend_name(), "in_memory");
    }

    #[test]
    fn test_factory_create_redis_is_lazy() {
        let cache = CacheFactory::new()
            .create(&CacheConfig::redis("redis://127.0.0.1:6379"))
            .unwrap();

        assert_eq!(cache.backend_name(), "redis");
    }

    #[test]
    fn test_factory_create_redis_missing_url() {
        let config = CacheConfig {
            backend: CacheType::Redis,
            redis_url: None,
            ..Default::default()
        };

        let result = CacheFactory::new().create(&config);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_cache_type_display() {
        assert_eq!(CacheType::InMemory.to_string(), "in_memory");
        assert_eq!(CacheType::Redis.to_string(), "redis");
    }
}
