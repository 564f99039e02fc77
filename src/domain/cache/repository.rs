//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::domain::DomainError;

/// Key probed by the default `ping` implementation
const PING_KEY: &str = "health:ping";

/// Key-value cache with per-entry TTL
///
/// `Ok(None)` from `get_raw` is a miss. Any `Err` is a backend failure and is
/// never used to signal absence.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets the raw bytes stored under `key`
    async fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, DomainError>;

    /// Stores `value` under `key`. A zero `ttl` falls back to the backend default.
    async fn set_raw(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), DomainError>;

    /// Checks that the backend is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        self.get_raw(PING_KEY).await.map(|_| ())
    }

    /// Backend name for logging and health output
    fn backend_name(&self) -> &'static str;
}

/// Extension trait providing typed reads
pub trait CacheExt: Cache {
    /// Gets a JSON value from the cache. Undecodable bytes are reported as a cache error.
    fn get_json<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_slice(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}
