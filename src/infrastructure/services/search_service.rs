//! Search orchestration: cache lookup, upstream search, cache write-back

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::domain::cache::{Cache, CacheExt, CacheKey};
use crate::domain::{DomainError, SearchKind, SearchProvider, SearchQuery, SearchResult};
use crate::infrastructure::observability::{record_cache_error, record_search};

/// How long a fetched result stays cached
pub const DEFAULT_SEARCH_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Trait for the search service (for dynamic dispatch in AppState)
#[async_trait]
pub trait SearchServiceTrait: Send + Sync + Debug {
    /// Searches `kind_token` for the still-encoded `raw_query`
    async fn search(&self, raw_query: &str, kind_token: &str) -> Result<SearchResult, DomainError>;
}

/// Orchestrates a search against the cache and the upstream provider
///
/// Cache failures never fail a search: a broken read is treated as a miss and
/// a broken write is logged and dropped.
pub struct SearchService {
    cache: Arc<dyn Cache>,
    provider: Arc<dyn SearchProvider>,
    cache_ttl: Duration,
}

impl Debug for SearchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchService")
            .field("cache", &self.cache.backend_name())
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl SearchService {
    pub fn new(cache: Arc<dyn Cache>, provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            cache,
            provider,
            cache_ttl: DEFAULT_SEARCH_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    async fn cached(&self, key: &CacheKey, kind: SearchKind) -> Option<SearchResult> {
        match self.cache.get_json::<SearchResult>(key.as_str()).await {
            Ok(hit) => hit,
            Err(e) => {
                record_cache_error("get");
                warn!(key = %key, kind = %kind, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn store(&self, key: &CacheKey, result: &SearchResult) -> Result<(), DomainError> {
        let bytes = serde_json::to_vec(result)
            .map_err(|e| DomainError::internal(format!("Failed to serialize search result: {}", e)))?;

        if let Err(e) = self.cache.set_raw(key.as_str(), &bytes, self.cache_ttl).await {
            record_cache_error("set");
            warn!(key = %key, error = %e, "Failed to cache search result");
        }

        Ok(())
    }
}

#[async_trait]
impl SearchServiceTrait for SearchService {
    #[instrument(skip(self))]
    async fn search(&self, raw_query: &str, kind_token: &str) -> Result<SearchResult, DomainError> {
        let kind: SearchKind = kind_token.parse()?;
        let key = CacheKey::for_search(kind, raw_query);

        if let Some(hit) = self.cached(&key, kind).await {
            debug!(key = %key, "Cache hit");
            record_search(kind.as_str(), "cache_hit");
            return Ok(hit);
        }

        let query = SearchQuery::decode(kind, raw_query).inspect_err(|_| {
            record_search(kind.as_str(), "error");
        })?;

        let result = match self.provider.search(query.text(), query.kind()).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                record_search(kind.as_str(), "not_found");
                return Err(DomainError::no_results(kind.as_str(), query.text()));
            }
            Err(e) => {
                record_search(kind.as_str(), "error");
                return Err(DomainError::spotify_client(e.to_string()));
            }
        };

        self.store(&key, &result).await?;
        record_search(kind.as_str(), "upstream");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockCache;
    use crate::domain::search::MockSearchProvider;
    use crate::infrastructure::cache::InMemoryCache;
    use mockall::predicate::eq;
    use serde_json::json;

    fn twice() -> SearchResult {
        json!({"id": "7n2Ycct7Beij7Dj7meI4X0", "name": "TWICE", "type": "artist", "genres": ["k-pop"]})
    }

    fn service(cache: Arc<dyn Cache>, provider: MockSearchProvider) -> SearchService {
        SearchService::new(cache, Arc::new(provider))
    }

    #[tokio::test]
    async fn test_invalid_kind_touches_nothing() {
        let cache = Arc::new(MockCache::new());
        let mut provider = MockSearchProvider::new();
        provider.expect_search().times(0);

        let err = service(cache.clone(), provider)
            .search("TWICE", "playlist")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidQueryType { ref kind } if kind == "playlist"));
        assert_eq!(cache.get_count(), 0);
        assert_eq!(cache.set_count(), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        let cache = Arc::new(MockCache::new().with_entry("spotify:artist:TWICE", &twice()));
        let mut provider = MockSearchProvider::new();
        provider.expect_search().times(0);

        let result = service(cache.clone(), provider)
            .search("TWICE", "artist")
            .await
            .unwrap();

        assert_eq!(result, twice());
        assert_eq!(cache.set_count(), 0);
    }

    #[tokio::test]
    async fn test_cache_hit_shape_is_not_checked() {
        let cache = Arc::new(MockCache::new().with_entry("spotify:track:x", &json!([1, 2, 3])));
        let mut provider = MockSearchProvider::new();
        provider.expect_search().times(0);

        let result = service(cache, provider).search("x", "track").await.unwrap();
        assert_eq!(result, json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_miss_fetches_and_stores_with_day_ttl() {
        let cache = Arc::new(MockCache::new());
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .with(eq("TWICE"), eq(SearchKind::Artist))
            .times(1)
            .returning(|_, _| Ok(Some(twice())));

        let result = service(cache.clone(), provider)
            .search("TWICE", "artist")
            .await
            .unwrap();

        assert_eq!(result, twice());
        assert_eq!(cache.stored("spotify:artist:TWICE"), Some(twice()));
        assert_eq!(
            cache.stored_ttl("spotify:artist:TWICE"),
            Some(Duration::from_secs(86_400))
        );
    }

    #[tokio::test]
    async fn test_query_is_decoded_but_key_stays_raw() {
        let cache = Arc::new(MockCache::new());
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .with(eq("Red Velvet"), eq(SearchKind::Album))
            .times(1)
            .returning(|_, _| Ok(Some(json!({"name": "The ReVe Festival"}))));

        service(cache.clone(), provider)
            .search("Red%20Velvet", "album")
            .await
            .unwrap();

        assert!(cache.stored("spotify:album:Red%20Velvet").is_some());
        assert!(cache.stored("spotify:album:Red Velvet").is_none());
    }

    #[tokio::test]
    async fn test_no_candidates_is_not_found_and_not_cached() {
        let cache = Arc::new(MockCache::new());
        let mut provider = MockSearchProvider::new();
        provider.expect_search().times(1).returning(|_, _| Ok(None));

        let err = service(cache.clone(), provider)
            .search("zzzzzz", "track")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NoResultsFound { .. }));
        assert_eq!(cache.set_count(), 0);
    }

    #[tokio::test]
    async fn test_failing_cache_write_still_succeeds() {
        let cache = Arc::new(MockCache::new().with_set_error("READONLY"));
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(Some(twice())));

        let result = service(cache.clone(), provider)
            .search("TWICE", "artist")
            .await
            .unwrap();

        assert_eq!(result, twice());
        assert_eq!(cache.set_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_down_falls_through_to_upstream() {
        let cache = Arc::new(MockCache::new().with_error("connection refused"));
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(Some(twice())));

        let result = service(cache, provider).search("TWICE", "artist").await.unwrap();
        assert_eq!(result, twice());
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_a_miss() {
        let cache = Arc::new(MockCache::new().with_raw_entry("spotify:artist:TWICE", "{truncated"));
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(Some(twice())));

        let result = service(cache.clone(), provider)
            .search("TWICE", "artist")
            .await
            .unwrap();

        assert_eq!(result, twice());
        // overwritten with a good entry
        assert_eq!(cache.stored("spotify:artist:TWICE"), Some(twice()));
    }

    #[tokio::test]
    async fn test_malformed_escape_is_internal_and_skips_upstream() {
        let cache = Arc::new(MockCache::new());
        let mut provider = MockSearchProvider::new();
        provider.expect_search().times(0);

        let err = service(cache.clone(), provider)
            .search("100%", "artist")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Internal { .. }));
        // the cache was still consulted with the raw key first
        assert_eq!(cache.get_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_error_is_wrapped() {
        let cache = Arc::new(MockCache::new());
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_, _| Err(DomainError::provider("http", "HTTP 401: expired token")));

        let err = service(cache.clone(), provider)
            .search("TWICE", "artist")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::SpotifyClient { .. }));
        assert!(err.to_string().contains("HTTP 401"));
        assert_eq!(cache.set_count(), 0);
    }

    #[tokio::test]
    async fn test_second_search_is_served_from_cache() {
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .times(1)
            .returning(|_, _| Ok(Some(twice())));

        let service = service(cache, provider);

        let first = service.search("TWICE", "artist").await.unwrap();
        let second = service.search("TWICE", "artist").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_differently_encoded_queries_miss_each_other() {
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());
        let mut provider = MockSearchProvider::new();
        provider
            .expect_search()
            .with(eq("Red Velvet"), eq(SearchKind::Artist))
            .times(2)
            .returning(|_, _| Ok(Some(json!({"name": "Red Velvet"}))));

        let service = service(cache, provider);

        service.search("Red%20Velvet", "artist").await.unwrap();
        service.search("Red+Velvet", "artist").await.unwrap();
    }

    #[tokio::test]
    async fn test_round_trip_preserves_structure() {
        let payload = json!({
            "id": "1",
            "name": "Fancy",
            "artists": [{"name": "TWICE"}],
            "popularity": 71,
            "explicit": false,
            "preview_url": null,
            "duration_ms": 213_880
        });
        let cache = Arc::new(InMemoryCache::new());
        let mut provider = MockSearchProvider::new();
        let upstream = payload.clone();
        provider
            .expect_search()
            .times(1)
            .returning(move |_, _| Ok(Some(upstream.clone())));

        service(cache.clone(), provider)
            .search("Fancy", "track")
            .await
            .unwrap();

        let cached: Option<SearchResult> = cache.get_json("spotify:track:Fancy").await.unwrap();
        assert_eq!(cached, Some(payload));
    }
}
