use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use super::http_client::HttpClientTrait;
use super::token::{AccessToken, ClientCredentials, TokenResponse};
use crate::domain::{DomainError, SearchKind, SearchProvider, SearchResult};
use crate::infrastructure::observability::record_token_renewal;

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com";

/// Endpoints and timing for the Spotify client
#[derive(Debug, Clone)]
pub struct SpotifyClientConfig {
    pub token_url: String,
    pub api_base_url: String,
    /// Renew once the token has less than this left
    pub renewal_margin: Duration,
    /// `limit` sent with every search; only the first item is used
    pub search_limit: u32,
}

impl Default for SpotifyClientConfig {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            renewal_margin: Duration::from_secs(5 * 60),
            search_limit: 1,
        }
    }
}

impl SpotifyClientConfig {
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_renewal_margin(mut self, margin: Duration) -> Self {
        self.renewal_margin = margin;
        self
    }
}

struct Inner<C> {
    http: C,
    credentials: ClientCredentials,
    config: SpotifyClientConfig,
    token: RwLock<Arc<AccessToken>>,
}

/// Spotify Web API search client
///
/// Owns the access token. Searches take a read lock only long enough to clone
/// the current token; renewal takes the write lock and re-checks the token
/// before calling the token endpoint, so concurrent searches that all see a
/// near-expiry token trigger a single renewal.
pub struct SpotifyClient<C: HttpClientTrait + 'static> {
    inner: Arc<Inner<C>>,
}

impl<C: HttpClientTrait + 'static> Clone for SpotifyClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: HttpClientTrait + 'static> std::fmt::Debug for SpotifyClient<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("http", &self.inner.http)
            .field("credentials", &self.inner.credentials)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<C: HttpClientTrait + 'static> SpotifyClient<C> {
    /// Creates a client without a token; the first search renews it
    pub fn new(http: C, credentials: ClientCredentials, config: SpotifyClientConfig) -> Self {
        Self::with_token(http, credentials, config, AccessToken::expired())
    }

    /// Creates a client seeded with an existing token
    pub fn with_token(
        http: C,
        credentials: ClientCredentials,
        config: SpotifyClientConfig,
        token: AccessToken,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                credentials,
                config,
                token: RwLock::new(Arc::new(token)),
            }),
        }
    }

    /// Creates a client and fetches its first token, failing if that fails
    pub async fn connect(
        http: C,
        credentials: ClientCredentials,
        config: SpotifyClientConfig,
    ) -> Result<Self, DomainError> {
        let client = Self::new(http, credentials, config);
        let token = client.ensure_token().await?;

        info!(
            client_id = %client.inner.credentials.client_id(),
            expires_at = %token.expires_at(),
            "Obtained Spotify access token"
        );

        Ok(client)
    }

    /// Snapshot of the token currently in use
    pub async fn current_token(&self) -> Arc<AccessToken> {
        Arc::clone(&*self.inner.token.read().await)
    }

    /// Returns a token valid for at least the renewal margin, renewing if needed
    ///
    /// Renewal runs on its own task so it completes even when the caller is
    /// cancelled.
    pub async fn ensure_token(&self) -> Result<Arc<AccessToken>, DomainError> {
        {
            let token = self.inner.token.read().await;
            if token.is_valid_for(self.inner.config.renewal_margin) {
                return Ok(Arc::clone(&token));
            }
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.renew_if_needed().await })
            .await
            .map_err(|e| DomainError::credential(format!("Token renewal task failed: {}", e)))?
    }

    fn search_url(&self) -> String {
        format!("{}/v1/search", self.inner.config.api_base_url)
    }
}

impl<C: HttpClientTrait> Inner<C> {
    async fn renew_if_needed(&self) -> Result<Arc<AccessToken>, DomainError> {
        let mut token = self.token.write().await;

        // another task may have renewed while we waited for the lock
        if token.is_valid_for(self.config.renewal_margin) {
            debug!("Access token already renewed");
            return Ok(Arc::clone(&token));
        }

        match self.fetch_token().await {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                *token = Arc::clone(&fresh);
                record_token_renewal("success");
                debug!(expires_at = %fresh.expires_at(), "Renewed Spotify access token");
                Ok(fresh)
            }
            Err(e) => {
                record_token_renewal("failure");
                warn!(error = %e, "Failed to renew Spotify access token");
                Err(e)
            }
        }
    }

    async fn fetch_token(&self) -> Result<AccessToken, DomainError> {
        let auth_header = self.credentials.basic_auth_header();
        let issued_at = Utc::now();

        let json = self
            .http
            .post_form(
                &self.config.token_url,
                vec![("Authorization", auth_header.as_str())],
                &[("grant_type", "client_credentials")],
            )
            .await
            .map_err(|e| DomainError::credential(format!("Failed to obtain access token: {}", e)))?;

        let response: TokenResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::credential(format!("Failed to parse token response: {}", e))
        })?;

        AccessToken::from_response(response, issued_at)
    }
}

/// Picks `<kind>s.items[0]` out of a search response
fn first_item(response: &serde_json::Value, kind: SearchKind) -> Option<SearchResult> {
    response
        .get(kind.results_field())
        .and_then(|page| page.get("items"))
        .and_then(|items| items.as_array())
        .and_then(|items| items.first())
        .cloned()
}

#[async_trait]
impl<C: HttpClientTrait + 'static> SearchProvider for SpotifyClient<C> {
    #[instrument(skip(self, kind), fields(kind = %kind))]
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
    ) -> Result<Option<SearchResult>, DomainError> {
        let token = self.ensure_token().await?;
        let auth_header = token.authorization_header();
        let limit = self.inner.config.search_limit.to_string();

        let response = self
            .inner
            .http
            .get_json(
                &self.search_url(),
                vec![("Authorization", auth_header.as_str())],
                &[("q", query), ("type", kind.as_str()), ("limit", limit.as_str())],
            )
            .await?;

        let item = first_item(&response, kind);
        if item.is_none() {
            debug!("Spotify returned no candidates");
        }

        Ok(item)
    }
}
