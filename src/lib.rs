//! Spotify Search Proxy
//!
//! Caching proxy in front of the Spotify Web API search endpoint:
//! - One result per search, for artists, albums or tracks
//! - Results cached for a day in Redis or in process memory
//! - Client-credentials token renewed before it expires

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use domain::Cache;
use infrastructure::{
    cache::CacheFactory,
    services::{SearchService, SearchServiceTrait},
    spotify::{HttpClient, SpotifyClient},
};
use tracing::info;

/// Long-lived services shared by the HTTP server and the CLI
#[derive(Debug, Clone)]
pub struct Components {
    pub cache: Arc<dyn Cache>,
    pub search_service: Arc<dyn SearchServiceTrait>,
}

/// Wires the cache, the Spotify client and the search service
///
/// Fetches the first access token, so this fails when the credentials are
/// missing or rejected.
pub async fn build_components(config: &AppConfig) -> anyhow::Result<Components> {
    let credentials = config.spotify.credentials()?;

    let cache = CacheFactory::new().create(&config.cache)?;
    info!(backend = cache.backend_name(), "Cache initialized");

    let http = HttpClient::with_timeout(config.spotify.request_timeout())?;
    let spotify = SpotifyClient::connect(http, credentials, config.spotify.client_config()).await?;

    let search_service = SearchService::new(cache.clone(), Arc::new(spotify))
        .with_cache_ttl(config.search.cache_ttl());

    Ok(Components {
        cache,
        search_service: Arc::new(search_service),
    })
}

/// Application state for the HTTP server
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let components = build_components(config).await?;
    Ok(AppState::new(components.search_service, components.cache))
}
