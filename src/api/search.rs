//! Search endpoint

use axum::{extract::State, http::Uri, Json};
use tracing::{error, warn};

use super::state::AppState;
use super::types::ApiError;
use crate::domain::{DomainError, ErrorCategory, SearchResult};

const SEARCH_PREFIX: &str = "/search/";

/// Splits `/search/{kind}/{query}` into its still-encoded segments.
///
/// The query keeps everything after the kind, slashes included. Extractors
/// percent-decode path parameters, so the request path is read directly.
fn split_search_path(path: &str) -> Option<(&str, &str)> {
    let rest = path.strip_prefix(SEARCH_PREFIX)?;
    let (kind, query) = rest.split_once('/').unwrap_or((rest, ""));
    let query = query.strip_prefix('/').unwrap_or(query);

    Some((kind, query))
}

/// `GET /search/{kind}/{*query}`
///
/// The cache key is built from the raw query and decoding happens once
/// inside the search service.
pub async fn search(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Json<SearchResult>, ApiError> {
    let (kind, query) = split_search_path(uri.path()).unwrap_or_default();

    if kind.is_empty() {
        return Err(DomainError::validation("type is required").into());
    }

    if query.is_empty() {
        return Err(DomainError::validation("query is required").into());
    }

    match state.search_service.search(query, kind).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            match e.category() {
                ErrorCategory::UpstreamFailure => warn!(kind, query, error = %e, "Search failed upstream"),
                ErrorCategory::Internal | ErrorCategory::CacheDegradation => {
                    error!(kind, query, error = %e, "Search failed")
                }
                ErrorCategory::InvalidInput | ErrorCategory::NotFound => {}
            }

            Err(e.into())
        }
    }
}

/// `GET /search/{kind}` and `GET /search/{kind}/`
pub async fn missing_query() -> ApiError {
    DomainError::validation("query is required").into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_query_encoded() {
        assert_eq!(
            split_search_path("/search/artist/C%2B%2B"),
            Some(("artist", "C%2B%2B"))
        );
        assert_eq!(
            split_search_path("/search/track/100%25"),
            Some(("track", "100%25"))
        );
    }

    #[test]
    fn test_split_query_keeps_slashes() {
        assert_eq!(
            split_search_path("/search/artist/AC/DC"),
            Some(("artist", "AC/DC"))
        );
        assert_eq!(
            split_search_path("/search/artist/AC%2FDC"),
            Some(("artist", "AC%2FDC"))
        );
    }

    #[test]
    fn test_split_missing_query() {
        assert_eq!(split_search_path("/search/artist/"), Some(("artist", "")));
        assert_eq!(split_search_path("/search/artist"), Some(("artist", "")));
        assert_eq!(split_search_path("/health"), None);
    }
}
