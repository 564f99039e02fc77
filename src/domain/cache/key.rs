//! Cache key derivation for search results

use std::fmt;

use crate::domain::search::SearchKind;

/// Namespace shared by every search result entry
pub const SEARCH_KEY_NAMESPACE: &str = "spotify";

/// Key under which a search result is cached
///
/// Built from the raw, still-encoded query. Two encodings of the same text
/// produce two different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_search(kind: SearchKind, raw_query: &str) -> Self {
        Self(format!(
            "{}:{}:{}",
            SEARCH_KEY_NAMESPACE,
            kind.as_str(),
            raw_query
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_format() {
        let key = CacheKey::for_search(SearchKind::Artist, "TWICE");
        assert_eq!(key.as_str(), "spotify:artist:TWICE");
    }

    #[test]
    fn test_key_is_stable() {
        let a = CacheKey::for_search(SearchKind::Track, "dynamite");
        let b = CacheKey::for_search(SearchKind::Track, "dynamite");
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_differs_by_kind() {
        let artist = CacheKey::for_search(SearchKind::Artist, "Queen");
        let album = CacheKey::for_search(SearchKind::Album, "Queen");
        assert_ne!(artist, album);
    }

    #[test]
    fn test_raw_query_is_not_normalized() {
        let encoded = CacheKey::for_search(SearchKind::Artist, "AC%2FDC");
        let literal = CacheKey::for_search(SearchKind::Artist, "AC/DC");

        assert_ne!(encoded, literal);
        assert_eq!(encoded.to_string(), "spotify:artist:AC%2FDC");
        assert_eq!(literal.to_string(), "spotify:artist:AC/DC");
    }
}
