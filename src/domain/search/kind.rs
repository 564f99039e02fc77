//! Search kind: which catalog entity a search targets

use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// The three searchable catalog entities
///
/// Parsed once from the request token and passed by value to every layer below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchKind {
    Artist,
    Album,
    Track,
}

impl SearchKind {
    pub const ALL: [SearchKind; 3] = [SearchKind::Artist, SearchKind::Album, SearchKind::Track];

    /// Token used in routes, cache keys and the upstream `type` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Artist => "artist",
            SearchKind::Album => "album",
            SearchKind::Track => "track",
        }
    }

    /// Name of the paging object holding this kind's candidates in a search response
    pub fn results_field(&self) -> &'static str {
        match self {
            SearchKind::Artist => "artists",
            SearchKind::Album => "albums",
            SearchKind::Track => "tracks",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "artist" => Ok(SearchKind::Artist),
            "album" => Ok(SearchKind::Album),
            "track" => Ok(SearchKind::Track),
            _ => Err(DomainError::invalid_query_type(s)),
        }
    }
}
