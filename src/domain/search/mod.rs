//! Search domain - kinds, queries and the upstream search port

mod kind;
mod provider;
mod query;

pub use kind::SearchKind;
pub use provider::SearchProvider;
pub use query::{unescape_query, SearchQuery};

#[cfg(test)]
pub use provider::MockSearchProvider;

/// An upstream result object, passed through untouched
pub type SearchResult = serde_json::Value;
