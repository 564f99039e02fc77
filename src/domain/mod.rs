//! Domain layer - Core search types, ports and errors

pub mod cache;
pub mod error;
pub mod search;

pub use cache::{Cache, CacheExt, CacheKey};
pub use error::{DomainError, ErrorCategory};
pub use search::{SearchKind, SearchProvider, SearchQuery, SearchResult};
