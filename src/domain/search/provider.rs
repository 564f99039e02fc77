use async_trait::async_trait;

use super::{SearchKind, SearchResult};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Port for the upstream catalog search
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Searches for `query` (already decoded) and returns the first candidate of `kind`.
    ///
    /// `Ok(None)` means the upstream answered but had no candidate for this kind.
    async fn search(
        &self,
        query: &str,
        kind: SearchKind,
    ) -> Result<Option<SearchResult>, DomainError>;
}
