//! Cache domain - key/value port with TTL and a distinguished miss

mod key;
mod repository;

pub use key::{CacheKey, SEARCH_KEY_NAMESPACE};
pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
