//! Infrastructure services

mod search_service;

pub use search_service::{SearchService, SearchServiceTrait, DEFAULT_SEARCH_CACHE_TTL};
