//! Application state for shared services

use std::sync::Arc;

use crate::domain::Cache;
use crate::infrastructure::services::SearchServiceTrait;

/// Shared handles passed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub search_service: Arc<dyn SearchServiceTrait>,
    /// Probed by the readiness check
    pub cache: Arc<dyn Cache>,
}

impl AppState {
    pub fn new(search_service: Arc<dyn SearchServiceTrait>, cache: Arc<dyn Cache>) -> Self {
        Self {
            search_service,
            cache,
        }
    }
}
