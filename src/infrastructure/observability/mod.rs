//! Observability infrastructure - Tracing and Metrics

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use metrics::{
    create_metrics_router, init_metrics, record_cache_error, record_http_request, record_search,
    record_token_renewal, PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
pub(crate) use tracing_setup::env_filter;
