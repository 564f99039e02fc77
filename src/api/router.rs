use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::search;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Routes only, no middleware
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .route("/search/{kind}", get(search::missing_query))
        .route("/search/{kind}/", get(search::missing_query))
        .route("/search/{kind}/{*query}", get(search::search))
        .with_state(state)
}

/// Full router with middleware and, when enabled, the metrics endpoint
pub fn create_router(
    state: AppState,
    metrics: Option<PrometheusMetrics>,
    request_timeout: Duration,
) -> Router {
    let mut router = create_routes(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}
