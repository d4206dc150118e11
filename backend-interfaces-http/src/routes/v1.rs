use axum::Router;

use backend_application::AppState;

use crate::handlers::{analyze_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", axum::routing::get(analyze_handlers::upload_page))
        .route(
            "/v1/analyze/upload",
            axum::routing::post(analyze_handlers::upload_activity),
        )
        .route(
            "/v1/ops/health/live",
            axum::routing::get(ops_handlers::health_live),
        )
        .route(
            "/v1/ops/health/ready",
            axum::routing::get(ops_handlers::health_ready),
        )
        .route(
            "/v1/ops/metrics/prometheus",
            axum::routing::get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
