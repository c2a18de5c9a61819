//! Dashboard route table.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::api::ApiClient;

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub client: ApiClient,
}

/// Build the dashboard router.
pub fn router(client: ApiClient) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::overview))
        .route("/download/bottleneck.csv", get(handlers::bottleneck_csv))
        .route("/download/throughput.csv", get(handlers::throughput_csv))
        .route(
            "/download/activity_frequency.csv",
            get(handlers::activity_frequency_csv),
        )
        .route("/process-map", get(handlers::process_map))
        .route("/predict-duration/{case_id}", get(handlers::predict_duration))
        .layer(TraceLayer::new_for_http())
        .with_state(DashboardState { client })
}
