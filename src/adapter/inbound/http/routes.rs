//! Route registration for the REST API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;
use crate::port::EventStore;

/// Build the API router over `state`.
pub fn router<S: EventStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::<S>))
        .route("/api/metrics/", get(handlers::metrics::<S>))
        .route("/api/performance/", get(handlers::performance::<S>))
        .route("/api/activity-frequency/", get(handlers::activity_frequency::<S>))
        .route("/api/process-map/", get(handlers::process_map::<S>))
        .route("/api/cases/{case_id}/", get(handlers::case::<S>))
        .route(
            "/api/predict-duration/{case_id}/",
            get(handlers::predict_duration::<S>),
        )
        .route(
            "/api/predict-reopen-risk/",
            post(handlers::predict_reopen_risk::<S>),
        )
        .route("/api/retrain/", post(handlers::retrain::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapter::outbound::graphviz::GraphvizRenderer;
    use crate::adapter::outbound::model_store::ModelStore;
    use crate::application::MiningService;
    use crate::testkit::store::sample_store;

    async fn app(dir: &std::path::Path) -> Router {
        let service = MiningService::new(
            sample_store().await,
            ModelStore::new(dir),
            GraphvizRenderer::new("procmine-missing-dot"),
        );
        router(AppState::new(service, false))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_reports_database() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(app(dir.path()).await, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "ok");
    }

    #[tokio::test]
    async fn unknown_miner_is_a_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            get_json(app(dir.path()).await, "/api/process-map/?miner=alpha").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["title"], "Unknown Miner");
    }

    #[tokio::test]
    async fn missing_graphviz_is_service_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(app(dir.path()).await, "/api/process-map/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], 503);
    }
}
