//! Dashboard tests against a live API on an ephemeral port.

mod harness;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use harness::temp_db::TempDb;
use procmine::adapter::inbound::dashboard;
use procmine::adapter::inbound::http::{router, AppState};
use procmine::adapter::outbound::graphviz::GraphvizRenderer;
use procmine::adapter::outbound::model_store::ModelStore;
use procmine::api::ApiClient;
use procmine::application::MiningService;
use procmine::port::EventStore;
use procmine::testkit::config;
use procmine::testkit::domain::sample_events;

/// Start the API in the background and return a dashboard pointed at it.
async fn dashboard_over_api(db: &TempDb) -> Router {
    let store = db.store();
    store.ingest(sample_events()).await.unwrap();
    let service = MiningService::new(
        store,
        ModelStore::new(db.dir().join("models")),
        GraphvizRenderer::new("procmine-missing-dot"),
    );
    let api = router(AppState::new(service, false));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, api).await.unwrap();
    });

    let client = ApiClient::new(format!("http://{addr}"), config::client(2)).unwrap();
    dashboard::router(client)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let resp = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap().to_vec();
    (status, content_type, body)
}

#[tokio::test]
async fn overview_without_filters_covers_everything() {
    let db = TempDb::create("dash-overview");
    let app = dashboard_over_api(&db).await;

    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let overview: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(overview["metrics"]["total_cases"], 20);
    assert!(overview["bottleneck"].as_array().unwrap().len() <= 10);
    assert_eq!(overview["conformance"]["total_cases"], 20);
}

#[tokio::test]
async fn date_and_activity_filters_narrow_the_tables() {
    let db = TempDb::create("dash-filter");
    let app = dashboard_over_api(&db).await;

    let (status, _, body) = get(
        &app,
        "/?start=2024-01-02&end=2024-01-05&activities=Create%20Issue,Start%20Work",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let overview: Value = serde_json::from_slice(&body).unwrap();

    for point in overview["throughput"].as_array().unwrap() {
        let date = point["date"].as_str().unwrap();
        assert!(("2024-01-02"..="2024-01-05").contains(&date), "{date}");
    }
    let counts = overview["activity_frequency"].as_array().unwrap();
    assert!(!counts.is_empty());
    for count in counts {
        let activity = count["activity"].as_str().unwrap();
        assert!(activity == "Create Issue" || activity == "Start Work");
    }
}

#[tokio::test]
async fn reversed_dates_are_rejected() {
    let db = TempDb::create("dash-reversed");
    let app = dashboard_over_api(&db).await;
    let (status, _, _) = get(&app, "/?start=2024-02-01&end=2024-01-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn csv_exports_are_downloads() {
    let db = TempDb::create("dash-csv");
    let app = dashboard_over_api(&db).await;

    let (status, content_type, body) = get(&app, "/download/activity_frequency.csv").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/csv"));
    let text = String::from_utf8(body).unwrap();
    assert!(text.starts_with("activity,date,count\n"));
    assert!(text.lines().count() > 1);

    let (_, _, body) = get(&app, "/download/bottleneck.csv?activities=Create%20Issue").await;
    let text = String::from_utf8(body).unwrap();
    assert!(text.lines().skip(1).all(|l| l.starts_with("Create Issue,")));
}

#[tokio::test]
async fn prediction_proxy_relays_api_answers() {
    let db = TempDb::create("dash-predict");
    let app = dashboard_over_api(&db).await;

    let (status, _, body) = get(&app, "/predict-duration/NOPE").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Case not found");

    let (status, _, _) = get(&app, "/predict-duration/CASE_0001").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unreachable_api_is_a_bad_gateway() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = ApiClient::new(format!("http://127.0.0.1:{port}"), config::client(1)).unwrap();
    let app = dashboard::router(client);

    let (status, _, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let problem: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(problem["title"], "API Unavailable");

    let (status, _, _) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}
