//! Dashboard request handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::export;
use super::filter::{Filters, Overview};
use super::DashboardState;
use crate::adapter::inbound::http::Problem;
use crate::api::client::RawResponse;
use crate::error::Error;

fn upstream_problem(err: &Error) -> Problem {
    tracing::warn!(error = %err, "API request failed");
    Problem::new(StatusCode::BAD_GATEWAY, "API Unavailable").with_detail(err.to_string())
}

async fn load(state: &DashboardState, filters: &Filters) -> Result<Overview, Problem> {
    filters.validate().map_err(Problem::bad_request)?;
    let client = &state.client;
    let (metrics, performance, frequency) = tokio::try_join!(
        client.metrics(),
        client.performance(),
        client.activity_frequency()
    )
    .map_err(|e| upstream_problem(&e))?;
    Ok(Overview::build(metrics, performance, frequency, filters))
}

fn csv_download(filename: &str, body: String) -> Response {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/csv; charset=utf-8")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn relay(raw: RawResponse) -> Response {
    let mut resp = (raw.status, raw.body).into_response();
    if let Some(value) = raw
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
    {
        resp.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    resp
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn overview(
    State(state): State<DashboardState>,
    Query(filters): Query<Filters>,
) -> Result<Json<Overview>, Problem> {
    load(&state, &filters).await.map(Json)
}

pub async fn bottleneck_csv(
    State(state): State<DashboardState>,
    Query(filters): Query<Filters>,
) -> Result<Response, Problem> {
    let overview = load(&state, &filters).await?;
    Ok(csv_download(
        "bottleneck.csv",
        export::bottleneck_csv(&overview.bottleneck),
    ))
}

pub async fn throughput_csv(
    State(state): State<DashboardState>,
    Query(filters): Query<Filters>,
) -> Result<Response, Problem> {
    let overview = load(&state, &filters).await?;
    Ok(csv_download(
        "throughput.csv",
        export::throughput_csv(&overview.throughput),
    ))
}

pub async fn activity_frequency_csv(
    State(state): State<DashboardState>,
    Query(filters): Query<Filters>,
) -> Result<Response, Problem> {
    let overview = load(&state, &filters).await?;
    Ok(csv_download(
        "activity_frequency.csv",
        export::activity_frequency_csv(&overview.activity_frequency),
    ))
}

#[derive(Debug, Default, Deserialize)]
pub struct MinerQuery {
    pub miner: Option<String>,
}

/// Relays the API's PNG rendering, errors included.
pub async fn process_map(
    State(state): State<DashboardState>,
    Query(query): Query<MinerQuery>,
) -> Result<Response, Problem> {
    let mut params = vec![("format", "png".to_string())];
    if let Some(miner) = query.miner {
        params.push(("miner", miner));
    }
    state
        .client
        .get_raw("/api/process-map/", &params)
        .await
        .map(relay)
        .map_err(|e| upstream_problem(&e))
}

pub async fn predict_duration(
    State(state): State<DashboardState>,
    Path(case_id): Path<String>,
) -> Result<Response, Problem> {
    state
        .client
        .predict_duration_raw(&case_id)
        .await
        .map(relay)
        .map_err(|e| upstream_problem(&e))
}
