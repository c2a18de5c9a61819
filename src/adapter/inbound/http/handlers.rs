//! HTTP request handlers - thin layer that delegates to the mining service

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::error::{map_error, Problem};
use super::AppState;
use crate::api::types::{
    ActivityFrequencyResponse, CaseResponse, ErrorBody, HealthResponse, MetricsResponse,
    PerformanceResponse, ReopenRiskResponse, RetrainResponse,
};
use crate::application::MapImage;
use crate::domain::{MapFormat, Miner};
use crate::port::EventStore;

pub const DOT_CONTENT_TYPE: &str = "text/vnd.graphviz";

/// Liveness plus database reachability.
pub async fn health<S: EventStore>(
    State(state): State<AppState<S>>,
) -> (StatusCode, Json<HealthResponse>) {
    let report = state.service.health().await;
    let database = report.check("database").is_some_and(|c| c.is_healthy());
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            status: if report.is_healthy() { "ok" } else { "unavailable" }.into(),
            database: if database { "ok" } else { "error" }.into(),
        }),
    )
}

pub async fn metrics<S: EventStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<MetricsResponse>, Problem> {
    state
        .service
        .metrics()
        .await
        .map(Json)
        .map_err(|e| map_error(&e, state.debug))
}

pub async fn performance<S: EventStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<PerformanceResponse>, Problem> {
    state
        .service
        .performance()
        .await
        .map(Json)
        .map_err(|e| map_error(&e, state.debug))
}

pub async fn activity_frequency<S: EventStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<ActivityFrequencyResponse>, Problem> {
    state
        .service
        .activity_frequency()
        .await
        .map(Json)
        .map_err(|e| map_error(&e, state.debug))
}

/// Query parameters of the process map
#[derive(Debug, Default, Deserialize)]
pub struct ProcessMapQuery {
    pub miner: Option<String>,
    pub format: Option<String>,
    pub threshold: Option<f64>,
}

pub async fn process_map<S: EventStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<ProcessMapQuery>,
) -> Result<Response, Problem> {
    let miner = Miner::parse(query.miner.as_deref().unwrap_or_default(), query.threshold)
        .map_err(|name| {
            Problem::new(StatusCode::BAD_REQUEST, "Unknown Miner")
                .with_detail(format!("miner `{name}` is not supported; use dfg or heuristic"))
        })?;
    let format: MapFormat = query
        .format
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|name| Problem::bad_request(format!("format `{name}` is not supported; use png or dot")))?;

    let image = state
        .service
        .process_map(miner, format)
        .await
        .map_err(|e| map_error(&e, state.debug))?;

    Ok(match image {
        MapImage::Png(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        MapImage::Dot(dot) => ([(header::CONTENT_TYPE, DOT_CONTENT_TYPE)], dot).into_response(),
    })
}

pub async fn case<S: EventStore>(
    State(state): State<AppState<S>>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseResponse>, Problem> {
    let case = state
        .service
        .case(&case_id)
        .await
        .map_err(|e| map_error(&e, state.debug))?;

    case.map(Json).ok_or_else(|| {
        Problem::new(StatusCode::NOT_FOUND, "Case Not Found")
            .with_detail(format!("case '{case_id}' was not found"))
            .with_instance(format!("/api/cases/{case_id}/"))
    })
}

/// Unknown cases answer the bare `{"error": "Case not found"}` body that
/// dashboard clients match on.
pub async fn predict_duration<S: EventStore>(
    State(state): State<AppState<S>>,
    Path(case_id): Path<String>,
) -> Result<Response, Problem> {
    let prediction = state
        .service
        .predict_duration(&case_id)
        .await
        .map_err(|e| map_error(&e, state.debug))?;

    Ok(match prediction {
        Some(prediction) => Json(prediction).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "Case not found".into(),
            }),
        )
            .into_response(),
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct TopQuery {
    pub top: Option<usize>,
}

/// Score an uploaded CSV event log (request body).
pub async fn predict_reopen_risk<S: EventStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<TopQuery>,
    body: String,
) -> Result<Json<ReopenRiskResponse>, Problem> {
    state
        .service
        .score_reopen_risk(&body, query.top)
        .map(Json)
        .map_err(|e| map_error(&e, state.debug))
}

pub async fn retrain<S: EventStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<RetrainResponse>, Problem> {
    state
        .service
        .retrain()
        .await
        .map(Json)
        .map_err(|e| map_error(&e, state.debug))
}
