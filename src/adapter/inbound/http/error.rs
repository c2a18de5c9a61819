//! HTTP error mapping to RFC-9457 Problem Details

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{Error, ModelError};

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request").with_detail(detail)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map a crate error to a problem document.
///
/// Client errors always carry their detail. Server-side failures carry it
/// only when `debug` is set.
pub fn map_error(err: &Error, debug: bool) -> Problem {
    let (status, title) = match err {
        Error::Ingest(e) => {
            return Problem::new(StatusCode::BAD_REQUEST, "Invalid Event Log").with_detail(e.to_string())
        }
        Error::Model(ModelError::InsufficientData { .. }) => {
            return Problem::new(StatusCode::UNPROCESSABLE_ENTITY, "Training Failed")
                .with_detail(err.to_string())
        }
        Error::Model(ModelError::NotTrained(model)) => {
            return Problem::new(StatusCode::SERVICE_UNAVAILABLE, "Model Not Trained").with_detail(
                format!("the {model} model has not been trained; POST /api/retrain/ first"),
            )
        }
        Error::Render(_) => (StatusCode::SERVICE_UNAVAILABLE, "Process Map Rendering Unavailable"),
        Error::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database Error"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
    };

    error!(error = %err, status = status.as_u16(), "Request failed");
    let problem = Problem::new(status, title);
    if debug {
        problem.with_detail(err.to_string())
    } else {
        problem
    }
}
