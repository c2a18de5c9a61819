use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::conformance::ConformanceReport;
use crate::domain::metrics::{ActivityCount, Bottleneck, CycleTimeSummary, ThroughputPoint};
use crate::domain::model::Evaluation;
use crate::domain::{CaseRecord, Event, RiskScore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResponse {
    pub metrics: CycleTimeSummary,
    pub bottleneck: Vec<Bottleneck>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceResponse {
    pub throughput: Vec<ThroughputPoint>,
    pub conformance: ConformanceReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFrequencyResponse {
    pub activity_counts: Vec<ActivityCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEvent {
    pub activity: String,
    pub timestamp: DateTime<Utc>,
    pub resource: String,
}

impl From<Event> for CaseEvent {
    fn from(event: Event) -> Self {
        Self {
            activity: event.activity,
            timestamp: event.timestamp,
            resource: event.resource,
        }
    }
}

/// A case with its events in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResponse {
    #[serde(flatten)]
    pub case: CaseRecord,
    pub events: Vec<CaseEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationPrediction {
    pub case_id: String,
    pub predicted_duration_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReopenRiskResponse {
    pub cases: Vec<RiskScore>,
}

/// Outcome of retraining both models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrainResponse {
    pub cases: usize,
    pub trained_at: DateTime<Utc>,
    /// `None` when the duration model could not be trained this time.
    pub duration: Option<Evaluation>,
    pub reopen_risk: Option<Evaluation>,
}

/// Legacy error body of the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
