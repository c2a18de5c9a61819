//! Case-level feature engineering shared by training and prediction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::event::{EventLog, Trace};

/// Number of model input features.
pub const FEATURE_COUNT: usize = 3;

/// Feature vector describing one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFeatures {
    pub case_id: String,
    pub total_events: usize,
    pub unique_activities: usize,
    pub unique_resources: usize,
    /// Observed duration, the regression target.
    pub duration_hours: f64,
    /// Observed reopens, the classification label source.
    pub reopen_count: usize,
}

impl CaseFeatures {
    #[must_use]
    pub fn from_trace(trace: &Trace) -> Self {
        let activities: HashSet<&str> = trace.activities().collect();
        let resources: HashSet<&str> = trace
            .events
            .iter()
            .map(|e| e.resource.as_str())
            .filter(|r| !r.is_empty())
            .collect();

        Self {
            case_id: trace.case_id.clone(),
            total_events: trace.events.len(),
            unique_activities: activities.len(),
            unique_resources: resources.len(),
            duration_hours: trace.duration_hours(),
            reopen_count: trace.reopen_count(),
        }
    }

    /// Model inputs in a fixed order.
    #[must_use]
    pub fn vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.total_events as f64,
            self.unique_activities as f64,
            self.unique_resources as f64,
        ]
    }

    #[must_use]
    pub fn will_reopen(&self) -> bool {
        self.reopen_count > 0
    }
}

#[must_use]
pub fn case_features(log: &EventLog) -> Vec<CaseFeatures> {
    log.traces().iter().map(CaseFeatures::from_trace).collect()
}
