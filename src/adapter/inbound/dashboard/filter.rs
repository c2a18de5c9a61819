//! Dashboard filters and the filtered overview.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::types::{ActivityFrequencyResponse, MetricsResponse, PerformanceResponse};
use crate::domain::conformance::ConformanceReport;
use crate::domain::metrics::{ActivityCount, Bottleneck, CycleTimeSummary, ThroughputPoint};

/// Bottlenecks shown in the overview.
pub const TOP_BOTTLENECKS: usize = 10;

/// Date range (inclusive) and activity selection from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Filters {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Comma-separated activity names; absent or empty selects all.
    pub activities: Option<String>,
}

impl Filters {
    /// # Errors
    ///
    /// Returns a message when `start` is after `end`.
    pub fn validate(&self) -> Result<(), String> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => {
                Err(format!("start {start} is after end {end}"))
            }
            _ => Ok(()),
        }
    }

    fn selected(&self) -> Option<BTreeSet<&str>> {
        let set: BTreeSet<&str> = self
            .activities
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .collect();
        (!set.is_empty()).then_some(set)
    }

    #[must_use]
    pub fn includes_date(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    #[must_use]
    pub fn includes_activity(&self, activity: &str) -> bool {
        self.selected().map_or(true, |set| set.contains(activity))
    }

    #[must_use]
    pub fn bottlenecks(&self, rows: Vec<Bottleneck>) -> Vec<Bottleneck> {
        rows.into_iter()
            .filter(|b| self.includes_activity(&b.activity))
            .collect()
    }

    #[must_use]
    pub fn throughput(&self, rows: Vec<ThroughputPoint>) -> Vec<ThroughputPoint> {
        rows.into_iter().filter(|t| self.includes_date(t.date)).collect()
    }

    #[must_use]
    pub fn activity_counts(&self, rows: Vec<ActivityCount>) -> Vec<ActivityCount> {
        rows.into_iter()
            .filter(|c| self.includes_date(c.date) && self.includes_activity(&c.activity))
            .collect()
    }
}

/// Everything the dashboard page displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub metrics: CycleTimeSummary,
    pub bottleneck: Vec<Bottleneck>,
    pub throughput: Vec<ThroughputPoint>,
    pub conformance: ConformanceReport,
    pub activity_frequency: Vec<ActivityCount>,
}

impl Overview {
    /// Apply `filters` to the API answers. The summary metrics are global.
    #[must_use]
    pub fn build(
        metrics: MetricsResponse,
        performance: PerformanceResponse,
        frequency: ActivityFrequencyResponse,
        filters: &Filters,
    ) -> Self {
        let mut bottleneck = filters.bottlenecks(metrics.bottleneck);
        bottleneck.truncate(TOP_BOTTLENECKS);
        Self {
            metrics: metrics.metrics,
            bottleneck,
            throughput: filters.throughput(performance.throughput),
            conformance: performance.conformance,
            activity_frequency: filters.activity_counts(frequency.activity_counts),
        }
    }
}
