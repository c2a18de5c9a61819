//! Cycle-time, bottleneck, throughput and activity-frequency metrics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::event::{hours_between, EventLog};

/// Case-level cycle-time summary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleTimeSummary {
    pub total_cases: usize,
    pub total_events: usize,
    pub avg_cycle_time_hours: f64,
    pub max_cycle_time_hours: f64,
}

/// Mean waiting time attributed to one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub activity: String,
    pub avg_hours: f64,
}

/// Cases completed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThroughputPoint {
    pub date: NaiveDate,
    pub count: usize,
}

/// Occurrences of one activity on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCount {
    pub activity: String,
    pub date: NaiveDate,
    pub count: usize,
}

#[must_use]
pub fn cycle_time(log: &EventLog) -> CycleTimeSummary {
    let durations: Vec<f64> = log.traces().iter().map(|t| t.duration_hours()).collect();
    let (avg, max) = if durations.is_empty() {
        (0.0, 0.0)
    } else {
        let sum: f64 = durations.iter().sum();
        let max = durations.iter().copied().fold(f64::MIN, f64::max);
        (sum / durations.len() as f64, max)
    };

    CycleTimeSummary {
        total_cases: log.case_count(),
        total_events: log.event_count(),
        avg_cycle_time_hours: avg,
        max_cycle_time_hours: max,
    }
}

/// Mean gap between an event and its successor in the same case, per
/// activity of the earlier event.
///
/// The last event of every case has no successor and contributes nothing.
/// Sorted by descending mean, ties by activity name.
#[must_use]
pub fn bottlenecks(log: &EventLog) -> Vec<Bottleneck> {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for trace in log.traces() {
        for pair in trace.events.windows(2) {
            let gap = hours_between(pair[0].timestamp, pair[1].timestamp);
            let entry = sums.entry(pair[0].activity.as_str()).or_insert((0.0, 0));
            entry.0 += gap;
            entry.1 += 1;
        }
    }

    let mut result: Vec<Bottleneck> = sums
        .into_iter()
        .map(|(activity, (sum, n))| Bottleneck {
            activity: activity.to_string(),
            avg_hours: sum / n as f64,
        })
        .collect();
    result.sort_by(|a, b| {
        b.avg_hours
            .total_cmp(&a.avg_hours)
            .then_with(|| a.activity.cmp(&b.activity))
    });
    result
}

/// Cases completed per UTC day, keyed by the date of each case's last event.
#[must_use]
pub fn throughput(log: &EventLog) -> Vec<ThroughputPoint> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for end in log.traces().iter().filter_map(|t| t.end()) {
        *per_day.entry(end.date_naive()).or_default() += 1;
    }
    per_day
        .into_iter()
        .map(|(date, count)| ThroughputPoint { date, count })
        .collect()
}

/// Event counts per (UTC day, activity), ascending by date then activity.
#[must_use]
pub fn activity_frequency(log: &EventLog) -> Vec<ActivityCount> {
    let mut counts: BTreeMap<(NaiveDate, &str), usize> = BTreeMap::new();
    for event in log.events() {
        *counts
            .entry((event.timestamp.date_naive(), event.activity.as_str()))
            .or_default() += 1;
    }
    counts
        .into_iter()
        .map(|((date, activity), count)| ActivityCount {
            activity: activity.to_string(),
            date,
            count,
        })
        .collect()
}
