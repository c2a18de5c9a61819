//! Event log primitives.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Activity name that marks a reopened case.
pub const REOPEN_ACTIVITY: &str = "Reopen Issue";

/// A single recorded activity occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub case_id: String,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub resource: String,
}

impl Event {
    pub fn new(
        case_id: impl Into<String>,
        activity: impl Into<String>,
        timestamp: DateTime<Utc>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            activity: activity.into(),
            timestamp,
            resource: resource.into(),
        }
    }
}

/// Case-level attributes kept alongside the events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub reopen_count: i32,
    pub assignee: String,
    pub issue_type: String,
}

/// Events of one case in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub case_id: String,
    pub events: Vec<Event>,
}

impl Trace {
    #[must_use]
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.events.first().map(|e| e.timestamp)
    }

    #[must_use]
    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(|e| e.timestamp)
    }

    /// Case duration in hours; zero for single-event traces.
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        match (self.start(), self.end()) {
            (Some(start), Some(end)) => hours_between(start, end),
            _ => 0.0,
        }
    }

    pub fn activities(&self) -> impl Iterator<Item = &str> {
        self.events.iter().map(|e| e.activity.as_str())
    }

    /// Number of reopen events in the trace.
    #[must_use]
    pub fn reopen_count(&self) -> usize {
        self.activities().filter(|a| *a == REOPEN_ACTIVITY).count()
    }
}

/// Events grouped by case, each trace sorted by time.
///
/// Traces are ordered by case id so every derived report is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    traces: Vec<Trace>,
    total_events: usize,
}

impl EventLog {
    #[must_use]
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut by_case: BTreeMap<String, Vec<Event>> = BTreeMap::new();
        let mut total_events = 0;
        for event in events {
            total_events += 1;
            by_case.entry(event.case_id.clone()).or_default().push(event);
        }

        let traces = by_case
            .into_iter()
            .map(|(case_id, mut events)| {
                // stable: ties keep insertion order
                events.sort_by_key(|e| e.timestamp);
                Trace { case_id, events }
            })
            .collect();

        Self {
            traces,
            total_events,
        }
    }

    #[must_use]
    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    #[must_use]
    pub fn trace(&self, case_id: &str) -> Option<&Trace> {
        self.traces
            .binary_search_by(|t| t.case_id.as_str().cmp(case_id))
            .ok()
            .map(|idx| &self.traces[idx])
    }

    #[must_use]
    pub fn case_count(&self) -> usize {
        self.traces.len()
    }

    #[must_use]
    pub fn event_count(&self) -> usize {
        self.total_events
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.traces.iter().flat_map(|t| t.events.iter())
    }
}

/// Elapsed hours between two instants.
#[must_use]
pub fn hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds() as f64 / 3_600_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn groups_and_sorts_by_case() {
        let log = EventLog::from_events(vec![
            Event::new("B", "Close Issue", at(5), "u2"),
            Event::new("A", "Resolve Issue", at(3), "u1"),
            Event::new("A", "Create Issue", at(1), "u1"),
        ]);

        assert_eq!(log.case_count(), 2);
        assert_eq!(log.event_count(), 3);
        assert_eq!(log.traces()[0].case_id, "A");
        let acts: Vec<_> = log.trace("A").unwrap().activities().collect();
        assert_eq!(acts, ["Create Issue", "Resolve Issue"]);
    }

    #[test]
    fn duration_in_hours() {
        let log = EventLog::from_events(vec![
            Event::new("A", "Create Issue", at(1), ""),
            Event::new("A", "Close Issue", at(4), ""),
        ]);
        assert!((log.trace("A").unwrap().duration_hours() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn counts_reopens() {
        let log = EventLog::from_events(vec![
            Event::new("A", REOPEN_ACTIVITY, at(1), ""),
            Event::new("A", "Close Issue", at(2), ""),
            Event::new("A", REOPEN_ACTIVITY, at(3), ""),
        ]);
        assert_eq!(log.trace("A").unwrap().reopen_count(), 2);
    }

    #[test]
    fn missing_case_lookup() {
        assert!(EventLog::default().trace("nope").is_none());
    }
}
