//! Builders for domain primitives used across tests.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::ingest::events_to_csv;
use crate::domain::{Event, EventLog, REOPEN_ACTIVITY};

const LIFECYCLE: [&str; 7] = [
    "Create Issue",
    "Assign Issue",
    "Start Work",
    "Commit Code",
    "Code Review",
    "Resolve Issue",
    "Close Issue",
];

/// Midnight UTC on 2024-01-01 plus `hours`.
pub fn at(hours: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(hours)
}

/// Shorthand event constructor.
pub fn event(case_id: &str, activity: &str, hours: i64, resource: &str) -> Event {
    Event::new(case_id, activity, at(hours), resource)
}

/// Events of twenty cases with varied lengths, activity sets and resources.
///
/// Every third case ends with a reopen, so both model classes are present.
pub fn sample_events() -> Vec<Event> {
    let mut events = Vec::new();
    for i in 0..20usize {
        let case_id = format!("CASE_{:04}", i + 1);
        let n = 4 + (i * 7) % 9;
        let distinct = 2 + (i * 3) % 5;
        let resources = 1 + (i * 2) % 3;
        let step = 1 + (i % 4) as i64;
        let start = (i as i64) * 24;

        for j in 0..n {
            let activity = if i % 3 == 0 && j == n - 1 {
                REOPEN_ACTIVITY
            } else {
                LIFECYCLE[j % distinct]
            };
            let resource = format!("user_{:03}", 1 + j % resources);
            events.push(event(&case_id, activity, start + j as i64 * step, &resource));
        }
    }
    events
}

/// Twenty cases of two to six events where no activity repeats within a
/// case, so event and distinct-activity counts coincide.
///
/// Every third case ends with a reopen.
pub fn distinct_activity_events() -> Vec<Event> {
    let mut events = Vec::new();
    for i in 0..20usize {
        let case_id = format!("CASE_{:04}", i + 1);
        let n = 2 + i % 5;
        let start = (i as i64) * 24;
        for j in 0..n {
            let activity = if i % 3 == 0 && j == n - 1 {
                REOPEN_ACTIVITY
            } else {
                LIFECYCLE[j]
            };
            let resource = format!("u{}", 1 + (i + j) % 3);
            events.push(event(&case_id, activity, start + (j * (1 + i % 4)) as i64, &resource));
        }
    }
    events
}

pub fn sample_log() -> EventLog {
    EventLog::from_events(sample_events())
}

/// [`sample_events`] as an importable CSV document.
pub fn sample_csv() -> String {
    events_to_csv(&sample_events())
}
