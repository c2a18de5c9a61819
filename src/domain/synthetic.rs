//! Synthetic issue-tracker event logs for demos and tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::event::Event;

pub const ACTIVITIES: [&str; 8] = [
    "Create Issue",
    "Assign Issue",
    "Start Work",
    "Commit Code",
    "Code Review",
    "Resolve Issue",
    "Reopen Issue",
    "Close Issue",
];

const RESOURCE_COUNT: u32 = 50;
const CASE_SPAN_DAYS: i64 = 30;

/// Generator parameters.
#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub cases: usize,
    pub min_events: usize,
    pub max_events: usize,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            cases: 500,
            min_events: 20,
            max_events: 80,
            window_start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            window_end: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single().unwrap_or_default(),
            seed: None,
        }
    }
}

/// Random events, chronological within each case, cases in id order.
///
/// Each case starts somewhere in the window (leaving room for a 30-day
/// span) and its events fall within the 30 days after that start.
#[must_use]
pub fn generate(config: &SyntheticConfig) -> Vec<Event> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let latest_start = config.window_end - Duration::days(CASE_SPAN_DAYS);
    let start_range = (latest_start - config.window_start).num_seconds().max(0);
    let span_secs = Duration::days(CASE_SPAN_DAYS).num_seconds();
    let (lo, hi) = if config.min_events <= config.max_events {
        (config.min_events, config.max_events)
    } else {
        (config.max_events, config.min_events)
    };

    let mut events = Vec::new();
    for case_num in 1..=config.cases {
        let case_id = format!("CASE_{case_num:04}");
        let case_start = config.window_start + Duration::seconds(rng.gen_range(0..=start_range));
        let n_events = rng.gen_range(lo..=hi);

        let mut offsets: Vec<i64> = (0..n_events)
            .map(|_| rng.gen_range(0..=span_secs))
            .collect();
        offsets.sort_unstable();

        for offset in offsets {
            let activity = ACTIVITIES.choose(&mut rng).copied().unwrap_or(ACTIVITIES[0]);
            let resource = format!("user_{:03}", rng.gen_range(1..=RESOURCE_COUNT));
            events.push(Event::new(
                case_id.clone(),
                activity,
                case_start + Duration::seconds(offset),
                resource,
            ));
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(seed: u64) -> SyntheticConfig {
        SyntheticConfig {
            cases: 12,
            min_events: 3,
            max_events: 6,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn seeded_output_is_deterministic() {
        assert_eq!(generate(&small(7)), generate(&small(7)));
    }

    #[test]
    fn respects_case_and_event_bounds() {
        let config = small(42);
        let events = generate(&config);
        let log = crate::domain::event::EventLog::from_events(events);
        assert_eq!(log.case_count(), 12);
        for trace in log.traces() {
            assert!((3..=6).contains(&trace.events.len()));
            assert!(trace.duration_hours() <= (CASE_SPAN_DAYS * 24) as f64);
            assert!(trace.start().unwrap() >= config.window_start);
            assert!(trace.end().unwrap() <= config.window_end);
        }
        assert_eq!(log.traces()[0].case_id, "CASE_0001");
    }

    #[test]
    fn uses_known_activities_and_resources() {
        for event in generate(&small(1)) {
            assert!(ACTIVITIES.contains(&event.activity.as_str()));
            assert!(event.resource.starts_with("user_"));
        }
    }
}
