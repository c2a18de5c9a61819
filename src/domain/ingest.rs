//! Event log CSV import and export.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

use super::csv::{read_records, write_rows};
use super::event::Event;
use crate::error::IngestError;

pub const EVENT_COLUMNS: [&str; 4] = ["case_id", "activity", "timestamp", "resource"];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an RFC 3339 timestamp, or a naive ISO 8601 one read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[must_use]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse an event CSV with a `case_id,activity,timestamp[,resource]` header.
///
/// Column order is free; extra columns are ignored.
///
/// # Errors
///
/// [`IngestError::Empty`] without a header, [`IngestError::MissingColumn`]
/// when a required column is absent, [`IngestError::InvalidRow`] naming
/// the first malformed line.
pub fn parse_events(input: &str) -> Result<Vec<Event>, IngestError> {
    let records = read_records(input).map_err(|line| IngestError::InvalidRow {
        line,
        reason: "unterminated quoted field".to_string(),
    })?;
    let mut records = records.into_iter();
    let header = records.next().ok_or(IngestError::Empty)?;

    let position = |name: &'static str| {
        header
            .fields
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}').eq_ignore_ascii_case(name))
    };
    let case_col = position("case_id").ok_or(IngestError::MissingColumn("case_id"))?;
    let activity_col = position("activity").ok_or(IngestError::MissingColumn("activity"))?;
    let time_col = position("timestamp").ok_or(IngestError::MissingColumn("timestamp"))?;
    let resource_col = position("resource");

    records
        .map(|record| {
            let field = |idx: usize| record.fields.get(idx).map_or("", |f| f.trim());
            let invalid = |reason: String| IngestError::InvalidRow {
                line: record.line,
                reason,
            };

            let case_id = field(case_col);
            if case_id.is_empty() {
                return Err(invalid("empty case_id".to_string()));
            }
            let activity = field(activity_col);
            if activity.is_empty() {
                return Err(invalid("empty activity".to_string()));
            }
            let raw_ts = field(time_col);
            let timestamp = parse_timestamp(raw_ts)
                .ok_or_else(|| invalid(format!("unparseable timestamp `{raw_ts}`")))?;
            let resource = resource_col.map_or("", field);

            Ok(Event::new(case_id, activity, timestamp, resource))
        })
        .collect()
}

/// Render events as CSV with the standard header.
#[must_use]
pub fn events_to_csv(events: &[Event]) -> String {
    write_rows(
        &EVENT_COLUMNS,
        events.iter().map(|e| {
            [
                e.case_id.clone(),
                e.activity.clone(),
                format_timestamp(&e.timestamp),
                e.resource.clone(),
            ]
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accepts_rfc3339_and_naive_timestamps() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn parses_rows_in_any_column_order() {
        let csv = "timestamp,activity,case_id\n2024-01-01 00:00:00,Create Issue,CASE_1\n";
        let events = parse_events(csv).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].case_id, "CASE_1");
        assert_eq!(events[0].resource, "");
    }

    #[test]
    fn reports_the_offending_line() {
        let csv = "case_id,activity,timestamp\nA,Create Issue,2024-01-01T00:00:00Z\nA,Start Work,not-a-date\n";
        match parse_events(csv).unwrap_err() {
            IngestError::InvalidRow { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("not-a-date"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_and_empty_input() {
        assert!(matches!(
            parse_events("case_id,activity\nA,B\n"),
            Err(IngestError::MissingColumn("timestamp"))
        ));
        assert!(matches!(parse_events(""), Err(IngestError::Empty)));
    }

    #[test]
    fn export_round_trips_through_parser() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 5, 5, 5, 5).unwrap();
        let events = vec![Event::new("C,1", "Code Review", ts, "user_001")];
        assert_eq!(parse_events(&events_to_csv(&events)).unwrap(), events);
    }
}
