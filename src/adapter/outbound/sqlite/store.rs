//! SQLite event store implementation.
//!
//! Diesel is synchronous, so every operation runs on tokio's blocking pool
//! with a connection checked out of the r2d2 pool.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::debug;

use crate::adapter::outbound::sqlite::database::connection::DbPool;
use crate::adapter::outbound::sqlite::database::model::{CaseRow, EventRow, NewCaseRow, NewEventRow};
use crate::adapter::outbound::sqlite::database::schema::{cases, events};
use crate::domain::ingest::format_timestamp;
use crate::domain::{CaseRecord, Event, EventLog, REOPEN_ACTIVITY};
use crate::error::{Error, Result, StoreError};
use crate::port::outbound::store::{EventStore, IngestSummary};

/// SQLite-backed event store.
#[derive(Clone)]
pub struct SqliteEventStore {
    pool: DbPool,
}

impl SqliteEventStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(StoreError::from)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Connection(format!("blocking task failed: {e}")))?
    }
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("timestamp `{raw}`: {e}")).into())
}

fn parse_optional_time(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(parse_time).transpose()
}

fn case_from_row(row: CaseRow) -> Result<CaseRecord> {
    Ok(CaseRecord {
        created_at: parse_optional_time(row.created_at.as_deref())?,
        resolved_at: parse_optional_time(row.resolved_at.as_deref())?,
        case_id: row.case_id,
        reopen_count: row.reopen_count,
        assignee: row.assignee,
        issue_type: row.issue_type,
    })
}

fn event_from_row(case_id: &str, row: EventRow) -> Result<Event> {
    Ok(Event::new(
        case_id,
        row.activity,
        parse_time(&row.timestamp)?,
        row.resource,
    ))
}

/// Look up a case's primary key, inserting the case on first sight.
fn get_or_create_case(conn: &mut SqliteConnection, case_id: &str) -> QueryResult<(i32, bool)> {
    let existing: Option<i32> = cases::table
        .filter(cases::case_id.eq(case_id))
        .select(cases::id)
        .first(conn)
        .optional()?;
    if let Some(pk) = existing {
        return Ok((pk, false));
    }

    diesel::insert_into(cases::table)
        .values(NewCaseRow { case_id })
        .execute(conn)?;
    let pk = cases::table
        .filter(cases::case_id.eq(case_id))
        .select(cases::id)
        .first(conn)?;
    Ok((pk, true))
}

/// Recompute the fields derived from a case's events.
fn refresh_case(conn: &mut SqliteConnection, pk: i32) -> QueryResult<()> {
    let times: Vec<String> = events::table
        .filter(events::case_pk.eq(pk))
        .order((events::timestamp.asc(), events::id.asc()))
        .select(events::timestamp)
        .load(conn)?;
    let reopen_count: i64 = events::table
        .filter(events::case_pk.eq(pk))
        .filter(events::activity.eq(REOPEN_ACTIVITY))
        .count()
        .get_result(conn)?;

    diesel::update(cases::table.find(pk))
        .set((
            cases::created_at.eq(times.first().cloned()),
            cases::resolved_at.eq(times.last().cloned()),
            cases::reopen_count.eq(i32::try_from(reopen_count).unwrap_or(i32::MAX)),
        ))
        .execute(conn)?;
    Ok(())
}

impl EventStore for SqliteEventStore {
    async fn ping(&self) -> Result<()> {
        self.with_conn(|conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            cases::table.count().get_result::<i64>(conn)?;
            Ok(())
        })
        .await
    }

    async fn load_log(&self) -> Result<EventLog> {
        self.with_conn(|conn| {
            let rows: Vec<(String, EventRow)> = events::table
                .inner_join(cases::table)
                .order((cases::case_id.asc(), events::timestamp.asc(), events::id.asc()))
                .select((cases::case_id, EventRow::as_select()))
                .load(conn)?;

            let events = rows
                .into_iter()
                .map(|(case_id, row)| event_from_row(&case_id, row))
                .collect::<Result<Vec<_>>>()?;
            debug!(events = events.len(), "Loaded event log");
            Ok(EventLog::from_events(events))
        })
        .await
    }

    async fn case(&self, case_id: &str) -> Result<Option<(CaseRecord, Vec<Event>)>> {
        let case_id = case_id.to_string();
        self.with_conn(move |conn| {
            let row: Option<CaseRow> = cases::table
                .filter(cases::case_id.eq(&case_id))
                .select(CaseRow::as_select())
                .first(conn)
                .optional()?;
            let Some(row) = row else {
                return Ok(None);
            };

            let event_rows: Vec<EventRow> = events::table
                .filter(events::case_pk.eq(row.id))
                .order((events::timestamp.asc(), events::id.asc()))
                .select(EventRow::as_select())
                .load(conn)?;
            let events = event_rows
                .into_iter()
                .map(|e| event_from_row(&case_id, e))
                .collect::<Result<Vec<_>>>()?;

            Ok(Some((case_from_row(row)?, events)))
        })
        .await
    }

    async fn ingest(&self, events: Vec<Event>) -> Result<IngestSummary> {
        self.with_conn(move |conn| {
            conn.transaction::<_, Error, _>(|conn| {
                let mut summary = IngestSummary {
                    events: events.len(),
                    ..IngestSummary::default()
                };
                let mut keys: BTreeMap<String, i32> = BTreeMap::new();
                let mut touched = BTreeSet::new();

                for event in events {
                    let pk = match keys.get(&event.case_id) {
                        Some(pk) => *pk,
                        None => {
                            let (pk, created) = get_or_create_case(conn, &event.case_id)?;
                            if created {
                                summary.cases_created += 1;
                            } else {
                                summary.cases_updated += 1;
                            }
                            keys.insert(event.case_id.clone(), pk);
                            pk
                        }
                    };
                    touched.insert(pk);

                    diesel::insert_into(events::table)
                        .values(NewEventRow {
                            case_pk: pk,
                            activity: event.activity,
                            timestamp: format_timestamp(&event.timestamp),
                            resource: event.resource,
                        })
                        .execute(conn)?;
                }

                for pk in touched {
                    refresh_case(conn, pk)?;
                }
                Ok(summary)
            })
        })
        .await
    }
}
