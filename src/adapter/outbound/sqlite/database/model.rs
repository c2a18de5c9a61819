//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{cases, events};

/// Database row for a case (queryable).
#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CaseRow {
    pub id: i32,
    pub case_id: String,
    pub created_at: Option<String>,
    pub resolved_at: Option<String>,
    pub reopen_count: i32,
    pub assignee: String,
    pub issue_type: String,
}

/// Database row for a case (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = cases)]
pub struct NewCaseRow<'a> {
    pub case_id: &'a str,
}

/// Database row for an event (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EventRow {
    pub id: i32,
    pub case_pk: i32,
    pub activity: String,
    pub timestamp: String,
    pub resource: String,
}

/// Database row for an event (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = events)]
pub struct NewEventRow {
    pub case_pk: i32,
    pub activity: String,
    pub timestamp: String,
    pub resource: String,
}
