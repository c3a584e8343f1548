use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::{DatabaseError, DATETIME_FORMAT};
use crate::models::{AlertEvent, AlertStatus};

use super::analysis::parse_stored_datetime;

/// Append one alert event to the audit log. Events are never updated or
/// deleted afterwards.
pub fn insert_alert_event(conn: &Connection, event: &AlertEvent) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO alert_events
         (id, user_id, analysis_result_id, contact_id, status, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.id.to_string(),
            event.user_id.to_string(),
            event.analysis_result_id.to_string(),
            event.contact_id.map(|id| id.to_string()),
            event.status.as_str(),
            event.detail,
            event.created_at.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Rate-limit check: does a SENT event exist for this user at or after the
/// cutoff? Served by the `(user_id, status, created_at)` index.
pub fn recent_sent_exists(
    conn: &Connection,
    user_id: &Uuid,
    cutoff: DateTime<Utc>,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM alert_events
         WHERE user_id = ?1 AND status = 'sent' AND created_at >= ?2",
        params![
            user_id.to_string(),
            cutoff.format(DATETIME_FORMAT).to_string(),
        ],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// All events recorded for one analysis result, oldest first.
pub fn list_events_for_result(
    conn: &Connection,
    analysis_result_id: &Uuid,
) -> Result<Vec<AlertEvent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, analysis_result_id, contact_id, status, detail, created_at
         FROM alert_events WHERE analysis_result_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;
    let events = collect_events(stmt.query_map(params![analysis_result_id.to_string()], row_to_tuple)?);
    events
}

/// A user's alert history, newest first.
pub fn list_events_for_user(
    conn: &Connection,
    user_id: &Uuid,
    limit: usize,
) -> Result<Vec<AlertEvent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, analysis_result_id, contact_id, status, detail, created_at
         FROM alert_events WHERE user_id = ?1
         ORDER BY created_at DESC, id DESC LIMIT ?2",
    )?;
    let events = collect_events(stmt.query_map(params![user_id.to_string(), limit as i64], row_to_tuple)?);
    events
}

type EventTuple = (String, String, String, Option<String>, String, String, String);

fn row_to_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventTuple> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn collect_events(
    rows: impl Iterator<Item = rusqlite::Result<EventTuple>>,
) -> Result<Vec<AlertEvent>, DatabaseError> {
    let mut events = Vec::new();
    for row in rows {
        let (id, user_id, analysis_result_id, contact_id, status, detail, created_at) = row?;
        events.push(AlertEvent {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            analysis_result_id: Uuid::parse_str(&analysis_result_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            contact_id: match contact_id {
                Some(s) => Some(
                    Uuid::parse_str(&s)
                        .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
                ),
                None => None,
            },
            status: AlertStatus::from_str(&status)?,
            detail,
            created_at: parse_stored_datetime(&created_at),
        });
    }
    Ok(events)
}
