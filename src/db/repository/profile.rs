use std::str::FromStr;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{DatabaseError, DATETIME_FORMAT};
use crate::models::{ContactChannel, EmergencyContact};

use super::analysis::parse_stored_datetime;

// Consent and contacts are owned by the profile collaborator. The write
// helpers below exist for that collaborator (and for tests); no pipeline
// code path mutates them.

/// Whether the user has opted in to emergency alerting. Users without a
/// stored setting have not consented.
pub fn get_consent(conn: &Connection, user_id: &Uuid) -> Result<bool, DatabaseError> {
    let enabled: Option<i64> = conn
        .query_row(
            "SELECT alerts_enabled FROM consent_settings WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(enabled.unwrap_or(0) != 0)
}

/// Set a user's consent flag (collaborator write path).
pub fn set_consent(
    conn: &Connection,
    user_id: &Uuid,
    alerts_enabled: bool,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO consent_settings (user_id, alerts_enabled, updated_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT (user_id) DO UPDATE SET
             alerts_enabled = excluded.alerts_enabled,
             updated_at = excluded.updated_at",
        params![
            user_id.to_string(),
            alerts_enabled as i32,
            Utc::now().format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Insert or replace an emergency contact (collaborator write path).
pub fn upsert_contact(conn: &Connection, contact: &EmergencyContact) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR REPLACE INTO emergency_contacts
         (id, user_id, name, channel, destination, enabled, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            contact.id.to_string(),
            contact.user_id.to_string(),
            contact.name,
            contact.channel.as_str(),
            contact.destination,
            contact.enabled as i32,
            contact.created_at.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Enabled contacts for a user, ordered by name.
pub fn list_enabled_contacts(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<Vec<EmergencyContact>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, channel, destination, enabled, created_at
         FROM emergency_contacts
         WHERE user_id = ?1 AND enabled = 1
         ORDER BY name",
    )?;

    let rows = stmt.query_map(params![user_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, i32>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut contacts = Vec::new();
    for row in rows {
        let (id, user_id, name, channel, destination, enabled, created_at) = row?;
        contacts.push(EmergencyContact {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            user_id: Uuid::parse_str(&user_id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            name,
            channel: ContactChannel::from_str(&channel)?,
            destination,
            enabled: enabled != 0,
            created_at: parse_stored_datetime(&created_at),
        });
    }
    Ok(contacts)
}
