use std::path::Path;

use rusqlite::Connection;
use tracing;

use super::DatabaseError;

/// Timestamp format used for every persisted datetime column. Fixed-width
/// UTC text so lexicographic comparison in SQL matches chronological order.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_initial.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // schema_version + consent_settings + emergency_contacts
        // + analysis_results + alert_events = 5
        let count = count_tables(&conn).unwrap();
        assert_eq!(count, 5, "Expected 5 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn database_opens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caresignal.db");
        let conn = open_database(&path).unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 5);

        // Re-open — should be idempotent
        let conn2 = open_database(&path).unwrap();
        assert_eq!(count_tables(&conn2).unwrap(), 5);
    }

    #[test]
    fn contact_channel_check_constraint() {
        let conn = open_memory_database().unwrap();

        let ok = conn.execute(
            "INSERT INTO emergency_contacts (id, user_id, name, channel, destination, enabled, created_at)
             VALUES ('c-1', 'u-1', 'Amira', 'email', 'amira@example.com', 1, '2026-01-01 00:00:00')",
            [],
        );
        assert!(ok.is_ok());

        let bad = conn.execute(
            "INSERT INTO emergency_contacts (id, user_id, name, channel, destination, enabled, created_at)
             VALUES ('c-2', 'u-1', 'Bo', 'carrier_pigeon', 'coop 7', 1, '2026-01-01 00:00:00')",
            [],
        );
        assert!(bad.is_err());
    }

    #[test]
    fn alert_event_requires_existing_result() {
        let conn = open_memory_database().unwrap();

        // No analysis_results row — FK should reject the event
        let result = conn.execute(
            "INSERT INTO alert_events (id, user_id, analysis_result_id, status, detail, created_at)
             VALUES ('e-1', 'u-1', 'missing-result', 'sent', '', '2026-01-01 00:00:00')",
            [],
        );
        assert!(result.is_err());
    }
}
