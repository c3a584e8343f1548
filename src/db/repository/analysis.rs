use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::{DatabaseError, DATETIME_FORMAT};
use crate::models::{AnalysisRecord, AnalysisResult, AnalysisStatus, RiskLevel};

/// Append one analysis result. Results are immutable once written — there is
/// deliberately no update path.
pub fn insert_analysis_result(
    conn: &Connection,
    result: &AnalysisResult,
) -> Result<(), DatabaseError> {
    let recommendations_json = serde_json::to_string(&result.record.recommendations)
        .unwrap_or_else(|_| "[]".to_string());

    conn.execute(
        "INSERT INTO analysis_results
         (id, user_id, stress, anxiety, depression, summary, supportive_message,
          recommendations, model_risk_level, final_level, status, source_text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            result.id.to_string(),
            result.user_id.to_string(),
            result.record.stress,
            result.record.anxiety,
            result.record.depression,
            result.record.summary,
            result.record.supportive_message,
            recommendations_json,
            result.record.model_risk_level.map(|l| l.as_str()),
            result.final_level.as_str(),
            result.record.status.as_str(),
            result.record.source_text,
            result.created_at.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

/// Load one analysis result by id.
pub fn get_analysis_result(
    conn: &Connection,
    id: &Uuid,
) -> Result<AnalysisResult, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, user_id, stress, anxiety, depression, summary, supportive_message,
                    recommendations, model_risk_level, final_level, status, source_text, created_at
             FROM analysis_results WHERE id = ?1",
            params![id.to_string()],
            row_to_tuple,
        )
        .optional()?;

    match row {
        Some(tuple) => tuple_to_result(tuple),
        None => Err(DatabaseError::NotFound {
            entity_type: "AnalysisResult".into(),
            id: id.to_string(),
        }),
    }
}

/// Most recent results for a user, newest first.
pub fn list_results_for_user(
    conn: &Connection,
    user_id: &Uuid,
    limit: usize,
) -> Result<Vec<AnalysisResult>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, stress, anxiety, depression, summary, supportive_message,
                recommendations, model_risk_level, final_level, status, source_text, created_at
         FROM analysis_results WHERE user_id = ?1
         ORDER BY created_at DESC LIMIT ?2",
    )?;

    let rows = stmt.query_map(params![user_id.to_string(), limit as i64], row_to_tuple)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(tuple_to_result(row?)?);
    }
    Ok(results)
}

type ResultRow = (
    String,         // id
    String,         // user_id
    f64,            // stress
    f64,            // anxiety
    f64,            // depression
    String,         // summary
    String,         // supportive_message
    String,         // recommendations (JSON)
    Option<String>, // model_risk_level
    String,         // final_level
    String,         // status
    String,         // source_text
    String,         // created_at
);

fn row_to_tuple(row: &rusqlite::Row<'_>) -> rusqlite::Result<ResultRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
        row.get(12)?,
    ))
}

fn tuple_to_result(row: ResultRow) -> Result<AnalysisResult, DatabaseError> {
    let (
        id,
        user_id,
        stress,
        anxiety,
        depression,
        summary,
        supportive_message,
        recommendations_json,
        model_risk_level,
        final_level,
        status,
        source_text,
        created_at,
    ) = row;

    let model_risk_level = match model_risk_level {
        Some(s) => Some(RiskLevel::from_str(&s)?),
        None => None,
    };

    Ok(AnalysisResult {
        id: Uuid::parse_str(&id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        record: AnalysisRecord {
            stress,
            anxiety,
            depression,
            summary,
            supportive_message,
            recommendations: serde_json::from_str(&recommendations_json).unwrap_or_default(),
            model_risk_level,
            source_text,
            status: AnalysisStatus::from_str(&status)?,
        },
        final_level: RiskLevel::from_str(&final_level)?,
        created_at: parse_stored_datetime(&created_at),
    })
}

/// Parse a stored `DATETIME_FORMAT` timestamp back into UTC.
pub(crate) fn parse_stored_datetime(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .map(|naive| naive.and_utc())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    fn sample_result(user_id: Uuid) -> AnalysisResult {
        let record = AnalysisRecord {
            stress: 0.9,
            anxiety: 0.85,
            depression: 0.6,
            summary: "Elevated stress and anxiety.".into(),
            supportive_message: "Thank you for sharing this.".into(),
            recommendations: vec!["Take a breathing break.".into(), "Talk to someone you trust.".into()],
            model_risk_level: Some(RiskLevel::High),
            source_text: "{\"stress\": 0.9}".into(),
            status: AnalysisStatus::Ok,
        };
        AnalysisResult::new(user_id, record, RiskLevel::Critical)
    }

    #[test]
    fn insert_and_get_round_trips() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        let result = sample_result(user);

        insert_analysis_result(&conn, &result).unwrap();
        let loaded = get_analysis_result(&conn, &result.id).unwrap();

        assert_eq!(loaded.id, result.id);
        assert_eq!(loaded.user_id, user);
        assert_eq!(loaded.final_level, RiskLevel::Critical);
        assert_eq!(loaded.record.status, AnalysisStatus::Ok);
        assert_eq!(loaded.record.model_risk_level, Some(RiskLevel::High));
        assert_eq!(loaded.record.recommendations.len(), 2);
        assert!((loaded.record.stress - 0.9).abs() < f64::EPSILON);
        assert_eq!(loaded.record.source_text, "{\"stress\": 0.9}");
    }

    #[test]
    fn missing_result_reports_not_found() {
        let conn = open_memory_database().unwrap();
        let err = get_analysis_result(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn duplicate_insert_rejected() {
        let conn = open_memory_database().unwrap();
        let result = sample_result(Uuid::new_v4());
        insert_analysis_result(&conn, &result).unwrap();
        // Same id again — primary key keeps the log append-only
        assert!(insert_analysis_result(&conn, &result).is_err());
    }

    #[test]
    fn list_returns_newest_first() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();

        let mut older = sample_result(user);
        older.created_at = Utc::now() - chrono::Duration::hours(2);
        let newer = sample_result(user);

        insert_analysis_result(&conn, &older).unwrap();
        insert_analysis_result(&conn, &newer).unwrap();

        let listed = list_results_for_user(&conn, &user, 10).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[test]
    fn list_excludes_other_users() {
        let conn = open_memory_database().unwrap();
        let user = Uuid::new_v4();
        insert_analysis_result(&conn, &sample_result(user)).unwrap();
        insert_analysis_result(&conn, &sample_result(Uuid::new_v4())).unwrap();

        let listed = list_results_for_user(&conn, &user, 10).unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[test]
    fn null_model_level_round_trips() {
        let conn = open_memory_database().unwrap();
        let mut result = sample_result(Uuid::new_v4());
        result.record.model_risk_level = None;

        insert_analysis_result(&conn, &result).unwrap();
        let loaded = get_analysis_result(&conn, &result.id).unwrap();
        assert!(loaded.record.model_risk_level.is_none());
    }
}
