use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AnalysisStatus, RiskLevel};

/// Upper bound on stored recommendations — anything beyond is dropped
/// during repair.
pub const MAX_RECOMMENDATIONS: usize = 6;

// ---------------------------------------------------------------------------
// AnalysisRecord
// ---------------------------------------------------------------------------

/// The validated, repaired form of one model response.
///
/// Invariant: the three scores are always within `[0.0, 1.0]` — the
/// validator clamps or defaults anything else before a record is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub stress: f64,
    pub anxiety: f64,
    pub depression: f64,
    /// Short clinical rationale extracted from the response.
    pub summary: String,
    /// Empathetic user-facing message from the model.
    pub supportive_message: String,
    pub recommendations: Vec<String>,
    /// The model's own risk opinion, when it supplied a recognizable one.
    pub model_risk_level: Option<RiskLevel>,
    /// Verbatim raw model output (or the provider error display when the
    /// call itself failed), retained for manual review.
    pub source_text: String,
    pub status: AnalysisStatus,
}

impl AnalysisRecord {
    /// Safe fallback when no balanced JSON object could be extracted from
    /// the model's output. All scores zero, scored LOW downstream.
    pub fn degraded_default(source_text: &str) -> Self {
        Self {
            stress: 0.0,
            anxiety: 0.0,
            depression: 0.0,
            summary: String::new(),
            supportive_message: String::new(),
            recommendations: Vec::new(),
            model_risk_level: None,
            source_text: source_text.to_string(),
            status: AnalysisStatus::DegradedDefault,
        }
    }

    /// Fallback when the model client itself failed (network, timeout,
    /// provider error) or the input was empty — no raw output exists, so
    /// `source_text` carries the failure note instead.
    pub fn unavailable(note: &str) -> Self {
        Self {
            status: AnalysisStatus::Unavailable,
            ..Self::degraded_default(note)
        }
    }

    /// Records that never saw a usable model response are flagged for
    /// separate manual-review reporting by the caller.
    pub fn needs_manual_review(&self) -> bool {
        matches!(
            self.status,
            AnalysisStatus::DegradedDefault | AnalysisStatus::Unavailable
        )
    }
}

// ---------------------------------------------------------------------------
// AnalysisResult
// ---------------------------------------------------------------------------

/// One persisted analysis: the record plus the derived final level.
///
/// Created exactly once per inbound message and never mutated afterwards —
/// `final_level` is derived by the scorer, never client-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub record: AnalysisRecord,
    pub final_level: RiskLevel,
    pub created_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(user_id: Uuid, record: AnalysisRecord, final_level: RiskLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            record,
            final_level,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_default_is_all_zero() {
        let record = AnalysisRecord::degraded_default("the model said something odd");
        assert_eq!(record.stress, 0.0);
        assert_eq!(record.anxiety, 0.0);
        assert_eq!(record.depression, 0.0);
        assert!(record.summary.is_empty());
        assert!(record.recommendations.is_empty());
        assert!(record.model_risk_level.is_none());
        assert_eq!(record.status, AnalysisStatus::DegradedDefault);
        assert_eq!(record.source_text, "the model said something odd");
        assert!(record.needs_manual_review());
    }

    #[test]
    fn unavailable_keeps_failure_note() {
        let record = AnalysisRecord::unavailable("request timed out after 30s");
        assert_eq!(record.status, AnalysisStatus::Unavailable);
        assert_eq!(record.source_text, "request timed out after 30s");
        assert!(record.needs_manual_review());
    }

    #[test]
    fn ok_record_does_not_need_review() {
        let mut record = AnalysisRecord::degraded_default("");
        record.status = AnalysisStatus::Ok;
        assert!(!record.needs_manual_review());
        record.status = AnalysisStatus::Repaired;
        assert!(!record.needs_manual_review());
    }

    #[test]
    fn result_gets_fresh_id_and_timestamp() {
        let user = Uuid::new_v4();
        let a = AnalysisResult::new(
            user,
            AnalysisRecord::degraded_default(""),
            RiskLevel::Low,
        );
        let b = AnalysisResult::new(
            user,
            AnalysisRecord::degraded_default(""),
            RiskLevel::Low,
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.user_id, user);
    }
}
