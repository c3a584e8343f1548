use crate::models::{AnalysisRecord, RiskLevel};

/// Threshold table driving the deterministic risk policy. The defaults are
/// an explicit, documented choice — deployments may tune them, the scorer
/// never hard-codes them.
#[derive(Debug, Clone)]
pub struct ScoringThresholds {
    /// Any single score at or above this is CRITICAL on its own.
    pub critical_score: f64,
    /// Severity (max score) at or above this is HIGH; also the bar a score
    /// must clear to count toward `critical_count`.
    pub high_score: f64,
    /// Severity at or above this is MODERATE.
    pub moderate_score: f64,
    /// This many scores clearing `high_score` escalate to CRITICAL.
    pub critical_count: usize,
}

impl Default for ScoringThresholds {
    fn default() -> Self {
        Self {
            critical_score: 0.9,
            high_score: 0.8,
            moderate_score: 0.5,
            critical_count: 2,
        }
    }
}

/// Map a validated record to a risk level. Pure and deterministic; ties
/// break toward caution.
pub fn computed_level(record: &AnalysisRecord, thresholds: &ScoringThresholds) -> RiskLevel {
    let scores = [record.stress, record.anxiety, record.depression];
    let severity = scores.iter().cloned().fold(0.0, f64::max);
    let count_high = scores.iter().filter(|s| **s >= thresholds.high_score).count();

    if scores.iter().any(|s| *s >= thresholds.critical_score)
        || count_high >= thresholds.critical_count
    {
        RiskLevel::Critical
    } else if severity >= thresholds.high_score || count_high == 1 {
        RiskLevel::High
    } else if severity >= thresholds.moderate_score {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// The final level never sits below the model's own opinion — escalations
/// from the provider are honored, downgrades are not.
pub fn final_level(record: &AnalysisRecord, thresholds: &ScoringThresholds) -> RiskLevel {
    let computed = computed_level(record, thresholds);
    match record.model_risk_level {
        Some(model_level) => computed.max(model_level),
        None => computed,
    }
}

/// Alerting is considered from HIGH upward.
pub fn alert_recommended(level: RiskLevel) -> bool {
    level >= RiskLevel::High
}
