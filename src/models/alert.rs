use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::AlertStatus;

/// One row of the immutable alert audit log.
///
/// Every HIGH/CRITICAL policy evaluation records exactly one event — skip
/// outcomes included, so the absence of an alert is reconstructable from
/// history rather than inferred. Dispatch adds one further event per
/// attempted contact (`contact_id` set, status SENT or FAILED).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub analysis_result_id: Uuid,
    /// `None` for decision-level events, the contact for per-attempt events.
    pub contact_id: Option<Uuid>,
    pub status: AlertStatus,
    /// Free-text audit detail: skip reason, sender response, or failure.
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(
        user_id: Uuid,
        analysis_result_id: Uuid,
        contact_id: Option<Uuid>,
        status: AlertStatus,
        detail: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            analysis_result_id,
            contact_id,
            status,
            detail: detail.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_event_has_no_contact() {
        let event = AlertEvent::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            AlertStatus::SkippedNoConsent,
            "Consent not enabled.",
        );
        assert!(event.contact_id.is_none());
        assert_eq!(event.status, AlertStatus::SkippedNoConsent);
        assert_eq!(event.detail, "Consent not enabled.");
    }
}
