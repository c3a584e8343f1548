use crate::models::{AlertStatus, EmergencyContact, RiskLevel};

/// Outcome of one policy evaluation. `skip_reason` is one of the
/// `Skipped*` statuses when `send` is false.
#[derive(Debug, Clone)]
pub struct AlertDecision {
    pub send: bool,
    pub skip_reason: Option<AlertStatus>,
    pub eligible: Vec<EmergencyContact>,
}

impl AlertDecision {
    fn skip(reason: AlertStatus) -> Self {
        Self {
            send: false,
            skip_reason: Some(reason),
            eligible: Vec::new(),
        }
    }
}

/// Decide whether to notify, and whom. Only consulted for HIGH/CRITICAL —
/// lower levels short-circuit in the orchestrator and record nothing.
///
/// First matching rule wins: no consent, then no contacts, then the HIGH
/// rate limit. CRITICAL is exempt from the rate limit — with consent and
/// contacts it always attempts delivery.
pub fn evaluate(
    alerts_enabled: bool,
    contacts: Vec<EmergencyContact>,
    final_level: RiskLevel,
    recent_sent: bool,
) -> AlertDecision {
    debug_assert!(final_level >= RiskLevel::High);

    if !alerts_enabled {
        return AlertDecision::skip(AlertStatus::SkippedNoConsent);
    }

    if contacts.is_empty() {
        return AlertDecision::skip(AlertStatus::SkippedNoContacts);
    }

    if final_level == RiskLevel::High && recent_sent {
        return AlertDecision::skip(AlertStatus::SkippedRateLimit);
    }

    AlertDecision {
        send: true,
        skip_reason: None,
        eligible: contacts,
    }
}

/// Audit-trail text recorded alongside each skip outcome.
pub fn skip_detail(reason: AlertStatus) -> &'static str {
    match reason {
        AlertStatus::SkippedNoConsent => "Consent not enabled.",
        AlertStatus::SkippedNoContacts => "No enabled contacts.",
        AlertStatus::SkippedRateLimit => "Rate limited (trailing window).",
        _ => "",
    }
}
