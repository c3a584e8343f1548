use chrono::{DateTime, Utc};

use crate::models::RiskLevel;

/// Compose the notification sent to emergency contacts. Same template for
/// every channel; SMS gateways are expected to fold subject and body.
pub fn compose_alert_message(
    user_display: &str,
    risk_level: RiskLevel,
    at: DateTime<Utc>,
) -> (String, String) {
    let subject = "Automated Wellness Alert (High Risk Detected)".to_string();
    let body = format!(
        "This is an automated notification from Caresignal.\n\n\
         User: {user_display}\n\
         Risk Level: {}\n\
         Time: {}\n\n\
         Note: This is not a medical diagnosis. Please check in with the user if appropriate.\n",
        risk_level.as_str().to_uppercase(),
        at.to_rfc3339(),
    );
    (subject, body)
}
