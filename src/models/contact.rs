use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ContactChannel;

/// Per-user opt-in for emergency alerting.
///
/// Owned and mutated by the profile collaborator; this core only reads it.
/// A user without a stored row is treated as not consented.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentSetting {
    pub user_id: Uuid,
    pub alerts_enabled: bool,
    pub updated_at: DateTime<Utc>,
}

/// A person to notify when an analysis escalates.
///
/// Owned by the profile collaborator; read-only to this core. Disabled
/// contacts are never dispatched to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub channel: ContactChannel,
    /// Email address or phone number, depending on `channel`.
    pub destination: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl EmergencyContact {
    pub fn new(
        user_id: Uuid,
        name: &str,
        channel: ContactChannel,
        destination: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            channel,
            destination: destination.to_string(),
            enabled: true,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_contact_is_enabled() {
        let contact = EmergencyContact::new(
            Uuid::new_v4(),
            "Amira",
            ContactChannel::Email,
            "amira@example.com",
        );
        assert!(contact.enabled);
        assert_eq!(contact.channel, ContactChannel::Email);
        assert_eq!(contact.destination, "amira@example.com");
    }
}
