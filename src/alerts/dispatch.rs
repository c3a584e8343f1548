use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{AlertStatus, ContactChannel, EmergencyContact};

use super::DispatchError;

/// Delivery backend for one contact channel. Implementations are external
/// collaborators (SMTP relay, SMS gateway); retry policy, if any, lives
/// with them — the dispatcher treats every failure as terminal.
pub trait ChannelSender: Send + Sync {
    /// Returns the provider response text on success, kept in the audit
    /// trail.
    fn send(&self, destination: &str, subject: &str, body: &str) -> Result<String, DispatchError>;
}

/// Per-channel sender lookup used by the dispatcher.
pub struct SenderRegistry {
    senders: HashMap<ContactChannel, Box<dyn ChannelSender>>,
}

impl SenderRegistry {
    pub fn new() -> Self {
        Self {
            senders: HashMap::new(),
        }
    }

    /// Registry with a stub sender on every channel — development default.
    pub fn stub() -> Self {
        Self::new()
            .with_sender(ContactChannel::Email, Box::new(StubSender))
            .with_sender(ContactChannel::Sms, Box::new(StubSender))
    }

    pub fn with_sender(mut self, channel: ContactChannel, sender: Box<dyn ChannelSender>) -> Self {
        self.senders.insert(channel, sender);
        self
    }

    pub fn sender_for(&self, channel: ContactChannel) -> Option<&dyn ChannelSender> {
        self.senders.get(&channel).map(|s| s.as_ref())
    }
}

impl Default for SenderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One delivery attempt's result. Status is SENT or FAILED only.
#[derive(Debug, Clone)]
pub struct ContactOutcome {
    pub contact_id: Uuid,
    pub status: AlertStatus,
    pub detail: String,
}

/// Fan out to every eligible contact. Failure domains are isolated: one
/// contact failing (or having no registered sender) never prevents the
/// remaining attempts. Exactly one outcome per contact, in input order.
pub fn dispatch(
    registry: &SenderRegistry,
    contacts: &[EmergencyContact],
    subject: &str,
    body: &str,
) -> Vec<ContactOutcome> {
    contacts
        .iter()
        .map(|contact| {
            let attempt = match registry.sender_for(contact.channel) {
                Some(sender) => sender.send(&contact.destination, subject, body),
                None => Err(DispatchError::no_sender(contact.channel)),
            };

            match attempt {
                Ok(response) => ContactOutcome {
                    contact_id: contact.id,
                    status: AlertStatus::Sent,
                    detail: response,
                },
                Err(e) => {
                    tracing::warn!(
                        contact_id = %contact.id,
                        channel = contact.channel.as_str(),
                        error = %e,
                        "Alert delivery failed"
                    );
                    ContactOutcome {
                        contact_id: contact.id,
                        status: AlertStatus::Failed,
                        detail: e.to_string(),
                    }
                }
            }
        })
        .collect()
}

/// Logs the would-be delivery and succeeds. Development fallback when no
/// real channel collaborator is wired up.
pub struct StubSender;

impl ChannelSender for StubSender {
    fn send(&self, destination: &str, subject: &str, _body: &str) -> Result<String, DispatchError> {
        tracing::info!(destination, subject, "Stub alert delivery");
        Ok(format!("stub delivery to {destination}"))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every send for assertions.
    struct RecordingSender {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingSender {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChannelSender for RecordingSender {
        fn send(
            &self,
            destination: &str,
            subject: &str,
            body: &str,
        ) -> Result<String, DispatchError> {
            self.sent
                .lock()
                .unwrap()
                .push((destination.into(), subject.into(), body.into()));
            Ok(format!("delivered to {destination}"))
        }
    }

    /// Always fails.
    struct FailingSender;

    impl ChannelSender for FailingSender {
        fn send(&self, _: &str, _: &str, _: &str) -> Result<String, DispatchError> {
            Err(DispatchError::Send("gateway refused connection".into()))
        }
    }

    fn email_contact(name: &str, destination: &str) -> EmergencyContact {
        EmergencyContact::new(Uuid::new_v4(), name, ContactChannel::Email, destination)
    }

    fn sms_contact(name: &str, destination: &str) -> EmergencyContact {
        EmergencyContact::new(Uuid::new_v4(), name, ContactChannel::Sms, destination)
    }

    #[test]
    fn one_outcome_per_contact_in_order() {
        let registry = SenderRegistry::new()
            .with_sender(ContactChannel::Email, Box::new(RecordingSender::new()));
        let contacts = vec![
            email_contact("Amira", "amira@example.com"),
            email_contact("Malik", "malik@example.com"),
        ];

        let outcomes = dispatch(&registry, &contacts, "subject", "body");
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].contact_id, contacts[0].id);
        assert_eq!(outcomes[1].contact_id, contacts[1].id);
        assert!(outcomes.iter().all(|o| o.status == AlertStatus::Sent));
    }

    #[test]
    fn failure_does_not_stop_remaining_attempts() {
        let registry = SenderRegistry::new()
            .with_sender(ContactChannel::Email, Box::new(FailingSender))
            .with_sender(ContactChannel::Sms, Box::new(RecordingSender::new()));
        let contacts = vec![
            email_contact("Amira", "amira@example.com"),
            sms_contact("Malik", "+971501234567"),
        ];

        let outcomes = dispatch(&registry, &contacts, "subject", "body");
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].status, AlertStatus::Failed);
        assert!(outcomes[0].detail.contains("gateway refused"));
        assert_eq!(outcomes[1].status, AlertStatus::Sent);
    }

    #[test]
    fn missing_sender_yields_failed_outcome() {
        let registry = SenderRegistry::new()
            .with_sender(ContactChannel::Email, Box::new(RecordingSender::new()));
        let contacts = vec![sms_contact("Malik", "+971501234567")];

        let outcomes = dispatch(&registry, &contacts, "subject", "body");
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, AlertStatus::Failed);
        assert!(outcomes[0].detail.contains("sms"));
    }

    #[test]
    fn sender_receives_destination_and_message() {
        let sender = RecordingSender::new();
        sender
            .send("amira@example.com", "the subject", "the body")
            .unwrap();
        let recorded = sender.sent.lock().unwrap();
        assert_eq!(
            recorded[0],
            (
                "amira@example.com".to_string(),
                "the subject".to_string(),
                "the body".to_string()
            )
        );
    }

    #[test]
    fn outcome_detail_carries_provider_response() {
        let registry = SenderRegistry::new()
            .with_sender(ContactChannel::Email, Box::new(RecordingSender::new()));
        let contacts = vec![email_contact("Amira", "amira@example.com")];
        let outcomes = dispatch(&registry, &contacts, "the subject", "the body");
        assert_eq!(outcomes[0].detail, "delivered to amira@example.com");
    }

    #[test]
    fn empty_contact_list_dispatches_nothing() {
        let registry = SenderRegistry::stub();
        assert!(dispatch(&registry, &[], "s", "b").is_empty());
    }

    #[test]
    fn stub_sender_always_succeeds() {
        let registry = SenderRegistry::stub();
        let contacts = vec![
            email_contact("Amira", "amira@example.com"),
            sms_contact("Malik", "+971501234567"),
        ];
        let outcomes = dispatch(&registry, &contacts, "s", "b");
        assert!(outcomes.iter().all(|o| o.status == AlertStatus::Sent));
    }
}
