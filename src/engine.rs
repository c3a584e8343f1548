use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::alerts::{compose_alert_message, dispatch, evaluate, skip_detail, SenderRegistry};
use crate::analysis::{alert_recommended, final_level, validate, ScoringThresholds};
use crate::config;
use crate::db::repository::{
    get_consent, insert_alert_event, insert_analysis_result, list_enabled_contacts,
    recent_sent_exists,
};
use crate::db::DatabaseError;
use crate::models::{AlertEvent, AlertStatus, AnalysisRecord, AnalysisResult};
use crate::provider::{ChatTurn, ModelClient};

/// Inbound messages longer than this are truncated before the model call.
const MAX_MESSAGE_CHARS: usize = 8000;

/// Errors from the analysis engine.
///
/// Deliberately narrow: model failures and malformed responses degrade
/// into the result instead of erroring — only storage trouble (or a
/// poisoned lock) surfaces to the caller.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Internal lock error")]
    LockPoisoned,
}

/// Composite outcome of one analyzed message.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// Empty whenever the final level sat below HIGH.
    pub alert_events: Vec<AlertEvent>,
}

// ═══════════════════════════════════════════════════════════
// UserLocks — per-user serialization for rate-limit decisions
// ═══════════════════════════════════════════════════════════

/// Registry of per-user mutexes.
///
/// The rate-limit decision is a read-decide-write against the audit log;
/// two concurrent HIGH analyses for the same user must not both observe
/// "no recent alert". Holding the user's mutex across query, decision, and
/// event insertion makes that sequence atomic per user while leaving other
/// users unaffected.
struct UserLocks {
    inner: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl UserLocks {
    fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    fn for_user(&self, user_id: Uuid) -> Result<Arc<Mutex<()>>, EngineError> {
        let mut map = self.inner.lock().map_err(|_| EngineError::LockPoisoned)?;
        Ok(Arc::clone(map.entry(user_id).or_default()))
    }
}

// ═══════════════════════════════════════════════════════════
// AnalysisEngine
// ═══════════════════════════════════════════════════════════

/// Use-case entry point: model call → validate/repair → score → persist →
/// alert policy → dispatch, degrading gracefully at every upstream seam.
pub struct AnalysisEngine {
    model: Box<dyn ModelClient>,
    senders: SenderRegistry,
    db: Mutex<Connection>,
    locks: UserLocks,
    thresholds: ScoringThresholds,
    rate_limit_window: chrono::Duration,
}

impl AnalysisEngine {
    pub fn new(model: Box<dyn ModelClient>, senders: SenderRegistry, conn: Connection) -> Self {
        Self {
            model,
            senders,
            db: Mutex::new(conn),
            locks: UserLocks::new(),
            thresholds: ScoringThresholds::default(),
            rate_limit_window: chrono::Duration::hours(config::rate_limit_window_hours()),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ScoringThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_rate_limit_window(mut self, window: chrono::Duration) -> Self {
        self.rate_limit_window = window;
        self
    }

    /// Analyze one inbound message and apply the alerting policy.
    ///
    /// The user-visible conversation is never blocked by an analysis
    /// failure: model errors produce an `Unavailable` result, not an
    /// error. Only persistence failure propagates.
    pub fn handle_message(
        &self,
        user_id: Uuid,
        display_name: &str,
        message_text: &str,
        context: &[ChatTurn],
    ) -> Result<AnalysisOutcome, EngineError> {
        let _span = tracing::info_span!("handle_message", user_id = %user_id).entered();

        let record = self.analyze_text(message_text, context);
        let level = final_level(&record, &self.thresholds);
        if record.needs_manual_review() {
            tracing::warn!(status = record.status.as_str(), "Analysis flagged for manual review");
        }

        let result = AnalysisResult::new(user_id, record, level);
        {
            let conn = self.db.lock().map_err(|_| EngineError::LockPoisoned)?;
            insert_analysis_result(&conn, &result)?;
        }
        tracing::info!(
            result_id = %result.id,
            level = level.as_str(),
            status = result.record.status.as_str(),
            "Analysis persisted"
        );

        let alert_events = if alert_recommended(level) {
            self.evaluate_and_dispatch(&result, display_name)?
        } else {
            Vec::new()
        };

        Ok(AnalysisOutcome {
            result,
            alert_events,
        })
    }

    /// Model call + validation, absorbing every provider failure.
    fn analyze_text(&self, message_text: &str, context: &[ChatTurn]) -> AnalysisRecord {
        let trimmed = message_text.trim();
        if trimmed.is_empty() {
            tracing::warn!("Empty message text, skipping model call");
            return AnalysisRecord::unavailable("No message text provided for analysis.");
        }

        let capped = truncate_chars(trimmed, MAX_MESSAGE_CHARS);
        match self.model.analyze(capped, context) {
            Ok(raw) => validate(&raw),
            Err(e) => {
                tracing::error!(error = %e, "Model provider call failed");
                AnalysisRecord::unavailable(&e.to_string())
            }
        }
    }

    /// Policy evaluation and dispatch for a HIGH/CRITICAL result, recording
    /// one decision event plus one event per attempted contact.
    ///
    /// Runs under the user's serialization lock so the rate-limit
    /// read-decide-write cannot interleave with a concurrent analysis for
    /// the same user.
    fn evaluate_and_dispatch(
        &self,
        result: &AnalysisResult,
        display_name: &str,
    ) -> Result<Vec<AlertEvent>, EngineError> {
        let user_lock = self.locks.for_user(result.user_id)?;
        let _serial = user_lock.lock().map_err(|_| EngineError::LockPoisoned)?;

        let conn = self.db.lock().map_err(|_| EngineError::LockPoisoned)?;

        let consent = get_consent(&conn, &result.user_id)?;
        let contacts = list_enabled_contacts(&conn, &result.user_id)?;
        let cutoff = Utc::now() - self.rate_limit_window;
        let recent_sent = recent_sent_exists(&conn, &result.user_id, cutoff)?;

        let decision = evaluate(consent, contacts, result.final_level, recent_sent);

        let mut events = Vec::new();

        if let Some(reason) = decision.skip_reason {
            tracing::info!(reason = reason.as_str(), "Alert skipped");
            let event = AlertEvent::new(
                result.user_id,
                result.id,
                None,
                reason,
                skip_detail(reason),
            );
            insert_alert_event(&conn, &event)?;
            events.push(event);
            return Ok(events);
        }

        let (subject, body) = compose_alert_message(display_name, result.final_level, Utc::now());
        let outcomes = dispatch(&self.senders, &decision.eligible, &subject, &body);

        // The decision event reflects the aggregate: a dispatch where every
        // contact failed does not count as sent, so it does not consume the
        // rate-limit window.
        let sent_count = outcomes.iter().filter(|o| o.status == AlertStatus::Sent).count();
        let summary_status = if sent_count > 0 {
            AlertStatus::Sent
        } else {
            AlertStatus::Failed
        };
        let decision_event = AlertEvent::new(
            result.user_id,
            result.id,
            None,
            summary_status,
            &format!("Dispatched to {sent_count} of {} contacts", outcomes.len()),
        );
        insert_alert_event(&conn, &decision_event)?;
        events.push(decision_event);

        for outcome in outcomes {
            let event = AlertEvent::new(
                result.user_id,
                result.id,
                Some(outcome.contact_id),
                outcome.status,
                &outcome.detail,
            );
            insert_alert_event(&conn, &event)?;
            events.push(event);
        }

        tracing::info!(
            result_id = %result.id,
            sent = sent_count,
            attempted = events.len() - 1,
            "Alert dispatch recorded"
        );
        Ok(events)
    }
}

/// Truncate on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
