//! Form State Machine
//!
//! Owns the [`FormSnapshot`] for one form session. The presentation layer
//! forwards edit/focus/blur events here and renders whatever snapshot comes
//! back; it never writes to the snapshot itself.

use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brand::Brand;
use crate::error::FormError;
use crate::format::FieldId;

/// Where the current submission attempt stands
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Processing,
    Success,
    /// Failed attempt with the message shown to the user
    Error(String),
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Processing => "processing",
            SubmissionStatus::Success => "success",
            SubmissionStatus::Error(_) => "error",
        }
    }
}

/// Everything the card form renders
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    /// Masked card number, e.g. `4111 1111 1111 1111`
    pub card_number: String,

    /// Cardholder name as typed
    pub holder_name: String,

    /// Masked expiry, e.g. `12/25`
    pub expiry: String,

    /// Security code digits
    pub security_code: String,

    /// Brand inferred from the card number
    pub brand: Brand,

    /// Whether the card preview shows its back face
    pub flipped: bool,

    /// Submission lifecycle state
    pub status: SubmissionStatus,
}

impl FormSnapshot {
    /// Current value of a field
    pub fn value(&self, field: FieldId) -> &str {
        match field {
            FieldId::CardNumber => &self.card_number,
            FieldId::HolderName => &self.holder_name,
            FieldId::Expiry => &self.expiry,
            FieldId::SecurityCode => &self.security_code,
        }
    }

    /// Card number without group separators
    pub fn card_digits(&self) -> String {
        self.card_number.chars().filter(char::is_ascii_digit).collect()
    }

    /// Message of the last failed attempt, if the form is in the error state
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            SubmissionStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.status == SubmissionStatus::Processing
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Success
    }

    /// Whether a submit action would start a new attempt
    pub fn can_submit(&self) -> bool {
        matches!(self.status, SubmissionStatus::Idle | SubmissionStatus::Error(_))
    }

    fn value_mut(&mut self, field: FieldId) -> &mut String {
        match field {
            FieldId::CardNumber => &mut self.card_number,
            FieldId::HolderName => &mut self.holder_name,
            FieldId::Expiry => &mut self.expiry,
            FieldId::SecurityCode => &mut self.security_code,
        }
    }
}

/// Handle tying an in-flight attempt to the form that started it.
///
/// The form only watches a weak reference to the token. Once every holder
/// of the ticket is gone without resolving, the attempt counts as abandoned.
#[derive(Debug)]
pub(crate) struct AttemptTicket {
    id: Uuid,
    _alive: Arc<()>,
}

impl AttemptTicket {
    pub(crate) fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug)]
struct InFlight {
    id: Uuid,
    alive: Weak<()>,
}

/// Card form state machine
#[derive(Debug, Default)]
pub struct FormStateMachine {
    snapshot: FormSnapshot,
    in_flight: Option<InFlight>,
}

impl FormStateMachine {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    /// Re-check the in-flight attempt without any user event.
    ///
    /// Every other operation does this too.
    pub fn refresh(&mut self) -> &FormSnapshot {
        self.fail_abandoned();
        &self.snapshot
    }

    /// Apply a raw edit to a field.
    ///
    /// Malformed input is stripped or truncated, never rejected.
    pub fn edit_field(&mut self, field: FieldId, raw: &str) -> &FormSnapshot {
        self.fail_abandoned();
        *self.snapshot.value_mut(field) = field.format(raw);
        if field == FieldId::CardNumber {
            self.snapshot.brand = Brand::classify(&self.snapshot.card_number);
        }
        tracing::trace!(field = %field, "Field edited");
        &self.snapshot
    }

    /// Focusing the security code flips the card; any other field flips it back.
    pub fn focus_field(&mut self, field: FieldId) -> &FormSnapshot {
        self.fail_abandoned();
        self.snapshot.flipped = field == FieldId::SecurityCode;
        &self.snapshot
    }

    pub fn blur_field(&mut self, field: FieldId) -> &FormSnapshot {
        self.fail_abandoned();
        if field == FieldId::SecurityCode {
            self.snapshot.flipped = false;
        }
        &self.snapshot
    }

    /// Restart the session with an empty form.
    ///
    /// Ignored while an attempt is in flight, so its outcome cannot land on
    /// the fresh form.
    pub fn reset(&mut self) -> &FormSnapshot {
        self.fail_abandoned();
        if self.snapshot.is_processing() {
            tracing::debug!("Reset ignored while a submission is processing");
        } else {
            self.snapshot = FormSnapshot::default();
            tracing::debug!("Form reset");
        }
        &self.snapshot
    }

    /// Enter `processing` if a submission may start. Clears any previous
    /// error message.
    pub(crate) fn begin_submission(&mut self) -> Option<AttemptTicket> {
        self.fail_abandoned();
        if !self.snapshot.can_submit() {
            return None;
        }
        let alive = Arc::new(());
        let ticket = AttemptTicket {
            id: Uuid::new_v4(),
            _alive: Arc::clone(&alive),
        };
        self.in_flight = Some(InFlight {
            id: ticket.id,
            alive: Arc::downgrade(&alive),
        });
        self.snapshot.status = SubmissionStatus::Processing;
        Some(ticket)
    }

    /// Record the storage outcome of attempt `id`. Outcomes of any other
    /// attempt are ignored.
    pub(crate) fn finish_submission(&mut self, id: Uuid, outcome: &Result<(), FormError>) {
        match &self.in_flight {
            Some(current) if current.id == id => {}
            Some(current) => {
                tracing::debug!(attempt = %id, in_flight = %current.id, "Outcome for another attempt ignored");
                return;
            }
            None => {
                tracing::debug!(attempt = %id, status = self.snapshot.status.as_str(), "No submission in flight");
                return;
            }
        }
        self.in_flight = None;
        self.snapshot.status = match outcome {
            Ok(()) => SubmissionStatus::Success,
            Err(err) => SubmissionStatus::Error(err.user_message()),
        };
    }

    /// Fail an attempt whose ticket was dropped before its outcome arrived
    fn fail_abandoned(&mut self) {
        let abandoned = self
            .in_flight
            .as_ref()
            .is_some_and(|current| current.alive.strong_count() == 0);
        if !abandoned {
            return;
        }
        if let Some(current) = self.in_flight.take() {
            tracing::warn!(attempt = %current.id, "Submission abandoned before its outcome arrived");
        }
        self.snapshot.status = SubmissionStatus::Error(FormError::SubmissionFailed(None).user_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let form = FormStateMachine::new();
        let snap = form.snapshot();
        for field in FieldId::ALL {
            assert_eq!(snap.value(field), "");
        }
        assert_eq!(snap.brand, Brand::Unknown);
        assert!(!snap.flipped);
        assert_eq!(snap.status, SubmissionStatus::Idle);
        assert!(snap.error_message().is_none());
    }

    #[test]
    fn test_edit_card_number_sets_brand() {
        let mut form = FormStateMachine::new();
        let snap = form.edit_field(FieldId::CardNumber, "4111111111111111");
        assert_eq!(snap.card_number, "4111 1111 1111 1111");
        assert_eq!(snap.brand, Brand::Visa);

        let snap = form.edit_field(FieldId::CardNumber, "5500 0000");
        assert_eq!(snap.brand, Brand::Mastercard);

        let snap = form.edit_field(FieldId::CardNumber, "");
        assert_eq!(snap.brand, Brand::Unknown);
    }

    #[test]
    fn test_other_fields_leave_brand_alone() {
        let mut form = FormStateMachine::new();
        form.edit_field(FieldId::CardNumber, "4111");
        form.edit_field(FieldId::HolderName, "5555");
        form.edit_field(FieldId::Expiry, "5525");
        let snap = form.edit_field(FieldId::SecurityCode, "555");
        assert_eq!(snap.brand, Brand::Visa);
        assert_eq!(snap.holder_name, "5555");
        assert_eq!(snap.expiry, "55/25");
        assert_eq!(snap.security_code, "555");
    }

    #[test]
    fn test_edit_expiry() {
        let mut form = FormStateMachine::new();
        assert_eq!(form.edit_field(FieldId::Expiry, "1225").expiry, "12/25");
    }

    #[test]
    fn test_flip_follows_security_code_focus() {
        let mut form = FormStateMachine::new();
        assert!(form.focus_field(FieldId::SecurityCode).flipped);

        // Moving focus straight to another field flips back in one step
        assert!(!form.focus_field(FieldId::Expiry).flipped);

        form.focus_field(FieldId::SecurityCode);
        assert!(!form.blur_field(FieldId::SecurityCode).flipped);

        // Blurring another field never flips
        form.focus_field(FieldId::SecurityCode);
        assert!(form.blur_field(FieldId::HolderName).flipped);
    }

    #[test]
    fn test_edits_do_not_touch_flip() {
        let mut form = FormStateMachine::new();
        form.focus_field(FieldId::SecurityCode);
        assert!(form.edit_field(FieldId::SecurityCode, "123").flipped);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut form = FormStateMachine::new();
        form.edit_field(FieldId::CardNumber, "4111111111111111");
        form.edit_field(FieldId::HolderName, "Ada");
        form.focus_field(FieldId::SecurityCode);
        let ticket = form.begin_submission().unwrap();
        form.finish_submission(ticket.id(), &Ok(()));
        assert!(form.snapshot().is_success());

        assert_eq!(form.reset(), &FormSnapshot::default());
    }

    #[test]
    fn test_reset_ignored_while_processing() {
        let mut form = FormStateMachine::new();
        form.edit_field(FieldId::HolderName, "Ada");
        let _ticket = form.begin_submission().unwrap();
        let snap = form.reset();
        assert!(snap.is_processing());
        assert_eq!(snap.holder_name, "Ada");
    }

    #[test]
    fn test_submission_transitions() {
        let mut form = FormStateMachine::new();
        let first = form.begin_submission().unwrap();
        assert!(form.begin_submission().is_none());
        assert!(!form.snapshot().can_submit());

        form.finish_submission(first.id(), &Err(FormError::submission("network down")));
        assert_eq!(form.snapshot().error_message(), Some("network down"));
        assert!(form.snapshot().can_submit());

        // A new attempt clears the message
        let second = form.begin_submission().unwrap();
        assert!(form.snapshot().error_message().is_none());

        form.finish_submission(second.id(), &Ok(()));
        assert!(form.snapshot().is_success());
        assert!(form.begin_submission().is_none());
    }

    #[test]
    fn test_finish_without_attempt_is_ignored() {
        let mut form = FormStateMachine::new();
        form.finish_submission(Uuid::new_v4(), &Ok(()));
        assert_eq!(form.snapshot().status, SubmissionStatus::Idle);
    }

    #[test]
    fn test_outcome_of_other_attempt_is_ignored() {
        let mut form = FormStateMachine::new();
        let ticket = form.begin_submission().unwrap();

        form.finish_submission(Uuid::new_v4(), &Ok(()));
        assert!(form.snapshot().is_processing());

        form.finish_submission(ticket.id(), &Ok(()));
        assert!(form.snapshot().is_success());
    }

    #[test]
    fn test_dropped_attempt_fails_and_unblocks_form() {
        let mut form = FormStateMachine::new();
        form.edit_field(FieldId::HolderName, "Ada");
        let ticket = form.begin_submission().unwrap();
        let id = ticket.id();
        drop(ticket);

        let snap = form.refresh();
        assert_eq!(snap.error_message(), Some(crate::error::FALLBACK_ERROR_MESSAGE));
        assert_eq!(snap.holder_name, "Ada");

        // Late outcome of the abandoned attempt no longer applies
        form.finish_submission(id, &Ok(()));
        assert!(!form.snapshot().is_success());

        assert_eq!(form.reset(), &FormSnapshot::default());
    }

    #[test]
    fn test_dropped_attempt_detected_on_next_event() {
        let mut form = FormStateMachine::new();
        drop(form.begin_submission());
        assert!(form.focus_field(FieldId::Expiry).can_submit());
        assert!(form.begin_submission().is_some());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(SubmissionStatus::Error("network down".into())).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "network down");

        let json = serde_json::to_value(SubmissionStatus::Processing).unwrap();
        assert_eq!(json["status"], "processing");
    }
}
