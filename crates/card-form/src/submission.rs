//! Submission Coordinator
//!
//! Drives one submission attempt through `idle → processing → success|error`.
//!
//! ```text
//!            submit                 store Ok
//!   idle ───────────▶ processing ───────────▶ success ──reset()──▶ idle
//!                       ▲    │
//!                submit │    │ store Err
//!                       │    ▼
//!                       error
//! ```
//!
//! An attempt is split in three steps so the form stays usable while the
//! write is in flight:
//!
//! 1. [`SubmissionCoordinator::begin`] moves the form to `processing` and
//!    captures the record. It returns `None` when an attempt is already in
//!    flight, which is what prevents double submits.
//! 2. [`PendingSubmission::send`] performs the single storage write. It does
//!    not borrow the form.
//! 3. [`SubmissionCoordinator::resolve`] folds the outcome back into the form.
//!
//! [`SubmissionCoordinator::submit`] runs all three in sequence.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::Result;
use crate::form::{AttemptTicket, FormSnapshot, FormStateMachine};
use crate::record::PaymentRecord;
use crate::store::PaymentStore;

/// Submission coordinator
#[derive(Clone)]
pub struct SubmissionCoordinator {
    store: Arc<dyn PaymentStore>,
}

impl SubmissionCoordinator {
    /// Create a coordinator writing to `store`
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Start an attempt, or `None` if the form is processing or already
    /// submitted.
    pub fn begin(&self, form: &mut FormStateMachine) -> Option<PendingSubmission> {
        let Some(ticket) = form.begin_submission() else {
            tracing::debug!(
                status = form.snapshot().status.as_str(),
                "Submit ignored"
            );
            return None;
        };

        let record = PaymentRecord::from_snapshot(form.snapshot(), Utc::now());
        tracing::info!(
            attempt = %ticket.id(),
            store = self.store.name(),
            brand = %record.card_brand,
            last_four = %record.last_four,
            "Submitting card details"
        );

        Some(PendingSubmission {
            ticket,
            record,
            store: Arc::clone(&self.store),
        })
    }

    /// Apply the outcome of a finished attempt. An outcome belonging to
    /// another attempt or another form leaves `form` untouched.
    pub fn resolve<'a>(
        &self,
        form: &'a mut FormStateMachine,
        outcome: SubmissionOutcome,
    ) -> &'a FormSnapshot {
        form.finish_submission(outcome.ticket.id(), &outcome.result);
        form.snapshot()
    }

    /// Submit the form and wait for the storage outcome.
    ///
    /// Never fails: storage errors end up in the snapshot's error message.
    pub async fn submit<'a>(&self, form: &'a mut FormStateMachine) -> &'a FormSnapshot {
        match self.begin(form) {
            Some(pending) => {
                let outcome = pending.send().await;
                self.resolve(form, outcome)
            }
            None => form.snapshot(),
        }
    }
}

impl std::fmt::Debug for SubmissionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionCoordinator")
            .field("store", &self.store.name())
            .finish()
    }
}

/// An attempt whose storage write has not run yet.
///
/// Dropping it (or its [`SubmissionOutcome`]) without resolving fails the
/// attempt on the form's next operation, so the form never stays stuck in
/// `processing`.
pub struct PendingSubmission {
    ticket: AttemptTicket,
    record: PaymentRecord,
    store: Arc<dyn PaymentStore>,
}

impl PendingSubmission {
    /// Attempt ID for log correlation
    pub fn id(&self) -> Uuid {
        self.ticket.id()
    }

    /// Record that will be written
    pub fn record(&self) -> &PaymentRecord {
        &self.record
    }

    /// Perform the storage write. Consumes the attempt, so it runs once.
    pub async fn send(self) -> SubmissionOutcome {
        let result = self.store.insert(&self.record).await;
        let id = self.ticket.id();
        match &result {
            Ok(()) => tracing::info!(attempt = %id, "Card details recorded"),
            Err(e) => tracing::warn!(attempt = %id, error = %e, "Submission failed"),
        }
        SubmissionOutcome {
            ticket: self.ticket,
            result,
        }
    }
}

/// Result of a storage write, ready to be resolved into the form
#[derive(Debug)]
pub struct SubmissionOutcome {
    ticket: AttemptTicket,
    result: Result<()>,
}

impl SubmissionOutcome {
    pub fn id(&self) -> Uuid {
        self.ticket.id()
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
