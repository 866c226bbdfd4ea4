//! # card-form
//!
//! Card entry form logic: input masking, brand inference, card preview state
//! and the submission lifecycle.
//!
//! ## Architecture
//!
//! ```text
//!  edit / focus / blur           submit
//!         │                        │
//!         ▼                        ▼
//! ┌──────────────────┐    ┌───────────────────────┐    ┌──────────────────┐
//! │ FormStateMachine │◀──▶│ SubmissionCoordinator │───▶│   PaymentStore   │
//! │  format + brand  │    │ idle→processing→done  │    │    (Strategy)    │
//! └──────────────────┘    └───────────────────────┘    └──────────────────┘
//!         │
//!         ▼
//!   FormSnapshot ──▶ CardPreview ──▶ presentation layer
//! ```
//!
//! The `PaymentStore` trait is the only I/O boundary. Everything else runs
//! synchronously inside the caller's event handler.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use card_form::{FieldId, FormStateMachine, MemoryPaymentStore, SubmissionCoordinator};
//!
//! let mut form = FormStateMachine::new();
//! form.edit_field(FieldId::CardNumber, "4111111111111111");
//! form.focus_field(FieldId::SecurityCode);
//!
//! let coordinator = SubmissionCoordinator::new(Arc::new(MemoryPaymentStore::new()));
//! let snapshot = coordinator.submit(&mut form).await;
//! ```

pub mod brand;
pub mod error;
pub mod form;
pub mod format;
pub mod preview;
pub mod record;
pub mod store;
pub mod submission;

pub use brand::Brand;
pub use error::{FormError, Result, FALLBACK_ERROR_MESSAGE};
pub use form::{FormSnapshot, FormStateMachine, SubmissionStatus};
pub use format::FieldId;
pub use preview::{CardFace, CardPreview};
pub use record::PaymentRecord;
pub use store::{MemoryPaymentStore, PaymentStore};
pub use submission::{PendingSubmission, SubmissionCoordinator, SubmissionOutcome};
