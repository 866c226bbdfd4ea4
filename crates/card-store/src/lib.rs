//! # card-store
//!
//! Storage backends for card-form submissions.
//!
//! ## Backends
//!
//! - **REST** (default): inserts into a PostgREST-style table endpoint
//! - **Memory**: re-exported from `card-form`, for development and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use card_store::{RestPaymentStore, SubmissionCoordinator};
//!
//! let store = RestPaymentStore::from_env()?;
//! let coordinator = SubmissionCoordinator::new(Arc::new(store));
//! ```

#[cfg(feature = "rest")]
pub mod rest;

#[cfg(feature = "rest")]
pub use rest::{RestPaymentStore, StoreConfig};

// Re-export core types for convenience
pub use card_form::{
    FormError, MemoryPaymentStore, PaymentRecord, PaymentStore, Result, SubmissionCoordinator,
};
