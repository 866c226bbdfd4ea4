//! Payment Storage
//!
//! The storage backend is injected into the
//! [`SubmissionCoordinator`](crate::submission::SubmissionCoordinator) as a
//! trait object, so a REST client, a database or the in-memory store below
//! are interchangeable.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{FormError, Result};
use crate::record::PaymentRecord;

/// Payment storage trait (Strategy pattern)
///
/// One write per submission attempt. Implementations own their own timeout
/// policy; the coordinator waits for whatever outcome they produce.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persist a record. Failures should carry a readable description
    /// ([`FormError::SubmissionFailed`]).
    async fn insert(&self, record: &PaymentRecord) -> Result<()>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// How the in-memory store answers writes
#[derive(Clone, Debug, Default)]
enum Behavior {
    #[default]
    Accept,
    Reject(Option<String>),
}

/// In-memory payment store (for development/testing)
#[derive(Debug, Default)]
pub struct MemoryPaymentStore {
    records: Mutex<Vec<PaymentRecord>>,
    attempts: Mutex<usize>,
    behavior: Behavior,
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects every write with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Reject(Some(message.into())),
            ..Self::default()
        }
    }

    /// Store that rejects every write without a description
    pub fn failing_silently() -> Self {
        Self {
            behavior: Behavior::Reject(None),
            ..Self::default()
        }
    }

    /// Records accepted so far
    pub async fn records(&self) -> Vec<PaymentRecord> {
        self.records.lock().await.clone()
    }

    /// Number of `insert` calls, accepted or not
    pub async fn attempts(&self) -> usize {
        *self.attempts.lock().await
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, record: &PaymentRecord) -> Result<()> {
        *self.attempts.lock().await += 1;

        match &self.behavior {
            Behavior::Accept => {
                self.records.lock().await.push(record.clone());
                Ok(())
            }
            Behavior::Reject(message) => Err(FormError::SubmissionFailed(message.clone())),
        }
    }

    fn name(&self) -> &str {
        "MemoryPaymentStore"
    }
}
