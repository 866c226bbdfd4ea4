//! Payment Record
//!
//! The row handed to the storage backend for one submission attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::FormSnapshot;

/// Number of trailing digits kept for display
pub const LAST_FOUR: usize = 4;

/// A submitted card, serialized with the `payments` table column names
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub cardholder_name: String,

    /// Brand tag, `unknown` when the number matched no brand
    pub card_brand: String,

    /// Card number, digits only
    pub card_number: String,

    #[serde(rename = "cvv")]
    pub security_code: String,

    #[serde(rename = "card_last_four")]
    pub last_four: String,

    /// Masked `MM/YY` expiry
    #[serde(rename = "expiry_date")]
    pub expiry: String,

    /// When the attempt was made
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// Build the record for an attempt made at `created_at`
    pub fn from_snapshot(snapshot: &FormSnapshot, created_at: DateTime<Utc>) -> Self {
        let card_number = snapshot.card_digits();
        Self {
            cardholder_name: snapshot.holder_name.clone(),
            card_brand: snapshot.brand.as_str().to_string(),
            last_four: last_four(&card_number).to_string(),
            card_number,
            security_code: snapshot.security_code.clone(),
            expiry: snapshot.expiry.clone(),
            created_at,
        }
    }
}

impl std::fmt::Debug for PaymentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentRecord")
            .field("cardholder_name", &self.cardholder_name)
            .field("card_brand", &self.card_brand)
            .field("card_number", &"<redacted>")
            .field("security_code", &"<redacted>")
            .field("last_four", &self.last_four)
            .field("expiry", &self.expiry)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Final four characters, or the whole string when shorter
fn last_four(digits: &str) -> &str {
    let start = digits.len().saturating_sub(LAST_FOUR);
    &digits[start..]
}
