//! Field Formatting
//!
//! Turns raw keystrokes into the masked value each input displays.
//! Every formatter works from the digits alone, so feeding a masked value
//! back in returns it unchanged.

use serde::{Deserialize, Serialize};

/// Card number digit limit
pub const CARD_NUMBER_DIGITS: usize = 16;

/// Digits per space-separated card number group
pub const CARD_NUMBER_GROUP: usize = 4;

/// Expiry digit limit (MMYY)
pub const EXPIRY_DIGITS: usize = 4;

/// Security code digit limit
pub const SECURITY_CODE_DIGITS: usize = 3;

/// Form inputs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldId {
    CardNumber,
    HolderName,
    Expiry,
    SecurityCode,
}

impl FieldId {
    /// All fields in form order
    pub const ALL: [FieldId; 4] = [
        FieldId::CardNumber,
        FieldId::HolderName,
        FieldId::Expiry,
        FieldId::SecurityCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldId::CardNumber => "cardNumber",
            FieldId::HolderName => "holderName",
            FieldId::Expiry => "expiry",
            FieldId::SecurityCode => "securityCode",
        }
    }

    /// Format raw input for this field
    pub fn format(&self, raw: &str) -> String {
        match self {
            FieldId::CardNumber => format_card_number(raw),
            FieldId::HolderName => raw.to_string(),
            FieldId::Expiry => format_expiry(raw),
            FieldId::SecurityCode => format_security_code(raw),
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keep at most `limit` ASCII digits, dropping everything else
pub fn digits(raw: &str, limit: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(limit).collect()
}

/// `"4111111111111111"` → `"4111 1111 1111 1111"`
pub fn format_card_number(raw: &str) -> String {
    let digits = digits(raw, CARD_NUMBER_DIGITS);
    let mut out = String::with_capacity(digits.len() + CARD_NUMBER_DIGITS / CARD_NUMBER_GROUP);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && i % CARD_NUMBER_GROUP == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

/// `"1225"` → `"12/25"`; the slash appears with the third digit.
///
/// Month and year are not range-checked.
pub fn format_expiry(raw: &str) -> String {
    let digits = digits(raw, EXPIRY_DIGITS);
    if digits.len() >= 3 {
        format!("{}/{}", &digits[..2], &digits[2..])
    } else {
        digits
    }
}

pub fn format_security_code(raw: &str) -> String {
    digits(raw, SECURITY_CODE_DIGITS)
}
