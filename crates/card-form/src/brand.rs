//! Card Brand Inference

use serde::{Deserialize, Serialize};

/// Card network, inferred from the leading digit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Brand {
    #[default]
    Unknown,
    Visa,
    Mastercard,
}

impl Brand {
    /// Classify a card number. Separators are ignored.
    pub fn classify(card_number: &str) -> Self {
        match card_number.chars().find(char::is_ascii_digit) {
            Some('4') => Brand::Visa,
            Some('5') => Brand::Mastercard,
            _ => Brand::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Brand::Unknown => "unknown",
            Brand::Visa => "visa",
            Brand::Mastercard => "mastercard",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Brand::Unknown)
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
