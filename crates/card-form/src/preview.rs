//! Card Preview
//!
//! Derives the text the visual card shows from a [`FormSnapshot`]: unfilled
//! number slots and empty fields get placeholders, and the flip flag picks
//! the face.

use serde::{Deserialize, Serialize};

use crate::brand::Brand;
use crate::form::FormSnapshot;
use crate::format::{CARD_NUMBER_DIGITS, CARD_NUMBER_GROUP, SECURITY_CODE_DIGITS};

/// Placeholder for a digit not typed yet
pub const BULLET: char = '\u{2022}';

pub const HOLDER_PLACEHOLDER: &str = "YOUR NAME HERE";
pub const EXPIRY_PLACEHOLDER: &str = "MM/YY";

/// Visible side of the card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFace {
    Front,
    Back,
}

/// Display strings for the card preview
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPreview {
    /// Always 16 slots in groups of 4, e.g. `4111 11•• •••• ••••`
    pub number: String,
    pub holder: String,
    pub expiry: String,
    pub security_code: String,
    pub face: CardFace,
    /// Brand artwork to show; `None` means generic card art
    pub brand: Option<Brand>,
}

impl CardPreview {
    pub fn from_snapshot(snapshot: &FormSnapshot) -> Self {
        let holder = if snapshot.holder_name.is_empty() {
            HOLDER_PLACEHOLDER.to_string()
        } else {
            snapshot.holder_name.to_uppercase()
        };

        let expiry = if snapshot.expiry.is_empty() {
            EXPIRY_PLACEHOLDER.to_string()
        } else {
            snapshot.expiry.clone()
        };

        let security_code = if snapshot.security_code.is_empty() {
            BULLET.to_string().repeat(SECURITY_CODE_DIGITS)
        } else {
            snapshot.security_code.clone()
        };

        Self {
            number: preview_number(&snapshot.card_digits()),
            holder,
            expiry,
            security_code,
            face: if snapshot.flipped { CardFace::Back } else { CardFace::Front },
            brand: snapshot.brand.is_known().then_some(snapshot.brand),
        }
    }
}

fn preview_number(digits: &str) -> String {
    let mut typed = digits.chars();
    let mut out = String::new();
    for i in 0..CARD_NUMBER_DIGITS {
        if i > 0 && i % CARD_NUMBER_GROUP == 0 {
            out.push(' ');
        }
        out.push(typed.next().unwrap_or(BULLET));
    }
    out
}
