// 🔢 Checksum Primitives - Luhn, CLABE, card brand
//
// Pure functions over digit strings. Useful standalone for client-side
// pre-validation and batch migrations; the orchestrator in identifier.rs
// decides which field errors they turn into.

use crate::error::InvalidInput;
use serde::{Deserialize, Serialize};

/// CLABE weights, applied cyclically over the first 17 digits
const CLABE_WEIGHTS: [u32; 3] = [3, 7, 1];

pub const CLABE_LENGTH: usize = 18;
pub const CARD_LENGTH: usize = 16;

/// True when the string is non-empty and only ASCII digits
pub fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Exactly `len` ASCII digits
pub fn is_digits_of_len(s: &str, len: usize) -> bool {
    s.len() == len && is_all_digits(s)
}

fn digit_values(digits: &str) -> Result<Vec<u32>, InvalidInput> {
    digits
        .chars()
        .enumerate()
        .map(|(position, c)| {
            c.to_digit(10)
                .ok_or(InvalidInput { found: c, position })
        })
        .collect()
}

// ============================================================================
// LUHN
// ============================================================================

/// Luhn mod-10 check for card numbers
///
/// Doubles every digit whose index has the same parity as the length,
/// so the rightmost digit is never doubled.
pub fn luhn_check(digits: &str) -> Result<bool, InvalidInput> {
    let values = digit_values(digits)?;
    let parity = values.len() % 2;

    let checksum: u32 = values
        .iter()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == parity {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            } else {
                d
            }
        })
        .sum();

    Ok(checksum % 10 == 0)
}

// ============================================================================
// CLABE
// ============================================================================

/// Mod-10 weighted checksum for 18-digit Mexican interbank CLABEs
///
/// Anything that is not exactly 18 digits is simply not a valid CLABE.
pub fn clabe_checksum_ok(clabe: &str) -> bool {
    if !is_digits_of_len(clabe, CLABE_LENGTH) {
        return false;
    }

    match (clabe_check_digit(&clabe[..CLABE_LENGTH - 1]), clabe[CLABE_LENGTH - 1..].parse::<u32>()) {
        (Some(expected), Ok(actual)) => expected == actual,
        _ => false,
    }
}

/// Check digit for the first 17 digits of a CLABE
pub fn clabe_check_digit(first_17: &str) -> Option<u32> {
    if !is_digits_of_len(first_17, CLABE_LENGTH - 1) {
        return None;
    }

    let total: u32 = first_17
        .chars()
        .filter_map(|c| c.to_digit(10))
        .zip(CLABE_WEIGHTS.iter().cycle())
        .map(|(d, w)| (d * w) % 10)
        .sum();

    Some((10 - (total % 10)) % 10)
}

// ============================================================================
// CARD BRAND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardBrand {
    Visa,
    MasterCard,
    Other,
}

impl CardBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "Visa",
            CardBrand::MasterCard => "MasterCard",
            CardBrand::Other => "Other",
        }
    }

    /// Parse the stored spelling back into a brand
    pub fn from_str_opt(s: &str) -> Option<CardBrand> {
        match s {
            "Visa" => Some(CardBrand::Visa),
            "MasterCard" => Some(CardBrand::MasterCard),
            "Other" => Some(CardBrand::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for CardBrand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic brand detection from the IIN prefix, no network lookups
///
/// - Visa: starts with 4
/// - MasterCard: 51-55 or 2221-2720
/// - anything else (or not 16 digits): Other
pub fn detect_card_brand(number: &str) -> CardBrand {
    if !is_digits_of_len(number, CARD_LENGTH) {
        return CardBrand::Other;
    }

    if number.starts_with('4') {
        return CardBrand::Visa;
    }

    let two: u32 = number[..2].parse().unwrap_or(0);
    let four: u32 = number[..4].parse().unwrap_or(0);

    if (51..=55).contains(&two) || (2221..=2720).contains(&four) {
        CardBrand::MasterCard
    } else {
        CardBrand::Other
    }
}

// ============================================================================
// TESTS
// ============================================================================
