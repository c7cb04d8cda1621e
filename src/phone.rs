// 📱 Mexican phone numbers - normalization + validation
//
// Accepted after stripping whitespace, hyphens and parentheses:
//   +52XXXXXXXXXX   (country code + 10 digits)
//   XXXXXXXXXX      (10 bare digits)
// Persisted form is always +52XXXXXXXXXX.

pub const COUNTRY_PREFIX: &str = "+52";
pub const NATIONAL_DIGITS: usize = 10;

/// Strip whitespace, hyphens and parentheses
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

fn is_national_number(s: &str) -> bool {
    s.len() == NATIONAL_DIGITS && s.bytes().all(|b| b.is_ascii_digit())
}

/// Valid Mexican number (with or without +52) once normalized
pub fn validate_phone(phone: &str) -> bool {
    let normalized = normalize_phone(phone);
    if normalized.is_empty() {
        return false;
    }

    match normalized.strip_prefix(COUNTRY_PREFIX) {
        Some(rest) => is_national_number(rest),
        None => is_national_number(&normalized),
    }
}

/// Normalized `+52XXXXXXXXXX` form, or None if the number is not valid
pub fn canonical_phone(raw: &str) -> Option<String> {
    if !validate_phone(raw) {
        return None;
    }

    let normalized = normalize_phone(raw);
    if normalized.starts_with(COUNTRY_PREFIX) {
        Some(normalized)
    } else {
        Some(format!("{}{}", COUNTRY_PREFIX, normalized))
    }
}
