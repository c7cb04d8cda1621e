// 🧾 Financial Identifier - normalize + validate payout instructions
//
// A candidate (kind + raw value + optional metadata) goes in, and either a
// normalized identifier or every field error comes out. The result is a
// tagged variant per kind, so a CARD can never carry a bank code and a
// PHONE can never carry a brand: nothing needs to be "cleared" by hand.

use crate::banks::BankCodeTable;
use crate::checksums::{
    clabe_checksum_ok, detect_card_brand, is_all_digits, is_digits_of_len, luhn_check,
    CardBrand, CARD_LENGTH, CLABE_LENGTH,
};
use crate::error::{FieldError, ValidationErrorKind, ValidationErrors};
use crate::phone::{canonical_phone, normalize_phone};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ACCOUNT_MIN_DIGITS: usize = 6;
pub const ACCOUNT_MAX_DIGITS: usize = 20;
pub const MAX_ALIAS_CHARS: usize = 80;
pub const MAX_BANK_NAME_CHARS: usize = 80;

const PHONE_MESSAGE: &str =
    "Phone number must be a valid Mexican number (10 digits, or +52 followed by 10 digits).";

// ============================================================================
// KIND / SOURCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Kind {
    /// Phone number for WhatsApp transfers
    Phone,

    /// 18-digit interbank CLABE
    Clabe,

    /// 16-digit card number
    Card,

    /// Plain bank account number (6-20 digits)
    Account,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Phone, Kind::Clabe, Kind::Card, Kind::Account];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Phone => "PHONE",
            Kind::Clabe => "CLABE",
            Kind::Card => "CARD",
            Kind::Account => "ACCOUNT",
        }
    }

    /// Case-insensitive parse of the wire spelling
    pub fn parse(s: &str) -> Option<Kind> {
        let upper = s.trim().to_ascii_uppercase();
        Kind::ALL.into_iter().find(|k| k.as_str() == upper)
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a CLABE's bank name came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BankNameSource {
    /// Looked up from the bank-code table
    Auto,

    /// Supplied by the owner, kept verbatim
    Manual,
}

impl BankNameSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankNameSource::Auto => "AUTO",
            BankNameSource::Manual => "MANUAL",
        }
    }

    pub fn parse(s: &str) -> Option<BankNameSource> {
        match s {
            "AUTO" => Some(BankNameSource::Auto),
            "MANUAL" => Some(BankNameSource::Manual),
            _ => None,
        }
    }
}

// ============================================================================
// CANDIDATE (input)
// ============================================================================

fn default_true() -> bool {
    true
}

/// Identifier as submitted by a form, API call, or import row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateIdentifier {
    /// Kind as text; anything unknown is reported as UnsupportedKind
    pub kind: String,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub bank_name: Option<String>,

    /// Auxiliary WhatsApp number for payment receipts
    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub alias: Option<String>,

    #[serde(default = "default_true")]
    pub is_public: bool,
}

impl CandidateIdentifier {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        CandidateIdentifier {
            kind: kind.into(),
            value: value.into(),
            bank_name: None,
            phone: None,
            alias: None,
            is_public: true,
        }
    }

    /// Builder pattern: caller-supplied bank name
    pub fn with_bank_name(mut self, bank_name: impl Into<String>) -> Self {
        self.bank_name = Some(bank_name.into());
        self
    }

    /// Builder pattern: auxiliary WhatsApp phone
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Same candidate, different kind (edit form switching the kind)
    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = kind.as_str().to_string();
        self
    }
}

// ============================================================================
// NORMALIZED (output)
// ============================================================================

/// A validated identifier; each variant only holds what applies to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum FinancialIdentifier {
    Phone {
        /// Always +52XXXXXXXXXX
        number: String,
    },
    Clabe {
        clabe: String,
        bank_code: String,
        bank_name: String,
        bank_name_source: BankNameSource,
    },
    Card {
        number: String,
        brand: CardBrand,
        bank_name: Option<String>,
    },
    Account {
        number: String,
        bank_name: Option<String>,
    },
}

impl FinancialIdentifier {
    pub fn kind(&self) -> Kind {
        match self {
            FinancialIdentifier::Phone { .. } => Kind::Phone,
            FinancialIdentifier::Clabe { .. } => Kind::Clabe,
            FinancialIdentifier::Card { .. } => Kind::Card,
            FinancialIdentifier::Account { .. } => Kind::Account,
        }
    }

    /// Normalized value
    pub fn value(&self) -> &str {
        match self {
            FinancialIdentifier::Phone { number } => number,
            FinancialIdentifier::Clabe { clabe, .. } => clabe,
            FinancialIdentifier::Card { number, .. } => number,
            FinancialIdentifier::Account { number, .. } => number,
        }
    }

    pub fn bank_code(&self) -> Option<&str> {
        match self {
            FinancialIdentifier::Clabe { bank_code, .. } => Some(bank_code),
            _ => None,
        }
    }

    pub fn bank_name(&self) -> Option<&str> {
        match self {
            FinancialIdentifier::Phone { .. } => None,
            FinancialIdentifier::Clabe { bank_name, .. } => Some(bank_name),
            FinancialIdentifier::Card { bank_name, .. } => bank_name.as_deref(),
            FinancialIdentifier::Account { bank_name, .. } => bank_name.as_deref(),
        }
    }

    pub fn bank_name_source(&self) -> Option<BankNameSource> {
        match self {
            FinancialIdentifier::Clabe { bank_name_source, .. } => Some(*bank_name_source),
            _ => None,
        }
    }

    pub fn brand(&self) -> Option<CardBrand> {
        match self {
            FinancialIdentifier::Card { brand, .. } => Some(*brand),
            _ => None,
        }
    }

    pub fn masked_value(&self) -> String {
        mask_value(self.kind(), self.value())
    }
}

/// Validated identifier plus the record metadata that travels with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIdentifier {
    pub identifier: FinancialIdentifier,

    /// +52XXXXXXXXXX; never set for PHONE (the value already is the phone)
    pub whatsapp_phone: Option<String>,

    pub alias: String,

    pub is_public: bool,
}

impl NormalizedIdentifier {
    pub fn kind(&self) -> Kind {
        self.identifier.kind()
    }

    pub fn value(&self) -> &str {
        self.identifier.value()
    }

    pub fn masked_value(&self) -> String {
        self.identifier.masked_value()
    }
}

impl From<&NormalizedIdentifier> for CandidateIdentifier {
    /// Feed a stored identifier back through validation (edit forms).
    ///
    /// AUTO bank names are not passed back as caller input, otherwise a
    /// re-save would flip them to MANUAL.
    fn from(normalized: &NormalizedIdentifier) -> Self {
        let bank_name = match &normalized.identifier {
            FinancialIdentifier::Clabe {
                bank_name,
                bank_name_source: BankNameSource::Manual,
                ..
            } => Some(bank_name.clone()),
            FinancialIdentifier::Card { bank_name, .. }
            | FinancialIdentifier::Account { bank_name, .. } => bank_name.clone(),
            _ => None,
        };

        CandidateIdentifier {
            kind: normalized.kind().as_str().to_string(),
            value: normalized.value().to_string(),
            bank_name,
            phone: normalized.whatsapp_phone.clone(),
            alias: Some(normalized.alias.clone()).filter(|a| !a.is_empty()),
            is_public: normalized.is_public,
        }
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Remove whitespace and hyphens ("0021 8000-0118...")
fn strip_separators(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Normalize and validate a candidate identifier.
///
/// Pure: nothing is persisted here. Errors on different fields (value and
/// phone, say) are all reported together.
pub fn normalize_and_validate(
    candidate: &CandidateIdentifier,
    banks: &BankCodeTable,
) -> Result<NormalizedIdentifier, ValidationErrors> {
    let mut errors = Vec::new();
    let value = strip_separators(&candidate.value);

    let whatsapp_phone = match non_blank(candidate.phone.as_deref()) {
        Some(raw) => {
            let canonical = canonical_phone(raw);
            if canonical.is_none() {
                errors.push(FieldError::new("phone", ValidationErrorKind::InvalidPhone, PHONE_MESSAGE));
            }
            canonical
        }
        None => None,
    };

    let bank_name = non_blank(candidate.bank_name.as_deref()).map(str::to_string);
    if let Some(name) = &bank_name {
        if name.chars().count() > MAX_BANK_NAME_CHARS {
            errors.push(FieldError::new(
                "bank_name",
                ValidationErrorKind::InvalidFormat,
                format!("Bank name must be at most {} characters.", MAX_BANK_NAME_CHARS),
            ));
        }
    }

    let alias = candidate.alias.as_deref().unwrap_or("").trim().to_string();
    if alias.chars().count() > MAX_ALIAS_CHARS {
        errors.push(FieldError::new(
            "alias",
            ValidationErrorKind::InvalidFormat,
            format!("Alias must be at most {} characters.", MAX_ALIAS_CHARS),
        ));
    }

    let identifier = match Kind::parse(&candidate.kind) {
        Some(kind) => match validate_value(kind, &value, bank_name, banks) {
            Ok(identifier) => Some(identifier),
            Err(e) => {
                errors.push(e);
                None
            }
        },
        None => {
            errors.push(FieldError::new(
                "kind",
                ValidationErrorKind::UnsupportedKind,
                format!("Unsupported kind {:?}.", candidate.kind),
            ));
            None
        }
    };

    match identifier {
        Some(identifier) if errors.is_empty() => {
            // The phone kind carries the number in its own value
            let whatsapp_phone = match identifier.kind() {
                Kind::Phone => None,
                _ => whatsapp_phone,
            };

            debug!(kind = %identifier.kind(), "identifier normalized");

            Ok(NormalizedIdentifier {
                identifier,
                whatsapp_phone,
                alias,
                is_public: candidate.is_public,
            })
        }
        _ => {
            debug!(kind = %candidate.kind, errors = errors.len(), "identifier rejected");
            Err(ValidationErrors(errors))
        }
    }
}

/// Kind-specific rules for the `value` field
fn validate_value(
    kind: Kind,
    value: &str,
    bank_name: Option<String>,
    banks: &BankCodeTable,
) -> Result<FinancialIdentifier, FieldError> {
    match kind {
        Kind::Phone => {
            let normalized = normalize_phone(value);
            if normalized.is_empty() {
                return Err(FieldError::new(
                    "value",
                    ValidationErrorKind::MissingValue,
                    "A WhatsApp number is required.",
                ));
            }
            let number = canonical_phone(&normalized).ok_or_else(|| {
                FieldError::new("value", ValidationErrorKind::InvalidPhone, PHONE_MESSAGE)
            })?;

            Ok(FinancialIdentifier::Phone { number })
        }

        Kind::Clabe => {
            if !is_digits_of_len(value, CLABE_LENGTH) {
                return Err(FieldError::new(
                    "value",
                    ValidationErrorKind::InvalidFormat,
                    "CLABE must be exactly 18 digits.",
                ));
            }
            if !clabe_checksum_ok(value) {
                return Err(FieldError::new(
                    "value",
                    ValidationErrorKind::InvalidChecksum,
                    "CLABE check digit does not match.",
                ));
            }

            let bank_code = value[..3].to_string();
            let (bank_name, bank_name_source) = match bank_name {
                Some(name) => (name, BankNameSource::Manual),
                None => (banks.lookup_bank_name(&bank_code).to_string(), BankNameSource::Auto),
            };

            Ok(FinancialIdentifier::Clabe {
                clabe: value.to_string(),
                bank_code,
                bank_name,
                bank_name_source,
            })
        }

        Kind::Card => {
            if !is_digits_of_len(value, CARD_LENGTH) {
                return Err(FieldError::new(
                    "value",
                    ValidationErrorKind::InvalidFormat,
                    "Card number must be exactly 16 digits.",
                ));
            }
            if !luhn_check(value).unwrap_or(false) {
                return Err(FieldError::new(
                    "value",
                    ValidationErrorKind::InvalidChecksum,
                    "Card number failed the Luhn check.",
                ));
            }

            Ok(FinancialIdentifier::Card {
                number: value.to_string(),
                brand: detect_card_brand(value),
                bank_name,
            })
        }

        Kind::Account => {
            let len_ok = (ACCOUNT_MIN_DIGITS..=ACCOUNT_MAX_DIGITS).contains(&value.len());
            if !len_ok || !is_all_digits(value) {
                return Err(FieldError::new(
                    "value",
                    ValidationErrorKind::InvalidFormat,
                    format!(
                        "Account number must be between {} and {} digits.",
                        ACCOUNT_MIN_DIGITS, ACCOUNT_MAX_DIGITS
                    ),
                ));
            }

            Ok(FinancialIdentifier::Account {
                number: value.to_string(),
                bank_name,
            })
        }
    }
}

// ============================================================================
// MASKING
// ============================================================================

/// Masked presentation for admin/internal views
///
/// PHONE is shown in full (it is meant to be contacted).
pub fn mask_value(kind: Kind, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = value.chars().collect();
    let n = chars.len();
    let head = |k: usize| -> String { chars[..k.min(n)].iter().collect() };
    let tail = |k: usize| -> String { chars[n.saturating_sub(k)..].iter().collect() };

    match kind {
        Kind::Phone => value.to_string(),
        Kind::Card => format!("{}{}", "*".repeat(12), tail(4)),
        Kind::Clabe => format!("{}{}{}", head(3), "*".repeat(12), tail(3)),
        Kind::Account => format!("{}{}", "*".repeat(n.saturating_sub(4)), tail(4)),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn banks() -> &'static BankCodeTable {
        BankCodeTable::builtin()
    }

    fn validate(candidate: &CandidateIdentifier) -> Result<NormalizedIdentifier, ValidationErrors> {
        normalize_and_validate(candidate, banks())
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(Kind::parse("CLABE"), Some(Kind::Clabe));
        assert_eq!(Kind::parse(" card "), Some(Kind::Card));
        assert_eq!(Kind::parse("IBAN"), None);
        assert_eq!(Kind::parse(""), None);
    }

    #[test]
    fn test_phone_kind_canonicalized() {
        let n = validate(&CandidateIdentifier::new("PHONE", "+52 (123) 456-7890")).unwrap();
        assert_eq!(n.identifier, FinancialIdentifier::Phone { number: "+521234567890".to_string() });

        let n = validate(&CandidateIdentifier::new("PHONE", "1234567890")).unwrap();
        assert_eq!(n.value(), "+521234567890");
    }

    #[test]
    fn test_phone_kind_errors() {
        let err = validate(&CandidateIdentifier::new("PHONE", "  ")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::MissingValue));

        let err = validate(&CandidateIdentifier::new("PHONE", "123")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidPhone));
    }

    #[test]
    fn test_phone_kind_drops_auxiliary_phone_and_bank_fields() {
        let candidate = CandidateIdentifier::new("PHONE", "5512345678")
            .with_phone("5587654321")
            .with_bank_name("Banorte");

        let n = validate(&candidate).unwrap();
        assert_eq!(n.whatsapp_phone, None);
        assert_eq!(n.identifier.bank_name(), None);
        assert_eq!(n.identifier.bank_code(), None);
        assert_eq!(n.identifier.brand(), None);
    }

    #[test]
    fn test_clabe_auto_bank_name() {
        let n = validate(&CandidateIdentifier::new("CLABE", "002 180 0001 1835 9710")).unwrap();

        assert_eq!(
            n.identifier,
            FinancialIdentifier::Clabe {
                clabe: "002180000118359710".to_string(),
                bank_code: "002".to_string(),
                bank_name: "Banamex".to_string(),
                bank_name_source: BankNameSource::Auto,
            }
        );
    }

    #[test]
    fn test_clabe_manual_bank_name_preserved() {
        let candidate = CandidateIdentifier::new("CLABE", "002180000118359710")
            .with_bank_name("Citibanamex Empresarial");

        let n = validate(&candidate).unwrap();
        assert_eq!(n.identifier.bank_name(), Some("Citibanamex Empresarial"));
        assert_eq!(n.identifier.bank_name_source(), Some(BankNameSource::Manual));
        assert_eq!(n.identifier.bank_code(), Some("002"));
    }

    #[test]
    fn test_clabe_blank_bank_name_counts_as_auto() {
        let candidate = CandidateIdentifier::new("CLABE", "646180157000000004").with_bank_name("   ");

        let n = validate(&candidate).unwrap();
        assert_eq!(n.identifier.bank_name(), Some("Sistema de Transferencia y Pagos (STP)"));
        assert_eq!(n.identifier.bank_name_source(), Some(BankNameSource::Auto));
    }

    #[test]
    fn test_clabe_unknown_code_is_auto_with_blank_name() {
        let n = validate(&CandidateIdentifier::new("CLABE", "999180000000000002")).unwrap();
        assert_eq!(n.identifier.bank_code(), Some("999"));
        assert_eq!(n.identifier.bank_name(), Some(""));
        assert_eq!(n.identifier.bank_name_source(), Some(BankNameSource::Auto));
    }

    #[test]
    fn test_clabe_format_and_checksum_errors_are_exclusive() {
        let err = validate(&CandidateIdentifier::new("CLABE", "00218000011835971")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidFormat));
        assert_eq!(err.errors().len(), 1);

        let err = validate(&CandidateIdentifier::new("CLABE", "002180000118359719")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidChecksum));
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn test_card_brand_and_checksum() {
        let n = validate(&CandidateIdentifier::new("CARD", "4111-1111-1111-1111")).unwrap();
        assert_eq!(n.value(), "4111111111111111");
        assert_eq!(n.identifier.brand(), Some(CardBrand::Visa));
        assert_eq!(n.identifier.bank_code(), None);

        let n = validate(&CandidateIdentifier::new("CARD", "5555 5555 5555 4444")).unwrap();
        assert_eq!(n.identifier.brand(), Some(CardBrand::MasterCard));

        let err = validate(&CandidateIdentifier::new("CARD", "4111111111111112")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidChecksum));

        let err = validate(&CandidateIdentifier::new("CARD", "411111111111")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidFormat));
    }

    #[test]
    fn test_account_length_bounds() {
        assert!(validate(&CandidateIdentifier::new("ACCOUNT", "123456")).is_ok());
        assert!(validate(&CandidateIdentifier::new("ACCOUNT", "12345678901234567890")).is_ok());

        let err = validate(&CandidateIdentifier::new("ACCOUNT", "12345")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidFormat));

        let err = validate(&CandidateIdentifier::new("ACCOUNT", "123456789012345678901")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidFormat));

        let err = validate(&CandidateIdentifier::new("ACCOUNT", "12345a7")).unwrap_err();
        assert!(err.has("value", ValidationErrorKind::InvalidFormat));
    }

    #[test]
    fn test_account_keeps_manual_bank_name() {
        let n = validate(&CandidateIdentifier::new("ACCOUNT", "0123456789").with_bank_name("Banorte"))
            .unwrap();
        assert_eq!(n.identifier.bank_name(), Some("Banorte"));
        assert_eq!(n.identifier.bank_code(), None);
        assert_eq!(n.identifier.brand(), None);
    }

    #[test]
    fn test_auxiliary_phone_normalized() {
        let candidate = CandidateIdentifier::new("CLABE", "002180000118359710").with_phone("55 1234 5678");
        let n = validate(&candidate).unwrap();
        assert_eq!(n.whatsapp_phone.as_deref(), Some("+525512345678"));
    }

    #[test]
    fn test_errors_on_different_fields_aggregate() {
        let candidate = CandidateIdentifier::new("CARD", "1234").with_phone("123");
        let err = validate(&candidate).unwrap_err();

        assert_eq!(err.errors().len(), 2);
        assert!(err.has("value", ValidationErrorKind::InvalidFormat));
        assert!(err.has("phone", ValidationErrorKind::InvalidPhone));
    }

    #[test]
    fn test_unsupported_kind() {
        let err = validate(&CandidateIdentifier::new("IBAN", "DE89370400440532013000")).unwrap_err();
        assert!(err.has("kind", ValidationErrorKind::UnsupportedKind));
        assert_eq!(err.errors().len(), 1);
    }

    #[test]
    fn test_alias_too_long() {
        let candidate = CandidateIdentifier::new("ACCOUNT", "0123456789").with_alias("x".repeat(81));
        let err = validate(&candidate).unwrap_err();
        assert!(err.has("alias", ValidationErrorKind::InvalidFormat));
    }

    #[test]
    fn test_revalidation_is_idempotent() {
        let candidates = vec![
            CandidateIdentifier::new("PHONE", "55 1234 5678").with_alias("WhatsApp"),
            CandidateIdentifier::new("CLABE", "002180000118359710").with_phone("5512345678"),
            CandidateIdentifier::new("CLABE", "002180000118359710").with_bank_name("Mi banco"),
            CandidateIdentifier::new("CARD", "4111 1111 1111 1111").with_bank_name("BBVA"),
            CandidateIdentifier::new("ACCOUNT", "0123-4567-89").with_public(false),
        ];

        for candidate in candidates {
            let first = validate(&candidate).unwrap();
            let second = validate(&CandidateIdentifier::from(&first)).unwrap();
            assert_eq!(first, second, "drift for {:?}", candidate);
        }
    }

    #[test]
    fn test_switching_card_to_account_clears_brand() {
        let card = validate(&CandidateIdentifier::new("CARD", "4111111111111111").with_bank_name("BBVA"))
            .unwrap();
        assert_eq!(card.identifier.brand(), Some(CardBrand::Visa));

        let as_account = CandidateIdentifier::from(&card).with_kind(Kind::Account);
        let account = validate(&as_account).unwrap();

        assert_eq!(account.kind(), Kind::Account);
        assert_eq!(account.identifier.brand(), None);
        assert_eq!(account.identifier.bank_name(), Some("BBVA"));

        // Without a bank name it stays absent
        let card = validate(&CandidateIdentifier::new("CARD", "4111111111111111")).unwrap();
        let account = validate(&CandidateIdentifier::from(&card).with_kind(Kind::Account)).unwrap();
        assert_eq!(account.identifier.bank_name(), None);
    }

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value(Kind::Card, "1234567890123456"), "************3456");
        assert_eq!(mask_value(Kind::Clabe, "002180000118359719"), "002************719");
        assert_eq!(mask_value(Kind::Account, "0123456789"), "******6789");
        assert_eq!(mask_value(Kind::Account, "1234"), "1234");
        assert_eq!(mask_value(Kind::Phone, "+521234567890"), "+521234567890");
        assert_eq!(mask_value(Kind::Card, ""), "");
        assert_eq!(mask_value(Kind::Account, ""), "");
    }

    #[test]
    fn test_normalized_masked_value() {
        let n = validate(&CandidateIdentifier::new("CLABE", "002180000118359710")).unwrap();
        assert_eq!(n.masked_value(), "002************710");
    }
}
