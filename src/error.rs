// 🚨 Error Types - field-scoped validation errors + persistence errors
//
// Validators return bool/enums. The orchestrator is the only place that
// builds FieldErrors, and it aggregates them so one failed submission can
// report problems on several fields at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// What went wrong with a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Required value is empty
    MissingValue,

    /// Wrong length or character class
    InvalidFormat,

    /// Right shape, fails the checksum math
    InvalidChecksum,

    /// Not a valid Mexican phone number
    InvalidPhone,

    /// Kind is not one of PHONE / CLABE / CARD / ACCOUNT
    UnsupportedKind,

    /// Contact (email/phone) already belongs to another owner
    AlreadyRegistered,
}

impl ValidationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationErrorKind::MissingValue => "MissingValue",
            ValidationErrorKind::InvalidFormat => "InvalidFormat",
            ValidationErrorKind::InvalidChecksum => "InvalidChecksum",
            ValidationErrorKind::InvalidPhone => "InvalidPhone",
            ValidationErrorKind::UnsupportedKind => "UnsupportedKind",
            ValidationErrorKind::AlreadyRegistered => "AlreadyRegistered",
        }
    }
}

/// A validation failure scoped to one input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            kind,
            message: message.into(),
        }
    }
}

/// All field errors from one failed attempt (never empty)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("validation failed: {}", summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(error: FieldError) -> Self {
        ValidationErrors(vec![error])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// First error reported for a field, if any
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.0.iter().find(|e| e.field == field)
    }

    pub fn has(&self, field: &str, kind: ValidationErrorKind) -> bool {
        self.0.iter().any(|e| e.field == field && e.kind == kind)
    }

    /// Ok(()) when nothing was collected, Err(self) otherwise
    pub fn into_result(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

/// Input to a digit-only primitive contained something other than 0-9
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: expected only decimal digits, found {found:?} at position {position}")]
pub struct InvalidInput {
    pub found: char,
    pub position: usize,
}

// ============================================================================
// STORE ERRORS
// ============================================================================

/// Errors from the persistence collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    /// Candidate failed validation, nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Owner already has an identifier of this kind
    #[error("owner {owner_id} already has a {kind} identifier")]
    DuplicateKind { owner_id: String, kind: String },

    #[error("owner not found: {0}")]
    OwnerNotFound(String),

    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
