// Cobrando - Core Library
// Validation, normalization and storage of Mexican payout identifiers.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod error;
pub mod checksums;
pub mod phone;
pub mod banks;
pub mod identifier;
pub mod owners;
pub mod db;
pub mod import;
pub mod config;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{
    FieldError, InvalidInput, StoreError, StoreResult, ValidationErrorKind, ValidationErrors,
};
pub use checksums::{clabe_checksum_ok, detect_card_brand, luhn_check, CardBrand};
pub use phone::{canonical_phone, normalize_phone, validate_phone};
pub use banks::{lookup_bank_name, BankCodeEntry, BankCodeTable};
pub use identifier::{
    mask_value, normalize_and_validate,
    BankNameSource, CandidateIdentifier, FinancialIdentifier, Kind, NormalizedIdentifier,
};
pub use owners::{public_profile_path, NewOwner, Owner, Registration};
pub use db::{
    StoredIdentifier, PublicProfile, Event,
    setup_database, insert_event, get_events_for_entity,
    create_owner, get_owner, find_owner_by_slug,
    create_identifier, update_identifier, delete_identifier,
    get_identifier, list_identifiers, public_profile, count_identifiers,
};
pub use import::{import_candidates, load_candidates, ImportReport, ImportRow, RowOutcome};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
