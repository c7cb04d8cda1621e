// 🗄️ Persistence - SQLite + WAL, validate-on-write
//
// Every identifier write goes through normalize_and_validate first; a
// rejected candidate never reaches SQL. The (owner_id, kind) uniqueness rule
// lives here, checked inside the same transaction as the write and backed
// by a UNIQUE constraint.

use crate::banks::BankCodeTable;
use crate::checksums::CardBrand;
use crate::error::{
    FieldError, StoreError, StoreResult, ValidationErrorKind, ValidationErrors,
};
use crate::identifier::{
    normalize_and_validate, BankNameSource, CandidateIdentifier, FinancialIdentifier, Kind,
    NormalizedIdentifier,
};
use crate::owners::{base_slug, Owner, Registration};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ============================================================================
// STORED TYPES
// ============================================================================

/// A persisted identifier: identity + owner + validated value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredIdentifier {
    /// Stable identity (UUID)
    pub id: String,
    pub owner_id: String,
    pub normalized: NormalizedIdentifier,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredIdentifier {
    pub fn kind(&self) -> Kind {
        self.normalized.kind()
    }

    /// Candidate for an edit form, pre-filled with the stored values
    pub fn to_candidate(&self) -> CandidateIdentifier {
        CandidateIdentifier::from(&self.normalized)
    }
}

/// Owner plus the identifiers they chose to publish
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicProfile {
    pub owner: Owner,
    pub identifiers: Vec<StoredIdentifier>,
}

/// Event for audit trail (every write leaves one)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

// ============================================================================
// SCHEMA
// ============================================================================

pub fn setup_database(conn: &Connection) -> StoreResult<()> {
    // WAL for crash recovery (in-memory databases report "memory")
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!(journal_mode = %mode, "database journal mode");

    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS owners (
            id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL DEFAULT '',
            email TEXT UNIQUE,
            phone TEXT UNIQUE,
            public_slug TEXT UNIQUE NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // One identifier per (owner, kind)
    conn.execute(
        "CREATE TABLE IF NOT EXISTS bank_details (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL REFERENCES owners(id) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            value TEXT NOT NULL,
            bank_code TEXT NOT NULL DEFAULT '',
            bank_name TEXT NOT NULL DEFAULT '',
            bank_name_source TEXT NOT NULL DEFAULT 'AUTO',
            brand TEXT NOT NULL DEFAULT '',
            alias TEXT NOT NULL DEFAULT '',
            phone TEXT NOT NULL DEFAULT '',
            is_public INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CONSTRAINT uniq_bankdetail_owner_kind UNIQUE (owner_id, kind)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_bank_details_owner_kind ON bank_details(owner_id, kind)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_timestamp ON events(timestamp)",
        [],
    )?;

    Ok(())
}

// ============================================================================
// ROW MAPPING
// ============================================================================

fn conversion_error(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, message.into())
}

fn parse_time(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e.to_string()))
}

fn empty_to_none(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

const IDENTIFIER_COLUMNS: &str = "id, owner_id, kind, value, bank_code, bank_name, bank_name_source,
     brand, alias, phone, is_public, created_at, updated_at";

fn row_to_stored(row: &Row<'_>) -> rusqlite::Result<StoredIdentifier> {
    let kind: String = row.get(2)?;
    let value: String = row.get(3)?;
    let bank_code: String = row.get(4)?;
    let bank_name: String = row.get(5)?;
    let source: String = row.get(6)?;
    let brand: String = row.get(7)?;
    let phone: String = row.get(9)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;

    let identifier = match Kind::parse(&kind) {
        Some(Kind::Phone) => FinancialIdentifier::Phone { number: value },
        Some(Kind::Clabe) => FinancialIdentifier::Clabe {
            clabe: value,
            bank_code,
            bank_name,
            bank_name_source: BankNameSource::parse(&source)
                .ok_or_else(|| conversion_error(6, format!("bad bank_name_source {:?}", source)))?,
        },
        Some(Kind::Card) => FinancialIdentifier::Card {
            number: value,
            brand: CardBrand::from_str_opt(&brand)
                .ok_or_else(|| conversion_error(7, format!("bad brand {:?}", brand)))?,
            bank_name: empty_to_none(bank_name),
        },
        Some(Kind::Account) => FinancialIdentifier::Account {
            number: value,
            bank_name: empty_to_none(bank_name),
        },
        None => return Err(conversion_error(2, format!("bad kind {:?}", kind))),
    };

    Ok(StoredIdentifier {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        normalized: NormalizedIdentifier {
            identifier,
            whatsapp_phone: empty_to_none(phone),
            alias: row.get(8)?,
            is_public: row.get(10)?,
        },
        created_at: parse_time(11, &created_at)?,
        updated_at: parse_time(12, &updated_at)?,
    })
}

fn row_to_owner(row: &Row<'_>) -> rusqlite::Result<Owner> {
    let created_at: String = row.get(5)?;

    Ok(Owner {
        id: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        public_slug: row.get(4)?,
        created_at: parse_time(5, &created_at)?,
    })
}

/// Audit payload: never the full value
fn identifier_event_data(stored: &StoredIdentifier) -> serde_json::Value {
    serde_json::json!({
        "owner_id": stored.owner_id,
        "kind": stored.kind().as_str(),
        "masked_value": stored.normalized.masked_value(),
        "is_public": stored.normalized.is_public,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

// ============================================================================
// EVENTS
// ============================================================================

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> StoreResult<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity, newest first
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> StoreResult<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC, id DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: parse_time(1, &timestamp_str)?,
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|e| conversion_error(5, e.to_string()))?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

// ============================================================================
// OWNERS
// ============================================================================

fn contact_taken(conn: &Connection, column: &str, value: &str) -> StoreResult<bool> {
    let sql = format!("SELECT 1 FROM owners WHERE {} = ?1", column);
    let found: Option<i64> = conn.query_row(&sql, [value], |row| row.get(0)).optional()?;
    Ok(found.is_some())
}

fn slug_taken(conn: &Connection, slug: &str) -> StoreResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM owners WHERE public_slug = ?1", [slug], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Register a new owner (email or phone, unique across owners)
pub fn create_owner(conn: &Connection, registration: &Registration) -> StoreResult<Owner> {
    let new_owner = registration.validate()?;

    let tx = conn.unchecked_transaction()?;

    let mut errors = Vec::new();
    if let Some(email) = &new_owner.email {
        if contact_taken(&tx, "email", email)? {
            errors.push(FieldError::new(
                "email",
                ValidationErrorKind::AlreadyRegistered,
                "This email is already registered.",
            ));
        }
    }
    if let Some(phone) = &new_owner.phone {
        if contact_taken(&tx, "phone", phone)? {
            errors.push(FieldError::new(
                "phone",
                ValidationErrorKind::AlreadyRegistered,
                "This phone is already registered.",
            ));
        }
    }
    ValidationErrors::into_result(errors)?;

    let base = base_slug(&new_owner);
    let mut public_slug = base.clone();
    let mut n = 2;
    while slug_taken(&tx, &public_slug)? {
        public_slug = format!("{}-{}", base, n);
        n += 1;
    }

    let owner = Owner {
        id: uuid::Uuid::new_v4().to_string(),
        email: new_owner.email,
        phone: new_owner.phone,
        display_name: new_owner.display_name,
        public_slug,
        created_at: Utc::now(),
    };

    tx.execute(
        "INSERT INTO owners (id, display_name, email, phone, public_slug, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            owner.id,
            owner.display_name,
            owner.email,
            owner.phone,
            owner.public_slug,
            owner.created_at.to_rfc3339(),
        ],
    )?;

    insert_event(
        &tx,
        &Event::new(
            "owner_registered",
            "owner",
            &owner.id,
            serde_json::json!({ "public_slug": owner.public_slug }),
            "registration",
        ),
    )?;

    tx.commit()?;
    info!(owner_id = %owner.id, slug = %owner.public_slug, "owner registered");

    Ok(owner)
}

pub fn get_owner(conn: &Connection, owner_id: &str) -> StoreResult<Owner> {
    conn.query_row(
        "SELECT id, display_name, email, phone, public_slug, created_at
         FROM owners WHERE id = ?1",
        [owner_id],
        row_to_owner,
    )
    .optional()?
    .ok_or_else(|| StoreError::OwnerNotFound(owner_id.to_string()))
}

pub fn find_owner_by_slug(conn: &Connection, slug: &str) -> StoreResult<Option<Owner>> {
    let owner = conn
        .query_row(
            "SELECT id, display_name, email, phone, public_slug, created_at
             FROM owners WHERE public_slug = ?1",
            [slug],
            row_to_owner,
        )
        .optional()?;

    Ok(owner)
}

fn owner_exists(conn: &Connection, owner_id: &str) -> StoreResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM owners WHERE id = ?1", [owner_id], |row| row.get(0))
        .optional()?;
    Ok(found.is_some())
}

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Id of the owner's identifier of `kind`, if one exists
fn find_by_owner_kind(conn: &Connection, owner_id: &str, kind: Kind) -> StoreResult<Option<String>> {
    let id = conn
        .query_row(
            "SELECT id FROM bank_details WHERE owner_id = ?1 AND kind = ?2",
            params![owner_id, kind.as_str()],
            |row| row.get(0),
        )
        .optional()?;

    Ok(id)
}

fn validate_for_write(
    candidate: &CandidateIdentifier,
    banks: &BankCodeTable,
    context: &str,
) -> StoreResult<NormalizedIdentifier> {
    normalize_and_validate(candidate, banks).map_err(|errors| {
        warn!(kind = %candidate.kind, context, "rejected identifier write: {}", errors);
        StoreError::Validation(errors)
    })
}

/// Validate, normalize and insert a new identifier for an owner
pub fn create_identifier(
    conn: &Connection,
    owner_id: &str,
    candidate: &CandidateIdentifier,
    banks: &BankCodeTable,
    actor: &str,
) -> StoreResult<StoredIdentifier> {
    let normalized = validate_for_write(candidate, banks, owner_id)?;
    let kind = normalized.kind();

    let tx = conn.unchecked_transaction()?;

    if !owner_exists(&tx, owner_id)? {
        return Err(StoreError::OwnerNotFound(owner_id.to_string()));
    }

    let duplicate = || StoreError::DuplicateKind {
        owner_id: owner_id.to_string(),
        kind: kind.as_str().to_string(),
    };

    if find_by_owner_kind(&tx, owner_id, kind)?.is_some() {
        warn!(owner_id, kind = %kind, "duplicate identifier kind rejected");
        return Err(duplicate());
    }

    let now = Utc::now();
    let stored = StoredIdentifier {
        id: uuid::Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        normalized,
        created_at: now,
        updated_at: now,
    };

    let n = &stored.normalized;
    let result = tx.execute(
        "INSERT INTO bank_details (
            id, owner_id, kind, value, bank_code, bank_name, bank_name_source,
            brand, alias, phone, is_public, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            stored.id,
            stored.owner_id,
            kind.as_str(),
            n.value(),
            n.identifier.bank_code().unwrap_or(""),
            n.identifier.bank_name().unwrap_or(""),
            n.identifier.bank_name_source().unwrap_or(BankNameSource::Auto).as_str(),
            n.identifier.brand().map(|b| b.as_str()).unwrap_or(""),
            n.alias,
            n.whatsapp_phone.as_deref().unwrap_or(""),
            n.is_public,
            stored.created_at.to_rfc3339(),
            stored.updated_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => return Err(duplicate()),
        Err(e) => return Err(e.into()),
    }

    insert_event(
        &tx,
        &Event::new(
            "identifier_created",
            "bank_detail",
            &stored.id,
            identifier_event_data(&stored),
            actor,
        ),
    )?;

    tx.commit()?;
    info!(id = %stored.id, owner_id, kind = %kind, "identifier created");

    Ok(stored)
}

/// Re-validate and overwrite an existing identifier (kind may change)
pub fn update_identifier(
    conn: &Connection,
    id: &str,
    candidate: &CandidateIdentifier,
    banks: &BankCodeTable,
    actor: &str,
) -> StoreResult<StoredIdentifier> {
    let normalized = validate_for_write(candidate, banks, id)?;
    let kind = normalized.kind();

    let tx = conn.unchecked_transaction()?;

    let existing = get_identifier(&tx, id)?;

    if let Some(other) = find_by_owner_kind(&tx, &existing.owner_id, kind)? {
        if other != id {
            warn!(owner_id = %existing.owner_id, kind = %kind, "kind change collides with existing identifier");
            return Err(StoreError::DuplicateKind {
                owner_id: existing.owner_id,
                kind: kind.as_str().to_string(),
            });
        }
    }

    let stored = StoredIdentifier {
        id: existing.id,
        owner_id: existing.owner_id,
        normalized,
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    let n = &stored.normalized;
    let result = tx.execute(
        "UPDATE bank_details
         SET kind = ?2, value = ?3, bank_code = ?4, bank_name = ?5, bank_name_source = ?6,
             brand = ?7, alias = ?8, phone = ?9, is_public = ?10, updated_at = ?11
         WHERE id = ?1",
        params![
            stored.id,
            kind.as_str(),
            n.value(),
            n.identifier.bank_code().unwrap_or(""),
            n.identifier.bank_name().unwrap_or(""),
            n.identifier.bank_name_source().unwrap_or(BankNameSource::Auto).as_str(),
            n.identifier.brand().map(|b| b.as_str()).unwrap_or(""),
            n.alias,
            n.whatsapp_phone.as_deref().unwrap_or(""),
            n.is_public,
            stored.updated_at.to_rfc3339(),
        ],
    );

    match result {
        Ok(_) => {}
        Err(e) if is_unique_violation(&e) => {
            return Err(StoreError::DuplicateKind {
                owner_id: stored.owner_id,
                kind: kind.as_str().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    }

    insert_event(
        &tx,
        &Event::new(
            "identifier_updated",
            "bank_detail",
            &stored.id,
            identifier_event_data(&stored),
            actor,
        ),
    )?;

    tx.commit()?;
    info!(id = %stored.id, kind = %kind, "identifier updated");

    Ok(stored)
}

pub fn delete_identifier(conn: &Connection, id: &str, actor: &str) -> StoreResult<()> {
    let tx = conn.unchecked_transaction()?;
    let existing = get_identifier(&tx, id)?;

    tx.execute("DELETE FROM bank_details WHERE id = ?1", [id])?;
    insert_event(
        &tx,
        &Event::new(
            "identifier_deleted",
            "bank_detail",
            id,
            identifier_event_data(&existing),
            actor,
        ),
    )?;

    tx.commit()?;
    info!(id, "identifier deleted");

    Ok(())
}

pub fn get_identifier(conn: &Connection, id: &str) -> StoreResult<StoredIdentifier> {
    let sql = format!("SELECT {} FROM bank_details WHERE id = ?1", IDENTIFIER_COLUMNS);

    conn.query_row(&sql, [id], row_to_stored)
        .optional()?
        .ok_or_else(|| StoreError::IdentifierNotFound(id.to_string()))
}

/// All identifiers of an owner, by kind then most recently updated
pub fn list_identifiers(conn: &Connection, owner_id: &str) -> StoreResult<Vec<StoredIdentifier>> {
    let sql = format!(
        "SELECT {} FROM bank_details WHERE owner_id = ?1 ORDER BY kind, updated_at DESC",
        IDENTIFIER_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let identifiers = stmt
        .query_map([owner_id], row_to_stored)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(identifiers)
}

/// Owner + public identifiers for the /u/<slug>/ page
pub fn public_profile(conn: &Connection, slug: &str) -> StoreResult<PublicProfile> {
    let owner = find_owner_by_slug(conn, slug)?
        .ok_or_else(|| StoreError::OwnerNotFound(slug.to_string()))?;

    let identifiers = list_identifiers(conn, &owner.id)?
        .into_iter()
        .filter(|i| i.normalized.is_public)
        .collect();

    Ok(PublicProfile { owner, identifiers })
}

pub fn count_identifiers(conn: &Connection) -> StoreResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM bank_details", [], |row| row.get(0))?;

    Ok(count)
}

// ============================================================================
// TESTS
// ============================================================================
