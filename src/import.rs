// 📥 CSV batch import - bulk-load payout identifiers
//
// Each row goes through the same validate-on-write path as a form submit.
// A bad row is recorded in the report and the import moves on.

use crate::banks::BankCodeTable;
use crate::db::create_identifier;
use crate::error::{FieldError, StoreError};
use crate::identifier::CandidateIdentifier;
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One CSV row: owner_id,kind,value,bank_name,alias,phone,is_public
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportRow {
    pub owner_id: String,
    pub kind: String,
    pub value: String,

    #[serde(default)]
    pub bank_name: Option<String>,

    #[serde(default)]
    pub alias: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub is_public: Option<bool>,
}

impl ImportRow {
    pub fn to_candidate(&self) -> CandidateIdentifier {
        CandidateIdentifier {
            kind: self.kind.clone(),
            value: self.value.clone(),
            bank_name: self.bank_name.clone(),
            phone: self.phone.clone(),
            alias: self.alias.clone(),
            is_public: self.is_public.unwrap_or(true),
        }
    }
}

/// What happened to one row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    Imported { id: String },
    Rejected { errors: Vec<FieldError> },
    Duplicate { kind: String },
    UnknownOwner,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowReport {
    /// 1-based data line (header excluded)
    pub line: usize,
    pub owner_id: String,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub rows: Vec<RowReport>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Imported { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Rejected { .. }))
    }

    pub fn duplicates(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::Duplicate { .. }))
    }

    pub fn unknown_owners(&self) -> usize {
        self.count(|o| matches!(o, RowOutcome::UnknownOwner))
    }

    fn count(&self, pred: impl Fn(&RowOutcome) -> bool) -> usize {
        self.rows.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} rows: {} imported, {} rejected, {} duplicates, {} unknown owners",
            self.rows.len(),
            self.imported(),
            self.rejected(),
            self.duplicates(),
            self.unknown_owners()
        )
    }
}

/// Read import rows from a CSV file with a header line
pub fn load_candidates(csv_path: &Path) -> Result<Vec<ImportRow>> {
    let mut rdr = csv::Reader::from_path(csv_path)
        .with_context(|| format!("Failed to open CSV file: {:?}", csv_path))?;

    let mut rows = Vec::new();
    for (i, result) in rdr.deserialize().enumerate() {
        let row: ImportRow =
            result.with_context(|| format!("Failed to deserialize CSV row {}", i + 1))?;
        rows.push(row);
    }

    Ok(rows)
}

/// Save every row, collecting per-row outcomes
///
/// Only database failures abort the import; validation problems,
/// duplicate kinds and unknown owners are reported per row.
pub fn import_candidates(
    conn: &Connection,
    rows: &[ImportRow],
    banks: &BankCodeTable,
) -> Result<ImportReport> {
    let mut report = ImportReport::default();

    for (i, row) in rows.iter().enumerate() {
        let line = i + 1;
        let outcome = match create_identifier(conn, &row.owner_id, &row.to_candidate(), banks, "csv_importer") {
            Ok(stored) => RowOutcome::Imported { id: stored.id },
            Err(StoreError::Validation(errors)) => RowOutcome::Rejected { errors: errors.0 },
            Err(StoreError::DuplicateKind { kind, .. }) => RowOutcome::Duplicate { kind },
            Err(StoreError::OwnerNotFound(_)) => RowOutcome::UnknownOwner,
            Err(e) => {
                return Err(e).with_context(|| format!("Import aborted at line {}", line));
            }
        };

        if !matches!(outcome, RowOutcome::Imported { .. }) {
            warn!(line, owner_id = %row.owner_id, "import row skipped: {:?}", outcome);
        }

        report.rows.push(RowReport {
            line,
            owner_id: row.owner_id.clone(),
            outcome,
        });
    }

    info!("{}", report.summary());
    Ok(report)
}
