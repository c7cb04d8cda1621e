// 🏦 Bank Code Table - CLABE prefix → bank name
// Table as data: ships as data/bank_codes.json, can be swapped for an
// external file without touching the validation code.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const BUILTIN_BANK_CODES: &str = include_str!("../data/bank_codes.json");

static BUILTIN: Lazy<BankCodeTable> = Lazy::new(|| {
    // The embedded file is covered by test_builtin_table_parses
    BankCodeTable::from_json(BUILTIN_BANK_CODES).unwrap_or_default()
});

/// One row of the bank-code data file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankCodeEntry {
    /// 3-digit CLABE prefix (e.g., "072")
    pub code: String,

    /// Human-readable bank name (e.g., "Banorte")
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankCodeTable {
    names: BTreeMap<String, String>,
}

impl BankCodeTable {
    /// Built-in table (28 Mexican banks and fintechs)
    pub fn builtin() -> &'static BankCodeTable {
        &BUILTIN
    }

    /// Load a table from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read bank codes file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
            .with_context(|| format!("Invalid bank codes file: {:?}", path.as_ref()))
    }

    /// Parse a JSON array of `{ "code": "...", "name": "..." }`
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<BankCodeEntry> =
            serde_json::from_str(json).context("Failed to parse bank codes JSON")?;

        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<BankCodeEntry>) -> Result<Self> {
        let mut names = BTreeMap::new();

        for entry in entries {
            if entry.code.len() != 3 || !entry.code.bytes().all(|b| b.is_ascii_digit()) {
                bail!("Bank code must be exactly 3 digits, got {:?}", entry.code);
            }
            if entry.name.trim().is_empty() {
                bail!("Bank code {} has an empty name", entry.code);
            }
            if names.insert(entry.code.clone(), entry.name).is_some() {
                bail!("Duplicate bank code {}", entry.code);
            }
        }

        Ok(BankCodeTable { names })
    }

    /// Bank name for a 3-digit code; unknown codes give ""
    pub fn lookup_bank_name(&self, code: &str) -> &str {
        self.names.get(code).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}

/// Lookup against the built-in table
pub fn lookup_bank_name(code: &str) -> &'static str {
    BankCodeTable::builtin().lookup_bank_name(code)
}
