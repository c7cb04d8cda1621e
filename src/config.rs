//! Configuration loading
//!
//! Resolution order for the config file:
//! 1. Path given on the command line
//! 2. `COBRANDO_CONFIG` environment variable
//! 3. `./cobrando.toml` if it exists
//! 4. Built-in defaults
//!
//! `COBRANDO_DATABASE` and `COBRANDO_BIND` then override single fields.

use crate::banks::BankCodeTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "COBRANDO_CONFIG";
pub const DATABASE_ENV: &str = "COBRANDO_DATABASE";
pub const BIND_ENV: &str = "COBRANDO_BIND";
pub const DEFAULT_CONFIG_FILE: &str = "cobrando.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Address the HTTP server binds to
    pub bind_addr: String,

    /// External bank-code table; None uses the built-in one
    pub bank_codes_path: Option<PathBuf>,

    /// tracing EnvFilter directive (RUST_LOG wins when set)
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("cobrando.db"),
            bind_addr: "127.0.0.1:3000".to_string(),
            bank_codes_path: None,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {:?}", path.as_ref()))
    }

    /// Resolve and load the configuration, then apply env overrides
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_config_path(cli_path) {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };

        config.apply_overrides(
            std::env::var(DATABASE_ENV).ok(),
            std::env::var(BIND_ENV).ok(),
        );

        Ok(config)
    }

    fn apply_overrides(&mut self, database: Option<String>, bind: Option<String>) {
        if let Some(db) = database.filter(|s| !s.is_empty()) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(addr) = bind.filter(|s| !s.is_empty()) {
            self.bind_addr = addr;
        }
    }

    /// Install the global tracing subscriber (stderr, RUST_LOG wins)
    pub fn init_logging(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.log_filter));

        // A second init (tests, embedding) keeps the first subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Bank-code table from the configured file, or the built-in one
    pub fn bank_table(&self) -> Result<BankCodeTable> {
        match &self.bank_codes_path {
            Some(path) => BankCodeTable::from_file(path),
            None => Ok(BankCodeTable::builtin().clone()),
        }
    }
}

fn resolve_config_path(cli_path: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_path {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Working directory
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            database_path = "/var/lib/cobrando/app.db"
            log_filter = "cobrando=debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/cobrando/app.db"));
        assert_eq!(config.log_filter, "cobrando=debug");
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
        assert_eq!(config.bank_codes_path, None);
    }

    #[test]
    fn test_explicit_path_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_addr = \"0.0.0.0:8080\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        assert!(Config::load(Some(Path::new("/no/such/cobrando.toml"))).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("other.db".to_string()), Some(String::new()));

        assert_eq!(config.database_path, PathBuf::from("other.db"));
        assert_eq!(config.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_bank_table_from_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"code": "901", "name": "Banco Nuevo"}}]"#).unwrap();

        let config = Config {
            bank_codes_path: Some(file.path().to_path_buf()),
            ..Config::default()
        };
        let table = config.bank_table().unwrap();
        assert_eq!(table.lookup_bank_name("901"), "Banco Nuevo");

        assert_eq!(Config::default().bank_table().unwrap().len(), 28);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("database_path = [").is_err());
    }
}
