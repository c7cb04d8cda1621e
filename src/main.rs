// Cobrando - command-line tool
//
// Operator commands around the same library the HTTP server uses:
// database setup, one-off validation, masking, owner registration,
// CSV import and listing.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::info;

use cobrando::{
    create_owner, import_candidates, list_identifiers, load_candidates, mask_value,
    normalize_and_validate, setup_database, CandidateIdentifier, Config, Kind, Registration,
};

#[derive(Parser, Debug)]
#[command(name = "cobrando", version, about = "Payout identifier validation and storage")]
struct Cli {
    /// Config file (else COBRANDO_CONFIG, else ./cobrando.toml)
    #[arg(short, long, global = true, env = "COBRANDO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema (idempotent)
    InitDb,

    /// Validate and normalize a single identifier without saving it
    Validate {
        /// PHONE, CLABE, CARD or ACCOUNT
        kind: String,
        value: String,

        #[arg(long)]
        bank_name: Option<String>,

        /// WhatsApp contact number
        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        alias: Option<String>,

        /// Print the normalized identifier as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the masked form of a value
    Mask { kind: String, value: String },

    /// Register an owner (email or phone required)
    Register {
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        name: Option<String>,
    },

    /// Bulk-import identifiers from a CSV file
    Import { csv: PathBuf },

    /// List an owner's identifiers (masked)
    List { owner_id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    config.init_logging();

    match cli.command {
        Command::InitDb => run_init_db(&config),
        Command::Validate {
            kind,
            value,
            bank_name,
            phone,
            alias,
            json,
        } => {
            let mut candidate = CandidateIdentifier::new(kind, value);
            candidate.bank_name = bank_name;
            candidate.phone = phone;
            candidate.alias = alias;
            run_validate(&config, &candidate, json)
        }
        Command::Mask { kind, value } => {
            let kind = match Kind::parse(&kind) {
                Some(k) => k,
                None => bail!("Unknown kind {:?} (expected PHONE, CLABE, CARD or ACCOUNT)", kind),
            };
            println!("{}", mask_value(kind, value.trim()));
            Ok(())
        }
        Command::Register { email, phone, name } => run_register(
            &config,
            &Registration {
                email,
                phone,
                display_name: name,
            },
        ),
        Command::Import { csv } => run_import(&config, &csv),
        Command::List { owner_id } => run_list(&config, &owner_id),
    }
}

fn open_database(config: &Config) -> Result<Connection> {
    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database: {:?}", config.database_path))?;
    setup_database(&conn)?;
    Ok(conn)
}

fn run_init_db(config: &Config) -> Result<()> {
    open_database(config)?;
    info!("database ready at {:?}", config.database_path);
    println!("✓ Database initialized: {}", config.database_path.display());
    Ok(())
}

fn run_validate(config: &Config, candidate: &CandidateIdentifier, json: bool) -> Result<()> {
    let banks = config.bank_table()?;

    match normalize_and_validate(candidate, &banks) {
        Ok(normalized) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&normalized)?);
            } else {
                println!("✓ {} {}", normalized.kind(), normalized.value());
                if let Some(code) = normalized.identifier.bank_code() {
                    println!("  bank code: {}", code);
                }
                if let Some(name) = normalized.identifier.bank_name().filter(|n| !n.is_empty()) {
                    println!("  bank:      {}", name);
                }
                if let Some(brand) = normalized.identifier.brand() {
                    println!("  brand:     {}", brand);
                }
                if let Some(phone) = &normalized.whatsapp_phone {
                    println!("  whatsapp:  {}", phone);
                }
                println!("  masked:    {}", normalized.masked_value());
            }
            Ok(())
        }
        Err(errors) => {
            for e in errors.errors() {
                eprintln!("❌ {} [{}]: {}", e.field, e.kind.as_str(), e.message);
            }
            bail!("{} field error(s)", errors.errors().len())
        }
    }
}

fn run_register(config: &Config, registration: &Registration) -> Result<()> {
    let conn = open_database(config)?;
    let owner = create_owner(&conn, registration)?;

    println!("✓ Registered {}", owner.label());
    println!("  id:      {}", owner.id);
    println!("  profile: {}", owner.profile_path());
    Ok(())
}

fn run_import(config: &Config, csv_path: &std::path::Path) -> Result<()> {
    let banks = config.bank_table()?;
    let conn = open_database(config)?;

    println!("📂 Loading CSV...");
    let rows = load_candidates(csv_path)?;
    println!("✓ Loaded {} rows", rows.len());

    let report = import_candidates(&conn, &rows, &banks)?;
    println!("✓ {}", report.summary());
    Ok(())
}

fn run_list(config: &Config, owner_id: &str) -> Result<()> {
    let conn = open_database(config)?;
    let owner = cobrando::get_owner(&conn, owner_id)?;
    let identifiers = list_identifiers(&conn, owner_id)?;

    println!("{} ({} identifiers)", owner.label(), identifiers.len());
    for stored in &identifiers {
        let n = &stored.normalized;
        let visibility = if n.is_public { "public" } else { "private" };
        println!(
            "  {:<8} {:<20} {:<8} {}",
            n.kind().as_str(),
            n.masked_value(),
            visibility,
            n.alias
        );
    }
    Ok(())
}
