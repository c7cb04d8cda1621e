// Cobrando - Web Server
// REST API with Axum: owner dashboard + public payment profiles

use anyhow::{Context, Result};
use clap::Parser;
use rusqlite::Connection;
use std::path::PathBuf;
use tracing::info;

use cobrando::api::{build_router, AppState};
use cobrando::{count_identifiers, setup_database, Config, VERSION};

#[derive(Parser, Debug)]
#[command(name = "cobrando-server", version, about = "Cobrando HTTP API")]
struct Args {
    /// Config file (else COBRANDO_CONFIG, else ./cobrando.toml)
    #[arg(short, long, env = "COBRANDO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    config.init_logging();

    info!("Starting cobrando-server v{}", VERSION);

    let banks = config.bank_table()?;
    info!("✓ Bank-code table: {} entries", banks.len());

    let conn = Connection::open(&config.database_path)
        .with_context(|| format!("Failed to open database: {:?}", config.database_path))?;
    setup_database(&conn)?;
    info!(
        "✓ Database opened: {:?} ({} identifiers)",
        config.database_path,
        count_identifiers(&conn)?
    );

    let app = build_router(AppState::new(conn, banks));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("🚀 Server running on http://{}", config.bind_addr);
    info!("   API:      http://{}/api/health", config.bind_addr);
    info!("   Profiles: http://{}/u/<slug>/", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
