// src/main.rs
mod extractors;
mod http;
mod receipt;
mod storage;
mod utils;

use clap::Parser;
use storage::AuditLog;
use utils::AppError;

/// Command Line Interface for the payment receipt resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the HTTP listener on
    #[arg(long, default_value = "0.0.0.0:3000")]
    bind: String,

    /// Path to the SQLite file backing the audit log
    #[arg(long, default_value = "./receipts.db")]
    db_path: String,

    /// Resolve a single transaction id, print the record as JSON, and exit
    #[arg(short, long)]
    transaction: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting receipt resolver: {:?}", args);

    // 3. Open the audit log (creates the table on first run)
    let audit_log = AuditLog::open(&args.db_path).await?;

    // 4. One-shot mode: resolve, log, print, exit
    if let Some(transaction_id) = &args.transaction {
        let record = receipt::resolve(transaction_id).await?;
        audit_log.append(&record, "local", "cli").await?;

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| AppError::Processing(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    // 5. Otherwise serve the verify API
    http::serve(&args.bind, audit_log).await
}
