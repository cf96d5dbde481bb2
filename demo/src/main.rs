//! chainlog command line.
//!
//! Usage:
//!   cargo run -p chainlog-demo -- demo
//!   cargo run -p chainlog-demo -- verify-file chain.json
//!   cargo run -p chainlog-demo -- hash --tenant acme --seq 1 --log-type AUTH_LOGIN --payload '{}'
//!
//! The hashing secret comes from `LOG_HASH_KEY` (or the variable named by
//! `[hashing] secret_env` in the file passed with `--config`).

mod scenario;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use chainlog_contracts::{
    error::{ChainlogError, ChainlogResult},
    log_type::LogType,
    record::{LogRecord, TenantId, ZERO_SENTINEL},
    report::ChainReport,
};
use chainlog_core::ChainVerifier;
use chainlog_ingest::ChainlogConfig;
use chainlog_store::InMemoryLogStore;

// ── CLI definition ────────────────────────────────────────────────────────────

/// chainlog: per-tenant tamper-evident log chains.
#[derive(Parser)]
#[command(
    name = "chainlog",
    about = "Tamper-evident per-tenant log chains",
    long_about = "Appends records to HMAC-SHA256 linked per-tenant chains and verifies\n\
                  stored chains for gaps, broken links and edited records."
)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Append to two tenants (directly and through the queue), verify, tamper, verify again.
    Demo,
    /// Verify every tenant chain in a JSON array of exported records.
    VerifyFile {
        path: PathBuf,
        /// Only verify this tenant.
        #[arg(long)]
        tenant: Option<String>,
    },
    /// Print the chain hash for one record.
    Hash {
        #[arg(long)]
        tenant: String,
        #[arg(long)]
        seq: u64,
        #[arg(long)]
        log_type: String,
        /// JSON payload.
        #[arg(long, default_value = "{}")]
        payload: String,
        #[arg(long, default_value = ZERO_SENTINEL)]
        prev_hash: String,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ChainlogConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("chainlog: {}", e);
            std::process::exit(2);
        }
    };

    // RUST_LOG wins over `[log] level`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .with_target(false)
        .compact()
        .init();

    let result = match cli.command {
        Command::Demo => scenario::run(config).await,
        Command::VerifyFile { path, tenant } => verify_file(&config, &path, tenant.as_deref()),
        Command::Hash {
            tenant,
            seq,
            log_type,
            payload,
            prev_hash,
        } => print_hash(&config, &tenant, seq, &log_type, &payload, &prev_hash),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("chainlog: {}", e);
            std::process::exit(2);
        }
    }
}

// ── verify-file ───────────────────────────────────────────────────────────────

/// Returns `Ok(false)` when any verified chain is invalid.
fn verify_file(config: &ChainlogConfig, path: &Path, only: Option<&str>) -> ChainlogResult<bool> {
    let secret = config.secret_key()?;

    let contents = std::fs::read_to_string(path).map_err(|e| ChainlogError::StorageError {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    let records: Vec<LogRecord> = serde_json::from_str(&contents)
        .map_err(|e| ChainlogError::validation("records", e.to_string()))?;

    let store = Arc::new(InMemoryLogStore::new());
    store.import(records)?;

    let tenants = match only {
        Some(t) => vec![TenantId::new(t)],
        None => store.tenants()?,
    };

    let verifier = ChainVerifier::new(store);
    let mut all_valid = true;
    for tenant in &tenants {
        let report = verifier.verify(tenant, &secret)?;
        all_valid &= report.valid;
        print_report(tenant, &report)?;
    }
    Ok(all_valid)
}

pub(crate) fn print_report(tenant: &TenantId, report: &ChainReport) -> ChainlogResult<()> {
    let rendered = serde_json::to_string_pretty(report)
        .map_err(|e| ChainlogError::StorageError { reason: e.to_string() })?;
    println!("tenant {}:", tenant);
    println!("{}", rendered);
    Ok(())
}

// ── hash ──────────────────────────────────────────────────────────────────────

fn print_hash(
    config: &ChainlogConfig,
    tenant: &str,
    seq: u64,
    log_type: &str,
    payload: &str,
    prev_hash: &str,
) -> ChainlogResult<bool> {
    let secret = config.secret_key()?;
    let log_type: LogType = log_type.parse()?;
    let payload: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| ChainlogError::validation("payload", e.to_string()))?;

    let hash = chainlog_chain::compute_hash(
        &TenantId::new(tenant),
        seq,
        log_type,
        &payload,
        prev_hash,
        &secret,
    );
    println!("{}", hash);
    Ok(true)
}
