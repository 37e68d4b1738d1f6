//! Market Journal license server.
//!
//! Issues license keys and binds each one to the first device that validates
//! it. Records live in a single SQLite file.
//!
//! Usage:
//!   license-server --port 5001 --db licenses.db

use anyhow::{Context, Result};
use clap::Parser;
use marketjournal_license_server::{
    build_router,
    rate_limit::{Quota, TokenBucketLimiter},
    serve_with_shutdown, AppState, LicenseStore, DEFAULT_ISSUE_PER_MINUTE,
    DEFAULT_VALIDATE_PER_MINUTE,
};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "license-server")]
#[command(about = "Market Journal license issuance and device-binding service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5001")]
    port: u16,

    /// Address to bind
    #[arg(long, env = "LICENSE_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Path to the SQLite license database
    #[arg(long, env = "LICENSE_DB", default_value = "licenses.db")]
    db: PathBuf,

    /// Licenses each caller may generate per minute
    #[arg(long, default_value_t = DEFAULT_ISSUE_PER_MINUTE, value_parser = clap::value_parser!(u32).range(1..))]
    issue_per_minute: u32,

    /// Validations each caller may attempt per minute
    #[arg(long, default_value_t = DEFAULT_VALIDATE_PER_MINUTE, value_parser = clap::value_parser!(u32).range(1..))]
    validate_per_minute: u32,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    info!("License server starting...");
    let store = LicenseStore::open(&args.db)
        .with_context(|| format!("Failed to open license database {:?}", args.db))?;
    info!("License database: {:?} ({} licenses)", args.db, store.count()?);

    warn!("generate_license and list_licenses are unauthenticated; do not expose this port publicly");

    let state = AppState::with_limits(
        Arc::new(store),
        Arc::new(TokenBucketLimiter::new(Quota::per_minute(args.issue_per_minute))),
        Arc::new(TokenBucketLimiter::new(Quota::per_minute(args.validate_per_minute))),
    );

    let addr = format!("{}:{}", args.bind, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    println!("\n========================================");
    println!("  Market Journal License Server");
    println!("========================================");
    println!("  Listening:  http://{}", listener.local_addr()?);
    println!("  Database:   {}", args.db.display());
    println!("  Issue rate: {}/min per caller", args.issue_per_minute);
    println!("  Check rate: {}/min per caller", args.validate_per_minute);
    println!("========================================\n");

    serve_with_shutdown(listener, build_router(state), shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("License server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
