//! Market Journal daily collection run.
//!
//! Authorizes this device with the license server, then appends today's
//! market values and a news headline to the journal.
//!
//! Usage:
//!   market-journal --server-url http://localhost:5001

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use marketjournal_collect::{
    default_columns, header_row, prompt_fmp_key, run_journal, ApiKeyStore, CnbcScraper,
    FmpClient, JournalError, JournalFile, JournalResult, NewsApiClient, NewsSource, NoNews,
    RunOptions, Sources, API_KEY_FILE_NAME,
};
use marketjournal_license::{
    Activator, CredentialStore, HardwareFingerprint, HttpLicenseClient, TerminalPrompt,
    DEFAULT_MAX_ATTEMPTS, ENCRYPTION_KEY_FILE_NAME, LICENSE_FILE_NAME,
};
use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "market-journal")]
#[command(about = "Append today's market data to the Market Journal")]
struct Args {
    /// License server base URL
    #[arg(long, env = "LICENSE_SERVER_URL", default_value = "http://localhost:5001")]
    server_url: String,

    /// Seconds to wait for the license server
    #[arg(long, default_value_t = 5)]
    timeout_secs: u64,

    /// Journal workbook (.xlsx) or CSV file [default: ~/Downloads/Market Journal.xlsx]
    #[arg(long, env = "MARKET_JOURNAL_PATH")]
    journal: Option<PathBuf>,

    /// Directory holding the license, API key and encryption key files [default: ~]
    #[arg(long, env = "MARKET_JOURNAL_HOME")]
    data_dir: Option<PathBuf>,

    /// Financial Modeling Prep API key; stored encrypted if entered interactively
    #[arg(long, env = "FMP_API_KEY", hide_env_values = true)]
    fmp_api_key: Option<String>,

    /// newsapi.org key; the news column is left empty without one
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    news_api_key: Option<String>,

    /// License key prompts before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: u32,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let data_dir = match args.data_dir.clone() {
        Some(dir) => dir,
        None => dirs::home_dir().context("Could not determine home directory")?,
    };
    let journal_path = match args.journal.clone() {
        Some(path) => path,
        None => dirs::download_dir()
            .unwrap_or_else(|| data_dir.join("Downloads"))
            .join("Market Journal.xlsx"),
    };
    let key_path = data_dir.join(ENCRYPTION_KEY_FILE_NAME);

    let client = HttpLicenseClient::with_timeout(
        &args.server_url,
        Duration::from_secs(args.timeout_secs),
    )?;
    let credentials = CredentialStore::new(data_dir.join(LICENSE_FILE_NAME), &key_path);
    let mut activator = Activator::new(client, HardwareFingerprint, credentials, TerminalPrompt);

    let options = RunOptions {
        max_attempts: args.max_attempts,
        columns: default_columns(),
        today: Local::now().date_naive(),
    };
    let mut journal = JournalFile::open(&journal_path, header_row(&options.columns));

    let api_keys = ApiKeyStore::new(data_dir.join(API_KEY_FILE_NAME), &key_path);
    let build_sources = || -> JournalResult<Sources> {
        let fmp_key = api_keys.resolve(args.fmp_api_key.clone(), prompt_fmp_key)?;
        let news: Arc<dyn NewsSource> = match &args.news_api_key {
            Some(key) if !key.trim().is_empty() => Arc::new(NewsApiClient::new(key.trim())?),
            _ => {
                warn!("NEWS_API_KEY not set; skipping news");
                Arc::new(NoNews)
            }
        };
        Ok(Sources::new(
            Arc::new(FmpClient::new(fmp_key)?),
            Arc::new(CnbcScraper::new()?),
            news,
        ))
    };

    match run_journal(&mut activator, &options, build_sources, &mut journal).await {
        Ok(report) => {
            info!(
                "Wrote {} value(s) to row {}; missing: {}",
                report.written.len(),
                report.row,
                if report.missing.is_empty() {
                    "none".to_string()
                } else {
                    report.missing.join(", ")
                }
            );
            println!("Journal updated: {}", journal_path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(JournalError::Unauthorized(e)) => {
            error!("Authorization failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to update {}", journal_path.display())),
    }
}
