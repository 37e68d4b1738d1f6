//! Error types for the collection run.

use marketjournal_license::LicenseError;
use thiserror::Error;

/// Errors that stop a collection run.
///
/// Source failures never surface here; a source that cannot produce a value
/// leaves its cell empty.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The run was not authorized. Nothing was fetched or written.
    #[error("not authorized: {0}")]
    Unauthorized(#[from] LicenseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A page or API reply did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("journal file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored secret error: {0}")]
    Secret(#[from] marketjournal_crypto::CryptoError),

    #[error("no {0} API key provided")]
    MissingApiKey(&'static str),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("row {0} is outside the journal")]
    RowOutOfRange(usize),
}

/// Result type for collection operations.
pub type JournalResult<T> = Result<T, JournalError>;
