//! Error types for the license service.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the license store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored value failed to parse back into a domain type.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Could not mint a key that was not already taken.
    #[error("could not allocate a unique license key after {0} attempts")]
    KeyExhausted(u32),

    /// A previous holder of the connection lock panicked.
    #[error("license store lock poisoned")]
    Poisoned,
}
