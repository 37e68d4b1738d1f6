//! Error types for the encryption layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur in cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed (wrong key or tampered data).
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Key material on disk could not be decoded.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Reading or writing a key or secret file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
