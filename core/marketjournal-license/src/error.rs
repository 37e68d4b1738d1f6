//! Error types for the activation client.

use thiserror::Error;

/// Activation errors. Every variant returned from
/// [`Activator::authorize`](crate::Activator::authorize) is fatal to the run.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The service rejected the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The key was never issued.
    #[error("unknown license key")]
    UnknownKey,

    /// The key is bound to a different device.
    #[error("license key already in use on another device")]
    AlreadyBoundElsewhere,

    /// The license service could not be reached or replied with garbage.
    #[error("license server unreachable: {0}")]
    ServerUnreachable(String),

    /// The user gave no key on the final attempt.
    #[error("no license key provided")]
    NoKeyProvided,

    /// Every attempt was rejected.
    #[error("authorization denied after {attempts} attempt(s): {reason}")]
    AuthorizationDenied { attempts: u32, reason: String },

    /// The local credential could not be encrypted, decrypted or written.
    #[error("credential storage error: {0}")]
    CredentialStorage(String),

    /// The service is throttling this caller.
    #[error("rate limited by license server{}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// The device id could not be derived.
    #[error("device identity unavailable: {0}")]
    DeviceIdentity(String),

    /// Interactive input failed.
    #[error("prompt failed: {0}")]
    Prompt(String),
}

fn retry_hint(secs: &Option<u64>) -> String {
    match secs {
        Some(secs) => format!(" (retry after {secs}s)"),
        None => String::new(),
    }
}

impl From<marketjournal_crypto::CryptoError> for LicenseError {
    fn from(e: marketjournal_crypto::CryptoError) -> Self {
        Self::CredentialStorage(e.to_string())
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
