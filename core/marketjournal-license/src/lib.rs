//! License activation for Market Journal.
//!
//! Every collection run must be authorized before it touches a data source
//! or the journal. [`Activator::authorize`] does that:
//!
//! 1. ping the license service and fail fast if it is down
//! 2. revalidate the locally stored license key, if any
//! 3. otherwise prompt for a key, up to a bounded number of attempts
//!
//! A key the service accepts is bound to this device's [`DeviceId`] on the
//! server and stored locally, encrypted with a key kept in a separate
//! owner-only file.
//!
//! [`DeviceId`]: marketjournal_types::DeviceId

mod activation;
mod client;
mod credential;
mod device;
mod error;
mod prompt;

pub use activation::{Activator, Authorization, AuthorizationSource, DEFAULT_MAX_ATTEMPTS};
pub use client::{rejection_error, HttpLicenseClient, LicenseService, DEFAULT_TIMEOUT};
pub use credential::{CredentialStore, ENCRYPTION_KEY_FILE_NAME, LICENSE_FILE_NAME};
pub use device::{DeviceIdentity, DeviceInfo, FixedDeviceId, HardwareFingerprint};
pub use error::{LicenseError, LicenseResult};
pub use prompt::{Notice, Prompt, TerminalPrompt};
