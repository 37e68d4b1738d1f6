//! License records and the outcome of presenting a key.

use crate::ids::{DeviceId, LicenseKey};
use serde::{Deserialize, Serialize};

/// A persisted license and the device it is bound to, if any.
///
/// `device_id` moves from `None` to `Some(d)` exactly once and never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub license_key: LicenseKey,
    pub device_id: Option<DeviceId>,
}

impl LicenseRecord {
    /// A freshly issued, unbound record.
    #[must_use]
    pub fn unbound(license_key: LicenseKey) -> Self {
        Self {
            license_key,
            device_id: None,
        }
    }

    /// Returns true once a device has claimed this key.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.device_id.is_some()
    }
}

/// What happened when a device presented a license key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The key was unbound and is now bound to the caller.
    Activated,
    /// The key was already bound to the caller.
    AlreadyValid,
    /// No such key was ever issued.
    UnknownKey,
    /// The key is bound to a different device.
    BoundElsewhere,
}

impl ValidationOutcome {
    /// Returns true if the caller may proceed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Activated | Self::AlreadyValid)
    }

    /// Human-readable message returned to clients.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            Self::Activated => "License key activated",
            Self::AlreadyValid => "License key already valid",
            Self::UnknownKey => "Invalid license key",
            Self::BoundElsewhere => "License key already in use on another device",
        }
    }
}
